//! Per-record sighting classification.
//!
//! Maps a free-text comment (and the sighting `type` label) to pod,
//! ecotype and direction flags by substring membership against the
//! keyword tables. Every flag is computed from the record alone.

use crate::keywords::{
    BIGGS_CASED_MARKER, DIRECTION_RULES, DirectionRule, KeywordTables, SRKW_TYPE_MARKER,
};
use crate::model::{DirectionFlags, TagFlags};

/// Text a missing comment is matched as. It contains no keyword, so a
/// missing comment yields all-zero comment flags.
pub const NULL_COMMENT: &str = "None";

fn flag(hit: bool) -> u8 {
    u8::from(hit)
}

fn contains_any(text: &str, keys: &[String]) -> bool {
    keys.iter().any(|k| text.contains(k.as_str()))
}

/// Returns `true` if the rule fires for a comment. `raw` is the comment as
/// written and `lower` its lower-cased form.
pub fn direction_matches(rule: &DirectionRule, raw: &str, lower: &str) -> bool {
    let phrase_hit = lower.contains(rule.phrase)
        && !rule.unless.is_some_and(|superstring| lower.contains(superstring));
    phrase_hit
        || rule.heading.is_some_and(|heading| lower.contains(heading))
        || rule.code.is_some_and(|code| raw.contains(code))
}

fn classify_directions(raw: &str, lower: &str) -> DirectionFlags {
    let mut flags = DirectionFlags::default();
    for rule in DIRECTION_RULES {
        flags.set(rule.direction, flag(direction_matches(rule, raw, lower)));
    }
    flags
}

/// Classifies one sighting.
///
/// - Pod flags: case-sensitive match against the raw comment.
/// - `srkw_generic`, `biggs`: match against the lower-cased comment; `biggs`
///   also fires on a case-sensitive `"Ts"` anywhere in the raw comment.
/// - `srkw_type`: `kind` contains `"Southern Resident"`; 0 when `kind` is
///   missing.
/// - Directions: see `keywords::DIRECTION_RULES`.
///
/// No exclusivity is enforced between flags.
pub fn classify(comment: Option<&str>, kind: Option<&str>, tables: &KeywordTables) -> TagFlags {
    let raw = comment.unwrap_or(NULL_COMMENT);
    let lower = raw.to_lowercase();

    TagFlags {
        j: flag(contains_any(raw, &tables.jpod)),
        k: flag(contains_any(raw, &tables.kpod)),
        l: flag(contains_any(raw, &tables.lpod)),
        srkw_generic: flag(contains_any(&lower, &tables.srkw)),
        srkw_type: flag(kind.is_some_and(|k| k.contains(SRKW_TYPE_MARKER))),
        biggs: flag(contains_any(&lower, &tables.biggs) || raw.contains(BIGGS_CASED_MARKER)),
        directions: classify_directions(raw, &lower),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Direction;

    fn tags(comment: &str) -> TagFlags {
        classify(Some(comment), None, &KeywordTables::default())
    }

    // --- Reference comments -------------------------------------------------

    #[test]
    fn test_j_pod_heading_south() {
        let t = tags("J pod heading south near Lime Kiln");
        assert_eq!((t.j, t.k, t.l), (1, 0, 0));
        assert_eq!(t.srkw(), 1);
        assert_eq!(t.directions.south, 1);
        assert_eq!(t.dir_sum(), 1);
        assert_eq!(t.biggs, 0);
    }

    #[test]
    fn test_biggs_id_southbound() {
        let t = tags("T99s southbound");
        assert_eq!(t.biggs, 1);
        assert_eq!(t.directions.south, 1);
        assert_eq!(t.srkw(), 0, "no pod or generic keyword present");
        assert_eq!(t.sum_srkw_biggs(), 1);
    }

    #[test]
    fn test_missing_comment_sets_no_comment_flags() {
        let t = classify(None, None, &KeywordTables::default());
        assert_eq!(t, TagFlags::default());
        assert_eq!(t.sum_jkl(), 0);
        assert_eq!(t.dir_sum(), 0);
    }

    // --- Pods ---------------------------------------------------------------

    #[test]
    fn test_pod_matching_is_case_sensitive() {
        // "J POD" is in neither case variant of the J list.
        assert_eq!(tags("J POD passing").j, 0);
        assert_eq!(tags("j pod passing").j, 1);
    }

    #[test]
    fn test_pair_phrase_sets_both_pods() {
        let t = tags("J and K pods off Eagle Point");
        assert_eq!((t.j, t.k, t.l), (1, 1, 0));
        assert_eq!(t.sum_jkl(), 2);
    }

    #[test]
    fn test_superpod_sets_all_three() {
        let t = tags("JKL superpod!");
        assert_eq!(t.sum_jkl(), 3, "sum_jkl is not capped");
        assert_eq!(t.srkw(), 1);
    }

    #[test]
    fn test_individual_whale_ids() {
        assert_eq!(tags("saw J35 and calf").j, 1);
        assert_eq!(tags("K37 foraging").k, 1);
        assert_eq!(tags("L-12 subgroup").l, 1);
    }

    // --- Southern residents -------------------------------------------------

    #[test]
    fn test_generic_srkw_is_case_insensitive() {
        assert_eq!(tags("SOUTHERN RESIDENTS in Haro Strait").srkw_generic, 1);
        assert_eq!(tags("srkw close to shore").srkw_generic, 1);
        assert_eq!(tags("SRKW close to shore").srkw(), 1);
    }

    #[test]
    fn test_srkw_type_requires_exact_case_in_type() {
        let tables = KeywordTables::default();
        let hit = classify(None, Some("Southern Resident Killer Whale"), &tables);
        assert_eq!(hit.srkw_type, 1);
        assert_eq!(hit.srkw(), 1);

        let miss = classify(None, Some("southern resident killer whale"), &tables);
        assert_eq!(miss.srkw_type, 0);
        assert_eq!(miss.srkw(), 0);
    }

    // --- Biggs --------------------------------------------------------------

    #[test]
    fn test_biggs_keywords_ignore_case() {
        assert_eq!(tags("TRANSIENTS hunting seals").biggs, 1);
        assert_eq!(tags("Bigg's killer whales").biggs, 1);
        assert_eq!(tags("t2C family").biggs, 1);
    }

    #[test]
    fn test_cased_ts_marker_fires_inside_words() {
        // Known imprecision kept for comparability with existing tags.
        assert_eq!(tags("whale wATChing boaTs").biggs, 1);
        assert_eq!(tags("orca starts moving").biggs, 0, "lower-case \"ts\" alone does not match");
    }

    #[test]
    fn test_srkw_and_biggs_can_both_fire() {
        let t = tags("L pod and transients nearby");
        assert_eq!(t.srkw(), 1);
        assert_eq!(t.biggs, 1);
        assert_eq!(t.sum_srkw_biggs(), 2);
    }

    // --- Directions ---------------------------------------------------------

    #[test]
    fn test_southeastbound_does_not_count_as_east() {
        let t = tags("group southeastbound");
        assert_eq!(t.directions.southeast, 1);
        assert_eq!(t.directions.east, 0);
        assert_eq!(t.dir_sum(), 1);
    }

    #[test]
    fn test_northwestbound_does_not_count_as_west() {
        let t = tags("northwestbound fast");
        assert_eq!(t.directions.northwest, 1);
        assert_eq!(t.directions.west, 0);
    }

    #[test]
    fn test_heading_east_and_westbound() {
        assert_eq!(tags("heading east toward Sidney").directions.east, 1);
        assert_eq!(tags("Westbound in the strait").directions.west, 1);
    }

    #[test]
    fn test_heading_southeast_also_reads_as_south() {
        // "heading southeast" contains "heading south".
        let t = tags("heading southeast");
        assert_eq!(t.directions.south, 1);
        assert_eq!(t.directions.southeast, 1);
        assert_eq!(t.dir_sum(), 2);
    }

    #[test]
    fn test_direction_codes_are_case_sensitive_substrings() {
        assert_eq!(tags("moving NE").directions.northeast, 1);
        assert_eq!(tags("moving ne").directions.northeast, 0);
        // Code fires inside unrelated upper-case words.
        assert_eq!(tags("near SEA-TAC flight path").directions.southeast, 1);
    }

    #[test]
    fn test_each_phrase_and_code_sets_only_its_own_direction() {
        for (comment, expected) in [
            ("heading north past the lighthouse", Direction::North),
            ("drifting southwest", Direction::Southwest),
            ("northeast of the island", Direction::Northeast),
            ("in the northwest corner", Direction::Northwest),
            ("moving SW", Direction::Southwest),
            ("moving NW", Direction::Northwest),
            ("moving SE", Direction::Southeast),
        ] {
            let t = tags(comment);
            assert_eq!(t.directions.get(expected), 1, "{:?} should set {:?}", comment, expected);
            assert_eq!(t.dir_sum(), 1, "{:?} should set no other direction", comment);
        }
    }

    #[test]
    fn test_dir_sum_counts_every_flag_set() {
        let t = tags("northbound then SW then heading west");
        assert_eq!(t.directions.north, 1);
        assert_eq!(t.directions.southwest, 1);
        assert_eq!(t.directions.west, 1);
        let counted = Direction::ALL.iter().filter(|d| t.directions.get(**d) == 1).count();
        assert_eq!(t.dir_sum() as usize, counted);
        assert_eq!(counted, 3);
    }

    // --- Overrides ----------------------------------------------------------

    #[test]
    fn test_overridden_tables_replace_builtin_lists() {
        let mut tables = KeywordTables::default();
        tables.jpod = vec!["J99".to_string()];
        let t = classify(Some("J pod and J99"), None, &tables);
        assert_eq!(t.j, 1);
        let t = classify(Some("J pod only"), None, &tables);
        assert_eq!(t.j, 0, "built-in J phrases are gone after override");
    }
}
