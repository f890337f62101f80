/// Keyword registry for sighting comment classification.
///
/// Defines the canonical keyword lists used to tag sightings with pod,
/// ecotype and travel-direction flags. This is the single source of truth
/// for keywords: the classifier reads them from here (or from a
/// `KeywordTables` built from here and optionally overridden by config)
/// rather than hardcoding strings.
///
/// Matching is naive substring containment. Short codes such as "SE" or
/// "Ts" therefore also fire inside unrelated words; that behaviour is
/// kept so tags stay comparable with earlier dashboard data.

use crate::model::Direction;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Pod keywords (matched case-sensitively against the raw comment)
// ---------------------------------------------------------------------------

pub static JPOD_KEYS: &[&str] = &[
    "J pod", "Jpod", "J ppd", "J-pod", "Js",
    "j pod", "jpod", "j ppd", "j-pod",
    "j+k", "k+j", "j & k", "k & j", "j and k", "k and j", "jk pods", "kj pods",
    "J+K", "K+J", "J & K", "K & J", "J and K", "K and J", "JK pods", "KJ pods",
    "j+l", "l+j", "j & l", "l & j", "j and l", "l and j", "jl pods", "lj pods",
    "J+L", "L+J", "J & L", "L & J", "J and L", "L and J", "JL pods", "LJ pods",
    "j, k, l pod", "j, k, and l pod", "jkl",
    "J, K, L pod", "J, K, and L pod", "JKL",
    "j27", "j38", "j35", "j40",
    "J27", "J38", "J35", "J40",
];

pub static KPOD_KEYS: &[&str] = &[
    "K pod", "Kpod", "K-pod", "Ks",
    "k pod", "kpod", "k-pod",
    "j+k", "k+j", "j & k", "k & j", "j and k", "k and j", "jk pods", "kj pods",
    "J+K", "K+J", "J & K", "K & J", "J and K", "K and J", "JK pods", "KJ pods",
    "k+l", "l+k", "k & l", "l & k", "k and l", "l and k", "lk pods", "kl pods",
    "K+L", "L+K", "K & L", "L & K", "K and L", "L and K", "LK pods", "KL pods",
    "j, k, l pod", "j, k, and l pod", "jkl",
    "J, K, L pod", "J, K, and L pod", "JKL",
    "k37", "K37",
];

pub static LPOD_KEYS: &[&str] = &[
    "L pod", "Lpod", "L-pod", "Ls",
    "j+l", "l+j", "j & l", "l & j", "j and l", "l and j", "jl pods", "lj pods",
    "J+L", "L+J", "J & L", "L & J", "J and L", "L and J", "JL pods", "LJ pods",
    "k+l", "l+k", "k & l", "l & k", "k and l", "l and k", "lk pods", "kl pods",
    "K+L", "L+K", "K & L", "L & K", "K and L", "L and K", "LK pods", "KL pods",
    "j, k, l pod", "j, k, and l pod", "jkl",
    "J, K, L pod", "J, K, and L pod", "JKL",
    "l12", "l54", "l-12", "l82", "l85", "l87",
    "L12", "L54", "L-12", "L82", "L85", "L87",
];

// ---------------------------------------------------------------------------
// Ecotype keywords (matched against the lower-cased comment)
// ---------------------------------------------------------------------------

/// Mixed-case entries can never match a lower-cased comment; they are kept
/// so the list reads the same as the phrases people actually type.
pub static SRKW_KEYS: &[&str] = &[
    "SRKW", "srkw",
    "southern resident", "Southern Resident", "Southern resident", "southern Resident",
];

pub static BIGGS_KEYS: &[&str] = &[
    "Bigg", "bigg", "Transient", "transient", "Ts",
    "t99", "t137", "t46", "t10", "t2c", "t49",
    "T99", "T137", "T46", "T10", "T2C", "T49",
];

/// Checked case-sensitively against the raw comment, in addition to
/// `BIGGS_KEYS`. Matches inside words like "starts" as well.
pub const BIGGS_CASED_MARKER: &str = "Ts";

/// Literal looked for in the sighting `type` field (case-sensitive).
pub const SRKW_TYPE_MARKER: &str = "Southern Resident";

// ---------------------------------------------------------------------------
// Direction rules
// ---------------------------------------------------------------------------

/// How one direction flag is derived from a comment.
#[derive(Debug)]
pub struct DirectionRule {
    pub direction: Direction,
    /// Lower-case phrase looked for in the lower-cased comment.
    pub phrase: &'static str,
    /// Lower-case superstring of `phrase` that cancels a `phrase` match,
    /// e.g. "southeastbound" for "eastbound".
    pub unless: Option<&'static str>,
    /// Lower-case "heading <dir>" phrase, if the direction has one.
    pub heading: Option<&'static str>,
    /// Two-letter code looked for case-sensitively in the raw comment.
    pub code: Option<&'static str>,
}

pub static DIRECTION_RULES: &[DirectionRule] = &[
    DirectionRule {
        direction: Direction::South,
        phrase: "southbound",
        unless: None,
        heading: Some("heading south"),
        code: None,
    },
    DirectionRule {
        direction: Direction::Southeast,
        phrase: "southeast",
        unless: None,
        heading: None, // "heading southeast" already contains the phrase
        code: Some("SE"),
    },
    DirectionRule {
        direction: Direction::Southwest,
        phrase: "southwest",
        unless: None,
        heading: None,
        code: Some("SW"),
    },
    DirectionRule {
        direction: Direction::North,
        phrase: "northbound",
        unless: None,
        heading: Some("heading north"),
        code: None,
    },
    DirectionRule {
        direction: Direction::Northeast,
        phrase: "northeast",
        unless: None,
        heading: None,
        code: Some("NE"),
    },
    DirectionRule {
        direction: Direction::Northwest,
        phrase: "northwest",
        unless: None,
        heading: None,
        code: Some("NW"),
    },
    DirectionRule {
        direction: Direction::East,
        phrase: "eastbound",
        unless: Some("southeastbound"),
        heading: Some("heading east"),
        code: None,
    },
    DirectionRule {
        direction: Direction::West,
        phrase: "westbound",
        unless: Some("northwestbound"),
        heading: Some("heading west"),
        code: None,
    },
];

/// Looks up the rule for a direction. Every direction has exactly one.
pub fn direction_rule(direction: Direction) -> Option<&'static DirectionRule> {
    DIRECTION_RULES.iter().find(|r| r.direction == direction)
}

// ---------------------------------------------------------------------------
// Owned keyword tables
// ---------------------------------------------------------------------------

/// Keyword lists used by the classifier, loaded once at startup.
///
/// Defaults to the built-in registry above. A keywords TOML file may
/// replace any list; lists it omits keep their built-in contents:
///
/// ```toml
/// jpod = ["J pod", "J27"]
/// biggs = ["bigg", "transient"]
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeywordTables {
    #[serde(default = "builtin_jpod")]
    pub jpod: Vec<String>,
    #[serde(default = "builtin_kpod")]
    pub kpod: Vec<String>,
    #[serde(default = "builtin_lpod")]
    pub lpod: Vec<String>,
    #[serde(default = "builtin_srkw")]
    pub srkw: Vec<String>,
    #[serde(default = "builtin_biggs")]
    pub biggs: Vec<String>,
}

fn owned(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|k| k.to_string()).collect()
}

fn builtin_jpod() -> Vec<String> {
    owned(JPOD_KEYS)
}

fn builtin_kpod() -> Vec<String> {
    owned(KPOD_KEYS)
}

fn builtin_lpod() -> Vec<String> {
    owned(LPOD_KEYS)
}

fn builtin_srkw() -> Vec<String> {
    owned(SRKW_KEYS)
}

fn builtin_biggs() -> Vec<String> {
    owned(BIGGS_KEYS)
}

impl Default for KeywordTables {
    fn default() -> Self {
        Self {
            jpod: builtin_jpod(),
            kpod: builtin_kpod(),
            lpod: builtin_lpod(),
            srkw: builtin_srkw(),
            biggs: builtin_biggs(),
        }
    }
}

impl KeywordTables {
    /// Parses a keywords TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// First category holding an empty or whitespace-only keyword. Such an
    /// entry is a substring of every comment and would tag every row.
    pub fn blank_category(&self) -> Option<&'static str> {
        [
            ("jpod", &self.jpod),
            ("kpod", &self.kpod),
            ("lpod", &self.lpod),
            ("srkw", &self.srkw),
            ("biggs", &self.biggs),
        ]
        .into_iter()
        .find(|(_, keys)| keys.iter().any(|k| k.trim().is_empty()))
        .map(|(name, _)| name)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_no_duplicates(name: &str, keys: &[&str]) {
        let mut seen = std::collections::HashSet::new();
        for key in keys {
            assert!(seen.insert(*key), "duplicate key {:?} in {}", key, name);
        }
    }

    #[test]
    fn test_keyword_lists_have_no_duplicates_or_blank_entries() {
        for (name, keys) in [
            ("JPOD_KEYS", JPOD_KEYS),
            ("KPOD_KEYS", KPOD_KEYS),
            ("LPOD_KEYS", LPOD_KEYS),
            ("SRKW_KEYS", SRKW_KEYS),
            ("BIGGS_KEYS", BIGGS_KEYS),
        ] {
            assert_no_duplicates(name, keys);
            assert!(
                keys.iter().all(|k| !k.trim().is_empty()),
                "{} contains a blank entry",
                name
            );
        }
    }

    #[test]
    fn test_triple_pod_phrasings_are_shared_by_all_pods() {
        for phrase in ["JKL", "jkl", "J, K, L pod", "J, K, and L pod"] {
            assert!(JPOD_KEYS.contains(&phrase), "J keys missing {:?}", phrase);
            assert!(KPOD_KEYS.contains(&phrase), "K keys missing {:?}", phrase);
            assert!(LPOD_KEYS.contains(&phrase), "L keys missing {:?}", phrase);
        }
    }

    #[test]
    fn test_pair_phrasings_are_shared_by_exactly_the_two_pods() {
        assert!(JPOD_KEYS.contains(&"J+K") && KPOD_KEYS.contains(&"J+K"));
        assert!(!LPOD_KEYS.contains(&"J+K"));

        assert!(JPOD_KEYS.contains(&"J and L") && LPOD_KEYS.contains(&"J and L"));
        assert!(!KPOD_KEYS.contains(&"J and L"));

        assert!(KPOD_KEYS.contains(&"KL pods") && LPOD_KEYS.contains(&"KL pods"));
        assert!(!JPOD_KEYS.contains(&"KL pods"));
    }

    #[test]
    fn test_individual_ids_carry_their_pod_prefix() {
        for id in ["J27", "J38", "J35", "J40"] {
            assert!(JPOD_KEYS.contains(&id));
        }
        assert!(KPOD_KEYS.contains(&"K37"));
        for id in ["L12", "L54", "L-12", "L82", "L85", "L87"] {
            assert!(LPOD_KEYS.contains(&id));
        }
    }

    #[test]
    fn test_every_direction_has_exactly_one_rule() {
        assert_eq!(DIRECTION_RULES.len(), Direction::ALL.len());
        for dir in Direction::ALL {
            let count = DIRECTION_RULES.iter().filter(|r| r.direction == dir).count();
            assert_eq!(count, 1, "{:?} should have exactly one rule", dir);
            assert!(direction_rule(dir).is_some());
        }
    }

    #[test]
    fn test_direction_phrases_are_lower_case_and_exclusions_contain_phrase() {
        for rule in DIRECTION_RULES {
            assert_eq!(rule.phrase, rule.phrase.to_lowercase());
            if let Some(heading) = rule.heading {
                assert_eq!(heading, heading.to_lowercase());
                assert!(heading.starts_with("heading "));
            }
            if let Some(unless) = rule.unless {
                assert!(
                    unless.contains(rule.phrase),
                    "exclusion {:?} must be a superstring of {:?}",
                    unless,
                    rule.phrase
                );
            }
            if let Some(code) = rule.code {
                assert_eq!(code.len(), 2);
                assert_eq!(code, code.to_uppercase());
            }
        }
    }

    #[test]
    fn test_default_tables_mirror_registry() {
        let tables = KeywordTables::default();
        assert_eq!(tables.jpod.len(), JPOD_KEYS.len());
        assert_eq!(tables.kpod.len(), KPOD_KEYS.len());
        assert_eq!(tables.lpod.len(), LPOD_KEYS.len());
        assert_eq!(tables.srkw.len(), SRKW_KEYS.len());
        assert_eq!(tables.biggs.len(), BIGGS_KEYS.len());
    }

    #[test]
    fn test_partial_toml_override_keeps_other_lists() {
        let tables = KeywordTables::from_toml_str("jpod = [\"J pod\", \"J99\"]\n")
            .expect("valid keywords document should parse");
        assert_eq!(tables.jpod, vec!["J pod".to_string(), "J99".to_string()]);
        assert_eq!(tables.kpod.len(), KPOD_KEYS.len());
        assert_eq!(tables.biggs.len(), BIGGS_KEYS.len());
    }

    #[test]
    fn test_blank_category_finds_empty_and_whitespace_entries() {
        assert_eq!(KeywordTables::default().blank_category(), None);

        let tables = KeywordTables::from_toml_str("srkw = [\"southern resident\", \"  \"]\n").unwrap();
        assert_eq!(tables.blank_category(), Some("srkw"));

        let tables = KeywordTables::from_toml_str("kpod = [\"\"]\nbiggs = [\"\"]\n").unwrap();
        assert_eq!(tables.blank_category(), Some("kpod"), "categories are checked in column order");
    }

    #[test]
    fn test_unknown_keyword_category_is_rejected() {
        let result = KeywordTables::from_toml_str("humpback = [\"Big Mama\"]\n");
        assert!(result.is_err(), "unknown categories should not be silently ignored");
    }
}
