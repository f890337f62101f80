//! Deduplication and per-year southern resident extracts.
//!
//! # Clock injection
//! `year_extracts` takes `current_year` as a parameter rather than reading
//! the clock, so extract ranges are deterministic in tests. The binary
//! passes the local calendar year.

use std::collections::HashSet;

use crate::model::AnnotatedSighting;

/// First year covered by the dashboard extracts.
pub const DEFAULT_FIRST_YEAR: i32 = 2018;

/// Southern resident sightings for one calendar year.
#[derive(Debug, Clone, PartialEq)]
pub struct YearExtract {
    pub year: i32,
    pub rows: Vec<AnnotatedSighting>,
}

impl YearExtract {
    /// Output file name, e.g. "srkw_2022.csv".
    pub fn file_name(&self) -> String {
        format!("srkw_{}.csv", self.year)
    }
}

/// Drops rows whose rendered output is identical to an earlier row.
/// Keeps the first occurrence and preserves order.
pub fn dedup_rows(rows: Vec<AnnotatedSighting>) -> Vec<AnnotatedSighting> {
    let mut seen: HashSet<Vec<String>> = HashSet::with_capacity(rows.len());
    rows.into_iter()
        .filter(|row| seen.insert(row.to_record()))
        .collect()
}

/// Builds one extract per year in `first_year..=current_year`, each holding
/// the deduplicated rows of that year with `srkw == 1`.
///
/// Years with no matching rows still get an (empty) extract. If
/// `first_year > current_year` the result is empty.
pub fn year_extracts(
    rows: &[AnnotatedSighting],
    first_year: i32,
    current_year: i32,
) -> Vec<YearExtract> {
    (first_year..=current_year)
        .map(|year| {
            let selected = rows
                .iter()
                .filter(|row| row.date.year == year && row.tags.srkw() == 1)
                .cloned()
                .collect();
            YearExtract {
                year,
                rows: dedup_rows(selected),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
