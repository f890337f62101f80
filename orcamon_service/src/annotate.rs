//! The annotation pipeline.
//!
//! Reads one sightings table, drops rows without a `created` timestamp,
//! sorts by `created`, decomposes dates, classifies comments, removes
//! duplicate rows and splits southern resident sightings into yearly
//! extracts. Each run recomputes everything from the input and overwrites
//! previous outputs.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;

use crate::analysis::classify::classify;
use crate::analysis::dates::decompose;
use crate::analysis::partition::{YearExtract, dedup_rows, year_extracts};
use crate::keywords::KeywordTables;
use crate::logging::{self, Source};
use crate::model::{AnnotateError, AnnotatedSighting, Sighting};
use crate::table;

/// What to do with a row whose `created` value cannot be decomposed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampPolicy {
    /// Abort the run.
    #[default]
    Fail,
    /// Log the row and leave it out of every output.
    Skip,
}

/// Parameters of one annotation run.
#[derive(Debug, Clone)]
pub struct AnnotateOptions {
    pub tables: KeywordTables,
    pub first_year: i32,
    /// Last extract year; normally the current calendar year.
    pub current_year: i32,
    pub on_bad_timestamp: TimestampPolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotateStats {
    pub read: usize,
    pub dropped_no_timestamp: usize,
    pub skipped_bad_timestamp: usize,
    pub duplicates_removed: usize,
    pub written: usize,
}

/// In-memory result of annotating a table.
#[derive(Debug, Clone)]
pub struct Annotation {
    pub rows: Vec<AnnotatedSighting>,
    pub extracts: Vec<YearExtract>,
    pub stats: AnnotateStats,
}

// ---------------------------------------------------------------------------
// Pure pipeline
// ---------------------------------------------------------------------------

/// Annotates a table of sightings.
///
/// Rows keep their input position (1-based) for error reporting through
/// the sort. With `TimestampPolicy::Fail` the first bad timestamp in
/// sorted order aborts the run.
pub fn annotate(sightings: Vec<Sighting>, options: &AnnotateOptions) -> Result<Annotation, AnnotateError> {
    let mut stats = AnnotateStats {
        read: sightings.len(),
        ..Default::default()
    };

    let mut dated: Vec<(usize, Sighting)> = sightings
        .into_iter()
        .enumerate()
        .filter(|(_, s)| s.created.is_some())
        .map(|(i, s)| (i + 1, s))
        .collect();
    stats.dropped_no_timestamp = stats.read - dated.len();

    // Stable, so equal timestamps keep input order.
    dated.sort_by(|(_, a), (_, b)| a.created.cmp(&b.created));

    let mut rows = Vec::with_capacity(dated.len());
    for (row_number, mut sighting) in dated {
        let raw = sighting.created.clone().unwrap_or_default();
        let date = match decompose(&raw) {
            Ok(date) => date,
            Err(reason) => match options.on_bad_timestamp {
                TimestampPolicy::Fail => {
                    return Err(AnnotateError::BadTimestamp { row: row_number, value: raw });
                }
                TimestampPolicy::Skip => {
                    let record = format!("row {}", row_number);
                    logging::warn(Source::Annotator, Some(&record), &reason);
                    stats.skipped_bad_timestamp += 1;
                    continue;
                }
            },
        };

        let tags = classify(
            sighting.data_source_comments.as_deref(),
            sighting.kind.as_deref(),
            &options.tables,
        );
        sighting.created = Some(date.normalized.clone());
        rows.push(AnnotatedSighting { sighting, date, tags });
    }

    let annotated = rows.len();
    let rows = dedup_rows(rows);
    stats.duplicates_removed = annotated - rows.len();
    stats.written = rows.len();

    let extracts = year_extracts(&rows, options.first_year, options.current_year);

    Ok(Annotation { rows, extracts, stats })
}

// ---------------------------------------------------------------------------
// File pipeline
// ---------------------------------------------------------------------------

/// File name of the full annotated table for a run day.
pub fn annotated_file_name(day: NaiveDate) -> String {
    format!("acartia_annotated_{}.csv", day.format("%Y-%m-%d"))
}

/// Files written by `run_annotate`.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotateOutputs {
    pub annotated: PathBuf,
    pub extracts: Vec<PathBuf>,
    pub stats: AnnotateStats,
}

/// Reads `input`, annotates it and writes the full table plus one extract
/// per year into `out_dir`.
pub fn run_annotate(
    input: &Path,
    out_dir: &Path,
    day: NaiveDate,
    options: &AnnotateOptions,
) -> Result<AnnotateOutputs, AnnotateError> {
    logging::info(
        Source::Annotator,
        None,
        &format!("Annotating {}", input.display()),
    );
    let sightings = table::read_sightings(input)?;
    let annotation = annotate(sightings, options)?;

    let annotated = out_dir.join(annotated_file_name(day));
    table::write_annotated(&annotated, &annotation.rows)?;

    let mut extracts = Vec::with_capacity(annotation.extracts.len());
    for extract in &annotation.extracts {
        let path = out_dir.join(extract.file_name());
        table::write_annotated(&path, &extract.rows)?;
        logging::debug(
            Source::Annotator,
            None,
            &format!("{}: {} sightings", path.display(), extract.rows.len()),
        );
        extracts.push(path);
    }

    let extract_sizes: Vec<(i32, usize)> = annotation
        .extracts
        .iter()
        .map(|extract| (extract.year, extract.rows.len()))
        .collect();
    let stats = annotation.stats;
    logging::log_annotate_summary(
        stats.read,
        stats.dropped_no_timestamp,
        stats.skipped_bad_timestamp,
        stats.written,
        &extract_sizes,
    );

    Ok(AnnotateOutputs { annotated, extracts, stats })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
