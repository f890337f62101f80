/// Sighting analysis for the orca dashboard.
///
/// Everything here is pure: no I/O and no clock reads.
///
/// Submodules:
/// - `dates` — normalizes feed timestamps and decomposes them into calendar fields.
/// - `classify` — derives pod, ecotype and direction flags from one record.
/// - `partition` — deduplicates annotated rows and splits them into yearly extracts.

pub mod classify;
pub mod dates;
pub mod partition;
