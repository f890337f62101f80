/// Sighting, AnnotatedSighting, TagFlags, TableError, AnnotateError, FetchError
/// core data structures and error handling
///
/// Core data types for the orca sighting annotation service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no classification logic and no I/O, only types and their
/// row rendering.

use chrono::NaiveTime;
use serde::{Deserialize, Deserializer};

// ---------------------------------------------------------------------------
// Column layout
// ---------------------------------------------------------------------------

/// Columns retained from the sightings feed, in output order.
pub const SIGHTING_COLUMNS: [&str; 7] = [
    "type",
    "created",
    "latitude",
    "longitude",
    "no_sighted",
    "data_source_id",
    "data_source_comments",
];

/// Columns appended by the annotator, in output order.
pub const DERIVED_COLUMNS: [&str; 25] = [
    "month_number",
    "day",
    "year",
    "month_abbrev",
    "date",
    "date_ymd",
    "time",
    "J",
    "K",
    "L",
    "sum_jkl",
    "srkw_generic",
    "srkw_type",
    "srkw",
    "biggs",
    "sum_srkw_biggs",
    "south",
    "southeast",
    "southwest",
    "north",
    "northeast",
    "northwest",
    "east",
    "west",
    "dir_sum",
];

/// Full header of an annotated table.
pub fn annotated_header() -> Vec<&'static str> {
    SIGHTING_COLUMNS
        .iter()
        .chain(DERIVED_COLUMNS.iter())
        .copied()
        .collect()
}

// ---------------------------------------------------------------------------
// Sighting
// ---------------------------------------------------------------------------

/// One row of the sightings feed after projection to the retained columns.
///
/// Every field is optional because the feed (and the CSV written from it)
/// may leave any cell empty.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Sighting {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub created: Option<String>, // ISO-like, e.g. "2022-07-04T13:05:22.123Z"
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(deserialize_with = "deserialize_count")]
    pub no_sighted: Option<u32>,
    pub data_source_id: Option<String>,
    pub data_source_comments: Option<String>,
}

impl Sighting {
    /// Renders the row in `SIGHTING_COLUMNS` order. Missing values become
    /// empty cells.
    pub fn to_record(&self) -> Vec<String> {
        vec![
            text_cell(&self.kind),
            text_cell(&self.created),
            display_cell(&self.latitude),
            display_cell(&self.longitude),
            display_cell(&self.no_sighted),
            text_cell(&self.data_source_id),
            text_cell(&self.data_source_comments),
        ]
    }
}

fn text_cell(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn display_cell<T: std::fmt::Display>(value: &Option<T>) -> String {
    value.as_ref().map(|v| v.to_string()).unwrap_or_default()
}

/// Accepts counts written either as integers ("3") or as whole floats
/// ("3.0"), which is how a count column with gaps round-trips through
/// most dataframe tools.
fn deserialize_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let value: f64 = trimmed
        .parse()
        .map_err(|_| serde::de::Error::custom(format!("invalid count: {:?}", raw)))?;
    if value.fract() != 0.0 || value < 0.0 || value > u32::MAX as f64 {
        return Err(serde::de::Error::custom(format!("invalid count: {:?}", raw)));
    }
    Ok(Some(value as u32))
}

// ---------------------------------------------------------------------------
// Derived date fields
// ---------------------------------------------------------------------------

/// Calendar fields decomposed from a normalized `created` timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct DateParts {
    /// The normalized timestamp, e.g. "2022-07-04 13:05:22".
    pub normalized: String,
    pub year: i32,
    pub month_number: u32,
    pub day: u32,
    pub month_abbrev: &'static str, // "Jan" .. "Dec"
    pub time: NaiveTime,
}

impl DateParts {
    /// Display date, e.g. "Jul-4".
    pub fn date_label(&self) -> String {
        format!("{}-{}", self.month_abbrev, self.day)
    }

    /// Display date, e.g. "2022-7-4".
    pub fn date_ymd(&self) -> String {
        format!("{}-{}-{}", self.year, self.month_number, self.day)
    }
}

// ---------------------------------------------------------------------------
// Tag flags
// ---------------------------------------------------------------------------

/// Compass directions tracked in sighting comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    South,
    Southeast,
    Southwest,
    North,
    Northeast,
    Northwest,
    East,
    West,
}

impl Direction {
    /// All directions in output column order.
    pub const ALL: [Direction; 8] = [
        Direction::South,
        Direction::Southeast,
        Direction::Southwest,
        Direction::North,
        Direction::Northeast,
        Direction::Northwest,
        Direction::East,
        Direction::West,
    ];

    pub fn column(self) -> &'static str {
        match self {
            Direction::South => "south",
            Direction::Southeast => "southeast",
            Direction::Southwest => "southwest",
            Direction::North => "north",
            Direction::Northeast => "northeast",
            Direction::Northwest => "northwest",
            Direction::East => "east",
            Direction::West => "west",
        }
    }
}

/// One 0/1 flag per direction. Flags are independent; a comment may set
/// several at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectionFlags {
    pub south: u8,
    pub southeast: u8,
    pub southwest: u8,
    pub north: u8,
    pub northeast: u8,
    pub northwest: u8,
    pub east: u8,
    pub west: u8,
}

impl DirectionFlags {
    pub fn get(&self, direction: Direction) -> u8 {
        match direction {
            Direction::South => self.south,
            Direction::Southeast => self.southeast,
            Direction::Southwest => self.southwest,
            Direction::North => self.north,
            Direction::Northeast => self.northeast,
            Direction::Northwest => self.northwest,
            Direction::East => self.east,
            Direction::West => self.west,
        }
    }

    pub fn set(&mut self, direction: Direction, value: u8) {
        let slot = match direction {
            Direction::South => &mut self.south,
            Direction::Southeast => &mut self.southeast,
            Direction::Southwest => &mut self.southwest,
            Direction::North => &mut self.north,
            Direction::Northeast => &mut self.northeast,
            Direction::Northwest => &mut self.northwest,
            Direction::East => &mut self.east,
            Direction::West => &mut self.west,
        };
        *slot = value;
    }

    /// `dir_sum`: number of direction flags set (0..=8).
    pub fn sum(&self) -> u8 {
        Direction::ALL.iter().map(|d| self.get(*d)).sum()
    }
}

/// Per-record classification result.
///
/// The summary indicators (`sum_jkl`, `srkw`, `sum_srkw_biggs`, `dir_sum`)
/// are computed from the stored flags rather than stored, so they can never
/// disagree with them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagFlags {
    pub j: u8,
    pub k: u8,
    pub l: u8,
    pub srkw_generic: u8,
    pub srkw_type: u8,
    pub biggs: u8,
    pub directions: DirectionFlags,
}

impl TagFlags {
    /// J + K + L. Not capped: a comment naming several pods scores above 1.
    pub fn sum_jkl(&self) -> u8 {
        self.j + self.k + self.l
    }

    /// Southern resident indicator: max of the pod, generic and type flags.
    pub fn srkw(&self) -> u8 {
        [self.j, self.k, self.l, self.srkw_generic, self.srkw_type]
            .into_iter()
            .max()
            .unwrap_or(0)
    }

    pub fn sum_srkw_biggs(&self) -> u8 {
        self.srkw() + self.biggs
    }

    pub fn dir_sum(&self) -> u8 {
        self.directions.sum()
    }
}

// ---------------------------------------------------------------------------
// Annotated sighting
// ---------------------------------------------------------------------------

/// A sighting with its decomposed date and classification flags.
///
/// `sighting.created` holds the normalized timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedSighting {
    pub sighting: Sighting,
    pub date: DateParts,
    pub tags: TagFlags,
}

impl AnnotatedSighting {
    /// Renders the row in `annotated_header()` order.
    pub fn to_record(&self) -> Vec<String> {
        let d = &self.date;
        let t = &self.tags;
        let mut record = self.sighting.to_record();
        record.extend([
            d.month_number.to_string(),
            d.day.to_string(),
            d.year.to_string(),
            d.month_abbrev.to_string(),
            d.date_label(),
            d.date_ymd(),
            d.time.format("%H:%M:%S").to_string(),
            t.j.to_string(),
            t.k.to_string(),
            t.l.to_string(),
            t.sum_jkl().to_string(),
            t.srkw_generic.to_string(),
            t.srkw_type.to_string(),
            t.srkw().to_string(),
            t.biggs.to_string(),
            t.sum_srkw_biggs().to_string(),
        ]);
        record.extend(Direction::ALL.iter().map(|dir| t.directions.get(*dir).to_string()));
        record.push(t.dir_sum().to_string());
        record
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise reading or writing a CSV table.
#[derive(Debug, PartialEq)]
pub enum TableError {
    /// A file could not be opened, created or flushed.
    Io { path: String, message: String },
    /// A CSV file could not be parsed or written.
    Csv { path: String, message: String },
    /// The input header lacks a required column.
    MissingColumn { path: String, column: String },
}

impl std::fmt::Display for TableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableError::Io { path, message } => write!(f, "I/O error on {}: {}", path, message),
            TableError::Csv { path, message } => write!(f, "CSV error in {}: {}", path, message),
            TableError::MissingColumn { path, column } => {
                write!(f, "Missing column {:?} in {}", column, path)
            }
        }
    }
}

impl std::error::Error for TableError {}

/// Errors that can arise while annotating a sightings table.
#[derive(Debug, PartialEq)]
pub enum AnnotateError {
    /// The input or an output table failed.
    Table(TableError),
    /// A non-null `created` value could not be decomposed into a date.
    /// `row` is the 1-based data row in the input file.
    BadTimestamp { row: usize, value: String },
}

impl std::fmt::Display for AnnotateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnnotateError::Table(err) => write!(f, "{}", err),
            AnnotateError::BadTimestamp { row, value } => {
                write!(f, "Unparseable timestamp in row {}: {:?}", row, value)
            }
        }
    }
}

impl std::error::Error for AnnotateError {}

impl From<TableError> for AnnotateError {
    fn from(err: TableError) -> Self {
        AnnotateError::Table(err)
    }
}

/// Errors that can arise when fetching the sightings feed.
#[derive(Debug, PartialEq)]
pub enum FetchError {
    /// The bearer credential is not set; carries the variable name.
    MissingToken(String),
    /// Non-2xx HTTP response from the sightings API.
    HttpError(u16),
    /// The request could not be sent or the body could not be read.
    Transport(String),
    /// The response body could not be deserialized.
    ParseError(String),
    /// The fetched feed could not be saved.
    Table(TableError),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::MissingToken(var) => write!(f, "Missing API token: {} is not set", var),
            FetchError::HttpError(code) => write!(f, "HTTP error: {}", code),
            FetchError::Transport(msg) => write!(f, "Transport error: {}", msg),
            FetchError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            FetchError::Table(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<TableError> for FetchError {
    fn from(err: TableError) -> Self {
        FetchError::Table(err)
    }
}
