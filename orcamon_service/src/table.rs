//! CSV persistence for sighting tables.
//!
//! Input tables are read by header name, so column order and extra columns
//! do not matter. Output tables are written with an explicit header even
//! when they have no rows, and overwrite any existing file.

use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};

use crate::model::{
    AnnotatedSighting, SIGHTING_COLUMNS, Sighting, TableError, annotated_header,
};

fn io_error(path: &Path, err: impl std::fmt::Display) -> TableError {
    TableError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

fn csv_error(path: &Path, err: impl std::fmt::Display) -> TableError {
    TableError::Csv {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Reads sightings from any CSV source. `label` names the source in errors.
pub fn read_sightings_from<R: Read>(reader: R, label: &Path) -> Result<Vec<Sighting>, TableError> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers = rdr.headers().map_err(|e| csv_error(label, e))?.clone();
    for column in SIGHTING_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(TableError::MissingColumn {
                path: label.display().to_string(),
                column: column.to_string(),
            });
        }
    }

    rdr.deserialize::<Sighting>()
        .map(|row| row.map_err(|e| csv_error(label, e)))
        .collect()
}

/// Reads a sightings CSV file.
pub fn read_sightings(path: &Path) -> Result<Vec<Sighting>, TableError> {
    let file = File::open(path).map_err(|e| io_error(path, e))?;
    read_sightings_from(file, path)
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Writes `header` followed by `rows` to `path`, creating the parent
/// directory if needed.
pub fn write_rows<I>(path: &Path, header: &[&str], rows: I) -> Result<(), TableError>
where
    I: IntoIterator<Item = Vec<String>>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
    }

    let file = File::create(path).map_err(|e| io_error(path, e))?;
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(file);

    wtr.write_record(header).map_err(|e| csv_error(path, e))?;
    for row in rows {
        wtr.write_record(&row).map_err(|e| csv_error(path, e))?;
    }
    wtr.flush().map_err(|e| io_error(path, e))
}

/// Writes a projected sightings table.
pub fn write_sightings(path: &Path, sightings: &[Sighting]) -> Result<(), TableError> {
    write_rows(path, &SIGHTING_COLUMNS, sightings.iter().map(Sighting::to_record))
}

/// Writes an annotated table (full table or a yearly extract).
pub fn write_annotated(path: &Path, rows: &[AnnotatedSighting]) -> Result<(), TableError> {
    write_rows(path, &annotated_header(), rows.iter().map(AnnotatedSighting::to_record))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
