/// Acartia Sightings API Client
///
/// Retrieves community-reported marine mammal sightings from the Acartia
/// data cooperative, projects them to the columns the annotator uses and
/// archives them as a dated CSV.
///
/// Endpoint: https://acartia.io/api/v1/sightings/
/// Auth: `Authorization: Bearer <token>`

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use crate::logging::{self, Source};
use crate::model::{FetchError, Sighting};
use crate::table;

pub const ACARTIA_SIGHTINGS_URL: &str = "https://acartia.io/api/v1/sightings/";

// ============================================================================
// API Response Structures
// ============================================================================

/// One sighting as returned by the API.
///
/// Only the retained attributes are declared; everything else in the
/// response (profile, photo_url, signature, ...) is ignored. Numeric
/// attributes are taken as raw JSON values because the feed is not
/// consistent about quoting them.
#[derive(Debug, Clone, Deserialize)]
pub struct AcartiaRecord {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub created: Option<String>,
    pub latitude: Option<Value>,
    pub longitude: Option<Value>,
    pub no_sighted: Option<Value>,
    pub data_source_id: Option<Value>,
    pub data_source_comments: Option<String>,
}

fn value_as_f64(value: &Option<Value>) -> Option<f64> {
    match value.as_ref()? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn value_as_count(value: &Option<Value>) -> Option<u32> {
    let n = value_as_f64(value)?;
    if n.fract() == 0.0 && n >= 0.0 && n <= u32::MAX as f64 {
        Some(n as u32)
    } else {
        None
    }
}

fn value_as_text(value: &Option<Value>) -> Option<String> {
    match value.as_ref()? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

impl AcartiaRecord {
    /// Projects the record to the retained sighting columns.
    pub fn to_sighting(&self) -> Sighting {
        Sighting {
            kind: self.kind.clone(),
            created: self.created.clone(),
            latitude: value_as_f64(&self.latitude),
            longitude: value_as_f64(&self.longitude),
            no_sighted: value_as_count(&self.no_sighted),
            data_source_id: value_as_text(&self.data_source_id),
            data_source_comments: self.data_source_comments.clone(),
        }
    }
}

// ============================================================================
// API Client Functions
// ============================================================================

/// Builds the blocking HTTP client used for feed requests.
pub fn build_client(timeout_secs: u64) -> Result<reqwest::blocking::Client, FetchError> {
    reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| FetchError::Transport(e.to_string()))
}

/// Parses a feed response body (a JSON array of sighting objects).
pub fn parse_feed(body: &str) -> Result<Vec<AcartiaRecord>, FetchError> {
    serde_json::from_str(body).map_err(|e| FetchError::ParseError(e.to_string()))
}

/// Fetch every sighting from the feed
///
/// # Parameters
/// - `client`: HTTP client
/// - `url`: feed endpoint
/// - `token`: bearer credential
pub fn fetch_sightings(
    client: &reqwest::blocking::Client,
    url: &str,
    token: &str,
) -> Result<Vec<AcartiaRecord>, FetchError> {
    let response = client
        .get(url)
        .bearer_auth(token)
        .header("Content-Type", "application/json")
        .send()
        .map_err(|e| FetchError::Transport(e.to_string()))?;

    if !response.status().is_success() {
        return Err(FetchError::HttpError(response.status().as_u16()));
    }

    let body = response
        .text()
        .map_err(|e| FetchError::Transport(e.to_string()))?;
    parse_feed(&body)
}

// ============================================================================
// Feed Preparation
// ============================================================================

/// Projects records, drops fully identical rows (keeping the first) and
/// sorts by `created` ascending. Rows without `created` sort last.
pub fn prepare_feed(records: &[AcartiaRecord]) -> Vec<Sighting> {
    let mut seen = std::collections::HashSet::new();
    let mut sightings: Vec<Sighting> = records
        .iter()
        .map(AcartiaRecord::to_sighting)
        .filter(|s| seen.insert(s.to_record()))
        .collect();

    sightings.sort_by(|a, b| match (&a.created, &b.created) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    sightings
}

/// File name of the archived feed for a run day.
pub fn feed_file_name(day: NaiveDate) -> String {
    format!("acartia_{}.csv", day.format("%Y-%m-%d"))
}

/// Fetches the feed and archives it in `out_dir`. Returns the CSV path.
pub fn run_fetch(
    client: &reqwest::blocking::Client,
    url: &str,
    token: &str,
    out_dir: &Path,
    day: NaiveDate,
) -> Result<PathBuf, FetchError> {
    let records = fetch_sightings(client, url, token).inspect_err(|e| {
        logging::log_fetch_failure("Sightings fetch", e);
    })?;
    let sightings = prepare_feed(&records);

    let path = out_dir.join(feed_file_name(day));
    table::write_sightings(&path, &sightings)?;

    logging::info(
        Source::Acartia,
        None,
        &format!(
            "Fetched {} records, archived {} sightings to {}",
            records.len(),
            sightings.len(),
            path.display()
        ),
    );
    Ok(path)
}

// ============================================================================
// Tests
// ============================================================================
