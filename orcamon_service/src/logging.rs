/// Structured logging for the orca sighting service
///
/// Provides context-rich logging with source and record identifiers,
/// timestamps, and severity levels. Supports both console output
/// and file-based logging for scheduled runs.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Log Sources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Sightings feed fetch
    Acartia,
    /// Annotation pipeline
    Annotator,
    /// Configuration and credentials
    Config,
    System,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Acartia => write!(f, "ACARTIA"),
            Source::Annotator => write!(f, "ANNOT"),
            Source::Config => write!(f, "CFG"),
            Source::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - e.g. the feed is temporarily empty
    Expected,
    /// Unexpected failure - credentials, service degradation or an API change
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console_timestamps,
        };

        if let Ok(mut slot) = LOGGER.lock() {
            *slot = Some(logger);
        }
    }

    fn format_entry(level: LogLevel, source: Source, record_id: Option<&str>, message: &str) -> String {
        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        let record_part = record_id.map(|r| format!(" [{}]", r)).unwrap_or_default();
        format!("{} {} {}{}: {}", timestamp, level, source, record_part, message)
    }

    fn log(&self, level: LogLevel, source: Source, record_id: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let log_entry = Self::format_entry(level, source, record_id, message);
        let record_part = record_id.map(|r| format!(" [{}]", r)).unwrap_or_default();

        // Console output
        if self.console_timestamps {
            match level {
                LogLevel::Error => eprintln!("{}", log_entry),
                LogLevel::Warning => eprintln!("   {}", log_entry),
                LogLevel::Info => println!("   {}", message),
                LogLevel::Debug => println!("   [DEBUG] {}", message),
            }
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", source, record_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", source, record_part, message),
                LogLevel::Info => println!("   {}", message),
                LogLevel::Debug => {} // Skip debug in non-timestamp mode
            }
        }

        // File output
        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

fn emit(level: LogLevel, source: Source, record_id: Option<&str>, message: &str) {
    if let Ok(guard) = LOGGER.lock() {
        if let Some(logger) = guard.as_ref() {
            logger.log(level, source, record_id, message);
        }
    }
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    Logger::init(min_level, log_file.map(String::from), console_timestamps);
}

/// Log a general informational message
pub fn info(source: Source, record_id: Option<&str>, message: &str) {
    emit(LogLevel::Info, source, record_id, message);
}

/// Log a warning message
pub fn warn(source: Source, record_id: Option<&str>, message: &str) {
    emit(LogLevel::Warning, source, record_id, message);
}

/// Log an error message
pub fn error(source: Source, record_id: Option<&str>, message: &str) {
    emit(LogLevel::Error, source, record_id, message);
}

/// Log a debug message
pub fn debug(source: Source, record_id: Option<&str>, message: &str) {
    emit(LogLevel::Debug, source, record_id, message);
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify a sightings feed failure from its error message
pub fn classify_fetch_failure(error_message: &str) -> FailureType {
    // Rejected or missing credentials never fix themselves between runs
    if error_message.contains("HTTP error: 401")
        || error_message.contains("HTTP error: 403")
        || error_message.contains("Missing API token")
    {
        FailureType::Unexpected
    }
    // Server-side errors and timeouts indicate service degradation
    else if error_message.contains("HTTP error: 5") || error_message.contains("timed out") {
        FailureType::Unexpected
    }
    // Parse errors suggest an API change
    else if error_message.contains("Parse error") {
        FailureType::Unexpected
    }
    // The feed answers 404 while it has no sightings to serve
    else if error_message.contains("HTTP error: 404") {
        FailureType::Expected
    }
    else {
        FailureType::Unknown
    }
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Log a sightings feed failure with automatic classification
pub fn log_fetch_failure(operation: &str, err: &dyn std::error::Error) {
    let error_msg = err.to_string();
    let failure_type = classify_fetch_failure(&error_msg);

    let message = format!("{} failed [{}]: {}", operation, failure_type, error_msg);

    match failure_type {
        FailureType::Expected => debug(Source::Acartia, None, &message),
        FailureType::Unexpected => error(Source::Acartia, None, &message),
        FailureType::Unknown => warn(Source::Acartia, None, &message),
    }
}

// ---------------------------------------------------------------------------
// Run Summary Logging
// ---------------------------------------------------------------------------

fn format_annotate_summary(
    read: usize,
    dropped: usize,
    skipped: usize,
    written: usize,
    extract_sizes: &[(i32, usize)],
) -> String {
    let mut message = format!(
        "Annotation complete: {} rows read, {} without timestamp, {} skipped, {} written",
        read, dropped, skipped, written
    );
    if !extract_sizes.is_empty() {
        let sizes: Vec<String> = extract_sizes
            .iter()
            .map(|(year, rows)| format!("{}={}", year, rows))
            .collect();
        message.push_str(&format!("; SRKW extracts {}", sizes.join(" ")));
    }
    message
}

/// Log a summary of one annotation run, with the row count of each
/// yearly extract as `(year, rows)`
pub fn log_annotate_summary(
    read: usize,
    dropped: usize,
    skipped: usize,
    written: usize,
    extract_sizes: &[(i32, usize)],
) {
    let message = format_annotate_summary(read, dropped, skipped, written, extract_sizes);

    if skipped == 0 {
        info(Source::Annotator, None, &message);
    } else {
        warn(Source::Annotator, None, &message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn test_failure_classification() {
        let auth_error = "HTTP error: 401";
        assert_eq!(classify_fetch_failure(auth_error), FailureType::Unexpected);

        let server_error = "HTTP error: 503";
        assert_eq!(classify_fetch_failure(server_error), FailureType::Unexpected);

        let not_found = "HTTP error: 404";
        assert_eq!(classify_fetch_failure(not_found), FailureType::Expected);

        let bad_request = "HTTP error: 400";
        assert_eq!(classify_fetch_failure(bad_request), FailureType::Unknown);

        let schema_change = "Parse error: invalid type: map, expected a sequence";
        assert_eq!(classify_fetch_failure(schema_change), FailureType::Unexpected);
    }

    #[test]
    fn test_annotate_summary_lists_extract_sizes() {
        let message = format_annotate_summary(10, 1, 0, 8, &[(2018, 0), (2019, 3), (2020, 2)]);
        assert_eq!(
            message,
            "Annotation complete: 10 rows read, 1 without timestamp, 0 skipped, 8 written; \
             SRKW extracts 2018=0 2019=3 2020=2"
        );

        let message = format_annotate_summary(0, 0, 0, 0, &[]);
        assert!(!message.contains("extracts"), "no extract clause without extracts: {:?}", message);
    }

    #[test]
    fn test_entry_format_includes_source_and_record() {
        let entry = Logger::format_entry(LogLevel::Warning, Source::Annotator, Some("row 7"), "bad timestamp");
        assert!(entry.ends_with("WARN ANNOT [row 7]: bad timestamp"), "got {:?}", entry);

        let entry = Logger::format_entry(LogLevel::Info, Source::Acartia, None, "fetched 12 sightings");
        assert!(entry.ends_with("INFO ACARTIA: fetched 12 sightings"), "got {:?}", entry);
    }

    #[test]
    fn test_file_logging_appends_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orcamon.log");
        let path_str = path.to_str().unwrap();

        Logger::append_to_file(path_str, "first").unwrap();
        Logger::append_to_file(path_str, "second").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "first\nsecond\n");
    }
}
