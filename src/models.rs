use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use time::OffsetDateTime;

/// A positional marker read from a survey photo.
///
/// Parsed once from the raw OCR/fallback string; ordering and rendering
/// pattern-match on the variant instead of re-parsing text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marker {
    /// Bare number, e.g. "5" or "27".
    Numeric(u32),
    /// Letter A-J paired with 1-2 digits, e.g. "A41", "B11". The printed
    /// digit count is kept so "A09" renders and orders as written.
    LetterPaired {
        letter: char,
        number: u8,
        digits: usize,
    },
    /// Anything that matched no known shape; kept verbatim for logs.
    Unrecognized(String),
}

impl Marker {
    /// Classify a raw marker string.
    pub fn parse(raw: &str) -> Marker {
        if !raw.is_empty() && raw.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(n) = raw.parse::<u32>() {
                return Marker::Numeric(n);
            }
        }
        let mut chars = raw.chars();
        if let Some(first) = chars.next() {
            let rest: String = chars.collect();
            if first.is_ascii_uppercase()
                && (1..=2).contains(&rest.len())
                && rest.chars().all(|c| c.is_ascii_digit())
            {
                if let Ok(n) = rest.parse::<u8>() {
                    return Marker::LetterPaired {
                        letter: first,
                        number: n,
                        digits: rest.len(),
                    };
                }
            }
        }
        Marker::Unrecognized(raw.to_string())
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Marker::Numeric(n) => write!(f, "{}", n),
            Marker::LetterPaired {
                letter,
                number,
                digits,
            } => write!(f, "{}{:0width$}", letter, number, width = *digits),
            Marker::Unrecognized(raw) => f.write_str(raw),
        }
    }
}

impl Serialize for Marker {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One uploaded photo with the marker found in it.
#[derive(Debug, Clone, Serialize)]
pub struct DetectedImage {
    pub filename: String,
    pub filepath: PathBuf,
    pub marker: Marker,
}

/// Severity tag for run-state log entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
    Success,
}

impl LogLevel {
    fn tag(self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Success => "SUCCESS",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: LogLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Processing,
}

/// Mutable state shared by every pipeline stage within one run.
///
/// Passed explicitly into each operation; values written by a stage stay
/// visible until that stage runs again. There is no run-id isolation.
#[derive(Debug, Serialize)]
pub struct RunState {
    pub phase: Phase,
    pub logs: Vec<LogEntry>,
    pub images_loaded: usize,
    pub images_total: usize,
    pub detected: Vec<DetectedImage>,
    pub flower_count: usize,
    /// Mirror log entries to stdout as they are appended.
    #[serde(skip)]
    pub echo: bool,
}

impl RunState {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            logs: Vec::new(),
            images_loaded: 0,
            images_total: 0,
            detected: Vec::new(),
            flower_count: 0,
            echo: false,
        }
    }

    pub fn with_echo() -> Self {
        let mut state = Self::new();
        state.echo = true;
        state
    }

    /// Append a log entry; best-effort, never fails.
    pub fn log(&mut self, level: LogLevel, message: impl Into<String>) {
        let message = message.into();
        if self.echo {
            println!("[{}] {}", level.tag(), message);
        }
        self.logs.push(LogEntry {
            timestamp: timestamp(),
            level,
            message,
        });
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

fn timestamp() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    time::format_description::parse("[hour]:[minute]:[second]")
        .ok()
        .and_then(|fmt| now.format(&fmt).ok())
        .unwrap_or_default()
}
