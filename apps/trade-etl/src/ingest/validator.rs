//! Line-level validation of raw trade records.
//!
//! A line is `day,instrument_id,price,volume`. Extra trailing fields are
//! ignored, fewer than four is a rejection. Every field is parsed even after
//! an earlier one fails so that a single diagnostic pass reports all
//! problems on the line. Rejections are logged and never escalate.

use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use super::record::{InstrumentId, TradeDay, TradeRecord};

/// Field delimiter of the input format.
pub const FIELD_DELIMITER: char = ',';

/// Number of fields a record must carry.
pub const REQUIRED_FIELDS: usize = 4;

/// The fields of a raw record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordField {
    /// Trading day.
    Day,
    /// Instrument identifier.
    Id,
    /// Trade price.
    Price,
    /// Traded volume.
    Volume,
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Day => write!(f, "day"),
            Self::Id => write!(f, "id"),
            Self::Price => write!(f, "price"),
            Self::Volume => write!(f, "volume"),
        }
    }
}

/// Why a record was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    /// The line has fewer than [`REQUIRED_FIELDS`] fields.
    #[error("expected {REQUIRED_FIELDS} fields, found {found}")]
    FieldCount {
        /// Fields present on the line.
        found: usize,
    },

    /// The line is not valid UTF-8.
    #[error("line is not valid UTF-8 after byte {valid_up_to}")]
    Encoding {
        /// Length of the valid UTF-8 prefix.
        valid_up_to: usize,
    },

    /// A field did not parse.
    #[error("invalid {field} \"{value}\"")]
    InvalidField {
        /// The offending field.
        field: RecordField,
        /// Raw (trimmed) value.
        value: String,
    },
}

/// Where a raw line came from, for diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct SourceLocation<'a> {
    /// Input file.
    pub file: &'a Path,
    /// 1-based line number.
    pub line: u64,
}

/// Result of validating one raw line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    /// All four fields parsed.
    Accepted(TradeRecord),
    /// The line was empty after trimming. Not a record, not a rejection.
    Blank,
    /// At least one problem; the record is dropped.
    Rejected(Vec<RejectReason>),
}

impl LineOutcome {
    /// The accepted record, if any.
    #[must_use]
    pub fn accepted(self) -> Option<TradeRecord> {
        match self {
            Self::Accepted(record) => Some(record),
            Self::Blank | Self::Rejected(_) => None,
        }
    }

    /// Whether the line was rejected.
    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

#[allow(clippy::expect_used)] // Regex is compile-time constant; expect() is safe here
fn day_regex() -> &'static Regex {
    static DAY_REGEX: OnceLock<Regex> = OnceLock::new();
    DAY_REGEX.get_or_init(|| {
        Regex::new(r"^([0-9]{4})-([0-9]{1,2})-([0-9]{1,2})").expect("day regex is valid")
    })
}

/// Parse a lenient `YYYY-M-D` day into its canonical form.
///
/// Only the leading date pattern is considered, matching is lexical and
/// month 13 or day 32 are accepted.
#[must_use]
pub fn parse_day(raw: &str) -> Option<TradeDay> {
    let caps = day_regex().captures(raw)?;
    let year = caps.get(1)?.as_str();
    let month = caps.get(2)?.as_str().parse::<u32>().ok()?;
    let day = caps.get(3)?.as_str().parse::<u32>().ok()?;
    Some(TradeDay::from_parts(year, month, day))
}

/// Stateless record validator.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordValidator;

impl RecordValidator {
    /// Create a validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validate one raw line, logging a warning for every rejected field.
    pub fn validate(&self, raw: &str, location: SourceLocation<'_>) -> LineOutcome {
        let outcome = Self::classify(raw);
        log_rejection(&outcome, raw, location);
        outcome
    }

    /// Validate one undecoded line. Invalid UTF-8 is a rejection, not an
    /// error.
    pub fn validate_bytes(&self, raw: &[u8], location: SourceLocation<'_>) -> LineOutcome {
        match std::str::from_utf8(raw) {
            Ok(line) => self.validate(line, location),
            Err(e) => {
                let outcome = LineOutcome::Rejected(vec![RejectReason::Encoding {
                    valid_up_to: e.valid_up_to(),
                }]);
                log_rejection(&outcome, &String::from_utf8_lossy(raw), location);
                outcome
            }
        }
    }

    /// Validate one raw line without emitting diagnostics.
    #[must_use]
    pub fn classify(raw: &str) -> LineOutcome {
        let row = raw.trim();
        if row.is_empty() {
            return LineOutcome::Blank;
        }

        let fields: Vec<&str> = row.split(FIELD_DELIMITER).map(str::trim).collect();
        if fields.len() < REQUIRED_FIELDS {
            return LineOutcome::Rejected(vec![RejectReason::FieldCount {
                found: fields.len(),
            }]);
        }

        let mut reasons = Vec::new();
        let day = parse_day(fields[0]);
        if day.is_none() {
            reasons.push(invalid(RecordField::Day, fields[0]));
        }
        let id = fields[1].parse::<InstrumentId>().ok();
        if id.is_none() {
            reasons.push(invalid(RecordField::Id, fields[1]));
        }
        let price = fields[2].parse::<f64>().ok();
        if price.is_none() {
            reasons.push(invalid(RecordField::Price, fields[2]));
        }
        let volume = fields[3].parse::<i64>().ok();
        if volume.is_none() {
            reasons.push(invalid(RecordField::Volume, fields[3]));
        }

        match (day, id, price, volume) {
            (Some(day), Some(id), Some(price), Some(volume)) => {
                LineOutcome::Accepted(TradeRecord::new(day, id, price, volume))
            }
            _ => LineOutcome::Rejected(reasons),
        }
    }
}

fn log_rejection(outcome: &LineOutcome, raw: &str, location: SourceLocation<'_>) {
    let LineOutcome::Rejected(reasons) = outcome else {
        return;
    };
    for reason in reasons {
        match reason {
            RejectReason::FieldCount { found } => warn!(
                file = %location.file.display(),
                line = location.line,
                found,
                row = raw.trim(),
                "Invalid row"
            ),
            RejectReason::Encoding { valid_up_to } => warn!(
                file = %location.file.display(),
                line = location.line,
                valid_up_to,
                row = raw.trim(),
                "Invalid encoding"
            ),
            RejectReason::InvalidField { field, value } => warn!(
                file = %location.file.display(),
                line = location.line,
                field = %field,
                value = %value,
                "Invalid field"
            ),
        }
    }
}

fn invalid(field: RecordField, value: &str) -> RejectReason {
    RejectReason::InvalidField {
        field,
        value: value.to_string(),
    }
}
