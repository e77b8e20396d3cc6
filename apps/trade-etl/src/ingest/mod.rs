//! Input side of the pipeline: record validation and batched file reading.

mod discovery;
mod reader;
mod record;
mod validator;

pub use discovery::{is_report_file, resolve_inputs};
pub use reader::{BatchReader, DEFAULT_BATCH_SIZE};
pub use record::{InstrumentId, TradeDay, TradeRecord};
pub use validator::{
    FIELD_DELIMITER, LineOutcome, REQUIRED_FIELDS, RecordField, RecordValidator, RejectReason,
    SourceLocation, parse_day,
};
