//! Dense, backfilled report output.
//!
//! Every report has a `date,stk_001,...,stk_NNN` header and one row per day
//! of the [`DayIndex`](crate::resolve::DayIndex), ascending.
//!
//! | File | Cell |
//! |------|------|
//! | `PRICE.csv` | last known average price, backfilled, 2 dp |
//! | `GAINS.csv` | gain since first trade, 2 dp, 0 if never traded |
//! | `VOLUME.csv` | summed volume that day, 0 if untraded |

mod tracker;
mod writer;

pub use tracker::{PriceTracker, gain};
pub use writer::{
    PeriodGains, PriceGainsError, ReportInputs, ReportWriter, column_name, format_cell,
    header_row, write_price_and_gains, write_volume,
};

/// Price report file name.
pub const PRICE_FILE: &str = "PRICE.csv";

/// Gains report file name.
pub const GAINS_FILE: &str = "GAINS.csv";

/// Volume report file name.
pub const VOLUME_FILE: &str = "VOLUME.csv";

/// All report file names. Never treated as input.
pub const REPORT_FILE_NAMES: [&str; 3] = [PRICE_FILE, VOLUME_FILE, GAINS_FILE];
