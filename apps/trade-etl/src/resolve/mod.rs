//! Post-ingestion indexing: day order and first prices.

mod day_index;
mod first_price;

pub use day_index::DayIndex;
pub use first_price::{FirstPrices, resolve_first_price};
