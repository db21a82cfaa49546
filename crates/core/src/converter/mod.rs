//! Per-unit conversion contract.
//!
//! [`UnitConverter::convert`] turns one [`ConversionUnit`](crate::discovery::ConversionUnit)
//! into exactly one [`ConversionOutcome`]. Every failure is folded into the
//! outcome, so a bad unit never escapes as an error.

mod error;
mod types;
mod unit;

pub use error::ConversionError;
pub use types::{ConversionOutcome, OutcomeStatus};
pub use unit::UnitConverter;
