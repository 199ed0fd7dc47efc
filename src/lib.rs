//! Fixed-offset menstrual cycle phase calculator.
//!
//! [`calculate`] splits one cycle into menstruation, the two fertile
//! sub-windows, ovulation and the luteal phase, and forecasts the next
//! period. [`metadata`] holds the display table, [`views`] derives chart and
//! calendar data, and [`commands`] wraps it all for form handling.

pub mod commands;
pub mod config;
pub mod logging;
pub mod metadata;
pub mod models;
pub mod prediction;
pub mod views;

pub use commands::CycleState;
pub use config::AppConfig;
pub use metadata::{lookup, PhaseMetadata};
pub use models::*;
pub use prediction::{
    calculate, calculate_from_str, calculate_full_model, parse_start_date, CycleError,
    LengthPolicy, MAX_CYCLE_LENGTH, MIN_CYCLE_LENGTH,
};
