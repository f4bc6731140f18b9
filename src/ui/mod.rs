//! User interface module - console rendering of run progress and results.
//!
//! The run is non-interactive; everything here is formatting.

pub mod formatter;

pub use formatter::{
    display_error, display_plan, display_result, display_status, display_success,
    display_warning, format_plan,
};
