//! Utility functions for string formatting.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{format_date, format_minutes, truncate_string};
