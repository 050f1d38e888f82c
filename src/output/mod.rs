//! Report presentation.
//!
//! Numeric serialization stays with the caller (the report types derive
//! serde); this module only renders the human-readable summary.

mod terminal;

pub use terminal::format_report;
