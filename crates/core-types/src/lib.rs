//! # Tally Core Types
//!
//! The Layer 0 data model shared by every other crate: tabular record sets,
//! the column bindings that give their columns meaning, and date selectors.

pub mod binding;
pub mod dates;
pub mod enums;
pub mod error;
pub mod record;

// Re-export the core types to provide a clean public API.
pub use binding::ColumnBinding;
pub use dates::{parse_date, parse_timestamp, DateSelector};
pub use enums::{ColumnRole, RangeOrder};
pub use error::CoreError;
pub use record::{Record, RecordSet, Value};
