//! Display model implementations for table and JSON output
//!
//! Display models transform domain types into CLI-friendly formats
//! with appropriate column names and serialization.

mod cache;
mod calendar;
mod label;
mod record;
mod search;

// Re-export all display types used by CLI commands
pub use cache::{EntryDisplay, PartitionDisplay, format_size};
pub use calendar::CalendarDayDisplay;
pub use label::LabelDisplay;
pub use record::RecordDisplay;
pub use search::{SearchHitDisplay, snippet};
