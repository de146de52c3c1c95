//! Display models for CLI output
//!
//! This module provides shared display model abstractions for converting
//! records, search hits and cache entries into CLI-friendly display formats.

pub mod display;

pub use display::{
    CalendarDayDisplay, EntryDisplay, LabelDisplay, PartitionDisplay, RecordDisplay,
    SearchHitDisplay,
};
