//! Calendar day display model

use serde::Serialize;
use tabled::Tabled;

use crate::search::LabelCount;

/// One day of a month that has entries
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct CalendarDayDisplay {
    #[tabled(rename = "DATE")]
    pub date: String,

    #[tabled(rename = "ENTRIES")]
    pub entries: usize,

    /// Per-type counts, e.g. `PP x2, DL`
    #[tabled(rename = "TYPES")]
    #[serde(skip)]
    pub types: String,

    #[tabled(skip)]
    #[serde(rename = "types")]
    pub type_counts: Vec<LabelCount>,
}

impl CalendarDayDisplay {
    pub fn new(date: String, entries: usize, type_counts: Vec<LabelCount>) -> Self {
        let types = type_counts
            .iter()
            .map(|c| {
                if c.count > 1 {
                    format!("{} x{}", c.label, c.count)
                } else {
                    c.label.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            date,
            entries,
            types,
            type_counts,
        }
    }
}
