//! Tag and type usage display model

use serde::Serialize;
use tabled::Tabled;

use crate::palette::type_colors;
use crate::search::LabelCount;

#[derive(Debug, Clone, Tabled, Serialize)]
pub struct LabelDisplay {
    /// `tag` or `type`
    #[tabled(rename = "KIND")]
    pub kind: String,

    #[tabled(rename = "NAME")]
    pub name: String,

    #[tabled(rename = "ENTRIES")]
    pub count: usize,

    /// Palette family for types, empty for tags
    #[tabled(rename = "COLOR")]
    pub color: String,
}

impl LabelDisplay {
    pub fn tag(count: &LabelCount) -> Self {
        Self {
            kind: "tag".to_string(),
            name: count.label.clone(),
            count: count.count,
            color: String::new(),
        }
    }

    pub fn record_type(count: &LabelCount) -> Self {
        Self {
            kind: "type".to_string(),
            name: count.label.clone(),
            count: count.count,
            color: type_colors(Some(&count.label)).family().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_rows_carry_palette_family() {
        let count = LabelCount {
            label: "PP".to_string(),
            count: 3,
        };
        let display = LabelDisplay::record_type(&count);
        assert_eq!(display.kind, "type");
        assert_eq!(display.color, type_colors(Some("PP")).family());
        assert!(LabelDisplay::tag(&count).color.is_empty());
    }
}
