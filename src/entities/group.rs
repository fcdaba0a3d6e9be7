use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::SheetRecord;
use crate::record_store::Sheet;
use crate::utils::cells::{cell, non_empty};
use crate::utils::ids::normalize_id;

/// A house.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    pub color: String,
    pub description: String,
    pub created_at: Option<String>,
}

pub const DEFAULT_GROUP_COLOR: &str = "#808080";

pub fn is_hex_color(value: &str) -> bool {
    let Some(hex) = value.strip_prefix('#') else {
        return false;
    };
    matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
}

impl SheetRecord for Group {
    const SHEET: Sheet = Sheet::Groups;
    const KEY_COLUMNS: &'static [usize] = &[0];

    fn key(&self) -> String {
        normalize_id(&self.id)
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.color.clone(),
            self.description.clone(),
            self.created_at.clone().unwrap_or_default(),
        ]
    }

    fn from_row(row: &[String]) -> Option<Self> {
        let id = non_empty(cell(row, 0)).map(|id| normalize_id(&id))?;
        Some(Group {
            id,
            name: cell(row, 1).trim().to_string(),
            color: non_empty(cell(row, 2)).unwrap_or_else(|| DEFAULT_GROUP_COLOR.to_string()),
            description: cell(row, 3).to_string(),
            created_at: non_empty(cell(row, 4)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors_are_validated() {
        assert!(is_hex_color("#FF0000"));
        assert!(is_hex_color("#f00"));
        assert!(!is_hex_color("FF0000"));
        assert!(!is_hex_color("#GG0000"));
    }

    #[test]
    fn cleared_rows_do_not_parse() {
        assert!(Group::from_row(&[]).is_none());
        let group = Group::from_row(&["2.0".to_string(), "Blue".to_string()]).unwrap();
        assert_eq!(group.id, "2");
        assert_eq!(group.color, DEFAULT_GROUP_COLOR);
    }
}
