use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::SheetRecord;
use crate::record_store::Sheet;
use crate::utils::cells::{cell, format_bool, non_empty, parse_bool, parse_int};
use crate::utils::ids::{normalize_id, parse_student_id};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StudentStatus {
    Active,
    Deleted,
}

impl StudentStatus {
    fn from_cell(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("deleted") {
            StudentStatus::Deleted
        } else {
            StudentStatus::Active
        }
    }

    fn to_cell(self) -> String {
        match self {
            StudentStatus::Active => "Active".to_string(),
            StudentStatus::Deleted => "Deleted".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub honors: bool,
    pub group_id: Option<String>,
    pub status: StudentStatus,
    pub points: i64,
    pub created_at: Option<String>,
    #[serde(skip)]
    pub password: String,
}

/// `firstname.lastname@alpha.school`, lowercase, whitespace dropped.
pub fn default_email(first_name: &str, last_name: &str) -> String {
    let clean = |s: &str| s.split_whitespace().collect::<String>().to_lowercase();
    format!("{}.{}@alpha.school", clean(first_name), clean(last_name))
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn is_active(&self) -> bool {
        self.status == StudentStatus::Active
    }
}

mod col {
    pub const ID: usize = 0;
    pub const FIRST_NAME: usize = 1;
    pub const LAST_NAME: usize = 2;
    pub const EMAIL: usize = 3;
    pub const PASSWORD: usize = 4;
    pub const HONORS: usize = 5;
    pub const GROUP_ID: usize = 6;
    pub const STATUS: usize = 7;
    pub const POINTS: usize = 8;
    pub const CREATED_AT: usize = 9;
}

impl SheetRecord for Student {
    const SHEET: Sheet = Sheet::Students;
    const KEY_COLUMNS: &'static [usize] = &[col::ID];

    fn key(&self) -> String {
        self.id.to_string()
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.first_name.clone(),
            self.last_name.clone(),
            self.email.clone(),
            self.password.clone(),
            format_bool(self.honors),
            self.group_id.clone().unwrap_or_default(),
            self.status.to_cell(),
            self.points.to_string(),
            self.created_at.clone().unwrap_or_default(),
        ]
    }

    fn from_row(row: &[String]) -> Option<Self> {
        let id = parse_student_id(cell(row, col::ID))?;
        let first_name = cell(row, col::FIRST_NAME).trim().to_string();
        let last_name = cell(row, col::LAST_NAME).trim().to_string();
        let email = non_empty(cell(row, col::EMAIL))
            .map(|e| e.to_lowercase())
            .unwrap_or_else(|| default_email(&first_name, &last_name));

        Some(Student {
            id,
            email,
            password: cell(row, col::PASSWORD).to_string(),
            honors: parse_bool(cell(row, col::HONORS)),
            group_id: non_empty(cell(row, col::GROUP_ID)).map(|g| normalize_id(&g)),
            status: StudentStatus::from_cell(cell(row, col::STATUS)),
            points: parse_int(cell(row, col::POINTS)),
            created_at: non_empty(cell(row, col::CREATED_AT)),
            first_name,
            last_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn default_email_is_lowercase_dotted() {
        assert_eq!(default_email("Ada", "Lovelace"), "ada.lovelace@alpha.school");
        assert_eq!(default_email("Mary Ann", "Evans"), "maryann.evans@alpha.school");
    }

    #[test]
    fn sparse_rows_fill_defaults() {
        let student = Student::from_row(&row(&["3.0", "Grace", "Hopper"])).unwrap();
        assert_eq!(student.id, 3);
        assert_eq!(student.email, "grace.hopper@alpha.school");
        assert!(!student.honors);
        assert_eq!(student.group_id, None);
        assert!(student.is_active());
        assert_eq!(student.points, 0);
    }

    #[test]
    fn deleted_status_and_loose_cells_parse() {
        let student = Student::from_row(&row(&[
            "4", "Alan", "Turing", "", "", "true", "2.0", "Deleted", "35",
        ]))
        .unwrap();
        assert!(student.honors);
        assert_eq!(student.group_id.as_deref(), Some("2"));
        assert_eq!(student.status, StudentStatus::Deleted);
        assert_eq!(student.points, 35);
    }

    #[test]
    fn blank_rows_are_skipped() {
        assert!(Student::from_row(&[]).is_none());
        assert!(Student::from_row(&row(&["", "Nobody"])).is_none());
    }
}
