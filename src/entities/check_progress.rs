use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::SheetRecord;
use super::check_chart::ChartType;
use crate::record_store::Sheet;
use crate::record_store::client::compose_key;
use crate::utils::cells::{cell, format_bool, non_empty, parse_bool, parse_int};
use crate::utils::ids::parse_student_id;

/// A completed check-chart task. No row means not completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckProgress {
    pub student_id: i64,
    pub chart_type: ChartType,
    pub task_id: String,
    pub completed: bool,
    pub completed_date: Option<String>,
    pub completed_by: Option<String>,
    pub points: i64,
}

impl SheetRecord for CheckProgress {
    const SHEET: Sheet = Sheet::StudentCheckProgress;
    const KEY_COLUMNS: &'static [usize] = &[0, 1, 2];

    fn key(&self) -> String {
        compose_key(&[
            &self.student_id.to_string(),
            self.chart_type.as_str(),
            &self.task_id,
        ])
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.student_id.to_string(),
            self.chart_type.as_str().to_string(),
            self.task_id.clone(),
            format_bool(self.completed),
            self.completed_date.clone().unwrap_or_default(),
            self.completed_by.clone().unwrap_or_default(),
            self.points.to_string(),
        ]
    }

    fn from_row(row: &[String]) -> Option<Self> {
        Some(CheckProgress {
            student_id: parse_student_id(cell(row, 0))?,
            chart_type: ChartType::parse(cell(row, 1))?,
            task_id: non_empty(cell(row, 2))?,
            completed: parse_bool(cell(row, 3)),
            completed_date: non_empty(cell(row, 4)),
            completed_by: non_empty(cell(row, 5)),
            points: parse_int(cell(row, 6)),
        })
    }
}
