use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::entities::{ChartType, CheckChart, CheckProgress, Stage};
use crate::services::check_chart::{StudentChartSummary, StudentProgress};
use crate::utils::ids::{de_loose_id, de_loose_id_opt};

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ChartTypeQuery {
    /// `honors` (default) or `nonhonors`
    #[serde(rename = "type")]
    pub chart_type: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckChartResponse {
    pub success: bool,
    pub chart: CheckChart,
    pub total_tasks: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceChartRequest {
    pub stages: Vec<Stage>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceChartResponse {
    pub success: bool,
    pub chart_type: ChartType,
    pub tasks_written: usize,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ProgressQuery {
    #[serde(default, deserialize_with = "de_loose_id_opt")]
    pub student_id: Option<String>,
    pub chart_type: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentProgressResponse {
    pub success: bool,
    pub progress: StudentProgress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChartProgressResponse {
    pub success: bool,
    pub chart_type: ChartType,
    pub progress: Vec<CheckProgress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetProgressRequest {
    #[serde(deserialize_with = "de_loose_id")]
    #[schema(value_type = String, example = "7")]
    pub student_id: String,

    #[schema(example = "h-k1")]
    pub task_id: String,

    #[schema(example = "honors")]
    pub chart_type: Option<String>,

    #[serde(default = "default_completed")]
    pub completed: bool,

    pub admin_email: Option<String>,
}

fn default_completed() -> bool {
    true
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RemoveProgressRequest {
    #[serde(deserialize_with = "de_loose_id")]
    #[schema(value_type = String, example = "7")]
    pub student_id: String,

    pub task_id: String,
    pub chart_type: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgressChangeResponse {
    pub success: bool,
    pub student_id: i64,
    pub task_id: String,
    pub completed: bool,
    pub points_awarded: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_points: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummaryResponse {
    pub success: bool,
    pub students: Vec<StudentChartSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}
