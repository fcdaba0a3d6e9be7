use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{PlatformCounts, PlatformHandles, Profile, Student};
use crate::services::profiles::ProfileChanges;
use crate::services::students::{NewStudent, StudentChanges};
use crate::services::sync_queue::SyncReport;
use crate::utils::ids::{de_id_change, de_loose_id, de_loose_id_opt};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddStudentRequest {
    #[serde(default)]
    #[schema(example = "Ada")]
    pub first_name: String,

    #[serde(default)]
    #[schema(example = "Lovelace")]
    pub last_name: String,

    #[schema(example = "ada.lovelace@alpha.school")]
    pub email: Option<String>,

    pub password: Option<String>,

    #[schema(example = false)]
    pub honors: Option<bool>,

    #[serde(default, deserialize_with = "de_loose_id_opt")]
    #[schema(example = "1")]
    pub group_id: Option<String>,
}

impl From<AddStudentRequest> for NewStudent {
    fn from(req: AddStudentRequest) -> Self {
        NewStudent {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            password: req.password,
            honors: req.honors,
            group_id: req.group_id,
        }
    }
}

/// Student and profile fields; anything omitted is left as is.
/// `groupId: null` or `""` removes the student from their house.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStudentRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub honors: Option<bool>,

    #[serde(default, deserialize_with = "de_id_change")]
    #[schema(value_type = Option<String>)]
    pub group_id: Option<Option<String>>,

    pub points: Option<i64>,
    pub daily_goal: Option<String>,
    pub session_goal: Option<String>,
    pub project_oneliner: Option<String>,
    pub goals: Option<PlatformCounts>,
    pub platforms: Option<PlatformHandles>,
}

impl UpdateStudentRequest {
    pub fn split(self) -> (StudentChanges, ProfileChanges) {
        (
            StudentChanges {
                first_name: self.first_name,
                last_name: self.last_name,
                email: self.email,
                password: self.password,
                honors: self.honors,
                group_id: self.group_id,
                points: self.points,
            },
            ProfileChanges {
                daily_goal: self.daily_goal,
                session_goal: self.session_goal,
                project_oneliner: self.project_oneliner,
                goals: self.goals,
                platforms: self.platforms,
            },
        )
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssignmentRequest {
    #[serde(deserialize_with = "de_loose_id")]
    #[schema(value_type = String, example = "7")]
    pub student_id: String,

    #[serde(default, deserialize_with = "de_id_change")]
    #[schema(value_type = Option<String>, example = "2")]
    pub group_id: Option<Option<String>>,

    pub honors: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentListResponse {
    pub success: bool,
    pub students: Vec<Student>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentResponse {
    pub success: bool,
    pub student: Student,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentDetailResponse {
    pub success: bool,
    pub student: Student,
    pub profile: Profile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetSessionResponse {
    pub success: bool,
    pub cleared: usize,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub success: bool,
    pub report: SyncReport,
    pub remaining: usize,
}
