use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{PlatformCounts, PlatformHandles, Profile};
use crate::services::profiles::ProfileChanges;

/// Fields a student may change on their own profile. The session goal is
/// set by admins through the student endpoints.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[schema(example = "Finish the parser chapter")]
    pub daily_goal: Option<String>,
    pub project_oneliner: Option<String>,
    pub goals: Option<PlatformCounts>,
    pub platforms: Option<PlatformHandles>,
}

impl From<UpdateProfileRequest> for ProfileChanges {
    fn from(req: UpdateProfileRequest) -> Self {
        ProfileChanges {
            daily_goal: req.daily_goal,
            session_goal: None,
            project_oneliner: req.project_oneliner,
            goals: req.goals,
            platforms: req.platforms,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub success: bool,
    pub profile: Profile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}
