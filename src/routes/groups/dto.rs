use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::Group;
use crate::services::groups::GroupChanges;
use crate::utils::ids::{de_loose_id, de_loose_id_list};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupRequest {
    #[serde(default)]
    #[schema(example = "Red House")]
    pub name: String,

    #[schema(example = "#FF0000")]
    pub color: Option<String>,

    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGroupRequest {
    #[serde(deserialize_with = "de_loose_id")]
    #[schema(value_type = String, example = "1")]
    pub id: String,

    pub name: Option<String>,
    pub color: Option<String>,
    pub description: Option<String>,
}

impl UpdateGroupRequest {
    pub fn changes(&self) -> GroupChanges {
        GroupChanges {
            name: self.name.clone(),
            color: self.color.clone(),
            description: self.description.clone(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteGroupRequest {
    #[serde(deserialize_with = "de_loose_id")]
    #[schema(value_type = String, example = "1")]
    pub id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignStudentsRequest {
    #[serde(deserialize_with = "de_loose_id")]
    #[schema(value_type = String, example = "1")]
    pub group_id: String,

    #[serde(default, deserialize_with = "de_loose_id_list")]
    #[schema(value_type = Vec<String>, example = json!(["1", "2"]))]
    pub student_ids: Vec<String>,

    #[serde(default = "default_action")]
    #[schema(example = "assign")]
    pub action: String,
}

fn default_action() -> String {
    "assign".to_string()
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupListResponse {
    pub success: bool,
    pub groups: Vec<Group>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupResponse {
    pub success: bool,
    pub group: Group,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteGroupResponse {
    pub success: bool,
    pub id: String,
    /// Students that were members and are now unassigned
    pub unassigned_count: usize,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignStudentsResponse {
    pub success: bool,
    pub updated_count: usize,
    pub errors: Vec<String>,
}
