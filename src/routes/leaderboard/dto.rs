use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::services::leaderboard::{HouseStanding, LeaderboardType, Period, StudentStanding};
use crate::utils::ids::de_loose_id_opt;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardQuery {
    /// `daily` (default) or `brainlift`
    #[serde(rename = "type")]
    pub board: Option<String>,
    /// `today`, `week` (default), `month` or `all`
    pub period: Option<String>,
    /// Restrict to one house
    #[serde(default, deserialize_with = "de_loose_id_opt")]
    pub group_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardResponse {
    pub success: bool,
    #[serde(rename = "type")]
    pub board: LeaderboardType,
    pub period: Period,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    pub to: String,
    pub houses: Vec<HouseStanding>,
    pub students: Vec<StudentStanding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}
