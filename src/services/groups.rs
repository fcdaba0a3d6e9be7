use crate::entities::Group;
use crate::entities::group::{DEFAULT_GROUP_COLOR, is_hex_color};
use crate::error::ApiError;
use crate::fallback::defaults::demo_groups;
use crate::state::AppState;
use crate::utils::ids::{ids_match, normalize_id};

use super::resolution::{Resolved, resolve_list};

#[derive(Debug, Clone, Default)]
pub struct GroupChanges {
    pub name: Option<String>,
    pub color: Option<String>,
    pub description: Option<String>,
}

fn validate_color(color: &str) -> Result<String, ApiError> {
    let color = color.trim();
    if is_hex_color(color) {
        Ok(color.to_uppercase())
    } else {
        Err(ApiError::BadRequest(format!(
            "Invalid color {}, expected #RRGGBB",
            color
        )))
    }
}

pub struct GroupService<'a> {
    state: &'a AppState,
}

impl<'a> GroupService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    pub async fn list(&self) -> Resolved<Vec<Group>> {
        resolve_list("groups", self.state.groups().find_all().await, demo_groups)
    }

    pub async fn create(&self, name: &str, color: Option<&str>, description: Option<&str>) -> Result<Group, ApiError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::BadRequest("name is required".to_string()));
        }
        let color = match color.filter(|c| !c.trim().is_empty()) {
            Some(color) => validate_color(color)?,
            None => DEFAULT_GROUP_COLOR.to_string(),
        };
        self.state.store.initialize().await?;

        let repo = self.state.groups();
        let group = Group {
            id: repo.next_id().await?,
            name: name.to_string(),
            color,
            description: description.unwrap_or_default().trim().to_string(),
            created_at: Some(self.state.timestamp()),
        };
        repo.create(&group).await?;
        tracing::info!("Created group {} ({})", group.id, group.name);
        Ok(group)
    }

    pub async fn update(&self, group_id: &str, changes: GroupChanges) -> Result<Group, ApiError> {
        self.state.store.initialize().await?;
        let group_id = normalize_id(group_id);
        let repo = self.state.groups();
        let mut group = repo
            .find_by_id(&group_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Group {} not found", group_id)))?;

        if let Some(name) = changes.name.filter(|n| !n.trim().is_empty()) {
            group.name = name.trim().to_string();
        }
        if let Some(color) = changes.color.filter(|c| !c.trim().is_empty()) {
            group.color = validate_color(&color)?;
        }
        if let Some(description) = changes.description {
            group.description = description.trim().to_string();
        }

        repo.update(&group).await?;
        Ok(group)
    }

    /// Clears the group row and takes every member out of it, so a later
    /// group given the same id starts empty. Returns the id and how many
    /// students were released.
    pub async fn delete(&self, group_id: &str) -> Result<(String, usize), ApiError> {
        self.state.store.initialize().await?;
        let group_id = normalize_id(group_id);
        if !self.state.groups().delete(&group_id).await? {
            return Err(ApiError::NotFound(format!("Group {} not found", group_id)));
        }

        let students = self.state.students();
        let mut released = 0;
        for mut student in students.find_all().await? {
            if !student.group_id.as_deref().is_some_and(|g| ids_match(g, &group_id)) {
                continue;
            }
            student.group_id = None;
            students.update(&student).await?;
            released += 1;
        }
        tracing::info!("Deleted group {}, released {} students", group_id, released);
        Ok((group_id, released))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors_are_validated_and_uppercased() {
        assert_eq!(validate_color(" #ff0000 ").unwrap(), "#FF0000");
        assert!(matches!(validate_color("red"), Err(ApiError::BadRequest(_))));
    }
}
