use crate::config::PASSWORD_HASH_COST;
use crate::entities::student::default_email;
use crate::entities::{Student, StudentStatus};
use crate::error::ApiError;
use crate::fallback::defaults::demo_students;
use crate::state::AppState;
use crate::utils::ids::{ids_match, normalize_id, parse_student_id};

use super::resolution::{Resolved, resolve_list};

#[derive(Debug, Clone, Default)]
pub struct NewStudent {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub password: Option<String>,
    pub honors: Option<bool>,
    pub group_id: Option<String>,
}

/// Fields left as `None` are not touched. `group_id: Some(None)` unassigns.
#[derive(Debug, Clone, Default)]
pub struct StudentChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub honors: Option<bool>,
    pub group_id: Option<Option<String>>,
    pub points: Option<i64>,
}

impl StudentChanges {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.honors.is_none()
            && self.group_id.is_none()
            && self.points.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignAction {
    Assign,
    Unassign,
}

impl AssignAction {
    pub fn parse(value: &str) -> Option<AssignAction> {
        match value.trim().to_ascii_lowercase().as_str() {
            "assign" => Some(AssignAction::Assign),
            "unassign" => Some(AssignAction::Unassign),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignOutcome {
    pub updated_count: usize,
    pub errors: Vec<String>,
}

pub fn hash_password(password: &str) -> Result<String, ApiError> {
    bcrypt::hash(password, PASSWORD_HASH_COST)
        .map_err(|e| ApiError::Internal(format!("Failed to hash password: {}", e)))
}

/// Stored passwords are bcrypt hashes; rows imported by hand may hold plain
/// text, and a blank cell means the configured default password.
pub fn verify_password(candidate: &str, stored: &str, default_password: &str) -> bool {
    if stored.is_empty() {
        return candidate == default_password;
    }
    if stored.starts_with("$2") {
        return bcrypt::verify(candidate, stored).unwrap_or(false);
    }
    candidate == stored
}

pub struct StudentService<'a> {
    state: &'a AppState,
}

impl<'a> StudentService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Identity writes have no fallback tier, so they need a live store.
    async fn require_store(&self) -> Result<(), ApiError> {
        self.state.store.initialize().await.map_err(ApiError::from)
    }

    /// Every student, deleted rows included.
    pub async fn all(&self) -> Resolved<Vec<Student>> {
        resolve_list("students", self.state.students().find_all().await, demo_students)
    }

    pub async fn list_active(&self) -> Resolved<Vec<Student>> {
        self.all()
            .await
            .map(|students| students.into_iter().filter(Student::is_active).collect())
    }

    pub async fn get(&self, student_id: i64) -> Resolved<Student> {
        self.all()
            .await
            .and_then(|students| students.into_iter().find(|s| s.id == student_id))
    }

    async fn ensure_group_exists(&self, group_id: &str) -> Result<String, ApiError> {
        let group_id = normalize_id(group_id);
        match self.state.groups().find_by_id(&group_id).await? {
            Some(_) => Ok(group_id),
            None => Err(ApiError::BadRequest(format!(
                "Group {} does not exist",
                group_id
            ))),
        }
    }

    pub async fn add(&self, new: NewStudent) -> Result<Student, ApiError> {
        let first_name = new.first_name.trim().to_string();
        let last_name = new.last_name.trim().to_string();
        if first_name.is_empty() || last_name.is_empty() {
            return Err(ApiError::BadRequest(
                "firstName and lastName are required".to_string(),
            ));
        }
        self.require_store().await?;

        let group_id = match new.group_id.filter(|g| !g.trim().is_empty()) {
            Some(group_id) => Some(self.ensure_group_exists(&group_id).await?),
            None => None,
        };
        let email = new
            .email
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| default_email(&first_name, &last_name));

        let repo = self.state.students();
        if repo.find_by_email(&email).await?.is_some() {
            return Err(ApiError::BadRequest(format!(
                "A student with email {} already exists",
                email
            )));
        }

        let password = new
            .password
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| self.state.config.default_student_password.clone());

        let student = Student {
            id: repo.next_id().await?,
            first_name,
            last_name,
            email,
            honors: new.honors.unwrap_or(false),
            group_id,
            status: StudentStatus::Active,
            points: 0,
            created_at: Some(self.state.timestamp()),
            password: hash_password(&password)?,
        };
        repo.create(&student).await?;
        self.state
            .profiles()
            .upsert(&crate::entities::Profile::empty(student.id))
            .await?;

        tracing::info!("Added student {} ({})", student.id, student.email);
        Ok(student)
    }

    async fn find_existing(&self, student_id: i64) -> Result<Student, ApiError> {
        self.require_store().await?;
        self.state
            .students()
            .find_by_id(student_id)
            .await?
            .filter(Student::is_active)
            .ok_or_else(|| ApiError::NotFound(format!("Student {} not found", student_id)))
    }

    pub async fn update(&self, student_id: i64, changes: StudentChanges) -> Result<Student, ApiError> {
        let mut student = self.find_existing(student_id).await?;

        if let Some(first_name) = changes.first_name.filter(|n| !n.trim().is_empty()) {
            student.first_name = first_name.trim().to_string();
        }
        if let Some(last_name) = changes.last_name.filter(|n| !n.trim().is_empty()) {
            student.last_name = last_name.trim().to_string();
        }
        if let Some(email) = changes.email.filter(|e| !e.trim().is_empty()) {
            student.email = email.trim().to_lowercase();
        }
        if let Some(password) = changes.password.filter(|p| !p.is_empty()) {
            student.password = hash_password(&password)?;
        }
        if let Some(honors) = changes.honors {
            student.honors = honors;
        }
        if let Some(points) = changes.points {
            student.points = points;
        }
        if let Some(group_id) = changes.group_id {
            student.group_id = match group_id.filter(|g| !g.trim().is_empty()) {
                Some(group_id) => Some(self.ensure_group_exists(&group_id).await?),
                None => None,
            };
        }

        if !self.state.students().update(&student).await? {
            return Err(ApiError::NotFound(format!("Student {} not found", student_id)));
        }
        Ok(student)
    }

    pub async fn delete(&self, student_id: i64) -> Result<Student, ApiError> {
        self.find_existing(student_id).await?;
        let student = self
            .state
            .students()
            .soft_delete(student_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Student {} not found", student_id)))?;
        tracing::info!("Student {} marked deleted", student_id);
        Ok(student)
    }

    pub async fn assign(
        &self,
        group_id: &str,
        student_ids: &[String],
        action: AssignAction,
    ) -> Result<AssignOutcome, ApiError> {
        self.require_store().await?;
        let group_id = self.ensure_group_exists(group_id).await?;
        let repo = self.state.students();
        let mut outcome = AssignOutcome::default();

        for raw_id in student_ids {
            let Some(student_id) = parse_student_id(raw_id) else {
                outcome.errors.push(format!("Invalid student id {}", raw_id));
                continue;
            };
            let mut student = match repo.find_by_id(student_id).await {
                Ok(Some(student)) if student.is_active() => student,
                Ok(_) => {
                    outcome.errors.push(format!("Student {} not found", student_id));
                    continue;
                }
                Err(e) => {
                    outcome.errors.push(format!("Student {}: {}", student_id, e));
                    continue;
                }
            };

            student.group_id = match action {
                AssignAction::Assign => Some(group_id.clone()),
                AssignAction::Unassign => {
                    let member = student
                        .group_id
                        .as_deref()
                        .is_some_and(|g| ids_match(g, &group_id));
                    if !member {
                        outcome
                            .errors
                            .push(format!("Student {} is not in group {}", student_id, group_id));
                        continue;
                    }
                    None
                }
            };
            match repo.update(&student).await {
                Ok(true) => outcome.updated_count += 1,
                Ok(false) => outcome.errors.push(format!("Student {} not found", student_id)),
                Err(e) => outcome.errors.push(format!("Student {}: {}", student_id, e)),
            }
        }

        tracing::info!(
            "{:?} {} students to group {}, {} errors",
            action,
            outcome.updated_count,
            group_id,
            outcome.errors.len()
        );
        Ok(outcome)
    }

    /// Looks up an active student by email and checks the password. Falls back
    /// to the demo roster, with the default password, when the store is down.
    pub async fn authenticate(&self, email: &str, password: &str) -> Resolved<Student> {
        let email = email.trim().to_lowercase();
        let default_password = &self.state.config.default_student_password;

        self.list_active().await.and_then(|students| {
            students
                .into_iter()
                .find(|s| s.email == email)
                .filter(|s| verify_password(password, &s.password, default_password))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passwords_verify_against_hash_plain_or_default() {
        let hash = bcrypt::hash("s3cret", 4).unwrap();
        assert!(verify_password("s3cret", &hash, "password"));
        assert!(!verify_password("wrong", &hash, "password"));
        assert!(verify_password("legacy", "legacy", "password"));
        assert!(verify_password("password", "", "password"));
        assert!(!verify_password("", "", "password"));
    }

    #[test]
    fn assign_actions_parse() {
        assert_eq!(AssignAction::parse("Assign"), Some(AssignAction::Assign));
        assert_eq!(AssignAction::parse("unassign"), Some(AssignAction::Unassign));
        assert_eq!(AssignAction::parse("move"), None);
    }
}
