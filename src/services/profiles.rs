use crate::entities::{PlatformCounts, PlatformHandles, Profile};
use crate::error::ApiError;
use crate::fallback::CompletionFlags;
use crate::fallback::defaults::demo_profiles;
use crate::fallback::merge_completion;
use crate::state::AppState;

use super::resolution::Resolved;
use super::students::StudentService;

#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub daily_goal: Option<String>,
    pub session_goal: Option<String>,
    pub project_oneliner: Option<String>,
    pub goals: Option<PlatformCounts>,
    pub platforms: Option<PlatformHandles>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.daily_goal.is_none()
            && self.session_goal.is_none()
            && self.project_oneliner.is_none()
            && self.goals.is_none()
            && self.platforms.is_none()
    }

    fn apply(self, profile: &mut Profile) {
        if let Some(daily_goal) = self.daily_goal {
            profile.daily_goal = daily_goal;
        }
        if let Some(session_goal) = self.session_goal {
            profile.session_goal = session_goal;
        }
        if let Some(project_oneliner) = self.project_oneliner {
            profile.project_oneliner = project_oneliner;
        }
        if let Some(goals) = self.goals {
            profile.goals = goals;
        }
        if let Some(platforms) = self.platforms {
            profile.platforms = platforms;
        }
    }
}

pub struct ProfileService<'a> {
    state: &'a AppState,
}

impl<'a> ProfileService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// The stored profile, or the demo one when the store cannot be read.
    /// A student without a profile row gets an empty profile.
    async fn stored(&self, student_id: i64) -> Resolved<Profile> {
        match self.state.profiles().find_by_student(student_id).await {
            Ok(profile) => {
                Resolved::Found(profile.unwrap_or_else(|| Profile::empty(student_id)))
            }
            Err(e) => {
                tracing::warn!("Reading profile {} failed ({}), serving demo data", student_id, e);
                let profile = demo_profiles()
                    .into_iter()
                    .find(|p| p.student_id == student_id)
                    .unwrap_or_else(|| Profile::empty(student_id));
                Resolved::UsedFallback(profile)
            }
        }
    }

    /// Stored profile with today's completions from the in-process cache,
    /// the local mirror and finally the caller's header copy laid over it.
    pub async fn merged(&self, student_id: i64, header: Option<&CompletionFlags>) -> Resolved<Profile> {
        let student = StudentService::new(self.state).get(student_id).await;
        if matches!(student, Resolved::NotFound) {
            return Resolved::NotFound;
        }

        let today = self.state.today();
        let in_process = self
            .state
            .completions
            .get(student_id, &today)
            .map(|entry| entry.flags);
        let mirror = self.state.mirror.get(student_id, &today);
        let layers: Vec<&CompletionFlags> = [in_process.as_ref(), mirror.as_ref(), header]
            .into_iter()
            .flatten()
            .collect();

        let profile = self.stored(student_id).await;
        let used_fallback = student.used_fallback() || profile.used_fallback();
        let mut profile = match profile.into_option() {
            Some(profile) => profile,
            None => Profile::empty(student_id),
        };
        merge_completion(&mut profile, &today, &layers);

        if used_fallback {
            Resolved::UsedFallback(profile)
        } else {
            Resolved::Found(profile)
        }
    }

    pub async fn update(&self, student_id: i64, changes: ProfileChanges) -> Result<Profile, ApiError> {
        self.state.store.initialize().await?;
        if self.state.students().find_by_id(student_id).await?.is_none() {
            return Err(ApiError::NotFound(format!("Student {} not found", student_id)));
        }

        let repo = self.state.profiles();
        let mut profile = repo
            .find_by_student(student_id)
            .await?
            .unwrap_or_else(|| Profile::empty(student_id));
        changes.apply(&mut profile);
        repo.upsert(&profile).await?;

        profile.derive_completion(&self.state.today());
        Ok(profile)
    }

    pub async fn reset_session_goals(&self) -> Result<usize, ApiError> {
        self.state.store.initialize().await?;
        let cleared = self.state.profiles().reset_session_goals().await?;
        tracing::info!("Cleared {} session goals", cleared);
        Ok(cleared)
    }
}
