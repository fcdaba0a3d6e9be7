use std::collections::HashSet;

use serde::Serialize;
use utoipa::ToSchema;

use crate::entities::{ChartType, CheckChart, CheckProgress, Student};
use crate::error::ApiError;
use crate::fallback::defaults::{demo_chart, demo_profiles};
use crate::state::AppState;

use super::resolution::{Resolved, resolve_rows};
use super::students::StudentService;

/// Completed share of a chart, rounded to the nearest whole percent.
pub fn completion_percentage(completed: usize, total: usize) -> i64 {
    (completed as f64 / total.max(1) as f64 * 100.0).round() as i64
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentProgress {
    pub student_id: i64,
    pub chart_type: ChartType,
    pub completed_tasks: Vec<CheckProgress>,
    pub completed_count: usize,
    pub total_tasks: usize,
    pub percentage: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressChange {
    pub completed: bool,
    pub points_awarded: i64,
    pub total_points: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentChartSummary {
    pub student_id: i64,
    pub name: String,
    pub honors: bool,
    pub group_id: Option<String>,
    pub points: i64,
    pub chart_type: ChartType,
    pub completed_tasks: usize,
    pub total_tasks: usize,
    pub percentage: i64,
    pub daily_goal: String,
    pub project_oneliner: String,
}

fn progress_for(chart: &CheckChart, student_id: i64, rows: Vec<CheckProgress>) -> StudentProgress {
    let active: HashSet<&str> = chart.active_tasks().map(|t| t.id.as_str()).collect();
    let completed_tasks: Vec<CheckProgress> = rows
        .into_iter()
        .filter(|p| p.student_id == student_id && p.chart_type == chart.chart_type && p.completed)
        .collect();
    let completed_count = completed_tasks
        .iter()
        .filter(|p| active.contains(p.task_id.as_str()))
        .count();

    StudentProgress {
        student_id,
        chart_type: chart.chart_type,
        completed_count,
        total_tasks: active.len(),
        percentage: completion_percentage(completed_count, active.len()),
        completed_tasks,
    }
}

pub struct CheckChartService<'a> {
    state: &'a AppState,
}

impl<'a> CheckChartService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    pub async fn chart(&self, chart_type: ChartType) -> Resolved<CheckChart> {
        match self.state.check_charts().find_chart(chart_type).await {
            Ok(Some(chart)) => Resolved::Found(chart),
            Ok(None) => {
                tracing::warn!("No {} check chart stored, serving demo chart", chart_type.as_str());
                Resolved::UsedFallback(demo_chart(chart_type))
            }
            Err(e) => {
                tracing::warn!("Reading check chart failed ({}), serving demo chart", e);
                Resolved::UsedFallback(demo_chart(chart_type))
            }
        }
    }

    pub async fn replace_chart(&self, chart: CheckChart) -> Result<usize, ApiError> {
        let mut seen = HashSet::new();
        for task in chart.tasks() {
            if task.id.trim().is_empty() {
                return Err(ApiError::BadRequest("Every task needs an id".to_string()));
            }
            if !seen.insert(task.id.as_str()) {
                return Err(ApiError::BadRequest(format!("Duplicate task id {}", task.id)));
            }
            if task.points < 0 {
                return Err(ApiError::BadRequest(format!("Task {} has negative points", task.id)));
            }
        }
        self.state.store.initialize().await?;

        let written = self.state.check_charts().replace_chart(&chart).await?;
        tracing::info!("Replaced {} check chart with {} tasks", chart.chart_type.as_str(), written);
        Ok(written)
    }

    /// The tier for a student when none was asked for.
    async fn chart_type_for(&self, student_id: i64, requested: Option<ChartType>) -> Result<(ChartType, bool), ApiError> {
        if let Some(chart_type) = requested {
            return Ok((chart_type, false));
        }
        let student = StudentService::new(self.state).get(student_id).await;
        let used_fallback = student.used_fallback();
        let student = student
            .into_option()
            .ok_or_else(|| ApiError::NotFound(format!("Student {} not found", student_id)))?;
        Ok((ChartType::for_student(student.honors), used_fallback))
    }

    pub async fn student_progress(
        &self,
        student_id: i64,
        chart_type: Option<ChartType>,
    ) -> Result<Resolved<StudentProgress>, ApiError> {
        let (chart_type, student_fallback) = self.chart_type_for(student_id, chart_type).await?;
        let chart = self.chart(chart_type).await;
        let rows = resolve_rows(
            "check progress",
            self.state.check_progress().find_for_student(student_id, Some(chart_type)).await,
            Vec::new,
        );
        let used_fallback = student_fallback || chart.used_fallback() || rows.used_fallback();

        let chart = chart.into_option().unwrap_or_else(|| demo_chart(chart_type));
        let progress = progress_for(&chart, student_id, rows.into_option().unwrap_or_default());
        Ok(if used_fallback {
            Resolved::UsedFallback(progress)
        } else {
            Resolved::Found(progress)
        })
    }

    pub async fn chart_progress(&self, chart_type: ChartType) -> Resolved<Vec<CheckProgress>> {
        resolve_rows(
            "check progress",
            self.state.check_progress().find_for_chart(chart_type).await,
            Vec::new,
        )
    }

    /// Completing adds the task's points once. Un-completing removes the
    /// progress row and leaves the points where they are.
    pub async fn set_progress(
        &self,
        student_id: i64,
        chart_type: Option<ChartType>,
        task_id: &str,
        completed: bool,
        completed_by: Option<&str>,
    ) -> Result<ProgressChange, ApiError> {
        let task_id = task_id.trim();
        if task_id.is_empty() {
            return Err(ApiError::BadRequest("taskId is required".to_string()));
        }
        self.state.store.initialize().await?;
        let (chart_type, _) = self.chart_type_for(student_id, chart_type).await?;
        let progress_repo = self.state.check_progress();

        if !completed {
            let removed = progress_repo.remove(student_id, chart_type, task_id).await?;
            tracing::info!(
                "Task {} reopened for student {} (row removed: {})",
                task_id,
                student_id,
                removed
            );
            return Ok(ProgressChange {
                completed: false,
                points_awarded: 0,
                total_points: None,
            });
        }

        let chart = self.chart(chart_type).await.into_option().unwrap_or_else(|| demo_chart(chart_type));
        let task = chart.find_task(task_id).ok_or_else(|| {
            ApiError::BadRequest(format!(
                "Task {} is not part of the {} chart",
                task_id,
                chart_type.as_str()
            ))
        })?;

        if progress_repo
            .find_one(student_id, chart_type, task_id)
            .await?
            .is_some_and(|p| p.completed)
        {
            return Ok(ProgressChange {
                completed: true,
                points_awarded: 0,
                total_points: None,
            });
        }

        progress_repo
            .upsert(&CheckProgress {
                student_id,
                chart_type,
                task_id: task_id.to_string(),
                completed: true,
                completed_date: Some(self.state.today()),
                completed_by: completed_by.map(str::to_string).filter(|s| !s.is_empty()),
                points: task.points,
            })
            .await?;
        let total_points = self.state.students().add_points(student_id, task.points).await?;

        tracing::info!("Task {} completed by student {} (+{})", task_id, student_id, task.points);
        Ok(ProgressChange {
            completed: true,
            points_awarded: task.points,
            total_points,
        })
    }

    /// Every active student with their chart progress, most points first.
    pub async fn student_summary(&self) -> Resolved<Vec<StudentChartSummary>> {
        let students = StudentService::new(self.state).list_active().await;
        let profiles = resolve_rows("profiles", self.state.profiles().find_all().await, demo_profiles);
        let progress = resolve_rows("check progress", self.state.check_progress().find_all().await, Vec::new);
        let honors = self.chart(ChartType::Honors).await.into_option().unwrap_or_else(|| demo_chart(ChartType::Honors));
        let nonhonors = self
            .chart(ChartType::Nonhonors)
            .await
            .into_option()
            .unwrap_or_else(|| demo_chart(ChartType::Nonhonors));

        let used_fallback = students.used_fallback() || profiles.used_fallback() || progress.used_fallback();
        let profiles = profiles.into_option().unwrap_or_default();
        let progress = progress.into_option().unwrap_or_default();

        let mut summary: Vec<StudentChartSummary> = students
            .into_option()
            .unwrap_or_default()
            .iter()
            .map(|student: &Student| {
                let chart = if student.honors { &honors } else { &nonhonors };
                let result = progress_for(chart, student.id, progress.clone());
                let profile = profiles.iter().find(|p| p.student_id == student.id);
                StudentChartSummary {
                    student_id: student.id,
                    name: student.full_name(),
                    honors: student.honors,
                    group_id: student.group_id.clone(),
                    points: student.points,
                    chart_type: chart.chart_type,
                    completed_tasks: result.completed_count,
                    total_tasks: result.total_tasks,
                    percentage: result.percentage,
                    daily_goal: profile.map(|p| p.daily_goal.clone()).unwrap_or_default(),
                    project_oneliner: profile.map(|p| p.project_oneliner.clone()).unwrap_or_default(),
                }
            })
            .collect();
        summary.sort_by(|a, b| b.points.cmp(&a.points).then(a.student_id.cmp(&b.student_id)));

        if used_fallback {
            Resolved::UsedFallback(summary)
        } else {
            Resolved::Found(summary)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_rounds_and_guards_zero() {
        assert_eq!(completion_percentage(1, 3), 33);
        assert_eq!(completion_percentage(2, 3), 67);
        assert_eq!(completion_percentage(0, 0), 0);
        assert_eq!(completion_percentage(6, 6), 100);
    }

    #[test]
    fn progress_counts_only_active_tasks_of_the_tier() {
        let mut chart = demo_chart(ChartType::Nonhonors);
        chart.stages[0].topics[0].tasks[0].active = false;
        let done = |task_id: &str, chart_type| CheckProgress {
            student_id: 3,
            chart_type,
            task_id: task_id.to_string(),
            completed: true,
            completed_date: None,
            completed_by: None,
            points: 10,
        };
        let rows = vec![
            done("n-k1", ChartType::Nonhonors),
            done("n-k2", ChartType::Nonhonors),
            done("h-k3", ChartType::Honors),
        ];

        let progress = progress_for(&chart, 3, rows);
        assert_eq!(progress.total_tasks, 4);
        assert_eq!(progress.completed_count, 1);
        assert_eq!(progress.percentage, 25);
        assert_eq!(progress.completed_tasks.len(), 2);
    }
}
