use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::SheetRecord;
use crate::record_store::Sheet;
use crate::record_store::client::compose_key;
use crate::utils::cells::{cell, format_bool, non_empty, parse_bool, parse_int};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Honors,
    #[serde(alias = "non-honors", alias = "non_honors")]
    Nonhonors,
}

impl ChartType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Honors => "honors",
            ChartType::Nonhonors => "nonhonors",
        }
    }

    pub fn parse(value: &str) -> Option<ChartType> {
        match value.trim().to_ascii_lowercase().as_str() {
            "honors" => Some(ChartType::Honors),
            "nonhonors" | "non-honors" | "non_honors" => Some(ChartType::Nonhonors),
            _ => None,
        }
    }

    pub fn for_student(honors: bool) -> ChartType {
        if honors {
            ChartType::Honors
        } else {
            ChartType::Nonhonors
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    pub points: i64,
    pub instructions: Option<String>,
    pub order: i64,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: String,
    pub name: String,
    pub order: i64,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub id: String,
    pub name: String,
    pub order: i64,
    pub topics: Vec<Topic>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckChart {
    pub chart_type: ChartType,
    pub stages: Vec<Stage>,
}

impl CheckChart {
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.stages
            .iter()
            .flat_map(|stage| stage.topics.iter())
            .flat_map(|topic| topic.tasks.iter())
    }

    pub fn active_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks().filter(|task| task.active)
    }

    pub fn find_task(&self, task_id: &str) -> Option<&Task> {
        self.tasks().find(|task| task.id == task_id)
    }

    /// Rebuilds the Stage → Topic → Task tree from flat rows, ordered by
    /// each level's `order`.
    pub fn assemble(chart_type: ChartType, rows: &[CheckChartRow]) -> CheckChart {
        let mut stages: Vec<Stage> = Vec::new();

        for row in rows.iter().filter(|r| r.chart_type == chart_type) {
            let stage_index = stages.iter().position(|s| s.id == row.stage_id);
            let stage = match stage_index {
                Some(index) => &mut stages[index],
                None => {
                    stages.push(Stage {
                        id: row.stage_id.clone(),
                        name: row.stage_name.clone(),
                        order: row.stage_order,
                        topics: Vec::new(),
                    });
                    let last = stages.len() - 1;
                    &mut stages[last]
                }
            };

            let topic_index = stage.topics.iter().position(|t| t.id == row.topic_id);
            let topic = match topic_index {
                Some(index) => &mut stage.topics[index],
                None => {
                    stage.topics.push(Topic {
                        id: row.topic_id.clone(),
                        name: row.topic_name.clone(),
                        order: row.topic_order,
                        tasks: Vec::new(),
                    });
                    let last = stage.topics.len() - 1;
                    &mut stage.topics[last]
                }
            };

            topic.tasks.push(Task {
                id: row.task_id.clone(),
                name: row.task_name.clone(),
                points: row.points,
                instructions: row.instructions.clone(),
                order: row.order,
                active: row.active,
            });
        }

        stages.sort_by_key(|s| s.order);
        for stage in &mut stages {
            stage.topics.sort_by_key(|t| t.order);
            for topic in &mut stage.topics {
                topic.tasks.sort_by_key(|t| t.order);
            }
        }

        CheckChart { chart_type, stages }
    }

    pub fn flatten(&self) -> Vec<CheckChartRow> {
        let mut rows = Vec::new();
        for stage in &self.stages {
            for topic in &stage.topics {
                for task in &topic.tasks {
                    rows.push(CheckChartRow {
                        chart_type: self.chart_type,
                        stage_id: stage.id.clone(),
                        stage_name: stage.name.clone(),
                        stage_order: stage.order,
                        topic_id: topic.id.clone(),
                        topic_name: topic.name.clone(),
                        topic_order: topic.order,
                        task_id: task.id.clone(),
                        task_name: task.name.clone(),
                        points: task.points,
                        instructions: task.instructions.clone(),
                        order: task.order,
                        active: task.active,
                    });
                }
            }
        }
        rows
    }
}

/// One task of a chart as stored in the CheckChart sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckChartRow {
    pub chart_type: ChartType,
    pub stage_id: String,
    pub stage_name: String,
    pub stage_order: i64,
    pub topic_id: String,
    pub topic_name: String,
    pub topic_order: i64,
    pub task_id: String,
    pub task_name: String,
    pub points: i64,
    pub instructions: Option<String>,
    pub order: i64,
    pub active: bool,
}

impl SheetRecord for CheckChartRow {
    const SHEET: Sheet = Sheet::CheckChart;
    const KEY_COLUMNS: &'static [usize] = &[0, 7];

    fn key(&self) -> String {
        compose_key(&[self.chart_type.as_str(), &self.task_id])
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.chart_type.as_str().to_string(),
            self.stage_id.clone(),
            self.stage_name.clone(),
            self.stage_order.to_string(),
            self.topic_id.clone(),
            self.topic_name.clone(),
            self.topic_order.to_string(),
            self.task_id.clone(),
            self.task_name.clone(),
            self.points.to_string(),
            self.instructions.clone().unwrap_or_default(),
            self.order.to_string(),
            format_bool(self.active),
        ]
    }

    fn from_row(row: &[String]) -> Option<Self> {
        let chart_type = ChartType::parse(cell(row, 0))?;
        let task_id = non_empty(cell(row, 7))?;
        // Rows written before the active column existed count as active
        let active = non_empty(cell(row, 12))
            .map(|v| parse_bool(&v))
            .unwrap_or(true);

        Some(CheckChartRow {
            chart_type,
            stage_id: cell(row, 1).trim().to_string(),
            stage_name: cell(row, 2).to_string(),
            stage_order: parse_int(cell(row, 3)),
            topic_id: cell(row, 4).trim().to_string(),
            topic_name: cell(row, 5).to_string(),
            topic_order: parse_int(cell(row, 6)),
            task_id,
            task_name: cell(row, 8).to_string(),
            points: parse_int(cell(row, 9)),
            instructions: non_empty(cell(row, 10)),
            order: parse_int(cell(row, 11)),
            active,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart_row(stage: (&str, i64), topic: (&str, i64), task: (&str, i64)) -> CheckChartRow {
        CheckChartRow {
            chart_type: ChartType::Honors,
            stage_id: stage.0.to_string(),
            stage_name: format!("Stage {}", stage.0),
            stage_order: stage.1,
            topic_id: topic.0.to_string(),
            topic_name: format!("Topic {}", topic.0),
            topic_order: topic.1,
            task_id: task.0.to_string(),
            task_name: format!("Task {}", task.0),
            points: 5,
            instructions: None,
            order: task.1,
            active: true,
        }
    }

    #[test]
    fn rows_assemble_into_an_ordered_tree() {
        let rows = vec![
            chart_row(("s2", 2), ("t3", 1), ("k4", 1)),
            chart_row(("s1", 1), ("t1", 1), ("k2", 2)),
            chart_row(("s1", 1), ("t1", 1), ("k1", 1)),
            chart_row(("s1", 1), ("t2", 2), ("k3", 1)),
        ];

        let chart = CheckChart::assemble(ChartType::Honors, &rows);

        assert_eq!(chart.stages.len(), 2);
        assert_eq!(chart.stages[0].id, "s1");
        assert_eq!(chart.stages[0].topics.len(), 2);
        let ids: Vec<&str> = chart.tasks().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["k1", "k2", "k3", "k4"]);
        assert_eq!(chart.flatten().len(), 4);
    }

    #[test]
    fn other_tier_rows_are_ignored() {
        let mut row = chart_row(("s1", 1), ("t1", 1), ("k1", 1));
        row.chart_type = ChartType::Nonhonors;
        let chart = CheckChart::assemble(ChartType::Honors, &[row]);
        assert!(chart.stages.is_empty());
    }

    #[test]
    fn chart_type_parses_variants() {
        assert_eq!(ChartType::parse("Non-Honors"), Some(ChartType::Nonhonors));
        assert_eq!(ChartType::parse("honors"), Some(ChartType::Honors));
        assert_eq!(ChartType::parse("gold"), None);
    }
}
