use std::sync::Arc;

use crate::entities::{ChartType, CheckChart, CheckChartRow, CheckProgress, SheetRecord};
use crate::record_store::client::compose_key;
use crate::record_store::{RecordStoreClient, StoreError};

use super::SheetRepository;

#[derive(Clone)]
pub struct CheckChartRepository {
    sheet: SheetRepository<CheckChartRow>,
}

impl CheckChartRepository {
    pub fn new(client: Arc<RecordStoreClient>) -> Self {
        Self {
            sheet: SheetRepository::new(client),
        }
    }

    /// `None` when the sheet holds no rows for the tier.
    pub async fn find_chart(&self, chart_type: ChartType) -> Result<Option<CheckChart>, StoreError> {
        let rows = self.sheet.find_all().await?;
        if !rows.iter().any(|r| r.chart_type == chart_type) {
            return Ok(None);
        }
        Ok(Some(CheckChart::assemble(chart_type, &rows)))
    }

    /// Clears the tier's existing task rows and appends the new structure.
    pub async fn replace_chart(&self, chart: &CheckChart) -> Result<usize, StoreError> {
        let existing = self.sheet.find_all().await?;
        for row in existing.iter().filter(|r| r.chart_type == chart.chart_type) {
            self.sheet.clear(&row.key()).await?;
        }

        let rows = chart.flatten();
        for row in &rows {
            self.sheet.insert(row).await?;
        }
        Ok(rows.len())
    }
}

#[derive(Clone)]
pub struct CheckProgressRepository {
    sheet: SheetRepository<CheckProgress>,
}

impl CheckProgressRepository {
    pub fn new(client: Arc<RecordStoreClient>) -> Self {
        Self {
            sheet: SheetRepository::new(client),
        }
    }

    pub async fn find_all(&self) -> Result<Vec<CheckProgress>, StoreError> {
        self.sheet.find_all().await
    }

    pub async fn find_for_student(
        &self,
        student_id: i64,
        chart_type: Option<ChartType>,
    ) -> Result<Vec<CheckProgress>, StoreError> {
        let rows = self.find_all().await?;
        Ok(rows
            .into_iter()
            .filter(|p| p.student_id == student_id)
            .filter(|p| chart_type.is_none_or(|t| p.chart_type == t))
            .collect())
    }

    pub async fn find_for_chart(&self, chart_type: ChartType) -> Result<Vec<CheckProgress>, StoreError> {
        let rows = self.find_all().await?;
        Ok(rows.into_iter().filter(|p| p.chart_type == chart_type).collect())
    }

    pub async fn find_one(
        &self,
        student_id: i64,
        chart_type: ChartType,
        task_id: &str,
    ) -> Result<Option<CheckProgress>, StoreError> {
        self.sheet
            .find_by_key(&compose_key(&[&student_id.to_string(), chart_type.as_str(), task_id]))
            .await
    }

    pub async fn upsert(&self, progress: &CheckProgress) -> Result<(), StoreError> {
        self.sheet.upsert(progress).await
    }

    /// Absence of a row means incomplete, so un-completing clears the row.
    pub async fn remove(
        &self,
        student_id: i64,
        chart_type: ChartType,
        task_id: &str,
    ) -> Result<bool, StoreError> {
        self.sheet
            .clear(&compose_key(&[&student_id.to_string(), chart_type.as_str(), task_id]))
            .await
    }
}
