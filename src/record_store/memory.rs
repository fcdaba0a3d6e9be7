//! A spreadsheet kept in process memory. Backs `RECORD_STORE_MODE=memory`
//! and stands in for the remote store in tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use super::Rows;
use super::error::StoreError;
use super::range::A1Range;
use super::transport::SheetTransport;

#[derive(Default)]
pub struct MemorySheetTransport {
    sheets: Mutex<Vec<(String, Rows)>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
    unavailable: AtomicBool,
}

fn is_blank(row: &[String]) -> bool {
    row.iter().all(|c| c.is_empty())
}

fn set_cell(grid: &mut Rows, row: usize, col: usize, value: String) {
    if grid.len() <= row {
        grid.resize_with(row + 1, Vec::new);
    }
    let cells = &mut grid[row];
    if cells.len() <= col {
        cells.resize(col + 1, String::new());
    }
    cells[col] = value;
}

impl MemorySheetTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `read_range` calls served so far.
    pub fn read_calls(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn write_calls(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Makes every call fail as if the network were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// The raw grid of a sheet, header row included.
    pub fn sheet_rows(&self, title: &str) -> Option<Rows> {
        let sheets = self.sheets.lock().ok()?;
        sheets
            .iter()
            .find(|(name, _)| name == title)
            .map(|(_, rows)| rows.clone())
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.lock().map(|s| s.len()).unwrap_or(0)
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Transport("connection refused".to_string()));
        }
        Ok(())
    }

    fn with_sheet<T>(
        &self,
        title: &str,
        f: impl FnOnce(&mut Rows) -> T,
    ) -> Result<T, StoreError> {
        let mut sheets = self
            .sheets
            .lock()
            .map_err(|_| StoreError::Transport("sheet lock poisoned".to_string()))?;
        let (_, grid) = sheets
            .iter_mut()
            .find(|(name, _)| name == title)
            .ok_or_else(|| StoreError::Transport(format!("Unable to parse range: {title}")))?;
        Ok(f(grid))
    }
}

#[async_trait]
impl SheetTransport for MemorySheetTransport {
    async fn sheet_titles(&self) -> Result<Vec<String>, StoreError> {
        self.check_available()?;
        let sheets = self
            .sheets
            .lock()
            .map_err(|_| StoreError::Transport("sheet lock poisoned".to_string()))?;
        Ok(sheets.iter().map(|(name, _)| name.clone()).collect())
    }

    async fn add_sheet(&self, title: &str) -> Result<(), StoreError> {
        self.check_available()?;
        let mut sheets = self
            .sheets
            .lock()
            .map_err(|_| StoreError::Transport("sheet lock poisoned".to_string()))?;
        if sheets.iter().any(|(name, _)| name == title) {
            return Err(StoreError::Transport(format!(
                "A sheet with the name \"{title}\" already exists"
            )));
        }
        sheets.push((title.to_string(), Vec::new()));
        Ok(())
    }

    async fn read_range(&self, range: &str) -> Result<Rows, StoreError> {
        self.check_available()?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        let r = A1Range::parse(range)?;
        self.with_sheet(&r.sheet, |grid| {
            let end = r.end_row.unwrap_or(grid.len()).min(grid.len());
            let start = (r.start_row - 1).min(end);
            let mut out: Rows = grid[start..end]
                .iter()
                .map(|row| {
                    let end_col = r.end_col.map(|c| c + 1).unwrap_or(row.len());
                    let mut cells: Vec<String> = row
                        .iter()
                        .skip(r.start_col)
                        .take(end_col.saturating_sub(r.start_col))
                        .cloned()
                        .collect();
                    while cells.last().is_some_and(|c| c.is_empty()) {
                        cells.pop();
                    }
                    cells
                })
                .collect();
            while out.last().is_some_and(|row| row.is_empty()) {
                out.pop();
            }
            out
        })
    }

    async fn append_rows(&self, range: &str, rows: Rows) -> Result<(), StoreError> {
        self.check_available()?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        let r = A1Range::parse(range)?;
        self.with_sheet(&r.sheet, |grid| {
            let first_free = grid
                .iter()
                .rposition(|row| !is_blank(row))
                .map(|i| i + 1)
                .unwrap_or(0);
            for (i, row) in rows.into_iter().enumerate() {
                for (j, value) in row.into_iter().enumerate() {
                    set_cell(grid, first_free + i, r.start_col + j, value);
                }
            }
        })
    }

    async fn write_range(&self, range: &str, rows: Rows) -> Result<(), StoreError> {
        self.check_available()?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        let r = A1Range::parse(range)?;
        self.with_sheet(&r.sheet, |grid| {
            for (i, row) in rows.into_iter().enumerate() {
                for (j, value) in row.into_iter().enumerate() {
                    set_cell(grid, r.start_row - 1 + i, r.start_col + j, value);
                }
            }
        })
    }

    async fn clear_range(&self, range: &str) -> Result<(), StoreError> {
        self.check_available()?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        let r = A1Range::parse(range)?;
        self.with_sheet(&r.sheet, |grid| {
            let end = r.end_row.unwrap_or(grid.len()).min(grid.len());
            for row in grid.iter_mut().take(end).skip(r.start_row - 1) {
                let end_col = r.end_col.map(|c| c + 1).unwrap_or(row.len()).min(row.len());
                for cell in row.iter_mut().take(end_col).skip(r.start_col) {
                    cell.clear();
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[tokio::test]
    async fn cleared_rows_keep_their_slot() {
        let t = MemorySheetTransport::new();
        t.add_sheet("Groups").await.unwrap();
        t.write_range("Groups!A1:Z1", vec![row(&["id", "name"])])
            .await
            .unwrap();
        t.append_rows("Groups!A:Z", vec![row(&["1", "Red"]), row(&["2", "Blue"])])
            .await
            .unwrap();
        t.clear_range("Groups!A2:Z2").await.unwrap();

        let data = t.read_range("Groups!A2:Z").await.unwrap();
        assert_eq!(data, vec![Vec::<String>::new(), row(&["2", "Blue"])]);

        t.append_rows("Groups!A:Z", vec![row(&["3", "Green"])])
            .await
            .unwrap();
        let data = t.read_range("Groups!A2:Z").await.unwrap();
        assert_eq!(data.len(), 3);
        assert_eq!(data[2], row(&["3", "Green"]));
    }

    #[tokio::test]
    async fn unavailable_transport_fails_every_call() {
        let t = MemorySheetTransport::new();
        t.set_unavailable(true);
        assert!(t.sheet_titles().await.is_err());
        assert!(t.read_range("Students!A2:Z").await.is_err());
    }

    #[tokio::test]
    async fn duplicate_sheets_are_rejected() {
        let t = MemorySheetTransport::new();
        t.add_sheet("Students").await.unwrap();
        assert!(t.add_sheet("Students").await.is_err());
        assert_eq!(t.sheet_count(), 1);
    }
}
