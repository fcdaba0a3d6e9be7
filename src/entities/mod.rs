//! Records kept in the record store and their sheet row layouts.

pub mod check_chart;
pub mod check_progress;
pub mod goal_history;
pub mod goal_kind;
pub mod group;
pub mod platform;
pub mod profile;
pub mod student;

use crate::record_store::Sheet;

pub use check_chart::{ChartType, CheckChart, CheckChartRow, Stage, Task, Topic};
pub use check_progress::CheckProgress;
pub use goal_history::{GoalHistoryEntry, GoalStatus};
pub use goal_kind::GoalKind;
pub use group::Group;
pub use platform::{Platform, PlatformCounts, PlatformHandles};
pub use profile::Profile;
pub use student::{Student, StudentStatus};

/// A record stored as one sheet row.
pub trait SheetRecord: Sized + Clone {
    const SHEET: Sheet;

    /// Columns that together identify a row.
    const KEY_COLUMNS: &'static [usize];

    fn key(&self) -> String;

    fn to_row(&self) -> Vec<String>;

    /// `None` for blank or unreadable rows, which are skipped.
    fn from_row(row: &[String]) -> Option<Self>;
}
