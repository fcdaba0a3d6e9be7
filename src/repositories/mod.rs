pub mod check_chart_repository;
pub mod goal_history_repository;
pub mod group_repository;
pub mod profile_repository;
pub mod sheet_repository;
pub mod student_repository;

pub use check_chart_repository::{CheckChartRepository, CheckProgressRepository};
pub use goal_history_repository::GoalHistoryRepository;
pub use group_repository::GroupRepository;
pub use profile_repository::ProfileRepository;
pub use sheet_repository::SheetRepository;
pub use student_repository::StudentRepository;
