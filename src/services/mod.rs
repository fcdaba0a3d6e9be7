pub mod check_chart;
pub mod goals;
pub mod groups;
pub mod leaderboard;
pub mod profiles;
pub mod resolution;
pub mod social;
pub mod students;
pub mod sync_queue;

pub use check_chart::CheckChartService;
pub use goals::GoalService;
pub use groups::GroupService;
pub use leaderboard::LeaderboardService;
pub use profiles::ProfileService;
pub use resolution::Resolved;
pub use students::StudentService;
