pub mod auth;
pub mod check_chart;
pub mod goals;
pub mod groups;
pub mod health;
pub mod leaderboard;
pub mod profile;
pub mod students;
