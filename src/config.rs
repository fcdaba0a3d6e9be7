use clap::Parser;
use once_cell::sync::Lazy;

pub const JWT_EXPRIED_TIME: i64 = 86400i64;
pub const PASSWORD_HASH_COST: u32 = 10;

// Points awarded per goal completion
pub const BRAINLIFT_POINTS: i64 = 10;
pub const DAILY_GOAL_POINTS: i64 = 5;

// House points per student per leaderboard window
pub const HOUSE_POINTS_COMPLETED: i64 = 10;
pub const HOUSE_POINTS_MISSED: i64 = -10;

pub const RECORD_STORE_CACHE_TTL_SECONDS: u64 = 30;
pub const SOCIAL_CACHE_TTL_SECONDS: u64 = 300; // 5 minutes
pub const REMOTE_REQUEST_TIMEOUT_SECONDS: u64 = 10;

pub const SYNC_MAX_ATTEMPTS: u32 = 3;
pub const SYNC_ITEM_DELAY_MILLIS: u64 = 500;

pub const DEMO_DATA_NOTICE: &str =
    "Using demo data because the record store is unavailable or empty";

pub static APP_CONFIG: Lazy<Config> = Lazy::new(Config::parse);

#[derive(Debug, Parser, Clone)]
pub struct Config {
    #[clap(long, env, default_value_t = 8080)]
    pub port: u16,

    #[clap(long, env, default_value_t = true)]
    pub swagger_enabled: bool,

    #[clap(long, env, default_value = "info")]
    pub log_level: String,

    #[clap(long, env, default_value = "change-me-in-production")]
    pub jwt_secret: String,

    #[clap(long, env, default_value = "admin@alpha.school")]
    pub admin_email: String,

    #[clap(long, env, default_value = "admin123")]
    pub admin_password: String,

    #[clap(long, env, default_value = "password")]
    pub default_student_password: String,

    /// Raw JSON or base64-encoded JSON credentials for the record store
    #[clap(long, env)]
    pub record_store_credentials: Option<String>,

    #[clap(long, env, default_value = "./credentials.json")]
    pub record_store_credentials_file: String,

    #[clap(long, env, default_value = "https://sheets.googleapis.com")]
    pub record_store_api_base: String,

    /// `http` talks to the remote store, `memory` keeps every sheet in process
    #[clap(long, env, default_value = "http")]
    pub record_store_mode: String,

    #[clap(long, env, default_value_t = 100)]
    pub record_store_min_delay_ms: u64,

    #[clap(long, env, default_value = "./local_goals.json")]
    pub local_mirror_path: String,

    #[clap(long, env)]
    pub social_lookup_url: Option<String>,

    #[clap(long, env, default_value = "*")]
    pub cors_allowed_origins: String,

    #[clap(long, env, default_value = "local")]
    pub app_env: String,
}

impl Config {
    /// Configuration with every field at its default, ignoring process arguments.
    pub fn defaults() -> Self {
        Config::parse_from(["house_points"])
    }
}
