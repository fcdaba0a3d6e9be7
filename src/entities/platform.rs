use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    X,
    Youtube,
    Tiktok,
    Instagram,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::X,
        Platform::Youtube,
        Platform::Tiktok,
        Platform::Instagram,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::X => "x",
            Platform::Youtube => "youtube",
            Platform::Tiktok => "tiktok",
            Platform::Instagram => "instagram",
        }
    }

    pub fn parse(value: &str) -> Option<Platform> {
        match value.trim().to_ascii_lowercase().as_str() {
            "x" | "twitter" => Some(Platform::X),
            "youtube" => Some(Platform::Youtube),
            "tiktok" => Some(Platform::Tiktok),
            "instagram" => Some(Platform::Instagram),
            _ => None,
        }
    }
}

/// An integer per platform: goal targets or audience counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct PlatformCounts {
    pub x: i64,
    pub youtube: i64,
    pub tiktok: i64,
    pub instagram: i64,
}

impl PlatformCounts {
    pub fn get(&self, platform: Platform) -> i64 {
        match platform {
            Platform::X => self.x,
            Platform::Youtube => self.youtube,
            Platform::Tiktok => self.tiktok,
            Platform::Instagram => self.instagram,
        }
    }

    pub fn set(&mut self, platform: Platform, value: i64) {
        match platform {
            Platform::X => self.x = value,
            Platform::Youtube => self.youtube = value,
            Platform::Tiktok => self.tiktok = value,
            Platform::Instagram => self.instagram = value,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct PlatformHandles {
    pub x: String,
    pub youtube: String,
    pub tiktok: String,
    pub instagram: String,
}

impl PlatformHandles {
    pub fn get(&self, platform: Platform) -> &str {
        match platform {
            Platform::X => &self.x,
            Platform::Youtube => &self.youtube,
            Platform::Tiktok => &self.tiktok,
            Platform::Instagram => &self.instagram,
        }
    }
}
