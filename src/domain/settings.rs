use serde::{Deserialize, Serialize};

pub const DEFAULT_RETENTION_DAYS: u32 = 7;
pub const DEFAULT_MAX_ARTICLES_PER_SECTION: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub retention_days: u32,
    pub max_articles_per_section: usize,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            retention_days: DEFAULT_RETENTION_DAYS,
            max_articles_per_section: DEFAULT_MAX_ARTICLES_PER_SECTION,
        }
    }
}

/// Partial settings change; `None` fields keep their current value.
#[derive(Debug, Clone, Copy, Default)]
pub struct SettingsUpdate {
    pub retention_days: Option<u32>,
    pub max_articles_per_section: Option<usize>,
}

impl AppSettings {
    pub fn apply(self, update: SettingsUpdate) -> Self {
        Self {
            retention_days: update.retention_days.unwrap_or(self.retention_days),
            max_articles_per_section: update
                .max_articles_per_section
                .unwrap_or(self.max_articles_per_section),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Sepia,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Sepia => "sepia",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "light" => Some(Theme::Light),
            "sepia" => Some(Theme::Sepia),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    S,
    #[default]
    M,
    L,
}

impl FontSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            FontSize::S => "s",
            FontSize::M => "m",
            FontSize::L => "l",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "s" => Some(FontSize::S),
            "m" => Some(FontSize::M),
            "l" => Some(FontSize::L),
            _ => None,
        }
    }
}
