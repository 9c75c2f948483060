pub mod article;
pub mod feed;
pub mod section;
pub mod settings;

pub use article::{parse_timestamp, Article};
pub use feed::CustomFeed;
pub use section::{DailyDigest, Section};
pub use settings::{AppSettings, FontSize, SettingsUpdate, Theme};
