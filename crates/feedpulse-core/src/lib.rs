//! Shared domain types and configuration for feedpulse.

pub mod app_config;
pub mod config;
pub mod feedback;
pub mod metrics;
pub mod topic;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env, ConfigError};
pub use feedback::{Classification, FeedbackDraft};
pub use metrics::{round2, MetricReport, SentimentBuckets};
pub use topic::{Topic, UnknownTopic};
