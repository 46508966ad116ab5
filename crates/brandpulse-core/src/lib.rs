//! Core domain types and configuration for BrandPulse.
//!
//! Holds the source/sentiment/priority/channel enums shared across the
//! pipeline, the policy thresholds that drive alerting, text sanitization
//! and region inference helpers, and env-driven application configuration.

pub mod app_config;
pub mod config;
pub mod policy;
pub mod text;
pub mod types;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env, ConfigError};
pub use policy::PriorityPolicy;
pub use text::{extract_region, sanitize_text, truncate};
pub use types::{Channel, MentionMetadata, Priority, Sentiment, Source};
