//! Common utilities shared across Critic crates.

pub mod config;
pub mod dirs;
pub mod fs;
pub mod http_client;

pub use config::{
    CONFIG_FILE, CRITIC_CONFIG_ENV, CRITIC_ENDPOINT_ENV, ConfigError, CriticConfig,
    DEFAULT_ENDPOINT, DEFAULT_TOAST_DURATION_MS, SectionsConfig, ThemeName, get_config_path,
    load_config,
};
pub use dirs::{AppDirs, CRITIC_HOME_ENV, get_app_dirs};
pub use fs::atomic_write;
pub use http_client::{
    CONNECT_TIMEOUT, POOL_IDLE_TIMEOUT, USER_AGENT, create_client_builder, create_review_client,
};
