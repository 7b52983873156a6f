//! Configuration management: defaults, environment loading, validation.

pub mod app_config;
pub mod validation;

pub use app_config::AppConfig;
pub use validation::validate_config;
