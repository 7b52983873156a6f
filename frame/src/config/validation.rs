//! Configuration validation.

use super::AppConfig;

/// Collect human-readable problems with `config`.
pub fn validate_config(config: &AppConfig) -> Vec<String> {
    let mut issues = Vec::new();

    if config.display_width == 0 || config.display_height == 0 {
        issues.push(format!(
            "DISPLAY_WIDTH/DISPLAY_HEIGHT must be positive, got {}x{}",
            config.display_width, config.display_height
        ));
    } else if config.display_height < config.display_width {
        issues.push(format!(
            "display must be portrait, got {}x{}",
            config.display_width, config.display_height
        ));
    }
    if config.grid_padding % 2 != 0 {
        issues.push(format!("GRID_PADDING must be even, got {}", config.grid_padding));
    }
    if !config.demo_mode && config.api_key.is_empty() {
        issues.push("OPENAI_API_KEY is not set (set DEMO_MODE=true to run without it)".into());
    }
    if let Some(dir) = &config.asset_dir {
        if !dir.is_dir() {
            issues.push(format!("FRAME_ASSET_DIR {} is not a directory", dir.display()));
        }
    }

    issues
}
