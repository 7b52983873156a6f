//! Runtime application configuration loaded from the environment.

use std::path::{Path, PathBuf};

use frame_compositor::{CompositionError, DEFAULT_GRID_PADDING, DEFAULT_OUTPUT, Dimensions};
use generation_client::OPENAI_IMAGES_URL;
use generation_client::client::DEFAULT_MODEL;

use super::validation;

pub const DEFAULT_PROMPT_STYLE: &str = "in the style of thomas kinkade";

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub image_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Directory holding `frame.png` and `label.png`; generated artwork when unset.
    pub asset_dir: Option<PathBuf>,
    /// Caption font; system fonts are tried when unset.
    pub font_path: Option<PathBuf>,
    pub display_width: u32,
    pub display_height: u32,
    /// The panel is mounted in portrait but addressed in landscape.
    pub display_rotate: bool,
    pub grid_padding: u32,
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    pub prompt_style: String,
    pub demo_mode: bool,
}

impl AppConfig {
    /// Defaults rooted at `data_dir`.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            image_dir: data_dir.join("images"),
            output_dir: data_dir.join("output"),
            data_dir,
            asset_dir: None,
            font_path: None,
            display_width: DEFAULT_OUTPUT.0,
            display_height: DEFAULT_OUTPUT.1,
            display_rotate: true,
            grid_padding: DEFAULT_GRID_PADDING,
            api_key: String::new(),
            api_url: OPENAI_IMAGES_URL.into(),
            model: DEFAULT_MODEL.into(),
            prompt_style: DEFAULT_PROMPT_STYLE.into(),
            demo_mode: false,
        }
    }

    /// Load configuration from process environment variables.
    pub fn load(data_dir: &Path) -> Result<Self, anyhow::Error> {
        Self::from_lookup(data_dir, |key| std::env::var(key).ok())
    }

    /// Load configuration through `get`, falling back to defaults for unset
    /// or unparsable values.
    pub fn from_lookup<F>(data_dir: &Path, get: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let g = |key: &str| -> String { get(key).map(|v| v.trim().to_string()).unwrap_or_default() };
        let path = |key: &str| -> Option<PathBuf> {
            let v = g(key);
            if v.is_empty() { None } else { Some(PathBuf::from(v)) }
        };

        let data_dir = path("FRAME_DATA_DIR").unwrap_or_else(|| data_dir.to_path_buf());
        let defaults = Self::with_data_dir(&data_dir);

        Ok(Self {
            image_dir: path("FRAME_IMAGE_DIR").unwrap_or(defaults.image_dir),
            output_dir: path("FRAME_OUTPUT_DIR").unwrap_or(defaults.output_dir),
            data_dir,
            asset_dir: path("FRAME_ASSET_DIR"),
            font_path: path("FRAME_FONT_PATH"),
            display_width: parse_u32(&g("DISPLAY_WIDTH"), defaults.display_width),
            display_height: parse_u32(&g("DISPLAY_HEIGHT"), defaults.display_height),
            display_rotate: parse_bool(&g("DISPLAY_ROTATE"), defaults.display_rotate),
            grid_padding: parse_u32(&g("GRID_PADDING"), defaults.grid_padding),
            api_key: g("OPENAI_API_KEY"),
            api_url: non_empty(g("GENERATION_API_URL"), defaults.api_url),
            model: non_empty(g("GENERATION_MODEL"), defaults.model),
            prompt_style: get("PROMPT_STYLE").unwrap_or(defaults.prompt_style),
            demo_mode: parse_bool(&g("DEMO_MODE"), defaults.demo_mode),
        })
    }

    /// Portrait size of the composed images.
    pub fn output_dimensions(&self) -> Result<Dimensions, CompositionError> {
        Dimensions::new(self.display_width, self.display_height)
    }

    /// Problems that would make commands fail; empty when usable.
    pub fn validate(&self) -> Vec<String> {
        validation::validate_config(self)
    }
}

fn non_empty(value: String, default: String) -> String {
    if value.is_empty() { default } else { value }
}

fn parse_u32(s: &str, default: u32) -> u32 {
    if s.is_empty() {
        return default;
    }
    s.parse().unwrap_or(default)
}

fn parse_bool(s: &str, default: bool) -> bool {
    match s.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => true,
        "false" | "0" | "no" | "off" => false,
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> AppConfig {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(Path::new("/data"), |k| map.get(k).cloned()).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]);
        assert_eq!(config.data_dir, PathBuf::from("/data"));
        assert_eq!(config.image_dir, PathBuf::from("/data/images"));
        assert_eq!(config.output_dir, PathBuf::from("/data/output"));
        assert_eq!((config.display_width, config.display_height), (448, 600));
        assert!(config.display_rotate);
        assert_eq!(config.grid_padding, 20);
        assert_eq!(config.prompt_style, "in the style of thomas kinkade");
        assert_eq!(config.api_url, OPENAI_IMAGES_URL);
        assert!(!config.demo_mode);
        assert!(config.asset_dir.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let config = load(&[
            ("FRAME_DATA_DIR", "/srv/frame"),
            ("FRAME_OUTPUT_DIR", "/tmp/out"),
            ("FRAME_ASSET_DIR", "/srv/assets"),
            ("DISPLAY_WIDTH", "600"),
            ("DISPLAY_HEIGHT", "800"),
            ("DISPLAY_ROTATE", "false"),
            ("GRID_PADDING", "10"),
            ("DEMO_MODE", "true"),
            ("PROMPT_STYLE", ""),
        ]);
        assert_eq!(config.image_dir, PathBuf::from("/srv/frame/images"));
        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.asset_dir, Some(PathBuf::from("/srv/assets")));
        assert_eq!(config.output_dimensions().unwrap().as_pair(), (600, 800));
        assert!(!config.display_rotate);
        assert_eq!(config.grid_padding, 10);
        assert!(config.demo_mode);
        assert_eq!(config.prompt_style, "");
    }

    #[test]
    fn test_unparsable_values_fall_back() {
        let config = load(&[("DISPLAY_WIDTH", "wide"), ("DISPLAY_ROTATE", "maybe")]);
        assert_eq!(config.display_width, 448);
        assert!(config.display_rotate);
    }
}
