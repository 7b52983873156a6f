use std::path::PathBuf;

use anyhow::Context as _;
use frame_compositor::assets::{load_first_font, system_font_candidates};
use frame_compositor::{AssetLoader, Compositor, DirAssetLoader, GeneratedAssets, load_font};
use frame_db::Database;

use crate::commands::{FrameApp, ImageSource};
use crate::config::AppConfig;
use crate::display::FileSink;

/// Asset loader chosen at runtime.
pub type DynAssetLoader = Box<dyn AssetLoader + Send + Sync>;

/// The application as assembled from configuration.
pub type Frame = FrameApp<DynAssetLoader, FileSink>;

/// Load configuration, create directories, open the history database.
pub fn init_foundation() -> Result<(Database, AppConfig), anyhow::Error> {
    load_dotenv();
    let config = AppConfig::load(&default_data_dir())?;

    for issue in config.validate() {
        tracing::warn!("Configuration problem: {issue}");
    }

    for dir in [&config.data_dir, &config.image_dir, &config.output_dir] {
        std::fs::create_dir_all(dir).with_context(|| format!("create directory '{}'", dir.display()))?;
    }

    let db_path = config.data_dir.join("frame.db");
    tracing::info!("Opening database at {}", db_path.display());
    let db = Database::open(&db_path)?;

    tracing::info!(
        demo_mode = config.demo_mode,
        width = config.display_width,
        height = config.display_height,
        "Settings loaded"
    );
    Ok((db, config))
}

/// Assemble the compositor, display sink and image source.
pub fn build_app(db: Database, config: AppConfig) -> Result<Frame, anyhow::Error> {
    let compositor = build_compositor(&config)?;
    let sink = FileSink::new(&config.output_dir, config.output_dimensions()?, config.display_rotate);
    let source = ImageSource::from_config(&config);
    Ok(FrameApp::new(db, config, compositor, sink, source))
}

/// Compositor with the configured font and overlay artwork.
pub fn build_compositor(config: &AppConfig) -> Result<Compositor<DynAssetLoader>, anyhow::Error> {
    let font = match &config.font_path {
        Some(path) => load_font(path)?,
        None => load_first_font(system_font_candidates())?,
    };
    let loader: DynAssetLoader = match &config.asset_dir {
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "Using overlay assets from directory");
            Box::new(DirAssetLoader::new(dir))
        }
        None => {
            tracing::info!("No asset directory configured, using generated overlay assets");
            Box::new(GeneratedAssets)
        }
    };
    Ok(Compositor::new(loader, font))
}

/// Data directory used when `FRAME_DATA_DIR` is not set.
fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".ai-image-frame")
}

/// Load .env from multiple candidate paths.
fn load_dotenv() {
    let candidates = [".env", "../.env", "../../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::info!("No .env file found, using system environment variables");
}

#[cfg(test)]
mod tests {
    use super::*;
    use frame_compositor::CompositionError;

    #[test]
    fn test_default_data_dir() {
        assert!(default_data_dir().ends_with(".ai-image-frame"));
    }

    #[test]
    fn test_bad_font_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let font = dir.path().join("broken.ttf");
        std::fs::write(&font, b"not a font").unwrap();
        let mut config = AppConfig::with_data_dir(dir.path());
        config.font_path = Some(font);

        let err = build_compositor(&config).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<CompositionError>(),
            Some(CompositionError::FontLoad(_))
        ));
    }

    #[test]
    fn test_build_app_with_generated_assets() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::with_data_dir(dir.path());
        config.demo_mode = true;
        let db = Database::open_in_memory().unwrap();

        let app = build_app(db, config).expect("app needs a system font");
        assert_eq!(app.sink().latest_path(), dir.path().join("output/display-latest.png"));
    }
}
