//! Demo mode: reuse images already on disk instead of calling the provider.

use std::path::{Path, PathBuf};

use crate::{GenerationError, IMAGES_PER_PROMPT};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "bmp"];

/// Up to [`IMAGES_PER_PROMPT`] images from `image_dir`, sorted by file name.
pub fn demo_images(image_dir: &Path) -> Result<Vec<PathBuf>, GenerationError> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(image_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_image(path))
        .collect();
    paths.sort();
    paths.truncate(IMAGES_PER_PROMPT);
    tracing::info!(
        dir = %image_dir.display(),
        count = paths.len(),
        "Demo mode: using existing images"
    );
    Ok(paths)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}
