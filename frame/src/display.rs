//! Output to the e-ink panel.
//!
//! The panel itself is driven by vendor hardware code; here a sink writes
//! the frames it would show as PNG files.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chrono::Local;
use frame_compositor::Dimensions;
use image::{DynamicImage, Rgb, RgbImage};
use tracing::debug;

/// File name of the most recently shown frame.
pub const LATEST_FILE_NAME: &str = "display-latest.png";

/// Turn a portrait composition into the panel's native orientation.
///
/// The panel is landscape, mounted in portrait; when `rotate` is set the
/// image is turned a quarter counter-clockwise.
pub fn orient_for_panel(image: &DynamicImage, rotate: bool) -> DynamicImage {
    let (w, h) = (image.width(), image.height());
    if rotate {
        debug!(w, h, "Rotating image 90 degrees counter-clockwise for the panel");
        image.rotate270()
    } else {
        debug!(w, h, "Panel is portrait, no rotation needed");
        image.clone()
    }
}

/// Something that can show a composed image.
pub trait DisplaySink {
    fn show(&mut self, image: &DynamicImage) -> Result<(), anyhow::Error>;

    /// Blank the panel.
    fn clear(&mut self) -> Result<(), anyhow::Error>;
}

impl<T: DisplaySink + ?Sized> DisplaySink for Box<T> {
    fn show(&mut self, image: &DynamicImage) -> Result<(), anyhow::Error> {
        (**self).show(image)
    }

    fn clear(&mut self) -> Result<(), anyhow::Error> {
        (**self).clear()
    }
}

/// Writes every shown frame to `display-latest.png` plus a timestamped copy.
#[derive(Debug, Clone)]
pub struct FileSink {
    output_dir: PathBuf,
    panel: Dimensions,
    rotate: bool,
}

impl FileSink {
    /// `panel` is the portrait size of the compositions being shown.
    pub fn new(output_dir: impl Into<PathBuf>, panel: Dimensions, rotate: bool) -> Self {
        Self {
            output_dir: output_dir.into(),
            panel,
            rotate,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn latest_path(&self) -> PathBuf {
        self.output_dir.join(LATEST_FILE_NAME)
    }

    fn write(&self, image: &DynamicImage, stamped_prefix: &str) -> Result<PathBuf, anyhow::Error> {
        std::fs::create_dir_all(&self.output_dir)
            .with_context(|| format!("create output dir '{}'", self.output_dir.display()))?;

        let latest = self.latest_path();
        image
            .save_with_format(&latest, image::ImageFormat::Png)
            .with_context(|| format!("write png '{}'", latest.display()))?;

        let stamp = Local::now().format("%Y%m%d-%H%M%S%.3f");
        let stamped = self.output_dir.join(format!("{stamped_prefix}-{stamp}.png"));
        std::fs::copy(&latest, &stamped)
            .with_context(|| format!("copy '{}' to '{}'", latest.display(), stamped.display()))?;
        Ok(stamped)
    }
}

impl DisplaySink for FileSink {
    fn show(&mut self, image: &DynamicImage) -> Result<(), anyhow::Error> {
        let oriented = orient_for_panel(image, self.rotate);
        let path = self.write(&oriented, "display")?;
        tracing::info!(path = %path.display(), "Frame updated");
        Ok(())
    }

    fn clear(&mut self) -> Result<(), anyhow::Error> {
        let (w, h) = self.panel.as_pair();
        let blank = DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb([255, 255, 255])));
        let path = self.write(&orient_for_panel(&blank, self.rotate), "clear")?;
        tracing::info!(path = %path.display(), "Frame cleared");
        Ok(())
    }
}
