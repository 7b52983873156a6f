//! Decorative overlay assets and the caption font.
//!
//! The compositor never touches the filesystem directly: overlay rasters come
//! from an injected [`AssetLoader`], and the font is handed over at
//! construction.

use std::path::{Path, PathBuf};

use ab_glyph::FontArc;
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use tracing::{debug, info};

use crate::canvas::Padding;
use crate::{CompositionError, Result};

/// Vertical nudge for text drawn under the label backdrop.
///
/// The label artwork sits slightly high inside its transparent margin, so text
/// centered on the box reads as too low. Calibrated for `label.png`.
pub const LABEL_TEXT_Y_SHIFT: i32 = -2;

/// Border thickness of `frame.png`, in asset pixels.
const FRAME_PADDING: u32 = 12;

/// Margin of `label.png` around its text area, in asset pixels.
const LABEL_PADDING: u32 = 6;

/// The decorative rasters the builders overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayAsset {
    /// Border drawn around the picture.
    Frame,
    /// Backdrop drawn behind caption and selector text.
    Label,
}

impl OverlayAsset {
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Frame => "frame.png",
            Self::Label => "label.png",
        }
    }

    /// Inset applied to the underlying image so the asset never covers it.
    pub fn padding(&self) -> Padding {
        match self {
            Self::Frame => Padding::uniform(FRAME_PADDING),
            Self::Label => Padding::uniform(LABEL_PADDING),
        }
    }

    /// Offset for text rendered beneath this asset.
    pub fn text_offset(&self) -> (i32, i32) {
        match self {
            Self::Frame => (0, 0),
            Self::Label => (0, LABEL_TEXT_Y_SHIFT),
        }
    }
}

/// Source of overlay rasters.
pub trait AssetLoader {
    fn load(&self, asset: OverlayAsset) -> Result<RgbaImage>;
}

impl<T: AssetLoader + ?Sized> AssetLoader for &T {
    fn load(&self, asset: OverlayAsset) -> Result<RgbaImage> {
        (**self).load(asset)
    }
}

impl<T: AssetLoader + ?Sized> AssetLoader for Box<T> {
    fn load(&self, asset: OverlayAsset) -> Result<RgbaImage> {
        (**self).load(asset)
    }
}

/// Loads `frame.png` and `label.png` from a directory on every call.
#[derive(Debug, Clone)]
pub struct DirAssetLoader {
    dir: PathBuf,
}

impl DirAssetLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl AssetLoader for DirAssetLoader {
    fn load(&self, asset: OverlayAsset) -> Result<RgbaImage> {
        let path = self.dir.join(asset.file_name());
        debug!(path = %path.display(), "Loading overlay asset");
        let img = image::open(&path).map_err(|source| CompositionError::AssetLoad { path, source })?;
        Ok(img.to_rgba8())
    }
}

/// Procedurally drawn stand-ins for the shipped artwork.
///
/// Same geometry as the files `DirAssetLoader` expects: an opaque border of
/// the asset's padding width around a fully transparent interior.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeneratedAssets;

impl GeneratedAssets {
    const FRAME_SIZE: (u32, u32) = (300, 400);
    const LABEL_SIZE: (u32, u32) = (240, 80);
    const FRAME_COLOR: Rgba<u8> = Rgba([92, 64, 40, 255]);
    const FRAME_TRIM: Rgba<u8> = Rgba([201, 162, 39, 255]);
    const LABEL_COLOR: Rgba<u8> = Rgba([230, 230, 230, 255]);
}

impl AssetLoader for GeneratedAssets {
    fn load(&self, asset: OverlayAsset) -> Result<RgbaImage> {
        let img = match asset {
            OverlayAsset::Frame => {
                let mut img = bordered(Self::FRAME_SIZE, FRAME_PADDING, Self::FRAME_COLOR);
                // thin trim on the inner edge of the border
                let (w, h) = Self::FRAME_SIZE;
                let t = FRAME_PADDING - 2;
                draw_ring(&mut img, t, t, w - 2 * t, h - 2 * t, 2, Self::FRAME_TRIM);
                img
            }
            OverlayAsset::Label => bordered(Self::LABEL_SIZE, LABEL_PADDING, Self::LABEL_COLOR),
        };
        Ok(img)
    }
}

fn bordered((w, h): (u32, u32), thickness: u32, color: Rgba<u8>) -> RgbaImage {
    let mut img = RgbaImage::from_pixel(w, h, Rgba([0, 0, 0, 0]));
    draw_ring(&mut img, 0, 0, w, h, thickness, color);
    img
}

fn draw_ring(img: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, thickness: u32, color: Rgba<u8>) {
    let (x, y) = (x as i32, y as i32);
    let edges = [
        Rect::at(x, y).of_size(w, thickness),
        Rect::at(x, y + (h - thickness) as i32).of_size(w, thickness),
        Rect::at(x, y).of_size(thickness, h),
        Rect::at(x + (w - thickness) as i32, y).of_size(thickness, h),
    ];
    for rect in edges {
        draw_filled_rect_mut(img, rect, color);
    }
}

/// Load a TTF/OTF font file.
pub fn load_font(path: impl AsRef<Path>) -> Result<FontArc> {
    let path = path.as_ref();
    let data = std::fs::read(path)
        .map_err(|e| CompositionError::FontLoad(format!("{}: {e}", path.display())))?;
    FontArc::try_from_vec(data).map_err(|_| {
        CompositionError::FontLoad(format!("{}: not a TTF/OTF font", path.display()))
    })
}

/// Load the first readable font among `candidates`.
pub fn load_first_font<P: AsRef<Path>>(candidates: &[P]) -> Result<FontArc> {
    for path in candidates {
        if let Ok(font) = load_font(path) {
            info!(path = %path.as_ref().display(), "Using font");
            return Ok(font);
        }
    }
    Err(CompositionError::FontLoad(
        "no usable font found (set a font path or install system fonts)".to_string(),
    ))
}

/// Well-known system font locations, tried in order.
pub fn system_font_candidates() -> &'static [&'static str] {
    #[cfg(target_os = "macos")]
    {
        &[
            "/System/Library/Fonts/Supplemental/Arial.ttf",
            "/System/Library/Fonts/Supplemental/Georgia.ttf",
            "/Library/Fonts/Arial Unicode.ttf",
        ]
    }
    #[cfg(target_os = "windows")]
    {
        &["C:\\Windows\\Fonts\\arial.ttf", "C:\\Windows\\Fonts\\segoeui.ttf"]
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        &[
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/TTF/DejaVuSans.ttf",
            "/usr/share/fonts/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
            "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
            "/usr/share/fonts/noto/NotoSans-Regular.ttf",
        ]
    }
}

/// A system font for tests that rasterize text.
///
/// Panics when none of the candidates is installed: the layout tests need a
/// real font to measure anything.
#[cfg(test)]
pub(crate) fn test_font() -> FontArc {
    load_first_font(system_font_candidates())
        .expect("text rendering tests need a system font (install DejaVu Sans or Liberation Sans)")
}
