//! Display image and collage builders.
//!
//! Both builders share one recipe: picture resized to a square at the top,
//! frame overlay, then a caption band underneath with the label backdrop.
//! The collage applies it to each quadrant of a 2x2 grid at half size.

use ab_glyph::FontArc;
use image::{DynamicImage, RgbaImage};
use tracing::{debug, info};

use crate::assets::{AssetLoader, OverlayAsset};
use crate::canvas::{self, BLACK, Padding};
use crate::dimensions::Dimensions;
use crate::overlay::overlay_asset;
use crate::text::{self, TextRenderer, TextStyle};
use crate::{
    CAPTION_FONT_SIZE, CAPTION_LINE_LENGTH, CompositionError, LABEL_FONT_SIZE, Result,
};

/// A quadrant of the chooser collage, in label order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl GridPosition {
    /// Every position, in the order images and labels are assigned.
    pub const ALL: [GridPosition; 4] = [
        Self::TopLeft,
        Self::TopRight,
        Self::BottomLeft,
        Self::BottomRight,
    ];

    /// Selector label printed under this quadrant.
    pub fn label(&self) -> &'static str {
        match self {
            Self::TopLeft => "A",
            Self::TopRight => "B",
            Self::BottomLeft => "C",
            Self::BottomRight => "D",
        }
    }

    /// All four labels in position order.
    pub fn labels() -> [&'static str; 4] {
        Self::ALL.map(|p| p.label())
    }

    pub fn index(&self) -> usize {
        match self {
            Self::TopLeft => 0,
            Self::TopRight => 1,
            Self::BottomLeft => 2,
            Self::BottomRight => 3,
        }
    }

    fn is_left(&self) -> bool {
        matches!(self, Self::TopLeft | Self::BottomLeft)
    }

    fn is_top(&self) -> bool {
        matches!(self, Self::TopLeft | Self::TopRight)
    }

    /// Pixel offset of this quadrant for cells of size `cell`.
    pub fn offset(&self, cell: Dimensions) -> (u32, u32) {
        let x = if self.is_left() { 0 } else { cell.width() };
        let y = if self.is_top() { 0 } else { cell.height() };
        (x, y)
    }

    /// Padding giving outer margins of `grid_padding` and gutters of the same
    /// width between cells (half from each neighbour).
    ///
    /// Always balanced: both axes get one full and one half share.
    pub fn padding(&self, grid_padding: u32) -> Padding {
        let full = grid_padding;
        let half = grid_padding / 2;
        let (left, right) = if self.is_left() { (full, half) } else { (half, full) };
        let (top, bottom) = if self.is_top() { (full, half) } else { (half, full) };
        Padding::sides(top, right, bottom, left)
    }
}

/// Builds the images shown on the frame.
pub struct Compositor<L> {
    loader: L,
    text: TextRenderer,
}

impl<L: AssetLoader> Compositor<L> {
    pub fn new(loader: L, font: FontArc) -> Self {
        Self {
            loader,
            text: TextRenderer::new(font),
        }
    }

    pub fn text_renderer(&self) -> &TextRenderer {
        &self.text
    }

    /// Load `asset` and overlay it on `base` with the asset's own padding.
    pub fn overlay(&self, base: &RgbaImage, asset: OverlayAsset) -> Result<RgbaImage> {
        let raster = self.loader.load(asset)?;
        overlay_asset(base, &raster, asset.padding())
    }

    /// The chosen picture with its prompt as caption, sized exactly `output`.
    pub fn build_display_image(
        &self,
        image: &DynamicImage,
        caption: &str,
        output: Dimensions,
    ) -> Result<DynamicImage> {
        ensure_portrait(output)?;
        info!(%output, caption_len = caption.chars().count(), "Building display image");

        let caption = text::wrap(caption, CAPTION_LINE_LENGTH);
        let composed = self.captioned(&image.to_rgba8(), &caption, output, CAPTION_FONT_SIZE)?;
        Ok(DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(composed).to_rgb8()))
    }

    /// Up to four pictures on a 2x2 grid, each captioned with its label.
    ///
    /// The i-th image and label go to `GridPosition::ALL[i]`; quadrants
    /// without an image stay black.
    ///
    /// Besides the argument checks (`NotPortrait`, `TooManyImages`,
    /// `OddGridPadding`, `MissingLabel`), fails with `InvalidDimensions` when
    /// `output` is narrower than 2 px (no room for two cells) and with
    /// `PaddingTooLarge` when `grid_padding` leaves no room inside a cell.
    pub fn build_collage<S: AsRef<str>>(
        &self,
        images: &[DynamicImage],
        labels: &[S],
        output: Dimensions,
        grid_padding: u32,
    ) -> Result<DynamicImage> {
        ensure_portrait(output)?;
        if images.len() > GridPosition::ALL.len() {
            return Err(CompositionError::TooManyImages(images.len()));
        }
        if grid_padding % 2 != 0 {
            return Err(CompositionError::OddGridPadding(grid_padding));
        }
        if labels.len() < images.len() {
            return Err(CompositionError::MissingLabel {
                images: images.len(),
                labels: labels.len(),
            });
        }
        info!(%output, count = images.len(), grid_padding, "Building collage");

        let mut collage = canvas::new_canvas(output, BLACK);
        let cell = output.half()?;
        for ((image, label), position) in images.iter().zip(labels).zip(GridPosition::ALL) {
            let captioned = self.captioned(&image.to_rgba8(), label.as_ref(), cell, LABEL_FONT_SIZE)?;
            let padded = canvas::pad_sides(&captioned, position.padding(grid_padding))?;
            let (x, y) = position.offset(cell);
            debug!(?position, x, y, "Placing collage cell");
            canvas::paste(&mut collage, &padded, i64::from(x), i64::from(y));
        }

        Ok(DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(collage).to_rgb8()))
    }

    /// Square picture over a caption band, framed, exactly `dims` in size.
    fn captioned(&self, picture: &RgbaImage, caption: &str, dims: Dimensions, font_size: f32) -> Result<RgbaImage> {
        let side = dims.width();
        let mut composed = canvas::new_canvas(dims, BLACK);
        canvas::paste(&mut composed, &canvas::resize(picture, Dimensions::new(side, side)?), 0, 0);
        let mut composed = self.overlay(&composed, OverlayAsset::Frame)?;

        let band_height = dims.height() - side;
        if band_height == 0 {
            debug!(%dims, "Square output, no room for a caption");
            return Ok(composed);
        }

        let band = Dimensions::new(side, band_height)?;
        let style = TextStyle::default()
            .with_font_size(font_size)
            .with_offset(OverlayAsset::Label.text_offset());
        let text_box = self.text.render_text_box(caption, band, &style);
        let label = self.overlay(&text_box, OverlayAsset::Label)?;
        canvas::paste(&mut composed, &label, 0, i64::from(side));
        Ok(composed)
    }
}

fn ensure_portrait(output: Dimensions) -> Result<()> {
    if output.is_portrait() {
        Ok(())
    } else {
        Err(CompositionError::NotPortrait(output))
    }
}
