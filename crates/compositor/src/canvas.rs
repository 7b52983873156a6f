//! Canvas primitives: blank surfaces, alpha-aware paste, resize and padding.

use image::imageops::FilterType;
use image::{Rgba, RgbaImage};
use tracing::debug;

use crate::dimensions::Dimensions;
use crate::{CompositionError, Result};

/// Opaque black, the background of every padded surface.
pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Padding on the four sides of an image, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Padding {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

impl Padding {
    /// The same amount on every side.
    pub fn uniform(amount: u32) -> Self {
        Self::sides(amount, amount, amount, amount)
    }

    /// Top, right, bottom, left.
    pub fn sides(top: u32, right: u32, bottom: u32, left: u32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn horizontal(&self) -> u32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> u32 {
        self.top + self.bottom
    }

    /// Whether shrinking an image by this padding keeps its aspect ratio
    /// change symmetric (`left + right == top + bottom`).
    pub fn is_balanced(&self) -> bool {
        self.horizontal() == self.vertical()
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    /// Multiply every side by `factor`, rounding to the nearest pixel.
    ///
    /// Per-axis totals are rounded before being split between the two sides,
    /// so a balanced padding stays balanced.
    pub fn scaled(&self, factor: f64) -> Self {
        let s = |v: u32| (f64::from(v) * factor).round() as u32;
        let (top, left) = (s(self.top), s(self.left));
        let bottom = s(self.vertical()) - top;
        let right = s(self.horizontal()) - left;
        Self::sides(top, right, bottom, left)
    }
}

/// Allocate a solid-colour surface of exactly `dimensions`.
pub fn new_canvas(dimensions: Dimensions, fill: Rgba<u8>) -> RgbaImage {
    let (w, h) = dimensions.as_pair();
    RgbaImage::from_pixel(w, h, fill)
}

/// Paste `src` onto `dst` with its top-left corner at `(x, y)`.
///
/// `src` is alpha-composited: fully transparent pixels leave `dst` untouched.
/// Anything falling outside `dst` is clipped, so offsets may be negative.
pub fn paste(dst: &mut RgbaImage, src: &RgbaImage, x: i64, y: i64) {
    let (dst_w, dst_h) = (i64::from(dst.width()), i64::from(dst.height()));
    for (sx, sy, pixel) in src.enumerate_pixels() {
        let tx = x + i64::from(sx);
        let ty = y + i64::from(sy);
        if tx < 0 || ty < 0 || tx >= dst_w || ty >= dst_h {
            continue;
        }
        let (tx, ty) = (tx as u32, ty as u32);
        let alpha = f32::from(pixel[3]) / 255.0;
        if alpha > 0.99 {
            dst.put_pixel(tx, ty, *pixel);
        } else if alpha > 0.01 {
            let bg = *dst.get_pixel(tx, ty);
            dst.put_pixel(tx, ty, blend_pixel(&bg, pixel, alpha));
        }
    }
}

/// Scale `src` to exactly `dimensions`. Aspect ratio is the caller's concern.
pub fn resize(src: &RgbaImage, dimensions: Dimensions) -> RgbaImage {
    let (w, h) = dimensions.as_pair();
    if src.dimensions() == (w, h) {
        return src.clone();
    }
    debug!(
        orig_w = src.width(),
        orig_h = src.height(),
        new_width = w,
        new_height = h,
        "Resizing image"
    );
    image::imageops::resize(src, w, h, FilterType::Lanczos3)
}

/// Pad every side of `src` by `amount`. See [`pad_sides`].
pub fn pad_uniform(src: &RgbaImage, amount: u32) -> Result<RgbaImage> {
    pad_sides(src, Padding::uniform(amount))
}

/// Shrink the content of `src` inside `padding`, keeping the outer size.
///
/// The content is resized to `(w - left - right, h - top - bottom)` and placed
/// at `(left, top)` on an opaque black surface the size of `src`.
pub fn pad_sides(src: &RgbaImage, padding: Padding) -> Result<RgbaImage> {
    if !padding.is_balanced() {
        return Err(CompositionError::UnbalancedPadding(padding));
    }
    if padding.is_zero() {
        return Ok(src.clone());
    }

    let (width, height) = src.dimensions();
    let too_large = || CompositionError::PaddingTooLarge {
        padding,
        width,
        height,
    };
    let inner_w = width.checked_sub(padding.horizontal()).ok_or_else(too_large)?;
    let inner_h = height.checked_sub(padding.vertical()).ok_or_else(too_large)?;
    let interior = Dimensions::new(inner_w, inner_h).map_err(|_| too_large())?;

    debug!(width, height, ?padding, "Padding image");
    let mut padded = new_canvas(Dimensions::new(width, height)?, BLACK);
    paste(
        &mut padded,
        &resize(src, interior),
        i64::from(padding.left),
        i64::from(padding.top),
    );
    Ok(padded)
}

fn blend_pixel(bg: &Rgba<u8>, fg: &Rgba<u8>, alpha: f32) -> Rgba<u8> {
    let inv = 1.0 - alpha;
    let bg_alpha = f32::from(bg[3]) / 255.0;
    Rgba([
        (f32::from(fg[0]) * alpha + f32::from(bg[0]) * inv) as u8,
        (f32::from(fg[1]) * alpha + f32::from(bg[1]) * inv) as u8,
        (f32::from(fg[2]) * alpha + f32::from(bg[2]) * inv) as u8,
        ((alpha + bg_alpha * inv) * 255.0).round() as u8,
    ])
}
