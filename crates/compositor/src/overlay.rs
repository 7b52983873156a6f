//! Decorative overlays scaled to the width of the image they decorate.

use image::RgbaImage;
use tracing::debug;

use crate::canvas::{self, Padding};
use crate::dimensions::Dimensions;
use crate::Result;

/// Scale `asset` uniformly so its width equals `width`.
///
/// Returns the scaled asset and the factor applied.
pub fn fit_to_width(asset: &RgbaImage, width: u32) -> Result<(RgbaImage, f64)> {
    let source = Dimensions::of(asset)?;
    let factor = f64::from(width) / f64::from(source.width());
    let height = ((f64::from(source.height()) * factor).round() as u32).max(1);
    let scaled = canvas::resize(asset, Dimensions::new(width, height)?);
    Ok((scaled, factor))
}

/// Composite `asset` over `base` without hiding any of `base`'s content.
///
/// The asset is scaled to the width of `base` (keeping its own proportions),
/// `asset_padding` is scaled by the same factor, `base` is inset by that
/// padding, and the asset is then blended on top, centered vertically.
pub fn overlay_asset(base: &RgbaImage, asset: &RgbaImage, asset_padding: Padding) -> Result<RgbaImage> {
    let (scaled, factor) = fit_to_width(asset, base.width())?;
    let padding = asset_padding.scaled(factor);
    debug!(
        base_w = base.width(),
        base_h = base.height(),
        asset_h = scaled.height(),
        factor,
        ?padding,
        "Overlaying asset"
    );

    let mut out = canvas::pad_sides(base, padding)?;
    let y = (i64::from(out.height()) - i64::from(scaled.height())) / 2;
    canvas::paste(&mut out, &scaled, 0, y);
    Ok(out)
}
