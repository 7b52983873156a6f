//! Image composition engine for the e-ink picture frame.
//!
//! Builds the 2x2 chooser collage and the final captioned display image
//! out of a few primitives: canvas padding, fixed-width text boxes, and
//! decorative overlays (frame border, label backdrop) scaled to fit.

pub mod assets;
pub mod builder;
pub mod canvas;
pub mod dimensions;
pub mod overlay;
pub mod text;

use std::path::PathBuf;

// Re-exports for convenience
pub use assets::{AssetLoader, DirAssetLoader, GeneratedAssets, OverlayAsset, load_font};
pub use builder::{Compositor, GridPosition};
pub use canvas::Padding;
pub use dimensions::Dimensions;
pub use text::{TextRenderer, TextStyle, wrap};

/// Portrait size of the 5.7" seven-colour panel the frame was built around.
pub const DEFAULT_OUTPUT: (u32, u32) = (448, 600);

/// Captions longer than this are hard-wrapped onto several lines.
pub const CAPTION_LINE_LENGTH: usize = 50;

/// Font size of the caption under the chosen image.
pub const CAPTION_FONT_SIZE: f32 = 16.0;

/// Font size of the selector labels in the collage.
pub const LABEL_FONT_SIZE: f32 = 10.0;

/// Collage padding used when the caller has no preference.
pub const DEFAULT_GRID_PADDING: u32 = 20;

/// Errors produced while composing images.
#[derive(Debug, thiserror::Error)]
pub enum CompositionError {
    #[error("invalid dimensions {width}x{height}: both sides must be positive")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("output dimensions {0} are not portrait")]
    NotPortrait(Dimensions),

    #[error("cannot build a collage from {0} images (at most 4)")]
    TooManyImages(usize),

    #[error("grid padding must be even, got {0}")]
    OddGridPadding(u32),

    #[error("{labels} labels supplied for {images} images")]
    MissingLabel { images: usize, labels: usize },

    #[error("padding {0:?} does not preserve the aspect ratio (left + right != top + bottom)")]
    UnbalancedPadding(Padding),

    #[error("padding {padding:?} leaves no room inside a {width}x{height} image")]
    PaddingTooLarge {
        padding: Padding,
        width: u32,
        height: u32,
    },

    #[error("failed to load asset {}: {source}", path.display())]
    AssetLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to load font: {0}")]
    FontLoad(String),
}

pub type Result<T> = std::result::Result<T, CompositionError>;
