//! Width/height value type shared by every composition step.

use std::fmt;

use crate::{CompositionError, Result};

/// An immutable pair of positive width and height, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    width: u32,
    height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(CompositionError::InvalidDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    /// Dimensions of an existing image buffer.
    pub fn of<I: image::GenericImageView>(img: &I) -> Result<Self> {
        let (width, height) = img.dimensions();
        Self::new(width, height)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Return `(width, height)`.
    pub fn as_pair(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Squares count as portrait.
    pub fn is_portrait(&self) -> bool {
        self.height >= self.width
    }

    /// One quadrant of a 2x2 grid laid over these dimensions.
    pub fn half(&self) -> Result<Self> {
        Self::new(self.width / 2, self.height / 2)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.width, self.height)
    }
}

impl TryFrom<(u32, u32)> for Dimensions {
    type Error = CompositionError;

    fn try_from((width, height): (u32, u32)) -> Result<Self> {
        Self::new(width, height)
    }
}
