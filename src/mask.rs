//! Binary transparency masks.
//!
//! A mask template is a greyscale or colour image where near-white regions mark
//! the areas to cut out of every sprite template:
//! `cut = R > 200 && G > 200 && B > 200`
//!
//! Cut pixels become `(0, 0, 0, 0)`, everything else `(0, 0, 0, 255)`. Only the
//! alpha channel is meaningful downstream.

use image::{DynamicImage, Rgba, RgbaImage};

use crate::error::{Error, Result};

/// Channel threshold: a pixel is "white" when every colour channel exceeds it.
pub const WHITE_THRESHOLD: u8 = 200;

const CUT: Rgba<u8> = Rgba([0, 0, 0, 0]);
const KEPT: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// A binary alpha mask derived from a mask template.
///
/// Every pixel is either cut (alpha 0) or kept (alpha 255). Build one with
/// [`Mask::from_image`]; it is read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    image: RgbaImage,
}

impl Mask {
    /// Build a mask from any decodable image, coerced to RGBA.
    ///
    /// The input alpha channel is ignored; only the colour channels decide.
    #[must_use]
    pub fn from_image(source: &DynamicImage) -> Self {
        Self::from_rgba(&source.to_rgba8())
    }

    /// Build a mask from an RGBA buffer.
    #[must_use]
    pub fn from_rgba(source: &RgbaImage) -> Self {
        let image = RgbaImage::from_fn(source.width(), source.height(), |x, y| {
            if is_white(*source.get_pixel(x, y)) {
                CUT
            } else {
                KEPT
            }
        });
        Self { image }
    }

    /// Load a mask template from disk and build the mask.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Image`] if the file cannot be opened or decoded.
    pub fn open(path: &std::path::Path) -> Result<Self> {
        let source = image::open(path)?;
        Ok(Self::from_image(&source))
    }

    /// Mask width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Mask height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Whether the pixel at `(x, y)` is cut out.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is out of bounds.
    #[must_use]
    pub fn is_cut(&self, x: u32, y: u32) -> bool {
        self.image.get_pixel(x, y)[3] == 0
    }

    /// The underlying RGBA image, suitable for saving.
    #[must_use]
    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    /// Apply the mask to a template as a strict cutout.
    ///
    /// Where the mask is cut, the output pixel is `(0, 0, 0, 0)`; elsewhere the
    /// template pixel is copied unchanged, alpha included.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if the template and mask differ in size.
    pub fn cut(&self, template: &RgbaImage) -> Result<RgbaImage> {
        if template.dimensions() != self.image.dimensions() {
            return Err(Error::DimensionMismatch {
                mask_width: self.width(),
                mask_height: self.height(),
                width: template.width(),
                height: template.height(),
            });
        }

        let mut out = template.clone();
        for (px, mask_px) in out.pixels_mut().zip(self.image.pixels()) {
            if mask_px[3] == 0 {
                *px = CUT;
            }
        }
        Ok(out)
    }
}

fn is_white(px: Rgba<u8>) -> bool {
    px[0] > WHITE_THRESHOLD && px[1] > WHITE_THRESHOLD && px[2] > WHITE_THRESHOLD
}
