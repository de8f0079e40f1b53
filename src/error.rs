//! Error types for the skin-pack crate.

use std::path::PathBuf;

/// Errors that can occur while building masks, compositing templates, or packaging.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Mask and template do not share pixel dimensions in the strict cutout flow.
    #[error("mask is {mask_width}x{mask_height} but template is {width}x{height}")]
    DimensionMismatch {
        /// Mask width in pixels.
        mask_width: u32,
        /// Mask height in pixels.
        mask_height: u32,
        /// Template width in pixels.
        width: u32,
        /// Template height in pixels.
        height: u32,
    },

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The image format is not supported for output.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// An error occurred during image processing (load, save, encode).
    #[error("image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// The zip writer rejected an entry or failed to finish the archive.
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Walking the directory tree to archive failed.
    #[error("failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// A path inside the archived tree is not below its root.
    #[error("path {} is outside of {}", .path.display(), .root.display())]
    OutsideRoot {
        /// Offending path.
        path: PathBuf,
        /// Root of the archived tree.
        root: PathBuf,
    },

    /// Neither `HOME` nor `USERPROFILE` is set.
    #[error("cannot resolve the home directory")]
    HomeDirUnavailable,
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let io_err = Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(io_err.to_string().contains("gone"));

        let unsupported = Error::UnsupportedFormat("tiff".to_string());
        assert!(unsupported.to_string().contains("tiff"));

        let mismatch = Error::DimensionMismatch {
            mask_width: 64,
            mask_height: 32,
            width: 128,
            height: 64,
        };
        let msg = mismatch.to_string();
        assert!(msg.contains("64x32"));
        assert!(msg.contains("128x64"));

        let outside = Error::OutsideRoot {
            path: PathBuf::from("/a/b"),
            root: PathBuf::from("/c"),
        };
        assert!(outside.to_string().contains("/a/b"));
    }
}
