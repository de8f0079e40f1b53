//! Batch-edit folders of sprite templates with transparency masks and custom art.
//!
//! A mask template marks the regions to cut out of every sprite: pixels whose
//! red, green, and blue channels all exceed 200 become fully transparent, all
//! others stay opaque. Two flows share that mask:
//!
//! - **Cutout**: every template keeps its pixels where the mask is opaque and
//!   becomes `(0, 0, 0, 0)` where it is cut.
//! - **Embed**: user art is weighted by the mask's luminance and pasted onto
//!   every template at the top-left corner.
//!
//! Results are written one file per template and can be zipped for distribution.
//!
//! # Quick Start
//!
//! ```no_run
//! use skin_pack::{PackConfig, SkinPackEngine};
//!
//! let engine = SkinPackEngine::new(PackConfig::default());
//! let report = engine.mask_templates().expect("setup failed");
//! println!("{} written, {} failed", report.saved_count(), report.failed_count());
//! ```
//!
//! # Embedding
//!
//! ```no_run
//! use std::path::Path;
//! use skin_pack::{ArchiveLocation, PackConfig, SkinPackEngine};
//!
//! let engine = SkinPackEngine::new(PackConfig::default());
//! let report = engine.embed_image(Path::new("logo.png")).expect("setup failed");
//! let base = engine.config().archive_base(ArchiveLocation::Desktop).unwrap();
//! let zip = engine.package(&base).unwrap();
//! println!("{} templates, archive at {}", report.results.len(), zip.display());
//! ```

#![deny(missing_docs)]

pub mod composite;
mod engine;
pub mod error;
pub mod mask;
pub mod package;

pub use engine::{
    is_template, list_templates, save_image, write_mask, BatchReport, PackConfig, SkinPackEngine,
    TemplateResult, DEFAULT_MASK_FILE, DEFAULT_PACK_NAME, DEFAULT_TEMPLATE_DIR, EMBED_OFFSET,
};
pub use error::{Error, Result};
pub use mask::Mask;
pub use package::{archive_directory, ArchiveLocation};
