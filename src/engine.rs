//! Batch driver: configuration, template discovery, and the per-template fold.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbaImage};

use crate::composite;
use crate::error::{Error, Result};
use crate::mask::Mask;
use crate::package::{self, ArchiveLocation};

/// Default mask template file name, relative to the base directory.
pub const DEFAULT_MASK_FILE: &str = "mask.png";
/// Default template directory name, relative to the base directory.
pub const DEFAULT_TEMPLATE_DIR: &str = "jerseys";
/// Default output directory and archive name.
pub const DEFAULT_PACK_NAME: &str = "NHL Uniforms Skin Pack";

/// Offset at which embedded art is pasted onto every template.
pub const EMBED_OFFSET: (u32, u32) = (0, 0);

/// Paths used by one run. Built once and passed to every component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackConfig {
    /// Mask template image.
    pub mask_path: PathBuf,
    /// Directory holding the `.png` templates.
    pub template_dir: PathBuf,
    /// Directory receiving one output image per template.
    pub output_dir: PathBuf,
    /// Archive file name, without the `.zip` extension.
    pub archive_name: String,
}

impl PackConfig {
    /// Resolve the fixed layout against a base directory.
    #[must_use]
    pub fn from_base_dir(base: &Path) -> Self {
        Self {
            mask_path: base.join(DEFAULT_MASK_FILE),
            template_dir: base.join(DEFAULT_TEMPLATE_DIR),
            output_dir: base.join(DEFAULT_PACK_NAME),
            archive_name: DEFAULT_PACK_NAME.to_string(),
        }
    }

    /// Archive base path (without `.zip`) inside `dir`.
    #[must_use]
    pub fn archive_base_in(&self, dir: &Path) -> PathBuf {
        dir.join(&self.archive_name)
    }

    /// Archive base path (without `.zip`) under a well-known home folder.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HomeDirUnavailable`] if the home directory cannot be resolved.
    pub fn archive_base(&self, location: ArchiveLocation) -> Result<PathBuf> {
        Ok(self.archive_base_in(&location.resolve()?))
    }
}

impl Default for PackConfig {
    fn default() -> Self {
        Self::from_base_dir(Path::new("."))
    }
}

/// Outcome of processing one template.
#[derive(Debug)]
pub enum TemplateResult {
    /// The template was transformed and written.
    Saved {
        /// Source template.
        template: PathBuf,
        /// Written output file.
        output: PathBuf,
    },
    /// Loading, transforming, or saving the template failed.
    Failed {
        /// Source template.
        template: PathBuf,
        /// What went wrong.
        error: Error,
    },
}

impl TemplateResult {
    /// Source template path.
    #[must_use]
    pub fn template(&self) -> &Path {
        match self {
            Self::Saved { template, .. } | Self::Failed { template, .. } => template,
        }
    }

    /// Template file name, for display.
    #[must_use]
    pub fn filename(&self) -> String {
        let path = self.template();
        path.file_name().map_or_else(
            || path.display().to_string(),
            |f| f.to_string_lossy().to_string(),
        )
    }

    /// Whether the output was written.
    #[must_use]
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }
}

/// Aggregate outcome of a batch, one entry per template in sorted order.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Per-template results.
    pub results: Vec<TemplateResult>,
}

impl BatchReport {
    /// Number of templates written.
    #[must_use]
    pub fn saved_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_saved()).count()
    }

    /// Number of templates that failed.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.results.len() - self.saved_count()
    }

    /// Failed entries only.
    pub fn failures(&self) -> impl Iterator<Item = &TemplateResult> {
        self.results.iter().filter(|r| !r.is_saved())
    }

    /// Whether every template was written.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed_count() == 0
    }
}

/// Runs the mask and embed flows over a template set.
///
/// Each flow loads its shared inputs once, then folds over the sorted
/// templates one at a time. Setup failures are returned as `Err`; per-template
/// failures are recorded in the [`BatchReport`] and never abort the batch.
pub struct SkinPackEngine {
    config: PackConfig,
}

impl SkinPackEngine {
    /// Create an engine for one run.
    #[must_use]
    pub fn new(config: PackConfig) -> Self {
        Self { config }
    }

    /// The run configuration.
    #[must_use]
    pub fn config(&self) -> &PackConfig {
        &self.config
    }

    /// Load the mask template and build the binary mask.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Image`] if the mask template cannot be decoded.
    pub fn build_mask(&self) -> Result<Mask> {
        Mask::open(&self.config.mask_path)
    }

    /// Cut the mask out of every template.
    ///
    /// # Errors
    ///
    /// Fails if the mask cannot be loaded, the template directory cannot be
    /// listed, or the output directory cannot be created.
    pub fn mask_templates(&self) -> Result<BatchReport> {
        let mask = self.build_mask()?;
        self.run_batch(|template| {
            let image = image::open(template)?.to_rgba8();
            mask.cut(&image)
        })
    }

    /// Embed user art into every template.
    ///
    /// The art is upscaled when 64x64, weighted by the mask template's
    /// luminance, then pasted at [`EMBED_OFFSET`] using its own alpha.
    ///
    /// # Errors
    ///
    /// Fails if the art or the mask template cannot be decoded, the template
    /// directory cannot be listed, or the output directory cannot be created.
    pub fn embed_image(&self, art_path: &Path) -> Result<BatchReport> {
        let art = image::open(art_path)?;
        let mask_source = image::open(&self.config.mask_path)?;
        let overlay = composite::prepare_overlay(&art, &mask_source);
        self.embed_overlay(&overlay)
    }

    /// Paste an already prepared overlay onto every template.
    ///
    /// # Errors
    ///
    /// Fails if the template directory cannot be listed or the output
    /// directory cannot be created.
    pub fn embed_overlay(&self, overlay: &RgbaImage) -> Result<BatchReport> {
        self.run_batch(|template| {
            let mut image = image::open(template)?.to_rgba8();
            composite::paste_with_alpha(&mut image, overlay, EMBED_OFFSET.0, EMBED_OFFSET.1);
            Ok(image)
        })
    }

    /// Archive the output directory as `<base>.zip`, replacing any previous archive.
    ///
    /// # Errors
    ///
    /// Fails if the archive cannot be written.
    pub fn package(&self, archive_base: &Path) -> Result<PathBuf> {
        package::archive_directory(&self.config.output_dir, archive_base)
    }

    fn run_batch<F>(&self, transform: F) -> Result<BatchReport>
    where
        F: Fn(&Path) -> Result<RgbaImage>,
    {
        let templates = template_entries(&self.config.template_dir)?;
        std::fs::create_dir_all(&self.config.output_dir)?;

        let results = templates
            .into_iter()
            .map(|(name, template)| {
                let output = self.config.output_dir.join(name);
                process_template(template, output, &transform)
            })
            .collect();
        Ok(BatchReport { results })
    }

}

fn process_template<F>(template: PathBuf, output: PathBuf, transform: &F) -> TemplateResult
where
    F: Fn(&Path) -> Result<RgbaImage>,
{
    match transform(&template).and_then(|image| save_image(&image, &output)) {
        Ok(()) => TemplateResult::Saved { template, output },
        Err(error) => TemplateResult::Failed { template, error },
    }
}

/// Check if a file name marks a template (case-sensitive `.png` suffix).
#[must_use]
pub fn is_template(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(".png"))
}

/// List the templates in `dir`, sorted by file name.
///
/// Only files with a `.png` suffix are returned; symlinks are followed.
///
/// # Errors
///
/// Returns [`Error::Io`] if the directory cannot be read.
pub fn list_templates(dir: &Path) -> Result<Vec<PathBuf>> {
    Ok(template_entries(dir)?.into_iter().map(|(_, path)| path).collect())
}

/// Templates in `dir` as `(file name, path)` pairs, sorted by file name.
fn template_entries(dir: &Path) -> Result<Vec<(OsString, PathBuf)>> {
    let mut templates = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if is_template(&path) && path.is_file() {
            if let Some(name) = path.file_name() {
                templates.push((name.to_os_string(), path));
            }
        }
    }
    templates.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(templates)
}

/// Save an RGBA image, choosing the encoder from the file extension.
///
/// # Errors
///
/// Returns an error if the format cannot carry alpha or writing fails.
pub fn save_image(img: &RgbaImage, path: &Path) -> Result<()> {
    let format =
        ImageFormat::from_path(path).map_err(|e| Error::UnsupportedFormat(e.to_string()))?;

    match format {
        ImageFormat::Png | ImageFormat::WebP | ImageFormat::Bmp => {
            img.save_with_format(path, format)?;
        }
        _ => {
            return Err(Error::UnsupportedFormat(format!("{format:?}")));
        }
    }

    Ok(())
}

/// Build the binary mask from `mask_path` and save it to `output`.
///
/// # Errors
///
/// Fails if the mask template cannot be decoded or the output cannot be written.
pub fn write_mask(mask_path: &Path, output: &Path) -> Result<Mask> {
    let mask = Mask::from_image(&image::open(mask_path)?);
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    save_image(mask.as_image(), output)?;
    Ok(mask)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_resolves_fixed_layout() {
        let cfg = PackConfig::from_base_dir(Path::new("/opt/pack"));
        assert_eq!(cfg.mask_path, PathBuf::from("/opt/pack/mask.png"));
        assert_eq!(cfg.template_dir, PathBuf::from("/opt/pack/jerseys"));
        assert_eq!(cfg.output_dir, PathBuf::from("/opt/pack/NHL Uniforms Skin Pack"));
        assert_eq!(
            cfg.archive_base_in(Path::new("/home/u/Desktop")),
            PathBuf::from("/home/u/Desktop/NHL Uniforms Skin Pack")
        );
    }

    #[test]
    fn is_template_matches_png_suffix_only() {
        assert!(is_template(Path::new("a.png")));
        assert!(is_template(Path::new("/x/team home.png")));
        assert!(!is_template(Path::new("a.PNG")));
        assert!(!is_template(Path::new("a.jpg")));
        assert!(!is_template(Path::new("png")));
    }

    #[test]
    fn report_counts_outcomes() {
        let report = BatchReport {
            results: vec![
                TemplateResult::Saved {
                    template: PathBuf::from("a.png"),
                    output: PathBuf::from("out/a.png"),
                },
                TemplateResult::Failed {
                    template: PathBuf::from("b.png"),
                    error: Error::UnsupportedFormat("x".into()),
                },
            ],
        };
        assert_eq!(report.saved_count(), 1);
        assert_eq!(report.failed_count(), 1);
        assert!(!report.is_clean());
        let failed: Vec<_> = report.failures().map(TemplateResult::filename).collect();
        assert_eq!(failed, vec!["b.png".to_string()]);
    }

    #[test]
    fn save_image_rejects_formats_without_alpha() {
        let img = RgbaImage::new(1, 1);
        let err = save_image(&img, Path::new("out.jpg")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }
}
