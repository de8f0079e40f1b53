//! Zip packaging of the output directory.

use std::fs::File;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{Error, Result};

/// Well-known folder under the user's home directory that receives the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveLocation {
    /// `~/Downloads`, used by the mask flow.
    Downloads,
    /// `~/Desktop`, used by the embed flow.
    Desktop,
}

impl ArchiveLocation {
    /// Folder name below the home directory.
    #[must_use]
    pub fn folder_name(self) -> &'static str {
        match self {
            Self::Downloads => "Downloads",
            Self::Desktop => "Desktop",
        }
    }

    /// Resolve against the current user's home directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HomeDirUnavailable`] if neither `HOME` nor `USERPROFILE` is set.
    pub fn resolve(self) -> Result<PathBuf> {
        Ok(home_dir()?.join(self.folder_name()))
    }
}

/// The current user's home directory, from `HOME` or `USERPROFILE`.
///
/// # Errors
///
/// Returns [`Error::HomeDirUnavailable`] if neither variable is set to a non-empty value.
pub fn home_dir() -> Result<PathBuf> {
    ["HOME", "USERPROFILE"]
        .iter()
        .filter_map(std::env::var_os)
        .find(|v| !v.is_empty())
        .map(PathBuf::from)
        .ok_or(Error::HomeDirUnavailable)
}

/// Archive path for a base path: `<base>.zip`.
///
/// The suffix is appended, so names containing dots or spaces are kept whole.
#[must_use]
pub fn archive_path(base: &Path) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(".zip");
    PathBuf::from(name)
}

/// Compress the whole `source_dir` tree into `<dest_base>.zip`.
///
/// Any existing file at that path is deleted first; archives are never merged.
/// Entries are stored relative to `source_dir` with `/` separators, in sorted
/// order, directories included. Returns the archive path.
///
/// # Errors
///
/// Fails if the old archive cannot be removed, the tree cannot be walked, or
/// the archive cannot be written.
pub fn archive_directory(source_dir: &Path, dest_base: &Path) -> Result<PathBuf> {
    let zip_path = archive_path(dest_base);

    if zip_path.exists() {
        std::fs::remove_file(&zip_path)?;
    }
    if let Some(parent) = zip_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // Collect first so the new archive never lists itself.
    let entries: Vec<_> = WalkDir::new(source_dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .collect::<std::result::Result<_, _>>()?;

    let mut zip = ZipWriter::new(File::create(&zip_path)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in entries {
        let path = entry.path();
        if path == zip_path {
            continue;
        }
        let name = entry_name(source_dir, path)?;

        if entry.file_type().is_dir() {
            zip.add_directory(format!("{name}/"), options)?;
        } else if entry.file_type().is_file() {
            zip.start_file(name, options)?;
            let mut file = File::open(path)?;
            std::io::copy(&mut file, &mut zip)?;
        }
    }

    zip.finish()?;
    Ok(zip_path)
}

/// Archive entry name for `path`, relative to `root` and joined with `/`.
fn entry_name(root: &Path, path: &Path) -> Result<String> {
    let relative = path.strip_prefix(root).map_err(|_| Error::OutsideRoot {
        path: path.to_path_buf(),
        root: root.to_path_buf(),
    })?;

    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    Ok(parts.join("/"))
}
