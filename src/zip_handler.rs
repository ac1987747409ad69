use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;
use zip::ZipArchive;

use crate::error::{DtmError, Result};

pub(crate) fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|s| s.eq_ignore_ascii_case(ext))
}

/// `.zip` files directly inside `dir`, sorted by file name.
pub fn list_zip_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut zips = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && has_extension(&path, "zip") {
            zips.push(path);
        }
    }
    zips.sort();
    Ok(zips)
}

pub struct ZipHandler {
    path: PathBuf,
}

impl ZipHandler {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<ZipArchive<File>> {
        let file = File::open(&self.path)?;
        Ok(ZipArchive::new(file)?)
    }

    /// Names of the `.tif` entries, in archive order.
    pub fn list_tifs(&self) -> Result<Vec<String>> {
        let archive = self.open()?;
        let names = archive
            .file_names()
            .filter(|name| name.to_ascii_lowercase().ends_with(".tif"))
            .map(str::to_string)
            .collect();
        Ok(names)
    }

    /// Extracts `names` under `dest`, keeping each entry's internal directories.
    /// Returns the written paths.
    pub fn extract(&self, names: &[String], dest: &Path) -> Result<Vec<PathBuf>> {
        let mut archive = self.open()?;
        let archive_name = self
            .path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut written = Vec::with_capacity(names.len());
        for name in names {
            info!("Extracting {} from {}", name, archive_name);

            let mut entry = archive.by_name(name)?;
            let relative = entry
                .enclosed_name()
                .ok_or_else(|| DtmError::UnsafeEntry(name.clone()))?;
            let out_path = dest.join(relative);

            if let Some(parent) = out_path.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut out = File::create(&out_path)?;
            io::copy(&mut entry, &mut out)?;

            written.push(out_path);
        }

        Ok(written)
    }
}
