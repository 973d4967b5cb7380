//! Zip archives of Azkaban project directories.
use log::*;
use std::{
    fs::{self, File},
    io,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

use crate::{error::ToolError, result::Result};

/// Zip the contents of `source_dir` into `dest`, replacing any existing
/// archive. Entries are relative to `source_dir`, so the project files sit
/// at the archive root. Returns `dest`.
pub fn create_zip(source_dir: &Path, dest: &Path) -> Result<PathBuf> {
    if !source_dir.is_dir() {
        return Err(
            ToolError::FixtureNotFound(source_dir.display().to_string()).into()
        );
    }

    info!(
        "creating archive {} from {}",
        dest.display(),
        source_dir.display()
    );

    if let Some(parent) = dest.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent)?;
    }

    // File::create truncates a previous archive at the same path
    let file = File::create(dest)?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated);

    let entries = WalkDir::new(source_dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter();

    for entry in entries {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry.path().strip_prefix(source_dir)?;
        let name = archive_name(relative);

        if entry.file_type().is_dir() {
            debug!("adding directory: {name}/");
            writer
                .add_directory(name, options)
                .map_err(ToolError::from)?;
        } else if entry.file_type().is_file() {
            debug!("adding file: {name}");
            writer.start_file(name, options).map_err(ToolError::from)?;
            let mut source = File::open(entry.path())?;
            io::copy(&mut source, &mut writer)?;
        }
    }

    writer.finish().map_err(ToolError::from)?;

    Ok(dest.to_path_buf())
}

/// Zip entry names always use `/` separators.
fn archive_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
