//! Inference code bundle
//!
//! Packs the source dir into the `sourcedir.tar.gz` the serving container
//! downloads from `SAGEMAKER_SUBMIT_DIRECTORY`.

use bytes::Bytes;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::FileType;
use std::path::{Path, PathBuf};
use tokio::task::spawn_blocking;
use tracing::debug;

use crate::utils::error::{DeployError, Result};

/// Object name of the uploaded bundle
pub const BUNDLE_FILE_NAME: &str = "sourcedir.tar.gz";

/// Pack `source_dir` into a gzip tar, checking that `entry_point` is inside it
///
/// Archive paths are relative to `source_dir`.
pub async fn pack_source_dir(source_dir: &Path, entry_point: &str) -> Result<Bytes> {
    if !source_dir.is_dir() {
        return Err(DeployError::FileNotFound(source_dir.to_path_buf()));
    }
    let entry = source_dir.join(entry_point);
    if !entry.is_file() {
        return Err(DeployError::FileNotFound(entry));
    }

    let src = source_dir.to_owned();
    spawn_blocking(move || pack_sync(&src))
        .await
        .map_err(|e| DeployError::storage(format!("Bundling task failed: {}", e)))?
}

fn pack_sync(src: &Path) -> Result<Bytes> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut tar_builder = tar::Builder::new(encoder);
    tar_builder.follow_symlinks(false);

    let mut files = 0usize;
    for (path, file_type) in walk(src)? {
        let relative_path = path
            .strip_prefix(src)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;

        if file_type.is_dir() {
            tar_builder.append_dir(relative_path, &path)?;
        } else if file_type.is_file() || file_type.is_symlink() {
            // Symlinks are stored as links, never followed
            tar_builder.append_path_with_name(&path, relative_path)?;
            files += 1;
        }
    }

    let encoder = tar_builder.into_inner()?;
    let compressed = encoder.finish()?;

    debug!(files, compressed_size = compressed.len(), "packed source dir");
    Ok(Bytes::from(compressed))
}

/// Every path below `path`, parents before children, in name order
///
/// File types come from the directory entry, so symlinked directories are
/// listed but not descended into.
fn walk(path: &Path) -> std::io::Result<Vec<(PathBuf, FileType)>> {
    let mut entries: Vec<(PathBuf, FileType)> = std::fs::read_dir(path)?
        .map(|entry| entry.and_then(|e| Ok((e.path(), e.file_type()?))))
        .collect::<std::io::Result<_>>()?;
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    let mut paths = Vec::new();
    for (entry, file_type) in entries {
        paths.push((entry.clone(), file_type));
        if file_type.is_dir() {
            paths.extend(walk(&entry)?);
        }
    }
    Ok(paths)
}
