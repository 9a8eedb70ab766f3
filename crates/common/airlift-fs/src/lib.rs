use std::{
    fs,
    path::{Path, PathBuf},
};

use walkdir::WalkDir;

/// Write atomically — either fully succeeds or fully fails.
///
/// The contents land in a temporary sibling first and are moved into place
/// with a single rename, so readers never observe a half-written file.
pub fn write<P: AsRef<Path>>(file_path: P, contents: impl AsRef<[u8]>) -> std::io::Result<()> {
    let file_path = file_path.as_ref();
    let parent_dir = file_path.parent().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "File path has no parent directory",
        )
    })?;

    let temp_path = temp_file_path(parent_dir);
    fs::write(&temp_path, contents.as_ref())?;
    fs::rename(&temp_path, file_path)?;

    Ok(())
}

/// Write atomically, creating all leading directories.
pub fn create_dirs_then_write<P: AsRef<Path>>(
    file_path: P,
    contents: impl AsRef<[u8]>,
) -> std::io::Result<()> {
    let file_path = file_path.as_ref();

    if let Some(parent_dir) = file_path.parent() {
        fs::create_dir_all(parent_dir)?;
    }

    write(file_path, contents)
}

/// Publish a staged directory as `dest` in one atomic step.
///
/// `dest` must not already exist; the staged tree either becomes fully
/// visible under `dest` or stays where it was.
pub fn publish_dir<P: AsRef<Path>, Q: AsRef<Path>>(staging: P, dest: Q) -> std::io::Result<()> {
    let staging = staging.as_ref();
    let dest = dest.as_ref();

    if dest.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("Destination already exists: {}", dest.display()),
        ));
    }
    if let Some(parent_dir) = dest.parent() {
        fs::create_dir_all(parent_dir)?;
    }

    fs::rename(staging, dest)
}

/// Remove a directory tree if it exists. Returns whether anything was removed.
pub fn remove_dir_idempotent<P: AsRef<Path>>(path: P) -> std::io::Result<bool> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(false);
    }
    fs::remove_dir_all(path)?;
    Ok(true)
}

/// List all files under `dir_path` recursively, as paths relative to it.
pub fn list_files<P: AsRef<Path>>(dir_path: P) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = vec![];
    let dir_path = dir_path.as_ref();
    if !dir_path.exists() {
        return Ok(files);
    }

    for entry in WalkDir::new(dir_path) {
        let entry = entry?;
        if !entry.file_type().is_dir() {
            files.push(entry.path().strip_prefix(dir_path)?.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

fn temp_file_path(dir: &Path) -> PathBuf {
    use std::time::{SystemTime, UNIX_EPOCH};

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();

    let process_id = std::process::id();
    dir.join(format!(".tmp_{}__{}", process_id, timestamp))
}
