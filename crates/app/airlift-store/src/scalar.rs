//! Persistent storage for small scalar values.
//!
//! Backs the handful of strings the updater must remember across launches:
//! device id, last-seen native version, the one-shot delay flag.

use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(Debug, Clone)]
pub struct ScalarStore {
    dir: PathBuf,
}

impl ScalarStore {
    pub fn new(dir: impl Into<PathBuf>) -> ScalarStore {
        ScalarStore { dir: dir.into() }
    }

    pub fn read(&self, key: impl AsRef<Path>) -> std::io::Result<Option<String>> {
        Self::validate_key(key.as_ref())?;
        let full_path = self.dir.join(key);

        if !full_path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(full_path)?;
        Ok(Some(content))
    }

    pub fn write(&self, key: impl AsRef<Path>, value: &str) -> std::io::Result<()> {
        Self::validate_key(key.as_ref())?;
        airlift_fs::create_dirs_then_write(self.dir.join(key), value)
    }

    pub fn delete(&self, key: impl AsRef<Path>) -> std::io::Result<()> {
        Self::validate_key(key.as_ref())?;
        let full_path = self.dir.join(key);

        if full_path.exists() {
            fs::remove_file(full_path)?;
        }

        Ok(())
    }

    fn validate_key(key: &Path) -> std::io::Result<()> {
        if key
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Path traversal detected",
            ));
        }
        Ok(())
    }
}
