//! File-backed persistence for the profile store
//!
//! The store is written as two files in the data directory: a JSON blob with
//! every profile and a scalar file with the current profile id. Each save
//! overwrites both in full.

use anyhow::{Context, Result};
use macro_monitor_shared::ProfileStore;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::StorageConfig;

/// Profile repository backed by the local filesystem
#[derive(Debug, Clone)]
pub struct FileProfileRepository {
    profiles_path: PathBuf,
    current_path: PathBuf,
}

impl FileProfileRepository {
    pub fn new(data_dir: impl AsRef<Path>, profiles_file: &str, current_file: &str) -> Self {
        let data_dir = data_dir.as_ref();
        Self {
            profiles_path: data_dir.join(profiles_file),
            current_path: data_dir.join(current_file),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.data_dir, &config.profiles_file, &config.current_file)
    }

    pub fn profiles_path(&self) -> &Path {
        &self.profiles_path
    }

    pub fn current_path(&self) -> &Path {
        &self.current_path
    }

    /// Load the store; missing files mean an empty store
    pub fn load(&self) -> Result<ProfileStore> {
        let Some(profiles_json) = read_optional(&self.profiles_path)? else {
            debug!(path = %self.profiles_path.display(), "No profile file, starting empty");
            return Ok(ProfileStore::new());
        };

        let current_id = match read_optional(&self.current_path)? {
            Some(raw) if !raw.trim().is_empty() => match raw.trim().parse::<Uuid>() {
                Ok(id) => Some(id),
                Err(e) => {
                    warn!(error = %e, "Ignoring unreadable current profile id");
                    None
                }
            },
            _ => None,
        };

        let store = ProfileStore::restore(&profiles_json, current_id).with_context(|| {
            format!("Failed to parse {}", self.profiles_path.display())
        })?;
        debug!(profiles = store.len(), "Profile store loaded");
        Ok(store)
    }

    /// Overwrite both files with the store's contents
    pub fn save(&self, store: &ProfileStore) -> Result<()> {
        if let Some(dir) = self.profiles_path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }

        write_replacing(&self.profiles_path, &store.profiles_json()?)?;
        match store.current_id() {
            Some(id) => write_replacing(&self.current_path, &id.to_string())?,
            None => match fs::remove_file(&self.current_path) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(e).with_context(|| {
                        format!("Failed to remove {}", self.current_path.display())
                    })
                }
            },
        }

        debug!(profiles = store.len(), "Profile store saved");
        Ok(())
    }
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
    }
}

/// Write to a sibling temp file, then rename over the target
fn write_replacing(path: &Path, contents: &str) -> Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, contents).with_context(|| format!("Failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}
