//! Load and save `config.yaml`.
//!
//! The store is an explicit value holding the document path. Nothing is
//! cached: every `load` re-reads the file and every `save` replaces the whole
//! document atomically (temp file in the same directory, then rename).

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::schema::BrnConfig;
use crate::{Error, Result};

/// Environment variable overriding the config directory.
pub const CONFIG_DIR_ENV: &str = "BRN_CONFIG_DIR";

/// Directory under `$HOME` holding the config document.
pub const CONFIG_DIR_NAME: &str = ".brn";

/// File name of the config document.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Get the default config directory (`~/.brn`).
pub fn default_config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| Error::InvalidInput("Could not determine home directory".to_string()))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Handle on the config document at a fixed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Open the store at `~/.brn/config.yaml`.
    pub fn open_default() -> Result<Self> {
        Ok(Self::in_dir(&default_config_dir()?))
    }

    /// Open the store at `<dir>/config.yaml`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::at(dir.join(CONFIG_FILE_NAME))
    }

    /// Open the store at an explicit file path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check whether the document exists.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load and validate the document.
    ///
    /// Fails with `ConfigMissing` when the file does not exist and with
    /// `ConfigCorrupt` when it does not parse into the schema. A file with no
    /// content loads as an empty document.
    pub fn load(&self) -> Result<BrnConfig> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::ConfigMissing {
                    path: self.path.clone(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %self.path.display(), "config is empty");
            return Ok(BrnConfig::default());
        }

        let config: BrnConfig =
            serde_yaml::from_str(&content).map_err(|e| self.corrupt(e.to_string()))?;
        config.validate().map_err(|reason| self.corrupt(reason))?;

        tracing::debug!(
            path = %self.path.display(),
            workspaces = config.workspaces.len(),
            "loaded config"
        );
        Ok(config)
    }

    /// Load the document, or return an empty one if it does not exist yet.
    ///
    /// Corruption is still an error.
    pub fn load_or_default(&self) -> Result<BrnConfig> {
        match self.load() {
            Err(Error::ConfigMissing { .. }) => Ok(BrnConfig::default()),
            other => other,
        }
    }

    /// Serialize and atomically replace the whole document.
    ///
    /// Creates the containing directory if needed. Either the new document is
    /// fully in place afterwards or the old one is untouched.
    pub fn save(&self, config: &BrnConfig) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let yaml = serde_yaml::to_string(config)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(yaml.as_bytes())?;
        tmp.as_file().sync_all()?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(
                tmp.path(),
                fs::Permissions::from_mode(super::schema::CONFIG_FILE_MODE),
            )?;
        }
        tmp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!(path = %self.path.display(), "saved config");
        Ok(())
    }

    fn corrupt(&self, reason: String) -> Error {
        Error::ConfigCorrupt {
            path: self.path.clone(),
            reason,
        }
    }
}
