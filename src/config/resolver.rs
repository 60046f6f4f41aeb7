//! Active workspace resolution and workspace mutations.
//!
//! `Workspaces::get_active_workspace` is the single path the automation gate
//! and the credential accessors use to reach a workspace record. An unset
//! `active_workspace` and one naming a missing workspace fail the same way:
//! `Error::WorkspaceNotFound` carrying the available names.
//!
//! Every mutation follows the same lifecycle: load the whole document, apply
//! one change, save the whole document.

use std::fs;
use std::ops::Deref;
use std::path::PathBuf;

use serde::Serialize;

use super::schema::{BrnConfig, WorkspaceConfig};
use super::store::ConfigStore;
use crate::{Error, Result};

/// The resolved active workspace together with its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveWorkspace {
    pub name: String,
    pub config: WorkspaceConfig,
}

impl Deref for ActiveWorkspace {
    type Target = WorkspaceConfig;

    fn deref(&self) -> &WorkspaceConfig {
        &self.config
    }
}

/// Read-only projection of a workspace for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkspaceSummary {
    pub name: String,
    pub path: String,
    pub is_active: bool,
}

/// Resolve the active workspace of an already loaded document.
pub fn resolve_active(config: &BrnConfig) -> Result<ActiveWorkspace> {
    lookup(config, &config.active_workspace)
}

fn lookup(config: &BrnConfig, name: &str) -> Result<ActiveWorkspace> {
    match config.workspaces.get(name) {
        Some(workspace) if !name.is_empty() => Ok(ActiveWorkspace {
            name: name.to_string(),
            config: workspace.clone(),
        }),
        _ => Err(not_found(config, name)),
    }
}

fn not_found(config: &BrnConfig, name: &str) -> Error {
    Error::WorkspaceNotFound {
        name: name.to_string(),
        available: config.workspace_names(),
    }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Workspace operations over a config store.
#[derive(Debug, Clone, Copy)]
pub struct Workspaces<'a> {
    store: &'a ConfigStore,
}

impl<'a> Workspaces<'a> {
    pub fn new(store: &'a ConfigStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &ConfigStore {
        self.store
    }

    /// Load the config and resolve the active workspace.
    pub fn get_active_workspace(&self) -> Result<ActiveWorkspace> {
        let config = self.store.load()?;
        resolve_active(&config)
    }

    /// Load the config and resolve a workspace by name.
    pub fn get_workspace(&self, name: &str) -> Result<ActiveWorkspace> {
        let config = self.store.load()?;
        lookup(&config, name)
    }

    /// Make `name` the active workspace.
    ///
    /// The document is left untouched when `name` is unknown.
    pub fn switch_active(&self, name: &str) -> Result<()> {
        let mut config = self.store.load()?;
        if name.is_empty() || !config.workspaces.contains_key(name) {
            return Err(not_found(&config, name));
        }
        config.active_workspace = name.to_string();
        self.store.save(&config)?;
        tracing::info!(workspace = name, "switched active workspace");
        Ok(())
    }

    /// List workspaces in document order.
    pub fn list_workspaces(&self) -> Result<Vec<WorkspaceSummary>> {
        let config = self.store.load()?;
        Ok(config
            .workspaces
            .iter()
            .map(|(name, workspace)| WorkspaceSummary {
                name: name.clone(),
                path: workspace.path.clone(),
                is_active: *name == config.active_workspace,
            })
            .collect())
    }

    /// Create a new workspace rooted at `path` and create its directory.
    ///
    /// A leading `~` in `path` is expanded before storing. The workspace
    /// becomes active when no workspace is active yet.
    pub fn create_workspace(&self, name: &str, path: &str) -> Result<ActiveWorkspace> {
        validate_name(name)?;
        if path.trim().is_empty() {
            return Err(Error::InvalidInput("path must not be empty".to_string()));
        }

        let mut config = self.store.load_or_default()?;
        if config.workspaces.contains_key(name) {
            return Err(Error::WorkspaceExists(name.to_string()));
        }

        let work_dir = expand_home(path);
        let workspace = WorkspaceConfig::new(work_dir.to_string_lossy());
        config
            .workspaces
            .insert(name.to_string(), workspace.clone());
        if config.active_workspace.is_empty() {
            config.active_workspace = name.to_string();
        }
        fs::create_dir_all(&work_dir)?;
        self.store.save(&config)?;

        tracing::info!(workspace = name, path = %work_dir.display(), "created workspace");
        Ok(ActiveWorkspace {
            name: name.to_string(),
            config: workspace,
        })
    }

    /// Set one key on a workspace. See [`WorkspaceConfig::set_key`].
    pub fn configure_workspace(&self, name: &str, key: &str, value: &str) -> Result<()> {
        let mut config = self.store.load()?;
        let Some(workspace) = config.workspaces.get_mut(name) else {
            return Err(not_found(&config, name));
        };
        workspace.set_key(key, value)?;
        self.store.save(&config)?;
        tracing::info!(workspace = name, key, "configured workspace");
        Ok(())
    }

    /// Insert or replace a workspace wholesale.
    ///
    /// Returns `true` when the workspace became the active one.
    pub fn upsert_workspace(&self, name: &str, workspace: WorkspaceConfig) -> Result<bool> {
        validate_name(name)?;
        if workspace.path.trim().is_empty() {
            return Err(Error::InvalidInput("path must not be empty".to_string()));
        }

        let mut config = self.store.load_or_default()?;
        config.workspaces.insert(name.to_string(), workspace);
        let activated = config.active_workspace.is_empty()
            || !config.workspaces.contains_key(&config.active_workspace);
        if activated {
            config.active_workspace = name.to_string();
        }
        self.store.save(&config)?;
        tracing::info!(workspace = name, activated, "saved workspace");
        Ok(activated)
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidInput(
            "workspace name is required".to_string(),
        ));
    }
    Ok(())
}
