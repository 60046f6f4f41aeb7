//! Workspace configuration for brn.
//!
//! ## config.yaml - workspaces, credentials and automation switches
//!
//! Located at `~/.brn/config.yaml` (the directory can be overridden with
//! `BRN_CONFIG_DIR` or `--config-dir`).
//!
//! Contains:
//! - `version` - schema version
//! - `active_workspace` - name of the selected workspace
//! - `workspaces` - map of name to `path`, optional GitHub/JIRA credentials
//!   and an `automation` block
//!
//! ## Security
//!
//! **CRITICAL**: config.yaml holds GitHub and JIRA tokens and is always
//! written with 0600 permissions (owner read/write only).
//!
//! ## Defaults
//!
//! Every automation switch is off unless explicitly set to `true`. Missing
//! optional keys are never an error.

pub mod resolver;
pub mod schema;
pub mod store;

pub use resolver::{ActiveWorkspace, WorkspaceSummary, Workspaces, expand_home, resolve_active};
#[cfg(unix)]
pub use schema::CONFIG_FILE_MODE;
pub use schema::{
    AutomationAction, AutomationConfig, BrnConfig, CONFIG_VERSION, SECRET_KEYS,
    WORKSPACE_KEYS, WorkspaceConfig, mask_secret, valid_keys,
};
pub use store::{
    CONFIG_DIR_ENV, CONFIG_DIR_NAME, CONFIG_FILE_NAME, ConfigStore, default_config_dir,
};
