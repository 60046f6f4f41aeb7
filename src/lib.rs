//! brn - workspace-aware glue between a developer machine, GitHub and JIRA.
//!
//! This library provides the core functionality for the `brn` CLI tool:
//! the per-user workspace config, active workspace resolution, the
//! default-deny automation gate and typed credential accessors. The GitHub
//! and JIRA clients are thin consumers of those accessors.

pub mod automation;
pub mod cli;
pub mod commands;
pub mod config;
pub mod credentials;
pub mod github;
pub mod jira;
pub mod logging;

use std::path::PathBuf;


/// Library-level error type for brn operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("No config found at {}. Run: brn setup", .path.display())]
    ConfigMissing { path: PathBuf },

    #[error("Config at {} could not be parsed: {}", .path.display(), .reason)]
    ConfigCorrupt { path: PathBuf, reason: String },

    #[error("{}", workspace_not_found_message(.name, .available))]
    WorkspaceNotFound { name: String, available: Vec<String> },

    #[error("Workspace '{0}' already exists")]
    WorkspaceExists(String),

    #[error(
        "{field} not configured for workspace '{workspace}'. Run: brn workspace configure {workspace} {field} <value>"
    )]
    MissingCredential {
        field: &'static str,
        workspace: String,
    },

    #[error("Invalid key '{}'. Valid keys: {}", .0, config::valid_keys().join(", "))]
    InvalidKey(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{service} API error {status}: {message}")]
    Api {
        service: &'static str,
        status: u16,
        message: String,
    },

    #[error("HTTP request failed: {0}")]
    Http(String),
}

/// Result type alias for brn operations.
pub type Result<T> = std::result::Result<T, Error>;

fn workspace_not_found_message(name: &str, available: &[String]) -> String {
    let available = if available.is_empty() {
        "(none)".to_string()
    } else {
        available.join(", ")
    };
    if name.is_empty() {
        format!(
            "No active workspace set. Available: {}. Run: brn workspace switch <name>",
            available
        )
    } else {
        format!("Workspace '{}' not found. Available: {}", name, available)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_not_found_lists_available() {
        let err = Error::WorkspaceNotFound {
            name: "ghost".to_string(),
            available: vec!["personal".to_string(), "work".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Workspace 'ghost' not found. Available: personal, work"
        );
    }

    #[test]
    fn test_workspace_not_found_unset_active() {
        let err = Error::WorkspaceNotFound {
            name: String::new(),
            available: vec![],
        };
        let msg = err.to_string();
        assert!(msg.starts_with("No active workspace set"));
        assert!(msg.contains("(none)"));
    }

    #[test]
    fn test_missing_credential_names_field_and_command() {
        let err = Error::MissingCredential {
            field: "github_token",
            workspace: "work".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("github_token not configured"));
        assert!(msg.contains("brn workspace configure work github_token <value>"));
    }

    #[test]
    fn test_invalid_key_lists_valid_keys() {
        let msg = Error::InvalidKey("colour".to_string()).to_string();
        assert!(msg.contains("'colour'"));
        assert!(msg.contains("automation.jira_auto_comment"));
    }
}
