//! YAML schema definitions for config.yaml.
//!
//! This module provides:
//! - Rust structs representing the document (`BrnConfig` and friends)
//! - The closed set of automation actions
//! - Validation run once at load time
//! - Key/value updates used by `brn workspace configure`

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{Error, Result};

/// Schema version written into new documents.
pub const CONFIG_VERSION: &str = "1.0";

/// Required permissions for config.yaml (Unix: 0600, owner read/write only).
///
/// The document holds GitHub and JIRA tokens.
#[cfg(unix)]
pub const CONFIG_FILE_MODE: u32 = 0o600;

/// Plain workspace keys accepted by `brn workspace configure`.
pub const WORKSPACE_KEYS: &[&str] = &[
    "path",
    "github_token",
    "github_org",
    "jira_url",
    "jira_email",
    "jira_token",
];

/// Every key accepted by `brn workspace configure`: the plain keys followed by
/// one `automation.<action>` key per action.
pub fn valid_keys() -> Vec<String> {
    WORKSPACE_KEYS
        .iter()
        .map(|key| key.to_string())
        .chain(
            AutomationAction::ALL
                .iter()
                .map(|action| format!("automation.{}", action.as_str())),
        )
        .collect()
}

/// Keys whose values are secrets and must be masked on display.
pub const SECRET_KEYS: &[&str] = &["github_token", "jira_token"];

/// Treat an explicit YAML `null` the same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn default_version() -> String {
    CONFIG_VERSION.to_string()
}

/// Root of `~/.brn/config.yaml`.
///
/// ```yaml
/// version: "1.0"
/// active_workspace: work
/// workspaces:
///   work:
///     path: ~/dev/work/auto
///     github_token: ghp_xxxxxxxxxxxx
///     automation:
///       github_auto_pr: true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrnConfig {
    /// Schema version
    #[serde(default = "default_version")]
    pub version: String,

    /// Name of the selected workspace, empty when none is selected
    #[serde(default, deserialize_with = "null_as_default")]
    pub active_workspace: String,

    /// Workspaces keyed by name, in document order
    #[serde(default, deserialize_with = "null_as_default")]
    pub workspaces: IndexMap<String, WorkspaceConfig>,
}

impl Default for BrnConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            active_workspace: String::new(),
            workspaces: IndexMap::new(),
        }
    }
}

impl BrnConfig {
    /// Create an empty document with no workspaces.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the structural invariants of the document.
    ///
    /// A dangling `active_workspace` is not checked here; resolving it is the
    /// resolver's job and fails there with `WorkspaceNotFound`.
    pub fn validate(&self) -> std::result::Result<(), String> {
        for (name, workspace) in &self.workspaces {
            if name.trim().is_empty() {
                return Err("workspace names must be non-empty".to_string());
            }
            if workspace.path.trim().is_empty() {
                return Err(format!("workspace '{}' has an empty path", name));
            }
        }
        Ok(())
    }

    /// Workspace names in document order.
    pub fn workspace_names(&self) -> Vec<String> {
        self.workspaces.keys().cloned().collect()
    }
}

/// A single named workspace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Working root, absolute or `~`-relative
    pub path: String,

    /// GitHub PAT (sensitive!)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_token: Option<String>,

    /// Default organization or user for repo listings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_org: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jira_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jira_email: Option<String>,

    /// JIRA API token (sensitive!)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jira_token: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub automation: AutomationConfig,
}

impl WorkspaceConfig {
    /// Create a workspace rooted at `path` with no credentials and all
    /// automation disabled.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Apply one `key = value` update.
    ///
    /// Plain keys store the value as-is; an empty value clears an optional
    /// key. `automation.<action>` keys only accept `true` or `false`.
    pub fn set_key(&mut self, key: &str, value: &str) -> Result<()> {
        if let Some(action) = key.strip_prefix("automation.") {
            let action =
                AutomationAction::parse(action).ok_or_else(|| Error::InvalidKey(key.to_string()))?;
            let enabled = match value {
                "true" => true,
                "false" => false,
                _ => {
                    return Err(Error::InvalidInput(
                        "automation values must be 'true' or 'false'".to_string(),
                    ));
                }
            };
            self.automation.set(action, enabled);
            return Ok(());
        }

        let optional = if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        };
        match key {
            "path" => {
                if value.trim().is_empty() {
                    return Err(Error::InvalidInput("path must not be empty".to_string()));
                }
                self.path = value.to_string();
            }
            "github_token" => self.github_token = optional,
            "github_org" => self.github_org = optional,
            "jira_url" => self.jira_url = optional,
            "jira_email" => self.jira_email = optional,
            "jira_token" => self.jira_token = optional,
            _ => return Err(Error::InvalidKey(key.to_string())),
        }
        Ok(())
    }
}

/// Per-workspace automation switches. Everything is off unless set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomationConfig {
    #[serde(default, deserialize_with = "null_as_default")]
    pub github_auto_push: bool,

    #[serde(default, deserialize_with = "null_as_default")]
    pub github_auto_pr: bool,

    #[serde(default, deserialize_with = "null_as_default")]
    pub jira_auto_transition: bool,

    #[serde(default, deserialize_with = "null_as_default")]
    pub jira_auto_comment: bool,
}

impl AutomationConfig {
    pub fn get(&self, action: AutomationAction) -> bool {
        match action {
            AutomationAction::GithubAutoPush => self.github_auto_push,
            AutomationAction::GithubAutoPr => self.github_auto_pr,
            AutomationAction::JiraAutoTransition => self.jira_auto_transition,
            AutomationAction::JiraAutoComment => self.jira_auto_comment,
        }
    }

    pub fn set(&mut self, action: AutomationAction, enabled: bool) {
        match action {
            AutomationAction::GithubAutoPush => self.github_auto_push = enabled,
            AutomationAction::GithubAutoPr => self.github_auto_pr = enabled,
            AutomationAction::JiraAutoTransition => self.jira_auto_transition = enabled,
            AutomationAction::JiraAutoComment => self.jira_auto_comment = enabled,
        }
    }
}

/// An action with external side effects that must be opted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutomationAction {
    /// Push commits to a remote
    GithubAutoPush,
    /// Open pull requests
    GithubAutoPr,
    /// Move JIRA tickets between statuses
    JiraAutoTransition,
    /// Post JIRA comments
    JiraAutoComment,
}

impl AutomationAction {
    pub const ALL: [AutomationAction; 4] = [
        AutomationAction::GithubAutoPush,
        AutomationAction::GithubAutoPr,
        AutomationAction::JiraAutoTransition,
        AutomationAction::JiraAutoComment,
    ];

    /// Parse from the config key name. camelCase spellings are accepted too.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "github_auto_push" | "githubAutoPush" => Some(AutomationAction::GithubAutoPush),
            "github_auto_pr" | "githubAutoPr" => Some(AutomationAction::GithubAutoPr),
            "jira_auto_transition" | "jiraAutoTransition" => {
                Some(AutomationAction::JiraAutoTransition)
            }
            "jira_auto_comment" | "jiraAutoComment" => Some(AutomationAction::JiraAutoComment),
            _ => None,
        }
    }

    /// Key name as it appears under `automation:` in config.yaml.
    pub fn as_str(&self) -> &'static str {
        match self {
            AutomationAction::GithubAutoPush => "github_auto_push",
            AutomationAction::GithubAutoPr => "github_auto_pr",
            AutomationAction::JiraAutoTransition => "jira_auto_transition",
            AutomationAction::JiraAutoComment => "jira_auto_comment",
        }
    }

    /// Short human label, used by `brn setup` output.
    pub fn label(&self) -> &'static str {
        match self {
            AutomationAction::GithubAutoPush => "Auto-push commits",
            AutomationAction::GithubAutoPr => "Auto-create PRs",
            AutomationAction::JiraAutoTransition => "Auto-update JIRA status",
            AutomationAction::JiraAutoComment => "Auto-add JIRA comments",
        }
    }
}

impl std::fmt::Display for AutomationAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AutomationAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        AutomationAction::parse(s).ok_or_else(|| {
            Error::InvalidInput(format!(
                "unknown automation action '{}' (expected one of: {})",
                s,
                AutomationAction::ALL
                    .iter()
                    .map(|a| a.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
        })
    }
}

/// Mask a secret for display.
///
/// Secrets longer than 12 characters keep a 4-character prefix and suffix;
/// shorter ones are hidden entirely.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 12 {
        "****".to_string()
    } else {
        let prefix: String = chars[..4].iter().collect();
        let suffix: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", prefix, suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== BrnConfig Tests ====================

    #[test]
    fn test_config_default() {
        let config = BrnConfig::default();
        assert_eq!(config.version, "1.0");
        assert!(config.active_workspace.is_empty());
        assert!(config.workspaces.is_empty());
    }

    #[test]
    fn test_config_parse_full() {
        let yaml = r#"
version: "1.0"
active_workspace: work
workspaces:
  work:
    path: ~/dev/work/auto
    github_token: ghp_abc
    github_org: acme
    jira_url: https://acme.atlassian.net/
    jira_email: me@acme.com
    jira_token: jt
    automation:
      github_auto_pr: true
      jira_auto_comment: false
"#;
        let config: BrnConfig = serde_yaml::from_str(yaml).unwrap();
        let work = &config.workspaces["work"];
        assert_eq!(config.active_workspace, "work");
        assert_eq!(work.path, "~/dev/work/auto");
        assert_eq!(work.github_token.as_deref(), Some("ghp_abc"));
        assert_eq!(work.github_org.as_deref(), Some("acme"));
        assert_eq!(work.jira_url.as_deref(), Some("https://acme.atlassian.net/"));
        assert!(work.automation.github_auto_pr);
        assert!(!work.automation.github_auto_push);
    }

    #[test]
    fn test_config_parse_minimal_workspace() {
        let yaml = "active_workspace: p\nworkspaces:\n  p:\n    path: /tmp/p\n";
        let config: BrnConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.version, "1.0");
        let p = &config.workspaces["p"];
        assert_eq!(p.github_token, None);
        assert_eq!(p.automation, AutomationConfig::default());
    }

    #[test]
    fn test_config_parse_explicit_nulls() {
        let yaml = r#"
version: "1.0"
active_workspace:
workspaces:
  p:
    path: /tmp/p
    github_token: null
    jira_token: null
    jira_url: null
    automation:
      github_auto_push: null
"#;
        let config: BrnConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.active_workspace, "");
        let p = &config.workspaces["p"];
        assert_eq!(p.github_token, None);
        assert!(!p.automation.github_auto_push);
    }

    #[test]
    fn test_config_parse_ignores_unknown_keys() {
        let yaml = "workspaces:\n  p:\n    path: /tmp/p\n    editor: vim\ntheme: dark\n";
        let config: BrnConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.workspaces["p"].path, "/tmp/p");
    }

    #[test]
    fn test_config_parse_missing_path_fails() {
        let yaml = "workspaces:\n  p:\n    github_token: x\n";
        assert!(serde_yaml::from_str::<BrnConfig>(yaml).is_err());
    }

    #[test]
    fn test_config_preserves_workspace_order() {
        let yaml = "workspaces:\n  zeta:\n    path: /z\n  alpha:\n    path: /a\n  mid:\n    path: /m\n";
        let config: BrnConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.workspace_names(), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_config_validate_empty_path() {
        let mut config = BrnConfig::new();
        config
            .workspaces
            .insert("p".to_string(), WorkspaceConfig::new("  "));
        let err = config.validate().unwrap_err();
        assert!(err.contains("'p' has an empty path"));
    }

    #[test]
    fn test_config_validate_empty_name() {
        let mut config = BrnConfig::new();
        config
            .workspaces
            .insert(String::new(), WorkspaceConfig::new("/tmp"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_serialize_omits_absent_credentials() {
        let mut config = BrnConfig::new();
        config
            .workspaces
            .insert("p".to_string(), WorkspaceConfig::new("/tmp/p"));
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(!yaml.contains("github_token"));
        assert!(yaml.contains("github_auto_push: false"));
    }

    // ==================== WorkspaceConfig::set_key Tests ====================

    #[test]
    fn test_set_key_plain() {
        let mut ws = WorkspaceConfig::new("/tmp");
        ws.set_key("github_token", "ghp_1").unwrap();
        ws.set_key("jira_url", "https://x.atlassian.net").unwrap();
        ws.set_key("path", "/srv").unwrap();
        assert_eq!(ws.github_token.as_deref(), Some("ghp_1"));
        assert_eq!(ws.jira_url.as_deref(), Some("https://x.atlassian.net"));
        assert_eq!(ws.path, "/srv");
    }

    #[test]
    fn test_set_key_empty_clears_optional() {
        let mut ws = WorkspaceConfig::new("/tmp");
        ws.set_key("github_org", "acme").unwrap();
        ws.set_key("github_org", "").unwrap();
        assert_eq!(ws.github_org, None);
    }

    #[test]
    fn test_set_key_empty_path_rejected() {
        let mut ws = WorkspaceConfig::new("/tmp");
        assert!(matches!(
            ws.set_key("path", ""),
            Err(Error::InvalidInput(_))
        ));
        assert_eq!(ws.path, "/tmp");
    }

    #[test]
    fn test_set_key_automation() {
        let mut ws = WorkspaceConfig::new("/tmp");
        ws.set_key("automation.jira_auto_comment", "true").unwrap();
        assert!(ws.automation.jira_auto_comment);
        ws.set_key("automation.jira_auto_comment", "false").unwrap();
        assert!(!ws.automation.jira_auto_comment);
    }

    #[test]
    fn test_set_key_automation_rejects_non_bool() {
        let mut ws = WorkspaceConfig::new("/tmp");
        assert!(matches!(
            ws.set_key("automation.github_auto_pr", "yes"),
            Err(Error::InvalidInput(_))
        ));
        assert!(!ws.automation.github_auto_pr);
    }

    #[test]
    fn test_set_key_unknown() {
        let mut ws = WorkspaceConfig::new("/tmp");
        assert!(matches!(ws.set_key("editor", "vim"), Err(Error::InvalidKey(_))));
        assert!(matches!(
            ws.set_key("automation.deploy", "true"),
            Err(Error::InvalidKey(_))
        ));
    }

    // ==================== AutomationAction Tests ====================

    #[test]
    fn test_action_parse_both_spellings() {
        assert_eq!(
            AutomationAction::parse("jira_auto_transition"),
            Some(AutomationAction::JiraAutoTransition)
        );
        assert_eq!(
            AutomationAction::parse("jiraAutoTransition"),
            Some(AutomationAction::JiraAutoTransition)
        );
        assert_eq!(AutomationAction::parse("auto_deploy"), None);
    }

    #[test]
    fn test_action_from_str_error_lists_actions() {
        let err = "nope".parse::<AutomationAction>().unwrap_err();
        assert!(err.to_string().contains("github_auto_push"));
    }

    #[test]
    fn test_automation_get_set_independent() {
        let mut automation = AutomationConfig::default();
        automation.set(AutomationAction::JiraAutoComment, true);
        for action in AutomationAction::ALL {
            assert_eq!(
                automation.get(action),
                action == AutomationAction::JiraAutoComment
            );
        }
    }

    #[test]
    fn test_every_valid_key_is_accepted_by_set_key() {
        let keys = valid_keys();
        assert_eq!(keys.len(), WORKSPACE_KEYS.len() + AutomationAction::ALL.len());
        for key in keys {
            let value = if key.starts_with("automation.") { "true" } else { "x" };
            let mut ws = WorkspaceConfig::new("/w");
            assert!(ws.set_key(&key, value).is_ok(), "{} rejected", key);
        }
    }

    // ==================== Masking Tests ====================

    #[test]
    fn test_mask_secret_long() {
        assert_eq!(mask_secret("ghp_1234567890abcdef"), "ghp_...cdef");
    }

    #[test]
    fn test_mask_secret_short() {
        assert_eq!(mask_secret("abcdef"), "****");
        assert_eq!(mask_secret("ab"), "****");
        assert_eq!(mask_secret("abcdefghijkl"), "****");
    }

    #[test]
    #[cfg(unix)]
    fn test_config_file_mode() {
        assert_eq!(CONFIG_FILE_MODE, 0o600);
    }
}
