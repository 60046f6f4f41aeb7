//! Typed, validated credential access for the active workspace.
//!
//! The GitHub and JIRA clients never read the config directly; they ask these
//! accessors, which fail with `Error::MissingCredential` naming the field and
//! the command that sets it. There is no fallback to other workspaces.

use serde::Serialize;

use crate::config::{ActiveWorkspace, ConfigStore, Workspaces, mask_secret};
use crate::{Error, Result};

/// JIRA connection settings of a workspace.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct JiraConfig {
    /// Base URL without a trailing slash
    pub url: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub token: String,
}

impl std::fmt::Debug for JiraConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraConfig")
            .field("url", &self.url)
            .field("email", &self.email)
            .field("token", &mask_secret(&self.token))
            .finish()
    }
}

/// Credential accessors over a config store.
#[derive(Debug, Clone, Copy)]
pub struct Credentials<'a> {
    workspaces: Workspaces<'a>,
}

impl<'a> Credentials<'a> {
    pub fn new(store: &'a ConfigStore) -> Self {
        Self {
            workspaces: Workspaces::new(store),
        }
    }

    /// GitHub token of the active workspace, unmodified.
    pub fn github_token(&self) -> Result<String> {
        github_token_for(&self.workspaces.get_active_workspace()?)
    }

    /// JIRA settings of the active workspace.
    pub fn jira_config(&self) -> Result<JiraConfig> {
        jira_config_for(&self.workspaces.get_active_workspace()?)
    }
}

/// Extract the GitHub token from a resolved workspace.
pub fn github_token_for(workspace: &ActiveWorkspace) -> Result<String> {
    required(workspace, "github_token", workspace.github_token.as_deref())
}

/// Extract JIRA settings from a resolved workspace.
///
/// Fields are checked in the order url, email, token and the first missing
/// one is reported.
pub fn jira_config_for(workspace: &ActiveWorkspace) -> Result<JiraConfig> {
    let url = required(workspace, "jira_url", workspace.jira_url.as_deref())?;
    let email = required(workspace, "jira_email", workspace.jira_email.as_deref())?;
    let token = required(workspace, "jira_token", workspace.jira_token.as_deref())?;
    Ok(JiraConfig {
        url: normalize_url(&url),
        email,
        token,
    })
}

/// Strip exactly one trailing slash.
pub fn normalize_url(url: &str) -> String {
    url.strip_suffix('/').unwrap_or(url).to_string()
}

fn required(
    workspace: &ActiveWorkspace,
    field: &'static str,
    value: Option<&str>,
) -> Result<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(Error::MissingCredential {
            field,
            workspace: workspace.name.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestEnv;

    fn assert_missing(result: Result<impl std::fmt::Debug>, expected: &str) {
        match result {
            Err(Error::MissingCredential { field, .. }) => assert_eq!(field, expected),
            other => panic!("expected MissingCredential({}), got {:?}", expected, other),
        }
    }

    #[test]
    fn test_github_token_returned_unmodified() {
        let env = TestEnv::with_yaml(
            "active_workspace: w\nworkspaces:\n  w:\n    path: /w\n    github_token: \" ghp_x/ \"\n",
        );
        let store = env.store();
        assert_eq!(Credentials::new(&store).github_token().unwrap(), " ghp_x/ ");
    }

    #[test]
    fn test_github_token_missing_does_not_fall_back() {
        let yaml = r#"
active_workspace: work
workspaces:
  work:
    path: /w
  personal:
    path: /p
    github_token: ghp_personal
"#;
        let env = TestEnv::with_yaml(yaml);
        let store = env.store();
        let result = Credentials::new(&store).github_token();
        match result {
            Err(Error::MissingCredential { field, workspace }) => {
                assert_eq!(field, "github_token");
                assert_eq!(workspace, "work");
            }
            other => panic!("expected MissingCredential, got {:?}", other),
        }
    }

    #[test]
    fn test_github_token_empty_is_missing() {
        let env = TestEnv::with_yaml(
            "active_workspace: w\nworkspaces:\n  w:\n    path: /w\n    github_token: \"\"\n",
        );
        let store = env.store();
        assert_missing(Credentials::new(&store).github_token(), "github_token");
    }

    #[test]
    fn test_jira_url_trailing_slash_stripped() {
        let yaml = r#"
active_workspace: work
workspaces:
  work:
    path: /w
    jira_url: https://x.atlassian.net/
    jira_email: me@x.com
    jira_token: secret
"#;
        let env = TestEnv::with_yaml(yaml);
        let store = env.store();
        let jira = Credentials::new(&store).jira_config().unwrap();
        assert_eq!(jira.url, "https://x.atlassian.net");
        assert_eq!(jira.email, "me@x.com");
        assert_eq!(jira.token, "secret");
    }

    #[test]
    fn test_jira_missing_fields_reported_in_order() {
        let cases = [
            ("jira_email: e\n    jira_token: t\n", "jira_url"),
            ("jira_url: u\n    jira_token: t\n", "jira_email"),
            ("jira_url: u\n    jira_email: e\n", "jira_token"),
            ("github_token: g\n", "jira_url"),
        ];
        for (fields, expected) in cases {
            let yaml = format!(
                "active_workspace: w\nworkspaces:\n  w:\n    path: /w\n    {}",
                fields
            );
            let env = TestEnv::with_yaml(&yaml);
            let store = env.store();
            assert_missing(Credentials::new(&store).jira_config(), expected);
        }
    }

    #[test]
    fn test_accessors_need_active_workspace() {
        let env = TestEnv::with_yaml("workspaces:\n  w:\n    path: /w\n    github_token: g\n");
        let store = env.store();
        assert!(matches!(
            Credentials::new(&store).github_token(),
            Err(Error::WorkspaceNotFound { .. })
        ));
    }

    #[test]
    fn test_normalize_url_strips_exactly_one_slash() {
        assert_eq!(normalize_url("https://x.atlassian.net/"), "https://x.atlassian.net");
        assert_eq!(normalize_url("https://x.atlassian.net//"), "https://x.atlassian.net/");
        assert_eq!(normalize_url("https://x.atlassian.net"), "https://x.atlassian.net");
    }

    #[test]
    fn test_jira_config_debug_masks_token() {
        let jira = JiraConfig {
            url: "https://x".to_string(),
            email: "e".to_string(),
            token: "super-secret-token-value".to_string(),
        };
        let debug = format!("{:?}", jira);
        assert!(!debug.contains("super-secret-token-value"));
    }
}
