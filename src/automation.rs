//! Default-deny gate for actions with external side effects.
//!
//! Pushing commits, opening PRs, transitioning JIRA tickets and posting JIRA
//! comments each have their own switch in the active workspace. The gate only
//! decides and reports; callers branch on the returned boolean and skip the
//! side effect themselves when it is `false`.

use std::io::Write;

use crate::Result;
use crate::config::{ActiveWorkspace, AutomationAction, ConfigStore, Workspaces};

/// Automation policy for the active workspace.
#[derive(Debug, Clone, Copy)]
pub struct AutomationGate<'a> {
    workspaces: Workspaces<'a>,
}

impl<'a> AutomationGate<'a> {
    pub fn new(store: &'a ConfigStore) -> Self {
        Self {
            workspaces: Workspaces::new(store),
        }
    }

    /// Whether `action` is enabled for the active workspace.
    ///
    /// An absent `automation` block or key is `false`. Failing to resolve an
    /// active workspace at all is still an error.
    pub fn is_enabled(&self, action: AutomationAction) -> Result<bool> {
        let workspace = self.workspaces.get_active_workspace()?;
        Ok(workspace.automation.get(action))
    }

    /// Check `action` and explain a denial on `out`.
    ///
    /// Writes nothing when the action is enabled. Otherwise writes which
    /// action is disabled and the command that enables it, then returns
    /// `false`. A denial is a normal outcome, not an error.
    pub fn check_and_explain<W: Write>(
        &self,
        action: AutomationAction,
        description: &str,
        out: &mut W,
    ) -> Result<bool> {
        let workspace = self.workspaces.get_active_workspace()?;
        check_workspace(&workspace, action, description, out)
    }
}

/// Gate decision for a workspace the caller already resolved.
///
/// Same contract as [`AutomationGate::check_and_explain`] without loading the
/// config again.
pub fn check_workspace<W: Write>(
    workspace: &ActiveWorkspace,
    action: AutomationAction,
    description: &str,
    out: &mut W,
) -> Result<bool> {
    if workspace.automation.get(action) {
        return Ok(true);
    }

    tracing::info!(workspace = %workspace.name, %action, "automation disabled, skipping");
    out.write_all(explain_denied(&workspace.name, action, description).as_bytes())?;
    Ok(false)
}

/// Build the user-facing explanation for a denied action.
pub fn explain_denied(workspace: &str, action: AutomationAction, description: &str) -> String {
    format!(
        "Automation disabled: {}\n   To enable, run: {}\n   Skipping automatic execution.\n",
        description,
        enable_command(workspace, action)
    )
}

/// The exact command that enables `action` for `workspace`.
pub fn enable_command(workspace: &str, action: AutomationAction) -> String {
    format!("brn workspace configure {} automation.{} true", workspace, action)
}
