//! Command implementations for the brn CLI.
//!
//! This module contains the business logic for each CLI command.
//! Commands are organized by area:
//! - `setup` - create or update a workspace in one step
//! - `workspace_*` - list, switch, create, configure and show workspaces
//! - `automation_check` - report a gate decision
//! - `github_*` / `jira_*` - REST glue, with side effects behind the gate

use std::io::Write;

use serde::Serialize;

use crate::Result;
use crate::automation::{self, AutomationGate, enable_command};
use crate::config::{
    AutomationAction, AutomationConfig, ConfigStore, SECRET_KEYS, WorkspaceConfig,
    WorkspaceSummary, Workspaces, expand_home, mask_secret,
};
use crate::credentials::Credentials;
use crate::github::{GitHubClient, NewPullRequest, PullRequest, Repository};
use crate::jira::{self, Issue, JiraClient};

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output: Serialize {
    /// Serialize to JSON string.
    fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }).to_string())
    }

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

/// Outcome of a gated command: either it ran, or the gate said no.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Gated<T> {
    Done(T),
    Skipped(Skipped),
}

impl<T: Output> Output for Gated<T> {
    fn to_human(&self) -> String {
        match self {
            Gated::Done(result) => result.to_human(),
            Gated::Skipped(skipped) => skipped.to_human(),
        }
    }
}

/// A side effect that was not performed because its automation is off.
#[derive(Debug, Serialize)]
pub struct Skipped {
    pub skipped: bool,
    pub action: AutomationAction,
    pub workspace: String,
    pub enable_with: String,
}

impl Skipped {
    fn new(workspace: &str, action: AutomationAction) -> Self {
        Self {
            skipped: true,
            action,
            workspace: workspace.to_string(),
            enable_with: enable_command(workspace, action),
        }
    }
}

impl Output for Skipped {
    fn to_human(&self) -> String {
        format!("Skipped: {} is disabled for '{}'", self.action, self.workspace)
    }
}

/// Run `action` only if the gate allows it, explaining a denial on `out`.
fn gated<T, W, F>(
    store: &ConfigStore,
    action: AutomationAction,
    description: &str,
    out: &mut W,
    run: F,
) -> Result<Gated<T>>
where
    W: Write,
    F: FnOnce() -> Result<T>,
{
    let workspace = Workspaces::new(store).get_active_workspace()?;
    if automation::check_workspace(&workspace, action, description, out)? {
        return run().map(Gated::Done);
    }
    Ok(Gated::Skipped(Skipped::new(&workspace.name, action)))
}

// ==================== Setup ====================

/// Inputs for `brn setup`.
#[derive(Debug, Clone, Default)]
pub struct SetupOptions {
    pub name: Option<String>,
    pub path: Option<String>,
    pub github_token: Option<String>,
    pub github_org: Option<String>,
    pub jira_url: Option<String>,
    pub jira_email: Option<String>,
    pub jira_token: Option<String>,
    pub automation: AutomationConfig,
}

#[derive(Debug, Serialize)]
pub struct SetupResult {
    pub workspace: String,
    pub path: String,
    pub config_path: String,
    pub active: bool,
    pub automation: AutomationConfig,
}

impl Output for SetupResult {
    fn to_human(&self) -> String {
        let mut lines = vec![
            "Setup complete!".to_string(),
            String::new(),
            format!("   Workspace: {}", self.workspace),
            format!("   Work dir:  {}", self.path),
            format!("   Config:    {}", self.config_path),
        ];
        if !self.active {
            lines.push(format!(
                "   Not active. Run: brn workspace switch {}",
                self.workspace
            ));
        }
        let enabled: Vec<&str> = AutomationAction::ALL
            .iter()
            .filter(|a| self.automation.get(**a))
            .map(|a| a.label())
            .collect();
        if enabled.is_empty() {
            lines.push("   Automation: all off".to_string());
        } else {
            lines.push(format!("   Automation: {}", enabled.join(", ")));
        }
        lines.join("\n")
    }
}

/// Create or replace a workspace from `options` and create its directory.
///
/// The name defaults to `personal` when the config has no workspaces yet and
/// is required otherwise. The path defaults to `~/dev/<name>/auto`.
pub fn setup(store: &ConfigStore, options: SetupOptions) -> Result<SetupResult> {
    let existing = store.load_or_default()?;
    let name = match options.name.filter(|n| !n.trim().is_empty()) {
        Some(name) => name,
        None if existing.workspaces.is_empty() => "personal".to_string(),
        None => {
            return Err(crate::Error::InvalidInput(
                "workspace name is required (--name)".to_string(),
            ));
        }
    };
    let path = options
        .path
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| format!("~/dev/{}/auto", name));
    let work_dir = expand_home(&path);

    let mut workspace = WorkspaceConfig::new(work_dir.to_string_lossy());
    workspace.github_token = options.github_token.filter(|s| !s.is_empty());
    workspace.github_org = options.github_org.filter(|s| !s.is_empty());
    if let Some(url) = options.jira_url.filter(|s| !s.is_empty()) {
        workspace.jira_url = Some(url);
        workspace.jira_email = options.jira_email.filter(|s| !s.is_empty());
        workspace.jira_token = options.jira_token.filter(|s| !s.is_empty());
    }
    workspace.automation = options.automation;

    std::fs::create_dir_all(&work_dir)?;
    Workspaces::new(store).upsert_workspace(&name, workspace)?;

    let active = Workspaces::new(store).get_active_workspace()?.name == name;
    Ok(SetupResult {
        workspace: name,
        path: work_dir.to_string_lossy().to_string(),
        config_path: store.path().to_string_lossy().to_string(),
        active,
        automation: options.automation,
    })
}

// ==================== Workspace ====================

#[derive(Debug, Serialize)]
pub struct WorkspaceList {
    pub workspaces: Vec<WorkspaceSummary>,
}

impl Output for WorkspaceList {
    fn to_human(&self) -> String {
        if self.workspaces.is_empty() {
            return "No workspaces configured. Run: brn setup".to_string();
        }
        let mut lines = vec!["Workspaces:".to_string(), "===========".to_string()];
        for ws in &self.workspaces {
            let (marker, label) = if ws.is_active {
                ("* ", " [ACTIVE]")
            } else {
                ("  ", "")
            };
            lines.push(format!("{}{} ({}){}", marker, ws.name, ws.path, label));
        }
        lines.join("\n")
    }
}

/// List workspaces. A missing config lists nothing rather than failing.
pub fn workspace_list(store: &ConfigStore) -> Result<WorkspaceList> {
    let workspaces = match Workspaces::new(store).list_workspaces() {
        Err(crate::Error::ConfigMissing { .. }) => Vec::new(),
        other => other?,
    };
    Ok(WorkspaceList { workspaces })
}

#[derive(Debug, Serialize)]
pub struct WorkspaceSwitched {
    pub active_workspace: String,
}

impl Output for WorkspaceSwitched {
    fn to_human(&self) -> String {
        format!("Switched to workspace '{}'", self.active_workspace)
    }
}

pub fn workspace_switch(store: &ConfigStore, name: &str) -> Result<WorkspaceSwitched> {
    Workspaces::new(store).switch_active(name)?;
    Ok(WorkspaceSwitched {
        active_workspace: name.to_string(),
    })
}

#[derive(Debug, Serialize)]
pub struct WorkspaceCreated {
    pub workspace: String,
    pub path: String,
    pub active: bool,
}

impl Output for WorkspaceCreated {
    fn to_human(&self) -> String {
        let mut out = format!("Created workspace '{}' at {}", self.workspace, self.path);
        if self.active {
            out.push_str(" [ACTIVE]");
        }
        out
    }
}

pub fn workspace_create(store: &ConfigStore, name: &str, path: &str) -> Result<WorkspaceCreated> {
    let workspaces = Workspaces::new(store);
    let created = workspaces.create_workspace(name, path)?;
    let active = workspaces.get_active_workspace()?.name == created.name;
    Ok(WorkspaceCreated {
        workspace: created.name,
        path: created.config.path,
        active,
    })
}

#[derive(Debug, Serialize)]
pub struct WorkspaceConfigured {
    pub workspace: String,
    pub key: String,
    pub value: String,
}

impl Output for WorkspaceConfigured {
    fn to_human(&self) -> String {
        format!("Set {} for workspace '{}'", self.key, self.workspace)
    }
}

pub fn workspace_configure(
    store: &ConfigStore,
    name: &str,
    key: &str,
    value: &str,
) -> Result<WorkspaceConfigured> {
    Workspaces::new(store).configure_workspace(name, key, value)?;
    let shown = if SECRET_KEYS.contains(&key) && !value.is_empty() {
        mask_secret(value)
    } else {
        value.to_string()
    };
    Ok(WorkspaceConfigured {
        workspace: name.to_string(),
        key: key.to_string(),
        value: shown,
    })
}

/// A workspace with secrets masked.
#[derive(Debug, Serialize)]
pub struct WorkspaceDetail {
    pub name: String,
    pub active: bool,
    pub path: String,
    pub github_token: Option<String>,
    pub github_org: Option<String>,
    pub jira_url: Option<String>,
    pub jira_email: Option<String>,
    pub jira_token: Option<String>,
    pub automation: AutomationConfig,
}

impl Output for WorkspaceDetail {
    fn to_human(&self) -> String {
        fn show(value: &Option<String>) -> &str {
            value.as_deref().unwrap_or("(not set)")
        }
        let mut lines = vec![
            format!(
                "Workspace: {}{}",
                self.name,
                if self.active { " [ACTIVE]" } else { "" }
            ),
            format!("  path:         {}", self.path),
            format!("  github_token: {}", show(&self.github_token)),
            format!("  github_org:   {}", show(&self.github_org)),
            format!("  jira_url:     {}", show(&self.jira_url)),
            format!("  jira_email:   {}", show(&self.jira_email)),
            format!("  jira_token:   {}", show(&self.jira_token)),
            "  automation:".to_string(),
        ];
        for action in AutomationAction::ALL {
            lines.push(format!(
                "    {:<22} {}",
                action.as_str(),
                self.automation.get(action)
            ));
        }
        lines.join("\n")
    }
}

/// Show `name`, or the active workspace when no name is given.
pub fn workspace_show(store: &ConfigStore, name: Option<&str>) -> Result<WorkspaceDetail> {
    let config = store.load()?;
    let workspaces = Workspaces::new(store);
    let workspace = match name {
        Some(name) => workspaces.get_workspace(name)?,
        None => workspaces.get_active_workspace()?,
    };
    let active = config.active_workspace == workspace.name;
    let ws = workspace.config;
    Ok(WorkspaceDetail {
        name: workspace.name,
        active,
        path: ws.path,
        github_token: ws.github_token.as_deref().map(mask_secret),
        github_org: ws.github_org,
        jira_url: ws.jira_url,
        jira_email: ws.jira_email,
        jira_token: ws.jira_token.as_deref().map(mask_secret),
        automation: ws.automation,
    })
}

// ==================== Automation ====================

#[derive(Debug, Serialize)]
pub struct AutomationStatus {
    pub workspace: String,
    pub action: AutomationAction,
    pub enabled: bool,
}

impl Output for AutomationStatus {
    fn to_human(&self) -> String {
        if self.enabled {
            format!("{} is enabled for '{}'", self.action, self.workspace)
        } else {
            format!(
                "{} is disabled for '{}'. To enable, run: {}",
                self.action,
                self.workspace,
                enable_command(&self.workspace, self.action)
            )
        }
    }
}

pub fn automation_check(store: &ConfigStore, action: AutomationAction) -> Result<AutomationStatus> {
    let enabled = AutomationGate::new(store).is_enabled(action)?;
    let workspace = Workspaces::new(store).get_active_workspace()?;
    Ok(AutomationStatus {
        workspace: workspace.name,
        action,
        enabled,
    })
}

// ==================== GitHub ====================

fn github_client(store: &ConfigStore) -> Result<GitHubClient> {
    Ok(GitHubClient::new(Credentials::new(store).github_token()?))
}

#[derive(Debug, Serialize)]
pub struct RepoList {
    pub owner: Option<String>,
    pub repos: Vec<Repository>,
}

impl Output for RepoList {
    fn to_human(&self) -> String {
        let mut lines = vec![match &self.owner {
            Some(owner) => format!("Repositories for {}:", owner),
            None => "Repositories:".to_string(),
        }];
        lines.push("=".repeat(50));
        for repo in &self.repos {
            let visibility = if repo.private { "private" } else { "public" };
            lines.push(format!("{} ({})", repo.full_name, visibility));
            if let Some(description) = &repo.description {
                let short: String = description.chars().take(60).collect();
                lines.push(format!("   {}", short));
            }
        }
        lines.join("\n")
    }
}

/// List repos of `owner`, defaulting to the workspace's `github_org`.
pub fn github_repos(store: &ConfigStore, owner: Option<String>) -> Result<RepoList> {
    let owner = match owner {
        Some(owner) => Some(owner),
        None => Workspaces::new(store).get_active_workspace()?.github_org.clone(),
    };
    let repos = github_client(store)?.list_repos(owner.as_deref())?;
    Ok(RepoList { owner, repos })
}

#[derive(Debug, Serialize)]
pub struct PullRequestList {
    pub repo: String,
    pub state: String,
    pub pull_requests: Vec<PullRequest>,
}

impl Output for PullRequestList {
    fn to_human(&self) -> String {
        let mut lines = vec![
            format!("Pull Requests for {} ({}):", self.repo, self.state),
            "=".repeat(50),
        ];
        if self.pull_requests.is_empty() {
            lines.push("No pull requests found.".to_string());
        }
        for pr in &self.pull_requests {
            let draft = if pr.draft { " [draft]" } else { "" };
            lines.push(format!("#{}{} {}", pr.number, draft, pr.title));
            if let (Some(head), Some(base)) = (&pr.head, &pr.base) {
                let author = pr.user.as_ref().map(|u| u.login.as_str()).unwrap_or("?");
                lines.push(format!("   {} -> {} by @{}", head.name, base.name, author));
            }
            lines.push(format!("   {}", pr.html_url));
        }
        lines.join("\n")
    }
}

pub fn github_prs(store: &ConfigStore, repo: &str, state: &str) -> Result<PullRequestList> {
    let pull_requests = github_client(store)?.list_pull_requests(repo, state)?;
    Ok(PullRequestList {
        repo: repo.to_string(),
        state: state.to_string(),
        pull_requests,
    })
}

#[derive(Debug, Serialize)]
pub struct RepoInfo {
    #[serde(flatten)]
    pub repo: Repository,
}

impl Output for RepoInfo {
    fn to_human(&self) -> String {
        fn or_na(value: &Option<String>) -> &str {
            value.as_deref().unwrap_or("N/A")
        }
        let r = &self.repo;
        [
            format!("Repository: {}", r.full_name),
            "=".repeat(50),
            format!("Description: {}", or_na(&r.description)),
            format!(
                "Visibility:  {}",
                if r.private { "Private" } else { "Public" }
            ),
            format!("Default:     {}", or_na(&r.default_branch)),
            format!("Language:    {}", or_na(&r.language)),
            format!("Stars:       {}", r.stargazers_count),
            format!("Forks:       {}", r.forks_count),
            format!("Clone URL:   {}", or_na(&r.clone_url)),
            format!("SSH URL:     {}", or_na(&r.ssh_url)),
        ]
        .join("\n")
    }
}

pub fn github_repo(store: &ConfigStore, repo: &str) -> Result<RepoInfo> {
    Ok(RepoInfo {
        repo: github_client(store)?.get_repo(repo)?,
    })
}

#[derive(Debug, Serialize)]
pub struct PullRequestCreated {
    pub number: u64,
    pub title: String,
    pub url: String,
    pub head: String,
    pub base: String,
}

impl Output for PullRequestCreated {
    fn to_human(&self) -> String {
        format!(
            "Created PR #{}: {}\n  URL: {}\n  {} -> {}",
            self.number, self.title, self.url, self.head, self.base
        )
    }
}

/// Arguments for `brn github create-pr`.
#[derive(Debug, Clone)]
pub struct CreatePrArgs {
    pub repo: String,
    pub head: String,
    pub base: String,
    pub title: String,
    pub body: String,
}

/// Open a PR if `github_auto_pr` is enabled for the active workspace.
pub fn github_create_pr<W: Write>(
    store: &ConfigStore,
    args: &CreatePrArgs,
    out: &mut W,
) -> Result<Gated<PullRequestCreated>> {
    let description = format!(
        "Create PR '{}' ({} -> {}) on {}",
        args.title, args.head, args.base, args.repo
    );
    gated(store, AutomationAction::GithubAutoPr, &description, out, || {
        let pr = github_client(store)?.create_pull_request(
            &args.repo,
            &NewPullRequest {
                title: &args.title,
                head: &args.head,
                base: &args.base,
                body: &args.body,
            },
        )?;
        Ok(PullRequestCreated {
            number: pr.number,
            title: pr.title,
            url: pr.html_url,
            head: args.head.clone(),
            base: args.base.clone(),
        })
    })
}

// ==================== JIRA ====================

fn jira_client(store: &ConfigStore) -> Result<JiraClient> {
    Ok(JiraClient::new(&Credentials::new(store).jira_config()?))
}

#[derive(Debug, Serialize)]
pub struct TicketDetail {
    pub key: String,
    pub summary: String,
    pub status: String,
    pub issue_type: Option<String>,
    pub priority: Option<String>,
    pub assignee: Option<String>,
    pub reporter: Option<String>,
    pub created: Option<String>,
    pub updated: Option<String>,
    pub description: String,
    pub url: String,
}

impl TicketDetail {
    fn from_issue(issue: Issue, url: String) -> Self {
        let fields = issue.fields;
        Self {
            key: issue.key,
            summary: fields.summary,
            status: fields.status.name,
            issue_type: fields.issuetype.map(|t| t.name),
            priority: fields.priority.map(|p| p.name),
            assignee: fields.assignee.map(|p| p.display_name),
            reporter: fields.reporter.map(|p| p.display_name),
            created: fields.created,
            updated: fields.updated,
            description: fields
                .description
                .as_ref()
                .map(jira::extract_text)
                .unwrap_or_default(),
            url,
        }
    }
}

impl Output for TicketDetail {
    fn to_human(&self) -> String {
        fn date(value: &Option<String>) -> String {
            value
                .as_deref()
                .map(|d| d.chars().take(10).collect())
                .unwrap_or_default()
        }
        let mut lines = vec![
            format!("Ticket: {}", self.key),
            "=".repeat(60),
            format!("Summary:     {}", self.summary),
            format!("Status:      {}", self.status),
            format!("Type:        {}", self.issue_type.as_deref().unwrap_or("Unknown")),
            format!("Priority:    {}", self.priority.as_deref().unwrap_or("None")),
            format!("Assignee:    {}", self.assignee.as_deref().unwrap_or("Unassigned")),
            format!("Reporter:    {}", self.reporter.as_deref().unwrap_or("Unknown")),
            format!("Created:     {}", date(&self.created)),
            format!("Updated:     {}", date(&self.updated)),
        ];
        if !self.description.is_empty() {
            lines.push(String::new());
            lines.push("Description:".to_string());
            lines.push("-".repeat(40));
            lines.push(self.description.clone());
        }
        lines.push(String::new());
        lines.push(format!("URL: {}", self.url));
        lines.join("\n")
    }
}

pub fn jira_ticket(store: &ConfigStore, key: &str) -> Result<TicketDetail> {
    let client = jira_client(store)?;
    let issue = client.get_issue(key)?;
    let url = client.browse_url(&issue.key);
    Ok(TicketDetail::from_issue(issue, url))
}

#[derive(Debug, Serialize)]
pub struct TicketSummary {
    pub key: String,
    pub summary: String,
    pub status: String,
    pub priority: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TicketList {
    pub tickets: Vec<TicketSummary>,
}

impl Output for TicketList {
    fn to_human(&self) -> String {
        let mut lines = vec![
            format!("Your Tickets ({} found):", self.tickets.len()),
            "=".repeat(60),
        ];
        if self.tickets.is_empty() {
            lines.push("No tickets found.".to_string());
        }
        for t in &self.tickets {
            let summary: String = t.summary.chars().take(50).collect();
            lines.push(format!("{}: {}", t.key, summary));
            lines.push(format!(
                "   Status: {} | Priority: {}",
                t.status,
                t.priority.as_deref().unwrap_or("None")
            ));
        }
        lines.join("\n")
    }
}

pub fn jira_tickets(store: &ConfigStore, status: Option<&str>) -> Result<TicketList> {
    let issues = jira_client(store)?.search_assigned(status)?;
    Ok(TicketList {
        tickets: issues
            .into_iter()
            .map(|issue| TicketSummary {
                key: issue.key,
                summary: issue.fields.summary,
                status: issue.fields.status.name,
                priority: issue.fields.priority.map(|p| p.name),
            })
            .collect(),
    })
}

#[derive(Debug, Serialize)]
pub struct CommentAdded {
    pub key: String,
}

impl Output for CommentAdded {
    fn to_human(&self) -> String {
        format!("Added comment to {}", self.key)
    }
}

/// Comment on a ticket if `jira_auto_comment` is enabled.
pub fn jira_comment<W: Write>(
    store: &ConfigStore,
    key: &str,
    text: &str,
    out: &mut W,
) -> Result<Gated<CommentAdded>> {
    let description = format!("Add comment to {}", key);
    gated(store, AutomationAction::JiraAutoComment, &description, out, || {
        jira_client(store)?.add_comment(key, text)?;
        Ok(CommentAdded {
            key: key.to_string(),
        })
    })
}

#[derive(Debug, Serialize)]
pub struct TicketTransitioned {
    pub key: String,
    pub status: String,
}

impl Output for TicketTransitioned {
    fn to_human(&self) -> String {
        format!("Transitioned {} to '{}'", self.key, self.status)
    }
}

/// Move a ticket to `status` if `jira_auto_transition` is enabled.
pub fn jira_transition<W: Write>(
    store: &ConfigStore,
    key: &str,
    status: &str,
    out: &mut W,
) -> Result<Gated<TicketTransitioned>> {
    let description = format!("Move {} to '{}'", key, status);
    gated(store, AutomationAction::JiraAutoTransition, &description, out, || {
        let transition = jira_client(store)?.transition(key, status)?;
        Ok(TicketTransitioned {
            key: key.to_string(),
            status: transition.name,
        })
    })
}
