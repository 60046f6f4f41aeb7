//! CLI argument definitions for brn.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{AutomationAction, AutomationConfig, CONFIG_DIR_ENV};

/// brn - workspace-scoped GitHub and JIRA automation with explicit opt-in.
///
/// Start with `brn setup` to create a workspace, then `brn workspace list`.
#[derive(Parser, Debug)]
#[command(name = "brn")]
#[command(author, version, about = "Workspace-scoped GitHub and JIRA automation", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Directory holding config.yaml (default: ~/.brn)
    #[arg(long = "config-dir", global = true, env = CONFIG_DIR_ENV)]
    pub config_dir: Option<PathBuf>,

    /// Enable debug logging on stderr (BRN_LOG overrides)
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create or update a workspace and its working directory
    ///
    /// The first workspace defaults to the name `personal` and becomes
    /// active. All automation defaults to off unless a flag turns it on.
    Setup(SetupArgs),

    /// Workspace management commands
    Workspace {
        #[command(subcommand)]
        command: WorkspaceCommands,
    },

    /// Automation policy commands
    Automation {
        #[command(subcommand)]
        command: AutomationCommands,
    },

    /// GitHub commands (uses the active workspace's token)
    Github {
        #[command(subcommand)]
        command: GithubCommands,
    },

    /// JIRA commands (uses the active workspace's JIRA settings)
    Jira {
        #[command(subcommand)]
        command: JiraCommands,
    },
}

#[derive(Args, Debug)]
pub struct SetupArgs {
    /// Workspace name (default: personal, for the first workspace)
    #[arg(long)]
    pub name: Option<String>,

    /// Working directory (default: ~/dev/<name>/auto)
    #[arg(long)]
    pub path: Option<String>,

    /// GitHub personal access token
    #[arg(long)]
    pub github_token: Option<String>,

    /// Default GitHub organization
    #[arg(long)]
    pub github_org: Option<String>,

    /// JIRA site URL (e.g. https://company.atlassian.net)
    #[arg(long)]
    pub jira_url: Option<String>,

    /// JIRA account email
    #[arg(long, requires = "jira_url")]
    pub jira_email: Option<String>,

    /// JIRA API token
    #[arg(long, requires = "jira_url")]
    pub jira_token: Option<String>,

    /// Allow pushing commits automatically
    #[arg(long)]
    pub auto_push: bool,

    /// Allow creating pull requests automatically
    #[arg(long)]
    pub auto_pr: bool,

    /// Allow moving JIRA tickets automatically
    #[arg(long)]
    pub auto_transition: bool,

    /// Allow posting JIRA comments automatically
    #[arg(long)]
    pub auto_comment: bool,
}

impl SetupArgs {
    /// Automation switches requested on the command line.
    pub fn automation(&self) -> AutomationConfig {
        AutomationConfig {
            github_auto_push: self.auto_push,
            github_auto_pr: self.auto_pr,
            jira_auto_transition: self.auto_transition,
            jira_auto_comment: self.auto_comment,
        }
    }
}

/// Workspace subcommands
#[derive(Subcommand, Debug)]
pub enum WorkspaceCommands {
    /// List all workspaces (active one marked)
    List,

    /// Make a workspace the active one
    Switch {
        /// Workspace name
        name: String,
    },

    /// Create a workspace (becomes active if none is)
    Create {
        /// Workspace name
        name: String,

        /// Working directory; `~` expands to the home directory
        path: String,
    },

    /// Set one key of a workspace
    ///
    /// Keys: path, github_token, github_org, jira_url, jira_email, jira_token,
    /// automation.<action> (true/false). An empty value clears an optional key.
    Configure {
        /// Workspace name
        name: String,

        /// Key to set
        key: String,

        /// New value
        value: String,
    },

    /// Show a workspace with secrets masked (default: the active one)
    Show {
        /// Workspace name
        name: Option<String>,
    },
}

/// Automation subcommands
#[derive(Subcommand, Debug)]
pub enum AutomationCommands {
    /// Report whether an action is enabled for the active workspace
    Check {
        /// github_auto_push, github_auto_pr, jira_auto_transition or jira_auto_comment
        action: AutomationAction,
    },
}

/// GitHub subcommands
#[derive(Subcommand, Debug)]
pub enum GithubCommands {
    /// List repositories (default owner: the workspace's github_org)
    Repos {
        /// Organization or user
        owner: Option<String>,
    },

    /// List pull requests of a repository
    Prs {
        /// Repository as owner/repo
        repo: String,

        /// open, closed or all
        #[arg(long, default_value = "open")]
        state: String,
    },

    /// Show repository details
    Repo {
        /// Repository as owner/repo
        repo: String,
    },

    /// Create a pull request (requires automation.github_auto_pr)
    CreatePr {
        /// Repository as owner/repo
        repo: String,

        /// Branch with the changes
        head: String,

        /// Branch to merge into
        base: String,

        /// PR title
        title: String,

        /// PR description
        #[arg(long, default_value = "")]
        body: String,
    },
}

/// JIRA subcommands
#[derive(Subcommand, Debug)]
pub enum JiraCommands {
    /// Show a ticket
    Ticket {
        /// Ticket key (e.g. PROJ-123)
        key: String,
    },

    /// List tickets assigned to you
    Tickets {
        /// Only tickets in this status
        #[arg(long)]
        status: Option<String>,
    },

    /// Add a comment (requires automation.jira_auto_comment)
    Comment {
        /// Ticket key
        key: String,

        /// Comment text
        text: String,
    },

    /// Move a ticket to a status (requires automation.jira_auto_transition)
    Transition {
        /// Ticket key
        key: String,

        /// Target status name, e.g. "In Progress"
        status: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_config_dir_reads_env_var() {
        let command = Cli::command();
        let arg = command
            .get_arguments()
            .find(|a| a.get_id() == "config_dir")
            .unwrap();
        assert_eq!(arg.get_env(), Some(std::ffi::OsStr::new(CONFIG_DIR_ENV)));
    }

    #[test]
    fn test_parse_automation_action() {
        let cli = Cli::try_parse_from(["brn", "automation", "check", "github_auto_pr"]).unwrap();
        match cli.command {
            Some(Commands::Automation {
                command: AutomationCommands::Check { action },
            }) => assert_eq!(action, AutomationAction::GithubAutoPr),
            other => panic!("unexpected parse: {:?}", other),
        }
        assert!(Cli::try_parse_from(["brn", "automation", "check", "deploy"]).is_err());
    }

    #[test]
    fn test_setup_flags_map_to_automation() {
        let cli = Cli::try_parse_from(["brn", "setup", "--name", "w", "--auto-pr", "--auto-comment"])
            .unwrap();
        let Some(Commands::Setup(args)) = cli.command else {
            panic!("expected setup");
        };
        let automation = args.automation();
        assert!(automation.github_auto_pr);
        assert!(automation.jira_auto_comment);
        assert!(!automation.github_auto_push);
        assert!(!automation.jira_auto_transition);
    }

    #[test]
    fn test_jira_email_requires_url() {
        assert!(Cli::try_parse_from(["brn", "setup", "--jira-email", "me@x.com"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "brn",
            "workspace",
            "list",
            "-H",
            "--config-dir",
            "/tmp/brn",
        ])
        .unwrap();
        assert!(cli.human_readable);
        assert_eq!(cli.config_dir, Some(PathBuf::from("/tmp/brn")));
    }
}
