//! brn CLI - workspace-scoped GitHub and JIRA automation.

use std::io;
use std::process;

use brn::cli::{
    AutomationCommands, Cli, Commands, GithubCommands, JiraCommands, SetupArgs,
    WorkspaceCommands,
};
use brn::commands::{self, CreatePrArgs, Output, SetupOptions};
use brn::config::ConfigStore;
use brn::logging;
use clap::{CommandFactory, Parser};

fn main() {
    let cli = Cli::parse();
    let human = cli.human_readable;
    logging::init(cli.verbose);

    let result = open_store(cli.config_dir).and_then(|store| run_command(cli.command, &store, human));

    if let Err(e) = result {
        tracing::debug!(error = ?e, "command failed");
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        }
        process::exit(1);
    }
}

/// Config location: --config-dir flag > BRN_CONFIG_DIR env > ~/.brn
fn open_store(config_dir: Option<std::path::PathBuf>) -> Result<ConfigStore, brn::Error> {
    match config_dir {
        Some(dir) => Ok(ConfigStore::in_dir(&dir)),
        None => ConfigStore::open_default(),
    }
}

fn run_command(
    command: Option<Commands>,
    store: &ConfigStore,
    human: bool,
) -> Result<(), brn::Error> {
    // Gate explanations go to stderr so stdout stays machine-readable.
    let mut explain = io::stderr();

    match command {
        Some(Commands::Setup(args)) => {
            let result = commands::setup(store, setup_options(args))?;
            output(&result, human);
        }
        Some(Commands::Workspace { command }) => match command {
            WorkspaceCommands::List => {
                let result = commands::workspace_list(store)?;
                output(&result, human);
            }
            WorkspaceCommands::Switch { name } => {
                let result = commands::workspace_switch(store, &name)?;
                output(&result, human);
            }
            WorkspaceCommands::Create { name, path } => {
                let result = commands::workspace_create(store, &name, &path)?;
                output(&result, human);
            }
            WorkspaceCommands::Configure { name, key, value } => {
                let result = commands::workspace_configure(store, &name, &key, &value)?;
                output(&result, human);
            }
            WorkspaceCommands::Show { name } => {
                let result = commands::workspace_show(store, name.as_deref())?;
                output(&result, human);
            }
        },
        Some(Commands::Automation { command }) => match command {
            AutomationCommands::Check { action } => {
                let result = commands::automation_check(store, action)?;
                output(&result, human);
            }
        },
        Some(Commands::Github { command }) => match command {
            GithubCommands::Repos { owner } => {
                let result = commands::github_repos(store, owner)?;
                output(&result, human);
            }
            GithubCommands::Prs { repo, state } => {
                let result = commands::github_prs(store, &repo, &state)?;
                output(&result, human);
            }
            GithubCommands::Repo { repo } => {
                let result = commands::github_repo(store, &repo)?;
                output(&result, human);
            }
            GithubCommands::CreatePr {
                repo,
                head,
                base,
                title,
                body,
            } => {
                let args = CreatePrArgs {
                    repo,
                    head,
                    base,
                    title,
                    body,
                };
                let result = commands::github_create_pr(store, &args, &mut explain)?;
                output(&result, human);
            }
        },
        Some(Commands::Jira { command }) => match command {
            JiraCommands::Ticket { key } => {
                let result = commands::jira_ticket(store, &key)?;
                output(&result, human);
            }
            JiraCommands::Tickets { status } => {
                let result = commands::jira_tickets(store, status.as_deref())?;
                output(&result, human);
            }
            JiraCommands::Comment { key, text } => {
                let result = commands::jira_comment(store, &key, &text, &mut explain)?;
                output(&result, human);
            }
            JiraCommands::Transition { key, status } => {
                let result = commands::jira_transition(store, &key, &status, &mut explain)?;
                output(&result, human);
            }
        },
        None => {
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}

fn setup_options(args: SetupArgs) -> SetupOptions {
    let automation = args.automation();
    SetupOptions {
        name: args.name,
        path: args.path,
        github_token: args.github_token,
        github_org: args.github_org,
        jira_url: args.jira_url,
        jira_email: args.jira_email,
        jira_token: args.jira_token,
        automation,
    }
}

fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}
