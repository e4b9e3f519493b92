//! CLI 명령 파싱 모듈.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::run::RunOptions;

#[derive(Debug, Parser)]
#[command(name = "commentpilot")]
#[command(about = "Comment-triggered coding agent for GitHub issues and pull requests")]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Handle the triggering comment event (default)
    Run(RunArgs),
    /// Show effective merged config and agent command availability
    Config,
}

#[derive(Debug, Clone, Default, Args)]
struct RunArgs {
    /// Event name override (defaults to GITHUB_EVENT_NAME)
    #[arg(long)]
    event_name: Option<String>,

    /// Webhook payload path override (defaults to GITHUB_EVENT_PATH)
    #[arg(long)]
    event_path: Option<PathBuf>,

    /// Model identifier passed to the agent (overrides config and MODEL)
    #[arg(long)]
    model: Option<String>,
}

pub enum CliAction {
    InspectConfig,
    Run(RunOptions),
}

impl Cli {
    pub fn parse_action() -> Result<CliAction, String> {
        Cli::parse().into_action()
    }

    fn into_action(self) -> Result<CliAction, String> {
        match self.command {
            Some(Commands::Config) => Ok(CliAction::InspectConfig),
            Some(Commands::Run(args)) => args.into_options().map(CliAction::Run),
            None => self.run.into_options().map(CliAction::Run),
        }
    }
}

impl RunArgs {
    fn into_options(self) -> Result<RunOptions, String> {
        if self.model.as_deref().is_some_and(|m| m.trim().is_empty()) {
            return Err("--model must not be empty".to_string());
        }
        if self
            .event_name
            .as_deref()
            .is_some_and(|n| n.trim().is_empty())
        {
            return Err("--event-name must not be empty".to_string());
        }

        Ok(RunOptions {
            event_name: self.event_name,
            event_path: self.event_path,
            model: self.model,
        })
    }
}
