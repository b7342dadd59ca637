//! CLI argument parsing with clap derive

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use crate::app::{AppContext, AppFlags, BehaviourFlags, OutputFlags};
use crate::commands;
use crate::domain::config::DEFAULT_CONFIG_PATH;
use crate::infra::config::YamlConfigSource;

/// Provision Microsoft Fabric capacities, workspaces, and git sync
#[derive(Parser)]
#[command(
    name = "fabric-deploy",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Exit with code 2 when any step failed
    #[arg(long, global = true)]
    pub strict: bool,

    /// Solution configuration file
    #[arg(
        long,
        global = true,
        env = "CONFIG_FILE",
        default_value = DEFAULT_CONFIG_PATH,
        value_name = "PATH"
    )]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create or resume capacities, create workspaces, grant roles, connect
    /// and pull from git, then suspend the capacities
    Provision,

    /// Create workspaces for a feature branch on the development capacities
    Feature(commands::feature::FeatureArgs),

    /// Pull the latest commit into the development workspaces
    Sync,

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error for terminal failures: unreadable configuration,
    /// missing credentials, or failed authentication.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            json,
            quiet,
            no_color,
            strict,
            config,
            command,
            ..
        } = self;
        let app = AppContext::new(&AppFlags {
            output: OutputFlags {
                no_color,
                quiet,
                json,
            },
            behaviour: BehaviourFlags { strict },
        });
        let source = YamlConfigSource::new(config);

        match command {
            Command::Provision => commands::provision::run(&app, &source).await,
            Command::Feature(args) => commands::feature::run(&app, &source, &args).await,
            Command::Sync => commands::sync::run(&app, &source).await,
            Command::Version => commands::version::run(&app),
        }
    }
}
