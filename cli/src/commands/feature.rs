//! Feature command

use std::process::ExitCode;

use anyhow::{Result, bail};
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::ConfigSource;
use crate::application::services::feature::{FeatureRequest, create_feature_workspaces};
use crate::application::services::session::Session;
use crate::commands::{load_config, login};
use crate::domain::permissions::{Permission, WorkspaceRole};
use crate::domain::workspace::parse_type_list;

/// Arguments for the feature command.
#[derive(Args)]
pub struct FeatureArgs {
    /// Feature branch to bind the workspaces to
    #[arg(long, env = "FEATURE_BRANCH_NAME")]
    pub branch: String,

    /// Comma-separated workspace types: processing, datastores, consumption
    #[arg(long, env = "WORKSPACES_TO_CREATE", default_value = "processing,datastores")]
    pub workspaces: String,

    /// Security group granted on every feature workspace
    #[arg(long, default_value = "sg-adv-engineers")]
    pub group: String,

    /// Role granted to the security group
    #[arg(long, default_value = "Admin", value_parser = parse_role)]
    pub role: WorkspaceRole,
}

fn parse_role(raw: &str) -> Result<WorkspaceRole, String> {
    WorkspaceRole::parse(raw)
        .ok_or_else(|| format!("unknown role '{raw}' (expected Admin, Member, Contributor or Viewer)"))
}

/// Run the feature command.
///
/// # Errors
///
/// Returns an error if the arguments are unusable, the configuration cannot
/// be loaded, or authentication fails.
pub async fn run(app: &AppContext, source: &impl ConfigSource, args: &FeatureArgs) -> Result<ExitCode> {
    let branch = args.branch.trim();
    if branch.is_empty() {
        bail!("feature branch name is empty; pass --branch or set FEATURE_BRANCH_NAME");
    }
    let types = parse_type_list(&args.workspaces);
    if types.is_empty() {
        bail!("no workspace types given; pass --workspaces or set WORKSPACES_TO_CREATE");
    }

    let config = load_config(source)?;
    let env = login(app).await?;

    let reporter = app.reporter();
    let session = Session {
        cli: &app.fabric,
        pacer: &reporter,
        reporter: &reporter,
        pacing: &config.pacing,
    };
    let request = FeatureRequest {
        branch,
        types: &types,
        grant: Permission {
            group: args.group.clone(),
            role: args.role,
        },
        git_token: env.git_token(),
    };
    let report = create_feature_workspaces(&session, &config, &request).await;
    app.finish(&report)
}
