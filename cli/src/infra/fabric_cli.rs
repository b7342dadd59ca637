//! Infrastructure implementation of the Fabric CLI port traits.
//!
//! `FabricCliAdapter<R>` builds `fab` argument vectors and routes them through
//! a `CommandRunner`, converting raw process output into `CliReply`.

use anyhow::Result;

use crate::application::ports::{CommandRunner, ItemCatalog, RestApi, SessionAuth};
use crate::domain::api::{ApiRequest, Audience, CliReply};
use crate::domain::credentials::ServicePrincipal;
use crate::infra::command_runner::TokioCommandRunner;

/// Adapter that routes all `fab` calls through a `CommandRunner`.
///
/// Generic over `R: CommandRunner` so that tests can inject a mock runner
/// without spawning real processes.
pub struct FabricCliAdapter<R: CommandRunner> {
    program: String,
    runner: R,
}

impl<R: CommandRunner> FabricCliAdapter<R> {
    pub fn new(program: impl Into<String>, runner: R) -> Self {
        Self {
            program: program.into(),
            runner,
        }
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    async fn exec(&self, args: &[&str]) -> Result<CliReply> {
        let output = self.runner.run(&self.program, args).await?;
        Ok(CliReply::from_bytes(
            output.status.code(),
            &output.stdout,
            &output.stderr,
        ))
    }
}

impl FabricCliAdapter<TokioCommandRunner> {
    /// Convenience constructor for production use.
    pub fn default_runner(program: impl Into<String>) -> Self {
        Self::new(program, TokioCommandRunner::default())
    }
}

/// `api -X <method> <path> [-A azure] [-i <json>]`.
#[must_use]
pub fn api_args(request: &ApiRequest) -> Vec<String> {
    let mut args = vec![
        "api".to_string(),
        "-X".to_string(),
        request.method.as_str().to_string(),
        request.path.clone(),
    ];
    if request.audience == Audience::Azure {
        args.push("-A".to_string());
        args.push("azure".to_string());
    }
    if let Some(body) = &request.body {
        args.push("-i".to_string());
        args.push(body.to_string());
    }
    args
}

impl<R: CommandRunner> SessionAuth for FabricCliAdapter<R> {
    async fn login(&self, principal: &ServicePrincipal) -> Result<CliReply> {
        self.exec(&[
            "auth",
            "login",
            "-u",
            &principal.client_id,
            "-p",
            &principal.client_secret,
            "--tenant",
            &principal.tenant_id,
        ])
        .await
    }
}

impl<R: CommandRunner> ItemCatalog for FabricCliAdapter<R> {
    async fn ls(&self, path: &str) -> Result<CliReply> {
        self.exec(&["ls", path]).await
    }

    async fn get(&self, path: &str, query: &str) -> Result<CliReply> {
        self.exec(&["get", path, "-q", query]).await
    }

    async fn create(&self, path: &str, params: &[String]) -> Result<CliReply> {
        let mut args = vec!["create", path];
        for param in params {
            args.push("-P");
            args.push(param);
        }
        self.exec(&args).await
    }
}

impl<R: CommandRunner> RestApi for FabricCliAdapter<R> {
    async fn call(&self, request: &ApiRequest) -> Result<CliReply> {
        let args = api_args(request);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.exec(&args).await
    }
}
