//! fabric-deploy - Provision Microsoft Fabric solutions from a YAML description

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use fabric_deploy::cli::Cli;
use fabric_deploy::domain::error::{AuthError, ConfigError};
use fabric_deploy::infra::environment::load_dotenv;
use fabric_deploy::output::json::format_error;

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn error_code(e: &anyhow::Error) -> &'static str {
    if e.downcast_ref::<ConfigError>().is_some() {
        "config"
    } else if e.downcast_ref::<AuthError>().is_some() {
        "auth"
    } else {
        "error"
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Before parsing: `.env` may supply values for env-bound arguments.
    let dotenv = load_dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbose);
    dotenv.log();
    let json = cli.json;

    match cli.run().await {
        Ok(code) => code,
        Err(e) => {
            let message = format!("{e:#}");
            match format_error(&message, error_code(&e)) {
                Ok(doc) if json => println!("{doc}"),
                _ => eprintln!("Error: {message}"),
            }
            ExitCode::FAILURE
        }
    }
}
