//! Macro Monitor
//!
//! Computes daily calorie and macronutrient targets from saved body-metric
//! profiles. Results go to stdout as JSON; logs go to stderr.

use clap::Parser;
use macro_monitor_cli::{cli::Cli, commands, config::AppConfig, error::CliError};
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> ExitCode {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(false);
            error!("Failed to load configuration: {:#}", e);
            return report(&CliError::Internal(e));
        }
    };
    init_tracing(config.json_logs());

    debug!(
        version = env!("CARGO_PKG_VERSION"),
        env = if AppConfig::is_production() { "production" } else { "development" },
        data_dir = %config.storage.data_dir.display(),
        "Configuration loaded"
    );

    match commands::execute(cli, &config) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => report(&e),
    }
}

fn report(err: &CliError) -> ExitCode {
    let body = serde_json::to_string_pretty(&err.to_response())
        .unwrap_or_else(|_| format!("{{\"error\":{{\"code\":\"{}\"}}}}", err.code()));
    eprintln!("{}", body);
    ExitCode::from(err.exit_code())
}

/// Initialize tracing/logging on stderr
fn init_tracing(json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "macro_monitor_cli=info,macro_monitor_shared=info".into());

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if json {
        subscriber
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
