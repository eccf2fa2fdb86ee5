//! Catalyst Server
//!
//! Axum server exposing session validation and the meeting briefing agent,
//! plus a one-shot CLI mode that runs the agent for a single user.

mod api;
mod logging;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use catalyst_core::agent::{Coordinator, RunOutcome};
use catalyst_core::config::CatalystConfig;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

#[derive(Parser, Clone)]
#[command(author, version, about = "Catalyst - Meeting Preparation Agent")]
struct Args {
    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand, Clone)]
enum CliCommand {
    /// Start the Catalyst server (default)
    Serve {
        /// Port to listen on (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Run the agent once for a user (CLI mode, no server)
    Run {
        /// Identity-provider login id of the user
        login_id: String,
    },
}

async fn run_server(config: CatalystConfig, port: u16) -> anyhow::Result<()> {
    let state = Arc::new(
        api::AppState::from_config(&config).context("failed to build application state")?,
    );
    let app = api::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!(%addr, "Catalyst server running");
    tracing::info!("Routes: /validate-session, /trigger-agent, /openapi.json");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn run_once(config: CatalystConfig, login_id: &str) -> anyhow::Result<()> {
    let coordinator = Coordinator::new(&config).context("failed to build coordinator")?;
    let report = coordinator.run_catalyst_for_user(login_id).await;

    if let RunOutcome::Completed { briefing, .. } = &report.outcome {
        println!("{}", briefing);
    }
    println!("{}", serde_json::to_string_pretty(&report.summary())?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let args = Args::parse();
    let config = CatalystConfig::from_env().context("failed to load configuration")?;

    match args.command {
        Some(CliCommand::Run { login_id }) => run_once(config, &login_id).await,
        Some(CliCommand::Serve { port }) => {
            let port = port.unwrap_or(config.port);
            run_server(config, port).await
        }
        None => {
            let port = config.port;
            run_server(config, port).await
        }
    }
}
