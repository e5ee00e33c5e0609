//! fleetps: process and container listings for a fleet of nodes.
//!
//! A single query fans out to every requested node through the machine API;
//! the per-node replies are merged into one table, either printed once or
//! refreshed in place by the live [`dashboard`].
use std::time::Duration;

use crossterm::event::EventStream;

use cli::{Cli, Commands, OutputFormat};
use dashboard::{Dashboard, TerminalSurface};
use error::Result;
use machine::{ContainerQuery, GrpcMachine, ServerAddress};
use render::{CONTAINER_SEPARATOR, PROCESS_SEPARATOR};
use report::Reporter;

pub mod cli;
pub mod dashboard;
pub mod error;
pub mod format;
pub mod grpc;
pub mod machine;
pub mod record;
pub mod render;
pub mod report;
pub mod sort;

/// Executes the command described by `cli`.
///
/// # Errors
///
/// Returns an error if the endpoint is invalid or unreachable, if a batch
/// query fails, or if the terminal cannot be driven in watch mode.
pub async fn run(cli: Cli) -> Result<()> {
    let address: ServerAddress = cli.endpoint.parse()?;
    let machine = GrpcMachine::connect(&address).await?;
    log::debug!("Connected to {address}");
    let reporter = Reporter::new(machine, cli.targets());

    match cli.command {
        Commands::Processes {
            sort,
            watch: true,
            interval,
            ..
        } => {
            let live = Dashboard::new(reporter, sort, Duration::from_millis(interval));
            let surface = TerminalSurface::acquire().map_err(dashboard::Error::Init)?;
            let session = live
                .run(surface, EventStream::new(), shutdown_signal())
                .await?;
            log::debug!("Dashboard closed, sorted by `{}`", session.sort_key());
        }
        Commands::Processes { sort, output, .. } => match output {
            OutputFormat::Table => {
                let table = reporter.processes(sort).await?;
                println!("{}", table.render(PROCESS_SEPARATOR));
            }
            OutputFormat::Json => {
                let listings = reporter.process_listings(sort).await?;
                println!("{}", serde_json::to_string_pretty(&listings)?);
            }
        },
        Commands::Containers {
            kubernetes,
            use_cri,
            output,
        } => {
            let query = ContainerQuery::new(kubernetes, use_cri);
            match output {
                OutputFormat::Table => {
                    let table = reporter.containers(&query).await?;
                    println!("{}", table.render(CONTAINER_SEPARATOR));
                }
                OutputFormat::Json => {
                    let listings = reporter.container_listings(&query).await?;
                    println!("{}", serde_json::to_string_pretty(&listings)?);
                }
            }
        }
    }

    Ok(())
}

/// Resolves on Ctrl-C delivered as a signal, i.e. while the terminal is not
/// in raw mode. Never resolves if the handler cannot be installed.
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::warn!("failed to listen for Ctrl-C: {err}");
        std::future::pending::<()>().await;
    }
}
