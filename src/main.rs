use clap::Parser;

use fleetps::cli::Cli;

/// Entry point for the fleetps command line tool.
///
/// Lists processes or containers across the requested nodes, or keeps a live
/// process view open with `processes --watch`.
///
/// # Errors
///
/// Returns an error if the machine API cannot be reached, a query fails, or
/// the terminal cannot be driven.
///
/// # Examples
///
/// ```bash
/// fleetps --nodes 10.5.0.2,10.5.0.3 processes --sort cpu
/// ```
#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            std::process::exit(if err.use_stderr() { 1 } else { 0 });
        }
    };

    fleetps::run(cli).await?;
    Ok(())
}
