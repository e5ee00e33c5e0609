use clap::{Parser, Subcommand, ValueEnum};

use crate::machine::Targets;
use crate::sort::SortKey;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:50000";

/// List processes and containers across cluster nodes.
#[derive(Debug, Parser)]
#[command(name = "fleetps", version)]
pub struct Cli {
    /// Machine API endpoint, `host[:port]`, `http://...` or `unix:///path`.
    #[arg(
        short,
        long,
        global = true,
        env = "FLEETPS_ENDPOINT",
        default_value = DEFAULT_ENDPOINT
    )]
    pub endpoint: String,

    /// Nodes to query, comma separated. Defaults to the endpoint's own node.
    #[arg(short, long, global = true, value_delimiter = ',')]
    pub nodes: Vec<String>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn targets(&self) -> Targets {
        Targets::new(self.nodes.iter().map(|node| node.trim()).filter(|node| !node.is_empty()))
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List running processes.
    #[command(visible_alias = "p")]
    Processes {
        /// Column to sort by: `rss` or `cpu`.
        #[arg(short, long, default_value = "rss")]
        sort: SortKey,

        /// Keep refreshing the listing in a full-screen view.
        #[arg(short, long)]
        watch: bool,

        /// Refresh period of the watch view, in milliseconds.
        #[arg(
            long,
            default_value_t = 1000,
            value_parser = clap::value_parser!(u64).range(100..)
        )]
        interval: u64,

        #[arg(
            short,
            long,
            value_enum,
            default_value_t = OutputFormat::Table,
            conflicts_with = "watch"
        )]
        output: OutputFormat,
    },
    /// List containers.
    #[command(visible_alias = "c")]
    Containers {
        /// Use the Kubernetes namespace instead of the system one.
        #[arg(short, long)]
        kubernetes: bool,

        /// Use the CRI driver instead of talking to containerd.
        #[arg(short = 'c', long)]
        use_cri: bool,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text table
    #[default]
    Table,
    /// JSON document, one entry per node
    Json,
}
