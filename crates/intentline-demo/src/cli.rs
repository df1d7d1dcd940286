use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "intentline-demo")]
#[command(
    author,
    version,
    about = "Classify and dispatch commands through the Intentline pipeline"
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify and dispatch commands against the in-memory backend
    Run {
        /// Commands to run; read one per line from stdin when omitted
        commands: Vec<String>,

        #[command(flatten)]
        pipeline: PipelineArgs,

        /// Probability that the backend reports a failed dispatch
        #[arg(long, default_value = "0.0")]
        failure_rate: f64,

        /// Probability that the backend errors outright
        #[arg(long, default_value = "0.0")]
        error_rate: f64,

        /// Simulated backend latency in milliseconds
        #[arg(long, default_value = "0")]
        latency_ms: u64,

        /// Seed for reproducible backend failures
        #[arg(long)]
        seed: Option<u64>,

        /// Record every dispatched intent in this session
        #[arg(long)]
        session: Option<String>,
    },

    /// Classify commands without dispatching them
    Classify {
        /// Commands to classify; read one per line from stdin when omitted
        commands: Vec<String>,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },
}

/// Options shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct PipelineArgs {
    /// Pipeline config file (YAML)
    #[arg(short, long, env = "INTENTLINE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override scheduler concurrency
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Priority for every command
    #[arg(short, long)]
    pub priority: Option<i32>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
