use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "dictkit",
    about = "Inspect and combine nested JSON and TOML documents",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Merge documents, later files taking precedence
    Merge(MergeArgs),
    /// Show the node at a slash-separated path
    Get(GetArgs),
    /// List every leaf path in a document
    Leaves(LeavesArgs),
}

#[derive(Args)]
pub struct MergeArgs {
    #[arg(required = true)]
    pub files: Vec<String>,
    /// Keep the first value seen for colliding scalars
    #[arg(long)]
    pub keep: bool,
}

#[derive(Args)]
pub struct GetArgs {
    pub file: String,
    pub path: String,
}

#[derive(Args)]
pub struct LeavesArgs {
    pub file: String,
}
