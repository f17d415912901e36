use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the config file
    #[clap(short, long, default_value = "config.yaml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Rank a catalog of rooms against a free-text query
    Recommend {
        /// The search query, in any language the model supports
        query: String,

        /// Path to a JSON file containing the catalog (array of items with
        /// at least "id" and "description")
        #[clap(short = 'f', long)]
        catalog: PathBuf,

        /// Number of results to return (defaults to config default_limit)
        #[clap(short, long)]
        limit: Option<usize>,
    },

    /// Download and load the configured model so the first query is fast
    Warmup {},
}
