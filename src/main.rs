use clap::Parser;
use tracing_subscriber::EnvFilter;

use roomrec::{embeddings, Config, Encoder, Item, Recommender};

mod cli;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = cli::Args::parse();
    let config = Config::load_with(&args.config);

    match args.command {
        cli::Command::Recommend {
            query,
            catalog,
            limit,
        } => {
            let raw = std::fs::read_to_string(&catalog)?;
            let items: Vec<Item> = serde_json::from_str(&raw)?;
            tracing::info!("Loaded {} items from {}", items.len(), catalog.display());

            let limit = limit.unwrap_or(config.default_limit);
            let encoder = embeddings::shared(&config)?;
            let recommender = Recommender::new(encoder);

            let results = recommender.recommend(&query, &items, limit)?;
            println!("{}", serde_json::to_string_pretty(&results).unwrap());
            Ok(())
        }

        cli::Command::Warmup {} => {
            let encoder = embeddings::shared(&config)?;
            println!(
                "Model '{}' ready ({} dimensions)",
                encoder.name(),
                encoder.dimensions()
            );
            Ok(())
        }
    }
}
