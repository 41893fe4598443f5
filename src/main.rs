//! Tetromino feed runner (default binary).
//!
//! Prints the next pieces from the configured feed. Source, policy and remote
//! settings come from `TETROMINO_*` environment variables; the flags below
//! override the most common ones.

use anyhow::{bail, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tetromino_feed::core::PolicyKind;
use tetromino_feed::{FeedConfig, PieceFeed, SourceKind};

#[derive(Debug, Parser)]
#[command(name = "tetromino-feed", about = "Print pieces from a bag-randomized feed")]
struct Cli {
    /// Number of pieces to print
    #[arg(short = 'n', long, default_value_t = 14)]
    count: usize,

    /// Print a preview of this many pieces after the run
    #[arg(short, long)]
    preview: Option<usize>,

    /// Source name (seeded, constant[:id], remote)
    #[arg(long)]
    source: Option<String>,

    /// Policy name (one-of-each, pass-through, filtered:<id>, ...)
    #[arg(long)]
    policy: Option<String>,

    /// Seed for the seeded source
    #[arg(long)]
    seed: Option<u32>,

    /// Print the remaining remote quota
    #[arg(long)]
    quota: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = apply_overrides(FeedConfig::from_env(), &cli)?;

    let mut feed = PieceFeed::open(&config)?;

    for i in 0..cli.count {
        let piece = feed.next_piece()?;
        println!("{:>4}  {}  ({})", i + 1, piece.as_str().to_uppercase(), piece.id());
    }

    if let Some(n) = cli.preview {
        let ids = feed.preview_piece_ids(n)?;
        let line: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
        println!("preview: {}", line.join(" "));
    }

    if cli.quota {
        match feed.check_quota()? {
            Some(bits) => println!("quota: {} bits left", bits),
            None => println!("quota: n/a (local source)"),
        }
    }

    Ok(())
}

fn apply_overrides(mut config: FeedConfig, cli: &Cli) -> Result<FeedConfig> {
    if let Some(seed) = cli.seed {
        if let SourceKind::Seeded { .. } = config.source {
            config.source = SourceKind::Seeded { seed };
        }
    }

    if let Some(name) = &cli.source {
        let seed = match (cli.seed, config.source) {
            (Some(seed), _) => seed,
            (None, SourceKind::Seeded { seed }) => seed,
            (None, _) => tetromino_feed::types::DEFAULT_SEED,
        };
        config.source = match SourceKind::from_str(name, seed) {
            Some(kind) => kind,
            None => bail!("unknown source '{}'", name),
        };
    }

    if let Some(name) = &cli.policy {
        config.policy = match PolicyKind::from_str(name) {
            Some(kind) => kind,
            None => bail!("unknown policy '{}'", name),
        };
    }

    Ok(config)
}
