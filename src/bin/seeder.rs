use std::path::PathBuf;

use clap::{ArgGroup, Parser};
use thiserror::Error;

use vocab_bot_rust::db::config::DbConfig;
use vocab_bot_rust::db::{DbInitError, PgStore};
use vocab_bot_rust::logging::init_tracing;
use vocab_bot_rust::seed::{Seed, SeedError, DEFAULT_SEED_FILE};

/// Applies or rolls back a dictionary seed file.
#[derive(Debug, Parser)]
#[command(name = "vocab-seeder", version, about = "Load dictionary seeds into Postgres")]
#[command(group(ArgGroup::new("direction").required(true).args(["up", "down"])))]
struct Cli {
    /// Insert the seed dictionary and its words
    #[arg(long)]
    up: bool,

    /// Delete dictionaries matching the seed's title, author and mode
    #[arg(long)]
    down: bool,

    /// Path to the seed JSON file
    #[arg(long, default_value = DEFAULT_SEED_FILE)]
    file: PathBuf,
}

#[derive(Debug, Error)]
enum SeederError {
    #[error(transparent)]
    Db(#[from] DbInitError),
    #[error(transparent)]
    Seed(#[from] SeedError),
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let _log_guard = init_tracing(&log_level, None);

    if let Err(err) = run(cli).await {
        tracing::error!(error = %err, "seeder run error");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), SeederError> {
    let seed = Seed::load(&cli.file)?;
    let config = DbConfig::from_env().map_err(DbInitError::from)?;
    let store = PgStore::connect(&config).await?;

    if cli.up {
        seed.apply(store.pool()).await?;
    } else {
        let removed = seed.rollback(store.pool()).await?;
        if removed == 0 {
            tracing::warn!(file = %cli.file.display(), "no seeded dictionaries matched");
        }
    }

    store.pool().close().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn requires_exactly_one_direction() {
        assert!(Cli::try_parse_from(["vocab-seeder"]).is_err());
        assert!(Cli::try_parse_from(["vocab-seeder", "--up", "--down"]).is_err());

        let cli = Cli::try_parse_from(["vocab-seeder", "--down", "--file", "a.json"]).unwrap();
        assert!(cli.down && !cli.up);
        assert_eq!(cli.file, PathBuf::from("a.json"));
    }

    #[test]
    fn file_defaults_to_bundled_seed() {
        let cli = Cli::try_parse_from(["vocab-seeder", "--up"]).unwrap();
        assert_eq!(cli.file, PathBuf::from(DEFAULT_SEED_FILE));
    }
}
