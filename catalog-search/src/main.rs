//! Catalog Search Main Entry Point
//!
//! Operator commands for keeping the Solr index consistent with the catalog
//! database.
//!
//! Usage:
//!   catalog-search rebuild --only-missing
//!   catalog-search check
//!   catalog-search check-schema --file schema.xml

use std::env;
use std::path::PathBuf;

use catalog_search::bulk::{RebuildOptions, RebuildSelector};
use catalog_search::{Compatibility, Dependencies, IndexingError, Settings};
use catalog_search_repository::SearchError;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "catalog-search")]
#[command(about = "Maintain the catalog search index")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reindex one dataset, a list of datasets, or all of them
    Rebuild {
        /// Dataset id or name to reindex on its own
        id: Option<String>,

        /// Reindex these dataset ids, deferring index commits between them
        #[arg(long, num_args = 1.., conflicts_with = "id")]
        ids: Option<Vec<String>>,

        /// Only index datasets not already in the index
        #[arg(short = 'o', long)]
        only_missing: bool,

        /// Keep going when a dataset fails to index
        #[arg(short, long)]
        force: bool,

        /// Do not commit the index at the end; run `commit` later
        #[arg(short = 'e', long)]
        defer_commit: bool,

        /// Clear the index before rebuilding
        #[arg(short, long)]
        clear: bool,

        /// Do not report progress
        #[arg(short, long)]
        quiet: bool,
    },

    /// Commit pending changes on the index
    Commit,

    /// List active datasets missing from the index
    Check,

    /// Show the indexed document of a dataset
    Show {
        /// Dataset id or name
        id: String,
    },

    /// Remove a dataset from the index, or every dataset when no id is given
    Clear {
        /// Dataset id or name
        id: Option<String>,
    },

    /// Verify the Solr schema version is supported
    CheckSchema {
        /// Check a local schema file instead of the running engine
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

impl Command {
    /// Whether the command needs the store of record, not just the index.
    fn reads_store(&self) -> bool {
        matches!(self, Self::Rebuild { .. } | Self::Check)
    }
}

/// Initialize tracing/logging.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("catalog_search=info,catalog_search_repository=info")
    });

    let json = env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .init();
    }

    info!(
        service_name = "catalog-search",
        service_version = env!("CARGO_PKG_VERSION"),
        "Tracing initialized"
    );
}

async fn run(command: Command, settings: Settings) -> Result<(), IndexingError> {
    if let Command::CheckSchema { file } = &command {
        let gate = Dependencies::schema_gate(&settings)?;
        match gate.check_compatibility(file.as_deref()).await? {
            Compatibility::Compatible(version) => {
                println!("Solr schema version {} is supported", version)
            }
            Compatibility::NotApplicable => {
                warn!("Solr is not available, schema version check skipped");
                println!("Solr is not available; schema version check does not apply");
            }
        }
        return Ok(());
    }

    let deps = if command.reads_store() {
        Dependencies::new(&settings).await?
    } else {
        Dependencies::index_only(&settings)?
    };
    let engine = deps.engine;

    match command {
        Command::Rebuild {
            id,
            ids,
            only_missing,
            force,
            defer_commit,
            clear,
            quiet,
        } => {
            let selector = match (id, ids) {
                (Some(id), _) => RebuildSelector::One(id),
                (None, Some(ids)) => RebuildSelector::Many(ids),
                (None, None) => RebuildSelector::All,
            };
            let options = RebuildOptions {
                only_missing,
                force,
                defer_commit,
                clear_first: clear,
                quiet,
            };
            let summary = engine.rebuild(selector, options).await?;
            println!("{}", summary);
        }
        Command::Commit => {
            engine.commit().await?;
            println!("Committed pending changes on the search index");
        }
        Command::Check => {
            let report = engine.check().await?;
            println!("{}", report);
        }
        Command::Show { id } => match engine.show(&id).await? {
            Some(record) => {
                let rendered = serde_json::to_string_pretty(&record)
                    .map_err(|e| SearchError::parse(e.to_string()))?;
                println!("{}", rendered);
            }
            None => return Err(SearchError::not_found(id).into()),
        },
        Command::Clear { id: Some(id) } => {
            engine.clear(&id).await?;
            println!("Cleared {} from the search index", id);
        }
        Command::Clear { id: None } => {
            engine.clear_all().await?;
            println!("Cleared the search index");
        }
        // Handled before any index dependencies are built.
        Command::CheckSchema { .. } => {}
    }

    Ok(())
}


#[tokio::main]
async fn main() -> Result<(), IndexingError> {
    // Load environment variables from .env file
    dotenv().ok();

    let cli = Cli::parse();
    init_tracing();

    let settings = Settings::from_env();

    match run(cli.command, settings).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!(error = %e, "Command failed");
            Err(e)
        }
    }
}
