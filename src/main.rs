use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::sync::Arc;
use tracing::info;

use thriftfeed::config::Config;
use thriftfeed::db::Database;

/// Thriftfeed: personalized ranking for a thrift-fashion marketplace.
///
/// Builds suggested-post lists, a tiered recommendation feed and outfit
/// ideas from what a user likes, posts and keeps in their wardrobe.
#[derive(Parser)]
#[command(name = "thriftfeed", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Load posts, likes and wardrobe items from a JSON seed file
    Import {
        /// Path to the seed file ({ posts, likes, wardrobe })
        file: String,
    },

    /// Show system status (DB size and record counts)
    Status,

    /// Suggested posts for a user
    Suggest {
        /// User to rank for (defaults to THRIFTFEED_USER)
        #[arg(long)]
        user: Option<String>,

        /// Print the JSON response body instead of the colored view
        #[arg(long)]
        json: bool,
    },

    /// Tiered AI feed for a user
    Feed {
        /// User to rank for (defaults to THRIFTFEED_USER)
        #[arg(long)]
        user: Option<String>,

        /// Print the JSON response body instead of the colored view
        #[arg(long)]
        json: bool,
    },

    /// Outfit ideas for an occasion
    Outfit {
        /// User asking (defaults to THRIFTFEED_USER)
        #[arg(long)]
        user: Option<String>,

        /// Free-text occasion, e.g. "rainy picnic"
        #[arg(long)]
        context: Option<String>,

        /// Print the JSON response body instead of the colored view
        #[arg(long)]
        json: bool,
    },

    /// Serve the JSON API
    #[cfg(feature = "web")]
    Serve {
        /// Port to listen on (defaults to THRIFTFEED_PORT or 3000)
        #[arg(long)]
        port: Option<u16>,

        /// Address to bind (defaults to THRIFTFEED_BIND or 127.0.0.1)
        #[arg(long)]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("thriftfeed=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            info!("Initializing thriftfeed database...");
            let config = Config::load()?;
            let db = thriftfeed::db::initialize_sqlite(&config.db_path)?;
            let table_count = db.table_count().await?;
            println!("Database initialized at: {}", config.db_path);
            println!("Tables created: {table_count}");
            println!("\nNext step: load some data with");
            println!("  thriftfeed import seed.json");
        }

        Commands::Import { file } => {
            let config = Config::load()?;
            let db = thriftfeed::db::initialize_sqlite(&config.db_path)?;

            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read seed file {file}"))?;
            let seed = thriftfeed::db::import::parse_seed(&raw)?;

            println!("Importing {file}...");
            let summary =
                thriftfeed::db::import::import_seed(db.as_ref(), seed, chrono::Utc::now()).await?;

            println!("  {} {} posts", "✓".green(), summary.posts);
            println!("  {} {} likes", "✓".green(), summary.likes);
            println!("  {} {} wardrobe items", "✓".green(), summary.wardrobe_items);
            println!("\n{}", "Import complete.".bold());
        }

        Commands::Status => {
            let config = Config::load()?;
            let db = open_database(&config)?;
            thriftfeed::status::show(&db, &config.db_path).await?;
        }

        Commands::Suggest { user, json } => {
            let config = Config::load()?;
            let user = config.require_user(user)?;
            let db = open_database(&config)?;

            let posts = thriftfeed::pipeline::suggestions::suggestions(db.as_ref(), &user).await;

            if json {
                println!("{}", serde_json::to_string_pretty(&posts)?);
            } else {
                thriftfeed::output::terminal::display_post_list(
                    &format!("Suggested for {user}"),
                    &posts,
                );
            }
        }

        Commands::Feed { user, json } => {
            let config = Config::load()?;
            let user = config.require_user(user)?;
            let db = open_database(&config)?;

            let feed = thriftfeed::pipeline::feed::feed_with_recommendations(db.as_ref(), &user).await;

            if json {
                println!("{}", serde_json::to_string_pretty(&feed)?);
            } else {
                thriftfeed::output::terminal::display_feed(&feed);
            }
        }

        Commands::Outfit {
            user,
            context,
            json,
        } => {
            let config = Config::load()?;
            let user = config.require_user(user)?;
            let db = open_database(&config)?;

            let outfit = thriftfeed::pipeline::outfit::build_outfit(
                db.as_ref(),
                context.as_deref(),
                &user,
                chrono::Utc::now(),
            )
            .await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&outfit)?);
            } else {
                thriftfeed::output::terminal::display_outfit(&outfit);
            }
        }

        #[cfg(feature = "web")]
        Commands::Serve { port, bind } => {
            let config = Config::load()?;
            let db = open_database(&config)?;
            let port = port.unwrap_or(config.port);
            let bind = bind.unwrap_or_else(|| config.bind.clone());
            thriftfeed::web::run_server(db, port, &bind).await?;
        }
    }

    Ok(())
}

/// Open the configured database, which must already exist.
fn open_database(config: &Config) -> Result<Arc<dyn Database>> {
    info!(path = %config.db_path, "Opening SQLite database");
    thriftfeed::db::open_sqlite(&config.db_path)
}
