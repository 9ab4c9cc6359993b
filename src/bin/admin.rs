//! CLI administration tool for seq-shortener.
//!
//! Shortens and resolves URLs directly against the database, shows
//! statistics and runs database checks without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Shorten a URL (prompts when the URL is omitted)
//! cargo run --bin admin -- shorten https://www.rust-lang.org
//!
//! # Look up a key
//! cargo run --bin admin -- resolve 2n9c
//!
//! # Key/id conversion (no database needed)
//! cargo run --bin admin -- encode 123456
//! cargo run --bin admin -- decode 2n9c
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Check database connection / apply migrations
//! cargo run --bin admin -- db check
//! cargo run --bin admin -- db migrate
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required for database commands): PostgreSQL connection string
//! - `ALLOCATION_MAX_ATTEMPTS` (optional): insert attempts for `shorten`

use seq_shortener::application::services::{
    DEFAULT_MAX_ATTEMPTS, ResolutionService, SequenceAllocator,
};
use seq_shortener::domain::repositories::UrlRepository;
use seq_shortener::infrastructure::persistence::PgUrlRepository;
use seq_shortener::utils::{key_codec, web_url};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing seq-shortener.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
enum Commands {
    /// Shorten a URL
    Shorten {
        /// URL to shorten (prompted for if omitted)
        url: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Show the URL behind a short key
    Resolve {
        /// Short key, e.g. "2n9c"
        key: String,
    },

    /// Convert a sequence id to its key
    Encode {
        /// Non-negative sequence id
        id: u64,
    },

    /// Convert a key to its sequence id
    Decode {
        /// Short key
        key: String,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection and schema
    Check,

    /// Apply pending migrations
    Migrate,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Encode { id } => encode(id),
        Commands::Decode { key } => decode(&key)?,
        Commands::Shorten { url, yes } => shorten(&connect().await?, url, yes).await?,
        Commands::Resolve { key } => resolve(&connect().await?, &key).await?,
        Commands::Stats => handle_stats(&connect().await?).await?,
        Commands::Db { action } => handle_db_action(action, &connect().await?).await?,
    }

    Ok(())
}

async fn connect() -> Result<PgPool> {
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")
}

fn repository(pool: &PgPool) -> Arc<dyn UrlRepository> {
    Arc::new(PgUrlRepository::new(Arc::new(pool.clone())))
}

fn encode(id: u64) {
    println!("{} → {}", id.to_string().bright_white(), key_codec::encode(id).bright_yellow().bold());
}

fn decode(key: &str) -> Result<()> {
    let id = key_codec::decode(key)
        .with_context(|| format!("'{}' is not a base-36 key within u64 range", key))?;

    println!("{} → {}", key.bright_yellow(), id.to_string().bright_white().bold());
    Ok(())
}

/// Shortens a URL with the same allocator the server uses.
///
/// # Flow
///
/// 1. Prompt for the URL (or use provided)
/// 2. Reject anything that is not an absolute `http(s)` URL
/// 3. Confirm (unless `--yes` flag)
/// 4. Allocate, reusing the existing record for a known URL
async fn shorten(pool: &PgPool, url: Option<String>, skip_confirm: bool) -> Result<()> {
    println!("{}", "🔗 Shorten URL".bright_blue().bold());
    println!();

    let url = match url {
        Some(u) => u,
        None => Input::new()
            .with_prompt("URL")
            .with_initial_text("https://")
            .interact_text()?,
    };

    if !web_url::is_web_url(&url) {
        anyhow::bail!(
            "'{}' is not a valid URL. Remember to use an http:// or https:// prefix.",
            url
        );
    }

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt(format!("Shorten {}?", url))
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let max_attempts = std::env::var("ALLOCATION_MAX_ATTEMPTS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_MAX_ATTEMPTS);

    let allocator = SequenceAllocator::new(repository(pool)).with_max_attempts(max_attempts);
    let record = allocator
        .shorten(&url)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to shorten URL: {}", e))?;

    println!();
    println!("{}", "✅ Done".green().bold());
    println!("  URL:         {}", record.original_url.cyan());
    println!("  Sequence id: {}", record.sequence_id.to_string().bright_black());
    println!("  Key:         {}", record.key().bright_yellow().bold());
    println!();

    Ok(())
}

async fn resolve(pool: &PgPool, key: &str) -> Result<()> {
    let resolver = ResolutionService::new(repository(pool));

    let record = resolver
        .resolve(key)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    println!(
        "  {} ({}) → {}",
        key_codec::encode(record.sequence_id).bright_yellow(),
        record.sequence_id.to_string().bright_black(),
        record.original_url.cyan()
    );

    Ok(())
}

/// Displays record statistics.
///
/// Shows:
/// - Total number of URLs
/// - Highest sequence id and its key
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let urls_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM urls")
        .fetch_one(pool)
        .await?;

    let latest = repository(pool)
        .find_max_sequence_id()
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?;

    println!(
        "  URLs:        {}",
        urls_count.to_string().bright_green().bold()
    );
    match latest {
        Some(id) => println!(
            "  Latest id:   {} (key {})",
            id.to_string().bright_green().bold(),
            key_codec::encode(id).bright_yellow()
        ),
        None => println!("  Latest id:   {}", "none".bright_black()),
    }
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;
            println!("{}", "✅ Database connection OK".green().bold());

            let has_table: bool =
                sqlx::query_scalar("SELECT to_regclass('public.urls') IS NOT NULL")
                    .fetch_one(pool)
                    .await?;

            if has_table {
                println!("{}", "✅ Table 'urls' present".green().bold());
            } else {
                println!(
                    "{}",
                    "⚠️  Table 'urls' missing, run: admin db migrate".yellow()
                );
            }
        }
        DbAction::Migrate => {
            println!("{}", "🛠  Applying migrations...".bright_blue());

            sqlx::migrate!("./migrations")
                .run(pool)
                .await
                .context("Failed to run migrations")?;

            println!("{}", "✅ Migrations applied".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!();
        }
    }

    Ok(())
}
