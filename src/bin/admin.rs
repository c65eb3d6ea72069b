//! CLI administration tool for shortlink-api.
//!
//! Provides commands for inspecting and deleting short URLs, viewing
//! statistics, and performing database checks without going through the
//! HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # List all short URLs
//! cargo run --bin admin -- urls list
//!
//! # Delete a short URL
//! cargo run --bin admin -- urls delete abc123
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string
//! - `REDIS_URL` or `REDIS_HOST`/`REDIS_PORT`/`REDIS_PASSWORD`/`REDIS_DB`
//!   (optional): evicts cached mappings on delete

use shortlink_api::config::Config;
use shortlink_api::domain::repositories::UrlRepository;
use shortlink_api::infrastructure::cache::{CacheService, RedisCache};
use shortlink_api::infrastructure::persistence::PgUrlRepository;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing shortlink-api.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage short URLs
    Urls {
        #[command(subcommand)]
        action: UrlsAction,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Short URL subcommands.
#[derive(Subcommand)]
enum UrlsAction {
    /// List all short URLs, newest first
    List,

    /// Delete a short URL
    Delete {
        /// Alias to delete
        alias: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Urls { action } => handle_urls_action(action, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    pool.close().await;

    Ok(())
}

/// Dispatches short URL commands.
async fn handle_urls_action(action: UrlsAction, pool: &PgPool) -> Result<()> {
    let repo = PgUrlRepository::new(Arc::new(pool.clone()));

    match action {
        UrlsAction::List => list_urls(&repo).await?,
        UrlsAction::Delete { alias, yes } => delete_url(&repo, alias, yes).await?,
    }

    Ok(())
}

/// Lists all short URLs.
///
/// # Output Format
///
/// ```text
/// 📋 Short URLs
///
///   Alias          Clicks  Created           Original URL
///   ──────────────────────────────────────────────────────────────────
///   abc123         0       2024-06-01 10:30  https://example.com
/// ```
async fn list_urls(repo: &PgUrlRepository) -> Result<()> {
    println!("{}", "📋 Short URLs".bright_blue().bold());
    println!();

    let records = repo
        .find_all()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list URLs: {}", e))?;

    if records.is_empty() {
        println!("{}", "  No short URLs found".yellow());
        return Ok(());
    }

    println!(
        "  {:<14} {:<7} {:<17} {}",
        "Alias".bright_white().bold(),
        "Clicks".bright_white().bold(),
        "Created".bright_white().bold(),
        "Original URL".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for record in &records {
        println!(
            "  {:<14} {:<7} {:<17} {}",
            record.short_alias.cyan(),
            record.click_count.to_string().bright_black(),
            record
                .created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            record.original_url
        );
    }

    println!();
    println!(
        "  Total: {}",
        records.len().to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Deletes a short URL after confirmation.
///
/// When Redis is configured (`REDIS_URL` or `REDIS_HOST` and friends, as for
/// the server) the cached mapping is evicted too, so the alias
/// stops resolving immediately instead of after its TTL.
async fn delete_url(repo: &PgUrlRepository, alias: String, skip_confirm: bool) -> Result<()> {
    println!("{}", "🗑  Delete Short URL".bright_blue().bold());
    println!();

    let record = repo
        .find_by_alias(&alias)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .context("Short URL not found")?;

    println!("  Alias:        {}", record.short_alias.cyan());
    println!("  Original URL: {}", record.original_url);
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete this short URL?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let deleted = repo
        .delete_by_alias(&alias)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to delete short URL: {}", e))?;

    if !deleted {
        println!("{}", "⚠️  Short URL was already deleted".yellow());
        return Ok(());
    }

    if let Some(redis_url) = Config::load_redis_url() {
        match RedisCache::connect(&redis_url, 0).await {
            Ok(cache) => {
                if let Err(e) = cache.invalidate(&alias).await {
                    println!("{} {}", "⚠️  Failed to evict cache entry:".yellow(), e);
                }
            }
            Err(e) => println!("{} {}", "⚠️  Redis unavailable, cache not evicted:".yellow(), e),
        }
    }

    println!();
    println!("{}", "✅ Short URL deleted successfully!".green().bold());
    println!();

    Ok(())
}

/// Displays system statistics.
///
/// Shows:
/// - Total number of short URLs
/// - Total number of recorded clicks
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let repo = PgUrlRepository::new(Arc::new(pool.clone()));

    let urls_count = repo
        .count()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to count URLs: {}", e))?;

    let clicks_count: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(clicks), 0)::BIGINT FROM urls")
        .fetch_one(pool)
        .await?;

    println!(
        "  Short URLs: {}",
        urls_count.to_string().bright_green().bold()
    );
    println!(
        "  Clicks:     {}",
        clicks_count.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            let repo = PgUrlRepository::new(Arc::new(pool.clone()));
            repo.health_check()
                .await
                .map_err(|e| anyhow::anyhow!("Database check failed: {}", e))?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            let migrations: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
                .fetch_one(pool)
                .await
                .unwrap_or(0);

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Migrations: {}", migrations.to_string().bright_white());
            println!();
        }
    }

    Ok(())
}
