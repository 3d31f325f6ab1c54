//! CLI administration tool for linkforge.
//!
//! Provides commands for generating codes, creating and inspecting links, and
//! performing database checks without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Generate codes offline
//! cargo run --bin admin -- codes generate --count 20 --length 8
//!
//! # Create a link (prompts for the URL when --url is omitted)
//! cargo run --bin admin -- link create --url https://example.com --ttl-days 30
//!
//! # Inspect links
//! cargo run --bin admin -- link show abc1234
//! cargo run --bin admin -- link by-target https://example.com
//! cargo run --bin admin -- link by-client 203.0.113.7
//!
//! # Totals and database checks
//! cargo run --bin admin -- stats
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Same as the server: `DATABASE_URL` (or `DB_*` components), `BASE_URL`,
//! `CODE_LENGTH`, `CODE_MAX_ATTEMPTS`.

use linkforge::application::services::{CodeAllocator, LinkService, StatsService};
use linkforge::config::Config;
use linkforge::domain::entities::ShortLink;
use linkforge::domain::repositories::LinkRepository;
use linkforge::infrastructure::cache::NullCache;
use linkforge::infrastructure::persistence::PgLinkRepository;
use linkforge::utils::code_generator::{DEFAULT_CODE_LENGTH, generate_batch};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use sqlx::PgPool;
use std::sync::Arc;

/// Keeps `codes generate` far below the code space of the shortest allowed length.
const MAX_GENERATE_COUNT: usize = 100_000;

/// CLI tool for managing linkforge.
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
    /// Offline code generation
    Codes {
        #[command(subcommand)]
        action: CodesAction,
    },

    /// Create and inspect short links
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Show totals
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum CodesAction {
    /// Print a batch of distinct random codes (no database access)
    Generate {
        /// Number of codes
        #[arg(short, long, default_value_t = 10)]
        count: usize,

        /// Code length
        #[arg(short, long, default_value_t = DEFAULT_CODE_LENGTH)]
        length: usize,
    },
}

#[derive(Subcommand)]
enum LinkAction {
    /// Create a short link
    Create {
        /// Target URL (prompted for when omitted)
        #[arg(short, long)]
        url: Option<String>,

        /// Custom code
        #[arg(short, long)]
        custom: Option<String>,

        /// Lifetime in days
        #[arg(short, long)]
        ttl_days: Option<u32>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Show one link
    Show { code: String },

    /// List links pointing at a target URL
    ByTarget { url: String },

    /// List links created by a client key
    ByClient { key: String },
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

    // Code generation needs neither configuration nor a database.
    if let Commands::Codes {
        action: CodesAction::Generate { count, length },
    } = cli.command
    {
        return generate_codes(count, length);
    }

    let config = Config::from_env().context("Failed to load configuration")?;

    let pool = PgPool::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Codes { .. } => {}
        Commands::Link { action } => handle_link_action(action, &config, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

fn generate_codes(count: usize, length: usize) -> Result<()> {
    if !(4..=64).contains(&length) {
        anyhow::bail!("--length must be between 4 and 64, got {}", length);
    }
    if count > MAX_GENERATE_COUNT {
        anyhow::bail!("--count must be at most {}, got {}", MAX_GENERATE_COUNT, count);
    }

    for code in generate_batch(count, length) {
        println!("{}", code);
    }

    Ok(())
}

/// Dispatches link commands.
async fn handle_link_action(action: LinkAction, config: &Config, pool: &PgPool) -> Result<()> {
    let repo: Arc<dyn LinkRepository> = Arc::new(PgLinkRepository::new(
        Arc::new(pool.clone()),
        config.db_query_timeout(),
    ));

    match action {
        LinkAction::Create {
            url,
            custom,
            ttl_days,
            yes,
        } => create_link(repo, config, url, custom, ttl_days, yes).await?,
        LinkAction::Show { code } => {
            let link = StatsService::new(repo)
                .link_stats(&code)
                .await
                .map_err(|e| anyhow::anyhow!("{}", e))?;
            print_link_details(&link, config);
        }
        LinkAction::ByTarget { url } => {
            let links = StatsService::new(repo)
                .links_for_target(&url)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to list links: {}", e))?;
            print_link_table(&format!("Links to {}", url), &links);
        }
        LinkAction::ByClient { key } => {
            let links = StatsService::new(repo)
                .links_for_client(&key)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to list links: {}", e))?;
            print_link_table(&format!("Links created by {}", key), &links);
        }
    }

    Ok(())
}

/// Creates a short link with interactive prompts.
///
/// The admin tool does not talk to the cache; the first redirect fills it.
async fn create_link(
    repo: Arc<dyn LinkRepository>,
    config: &Config,
    url: Option<String>,
    custom: Option<String>,
    ttl_days: Option<u32>,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "🔗 Create Short Link".bright_blue().bold());
    println!();

    let target_url = match url {
        Some(u) => u,
        None => Input::new()
            .with_prompt("Target URL")
            .with_initial_text("https://")
            .interact_text()?,
    };

    let parsed = url::Url::parse(&target_url).context("Invalid URL")?;
    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("URL must use http or https");
    }

    println!("  URL:    {}", target_url.cyan());
    if let Some(code) = &custom {
        println!("  Code:   {}", code.cyan());
    }
    if let Some(days) = ttl_days {
        println!("  Expiry: {} days", days.to_string().cyan());
    }
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Create this link?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let allocator = CodeAllocator::new(repo.clone(), config.code_length, config.code_max_attempts);
    let service = LinkService::new(
        repo,
        Arc::new(NullCache::new()),
        allocator,
        config.cache_ttl_seconds,
        config.base_url.clone(),
    );

    let link = service
        .create_short_link(target_url, custom, ttl_days, Some("admin-cli".to_string()))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create link: {}", e))?;

    println!("{}", "✅ Link created successfully!".green().bold());
    println!();
    println!(
        "  {}",
        service.short_url(&link.code).bright_yellow().bold()
    );
    println!();

    Ok(())
}

fn print_link_details(link: &ShortLink, config: &Config) {
    let status = if link.is_expired() {
        "EXPIRED".red()
    } else {
        "ACTIVE".green()
    };

    println!("{}", "📋 Short Link".bright_blue().bold());
    println!();
    println!(
        "  Short URL:   {}",
        format!("{}/{}", config.base_url.trim_end_matches('/'), link.code).bright_yellow()
    );
    println!("  Target:      {}", link.target_url.cyan());
    println!("  Status:      {}", status);
    println!(
        "  Created:     {}",
        link.created_at.format("%Y-%m-%d %H:%M").to_string().bright_black()
    );
    println!(
        "  Expires:     {}",
        link.expires_at
            .map(|e| e.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string())
            .bright_black()
    );
    println!(
        "  Clicks:      {}",
        link.click_count.to_string().bright_green().bold()
    );
    println!(
        "  Last click:  {}",
        link.last_accessed_at
            .map(|e| e.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string())
            .bright_black()
    );
    println!(
        "  Custom code: {}",
        if link.is_custom { "yes" } else { "no" }
    );
    println!();
}

/// Prints links in a table.
///
/// # Output Format
///
/// ```text
/// 📋 Links to https://example.com
///
///   Code         Created              Clicks     Status
///   ────────────────────────────────────────────────────────
///   abc1234      2026-01-15 10:30     42         ACTIVE
/// ```
fn print_link_table(title: &str, links: &[ShortLink]) {
    println!("{}", format!("📋 {}", title).bright_blue().bold());
    println!();

    if links.is_empty() {
        println!("{}", "  No links found".yellow());
        return;
    }

    println!(
        "  {:<12} {:<20} {:<10} {:<10}",
        "Code".bright_white().bold(),
        "Created".bright_white().bold(),
        "Clicks".bright_white().bold(),
        "Status".bright_white().bold()
    );
    println!("  {}", "─".repeat(56).bright_black());

    for link in links {
        let status = if link.is_expired() {
            "EXPIRED".red()
        } else {
            "ACTIVE".green()
        };

        println!(
            "  {:<12} {:<20} {:<10} {}",
            link.code.cyan(),
            link.created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            link.click_count,
            status
        );
    }

    println!();
    println!("  Total: {}", links.len().to_string().bright_white().bold());
    println!();
}

/// Displays totals across all links.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let (links, clicks, expired): (i64, i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(click_count), 0)::BIGINT, \
         COUNT(*) FILTER (WHERE expires_at IS NOT NULL AND expires_at <= NOW()) \
         FROM short_links",
    )
    .fetch_one(pool)
    .await?;

    println!("  Links:   {}", links.to_string().bright_green().bold());
    println!("  Clicks:  {}", clicks.to_string().bright_green().bold());
    println!("  Expired: {}", expired.to_string().bright_black());
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
