//! CLI administration tool for shortlink.
//!
//! Creates, inspects, lists and deletes short links and manages the database
//! schema, going through the same services and stores as library users.
//!
//! # Usage
//!
//! ```bash
//! # Apply migrations
//! cargo run --bin admin -- db migrate
//!
//! # Create an anonymous short link
//! cargo run --bin admin -- link create https://example.com
//!
//! # List a user's links, newest first
//! cargo run --bin admin -- link list --user 42 --sort-by created_at --sort-order desc
//!
//! # Delete a link owned by a user
//! cargo run --bin admin -- link delete abc123 --user 42
//! ```
//!
//! # Environment Variables
//!
//! See [`shortlink::config`]; `DATABASE_URL` (or the `DB_*` components) is required.

use shortlink::application::services::UrlService;
use shortlink::config::{self, Config};
use shortlink::domain::entities::ShortLink;
use shortlink::domain::repositories::{
    FindAllQuery, LinkRepository, PaginatedResponse, Repository, execute_find_all_with_params,
};
use shortlink::infrastructure::logging;
use shortlink::infrastructure::persistence::{PgStore, connect_pool, run_migrations};
use shortlink::utils::code_generator::ShortCodeGenerator;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing shortlink.
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
    /// Manage short links
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum LinkAction {
    /// Create a short link
    Create {
        /// URL to shorten
        url: String,

        /// Owner user ID (anonymous if omitted)
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Show a short link
    Get { short_id: String },

    /// List short links
    List {
        /// Only links owned by this user
        #[arg(short, long)]
        user: Option<String>,

        #[arg(long)]
        page: Option<String>,

        /// Defaults to DEFAULT_PAGE_SIZE
        #[arg(long)]
        page_size: Option<String>,

        /// Column to sort by (e.g. created_at)
        #[arg(long)]
        sort_by: Option<String>,

        /// asc or desc
        #[arg(long)]
        sort_order: Option<String>,
    },

    /// Soft-delete a short link
    Delete {
        short_id: String,

        /// User that owns the link
        #[arg(short, long)]
        user: String,

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

    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env().context("Invalid configuration")?;
    logging::init(&config)?;
    config.print_summary();

    let pool = connect_pool(&config).await?;

    match cli.command {
        Commands::Link { action } => handle_link_action(action, &config, &pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Dispatches link management commands.
async fn handle_link_action(action: LinkAction, config: &Config, pool: &PgPool) -> Result<()> {
    let repository: LinkRepository =
        Repository::new(Arc::new(PgStore::<ShortLink>::new(Arc::new(pool.clone()))));
    let service = UrlService::new(
        repository.clone(),
        Arc::new(ShortCodeGenerator::new()),
        config.retry,
    )
    .with_default_page_size(config.default_page_size);

    match action {
        LinkAction::Create { url, user } => {
            let link = service
                .create_short_url(&url, user.as_deref())
                .await
                .context("Failed to create short link")?;

            println!("{}", "✅ Short link created".green().bold());
            println!();
            print_link(&link);
        }
        LinkAction::Get { short_id } => {
            match service.find_one_by_short_id(&short_id).await? {
                Some(link) => print_link(&link),
                None => println!("{}", format!("  No live link with code {short_id}").yellow()),
            }
        }
        LinkAction::List {
            user,
            page,
            page_size,
            sort_by,
            sort_order,
        } => {
            let query = FindAllQuery {
                page,
                page_size,
                sort_by,
                sort_order,
            }
            .with_default_page_size(config.default_page_size);

            let response = match user {
                Some(user_id) => service.find_all_by_user_id(&user_id, &query).await?,
                None => execute_find_all_with_params(&query, repository.find_all()).await?,
            };

            print_page(&response);
        }
        LinkAction::Delete {
            short_id,
            user,
            yes,
        } => {
            println!("  Code:  {}", short_id.cyan());
            println!("  Owner: {}", user.cyan());
            println!();

            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt("Delete this link?")
                    .default(false)
                    .interact()?;

                if !confirmed {
                    println!("{}", "❌ Cancelled".red());
                    return Ok(());
                }
            }

            service
                .delete_one_by_short_id(&short_id, &user)
                .await
                .context("Failed to delete short link")?;

            println!("{}", "✅ Short link deleted".green().bold());
        }
    }

    Ok(())
}

fn print_link(link: &ShortLink) {
    println!("  Code:    {}", link.short_id.bright_yellow().bold());
    println!("  URL:     {}", link.long_url.cyan());
    println!(
        "  Owner:   {}",
        link.user_id.as_deref().unwrap_or("anonymous").bright_black()
    );
    println!(
        "  Created: {}",
        link.created_at
            .format("%Y-%m-%d %H:%M")
            .to_string()
            .bright_black()
    );
}

/// Prints one page of links.
///
/// # Output Format
///
/// ```text
///   Code        Owner        Created           URL
///   ──────────────────────────────────────────────────────────────
///   abc123      42           2024-01-15 10:30  https://example.com
///
///   Page 1/4 (100 links)
/// ```
fn print_page(response: &PaginatedResponse<ShortLink>) {
    if response.results.is_empty() {
        println!("{}", "  No links found".yellow());
    } else {
        println!(
            "  {:<11} {:<12} {:<17} {}",
            "Code".bright_white().bold(),
            "Owner".bright_white().bold(),
            "Created".bright_white().bold(),
            "URL".bright_white().bold()
        );
        println!("  {}", "─".repeat(75).bright_black());

        for link in &response.results {
            println!(
                "  {:<11} {:<12} {:<17} {}",
                link.short_id.bright_yellow(),
                link.user_id.as_deref().unwrap_or("-"),
                link.created_at.format("%Y-%m-%d %H:%M").to_string(),
                link.long_url.cyan()
            );
        }
    }

    if let Some(meta) = &response.meta {
        println!();
        println!(
            "  Page {}/{} ({} links)",
            meta.page.to_string().bright_white().bold(),
            meta.total_pages,
            meta.total_items
        );
    }
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Migrate => {
            println!("{}", "🔧 Applying migrations...".bright_blue());

            run_migrations(pool).await?;

            println!("{}", "✅ Migrations applied".green().bold());
        }
    }

    Ok(())
}
