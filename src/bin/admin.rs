//! CLI administration tool for shortlink-store.
//!
//! Provides commands for issuing principal assertions, inspecting counts and
//! visit reports, and performing database operations without a host
//! application.
//!
//! # Usage
//!
//! ```bash
//! # Issue an assertion for a user
//! cargo run --bin admin -- principal issue --user user-42
//!
//! # Entry counts across all owners
//! cargo run --bin admin -- stats
//!
//! # Entry counts for one owner
//! cargo run --bin admin -- stats --token "<assertion>"
//!
//! # Visits to entry 7 during the last week
//! cargo run --bin admin -- visits 7 --range 7d
//!
//! # Apply migrations
//! cargo run --bin admin -- db migrate
//! ```
//!
//! # Environment Variables
//!
//! See [`shortlink_store::config`]. `DATABASE_URL` (or the `DB_*` set) and
//! `PRINCIPAL_SIGNING_SECRET` are required.

use shortlink_store::application::services::{AuthService, ShortUrlService, VisitService};
use shortlink_store::config::{self, Config};
use shortlink_store::domain::entities::{Principal, Role};
use shortlink_store::infrastructure::persistence::{PgShortUrlRepository, PgVisitRepository, pool};
use shortlink_store::telemetry;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// User id used for assertions the CLI issues to itself.
const OPERATOR_ID: &str = "admin-cli";

/// CLI tool for managing shortlink-store.
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
    /// Show entry counts (all owners, or the owner of --token)
    Stats {
        /// Principal assertion limiting the count to one owner
        #[arg(short, long)]
        token: Option<String>,
    },

    /// Show the most recent visits
    Activity {
        /// Principal assertion limiting the log to one owner
        #[arg(short, long)]
        token: Option<String>,
    },

    /// List visits for an entry
    Visits {
        /// Entry id
        url_id: i64,

        /// Date range: all, 24h, 7d, 30d, 60d, 90d, 180d, 365d
        #[arg(short, long, default_value = "all")]
        range: String,
    },

    /// Look up the redirect data for a slug
    Resolve {
        /// Slug to resolve
        slug: String,
    },

    /// Manage principal assertions
    Principal {
        #[command(subcommand)]
        action: PrincipalAction,
    },

    /// Manage entries
    Entry {
        #[command(subcommand)]
        action: EntryAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Principal subcommands.
#[derive(Subcommand)]
enum PrincipalAction {
    /// Sign an assertion for a user
    Issue {
        /// User id the assertion names
        #[arg(short, long)]
        user: String,

        /// Grant the admin role
        #[arg(long)]
        admin: bool,
    },
}

/// Entry subcommands.
#[derive(Subcommand)]
enum EntryAction {
    /// Delete an entry owned by the principal of --token
    Delete {
        /// Entry id
        id: i64,

        /// Principal assertion of the owner
        #[arg(short, long)]
        token: String,

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
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env().context("Failed to load configuration")?;
    telemetry::init_tracing(&config.log_level, &config.log_format)?;

    let auth = AuthService::new(config.principal_signing_secret.clone());

    // Issuing needs no database
    if let Commands::Principal { action } = cli.command {
        return handle_principal_action(action, &auth);
    }

    let pool = pool::connect(&config)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Stats { token } => handle_stats(&config, &pool, &auth, token).await?,
        Commands::Activity { token } => handle_activity(&pool, &auth, token).await?,
        Commands::Visits { url_id, range } => handle_visits(&pool, url_id, &range).await?,
        Commands::Resolve { slug } => handle_resolve(&config, &pool, &slug).await?,
        Commands::Entry { action } => handle_entry_action(action, &config, &pool, &auth).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
        Commands::Principal { .. } => unreachable!("handled before connecting"),
    }

    Ok(())
}

/// Verifies `token`, or issues an operator admin principal when absent.
fn resolve_principal(auth: &AuthService, token: Option<String>) -> Result<Principal> {
    let assertion = match token {
        Some(t) => t,
        None => auth
            .issue(OPERATOR_ID, Role::Admin)
            .map_err(|e| anyhow::anyhow!("Failed to issue operator assertion: {}", e))?,
    };

    auth.verify(&assertion)
        .map_err(|e| anyhow::anyhow!("Invalid token: {}", e))
}

fn short_url_service(config: &Config, pool: &PgPool) -> ShortUrlService<PgShortUrlRepository> {
    let repo = Arc::new(PgShortUrlRepository::new(Arc::new(pool.clone())));
    ShortUrlService::with_max_page_size(repo, config.max_page_size)
}

fn visit_service(pool: &PgPool) -> VisitService<PgVisitRepository> {
    VisitService::new(Arc::new(PgVisitRepository::new(Arc::new(pool.clone()))))
}

/// Signs and prints a principal assertion.
fn handle_principal_action(action: PrincipalAction, auth: &AuthService) -> Result<()> {
    match action {
        PrincipalAction::Issue { user, admin } => {
            let role = if admin { Role::Admin } else { Role::User };

            let assertion = auth
                .issue(&user, role)
                .map_err(|e| anyhow::anyhow!("Failed to issue assertion: {}", e))?;

            println!("{}", "🔑 Principal assertion".bright_blue().bold());
            println!();
            println!("  User:  {}", user.cyan());
            println!("  Role:  {}", role.as_str().cyan());
            println!("  Token: {}", assertion.bright_yellow().bold());
            println!();
        }
    }

    Ok(())
}

/// Displays entry counts for the whole store or one owner.
async fn handle_stats(
    config: &Config,
    pool: &PgPool,
    auth: &AuthService,
    token: Option<String>,
) -> Result<()> {
    let principal = resolve_principal(auth, token)?;
    let service = short_url_service(config, pool);

    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let counts = service.count_for_owner(&principal).await;

    if counts.is_unavailable() {
        println!("{}", "  Counts unavailable, see log for details".yellow());
        println!();
        return Ok(());
    }

    let scope = if principal.is_admin() {
        "all owners".to_string()
    } else {
        principal.user_id().to_string()
    };

    println!("  Scope:       {}", scope.cyan());
    println!(
        "  Entries:     {}",
        counts.total.to_string().bright_green().bold()
    );
    println!(
        "  This month:  {}",
        counts.month_total.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Displays the recent activity log.
async fn handle_activity(pool: &PgPool, auth: &AuthService, token: Option<String>) -> Result<()> {
    let principal = resolve_principal(auth, token)?;

    println!("{}", "🕒 Recent activity".bright_blue().bold());
    println!();

    let entries = visit_service(pool)
        .recent_activity_log(&principal)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load activity: {}", e))?;

    if entries.is_empty() {
        println!("{}", "  No visits recorded".yellow());
        println!();
        return Ok(());
    }

    println!(
        "  {:<20} {:<16} {:<6} {:<40}",
        "Last visit".bright_white().bold(),
        "Slug".bright_white().bold(),
        "Clicks".bright_white().bold(),
        "IP".bright_white().bold()
    );
    println!("  {}", "─".repeat(85).bright_black());

    for entry in &entries {
        println!(
            "  {:<20} {:<16} {:<6} {}",
            entry
                .updated_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            entry.slug.cyan(),
            entry.click.to_string().bright_green(),
            entry.ip
        );
    }

    println!();

    Ok(())
}

/// Lists visits for one entry within a date range.
async fn handle_visits(pool: &PgPool, url_id: i64, range: &str) -> Result<()> {
    println!(
        "{} {} ({})",
        "📈 Visits for entry".bright_blue().bold(),
        url_id.to_string().bright_white().bold(),
        range.cyan()
    );
    println!();

    let visits = visit_service(pool)
        .list_visits_for_entry(url_id, range)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list visits: {}", e))?;

    if visits.is_empty() {
        println!("{}", "  No visits in this range".yellow());
        println!();
        return Ok(());
    }

    for visit in &visits {
        let location = match (&visit.city, &visit.country) {
            (Some(city), Some(country)) => format!("{city}, {country}"),
            (None, Some(country)) => country.clone(),
            (Some(city), None) => city.clone(),
            (None, None) => "-".to_string(),
        };

        println!(
            "  {:<40} {:>6}  {:<24} {}",
            visit.ip,
            visit.click.to_string().bright_green(),
            location,
            visit
                .updated_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black()
        );
    }

    let total: i64 = visits.iter().map(|v| i64::from(v.click)).sum();
    println!();
    println!(
        "  Visitors: {}  Clicks: {}",
        visits.len().to_string().bright_white().bold(),
        total.to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Shows the redirect projection for a slug.
async fn handle_resolve(config: &Config, pool: &PgPool, slug: &str) -> Result<()> {
    let resolved = short_url_service(config, pool)
        .resolve_by_slug(slug)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    let status = if resolved.is_available_at(chrono::Utc::now()) {
        "AVAILABLE".green()
    } else if !resolved.active {
        "DISABLED".red()
    } else {
        "EXPIRED".red()
    };

    println!("{}", "🔗 Short URL".bright_blue().bold());
    println!();
    println!("  ID:         {}", resolved.id.to_string().bright_black());
    println!("  Target:     {}", resolved.target.cyan());
    println!("  Title:      {}", resolved.title);
    println!("  Expiration: {}", resolved.expiration);
    println!(
        "  Password:   {}",
        if resolved.requires_password() { "yes" } else { "no" }
    );
    println!("  Status:     {}", status);
    println!();

    Ok(())
}

/// Handles entry management commands.
async fn handle_entry_action(
    action: EntryAction,
    config: &Config,
    pool: &PgPool,
    auth: &AuthService,
) -> Result<()> {
    match action {
        EntryAction::Delete { id, token, yes } => {
            let principal = auth
                .verify(&token)
                .map_err(|e| anyhow::anyhow!("Invalid token: {}", e))?;

            println!("{}", "🗑  Delete entry".bright_blue().bold());
            println!();
            println!("  Entry: {}", id.to_string().cyan());
            println!("  Owner: {}", principal.user_id().cyan());
            println!();

            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt("Delete this entry and its visits?")
                    .default(false)
                    .interact()?;

                if !confirmed {
                    println!("{}", "❌ Cancelled".red());
                    return Ok(());
                }
            }

            short_url_service(config, pool)
                .delete_entry(&principal, id)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to delete entry: {}", e))?;

            println!("{}", "✅ Entry deleted".green().bold());
            println!();
        }
    }

    Ok(())
}

/// Handles database commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Migrate => {
            println!("{}", "🔧 Applying migrations...".bright_blue());

            pool::migrate(pool).await?;

            println!("{}", "✅ Migrations applied".green().bold());
        }
    }

    Ok(())
}
