//! CLI administration tool for course-studio.
//!
//! Registers profiles, issues API tokens and inspects the database without
//! going through the HTTP API. The first admin account has to be created
//! here, since every HTTP endpoint requires a token.
//!
//! # Usage
//!
//! ```bash
//! # Register a profile
//! cargo run --bin admin -- profile create --email ada@example.com --name "Ada" --role staff
//!
//! # List profiles, optionally by role
//! cargo run --bin admin -- profile list --role staff
//!
//! # Change a role
//! cargo run --bin admin -- profile role ada@example.com admin
//!
//! # Issue a token for a profile
//! cargo run --bin admin -- token create --email ada@example.com --name laptop
//!
//! # List and revoke tokens
//! cargo run --bin admin -- token list
//! cargo run --bin admin -- token revoke laptop
//!
//! # Course and profile totals
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string
//! - `TOKEN_SIGNING_SECRET` (required for `token create`): must match the server's

use course_studio::application::services::profile_service::normalize_email;
use course_studio::config::Config;
use course_studio::domain::entities::{NewProfile, Profile, Role};
use course_studio::domain::repositories::{CourseRepository, ProfileRepository, TokenRepository};
use course_studio::infrastructure::persistence::{
    PgCourseRepository, PgProfileRepository, PgTokenRepository,
};
use course_studio::utils::token::{generate_token, hash_token};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing course-studio.
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
    /// Manage profiles
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Manage API tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Show course and profile totals
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Register a new profile
    Create {
        #[arg(short, long)]
        email: Option<String>,

        #[arg(short, long)]
        name: Option<String>,

        /// admin, staff or student
        #[arg(short, long, default_value = "student")]
        role: Role,
    },

    /// List profiles
    List {
        #[arg(short, long)]
        role: Option<Role>,
    },

    /// Change the role of a profile
    Role {
        /// Profile email or ID
        profile: String,

        role: Role,
    },
}

/// Token management subcommands.
#[derive(Subcommand)]
enum TokenAction {
    /// Create a new API token for a profile
    Create {
        /// Email of the profile the token authenticates as
        #[arg(short, long)]
        email: Option<String>,

        /// Token name (e.g., "laptop", "grading script")
        #[arg(short, long)]
        name: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List all tokens
    List,

    /// Revoke a token
    Revoke {
        /// Token name or ID to revoke
        name_or_id: String,
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
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = Config::load_database_url()?;
    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;
    let pool = Arc::new(pool);

    match cli.command {
        Commands::Profile { action } => handle_profile_action(action, pool).await?,
        Commands::Token { action } => handle_token_action(action, pool).await?,
        Commands::Stats => handle_stats(pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

async fn handle_profile_action(action: ProfileAction, pool: Arc<PgPool>) -> Result<()> {
    let repo = PgProfileRepository::new(pool);

    match action {
        ProfileAction::Create { email, name, role } => create_profile(&repo, email, name, role).await,
        ProfileAction::List { role } => list_profiles(&repo, role).await,
        ProfileAction::Role { profile, role } => change_role(&repo, &profile, role).await,
    }
}

async fn create_profile(
    repo: &PgProfileRepository,
    email: Option<String>,
    name: Option<String>,
    role: Role,
) -> Result<()> {
    println!("{}", "👤 Register Profile".bright_blue().bold());
    println!();

    let email = match email {
        Some(e) => e,
        None => Input::new().with_prompt("Email").interact_text()?,
    };
    let name = match name {
        Some(n) => n,
        None => Input::new().with_prompt("Name").interact_text()?,
    };

    let email = normalize_email(&email);
    anyhow::ensure!(email.contains('@'), "'{email}' is not an email address");
    let name = name.trim().to_string();
    anyhow::ensure!(!name.is_empty(), "Name must not be empty");

    let profile = repo
        .create(NewProfile { email, name, role })
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create profile: {}", e))?;

    println!("{}", "✅ Profile created".green().bold());
    print_profile(&profile);
    println!();

    Ok(())
}

async fn list_profiles(repo: &PgProfileRepository, role: Option<Role>) -> Result<()> {
    println!("{}", "📋 Profiles".bright_blue().bold());
    println!();

    let profiles = repo
        .list(role)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list profiles: {}", e))?;

    if profiles.is_empty() {
        println!("{}", "  No profiles found".yellow());
        return Ok(());
    }

    println!(
        "  {:<5} {:<32} {:<24} {:<8}",
        "ID".bright_white().bold(),
        "Email".bright_white().bold(),
        "Name".bright_white().bold(),
        "Role".bright_white().bold()
    );
    println!("  {}", "─".repeat(72).bright_black());

    for profile in &profiles {
        println!(
            "  {:<5} {:<32} {:<24} {}",
            profile.id.to_string().bright_black(),
            profile.email.cyan(),
            profile.name,
            role_label(profile.role)
        );
    }

    println!();
    println!(
        "  Total: {}",
        profiles.len().to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

async fn change_role(repo: &PgProfileRepository, profile: &str, role: Role) -> Result<()> {
    let found = find_profile(repo, profile).await?;

    if found.role == role {
        println!("{}", format!("⚠️  Profile is already {role}").yellow());
        return Ok(());
    }

    let updated = repo
        .update_role(found.id, role)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to update role: {}", e))?;

    println!("{}", "✅ Role updated".green().bold());
    print_profile(&updated);
    println!();

    Ok(())
}

/// Looks a profile up by numeric ID or by email.
async fn find_profile(repo: &PgProfileRepository, key: &str) -> Result<Profile> {
    let profile = match key.parse::<i64>() {
        Ok(id) => repo.find_by_id(id).await,
        Err(_) => repo.find_by_email(&normalize_email(key)).await,
    }
    .map_err(|e| anyhow::anyhow!("Database error: {}", e))?;

    profile.with_context(|| format!("Profile '{key}' not found"))
}

fn print_profile(profile: &Profile) {
    println!("  ID:    {}", profile.id.to_string().bright_black());
    println!("  Email: {}", profile.email.cyan());
    println!("  Name:  {}", profile.name);
    println!("  Role:  {}", role_label(profile.role));
}

fn role_label(role: Role) -> ColoredString {
    match role {
        Role::Admin => role.as_str().red(),
        Role::Staff => role.as_str().yellow(),
        Role::Student => role.as_str().green(),
    }
}

/// Dispatches token management commands.
async fn handle_token_action(action: TokenAction, pool: Arc<PgPool>) -> Result<()> {
    let tokens = PgTokenRepository::new(pool.clone());

    match action {
        TokenAction::Create { email, name, yes } => {
            let profiles = PgProfileRepository::new(pool);
            create_token(&tokens, &profiles, email, name, yes).await
        }
        TokenAction::List => list_tokens(&tokens).await,
        TokenAction::Revoke { name_or_id } => revoke_token(&tokens, &name_or_id).await,
    }
}

/// Creates a new API token bound to a profile.
///
/// Only the HMAC of the token is stored. The raw value is printed once.
async fn create_token(
    tokens: &PgTokenRepository,
    profiles: &PgProfileRepository,
    email: Option<String>,
    name: Option<String>,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "🔑 Create API Token".bright_blue().bold());
    println!();

    let secret = std::env::var("TOKEN_SIGNING_SECRET").context("TOKEN_SIGNING_SECRET must be set")?;
    anyhow::ensure!(!secret.is_empty(), "TOKEN_SIGNING_SECRET must not be empty");

    let email = match email {
        Some(e) => e,
        None => Input::new().with_prompt("Profile email").interact_text()?,
    };
    let profile = find_profile(profiles, &email).await?;

    let token_name = match name {
        Some(n) => n,
        None => Input::new()
            .with_prompt("Token name")
            .with_initial_text("laptop")
            .interact_text()?,
    };

    let token_value = generate_token();

    println!();
    println!("{}", "Token details:".bright_white().bold());
    println!("  Name:    {}", token_name.cyan());
    println!("  Profile: {} ({})", profile.email.cyan(), role_label(profile.role));
    println!("  Token:   {}", token_value.bright_yellow().bold());
    println!();
    println!(
        "{}",
        "⚠️  IMPORTANT: Save this token now! You won't be able to see it again."
            .red()
            .bold()
    );
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Create this token?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let token_hash = hash_token(&secret, &token_value);

    tokens
        .create_token(profile.id, &token_name, &token_hash)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create token: {}", e))?;

    println!();
    println!("{}", "✅ Token created successfully!".green().bold());
    println!();
    println!("{}", "Example:".bright_white());
    println!(
        "  curl -H \"Authorization: Bearer {}\" http://localhost:3000/api/me",
        token_value.bright_yellow()
    );
    println!();

    Ok(())
}

async fn list_tokens(repo: &PgTokenRepository) -> Result<()> {
    println!("{}", "📋 API Tokens".bright_blue().bold());
    println!();

    let tokens = repo
        .list_tokens()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list tokens: {}", e))?;

    if tokens.is_empty() {
        println!("{}", "  No tokens found".yellow());
        println!();
        println!(
            "  Create one with: {} admin token create",
            "cargo run --bin".bright_cyan()
        );
        return Ok(());
    }

    println!(
        "  {:<5} {:<24} {:<8} {:<18} {:<10}",
        "ID".bright_white().bold(),
        "Name".bright_white().bold(),
        "Profile".bright_white().bold(),
        "Created".bright_white().bold(),
        "Status".bright_white().bold()
    );
    println!("  {}", "─".repeat(72).bright_black());

    for token in &tokens {
        let status = if token.is_active() {
            "ACTIVE".green()
        } else {
            "REVOKED".red()
        };

        println!(
            "  {:<5} {:<24} {:<8} {:<18} {}",
            token.id.to_string().bright_black(),
            token.name.cyan(),
            token.profile_id,
            token
                .created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            status
        );
    }

    println!();
    println!(
        "  Total: {}",
        tokens.len().to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Revokes a token by name or ID after confirmation.
async fn revoke_token(repo: &PgTokenRepository, name_or_id: &str) -> Result<()> {
    println!("{}", "🔒 Revoke API Token".bright_blue().bold());
    println!();

    let token = match name_or_id.parse::<i64>() {
        Ok(id) => repo.find_by_id(id).await,
        Err(_) => repo.find_by_name(name_or_id).await,
    }
    .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
    .context("Token not found")?;

    if !token.is_active() {
        println!("{}", "⚠️  This token is already revoked".yellow());
        return Ok(());
    }

    println!("  Token: {}", token.name.cyan());
    println!("  ID:    {}", token.id.to_string().bright_black());
    println!();

    let confirmed = Confirm::new()
        .with_prompt("Revoke this token?")
        .default(false)
        .interact()?;

    if !confirmed {
        println!("{}", "❌ Cancelled".red());
        return Ok(());
    }

    repo.revoke_token(token.id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to revoke token: {}", e))?;

    println!();
    println!("{}", "✅ Token revoked successfully!".green().bold());
    println!();

    Ok(())
}

async fn handle_stats(pool: Arc<PgPool>) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let courses = PgCourseRepository::new(pool.clone())
        .counts()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to count courses: {}", e))?;
    let profiles = PgProfileRepository::new(pool.clone())
        .count_by_role()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to count profiles: {}", e))?;
    let active_tokens: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM api_tokens WHERE revoked_at IS NULL")
            .fetch_one(pool.as_ref())
            .await?;

    println!(
        "  Courses:       {} ({} published, {} draft)",
        courses.total.to_string().bright_green().bold(),
        courses.published,
        courses.draft
    );
    println!(
        "  Profiles:      {} ({} admin, {} staff, {} student)",
        profiles.total().to_string().bright_green().bold(),
        profiles.admin,
        profiles.staff,
        profiles.student
    );
    println!(
        "  Active tokens: {}",
        active_tokens.to_string().bright_green().bold()
    );
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
            let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Migrations: {}", applied.to_string().bright_white());
            println!();
        }
    }

    Ok(())
}
