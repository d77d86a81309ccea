use std::collections::HashSet;
use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use sqlx::{Row, SqlitePool};

use site_authz::audit::{AuditSink, TracingAuditSink};
use site_authz::authz::{ResourceKind, SqliteActorResolver, TokenResolver};
use site_authz::check::{parse_request, run_check};
use site_authz::errors::ErrorResponse;
use site_authz::jwt::JwtConfig;
use site_authz::{db, AuthzConfig, PolicyEngine};

#[derive(Parser, Debug)]
#[command(author, version, about = "tenant-scoped authorization engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decide one request read from a JSON file, or `-` for stdin
    Check {
        #[arg(long)]
        request: PathBuf,
    },
    /// Print the active rule tables
    Rules {
        #[arg(long)]
        kind: Option<ResourceKind>,
    },
    /// Resolve the actor behind a bearer token against the identity store
    Resolve {
        #[arg(long)]
        token: String,
    },
    /// Apply pending identity-store migrations
    MigrateRun,
    /// Show migration status against the current database
    MigrateStatus,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_env();
    init_tracing();

    let cli = Cli::parse();
    let config = AuthzConfig::from_env()?;

    match cli.command {
        Commands::Check { request } => {
            let input = read_request(&request)?;
            let engine = PolicyEngine::new(config);
            match parse_request(&input).and_then(|request| run_check(&engine, request)) {
                Ok(outcome) => {
                    TracingAuditSink.record(outcome.record.clone())?;
                    println!("{}", serde_json::to_string_pretty(&outcome)?);
                    let code = outcome.exit_code();
                    if code != 0 {
                        std::process::exit(code);
                    }
                }
                Err(err) => {
                    println!("{}", serde_json::to_string_pretty(&ErrorResponse::from(&err))?);
                    std::process::exit(2);
                }
            }
        }
        Commands::Rules { kind } => {
            let engine = PolicyEngine::new(config);
            for table in engine.rules().tables().filter(|table| kind.map_or(true, |k| k == table.kind)) {
                println!("{}", table.kind);
                for rule in table.rules() {
                    println!("  {:<12} {:<48} {}", rule.action.as_str(), rule.id.as_str(), rule.predicate);
                }
            }
        }
        Commands::Resolve { token } => {
            let pool = db::init().await?;
            let resolver = TokenResolver::new(JwtConfig::from_env()?, SqliteActorResolver::new(pool));
            let actor = resolver.resolve_token(&token).await?;
            println!("{}", serde_json::to_string_pretty(&actor)?);
        }
        Commands::MigrateRun => {
            let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL not set")?;
            let pool = db::connect(&database_url).await?;
            let migrator = db::migrator_from_disk().await?;
            migrator.run(&pool).await?;
            println!("Migrations applied");
        }
        Commands::MigrateStatus => {
            let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL not set")?;
            let pool = db::connect(&database_url).await?;
            let migrator = db::migrator_from_disk().await?;
            print_status(&pool, &migrator).await?;
        }
    }

    Ok(())
}

fn read_request(path: &PathBuf) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut input = String::new();
        std::io::stdin().read_to_string(&mut input).context("failed to read request from stdin")?;
        return Ok(input);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read request {}", path.display()))
}

async fn print_status(pool: &SqlitePool, migrator: &sqlx::migrate::Migrator) -> anyhow::Result<()> {
    // If the migrations table doesn't exist, nothing is applied yet
    let tracked = sqlx::query("SELECT name FROM sqlite_master WHERE type='table' AND name='_sqlx_migrations'")
        .fetch_optional(pool)
        .await?;
    let applied_versions: HashSet<i64> = if tracked.is_some() {
        let rows = sqlx::query("SELECT version FROM _sqlx_migrations WHERE success = 1")
            .fetch_all(pool)
            .await?;
        rows.iter().filter_map(|row| row.try_get::<i64, _>("version").ok()).collect()
    } else {
        HashSet::new()
    };

    println!("{:<8} {:<20} {}", "Status", "Version", "Name");
    for migration in migrator.iter() {
        let status = if applied_versions.contains(&migration.version) { "applied" } else { "pending" };
        let desc = migration.description.as_ref().trim();
        let name = if desc.is_empty() { "unknown" } else { desc };
        println!("{:<8} {:<20} {}", status, migration.version, name);
    }

    Ok(())
}

fn load_env() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    let crate_env = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    let _ = dotenvy::from_path(crate_env);
}

fn init_tracing() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("site_authz=info"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
