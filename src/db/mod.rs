use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

pub mod row_parsers;

/// Migrations compiled into the binary.
pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Connects using `DATABASE_URL` and applies pending migrations.
pub async fn init() -> anyhow::Result<SqlitePool> {
	let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL not set")?;
	let pool = connect(&database_url).await?;

	MIGRATOR
		.run(&pool)
		.await
		.context("failed to run migrations")?;

	Ok(pool)
}

pub async fn connect(database_url: &str) -> anyhow::Result<SqlitePool> {
	let options = SqliteConnectOptions::from_str(database_url)
		.with_context(|| format!("invalid DATABASE_URL: {database_url}"))?
		.create_if_missing(true)
		.foreign_keys(true);

	SqlitePoolOptions::new()
		.max_connections(10)
		.min_connections(1)
		.acquire_timeout(Duration::from_secs(10))
		.connect_with(options)
		.await
		.context("failed to connect to database")
}

/// Loads migrations from disk, preferring `./migrations` and falling back
/// to the crate-local folder when the working directory differs.
pub async fn migrator_from_disk() -> anyhow::Result<Migrator> {
	Migrator::new(migrations_dir())
		.await
		.context("failed to load migrations")
}

fn migrations_dir() -> PathBuf {
	let local = Path::new("./migrations");
	if local.exists() {
		local.to_path_buf()
	} else {
		Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations")
	}
}
