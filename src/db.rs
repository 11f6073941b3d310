use anyhow::Result;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx_migrator::{Migrate, Plan};
use std::path::Path;
use std::str::FromStr;

/// Open the application pool, creating the database file on first run.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    configure_pragmas(&pool).await?;

    Ok(pool)
}

/// WAL plus a busy timeout keep concurrent reconcile/settle writers from
/// tripping SQLITE_BUSY; synchronous=NORMAL is safe under WAL.
async fn configure_pragmas(pool: &SqlitePool) -> Result<()> {
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(pool)
        .await?;
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(pool)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(pool)
        .await?;
    sqlx::query("PRAGMA foreign_keys = true")
        .execute(pool)
        .await?;

    Ok(())
}

/// Apply all pending migrations.
pub async fn migrate(pool: &SqlitePool) -> Result<()> {
    let mut conn = pool.acquire().await?;
    larder_db::migrator()?
        .run(&mut conn, &Plan::apply_all())
        .await?;

    tracing::info!("database migrations applied");

    Ok(())
}

/// Drop the database file (and WAL sidecars) if present, then recreate it
/// with migrations.
pub async fn reset(database_url: &str, max_connections: u32) -> Result<SqlitePool> {
    let path = database_url.trim_start_matches("sqlite:");

    if path != ":memory:" {
        for suffix in ["", "-wal", "-shm"] {
            let file = format!("{path}{suffix}");
            if Path::new(&file).exists() {
                std::fs::remove_file(&file)?;
                tracing::info!(file, "dropped database file");
            }
        }
    }

    let pool = connect(database_url, max_connections).await?;
    migrate(&pool).await?;

    Ok(pool)
}
