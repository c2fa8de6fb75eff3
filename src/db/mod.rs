//! Database module for SQLite persistence.
//!
//! SQLite is the source of truth for all application data. The layout is
//! key-value: one row per collection, each holding a serialized JSON array,
//! plus a singleton meta row for revision tracking.

mod repository;

pub use repository::*;

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::path::Path;
use std::str::FromStr;

use crate::models::MigrationRecord;

/// A named schema migration. Statements are idempotent so a partially
/// recorded history can be re-run safely.
struct Migration {
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        name: "0001_create_collections",
        sql: r#"
        CREATE TABLE IF NOT EXISTS collections (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            version INTEGER NOT NULL DEFAULT 0,
            updated_at TEXT NOT NULL
        );
        "#,
    },
    Migration {
        name: "0002_create_meta",
        sql: r#"
        CREATE TABLE IF NOT EXISTS meta (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            schema_version INTEGER NOT NULL DEFAULT 1,
            revision_id INTEGER NOT NULL DEFAULT 0,
            generated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        "#,
    },
    Migration {
        name: "0003_seed_meta",
        sql: r#"
        INSERT OR IGNORE INTO meta (id, schema_version, revision_id, generated_at)
        VALUES (1, 1, 0, datetime('now'));
        "#,
    },
];

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    // Run embedded migrations
    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run database migrations, recording each applied name in the migration log.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // The migration log lives in the collections table, so that table must
    // exist before anything can be recorded.
    sqlx::query(MIGRATIONS[0].sql).execute(pool).await?;

    let applied = applied_migrations(pool).await?;
    let mut records = applied.clone();

    for migration in MIGRATIONS {
        if applied.iter().any(|r| r.name == migration.name) {
            continue;
        }
        sqlx::query(migration.sql).execute(pool).await?;
        tracing::info!(migration = migration.name, "Applied schema migration");
        records.push(MigrationRecord {
            name: migration.name.to_string(),
            applied_at: Utc::now().to_rfc3339(),
        });
    }

    if records.len() != applied.len() {
        let value = serde_json::to_string(&records).unwrap_or_default();
        sqlx::query(
            r#"INSERT INTO collections (key, value, version, updated_at) VALUES (?, ?, 1, ?)
               ON CONFLICT(key) DO UPDATE SET
                   value = excluded.value,
                   version = collections.version + 1,
                   updated_at = excluded.updated_at"#,
        )
        .bind(keys::MIGRATIONS)
        .bind(&value)
        .bind(Utc::now().to_rfc3339())
        .execute(pool)
        .await?;
    }

    Ok(())
}

/// Read the migration log; a missing or unreadable row means nothing applied.
async fn applied_migrations(pool: &SqlitePool) -> Result<Vec<MigrationRecord>, sqlx::Error> {
    let row = sqlx::query("SELECT value FROM collections WHERE key = ?")
        .bind(keys::MIGRATIONS)
        .fetch_optional(pool)
        .await?;

    Ok(row
        .map(|r| {
            let value: String = r.get("value");
            serde_json::from_str(&value).unwrap_or_default()
        })
        .unwrap_or_default())
}
