pub mod chapters;
pub mod stories;
pub mod users;

use std::{fmt, str::FromStr as _, time::Duration};

use sqlx::{
    migrate::{MigrateError, Migrator},
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Sqlite, Transaction,
};

pub use sqlx::{Error as DatabaseError, SqliteConnection as Connection, SqlitePool as Pool};

pub type Trans<'l> = Transaction<'l, Sqlite>;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The referenced row does not exist
    #[error("{0} cannot be found")]
    NotFound(Entity),

    /// A unique value is already taken
    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Migrate(#[from] MigrateError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Entity {
    User,
    Story,
    Chapter,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::User => write!(f, "User"),
            Entity::Story => write!(f, "Story"),
            Entity::Chapter => write!(f, "Chapter"),
        }
    }
}

/// The driver message of a unique constraint failure, SQLite names the column in it
/// (`UNIQUE constraint failed: users.public_id`).
fn unique_violation(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => Some(db_err.message()),
        _ => None,
    }
}

/// Maps unique constraint failures to [`Error::Conflict`], anything else stays a database error.
fn conflict_or_database(err: sqlx::Error, message: impl Into<String>) -> Error {
    if unique_violation(&err).is_some() {
        Error::Conflict(message.into())
    } else {
        Error::Database(err)
    }
}

/// Opens a transaction, it rolls back when dropped without [`commit`].
pub async fn begin(pool: &Pool) -> Result<Trans<'static>> {
    Ok(pool.begin().await?)
}

pub async fn commit(trans: Trans<'_>) -> Result<()> {
    Ok(trans.commit().await?)
}

pub async fn applied_migrations(pool: &Pool) -> Result<i64> {
    let applied = sqlx::query_scalar("SELECT COUNT(1) FROM _sqlx_migrations WHERE success = TRUE")
        .fetch_one(pool)
        .await?;

    Ok(applied)
}

#[tracing::instrument(err)]
pub async fn init_database_connection(database: &str) -> Result<Pool> {
    static MIGRATOR: Migrator = sqlx::migrate!();

    let options = SqliteConnectOptions::from_str(database)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    let pool = if database.contains(":memory:") {
        // every connection to `:memory:` opens a fresh database, so keep exactly one alive
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new().connect_with(options).await?
    };

    tracing::debug!("running migrations");

    MIGRATOR.run(&pool).await?;

    Ok(pool)
}

#[cfg(test)]
pub(crate) async fn test_pool() -> Pool {
    init_database_connection("sqlite::memory:")
        .await
        .expect("in-memory database")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn migrations_create_all_tables() {
        let pool = test_pool().await;

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('users', 'stories', 'chapters') ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        assert_eq!(tables, vec!["chapters", "stories", "users"]);
    }

    #[tokio::test]
    async fn migrations_are_recorded() {
        let pool = test_pool().await;

        assert_eq!(applied_migrations(&pool).await.unwrap(), 1);
    }

    #[test]
    fn not_found_reads_like_a_message() {
        assert_eq!(Error::NotFound(Entity::User).to_string(), "User cannot be found");
        assert_eq!(Error::NotFound(Entity::Chapter).to_string(), "Chapter cannot be found");
    }
}
