use std::path::{Path, PathBuf};

use sqlx::{
    Pool, Sqlite, SqlitePool,
    migrate::MigrateError,
    sqlite::{SqliteConnectOptions, SqliteJournalMode},
};
use thiserror::Error;
use tracing::info;

pub mod models;

#[derive(Debug, Error)]
pub enum DBServiceError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migrate(#[from] MigrateError),
}

/// Owns the connection pool for the orders file.
#[derive(Clone)]
pub struct DBService {
    pub pool: Pool<Sqlite>,
    path: PathBuf,
}

impl DBService {
    /// Open (creating if missing) the database at `path` and make sure the
    /// `pedidos` table exists.
    pub async fn new(path: impl AsRef<Path>) -> Result<DBService, DBServiceError> {
        let path = path.as_ref().to_path_buf();
        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Delete);
        let pool = SqlitePool::connect_with(options).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;

        info!(path = %path.display(), "Order database ready");
        Ok(DBService { pool, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
