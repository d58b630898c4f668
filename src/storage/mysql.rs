//! MySQL storage backend

use std::time::Duration;

use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use tracing::info;

use crate::config::DatabaseRuntime;
use crate::types::{Album, AlbumId, NewAlbum};
use crate::{Error, Result};

use super::AlbumStore;

const CREATE_ALBUM_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS album (
    id     INT AUTO_INCREMENT NOT NULL,
    title  VARCHAR(128) NOT NULL,
    artist VARCHAR(255) NOT NULL,
    price  DECIMAL(5,2) NOT NULL,
    PRIMARY KEY (`id`)
)
"#;

/// Album store backed by a MySQL connection pool
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    /// Open a pool and verify the server is reachable
    pub async fn connect(runtime: &DatabaseRuntime) -> Result<Self> {
        let mut options = MySqlConnectOptions::new()
            .host(&runtime.host)
            .port(runtime.port)
            .username(&runtime.user)
            .database(&runtime.database);
        if let Some(password) = &runtime.password {
            options = options.password(password);
        }

        let pool = MySqlPoolOptions::new()
            .max_connections(runtime.max_connections)
            .acquire_timeout(Duration::from_secs(runtime.acquire_timeout_secs))
            .connect_with(options)
            .await?;

        info!(
            host = %runtime.host,
            port = runtime.port,
            database = %runtime.database,
            "Connected to MySQL"
        );

        Ok(Self { pool })
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Create the `album` table if it does not already exist
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(CREATE_ALBUM_TABLE).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl AlbumStore for MySqlStore {
    async fn get_album(&self, id: &str) -> Result<Option<Album>> {
        let album = sqlx::query_as::<_, Album>(
            "SELECT id, title, artist, price FROM album WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(album)
    }

    async fn create_album(&self, album: &NewAlbum) -> Result<AlbumId> {
        let result = sqlx::query("INSERT INTO album (title, artist, price) VALUES (?, ?, ?)")
            .bind(&album.title)
            .bind(&album.artist)
            .bind(album.price)
            .execute(&self.pool)
            .await?;

        let id = result.last_insert_id();
        AlbumId::try_from(id)
            .map_err(|_| Error::internal(format!("store assigned out-of-range id {}", id)))
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
