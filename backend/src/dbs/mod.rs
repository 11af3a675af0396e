use shared::persistence::{BlobPersistence, CharacterPersistence, MemoryBlobStore};
use std::path::PathBuf;
use std::sync::Arc;

pub mod local;
pub mod postgres;

pub use local::FileBlobStore;
pub use postgres::PostgresPersistence;

/// Where the character list is kept between runs.
#[derive(Clone, Debug)]
pub enum DatabaseConfig {
    /// Nothing survives a restart.
    Memory,
    /// JSON blob files in a local directory.
    Local { dir: PathBuf },
    /// A `characters` table in PostgreSQL.
    Postgres { url: String },
}

impl DatabaseConfig {
    pub async fn connect(&self) -> Result<Arc<dyn CharacterPersistence>, sqlx::Error> {
        let persistence: Arc<dyn CharacterPersistence> = match self {
            DatabaseConfig::Memory => Arc::new(BlobPersistence::new(MemoryBlobStore::new())),
            DatabaseConfig::Local { dir } => {
                Arc::new(BlobPersistence::new(FileBlobStore::new(dir.clone())))
            }
            DatabaseConfig::Postgres { url } => Arc::new(PostgresPersistence::connect(url).await?),
        };
        Ok(persistence)
    }
}
