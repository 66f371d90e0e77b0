use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::song::{Song, SongUpdate};

pub mod memory;
pub mod mongo;

pub use memory::MemoryStore;
pub use mongo::Database;

/// Persistence port for the catalog. Lookups always go through the
/// application `id`, never the store's own `_id`.
#[async_trait]
pub trait SongStore: Send + Sync {
    async fn count(&self) -> Result<u64, StoreError>;

    async fn list(&self) -> Result<Vec<Song>, StoreError>;

    async fn find(&self, id: i64) -> Result<Option<Song>, StoreError>;

    /// Returns the identifier the store assigned to the new record.
    async fn insert(&self, song: Song) -> Result<String, StoreError>;

    /// Applies a shallow merge and returns the record as it is afterwards,
    /// or `None` when nothing matched `id`.
    async fn update(&self, id: i64, update: SongUpdate) -> Result<Option<Song>, StoreError>;

    /// `true` when a record was removed.
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;

    /// Drops every record, then inserts `seed`.
    async fn reset(&self, seed: Vec<Song>) -> Result<(), StoreError>;
}
