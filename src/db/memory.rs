use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::db::SongStore;
use crate::error::StoreError;
use crate::models::song::{Song, SongUpdate};

/// Process local `SongStore`, kept in insertion order.
///
/// Assigned ids are 24 hex digits so they look like the ObjectIds a real
/// document store hands out.
#[derive(Default)]
pub struct MemoryStore {
    songs: RwLock<Vec<Song>>,
    next_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn assign_id(&self, song: &mut Song) -> String {
        let id = format!("{:024x}", self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        song.store_id = Some(id.clone());
        id
    }
}

#[async_trait]
impl SongStore for MemoryStore {
    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.songs.read().await.len() as u64)
    }

    async fn list(&self) -> Result<Vec<Song>, StoreError> {
        Ok(self.songs.read().await.clone())
    }

    async fn find(&self, id: i64) -> Result<Option<Song>, StoreError> {
        let songs = self.songs.read().await;
        Ok(songs.iter().find(|song| song.id == id).cloned())
    }

    async fn insert(&self, mut song: Song) -> Result<String, StoreError> {
        let id = self.assign_id(&mut song);
        self.songs.write().await.push(song);
        Ok(id)
    }

    async fn update(&self, id: i64, update: SongUpdate) -> Result<Option<Song>, StoreError> {
        let mut songs = self.songs.write().await;
        let Some(song) = songs.iter_mut().find(|song| song.id == id) else {
            return Ok(None);
        };
        song.merge(update);
        Ok(Some(song.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let mut songs = self.songs.write().await;
        match songs.iter().position(|song| song.id == id) {
            Some(index) => {
                songs.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn reset(&self, seed: Vec<Song>) -> Result<(), StoreError> {
        let mut songs = self.songs.write().await;
        songs.clear();
        for mut song in seed {
            self.assign_id(&mut song);
            songs.push(song);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn song(payload: serde_json::Value) -> Song {
        Song::from_payload(payload).unwrap()
    }

    #[tokio::test]
    async fn reset_replaces_everything() {
        let store = MemoryStore::new();
        store.insert(song(json!({"id": 99}))).await.unwrap();

        store
            .reset(vec![song(json!({"id": 1})), song(json!({"id": 2}))])
            .await
            .unwrap();

        assert_eq!(store.count().await.unwrap(), 2);
        assert!(store.find(99).await.unwrap().is_none());
        let first = store.find(1).await.unwrap().unwrap();
        assert_eq!(first.store_id.as_deref().map(str::len), Some(24));
    }

    #[tokio::test]
    async fn insert_assigns_distinct_ids() {
        let store = MemoryStore::new();
        let a = store.insert(song(json!({"id": 1}))).await.unwrap();
        let b = store.insert(song(json!({"id": 2}))).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(
            store.find(2).await.unwrap().unwrap().store_id.as_deref(),
            Some(b.as_str())
        );
    }

    #[tokio::test]
    async fn update_returns_post_image() {
        let store = MemoryStore::new();
        store
            .insert(song(json!({"id": 1, "title": "A", "artist": "X"})))
            .await
            .unwrap();

        let update = SongUpdate::from_payload(json!({"title": "B"})).unwrap();
        let updated = store.update(1, update).await.unwrap().unwrap();
        assert_eq!(updated.field("title"), Some(&json!("B")));
        assert_eq!(updated.field("artist"), Some(&json!("X")));

        let missing = SongUpdate::from_payload(json!({"title": "C"})).unwrap();
        assert!(store.update(2, missing).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_reports_whether_anything_matched() {
        let store = MemoryStore::new();
        store.insert(song(json!({"id": 5}))).await.unwrap();
        assert!(store.delete(5).await.unwrap());
        assert!(!store.delete(5).await.unwrap());
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
