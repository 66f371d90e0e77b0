use std::sync::Arc;

use axum::{
    extract::Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use tracing::{error, info};

use crate::{
    db::SongStore,
    error::CatalogError,
    models::song::{Song, SongUpdate, parse_id},
};

/// Request semantics of the `/count` and `/song` endpoints. Cheap to clone:
/// every clone shares the one store handle.
#[derive(Clone)]
pub struct SongController {
    store: Arc<dyn SongStore>,
}

impl SongController {
    pub fn new(store: Arc<dyn SongStore>) -> Self {
        SongController { store }
    }

    pub async fn count(&self) -> Result<Response, CatalogError> {
        let count = self
            .store
            .count()
            .await
            .inspect_err(|e| error!("Failed to count songs: {}", e))?;
        Ok((StatusCode::OK, Json(json!({ "count": count }))).into_response())
    }

    pub async fn list_songs(&self) -> Result<Response, CatalogError> {
        let songs = self
            .store
            .list()
            .await
            .inspect_err(|e| error!("Failed to list songs: {}", e))?;
        Ok((StatusCode::OK, Json(json!({ "songs": songs }))).into_response())
    }

    pub async fn get_song(&self, raw_id: &str) -> Result<Response, CatalogError> {
        let id = parse_id(raw_id)?;
        let song = self
            .store
            .find(id)
            .await
            .inspect_err(|e| error!("Error fetching song with id {}: {}", id, e))?
            .ok_or_else(|| CatalogError::SongNotFound(raw_id.to_string()))?;
        Ok((StatusCode::OK, Json(song)).into_response())
    }

    /// Existence check then insert. Two concurrent creates of the same id can
    /// both pass the check; nothing in the store enforces uniqueness.
    pub async fn create_song(&self, payload: Value) -> Result<Response, CatalogError> {
        let song = Song::from_payload(payload)?;
        let id = song.id;

        let existing = self
            .store
            .find(id)
            .await
            .inspect_err(|e| error!("Error creating song with id {}: {}", id, e))?;
        if existing.is_some() {
            return Err(CatalogError::AlreadyExists(id));
        }

        let inserted_id = self
            .store
            .insert(song)
            .await
            .inspect_err(|e| error!("Error creating song with id {}: {}", id, e))?;
        info!("Created song {} as {}", id, inserted_id);
        Ok((StatusCode::CREATED, Json(json!({ "inserted_id": inserted_id }))).into_response())
    }

    /// Moving a record to another `id` is refused when that `id` is taken,
    /// the same existence check `create_song` makes.
    pub async fn update_song(&self, id: i64, payload: Value) -> Result<Response, CatalogError> {
        let update = SongUpdate::from_payload(payload)?;
        if let Some(new_id) = update.id().filter(|new_id| *new_id != id) {
            let existing = self
                .store
                .find(new_id)
                .await
                .inspect_err(|e| error!("Error updating song with id {}: {}", id, e))?;
            if existing.is_some() {
                return Err(CatalogError::AlreadyExists(new_id));
            }
        }
        let song = self
            .store
            .update(id, update)
            .await
            .inspect_err(|e| error!("Error updating song with id {}: {}", id, e))?
            .ok_or(CatalogError::NotFound)?;
        Ok((StatusCode::OK, Json(song)).into_response())
    }

    /// A non-numeric id can never match a record, so it is reported the
    /// same way as a missing one.
    pub async fn delete_song(&self, raw_id: &str) -> Result<Response, CatalogError> {
        let Ok(id) = parse_id(raw_id) else {
            return Err(CatalogError::NotFound);
        };
        let deleted = self
            .store
            .delete(id)
            .await
            .inspect_err(|e| error!("Error deleting song with id {}: {}", id, e))?;
        if !deleted {
            return Err(CatalogError::NotFound);
        }
        info!("Deleted song {}", id);
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
