use std::fs;
use std::path::Path;

use anyhow::{Context, bail};
use serde_json::Value;
use tracing::info;

use crate::db::SongStore;
use crate::error::StoreError;
use crate::models::song::Song;

/// Reads the seed file: a JSON array of song documents, each needing an
/// integer-coercible `id`.
pub fn load_seed(path: &Path) -> anyhow::Result<Vec<Song>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("could not read seed file {}", path.display()))?;
    let entries: Value = serde_json::from_str(&raw)
        .with_context(|| format!("seed file {} is not valid JSON", path.display()))?;
    let Value::Array(entries) = entries else {
        bail!("seed file {} must hold a JSON array", path.display());
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            Song::from_payload(entry)
                .with_context(|| format!("seed record #{} in {}", index, path.display()))
        })
        .collect()
}

/// Destructive: drops whatever the store holds and inserts `seed`.
pub async fn reset_catalog(store: &dyn SongStore, seed: Vec<Song>) -> Result<usize, StoreError> {
    let inserted = seed.len();
    store.reset(seed).await?;
    info!("🌱 Catalog reset with {} seed songs", inserted);
    Ok(inserted)
}
