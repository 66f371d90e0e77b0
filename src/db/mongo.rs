use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    Client, Collection,
    bson::{Bson, Document, doc},
    options::{ClientOptions, ReturnDocument},
};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::db::SongStore;
use crate::error::StoreError;
use crate::models::song::{Song, SongUpdate};
use crate::secrets::MongoSettings;

const APP_NAME: &str = "song-catalog";

/// MongoDB backed `SongStore`. Cloning shares the underlying connection pool.
#[derive(Clone)]
pub struct Database {
    collection: Collection<Document>,
}

impl Database {
    /// Connects and pings the server, so bad credentials or an unreachable
    /// host fail here rather than on the first request.
    pub async fn connect(settings: &MongoSettings) -> Result<Self, StoreError> {
        debug!("MONGODB_URL={}", settings.redacted_url());

        let mut options = ClientOptions::parse(settings.connection_url()).await?;
        options.app_name = Some(APP_NAME.to_string());
        options.connect_timeout = Some(settings.connect_timeout);
        options.server_selection_timeout = Some(settings.server_selection_timeout);

        let client = Client::with_options(options)?;
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;
        info!(
            "Connected to MongoDB at {} ({}.{})",
            settings.redacted_url(),
            settings.database,
            settings.collection
        );

        let collection = client
            .database(&settings.database)
            .collection::<Document>(&settings.collection);
        Ok(Self { collection })
    }
}

#[async_trait]
impl SongStore for Database {
    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.collection.count_documents(doc! {}).await?)
    }

    async fn list(&self) -> Result<Vec<Song>, StoreError> {
        let cursor = self.collection.find(doc! {}).await?;
        let documents: Vec<Document> = cursor.try_collect().await?;
        documents.into_iter().map(from_document).collect()
    }

    async fn find(&self, id: i64) -> Result<Option<Song>, StoreError> {
        self.collection
            .find_one(doc! { "id": id })
            .await?
            .map(from_document)
            .transpose()
    }

    async fn insert(&self, song: Song) -> Result<String, StoreError> {
        let result = self.collection.insert_one(to_document(&song)?).await?;
        Ok(bson_id_to_string(result.inserted_id))
    }

    async fn update(&self, id: i64, update: SongUpdate) -> Result<Option<Song>, StoreError> {
        let set = fields_to_document(update.fields())?;
        self.collection
            .find_one_and_update(doc! { "id": id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?
            .map(from_document)
            .transpose()
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn reset(&self, seed: Vec<Song>) -> Result<(), StoreError> {
        self.collection.drop().await?;
        if seed.is_empty() {
            return Ok(());
        }
        let documents = seed
            .iter()
            .map(to_document)
            .collect::<Result<Vec<_>, _>>()?;
        self.collection.insert_many(documents).await?;
        Ok(())
    }
}

fn fields_to_document(fields: &Map<String, Value>) -> Result<Document, StoreError> {
    let mut document = Document::new();
    for (key, value) in fields {
        document.insert(key.clone(), mongodb::bson::to_bson(value)?);
    }
    Ok(document)
}

/// `_id` is left out so the server assigns one.
fn to_document(song: &Song) -> Result<Document, StoreError> {
    let mut document = doc! { "id": song.id };
    for (key, value) in &song.fields {
        document.insert(key.clone(), mongodb::bson::to_bson(value)?);
    }
    Ok(document)
}

fn from_document(mut document: Document) -> Result<Song, StoreError> {
    let store_id = document.remove("_id").map(bson_id_to_string);
    let id = match document.remove("id") {
        Some(Bson::Int32(id)) => i64::from(id),
        Some(Bson::Int64(id)) => id,
        Some(Bson::Double(id)) if id.fract() == 0.0 => id as i64,
        other => {
            return Err(StoreError::Decode(format!(
                "record {} has no integer id (found {:?})",
                store_id.as_deref().unwrap_or("<unknown>"),
                other
            )));
        }
    };
    let fields = document
        .into_iter()
        .map(|(key, value)| (key, value.into_relaxed_extjson()))
        .collect();
    Ok(Song {
        store_id,
        id,
        fields,
    })
}

fn bson_id_to_string(id: Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s,
        other => other.to_string(),
    }
}
