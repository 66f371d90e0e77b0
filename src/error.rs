use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value};
use thiserror::Error;

/// Failures raised by a `SongStore` adapter.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("could not encode document: {0}")]
    Encode(#[from] mongodb::bson::ser::Error),

    #[error("could not decode document: {0}")]
    Decode(String),
}

/// Per-request failures of the catalog endpoints.
///
/// Every variant renders as a JSON object with a single human readable field.
/// The field name is part of the public contract (`error`, `message` or
/// `Message`), see `body_key`.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Invalid ID format. Must be an integer.")]
    MalformedIdentifier,

    #[error("Missing 'id' in request body")]
    MissingIdentifier,

    #[error("{0}")]
    MalformedBody(String),

    #[error("song with id '{0}' not found")]
    SongNotFound(String),

    #[error("song not found")]
    NotFound,

    #[error("song with id {0} already present")]
    AlreadyExists(i64),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CatalogError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MalformedIdentifier | Self::MissingIdentifier | Self::MalformedBody(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::SongNotFound(_) | Self::NotFound => StatusCode::NOT_FOUND,
            Self::AlreadyExists(_) => StatusCode::CONFLICT,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body_key(&self) -> &'static str {
        match self {
            Self::SongNotFound(_) | Self::NotFound => "message",
            Self::AlreadyExists(_) => "Message",
            _ => "error",
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let mut body = Map::new();
        body.insert(self.body_key().to_string(), Value::String(self.to_string()));
        (self.status(), Json(Value::Object(body))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_uses_capitalised_message_key() {
        let err = CatalogError::AlreadyExists(7);
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.body_key(), "Message");
        assert_eq!(err.to_string(), "song with id 7 already present");
    }

    #[test]
    fn not_found_variants_map_to_404() {
        assert_eq!(CatalogError::NotFound.status(), StatusCode::NOT_FOUND);
        let err = CatalogError::SongNotFound("007".to_string());
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "song with id '007' not found");
    }

    #[test]
    fn store_failures_pass_message_through() {
        let err = CatalogError::from(StoreError::Decode("bad _id".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body_key(), "error");
        assert_eq!(err.to_string(), "could not decode document: bad _id");
    }
}
