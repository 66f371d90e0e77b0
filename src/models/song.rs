use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CatalogError;

/// A catalog record: the application level integer `id` plus whatever other
/// fields the client sent. `_id` is the store's own identifier, always a
/// string on the wire.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Song {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub store_id: Option<String>,
    pub id: i64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Song {
    pub fn new(id: i64, fields: Map<String, Value>) -> Self {
        Song {
            store_id: None,
            id,
            fields,
        }
    }

    /// Coerces a create payload (or seed entry) into a `Song`.
    ///
    /// A client supplied `_id` is dropped so the store can assign its own.
    pub fn from_payload(payload: Value) -> Result<Self, CatalogError> {
        let Value::Object(mut fields) = payload else {
            return Err(CatalogError::MalformedBody(
                "Request body must be a JSON object".to_string(),
            ));
        };
        fields.remove("_id");
        let id = match fields.remove("id") {
            Some(raw) => coerce_id(&raw)?,
            None => return Err(CatalogError::MissingIdentifier),
        };
        Ok(Song::new(id, fields))
    }

    /// Shallow merge: every named field overwrites, the rest is kept.
    pub fn merge(&mut self, update: SongUpdate) {
        for (key, value) in update.0 {
            if key == "id" {
                if let Some(id) = value.as_i64() {
                    self.id = id;
                }
                continue;
            }
            self.fields.insert(key, value);
        }
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

/// The set of fields a `PUT /song/{id}` merges into an existing record.
#[derive(Clone, Debug, PartialEq)]
pub struct SongUpdate(Map<String, Value>);

impl SongUpdate {
    pub fn from_payload(payload: Value) -> Result<Self, CatalogError> {
        let mut fields = match payload {
            Value::Object(fields) => fields,
            _ => return Err(no_payload()),
        };
        fields.remove("_id");
        if let Some(raw) = fields.get("id") {
            let id = coerce_id(raw)?;
            fields.insert("id".to_string(), Value::from(id));
        }
        if fields.is_empty() {
            return Err(no_payload());
        }
        Ok(SongUpdate(fields))
    }

    /// The `id` the record is being moved to, if the update names one.
    pub fn id(&self) -> Option<i64> {
        self.0.get("id").and_then(Value::as_i64)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

fn no_payload() -> CatalogError {
    CatalogError::MalformedBody("No JSON payload provided".to_string())
}

/// Accepts integers, integral floats and strings holding an integer.
pub fn coerce_id(raw: &Value) -> Result<i64, CatalogError> {
    match raw {
        Value::Number(n) => {
            if let Some(id) = n.as_i64() {
                return Ok(id);
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
                    Ok(f as i64)
                }
                _ => Err(CatalogError::MalformedIdentifier),
            }
        }
        Value::String(s) => parse_id(s),
        _ => Err(CatalogError::MalformedIdentifier),
    }
}

pub fn parse_id(raw: &str) -> Result<i64, CatalogError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| CatalogError::MalformedIdentifier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_id_is_coerced_from_string() {
        let song = Song::from_payload(json!({"id": "42", "title": "T"})).unwrap();
        assert_eq!(song.id, 42);
        assert_eq!(song.field("title"), Some(&json!("T")));
        assert!(song.field("id").is_none());
    }

    #[test]
    fn payload_accepts_integral_float() {
        let song = Song::from_payload(json!({"id": 7.0})).unwrap();
        assert_eq!(song.id, 7);
        assert!(matches!(
            Song::from_payload(json!({"id": 7.5})),
            Err(CatalogError::MalformedIdentifier)
        ));
    }

    #[test]
    fn payload_without_id_is_rejected() {
        assert!(matches!(
            Song::from_payload(json!({"title": "T"})),
            Err(CatalogError::MissingIdentifier)
        ));
        assert!(matches!(
            Song::from_payload(json!({"id": "abc"})),
            Err(CatalogError::MalformedIdentifier)
        ));
        assert!(matches!(
            Song::from_payload(json!([1, 2])),
            Err(CatalogError::MalformedBody(_))
        ));
    }

    #[test]
    fn client_store_id_is_ignored() {
        let song = Song::from_payload(json!({"id": 1, "_id": "abc"})).unwrap();
        assert_eq!(song.store_id, None);
        assert!(song.field("_id").is_none());
    }

    #[test]
    fn merge_overwrites_named_fields_only() {
        let mut song = Song::from_payload(json!({"id": 1, "title": "A", "artist": "X"})).unwrap();
        song.merge(SongUpdate::from_payload(json!({"title": "B"})).unwrap());
        assert_eq!(song.id, 1);
        assert_eq!(song.field("title"), Some(&json!("B")));
        assert_eq!(song.field("artist"), Some(&json!("X")));
    }

    #[test]
    fn empty_update_is_rejected() {
        assert!(SongUpdate::from_payload(json!({})).is_err());
        assert!(SongUpdate::from_payload(json!({"_id": "x"})).is_err());
        assert!(SongUpdate::from_payload(Value::Null).is_err());
    }

    #[test]
    fn update_id_is_normalised() {
        let update = SongUpdate::from_payload(json!({"id": "9"})).unwrap();
        assert_eq!(update.fields().get("id"), Some(&json!(9)));
        assert_eq!(update.id(), Some(9));
        assert_eq!(SongUpdate::from_payload(json!({"title": "B"})).unwrap().id(), None);
    }

    #[test]
    fn serializes_store_id_as_string() {
        let mut song = Song::from_payload(json!({"id": 42, "title": "T"})).unwrap();
        song.store_id = Some("65a0c0ffee00000000000001".to_string());
        let value = serde_json::to_value(&song).unwrap();
        assert_eq!(
            value,
            json!({"_id": "65a0c0ffee00000000000001", "id": 42, "title": "T"})
        );
    }
}
