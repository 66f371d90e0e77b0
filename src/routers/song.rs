use axum::{
    extract::{Json, Path, State, rejection::JsonRejection},
    response::Response,
};
use serde_json::Value;

use crate::controllers::SongController;
use crate::error::CatalogError;
use crate::models::song::parse_id;

type RouteResult = Result<Response, CatalogError>;

fn body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, CatalogError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| CatalogError::MalformedBody(rejection.body_text()))
}

pub async fn count_route(State(songs): State<SongController>) -> RouteResult {
    songs.count().await
}

pub async fn list_songs_route(State(songs): State<SongController>) -> RouteResult {
    songs.list_songs().await
}

pub async fn get_song_route(
    State(songs): State<SongController>,
    Path(id): Path<String>,
) -> RouteResult {
    songs.get_song(&id).await
}

pub async fn create_song_route(
    State(songs): State<SongController>,
    payload: Result<Json<Value>, JsonRejection>,
) -> RouteResult {
    songs.create_song(body(payload)?).await
}

pub async fn update_song_route(
    State(songs): State<SongController>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> RouteResult {
    let id = parse_id(&id)?;
    songs.update_song(id, body(payload)?).await
}

pub async fn delete_song_route(
    State(songs): State<SongController>,
    Path(id): Path<String>,
) -> RouteResult {
    songs.delete_song(&id).await
}
