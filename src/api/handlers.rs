//! API handlers
//!
//! Failures are answered with a bare status code; the cause is logged and
//! never returned to the caller.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::api::AppState;
use crate::types::{Album, CreatedAlbum, NewAlbum};

/// Liveness probe. Never touches the store.
pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Fetch a single album by id
#[tracing::instrument(skip_all, fields(album_id = %id))]
pub async fn get_album(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Album>, StatusCode> {
    tracing::info!("get_album started");

    let album = state.store.get_album(&id).await.map_err(|e| {
        tracing::error!(error = %e, "get_album failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    match album {
        Some(album) => {
            tracing::info!(title = %album.title, artist = %album.artist, "get_album completed");
            Ok(Json(album))
        }
        None => {
            tracing::info!("album not found");
            Err(StatusCode::NOT_FOUND)
        }
    }
}

/// Create an album and return the id the store assigned to it
///
/// The body is parsed as JSON whatever its `Content-Type`; only a body that
/// does not deserialize into [`NewAlbum`] is a 400.
#[tracing::instrument(skip_all)]
pub async fn create_album(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<CreatedAlbum>), StatusCode> {
    tracing::info!("create_album started");

    let album: NewAlbum = serde_json::from_slice(&body).map_err(|e| {
        tracing::error!(error = %e, "create_album rejected body");
        StatusCode::BAD_REQUEST
    })?;

    let id = state.store.create_album(&album).await.map_err(|e| {
        tracing::error!(error = %e, "create_album failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    tracing::info!(id, "create_album completed");
    Ok((StatusCode::CREATED, Json(CreatedAlbum { id })))
}
