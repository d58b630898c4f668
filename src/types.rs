//! Core types for the album service

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Album ID type, assigned by the store on insert
pub type AlbumId = i64;

/// A record album as stored in the `album` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Album {
    pub id: AlbumId,
    pub title: String,
    pub artist: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl Album {
    pub fn from_new(id: AlbumId, album: NewAlbum) -> Self {
        Self {
            id,
            title: album.title,
            artist: album.artist,
            price: album.price,
        }
    }
}

/// Body of a create request. Any caller-supplied `id` is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAlbum {
    pub title: String,
    pub artist: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// Response body of a successful create
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedAlbum {
    pub id: AlbumId,
}
