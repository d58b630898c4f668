//! In-process storage backend

use std::collections::BTreeMap;

use async_trait::async_trait;
use rust_decimal::{Decimal, RoundingStrategy};
use tokio::sync::RwLock;

use crate::types::{Album, AlbumId, NewAlbum};
use crate::{Error, Result};

use super::AlbumStore;

// Column shapes of the `album` table
const TITLE_MAX_CHARS: usize = 128;
const ARTIST_MAX_CHARS: usize = 255;
const PRICE_SCALE: u32 = 2;
// 999.99
const PRICE_MAX_UNSCALED: i64 = 99_999;

/// Album table held in memory
///
/// Ids come from an auto-increment counter starting at 1. Rows are held to
/// the same column shapes as the SQL table (`VARCHAR(128)`, `VARCHAR(255)`,
/// `DECIMAL(5,2)`) and fail the way a strict SQL store would: overlong text
/// or an out-of-range price is an error, extra price digits are rounded away,
/// and a lookup with a non-integer id is an error rather than a miss.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Table>,
}

#[derive(Default)]
struct Table {
    next_id: AlbumId,
    rows: BTreeMap<AlbumId, Album>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl AlbumStore for MemoryStore {
    async fn get_album(&self, id: &str) -> Result<Option<Album>> {
        let id: AlbumId = id
            .trim()
            .parse()
            .map_err(|_| Error::store(format!("incorrect integer value: '{}'", id)))?;

        Ok(self.inner.read().await.rows.get(&id).cloned())
    }

    async fn create_album(&self, album: &NewAlbum) -> Result<AlbumId> {
        let row = to_row(album)?;

        let mut table = self.inner.write().await;
        table.next_id += 1;
        let id = table.next_id;
        table.rows.insert(id, Album::from_new(id, row));
        Ok(id)
    }
}

/// Coerce a new album into the table's column shapes
fn to_row(album: &NewAlbum) -> Result<NewAlbum> {
    check_length("title", &album.title, TITLE_MAX_CHARS)?;
    check_length("artist", &album.artist, ARTIST_MAX_CHARS)?;

    let price = album
        .price
        .round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero);
    if price.abs() > Decimal::new(PRICE_MAX_UNSCALED, PRICE_SCALE) {
        return Err(Error::store(format!(
            "out of range value for column 'price': {}",
            album.price
        )));
    }

    Ok(NewAlbum {
        title: album.title.clone(),
        artist: album.artist.clone(),
        price,
    })
}

fn check_length(column: &str, value: &str, max_chars: usize) -> Result<()> {
    if value.chars().count() > max_chars {
        return Err(Error::store(format!("data too long for column '{}'", column)));
    }
    Ok(())
}
