use std::sync::Arc;

use crate::map::{TileSize, EMPTY_TILE};

use super::image::TileImage;

/// Flat collection of tile images addressed by global tile id.
///
/// Index 0 is the reserved empty tile and always resolves, even for a map
/// with no tilesets at all; gids with no backing sheet fall back to it too.
#[derive(Debug, Clone)]
pub struct TileImageStore {
    tiles: Vec<Option<Arc<TileImage>>>,
    empty: Arc<TileImage>,
}

impl TileImageStore {
    pub fn new(tile_size: TileSize) -> Self {
        Self {
            tiles: Vec::new(),
            empty: Arc::new(TileImage::transparent(tile_size.width, tile_size.height)),
        }
    }

    pub(crate) fn insert(&mut self, gid: u32, tile: TileImage) {
        if gid == EMPTY_TILE {
            return;
        }
        let index = gid as usize;
        if index >= self.tiles.len() {
            self.tiles.resize(index + 1, None);
        }
        self.tiles[index] = Some(Arc::new(tile));
    }

    /// Image for a gid; the empty tile for gid 0 and for unmapped gids.
    pub fn get(&self, gid: u32) -> &Arc<TileImage> {
        self.tiles
            .get(gid as usize)
            .and_then(|slot| slot.as_ref())
            .unwrap_or(&self.empty)
    }

    pub fn empty_tile(&self) -> &Arc<TileImage> {
        &self.empty
    }

    /// Number of gids backed by a real sheet slice.
    pub fn tile_count(&self) -> usize {
        self.tiles.iter().filter(|slot| slot.is_some()).count()
    }
}
