use std::sync::Arc;

use tracing::debug;

use crate::map::{MapModel, EMPTY_TILE};
use crate::tiles::{TileImage, TileImageStore};

use super::ring::RingGrid;

/// One resident buffer cell: the resolved ground tile plus, when a layer
/// above the player covers the cell, the foreground overlay.
///
/// Cells are reused in place across shifts; `ground` is `None` only before
/// the first reload materializes the cell.
#[derive(Debug, Clone, Default)]
pub struct TileCell {
    pub ground_gid: u32,
    pub overlay_gid: u32,
    pub ground: Option<Arc<TileImage>>,
    pub overlay: Option<Arc<TileImage>>,
}

/// Observable work counters. `cells_resolved` counts individual tile
/// resolutions, which is what distinguishes an O(perimeter) shift from an
/// O(area) reload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferStats {
    pub cells_resolved: u64,
    pub full_reloads: u64,
    pub edge_shifts: u64,
}

/// Per-side distance, in whole tiles, between the view rectangle and the
/// buffer edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeGaps {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl EdgeGaps {
    pub fn min(&self) -> i32 {
        self.left.min(self.top).min(self.right).min(self.bottom)
    }
}

/// The resident-tile region surrounding the view: view extent plus a fixed
/// margin on every side, stored in a [`RingGrid`] so a one-tile view move
/// only ever touches one edge row/column.
#[derive(Debug, Clone)]
pub struct TileBuffer {
    grid: RingGrid<TileCell>,
    margin: i32,
    stats: BufferStats,
}

impl TileBuffer {
    pub fn new(view_width: i32, view_height: i32, margin: i32) -> Self {
        let width = (view_width + margin * 2).max(1) as usize;
        let height = (view_height + margin * 2).max(1) as usize;
        Self {
            grid: RingGrid::new(width, height),
            margin,
            stats: BufferStats::default(),
        }
    }

    pub fn margin(&self) -> i32 {
        self.margin
    }

    pub fn origin(&self) -> (i32, i32) {
        self.grid.origin()
    }

    pub fn width(&self) -> i32 {
        self.grid.width() as i32
    }

    pub fn height(&self) -> i32 {
        self.grid.height() as i32
    }

    pub fn stats(&self) -> BufferStats {
        self.stats
    }

    pub fn cell(&self, x: i32, y: i32) -> Option<&TileCell> {
        self.grid.get(x, y)
    }

    /// Whether the whole rectangle is resident.
    pub fn contains_rect(&self, x: i32, y: i32, width: i32, height: i32) -> bool {
        let (origin_x, origin_y) = self.grid.origin();
        x >= origin_x
            && y >= origin_y
            && x + width <= origin_x + self.width()
            && y + height <= origin_y + self.height()
    }

    pub fn edge_gaps(&self, view_x: i32, view_y: i32, view_width: i32, view_height: i32) -> EdgeGaps {
        let (origin_x, origin_y) = self.grid.origin();
        EdgeGaps {
            left: view_x - origin_x,
            top: view_y - origin_y,
            right: (origin_x + self.width()) - (view_x + view_width),
            bottom: (origin_y + self.height()) - (view_y + view_height),
        }
    }

    /// Full rebuild anchored at a new origin. O(area); reserved for initial
    /// load, discontinuous jumps and threshold recenters.
    pub fn reload(&mut self, origin_x: i32, origin_y: i32, map: &MapModel, store: &TileImageStore) {
        self.grid.set_origin(origin_x, origin_y);
        for y in origin_y..origin_y + self.height() {
            for x in origin_x..origin_x + self.width() {
                self.resolve_cell(x, y, map, store);
            }
        }
        self.stats.full_reloads += 1;
        debug!(
            origin_x,
            origin_y,
            cells = self.width() * self.height(),
            "buffer_reload"
        );
    }

    /// Advances the buffer by one tile along each non-zero axis and resolves
    /// only the newly exposed column and/or row. O(perimeter): sustained
    /// movement in one direction never re-touches resident cells.
    pub fn shift(&mut self, dx: i32, dy: i32, map: &MapModel, store: &TileImageStore) {
        let dx = dx.signum();
        let dy = dy.signum();
        if dx == 0 && dy == 0 {
            return;
        }
        self.grid.advance_origin(dx, dy);
        let (origin_x, origin_y) = self.grid.origin();

        let new_column = if dx > 0 {
            Some(origin_x + self.width() - 1)
        } else if dx < 0 {
            Some(origin_x)
        } else {
            None
        };
        let new_row = if dy > 0 {
            Some(origin_y + self.height() - 1)
        } else if dy < 0 {
            Some(origin_y)
        } else {
            None
        };

        if let Some(column) = new_column {
            for y in origin_y..origin_y + self.height() {
                self.resolve_cell(column, y, map, store);
            }
        }
        if let Some(row) = new_row {
            for x in origin_x..origin_x + self.width() {
                // The corner cell belongs to both edges; resolve it once.
                if Some(x) == new_column {
                    continue;
                }
                self.resolve_cell(x, row, map, store);
            }
        }
        self.stats.edge_shifts += 1;
        debug!(dx, dy, origin_x, origin_y, "edge_shift");
    }

    fn resolve_cell(&mut self, x: i32, y: i32, map: &MapModel, store: &TileImageStore) {
        let ground_gid = map.ground_gid(x, y);
        let overlay_gid = map.overlay_gid(x, y);
        let cell = TileCell {
            ground_gid,
            overlay_gid,
            ground: Some(Arc::clone(store.get(ground_gid))),
            overlay: if overlay_gid == EMPTY_TILE {
                None
            } else {
                Some(Arc::clone(store.get(overlay_gid)))
            },
        };
        self.grid.put(x, y, cell);
        self.stats.cells_resolved += 1;
    }
}
