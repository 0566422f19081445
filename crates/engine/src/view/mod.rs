mod buffer;
mod ring;
mod viewport;

pub use buffer::{BufferStats, EdgeGaps, TileBuffer, TileCell};
pub use ring::RingGrid;
pub use viewport::{MoveProgress, MovementState, View, ViewportController};
