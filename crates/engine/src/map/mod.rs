mod json;
mod model;

pub use json::{parse_map_document, MapJsonError, RawLayer, RawMap, RawTileset};
pub use model::{MapLayer, MapModel, MapStructureError, TileSize, TopTile, EMPTY_TILE};
