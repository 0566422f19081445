use thiserror::Error;

use super::json::{RawLayer, RawMap};

/// The reserved gid for "nothing here"; always resolves to a transparent tile.
pub const EMPTY_TILE: u32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileSize {
    pub width: u32,
    pub height: u32,
}

/// One tile-grid layer, row-major, read-only once loaded.
#[derive(Debug, Clone)]
pub struct MapLayer {
    name: String,
    width: u32,
    height: u32,
    data: Vec<u32>,
}

impl MapLayer {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Gid at (x, y), or [`EMPTY_TILE`] outside the layer extent. Out-of-range
    /// lookups are a normal, frequent case at world edges and buffer margins.
    pub fn gid_at(&self, x: i32, y: i32) -> u32 {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return EMPTY_TILE;
        }
        let index = y as usize * self.width as usize + x as usize;
        self.data.get(index).copied().unwrap_or(EMPTY_TILE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopTile {
    pub gid: u32,
    pub layer_index: usize,
}

#[derive(Debug, Error)]
pub enum MapStructureError {
    #[error("map has no `bg` layer and no `layer<N>` layers")]
    NoBackgroundLayer,
    #[error("layer `{name}` declares {width}x{height} but carries {actual} tiles")]
    LayerSizeMismatch {
        name: String,
        width: u32,
        height: u32,
        actual: usize,
    },
}

/// Parsed tile-grid data: tile size plus one or more stacked layers.
///
/// Layer selection by name convention: a single layer named `"bg"`, or a
/// stack of layers named `layer0`..`layer9` ordered by their digit. The stack
/// order is the draw order; [`MapModel::top_tile_at`] resolves occlusion with
/// the highest index winning.
#[derive(Debug, Clone)]
pub struct MapModel {
    tile_size: TileSize,
    layers: Vec<MapLayer>,
    player_layer: usize,
}

impl MapModel {
    pub fn from_document(raw: &RawMap) -> Result<Self, MapStructureError> {
        let tile_size = TileSize {
            width: raw.tilewidth,
            height: raw.tileheight,
        };

        let mut stacked: Vec<(u8, &RawLayer)> = raw
            .layers
            .iter()
            .filter_map(|layer| stacking_index(&layer.name).map(|n| (n, layer)))
            .collect();
        stacked.sort_by_key(|(n, _)| *n);

        let selected: Vec<&RawLayer> = if stacked.is_empty() {
            raw.layers
                .iter()
                .filter(|layer| layer.name == "bg")
                .take(1)
                .collect()
        } else {
            stacked.into_iter().map(|(_, layer)| layer).collect()
        };

        if selected.is_empty() {
            return Err(MapStructureError::NoBackgroundLayer);
        }

        let mut layers = Vec::with_capacity(selected.len());
        for raw_layer in selected {
            let expected = raw_layer.width as usize * raw_layer.height as usize;
            if raw_layer.data.len() != expected {
                return Err(MapStructureError::LayerSizeMismatch {
                    name: raw_layer.name.clone(),
                    width: raw_layer.width,
                    height: raw_layer.height,
                    actual: raw_layer.data.len(),
                });
            }
            layers.push(MapLayer {
                name: raw_layer.name.clone(),
                width: raw_layer.width,
                height: raw_layer.height,
                data: raw_layer.data.clone(),
            });
        }

        Ok(Self {
            tile_size,
            layers,
            player_layer: 0,
        })
    }

    pub fn tile_size(&self) -> TileSize {
        self.tile_size
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn layers(&self) -> &[MapLayer] {
        &self.layers
    }

    /// Index of the layer the player currently occupies. Layers above it are
    /// classified as foreground and drawn over the player.
    pub fn player_layer(&self) -> usize {
        self.player_layer
    }

    pub fn set_player_layer(&mut self, layer_index: usize) {
        self.player_layer = layer_index.min(self.layers.len().saturating_sub(1));
    }

    /// Gid on a given layer, or [`EMPTY_TILE`] for out-of-range coordinates or
    /// an unknown layer index. Never panics.
    pub fn tile_at(&self, layer_index: usize, x: i32, y: i32) -> u32 {
        self.layers
            .get(layer_index)
            .map(|layer| layer.gid_at(x, y))
            .unwrap_or(EMPTY_TILE)
    }

    /// The topmost non-empty tile at (x, y), scanning from the highest layer
    /// downward; later-defined layers occlude earlier ones.
    pub fn top_tile_at(&self, x: i32, y: i32) -> Option<TopTile> {
        for (layer_index, layer) in self.layers.iter().enumerate().rev() {
            let gid = layer.gid_at(x, y);
            if gid != EMPTY_TILE {
                return Some(TopTile { gid, layer_index });
            }
        }
        None
    }

    /// Topmost non-empty gid among layers at or below the player layer.
    pub fn ground_gid(&self, x: i32, y: i32) -> u32 {
        for layer in self.layers[..=self.player_layer.min(self.layers.len() - 1)]
            .iter()
            .rev()
        {
            let gid = layer.gid_at(x, y);
            if gid != EMPTY_TILE {
                return gid;
            }
        }
        EMPTY_TILE
    }

    /// Topmost non-empty gid among layers strictly above the player layer;
    /// [`EMPTY_TILE`] when no foreground layer covers the cell.
    pub fn overlay_gid(&self, x: i32, y: i32) -> u32 {
        if self.player_layer + 1 >= self.layers.len() {
            return EMPTY_TILE;
        }
        for layer in self.layers[self.player_layer + 1..].iter().rev() {
            let gid = layer.gid_at(x, y);
            if gid != EMPTY_TILE {
                return gid;
            }
        }
        EMPTY_TILE
    }
}

/// `layer<N>` with a single-digit stacking index.
fn stacking_index(name: &str) -> Option<u8> {
    let digits = name.strip_prefix("layer")?;
    if digits.len() != 1 {
        return None;
    }
    digits.chars().next()?.to_digit(10).map(|n| n as u8)
}

#[cfg(test)]
mod tests {
    use super::super::json::parse_map_document;
    use super::*;

    fn layer_json(name: &str, data: &[u32]) -> String {
        format!(
            r#"{{ "name": "{name}", "width": 2, "height": 2, "data": {data:?} }}"#
        )
    }

    fn map_with_layers(layers: &[String]) -> MapModel {
        let text = format!(
            r#"{{ "tilewidth": 16, "tileheight": 16, "layers": [{}] }}"#,
            layers.join(",")
        );
        let raw = parse_map_document(&text).expect("parse");
        MapModel::from_document(&raw).expect("model")
    }

    #[test]
    fn bg_layer_is_selected_when_no_stack_exists() {
        let model = map_with_layers(&[
            layer_json("decoration", &[9, 9, 9, 9]),
            layer_json("bg", &[1, 2, 3, 4]),
        ]);
        assert_eq!(model.layer_count(), 1);
        assert_eq!(model.tile_at(0, 1, 1), 4);
    }

    #[test]
    fn stacked_layers_are_ordered_by_digit() {
        let model = map_with_layers(&[
            layer_json("layer1", &[0, 5, 0, 0]),
            layer_json("layer0", &[1, 1, 1, 1]),
        ]);
        assert_eq!(model.layer_count(), 2);
        assert_eq!(model.tile_at(0, 0, 0), 1);
        assert_eq!(model.tile_at(1, 1, 0), 5);
    }

    #[test]
    fn top_tile_prefers_the_highest_nonzero_layer() {
        let model = map_with_layers(&[
            layer_json("layer0", &[1, 1, 1, 1]),
            layer_json("layer1", &[0, 5, 0, 0]),
        ]);
        assert_eq!(
            model.top_tile_at(1, 0),
            Some(TopTile {
                gid: 5,
                layer_index: 1
            })
        );
        assert_eq!(
            model.top_tile_at(0, 0),
            Some(TopTile {
                gid: 1,
                layer_index: 0
            })
        );
    }

    #[test]
    fn ground_and_overlay_split_on_the_player_layer() {
        let mut model = map_with_layers(&[
            layer_json("layer0", &[1, 1, 1, 1]),
            layer_json("layer1", &[0, 5, 0, 0]),
        ]);
        model.set_player_layer(0);
        assert_eq!(model.ground_gid(1, 0), 1);
        assert_eq!(model.overlay_gid(1, 0), 5);
        assert_eq!(model.overlay_gid(0, 1), EMPTY_TILE);

        model.set_player_layer(1);
        assert_eq!(model.ground_gid(1, 0), 5);
        assert_eq!(model.overlay_gid(1, 0), EMPTY_TILE);
    }

    #[test]
    fn out_of_bounds_lookup_resolves_to_the_empty_tile() {
        let model = map_with_layers(&[layer_json("bg", &[1, 2, 3, 4])]);
        assert_eq!(model.tile_at(0, -1, 0), EMPTY_TILE);
        assert_eq!(model.tile_at(0, 0, -1), EMPTY_TILE);
        assert_eq!(model.tile_at(0, 2, 0), EMPTY_TILE);
        assert_eq!(model.tile_at(0, 0, 2), EMPTY_TILE);
        assert_eq!(model.tile_at(7, 0, 0), EMPTY_TILE);
        assert_eq!(model.top_tile_at(50, 50), None);
    }

    #[test]
    fn missing_background_layer_is_a_structure_error() {
        let raw = parse_map_document(
            r#"{ "tilewidth": 16, "tileheight": 16, "layers": [
                { "name": "props", "width": 1, "height": 1, "data": [1] }
            ] }"#,
        )
        .expect("parse");
        assert!(matches!(
            MapModel::from_document(&raw),
            Err(MapStructureError::NoBackgroundLayer)
        ));
    }

    #[test]
    fn layer_size_mismatch_is_a_structure_error() {
        let raw = parse_map_document(
            r#"{ "tilewidth": 16, "tileheight": 16, "layers": [
                { "name": "bg", "width": 2, "height": 2, "data": [1, 2, 3] }
            ] }"#,
        )
        .expect("parse");
        assert!(matches!(
            MapModel::from_document(&raw),
            Err(MapStructureError::LayerSizeMismatch { .. })
        ));
    }
}
