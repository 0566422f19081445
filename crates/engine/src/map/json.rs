use serde::Deserialize;
use thiserror::Error;

/// Raw map document as it appears on disk (Tiled-style JSON export).
#[derive(Debug, Deserialize)]
pub struct RawMap {
    pub tilewidth: u32,
    pub tileheight: u32,
    #[serde(default)]
    pub tilesets: Vec<RawTileset>,
    pub layers: Vec<RawLayer>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTileset {
    pub image: String,
    pub tilewidth: u32,
    pub tileheight: u32,
    pub imagewidth: u32,
    pub imageheight: u32,
    pub firstgid: u32,
}

#[derive(Debug, Deserialize)]
pub struct RawLayer {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u32>,
}

#[derive(Debug, Error)]
pub enum MapJsonError {
    #[error("malformed map JSON at `{path}`: {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Parses a map document, reporting the JSON path of the offending value on
/// failure so a broken export is diagnosable from the log line alone.
pub fn parse_map_document(text: &str) -> Result<RawMap, MapJsonError> {
    let mut deserializer = serde_json::Deserializer::from_str(text);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
        let path = error.path().to_string();
        MapJsonError::Malformed {
            path,
            source: error.into_inner(),
        }
    })
}
