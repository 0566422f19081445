use std::path::PathBuf;

use image::{ImageReader, RgbaImage};
use thiserror::Error;
use tracing::debug;

use crate::map::{RawTileset, TileSize};

use super::image::slice_sheet;
use super::store::TileImageStore;

/// Everything needed to locate and slice one tileset sheet.
#[derive(Debug, Clone)]
pub struct TilesetDescriptor {
    pub image: String,
    pub tile_width: u32,
    pub tile_height: u32,
    pub image_width: u32,
    pub image_height: u32,
    pub first_gid: u32,
}

impl From<&RawTileset> for TilesetDescriptor {
    fn from(raw: &RawTileset) -> Self {
        Self {
            image: raw.image.clone(),
            tile_width: raw.tilewidth,
            tile_height: raw.tileheight,
            image_width: raw.imagewidth,
            image_height: raw.imageheight,
            first_gid: raw.firstgid,
        }
    }
}

#[derive(Debug, Error)]
pub enum TilesetLoadError {
    #[error("failed to read tileset sheet {path}: {source}")]
    Fetch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode tileset sheet {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error(
        "tileset sheet `{image}` is {actual_width}x{actual_height} but the map declares \
         {declared_width}x{declared_height}"
    )]
    SheetSizeMismatch {
        image: String,
        actual_width: u32,
        actual_height: u32,
        declared_width: u32,
        declared_height: u32,
    },
}

/// Source of decoded sheet images. The engine never reaches the filesystem
/// directly, so tests can substitute in-memory sheets.
pub trait SheetFetcher {
    fn fetch(&mut self, image: &str) -> Result<RgbaImage, TilesetLoadError>;
}

/// Resolves sheet names under the asset `img/` directory, per the
/// `img/<tileset.image>` convention.
#[derive(Debug, Clone)]
pub struct DiskSheetFetcher {
    img_dir: PathBuf,
}

impl DiskSheetFetcher {
    pub fn new(img_dir: impl Into<PathBuf>) -> Self {
        Self {
            img_dir: img_dir.into(),
        }
    }
}

impl SheetFetcher for DiskSheetFetcher {
    fn fetch(&mut self, image: &str) -> Result<RgbaImage, TilesetLoadError> {
        let path = self.img_dir.join(image);
        let reader = ImageReader::open(&path).map_err(|source| TilesetLoadError::Fetch {
            path: path.clone(),
            source,
        })?;
        let decoded = reader
            .decode()
            .map_err(|source| TilesetLoadError::Decode { path, source })?;
        Ok(decoded.to_rgba8())
    }
}

/// Loads and slices every sheet, writing slices into a fresh store at
/// `first_gid + local_index`.
///
/// Fan-in contract: the store is returned only once all sheets have loaded;
/// any failure aborts the whole batch and nothing partially populated
/// escapes. With zero descriptors the result still resolves gid 0.
pub fn load_tilesets(
    descriptors: &[TilesetDescriptor],
    fetcher: &mut dyn SheetFetcher,
    tile_size: TileSize,
) -> Result<TileImageStore, TilesetLoadError> {
    let mut store = TileImageStore::new(tile_size);
    for descriptor in descriptors {
        let sheet = fetcher.fetch(&descriptor.image)?;
        if sheet.width() != descriptor.image_width || sheet.height() != descriptor.image_height {
            return Err(TilesetLoadError::SheetSizeMismatch {
                image: descriptor.image.clone(),
                actual_width: sheet.width(),
                actual_height: sheet.height(),
                declared_width: descriptor.image_width,
                declared_height: descriptor.image_height,
            });
        }
        let tiles = slice_sheet(&sheet, descriptor.tile_width, descriptor.tile_height);
        let tile_count = tiles.len();
        for (local_index, tile) in tiles.into_iter().enumerate() {
            store.insert(descriptor.first_gid + local_index as u32, tile);
        }
        debug!(
            image = %descriptor.image,
            first_gid = descriptor.first_gid,
            tile_count,
            "tileset_sliced"
        );
    }
    Ok(store)
}


#[cfg(test)]
mod tests {
    use super::testing::StubFetcher;
    use super::*;

    fn descriptor(image: &str, first_gid: u32, width: u32, height: u32) -> TilesetDescriptor {
        TilesetDescriptor {
            image: image.to_string(),
            tile_width: 20,
            tile_height: 20,
            image_width: width,
            image_height: height,
            first_gid,
        }
    }

    const TILE_SIZE: TileSize = TileSize {
        width: 20,
        height: 20,
    };

    #[test]
    fn slices_land_at_first_gid_plus_local_index() {
        let mut fetcher = StubFetcher::new()
            .with_sheet("a.png", RgbaImage::new(40, 20))
            .with_sheet("b.png", RgbaImage::new(20, 40));
        let descriptors = vec![
            descriptor("a.png", 1, 40, 20),
            descriptor("b.png", 3, 20, 40),
        ];

        let store = load_tilesets(&descriptors, &mut fetcher, TILE_SIZE).expect("load");
        assert_eq!(store.tile_count(), 4);
        for gid in 1..=4 {
            assert!(!std::sync::Arc::ptr_eq(store.get(gid), store.empty_tile()));
        }
        assert!(std::sync::Arc::ptr_eq(store.get(5), store.empty_tile()));
    }

    #[test]
    fn missing_sheet_fails_the_whole_batch() {
        let mut fetcher = StubFetcher::new().with_sheet("a.png", RgbaImage::new(40, 20));
        let descriptors = vec![
            descriptor("a.png", 1, 40, 20),
            descriptor("missing.png", 3, 20, 20),
        ];

        let error = load_tilesets(&descriptors, &mut fetcher, TILE_SIZE).expect_err("must fail");
        assert!(matches!(error, TilesetLoadError::Fetch { .. }));
    }

    #[test]
    fn declared_sheet_size_must_match_the_decoded_image() {
        let mut fetcher = StubFetcher::new().with_sheet("a.png", RgbaImage::new(40, 20));
        let descriptors = vec![descriptor("a.png", 1, 60, 20)];

        let error = load_tilesets(&descriptors, &mut fetcher, TILE_SIZE).expect_err("must fail");
        assert!(matches!(error, TilesetLoadError::SheetSizeMismatch { .. }));
    }

    #[test]
    fn empty_descriptor_list_still_resolves_gid_zero() {
        let mut fetcher = StubFetcher::new();
        let store = load_tilesets(&[], &mut fetcher, TILE_SIZE).expect("load");
        assert_eq!(store.get(0).width(), 20);
        assert_eq!(store.tile_count(), 0);
    }

    #[test]
    fn disk_fetcher_reports_missing_files_as_fetch_errors() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let mut fetcher = DiskSheetFetcher::new(dir.path());
        let error = fetcher.fetch("nope.png").expect_err("must fail");
        assert!(matches!(error, TilesetLoadError::Fetch { .. }));
    }
}
