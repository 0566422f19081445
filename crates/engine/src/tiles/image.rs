use image::RgbaImage;

/// An owned RGBA8 tile image, sliced out of a tileset sheet (or synthesized
/// for the reserved empty tile). Pixel data is tightly packed row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileImage {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl TileImage {
    /// Fully transparent tile, used for gid 0 and unmapped gids.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            rgba: vec![0; width as usize * height as usize * 4],
        }
    }

    /// Wraps raw RGBA bytes; `None` when the byte count does not match the
    /// dimensions.
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        if rgba.len() != width as usize * height as usize * 4 {
            return None;
        }
        Some(Self {
            width,
            height,
            rgba,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }
}

/// Slices a sheet into `floor(sheetW/tileW) x floor(sheetH/tileH)` tiles in
/// row-major order. Trailing pixels that do not fill a whole tile are ignored.
pub fn slice_sheet(sheet: &RgbaImage, tile_width: u32, tile_height: u32) -> Vec<TileImage> {
    if tile_width == 0 || tile_height == 0 {
        return Vec::new();
    }
    let columns = sheet.width() / tile_width;
    let rows = sheet.height() / tile_height;
    let mut tiles = Vec::with_capacity(columns as usize * rows as usize);
    for row in 0..rows {
        for column in 0..columns {
            let view = image::imageops::crop_imm(
                sheet,
                column * tile_width,
                row * tile_height,
                tile_width,
                tile_height,
            );
            tiles.push(TileImage {
                width: tile_width,
                height: tile_height,
                rgba: view.to_image().into_raw(),
            });
        }
    }
    tiles
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn sheet_with_corner_markers(width: u32, height: u32) -> RgbaImage {
        let mut sheet = RgbaImage::new(width, height);
        for (x, y, pixel) in sheet.enumerate_pixels_mut() {
            *pixel = Rgba([x as u8, y as u8, 0, 255]);
        }
        sheet
    }

    #[test]
    fn slices_row_major() {
        let sheet = sheet_with_corner_markers(40, 40);
        let tiles = slice_sheet(&sheet, 20, 20);
        assert_eq!(tiles.len(), 4);
        // Tile 1 is the top-right quadrant; its first pixel sits at sheet (20, 0).
        assert_eq!(&tiles[1].rgba()[..4], &[20, 0, 0, 255]);
        // Tile 2 is the bottom-left quadrant.
        assert_eq!(&tiles[2].rgba()[..4], &[0, 20, 0, 255]);
    }

    #[test]
    fn partial_trailing_pixels_are_ignored() {
        let sheet = sheet_with_corner_markers(50, 20);
        let tiles = slice_sheet(&sheet, 20, 20);
        assert_eq!(tiles.len(), 2);
    }

    #[test]
    fn transparent_tile_is_fully_clear() {
        let tile = TileImage::transparent(4, 4);
        assert_eq!(tile.rgba().len(), 64);
        assert!(tile.rgba().iter().all(|byte| *byte == 0));
    }

    #[test]
    fn from_rgba_rejects_mismatched_lengths() {
        assert!(TileImage::from_rgba(2, 2, vec![0; 16]).is_some());
        assert!(TileImage::from_rgba(2, 2, vec![0; 15]).is_none());
    }
}
