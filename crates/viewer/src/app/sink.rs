use engine::{RenderLayer, RenderSink, TileImage};
use pixels::{Error, Pixels, SurfaceTexture, TextureError};
use winit::window::Window;

const CLEAR_COLOR: [u8; 4] = [20, 22, 28, 255];
const PLAYER_COLOR: [u8; 4] = [220, 220, 240, 255];

struct QueuedBlit {
    rgba: Vec<u8>,
    width: u32,
    height: u32,
    dest_x: i32,
    dest_y: i32,
}

/// [`RenderSink`] over a fixed-size pixels framebuffer.
///
/// Background tiles are drawn as they arrive; foreground tiles are queued so
/// the player placeholder can be composed between the two, preserving the
/// stacking order background -> player -> foreground.
pub(crate) struct PixelsSink {
    pixels: Pixels<'static>,
    stage_width: u32,
    stage_height: u32,
    foreground: Vec<QueuedBlit>,
    player_rect: Option<(i32, i32, u32, u32)>,
    render_error: Option<Error>,
}

impl PixelsSink {
    pub(crate) fn new(
        window: &'static Window,
        stage_width: u32,
        stage_height: u32,
    ) -> Result<Self, Error> {
        let size = window.inner_size();
        let surface = SurfaceTexture::new(size.width.max(1), size.height.max(1), window);
        let pixels = Pixels::new(stage_width, stage_height, surface)?;
        Ok(Self {
            pixels,
            stage_width,
            stage_height,
            foreground: Vec::new(),
            player_rect: None,
            render_error: None,
        })
    }

    pub(crate) fn resize_surface(&mut self, width: u32, height: u32) -> Result<(), TextureError> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels.resize_surface(width, height)
    }

    pub(crate) fn set_player_rect(&mut self, x: i32, y: i32, width: u32, height: u32) {
        self.player_rect = Some((x, y, width, height));
    }

    pub(crate) fn begin_frame(&mut self) {
        self.foreground.clear();
        for chunk in self.pixels.frame_mut().chunks_exact_mut(4) {
            chunk.copy_from_slice(&CLEAR_COLOR);
        }
    }

    pub(crate) fn take_render_error(&mut self) -> Option<Error> {
        self.render_error.take()
    }
}

impl RenderSink for PixelsSink {
    fn blit_tile(&mut self, layer: RenderLayer, image: &TileImage, dest_x_px: i32, dest_y_px: i32) {
        match layer {
            RenderLayer::Background => {
                let (width, height) = (self.stage_width, self.stage_height);
                blit_rgba(
                    self.pixels.frame_mut(),
                    width,
                    height,
                    image.rgba(),
                    image.width(),
                    image.height(),
                    dest_x_px,
                    dest_y_px,
                );
            }
            RenderLayer::Foreground => self.foreground.push(QueuedBlit {
                rgba: image.rgba().to_vec(),
                width: image.width(),
                height: image.height(),
                dest_x: dest_x_px,
                dest_y: dest_y_px,
            }),
            // Object/Npc/Menu content comes from other producers.
            _ => {}
        }
    }

    fn present(&mut self) {
        let (width, height) = (self.stage_width, self.stage_height);
        if let Some((x, y, w, h)) = self.player_rect {
            fill_rect(self.pixels.frame_mut(), width, height, x, y, w, h, PLAYER_COLOR);
        }
        let blits = std::mem::take(&mut self.foreground);
        for blit in &blits {
            blit_rgba(
                self.pixels.frame_mut(),
                width,
                height,
                &blit.rgba,
                blit.width,
                blit.height,
                blit.dest_x,
                blit.dest_y,
            );
        }
        if let Err(error) = self.pixels.render() {
            self.render_error = Some(error);
        }
    }
}

/// Alpha-tested 1:1 copy of an RGBA tile into the frame, clipped to bounds.
fn blit_rgba(
    frame: &mut [u8],
    frame_width: u32,
    frame_height: u32,
    rgba: &[u8],
    width: u32,
    height: u32,
    dest_x: i32,
    dest_y: i32,
) {
    if width == 0 || height == 0 || frame_width == 0 || frame_height == 0 {
        return;
    }
    if rgba.len() < width as usize * height as usize * 4 {
        return;
    }

    let draw_left = dest_x.max(0);
    let draw_top = dest_y.max(0);
    let draw_right = (dest_x + width as i32).min(frame_width as i32);
    let draw_bottom = (dest_y + height as i32).min(frame_height as i32);
    if draw_left >= draw_right || draw_top >= draw_bottom {
        return;
    }

    let frame_width = frame_width as usize;
    let tile_width = width as usize;

    for out_y in draw_top..draw_bottom {
        let src_y = (out_y - dest_y) as usize;
        let src_row_offset = src_y * tile_width * 4;
        let dst_row_offset = out_y as usize * frame_width * 4;

        for out_x in draw_left..draw_right {
            let src_x = (out_x - dest_x) as usize;
            let src_offset = src_row_offset + src_x * 4;
            let alpha = rgba[src_offset + 3];
            if alpha == 0 {
                continue;
            }
            let dst_offset = dst_row_offset + out_x as usize * 4;
            frame[dst_offset] = rgba[src_offset];
            frame[dst_offset + 1] = rgba[src_offset + 1];
            frame[dst_offset + 2] = rgba[src_offset + 2];
            frame[dst_offset + 3] = alpha;
        }
    }
}

fn fill_rect(
    frame: &mut [u8],
    frame_width: u32,
    frame_height: u32,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    color: [u8; 4],
) {
    let draw_left = x.max(0);
    let draw_top = y.max(0);
    let draw_right = (x + width as i32).min(frame_width as i32);
    let draw_bottom = (y + height as i32).min(frame_height as i32);
    if draw_left >= draw_right || draw_top >= draw_bottom {
        return;
    }

    for out_y in draw_top..draw_bottom {
        let row_offset = out_y as usize * frame_width as usize * 4;
        for out_x in draw_left..draw_right {
            let offset = row_offset + out_x as usize * 4;
            frame[offset..offset + 4].copy_from_slice(&color);
        }
    }
}
