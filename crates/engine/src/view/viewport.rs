use std::f32::consts::FRAC_1_SQRT_2;

use crate::input::MoveIntent;
use crate::map::TileSize;

/// The visible window into the map: top-left corner in fractional tile
/// units, extent in whole tiles. Y grows downward (row 0 is the top row).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct View {
    pub x: f32,
    pub y: f32,
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementState {
    Idle,
    Moving {
        dx: i32,
        dy: i32,
        diagonal: bool,
        target_x: i32,
        target_y: i32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveProgress {
    Idle,
    InFlight,
    Finished,
}

/// Owns the view position and the tile-granular movement state machine.
///
/// Exactly one movement is in flight at a time; a move always runs to
/// completion and the view snaps exactly onto the integer target when the
/// remaining signed distance crosses zero, eliminating float drift. Diagonal
/// movement is normalized so its Euclidean speed equals the axial speed.
#[derive(Debug, Clone)]
pub struct ViewportController {
    view_x: f32,
    view_y: f32,
    view_width: i32,
    view_height: i32,
    tile_size: TileSize,
    speed_tiles_per_ms: f32,
    state: MovementState,
}

impl ViewportController {
    pub fn new(
        view_width: i32,
        view_height: i32,
        tile_size: TileSize,
        move_duration_ms: f32,
    ) -> Self {
        Self {
            view_x: 0.0,
            view_y: 0.0,
            view_width,
            view_height,
            tile_size,
            speed_tiles_per_ms: 1.0 / move_duration_ms.max(1.0),
            state: MovementState::Idle,
        }
    }

    pub fn view(&self) -> View {
        View {
            x: self.view_x,
            y: self.view_y,
            width: self.view_width,
            height: self.view_height,
        }
    }

    pub fn state(&self) -> MovementState {
        self.state
    }

    pub fn is_moving(&self) -> bool {
        matches!(self.state, MovementState::Moving { .. })
    }

    /// Teleports the view and abandons any movement bookkeeping. This is the
    /// jump path, not a movement command.
    pub fn set_view(&mut self, x: f32, y: f32) {
        self.view_x = x;
        self.view_y = y;
        self.state = MovementState::Idle;
    }

    /// The integer tile position one move away along the intent, measured
    /// from the nearest whole-tile view position.
    pub fn target_for(&self, intent: MoveIntent) -> (i32, i32) {
        (
            self.view_x.round() as i32 + intent.dx,
            self.view_y.round() as i32 + intent.dy,
        )
    }

    /// Idle -> Moving. Returns false (request rejected, not queued) while a
    /// move is already in flight.
    pub fn begin_move(&mut self, intent: MoveIntent) -> bool {
        if self.is_moving() {
            return false;
        }
        let (target_x, target_y) = self.target_for(intent);
        self.state = MovementState::Moving {
            dx: intent.dx,
            dy: intent.dy,
            diagonal: intent.is_diagonal(),
            target_x,
            target_y,
        };
        true
    }

    /// Advances an in-flight move by `dt_ms` along each active axis.
    pub fn advance(&mut self, dt_ms: f32) -> MoveProgress {
        let MovementState::Moving {
            dx,
            dy,
            diagonal,
            target_x,
            target_y,
        } = self.state
        else {
            return MoveProgress::Idle;
        };

        let scale = if diagonal { FRAC_1_SQRT_2 } else { 1.0 };
        let step = self.speed_tiles_per_ms * scale * dt_ms;
        if dx != 0 {
            self.view_x += dx as f32 * step;
        }
        if dy != 0 {
            self.view_y += dy as f32 * step;
        }

        let done_x = dx == 0 || (target_x as f32 - self.view_x) * dx as f32 <= 0.0;
        let done_y = dy == 0 || (target_y as f32 - self.view_y) * dy as f32 <= 0.0;
        if done_x && done_y {
            self.view_x = target_x as f32;
            self.view_y = target_y as f32;
            self.state = MovementState::Idle;
            MoveProgress::Finished
        } else {
            MoveProgress::InFlight
        }
    }

    /// Whole-pixel offset of the map layer group: content at map pixel
    /// coordinates renders at `map_px + offset`. Rounded every tick so
    /// adjacent layers never disagree by a sub-pixel seam.
    pub fn pixel_offset(&self) -> (i32, i32) {
        (
            (-self.view_x * self.tile_size.width as f32).round() as i32,
            (-self.view_y * self.tile_size.height as f32).round() as i32,
        )
    }
}
