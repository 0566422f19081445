use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, info};

use crate::events::EventBus;
use crate::input::{Command, InputCommandGate, MoveIntent};
use crate::map::{parse_map_document, MapJsonError, MapModel, MapStructureError};
use crate::render::{RenderLayer, RenderSink};
use crate::tiles::{load_tilesets, SheetFetcher, TileImageStore, TilesetDescriptor, TilesetLoadError};
use crate::view::{BufferStats, MoveProgress, TileBuffer, View, ViewportController};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

/// Session tuning knobs. The defaults reproduce the classic feel: a 40x30
/// tile view over an 800x600 stage, an 18-tile buffer skirt, and 300 ms per
/// tile of travel.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub stage_width_px: u32,
    pub stage_height_px: u32,
    /// Extra resident tiles on each side of the view.
    pub buffer_margin: i32,
    /// Minimum view-to-buffer-edge distance before an idle recenter is
    /// scheduled. Compared strictly (`<`), independently per axis.
    pub reload_threshold: i32,
    pub move_duration_ms: f32,
    /// Delay between a fresh press and draining the command queue, so
    /// near-simultaneous presses combine into one diagonal move.
    pub input_combine_window_ms: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            stage_width_px: 800,
            stage_height_px: 600,
            buffer_margin: 18,
            reload_threshold: 9,
            move_duration_ms: 300.0,
            input_combine_window_ms: 50.0,
        }
    }
}

#[derive(Debug, Error)]
pub enum MapLoadError {
    #[error("failed to read map file {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Json(#[from] MapJsonError),
    #[error(transparent)]
    Structure(#[from] MapStructureError),
    #[error(transparent)]
    Tileset(#[from] TilesetLoadError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    MapLoaded { source: String },
    MovementStarted { dx: i32, dy: i32, diagonal: bool },
    MovementFinished { x: i32, y: i32 },
    BufferReloaded { origin_x: i32, origin_y: i32 },
}

struct LoadedMap {
    model: MapModel,
    store: TileImageStore,
    buffer: TileBuffer,
    viewport: ViewportController,
}

#[derive(Debug, Clone, Copy)]
struct PendingReload {
    generation: u64,
}

/// The map viewer core: owns the parsed map, the tile-image store, the
/// resident tile buffer, the viewport state machine and the input gate, and
/// wires them together once per tick.
///
/// All state is owned here and passed explicitly between components; there
/// are no module-level singletons. The session reads no clocks: `tick`
/// receives a monotonically increasing elapsed-time value and command
/// timestamps share that timebase, which keeps every transition
/// deterministic under test.
pub struct MapSession {
    config: SessionConfig,
    fetcher: Box<dyn SheetFetcher>,
    gate: InputCommandGate,
    events: EventBus<SessionEvent>,
    loaded: Option<LoadedMap>,
    pending_reload: Option<PendingReload>,
    generation: u64,
    clock_ms: f64,
}

impl MapSession {
    pub fn new(config: SessionConfig, fetcher: Box<dyn SheetFetcher>) -> Self {
        let gate = InputCommandGate::new(config.input_combine_window_ms);
        Self {
            config,
            fetcher,
            gate,
            events: EventBus::new(),
            loaded: None,
            pending_reload: None,
            generation: 0,
            clock_ms: 0.0,
        }
    }

    pub fn events_mut(&mut self) -> &mut EventBus<SessionEvent> {
        &mut self.events
    }

    pub fn has_map(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn view(&self) -> Option<View> {
        self.loaded.as_ref().map(|loaded| loaded.viewport.view())
    }

    pub fn map(&self) -> Option<&MapModel> {
        self.loaded.as_ref().map(|loaded| &loaded.model)
    }

    pub fn buffer_stats(&self) -> Option<BufferStats> {
        self.loaded.as_ref().map(|loaded| loaded.buffer.stats())
    }

    pub fn is_moving(&self) -> bool {
        self.loaded
            .as_ref()
            .is_some_and(|loaded| loaded.viewport.is_moving())
    }

    /// The resident buffer cell at an absolute tile coordinate, if any.
    /// Collaborators use this for occlusion checks; tests use it to inspect
    /// what the buffer materialized.
    pub fn tile_cell(&self, x: i32, y: i32) -> Option<&crate::view::TileCell> {
        self.loaded.as_ref().and_then(|loaded| loaded.buffer.cell(x, y))
    }

    /// Whole-pixel offset of the map layer group for this tick; (0, 0)
    /// before the first map loads.
    pub fn pixel_offset(&self) -> (i32, i32) {
        self.loaded
            .as_ref()
            .map(|loaded| loaded.viewport.pixel_offset())
            .unwrap_or((0, 0))
    }

    /// Player position in tile units: the center tile of the view, which is
    /// where the player sprite stays while the world scrolls underneath.
    pub fn player_position(&self) -> Option<Vec2> {
        self.loaded.as_ref().map(|loaded| {
            let view = loaded.viewport.view();
            Vec2 {
                x: view.x + (view.width / 2) as f32,
                y: view.y + (view.height / 2) as f32,
            }
        })
    }

    /// Loads a map file and positions the view so `(center_x, center_y)` is
    /// the center tile. The `Result` is the completion signal: on any
    /// failure the previously loaded map remains fully intact and renderable.
    pub fn load_map(&mut self, path: &Path, center_x: i32, center_y: i32) -> Result<(), MapLoadError> {
        let text = fs::read_to_string(path).map_err(|source| MapLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let source = path.display().to_string();
        self.load_map_document(&text, &source, center_x, center_y)
    }

    /// [`MapSession::load_map`] with the document text already in hand.
    pub fn load_map_document(
        &mut self,
        text: &str,
        source: &str,
        center_x: i32,
        center_y: i32,
    ) -> Result<(), MapLoadError> {
        let raw = parse_map_document(text)?;
        let model = MapModel::from_document(&raw)?;
        let descriptors: Vec<TilesetDescriptor> =
            raw.tilesets.iter().map(TilesetDescriptor::from).collect();
        let store = load_tilesets(&descriptors, self.fetcher.as_mut(), model.tile_size())?;

        // Everything fetched and sliced; only now does new state replace old.
        let tile_size = model.tile_size();
        let view_width = ceil_div(self.config.stage_width_px, tile_size.width);
        let view_height = ceil_div(self.config.stage_height_px, tile_size.height);
        let view_x = center_x - view_width / 2;
        let view_y = center_y - view_height / 2;

        let mut viewport = ViewportController::new(
            view_width,
            view_height,
            tile_size,
            self.config.move_duration_ms,
        );
        viewport.set_view(view_x as f32, view_y as f32);

        let margin = self.config.buffer_margin;
        let mut buffer = TileBuffer::new(view_width, view_height, margin);
        buffer.reload(view_x - margin, view_y - margin, &model, &store);

        self.generation += 1;
        self.loaded = Some(LoadedMap {
            model,
            store,
            buffer,
            viewport,
        });
        self.events.emit(&SessionEvent::MapLoaded {
            source: source.to_string(),
        });
        info!(
            source,
            tile_width = tile_size.width,
            tile_height = tile_size.height,
            view_width,
            view_height,
            generation = self.generation,
            "map_loaded"
        );
        Ok(())
    }

    /// Jumps the view's top-left corner to (x, y). Reloads the buffer
    /// immediately if the jump breaks residency; schedules a deferred
    /// recenter if it merely lands within the reload threshold of an edge.
    pub fn set_view(&mut self, x: f32, y: f32) {
        let threshold = self.config.reload_threshold;
        let generation = self.generation;
        let Some(loaded) = self.loaded.as_mut() else {
            return;
        };
        loaded.viewport.set_view(x, y);
        let view = loaded.viewport.view();
        let span_x = view.x.floor() as i32;
        let span_y = view.y.floor() as i32;
        let span_w = (view.x + view.width as f32).ceil() as i32 - span_x;
        let span_h = (view.y + view.height as f32).ceil() as i32 - span_y;

        if !loaded.buffer.contains_rect(span_x, span_y, span_w, span_h) {
            reload_around_view(loaded, &mut self.events);
            self.pending_reload = None;
        } else if threshold_breached(loaded, threshold) {
            self.pending_reload = Some(PendingReload { generation });
            debug!(x, y, "deferred_reload_scheduled");
        }
    }

    /// Feeds one press/release command event into the gate. Ignored while no
    /// map is loaded.
    pub fn handle_command(&mut self, command: Command, pressed: bool, timestamp_ms: f64) {
        if self.loaded.is_none() {
            debug!(?command, pressed, "command_ignored_no_map");
            return;
        }
        self.gate.handle_command(command, pressed, timestamp_ms);
    }

    /// Advances the session to `elapsed_ms` (monotonic total elapsed time).
    /// Drives the in-flight movement, movement chaining under held keys,
    /// deferred reloads, and fresh intents from the input gate.
    pub fn tick(&mut self, elapsed_ms: f64) {
        let dt_ms = (elapsed_ms - self.clock_ms).max(0.0) as f32;
        self.clock_ms = elapsed_ms;
        let threshold = self.config.reload_threshold;
        let generation = self.generation;
        let Some(loaded) = self.loaded.as_mut() else {
            return;
        };

        if loaded.viewport.is_moving() {
            if loaded.viewport.advance(dt_ms) == MoveProgress::Finished {
                let view = loaded.viewport.view();
                self.events.emit(&SessionEvent::MovementFinished {
                    x: view.x as i32,
                    y: view.y as i32,
                });
                debug!(x = view.x as i32, y = view.y as i32, "movement_finished");
                // Keys still held: chain straight into the next move with no
                // idle frame in between.
                if let Some(intent) = self.gate.sample_held() {
                    start_move(loaded, &mut self.events, intent);
                } else if threshold_breached(loaded, threshold) {
                    self.pending_reload = Some(PendingReload { generation });
                    debug!("deferred_reload_scheduled");
                }
            }
            return;
        }

        // Idle tick: run a due deferred reload before accepting new input.
        if let Some(pending) = self.pending_reload.take() {
            if pending.generation == generation {
                reload_around_view(loaded, &mut self.events);
            } else {
                debug!(
                    scheduled_generation = pending.generation,
                    current_generation = generation,
                    "stale_reload_discarded"
                );
            }
        }

        if let Some(intent) = self.gate.poll_intent(self.clock_ms) {
            start_move(loaded, &mut self.events, intent);
        }
    }

    /// Moves the player onto another stacked layer, reclassifying which
    /// layers draw over the player. Takes effect at the next idle recenter.
    pub fn set_player_layer(&mut self, layer_index: usize) {
        let generation = self.generation;
        let Some(loaded) = self.loaded.as_mut() else {
            return;
        };
        loaded.model.set_player_layer(layer_index);
        self.pending_reload = Some(PendingReload { generation });
    }

    /// Emits the visible tile window to the sink: ground cells on the
    /// background layer, overlay cells on the foreground layer, then one
    /// present for the composed frame.
    pub fn render(&self, sink: &mut dyn RenderSink) {
        let Some(loaded) = self.loaded.as_ref() else {
            return;
        };
        let view = loaded.viewport.view();
        let tile_size = loaded.model.tile_size();
        let first_x = view.x.floor() as i32;
        let first_y = view.y.floor() as i32;
        let last_x = (view.x + view.width as f32).ceil() as i32;
        let last_y = (view.y + view.height as f32).ceil() as i32;

        for y in first_y..last_y {
            for x in first_x..last_x {
                let Some(cell) = loaded.buffer.cell(x, y) else {
                    // Transiently non-resident while a reload is pending.
                    continue;
                };
                let dest_x = ((x as f32 - view.x) * tile_size.width as f32).round() as i32;
                let dest_y = ((y as f32 - view.y) * tile_size.height as f32).round() as i32;
                if let Some(ground) = &cell.ground {
                    sink.blit_tile(RenderLayer::Background, ground, dest_x, dest_y);
                }
                if let Some(overlay) = &cell.overlay {
                    sink.blit_tile(RenderLayer::Foreground, overlay, dest_x, dest_y);
                }
            }
        }
        sink.present();
    }
}

fn ceil_div(numerator: u32, denominator: u32) -> i32 {
    (numerator.div_ceil(denominator)) as i32
}

fn threshold_breached(loaded: &LoadedMap, threshold: i32) -> bool {
    let view = loaded.viewport.view();
    let gaps = loaded.buffer.edge_gaps(
        view.x.round() as i32,
        view.y.round() as i32,
        view.width,
        view.height,
    );
    gaps.min() < threshold
}

fn reload_around_view(loaded: &mut LoadedMap, events: &mut EventBus<SessionEvent>) {
    let view = loaded.viewport.view();
    let margin = loaded.buffer.margin();
    let origin_x = view.x.round() as i32 - margin;
    let origin_y = view.y.round() as i32 - margin;
    loaded
        .buffer
        .reload(origin_x, origin_y, &loaded.model, &loaded.store);
    events.emit(&SessionEvent::BufferReloaded { origin_x, origin_y });
}

/// Idle -> Moving: shifts the buffer along the movement vector (or reloads
/// outright when the target would fall outside residency), then starts the
/// tile-granular move.
fn start_move(loaded: &mut LoadedMap, events: &mut EventBus<SessionEvent>, intent: MoveIntent) {
    let view = loaded.viewport.view();
    let (target_x, target_y) = loaded.viewport.target_for(intent);
    let (origin_x, origin_y) = loaded.buffer.origin();
    let fits_after_shift = target_x >= origin_x + intent.dx
        && target_y >= origin_y + intent.dy
        && target_x + view.width <= origin_x + intent.dx + loaded.buffer.width()
        && target_y + view.height <= origin_y + intent.dy + loaded.buffer.height();

    if fits_after_shift {
        loaded
            .buffer
            .shift(intent.dx, intent.dy, &loaded.model, &loaded.store);
    } else {
        let margin = loaded.buffer.margin();
        let origin_x = target_x - margin;
        let origin_y = target_y - margin;
        loaded
            .buffer
            .reload(origin_x, origin_y, &loaded.model, &loaded.store);
        events.emit(&SessionEvent::BufferReloaded { origin_x, origin_y });
    }

    loaded.viewport.begin_move(intent);
    events.emit(&SessionEvent::MovementStarted {
        dx: intent.dx,
        dy: intent.dy,
        diagonal: intent.is_diagonal(),
    });
    debug!(
        dx = intent.dx,
        dy = intent.dy,
        diagonal = intent.is_diagonal(),
        "movement_started"
    );
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use image::RgbaImage;

    use crate::render::test_sink::RecordingSink;
    use crate::tiles::testing::StubFetcher;

    use super::*;

    /// 10x10 `bg` layer with tile size 20x20, all empty except (5,5) = 7,
    /// backed by one 140x20 sheet covering gids 1..=7.
    fn marker_map_json() -> String {
        let mut data = vec![0u32; 100];
        data[5 * 10 + 5] = 7;
        format!(
            r#"{{
                "tilewidth": 20,
                "tileheight": 20,
                "tilesets": [
                    {{
                        "image": "tiles.png",
                        "tilewidth": 20,
                        "tileheight": 20,
                        "imagewidth": 140,
                        "imageheight": 20,
                        "firstgid": 1
                    }}
                ],
                "layers": [
                    {{ "name": "bg", "width": 10, "height": 10, "data": {data:?} }}
                ]
            }}"#
        )
    }

    fn stub_fetcher() -> Box<StubFetcher> {
        Box::new(StubFetcher::new().with_sheet("tiles.png", RgbaImage::new(140, 20)))
    }

    fn session() -> MapSession {
        MapSession::new(SessionConfig::default(), stub_fetcher())
    }

    fn loaded_session() -> MapSession {
        let mut session = session();
        session
            .load_map_document(&marker_map_json(), "marker.json", 5, 5)
            .expect("load");
        session
    }

    fn record_events(session: &mut MapSession) -> Rc<RefCell<Vec<SessionEvent>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        session
            .events_mut()
            .subscribe(move |event: &SessionEvent| sink.borrow_mut().push(event.clone()));
        log
    }

    fn tick_range(session: &mut MapSession, from_ms: u64, to_ms: u64, step_ms: u64) {
        let mut now = from_ms;
        while now <= to_ms {
            session.tick(now as f64);
            now += step_ms;
        }
    }

    fn started_count(log: &Rc<RefCell<Vec<SessionEvent>>>) -> usize {
        log.borrow()
            .iter()
            .filter(|event| matches!(event, SessionEvent::MovementStarted { .. }))
            .count()
    }

    #[test]
    fn load_scenario_centers_the_marker_tile() {
        let session = loaded_session();

        // 800x600 stage over 20x20 tiles: 40x30 view centered on (5,5).
        let view = session.view().expect("view");
        assert_eq!((view.width, view.height), (40, 30));
        assert_eq!((view.x, view.y), (-15.0, -10.0));

        // The offset puts tile (5,5) (map px 100,100) at the stage center.
        assert_eq!(session.pixel_offset(), (300, 200));
        let player = session.player_position().expect("player");
        assert_eq!((player.x, player.y), (5.0, 5.0));

        // The marker tile is resident in the buffer.
        let map = session.map().expect("map");
        assert_eq!(map.tile_at(0, 5, 5), 7);
        assert_eq!(session.tile_cell(5, 5).expect("resident").ground_gid, 7);
        let stats = session.buffer_stats().expect("stats");
        assert_eq!(stats.full_reloads, 1);
        assert_eq!(stats.cells_resolved, 76 * 66);
    }

    #[test]
    fn render_blits_the_visible_window_once() {
        let session = loaded_session();
        let mut sink = RecordingSink::default();

        session.render(&mut sink);

        assert_eq!(sink.presents, 1);
        let backgrounds = sink
            .blits
            .iter()
            .filter(|(layer, ..)| *layer == RenderLayer::Background)
            .count();
        assert_eq!(backgrounds, 40 * 30);
        // Tile (5,5) lands at the stage center.
        assert!(sink
            .blits
            .iter()
            .any(|(layer, _, _, x, y)| *layer == RenderLayer::Background
                && *x == 400
                && *y == 300));
    }

    #[test]
    fn malformed_document_leaves_the_previous_map_intact() {
        let mut session = loaded_session();
        let view_before = session.view().expect("view");

        let error = session
            .load_map_document("{ \"tilewidth\": }", "broken.json", 0, 0)
            .expect_err("must fail");
        assert!(matches!(error, MapLoadError::Json(_)));

        assert_eq!(session.view().expect("view"), view_before);
        assert_eq!(session.map().expect("map").tile_at(0, 5, 5), 7);
    }

    #[test]
    fn missing_tileset_sheet_leaves_the_previous_map_intact() {
        let mut session = loaded_session();

        let broken = marker_map_json().replace("tiles.png", "absent.png");
        let error = session
            .load_map_document(&broken, "absent.json", 5, 5)
            .expect_err("must fail");
        assert!(matches!(error, MapLoadError::Tileset(_)));

        assert!(session.has_map());
        assert_eq!(session.map().expect("map").tile_at(0, 5, 5), 7);
    }

    #[test]
    fn unreachable_map_file_is_an_io_error() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let mut session = session();

        let error = session
            .load_map(&dir.path().join("nope.json"), 0, 0)
            .expect_err("must fail");
        assert!(matches!(error, MapLoadError::Io { .. }));
        assert!(!session.has_map());
    }

    #[test]
    fn commands_without_a_map_are_ignored() {
        let mut session = session();
        session.handle_command(Command::Up, true, 0.0);
        session.tick(100.0);
        assert!(!session.is_moving());
    }

    #[test]
    fn near_simultaneous_presses_become_one_diagonal_move() {
        let mut session = loaded_session();
        let log = record_events(&mut session);

        session.handle_command(Command::Up, true, 0.0);
        session.handle_command(Command::Right, true, 10.0);
        tick_range(&mut session, 16, 64, 16);

        assert!(session.is_moving());
        assert_eq!(started_count(&log), 1);
        assert!(log.borrow().iter().any(|event| matches!(
            event,
            SessionEvent::MovementStarted {
                dx: 1,
                dy: -1,
                diagonal: true
            }
        )));
    }

    #[test]
    fn held_key_chains_moves_with_no_idle_frame() {
        let mut session = loaded_session();
        let log = record_events(&mut session);

        session.handle_command(Command::Down, true, 0.0);
        // Window elapses, first move starts, and 300 ms later the second
        // move must begin on the same tick the first one finishes.
        let mut saw_finish_while_moving = false;
        for now in (16..=1000).step_by(16) {
            let finished_before = log
                .borrow()
                .iter()
                .filter(|event| matches!(event, SessionEvent::MovementFinished { .. }))
                .count();
            session.tick(now as f64);
            let finished_after = log
                .borrow()
                .iter()
                .filter(|event| matches!(event, SessionEvent::MovementFinished { .. }))
                .count();
            if finished_after > finished_before {
                assert!(session.is_moving(), "idle frame after completion at {now}");
                saw_finish_while_moving = true;
            }
        }
        assert!(saw_finish_while_moving);
        assert!(started_count(&log) >= 2);

        // Releasing the key ends the chain after the in-flight move.
        session.handle_command(Command::Down, false, 1000.0);
        tick_range(&mut session, 1016, 1600, 16);
        assert!(!session.is_moving());
        let started_after_release = started_count(&log);
        tick_range(&mut session, 1616, 2000, 16);
        assert_eq!(started_count(&log), started_after_release);
    }

    #[test]
    fn sustained_movement_shifts_one_edge_per_tile_step() {
        let mut session = loaded_session();
        session.handle_command(Command::Right, true, 0.0);

        // Two chained moves complete and a third is in flight when the key
        // is released; the third still runs to completion.
        tick_range(&mut session, 16, 896, 16);
        session.handle_command(Command::Right, false, 900.0);
        tick_range(&mut session, 912, 1400, 16);

        let stats = session.buffer_stats().expect("stats");
        assert_eq!(stats.full_reloads, 1);
        assert_eq!(stats.edge_shifts, 3);
        assert_eq!(stats.cells_resolved, 76 * 66 + 3 * 66);
        let view = session.view().expect("view");
        assert_eq!(view.x, -12.0);

        // Containment: the whole view stayed resident through the moves.
        let (vx, vy) = (view.x as i32, view.y as i32);
        assert!(session.tile_cell(vx, vy).is_some());
        assert!(session
            .tile_cell(vx + view.width - 1, vy + view.height - 1)
            .is_some());
    }

    #[test]
    fn set_view_near_the_buffer_edge_schedules_a_deferred_recenter() {
        let mut session = loaded_session();
        let log = record_events(&mut session);

        // Buffer origin is (-33, -28); x gap of 3 is inside the threshold.
        session.set_view(-30.0, -10.0);
        assert_eq!(session.buffer_stats().expect("stats").full_reloads, 1);

        session.tick(16.0);
        assert_eq!(session.buffer_stats().expect("stats").full_reloads, 2);
        assert!(log.borrow().iter().any(|event| matches!(
            event,
            SessionEvent::BufferReloaded {
                origin_x: -48,
                origin_y: -28
            }
        )));
    }

    #[test]
    fn set_view_outside_the_buffer_reloads_immediately() {
        let mut session = loaded_session();

        session.set_view(100.0, 100.0);

        let stats = session.buffer_stats().expect("stats");
        assert_eq!(stats.full_reloads, 2);
        // Recentered: nothing further to do on the next tick.
        session.tick(16.0);
        assert_eq!(session.buffer_stats().expect("stats").full_reloads, 2);
    }

    #[test]
    fn stale_deferred_reload_is_discarded_after_a_map_switch() {
        let mut session = loaded_session();
        session.set_view(-30.0, -10.0); // schedules a deferred recenter

        session
            .load_map_document(&marker_map_json(), "marker2.json", 5, 5)
            .expect("reload map");

        // The pending recenter belongs to the old generation and must not
        // touch the new buffer.
        session.tick(16.0);
        let stats = session.buffer_stats().expect("stats");
        assert_eq!(stats.full_reloads, 1);
    }

    #[test]
    fn map_loaded_event_reaches_subscribers() {
        let mut session = session();
        let log = record_events(&mut session);

        session
            .load_map_document(&marker_map_json(), "marker.json", 5, 5)
            .expect("load");

        assert!(log.borrow().iter().any(|event| matches!(
            event,
            SessionEvent::MapLoaded { source } if source == "marker.json"
        )));
    }
}
