use std::time::Instant;

use engine::{resolve_asset_paths, DiskSheetFetcher, MapSession};
use thiserror::Error;
use tracing::{debug, info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use super::bootstrap::ViewerConfig;
use super::keymap;
use super::metrics::MetricsAccumulator;
use super::sink::PixelsSink;

#[derive(Debug, Error)]
pub(crate) enum ViewerError {
    #[error(transparent)]
    Startup(#[from] engine::StartupError),
    #[error(transparent)]
    MapLoad(#[from] engine::MapLoadError),
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] pixels::Error),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

pub(crate) fn run_viewer(config: ViewerConfig) -> Result<(), ViewerError> {
    let paths = resolve_asset_paths()?;
    info!(
        root = %paths.root.display(),
        img_dir = %paths.img_dir.display(),
        data_dir = %paths.data_dir.display(),
        "startup"
    );

    let stage_width = config.session.stage_width_px;
    let stage_height = config.session.stage_height_px;
    let mut session = MapSession::new(
        config.session.clone(),
        Box::new(DiskSheetFetcher::new(&paths.img_dir)),
    );
    session
        .events_mut()
        .subscribe(|event| debug!(?event, "session_event"));

    let map_path = paths.data_dir.join(&config.map_file);
    session.load_map(&map_path, config.start_x, config.start_y)?;

    let event_loop = EventLoop::new().map_err(ViewerError::CreateEventLoop)?;
    let window: &'static winit::window::Window = Box::leak(Box::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(stage_width as f64, stage_height as f64))
            .build(&event_loop)
            .map_err(ViewerError::CreateWindow)?,
    ));
    let mut sink =
        PixelsSink::new(window, stage_width, stage_height).map_err(ViewerError::CreateRenderer)?;

    // The player sprite stays on the view's center tile while the world
    // scrolls underneath it.
    if let (Some(view), Some(map)) = (session.view(), session.map()) {
        let tile_size = map.tile_size();
        sink.set_player_rect(
            (view.width / 2) * tile_size.width as i32,
            (view.height / 2) * tile_size.height as i32,
            tile_size.width,
            tile_size.height,
        );
    }

    event_loop.set_control_flow(ControlFlow::Poll);

    let started_at = Instant::now();
    let mut last_frame_instant = Instant::now();
    let mut metrics = MetricsAccumulator::new(config.metrics_log_interval);

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    if let Err(error) = sink.resize_surface(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    if matches!(event.physical_key, PhysicalKey::Code(KeyCode::Escape))
                        && event.state == ElementState::Pressed
                    {
                        info!(reason = "escape_key", "shutdown_requested");
                        window_target.exit();
                        return;
                    }
                    if let Some(command) = keymap::command_for_key(event.physical_key) {
                        let pressed = event.state == ElementState::Pressed;
                        let timestamp_ms = started_at.elapsed().as_secs_f64() * 1000.0;
                        session.handle_command(command, pressed, timestamp_ms);
                    }
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    let frame_dt = now.saturating_duration_since(last_frame_instant);
                    last_frame_instant = now;

                    let elapsed_ms = started_at.elapsed().as_secs_f64() * 1000.0;
                    session.tick(elapsed_ms);
                    metrics.record_tick();

                    sink.begin_frame();
                    session.render(&mut sink);
                    if let Some(error) = sink.take_render_error() {
                        warn!(error = %error, "renderer_draw_failed");
                        window_target.exit();
                        return;
                    }
                    metrics.record_frame(frame_dt);

                    if let Some(snapshot) = metrics.maybe_snapshot(now) {
                        let stats = session.buffer_stats().unwrap_or_default();
                        info!(
                            fps = snapshot.fps,
                            tps = snapshot.tps,
                            frame_time_ms = snapshot.frame_time_ms,
                            cells_resolved = stats.cells_resolved,
                            edge_shifts = stats.edge_shifts,
                            full_reloads = stats.full_reloads,
                            "loop_metrics"
                        );
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(ViewerError::EventLoopRun)
}
