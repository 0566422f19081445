use std::time::Duration;

use engine::SessionConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

const MAP_ENV_VAR: &str = "TILEGATE_MAP";
const START_ENV_VAR: &str = "TILEGATE_START";
const DEFAULT_MAP_FILE: &str = "overworld.json";
// Default spawn tile in the overworld map.
const DEFAULT_START: (i32, i32) = (60, 40);

#[derive(Debug, Clone)]
pub(crate) struct ViewerConfig {
    pub(crate) window_title: String,
    pub(crate) map_file: String,
    pub(crate) start_x: i32,
    pub(crate) start_y: i32,
    pub(crate) session: SessionConfig,
    pub(crate) metrics_log_interval: Duration,
}

pub(crate) fn build_app() -> ViewerConfig {
    init_tracing();
    info!("=== Tilegate Viewer Startup ===");

    let map_file = std::env::var(MAP_ENV_VAR).unwrap_or_else(|_| DEFAULT_MAP_FILE.to_string());
    let (start_x, start_y) = std::env::var(START_ENV_VAR)
        .ok()
        .and_then(|raw| parse_start_position(&raw))
        .unwrap_or(DEFAULT_START);

    ViewerConfig {
        window_title: "Tilegate".to_string(),
        map_file,
        start_x,
        start_y,
        session: SessionConfig::default(),
        metrics_log_interval: Duration::from_secs(1),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

/// `"x,y"` in tile units.
fn parse_start_position(raw: &str) -> Option<(i32, i32)> {
    let (x, y) = raw.split_once(',')?;
    Some((x.trim().parse().ok()?, y.trim().parse().ok()?))
}
