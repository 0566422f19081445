use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod events;
pub mod input;
pub mod map;
pub mod render;
pub mod session;
pub mod tiles;
pub mod view;

pub use events::{EventBus, SubscriberId};
pub use input::{Command, InputCommandGate, MoveIntent};
pub use map::{MapJsonError, MapLayer, MapModel, MapStructureError, TileSize, TopTile, EMPTY_TILE};
pub use render::{RenderLayer, RenderSink};
pub use session::{MapLoadError, MapSession, SessionConfig, SessionEvent, Vec2};
pub use tiles::{
    DiskSheetFetcher, SheetFetcher, TileImage, TileImageStore, TilesetDescriptor, TilesetLoadError,
};
pub use view::{
    BufferStats, MovementState, RingGrid, TileBuffer, TileCell, View, ViewportController,
};

pub const ROOT_ENV_VAR: &str = "TILEGATE_ROOT";

/// Resolved asset locations: tileset sheets under `img/`, map documents
/// under `data/`.
#[derive(Debug, Clone)]
pub struct AssetPaths {
    pub root: PathBuf,
    pub img_dir: PathBuf,
    pub data_dir: PathBuf,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error(
        "TILEGATE_ROOT is set but does not point to a valid project root: {path}\n\
A valid root must contain Cargo.toml and either crates/ or assets/."
    )]
    InvalidEnvRoot { path: PathBuf },
    #[error(
        "Could not detect project root by walking upward from executable directory: {start_dir}\n\
Expected a directory containing Cargo.toml and either crates/ or assets/.\n\
Set {env_var} explicitly, for example:\n\
Bash/zsh: export {env_var}=\"/path/to/tilegate\""
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

pub fn resolve_asset_paths() -> Result<AssetPaths, StartupError> {
    let root = resolve_root()?;
    let assets = root.join("assets");
    Ok(AssetPaths {
        img_dir: assets.join("img"),
        data_dir: assets.join("data"),
        root,
    })
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => {
            let raw = PathBuf::from(value);
            let normalized = normalize_path(&raw);
            if is_repo_marker(&normalized) {
                Ok(normalized)
            } else {
                Err(StartupError::InvalidEnvRoot { path: normalized })
            }
        }
        Err(env::VarError::NotPresent) => {
            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            let exe_dir = exe
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;

            for candidate in exe_dir.ancestors() {
                if is_repo_marker(candidate) {
                    return Ok(normalize_path(candidate));
                }
            }

            Err(StartupError::RootNotFound {
                start_dir: normalize_path(&exe_dir),
                env_var: ROOT_ENV_VAR,
            })
        }
        Err(source) => Err(StartupError::EnvVar {
            var: ROOT_ENV_VAR,
            source,
        }),
    }
}

fn is_repo_marker(path: &Path) -> bool {
    let cargo_toml = path.join("Cargo.toml").is_file();
    let has_crates = path.join("crates").is_dir();
    let has_assets = path.join("assets").is_dir();

    cargo_toml && (has_crates || has_assets)
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
