use std::process::ExitCode;

use tracing::error;

mod bootstrap;
mod keymap;
mod loop_runner;
mod metrics;
mod sink;

pub(crate) fn run() -> ExitCode {
    let config = bootstrap::build_app();
    if let Err(err) = loop_runner::run_viewer(config) {
        error!(error = %err, "startup_failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
