use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn file_appender(logs_dir: &Path) -> Result<RollingFileAppender, InitError> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("askline.log")
        .build(logs_dir)
}

/// Sets up file logging under `<data_dir>/logs`. The TUI owns the terminal, so
/// nothing is written to stdout or stderr. Hold the guard until exit.
///
/// Returns `None` and leaves logging off when the log directory is unusable.
pub fn init_logging(data_dir: &Path) -> Option<WorkerGuard> {
    let logs_dir = data_dir.join("logs");

    let appender = match file_appender(&logs_dir) {
        Ok(appender) => appender,
        Err(e) => {
            eprintln!("Warning: file logging disabled ({}): {}", logs_dir.display(), e);
            return None;
        }
    };
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,askline=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    Some(guard)
}
