//! Tracing subscriber setup

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

use crate::config::log_dir;

/// Install the global subscriber.
///
/// Logs go to stderr and to a daily rolling file in the data directory.
/// `RUST_LOG` takes precedence over `level`. The returned guard flushes the
/// file writer when dropped and must be held for the life of the program.
pub fn init(level: &str, json: bool) -> Result<Option<WorkerGuard>, TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let dir = log_dir();
    let (file_writer, guard) = match std::fs::create_dir_all(&dir) {
        Ok(()) => {
            let appender = tracing_appender::rolling::daily(&dir, "support-window.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(writer), Some(guard))
        }
        Err(e) => {
            eprintln!("Failed to create log directory {:?}: {}", dir, e);
            (None, None)
        }
    };

    let stderr_text =
        (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
    let stderr_json =
        json.then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr));
    let file = file_writer.map(|writer| {
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(writer)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_text)
        .with(stderr_json)
        .with(file)
        .try_init()?;

    Ok(guard)
}
