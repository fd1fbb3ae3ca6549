use std::path::Path;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing with optional file output.
///
/// Logging is disabled unless a log file is given, so that the interactive
/// output and diagnostic channels stay clean. The filter comes from
/// `RUST_LOG` and defaults to `info`.
pub fn init_tracing(log_file: Option<&Path>) {
    let Some(path) = log_file else {
        return;
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file = match std::fs::File::create(path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!(
                "cshell: warning: cannot create log file {}: {}",
                path.display(),
                err
            );
            return;
        }
    };

    let file_layer = fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true)
        .with_level(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .init();
}
