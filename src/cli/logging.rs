//! Logging initialization

use std::path::PathBuf;

/// Initialize logging based on debug flag
///
/// Logs go to a temp file so stdout stays clean for command output.
/// `RUST_LOG` wins over `default_level`. Returns the log file path if debug
/// logging is enabled.
pub fn init_logging(debug: bool, default_level: &str) -> Option<PathBuf> {
    if !debug {
        // Silent by default
        return None;
    }

    let log_path = tempfile::Builder::new()
        .prefix("keptn-bridge-")
        .suffix(".log")
        .tempfile()
        .map(|f| {
            let path = f.path().to_path_buf();
            // Keep the file after the handle is dropped
            std::mem::forget(f);
            path
        })
        .unwrap_or_else(|_| {
            std::env::temp_dir().join(format!("keptn-bridge-{}.log", std::process::id()))
        });

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!(
                "Failed to open log file {}: {}; debug logging disabled",
                log_path.display(),
                e
            );
            return None;
        }
    };

    tracing_subscriber::fmt()
        .with_writer(file)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    Some(log_path)
}
