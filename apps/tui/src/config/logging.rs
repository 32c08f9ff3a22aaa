use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Where log events go. The TUI owns stdout/stderr while it runs, so it logs
/// to a file or nowhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
    Discard,
}

/// Installs the global subscriber. `RUST_LOG` wins over `debug`.
pub fn init_logging(target: &LogTarget, debug: bool) -> std::io::Result<()> {
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("csv_chart_explorer={default_level}")));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    // A second initialisation (tests, repeated runs) keeps the first subscriber.
    let _ = match target {
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
        LogTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        LogTarget::Discard => builder.with_writer(std::io::sink).try_init(),
    };

    Ok(())
}
