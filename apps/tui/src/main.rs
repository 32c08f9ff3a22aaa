mod app;
mod cli;
mod event;
mod terminal;
mod ui;

use app::App;
use clap::Parser;
use cli::CliArgs;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use csv_chart_explorer::config::{init_logging, AppConfig, LogTarget};
use csv_chart_explorer::UploadClient;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Setup error handling
    color_eyre::install()?;

    let args = CliArgs::parse();
    args.apply_env_overrides();
    let config = AppConfig::from_env();

    let headless = args.headless || !is_terminal();
    init_logging(&log_target(&config, headless), config.debug)?;
    info!(server = %config.server_url, headless, "starting csv-chart-explorer");

    let client = UploadClient::new(&config.server_url)?;

    if headless {
        let Some(file) = args.file.as_deref() else {
            eprintln!("{}", CliArgs::help_text());
            return Err(eyre!("--file is required in headless mode"));
        };
        return event::run_headless(&client, file, args.json).await;
    }

    let mut app = App::new(client, &config);
    if let Some(file) = &args.file {
        app.current_input = file.display().to_string();
        app.select_path();
    }

    // Setup terminal
    let mut terminal = terminal::setup()?;

    // Run the application
    let result = event::run(&mut terminal, &mut app).await;

    // Restore terminal
    terminal::cleanup(true, true);

    result
}

/// Logs must stay off stdout/stderr while the TUI owns the screen.
fn log_target(config: &AppConfig, headless: bool) -> LogTarget {
    match (&config.log_file, headless) {
        (Some(path), _) => LogTarget::File(path.clone()),
        (None, true) => LogTarget::Stderr,
        (None, false) => LogTarget::Discard,
    }
}

fn is_terminal() -> bool {
    atty::is(atty::Stream::Stdout)
}
