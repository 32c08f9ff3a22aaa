use clap::{CommandFactory, Parser};
use csv_chart_explorer::config::settings::{
    DEBUG_VAR, EXPORT_DIR_VAR, LOG_FILE_VAR, SERVER_URL_VAR,
};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "csv-chart-explorer",
    version,
    about = "Upload a CSV for analysis and browse the generated charts"
)]
pub struct CliArgs {
    /// Upload once, print the result and exit
    #[arg(long)]
    pub headless: bool,

    /// Print the headless result as JSON
    #[arg(long)]
    pub json: bool,

    /// CSV file to select at startup (required in headless mode)
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Override the analysis server base URL
    #[arg(long, value_name = "URL")]
    pub server: Option<String>,

    /// Override the chart export directory
    #[arg(long = "export-dir", value_name = "PATH")]
    pub export_dir: Option<String>,

    /// Write logs to this file
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<String>,
}

impl CliArgs {
    pub fn apply_env_overrides(&self) {
        if let Some(server) = &self.server {
            std::env::set_var(SERVER_URL_VAR, server);
        }
        if let Some(dir) = &self.export_dir {
            std::env::set_var(EXPORT_DIR_VAR, dir);
        }
        if let Some(path) = &self.log_file {
            std::env::set_var(LOG_FILE_VAR, path);
        }
        if self.debug {
            std::env::set_var(DEBUG_VAR, "1");
        }
    }

    pub fn help_text() -> String {
        let mut command = Self::command();
        let mut buffer = Vec::new();
        command.write_help(&mut buffer).ok();
        String::from_utf8_lossy(&buffer).to_string()
    }
}
