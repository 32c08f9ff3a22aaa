use crate::app::actions::{export_charts, spawn_upload, UploadCompletion};
use crate::app::input::helpers::{wrap_decrement, wrap_increment};
use csv_chart_explorer::config::AppConfig;
use csv_chart_explorer::error::{SelectionError, SubmitError};
use csv_chart_explorer::lifecycle::Completion;
use csv_chart_explorer::{ChartDescription, LifecycleState, SelectedInput, UploadClient, UploadSession};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use throbber_widgets_tui::ThrobberState;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};

const THROBBER_STEP: Duration = Duration::from_millis(100);

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum InputState {
    Browsing,
    EditingPath,
}

#[derive(Debug)]
pub struct App {
    pub running: bool,
    pub input_state: InputState,
    pub current_input: String,
    pub status_message: String,
    pub show_help: bool,
    pub session: UploadSession,
    pub export_dir: PathBuf,
    pub chart_tab_index: usize,
    pub doc_scroll: u16,
    pub throbber_state: ThrobberState,
    pub last_frame: Instant,
    client: UploadClient,
    upload_tx: UnboundedSender<UploadCompletion>,
    upload_rx: UnboundedReceiver<UploadCompletion>,
}

impl App {
    pub fn new(client: UploadClient, config: &AppConfig) -> Self {
        let (upload_tx, upload_rx) = mpsc::unbounded_channel();
        Self {
            running: true,
            input_state: InputState::Browsing,
            current_input: String::new(),
            status_message: String::new(),
            show_help: false,
            session: UploadSession::new(),
            export_dir: config.export_dir.clone(),
            chart_tab_index: 0,
            doc_scroll: 0,
            throbber_state: ThrobberState::default(),
            last_frame: Instant::now(),
            client,
            upload_tx,
            upload_rx,
        }
    }

    pub fn server_endpoint(&self) -> &str {
        self.client.endpoint()
    }

    pub fn update(&mut self) {
        if !self.session.state().is_loading() {
            return;
        }

        let now = Instant::now();
        if now.duration_since(self.last_frame) >= THROBBER_STEP {
            self.throbber_state.calc_next();
            self.last_frame = now;
        }
    }

    pub fn charts(&self) -> &[ChartDescription] {
        self.session
            .state()
            .outcome()
            .map_or(&[], |outcome| outcome.charts.as_slice())
    }

    pub fn begin_path_entry(&mut self) {
        if self.current_input.is_empty() {
            if let Some(input) = self.session.selection().current() {
                self.current_input = input.file_name().to_string();
            }
        }
        self.input_state = InputState::EditingPath;
    }

    pub fn cancel_path_entry(&mut self) {
        self.input_state = InputState::Browsing;
    }

    /// Reads the typed path and makes it the current selection.
    pub fn select_path(&mut self) {
        self.input_state = InputState::Browsing;
        let path = self.current_input.trim().to_string();

        match SelectedInput::from_path(&path) {
            Ok(input) => {
                self.status_message = format!(
                    "Archivo seleccionado: {} ({} bytes)",
                    input.file_name(),
                    input.len()
                );
                self.session.select(input);
                self.reset_view();
            }
            Err(SelectionError::EmptyPath) => {
                self.session.clear_selection();
                self.reset_view();
                self.status_message = "Selección de archivo eliminada".to_string();
            }
            Err(e) => {
                self.status_message = format!("Error: {e}");
            }
        }
    }

    pub fn submit_upload(&mut self) {
        match self.session.submit() {
            Ok(pending) => {
                self.reset_view();
                self.status_message = format!("Subiendo {}...", pending.input.file_name());
                spawn_upload(self.client.clone(), pending, self.upload_tx.clone());
            }
            Err(SubmitError::NoFileSelected) => {
                self.status_message.clear();
            }
            Err(SubmitError::InFlight) => {}
        }
    }

    /// Applies every finished upload waiting on the channel.
    pub fn poll_uploads(&mut self) {
        while let Ok(completion) = self.upload_rx.try_recv() {
            let generation = completion.generation;
            if self.session.finish(generation, completion.result) == Completion::Stale {
                debug!(generation, "dropped stale upload completion");
                continue;
            }

            self.reset_view();
            self.status_message = match self.session.state() {
                LifecycleState::Success(outcome) => {
                    format!("Análisis completado: {} gráficos", outcome.charts.len())
                }
                LifecycleState::Error(failure) => format!("Error: {}", failure.message),
                LifecycleState::Idle | LifecycleState::Loading { .. } => String::new(),
            };
        }
    }

    pub fn export_current_charts(&mut self) {
        let charts = self.charts();
        if charts.is_empty() {
            self.status_message = "No hay gráficos para exportar".to_string();
            return;
        }

        let stem = self
            .session
            .selection()
            .current()
            .map_or("analisis", SelectedInput::file_name)
            .to_string();

        self.status_message = match export_charts(&self.export_dir, &stem, charts) {
            Ok(paths) => {
                info!(count = paths.len(), dir = %self.export_dir.display(), "charts exported");
                format!(
                    "{} gráficos exportados a {}",
                    paths.len(),
                    self.export_dir.display()
                )
            }
            Err(e) => format!("Error: {e}"),
        };
    }

    pub fn next_chart(&mut self) {
        self.chart_tab_index = wrap_increment(self.chart_tab_index, self.charts().len());
    }

    pub fn previous_chart(&mut self) {
        self.chart_tab_index = wrap_decrement(self.chart_tab_index, self.charts().len());
    }

    pub fn scroll_docs_down(&mut self) {
        self.doc_scroll = self.doc_scroll.saturating_add(1);
    }

    pub fn scroll_docs_up(&mut self) {
        self.doc_scroll = self.doc_scroll.saturating_sub(1);
    }

    fn reset_view(&mut self) {
        self.chart_tab_index = 0;
        self.doc_scroll = 0;
    }
}
