use color_eyre::eyre::eyre;
use color_eyre::Result;
use crossterm::event::{self, Event, KeyEventKind};
use csv_chart_explorer::domain::AttemptFailure;
use csv_chart_explorer::plot::PlotSummary;
use csv_chart_explorer::{LifecycleState, ProjectedInfo, SelectedInput, UploadClient, UploadSession};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::Stdout;
use std::path::Path;

use crate::app::{handle_input, App};
use crate::ui;

/// Upload one file without a terminal and print the outcome.
pub async fn run_headless(client: &UploadClient, file: &Path, json: bool) -> Result<()> {
    let mut session = UploadSession::new();
    session.select(SelectedInput::from_path(file)?);

    let state = session.upload_with(client).await?;
    let report = HeadlessReport::from_state(state);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        render_headless_text(&report);
    }

    match state.failure() {
        Some(failure) => Err(eyre!("{}", failure.message)),
        None => Ok(()),
    }
}

fn render_headless_text(report: &HeadlessReport<'_>) {
    if let Some(failure) = report.error {
        println!("\nError ({})", failure.kind.label());
        println!("{}", failure.message);
        return;
    }

    println!("\nGráficos Interactivos Generados");
    println!("===============================");
    if report.charts.is_empty() {
        println!("El servidor no devolvió gráficos.");
    }
    for chart in &report.charts {
        println!(
            "- Gráfico {}: {} [{}]{}",
            chart.position,
            chart.title.as_deref().unwrap_or("(sin título)"),
            chart.traces.join(", "),
            if chart.frames > 0 {
                format!(" ({} fotogramas)", chart.frames)
            } else {
                String::new()
            }
        );
    }

    if let Some(info) = report.info {
        println!("\nOrigen y Estructura de los Datos");
        println!("Fuente: {}", info.source);
        println!("Variables Clave y Estructura: {}", info.structure);
        println!("Periodo: {}", info.period);
        println!("Cobertura Geográfica: {}", info.coverage);
        println!("\nTipos de Análisis Disponibles y su Utilidad");
        println!("{}", info.analysis_types);
        println!("\nRelevancia de las Visualizaciones en un Contexto Práctico");
        println!("{}", info.relevance);
    }
}

#[derive(serde::Serialize)]
struct HeadlessReport<'a> {
    state: &'static str,
    charts: Vec<HeadlessChart>,
    info: Option<&'a ProjectedInfo>,
    error: Option<&'a AttemptFailure>,
}

impl<'a> HeadlessReport<'a> {
    fn from_state(state: &'a LifecycleState) -> Self {
        let outcome = state.outcome();
        let charts = outcome
            .map(|outcome| {
                outcome
                    .charts
                    .iter()
                    .enumerate()
                    .map(|(index, chart)| {
                        let summary = PlotSummary::from_chart(chart);
                        HeadlessChart {
                            position: index + 1,
                            title: summary.title,
                            traces: summary.traces.into_iter().map(|t| t.kind).collect(),
                            frames: summary.frame_count,
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            state: state.name(),
            charts,
            info: outcome.map(|outcome| &outcome.info),
            error: state.failure(),
        }
    }
}

#[derive(serde::Serialize)]
struct HeadlessChart {
    position: usize,
    title: Option<String>,
    traces: Vec<String>,
    frames: usize,
}

/// Run the main application event loop
pub async fn run(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    // Configure event poll timeout (ms)
    const EVENT_POLL_TIMEOUT: u64 = 50;

    loop {
        app.update();
        app.poll_uploads();

        if let Err(e) = terminal.draw(|f| ui::ui(app, f)) {
            return Err(eyre!("Terminal draw error: {e}"));
        }

        if matches!(
            event::poll(std::time::Duration::from_millis(EVENT_POLL_TIMEOUT)),
            Ok(true)
        ) {
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    handle_input(app, key.code);
                    if !app.running {
                        break;
                    }
                }
                Ok(Event::Resize(_, _)) => {
                    // Non-fatal; the next iteration draws again
                    let _ = terminal.draw(|f| ui::ui(app, f));
                }
                Ok(_) | Err(_) => {}
            }
        }

        // Let spawned uploads make progress between frames
        tokio::task::yield_now().await;
    }

    Ok(())
}
