use crate::app::{App, InputState};
use crate::ui::widgets::charts::{render_chart_panel, render_chart_tabs};
use crate::ui::widgets::popup::{centered_rect, ClearWidget};
use csv_chart_explorer::{LifecycleState, ProjectedInfo};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;
use throbber_widgets_tui::{Throbber, WhichUse, BRAILLE_SIX};

const HEADING: Color = Color::Rgb(0, 0, 238);

const SOURCE_NOTE: &str = "(Nota: La información de origen, estructura y periodo se genera manualmente o podría ser mejorada con más prompts a Gemini.)";
const ANALYSIS_NOTE: &str =
    "(Nota: Esta descripción se genera dinámicamente si los gráficos fueron exitosos.)";
const RELEVANCE_NOTE: &str =
    "(Nota: Esta reflexión se genera dinámicamente si los gráficos fueron exitosos.)";

pub fn render_main(app: &App, f: &mut Frame<'_>) {
    let main_layout = build_main_layout(app, f);

    if app.show_help {
        render_help_popup(f, main_layout[0]);
        return;
    }

    render_load_section(app, f, main_layout[0]);
    render_alert(app, f, main_layout[1]);
    render_content_section(app, f, main_layout[2]);
    render_status_section(app, f, main_layout[3]);
    render_shortcuts(f, main_layout[4]);
}

fn build_main_layout(app: &App, f: &Frame<'_>) -> Vec<Rect> {
    if app.show_help {
        return Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(100)])
            .split(f.area().inner(Margin::new(2, 1)))
            .to_vec();
    }

    let alert_height = if alert_message(app).is_some() { 3 } else { 0 };

    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),            // Load area
            Constraint::Length(alert_height), // Alert box
            Constraint::Min(8),               // Charts and documentation
            Constraint::Length(3),            // Status area
            Constraint::Length(1),            // Shortcuts hint
        ])
        .split(f.area().inner(Margin::new(2, 1)))
        .to_vec()
}

fn section_block(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .title_style(Style::default().fg(HEADING).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
}

fn render_load_section(app: &App, f: &mut Frame<'_>, area: Rect) {
    let block = section_block(" 1. Cargar Datos CSV ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [file_area, action_area, server_area] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(inner);

    f.render_widget(Paragraph::new(file_line(app)), file_area);

    if app.session.state().is_loading() {
        let throbber = Throbber::default()
            .label("Procesando tu CSV y generando los gráficos interactivos...")
            .style(Style::default().fg(Color::Yellow))
            .throbber_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .throbber_set(BRAILLE_SIX)
            .use_type(WhichUse::Spin);
        let mut state = app.throbber_state.clone();
        f.render_stateful_widget(throbber, action_area, &mut state);
    } else {
        let style = if app.session.can_submit() {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let action = TextLine::from(vec![
            Span::styled("[u] ", style),
            Span::styled("Subir y Generar Gráficos Interactivos", style),
        ]);
        f.render_widget(Paragraph::new(action), action_area);
    }

    let server = Span::styled(
        format!("Servidor: {}", app.server_endpoint()),
        Style::default().fg(Color::Gray),
    );
    f.render_widget(Paragraph::new(server), server_area);
}

fn file_line(app: &App) -> TextLine<'_> {
    if app.input_state == InputState::EditingPath {
        return TextLine::from(vec![
            Span::styled("Ruta del CSV: ", Style::default().fg(Color::Yellow)),
            Span::raw(app.current_input.as_str()),
            Span::styled("▏", Style::default().fg(Color::Yellow)),
        ]);
    }

    match app.session.selection().current() {
        Some(input) => TextLine::from(vec![
            Span::styled("Archivo: ", Style::default().fg(Color::Gray)),
            Span::styled(
                input.file_name(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" ({} bytes)", input.len()),
                Style::default().fg(Color::Gray),
            ),
        ]),
        None => TextLine::from(Span::styled(
            "Ningún archivo seleccionado (pulsa 'o' para elegir uno)",
            Style::default().fg(Color::Gray),
        )),
    }
}

fn alert_message(app: &App) -> Option<&str> {
    app.session.notice().or_else(|| {
        app.session
            .state()
            .failure()
            .map(|failure| failure.message.as_str())
    })
}

fn render_alert(app: &App, f: &mut Frame<'_>, area: Rect) {
    let Some(message) = alert_message(app) else {
        return;
    };

    let alert = Paragraph::new(Span::styled(
        message,
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    ))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red)),
    )
    .wrap(Wrap { trim: true });

    f.render_widget(alert, area);
}

fn render_content_section(app: &App, f: &mut Frame<'_>, area: Rect) {
    let [charts_area, docs_area] = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .areas(area);

    render_charts_section(app, f, charts_area);
    render_documentation(app, f, docs_area);
}

fn render_charts_section(app: &App, f: &mut Frame<'_>, area: Rect) {
    let block = section_block(" 2. Gráficos Interactivos Generados ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let placeholder = match app.session.state() {
        LifecycleState::Success(outcome) if outcome.charts.is_empty() => {
            Some("El servidor no devolvió gráficos.")
        }
        LifecycleState::Success(_) => None,
        LifecycleState::Loading { .. } => Some("Generando gráficos..."),
        LifecycleState::Idle | LifecycleState::Error(_) => {
            Some("Selecciona un CSV y súbelo para ver los gráficos aquí.")
        }
    };

    if let Some(text) = placeholder {
        let paragraph = Paragraph::new(Span::styled(text, Style::default().fg(Color::Gray)))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, inner);
        return;
    }

    let [tabs_area, panel_area] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(6)])
        .areas(inner);

    render_chart_tabs(app, f, tabs_area);
    if let Some(chart) = app.charts().get(app.chart_tab_index) {
        render_chart_panel(chart, app.chart_tab_index + 1, f, panel_area);
    }
}

fn render_documentation(app: &App, f: &mut Frame<'_>, area: Rect) {
    let default_info = ProjectedInfo::default();
    let info = app
        .session
        .state()
        .outcome()
        .map_or(&default_info, |outcome| &outcome.info);

    let paragraph = Paragraph::new(Text::from(documentation_lines(info)))
        .block(section_block(" 3. Documentación del Análisis "))
        .wrap(Wrap { trim: true })
        .scroll((app.doc_scroll, 0));

    f.render_widget(paragraph, area);
}

fn documentation_lines(info: &ProjectedInfo) -> Vec<TextLine<'_>> {
    let heading = Style::default().fg(HEADING).add_modifier(Modifier::BOLD);
    let label = Style::default().add_modifier(Modifier::BOLD);
    let note = Style::default()
        .fg(Color::Gray)
        .add_modifier(Modifier::ITALIC);

    vec![
        TextLine::from(Span::styled("Origen y Estructura de los Datos", heading)),
        TextLine::from(vec![
            Span::styled("Fuente: ", label),
            Span::raw(info.source.as_str()),
        ]),
        TextLine::from(vec![
            Span::styled("Variables Clave y Estructura: ", label),
            Span::raw(info.structure.as_str()),
        ]),
        TextLine::from(vec![
            Span::styled("Periodo: ", label),
            Span::raw(info.period.as_str()),
        ]),
        TextLine::from(vec![
            Span::styled("Cobertura Geográfica: ", label),
            Span::raw(info.coverage.as_str()),
        ]),
        TextLine::from(Span::styled(SOURCE_NOTE, note)),
        TextLine::from(""),
        TextLine::from(Span::styled(
            "Tipos de Análisis Disponibles y su Utilidad",
            heading,
        )),
        TextLine::from(info.analysis_types.as_str()),
        TextLine::from(Span::styled(ANALYSIS_NOTE, note)),
        TextLine::from(""),
        TextLine::from(Span::styled(
            "Relevancia de las Visualizaciones en un Contexto Práctico",
            heading,
        )),
        TextLine::from(info.relevance.as_str()),
        TextLine::from(Span::styled(RELEVANCE_NOTE, note)),
    ]
}

fn render_status_section(app: &App, f: &mut Frame<'_>, area: Rect) {
    let status_block = Block::default()
        .title(" Estado ")
        .title_style(Style::default().fg(Color::Yellow))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let style = if app.status_message.starts_with("Error") {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Green)
    };

    let status_paragraph = Paragraph::new(Span::styled(app.status_message.as_str(), style))
        .block(status_block)
        .wrap(Wrap { trim: true });
    f.render_widget(status_paragraph, area);
}

fn render_shortcuts(f: &mut Frame<'_>, area: Rect) {
    let shortcuts_paragraph = Paragraph::new(shortcuts_line()).alignment(Alignment::Center);
    f.render_widget(shortcuts_paragraph, area);
}

const SHORTCUTS: [(&str, &str); 7] = [
    ("F1", "Ayuda"),
    ("o", "Elegir CSV"),
    ("u", "Subir"),
    ("←/→", "Gráfico"),
    ("↑/↓", "Documentación"),
    ("e", "Exportar"),
    ("q", "Salir"),
];

fn shortcuts_line() -> TextLine<'static> {
    let key = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let text = Style::default().fg(Color::Gray);

    let mut spans = Vec::with_capacity(SHORTCUTS.len() * 2);
    for (index, (shortcut, action)) in SHORTCUTS.iter().enumerate() {
        let separator = if index + 1 == SHORTCUTS.len() { "" } else { " | " };
        spans.push(Span::styled(*shortcut, key));
        spans.push(Span::styled(format!(": {action}{separator}"), text));
    }

    TextLine::from(spans)
}

fn render_help_popup(f: &mut Frame<'_>, area: Rect) {
    let popup_area = centered_rect(80, 80, area);
    f.render_widget(ClearWidget, popup_area);

    let help_block = Block::default()
        .title("== Ayuda y Atajos de Teclado ==")
        .title_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let help_paragraph = Paragraph::new(Text::from(build_help_lines()))
        .block(help_block)
        .wrap(Wrap { trim: true });

    f.render_widget(help_paragraph, popup_area);

    let hint = Paragraph::new(Span::styled(
        "Pulsa F1 o Esc para cerrar",
        Style::default().fg(Color::Gray),
    ))
    .alignment(Alignment::Center);

    let hint_area = Rect {
        x: popup_area.x,
        y: popup_area.y + popup_area.height.saturating_sub(2),
        width: popup_area.width,
        height: 1,
    };

    f.render_widget(hint, hint_area);
}

fn build_help_lines() -> Vec<TextLine<'static>> {
    let key = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);

    let mut lines = vec![
        TextLine::from(Span::styled(
            "Análisis de Datos CSV",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        TextLine::from(""),
        TextLine::from(
            "Sube un archivo CSV al servidor de análisis y explora los gráficos que genera.",
        ),
        TextLine::from(""),
        TextLine::from(Span::styled(
            "Atajos de teclado:",
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ];

    let entries = [
        ("  o", " - Escribir la ruta del archivo CSV"),
        ("  Enter", " - Cargar la ruta escrita (vacía para quitar la selección)"),
        ("  Esc", " - Cancelar la edición de la ruta"),
        ("  u", " - Subir el archivo y generar los gráficos"),
        ("  ←/→", " - Cambiar de gráfico"),
        ("  ↑/↓", " - Desplazar la documentación"),
        ("  e", " - Exportar los gráficos como JSON"),
        ("  F1", " - Mostrar u ocultar esta ayuda"),
        ("  q", " - Salir"),
    ];
    lines.extend(entries.into_iter().map(|(shortcut, description)| {
        TextLine::from(vec![Span::styled(shortcut, key), Span::raw(description)])
    }));

    lines
}
