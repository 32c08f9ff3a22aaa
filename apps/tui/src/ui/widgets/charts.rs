use crate::app::App;
use csv_chart_explorer::plot::{format_number, PlotSummary, TraceShape};
use csv_chart_explorer::ChartDescription;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line as TextLine, Span};
use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph, Tabs,
    Wrap,
};
use ratatui::Frame;

const TRACE_COLORS: [Color; 6] = [
    Color::Rgb(0, 0, 238),
    Color::Cyan,
    Color::Yellow,
    Color::Magenta,
    Color::Green,
    Color::Red,
];

/// Resolution of scaled bar heights.
const BAR_MAX: u64 = 1000;
const BAR_SCALE: f64 = 1000.0;

pub const fn trace_color(index: usize) -> Color {
    TRACE_COLORS[index % TRACE_COLORS.len()]
}

pub fn render_chart_tabs(app: &App, f: &mut Frame<'_>, area: Rect) {
    let titles = (1..=app.charts().len())
        .map(|position| TextLine::from(format!("Gráfico {position}")))
        .collect::<Vec<_>>();

    let tabs = Tabs::new(titles)
        .select(app.chart_tab_index)
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Rgb(0, 0, 238))
                .add_modifier(Modifier::BOLD),
        )
        .divider(Span::raw("|"));

    f.render_widget(tabs, area);
}

/// Draws one chart: the plot itself above a legend of its traces.
pub fn render_chart_panel(chart: &ChartDescription, position: usize, f: &mut Frame<'_>, area: Rect) {
    let summary = PlotSummary::from_chart(chart);
    let legend_height = u16::try_from(summary.traces.len().min(4))
        .unwrap_or(4)
        .saturating_add(u16::from(summary.frame_count > 0))
        .saturating_add(2);

    let [plot_area, legend_area] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(legend_height)])
        .areas(area);

    let title = summary
        .title
        .clone()
        .unwrap_or_else(|| format!("Gráfico {position}"));
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    if summary.has_points() {
        render_point_chart(&summary, block, f, plot_area);
    } else if summary.has_bars() {
        render_bar_chart(&summary, block, f, plot_area);
    } else {
        let paragraph = Paragraph::new("Este gráfico no se puede dibujar en la terminal.")
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, plot_area);
    }

    render_trace_legend(&summary, f, legend_area);
}

fn render_point_chart(summary: &PlotSummary, block: Block<'_>, f: &mut Frame<'_>, area: Rect) {
    let Some((x_bounds, y_bounds)) = summary.point_bounds() else {
        return;
    };

    let datasets = summary
        .traces
        .iter()
        .enumerate()
        .filter_map(|(index, trace)| match &trace.shape {
            TraceShape::Points { points, lines } => Some(
                Dataset::default()
                    .name(trace.name.clone().unwrap_or_else(|| trace.kind.clone()))
                    .marker(Marker::Braille)
                    .graph_type(if *lines {
                        GraphType::Line
                    } else {
                        GraphType::Scatter
                    })
                    .style(Style::default().fg(trace_color(index)))
                    .data(points),
            ),
            _ => None,
        })
        .collect::<Vec<_>>();

    let x_labels = summary.categories().map_or_else(
        || numeric_labels(x_bounds),
        |categories| {
            let first = categories.first().cloned().unwrap_or_default();
            let last = categories.last().cloned().unwrap_or_default();
            vec![Span::raw(first), Span::raw(last)]
        },
    );

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .title(summary.x_title.clone().unwrap_or_default())
                .style(Style::default().fg(Color::Gray))
                .bounds(x_bounds)
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title(summary.y_title.clone().unwrap_or_default())
                .style(Style::default().fg(Color::Gray))
                .bounds(y_bounds)
                .labels(numeric_labels(y_bounds)),
        );

    f.render_widget(chart, area);
}

fn numeric_labels(bounds: [f64; 2]) -> Vec<Span<'static>> {
    let middle = (bounds[0] + bounds[1]) / 2.0;
    [bounds[0], middle, bounds[1]]
        .into_iter()
        .map(|value| Span::raw(format_number(value)))
        .collect()
}

fn render_bar_chart(summary: &PlotSummary, block: Block<'_>, f: &mut Frame<'_>, area: Rect) {
    let Some((index, values)) = summary
        .traces
        .iter()
        .enumerate()
        .find_map(|(index, trace)| match &trace.shape {
            TraceShape::Bars(values) if !values.is_empty() => Some((index, values)),
            _ => None,
        })
    else {
        return;
    };

    let scaled = scale_bars(values);
    let bars: Vec<Bar<'_>> = values
        .iter()
        .zip(scaled)
        .map(|((label, value), height)| {
            Bar::default()
                .value(height)
                .text_value(format_number(*value))
                .label(TextLine::from(label.as_str()))
                .style(Style::default().fg(trace_color(index)))
                .value_style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
        })
        .collect();

    let count = u16::try_from(bars.len()).unwrap_or(u16::MAX).max(1);
    let bar_width = (area.width.saturating_sub(2) / count)
        .saturating_sub(1)
        .clamp(1, 12);

    let chart = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .max(BAR_MAX)
        .bar_gap(1)
        .bar_width(bar_width);

    f.render_widget(chart, area);
}

/// Maps bar values onto `0..=BAR_SCALE`; negative values draw as empty bars.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scale_bars(values: &[(String, f64)]) -> Vec<u64> {
    let max = values
        .iter()
        .map(|(_, value)| *value)
        .fold(0.0_f64, f64::max);

    values
        .iter()
        .map(|(_, value)| {
            if max <= 0.0 {
                0
            } else {
                (value.max(0.0) / max * BAR_SCALE).round() as u64
            }
        })
        .collect()
}

fn render_trace_legend(summary: &PlotSummary, f: &mut Frame<'_>, area: Rect) {
    let mut lines = summary
        .traces
        .iter()
        .enumerate()
        .take(4)
        .map(|(index, trace)| {
            let name = trace.name.as_deref().unwrap_or("(sin nombre)");
            TextLine::from(vec![
                Span::styled("■ ", Style::default().fg(trace_color(index))),
                Span::raw(format!("{name} ({}, {} valores)", trace.kind, trace.len)),
            ])
        })
        .collect::<Vec<_>>();

    if summary.frame_count > 0 {
        lines.push(TextLine::from(Span::styled(
            format!(
                "Animación de {} fotogramas: se muestra el estado inicial",
                summary.frame_count
            ),
            Style::default().fg(Color::Gray),
        )));
    }

    let legend = Paragraph::new(lines).block(
        Block::default()
            .title(format!("Series ({})", summary.traces.len()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Gray)),
    );

    f.render_widget(legend, area);
}
