//! Reduces a Plotly chart description to series a terminal can draw.
//!
//! Only the common trace types get a shape (scatter/line, bar, pie,
//! histogram); every other trace is listed by kind and size.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::Value;

use crate::domain::ChartDescription;

const HISTOGRAM_BINS: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub enum TraceShape {
    Points { points: Vec<(f64, f64)>, lines: bool },
    Bars(Vec<(String, f64)>),
    Unsupported,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TraceSummary {
    pub kind: String,
    pub name: Option<String>,
    pub len: usize,
    /// Category labels when x was not numeric and points use the index.
    pub categories: Vec<String>,
    pub shape: TraceShape,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlotSummary {
    pub title: Option<String>,
    pub x_title: Option<String>,
    pub y_title: Option<String>,
    pub frame_count: usize,
    pub traces: Vec<TraceSummary>,
}

impl PlotSummary {
    pub fn from_chart(chart: &ChartDescription) -> Self {
        let layout = &chart.layout;
        Self {
            title: layout.get("title").and_then(title_text),
            x_title: layout
                .get("xaxis")
                .and_then(|axis| axis.get("title"))
                .and_then(title_text),
            y_title: layout
                .get("yaxis")
                .and_then(|axis| axis.get("title"))
                .and_then(title_text),
            frame_count: chart.frames.as_ref().map_or(0, Vec::len),
            traces: chart.data.iter().map(summarize_trace).collect(),
        }
    }

    pub fn has_points(&self) -> bool {
        self.traces.iter().any(|trace| {
            matches!(&trace.shape, TraceShape::Points { points, .. } if !points.is_empty())
        })
    }

    pub fn has_bars(&self) -> bool {
        self.traces
            .iter()
            .any(|trace| matches!(&trace.shape, TraceShape::Bars(bars) if !bars.is_empty()))
    }

    /// `[x_min, x_max]` and `[y_min, y_max]` over every point trace.
    pub fn point_bounds(&self) -> Option<([f64; 2], [f64; 2])> {
        let mut points = self.traces.iter().flat_map(|trace| match &trace.shape {
            TraceShape::Points { points, .. } => points.as_slice(),
            _ => &[][..],
        });

        let &(x0, y0) = points.next()?;
        let (mut x, mut y) = ([x0, x0], [y0, y0]);
        for &(px, py) in points {
            x = [x[0].min(px), x[1].max(px)];
            y = [y[0].min(py), y[1].max(py)];
        }

        Some((widen(x), widen(y)))
    }

    /// Category labels of the first point trace that has them.
    pub fn categories(&self) -> Option<&[String]> {
        self.traces
            .iter()
            .find(|trace| !trace.categories.is_empty())
            .map(|trace| trace.categories.as_slice())
    }
}

fn widen(range: [f64; 2]) -> [f64; 2] {
    if (range[1] - range[0]).abs() < f64::EPSILON {
        [range[0] - 1.0, range[1] + 1.0]
    } else {
        range
    }
}

fn title_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(text) => Some(text.as_str()),
        Value::Object(map) => map.get("text").and_then(Value::as_str),
        _ => None,
    }?;

    (!text.is_empty()).then(|| text.to_string())
}

#[derive(Debug, Clone, PartialEq)]
enum Column {
    Numbers(Vec<f64>),
    Labels(Vec<String>),
}

impl Column {
    fn len(&self) -> usize {
        match self {
            Self::Numbers(values) => values.len(),
            Self::Labels(labels) => labels.len(),
        }
    }

    fn labels(&self) -> Vec<String> {
        match self {
            Self::Numbers(values) => values.iter().map(|value| format_number(*value)).collect(),
            Self::Labels(labels) => labels.clone(),
        }
    }
}

fn column(value: Option<&Value>) -> Option<Column> {
    match value? {
        Value::Array(items) => {
            if items.iter().all(|item| item.is_number() || item.is_null()) {
                Some(Column::Numbers(
                    items
                        .iter()
                        .map(|item| item.as_f64().unwrap_or(f64::NAN))
                        .collect(),
                ))
            } else {
                Some(Column::Labels(
                    items
                        .iter()
                        .map(|item| match item {
                            Value::String(text) => text.clone(),
                            other => other.to_string(),
                        })
                        .collect(),
                ))
            }
        }
        Value::Object(map) => {
            let dtype = map.get("dtype")?.as_str()?;
            let bdata = map.get("bdata")?.as_str()?;
            decode_typed_array(dtype, bdata).map(Column::Numbers)
        }
        _ => None,
    }
}

fn read<const N: usize>(bytes: &[u8], convert: fn([u8; N]) -> f64) -> Vec<f64> {
    bytes
        .chunks_exact(N)
        .filter_map(|chunk| <[u8; N]>::try_from(chunk).ok())
        .map(convert)
        .collect()
}

/// Decodes a Plotly typed array (`{"dtype", "bdata"}`), little endian.
#[allow(clippy::cast_precision_loss)]
pub fn decode_typed_array(dtype: &str, bdata: &str) -> Option<Vec<f64>> {
    let bytes = STANDARD.decode(bdata).ok()?;

    let values = match dtype {
        "f8" => read::<8>(&bytes, f64::from_le_bytes),
        "f4" => read::<4>(&bytes, |b| f64::from(f32::from_le_bytes(b))),
        "i1" => read::<1>(&bytes, |b| f64::from(i8::from_le_bytes(b))),
        "u1" => read::<1>(&bytes, |b| f64::from(b[0])),
        "i2" => read::<2>(&bytes, |b| f64::from(i16::from_le_bytes(b))),
        "u2" => read::<2>(&bytes, |b| f64::from(u16::from_le_bytes(b))),
        "i4" => read::<4>(&bytes, |b| f64::from(i32::from_le_bytes(b))),
        "u4" => read::<4>(&bytes, |b| f64::from(u32::from_le_bytes(b))),
        "i8" => read::<8>(&bytes, |b| i64::from_le_bytes(b) as f64),
        "u8" => read::<8>(&bytes, |b| u64::from_le_bytes(b) as f64),
        _ => return None,
    };

    Some(values)
}

/// Short label for an axis tick or bar value.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

fn summarize_trace(trace: &Value) -> TraceSummary {
    let kind = trace
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("scatter")
        .to_string();
    let name = trace
        .get("name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .map(str::to_string);

    let x = column(trace.get("x"));
    let y = column(trace.get("y"));

    let mut summary = TraceSummary {
        kind,
        name,
        len: x.as_ref().or(y.as_ref()).map_or(0, Column::len),
        categories: Vec::new(),
        shape: TraceShape::Unsupported,
    };

    match summary.kind.as_str() {
        "scatter" | "scattergl" => {
            let lines = trace
                .get("mode")
                .and_then(Value::as_str)
                .map_or(true, |mode| mode.contains("lines"));
            if let Some(Column::Numbers(ys)) = y {
                let (points, categories) = point_series(x, &ys);
                summary.len = ys.len();
                summary.categories = categories;
                summary.shape = TraceShape::Points { points, lines };
            }
        }
        "bar" => {
            let horizontal = trace.get("orientation").and_then(Value::as_str) == Some("h");
            let (labels, values) = if horizontal { (y, x) } else { (x, y) };
            if let Some(Column::Numbers(values)) = values {
                let labels = labels.map_or_else(
                    || (1..=values.len()).map(|i| i.to_string()).collect(),
                    |labels| labels.labels(),
                );
                summary.shape = TraceShape::Bars(
                    labels
                        .into_iter()
                        .zip(values)
                        .filter(|(_, value)| value.is_finite())
                        .collect(),
                );
            }
        }
        "pie" => {
            let labels = column(trace.get("labels"));
            if let Some(Column::Numbers(values)) = column(trace.get("values")) {
                let labels = labels.map(|labels| labels.labels()).unwrap_or_default();
                let unnamed = (labels.len() + 1..).map(|i| i.to_string());
                summary.len = values.len();
                summary.shape =
                    TraceShape::Bars(labels.into_iter().chain(unnamed).zip(values).collect());
            }
        }
        "histogram" => {
            if let Some(sample) = x.or(y) {
                summary.shape = TraceShape::Bars(histogram(&sample));
            }
        }
        _ => {}
    }

    summary
}

#[allow(clippy::cast_precision_loss)]
fn point_series(x: Option<Column>, ys: &[f64]) -> (Vec<(f64, f64)>, Vec<String>) {
    let (xs, categories) = match x {
        Some(Column::Numbers(xs)) => (xs, Vec::new()),
        Some(Column::Labels(labels)) => ((0..labels.len()).map(|i| i as f64).collect(), labels),
        None => ((0..ys.len()).map(|i| i as f64).collect(), Vec::new()),
    };

    let points = xs
        .into_iter()
        .zip(ys.iter().copied())
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();

    (points, categories)
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn histogram(sample: &Column) -> Vec<(String, f64)> {
    match sample {
        Column::Labels(labels) => {
            let mut counts: Vec<(String, f64)> = Vec::new();
            for label in labels {
                match counts.iter_mut().find(|(seen, _)| seen == label) {
                    Some((_, count)) => *count += 1.0,
                    None => counts.push((label.clone(), 1.0)),
                }
            }
            counts
        }
        Column::Numbers(values) => {
            let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
            let Some(min) = finite.iter().copied().reduce(f64::min) else {
                return Vec::new();
            };
            let max = finite.iter().copied().fold(min, f64::max);
            let [low, high] = widen([min, max]);
            let width = (high - low) / HISTOGRAM_BINS as f64;

            let mut counts = [0_usize; HISTOGRAM_BINS];
            for value in finite {
                let bin = (((value - low) / width) as usize).min(HISTOGRAM_BINS - 1);
                counts[bin] += 1;
            }

            counts
                .iter()
                .enumerate()
                .map(|(index, count)| {
                    let start = (index as f64).mul_add(width, low);
                    (format_number(start), *count as f64)
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn chart(value: Value) -> ChartDescription {
        serde_json::from_value(value).unwrap_or_else(|e| panic!("invalid test chart: {e}"))
    }

    #[test]
    fn title_accepts_string_or_object() {
        let plain = chart(json!({"data": [], "layout": {"title": "Ventas"}}));
        let object = chart(json!({
            "data": [],
            "layout": {"title": {"text": "Ventas"}, "xaxis": {"title": {"text": "Mes"}}}
        }));

        assert_eq!(PlotSummary::from_chart(&plain).title.as_deref(), Some("Ventas"));
        let summary = PlotSummary::from_chart(&object);
        assert_eq!(summary.title.as_deref(), Some("Ventas"));
        assert_eq!(summary.x_title.as_deref(), Some("Mes"));
        assert_eq!(summary.y_title, None);
    }

    #[test]
    fn numeric_scatter_becomes_points() {
        let summary = PlotSummary::from_chart(&chart(json!({
            "data": [{"type": "scatter", "mode": "markers", "x": [1, 2, 3], "y": [4.0, null, 6.5]}],
            "layout": {}
        })));

        assert_eq!(
            summary.traces[0].shape,
            TraceShape::Points {
                points: vec![(1.0, 4.0), (3.0, 6.5)],
                lines: false
            }
        );
        assert_eq!(summary.point_bounds(), Some(([1.0, 3.0], [4.0, 6.5])));
    }

    #[test]
    fn categorical_x_uses_index_and_keeps_labels() {
        let summary = PlotSummary::from_chart(&chart(json!({
            "data": [{"x": ["2020-01", "2020-02"], "y": [10, 12], "name": "serie"}],
            "layout": {}
        })));

        let trace = &summary.traces[0];
        assert_eq!(trace.kind, "scatter");
        assert_eq!(trace.name.as_deref(), Some("serie"));
        assert_eq!(
            trace.shape,
            TraceShape::Points {
                points: vec![(0.0, 10.0), (1.0, 12.0)],
                lines: true
            }
        );
        assert_eq!(
            summary.categories(),
            Some(&["2020-01".to_string(), "2020-02".to_string()][..])
        );
    }

    #[test]
    fn bar_and_horizontal_bar() {
        let summary = PlotSummary::from_chart(&chart(json!({
            "data": [
                {"type": "bar", "x": ["norte", "sur"], "y": [3, 5]},
                {"type": "bar", "orientation": "h", "x": [7], "y": ["este"]}
            ],
            "layout": {}
        })));

        assert_eq!(
            summary.traces[0].shape,
            TraceShape::Bars(vec![("norte".to_string(), 3.0), ("sur".to_string(), 5.0)])
        );
        assert_eq!(
            summary.traces[1].shape,
            TraceShape::Bars(vec![("este".to_string(), 7.0)])
        );
        assert!(summary.has_bars());
        assert!(!summary.has_points());
    }

    #[test]
    fn pie_uses_labels_and_values() {
        let summary = PlotSummary::from_chart(&chart(json!({
            "data": [{"type": "pie", "labels": ["a", "b"], "values": [1, 3]}],
            "layout": {}
        })));

        assert_eq!(
            summary.traces[0].shape,
            TraceShape::Bars(vec![("a".to_string(), 1.0), ("b".to_string(), 3.0)])
        );
    }

    #[test]
    fn categorical_histogram_counts_in_first_seen_order() {
        let summary = PlotSummary::from_chart(&chart(json!({
            "data": [{"type": "histogram", "x": ["b", "a", "b", "b"]}],
            "layout": {}
        })));

        assert_eq!(
            summary.traces[0].shape,
            TraceShape::Bars(vec![("b".to_string(), 3.0), ("a".to_string(), 1.0)])
        );
    }

    #[test]
    fn numeric_histogram_uses_fixed_bins() {
        let summary = PlotSummary::from_chart(&chart(json!({
            "data": [{"type": "histogram", "x": [0, 0, 5, 10]}],
            "layout": {}
        })));

        let TraceShape::Bars(bins) = &summary.traces[0].shape else {
            panic!("expected bars");
        };
        assert_eq!(bins.len(), HISTOGRAM_BINS);
        assert_eq!(bins[0], ("0".to_string(), 2.0));
        assert_eq!(bins[5].1, 1.0);
        assert_eq!(bins[9].1, 1.0);
    }

    #[test]
    fn typed_arrays_are_decoded() {
        let floats: Vec<u8> = [1.5_f64, -2.0]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        let shorts: Vec<u8> = [300_i16, -7].iter().flat_map(|v| v.to_le_bytes()).collect();

        assert_eq!(
            decode_typed_array("f8", &STANDARD.encode(floats)),
            Some(vec![1.5, -2.0])
        );
        assert_eq!(
            decode_typed_array("i2", &STANDARD.encode(shorts)),
            Some(vec![300.0, -7.0])
        );
        assert_eq!(decode_typed_array("c16", "AAAA"), None);
        assert_eq!(decode_typed_array("f8", "not base64!"), None);
    }

    #[test]
    fn typed_array_trace_is_plotted() {
        let ys: Vec<u8> = [1_u8, 2, 3].to_vec();
        let summary = PlotSummary::from_chart(&chart(json!({
            "data": [{"type": "scatter", "y": {"dtype": "u1", "bdata": STANDARD.encode(ys)}}],
            "layout": {}
        })));

        assert_eq!(
            summary.traces[0].shape,
            TraceShape::Points {
                points: vec![(0.0, 1.0), (1.0, 2.0), (2.0, 3.0)],
                lines: true
            }
        );
    }

    #[test]
    fn unknown_trace_is_listed_only() {
        let summary = PlotSummary::from_chart(&chart(json!({
            "data": [{"type": "choropleth", "locations": ["MEX"], "z": [1]}],
            "layout": {},
            "frames": [{}, {}]
        })));

        assert_eq!(summary.traces[0].kind, "choropleth");
        assert_eq!(summary.traces[0].shape, TraceShape::Unsupported);
        assert_eq!(summary.frame_count, 2);
        assert_eq!(summary.point_bounds(), None);
    }
}
