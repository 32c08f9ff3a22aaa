use chrono::{Local, NaiveDate};
use color_eyre::Result;
use csv_chart_explorer::error::UploadError;
use csv_chart_explorer::session::PendingUpload;
use csv_chart_explorer::{AnalysisResponse, AnalysisService, ChartDescription, UploadClient};
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

/// Result of a spawned upload, tagged with the attempt it belongs to.
#[derive(Debug)]
pub struct UploadCompletion {
    pub generation: u64,
    pub result: Result<AnalysisResponse, UploadError>,
}

/// Runs the upload on its own task so the event loop keeps drawing.
pub fn spawn_upload(
    client: UploadClient,
    pending: PendingUpload,
    tx: UnboundedSender<UploadCompletion>,
) {
    tokio::spawn(async move {
        let generation = pending.generation;
        let result = client.upload(&pending.input).await;
        if tx.send(UploadCompletion { generation, result }).is_err() {
            debug!(generation, "upload finished after the app closed");
        }
    });
}

pub fn chart_file_name(date: NaiveDate, file_name: &str, position: usize) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or("analisis");
    let stem = stem.replace(|c: char| !c.is_ascii_alphanumeric() && c != '-' && c != '_', "_");

    format!("{}-{stem}-chart-{position}.json", date.format("%Y-%m-%d"))
}

/// Writes every chart as pretty JSON into `dir`, numbered from 1.
pub fn export_charts(
    dir: &Path,
    file_name: &str,
    charts: &[ChartDescription],
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let today = Local::now().date_naive();

    charts
        .iter()
        .enumerate()
        .map(|(index, chart)| {
            let path = dir.join(chart_file_name(today, file_name, index + 1));
            fs::write(&path, serde_json::to_string_pretty(chart)?)?;
            debug!(path = %path.display(), "chart exported");
            Ok(path)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Map};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap_or_default()
    }

    #[test]
    fn file_name_uses_date_stem_and_position() {
        assert_eq!(
            chart_file_name(date(), "ventas 2023.csv", 2),
            "2024-03-09-ventas_2023-chart-2.json"
        );
    }

    #[test]
    fn file_name_falls_back_when_stem_is_missing() {
        assert_eq!(
            chart_file_name(date(), "", 1),
            "2024-03-09-analisis-chart-1.json"
        );
    }

    #[test]
    fn export_creates_directory_and_writes_each_chart() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let target = dir.path().join("nested").join("charts");
        let mut layout = Map::new();
        layout.insert("title".to_string(), json!("Ventas"));
        let charts = vec![
            ChartDescription {
                data: vec![json!({"type": "bar", "x": ["a"], "y": [1]})],
                layout,
                frames: None,
            },
            ChartDescription {
                data: Vec::new(),
                layout: Map::new(),
                frames: None,
            },
        ];

        let paths = export_charts(&target, "ventas.csv", &charts)?;

        assert_eq!(paths.len(), 2);
        let first: ChartDescription = serde_json::from_str(&fs::read_to_string(&paths[0])?)?;
        assert_eq!(first, charts[0]);
        assert!(paths[1]
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with("-ventas-chart-2.json")));
        Ok(())
    }
}
