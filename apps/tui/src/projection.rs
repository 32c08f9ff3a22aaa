//! Turns a raw service response into the fields the UI renders.
//!
//! Chart specifications arrive double encoded: each entry of
//! `plotly_figures_json` is a string holding its own JSON document. They are
//! decoded here, before anything reaches a renderer, so a malformed entry
//! fails the whole response instead of a single chart panel.

use tracing::debug;

use crate::domain::{
    AnalysisOutcome, AnalysisResponse, ChartDescription, ProjectedInfo, ANALYSIS_TYPES_FALLBACK,
    COVERAGE_FALLBACK, RELEVANCE_STATEMENT,
};
use crate::error::ProjectionError;

pub fn project(response: &AnalysisResponse) -> Result<AnalysisOutcome, ProjectionError> {
    let encoded = response
        .plotly_figures_json
        .as_deref()
        .ok_or(ProjectionError::MissingCharts)?;
    let charts = decode_charts(encoded)?;

    let info = ProjectedInfo {
        coverage: text_or(response.geographic_coverage.as_deref(), COVERAGE_FALLBACK),
        analysis_types: text_or(response.analysis_types.as_deref(), ANALYSIS_TYPES_FALLBACK),
        relevance: RELEVANCE_STATEMENT.to_string(),
        ..ProjectedInfo::default()
    };

    debug!(charts = charts.len(), "projected analysis response");

    Ok(AnalysisOutcome { charts, info })
}

/// Decodes every chart string, in order. The first failure aborts.
pub fn decode_charts(encoded: &[String]) -> Result<Vec<ChartDescription>, ProjectionError> {
    encoded
        .iter()
        .enumerate()
        .map(|(index, json)| {
            serde_json::from_str::<ChartDescription>(json).map_err(|source| {
                ProjectionError::MalformedChart {
                    position: index + 1,
                    source,
                }
            })
        })
        .collect()
}

fn text_or(value: Option<&str>, fallback: &str) -> String {
    value
        .filter(|text| !text.is_empty())
        .unwrap_or(fallback)
        .to_string()
}
