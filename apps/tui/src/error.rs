use std::path::PathBuf;
use thiserror::Error;

use crate::domain::{
    FailureKind, GENERIC_UPLOAD_ERROR, MISSING_CHARTS, NO_FILE_SELECTED, SERVER_UNREACHABLE,
};

/// Failures of a single upload round trip.
#[derive(Debug, Error)]
pub enum UploadError {
    /// No response was obtained at all.
    #[error("request did not complete: {0}")]
    Transport(#[source] reqwest::Error),
    /// A successful status carried a body that is not the expected JSON.
    #[error("response body is not valid JSON: {0}")]
    Decode(#[source] serde_json::Error),
    /// The service answered and flagged the request as failed.
    #[error("service rejected the upload (status {status})")]
    Service { status: u16, message: Option<String> },
}

impl UploadError {
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Transport(_) => FailureKind::Transport,
            Self::Decode(_) | Self::Service { .. } => FailureKind::Service,
        }
    }

    /// Text shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport(_) => SERVER_UNREACHABLE.to_string(),
            Self::Decode(_) => GENERIC_UPLOAD_ERROR.to_string(),
            Self::Service { message, .. } => message
                .as_deref()
                .filter(|message| !message.is_empty())
                .unwrap_or(GENERIC_UPLOAD_ERROR)
                .to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("chart {position} is not a valid chart description: {source}")]
    MalformedChart {
        /// One-based position in the response list.
        position: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("response has no plotly_figures_json list")]
    MissingCharts,
}

impl ProjectionError {
    pub fn user_message(&self) -> String {
        match self {
            Self::MalformedChart { position, .. } => {
                format!("El gráfico {position} devuelto por el servidor no es válido.")
            }
            Self::MissingCharts => MISSING_CHARTS.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("{}", NO_FILE_SELECTED)]
    NoFileSelected,
    #[error("an upload is already in progress")]
    InFlight,
}

#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("no file path given")]
    EmptyPath,
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid server URL {url:?}: expected http:// or https://")]
    InvalidServerUrl { url: String },
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_message_is_surfaced_verbatim() {
        let error = UploadError::Service {
            status: 400,
            message: Some("bad file".to_string()),
        };

        assert_eq!(error.user_message(), "bad file");
        assert_eq!(error.kind(), FailureKind::Service);
    }

    #[test]
    fn service_without_message_uses_generic_text() {
        let missing = UploadError::Service {
            status: 500,
            message: None,
        };
        let empty = UploadError::Service {
            status: 500,
            message: Some(String::new()),
        };

        assert_eq!(missing.user_message(), GENERIC_UPLOAD_ERROR);
        assert_eq!(empty.user_message(), GENERIC_UPLOAD_ERROR);
    }

    #[test]
    fn no_file_selected_displays_validation_text() {
        assert_eq!(SubmitError::NoFileSelected.to_string(), NO_FILE_SELECTED);
    }
}
