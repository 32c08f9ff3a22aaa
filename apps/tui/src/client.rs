use std::future::Future;

use reqwest::multipart::{Form, Part};
use tracing::{debug, info, warn};

use crate::domain::{AnalysisResponse, UPLOAD_FIELD, UPLOAD_PATH};
use crate::error::{ConfigError, UploadError};
use crate::selection::SelectedInput;

/// Something that can analyse an uploaded file.
pub trait AnalysisService {
    fn upload(
        &self,
        input: &SelectedInput,
    ) -> impl Future<Output = Result<AnalysisResponse, UploadError>> + Send;
}

/// HTTP client for the analysis endpoint.
///
/// One POST per call: no retries, no timeout, no cancellation.
#[derive(Debug, Clone)]
pub struct UploadClient {
    http: reqwest::Client,
    endpoint: String,
}

impl UploadClient {
    pub fn new(server_url: &str) -> Result<Self, ConfigError> {
        let base = server_url.trim().trim_end_matches('/');
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::InvalidServerUrl {
                url: server_url.to_string(),
            });
        }

        let http = reqwest::Client::builder()
            .build()
            .map_err(ConfigError::Client)?;

        Ok(Self {
            http,
            endpoint: format!("{base}{UPLOAD_PATH}"),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl AnalysisService for UploadClient {
    async fn upload(&self, input: &SelectedInput) -> Result<AnalysisResponse, UploadError> {
        let part = Part::bytes(input.content().to_vec()).file_name(input.file_name().to_string());
        let form = Form::new().part(UPLOAD_FIELD, part);

        info!(
            endpoint = %self.endpoint,
            file = input.file_name(),
            bytes = input.len(),
            "uploading file for analysis"
        );

        let response = self
            .http
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(UploadError::Transport)?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(UploadError::Transport)?;
        debug!(status, bytes = body.len(), "analysis response received");

        interpret_response(status, &body)
    }
}

/// Splits a raw HTTP answer into a usable response or a service failure.
pub fn interpret_response(status: u16, body: &[u8]) -> Result<AnalysisResponse, UploadError> {
    let parsed = serde_json::from_slice::<AnalysisResponse>(body);

    if !(200..300).contains(&status) {
        let response = parsed.ok();
        if let Some(code) = response.as_ref().and_then(|r| r.generated_code.as_deref()) {
            debug!(generated_code = code, "service returned diagnostics");
        }
        let message = response.and_then(|r| r.error);
        warn!(status, ?message, "analysis service reported a failure");
        return Err(UploadError::Service { status, message });
    }

    let response = parsed.map_err(UploadError::Decode)?;
    if response.error.is_some() {
        warn!(status, error = ?response.error, "successful status carried an error");
        return Err(UploadError::Service {
            status,
            message: response.error,
        });
    }

    Ok(response)
}
