use tracing::{info, warn};

use crate::client::AnalysisService;
use crate::domain::{AnalysisResponse, AttemptFailure, FailureKind};
use crate::error::{SubmitError, UploadError};
use crate::lifecycle::{Completion, LifecycleState, RequestLifecycle};
use crate::projection::project;
use crate::selection::{FileSelection, SelectedInput};

/// An accepted submit: the attempt's generation and the file to send.
#[derive(Debug, Clone)]
pub struct PendingUpload {
    pub generation: u64,
    pub input: SelectedInput,
}

/// Selection, lifecycle and inline validation notice of one client session.
#[derive(Debug, Default)]
pub struct UploadSession {
    selection: FileSelection,
    lifecycle: RequestLifecycle,
    notice: Option<String>,
}

impl UploadSession {
    pub const fn new() -> Self {
        Self {
            selection: FileSelection::new(),
            lifecycle: RequestLifecycle::new(),
            notice: None,
        }
    }

    pub const fn selection(&self) -> &FileSelection {
        &self.selection
    }

    pub const fn state(&self) -> &LifecycleState {
        self.lifecycle.state()
    }

    /// Validation text from the last rejected submit, if any.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub const fn can_submit(&self) -> bool {
        self.selection.has_selection() && self.lifecycle.can_submit()
    }

    /// Picks a new file. A finished result from an earlier file is dropped.
    pub fn select(&mut self, input: SelectedInput) {
        info!(file = input.file_name(), bytes = input.len(), "file selected");
        self.selection.select(input);
        self.lifecycle.reset();
        self.notice = None;
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.lifecycle.reset();
        self.notice = None;
    }

    pub fn submit(&mut self) -> Result<PendingUpload, SubmitError> {
        let input = self.selection.current().cloned();
        let result = self
            .lifecycle
            .submit(input.is_some())
            .and_then(|generation| {
                input
                    .map(|input| PendingUpload { generation, input })
                    .ok_or(SubmitError::NoFileSelected)
            });

        match &result {
            Ok(pending) => {
                self.notice = None;
                info!(
                    generation = pending.generation,
                    file = pending.input.file_name(),
                    "upload submitted"
                );
            }
            Err(SubmitError::NoFileSelected) => {
                self.notice = Some(SubmitError::NoFileSelected.to_string());
            }
            Err(SubmitError::InFlight) => {
                warn!("submit ignored while an upload is running");
            }
        }

        result
    }

    /// Feeds the result of attempt `generation` through projection and into
    /// the lifecycle.
    pub fn finish(
        &mut self,
        generation: u64,
        result: Result<AnalysisResponse, UploadError>,
    ) -> Completion {
        let outcome = match result {
            Ok(response) => project(&response).map_err(|e| {
                warn!(generation, error = %e, "analysis response could not be projected");
                AttemptFailure::new(FailureKind::MalformedPayload, e.user_message())
            }),
            Err(e) => {
                warn!(generation, error = %e, "upload failed");
                Err(AttemptFailure::new(e.kind(), e.user_message()))
            }
        };

        self.lifecycle.complete(generation, outcome)
    }

    /// Submits the current selection and waits for `service` to answer.
    pub async fn upload_with<S: AnalysisService>(
        &mut self,
        service: &S,
    ) -> Result<&LifecycleState, SubmitError> {
        let pending = self.submit()?;
        let result = service.upload(&pending.input).await;
        self.finish(pending.generation, result);
        Ok(self.lifecycle.state())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::interpret_response;
    use crate::domain::{
        ANALYSIS_TYPES_FALLBACK, GENERIC_UPLOAD_ERROR, MISSING_CHARTS, NO_FILE_SELECTED,
        SERVER_UNREACHABLE,
    };
    use std::sync::Mutex;

    type Reply = fn() -> Result<AnalysisResponse, UploadError>;

    struct FakeService {
        reply: Reply,
        seen: Mutex<Vec<String>>,
    }

    impl FakeService {
        fn new(reply: Reply) -> Self {
            Self {
                reply,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.seen.lock().map(|seen| seen.len()).unwrap_or_default()
        }
    }

    impl AnalysisService for FakeService {
        async fn upload(&self, input: &SelectedInput) -> Result<AnalysisResponse, UploadError> {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(input.file_name().to_string());
            }
            (self.reply)()
        }
    }

    fn national() -> Result<AnalysisResponse, UploadError> {
        Ok(AnalysisResponse {
            plotly_figures_json: Some(vec![r#"{"data":[],"layout":{}}"#.to_string()]),
            geographic_coverage: Some("National".to_string()),
            ..AnalysisResponse::default()
        })
    }

    fn bad_file() -> Result<AnalysisResponse, UploadError> {
        Err(UploadError::Service {
            status: 400,
            message: Some("bad file".to_string()),
        })
    }

    fn unreachable_server() -> Result<AnalysisResponse, UploadError> {
        match reqwest::Client::new().get("not a url").build() {
            Err(e) => Err(UploadError::Transport(e)),
            Ok(_) => panic!("expected an invalid request"),
        }
    }

    fn malformed_chart() -> Result<AnalysisResponse, UploadError> {
        Ok(AnalysisResponse {
            plotly_figures_json: Some(vec![
                r#"{"data":[],"layout":{}}"#.to_string(),
                "oops".to_string(),
            ]),
            ..AnalysisResponse::default()
        })
    }

    fn session_with_file() -> UploadSession {
        let mut session = UploadSession::new();
        session.select(SelectedInput::new("datos.csv", b"a,b\n1,2\n".to_vec()));
        session
    }

    #[tokio::test]
    async fn successful_upload_projects_charts() -> Result<(), SubmitError> {
        let service = FakeService::new(national);
        let mut session = session_with_file();

        let state = session.upload_with(&service).await?;

        let outcome = state.outcome();
        assert_eq!(outcome.map(|o| o.charts.len()), Some(1));
        assert_eq!(outcome.map(|o| o.info.coverage.as_str()), Some("National"));
        assert_eq!(
            outcome.map(|o| o.info.analysis_types.as_str()),
            Some(ANALYSIS_TYPES_FALLBACK)
        );
        assert_eq!(service.calls(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn service_error_message_is_kept() -> Result<(), SubmitError> {
        let service = FakeService::new(bad_file);
        let mut session = session_with_file();

        let state = session.upload_with(&service).await?;

        assert_eq!(
            state.failure(),
            Some(&AttemptFailure::new(FailureKind::Service, "bad file"))
        );
        Ok(())
    }

    #[tokio::test]
    async fn transport_failure_uses_connectivity_message() -> Result<(), SubmitError> {
        let service = FakeService::new(unreachable_server);
        let mut session = session_with_file();

        let state = session.upload_with(&service).await?;

        assert_eq!(
            state.failure(),
            Some(&AttemptFailure::new(FailureKind::Transport, SERVER_UNREACHABLE))
        );
        Ok(())
    }

    #[tokio::test]
    async fn malformed_chart_fails_without_partial_output() -> Result<(), SubmitError> {
        let service = FakeService::new(malformed_chart);
        let mut session = session_with_file();

        let state = session.upload_with(&service).await?;

        assert!(state.outcome().is_none());
        assert_eq!(
            state.failure().map(|f| f.kind),
            Some(FailureKind::MalformedPayload)
        );
        Ok(())
    }

    #[tokio::test]
    async fn submit_without_file_never_reaches_service() {
        let service = FakeService::new(national);
        let mut session = UploadSession::new();

        let result = session.upload_with(&service).await.map(|_| ());

        assert_eq!(result, Err(SubmitError::NoFileSelected));
        assert_eq!(session.notice(), Some(NO_FILE_SELECTED));
        assert_eq!(session.state(), &LifecycleState::Idle);
        assert_eq!(service.calls(), 0);
    }

    #[test]
    fn new_selection_clears_stale_error_and_notice() {
        let mut session = UploadSession::new();
        let _ = session.submit();
        assert!(session.notice().is_some());

        let mut session = session_with_file();
        let pending = session.submit();
        let generation = pending.map(|p| p.generation).unwrap_or_default();
        session.finish(generation, bad_file());
        assert!(session.state().failure().is_some());

        session.select(SelectedInput::new("otro.csv", Vec::new()));

        assert_eq!(session.state(), &LifecycleState::Idle);
        assert_eq!(session.notice(), None);
    }

    #[test]
    fn accepted_submit_clears_previous_charts() {
        let mut session = session_with_file();
        let first = session.submit().map(|p| p.generation).unwrap_or_default();
        session.finish(first, national());
        assert!(session.state().outcome().is_some());

        let second = session.submit().map(|p| p.generation);

        assert_eq!(second, Ok(first + 1));
        assert!(session.state().is_loading());
        assert!(session.state().outcome().is_none());
        assert!(!session.can_submit());
    }

    #[test]
    fn late_completion_is_dropped() {
        let mut session = session_with_file();
        let first = session.submit().map(|p| p.generation).unwrap_or_default();
        session.finish(first, bad_file());
        let second = session.submit().map(|p| p.generation).unwrap_or_default();

        assert_eq!(session.finish(first, national()), Completion::Stale);
        assert_eq!(session.state(), &LifecycleState::Loading { generation: second });
    }

    #[test]
    fn success_without_chart_list_is_an_error() {
        let mut session = session_with_file();

        for body in [&br#"{"status":"success"}"#[..], &br#"{"plotly_figures_json":null}"#[..]] {
            let generation = session.submit().map(|p| p.generation).unwrap_or_default();
            session.finish(generation, interpret_response(200, body));

            let failure = session.state().failure();
            assert_eq!(failure.map(|f| f.kind), Some(FailureKind::MalformedPayload));
            assert_eq!(failure.map(|f| f.message.as_str()), Some(MISSING_CHARTS));
            assert!(session.state().outcome().is_none());
        }
    }

    #[test]
    fn submit_while_loading_is_in_flight_even_after_clearing() {
        let mut session = session_with_file();
        let first = session.submit().map(|p| p.generation).unwrap_or_default();
        session.clear_selection();

        assert!(matches!(session.submit(), Err(SubmitError::InFlight)));
        assert_eq!(session.notice(), None);
        assert_eq!(session.state(), &LifecycleState::Loading { generation: first });
    }

    #[test]
    fn decode_failure_uses_generic_message() {
        let mut session = session_with_file();
        let generation = session.submit().map(|p| p.generation).unwrap_or_default();
        let decode = serde_json::from_str::<AnalysisResponse>("nope")
            .map_err(UploadError::Decode)
            .map(|_| AnalysisResponse::default());

        session.finish(generation, decode);

        assert_eq!(
            session.state().failure().map(|f| f.message.as_str()),
            Some(GENERIC_UPLOAD_ERROR)
        );
    }
}
