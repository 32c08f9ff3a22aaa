// Upload-to-render pipeline shared by the TUI, headless mode and tests
pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod lifecycle;
pub mod plot;
pub mod projection;
pub mod selection;
pub mod session;

pub use client::{AnalysisService, UploadClient};
pub use domain::{AnalysisOutcome, AnalysisResponse, ChartDescription, ProjectedInfo};
pub use lifecycle::LifecycleState;
pub use selection::SelectedInput;
pub use session::{PendingUpload, UploadSession};
