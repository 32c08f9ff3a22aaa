pub mod logging;
pub mod settings;

pub use logging::{init_logging, LogTarget};
pub use settings::AppConfig;
