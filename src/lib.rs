pub mod bridge;
pub mod config;
pub mod decode;
pub mod error;
pub mod export;
pub mod geometry;
pub mod input;
pub mod logging;
pub mod notification;
pub mod overlay;
pub mod selection;
pub mod session;
pub mod shell;

pub use error::{AppError, AppResult};
pub use overlay::{OverlayDeps, ScreenshotOverlay};

/// Initialises logging and ambient configuration for a hosting shell.
pub fn init() -> config::AppConfig {
    let config = config::load_app_config();
    logging::init(config.log_filter.as_deref());
    tracing::info!("studysnap core initialised");
    config
}
