//! Opening external URLs in a new browsing context.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("Failed to open {url}: {message}")]
    OpenFailed { url: String, message: String },
}

/// Opens URLs outside the application (browser, system handler).
pub trait LinkOpener: Send + Sync {
    fn open(&self, url: &str) -> Result<(), NavigationError>;
}
