//! Link opener that records URLs instead of launching a browser.

use std::sync::Mutex;

use crate::navigation::{LinkOpener, NavigationError};

/// Records every opened URL for test assertions.
#[derive(Debug, Default)]
pub struct RecordingLinkOpener {
    opened: Mutex<Vec<String>>,
}

impl RecordingLinkOpener {
    pub fn new() -> Self {
        Self::default()
    }

    /// URLs opened so far, oldest first.
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

impl LinkOpener for RecordingLinkOpener {
    fn open(&self, url: &str) -> Result<(), NavigationError> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}
