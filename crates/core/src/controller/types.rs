use crate::catalog::{FallbackLink, Movie};
use crate::search::PageRequest;

/// Keys the controller reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Down,
    Up,
    Right,
    Left,
    Enter,
    Space,
    Escape,
}

/// Work the controller asks its owner to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Fetch a result page and feed it back through `apply_page`.
    FetchPage(PageRequest),
    /// Open an external URL.
    OpenUrl(String),
    /// Resolve the movie's detail page and open it.
    OpenDetails(Movie),
    /// The user picked a movie; the interaction is over.
    MovieChosen(Movie),
}

/// Result of a key press.
#[derive(Debug, Default, PartialEq)]
pub struct KeyOutcome {
    /// The key was consumed; the shell must not apply its default action.
    pub handled: bool,
    pub effects: Vec<Effect>,
}

impl KeyOutcome {
    pub(crate) fn ignored() -> Self {
        Self::default()
    }

    pub(crate) fn handled(effects: Vec<Effect>) -> Self {
        Self {
            handled: true,
            effects,
        }
    }
}

/// An entry of the dropdown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VisibleItem<'a> {
    Movie(&'a Movie),
    Fallback(FallbackLink),
}

/// Scroll position of the dropdown, in rows (or pixels; only ratios matter).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollMetrics {
    pub scroll_top: u32,
    pub scroll_height: u32,
    pub client_height: u32,
}

impl ScrollMetrics {
    /// Within one and a half viewports of the end.
    pub fn is_near_bottom(&self) -> bool {
        let remaining = self.scroll_height.saturating_sub(self.scroll_top) as f64;
        remaining <= self.client_height as f64 * 1.5
    }
}
