//! Incremental search & selection controller.
//!
//! [`SearchController`] is the synchronous state machine behind the search
//! dropdown; [`SearchDriver`] runs it on tokio against a [`MovieCatalog`].
//!
//! [`MovieCatalog`]: crate::catalog::MovieCatalog

mod driver;
mod state;
mod types;

pub use driver::{Completion, DriverEvent, SearchDriver};
pub use state::SearchController;
pub use types::{Effect, Key, KeyOutcome, ScrollMetrics, VisibleItem};
