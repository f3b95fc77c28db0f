//! Paged search over the movie catalog.

mod session;

pub use session::{PageRequest, PageResponse, SearchSession, MAX_PAGES};
