//! Locally persisted favorite movies.

mod sqlite_storage;
mod storage;
mod store;
mod types;

pub use sqlite_storage::SqliteKeyValueStore;
pub use storage::{KeyValueStore, MemoryKeyValueStore, StorageError};
pub use store::{
    FavoritesError, FavoritesObserver, FavoritesStore, SubscriptionId, FAVORITES_KEY,
};
pub use types::FavoriteMovie;
