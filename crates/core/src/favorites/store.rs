//! The favorites set, persisted as one JSON blob under a fixed key.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use thiserror::Error;
use tracing::{debug, warn};

use super::{FavoriteMovie, KeyValueStore, StorageError};
use crate::catalog::{GenreCatalog, Movie};

/// Storage key holding the serialized favorites.
pub const FAVORITES_KEY: &str = "movie-favorites";

#[derive(Debug, Error)]
pub enum FavoritesError {
    #[error("Failed to persist favorites: {0}")]
    Storage(#[from] StorageError),

    #[error("Failed to serialize favorites: {0}")]
    Serialization(String),
}

/// Identifies a registered observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Observer invoked with the new favorites after every change.
pub type FavoritesObserver = Arc<dyn Fn(&[FavoriteMovie]) + Send + Sync>;

/// Favorites keyed by movie ID, in insertion order.
///
/// Every mutation writes the full set to storage and then calls all observers
/// synchronously, so independent views (search dropdown, favorites table)
/// stay in step.
pub struct FavoritesStore {
    storage: Arc<dyn KeyValueStore>,
    favorites: RwLock<Vec<FavoriteMovie>>,
    observers: Mutex<Vec<(SubscriptionId, FavoritesObserver)>>,
    next_subscription: AtomicU64,
}

impl FavoritesStore {
    /// Load favorites from storage.
    ///
    /// Unreadable or malformed data is logged and treated as an empty set.
    pub fn open(storage: Arc<dyn KeyValueStore>) -> Self {
        let favorites = read_favorites(storage.as_ref());
        debug!("Loaded {} favorites", favorites.len());

        Self {
            storage,
            favorites: RwLock::new(favorites),
            observers: Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(1),
        }
    }

    /// Snapshot of all favorites.
    pub fn favorites(&self) -> Vec<FavoriteMovie> {
        self.read().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn is_favorite(&self, movie_id: u32) -> bool {
        self.read().iter().any(|m| m.id == movie_id)
    }

    /// Append a movie, snapshotting its genre names.
    ///
    /// Does not check for duplicates; pair with [`Self::is_favorite`] or use
    /// [`Self::toggle`].
    pub fn add(&self, movie: &Movie, genres: &GenreCatalog) -> Result<(), FavoritesError> {
        let favorite = FavoriteMovie::from_movie(movie, genres);
        self.mutate(move |list| list.push(favorite))
    }

    /// Remove a movie; absent IDs are not an error.
    pub fn remove(&self, movie_id: u32) -> Result<(), FavoritesError> {
        self.mutate(|list| list.retain(|m| m.id != movie_id))
    }

    /// Remove the movie if present, otherwise add it.
    ///
    /// Returns whether the movie is a favorite afterwards.
    pub fn toggle(&self, movie: &Movie, genres: &GenreCatalog) -> Result<bool, FavoritesError> {
        if self.is_favorite(movie.id) {
            self.remove(movie.id)?;
            Ok(false)
        } else {
            self.add(movie, genres)?;
            Ok(true)
        }
    }

    /// Re-read storage, picking up writes made through another store instance.
    pub fn reload(&self) {
        let fresh = read_favorites(self.storage.as_ref());
        let snapshot = {
            let mut favorites = self.write();
            *favorites = fresh;
            favorites.clone()
        };
        self.notify(&snapshot);
    }

    /// Register an observer called after every change.
    pub fn subscribe(
        &self,
        observer: impl Fn(&[FavoriteMovie]) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(observer)));
        id
    }

    /// Remove an observer. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let before = observers.len();
        observers.retain(|(sid, _)| *sid != id);
        observers.len() != before
    }

    /// Apply a change, persist it, then notify.
    ///
    /// The in-memory set keeps the change even if persisting fails.
    fn mutate(&self, change: impl FnOnce(&mut Vec<FavoriteMovie>)) -> Result<(), FavoritesError> {
        let snapshot = {
            let mut favorites = self.write();
            change(&mut favorites);
            favorites.clone()
        };

        let persisted = self.persist(&snapshot);
        self.notify(&snapshot);
        persisted
    }

    fn persist(&self, favorites: &[FavoriteMovie]) -> Result<(), FavoritesError> {
        let json = serde_json::to_string(favorites)
            .map_err(|e| FavoritesError::Serialization(e.to_string()))?;
        self.storage.set(FAVORITES_KEY, &json)?;
        Ok(())
    }

    fn notify(&self, favorites: &[FavoriteMovie]) {
        // Clone the list so observers may (un)subscribe from inside a callback.
        let observers: Vec<FavoritesObserver> = self
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, o)| Arc::clone(o))
            .collect();

        for observer in observers {
            observer(favorites);
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<FavoriteMovie>> {
        self.favorites.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<FavoriteMovie>> {
        self.favorites.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn read_favorites(storage: &dyn KeyValueStore) -> Vec<FavoriteMovie> {
    match storage.get(FAVORITES_KEY) {
        Ok(Some(json)) => match serde_json::from_str(&json) {
            Ok(favorites) => favorites,
            Err(e) => {
                warn!("Ignoring malformed stored favorites: {}", e);
                Vec::new()
            }
        },
        Ok(None) => Vec::new(),
        Err(e) => {
            warn!("Failed to read stored favorites: {}", e);
            Vec::new()
        }
    }
}
