//! Persistence contract for bookmarked places.
//!
//! The [`FavouritesStore`] trait defines a single-table store keyed by
//! [`PlaceId`]. Writes use replace-on-conflict semantics and every committed
//! change is pushed to observers as a full-table snapshot.

use async_trait::async_trait;
use thiserror::Error;

use crate::{FavouritePlace, PlaceId};

mod feed;
#[cfg(feature = "store-sqlite")]
mod sqlite;

pub use feed::{FavouritesSubscription, SnapshotFeed};
#[cfg(feature = "store-sqlite")]
pub use sqlite::{DATABASE_FILE, SCHEMA_VERSION, SqliteFavouritesStore, SqliteFavouritesStoreError};

/// Errors surfaced by [`FavouritesStore`] operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FavouritesStoreError {
    /// The storage engine rejected the operation.
    #[error("failed to {operation} favourite places: {message}")]
    Storage {
        /// Short description of the attempted operation.
        operation: &'static str,
        /// Engine error description.
        message: String,
    },
    /// The background worker ended before reporting a result.
    #[error("favourites worker stopped during {operation}")]
    WorkerStopped {
        /// Short description of the attempted operation.
        operation: &'static str,
    },
}

/// Local store of favourite places.
///
/// Listing order is insertion order; re-inserting an existing identifier
/// replaces the row and moves it to the end.
///
/// # Examples
///
/// ```rust
/// use pois_core::test_support::{MemoryFavouritesStore, block_on};
/// use pois_core::{DeviceLocation, FavouritePlace, FavouritesStore, PlaceId};
///
/// let store = MemoryFavouritesStore::default();
/// let place = FavouritePlace {
///     id: PlaceId::from("museum"),
///     name: "Museum".into(),
///     vicinity: "1 Museum Way".into(),
///     location: DeviceLocation::new(1.0, 2.0),
///     photo_url: None,
/// };
///
/// block_on(store.insert(&place)).expect("insert");
/// let found = block_on(store.get_by_id(&place.id)).expect("lookup");
/// assert_eq!(found, Some(place));
/// ```
#[async_trait]
pub trait FavouritesStore: Send + Sync {
    /// Insert `place`, replacing any row with the same identifier.
    async fn insert(&self, place: &FavouritePlace) -> Result<(), FavouritesStoreError>;

    /// Remove the row whose identifier matches `place.id`.
    ///
    /// Removing an absent row succeeds and still notifies observers.
    async fn delete(&self, place: &FavouritePlace) -> Result<(), FavouritesStoreError>;

    /// Look up one favourite; `None` means not found.
    async fn get_by_id(&self, id: &PlaceId) -> Result<Option<FavouritePlace>, FavouritesStoreError>;

    /// Return the whole table.
    async fn get_all(&self) -> Result<Vec<FavouritePlace>, FavouritesStoreError>;

    /// Subscribe to full-table snapshots.
    ///
    /// The subscription yields the current contents first and then one
    /// snapshot per committed insert or delete, in commit order.
    async fn observe_all(&self) -> Result<FavouritesSubscription, FavouritesStoreError>;
}
