//! Push-based snapshot delivery for favourites observers.

use std::{
    pin::Pin,
    sync::{Arc, Mutex, PoisonError},
    task::{Context, Poll},
};

use futures_util::Stream;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::FavouritePlace;

/// Fan-out of table snapshots to every live subscriber.
///
/// Each subscriber owns an unbounded queue, so a slow reader never causes a
/// snapshot to be dropped. Stores must call [`SnapshotFeed::subscribe`] and
/// [`SnapshotFeed::publish`] while holding the same lock that serialises
/// their writes; that keeps snapshots in commit order.
#[derive(Debug, Clone, Default)]
pub struct SnapshotFeed {
    subscribers: Arc<Mutex<Vec<UnboundedSender<Vec<FavouritePlace>>>>>,
}

impl SnapshotFeed {
    /// Register a subscriber whose first item is `current`.
    #[must_use]
    pub fn subscribe(&self, current: Vec<FavouritePlace>) -> FavouritesSubscription {
        let (sender, receiver) = unbounded_channel();
        if sender.send(current).is_ok() {
            self.subscribers
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(sender);
        }
        FavouritesSubscription { receiver }
    }

    /// Deliver `snapshot` to every subscriber, pruning dropped ones.
    pub fn publish(&self, snapshot: &[FavouritePlace]) {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|sender| sender.send(snapshot.to_vec()).is_ok());
    }

    /// Number of subscribers still attached after the last publish.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Stream of full-table snapshots returned by
/// [`FavouritesStore::observe_all`](crate::FavouritesStore::observe_all).
#[derive(Debug)]
pub struct FavouritesSubscription {
    receiver: UnboundedReceiver<Vec<FavouritePlace>>,
}

impl FavouritesSubscription {
    /// Wait for the next snapshot; `None` once the store is gone.
    pub async fn next_snapshot(&mut self) -> Option<Vec<FavouritePlace>> {
        self.receiver.recv().await
    }

    /// Take an already delivered snapshot without waiting.
    pub fn try_next_snapshot(&mut self) -> Option<Vec<FavouritePlace>> {
        self.receiver.try_recv().ok()
    }
}

impl Stream for FavouritesSubscription {
    type Item = Vec<FavouritePlace>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().receiver.poll_recv(cx)
    }
}
