//! Live note collection: snapshot cache plus subscriber fan-out.
//!
//! # Responsibility
//! - Keep the latest full, ordered note collection.
//! - Push each new collection to every active subscriber.
//!
//! # Invariants
//! - Snapshots are always ordered by `id DESC`.
//! - A new subscriber receives the latest snapshot first, then every later
//!   publish, with no gap and no duplicate.
//! - One publish computes one snapshot; all subscribers share it.
//! - Publishing a collection equal to the latest one emits nothing.
//! - Dropping a `NoteSubscription` removes it from the hub.

use crate::model::note::{sort_newest_first, Note};
use futures::Stream;
use log::debug;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Immutable full note collection shared by every subscriber.
pub type NotesSnapshot = Arc<[Note]>;

type SubscriberId = u64;

struct HubState {
    latest: NotesSnapshot,
    subscribers: HashMap<SubscriberId, UnboundedSender<NotesSnapshot>>,
    next_id: SubscriberId,
}

/// Fan-out hub behind every `NoteStore::get_all_notes` implementation.
#[derive(Clone)]
pub struct LiveNotes {
    state: Arc<Mutex<HubState>>,
}

impl LiveNotes {
    /// Creates a hub seeded with the current table contents.
    pub fn new(mut initial: Vec<Note>) -> Self {
        sort_newest_first(&mut initial);
        Self {
            state: Arc::new(Mutex::new(HubState {
                latest: initial.into(),
                subscribers: HashMap::new(),
                next_id: 1,
            })),
        }
    }

    /// Returns the latest published snapshot.
    pub fn latest(&self) -> NotesSnapshot {
        Arc::clone(&self.state.lock().latest)
    }

    /// Number of subscriptions that have not been dropped yet.
    pub fn subscriber_count(&self) -> usize {
        self.state.lock().subscribers.len()
    }

    /// Registers a subscriber and replays the latest snapshot to it.
    pub fn subscribe(&self) -> NoteSubscription {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut state = self.state.lock();
        let id = state.next_id;
        state.next_id += 1;

        // The receiver is alive, so the replay send cannot fail.
        let _ = sender.send(Arc::clone(&state.latest));
        state.subscribers.insert(id, sender);
        debug!(
            "event=notes_subscribe module=live status=ok subscriber_id={id} subscribers={}",
            state.subscribers.len()
        );

        NoteSubscription {
            id,
            receiver,
            hub: Arc::downgrade(&self.state),
        }
    }

    /// Publishes a fresh collection to all subscribers.
    ///
    /// Returns `false` when the collection equals the latest snapshot and
    /// nothing was emitted.
    pub fn publish(&self, mut notes: Vec<Note>) -> bool {
        sort_newest_first(&mut notes);

        let mut state = self.state.lock();
        if state.latest.as_ref() == notes.as_slice() {
            return false;
        }

        let snapshot: NotesSnapshot = notes.into();
        state.latest = Arc::clone(&snapshot);
        state
            .subscribers
            .retain(|_, sender| sender.send(Arc::clone(&snapshot)).is_ok());
        debug!(
            "event=notes_emit module=live status=ok subscribers={} count={}",
            state.subscribers.len(),
            snapshot.len()
        );
        true
    }
}

/// Handle for one live-collection subscriber.
///
/// Yields full snapshots in publish order. The first item is the collection
/// as it was at subscribe time.
pub struct NoteSubscription {
    id: SubscriberId,
    receiver: UnboundedReceiver<NotesSnapshot>,
    hub: Weak<Mutex<HubState>>,
}

impl NoteSubscription {
    /// Waits for the next snapshot.
    ///
    /// Returns `None` once the owning store has been dropped and every queued
    /// snapshot was consumed.
    pub async fn recv(&mut self) -> Option<NotesSnapshot> {
        self.receiver.recv().await
    }

    /// Returns the next queued snapshot without waiting.
    pub fn try_recv(&mut self) -> Option<NotesSnapshot> {
        self.receiver.try_recv().ok()
    }

    /// Drains the queue and returns only the newest snapshot, if any.
    ///
    /// Intended for render loops that only need the current state.
    pub fn latest(&mut self) -> Option<NotesSnapshot> {
        let mut newest = None;
        while let Ok(snapshot) = self.receiver.try_recv() {
            newest = Some(snapshot);
        }
        newest
    }
}

impl Stream for NoteSubscription {
    type Item = NotesSnapshot;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl Drop for NoteSubscription {
    fn drop(&mut self) {
        if let Some(state) = self.hub.upgrade() {
            let mut state = state.lock();
            state.subscribers.remove(&self.id);
            debug!(
                "event=notes_unsubscribe module=live status=ok subscriber_id={} subscribers={}",
                self.id,
                state.subscribers.len()
            );
        }
    }
}
