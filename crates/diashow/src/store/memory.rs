use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use tokio::sync::mpsc;
use tracing::debug;

use super::{LiveHeadStore, StoreError, StoreEvent, Subscription, ViewerMeta, ViewerPosition};
use crate::head::{Head, LiveHead, RoomId, ViewerId};

/// Process-local store. Useful offline and in tests; can be switched
/// "offline" to exercise connectivity failures.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    rooms: HashMap<RoomId, LiveHead>,
    subscribers: HashMap<RoomId, Vec<mpsc::UnboundedSender<StoreEvent>>>,
    viewers: BTreeMap<ViewerId, ViewerPosition>,
    offline: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate losing (or regaining) connectivity. While offline every
    /// operation fails and subscribers are told so.
    pub fn set_offline(&self, offline: bool) {
        if let Ok(mut state) = self.lock() {
            state.offline = offline;
            if offline {
                for senders in state.subscribers.values_mut() {
                    senders.retain(|tx| {
                        tx.send(StoreEvent::Unavailable("memory store offline".into()))
                            .is_ok()
                    });
                }
            }
        }
    }

    /// Deliver `live` to the room's subscribers without storing it, as a
    /// transport replaying an old snapshot would.
    pub fn replay(&self, room: &RoomId, live: LiveHead) {
        if let Ok(mut state) = self.lock() {
            notify(&mut state, room, live);
        }
    }

    pub fn subscriber_count(&self, room: &RoomId) -> usize {
        self.lock()
            .map(|state| {
                state
                    .subscribers
                    .get(room)
                    .map_or(0, |senders| senders.iter().filter(|tx| !tx.is_closed()).count())
            })
            .unwrap_or(0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }

    fn lock_online(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        let state = self.lock()?;
        if state.offline {
            return Err(StoreError::Unavailable("memory store offline".into()));
        }
        Ok(state)
    }
}

fn notify(state: &mut MemoryState, room: &RoomId, live: LiveHead) {
    if let Some(senders) = state.subscribers.get_mut(room) {
        senders.retain(|tx| tx.send(StoreEvent::Snapshot(live.clone())).is_ok());
    }
}

impl LiveHeadStore for MemoryStore {
    fn subscribe(&self, room: &RoomId) -> Result<Subscription, StoreError> {
        let mut state = self.lock_online()?;
        let (tx, rx) = mpsc::unbounded_channel();
        if let Some(live) = state.rooms.get(room) {
            // The receiver is alive, this cannot fail
            let _ = tx.send(StoreEvent::Snapshot(live.clone()));
        }
        state.subscribers.entry(room.clone()).or_default().push(tx);
        debug!(%room, "memory store subscription");
        Ok(Subscription::new(rx))
    }

    fn publish(&self, room: &RoomId, head: &Head) -> Result<LiveHead, StoreError> {
        let mut state = self.lock_online()?;
        let version = state.rooms.get(room).map_or(1, |live| live.version + 1);
        let live = LiveHead::new(head.clone(), version);
        state.rooms.insert(room.clone(), live.clone());
        notify(&mut state, room, live.clone());
        Ok(live)
    }

    fn record_viewer_position(&self, viewer: &ViewerId, head: &Head, meta: &ViewerMeta) {
        match self.lock_online() {
            Ok(mut state) => {
                state.viewers.insert(
                    viewer.clone(),
                    ViewerPosition {
                        viewer: viewer.clone(),
                        head: head.clone(),
                        meta: meta.clone(),
                    },
                );
            }
            Err(err) => debug!(%viewer, "viewer position not recorded: {err}"),
        }
    }

    fn current(&self, room: &RoomId) -> Result<Option<LiveHead>, StoreError> {
        Ok(self.lock_online()?.rooms.get(room).cloned())
    }

    fn viewer_positions(&self) -> Result<Vec<ViewerPosition>, StoreError> {
        Ok(self.lock_online()?.viewers.values().cloned().collect())
    }
}
