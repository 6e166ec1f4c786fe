//! Shared live-head storage: the record of what a room is currently showing,
//! plus best-effort tracking of where each viewer is.

pub mod fs;
pub mod memory;

use std::any::Any;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::head::{Head, LiveHead, RoomId, ViewerId};

pub use fs::FsStore;
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("live-head store unavailable: {0}")]
    Unavailable(String),

    #[error("malformed live-head record for room `{room}`: {reason}")]
    Malformed { room: RoomId, reason: String },
}

/// What a subscription delivers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Snapshot(LiveHead),
    /// The subscription hit a connectivity problem; later snapshots may still arrive.
    Unavailable(String),
}

/// Descriptive data recorded alongside a viewer's position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub anonymous: bool,
}

/// A viewer's last recorded position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerPosition {
    pub viewer: ViewerId,
    #[serde(flatten)]
    pub head: Head,
    #[serde(flatten)]
    pub meta: ViewerMeta,
}

pub trait LiveHeadStore: Send + Sync {
    /// Follow a room's live head. The current value, if any, is delivered first.
    fn subscribe(&self, room: &RoomId) -> Result<Subscription, StoreError>;

    /// Replace the room's live head; returns the stored, versioned record.
    fn publish(&self, room: &RoomId, head: &Head) -> Result<LiveHead, StoreError>;

    /// Best-effort audience tracking. Failures are swallowed.
    fn record_viewer_position(&self, viewer: &ViewerId, head: &Head, meta: &ViewerMeta);

    fn current(&self, room: &RoomId) -> Result<Option<LiveHead>, StoreError>;

    fn viewer_positions(&self) -> Result<Vec<ViewerPosition>, StoreError>;
}

/// A stream of [`StoreEvent`]s for one room. Dropping it unsubscribes.
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<StoreEvent>,
    _guard: Option<Box<dyn Any + Send>>,
}

impl Subscription {
    pub fn new(rx: mpsc::UnboundedReceiver<StoreEvent>) -> Self {
        Self { rx, _guard: None }
    }

    /// Keep `guard` (e.g. a file watcher) alive for as long as the subscription.
    pub fn with_guard(rx: mpsc::UnboundedReceiver<StoreEvent>, guard: impl Any + Send) -> Self {
        Self {
            rx,
            _guard: Some(Box::new(guard)),
        }
    }

    /// Next pending event without blocking.
    pub fn try_next(&mut self) -> Option<StoreEvent> {
        self.rx.try_recv().ok()
    }

    pub fn drain(&mut self) -> Vec<StoreEvent> {
        std::iter::from_fn(|| self.try_next()).collect()
    }
}

impl Stream for Subscription {
    type Item = StoreEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("watching", &self._guard.is_some())
            .finish()
    }
}

/// Where the live head lives for this session.
#[derive(Debug, Clone)]
pub enum StoreLocation {
    /// In-process only; nothing is shared with other windows.
    Memory,
    Directory(PathBuf),
}

impl StoreLocation {
    /// The default shared directory, under the platform data dir.
    pub fn default_directory() -> anyhow::Result<PathBuf> {
        dirs::data_local_dir()
            .map(|d| d.join("diashow").join("store"))
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))
    }

    pub fn open(&self) -> anyhow::Result<Arc<dyn LiveHeadStore>> {
        match self {
            Self::Memory => Ok(Arc::new(MemoryStore::new())),
            Self::Directory(dir) => Ok(Arc::new(FsStore::open(dir)?)),
        }
    }
}
