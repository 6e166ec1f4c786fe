use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use notify_debouncer_mini::notify::RecursiveMode;
use notify_debouncer_mini::{DebounceEventResult, new_debouncer};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{LiveHeadStore, StoreError, StoreEvent, Subscription, ViewerMeta, ViewerPosition};
use crate::head::{Head, LiveHead, RoomId, ViewerId};

const LIVE_DIR: &str = "live";
const AUDIENCE_DIR: &str = "audience";
const DEBOUNCE: Duration = Duration::from_millis(50);
const LOCK_TIMEOUT: Duration = Duration::from_secs(1);
const LOCK_RETRY: Duration = Duration::from_millis(5);
/// A lock older than this was left behind by a writer that died mid-publish.
const STALE_LOCK: Duration = Duration::from_secs(5);

/// Store backed by a directory of JSON records, shared by every window or
/// process that opens the same directory.
///
/// ```text
/// <root>/live/<room>.json       {"slide": .., "display": .., "version": n}
/// <root>/live/<room>.version    highest version handed out for the room
/// <root>/live/<room>.lock       held while a publish reads and replaces the record
/// <root>/audience/<viewer>.json {"viewer": .., "slide": .., "display": .., ..}
/// ```
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self { root: root.into() };
        for dir in [store.live_dir(), store.audience_dir()] {
            std::fs::create_dir_all(&dir).map_err(|e| io_error(&dir, e))?;
        }
        Ok(store)
    }

    fn live_dir(&self) -> PathBuf {
        self.root.join(LIVE_DIR)
    }

    fn audience_dir(&self) -> PathBuf {
        self.root.join(AUDIENCE_DIR)
    }

    fn room_file(&self, room: &RoomId, extension: &str) -> PathBuf {
        self.live_dir()
            .join(format!("{}.{extension}", file_stem(room.as_str())))
    }

    fn room_path(&self, room: &RoomId) -> PathBuf {
        self.room_file(room, "json")
    }

    fn viewer_path(&self, viewer: &ViewerId) -> PathBuf {
        self.audience_dir()
            .join(format!("{}.json", file_stem(viewer.as_str())))
    }
}

/// Map an identifier to a portable file name (`room:main` → `room_main`).
fn file_stem(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn io_error(path: &Path, err: std::io::Error) -> StoreError {
    StoreError::Unavailable(format!("{}: {err}", path.display()))
}

fn read_live(path: &Path, room: &RoomId) -> Result<Option<LiveHead>, StoreError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(io_error(path, e)),
    };
    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|e| StoreError::Malformed {
            room: room.clone(),
            reason: e.to_string(),
        })
}

/// The room's version high-water mark; a missing or garbled file counts as zero.
fn read_counter(path: &Path) -> u64 {
    match std::fs::read_to_string(path) {
        Ok(contents) => contents.trim().parse().unwrap_or_else(|e| {
            debug!(path = %path.display(), "ignoring unreadable version counter: {e}");
            0
        }),
        Err(_) => 0,
    }
}

/// Write via a temporary sibling and rename, so readers never see half a record.
fn write_atomic(path: &Path, contents: &str) -> Result<(), StoreError> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    std::fs::write(&tmp, contents).map_err(|e| io_error(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| io_error(path, e))
}

/// Exclusive claim on a room, held across a publish's read and replace.
/// Released on drop.
struct RoomLock {
    path: PathBuf,
}

impl RoomLock {
    fn acquire(path: PathBuf) -> Result<Self, StoreError> {
        let deadline = Instant::now() + LOCK_TIMEOUT;
        loop {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(_) => return Ok(Self { path }),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if is_stale(&path) {
                        warn!(path = %path.display(), "removing stale live-head lock");
                        let _ = std::fs::remove_file(&path);
                        continue;
                    }
                    if Instant::now() >= deadline {
                        return Err(StoreError::Unavailable(format!(
                            "{} is held by another writer",
                            path.display()
                        )));
                    }
                    std::thread::sleep(LOCK_RETRY);
                }
                Err(e) => return Err(io_error(&path, e)),
            }
        }
    }
}

impl Drop for RoomLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            debug!(path = %self.path.display(), "lock already gone: {e}");
        }
    }
}

fn is_stale(path: &Path) -> bool {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|modified| modified.elapsed().ok())
        .is_some_and(|age| age > STALE_LOCK)
}

/// Sends a room's record to one subscriber whenever it supersedes the last
/// one sent. Shared by the initial read and the watcher thread.
struct Forwarder {
    room: RoomId,
    path: PathBuf,
    tx: mpsc::UnboundedSender<StoreEvent>,
    last: Mutex<Option<LiveHead>>,
}

impl Forwarder {
    fn forward(&self) -> Result<(), StoreError> {
        let Some(live) = read_live(&self.path, &self.room)? else {
            return Ok(());
        };
        let mut last = self
            .last
            .lock()
            .map_err(|_| StoreError::Unavailable("subscription state poisoned".into()))?;
        if last.as_ref().is_none_or(|previous| live.supersedes(previous)) {
            *last = Some(live.clone());
            let _ = self.tx.send(StoreEvent::Snapshot(live));
        }
        Ok(())
    }

    fn report(&self, err: StoreError) {
        let _ = self.tx.send(StoreEvent::Unavailable(err.to_string()));
    }
}

impl LiveHeadStore for FsStore {
    fn subscribe(&self, room: &RoomId) -> Result<Subscription, StoreError> {
        let path = self.room_path(room);
        let (tx, rx) = mpsc::unbounded_channel();
        let forwarder = Arc::new(Forwarder {
            room: room.clone(),
            path: path.clone(),
            tx,
            last: Mutex::new(None),
        });

        let watched = Arc::clone(&forwarder);
        let mut debouncer = new_debouncer(DEBOUNCE, move |result: DebounceEventResult| {
            match result {
                Ok(events) => {
                    if !events.iter().any(|e| e.path.file_name() == watched.path.file_name()) {
                        return;
                    }
                    match watched.forward() {
                        Ok(()) => {}
                        // A record caught mid-replace on some platforms; the next event rereads it
                        Err(StoreError::Malformed { .. }) => {}
                        Err(err) => watched.report(err),
                    }
                }
                Err(err) => {
                    warn!("live-head watcher error: {err}");
                    watched.report(StoreError::Unavailable(err.to_string()));
                }
            }
        })
        .map_err(|e| StoreError::Unavailable(format!("cannot watch live heads: {e}")))?;

        debouncer
            .watcher()
            .watch(&self.live_dir(), RecursiveMode::NonRecursive)
            .map_err(|e| StoreError::Unavailable(format!("cannot watch live heads: {e}")))?;

        // Read only once watching, so a publish landing in between is not lost
        if let Err(err) = forwarder.forward() {
            forwarder.report(err);
        }

        debug!(%room, path = %path.display(), "watching live head");
        Ok(Subscription::with_guard(rx, debouncer))
    }

    fn publish(&self, room: &RoomId, head: &Head) -> Result<LiveHead, StoreError> {
        let path = self.room_path(room);
        let counter = self.room_file(room, "version");
        let _lock = RoomLock::acquire(self.room_file(room, "lock"))?;

        // A malformed record is overwritten rather than blocking the speaker;
        // the counter keeps its version from going backwards
        let recorded = match read_live(&path, room) {
            Ok(previous) => previous.map_or(0, |live| live.version),
            Err(StoreError::Malformed { .. }) => 0,
            Err(err) => return Err(err),
        };
        let version = recorded.max(read_counter(&counter)) + 1;

        let live = LiveHead::new(head.clone(), version);
        let json = serde_json::to_string_pretty(&live)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        write_atomic(&counter, &version.to_string())?;
        write_atomic(&path, &json)?;
        debug!(%room, %head, version, "published live head");
        Ok(live)
    }

    fn record_viewer_position(&self, viewer: &ViewerId, head: &Head, meta: &ViewerMeta) {
        let position = ViewerPosition {
            viewer: viewer.clone(),
            head: head.clone(),
            meta: meta.clone(),
        };
        let result = serde_json::to_string_pretty(&position)
            .map_err(|e| StoreError::Unavailable(e.to_string()))
            .and_then(|json| write_atomic(&self.viewer_path(viewer), &json));
        if let Err(err) = result {
            debug!(%viewer, "viewer position not recorded: {err}");
        }
    }

    fn current(&self, room: &RoomId) -> Result<Option<LiveHead>, StoreError> {
        read_live(&self.room_path(room), room)
    }

    fn viewer_positions(&self) -> Result<Vec<ViewerPosition>, StoreError> {
        let dir = self.audience_dir();
        let entries = std::fs::read_dir(&dir).map_err(|e| io_error(&dir, e))?;
        let mut positions = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            let parsed = std::fs::read_to_string(&path)
                .ok()
                .and_then(|contents| serde_json::from_str::<ViewerPosition>(&contents).ok());
            match parsed {
                Some(position) => positions.push(position),
                None => debug!(path = %path.display(), "skipping unreadable viewer record"),
            }
        }
        positions.sort_by(|a, b| a.viewer.cmp(&b.viewer));
        Ok(positions)
    }
}
