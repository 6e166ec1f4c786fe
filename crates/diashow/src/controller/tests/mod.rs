mod speaker;

use std::sync::Arc;

use super::{NavigationController, SessionConfig};
use crate::deck::{Deck, DeckMeta, DeckSlide, Panel};
use crate::event::ControllerEvent;
use crate::head::{DisplayId, Head, LiveHead, RoomId, SlideId};
use crate::intent::NavigationIntent;
use crate::store::{LiveHeadStore, MemoryStore, StoreEvent};

const ROOM: &str = "room:main";

/// Five slides; `s4` defaults to the `alt` display, the rest to `main`.
fn deck() -> Deck {
    let slide = |id: &str, default: &str, other: &str| {
        DeckSlide::new(
            id,
            vec![
                Panel::bound(default, format!("# {id}")).as_default(),
                Panel::bound(other, "extra"),
            ],
        )
    };
    Deck::new(
        DeckMeta::default(),
        vec![
            slide("s1", "main", "notes"),
            slide("s2", "main", "alt"),
            slide("s3", "main", "notes"),
            slide("s4", "alt", "main"),
            slide("s5", "main", "notes"),
        ],
    )
    .unwrap()
}

fn store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}

fn config(start: Head) -> SessionConfig {
    SessionConfig::new(ROOM, "viewer-1").starting_at(start)
}

fn audience(store: &Arc<MemoryStore>, start: Head) -> NavigationController {
    NavigationController::new(config(start), store.clone())
}

fn speaker(store: &Arc<MemoryStore>, start: Head) -> NavigationController {
    NavigationController::new(config(start).as_speaker(), store.clone())
}

fn live(slide: &str, display: &str, version: u64) -> LiveHead {
    LiveHead::new(Head::at(slide, display), version)
}

fn slide(id: &str) -> ControllerEvent {
    ControllerEvent::SlideSelected(Some(SlideId::from(id)))
}

fn display(id: &str) -> ControllerEvent {
    ControllerEvent::DisplaySelected(Some(DisplayId::from(id)))
}

fn room() -> RoomId {
    RoomId::from(ROOM)
}

/// The detached flag and the detached snapshot must agree.
fn assert_detached_consistent(controller: &NavigationController) {
    assert_eq!(
        controller.is_detached(),
        controller.detached_head().is_some(),
        "detached flag and detached head disagree: {controller:?}"
    );
}
