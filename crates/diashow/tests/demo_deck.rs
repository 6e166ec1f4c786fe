use std::path::PathBuf;
use std::sync::Arc;

use diashow::deck::Deck;
use diashow::store::{FsStore, LiveHeadStore, MemoryStore};
use diashow::{DisplayId, Head, NavigationIntent, PresentationHost, SessionConfig, SlideId};

fn demo() -> Deck {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../decks/demo.md");
    Deck::load(&path).unwrap()
}

#[test]
fn demo_deck_parses() {
    let deck = demo();
    assert_eq!(deck.meta.title.as_deref(), Some("diashow demo"));
    assert_eq!(deck.start_head(), Head::new(None, Some("main".into())));
    let ids: Vec<&str> = deck.slides().iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["welcome", "displays", "following", "thanks"]);
}

#[test]
fn audience_follows_speaker_through_the_demo() {
    let store = Arc::new(MemoryStore::new());
    let mut speaker = PresentationHost::mount(
        demo(),
        SessionConfig::new("demo", "speaker")
            .starting_at(Head::at("welcome", "notes"))
            .as_speaker(),
        store.clone(),
    );
    let mut audience = PresentationHost::mount(demo(), SessionConfig::new("demo", "ada"), store.clone());

    speaker.dispatch(NavigationIntent::Next);
    audience.pump();
    assert_eq!(audience.slide(), Some(&SlideId::from("displays")));
    assert_eq!(audience.display(), Some(&DisplayId::from("code")));
    assert_eq!(speaker.display(), Some(&DisplayId::from("notes")));

    // The audience browses ahead and stops following
    audience.dispatch(NavigationIntent::Next);
    assert!(audience.is_detached());
    speaker.dispatch(NavigationIntent::Previous);
    audience.pump();
    assert_eq!(audience.slide(), Some(&SlideId::from("following")));

    audience.dispatch(NavigationIntent::Resync);
    assert!(!audience.is_detached());
    assert_eq!(audience.slide(), Some(&SlideId::from("welcome")));
    assert_eq!(audience.display(), Some(&DisplayId::from("main")));

    let positions = store.viewer_positions().unwrap();
    assert_eq!(positions.len(), 2);
}

#[test]
fn windows_share_a_store_directory() {
    let dir = tempfile::tempdir().unwrap();
    let speaker_store = Arc::new(FsStore::open(dir.path()).unwrap());
    let mut speaker = PresentationHost::mount(
        demo(),
        SessionConfig::new("demo", "speaker")
            .starting_at(Head::at("displays", "main"))
            .as_speaker(),
        speaker_store,
    );
    speaker.dispatch(NavigationIntent::Next);

    // A window opened later starts from the published head
    let audience_store = Arc::new(FsStore::open(dir.path()).unwrap());
    let audience = PresentationHost::mount(demo(), SessionConfig::new("demo", "ada"), audience_store);
    assert_eq!(audience.slide(), Some(&SlideId::from("following")));
    assert_eq!(audience.display(), Some(&DisplayId::from("main")));
}
