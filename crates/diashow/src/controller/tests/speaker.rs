use super::*;

fn published(store: &Arc<MemoryStore>) -> Option<Head> {
    store.current(&room()).unwrap().map(|l| l.head)
}

#[test]
fn test_speaker_next_keeps_own_display_and_publishes_default() {
    let store = store();
    let deck = deck();
    let mut c = speaker(&store, Head::at("s3", "main"));

    let events = c.handle_intent(NavigationIntent::Next, &deck);
    assert_eq!(events, vec![slide("s4")]);
    assert_eq!(c.head(), &Head::at("s4", "main"));
    assert_eq!(published(&store), Some(Head::at("s4", "alt")));
}

#[test]
fn test_speaker_display_change_is_not_published() {
    let store = store();
    let deck = deck();
    let mut c = speaker(&store, Head::at("s3", "main"));
    c.handle_intent(NavigationIntent::SelectDisplay("notes".into()), &deck);
    assert_eq!(published(&store), None);
}

#[test]
fn test_speaker_slide_selection_is_published() {
    let store = store();
    let deck = deck();
    let mut c = speaker(&store, Head::at("s1", "notes"));
    c.handle_intent(NavigationIntent::SelectSlide("s5".into()), &deck);
    assert_eq!(c.head(), &Head::at("s5", "notes"));
    assert_eq!(published(&store), Some(Head::at("s5", "main")));
}

#[test]
fn test_detached_speaker_does_not_publish() {
    let store = store();
    let deck = deck();
    let mut c = speaker(&store, Head::at("s3", "main"));
    c.handle_intent(NavigationIntent::Detach, &deck);
    c.handle_intent(NavigationIntent::Next, &deck);
    assert_eq!(c.head(), &Head::at("s4", "main"));
    assert_eq!(published(&store), None);
}

#[test]
fn test_toggle_speaker_while_detached_is_noop() {
    let store = store();
    let deck = deck();
    let mut c = audience(&store, Head::at("s2", "main"));
    c.handle_intent(NavigationIntent::Detach, &deck);

    let before = format!("{c:?}");
    let events = c.handle_intent(NavigationIntent::ToggleSpeaker, &deck);
    assert!(events.is_empty());
    assert!(!c.is_speaker());
    assert_eq!(format!("{c:?}"), before);
}

#[test]
fn test_toggle_speaker_when_aligned() {
    let store = store();
    let deck = deck();
    let mut c = audience(&store, Head::overview());
    c.on_remote_head_updated(live("s2", "main", 1), &deck);

    let events = c.handle_intent(NavigationIntent::ToggleSpeaker, &deck);
    assert_eq!(events, vec![ControllerEvent::SpeakerToggled { speaker: true }]);
    assert!(c.is_speaker());
    assert_eq!(c.head(), &Head::at("s2", "main"));
}

#[test]
fn test_toggle_speaker_resyncs_when_diverged() {
    let store = store();
    let deck = deck();
    let mut c = speaker(&store, Head::at("s2", "main"));
    c.on_remote_head_updated(live("s3", "main", 1), &deck);
    // A failed publish leaves the known live head behind
    store.set_offline(true);
    c.handle_intent(NavigationIntent::Next, &deck);
    store.set_offline(false);
    assert_eq!(c.head(), &Head::at("s4", "main"));

    let events = c.handle_intent(NavigationIntent::ToggleSpeaker, &deck);
    assert_eq!(
        events,
        vec![
            ControllerEvent::SpeakerToggled { speaker: false },
            ControllerEvent::DetachDisabled,
            slide("s3"),
        ]
    );
    assert!(!c.is_speaker());
    assert_eq!(c.head(), &Head::at("s3", "main"));
}

#[test]
fn test_own_publish_echo_is_ignored() {
    let store = store();
    let deck = deck();
    let mut c = speaker(&store, Head::at("s1", "main"));
    c.subscribe();
    c.handle_intent(NavigationIntent::Next, &deck);
    assert_eq!(c.live_head().map(|l| l.version), Some(1));

    assert!(c.poll_remote(&deck).is_empty());
    assert_eq!(c.head(), &Head::at("s2", "main"));
}

#[test]
fn test_focus_audience_publishes_detached_position() {
    let store = store();
    let deck = deck();
    let mut c = speaker(&store, Head::at("s3", "main"));
    c.handle_intent(NavigationIntent::Detach, &deck);
    c.handle_intent(NavigationIntent::Next, &deck);

    let events = c.handle_intent(NavigationIntent::FocusAudience, &deck);
    assert_eq!(events, vec![ControllerEvent::DetachDisabled]);
    assert_eq!(published(&store), Some(Head::at("s4", "main")));
    assert!(!c.is_detached());
    assert_eq!(c.detached_head(), None);
}

#[test]
fn test_focus_audience_requires_detached_speaker() {
    let store = store();
    let deck = deck();

    let mut attached = speaker(&store, Head::at("s3", "main"));
    assert!(
        attached
            .handle_intent(NavigationIntent::FocusAudience, &deck)
            .is_empty()
    );

    let mut viewer = audience(&store, Head::at("s3", "main"));
    viewer.handle_intent(NavigationIntent::Detach, &deck);
    assert!(
        viewer
            .handle_intent(NavigationIntent::FocusAudience, &deck)
            .is_empty()
    );
    assert!(viewer.is_detached());
    assert_eq!(published(&store), None);
}
