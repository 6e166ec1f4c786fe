use std::sync::Arc;

use diashow::deck::{Deck, DeckMeta, DeckSlide, Panel};
use diashow::store::MemoryStore;
use diashow::{
    Head, LiveHead, NavigationController, NavigationIntent, PresentationSurface, SessionConfig,
};
use proptest::prelude::*;

fn deck(count: usize) -> Deck {
    let slides = (1..=count)
        .map(|n| {
            let default = if n % 2 == 0 { "alt" } else { "main" };
            DeckSlide::new(
                format!("s{n}"),
                vec![
                    Panel::bound("main", format!("main {n}")),
                    Panel::bound("alt", format!("alt {n}")),
                ]
                .into_iter()
                .map(|p| {
                    if p.display.as_ref().map(|d| d.as_str()) == Some(default) {
                        p.as_default()
                    } else {
                        p
                    }
                })
                .collect(),
            )
        })
        .collect();
    Deck::new(DeckMeta::default(), slides).unwrap()
}

#[derive(Debug, Clone)]
enum Step {
    Intent(NavigationIntent),
    Remote { slide: usize, alt: bool },
}

fn intent() -> impl Strategy<Value = NavigationIntent> {
    prop_oneof![
        Just(NavigationIntent::Next),
        Just(NavigationIntent::Previous),
        Just(NavigationIntent::Detach),
        Just(NavigationIntent::Resync),
        Just(NavigationIntent::ToggleSpeaker),
        Just(NavigationIntent::FocusAudience),
        Just(NavigationIntent::Fullscreen),
        (1usize..=8).prop_map(|n| NavigationIntent::SelectSlide(format!("s{n}").into())),
        Just(NavigationIntent::SelectDisplay("alt".into())),
    ]
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => intent().prop_map(Step::Intent),
        1 => (1usize..=8, any::<bool>()).prop_map(|(slide, alt)| Step::Remote { slide, alt }),
    ]
}

proptest! {
    #[test]
    fn next_and_previous_stay_within_the_deck(
        count in 1usize..8,
        start in 0usize..8,
        moves in prop::collection::vec(any::<bool>(), 0..40),
        speaker in any::<bool>(),
    ) {
        let deck = deck(count);
        let ids = deck.ordered_slides();
        let start = ids[start % count].clone();
        let mut config = SessionConfig::new("room", "viewer").starting_at(Head::new(Some(start), None));
        config.speaker = speaker;
        let mut c = NavigationController::new(config, Arc::new(MemoryStore::new()));

        for forward in moves {
            let intent = if forward { NavigationIntent::Next } else { NavigationIntent::Previous };
            c.handle_intent(intent, &deck);
            let slide = c.head().slide.clone();
            prop_assert!(slide.is_some_and(|s| ids.contains(&s)));
        }
    }

    #[test]
    fn next_at_last_slide_is_idempotent(count in 1usize..8, presses in 1usize..10) {
        let deck = deck(count);
        let last = deck.ordered_slides().last().cloned();
        let config = SessionConfig::new("room", "viewer").starting_at(Head::new(last.clone(), None));
        let mut c = NavigationController::new(config, Arc::new(MemoryStore::new()));

        for _ in 0..presses {
            prop_assert!(c.handle_intent(NavigationIntent::Next, &deck).is_empty());
            prop_assert_eq!(&c.head().slide, &last);
        }
    }

    #[test]
    fn detached_flag_matches_detached_head(
        steps in prop::collection::vec(step(), 0..60),
        speaker in any::<bool>(),
    ) {
        let deck = deck(6);
        let mut config = SessionConfig::new("room", "viewer").starting_at(Head::at("s1", "main"));
        config.speaker = speaker;
        let mut c = NavigationController::new(config, Arc::new(MemoryStore::new()));
        let mut version = 0;

        for step in steps {
            let before_speaker = c.is_speaker();
            let was_detached = c.is_detached();
            let is_toggle = matches!(step, Step::Intent(NavigationIntent::ToggleSpeaker));
            match step {
                Step::Intent(intent) => {
                    c.handle_intent(intent, &deck);
                }
                Step::Remote { slide, alt } => {
                    version += 1;
                    let display = if alt { "alt" } else { "main" };
                    let live = LiveHead::new(Head::at(format!("s{slide}"), display), version);
                    c.on_remote_head_updated(live, &deck);
                }
            }
            prop_assert_eq!(c.is_detached(), c.detached_head().is_some());
            if was_detached && is_toggle {
                prop_assert_eq!(c.is_speaker(), before_speaker);
            }
        }
    }

    #[test]
    fn resync_always_leaves_detached_mode(
        steps in prop::collection::vec(intent(), 0..30),
    ) {
        let deck = deck(5);
        let config = SessionConfig::new("room", "viewer").starting_at(Head::at("s2", "main"));
        let mut c = NavigationController::new(config, Arc::new(MemoryStore::new()));
        for intent in steps {
            c.handle_intent(intent, &deck);
        }
        c.handle_intent(NavigationIntent::Resync, &deck);
        prop_assert!(!c.is_detached());
        prop_assert!(c.detached_head().is_none());
    }
}
