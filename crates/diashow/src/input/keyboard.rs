use eframe::egui::{Key, Modifiers};

use crate::intent::NavigationIntent;

/// Key binding table. Modifiers must match exactly, so `Space` and
/// `Ctrl+Space` are distinct bindings.
const BINDINGS: &[(Key, Modifiers, NavigationIntent)] = &[
    (Key::F, Modifiers::NONE, NavigationIntent::Fullscreen),
    (Key::Escape, Modifiers::NONE, NavigationIntent::Detach),
    (Key::ArrowRight, Modifiers::NONE, NavigationIntent::Next),
    (Key::ArrowLeft, Modifiers::NONE, NavigationIntent::Previous),
    (Key::Space, Modifiers::NONE, NavigationIntent::Resync),
    (
        Key::S,
        Modifiers {
            alt: true,
            ctrl: true,
            shift: false,
            mac_cmd: false,
            command: false,
        },
        NavigationIntent::ToggleSpeaker,
    ),
    (Key::Space, Modifiers::CTRL, NavigationIntent::FocusAudience),
];

/// Key descriptions for the help overlay.
pub const HELP: &[(&str, &str)] = &[
    ("Right", "Next slide"),
    ("Left", "Previous slide"),
    ("Esc", "Detach (again: overview)"),
    ("Space", "Resync with the live slide"),
    ("Ctrl+Alt+S", "Toggle speaker"),
    ("Ctrl+Space", "Bring the audience here"),
    ("F", "Fullscreen"),
    ("C", "Clone window"),
    ("D", "Toggle theme"),
    ("H", "Toggle help"),
    ("Q", "Quit"),
];

/// The intent bound to `key` pressed with exactly `modifiers`, if any.
pub fn intent_for(key: Key, modifiers: Modifiers) -> Option<NavigationIntent> {
    let pressed = normalize(modifiers);
    BINDINGS
        .iter()
        .find(|(k, m, _)| *k == key && *m == pressed)
        .map(|(_, _, intent)| intent.clone())
}

/// egui reports the platform command key twice (`command` plus `ctrl` or
/// `mac_cmd`); compare on ctrl/alt/shift only.
fn normalize(modifiers: Modifiers) -> Modifiers {
    Modifiers {
        alt: modifiers.alt,
        ctrl: modifiers.ctrl,
        shift: modifiers.shift,
        mac_cmd: false,
        command: false,
    }
}
