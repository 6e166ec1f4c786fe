//! Physical input mapped to navigation intents.

pub mod keyboard;
pub mod pointer;

pub use keyboard::intent_for;
pub use pointer::SwipeTracker;
