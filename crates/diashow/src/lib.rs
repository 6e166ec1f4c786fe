pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod controller;
pub mod deck;
pub mod event;
pub mod head;
pub mod host;
pub mod input;
pub mod intent;
pub mod store;
pub mod surface;
pub mod theme;

pub use controller::{NavigationController, SessionConfig};
pub use event::ControllerEvent;
pub use head::{DisplayId, Head, LiveHead, RoomId, SlideId, ViewerId};
pub use host::PresentationHost;
pub use intent::{Direction, NavigationIntent};
pub use store::{LiveHeadStore, StoreError, StoreEvent};
pub use surface::PresentationSurface;
