use crate::head::{DisplayId, SlideId};

/// Notifications emitted by the navigation controller, applied by the host in order.
///
/// Only the most recent selection matters; the host applies every pending
/// event before the next render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    SlideSelected(Option<SlideId>),
    DisplaySelected(Option<DisplayId>),
    DetachEnabled,
    DetachDisabled,
    SpeakerToggled { speaker: bool },
    FullscreenRequested,
    /// The live-head store could not be reached; local navigation continues.
    StoreUnavailable(String),
}

impl ControllerEvent {
    pub fn is_selection(&self) -> bool {
        matches!(self, Self::SlideSelected(_) | Self::DisplaySelected(_))
    }
}
