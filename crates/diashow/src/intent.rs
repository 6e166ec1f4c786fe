use crate::head::{DisplayId, SlideId};

/// Document-order direction used to resolve adjacent slides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// A discrete navigation request, produced by keyboard, pointer or host clicks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationIntent {
    Next,
    Previous,
    /// Enter detached mode, or return to the overview when already detached.
    Detach,
    /// Leave detached mode and rejoin the live head.
    Resync,
    ToggleSpeaker,
    /// Speaker only: push the speaker's detached position to the audience.
    FocusAudience,
    Fullscreen,
    /// A slide was picked directly (e.g. from the overview grid).
    SelectSlide(SlideId),
    /// A display was picked from the display selector.
    SelectDisplay(DisplayId),
    /// A single panel was picked: slide and display at once.
    SelectPanel { slide: SlideId, display: DisplayId },
}
