use crate::intent::NavigationIntent;

/// Fraction of the surface width a drag must cover to count as a swipe.
pub const SWIPE_RATIO_THRESHOLD: f32 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gesture {
    Swipe,
    Zoom,
}

/// Turns horizontal drags into Next/Previous intents.
///
/// Right-to-left is Next, left-to-right is Previous. Two-finger touches are
/// zoom gestures and never navigate.
#[derive(Debug, Default)]
pub struct SwipeTracker {
    anchor: Option<(f32, Gesture)>,
}

impl SwipeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pointer_down(&mut self, x: f32, touches: usize) {
        let gesture = if touches == 2 {
            Gesture::Zoom
        } else {
            Gesture::Swipe
        };
        self.anchor = Some((x, gesture));
    }

    /// Feed a pointer position. Returns an intent once the drag since the
    /// anchor passes the threshold, then re-anchors at `x`.
    pub fn pointer_move(&mut self, x: f32, width: f32) -> Option<NavigationIntent> {
        let (anchor, gesture) = self.anchor?;
        if gesture == Gesture::Zoom || width <= 0.0 {
            return None;
        }
        let ratio = (x - anchor) / width;
        let intent = if ratio >= SWIPE_RATIO_THRESHOLD {
            NavigationIntent::Previous
        } else if ratio <= -SWIPE_RATIO_THRESHOLD {
            NavigationIntent::Next
        } else {
            return None;
        };
        self.anchor = Some((x, gesture));
        Some(intent)
    }

    pub fn pointer_up(&mut self) {
        self.anchor = None;
    }

    pub fn is_tracking(&self) -> bool {
        self.anchor.is_some()
    }
}
