//! The navigation state machine: decides what a viewer sees by reconciling
//! local intents, the shared live head, the speaker role and detached mode.
//!
//! Every public operation runs to completion on the caller's thread and
//! returns the [`ControllerEvent`]s it produced, in order. Remote snapshots
//! and local intents may interleave arbitrarily; each is applied against the
//! state left by the previous one.

#[cfg(test)]
mod tests;

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::event::ControllerEvent;
use crate::head::{Head, LiveHead, RoomId, ViewerId};
use crate::intent::{Direction, NavigationIntent};
use crate::store::{LiveHeadStore, StoreEvent, Subscription, ViewerMeta};
use crate::surface::PresentationSurface;

/// Who is watching, where, and from which position a session starts.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub room: RoomId,
    pub viewer: ViewerId,
    pub meta: ViewerMeta,
    /// Initial local head; an overview head shows every slide.
    pub start: Head,
    pub speaker: bool,
    pub detached: bool,
}

impl SessionConfig {
    pub fn new(room: impl Into<RoomId>, viewer: impl Into<ViewerId>) -> Self {
        Self {
            room: room.into(),
            viewer: viewer.into(),
            meta: ViewerMeta::default(),
            start: Head::overview(),
            speaker: false,
            detached: false,
        }
    }

    pub fn starting_at(mut self, start: Head) -> Self {
        self.start = start;
        self
    }

    pub fn as_speaker(mut self) -> Self {
        self.speaker = true;
        self
    }
}

pub struct NavigationController {
    room: RoomId,
    viewer: ViewerId,
    meta: ViewerMeta,
    store: Arc<dyn LiveHeadStore>,
    subscription: Option<Subscription>,
    head: Head,
    live: Option<LiveHead>,
    detached_head: Option<Head>,
    speaker: bool,
    detached: bool,
    events: Vec<ControllerEvent>,
}

impl NavigationController {
    pub fn new(config: SessionConfig, store: Arc<dyn LiveHeadStore>) -> Self {
        let detached_head = config.detached.then(|| config.start.clone());
        Self {
            room: config.room,
            viewer: config.viewer,
            meta: config.meta,
            store,
            subscription: None,
            head: config.start,
            live: None,
            detached_head,
            speaker: config.speaker,
            detached: config.detached,
            events: Vec::new(),
        }
    }

    pub fn head(&self) -> &Head {
        &self.head
    }

    pub fn live_head(&self) -> Option<&LiveHead> {
        self.live.as_ref()
    }

    pub fn detached_head(&self) -> Option<&Head> {
        self.detached_head.as_ref()
    }

    pub fn is_speaker(&self) -> bool {
        self.speaker
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }

    pub fn room(&self) -> &RoomId {
        &self.room
    }

    pub fn viewer(&self) -> &ViewerId {
        &self.viewer
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Start following the room's live head. A failure leaves the controller
    /// working locally and is reported as [`ControllerEvent::StoreUnavailable`].
    pub fn subscribe(&mut self) -> Vec<ControllerEvent> {
        match self.store.subscribe(&self.room) {
            Ok(subscription) => {
                info!(room = %self.room, viewer = %self.viewer, "following live head");
                self.subscription = Some(subscription);
            }
            Err(err) => self.report_store_error(err.to_string()),
        }
        std::mem::take(&mut self.events)
    }

    /// Stop following the live head.
    pub fn dispose(&mut self) {
        if self.subscription.take().is_some() {
            info!(room = %self.room, viewer = %self.viewer, "stopped following live head");
        }
    }

    /// Apply every store event received since the last call, without blocking.
    pub fn poll_remote<S>(&mut self, surface: &S) -> Vec<ControllerEvent>
    where
        S: PresentationSurface + ?Sized,
    {
        let pending = self
            .subscription
            .as_mut()
            .map(Subscription::drain)
            .unwrap_or_default();
        for event in pending {
            self.apply_store_event(event, surface);
        }
        self.finish()
    }

    pub fn on_store_event<S>(&mut self, event: StoreEvent, surface: &S) -> Vec<ControllerEvent>
    where
        S: PresentationSurface + ?Sized,
    {
        self.apply_store_event(event, surface);
        self.finish()
    }

    pub fn on_remote_head_updated<S>(&mut self, live: LiveHead, surface: &S) -> Vec<ControllerEvent>
    where
        S: PresentationSurface + ?Sized,
    {
        self.accept_live(live, surface);
        self.finish()
    }

    pub fn handle_intent<S>(&mut self, intent: NavigationIntent, surface: &S) -> Vec<ControllerEvent>
    where
        S: PresentationSurface + ?Sized,
    {
        debug!(?intent, head = %self.head, speaker = self.speaker, detached = self.detached, "intent");
        match intent {
            NavigationIntent::Next => self.step(Direction::Next, surface),
            NavigationIntent::Previous => self.step(Direction::Previous, surface),
            NavigationIntent::Detach => self.detach(),
            NavigationIntent::Resync => self.resync(surface),
            NavigationIntent::ToggleSpeaker => self.toggle_speaker(surface),
            NavigationIntent::FocusAudience => self.focus_audience(),
            NavigationIntent::Fullscreen => self.events.push(ControllerEvent::FullscreenRequested),
            NavigationIntent::SelectSlide(slide) => {
                if surface.contains_slide(&slide) {
                    let display = self.head.display.clone();
                    self.select(Head::new(Some(slide), display), surface);
                } else {
                    debug!(%slide, "ignoring selection of unknown slide");
                }
            }
            NavigationIntent::SelectDisplay(id) => {
                if surface.has_display(&id) {
                    let slide = self.head.slide.clone();
                    self.select(Head::new(slide, Some(id)), surface);
                } else {
                    debug!(display = %id, "ignoring selection of unknown display");
                }
            }
            NavigationIntent::SelectPanel { slide, display } => {
                let mut head = self.head.clone();
                if surface.contains_slide(&slide) {
                    head.slide = Some(slide);
                }
                if surface.has_display(&display) {
                    head.display = Some(display);
                }
                self.select(head, surface);
            }
        }
        self.finish()
    }

    /// Run the consistency pass on its own, e.g. after the host changed
    /// something outside the controller's control.
    pub fn reconcile(&mut self) -> Vec<ControllerEvent> {
        self.finish()
    }

    fn finish(&mut self) -> Vec<ControllerEvent> {
        self.enforce_consistency();
        std::mem::take(&mut self.events)
    }

    /// An attached audience member must never show a slide the live head
    /// does not name; any divergence is an implicit detach. While detached,
    /// the detached head follows the local head.
    fn enforce_consistency(&mut self) {
        if !self.speaker && !self.detached {
            if let Some(live) = &self.live {
                if live.head.slide != self.head.slide {
                    info!(local = %self.head, live = %live.head, "diverged from live head, detaching");
                    self.events.push(ControllerEvent::DetachEnabled);
                    self.detached = true;
                }
            }
        }
        self.detached_head = self.detached.then(|| self.head.clone());
    }

    fn set_head(&mut self, head: Head) {
        if head == self.head {
            return;
        }
        if head.slide != self.head.slide {
            self.events
                .push(ControllerEvent::SlideSelected(head.slide.clone()));
        }
        if head.display != self.head.display {
            self.events
                .push(ControllerEvent::DisplaySelected(head.display.clone()));
        }
        debug!(from = %self.head, to = %head, "head changed");
        self.head = head;
        if self.detached {
            self.detached_head = Some(self.head.clone());
        }
        self.store
            .record_viewer_position(&self.viewer, &self.head, &self.meta);
    }

    fn step<S>(&mut self, direction: Direction, surface: &S)
    where
        S: PresentationSurface + ?Sized,
    {
        let Some(current) = self.head.slide.as_ref() else {
            debug!(?direction, "no active slide to step from");
            return;
        };
        let Some(target) = surface.adjacent_slide(current, direction) else {
            debug!(?direction, slide = %current, "at the end of the deck");
            return;
        };
        let display = if self.speaker {
            self.head.display.clone()
        } else {
            surface
                .default_display_of(&target)
                .or_else(|| self.head.display.clone())
        };
        self.set_head(Head::new(Some(target), display));
        self.announce(surface);
    }

    /// Direct selection. A speaker that lands on another slide announces it.
    fn select<S>(&mut self, head: Head, surface: &S)
    where
        S: PresentationSurface + ?Sized,
    {
        let slide_changed = head.slide != self.head.slide;
        self.set_head(head);
        if slide_changed {
            self.announce(surface);
        }
    }

    /// Attached speakers publish their slide together with the display the
    /// audience should see on it: the slide's default display, else their own.
    fn announce<S>(&mut self, surface: &S)
    where
        S: PresentationSurface + ?Sized,
    {
        if !self.speaker || self.detached {
            return;
        }
        let Some(slide) = self.head.slide.clone() else {
            return;
        };
        let display = surface
            .default_display_of(&slide)
            .or_else(|| self.head.display.clone());
        self.publish(Head::new(Some(slide), display));
    }

    fn publish(&mut self, head: Head) {
        match self.store.publish(&self.room, &head) {
            Ok(live) => {
                debug!(room = %self.room, %head, version = live.version, "published live head");
                // Our own record; its echo from the subscription is then superseded
                self.live = Some(live);
            }
            Err(err) => self.report_store_error(err.to_string()),
        }
    }

    fn report_store_error(&mut self, reason: String) {
        warn!(room = %self.room, "{reason}");
        self.events.push(ControllerEvent::StoreUnavailable(reason));
    }

    fn detach(&mut self) {
        if self.detached {
            debug!("already detached, returning to overview");
            self.set_head(Head::overview());
        } else {
            debug!(head = %self.head, "detaching");
            self.events.push(ControllerEvent::DetachEnabled);
            self.detached = true;
            self.detached_head = Some(self.head.clone());
        }
    }

    fn resync<S>(&mut self, surface: &S)
    where
        S: PresentationSurface + ?Sized,
    {
        self.detached_head = None;
        self.detached = false;
        self.events.push(ControllerEvent::DetachDisabled);

        let Some(live) = self.live.clone() else {
            debug!("resync before any live head, nothing to follow");
            return;
        };
        if self.speaker && live.head.slide == self.head.slide {
            // Already aligned: a speaker's resync moves the room forward
            self.step(Direction::Next, surface);
        } else {
            self.follow(&live.head, surface);
        }
    }

    /// Mirror the live head: speakers take the slide only, the audience takes
    /// slide and display. Dimensions naming something the surface lacks are skipped.
    fn follow<S>(&mut self, live: &Head, surface: &S)
    where
        S: PresentationSurface + ?Sized,
    {
        let mut head = self.head.clone();
        match &live.slide {
            Some(slide) if !surface.contains_slide(slide) => {
                warn!(%slide, "live head names an unknown slide");
            }
            slide => head.slide = slide.clone(),
        }
        if !self.speaker {
            match &live.display {
                Some(id) if !surface.has_display(id) => {
                    warn!(display = %id, "live head names an unknown display");
                }
                other => head.display = other.clone(),
            }
        }
        self.set_head(head);
    }

    fn toggle_speaker<S>(&mut self, surface: &S)
    where
        S: PresentationSurface + ?Sized,
    {
        if self.detached {
            debug!("speaker toggle ignored while detached");
            return;
        }
        self.speaker = !self.speaker;
        info!(speaker = self.speaker, viewer = %self.viewer, "speaker role toggled");
        self.events.push(ControllerEvent::SpeakerToggled {
            speaker: self.speaker,
        });
        if self
            .live
            .as_ref()
            .is_some_and(|live| live.head.slide != self.head.slide)
        {
            self.resync(surface);
        }
    }

    fn focus_audience(&mut self) {
        if !(self.speaker && self.detached) {
            debug!("focus ignored: only a detached speaker can refocus the audience");
            return;
        }
        self.publish(self.head.clone());
        self.detached = false;
        self.detached_head = None;
        self.events.push(ControllerEvent::DetachDisabled);
    }

    fn accept_live<S>(&mut self, live: LiveHead, surface: &S)
    where
        S: PresentationSurface + ?Sized,
    {
        if let Some(current) = &self.live {
            if !live.supersedes(current) {
                debug!(
                    received = live.version,
                    current = current.version,
                    "dropping superseded live head"
                );
                return;
            }
        }
        debug!(live = %live.head, version = live.version, "live head updated");
        let first = self.live.is_none();
        let head = live.head.clone();
        self.live = Some(live);
        if first {
            self.resync(surface);
        } else if !self.detached {
            self.follow(&head, surface);
        }
    }

    fn apply_store_event<S>(&mut self, event: StoreEvent, surface: &S)
    where
        S: PresentationSurface + ?Sized,
    {
        match event {
            StoreEvent::Snapshot(live) => self.accept_live(live, surface),
            StoreEvent::Unavailable(reason) => self.report_store_error(reason),
        }
    }
}

impl std::fmt::Debug for NavigationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationController")
            .field("room", &self.room)
            .field("viewer", &self.viewer)
            .field("head", &self.head)
            .field("live", &self.live)
            .field("detached_head", &self.detached_head)
            .field("speaker", &self.speaker)
            .field("detached", &self.detached)
            .finish_non_exhaustive()
    }
}
