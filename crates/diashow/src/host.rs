//! The presentation container: owns the surface, the public selection state
//! and exactly one navigation controller per mounted session.

use std::sync::Arc;

use tracing::{debug, info};

use crate::controller::{NavigationController, SessionConfig};
use crate::event::ControllerEvent;
use crate::head::{DisplayId, Head, SlideId};
use crate::intent::NavigationIntent;
use crate::store::LiveHeadStore;
use crate::surface::{PresentationSurface, apply_visibility};

pub struct PresentationHost<S: PresentationSurface> {
    surface: S,
    controller: NavigationController,
    slide: Option<SlideId>,
    display: Option<DisplayId>,
    speaker: bool,
    detached: bool,
    fullscreen_requested: bool,
    warnings: Vec<String>,
}

impl<S: PresentationSurface> PresentationHost<S> {
    /// Build the controller for this session, start following the room and
    /// show the starting position.
    pub fn mount(surface: S, config: SessionConfig, store: Arc<dyn LiveHeadStore>) -> Self {
        info!(room = %config.room, viewer = %config.viewer, start = %config.start, "mounting presentation");
        let Head { slide, display } = config.start.clone();
        let speaker = config.speaker;
        let detached = config.detached;
        let mut host = Self {
            surface,
            controller: NavigationController::new(config, store),
            slide,
            display,
            speaker,
            detached,
            fullscreen_requested: false,
            warnings: Vec::new(),
        };
        apply_visibility(&mut host.surface, host.slide.as_ref(), host.display.as_ref());
        let events = host.controller.subscribe();
        host.apply(events);
        host.pump();
        host
    }

    pub fn dispatch(&mut self, intent: NavigationIntent) {
        let events = self.controller.handle_intent(intent, &self.surface);
        self.apply(events);
    }

    /// Apply remote updates received since the last call. Returns whether
    /// anything changed.
    pub fn pump(&mut self) -> bool {
        let events = self.controller.poll_remote(&self.surface);
        let changed = !events.is_empty();
        self.apply(events);
        changed
    }

    pub fn reconcile(&mut self) {
        let events = self.controller.reconcile();
        self.apply(events);
    }

    fn apply(&mut self, events: Vec<ControllerEvent>) {
        let mut selection_changed = false;
        for event in events {
            debug!(?event, "applying controller event");
            selection_changed |= event.is_selection();
            match event {
                ControllerEvent::SlideSelected(slide) => self.slide = slide,
                ControllerEvent::DisplaySelected(display) => self.display = display,
                ControllerEvent::DetachEnabled => self.detached = true,
                ControllerEvent::DetachDisabled => self.detached = false,
                ControllerEvent::SpeakerToggled { speaker } => self.speaker = speaker,
                ControllerEvent::FullscreenRequested => self.fullscreen_requested = true,
                ControllerEvent::StoreUnavailable(reason) => self.warnings.push(reason),
            }
        }
        if selection_changed {
            apply_visibility(&mut self.surface, self.slide.as_ref(), self.display.as_ref());
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn controller(&self) -> &NavigationController {
        &self.controller
    }

    pub fn slide(&self) -> Option<&SlideId> {
        self.slide.as_ref()
    }

    pub fn display(&self) -> Option<&DisplayId> {
        self.display.as_ref()
    }

    pub fn is_speaker(&self) -> bool {
        self.speaker
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }

    /// Neither a slide nor a display is selected: every slide is shown.
    pub fn is_overview(&self) -> bool {
        self.slide.is_none() && self.display.is_none()
    }

    /// Returns `true` once per fullscreen request.
    pub fn take_fullscreen_request(&mut self) -> bool {
        std::mem::take(&mut self.fullscreen_requested)
    }

    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }

    /// Stop following the room and hand back the surface.
    pub fn unmount(mut self) -> S {
        self.controller.dispose();
        info!(room = %self.controller.room(), "unmounted presentation");
        self.surface
    }
}
