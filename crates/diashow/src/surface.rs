use crate::head::{DisplayId, SlideId};
use crate::intent::Direction;

/// The rendered side of a presentation: slides in document order, each with
/// panels bound to displays.
///
/// Lookups with an unknown slide id return `None` or empty results and
/// setters ignore it, so stale identifiers never break navigation.
pub trait PresentationSurface {
    /// Slide ids in document order.
    fn ordered_slides(&self) -> Vec<SlideId>;

    /// Display ids of the panels of `slide` that are bound to a display.
    fn panels_of(&self, slide: &SlideId) -> Vec<DisplayId>;

    /// The display flagged as the audience default for `slide`.
    fn default_display_of(&self, slide: &SlideId) -> Option<DisplayId>;

    fn set_slide_visibility(&mut self, slide: &SlideId, hidden: bool);

    fn set_panel_visibility(&mut self, slide: &SlideId, display: &DisplayId, hidden: bool);

    /// Distinct display ids declared across all panels, in declaration order.
    fn enumerate_displays(&self) -> Vec<DisplayId>;

    fn adjacent_slide(&self, slide: &SlideId, direction: Direction) -> Option<SlideId> {
        let slides = self.ordered_slides();
        let index = slides.iter().position(|s| s == slide)?;
        let target = match direction {
            Direction::Next => index.checked_add(1)?,
            Direction::Previous => index.checked_sub(1)?,
        };
        slides.get(target).cloned()
    }

    fn contains_slide(&self, slide: &SlideId) -> bool {
        self.ordered_slides().contains(slide)
    }

    fn has_display(&self, display: &DisplayId) -> bool {
        self.enumerate_displays().contains(display)
    }
}

/// Hide and reveal slides and panels for the given selection.
///
/// A slide is hidden when an active slide is set and it is another one. A
/// panel is hidden along with its slide, or when an active display is set
/// and the panel is bound to a different display.
pub fn apply_visibility<S: PresentationSurface + ?Sized>(
    surface: &mut S,
    slide: Option<&SlideId>,
    display: Option<&DisplayId>,
) {
    for id in surface.ordered_slides() {
        let slide_hidden = slide.is_some_and(|active| *active != id);
        surface.set_slide_visibility(&id, slide_hidden);
        for panel in surface.panels_of(&id) {
            let display_hidden = display.is_some_and(|active| *active != panel);
            surface.set_panel_visibility(&id, &panel, slide_hidden || display_hidden);
        }
    }
}
