pub mod frontmatter;
pub mod splitter;

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;

use crate::head::{DisplayId, Head, RoomId, SlideId};
use crate::surface::PresentationSurface;

static SLIDE_DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@slide:\s*(\S+)\s*$").expect("valid slide directive regex"));
static DISPLAY_DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@display:\s*(\S+)(\s+default)?\s*$").expect("valid display directive regex")
});

#[derive(Debug, Clone)]
pub struct Deck {
    pub meta: DeckMeta,
    slides: Vec<DeckSlide>,
}

#[derive(Debug, Clone, Default)]
pub struct DeckMeta {
    pub title: Option<String>,
    pub author: Option<String>,
    pub room: Option<RoomId>,
    pub start_slide: Option<SlideId>,
    pub start_display: Option<DisplayId>,
    pub theme: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DeckSlide {
    pub id: SlideId,
    pub panels: Vec<Panel>,
    pub hidden: bool,
}

/// Content of a slide for one display. Unbound panels (`display == None`)
/// are shown on every display.
#[derive(Debug, Clone)]
pub struct Panel {
    pub display: Option<DisplayId>,
    pub default: bool,
    pub content: String,
    pub hidden: bool,
}

impl Panel {
    pub fn bound(display: impl Into<DisplayId>, content: impl Into<String>) -> Self {
        Self {
            display: Some(display.into()),
            default: false,
            content: content.into(),
            hidden: false,
        }
    }

    pub fn unbound(content: impl Into<String>) -> Self {
        Self {
            display: None,
            default: false,
            content: content.into(),
            hidden: false,
        }
    }

    pub fn as_default(mut self) -> Self {
        self.default = true;
        self
    }
}

impl DeckSlide {
    pub fn new(id: impl Into<SlideId>, panels: Vec<Panel>) -> Self {
        Self {
            id: id.into(),
            panels,
            hidden: false,
        }
    }

    pub fn default_display(&self) -> Option<&DisplayId> {
        self.panels
            .iter()
            .find(|p| p.default)
            .and_then(|p| p.display.as_ref())
    }

    pub fn visible_panels(&self) -> impl Iterator<Item = &Panel> {
        self.panels.iter().filter(|p| !p.hidden)
    }
}

impl Deck {
    pub fn new(meta: DeckMeta, slides: Vec<DeckSlide>) -> Result<Self> {
        let mut seen = HashSet::new();
        for slide in &slides {
            if !seen.insert(slide.id.clone()) {
                anyhow::bail!("Duplicate slide id: {}", slide.id);
            }
        }
        Ok(Self { meta, slides })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let (meta, body) = frontmatter::extract(content)?;
        let slides = splitter::split(&body)
            .iter()
            .enumerate()
            .map(|(index, raw)| parse_slide(index, raw))
            .collect();
        Self::new(meta, slides)
    }

    pub fn slides(&self) -> &[DeckSlide] {
        &self.slides
    }

    pub fn slide(&self, id: &SlideId) -> Option<&DeckSlide> {
        self.slides.iter().find(|s| &s.id == id)
    }

    pub fn visible_slides(&self) -> impl Iterator<Item = &DeckSlide> {
        self.slides.iter().filter(|s| !s.hidden)
    }

    /// The author-supplied starting position. An unset slide means overview.
    pub fn start_head(&self) -> Head {
        Head::new(
            self.meta.start_slide.clone(),
            self.meta.start_display.clone(),
        )
    }

    fn slide_mut(&mut self, id: &SlideId) -> Option<&mut DeckSlide> {
        self.slides.iter_mut().find(|s| &s.id == id)
    }
}

fn parse_slide(index: usize, raw: &str) -> DeckSlide {
    let mut id: Option<SlideId> = None;
    let mut panels: Vec<Panel> = Vec::new();
    let mut current = Panel::unbound(String::new());

    for line in raw.lines() {
        let trimmed = line.trim();
        if let Some(caps) = SLIDE_DIRECTIVE.captures(trimmed) {
            id = Some(SlideId::new(&caps[1]));
            continue;
        }
        if let Some(caps) = DISPLAY_DIRECTIVE.captures(trimmed) {
            let finished = std::mem::replace(&mut current, Panel::bound(&caps[1], String::new()));
            push_panel(&mut panels, finished);
            current.default = caps.get(2).is_some();
            continue;
        }
        if !current.content.is_empty() {
            current.content.push('\n');
        }
        current.content.push_str(line);
    }
    push_panel(&mut panels, current);

    // Only the first default panel counts
    let mut seen_default = false;
    for panel in &mut panels {
        if panel.default && seen_default {
            panel.default = false;
        }
        seen_default |= panel.default;
    }

    DeckSlide::new(
        id.unwrap_or_else(|| SlideId::new(format!("slide-{}", index + 1))),
        panels,
    )
}

fn push_panel(panels: &mut Vec<Panel>, mut panel: Panel) {
    panel.content = panel.content.trim().to_string();
    // An empty unbound panel is just whitespace before the first @display
    if panel.display.is_none() && panel.content.is_empty() {
        return;
    }
    panels.push(panel);
}

impl PresentationSurface for Deck {
    fn ordered_slides(&self) -> Vec<SlideId> {
        self.slides.iter().map(|s| s.id.clone()).collect()
    }

    fn panels_of(&self, slide: &SlideId) -> Vec<DisplayId> {
        self.slide(slide)
            .map(|s| s.panels.iter().filter_map(|p| p.display.clone()).collect())
            .unwrap_or_default()
    }

    fn default_display_of(&self, slide: &SlideId) -> Option<DisplayId> {
        self.slide(slide)?.default_display().cloned()
    }

    fn set_slide_visibility(&mut self, slide: &SlideId, hidden: bool) {
        if let Some(s) = self.slide_mut(slide) {
            s.hidden = hidden;
            for panel in s.panels.iter_mut().filter(|p| p.display.is_none()) {
                panel.hidden = hidden;
            }
        }
    }

    fn set_panel_visibility(&mut self, slide: &SlideId, display: &DisplayId, hidden: bool) {
        if let Some(s) = self.slide_mut(slide) {
            for panel in s
                .panels
                .iter_mut()
                .filter(|p| p.display.as_ref() == Some(display))
            {
                panel.hidden = hidden;
            }
        }
    }

    fn enumerate_displays(&self) -> Vec<DisplayId> {
        let mut displays: Vec<DisplayId> = Vec::new();
        for display in self
            .slides
            .iter()
            .flat_map(|s| s.panels.iter())
            .filter_map(|p| p.display.as_ref())
        {
            if !displays.contains(display) {
                displays.push(display.clone());
            }
        }
        displays
    }

    fn contains_slide(&self, slide: &SlideId) -> bool {
        self.slide(slide).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::Direction;
    use crate::surface::apply_visibility;

    const SAMPLE: &str = "---
title: Sample
room: room:main
slide: intro
display: main
---

@slide: intro

@display: main default
# Welcome

@display: notes
Say hello

---

@slide: body
Shared footer text

@display: notes
Notes only

@display: alt default
# Alt view

@display: main default
# Main view



Untitled slide content
";

    #[test]
    fn test_parses_slides_and_panels() {
        let deck = Deck::parse(SAMPLE).unwrap();
        assert_eq!(deck.meta.title.as_deref(), Some("Sample"));
        assert_eq!(
            deck.ordered_slides(),
            vec![
                SlideId::from("intro"),
                SlideId::from("body"),
                SlideId::from("slide-3")
            ]
        );

        let intro = deck.slide(&"intro".into()).unwrap();
        assert_eq!(intro.panels.len(), 2);
        assert_eq!(intro.panels[0].content, "# Welcome");
        assert_eq!(intro.panels[1].content, "Say hello");

        let body = deck.slide(&"body".into()).unwrap();
        assert_eq!(body.panels[0].display, None);
        assert_eq!(body.panels[0].content, "Shared footer text");
    }

    #[test]
    fn test_first_default_panel_wins() {
        let deck = Deck::parse(SAMPLE).unwrap();
        assert_eq!(
            deck.default_display_of(&"body".into()),
            Some(DisplayId::from("alt"))
        );
        assert_eq!(deck.default_display_of(&"slide-3".into()), None);
        assert_eq!(deck.default_display_of(&"missing".into()), None);
    }

    #[test]
    fn test_start_head_from_front_matter() {
        let deck = Deck::parse(SAMPLE).unwrap();
        assert_eq!(deck.start_head(), Head::at("intro", "main"));
    }

    #[test]
    fn test_enumerate_displays_in_declaration_order() {
        let deck = Deck::parse(SAMPLE).unwrap();
        assert_eq!(
            deck.enumerate_displays(),
            vec![
                DisplayId::from("main"),
                DisplayId::from("notes"),
                DisplayId::from("alt")
            ]
        );
    }

    #[test]
    fn test_duplicate_slide_ids_rejected() {
        let content = "@slide: a\nOne\n\n---\n\n@slide: a\nTwo";
        let err = Deck::parse(content).unwrap_err();
        assert!(err.to_string().contains("Duplicate slide id"));
    }

    #[test]
    fn test_adjacent_slides() {
        let deck = Deck::parse(SAMPLE).unwrap();
        assert_eq!(
            deck.adjacent_slide(&"intro".into(), Direction::Next),
            Some(SlideId::from("body"))
        );
        assert_eq!(
            deck.adjacent_slide(&"intro".into(), Direction::Previous),
            None
        );
        assert_eq!(deck.adjacent_slide(&"slide-3".into(), Direction::Next), None);
        assert_eq!(deck.adjacent_slide(&"ghost".into(), Direction::Next), None);
    }

    #[test]
    fn test_visibility_rules() {
        let mut deck = Deck::parse(SAMPLE).unwrap();
        apply_visibility(&mut deck, Some(&"body".into()), Some(&"notes".into()));

        let visible: Vec<&str> = deck.visible_slides().map(|s| s.id.as_str()).collect();
        assert_eq!(visible, vec!["body"]);

        let body = deck.slide(&"body".into()).unwrap();
        let shown: Vec<Option<&str>> = body
            .visible_panels()
            .map(|p| p.display.as_ref().map(|d| d.as_str()))
            .collect();
        // Unbound panel follows its slide; only the notes panel matches the display
        assert_eq!(shown, vec![None, Some("notes")]);

        let intro = deck.slide(&"intro".into()).unwrap();
        assert!(intro.panels.iter().all(|p| p.hidden));
    }

    #[test]
    fn test_overview_shows_everything() {
        let mut deck = Deck::parse(SAMPLE).unwrap();
        apply_visibility(&mut deck, Some(&"intro".into()), Some(&"main".into()));
        apply_visibility(&mut deck, None, None);
        assert!(deck.slides().iter().all(|s| !s.hidden));
        assert!(
            deck.slides()
                .iter()
                .flat_map(|s| s.panels.iter())
                .all(|p| !p.hidden)
        );
    }

    #[test]
    fn test_stale_ids_are_ignored() {
        let mut deck = Deck::parse(SAMPLE).unwrap();
        deck.set_slide_visibility(&"ghost".into(), true);
        deck.set_panel_visibility(&"ghost".into(), &"main".into(), true);
        assert!(deck.panels_of(&"ghost".into()).is_empty());
        assert!(!deck.contains_slide(&"ghost".into()));
    }
}
