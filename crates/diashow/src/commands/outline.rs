use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use crate::deck::{Deck, DeckSlide};
use crate::surface::PresentationSurface;

pub fn run(file: &Path) -> Result<()> {
    let deck = Deck::load(file)?;
    print!("{}", render(&deck));
    Ok(())
}

fn render(deck: &Deck) -> String {
    let mut out = String::new();
    let title = deck.meta.title.as_deref().unwrap_or("(untitled)");
    out.push_str(&format!("{}\n", title.bold()));
    if let Some(author) = &deck.meta.author {
        out.push_str(&format!("{}\n", author.dimmed()));
    }
    if let Some(room) = &deck.meta.room {
        out.push_str(&format!("room: {room}\n"));
    }
    if deck.meta.start_slide.is_some() || deck.meta.start_display.is_some() {
        out.push_str(&format!("start: {}\n", deck.start_head()));
    }

    let displays: Vec<String> = deck
        .enumerate_displays()
        .iter()
        .map(|d| d.to_string())
        .collect();
    out.push_str(&format!(
        "displays: {}\n\n",
        if displays.is_empty() {
            "(none)".to_string()
        } else {
            displays.join(", ")
        }
    ));

    for (index, slide) in deck.slides().iter().enumerate() {
        out.push_str(&format!(
            "{:>3}. {}\n",
            index + 1,
            slide.id.to_string().cyan()
        ));
        out.push_str(&panel_lines(slide));
    }
    out
}

fn panel_lines(slide: &DeckSlide) -> String {
    let mut out = String::new();
    for panel in &slide.panels {
        let name = match &panel.display {
            Some(display) => display.to_string(),
            None => "*".to_string(),
        };
        let marker = if panel.default { " (default)" } else { "" };
        let preview = panel.content.lines().next().unwrap_or("").trim();
        out.push_str(&format!(
            "     {}{} {}\n",
            name,
            marker.green(),
            preview.dimmed()
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outline_lists_slides_and_defaults() {
        colored::control::set_override(false);
        let deck = Deck::parse(
            "---\ntitle: Demo\n---\n\n@slide: intro\n@display: main default\n# Hi\n@display: notes\nSay hi\n",
        )
        .unwrap();
        let text = render(&deck);
        assert!(text.starts_with("Demo\n"));
        assert!(text.contains("displays: main, notes"));
        assert!(text.contains("  1. intro"));
        assert!(text.contains("main (default) # Hi"));
        assert!(text.contains("notes Say hi"));
    }
}
