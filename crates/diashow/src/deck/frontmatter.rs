use anyhow::{Context, Result};
use serde::Deserialize;

use super::DeckMeta;

/// Separate YAML front matter (between leading `---` lines) from the deck body.
///
/// Returns default metadata and the whole content when there is no front matter.
pub fn extract(content: &str) -> Result<(DeckMeta, String)> {
    let content = content.replace("\r\n", "\n");
    let Some(rest) = content.strip_prefix("---\n") else {
        return Ok((DeckMeta::default(), content));
    };

    let Some(end) = find_closing(rest) else {
        return Ok((DeckMeta::default(), content));
    };

    let yaml = &rest[..end];
    let body = rest[end..]
        .split_once('\n')
        .map(|(_, body)| body)
        .unwrap_or("");

    let meta = if yaml.trim().is_empty() {
        DeckMeta::default()
    } else {
        let raw: RawMeta = serde_yaml::from_str(yaml).context("Invalid deck front matter")?;
        raw.into()
    };
    Ok((meta, body.to_string()))
}

/// Byte offset of the closing `---` line within `rest`.
fn find_closing(rest: &str) -> Option<usize> {
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Some(offset);
        }
        offset += line.len();
    }
    None
}

#[derive(Debug, Default, Deserialize)]
struct RawMeta {
    title: Option<String>,
    author: Option<String>,
    room: Option<String>,
    slide: Option<String>,
    display: Option<String>,
    theme: Option<String>,
}

impl From<RawMeta> for DeckMeta {
    fn from(raw: RawMeta) -> Self {
        Self {
            title: raw.title,
            author: raw.author,
            room: raw.room.map(Into::into),
            start_slide: raw.slide.map(Into::into),
            start_display: raw.display.map(Into::into),
            theme: raw.theme,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_front_matter() {
        let content = "---\ntitle: Demo\nroom: room:main\nslide: intro\ndisplay: main\n---\n\nBody";
        let (meta, body) = extract(content).unwrap();
        assert_eq!(meta.title.as_deref(), Some("Demo"));
        assert_eq!(meta.room.as_ref().map(|r| r.as_str()), Some("room:main"));
        assert_eq!(meta.start_slide.as_ref().map(|s| s.as_str()), Some("intro"));
        assert_eq!(meta.start_display.as_ref().map(|d| d.as_str()), Some("main"));
        assert_eq!(body.trim(), "Body");
    }

    #[test]
    fn test_no_front_matter() {
        let (meta, body) = extract("# Just a slide").unwrap();
        assert!(meta.title.is_none());
        assert_eq!(body, "# Just a slide");
    }

    #[test]
    fn test_unclosed_front_matter_is_body() {
        let (meta, body) = extract("---\ntitle: Demo\n").unwrap();
        assert!(meta.title.is_none());
        assert!(body.starts_with("---"));
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        assert!(extract("---\ntitle: [unclosed\n---\nBody").is_err());
    }
}
