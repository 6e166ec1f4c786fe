use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Identifier of a slide, unique within a deck.
    SlideId
);
string_id!(
    /// Identifier of a display (a panel binding such as `main` or `notes`).
    DisplayId
);
string_id!(
    /// Key of a shared live head.
    RoomId
);
string_id!(
    /// Identifier of a viewer session, used for audience tracking.
    ViewerId
);

/// What is currently shown: a slide and a display, either of which may be unset.
///
/// A head with neither set is the overview ("dashboard") state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Head {
    #[serde(default)]
    pub slide: Option<SlideId>,
    #[serde(default)]
    pub display: Option<DisplayId>,
}

impl Head {
    pub fn new(slide: Option<SlideId>, display: Option<DisplayId>) -> Self {
        Self { slide, display }
    }

    pub fn at(slide: impl Into<SlideId>, display: impl Into<DisplayId>) -> Self {
        Self {
            slide: Some(slide.into()),
            display: Some(display.into()),
        }
    }

    pub fn overview() -> Self {
        Self::default()
    }

    pub fn is_overview(&self) -> bool {
        self.slide.is_none() && self.display.is_none()
    }
}

impl fmt::Display for Head {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slide = self.slide.as_ref().map_or("-", |s| s.as_str());
        let display = self.display.as_ref().map_or("-", |d| d.as_str());
        write!(f, "{slide}@{display}")
    }
}

/// A head as published to a room, stamped with the store's monotonic version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveHead {
    #[serde(flatten)]
    pub head: Head,
    pub version: u64,
}

impl LiveHead {
    pub fn new(head: Head, version: u64) -> Self {
        Self { head, version }
    }

    /// Whether this snapshot should replace `other`.
    ///
    /// A higher version always wins. Two different heads sharing a version
    /// come from writers that raced; the one delivered later is the one the
    /// store kept, so it wins too.
    pub fn supersedes(&self, other: &LiveHead) -> bool {
        self.version > other.version || (self.version == other.version && self.head != other.head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overview_head() {
        assert!(Head::overview().is_overview());
        assert!(!Head::at("s1", "main").is_overview());
        assert!(!Head::new(None, Some("main".into())).is_overview());
    }

    #[test]
    fn test_head_display_format() {
        assert_eq!(Head::at("intro", "main").to_string(), "intro@main");
        assert_eq!(Head::overview().to_string(), "-@-");
    }

    #[test]
    fn test_live_head_supersedes() {
        let older = LiveHead::new(Head::at("s1", "main"), 3);
        let newer = LiveHead::new(Head::at("s2", "main"), 4);
        assert!(newer.supersedes(&older));
        assert!(!older.supersedes(&newer));
        assert!(!older.supersedes(&older.clone()));
    }

    #[test]
    fn test_tied_version_with_other_head_supersedes() {
        let first = LiveHead::new(Head::at("s2", "main"), 2);
        let raced = LiveHead::new(Head::at("s3", "main"), 2);
        assert!(raced.supersedes(&first));
        assert!(!LiveHead::new(Head::at("s9", "main"), 1).supersedes(&first));
    }

    #[test]
    fn test_live_head_json_shape() {
        let live = LiveHead::new(Head::at("s2", "alt"), 7);
        let json = serde_json::to_value(&live).unwrap();
        assert_eq!(json["slide"], "s2");
        assert_eq!(json["display"], "alt");
        assert_eq!(json["version"], 7);

        let parsed: LiveHead = serde_json::from_str(r#"{"version": 1}"#).unwrap();
        assert!(parsed.head.is_overview());
    }
}
