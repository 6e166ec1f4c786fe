use eframe::egui::Color32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeKind {
    Light,
    Dark,
}

impl ThemeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub kind: ThemeKind,
    pub background: Color32,
    pub foreground: Color32,
    pub heading: Color32,
    pub muted: Color32,
    pub accent: Color32,
    pub panel_background: Color32,
    pub status_background: Color32,
    pub speaker_badge: Color32,
    pub detached_badge: Color32,
    pub title_size: f32,
    pub heading_size: f32,
    pub body_size: f32,
    pub status_size: f32,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            kind: ThemeKind::Dark,
            background: Color32::from_rgb(0x1E, 0x1E, 0x1E),
            foreground: Color32::from_rgb(0xC8, 0xC8, 0xC8),
            heading: Color32::WHITE,
            muted: Color32::from_rgb(0x80, 0x80, 0x80),
            accent: Color32::from_rgb(0x52, 0x94, 0xE2),
            panel_background: Color32::from_rgb(0x2A, 0x2A, 0x2A),
            status_background: Color32::from_rgb(0x14, 0x14, 0x14),
            speaker_badge: Color32::from_rgb(0xE8, 0xA8, 0x38),
            detached_badge: Color32::from_rgb(0xFF, 0x7E, 0x67),
            title_size: 64.0,
            heading_size: 44.0,
            body_size: 28.0,
            status_size: 14.0,
        }
    }

    pub fn light() -> Self {
        Self {
            kind: ThemeKind::Light,
            background: Color32::WHITE,
            foreground: Color32::from_rgb(0x1A, 0x1A, 0x2E),
            heading: Color32::from_rgb(0x16, 0x21, 0x3E),
            muted: Color32::from_rgb(0x70, 0x70, 0x78),
            accent: Color32::from_rgb(0x0F, 0x34, 0x60),
            panel_background: Color32::from_rgb(0xF5, 0xF5, 0xF5),
            status_background: Color32::from_rgb(0xE8, 0xE8, 0xEC),
            speaker_badge: Color32::from_rgb(0xB8, 0x7B, 0x0A),
            detached_badge: Color32::from_rgb(0xC7, 0x3E, 0x1D),
            title_size: 64.0,
            heading_size: 44.0,
            body_size: 28.0,
            status_size: 14.0,
        }
    }

    /// Unknown names fall back to the light theme.
    pub fn from_name(name: &str) -> Self {
        match name {
            "dark" => Self::dark(),
            _ => Self::light(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.as_str()
    }

    pub fn toggled(&self) -> Self {
        match self.kind {
            ThemeKind::Dark => Self::light(),
            ThemeKind::Light => Self::dark(),
        }
    }

    pub fn with_opacity(color: Color32, opacity: f32) -> Color32 {
        let alpha = (opacity.clamp(0.0, 1.0) * 255.0) as u8;
        Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
    }

    /// Font size for a markdown heading level; 0 is body text.
    pub fn text_size(&self, level: usize) -> f32 {
        match level {
            1 => self.title_size,
            2 => self.heading_size,
            3 => (self.heading_size + self.body_size) / 2.0,
            _ => self.body_size,
        }
    }
}
