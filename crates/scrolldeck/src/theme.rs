use eframe::egui::Color32;

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    pub background: Color32,
    pub foreground: Color32,
    pub heading_color: Color32,
    pub muted: Color32,
    pub panel: Color32,
    /// Opaque fill for stack cards, so pinned cards hide the ones beneath.
    pub card: Color32,
    pub panel_border: Color32,
    /// Active dot and stack scrollbar.
    pub accent: Color32,
    pub dot_inactive: Color32,
    /// Revenue figure.
    pub highlight: Color32,
    /// Association benefit line on stack cards.
    pub secondary: Color32,
    pub title_size: f32,
    pub subtitle_size: f32,
    pub body_size: f32,
    pub small_size: f32,
    pub figure_size: f32,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: "dark".to_string(),
            background: Color32::from_rgb(0x03, 0x07, 0x12),
            foreground: Color32::from_rgb(0xEE, 0xF2, 0xFF),
            heading_color: Color32::WHITE,
            muted: Color32::from_rgb(0xCB, 0xD5, 0xE1),
            panel: Color32::from_rgba_unmultiplied(0xFF, 0xFF, 0xFF, 0x0D),
            card: Color32::from_rgb(0x0E, 0x15, 0x2B),
            panel_border: Color32::from_rgba_unmultiplied(0xFF, 0xFF, 0xFF, 0x1A),
            accent: Color32::from_rgb(0x7C, 0x3A, 0xED),
            dot_inactive: Color32::from_rgb(0x79, 0xE7, 0xF3),
            highlight: Color32::from_rgb(0x34, 0xD3, 0x99),
            secondary: Color32::from_rgb(0x30, 0xCF, 0xCE),
            title_size: 40.0,
            subtitle_size: 18.0,
            body_size: 18.0,
            small_size: 13.0,
            figure_size: 36.0,
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light".to_string(),
            background: Color32::from_rgb(0xF8, 0xFA, 0xFC),
            foreground: Color32::from_rgb(0x1A, 0x1A, 0x2E),
            heading_color: Color32::from_rgb(0x16, 0x21, 0x3E),
            muted: Color32::from_rgb(0x47, 0x55, 0x69),
            panel: Color32::from_rgba_unmultiplied(0x0F, 0x17, 0x2A, 0x0D),
            card: Color32::WHITE,
            panel_border: Color32::from_rgba_unmultiplied(0x0F, 0x17, 0x2A, 0x1F),
            accent: Color32::from_rgb(0x6D, 0x28, 0xD9),
            dot_inactive: Color32::from_rgb(0x0E, 0x74, 0x90),
            highlight: Color32::from_rgb(0x05, 0x96, 0x69),
            secondary: Color32::from_rgb(0x0F, 0x76, 0x6E),
            title_size: 40.0,
            subtitle_size: 18.0,
            body_size: 18.0,
            small_size: 13.0,
            figure_size: 36.0,
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Apply opacity to a color
    pub fn with_opacity(color: Color32, opacity: f32) -> Color32 {
        let alpha = (color.a() as f32 * opacity.clamp(0.0, 1.0)) as u8;
        Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
    }

    /// Narrow windows get smaller type, like a phone-width page.
    pub fn compact(&self, width: f32) -> bool {
        width < 768.0
    }

    pub fn title_size_for(&self, width: f32) -> f32 {
        if self.compact(width) { 28.0 } else { self.title_size }
    }

    pub fn body_size_for(&self, width: f32) -> f32 {
        if self.compact(width) { 16.0 } else { self.body_size }
    }
}
