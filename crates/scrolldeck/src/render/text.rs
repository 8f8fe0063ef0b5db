use eframe::egui::{self, Color32, FontId, Pos2, Stroke};

use crate::content::{MediaKind, MediaRef};
use crate::render::media::MediaCache;
use crate::theme::Theme;

/// Layout and paint wrapped text, returning the height used.
pub fn draw_text(
    ui: &egui::Ui,
    text: &str,
    pos: Pos2,
    font_size: f32,
    color: Color32,
    max_width: f32,
) -> f32 {
    let galley = ui.painter().layout(
        text.to_string(),
        FontId::proportional(font_size),
        color,
        max_width,
    );
    let height = galley.rect.height();
    ui.painter().galley(pos, galley, color);
    height
}

/// A label followed by text on the same run, e.g. "Members: ...".
#[allow(clippy::too_many_arguments)]
pub fn draw_labeled(
    ui: &egui::Ui,
    label: &str,
    text: &str,
    pos: Pos2,
    font_size: f32,
    color: Color32,
    max_width: f32,
) -> f32 {
    let mut job = egui::text::LayoutJob::default();
    job.wrap.max_width = max_width;
    job.append(
        label,
        0.0,
        egui::text::TextFormat {
            font_id: FontId::proportional(font_size + 1.0),
            color,
            ..Default::default()
        },
    );
    job.append(
        text,
        6.0,
        egui::text::TextFormat {
            font_id: FontId::proportional(font_size),
            color,
            ..Default::default()
        },
    );
    let galley = ui.painter().layout_job(job);
    let height = galley.rect.height();
    ui.painter().galley(pos, galley, color);
    height
}

/// Bulleted list. Returns height used.
pub fn draw_bullets(
    ui: &egui::Ui,
    items: &[String],
    pos: Pos2,
    font_size: f32,
    color: Color32,
    max_width: f32,
) -> f32 {
    let mut y = pos.y;
    for item in items {
        let h = draw_text(
            ui,
            &format!("\u{2022} {item}"),
            egui::pos2(pos.x, y),
            font_size,
            color,
            max_width,
        );
        y += h + 10.0;
    }
    y - pos.y
}

/// Draw media inside `available`, fitted and centered. Videos and
/// images that fail to load get a placeholder frame.
pub fn draw_media(
    ui: &egui::Ui,
    media: MediaRef<'_>,
    theme: &Theme,
    available: egui::Rect,
    opacity: f32,
    cache: &MediaCache,
) -> egui::Rect {
    if media.kind == MediaKind::Image {
        if let Some(texture) = cache.get_or_load(ui.ctx(), media.path) {
            let draw_rect = fit_rect(texture.size_vec2(), available);
            let alpha = (opacity * 255.0) as u8;
            let tint = Color32::from_rgba_unmultiplied(255, 255, 255, alpha);
            let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
            ui.painter().image(texture.id(), draw_rect, uv, tint);
            return draw_rect;
        }
    }
    draw_media_placeholder(ui, media, theme, available, opacity)
}

/// Contain: fit within the available area, preserve aspect ratio, never
/// upscale.
pub fn fit_rect(tex_size: egui::Vec2, available: egui::Rect) -> egui::Rect {
    if tex_size.x <= 0.0 || tex_size.y <= 0.0 {
        return available;
    }
    let scale = (available.width() / tex_size.x)
        .min(available.height() / tex_size.y)
        .min(1.0);
    let size = tex_size * scale;
    egui::Rect::from_center_size(available.center(), size)
}

pub fn draw_media_placeholder(
    ui: &egui::Ui,
    media: MediaRef<'_>,
    theme: &Theme,
    available: egui::Rect,
    opacity: f32,
) -> egui::Rect {
    let height = available.height().min(available.width() * 9.0 / 16.0);
    let rect = egui::Rect::from_center_size(
        available.center(),
        egui::vec2(available.width(), height),
    );
    let bg = Theme::with_opacity(theme.panel, opacity);
    let color = Theme::with_opacity(theme.muted, opacity * 0.8);

    ui.painter().rect_filled(rect, 12.0, bg);
    ui.painter().rect_stroke(
        rect,
        12.0,
        Stroke::new(1.0, Theme::with_opacity(theme.panel_border, opacity)),
        egui::StrokeKind::Outside,
    );

    let label = match media.kind {
        MediaKind::Video => format!("\u{25B6} {}", media.alt),
        MediaKind::Image => media.alt.to_string(),
    };
    let galley = ui.painter().layout(
        label,
        FontId::proportional(theme.small_size + 1.0),
        color,
        rect.width() - 24.0,
    );
    let text_pos = egui::pos2(
        rect.center().x - galley.rect.width() / 2.0,
        rect.center().y - galley.rect.height() / 2.0,
    );
    ui.painter().galley(text_pos, galley, color);
    rect
}
