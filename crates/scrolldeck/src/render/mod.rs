pub mod dots;
pub mod estimator;
pub mod media;
pub mod stack;
pub mod text;

use std::time::Instant;

use eframe::egui::{self, FontId, Stroke};

use crate::content::{SlideWidget, Tier};
use crate::deck::{DeckInput, SlideDeck};
use crate::theme::Theme;

use media::MediaCache;

const MAX_CONTENT_WIDTH: f32 = 1100.0;
const SIDE_PADDING: f32 = 32.0;
const TWO_COLUMN_MIN_WIDTH: f32 = 1024.0;
const MEDIA_COLUMN_WIDTH: f32 = 520.0;
const COLUMN_GAP: f32 = 48.0;
const LOGO_HEIGHT: f32 = 56.0;

/// What a section produced this frame.
#[derive(Debug, Default)]
pub struct SectionOutput {
    pub inputs: Vec<DeckInput>,
    /// Screen area of the feature stack, when this section hosts it.
    pub stack_region: Option<egui::Rect>,
}

/// Render one full-height section at `rect`.
#[allow(clippy::too_many_arguments)]
pub fn render_section(
    ui: &mut egui::Ui,
    deck: &SlideDeck,
    index: usize,
    rect: egui::Rect,
    theme: &Theme,
    media: &MediaCache,
    viewport_width: f32,
    now: Instant,
) -> SectionOutput {
    let mut output = SectionOutput::default();
    let Some(slide) = deck.slides().get(index) else {
        return output;
    };

    let content = content_rect(rect);
    let has_media = slide.media().is_some() && slide.widget != Some(SlideWidget::FeatureStack);
    let (text_col, media_col) = columns(content, has_media);

    let mut y = content.top();
    let x = text_col.left();
    let w = text_col.width();

    if index == 0 {
        y += draw_logo(ui, deck, media, egui::pos2(x, y));
    }

    let title_size = theme.title_size_for(viewport_width);
    let body_size = theme.body_size_for(viewport_width);
    y += text::draw_text(ui, &slide.title, egui::pos2(x, y), title_size, theme.heading_color, w);
    if let Some(subtitle) = &slide.subtitle {
        y += 12.0;
        y += text::draw_text(
            ui,
            subtitle,
            egui::pos2(x, y),
            theme.subtitle_size,
            theme.muted,
            w,
        );
    }
    if !slide.bullets.is_empty() {
        y += 24.0;
        y += text::draw_bullets(ui, &slide.bullets, egui::pos2(x, y), body_size, theme.foreground, w);
    }
    if !slide.tiers.is_empty() {
        y += 24.0;
        y += draw_tiers(ui, &slide.tiers, theme, egui::pos2(x, y), w, viewport_width);
    }

    match slide.widget {
        Some(SlideWidget::RevenueEstimator) => {
            y += 32.0;
            let (h, input) =
                estimator::render(ui, deck, theme, egui::pos2(x, y), w, viewport_width);
            y += h;
            output.inputs.extend(input);
        }
        Some(SlideWidget::FeatureStack) => {
            y += 32.0;
            let region = egui::Rect::from_min_max(
                egui::pos2(content.left(), y),
                egui::pos2(content.right(), rect.bottom() - 48.0),
            );
            if region.height() > 0.0 {
                output
                    .inputs
                    .extend(stack::render(ui, deck, theme, region, viewport_width, media, now));
                output.stack_region = Some(region);
            }
        }
        None => {}
    }

    if let (Some(area), Some(media_ref)) = (media_col, slide.media()) {
        text::draw_media(ui, media_ref, theme, area, 1.0, media);
    } else if let Some(media_ref) = slide.media().filter(|_| has_media) {
        // Single column: media goes under the text.
        let area = egui::Rect::from_min_max(
            egui::pos2(x, y + 32.0),
            egui::pos2(x + w, rect.bottom() - 32.0),
        );
        if area.height() > 80.0 {
            text::draw_media(ui, media_ref, theme, area, 1.0, media);
        }
    }

    output
}

/// Centered content column inside a section.
fn content_rect(section: egui::Rect) -> egui::Rect {
    let width = (section.width() - SIDE_PADDING * 2.0).min(MAX_CONTENT_WIDTH).max(0.0);
    let top = section.top() + section.height() * 0.12;
    let bottom = section.bottom() - section.height() * 0.08;
    egui::Rect::from_min_max(
        egui::pos2(section.center().x - width / 2.0, top),
        egui::pos2(section.center().x + width / 2.0, bottom.max(top)),
    )
}

/// Text column and, on wide windows with media, the media column.
fn columns(content: egui::Rect, has_media: bool) -> (egui::Rect, Option<egui::Rect>) {
    if !has_media || content.width() < TWO_COLUMN_MIN_WIDTH {
        return (content, None);
    }
    let text_width = content.width() - MEDIA_COLUMN_WIDTH - COLUMN_GAP;
    let text = egui::Rect::from_min_size(content.min, egui::vec2(text_width, content.height()));
    let media = egui::Rect::from_min_max(
        egui::pos2(content.right() - MEDIA_COLUMN_WIDTH, content.top()),
        content.max,
    );
    (text, Some(media))
}

fn draw_logo(ui: &egui::Ui, deck: &SlideDeck, media: &MediaCache, pos: egui::Pos2) -> f32 {
    let Some(logo) = deck.content().logo.as_deref() else {
        return 0.0;
    };
    let Some(texture) = media.get_or_load(ui.ctx(), logo) else {
        return 0.0;
    };
    let size = texture.size_vec2();
    if size.y <= 0.0 {
        return 0.0;
    }
    let width = size.x * LOGO_HEIGHT / size.y;
    let rect = egui::Rect::from_min_size(pos, egui::vec2(width, LOGO_HEIGHT));
    let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
    ui.painter()
        .image(texture.id(), rect, uv, egui::Color32::WHITE);
    LOGO_HEIGHT + 24.0
}

/// Tier panels in a row, or stacked on narrow windows. Returns height used.
fn draw_tiers(
    ui: &egui::Ui,
    tiers: &[Tier],
    theme: &Theme,
    pos: egui::Pos2,
    width: f32,
    viewport_width: f32,
) -> f32 {
    let gap = 16.0;
    let padding = 18.0;
    let compact = theme.compact(viewport_width);
    let per_row = if compact { 1 } else { tiers.len().max(1) };
    let panel_width = (width - gap * (per_row as f32 - 1.0)) / per_row as f32;
    let inner = (panel_width - padding * 2.0).max(1.0);
    let painter = ui.painter();

    let galleys: Vec<_> = tiers
        .iter()
        .map(|tier| {
            let name = painter.layout(
                tier.name.clone(),
                FontId::proportional(theme.body_size),
                theme.heading_color,
                inner,
            );
            let description = painter.layout(
                tier.description.clone(),
                FontId::proportional(theme.small_size + 1.0),
                theme.muted,
                inner,
            );
            (name, description)
        })
        .collect();

    let mut y = pos.y;
    for row in galleys.chunks(per_row) {
        let row_height = row
            .iter()
            .map(|(n, d)| n.rect.height() + 8.0 + d.rect.height())
            .fold(0.0_f32, f32::max)
            + padding * 2.0;
        for (col, (name, description)) in row.iter().enumerate() {
            let x = pos.x + col as f32 * (panel_width + gap);
            let rect = egui::Rect::from_min_size(egui::pos2(x, y), egui::vec2(panel_width, row_height));
            painter.rect_filled(rect, 12.0, theme.panel);
            painter.rect_stroke(
                rect,
                12.0,
                Stroke::new(1.0, theme.panel_border),
                egui::StrokeKind::Inside,
            );
            let name_h = name.rect.height();
            painter.galley(egui::pos2(x + padding, y + padding), name.clone(), theme.heading_color);
            painter.galley(
                egui::pos2(x + padding, y + padding + name_h + 8.0),
                description.clone(),
                theme.muted,
            );
        }
        y += row_height + gap;
    }
    y - gap - pos.y
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(width: f32, height: f32) -> egui::Rect {
        egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(width, height))
    }

    #[test]
    fn test_content_width_capped_and_centered() {
        let r = content_rect(section(1920.0, 1080.0));
        assert_eq!(r.width(), MAX_CONTENT_WIDTH);
        assert_eq!(r.center().x, 960.0);

        let narrow = content_rect(section(600.0, 800.0));
        assert_eq!(narrow.width(), 600.0 - SIDE_PADDING * 2.0);
    }

    #[test]
    fn test_two_columns_only_when_wide_with_media() {
        let wide = content_rect(section(1920.0, 1080.0));
        let (text, media) = columns(wide, true);
        let media = media.unwrap();
        assert_eq!(media.width(), MEDIA_COLUMN_WIDTH);
        assert_eq!(media.left() - text.right(), COLUMN_GAP);

        assert!(columns(wide, false).1.is_none());
        let narrow = content_rect(section(900.0, 800.0));
        assert!(columns(narrow, true).1.is_none());
    }
}
