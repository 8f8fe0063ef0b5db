use std::time::Instant;

use eframe::egui::{self, Stroke};

use crate::content::StackCard;
use crate::deck::stack::{CardFrame, StackRevealEngine};
use crate::deck::{DeckInput, SlideDeck};
use crate::render::media::MediaCache;
use crate::render::text;
use crate::theme::Theme;

/// Height of a card relative to its region.
const CARD_FRACTION: f32 = 0.78;
/// How far a card rises during its entrance.
const ENTRANCE_LIFT: f32 = 28.0;

/// Draw the feature stack inside `region`. Returns the region geometry
/// update for the engine when the layout changed.
pub fn render(
    ui: &mut egui::Ui,
    deck: &SlideDeck,
    theme: &Theme,
    region: egui::Rect,
    viewport_width: f32,
    media: &MediaCache,
    now: Instant,
) -> Option<DeckInput> {
    let engine = deck.stack()?;
    let card_height = (region.height() * CARD_FRACTION).max(1.0);

    let resize = ((engine.viewport_height() - region.height()).abs() > 0.5
        || (engine.geometry().card_height - card_height).abs() > 0.5)
        .then_some(DeckInput::StackViewport {
            height: region.height(),
            card_height,
        });

    let mut clipped = ui.new_child(
        egui::UiBuilder::new()
            .max_rect(region)
            .id_salt("feature_stack"),
    );
    clipped.set_clip_rect(region.intersect(ui.clip_rect()));

    let compact = theme.compact(viewport_width);
    for frame in engine.frames(now) {
        if let Some(card) = deck.cards().get(frame.index) {
            draw_card(&clipped, card, &frame, theme, region, media, compact);
        }
    }
    draw_scrollbar(ui, engine, theme, region);
    resize
}

fn card_rect(frame: &CardFrame, region: egui::Rect) -> egui::Rect {
    let lift = (1.0 - frame.reveal_progress) * ENTRANCE_LIFT;
    let width = region.width() * frame.scale;
    let height = frame.height * frame.scale;
    let top = region.top() + frame.top + lift;
    egui::Rect::from_min_size(
        egui::pos2(region.center().x - width / 2.0, top),
        egui::vec2(width, height),
    )
}

fn draw_card(
    ui: &egui::Ui,
    card: &StackCard,
    frame: &CardFrame,
    theme: &Theme,
    region: egui::Rect,
    media: &MediaCache,
    compact: bool,
) {
    if !frame.revealed {
        return;
    }
    let opacity = frame.reveal_progress;
    let rect = card_rect(frame, region);
    if !rect.intersects(region) {
        return;
    }

    let painter = ui.painter();
    painter.rect_filled(rect, 16.0, Theme::with_opacity(theme.card, opacity));
    painter.rect_stroke(
        rect,
        16.0,
        Stroke::new(1.0, Theme::with_opacity(theme.panel_border, opacity)),
        egui::StrokeKind::Inside,
    );

    let padding = 24.0 * frame.scale;
    let inner = rect.shrink(padding);
    let (text_rect, media_rect) = if compact {
        (inner, None)
    } else {
        let gap = 32.0 * frame.scale;
        let half = (inner.width() - gap) / 2.0;
        let left = egui::Rect::from_min_size(inner.min, egui::vec2(half, inner.height()));
        let right = egui::Rect::from_min_size(
            egui::pos2(inner.left() + half + gap, inner.top()),
            egui::vec2(half, inner.height()),
        );
        (left, Some(right))
    };

    let fg = Theme::with_opacity(theme.heading_color, opacity);
    let body = Theme::with_opacity(theme.foreground, opacity);
    let secondary = Theme::with_opacity(theme.secondary, opacity);
    let title_size = 24.0 * frame.scale;
    let body_size = 16.0 * frame.scale;

    let mut y = text_rect.top();
    let x = text_rect.left();
    let w = text_rect.width();
    y += text::draw_text(ui, &card.title, egui::pos2(x, y), title_size, fg, w) + 12.0;
    y += text::draw_labeled(ui, "Members:", &card.member, egui::pos2(x, y), body_size, body, w)
        + 8.0;
    text::draw_labeled(
        ui,
        "Association:",
        &card.association,
        egui::pos2(x, y),
        body_size,
        secondary,
        w,
    );

    if let (Some(area), Some(media_ref)) = (media_rect, card.media()) {
        text::draw_media(ui, media_ref, theme, area, opacity, media);
    }
}

fn draw_scrollbar(ui: &egui::Ui, engine: &StackRevealEngine, theme: &Theme, region: egui::Rect) {
    let max = engine.max_offset();
    if max <= 0.0 {
        return;
    }
    let track_h = region.height();
    let content_h = track_h + max;
    let thumb_h = (track_h * track_h / content_h).max(24.0);
    let thumb_top = region.top() + (track_h - thumb_h) * (engine.offset() / max);
    let thumb = egui::Rect::from_min_size(
        egui::pos2(region.right() - 6.0, thumb_top),
        egui::vec2(4.0, thumb_h),
    );
    ui.painter().rect_filled(thumb, 999.0, theme.accent);
}
