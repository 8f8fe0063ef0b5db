use eframe::egui;

use crate::deck::{DeckInput, Dot};
use crate::theme::Theme;

const DOT_SIZE: f32 = 12.0;
const DOT_GAP: f32 = 12.0;
const ACTIVE_WIDTH: f32 = 72.0;
const ACTIVE_WIDTH_COMPACT: f32 = 48.0;
const RIGHT_MARGIN: f32 = 24.0;
/// Seconds for a dot to grow or shrink.
const WIDTH_ANIMATION: f32 = 0.24;

/// Vertical dot column on the right edge, one dot per section. Returns
/// the click, if any.
pub fn render(
    ui: &egui::Ui,
    dots: impl Iterator<Item = Dot>,
    theme: &Theme,
    viewport: egui::Rect,
) -> Option<DeckInput> {
    let dots: Vec<Dot> = dots.collect();
    if dots.is_empty() {
        return None;
    }
    let active_width = if theme.compact(viewport.width()) {
        ACTIVE_WIDTH_COMPACT
    } else {
        ACTIVE_WIDTH
    };

    let column_height = column_height(dots.len());
    let right = viewport.right() - RIGHT_MARGIN;
    let mut y = viewport.center().y - column_height / 2.0;
    let mut clicked = None;

    for dot in &dots {
        let target = if dot.active { active_width } else { DOT_SIZE };
        let width = ui.ctx().animate_value_with_time(
            egui::Id::new(("deck_dot", dot.index)),
            target,
            WIDTH_ANIMATION,
        );
        let rect = egui::Rect::from_min_size(
            egui::pos2(right - width, y),
            egui::vec2(width, DOT_SIZE),
        );
        let color = if dot.active {
            theme.accent
        } else {
            theme.dot_inactive
        };
        ui.painter().rect_filled(rect, DOT_SIZE / 2.0, color);

        // Hit area spans the full active width.
        let hit = egui::Rect::from_min_max(
            egui::pos2(right - active_width, y - DOT_GAP / 2.0),
            egui::pos2(right, y + DOT_SIZE + DOT_GAP / 2.0),
        );
        let response = ui
            .interact(hit, egui::Id::new(("deck_dot_hit", dot.index)), egui::Sense::click())
            .on_hover_cursor(egui::CursorIcon::PointingHand)
            .on_hover_text(dot.label.as_str());
        if response.clicked() {
            clicked = Some(DeckInput::DotClicked(dot.index));
        }

        y += DOT_SIZE + DOT_GAP;
    }
    clicked
}

fn column_height(count: usize) -> f32 {
    if count == 0 {
        return 0.0;
    }
    count as f32 * DOT_SIZE + (count - 1) as f32 * DOT_GAP
}
