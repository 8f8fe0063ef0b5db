use eframe::egui::{self, FontId, Stroke};

use crate::deck::estimator::{MAX_USERS, MIN_USERS, USERS_STEP, format_thousands};
use crate::deck::{DeckInput, SlideDeck};
use crate::render::text;
use crate::theme::Theme;

const NOTE: &str = "Example: present this gross number to members as an association \
                    benefit. Operator fees are negotiated privately.";

/// Member slider and the animated revenue panel. Returns the height used
/// and, when the slider moved, the new member count.
pub fn render(
    ui: &mut egui::Ui,
    deck: &SlideDeck,
    theme: &Theme,
    pos: egui::Pos2,
    max_width: f32,
    viewport_width: f32,
) -> (f32, Option<DeckInput>) {
    let Some(estimator) = deck.estimator() else {
        return (0.0, None);
    };
    let compact = theme.compact(viewport_width);
    let mut input = None;

    // Slider column
    let mut y = pos.y;
    y += text::draw_text(
        ui,
        "Active member companies",
        egui::pos2(pos.x, y),
        14.0,
        theme.foreground,
        max_width,
    ) + 8.0;

    let slider_width = if compact { max_width } else { 240.0_f32.min(max_width) };
    let slider_rect = egui::Rect::from_min_size(egui::pos2(pos.x, y), egui::vec2(slider_width, 24.0));
    let mut users = estimator.users();
    let response = ui.put(
        slider_rect,
        egui::Slider::new(&mut users, MIN_USERS..=MAX_USERS)
            .step_by(USERS_STEP as f64)
            .show_value(false),
    );
    if response.changed() {
        input = Some(DeckInput::UsersChanged(users as i64));
    }
    // Arrow keys belong to the deck, not the focused slider.
    if response.has_focus() {
        response.surrender_focus();
    }
    y += 24.0 + 8.0;

    let members = format!("{} members", format_thousands(estimator.users() as u64));
    y += text::draw_text(
        ui,
        &members,
        egui::pos2(pos.x, y),
        20.0,
        theme.heading_color,
        max_width,
    );
    let column_bottom = y;

    // Revenue panel, beside the slider or below it on narrow windows
    let (panel_pos, panel_width) = if compact {
        (egui::pos2(pos.x, column_bottom + 20.0), max_width)
    } else {
        let x = pos.x + slider_width + 20.0;
        (egui::pos2(x, pos.y), (max_width - slider_width - 20.0).max(260.0))
    };
    let panel_height = draw_revenue_panel(ui, deck, theme, panel_pos, panel_width);
    let bottom = (panel_pos.y + panel_height).max(column_bottom);
    (bottom - pos.y, input)
}

fn draw_revenue_panel(
    ui: &egui::Ui,
    deck: &SlideDeck,
    theme: &Theme,
    pos: egui::Pos2,
    width: f32,
) -> f32 {
    let padding = 20.0;
    let inner_width = width - padding * 2.0;
    let monthly = format!("${}", format_thousands(deck.displayed_monthly()));
    let yearly = format!(
        "/month \u{2022} ${}/year",
        format_thousands(deck.displayed_yearly())
    );

    // Measure first so the panel background sits under the text.
    let painter = ui.painter();
    let caption = painter.layout(
        "Projected association revenue".to_string(),
        FontId::proportional(theme.small_size),
        theme.foreground,
        inner_width,
    );
    let figure = painter.layout_no_wrap(
        monthly,
        FontId::proportional(theme.figure_size),
        theme.highlight,
    );
    let period = painter.layout(
        yearly,
        FontId::proportional(theme.body_size - 2.0),
        theme.foreground,
        inner_width,
    );
    let note = painter.layout(
        NOTE.to_string(),
        FontId::proportional(theme.small_size),
        theme.muted,
        inner_width,
    );
    let height = padding * 2.0
        + caption.rect.height()
        + 8.0
        + figure.rect.height()
        + 6.0
        + period.rect.height()
        + 12.0
        + note.rect.height();

    let rect = egui::Rect::from_min_size(pos, egui::vec2(width, height));
    painter.rect_filled(rect, 12.0, theme.panel);
    painter.rect_stroke(
        rect,
        12.0,
        Stroke::new(1.0, theme.panel_border),
        egui::StrokeKind::Inside,
    );

    let x = pos.x + padding;
    let mut y = pos.y + padding;
    let h = caption.rect.height();
    painter.galley(egui::pos2(x, y), caption, theme.foreground);
    y += h + 8.0;
    let h = figure.rect.height();
    painter.galley(egui::pos2(x, y), figure, theme.highlight);
    y += h + 6.0;
    let h = period.rect.height();
    painter.galley(egui::pos2(x, y), period, theme.foreground);
    y += h + 12.0;
    painter.galley(egui::pos2(x, y), note, theme.muted);

    height
}
