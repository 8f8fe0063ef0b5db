use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use eframe::egui;
use tracing::{debug, info, trace};

use crate::config::{Config, Tracking};
use crate::content::DeckContent;
use crate::deck::navigation::{NavKey, ScrollBehavior, ScrollRequest};
use crate::deck::visibility::{Span, intersection_ratio};
use crate::deck::{DeckEffect, DeckInput, DeckOptions, SlideDeck};
use crate::render::{self, media::MediaCache};
use crate::theme::Theme;

/// Quiet period after the last wheel event before the page settles on
/// the nearest section.
const SNAP_DELAY: Duration = Duration::from_millis(150);
/// Fraction of the remaining distance covered each frame.
const SCROLL_LERP: f32 = 0.15;
const SETTLE_DISTANCE: f32 = 0.5;

const ARROW_KEYS: [(egui::Key, NavKey); 4] = [
    (egui::Key::ArrowUp, NavKey::ArrowUp),
    (egui::Key::ArrowDown, NavKey::ArrowDown),
    (egui::Key::ArrowLeft, NavKey::ArrowLeft),
    (egui::Key::ArrowRight, NavKey::ArrowRight),
];

/// Vertical page position. Every section is one viewport tall, so
/// section `i` starts at `i * viewport_height`.
#[derive(Debug, Clone, Default)]
struct PageScroll {
    offset: f32,
    target: f32,
    last_wheel: Option<Instant>,
}

impl PageScroll {
    fn max_offset(count: usize, viewport_height: f32) -> f32 {
        (count.saturating_sub(1) as f32 * viewport_height).max(0.0)
    }

    /// Positive `delta` moves the page up, towards earlier sections.
    fn wheel(&mut self, delta: f32, now: Instant, viewport_height: f32, count: usize) {
        let max = Self::max_offset(count, viewport_height);
        self.target = (self.target - delta).clamp(0.0, max);
        self.last_wheel = Some(now);
    }

    /// The latest request replaces whatever the page was heading to.
    fn scroll_to(&mut self, request: ScrollRequest, viewport_height: f32) {
        self.target = request.index as f32 * viewport_height;
        self.last_wheel = None;
        if request.behavior == ScrollBehavior::Instant {
            self.offset = self.target;
        }
    }

    /// Advance one frame. Returns whether another frame is needed.
    fn step(&mut self, now: Instant, viewport_height: f32, count: usize) -> bool {
        if let Some(last) = self.last_wheel {
            if now.duration_since(last) < SNAP_DELAY {
                self.approach();
                return true;
            }
            if viewport_height > 0.0 {
                let nearest = (self.target / viewport_height).round();
                let max = Self::max_offset(count, viewport_height);
                self.target = (nearest * viewport_height).clamp(0.0, max);
            }
            self.last_wheel = None;
        }
        self.approach()
    }

    fn approach(&mut self) -> bool {
        let diff = self.target - self.offset;
        if diff.abs() < SETTLE_DISTANCE {
            self.offset = self.target;
            false
        } else {
            self.offset += diff * SCROLL_LERP;
            true
        }
    }

    /// Keep the same section in view when the window height changes.
    fn resize(&mut self, old_height: f32, new_height: f32) {
        if old_height <= 0.0 {
            return;
        }
        let factor = new_height / old_height;
        self.offset *= factor;
        self.target *= factor;
    }

    fn ratios(&self, count: usize, viewport_height: f32) -> Vec<f32> {
        let viewport = Span::new(self.offset, viewport_height);
        (0..count)
            .map(|i| intersection_ratio(Span::new(i as f32 * viewport_height, viewport_height), viewport))
            .collect()
    }
}

struct ScrollDeckApp {
    deck: SlideDeck,
    theme: Theme,
    media: MediaCache,
    scroll: PageScroll,
    viewport_height: f32,
    mounted_sections: usize,
    /// Feature stack area from the previous frame, for wheel routing.
    stack_region: Option<egui::Rect>,
}

impl ScrollDeckApp {
    fn new(deck: SlideDeck, theme: Theme, media: MediaCache) -> Self {
        Self {
            deck,
            theme,
            media,
            scroll: PageScroll::default(),
            viewport_height: 0.0,
            mounted_sections: 0,
            stack_region: None,
        }
    }

    fn section_count(&self) -> usize {
        self.deck.slides().len()
    }

    fn dispatch(&mut self, input: DeckInput, now: Instant) {
        for effect in self.deck.dispatch(input, now) {
            match effect {
                DeckEffect::ScrollTo(request) => {
                    trace!(index = request.index, behavior = ?request.behavior, "scroll request");
                    self.scroll.scroll_to(request, self.viewport_height);
                }
                DeckEffect::CardRevealed(index) => trace!(index, "card revealed"),
                DeckEffect::ActiveChanged(_)
                | DeckEffect::UsersChanged(_)
                | DeckEffect::DisplayedValue(_) => {}
            }
        }
    }

    /// Wheel over the feature stack scrolls the stack, until it runs out
    /// in that direction and the page takes over.
    fn stack_takes_wheel(&self, pointer: Option<egui::Pos2>, delta: f32) -> bool {
        let (Some(region), Some(pos)) = (self.stack_region, pointer) else {
            return false;
        };
        if !region.contains(pos) {
            return false;
        }
        self.deck.stack().is_some_and(|stack| {
            if delta > 0.0 {
                stack.offset() < stack.max_offset()
            } else {
                stack.offset() > 0.0
            }
        })
    }
}

impl eframe::App for ScrollDeckApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        // Collect viewport commands to send AFTER the input closure
        // (sending inside ctx.input() causes RwLock deadlock)
        let mut viewport_cmds: Vec<egui::ViewportCommand> = Vec::new();
        let mut keys = Vec::new();
        let (wheel, pointer) = ctx.input(|i| {
            if i.key_pressed(egui::Key::Q) {
                viewport_cmds.push(egui::ViewportCommand::Close);
            }
            if i.key_pressed(egui::Key::F) {
                viewport_cmds.push(egui::ViewportCommand::Fullscreen(
                    !i.viewport().fullscreen.unwrap_or(false),
                ));
            }
            for (key, nav) in ARROW_KEYS {
                if i.key_pressed(key) {
                    keys.push(nav);
                }
            }
            (i.smooth_scroll_delta.y, i.pointer.hover_pos())
        });

        for cmd in viewport_cmds {
            ctx.send_viewport_cmd(cmd);
        }

        let bg = self.theme.background;
        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(bg).inner_margin(0.0))
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                let vh = rect.height();
                if (vh - self.viewport_height).abs() > 0.5 {
                    self.scroll.resize(self.viewport_height, vh);
                    self.viewport_height = vh;
                }
                let count = self.section_count();

                for key in keys {
                    self.dispatch(DeckInput::Key(key), now);
                }
                if wheel != 0.0 {
                    // Wheel up is positive; the stack advances on wheel down.
                    if self.stack_takes_wheel(pointer, -wheel) {
                        self.dispatch(DeckInput::StackScrolled(-wheel), now);
                    } else {
                        self.scroll.wheel(wheel, now, vh, count);
                    }
                }
                let scrolling = self.scroll.step(now, vh, count);

                if self.mounted_sections != count {
                    self.mounted_sections = count;
                    self.dispatch(DeckInput::SectionsMounted(count), now);
                }
                let ratios = self.scroll.ratios(count, vh);
                self.dispatch(DeckInput::Visibility(ratios), now);
                self.dispatch(DeckInput::Frame, now);

                let mut inputs = Vec::new();
                let mut stack_region = None;
                for index in 0..count {
                    let section = egui::Rect::from_min_size(
                        egui::pos2(rect.left(), rect.top() + index as f32 * vh - self.scroll.offset),
                        rect.size(),
                    );
                    if !section.intersects(rect) {
                        continue;
                    }
                    let output = render::render_section(
                        ui,
                        &self.deck,
                        index,
                        section,
                        &self.theme,
                        &self.media,
                        rect.width(),
                        now,
                    );
                    inputs.extend(output.inputs);
                    stack_region = stack_region.or(output.stack_region);
                }
                self.stack_region = stack_region.map(|r| r.intersect(rect));

                inputs.extend(render::dots::render(ui, self.deck.dots(), &self.theme, rect));
                for input in inputs {
                    self.dispatch(input, now);
                }

                if scrolling || self.deck.needs_frame(now) {
                    ctx.request_repaint();
                }
            });
    }
}

/// `--slide N` beats the configured start slide. Both are 1-indexed and
/// clamped to the deck; the result is a 0-based index.
fn start_index(cli: Option<usize>, config: Option<usize>, slide_count: usize) -> Option<usize> {
    cli.or(config)
        .map(|s| s.saturating_sub(1).min(slide_count.saturating_sub(1)))
}

fn load_app_icon(path: &Path) -> Option<egui::IconData> {
    let image = image::open(path).ok()?.into_rgba8();
    let (w, h) = image.dimensions();
    Some(egui::IconData {
        rgba: image.into_raw(),
        width: w,
        height: h,
    })
}

pub fn run(file: Option<PathBuf>, windowed: bool, start_slide: Option<usize>) -> anyhow::Result<()> {
    let content = match &file {
        Some(path) => DeckContent::load(path)?,
        None => DeckContent::builtin()?,
    };

    let title = content.title.clone().unwrap_or_else(|| match &file {
        Some(path) => format!(
            "scrolldeck - {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        ),
        None => "scrolldeck".to_string(),
    });

    let config = Config::load_or_default();
    let slide_count = content.slides.len();
    let start_slide = start_index(start_slide, config.start_slide(), slide_count);
    let options = DeckOptions {
        threshold: config.threshold(),
        tracking: config.tracking() == Tracking::Auto,
        start_slide,
        ..Default::default()
    };
    let theme = Theme::from_name(config.theme());
    info!(
        slides = slide_count,
        theme = %theme.name,
        threshold = options.threshold,
        "starting presentation"
    );

    let media = MediaCache::new(content.base_path.clone());
    let icon = content
        .logo
        .as_deref()
        .and_then(|logo| load_app_icon(&content.resolve_media(logo)));

    let viewport = if windowed {
        egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_title(&title)
    } else {
        egui::ViewportBuilder::default()
            .with_fullscreen(true)
            .with_title(&title)
    };

    let viewport = if let Some(icon) = icon {
        viewport.with_icon(Arc::new(icon))
    } else {
        viewport
    };

    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    let content = Arc::new(content);
    eframe::run_native(
        &title,
        native_options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(if theme.name == "light" {
                egui::Visuals::light()
            } else {
                egui::Visuals::dark()
            });
            let deck = SlideDeck::mount(content, options);
            debug!(tracker = ?deck.tracker_state(), "deck ready");
            Ok(Box::new(ScrollDeckApp::new(deck, theme, media)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
