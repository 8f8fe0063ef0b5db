pub mod animator;
pub mod estimator;
pub mod navigation;
pub mod stack;
pub mod visibility;

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, trace};

use crate::content::{DeckContent, Slide, SlideWidget, StackCard};

use animator::ValueAnimator;
use estimator::Estimator;
use navigation::{NavAction, NavKey, NavigationController, ScrollRequest};
use stack::{StackGeometry, StackRevealEngine};
use visibility::{DEFAULT_THRESHOLD, TrackerState, VisibilityTracker};

/// Mount-time settings for a deck.
#[derive(Debug, Clone, Copy)]
pub struct DeckOptions {
    pub threshold: f32,
    /// False when the host has no way to observe section visibility.
    pub tracking: bool,
    pub start_slide: Option<usize>,
    pub stack: StackGeometry,
}

impl Default for DeckOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            tracking: true,
            start_slide: None,
            stack: StackGeometry::default(),
        }
    }
}

/// Everything the deck reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum DeckInput {
    Key(NavKey),
    DotClicked(usize),
    /// Range control moved.
    UsersChanged(i64),
    /// Number of sections laid out so far.
    SectionsMounted(usize),
    /// Current intersection ratio of each section with the viewport.
    Visibility(Vec<f32>),
    /// Scroll inside the feature stack's own region.
    StackScrolled(f32),
    StackViewport { height: f32, card_height: f32 },
    Frame,
}

/// What the host should do or show as a result of an input.
#[derive(Debug, Clone, PartialEq)]
pub enum DeckEffect {
    ScrollTo(ScrollRequest),
    ActiveChanged(usize),
    UsersChanged(u32),
    DisplayedValue(u64),
    CardRevealed(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dot {
    pub index: usize,
    pub label: String,
    pub active: bool,
}

/// Composition root: owns the slide sequence and every piece of live
/// state. The only writer of the active index is the visibility tracker,
/// and all mutation goes through [`SlideDeck::dispatch`].
pub struct SlideDeck {
    content: Arc<DeckContent>,
    tracker: VisibilityTracker,
    nav: NavigationController,
    estimator: Option<Estimator>,
    counter: ValueAnimator,
    stack: Option<StackRevealEngine>,
    stack_slide: Option<usize>,
    /// Whether the stack's section is on the page past the threshold.
    /// Cards only reveal while it is.
    stack_in_view: bool,
    threshold: f32,
    mounted: bool,
    pending: Vec<DeckEffect>,
}

impl SlideDeck {
    pub fn mount(content: Arc<DeckContent>, options: DeckOptions) -> Self {
        let count = content.slides.len();
        let tracker = if options.tracking {
            VisibilityTracker::new(count, options.threshold)
        } else {
            debug!("visibility tracking unavailable, pinning first section");
            VisibilityTracker::unavailable(count)
        };
        let estimator_slide = content.widget_slide(SlideWidget::RevenueEstimator);
        let nav = NavigationController::new(count, estimator_slide);
        let estimator = estimator_slide.map(|_| Estimator::default());
        let counter = ValueAnimator::new(estimator.map(|e| e.monthly()).unwrap_or(0));
        let stack_slide = content.widget_slide(SlideWidget::FeatureStack);
        let stack = stack_slide.map(|_| StackRevealEngine::new(content.features.len(), options.stack));

        let pending = options
            .start_slide
            .and_then(|i| nav.jump_to(i))
            .map(DeckEffect::ScrollTo)
            .into_iter()
            .collect();

        debug!(
            slides = count,
            estimator = estimator_slide.is_some(),
            stack = stack.is_some(),
            "deck mounted"
        );

        Self {
            content,
            tracker,
            nav,
            estimator,
            counter,
            stack,
            stack_slide,
            stack_in_view: false,
            threshold: options.threshold,
            mounted: true,
            pending,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Release the observer and any running animation. Nothing fires
    /// afterwards.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.tracker.disconnect();
        self.counter.cancel();
        self.pending.clear();
        self.mounted = false;
        debug!("deck unmounted");
    }

    pub fn content(&self) -> &DeckContent {
        &self.content
    }

    pub fn slides(&self) -> &[Slide] {
        &self.content.slides
    }

    pub fn cards(&self) -> &[StackCard] {
        &self.content.features
    }

    pub fn active(&self) -> usize {
        self.tracker.active()
    }

    pub fn tracker_state(&self) -> TrackerState {
        self.tracker.state()
    }

    pub fn estimator(&self) -> Option<&Estimator> {
        self.estimator.as_ref()
    }

    pub fn displayed_monthly(&self) -> u64 {
        self.counter.displayed()
    }

    pub fn displayed_yearly(&self) -> u64 {
        estimator::yearly(self.counter.displayed())
    }

    pub fn stack(&self) -> Option<&StackRevealEngine> {
        self.stack.as_ref()
    }

    pub fn dots(&self) -> impl Iterator<Item = Dot> + '_ {
        let active = self.active();
        self.content
            .slides
            .iter()
            .enumerate()
            .map(move |(index, slide)| Dot {
                index,
                label: format!("Go to {}", slide.title),
                active: index == active,
            })
    }

    /// Whether the host must keep producing frames.
    pub fn needs_frame(&self, now: Instant) -> bool {
        self.mounted
            && (self.counter.is_animating()
                || self.stack.as_ref().is_some_and(|s| s.is_animating(now)))
    }

    pub fn dispatch(&mut self, input: DeckInput, now: Instant) -> Vec<DeckEffect> {
        if !self.mounted {
            return Vec::new();
        }
        let mut effects = std::mem::take(&mut self.pending);
        match input {
            DeckInput::Key(key) => match self.nav.handle_key(key, self.active()) {
                Some(NavAction::Scroll(req)) => effects.push(DeckEffect::ScrollTo(req)),
                Some(NavAction::IncrementUsers) => {
                    self.adjust_users(|e| e.increment(), now, &mut effects)
                }
                Some(NavAction::DecrementUsers) => {
                    self.adjust_users(|e| e.decrement(), now, &mut effects)
                }
                None => {}
            },
            DeckInput::DotClicked(index) => {
                if let Some(req) = self.nav.go_to(index) {
                    effects.push(DeckEffect::ScrollTo(req));
                }
            }
            DeckInput::UsersChanged(users) => {
                self.adjust_users(|e| e.set_users(users), now, &mut effects)
            }
            DeckInput::SectionsMounted(count) => {
                self.tracker.sections_mounted(count);
            }
            DeckInput::Visibility(ratios) => {
                if let Some(active) = self.tracker.observe(&ratios) {
                    effects.push(DeckEffect::ActiveChanged(active));
                }
                let in_view = self
                    .stack_slide
                    .and_then(|i| ratios.get(i))
                    .is_some_and(|&ratio| ratio >= self.threshold);
                if in_view != self.stack_in_view {
                    trace!(in_view, "stack section visibility");
                    self.stack_in_view = in_view;
                    self.reveal_cards(now, &mut effects);
                }
            }
            DeckInput::StackScrolled(delta) => {
                if let Some(stack) = self.stack.as_mut() {
                    stack.scroll_by(delta);
                    self.reveal_cards(now, &mut effects);
                }
            }
            DeckInput::StackViewport {
                height,
                card_height,
            } => {
                if let Some(stack) = self.stack.as_mut() {
                    stack.set_viewport(height, card_height);
                    self.reveal_cards(now, &mut effects);
                }
            }
            DeckInput::Frame => {
                if let Some(value) = self.counter.tick(now) {
                    trace!(value, "counter frame");
                    effects.push(DeckEffect::DisplayedValue(value));
                }
            }
        }
        effects
    }

    fn reveal_cards(&mut self, now: Instant, effects: &mut Vec<DeckEffect>) {
        if !self.stack_in_view {
            return;
        }
        if let Some(stack) = self.stack.as_mut() {
            effects.extend(stack.update(now).into_iter().map(DeckEffect::CardRevealed));
        }
    }

    fn adjust_users(
        &mut self,
        apply: impl FnOnce(&mut Estimator) -> bool,
        now: Instant,
        effects: &mut Vec<DeckEffect>,
    ) {
        let Some(est) = self.estimator.as_mut() else {
            return;
        };
        if !apply(est) {
            return;
        }
        debug!(users = est.users(), monthly = est.monthly(), "estimator changed");
        effects.push(DeckEffect::UsersChanged(est.users()));
        self.counter.set_target(est.monthly(), now);
    }
}

impl Drop for SlideDeck {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn deck() -> SlideDeck {
        let content = Arc::new(DeckContent::builtin().unwrap());
        let mut deck = SlideDeck::mount(content, DeckOptions::default());
        deck.dispatch(DeckInput::SectionsMounted(7), Instant::now());
        deck
    }

    fn ratios_for(active: usize) -> Vec<f32> {
        (0..7).map(|i| if i == active { 1.0 } else { 0.0 }).collect()
    }

    /// Drive visibility until `index` is active.
    fn activate(deck: &mut SlideDeck, index: usize) {
        deck.dispatch(DeckInput::Visibility(ratios_for(index)), Instant::now());
        assert_eq!(deck.active(), index);
    }

    fn scroll_targets(effects: &[DeckEffect]) -> Vec<usize> {
        effects
            .iter()
            .filter_map(|e| match e {
                DeckEffect::ScrollTo(req) => Some(req.index),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_mount_initial_state() {
        let deck = deck();
        assert!(deck.is_mounted());
        assert_eq!(deck.active(), 0);
        assert_eq!(deck.tracker_state(), TrackerState::Observing);
        assert_eq!(deck.estimator().unwrap().users(), 100);
        assert_eq!(deck.displayed_monthly(), 3000);
        assert_eq!(deck.displayed_yearly(), 36000);
        assert!(!deck.needs_frame(Instant::now()));
    }

    #[test]
    fn test_visibility_updates_active_and_dots() {
        let mut deck = deck();
        let effects = deck.dispatch(DeckInput::Visibility(ratios_for(3)), Instant::now());
        assert_eq!(effects, vec![DeckEffect::ActiveChanged(3)]);
        let dots: Vec<Dot> = deck.dots().collect();
        assert_eq!(dots.len(), 7);
        assert!(dots[3].active);
        assert_eq!(dots.iter().filter(|d| d.active).count(), 1);
        assert_eq!(dots[3].label, "Go to Security, Compliance & Ownership");
    }

    #[test]
    fn test_navigation_does_not_write_active() {
        let mut deck = deck();
        let effects = deck.dispatch(DeckInput::DotClicked(4), Instant::now());
        assert_eq!(scroll_targets(&effects), vec![4]);
        assert_eq!(deck.active(), 0);
        let effects = deck.dispatch(DeckInput::Key(NavKey::ArrowDown), Instant::now());
        assert_eq!(scroll_targets(&effects), vec![1]);
        assert_eq!(deck.active(), 0);
    }

    #[test]
    fn test_dot_click_clamped() {
        let mut deck = deck();
        let effects = deck.dispatch(DeckInput::DotClicked(42), Instant::now());
        assert_eq!(scroll_targets(&effects), vec![6]);
    }

    #[test]
    fn test_arrow_keys_from_last_and_first() {
        let mut deck = deck();
        let effects = deck.dispatch(DeckInput::Key(NavKey::ArrowUp), Instant::now());
        assert_eq!(scroll_targets(&effects), vec![0]);
        activate(&mut deck, 6);
        let effects = deck.dispatch(DeckInput::Key(NavKey::ArrowDown), Instant::now());
        assert_eq!(scroll_targets(&effects), vec![6]);
    }

    #[test]
    fn test_horizontal_keys_ignored_off_estimator() {
        let mut deck = deck();
        activate(&mut deck, 2);
        let effects = deck.dispatch(DeckInput::Key(NavKey::ArrowRight), Instant::now());
        assert!(effects.is_empty());
        assert_eq!(deck.estimator().unwrap().users(), 100);
    }

    #[test]
    fn test_estimator_keys_step_and_animate() {
        let t0 = Instant::now();
        let mut deck = deck();
        activate(&mut deck, 5);

        let effects = deck.dispatch(DeckInput::Key(NavKey::ArrowRight), t0);
        assert_eq!(effects, vec![DeckEffect::UsersChanged(110)]);
        assert!(deck.needs_frame(t0));

        let effects = deck.dispatch(DeckInput::Frame, t0 + ms(210));
        assert_eq!(effects, vec![DeckEffect::DisplayedValue(3150)]);
        deck.dispatch(DeckInput::Frame, t0 + ms(420));
        assert_eq!(deck.displayed_monthly(), 3300);
        assert!(!deck.needs_frame(t0 + ms(420)));

        deck.dispatch(DeckInput::Key(NavKey::ArrowLeft), t0);
        deck.dispatch(DeckInput::Key(NavKey::ArrowLeft), t0);
        assert_eq!(deck.estimator().unwrap().users(), 90);
    }

    #[test]
    fn test_estimator_clamped_at_max() {
        let t0 = Instant::now();
        let mut deck = deck();
        activate(&mut deck, 5);
        deck.dispatch(DeckInput::UsersChanged(1000), t0);
        let effects = deck.dispatch(DeckInput::Key(NavKey::ArrowRight), t0);
        assert!(effects.is_empty());
        assert_eq!(deck.estimator().unwrap().users(), 1000);
    }

    #[test]
    fn test_range_change_settles_on_monthly() {
        let t0 = Instant::now();
        let mut deck = deck();
        deck.dispatch(DeckInput::UsersChanged(250), t0);
        let mut last = deck.displayed_monthly();
        let mut frame = t0;
        while deck.needs_frame(frame) {
            frame += ms(16);
            for effect in deck.dispatch(DeckInput::Frame, frame) {
                if let DeckEffect::DisplayedValue(v) = effect {
                    assert!(v >= last);
                    last = v;
                }
            }
        }
        assert_eq!(deck.displayed_monthly(), 7500);
        assert_eq!(deck.displayed_yearly(), 90000);
    }

    #[test]
    fn test_unmount_mid_animation_is_silent() {
        let t0 = Instant::now();
        let mut deck = deck();
        deck.dispatch(DeckInput::UsersChanged(500), t0);
        deck.dispatch(DeckInput::Frame, t0 + ms(100));
        let frozen = deck.displayed_monthly();

        deck.unmount();
        assert!(!deck.is_mounted());
        assert!(!deck.needs_frame(t0 + ms(200)));
        for step in 1..40 {
            let effects = deck.dispatch(DeckInput::Frame, t0 + ms(100 + step * 16));
            assert!(effects.is_empty());
        }
        assert!(
            deck.dispatch(DeckInput::Visibility(ratios_for(4)), t0)
                .is_empty()
        );
        assert_eq!(deck.displayed_monthly(), frozen);
        assert_eq!(deck.active(), 0);
        assert_eq!(deck.tracker_state(), TrackerState::Disconnected);
    }

    #[test]
    fn test_tracking_unavailable_keeps_first_slide() {
        let content = Arc::new(DeckContent::builtin().unwrap());
        let options = DeckOptions {
            tracking: false,
            ..DeckOptions::default()
        };
        let mut deck = SlideDeck::mount(content, options);
        deck.dispatch(DeckInput::SectionsMounted(7), Instant::now());
        assert!(
            deck.dispatch(DeckInput::Visibility(ratios_for(3)), Instant::now())
                .is_empty()
        );
        assert_eq!(deck.active(), 0);
        let effects = deck.dispatch(DeckInput::DotClicked(3), Instant::now());
        assert_eq!(scroll_targets(&effects), vec![3]);
    }

    #[test]
    fn test_start_slide_emitted_on_first_dispatch() {
        let content = Arc::new(DeckContent::builtin().unwrap());
        let options = DeckOptions {
            start_slide: Some(4),
            ..DeckOptions::default()
        };
        let mut deck = SlideDeck::mount(content, options);
        let effects = deck.dispatch(DeckInput::Frame, Instant::now());
        match effects.as_slice() {
            [DeckEffect::ScrollTo(req)] => {
                assert_eq!(req.index, 4);
                assert_eq!(req.behavior, navigation::ScrollBehavior::Instant);
            }
            other => panic!("unexpected effects {other:?}"),
        }
        assert!(deck.dispatch(DeckInput::Frame, Instant::now()).is_empty());
    }

    #[test]
    fn test_stack_scroll_does_not_touch_active() {
        let t0 = Instant::now();
        let mut deck = deck();
        activate(&mut deck, 2);
        let effects = deck.dispatch(
            DeckInput::StackViewport {
                height: 500.0,
                card_height: 352.0,
            },
            t0,
        );
        assert_eq!(effects, vec![DeckEffect::CardRevealed(0)]);

        let effects = deck.dispatch(DeckInput::StackScrolled(250.0), t0);
        assert_eq!(effects, vec![DeckEffect::CardRevealed(1)]);
        assert_eq!(deck.active(), 2);
        assert!(deck.stack().unwrap().is_revealed(1));
    }

    #[test]
    fn test_stack_waits_for_its_section_to_be_in_view() {
        let t0 = Instant::now();
        let mut deck = deck();
        let mut peek = vec![0.0; 7];
        peek[1] = 0.9;
        peek[2] = 0.1;
        deck.dispatch(DeckInput::Visibility(peek), t0);
        let effects = deck.dispatch(
            DeckInput::StackViewport {
                height: 500.0,
                card_height: 352.0,
            },
            t0,
        );
        assert!(effects.is_empty());
        assert!(!deck.stack().unwrap().is_revealed(0));
        assert!(!deck.needs_frame(t0));

        let t1 = t0 + ms(400);
        let effects = deck.dispatch(DeckInput::Visibility(ratios_for(2)), t1);
        assert_eq!(
            effects,
            vec![DeckEffect::ActiveChanged(2), DeckEffect::CardRevealed(0)]
        );
        assert!(deck.needs_frame(t1 + ms(100)));
    }

    #[test]
    fn test_deck_without_widgets() {
        let src = "slides:\n  - id: a\n    title: A\n  - id: b\n    title: B\n";
        let content = Arc::new(DeckContent::parse(src, std::path::Path::new(".")).unwrap());
        let mut deck = SlideDeck::mount(content, DeckOptions::default());
        deck.dispatch(DeckInput::SectionsMounted(2), Instant::now());
        assert!(deck.estimator().is_none());
        assert!(deck.stack().is_none());
        assert!(
            deck.dispatch(DeckInput::UsersChanged(500), Instant::now())
                .is_empty()
        );
        assert!(
            deck.dispatch(DeckInput::StackScrolled(100.0), Instant::now())
                .is_empty()
        );
        let effects = deck.dispatch(DeckInput::Visibility(vec![0.0, 0.9]), Instant::now());
        assert_eq!(effects, vec![DeckEffect::ActiveChanged(1)]);
    }
}
