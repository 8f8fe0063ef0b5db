use std::time::{Duration, Instant};

use tracing::{debug, trace};

use super::visibility::{Span, intersection_ratio};

pub const REVEAL_DURATION: Duration = Duration::from_millis(600);

/// Shape of the card stack inside its scroll region. Lengths are in
/// points, fractions are of the region height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StackGeometry {
    pub card_height: f32,
    pub gap: f32,
    /// Where the first card pins, as a fraction of the region height.
    pub pin_fraction: f32,
    /// Vertical offset between successive pinned cards.
    pub stack_distance: f32,
    /// Shrink applied per card stacked on top.
    pub item_scale: f32,
    pub base_scale: f32,
    /// Visible fraction at which a card is revealed.
    pub reveal_fraction: f32,
}

impl Default for StackGeometry {
    fn default() -> Self {
        Self {
            card_height: 360.0,
            gap: 48.0,
            pin_fraction: 0.2,
            stack_distance: 30.0,
            item_scale: 0.03,
            base_scale: 0.85,
            reveal_fraction: 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CardPhase {
    /// Moving with the region's scroll.
    Flowing,
    /// Held at its stack slot. `depth` counts pinned cards above it.
    Pinned { depth: usize },
}

/// Where and how to draw one card this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardFrame {
    pub index: usize,
    /// Top edge relative to the region's top.
    pub top: f32,
    pub height: f32,
    pub scale: f32,
    pub phase: CardPhase,
    pub revealed: bool,
    /// Entrance animation, 0 until revealed, eased to 1.
    pub reveal_progress: f32,
}

/// Cards in a nested scroll region that pin into a stack as they reach
/// the pin line, each revealed once the first time it is seen.
#[derive(Debug, Clone)]
pub struct StackRevealEngine {
    geometry: StackGeometry,
    viewport_height: f32,
    offset: f32,
    revealed_at: Vec<Option<Instant>>,
}

impl StackRevealEngine {
    pub fn new(card_count: usize, geometry: StackGeometry) -> Self {
        Self {
            geometry,
            viewport_height: 0.0,
            offset: 0.0,
            revealed_at: vec![None; card_count],
        }
    }

    pub fn card_count(&self) -> usize {
        self.revealed_at.len()
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn geometry(&self) -> &StackGeometry {
        &self.geometry
    }

    /// Resize the region. The offset is re-clamped to the new extent.
    pub fn set_viewport(&mut self, viewport_height: f32, card_height: f32) {
        self.viewport_height = viewport_height.max(0.0);
        self.geometry.card_height = card_height.max(1.0);
        self.offset = self.offset.clamp(0.0, self.max_offset());
    }

    pub fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    fn pin_line(&self) -> f32 {
        self.viewport_height * self.geometry.pin_fraction
    }

    fn natural_top(&self, index: usize) -> f32 {
        self.pin_line() + index as f32 * (self.geometry.card_height + self.geometry.gap)
    }

    fn pin_top(&self, index: usize) -> f32 {
        self.pin_line() + index as f32 * self.geometry.stack_distance
    }

    /// Offset at which the last card pins.
    pub fn max_offset(&self) -> f32 {
        match self.card_count().checked_sub(1) {
            Some(last) => (self.natural_top(last) - self.pin_top(last)).max(0.0),
            None => 0.0,
        }
    }

    /// Scroll inside the region. Returns the applied delta after clamping.
    pub fn scroll_by(&mut self, delta: f32) -> f32 {
        let before = self.offset;
        self.offset = (self.offset + delta).clamp(0.0, self.max_offset());
        self.offset - before
    }

    fn is_pinned(&self, index: usize) -> bool {
        self.natural_top(index) - self.offset <= self.pin_top(index)
    }

    pub fn phase(&self, index: usize) -> CardPhase {
        if !self.is_pinned(index) {
            return CardPhase::Flowing;
        }
        let depth = (index + 1..self.card_count())
            .filter(|&j| self.is_pinned(j))
            .count();
        CardPhase::Pinned { depth }
    }

    fn card_top(&self, index: usize) -> f32 {
        (self.natural_top(index) - self.offset).max(self.pin_top(index))
    }

    fn visible_fraction(&self, index: usize) -> f32 {
        let card = Span::new(self.card_top(index), self.geometry.card_height);
        intersection_ratio(card, Span::new(0.0, self.viewport_height))
    }

    pub fn is_revealed(&self, index: usize) -> bool {
        self.revealed_at.get(index).copied().flatten().is_some()
    }

    /// Mark newly visible cards as revealed. Cards stay revealed for the
    /// rest of the engine's life. Returns the indices revealed by this call.
    pub fn update(&mut self, now: Instant) -> Vec<usize> {
        if self.viewport_height <= 0.0 {
            return Vec::new();
        }
        let mut newly = Vec::new();
        for index in 0..self.card_count() {
            if self.revealed_at[index].is_some() {
                continue;
            }
            let fraction = self.visible_fraction(index);
            if fraction >= self.geometry.reveal_fraction {
                debug!(card = index, fraction, "card revealed");
                self.revealed_at[index] = Some(now);
                newly.push(index);
            }
        }
        newly
    }

    /// Whether any entrance animation is still running.
    pub fn is_animating(&self, now: Instant) -> bool {
        self.revealed_at
            .iter()
            .flatten()
            .any(|&at| now.saturating_duration_since(at) < REVEAL_DURATION)
    }

    pub fn frames(&self, now: Instant) -> Vec<CardFrame> {
        let frames: Vec<CardFrame> = (0..self.card_count())
            .map(|index| {
                let phase = self.phase(index);
                let scale = match phase {
                    CardPhase::Flowing => 1.0,
                    CardPhase::Pinned { depth } => (1.0 - depth as f32 * self.geometry.item_scale)
                        .max(self.geometry.base_scale),
                };
                let reveal_progress = match self.revealed_at[index] {
                    Some(at) => {
                        let t = now.saturating_duration_since(at).as_secs_f32()
                            / REVEAL_DURATION.as_secs_f32();
                        ease_out_cubic(t.clamp(0.0, 1.0))
                    }
                    None => 0.0,
                };
                CardFrame {
                    index,
                    top: self.card_top(index),
                    height: self.geometry.card_height,
                    scale,
                    phase,
                    revealed: self.revealed_at[index].is_some(),
                    reveal_progress,
                }
            })
            .collect();
        trace!(offset = self.offset, cards = frames.len(), "stack frames");
        frames
    }
}

pub fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(cards: usize) -> StackRevealEngine {
        let mut e = StackRevealEngine::new(cards, StackGeometry::default());
        // pin line at 100, pitch 400, stack distance 30
        e.set_viewport(500.0, 352.0);
        e
    }

    #[test]
    fn test_offset_clamped_to_extent() {
        let mut e = engine(3);
        // last card: natural 100 + 800, pin 100 + 60
        assert_eq!(e.max_offset(), 740.0);
        assert_eq!(e.scroll_by(-50.0), 0.0);
        assert_eq!(e.scroll_by(10_000.0), 740.0);
        assert_eq!(e.offset(), 740.0);
    }

    #[test]
    fn test_empty_stack() {
        let mut e = StackRevealEngine::new(0, StackGeometry::default());
        e.set_viewport(500.0, 300.0);
        assert_eq!(e.max_offset(), 0.0);
        assert_eq!(e.scroll_by(100.0), 0.0);
        assert!(e.update(Instant::now()).is_empty());
        assert!(e.frames(Instant::now()).is_empty());
    }

    #[test]
    fn test_cards_pin_in_scroll_order() {
        let mut e = engine(3);
        assert_eq!(e.phase(0), CardPhase::Pinned { depth: 0 });
        assert_eq!(e.phase(1), CardPhase::Flowing);

        // Card 1 pins once natural 500 - offset <= 130.
        e.scroll_by(369.0);
        assert_eq!(e.phase(1), CardPhase::Flowing);
        e.scroll_by(1.0);
        assert_eq!(e.phase(1), CardPhase::Pinned { depth: 0 });
        assert_eq!(e.phase(0), CardPhase::Pinned { depth: 1 });
        assert_eq!(e.phase(2), CardPhase::Flowing);

        e.scroll_by(1000.0);
        assert_eq!(e.phase(0), CardPhase::Pinned { depth: 2 });
        assert_eq!(e.phase(2), CardPhase::Pinned { depth: 0 });
    }

    #[test]
    fn test_pinned_cards_hold_their_slot_and_shrink() {
        let mut e = engine(3);
        e.scroll_by(10_000.0);
        let frames = e.frames(Instant::now());
        assert_eq!(frames[0].top, 100.0);
        assert_eq!(frames[1].top, 130.0);
        assert_eq!(frames[2].top, 160.0);
        assert!((frames[0].scale - 0.94).abs() < 1e-6);
        assert!((frames[1].scale - 0.97).abs() < 1e-6);
        assert_eq!(frames[2].scale, 1.0);
    }

    #[test]
    fn test_scale_floor() {
        let mut e = StackRevealEngine::new(10, StackGeometry::default());
        e.set_viewport(500.0, 352.0);
        e.scroll_by(100_000.0);
        let frames = e.frames(Instant::now());
        assert_eq!(frames[0].scale, 0.85);
    }

    #[test]
    fn test_reveal_follows_scroll() {
        let t0 = Instant::now();
        let mut e = engine(3);
        assert_eq!(e.update(t0), vec![0]);
        assert!(!e.is_revealed(1));

        // Card 1 top at 500 - 250 = 250, 250/352 visible.
        e.scroll_by(250.0);
        assert_eq!(e.update(t0), vec![1]);
        assert_eq!(e.update(t0), Vec::<usize>::new());
    }

    #[test]
    fn test_reveal_is_once() {
        let t0 = Instant::now();
        let mut e = engine(3);
        e.scroll_by(10_000.0);
        let first = e.update(t0);
        assert_eq!(first, vec![0, 1, 2]);

        e.scroll_by(-10_000.0);
        let later = t0 + Duration::from_secs(1);
        assert!(e.update(later).is_empty());
        assert!((0..3).all(|i| e.is_revealed(i)));
        let frames = e.frames(later);
        assert!(frames.iter().all(|f| f.revealed && f.reveal_progress == 1.0));
    }

    #[test]
    fn test_entrance_progress() {
        let t0 = Instant::now();
        let mut e = engine(2);
        e.update(t0);
        assert!(e.is_animating(t0 + Duration::from_millis(300)));
        let mid = e.frames(t0 + Duration::from_millis(300))[0].reveal_progress;
        assert!(mid > 0.5 && mid < 1.0);
        assert!(!e.is_animating(t0 + REVEAL_DURATION));
        assert_eq!(e.frames(t0)[1].reveal_progress, 0.0);
    }

    #[test]
    fn test_no_reveal_before_layout() {
        let mut e = StackRevealEngine::new(3, StackGeometry::default());
        assert!(e.update(Instant::now()).is_empty());
    }

    #[test]
    fn test_resize_reclamps_offset() {
        let mut e = engine(3);
        e.scroll_by(700.0);
        e.set_viewport(500.0, 100.0);
        // natural 100 + 2*148 = 396, pin 160
        assert_eq!(e.max_offset(), 236.0);
        assert_eq!(e.offset(), 236.0);
    }
}
