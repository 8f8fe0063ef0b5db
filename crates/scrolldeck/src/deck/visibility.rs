use tracing::{debug, trace};

/// Fraction of a section that must be on screen for it to count as active.
pub const DEFAULT_THRESHOLD: f32 = 0.45;

/// A vertical extent in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub top: f32,
    pub bottom: f32,
}

impl Span {
    pub fn new(top: f32, height: f32) -> Self {
        Self {
            top,
            bottom: top + height,
        }
    }

    pub fn height(&self) -> f32 {
        (self.bottom - self.top).max(0.0)
    }
}

/// Visible height of `section` inside `viewport`, over the section's own
/// height.
pub fn intersection_ratio(section: Span, viewport: Span) -> f32 {
    let height = section.height();
    if height <= 0.0 {
        return 0.0;
    }
    let visible = (section.bottom.min(viewport.bottom) - section.top.max(viewport.top)).max(0.0);
    (visible / height).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub index: usize,
    pub ratio: f32,
    pub is_intersecting: bool,
}

/// Reports sections whose threshold status flipped since the last poll.
/// The first poll after construction reports every section.
#[derive(Debug, Clone)]
pub struct ThresholdObserver {
    threshold: f32,
    last: Vec<Option<bool>>,
}

impl ThresholdObserver {
    pub fn new(threshold: f32, sections: usize) -> Self {
        Self {
            threshold,
            last: vec![None; sections],
        }
    }

    /// `ratios[i]` is the current intersection ratio of section `i`.
    /// Entries come back in section order.
    pub fn poll(&mut self, ratios: &[f32]) -> Vec<IntersectionEntry> {
        let mut entries = Vec::new();
        for (index, (&ratio, last)) in ratios.iter().zip(self.last.iter_mut()).enumerate() {
            let is_intersecting = ratio >= self.threshold;
            if *last != Some(is_intersecting) {
                *last = Some(is_intersecting);
                entries.push(IntersectionEntry {
                    index,
                    ratio,
                    is_intersecting,
                });
            }
        }
        entries
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    /// Waiting for every section to be laid out.
    Pending,
    Observing,
    Disconnected,
    /// No observation capability; the active index stays at 0.
    Unavailable,
}

/// Decides which section is active from observer batches.
#[derive(Debug, Clone)]
pub struct VisibilityTracker {
    threshold: f32,
    sections: usize,
    state: TrackerState,
    observer: Option<ThresholdObserver>,
    active: usize,
}

impl VisibilityTracker {
    pub fn new(sections: usize, threshold: f32) -> Self {
        Self {
            threshold,
            sections,
            state: TrackerState::Pending,
            observer: None,
            active: 0,
        }
    }

    /// Tracking disabled; navigation still works.
    pub fn unavailable(sections: usize) -> Self {
        Self {
            state: TrackerState::Unavailable,
            ..Self::new(sections, DEFAULT_THRESHOLD)
        }
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Called as sections get laid out. Observation begins once all of
    /// them are present. Returns true when this call started it.
    pub fn sections_mounted(&mut self, mounted: usize) -> bool {
        if self.state != TrackerState::Pending || mounted < self.sections {
            return false;
        }
        debug!(sections = self.sections, threshold = self.threshold, "visibility tracking started");
        self.observer = Some(ThresholdObserver::new(self.threshold, self.sections));
        self.state = TrackerState::Observing;
        true
    }

    /// Feed the current per-section ratios. Returns the new active index
    /// if it changed.
    pub fn observe(&mut self, ratios: &[f32]) -> Option<usize> {
        if self.state != TrackerState::Observing {
            return None;
        }
        let entries = self.observer.as_mut()?.poll(ratios);
        if entries.is_empty() {
            return None;
        }
        trace!(?entries, "intersection batch");
        self.apply_batch(&entries)
    }

    /// Last intersecting entry in the batch wins. A batch with no
    /// intersecting entry leaves the active index alone.
    pub fn apply_batch(&mut self, entries: &[IntersectionEntry]) -> Option<usize> {
        if self.state != TrackerState::Observing {
            return None;
        }
        let winner = entries
            .iter()
            .rev()
            .find(|e| e.is_intersecting && e.index < self.sections)?
            .index;
        if winner == self.active {
            return None;
        }
        debug!(from = self.active, to = winner, "active section changed");
        self.active = winner;
        Some(winner)
    }

    pub fn disconnect(&mut self) {
        if matches!(self.state, TrackerState::Pending | TrackerState::Observing) {
            debug!("visibility tracking disconnected");
            self.state = TrackerState::Disconnected;
        }
        self.observer = None;
    }
}
