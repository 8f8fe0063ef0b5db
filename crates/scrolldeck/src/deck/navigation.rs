use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

/// Where the target section ends up in the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAlign {
    Start,
}

/// A request for the host to bring a section into view. Newer requests
/// supersede older ones still in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRequest {
    pub index: usize,
    pub behavior: ScrollBehavior,
    pub align: ScrollAlign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    Scroll(ScrollRequest),
    IncrementUsers,
    DecrementUsers,
}

/// Turns navigation intent into scroll requests. Never touches the
/// active index itself; that follows from what the tracker observes.
#[derive(Debug, Clone)]
pub struct NavigationController {
    slide_count: usize,
    estimator_slide: Option<usize>,
}

impl NavigationController {
    pub fn new(slide_count: usize, estimator_slide: Option<usize>) -> Self {
        Self {
            slide_count,
            estimator_slide,
        }
    }

    pub fn slide_count(&self) -> usize {
        self.slide_count
    }

    pub fn clamp_index(&self, index: usize) -> usize {
        index.min(self.slide_count.saturating_sub(1))
    }

    /// Smooth scroll to section `index`, clamped into range.
    pub fn go_to(&self, index: usize) -> Option<ScrollRequest> {
        if self.slide_count == 0 {
            return None;
        }
        let index = self.clamp_index(index);
        debug!(index, "navigate");
        Some(ScrollRequest {
            index,
            behavior: ScrollBehavior::Smooth,
            align: ScrollAlign::Start,
        })
    }

    /// Like [`go_to`](Self::go_to) but without animation, for the start
    /// position.
    pub fn jump_to(&self, index: usize) -> Option<ScrollRequest> {
        self.go_to(index).map(|req| ScrollRequest {
            behavior: ScrollBehavior::Instant,
            ..req
        })
    }

    pub fn handle_key(&self, key: NavKey, active: usize) -> Option<NavAction> {
        let on_estimator = self.estimator_slide == Some(active);
        match key {
            NavKey::ArrowDown => self.go_to(active.saturating_add(1)).map(NavAction::Scroll),
            NavKey::ArrowUp => self.go_to(active.saturating_sub(1)).map(NavAction::Scroll),
            NavKey::ArrowLeft if on_estimator => Some(NavAction::DecrementUsers),
            NavKey::ArrowRight if on_estimator => Some(NavAction::IncrementUsers),
            NavKey::ArrowLeft | NavKey::ArrowRight => None,
        }
    }
}
