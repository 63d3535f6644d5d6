//! Reading progress and active-heading tracking over a scroll container.
//!
//! The host (browser binding, TUI, test) feeds scroll events, animation-frame
//! ticks and scroll-settled signals into a [`ScrollTracker`]; the tracker reads
//! geometry through [`ScrollContainer`] and writes the URL fragment through
//! [`History`]. Everything runs on one thread.

use std::time::Instant;

use serde::Serialize;

use crate::config::ScrollConfig;
use crate::heading::Heading;

/// Scroll geometry of the container, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

/// The scrollable element wrapping the rendered article.
pub trait ScrollContainer {
    /// Handle to a heading element.
    type Handle: Clone;

    /// `None` when the container is not in the DOM.
    fn metrics(&self) -> Option<ScrollMetrics>;

    /// Look up the heading element carrying `id`.
    fn find(&self, id: &str) -> Option<Self::Handle>;

    /// Top offset of an element relative to the container; `None` once the
    /// element has been removed.
    fn offset_top(&self, handle: &Self::Handle) -> Option<f64>;
}

/// Browser history, limited to non-navigating fragment replacement.
pub trait History {
    /// Replace the current entry's fragment with `#id` without pushing a new
    /// entry or jumping.
    fn replace_fragment(&mut self, id: &str);
}

/// `scroll_top / (scroll_height - client_height) * 100`, clamped to `[0, 100]`.
/// A container that cannot scroll reports 0.
pub fn reading_progress(metrics: &ScrollMetrics) -> f64 {
    let range = metrics.scroll_height - metrics.client_height;
    if range <= 0.0 || !range.is_finite() {
        return 0.0;
    }
    (metrics.scroll_top / range * 100.0).clamp(0.0, 100.0)
}

/// The last heading, in document order, whose offset is `<= scroll_pos`;
/// the first heading when none qualifies. Headings with no offset are ignored.
pub fn select_active<'a>(offsets: &[(&'a str, Option<f64>)], scroll_pos: f64) -> Option<&'a str> {
    let mut active = None;
    for &(id, offset) in offsets {
        if offset.is_some_and(|o| o <= scroll_pos) {
            active = Some(id);
        }
    }
    active.or_else(|| offsets.first().map(|&(id, _)| id))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScrollState {
    pub active_id: Option<String>,
    pub reading_progress: f64,
}

/// Result of one animation-frame computation.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollUpdate {
    pub reading_progress: f64,
    /// The new active id, when it changed on this tick.
    pub active_changed: Option<String>,
    /// Whether the URL fragment was rewritten.
    pub fragment_written: bool,
}

/// Coordinates progress, active heading and URL sync for one rendered
/// document.
pub struct ScrollTracker<C: ScrollContainer> {
    config: ScrollConfig,
    headings: Vec<(String, Option<C::Handle>)>,
    attached: bool,
    frame_pending: bool,
    /// Set while a TOC-initiated scroll is in flight; holds the fallback
    /// deadline.
    programmatic_until: Option<Instant>,
    state: ScrollState,
}

impl<C: ScrollContainer> ScrollTracker<C> {
    pub fn new(config: ScrollConfig) -> Self {
        Self {
            config,
            headings: Vec::new(),
            attached: false,
            frame_pending: false,
            programmatic_until: None,
            state: ScrollState::default(),
        }
    }

    /// Track a (new) document. Any previous heading set, element cache and
    /// pending frame are dropped first.
    pub fn attach(&mut self, container: &C, headings: &[Heading]) {
        self.detach();
        self.headings = headings
            .iter()
            .map(|h| {
                let handle = container.find(&h.id);
                if handle.is_none() {
                    log::debug!("heading element #{} not found in container", h.id);
                }
                (h.id.clone(), handle)
            })
            .collect();
        self.state.active_id = self.headings.first().map(|(id, _)| id.clone());
        self.attached = true;
    }

    /// Stop tracking. Later events and ticks are no-ops.
    pub fn detach(&mut self) {
        self.headings.clear();
        self.attached = false;
        self.frame_pending = false;
        self.programmatic_until = None;
        self.state = ScrollState::default();
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn state(&self) -> &ScrollState {
        &self.state
    }

    /// Whether a programmatic scroll is suppressing URL updates.
    pub fn is_programmatic(&self) -> bool {
        self.programmatic_until.is_some()
    }

    /// Scroll event. Schedules one computation for the next animation frame;
    /// events arriving while one is already scheduled are coalesced.
    /// Returns whether a new frame was scheduled.
    pub fn on_scroll(&mut self) -> bool {
        if !self.attached || self.frame_pending {
            return false;
        }
        self.frame_pending = true;
        true
    }

    /// Animation-frame tick. Runs the scheduled computation, if any.
    pub fn on_animation_frame<H: History>(
        &mut self,
        container: &C,
        history: &mut H,
        now: Instant,
    ) -> Option<ScrollUpdate> {
        if !self.attached || !self.frame_pending {
            return None;
        }
        self.frame_pending = false;

        if self.programmatic_until.is_some_and(|deadline| now >= deadline) {
            log::debug!("programmatic scroll guard expired without a settle signal");
            self.programmatic_until = None;
        }

        let metrics = container.metrics()?;
        self.state.reading_progress = reading_progress(&metrics);

        let scroll_pos = metrics.scroll_top + self.config.look_ahead;
        let offsets: Vec<(&str, Option<f64>)> = self
            .headings
            .iter()
            .map(|(id, handle)| {
                let offset = handle.as_ref().and_then(|h| container.offset_top(h));
                (id.as_str(), offset)
            })
            .collect();
        let selected = select_active(&offsets, scroll_pos).map(str::to_string);

        let mut update = ScrollUpdate {
            reading_progress: self.state.reading_progress,
            active_changed: None,
            fragment_written: false,
        };

        if selected.is_some() && selected != self.state.active_id {
            self.state.active_id = selected.clone();
            if let Some(id) = &selected {
                if !self.is_programmatic() {
                    history.replace_fragment(id);
                    update.fragment_written = true;
                }
            }
            update.active_changed = selected;
        }

        Some(update)
    }

    /// TOC click: mark `target` active, write its fragment, and suppress URL
    /// updates until the scroll settles or the fallback timeout passes.
    /// Returns the offset the host should smooth-scroll to.
    pub fn begin_programmatic_scroll<H: History>(
        &mut self,
        container: &C,
        target: &str,
        history: &mut H,
        now: Instant,
    ) -> Option<f64> {
        if !self.attached {
            return None;
        }
        let (id, handle) = self.headings.iter().find(|(id, _)| id == target)?;
        let offset = match handle {
            Some(h) => container.offset_top(h),
            None => container.find(id).and_then(|h| container.offset_top(&h)),
        }?;

        self.programmatic_until = Some(now + self.config.settle_timeout());
        self.state.active_id = Some(id.clone());
        history.replace_fragment(id);
        Some(offset)
    }

    /// Scroll-settled signal from the container.
    pub fn on_scroll_end(&mut self) {
        self.programmatic_until = None;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use super::*;

    #[derive(Default)]
    struct FakeContainer {
        metrics: Option<ScrollMetrics>,
        offsets: HashMap<String, f64>,
    }

    impl FakeContainer {
        fn new(scroll_top: f64, offsets: &[(&str, f64)]) -> Self {
            Self {
                metrics: Some(ScrollMetrics {
                    scroll_top,
                    scroll_height: 2000.0,
                    client_height: 1000.0,
                }),
                offsets: offsets.iter().map(|&(id, o)| (id.to_string(), o)).collect(),
            }
        }

        fn scroll_to(&mut self, top: f64) {
            if let Some(m) = self.metrics.as_mut() {
                m.scroll_top = top;
            }
        }
    }

    impl ScrollContainer for FakeContainer {
        type Handle = String;

        fn metrics(&self) -> Option<ScrollMetrics> {
            self.metrics
        }

        fn find(&self, id: &str) -> Option<String> {
            self.offsets.contains_key(id).then(|| id.to_string())
        }

        fn offset_top(&self, handle: &String) -> Option<f64> {
            self.offsets.get(handle).copied()
        }
    }

    #[derive(Default)]
    struct FakeHistory {
        fragments: Vec<String>,
    }

    impl History for FakeHistory {
        fn replace_fragment(&mut self, id: &str) {
            self.fragments.push(id.to_string());
        }
    }

    fn headings() -> Vec<Heading> {
        ["a", "b", "c", "d"]
            .iter()
            .map(|id| Heading::new(*id, id.to_uppercase(), 2))
            .collect()
    }

    const OFFSETS: [(&str, f64); 4] = [("a", 0.0), ("b", 400.0), ("c", 600.0), ("d", 900.0)];

    fn tick(
        tracker: &mut ScrollTracker<FakeContainer>,
        container: &FakeContainer,
        history: &mut FakeHistory,
        now: Instant,
    ) -> Option<ScrollUpdate> {
        tracker.on_scroll();
        tracker.on_animation_frame(container, history, now)
    }

    #[test]
    fn test_reading_progress() {
        let m = |top| ScrollMetrics {
            scroll_top: top,
            scroll_height: 3000.0,
            client_height: 1000.0,
        };
        assert_eq!(reading_progress(&m(0.0)), 0.0);
        assert_eq!(reading_progress(&m(1000.0)), 50.0);
        assert_eq!(reading_progress(&m(2500.0)), 100.0);
        let flat = ScrollMetrics {
            scroll_top: 0.0,
            scroll_height: 500.0,
            client_height: 800.0,
        };
        assert_eq!(reading_progress(&flat), 0.0);
    }

    #[test]
    fn test_select_active() {
        let offsets: Vec<(&str, Option<f64>)> = OFFSETS.iter().map(|&(id, o)| (id, Some(o))).collect();
        assert_eq!(select_active(&offsets, 650.0), Some("c"));
        assert_eq!(select_active(&offsets, 400.0), Some("b"));
        assert_eq!(select_active(&offsets, 5000.0), Some("d"));
        assert_eq!(select_active(&[], 10.0), None);
    }

    #[test]
    fn test_select_active_defaults_to_first() {
        let offsets = [("a", Some(300.0)), ("b", Some(600.0))];
        assert_eq!(select_active(&offsets, 150.0), Some("a"));
        let missing = [("a", None), ("b", Some(100.0))];
        assert_eq!(select_active(&missing, 150.0), Some("b"));
    }

    #[test]
    fn test_active_heading_with_look_ahead() {
        let container = FakeContainer::new(500.0, &OFFSETS);
        let mut history = FakeHistory::default();
        let mut tracker = ScrollTracker::new(ScrollConfig::default());
        tracker.attach(&container, &headings());

        let update = tick(&mut tracker, &container, &mut history, Instant::now()).unwrap();
        assert_eq!(update.active_changed.as_deref(), Some("c"));
        assert!(update.fragment_written);
        assert_eq!(update.reading_progress, 50.0);
        assert_eq!(history.fragments, vec!["c"]);
    }

    #[test]
    fn test_unchanged_active_not_rewritten() {
        let mut container = FakeContainer::new(500.0, &OFFSETS);
        let mut history = FakeHistory::default();
        let mut tracker = ScrollTracker::new(ScrollConfig::default());
        tracker.attach(&container, &headings());
        let now = Instant::now();

        tick(&mut tracker, &container, &mut history, now);
        container.scroll_to(520.0);
        let update = tick(&mut tracker, &container, &mut history, now).unwrap();
        assert_eq!(update.active_changed, None);
        assert_eq!(history.fragments.len(), 1);
    }

    #[test]
    fn test_scroll_events_coalesce() {
        let container = FakeContainer::new(0.0, &OFFSETS);
        let mut history = FakeHistory::default();
        let mut tracker = ScrollTracker::new(ScrollConfig::default());
        tracker.attach(&container, &headings());

        assert!(tracker.on_scroll());
        assert!(!tracker.on_scroll());
        assert!(!tracker.on_scroll());
        assert!(tracker
            .on_animation_frame(&container, &mut history, Instant::now())
            .is_some());
        // Nothing scheduled for the following frame.
        assert!(tracker
            .on_animation_frame(&container, &mut history, Instant::now())
            .is_none());
        assert!(tracker.on_scroll());
    }

    #[test]
    fn test_programmatic_scroll_suppresses_fragment() {
        let mut container = FakeContainer::new(0.0, &OFFSETS);
        let mut history = FakeHistory::default();
        let mut tracker = ScrollTracker::new(ScrollConfig::default());
        tracker.attach(&container, &headings());
        let start = Instant::now();

        let target = tracker.begin_programmatic_scroll(&container, "d", &mut history, start);
        assert_eq!(target, Some(900.0));
        assert!(tracker.is_programmatic());
        assert_eq!(history.fragments, vec!["d"]);

        // Mid-flight: progress keeps updating, the URL does not move.
        container.scroll_to(300.0);
        let update = tick(&mut tracker, &container, &mut history, start).unwrap();
        assert_eq!(update.reading_progress, 30.0);
        assert_eq!(update.active_changed.as_deref(), Some("b"));
        assert!(!update.fragment_written);
        assert_eq!(history.fragments, vec!["d"]);

        container.scroll_to(900.0);
        tick(&mut tracker, &container, &mut history, start);
        tracker.on_scroll_end();
        assert!(!tracker.is_programmatic());
        assert_eq!(tracker.state().active_id.as_deref(), Some("d"));

        // User scroll afterwards writes again.
        container.scroll_to(100.0);
        let update = tick(&mut tracker, &container, &mut history, start).unwrap();
        assert!(update.fragment_written);
        assert_eq!(history.fragments, vec!["d", "a"]);
    }

    #[test]
    fn test_programmatic_guard_times_out() {
        let mut container = FakeContainer::new(0.0, &OFFSETS);
        let mut history = FakeHistory::default();
        let mut tracker = ScrollTracker::new(ScrollConfig::default());
        tracker.attach(&container, &headings());
        let start = Instant::now();

        tracker.begin_programmatic_scroll(&container, "c", &mut history, start);
        container.scroll_to(800.0);
        let update = tick(
            &mut tracker,
            &container,
            &mut history,
            start + Duration::from_millis(1499),
        )
        .unwrap();
        assert!(!update.fragment_written);
        assert!(tracker.is_programmatic());

        container.scroll_to(100.0);
        let update = tick(
            &mut tracker,
            &container,
            &mut history,
            start + Duration::from_millis(1500),
        )
        .unwrap();
        assert!(!tracker.is_programmatic());
        assert!(update.fragment_written);
        assert_eq!(history.fragments.last().map(String::as_str), Some("a"));
    }

    #[test]
    fn test_missing_container_is_noop() {
        let container = FakeContainer::new(500.0, &OFFSETS);
        let mut history = FakeHistory::default();
        let mut tracker = ScrollTracker::new(ScrollConfig::default());
        tracker.attach(&container, &headings());

        let gone = FakeContainer::default();
        assert!(tick(&mut tracker, &gone, &mut history, Instant::now()).is_none());
        assert!(history.fragments.is_empty());
    }

    #[test]
    fn test_missing_heading_element_skipped() {
        let container = FakeContainer::new(500.0, &[("a", 0.0), ("b", 400.0)]);
        let mut history = FakeHistory::default();
        let mut tracker = ScrollTracker::new(ScrollConfig::default());
        tracker.attach(&container, &headings());

        let update = tick(&mut tracker, &container, &mut history, Instant::now()).unwrap();
        assert_eq!(update.active_changed.as_deref(), Some("b"));
        assert!(tracker
            .begin_programmatic_scroll(&container, "c", &mut history, Instant::now())
            .is_none());
    }

    #[test]
    fn test_detach_and_reattach() {
        let container = FakeContainer::new(500.0, &OFFSETS);
        let mut history = FakeHistory::default();
        let mut tracker = ScrollTracker::new(ScrollConfig::default());
        tracker.attach(&container, &headings());
        tracker.on_scroll();
        tracker.detach();

        assert!(!tracker.is_attached());
        assert!(!tracker.on_scroll());
        assert!(tracker
            .on_animation_frame(&container, &mut history, Instant::now())
            .is_none());

        // Re-attaching starts from a clean slate with the first heading active.
        tracker.attach(&container, &headings()[2..]);
        assert_eq!(tracker.state().active_id.as_deref(), Some("c"));
        let update = tick(&mut tracker, &container, &mut history, Instant::now()).unwrap();
        assert_eq!(update.active_changed, None);
        assert!(history.fragments.is_empty());
    }
}
