//! Viewport-triggered effects: reveal-on-scroll, stat counters, lazy images
//! and the hero stagger.
//!
//! All three observers follow the same one-shot pattern: an element is
//! watched until it first becomes sufficiently visible, its effect is
//! applied, and it is never reverted. Visibility is recomputed from element
//! rectangles whenever the viewport moves or resizes.

use crate::config::RevealConfig;
use crate::dom::{Document, NodeId};
use crate::scroll::Viewport;
use crate::timers::{TimerTask, Timers};
use tracing::debug;

pub const WILL_ANIMATE: &str = "will-animate";
pub const ANIMATE_IN: &str = "animate-in";
pub const COUNTED: &str = "animated";

/// Fraction of `node`'s height inside the viewport (0.0–1.0).
///
/// Hidden or detached elements are never visible. A zero-height element
/// counts as fully visible when its top edge is inside the viewport.
pub fn visible_ratio(doc: &Document, node: NodeId, viewport: &Viewport) -> f64 {
    if !doc.is_rendered(node) {
        return 0.0;
    }
    let rect = doc.element(node).rect;
    let view_top = viewport.scroll_y;
    let view_bottom = viewport.scroll_y + viewport.height;
    if rect.height <= 0.0 {
        return if rect.top >= view_top && rect.top <= view_bottom {
            1.0
        } else {
            0.0
        };
    }
    let overlap = rect.bottom().min(view_bottom) - rect.top.max(view_top);
    (overlap / rect.height).clamp(0.0, 1.0)
}

/// Minimal intersection observer.
#[derive(Debug, Clone, Default)]
pub struct Observer {
    threshold: f64,
    targets: Vec<NodeId>,
}

impl Observer {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            targets: Vec::new(),
        }
    }

    pub fn observe(&mut self, node: NodeId) {
        if !self.targets.contains(&node) {
            self.targets.push(node);
        }
    }

    pub fn unobserve(&mut self, node: NodeId) {
        self.targets.retain(|n| *n != node);
    }

    pub fn observed(&self) -> &[NodeId] {
        &self.targets
    }

    fn is_intersecting(&self, ratio: f64) -> bool {
        if self.threshold <= 0.0 {
            ratio > 0.0
        } else {
            ratio >= self.threshold
        }
    }

    /// Observed nodes currently intersecting, in observation order.
    pub fn intersecting(&self, doc: &Document, viewport: &Viewport) -> Vec<NodeId> {
        self.targets
            .iter()
            .copied()
            .filter(|n| self.is_intersecting(visible_ratio(doc, *n, viewport)))
            .collect()
    }
}

// =============================================================================
// Reveal animations
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct RevealAnimator {
    observer: Observer,
}

impl RevealAnimator {
    /// Mark every target `will-animate`, stagger them in groups of three and
    /// start observing. With no targets on the page this is inert.
    pub fn setup(doc: &mut Document, config: &RevealConfig) -> Self {
        let mut observer = Observer::new(config.threshold);
        let selector = config.targets.join(", ");
        let elements = if selector.is_empty() {
            Vec::new()
        } else {
            doc.query_all(&selector)
        };
        for (i, node) in elements.into_iter().enumerate() {
            let el = doc.element_mut(node);
            el.add_class(WILL_ANIMATE);
            match i % 3 {
                1 => {
                    el.add_class("delay-1");
                }
                2 => {
                    el.add_class("delay-2");
                }
                _ => {}
            }
            observer.observe(node);
        }
        Self { observer }
    }

    pub fn pending(&self) -> usize {
        self.observer.observed().len()
    }

    /// Reveal whatever has come into view. Returns how many were revealed.
    pub fn on_viewport(&mut self, doc: &mut Document, viewport: &Viewport) -> usize {
        let hits = self.observer.intersecting(doc, viewport);
        for node in &hits {
            doc.element_mut(*node).add_class(ANIMATE_IN);
            self.observer.unobserve(*node);
        }
        hits.len()
    }
}

/// Give the hero title, subtitle and first two buttons ordered transition
/// delays.
pub fn init_hero_sequence(doc: &mut Document, stagger_s: f64) {
    let sequence: Vec<NodeId> = [
        ".hero-title",
        ".hero-subtitle",
        ".hero-buttons .btn:nth-child(1)",
        ".hero-buttons .btn:nth-child(2)",
    ]
    .into_iter()
    .filter_map(|selector| doc.query(selector))
    .collect();

    for (idx, node) in sequence.into_iter().enumerate() {
        doc.element_mut(node)
            .add_class(WILL_ANIMATE)
            .set_style("transition-delay", format!("{}s", round2(stagger_s * idx as f64)));
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

// =============================================================================
// Stat counters
// =============================================================================

#[derive(Debug, Clone)]
struct Counter {
    node: NodeId,
    target: i64,
    increment: f64,
    current: f64,
    done: bool,
}

/// Count-up animation for `.stat-item .stat-number[data-count]`.
#[derive(Debug, Clone)]
pub struct StatCounters {
    observer: Observer,
    counters: Vec<Counter>,
    duration_ms: u64,
    tick_ms: u64,
}

impl StatCounters {
    pub fn setup(doc: &Document, config: &RevealConfig) -> Self {
        let mut observer = Observer::new(config.stat_threshold);
        for node in doc.query_all(".stat-item") {
            observer.observe(node);
        }
        Self {
            observer,
            counters: Vec::new(),
            duration_ms: config.counter_duration_ms,
            tick_ms: config.counter_tick_ms,
        }
    }

    /// Start counters for stat items now in view. Items stay observed; the
    /// `animated` class on the number keeps each counter one-shot.
    pub fn on_viewport(&mut self, doc: &mut Document, viewport: &Viewport, timers: &mut Timers) {
        for item in self.observer.intersecting(doc, viewport) {
            let Some(number) = doc.query_within(item, ".stat-number") else {
                continue;
            };
            if doc.element(number).has_class(COUNTED) {
                continue;
            }
            let target = doc
                .element(number)
                .attr("data-count")
                .and_then(|v| v.trim().parse::<i64>().ok())
                .unwrap_or(0);
            let steps = self.duration_ms as f64 / self.tick_ms as f64;
            self.counters.push(Counter {
                node: number,
                target,
                increment: target as f64 / steps,
                current: 0.0,
                done: false,
            });
            doc.element_mut(number).add_class(COUNTED);
            debug!(target, "stat counter started");
            timers.schedule(
                self.tick_ms,
                TimerTask::CounterTick {
                    counter: self.counters.len() - 1,
                },
            );
        }
    }

    /// Advance counter `index` by one tick, rescheduling until it lands.
    pub fn tick(&mut self, index: usize, doc: &mut Document, timers: &mut Timers) {
        let Some(counter) = self.counters.get_mut(index) else {
            return;
        };
        if counter.done {
            return;
        }
        counter.current += counter.increment;
        let el = doc.element_mut(counter.node);
        if counter.current >= counter.target as f64 {
            el.set_text(counter.target.to_string());
            counter.done = true;
        } else {
            el.set_text((counter.current.floor() as i64).to_string());
            timers.schedule(self.tick_ms, TimerTask::CounterTick { counter: index });
        }
    }

    pub fn running(&self) -> usize {
        self.counters.iter().filter(|c| !c.done).count()
    }
}

// =============================================================================
// Lazy images
// =============================================================================

/// Swaps `data-src` into `src` for `img[data-src]` once visible.
#[derive(Debug, Clone)]
pub struct LazyImages {
    observer: Observer,
}

impl LazyImages {
    pub fn setup(doc: &Document) -> Self {
        let mut observer = Observer::new(0.0);
        for node in doc.query_all("img[data-src]") {
            observer.observe(node);
        }
        Self { observer }
    }

    pub fn pending(&self) -> usize {
        self.observer.observed().len()
    }

    pub fn on_viewport(&mut self, doc: &mut Document, viewport: &Viewport) -> usize {
        let hits = self.observer.intersecting(doc, viewport);
        for node in &hits {
            let el = doc.element_mut(*node);
            if let Some(src) = el.attr("data-src").map(str::to_string) {
                el.set_attr("src", src).remove_attr("data-src");
            }
            self.observer.unobserve(*node);
        }
        hits.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Rect;

    fn viewport_at(y: f64) -> Viewport {
        let mut v = Viewport::new(1280.0, 800.0, 5000.0);
        v.scroll_y = y;
        v
    }

    fn block(doc: &mut Document, class: &str, top: f64, height: f64) -> NodeId {
        let node = doc.append_new(doc.body(), "div");
        doc.element_mut(node)
            .add_class(class)
            .set_rect(Rect::new(top, 0.0, 400.0, height));
        node
    }

    #[test]
    fn visible_ratio_partial_overlap() {
        let mut doc = Document::new();
        let node = block(&mut doc, "x", 700.0, 200.0);
        assert_eq!(visible_ratio(&doc, node, &viewport_at(0.0)), 0.5);
        assert_eq!(visible_ratio(&doc, node, &viewport_at(2000.0)), 0.0);
        assert_eq!(visible_ratio(&doc, node, &viewport_at(700.0)), 1.0);
    }

    #[test]
    fn reveal_is_one_shot_and_monotonic() {
        let mut doc = Document::new();
        let title = block(&mut doc, "hero-title", 100.0, 100.0);
        let far = block(&mut doc, "hero-subtitle", 3000.0, 100.0);
        let mut reveal = RevealAnimator::setup(&mut doc, &RevealConfig::default());
        assert_eq!(reveal.pending(), 2);
        assert!(doc.element(title).has_class(WILL_ANIMATE));
        assert!(doc.element(far).has_class("delay-1"));

        assert_eq!(reveal.on_viewport(&mut doc, &viewport_at(0.0)), 1);
        assert!(doc.element(title).has_class(ANIMATE_IN));
        assert!(!doc.element(far).has_class(ANIMATE_IN));

        // Scrolling away never reverts
        assert_eq!(reveal.on_viewport(&mut doc, &viewport_at(2900.0)), 1);
        assert!(doc.element(title).has_class(ANIMATE_IN));
        assert_eq!(reveal.pending(), 0);
        assert_eq!(reveal.on_viewport(&mut doc, &viewport_at(0.0)), 0);
    }

    #[test]
    fn reveal_needs_twenty_percent() {
        let mut doc = Document::new();
        let card = block(&mut doc, "hero-title", 750.0, 500.0);
        let mut reveal = RevealAnimator::setup(&mut doc, &RevealConfig::default());
        // 50px of 500px visible
        reveal.on_viewport(&mut doc, &viewport_at(0.0));
        assert!(!doc.element(card).has_class(ANIMATE_IN));
        // 100px of 500px visible
        reveal.on_viewport(&mut doc, &viewport_at(50.0));
        assert!(doc.element(card).has_class(ANIMATE_IN));
    }

    #[test]
    fn reveal_staggers_in_groups_of_three() {
        let mut doc = Document::new();
        let section = doc.append_new(doc.body(), "section");
        doc.element_mut(section).add_class("services");
        let cards: Vec<NodeId> = (0..4)
            .map(|_| {
                let c = doc.append_new(section, "div");
                doc.element_mut(c).add_class("service-card");
                c
            })
            .collect();
        RevealAnimator::setup(&mut doc, &RevealConfig::default());
        assert!(!doc.element(cards[0]).has_class("delay-1"));
        assert!(doc.element(cards[1]).has_class("delay-1"));
        assert!(doc.element(cards[2]).has_class("delay-2"));
        assert!(!doc.element(cards[3]).has_class("delay-1"));
    }

    #[test]
    fn hero_sequence_sets_ordered_delays() {
        let mut doc = Document::new();
        let title = block(&mut doc, "hero-title", 0.0, 10.0);
        let subtitle = block(&mut doc, "hero-subtitle", 0.0, 10.0);
        let buttons = block(&mut doc, "hero-buttons", 0.0, 10.0);
        let b1 = doc.append_new(buttons, "a");
        let b2 = doc.append_new(buttons, "a");
        doc.element_mut(b1).add_class("btn");
        doc.element_mut(b2).add_class("btn");

        init_hero_sequence(&mut doc, 0.12);
        assert_eq!(doc.element(title).style("transition-delay"), Some("0s"));
        assert_eq!(doc.element(subtitle).style("transition-delay"), Some("0.12s"));
        assert_eq!(doc.element(b1).style("transition-delay"), Some("0.24s"));
        assert_eq!(doc.element(b2).style("transition-delay"), Some("0.36s"));
    }

    fn stat_doc(count: &str) -> (Document, NodeId) {
        let mut doc = Document::new();
        let item = block(&mut doc, "stat-item", 100.0, 100.0);
        let number = doc.append_new(item, "span");
        doc.element_mut(number)
            .add_class("stat-number")
            .set_attr("data-count", count)
            .set_text("0");
        (doc, number)
    }

    fn run_ticks(counters: &mut StatCounters, doc: &mut Document, timers: &mut Timers, until: u64) {
        while let Some(task) = timers.pop_due(until) {
            if let TimerTask::CounterTick { counter } = task {
                counters.tick(counter, doc, timers);
            }
        }
        timers.set_now(until);
    }

    #[test]
    fn counter_counts_up_to_target() {
        let (mut doc, number) = stat_doc("35");
        let mut timers = Timers::new();
        let mut counters = StatCounters::setup(&doc, &RevealConfig::default());
        counters.on_viewport(&mut doc, &viewport_at(0.0), &mut timers);
        assert_eq!(counters.running(), 1);

        run_ticks(&mut counters, &mut doc, &mut timers, 1000);
        let midway: i64 = doc.element(number).text.parse().unwrap();
        assert!(midway > 0 && midway < 35, "midway value {midway}");

        run_ticks(&mut counters, &mut doc, &mut timers, 2100);
        assert_eq!(doc.element(number).text, "35");
        assert_eq!(counters.running(), 0);
        assert_eq!(timers.pending(), 0);
    }

    #[test]
    fn counter_starts_only_once() {
        let (mut doc, number) = stat_doc("500");
        let mut timers = Timers::new();
        let mut counters = StatCounters::setup(&doc, &RevealConfig::default());
        counters.on_viewport(&mut doc, &viewport_at(0.0), &mut timers);
        counters.on_viewport(&mut doc, &viewport_at(10.0), &mut timers);
        assert!(doc.element(number).has_class(COUNTED));
        assert_eq!(counters.running(), 1);
    }

    #[test]
    fn counter_with_bad_target_lands_on_zero() {
        let (mut doc, number) = stat_doc("lots");
        let mut timers = Timers::new();
        let mut counters = StatCounters::setup(&doc, &RevealConfig::default());
        counters.on_viewport(&mut doc, &viewport_at(0.0), &mut timers);
        run_ticks(&mut counters, &mut doc, &mut timers, 100);
        assert_eq!(doc.element(number).text, "0");
        assert_eq!(counters.running(), 0);
    }

    #[test]
    fn lazy_image_swaps_source_once_visible() {
        let mut doc = Document::new();
        let img = doc.append_new(doc.body(), "img");
        doc.element_mut(img)
            .set_attr("data-src", "images/partners/p1.png")
            .set_rect(Rect::new(1500.0, 0.0, 100.0, 100.0));
        let mut lazy = LazyImages::setup(&doc);
        assert_eq!(lazy.on_viewport(&mut doc, &viewport_at(0.0)), 0);
        assert_eq!(doc.element(img).attr("src"), None);

        assert_eq!(lazy.on_viewport(&mut doc, &viewport_at(1000.0)), 1);
        assert_eq!(doc.element(img).attr("src"), Some("images/partners/p1.png"));
        assert!(!doc.element(img).has_attr("data-src"));
        assert_eq!(lazy.pending(), 0);
    }
}
