//! Scroll guard.
//!
//! Page scrolling is opt-in. Every component that wants to move the window
//! goes through [`ScrollService`]; its primitives ([`ScrollService::scroll_to`],
//! [`ScrollService::scroll_by`], [`ScrollService::scroll_into_view`]) only
//! act while a permission window opened by
//! [`ScrollService::run_with_permission`] is active, and are silent no-ops
//! otherwise. This keeps stale URL fragments, scroll restoration and
//! animation side effects from moving the page.
//!
//! ## Permission windows
//!
//! ```text
//! run_with_permission(action)
//!   permitted = true, generation += 1
//!   action(service)                 ← scrolls here execute
//!   schedule Revoke{generation} after permission_window_ms
//! ...
//! Revoke{g}: if g is still the latest generation → permitted = false
//! ```
//!
//! The trailing window lets smooth scrolls started inside the action finish.
//! A revocation from an older window never cuts a newer one short.
//!
//! ## Fragment suppression
//!
//! On load, a URL fragment is stripped (without scrolling) unless the user
//! has already interacted with the page. The interaction flag is set on the
//! first click, touch, key press or mouse press and never cleared.
//!
//! ## Jump guard
//!
//! [`JumpGuard`] is a heuristic for one observed defect: the page snapping
//! to a particular section with no user scroll. While the user is not
//! actively scrolling, a scroll position within `threshold_px` of that
//! section's top is undone. It is configurable and can be disabled.

use crate::config::{JumpGuardConfig, ScrollConfig};
use crate::dom::{Document, NodeId};
use crate::timers::{TimerTask, Timers};
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Auto,
    Smooth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollRestoration {
    Auto,
    Manual,
}

/// A scroll the service actually performed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollRecord {
    pub from: f64,
    pub to: f64,
    pub behavior: ScrollBehavior,
}

/// Window geometry. `content_height` bounds the scroll range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scroll_y: f64,
    pub width: f64,
    pub height: f64,
    pub content_height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, content_height: f64) -> Self {
        Self {
            scroll_y: 0.0,
            width,
            height,
            content_height,
        }
    }

    pub fn max_scroll(&self) -> f64 {
        (self.content_height - self.height).max(0.0)
    }

    fn clamp(&self, y: f64) -> f64 {
        y.clamp(0.0, self.max_scroll())
    }
}

/// The page URL, split the way `location` exposes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub search: String,
    pub hash: String,
}

impl Location {
    /// Parse `path?search#hash`; `search` keeps its `?`, `hash` its `#`.
    pub fn parse(url: &str) -> Self {
        let (rest, hash) = match url.find('#') {
            Some(i) => (&url[..i], &url[i..]),
            None => (url, ""),
        };
        let (path, search) = match rest.find('?') {
            Some(i) => (&rest[..i], &rest[i..]),
            None => (rest, ""),
        };
        Self {
            path: if path.is_empty() { "/" } else { path }.to_string(),
            search: search.to_string(),
            hash: hash.to_string(),
        }
    }

    pub fn href(&self) -> String {
        format!("{}{}{}", self.path, self.search, self.hash)
    }

    /// `history.replaceState(null, '', pathname + search)`.
    fn strip_hash(&mut self) {
        self.hash.clear();
    }
}

pub struct ScrollService {
    config: ScrollConfig,
    viewport: Viewport,
    location: Location,
    restoration: ScrollRestoration,
    permitted: bool,
    generation: u64,
    user_interacted: bool,
    executed: Vec<ScrollRecord>,
    jump_guard: JumpGuard,
}

impl ScrollService {
    pub fn new(config: &ScrollConfig, viewport: Viewport, location: Location) -> Self {
        Self {
            config: config.clone(),
            viewport,
            location,
            restoration: ScrollRestoration::Auto,
            permitted: false,
            generation: 0,
            user_interacted: false,
            executed: Vec::new(),
            jump_guard: JumpGuard::new(&config.jump_guard),
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn restoration(&self) -> ScrollRestoration {
        self.restoration
    }

    pub fn is_permitted(&self) -> bool {
        self.permitted
    }

    pub fn user_interacted(&self) -> bool {
        self.user_interacted
    }

    /// Every scroll that went through, oldest first.
    pub fn executed(&self) -> &[ScrollRecord] {
        &self.executed
    }

    pub fn jump_guard(&self) -> &JumpGuard {
        &self.jump_guard
    }

    /// Record a click/touch/key/mouse press. Permanent.
    pub fn mark_user_interaction(&mut self) {
        self.user_interacted = true;
    }

    /// A scroll position reported by the platform (user wheel, drag, or an
    /// unsolicited jump). Not gated: it already happened.
    pub fn set_scroll_y(&mut self, y: f64) {
        self.viewport.scroll_y = self.viewport.clamp(y);
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport.width = width;
        self.viewport.height = height;
        self.viewport.scroll_y = self.viewport.clamp(self.viewport.scroll_y);
    }

    pub fn set_content_height(&mut self, content_height: f64) {
        self.viewport.content_height = content_height;
        self.viewport.scroll_y = self.viewport.clamp(self.viewport.scroll_y);
    }

    /// Run `action` with programmatic scrolling permitted, keeping the
    /// permission open for the configured trailing window afterwards.
    pub fn run_with_permission<R>(
        &mut self,
        timers: &mut Timers,
        action: impl FnOnce(&mut Self) -> R,
    ) -> R {
        self.generation += 1;
        self.permitted = true;
        let generation = self.generation;
        let result = action(self);
        timers.schedule(
            self.config.permission_window_ms,
            TimerTask::RevokeScrollPermission { generation },
        );
        result
    }

    /// Close the window opened with `generation`, unless a newer one is open.
    pub fn revoke(&mut self, generation: u64) {
        if generation == self.generation {
            self.permitted = false;
        }
    }

    /// `window.scrollTo`. Returns whether the call was allowed through.
    pub fn scroll_to(&mut self, top: f64, behavior: ScrollBehavior) -> bool {
        if !self.permitted {
            trace!(top, "programmatic scroll dropped");
            return false;
        }
        let from = self.viewport.scroll_y;
        let to = self.viewport.clamp(top);
        self.viewport.scroll_y = to;
        self.executed.push(ScrollRecord { from, to, behavior });
        true
    }

    /// `window.scrollBy`.
    pub fn scroll_by(&mut self, dy: f64, behavior: ScrollBehavior) -> bool {
        let top = self.viewport.scroll_y + dy;
        self.scroll_to(top, behavior)
    }

    /// `element.scrollIntoView()`: align the element's top with the
    /// viewport's top.
    pub fn scroll_into_view(&mut self, doc: &Document, node: NodeId, behavior: ScrollBehavior) -> bool {
        let top = doc.element(node).rect.top;
        self.scroll_to(top, behavior)
    }

    /// Offset used when none is given: measured header height plus a gap,
    /// or a width-dependent fallback.
    pub fn auto_offset(&self, doc: &Document) -> f64 {
        match doc.by_id("header") {
            Some(header) => doc.element(header).rect.height + self.config.header_gap,
            None if self.viewport.width < self.config.narrow_breakpoint => self.config.narrow_offset,
            None => self.config.wide_offset,
        }
    }

    /// Smoothly bring `node` to `offset` px below the viewport top, under
    /// a fresh permission window.
    pub fn smooth_scroll_to(
        &mut self,
        doc: &Document,
        timers: &mut Timers,
        node: NodeId,
        offset: Option<f64>,
    ) -> bool {
        let offset = offset.unwrap_or_else(|| self.auto_offset(doc));
        let top = doc.element(node).rect.top - offset;
        self.run_with_permission(timers, |s| s.scroll_to(top, ScrollBehavior::Smooth))
    }

    /// In-page anchor navigation: jump to the target's top minus the anchor
    /// offset.
    pub fn scroll_to_anchor(&mut self, doc: &Document, timers: &mut Timers, node: NodeId) -> bool {
        let top = doc.element(node).rect.top - self.config.anchor_offset;
        self.run_with_permission(timers, |s| s.scroll_to(top, ScrollBehavior::Auto))
    }

    /// Page-load handling: manual scroll restoration, fragment stripping,
    /// and a delayed second check.
    pub fn on_load(&mut self, timers: &mut Timers) {
        self.restoration = ScrollRestoration::Manual;
        if !self.location.hash.is_empty() && !self.user_interacted {
            debug!(hash = %self.location.hash, "stripping fragment on load");
            self.location.strip_hash();
        }
        timers.schedule(self.config.post_load_check_ms, TimerTask::PostLoadHashCheck);
    }

    /// Late fragment check: a fragment that reappeared without user action
    /// is stripped and the page is returned to the top.
    pub fn post_load_check(&mut self, timers: &mut Timers) {
        if !self.location.hash.is_empty() && !self.user_interacted {
            self.location.strip_hash();
            self.run_with_permission(timers, |s| s.scroll_to(0.0, ScrollBehavior::Auto));
        }
    }

    /// The fragment changed: clear it and pin the current position so the
    /// browser's anchor jump is undone.
    pub fn on_hash_change(&mut self, hash: &str, timers: &mut Timers) {
        let y = self.viewport.scroll_y;
        self.location.hash = hash.to_string();
        self.location.strip_hash();
        self.run_with_permission(timers, |s| s.scroll_to(y, ScrollBehavior::Auto));
    }

    /// Wheel, touch or key activity: the user is scrolling.
    pub fn on_user_scroll_intent(&mut self) {
        self.jump_guard.user_scrolling = true;
    }

    /// React to the window having scrolled to `scroll_y`. Runs the jump
    /// guard, unless the position came from a permitted scroll; returns
    /// whether it restored the previous position.
    pub fn on_scroll(&mut self, doc: &Document, timers: &mut Timers) -> bool {
        let y = self.viewport.scroll_y;
        let section_top = self
            .jump_guard
            .section()
            .and_then(|id| doc.by_id(id))
            .map(|node| doc.element(node).rect.top);
        match self.jump_guard.observe(y, section_top, self.permitted, timers) {
            Some(restore_y) => {
                debug!(from = y, to = restore_y, "undoing unsolicited jump");
                self.run_with_permission(timers, |s| s.scroll_to(restore_y, ScrollBehavior::Auto))
            }
            None => false,
        }
    }

    pub fn user_scroll_idle(&mut self, generation: u64) {
        self.jump_guard.idle(generation);
    }
}

/// Heuristic undo for unsolicited jumps to one section.
#[derive(Debug, Clone)]
pub struct JumpGuard {
    config: JumpGuardConfig,
    user_scrolling: bool,
    last_user_y: f64,
    idle_generation: u64,
}

impl JumpGuard {
    pub fn new(config: &JumpGuardConfig) -> Self {
        Self {
            config: config.clone(),
            user_scrolling: false,
            last_user_y: 0.0,
            idle_generation: 0,
        }
    }

    pub fn is_user_scrolling(&self) -> bool {
        self.user_scrolling
    }

    pub fn last_user_y(&self) -> f64 {
        self.last_user_y
    }

    fn section(&self) -> Option<&str> {
        (self.config.enabled && !self.config.section.is_empty()).then_some(self.config.section.as_str())
    }

    /// Returns the position to restore, if `y` looks like an unsolicited
    /// jump to the guarded section. An `authorized` position is never
    /// undone and becomes the new baseline.
    fn observe(
        &mut self,
        y: f64,
        section_top: Option<f64>,
        authorized: bool,
        timers: &mut Timers,
    ) -> Option<f64> {
        if self.user_scrolling {
            self.last_user_y = y;
            self.idle_generation += 1;
            timers.schedule(
                self.config.idle_ms,
                TimerTask::UserScrollIdle {
                    generation: self.idle_generation,
                },
            );
            return None;
        }
        if authorized {
            self.last_user_y = y;
            return None;
        }
        if !self.config.enabled {
            return None;
        }
        let top = section_top?;
        ((y - top).abs() < self.config.threshold_px).then_some(self.last_user_y)
    }

    fn idle(&mut self, generation: u64) {
        if generation == self.idle_generation {
            self.user_scrolling = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Rect;

    fn service(url: &str) -> ScrollService {
        ScrollService::new(
            &ScrollConfig::default(),
            Viewport::new(1280.0, 800.0, 6000.0),
            Location::parse(url),
        )
    }

    fn drain(service: &mut ScrollService, timers: &mut Timers, until: u64) {
        while let Some(task) = timers.pop_due(until) {
            match task {
                TimerTask::RevokeScrollPermission { generation } => service.revoke(generation),
                TimerTask::UserScrollIdle { generation } => service.user_scroll_idle(generation),
                TimerTask::PostLoadHashCheck => service.post_load_check(timers),
                _ => {}
            }
        }
        timers.set_now(until);
    }

    #[test]
    fn location_parse_splits_parts() {
        let loc = Location::parse("/index.html?x=1#career");
        assert_eq!(loc.path, "/index.html");
        assert_eq!(loc.search, "?x=1");
        assert_eq!(loc.hash, "#career");
        assert_eq!(loc.href(), "/index.html?x=1#career");
        assert_eq!(Location::parse("#top").path, "/");
    }

    #[test]
    fn unwrapped_scroll_is_dropped() {
        let mut s = service("/");
        assert!(!s.scroll_to(400.0, ScrollBehavior::Smooth));
        assert!(!s.scroll_by(10.0, ScrollBehavior::Auto));
        assert_eq!(s.viewport().scroll_y, 0.0);
        assert!(s.executed().is_empty());
    }

    #[test]
    fn wrapped_scroll_executes() {
        let mut s = service("/");
        let mut timers = Timers::new();
        let ok = s.run_with_permission(&mut timers, |s| s.scroll_to(400.0, ScrollBehavior::Smooth));
        assert!(ok);
        assert_eq!(s.viewport().scroll_y, 400.0);
        assert_eq!(s.executed().len(), 1);
    }

    #[test]
    fn permission_expires_after_window() {
        let mut s = service("/");
        let mut timers = Timers::new();
        s.run_with_permission(&mut timers, |_| ());
        drain(&mut s, &mut timers, 599);
        assert!(s.is_permitted());
        assert!(s.scroll_to(100.0, ScrollBehavior::Auto));
        drain(&mut s, &mut timers, 600);
        assert!(!s.is_permitted());
        assert!(!s.scroll_to(200.0, ScrollBehavior::Auto));
    }

    #[test]
    fn older_revocation_does_not_cut_newer_window() {
        let mut s = service("/");
        let mut timers = Timers::new();
        s.run_with_permission(&mut timers, |_| ());
        drain(&mut s, &mut timers, 500);
        s.run_with_permission(&mut timers, |_| ());
        drain(&mut s, &mut timers, 700);
        assert!(s.is_permitted());
        drain(&mut s, &mut timers, 1100);
        assert!(!s.is_permitted());
    }

    #[test]
    fn scroll_is_clamped_to_content() {
        let mut s = service("/");
        let mut timers = Timers::new();
        s.run_with_permission(&mut timers, |s| s.scroll_to(10_000.0, ScrollBehavior::Auto));
        assert_eq!(s.viewport().scroll_y, 5200.0);
        s.run_with_permission(&mut timers, |s| s.scroll_to(-50.0, ScrollBehavior::Auto));
        assert_eq!(s.viewport().scroll_y, 0.0);
    }

    #[test]
    fn load_strips_hash_without_scrolling() {
        let mut s = service("/index.html#career");
        let mut timers = Timers::new();
        s.on_load(&mut timers);
        assert_eq!(s.location().href(), "/index.html");
        assert_eq!(s.restoration(), ScrollRestoration::Manual);
        assert!(s.executed().is_empty());
    }

    #[test]
    fn load_keeps_hash_after_user_interaction() {
        let mut s = service("/index.html#career");
        let mut timers = Timers::new();
        s.mark_user_interaction();
        s.on_load(&mut timers);
        assert_eq!(s.location().hash, "#career");
        drain(&mut s, &mut timers, 1000);
        assert_eq!(s.location().hash, "#career");
    }

    #[test]
    fn hash_change_pins_position() {
        let mut s = service("/");
        let mut timers = Timers::new();
        s.set_scroll_y(300.0);
        s.on_hash_change("#contact", &mut timers);
        assert_eq!(s.location().hash, "");
        assert_eq!(s.viewport().scroll_y, 300.0);
    }

    #[test]
    fn auto_offset_uses_header_height() {
        let mut doc = Document::new();
        let s = service("/");
        assert_eq!(s.auto_offset(&doc), 90.0);

        let header = doc.append_new(doc.body(), "header");
        doc.element_mut(header)
            .set_attr("id", "header")
            .set_rect(Rect::new(0.0, 0.0, 1280.0, 64.0));
        assert_eq!(s.auto_offset(&doc), 74.0);
    }

    #[test]
    fn auto_offset_narrow_fallback() {
        let doc = Document::new();
        let mut s = service("/");
        s.resize(375.0, 700.0);
        assert_eq!(s.auto_offset(&doc), 70.0);
    }

    fn doc_with_career(top: f64) -> Document {
        let mut doc = Document::new();
        let career = doc.append_new(doc.body(), "section");
        doc.element_mut(career)
            .set_attr("id", "career")
            .set_rect(Rect::new(top, 0.0, 1280.0, 900.0));
        doc
    }

    #[test]
    fn jump_guard_restores_last_user_position() {
        let doc = doc_with_career(3000.0);
        let mut s = service("/");
        let mut timers = Timers::new();

        s.on_user_scroll_intent();
        s.set_scroll_y(1200.0);
        assert!(!s.on_scroll(&doc, &mut timers));
        drain(&mut s, &mut timers, 200);
        assert!(!s.jump_guard().is_user_scrolling());

        // Unsolicited jump next to the guarded section
        s.set_scroll_y(3050.0);
        assert!(s.on_scroll(&doc, &mut timers));
        assert_eq!(s.viewport().scroll_y, 1200.0);
    }

    #[test]
    fn jump_guard_ignores_user_scroll_to_section() {
        let doc = doc_with_career(3000.0);
        let mut s = service("/");
        let mut timers = Timers::new();

        s.on_user_scroll_intent();
        s.set_scroll_y(3000.0);
        assert!(!s.on_scroll(&doc, &mut timers));
        assert_eq!(s.viewport().scroll_y, 3000.0);
        assert_eq!(s.jump_guard().last_user_y(), 3000.0);
    }

    #[test]
    fn jump_guard_keeps_permitted_scroll_to_section() {
        let doc = doc_with_career(3000.0);
        let mut s = service("/");
        let mut timers = Timers::new();

        let career = doc.by_id("career").unwrap();
        assert!(s.scroll_to_anchor(&doc, &mut timers, career));
        assert!(!s.on_scroll(&doc, &mut timers));
        assert_eq!(s.viewport().scroll_y, 2920.0);
        assert_eq!(s.jump_guard().last_user_y(), 2920.0);

        // After the window closes, a stray jump returns to the anchor target
        drain(&mut s, &mut timers, 1000);
        s.set_scroll_y(3010.0);
        assert!(s.on_scroll(&doc, &mut timers));
        assert_eq!(s.viewport().scroll_y, 2920.0);
    }

    #[test]
    fn jump_guard_ignores_positions_outside_threshold() {
        let doc = doc_with_career(3000.0);
        let mut s = service("/");
        let mut timers = Timers::new();
        s.set_scroll_y(2800.0);
        assert!(!s.on_scroll(&doc, &mut timers));
    }

    #[test]
    fn disabled_jump_guard_never_restores() {
        let doc = doc_with_career(3000.0);
        let mut config = ScrollConfig::default();
        config.jump_guard.enabled = false;
        let mut s = ScrollService::new(&config, Viewport::new(1280.0, 800.0, 6000.0), Location::parse("/"));
        let mut timers = Timers::new();
        s.set_scroll_y(3010.0);
        assert!(!s.on_scroll(&doc, &mut timers));
        assert_eq!(s.viewport().scroll_y, 3010.0);
    }

    #[test]
    fn idle_debounce_uses_latest_scroll() {
        let doc = doc_with_career(3000.0);
        let mut s = service("/");
        let mut timers = Timers::new();

        s.on_user_scroll_intent();
        s.set_scroll_y(100.0);
        s.on_scroll(&doc, &mut timers);
        drain(&mut s, &mut timers, 100);
        s.set_scroll_y(200.0);
        s.on_scroll(&doc, &mut timers);
        // First timer fires at 120 but is superseded
        drain(&mut s, &mut timers, 150);
        assert!(s.jump_guard().is_user_scrolling());
        drain(&mut s, &mut timers, 220);
        assert!(!s.jump_guard().is_user_scrolling());
    }

    #[test]
    fn post_load_check_returns_to_top() {
        let mut s = service("/");
        let mut timers = Timers::new();
        s.set_scroll_y(900.0);
        s.on_load(&mut timers);
        // A late fragment shows up without the user doing anything
        s.location.hash = "#career".to_string();
        drain(&mut s, &mut timers, 150);
        assert_eq!(s.location().hash, "");
        assert_eq!(s.viewport().scroll_y, 0.0);
    }
}
