//! Header chrome: the sticky header's scrolled state, active navigation
//! link, the mobile navigation drawer, the scroll-to-top button, hero
//! parallax and in-page anchor links.

use crate::config::HeaderConfig;
use crate::dom::{Document, NodeId};
use crate::locale::{Locale, TextDirection};
use crate::scroll::{ScrollBehavior, ScrollService};
use crate::timers::Timers;
use tracing::debug;

pub struct Chrome {
    config: HeaderConfig,
    header: Option<NodeId>,
    nav: Option<NodeId>,
    scroll_top: NodeId,
}

impl Chrome {
    /// Bind to the header and navigation, and inject the scroll-to-top
    /// button into the body.
    pub fn setup(doc: &mut Document, config: &HeaderConfig, locale: Locale) -> Self {
        let scroll_top = doc.append_new(doc.body(), "button");
        doc.element_mut(scroll_top)
            .add_class("scroll-top-btn")
            .set_text("↑")
            .set_style("position", "fixed")
            .set_style("bottom", "30px")
            .set_style("opacity", "0");
        let chrome = Self {
            config: config.clone(),
            header: doc.by_id("header"),
            nav: doc.by_id("nav"),
            scroll_top,
        };
        chrome.place_scroll_top(doc, locale);
        chrome
    }

    pub fn scroll_top_button(&self) -> NodeId {
        self.scroll_top
    }

    /// Put the scroll-to-top button on the trailing side for the locale's
    /// reading direction.
    pub fn place_scroll_top(&self, doc: &mut Document, locale: Locale) {
        let el = doc.element_mut(self.scroll_top);
        match locale.direction() {
            TextDirection::Rtl => el.set_style("right", "auto").set_style("left", "30px"),
            TextDirection::Ltr => el.set_style("left", "auto").set_style("right", "30px"),
        };
    }

    /// Everything that follows the window's scroll position.
    pub fn on_scroll(&self, doc: &mut Document, y: f64) {
        if let Some(header) = self.header {
            let el = doc.element_mut(header);
            if y > self.config.scrolled_after {
                el.add_class("scrolled");
            } else {
                el.remove_class("scrolled");
            }
        }

        let opacity = if y > self.config.scroll_top_after { "1" } else { "0" };
        doc.element_mut(self.scroll_top).set_style("opacity", opacity);

        if let Some(hero) = doc.query(".hero-video") {
            let shift = y * self.config.parallax_factor;
            doc.element_mut(hero)
                .set_style("transform", format!("translateY({shift}px)"));
        }

        self.update_active_nav(doc, y);
    }

    /// Highlight the nav link of the section under the header.
    pub fn update_active_nav(&self, doc: &mut Document, y: f64) {
        let links = doc.query_all(".nav-link");
        for section in doc.query_all("section[id]") {
            let el = doc.element(section);
            let Some(id) = el.id() else {
                continue;
            };
            let top = el.rect.top - self.config.section_offset;
            let height = el.rect.height;
            let Some(link) = doc.query(&format!(".nav-link[href=\"#{id}\"]")) else {
                continue;
            };
            if y > top && y <= top + height {
                for &other in &links {
                    doc.element_mut(other).remove_class("active");
                }
                doc.element_mut(link).add_class("active");
            }
        }
    }

    pub fn open_nav(&self, doc: &mut Document) {
        if let Some(nav) = self.nav {
            doc.element_mut(nav).add_class("active");
        }
    }

    pub fn close_nav(&self, doc: &mut Document) {
        if let Some(nav) = self.nav {
            doc.element_mut(nav).remove_class("active");
        }
    }

    /// Handle a click inside the chrome. Returns true when the click was
    /// consumed (default navigation prevented).
    pub fn on_click(
        &self,
        target: NodeId,
        doc: &mut Document,
        scroll: &mut ScrollService,
        timers: &mut Timers,
    ) -> bool {
        if doc.closest(target, "#navToggle").is_some() {
            self.open_nav(doc);
            return true;
        }
        if doc.closest(target, "#navClose").is_some() {
            self.close_nav(doc);
            return true;
        }
        if doc.closest(target, ".scroll-top-btn").is_some() {
            scroll.run_with_permission(timers, |s| s.scroll_to(0.0, ScrollBehavior::Smooth));
            return true;
        }

        if doc.closest(target, ".nav-link").is_some() {
            self.close_nav(doc);
        }
        let Some(anchor) = doc.closest(target, "a[href^=\"#\"]") else {
            return false;
        };
        let href = doc.element(anchor).attr("href").unwrap_or_default().to_string();
        if href.len() <= 1 {
            return false;
        }
        if let Some(section) = doc.query(&href) {
            debug!(%href, "anchor navigation");
            scroll.scroll_to_anchor(doc, timers, section);
        }
        true
    }
}
