//! The page runtime.
//!
//! [`Site`] owns the document, the virtual clock and every component, and
//! is the only place events enter. It plays the role of the browser's
//! event loop for the behaviors in this crate:
//!
//! ```text
//! Site::new       build components, apply the stored locale, first
//!                 observer pass (DOMContentLoaded)
//! Site::load      scroll restoration + fragment handling (window load)
//! Site::dispatch  route one DOM event to its handlers
//! Site::advance   move the clock, firing due timer tasks in order
//! ```
//!
//! Whenever the window's scroll position changes, for whatever reason, the
//! scroll listeners (jump guard, header chrome, observers) run again until
//! the position is stable, the way a browser keeps firing `scroll` events.

use crate::carousel::Carousel;
use crate::catalog::Category;
use crate::chrome::Chrome;
use crate::config::SiteConfig;
use crate::dom::{Document, NodeId};
use crate::forms::{Form, FormKind, SubmitOutcome, Transport};
use crate::gallery::{CrumbTarget, GalleryBrowser, GalleryError, GalleryView};
use crate::locale::{self, Locale, LocaleError, LocaleStore, Storage};
use crate::reveal::{self, LazyImages, RevealAnimator, StatCounters};
use crate::scroll::{Location, ScrollService, Viewport};
use crate::timers::{TimerTask, Timers};
use tracing::{debug, warn};

/// Upper bound on scroll-listener reruns per event.
const MAX_SETTLE_PASSES: usize = 8;

/// Borrowed view of the shared page state handed to components.
pub struct Ctx<'a> {
    pub doc: &'a mut Document,
    pub scroll: &'a mut ScrollService,
    pub timers: &'a mut Timers,
    pub locale: Locale,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Click { target: NodeId },
    MouseDown { target: NodeId, x: f64 },
    MouseMove { x: f64 },
    MouseUp,
    TouchStart { target: NodeId, x: f64 },
    TouchMove { target: NodeId, x: f64 },
    TouchEnd { target: NodeId },
    Wheel,
    KeyDown,
    /// The window scrolled to `y` (user, browser or anything else).
    Scroll { y: f64 },
    Resize { width: f64, height: f64 },
    HashChange { hash: String },
}

pub struct Site {
    doc: Document,
    timers: Timers,
    scroll: ScrollService,
    locale: LocaleStore,
    reveal: RevealAnimator,
    counters: StatCounters,
    lazy: LazyImages,
    gallery: GalleryBrowser,
    carousel: Option<Carousel>,
    chrome: Chrome,
    contact: Option<Form>,
    career: Option<Form>,
    transport: Box<dyn Transport>,
    settled_y: f64,
}

impl Site {
    pub fn new(
        config: &SiteConfig,
        mut doc: Document,
        storage: Box<dyn Storage>,
        transport: Box<dyn Transport>,
        url: &str,
        viewport: Viewport,
    ) -> Self {
        let scroll = ScrollService::new(&config.scroll, viewport, Location::parse(url));
        let store = LocaleStore::load(storage, &config.locale);
        let current = store.locale();
        locale::apply_locale(&mut doc, current);

        reveal::init_hero_sequence(&mut doc, config.reveal.hero_stagger_s);
        let reveal = RevealAnimator::setup(&mut doc, &config.reveal);
        let counters = StatCounters::setup(&doc, &config.reveal);
        let lazy = LazyImages::setup(&doc);
        let gallery = GalleryBrowser::new(&doc, &config.scroll);
        let carousel = Carousel::from_document(&doc);
        let chrome = Chrome::setup(&mut doc, &config.header, current);
        let contact = Form::bind(&doc, FormKind::Contact, &config.forms);
        let career = Form::bind(&doc, FormKind::Career, &config.forms);

        let mut site = Self {
            doc,
            timers: Timers::new(),
            scroll,
            locale: store,
            reveal,
            counters,
            lazy,
            gallery,
            carousel,
            chrome,
            contact,
            career,
            transport,
            settled_y: viewport.scroll_y,
        };
        let y = site.scroll.viewport().scroll_y;
        site.chrome.update_active_nav(&mut site.doc, y);
        site.observe();
        debug!(locale = %current, "site initialized");
        site
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn doc_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn scroll(&self) -> &ScrollService {
        &self.scroll
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn locale(&self) -> Locale {
        self.locale.locale()
    }

    pub fn gallery(&self) -> &GalleryBrowser {
        &self.gallery
    }

    pub fn gallery_view(&self) -> GalleryView {
        self.gallery.view(self.locale())
    }

    pub fn carousel(&self) -> Option<&Carousel> {
        self.carousel.as_ref()
    }

    pub fn counters(&self) -> &StatCounters {
        &self.counters
    }

    pub fn form(&self, kind: FormKind) -> Option<&Form> {
        match kind {
            FormKind::Contact => self.contact.as_ref(),
            FormKind::Career => self.career.as_ref(),
        }
    }

    pub fn form_mut(&mut self, kind: FormKind) -> Option<&mut Form> {
        match kind {
            FormKind::Contact => self.contact.as_mut(),
            FormKind::Career => self.career.as_mut(),
        }
    }

    /// The window finished loading.
    pub fn load(&mut self) {
        self.scroll.on_load(&mut self.timers);
        let body = self.doc.body();
        self.doc.element_mut(body).add_class("loaded");
        self.settle(false);
    }

    // -------------------------------------------------------------------------
    // Locale
    // -------------------------------------------------------------------------

    pub fn set_locale(&mut self, locale: Locale) {
        self.locale.set_locale(locale, &mut self.doc);
        self.after_locale_change();
    }

    pub fn set_locale_str(&mut self, code: &str) -> Result<(), LocaleError> {
        self.locale.set_locale_str(code, &mut self.doc)?;
        self.after_locale_change();
        Ok(())
    }

    pub fn toggle_locale(&mut self) -> Locale {
        let next = self.locale.toggle_locale(&mut self.doc);
        self.after_locale_change();
        next
    }

    fn after_locale_change(&mut self) {
        let current = self.locale();
        self.gallery.refresh(&mut self.doc, current);
        self.chrome.place_scroll_top(&mut self.doc, current);
    }

    // -------------------------------------------------------------------------
    // Gallery
    // -------------------------------------------------------------------------

    fn gallery_ctx(&mut self) -> (&mut GalleryBrowser, Ctx<'_>) {
        let locale = self.locale.locale();
        (
            &mut self.gallery,
            Ctx {
                doc: &mut self.doc,
                scroll: &mut self.scroll,
                timers: &mut self.timers,
                locale,
            },
        )
    }

    pub fn select_category(&mut self, category: Category) {
        let (gallery, mut cx) = self.gallery_ctx();
        gallery.select_category(category, &mut cx);
        self.settle(false);
    }

    pub fn select_category_key(&mut self, key: &str) -> Result<(), GalleryError> {
        let (gallery, mut cx) = self.gallery_ctx();
        let result = gallery.select_category_key(key, &mut cx);
        self.settle(false);
        result
    }

    pub fn select_project(&mut self, category: Category, index: usize) -> Result<(), GalleryError> {
        let (gallery, mut cx) = self.gallery_ctx();
        let result = gallery.select_project(category, index, &mut cx);
        self.settle(false);
        result
    }

    pub fn reset_gallery(&mut self) {
        self.gallery.reset(&mut self.doc);
        self.settle(false);
    }

    pub fn apply_filter(&mut self, filter: &str) -> Result<(), GalleryError> {
        let (gallery, mut cx) = self.gallery_ctx();
        let result = gallery.apply_filter(filter, &mut cx);
        self.settle(false);
        result
    }

    // -------------------------------------------------------------------------
    // Forms
    // -------------------------------------------------------------------------

    /// Submit a form. `None` if the page has no such form.
    pub fn submit(&mut self, kind: FormKind) -> Option<SubmitOutcome> {
        let locale = self.locale.locale();
        let form = match kind {
            FormKind::Contact => self.contact.as_mut()?,
            FormKind::Career => self.career.as_mut()?,
        };
        Some(form.submit(
            &mut self.doc,
            &mut self.timers,
            self.transport.as_ref(),
            locale,
        ))
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    pub fn dispatch(&mut self, event: Event) {
        match event {
            Event::Click { target } => {
                self.scroll.mark_user_interaction();
                self.on_click(target);
            }
            Event::MouseDown { target, x } => {
                self.scroll.mark_user_interaction();
                if self.in_track(target) {
                    if let Some(carousel) = self.carousel.as_mut() {
                        carousel.pointer_down(x);
                    }
                }
            }
            Event::MouseMove { x } => {
                if let Some(carousel) = self.carousel.as_mut() {
                    carousel.pointer_move(x);
                }
            }
            Event::MouseUp => {
                if let Some(carousel) = self.carousel.as_mut() {
                    carousel.pointer_up();
                }
            }
            Event::TouchStart { target, x } => {
                self.scroll.mark_user_interaction();
                self.scroll.on_user_scroll_intent();
                if self.in_track(target) {
                    if let Some(carousel) = self.carousel.as_mut() {
                        carousel.pointer_down(x);
                    }
                }
            }
            Event::TouchMove { target, x } => {
                self.scroll.on_user_scroll_intent();
                if self.in_track(target) {
                    if let Some(carousel) = self.carousel.as_mut() {
                        carousel.pointer_move(x);
                    }
                }
            }
            Event::TouchEnd { target } => {
                if self.in_track(target) {
                    if let Some(carousel) = self.carousel.as_mut() {
                        carousel.pointer_up();
                    }
                }
            }
            Event::Wheel => self.scroll.on_user_scroll_intent(),
            Event::KeyDown => {
                self.scroll.mark_user_interaction();
                self.scroll.on_user_scroll_intent();
            }
            Event::Scroll { y } => {
                self.scroll.set_scroll_y(y);
                self.settle(true);
                return;
            }
            Event::Resize { width, height } => {
                self.scroll.resize(width, height);
                if let Some(carousel) = self.carousel.as_mut() {
                    carousel.on_resize(&self.doc);
                }
                self.observe();
            }
            Event::HashChange { hash } => {
                self.scroll.on_hash_change(&hash, &mut self.timers);
            }
        }
        self.settle(false);
    }

    fn in_track(&self, target: NodeId) -> bool {
        self.doc.closest(target, "#partnersTrack").is_some()
    }

    fn on_click(&mut self, target: NodeId) {
        if self
            .doc
            .closest(target, "#langToggle, #navLangToggle")
            .is_some()
        {
            self.toggle_locale();
            return;
        }
        if self
            .chrome
            .on_click(target, &mut self.doc, &mut self.scroll, &mut self.timers)
        {
            return;
        }

        let doc = &self.doc;
        if let Some(button) = doc.closest(target, ".filter-btn") {
            let filter = doc.element(button).attr("data-filter").unwrap_or("all").to_string();
            if let Err(e) = self.apply_filter(&filter) {
                warn!(%e, "filter button ignored");
            }
        } else if let Some(card) = doc.closest(target, ".division-card") {
            if let Some(key) = doc.element(card).attr("data-target").map(str::to_string) {
                if let Err(e) = self.select_category_key(&key) {
                    warn!(%e, "division card ignored");
                }
            }
        } else if let Some(item) = doc.closest(target, ".project-item") {
            let index = doc
                .element(item)
                .attr("data-index")
                .and_then(|v| v.parse::<usize>().ok());
            if let (Some(category), Some(index)) = (self.gallery.state().category(), index) {
                if let Err(e) = self.select_project(category, index) {
                    warn!(%e, "project item ignored");
                }
            }
        } else if let Some(crumb) = doc.closest(target, ".crumb") {
            let el = doc.element(crumb);
            let crumb_target = match el.attr("data-crumb") {
                Some("root") => CrumbTarget::Root,
                Some("category") => match el.attr("data-category").and_then(|k| k.parse().ok()) {
                    Some(category) => CrumbTarget::Category(category),
                    None => CrumbTarget::Current,
                },
                _ => CrumbTarget::Current,
            };
            let (gallery, mut cx) = self.gallery_ctx();
            gallery.crumb(crumb_target, &mut cx);
        } else if doc.closest(target, ".partners-carousel .prev").is_some() {
            if let Some(carousel) = self.carousel.as_mut() {
                carousel.prev();
            }
        } else if doc.closest(target, ".partners-carousel .next").is_some() {
            if let Some(carousel) = self.carousel.as_mut() {
                carousel.next();
            }
        } else if doc.closest(target, ".btn-submit").is_some() {
            let kind = FormKind::ALL
                .into_iter()
                .find(|kind| doc.closest(target, &format!("#{}", kind.form_id())).is_some());
            if let Some(kind) = kind {
                self.submit(kind);
            }
        }
    }

    // -------------------------------------------------------------------------
    // Time
    // -------------------------------------------------------------------------

    /// Move the clock forward by `ms`, running every task that comes due.
    pub fn advance(&mut self, ms: u64) {
        let until = self.timers.now() + ms;
        while let Some(task) = self.timers.pop_due(until) {
            self.run_task(task);
            self.settle(false);
        }
        self.timers.set_now(until);
    }

    fn run_task(&mut self, task: TimerTask) {
        match task {
            TimerTask::RevokeScrollPermission { generation } => self.scroll.revoke(generation),
            TimerTask::UserScrollIdle { generation } => self.scroll.user_scroll_idle(generation),
            TimerTask::PostLoadHashCheck => self.scroll.post_load_check(&mut self.timers),
            TimerTask::CounterTick { counter } => {
                self.counters.tick(counter, &mut self.doc, &mut self.timers)
            }
            TimerTask::ClearFormMessage { form, generation } => {
                let form = match form {
                    FormKind::Contact => self.contact.as_ref(),
                    FormKind::Career => self.career.as_ref(),
                };
                if let Some(form) = form {
                    form.clear_message(&mut self.doc, generation);
                }
            }
        }
    }

    // -------------------------------------------------------------------------
    // Scroll listeners
    // -------------------------------------------------------------------------

    /// Run the scroll listeners while the position keeps changing. `force`
    /// runs them at least once.
    fn settle(&mut self, mut force: bool) {
        for _ in 0..MAX_SETTLE_PASSES {
            let y = self.scroll.viewport().scroll_y;
            if !force && y == self.settled_y {
                return;
            }
            force = false;
            self.settled_y = y;
            self.scroll.on_scroll(&self.doc, &mut self.timers);
            self.chrome.on_scroll(&mut self.doc, y);
            self.observe();
        }
    }

    fn observe(&mut self) {
        let viewport = *self.scroll.viewport();
        self.reveal.on_viewport(&mut self.doc, &viewport);
        self.counters
            .on_viewport(&mut self.doc, &viewport, &mut self.timers);
        self.lazy.on_viewport(&mut self.doc, &viewport);
    }
}
