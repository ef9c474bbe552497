//! Shared test utilities for the rak-site test suite.
//!
//! Provides a page skeleton with every element the components bind to, a
//! gallery fixture that lends out a [`Ctx`], and a recording [`Transport`].
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let mut fx = PageFixture::new();
//! fx.with_ctx(|gallery, cx| gallery.select_category(Category::Medical, cx));
//! assert_eq!(fx.display("projectList"), Display::Grid);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use crate::catalog::Category;
use crate::config::ScrollConfig;
use crate::dom::{Display, Document, NodeId, Rect};
use crate::forms::{FormData, FormKind, HttpResponse, SubmitError, Transport};
use crate::gallery::{GalleryBrowser, NavigationState};
use crate::locale::Locale;
use crate::scroll::{Location, ScrollService, Viewport};
use crate::site::Ctx;
use crate::timers::Timers;

// =========================================================================
// Page skeleton
// =========================================================================

pub const PAGE_WIDTH: f64 = 1280.0;
pub const PAGE_HEIGHT: f64 = 6200.0;

pub fn page_viewport() -> Viewport {
    Viewport::new(PAGE_WIDTH, 800.0, PAGE_HEIGHT)
}

fn el(doc: &mut Document, parent: NodeId, tag: &str, classes: &[&str]) -> NodeId {
    let node = doc.append_new(parent, tag);
    for class in classes {
        doc.element_mut(node).add_class(class);
    }
    node
}

fn section(doc: &mut Document, id: &str, class: &str, top: f64, height: f64) -> NodeId {
    let body = doc.body();
    let node = el(doc, body, "section", &[class]);
    doc.element_mut(node)
        .set_attr("id", id)
        .set_rect(Rect::new(top, 0.0, PAGE_WIDTH, height));
    node
}

fn bilingual(doc: &mut Document, node: NodeId, ar: &str, en: &str) {
    doc.element_mut(node)
        .set_attr("data-ar", ar)
        .set_attr("data-en", en)
        .set_text(ar);
}

fn field(doc: &mut Document, form: NodeId, tag: &str, name: &str) -> NodeId {
    let node = doc.append_new(form, tag);
    doc.element_mut(node).set_attr("name", name);
    node
}

/// A one-page site laid out top to bottom:
///
/// ```text
///     0  #home      hero title/subtitle/buttons, .hero-video
///   900  #about     two stat items (35, 500), a lazy image
///  1600  #services  section header, three service cards
///  2400  #projects  filter buttons, cards, division cards, gallery panels
///  4000  #partners  carousel: 400px track, five 200px slides
///  4400  #career    career form
///  5300  #contact   contact form
/// ```
pub fn site_page() -> Document {
    let mut doc = Document::new();
    let body = doc.body();

    // Header
    let header = el(&mut doc, body, "header", &[]);
    doc.element_mut(header)
        .set_attr("id", "header")
        .set_rect(Rect::new(0.0, 0.0, PAGE_WIDTH, 80.0));
    let nav = el(&mut doc, header, "nav", &[]);
    doc.element_mut(nav).set_attr("id", "nav");
    for (id, ar, en) in [
        ("home", "الرئيسية", "Home"),
        ("about", "من نحن", "About"),
        ("projects", "المشاريع", "Projects"),
        ("career", "الوظائف", "Careers"),
        ("contact", "اتصل بنا", "Contact"),
    ] {
        let link = el(&mut doc, nav, "a", &["nav-link"]);
        doc.element_mut(link).set_attr("href", format!("#{id}"));
        bilingual(&mut doc, link, ar, en);
    }
    let close = el(&mut doc, nav, "button", &[]);
    doc.element_mut(close).set_attr("id", "navClose");
    let toggle = el(&mut doc, header, "button", &[]);
    doc.element_mut(toggle).set_attr("id", "navToggle");
    let lang = el(&mut doc, header, "button", &["lang-toggle"]);
    doc.element_mut(lang).set_attr("id", "langToggle");
    bilingual(&mut doc, lang, "EN", "ع");

    // Hero
    let home = section(&mut doc, "home", "hero", 0.0, 900.0);
    el(&mut doc, home, "div", &["hero-video"]);
    let title = el(&mut doc, home, "h1", &["hero-title"]);
    doc.element_mut(title).set_rect(Rect::new(200.0, 0.0, 800.0, 80.0));
    bilingual(&mut doc, title, "نبني التميز", "Building Excellence");
    let subtitle = el(&mut doc, home, "p", &["hero-subtitle"]);
    doc.element_mut(subtitle).set_rect(Rect::new(300.0, 0.0, 800.0, 40.0));
    let buttons = el(&mut doc, home, "div", &["hero-buttons"]);
    for _ in 0..2 {
        let btn = el(&mut doc, buttons, "a", &["btn"]);
        doc.element_mut(btn).set_rect(Rect::new(400.0, 0.0, 160.0, 48.0));
    }

    // About
    let about = section(&mut doc, "about", "about", 900.0, 700.0);
    for count in ["35", "500"] {
        let item = el(&mut doc, about, "div", &["stat-item"]);
        doc.element_mut(item).set_rect(Rect::new(1200.0, 0.0, 200.0, 100.0));
        let number = el(&mut doc, item, "span", &["stat-number"]);
        doc.element_mut(number).set_attr("data-count", count).set_text("0");
    }
    let img = el(&mut doc, about, "img", &["lazy"]);
    doc.element_mut(img)
        .set_attr("data-src", "images/team.jpg")
        .set_rect(Rect::new(1000.0, 0.0, 400.0, 200.0));

    // Services
    let services = section(&mut doc, "services", "services", 1600.0, 800.0);
    let head = el(&mut doc, services, "div", &["section-header"]);
    let st = el(&mut doc, head, "h2", &["section-title"]);
    doc.element_mut(st).set_rect(Rect::new(1650.0, 0.0, 600.0, 60.0));
    for i in 0..3 {
        let card = el(&mut doc, services, "div", &["service-card"]);
        doc.element_mut(card)
            .set_rect(Rect::new(1800.0, i as f64 * 400.0, 380.0, 400.0));
    }

    // Projects
    let projects = section(&mut doc, "projects", "projects", 2400.0, 1600.0);
    let filters = el(&mut doc, projects, "div", &["project-filters"]);
    let all = el(&mut doc, filters, "button", &["filter-btn", "active"]);
    doc.element_mut(all).set_attr("data-filter", "all");
    for category in Category::ALL {
        let btn = el(&mut doc, filters, "button", &["filter-btn"]);
        doc.element_mut(btn).set_attr("data-filter", category.key());
        let card = el(&mut doc, projects, "div", &["project-card"]);
        doc.element_mut(card).set_attr("data-category", category.key());
    }
    let divisions = el(&mut doc, projects, "div", &["divisions"]);
    for key in ["commercial", "industrial"] {
        let card = el(&mut doc, divisions, "div", &["division-card"]);
        doc.element_mut(card).set_attr("data-target", key);
        el(&mut doc, card, "h3", &["division-title"]);
    }
    let crumbs = el(&mut doc, projects, "nav", &["project-breadcrumb"]);
    doc.element_mut(crumbs)
        .set_attr("id", "projectBreadcrumb")
        .set_rect(Rect::new(2500.0, 0.0, PAGE_WIDTH, 40.0))
        .display = Display::None;
    let list = el(&mut doc, projects, "div", &["project-list"]);
    doc.element_mut(list)
        .set_attr("id", "projectList")
        .set_rect(Rect::new(2600.0, 0.0, PAGE_WIDTH, 300.0))
        .display = Display::None;
    let gallery = el(&mut doc, projects, "div", &["gallery-container"]);
    doc.element_mut(gallery)
        .set_attr("id", "galleryContainer")
        .set_rect(Rect::new(2950.0, 0.0, PAGE_WIDTH, 600.0))
        .display = Display::None;

    // Partners
    let partners = section(&mut doc, "partners", "partners", 4000.0, 400.0);
    let carousel = el(&mut doc, partners, "div", &["partners-carousel"]);
    el(&mut doc, carousel, "button", &["prev"]);
    let track = el(&mut doc, carousel, "div", &["partners-track"]);
    doc.element_mut(track)
        .set_attr("id", "partnersTrack")
        .set_rect(Rect::new(4100.0, 0.0, 400.0, 100.0));
    for i in 0..5 {
        let slide = el(&mut doc, track, "div", &["partner"]);
        doc.element_mut(slide)
            .set_rect(Rect::new(4100.0, i as f64 * 200.0, 200.0, 100.0));
    }
    el(&mut doc, carousel, "button", &["next"]);

    // Career
    let career = section(&mut doc, "career", "career", 4400.0, 900.0);
    let form = el(&mut doc, career, "form", &["career-form"]);
    doc.element_mut(form).set_attr("id", "careerForm").set_attr("action", "");
    for name in ["full_name", "email", "phone"] {
        field(&mut doc, form, "input", name);
    }
    let position = field(&mut doc, form, "select", "position");
    doc.element_mut(position).set_attr("value", "engineer");
    let cv = field(&mut doc, form, "input", "cv");
    doc.element_mut(cv).set_attr("type", "file");
    let submit = el(&mut doc, form, "button", &["btn-submit"]);
    doc.element_mut(submit).set_attr("type", "submit").set_text("Apply");
    let message = el(&mut doc, career, "div", &["form-message"]);
    doc.element_mut(message).set_attr("id", "careerFormMessage");

    // Contact
    let contact = section(&mut doc, "contact", "contact", 5300.0, 900.0);
    let form = el(&mut doc, contact, "form", &["contact-form"]);
    doc.element_mut(form).set_attr("id", "contactForm").set_attr("action", "");
    field(&mut doc, form, "input", "company_name");
    let services = field(&mut doc, form, "select", "services");
    for (ar, en) in [("تصميم", "Design"), ("تنفيذ", "Construction")] {
        let option = el(&mut doc, services, "option", &[]);
        bilingual(&mut doc, option, ar, en);
    }
    for name in ["contact_name", "email"] {
        field(&mut doc, form, "input", name);
    }
    field(&mut doc, form, "textarea", "message");
    let submit = el(&mut doc, form, "button", &["btn-submit"]);
    doc.element_mut(submit).set_attr("type", "submit").set_text("Send");
    let message = el(&mut doc, contact, "div", &["form-message"]);
    doc.element_mut(message).set_attr("id", "formMessage");

    doc
}

/// The site page with the given form's `action` attribute replaced.
pub fn form_page(kind: FormKind, action: &str) -> Document {
    let mut doc = site_page();
    if let Some(form) = doc.by_id(kind.form_id()) {
        doc.element_mut(form).set_attr("action", action);
    }
    doc
}

// =========================================================================
// Gallery fixture
// =========================================================================

/// Document, scroll service, clock and gallery browser, ready to be lent
/// to component methods as a [`Ctx`].
pub struct PageFixture {
    pub doc: Document,
    pub scroll: ScrollService,
    pub timers: Timers,
    pub gallery: GalleryBrowser,
    pub locale: Locale,
}

impl PageFixture {
    pub fn new() -> Self {
        Self::with_document(site_page())
    }

    pub fn with_document(doc: Document) -> Self {
        let config = ScrollConfig::default();
        let gallery = GalleryBrowser::new(&doc, &config);
        Self {
            doc,
            scroll: ScrollService::new(&config, page_viewport(), Location::parse("/")),
            timers: Timers::new(),
            gallery,
            locale: Locale::Ar,
        }
    }

    pub fn ctx(&mut self) -> Ctx<'_> {
        Ctx {
            doc: &mut self.doc,
            scroll: &mut self.scroll,
            timers: &mut self.timers,
            locale: self.locale,
        }
    }

    pub fn with_ctx<R>(&mut self, f: impl FnOnce(&mut GalleryBrowser, &mut Ctx<'_>) -> R) -> R {
        let mut cx = Ctx {
            doc: &mut self.doc,
            scroll: &mut self.scroll,
            timers: &mut self.timers,
            locale: self.locale,
        };
        f(&mut self.gallery, &mut cx)
    }

    pub fn state(&self) -> NavigationState {
        self.gallery.state()
    }

    pub fn display(&self, id: &str) -> Display {
        let node = self.doc.by_id(id).unwrap_or_else(|| panic!("no #{id}"));
        self.doc.element(node).display
    }

    /// Text of every element matching `selector`, in document order.
    pub fn texts(&self, selector: &str) -> Vec<String> {
        self.doc
            .query_all(selector)
            .into_iter()
            .map(|n| self.doc.element(n).text.clone())
            .collect()
    }
}

// =========================================================================
// Transport double
// =========================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Json { path: String, body: serde_json::Value },
    Multipart { path: String, data: FormData },
}

/// Answers every request with one canned response and records it.
/// Clones share the call log.
#[derive(Clone)]
pub struct RecordingTransport {
    response: HttpResponse,
    calls: Rc<RefCell<Vec<RecordedCall>>>,
}

impl RecordingTransport {
    pub fn ok() -> Self {
        Self::respond(200, r#"{"success":true}"#)
    }

    pub fn respond(status: u16, body: &str) -> Self {
        Self {
            response: HttpResponse {
                status,
                body: body.to_string(),
            },
            calls: Rc::default(),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }
}

impl Transport for RecordingTransport {
    fn post_json(&self, path: &str, body: &serde_json::Value) -> Result<HttpResponse, SubmitError> {
        self.calls.borrow_mut().push(RecordedCall::Json {
            path: path.to_string(),
            body: body.clone(),
        });
        Ok(self.response.clone())
    }

    fn post_multipart(&self, path: &str, data: &FormData) -> Result<HttpResponse, SubmitError> {
        self.calls.borrow_mut().push(RecordedCall::Multipart {
            path: path.to_string(),
            data: data.clone(),
        });
        Ok(self.response.clone())
    }
}
