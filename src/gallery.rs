//! Project gallery browser.
//!
//! A three-level navigation over the static [`catalog`](crate::catalog):
//!
//! ```text
//! Categories ──select_category──▶ Category(key) ──select_project──▶ Project(key, i)
//!      ▲                              │  ▲                               │
//!      └──────── reset / root crumb ──┘  └──────── category crumb ───────┘
//! ```
//!
//! Each transition renders into three panels of the page (the project
//! list `#projectList`, the image grid `#galleryContainer` and the
//! breadcrumb `#projectBreadcrumb`), then scrolls the freshly opened panel
//! into view through the scroll guard. Panels missing from the page are
//! skipped; the state machine still transitions.
//!
//! Rendering goes through [`GalleryView`], a pure snapshot of what the
//! current state shows in a given locale. The DOM mount, the Maud renderer
//! and the CLI all consume the same view.

use crate::catalog::{Category, ROOT_LABEL, UnknownCategory};
use crate::config::ScrollConfig;
use crate::dom::{Display, Document, NodeId};
use crate::locale::Locale;
use crate::site::Ctx;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GalleryError {
    #[error("unknown category '{0}'")]
    InvalidCategory(String),
    #[error("project index {index} out of range for {category} ({len} projects)")]
    InvalidProjectIndex {
        category: Category,
        index: usize,
        len: usize,
    },
}

impl From<UnknownCategory> for GalleryError {
    fn from(e: UnknownCategory) -> Self {
        GalleryError::InvalidCategory(e.0)
    }
}

/// Where the browser is. A project index is only ever stored alongside its
/// category and is always in range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NavigationState {
    #[default]
    Categories,
    Category(Category),
    Project {
        category: Category,
        index: usize,
    },
}

impl NavigationState {
    /// Breadcrumb depth: 1 at the root, 2 in a category, 3 in a project.
    pub fn depth(&self) -> usize {
        match self {
            NavigationState::Categories => 1,
            NavigationState::Category(_) => 2,
            NavigationState::Project { .. } => 3,
        }
    }

    pub fn category(&self) -> Option<Category> {
        match *self {
            NavigationState::Categories => None,
            NavigationState::Category(category) | NavigationState::Project { category, .. } => {
                Some(category)
            }
        }
    }

    pub fn project_index(&self) -> Option<usize> {
        match *self {
            NavigationState::Project { index, .. } => Some(index),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrumbTarget {
    Root,
    Category(Category),
    /// The trailing project segment; not clickable.
    Current,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crumb {
    pub label: &'static str,
    pub target: CrumbTarget,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectItem {
    pub index: usize,
    pub label: &'static str,
    pub image_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryImage {
    /// URL-encoded source path.
    pub src: String,
    pub caption: &'static str,
}

/// What the browser shows for one state in one locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryView {
    pub state: NavigationState,
    pub locale: Locale,
    pub breadcrumb: Vec<Crumb>,
    pub projects: Vec<ProjectItem>,
    pub images: Vec<GalleryImage>,
}

impl GalleryView {
    pub fn build(state: NavigationState, locale: Locale) -> Self {
        let mut breadcrumb = vec![Crumb {
            label: ROOT_LABEL.pick(locale),
            target: CrumbTarget::Root,
        }];
        let mut projects = Vec::new();
        let mut images = Vec::new();

        if let Some(category) = state.category() {
            breadcrumb.push(Crumb {
                label: category.label().pick(locale),
                target: CrumbTarget::Category(category),
            });
            projects = category
                .projects()
                .iter()
                .enumerate()
                .map(|(index, p)| ProjectItem {
                    index,
                    label: p.name.pick(locale),
                    image_count: p.images.len(),
                })
                .collect();
        }

        if let NavigationState::Project { category, index } = state {
            if let Some(project) = category.project(index) {
                breadcrumb.push(Crumb {
                    label: project.name.pick(locale),
                    target: CrumbTarget::Current,
                });
                images = project
                    .images
                    .iter()
                    .map(|image| GalleryImage {
                        src: encode_uri(image.src),
                        caption: image.caption_for(project, locale),
                    })
                    .collect();
            }
        }

        Self {
            state,
            locale,
            breadcrumb,
            projects,
            images,
        }
    }

    pub fn list_visible(&self) -> bool {
        self.state != NavigationState::Categories
    }

    pub fn gallery_visible(&self) -> bool {
        matches!(self.state, NavigationState::Project { .. })
    }

    pub fn breadcrumb_visible(&self) -> bool {
        self.state != NavigationState::Categories
    }
}

/// Mark the `.filter-btn` for `filter` active and hide project cards
/// outside it.
fn highlight_filter(doc: &mut Document, filter: &str) {
    for button in doc.query_all(".filter-btn") {
        let el = doc.element_mut(button);
        if el.attr("data-filter") == Some(filter) {
            el.add_class("active");
        } else {
            el.remove_class("active");
        }
    }
    for card in doc.query_all(".project-card") {
        let el = doc.element_mut(card);
        if filter == "all" || el.attr("data-category") == Some(filter) {
            el.remove_class("hidden");
        } else {
            el.add_class("hidden");
        }
    }
}

/// Percent-encode like `encodeURI`: reserved URI characters survive,
/// everything else outside the unreserved set is encoded as UTF-8 bytes.
pub fn encode_uri(input: &str) -> String {
    utf8_percent_encode(input, URI).to_string()
}

const URI: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b';')
    .remove(b',')
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'#');

#[derive(Debug, Clone, Copy, Default)]
struct Panels {
    list: Option<NodeId>,
    gallery: Option<NodeId>,
    breadcrumb: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct GalleryBrowser {
    state: NavigationState,
    panels: Panels,
    panel_offset: f64,
}

impl GalleryBrowser {
    /// Bind to the page's panels (any of which may be absent).
    pub fn new(doc: &Document, config: &ScrollConfig) -> Self {
        Self {
            state: NavigationState::Categories,
            panels: Panels {
                list: doc.by_id("projectList"),
                gallery: doc.by_id("galleryContainer"),
                breadcrumb: doc.by_id("projectBreadcrumb"),
            },
            panel_offset: config.panel_offset,
        }
    }

    pub fn state(&self) -> NavigationState {
        self.state
    }

    pub fn view(&self, locale: Locale) -> GalleryView {
        GalleryView::build(self.state, locale)
    }

    /// Open a category's project list.
    pub fn select_category(&mut self, category: Category, cx: &mut Ctx<'_>) {
        self.state = NavigationState::Category(category);
        debug!(%category, "gallery: category selected");
        self.mount(cx.doc, cx.locale);
        if let Some(list) = self.panels.list {
            cx.scroll
                .smooth_scroll_to(cx.doc, cx.timers, list, Some(self.panel_offset));
        }
    }

    /// [`select_category`](Self::select_category) by key.
    pub fn select_category_key(&mut self, key: &str, cx: &mut Ctx<'_>) -> Result<(), GalleryError> {
        let category: Category = key.parse()?;
        self.select_category(category, cx);
        Ok(())
    }

    /// Open a project's image grid.
    pub fn select_project(
        &mut self,
        category: Category,
        index: usize,
        cx: &mut Ctx<'_>,
    ) -> Result<(), GalleryError> {
        let len = category.projects().len();
        if index >= len {
            return Err(GalleryError::InvalidProjectIndex {
                category,
                index,
                len,
            });
        }
        self.state = NavigationState::Project { category, index };
        debug!(%category, index, "gallery: project selected");
        self.mount(cx.doc, cx.locale);
        if let Some(gallery) = self.panels.gallery {
            cx.scroll
                .smooth_scroll_to(cx.doc, cx.timers, gallery, Some(self.panel_offset));
        }
        Ok(())
    }

    /// Back to the category grid; list, gallery and breadcrumb are hidden.
    pub fn reset(&mut self, doc: &mut Document) {
        self.state = NavigationState::Categories;
        for panel in [self.panels.list, self.panels.gallery, self.panels.breadcrumb]
            .into_iter()
            .flatten()
        {
            doc.element_mut(panel).display = Display::None;
        }
    }

    /// Re-render the current state (after a locale change) without
    /// scrolling.
    pub fn refresh(&self, doc: &mut Document, locale: Locale) {
        if self.state != NavigationState::Categories {
            self.mount(doc, locale);
        }
    }

    /// Handle a category filter button (`data-filter`): highlight it, show
    /// only matching project cards, and open or reset the browser.
    pub fn apply_filter(&mut self, filter: &str, cx: &mut Ctx<'_>) -> Result<(), GalleryError> {
        highlight_filter(cx.doc, filter);
        if filter == "all" {
            self.reset(cx.doc);
            Ok(())
        } else {
            self.select_category_key(filter, cx)
        }
    }

    /// Breadcrumb navigation. The root segment behaves like the "all"
    /// filter; the current-project segment does nothing.
    pub fn crumb(&mut self, target: CrumbTarget, cx: &mut Ctx<'_>) {
        match target {
            CrumbTarget::Root => {
                highlight_filter(cx.doc, "all");
                self.reset(cx.doc);
            }
            CrumbTarget::Category(category) => self.select_category(category, cx),
            CrumbTarget::Current => {}
        }
    }

    fn mount(&self, doc: &mut Document, locale: Locale) {
        let view = self.view(locale);
        if let Some(list) = self.panels.list {
            doc.clear_children(list);
            for item in &view.projects {
                let button = doc.append_new(list, "button");
                doc.element_mut(button)
                    .add_class("project-item")
                    .set_attr("data-index", item.index.to_string())
                    .set_text(item.label);
            }
            doc.element_mut(list).display = Display::Grid;
        }
        if let Some(gallery) = self.panels.gallery {
            if view.gallery_visible() {
                doc.clear_children(gallery);
                for image in &view.images {
                    let wrap = doc.append_new(gallery, "div");
                    doc.element_mut(wrap).add_class("gallery-img");
                    let caption = doc.append_new(wrap, "div");
                    doc.element_mut(caption)
                        .add_class("gallery-caption")
                        .set_text(image.caption);
                    let img = doc.append_new(wrap, "img");
                    doc.element_mut(img)
                        .set_attr("src", image.src.clone())
                        .set_attr("loading", "lazy")
                        .set_attr("decoding", "async")
                        .set_attr("alt", image.caption);
                }
                doc.element_mut(gallery).display = Display::Grid;
            } else {
                doc.element_mut(gallery).display = Display::None;
            }
        }
        if let Some(breadcrumb) = self.panels.breadcrumb {
            mount_breadcrumb(doc, breadcrumb, &view);
        }
    }
}

fn mount_breadcrumb(doc: &mut Document, panel: NodeId, view: &GalleryView) {
    doc.clear_children(panel);
    let last = view.breadcrumb.len().saturating_sub(1);
    for (i, crumb) in view.breadcrumb.iter().enumerate() {
        let span = doc.append_new(panel, "span");
        let el = doc.element_mut(span);
        el.add_class("crumb").set_text(crumb.label);
        match crumb.target {
            CrumbTarget::Root => {
                el.set_attr("data-crumb", "root");
            }
            CrumbTarget::Category(category) => {
                el.set_attr("data-crumb", "category")
                    .set_attr("data-category", category.key());
            }
            CrumbTarget::Current => {
                el.set_attr("data-crumb", "current");
            }
        }
        if i < last {
            let sep = doc.append_new(panel, "span");
            doc.element_mut(sep).add_class("sep").set_text("›");
        }
    }
    doc.element_mut(panel).display = Display::Flex;
}
