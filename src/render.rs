//! Maud rendering of gallery views.
//!
//! Produces the same panel markup the live browser mounts into the page
//! (`#projectBreadcrumb`, `#projectList`, `#galleryContainer`), with real
//! links instead of click handlers so the fragments also work as static
//! pages. Links are relative to the page layout written by
//! [`generate`](crate::generate):
//!
//! ```text
//! gallery/index.html          categories
//! gallery/<key>/index.html    project list
//! gallery/<key>/<n>.html      project images (n is 1-based)
//! ```

use crate::catalog::Category;
use crate::gallery::{CrumbTarget, GalleryView, NavigationState};
use crate::locale::Locale;
use maud::{DOCTYPE, Markup, html};

/// Full HTML document for a gallery view.
pub fn render_page(view: &GalleryView, image_base: &str) -> Markup {
    let title = view
        .breadcrumb
        .last()
        .map(|c| c.label)
        .unwrap_or_default();
    let content = html! {
        @if view.breadcrumb_visible() {
            (render_breadcrumb(view))
        }
        @match view.state {
            NavigationState::Categories => (render_categories(view.locale)),
            NavigationState::Category(_) => (render_project_list(view)),
            NavigationState::Project { .. } => {
                (render_project_list(view))
                (render_gallery(view, image_base))
            }
        }
    };
    base_document(title, view.locale, content)
}

fn base_document(title: &str, locale: Locale, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang=(locale.code()) dir=(locale.direction().as_str()) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
            }
            body {
                main.projects-page {
                    (content)
                }
            }
        }
    }
}

fn crumb_href(target: CrumbTarget, state: NavigationState) -> Option<&'static str> {
    match (target, state) {
        (CrumbTarget::Root, NavigationState::Categories) => None,
        (CrumbTarget::Root, _) => Some("../index.html"),
        (CrumbTarget::Category(_), NavigationState::Project { .. }) => Some("index.html"),
        _ => None,
    }
}

/// Breadcrumb trail; every segment but the current one links upwards.
pub fn render_breadcrumb(view: &GalleryView) -> Markup {
    let last = view.breadcrumb.len().saturating_sub(1);
    html! {
        nav.project-breadcrumb id="projectBreadcrumb" {
            @for (i, crumb) in view.breadcrumb.iter().enumerate() {
                @let kind = match crumb.target {
                    CrumbTarget::Root => "root",
                    CrumbTarget::Category(_) => "category",
                    CrumbTarget::Current => "current",
                };
                @let category = match crumb.target {
                    CrumbTarget::Category(c) => Some(c.key()),
                    _ => None,
                };
                @match crumb_href(crumb.target, view.state) {
                    Some(href) => {
                        a.crumb href=(href) data-crumb=(kind) data-category=[category] { (crumb.label) }
                    }
                    None => {
                        span.crumb data-crumb=(kind) data-category=[category] { (crumb.label) }
                    }
                }
                @if i < last {
                    span.sep { "›" }
                }
            }
        }
    }
}

/// Grid of every category with its project count.
pub fn render_categories(locale: Locale) -> Markup {
    html! {
        div.category-grid {
            @for category in Category::ALL {
                a.category-card href={ (category.key()) "/index.html" } data-category=(category.key()) {
                    span.category-name { (category.label().pick(locale)) }
                    span.category-count { (category.projects().len()) }
                }
            }
        }
    }
}

pub fn render_project_list(view: &GalleryView) -> Markup {
    let current = view.state.project_index();
    html! {
        div.project-list id="projectList" {
            @for item in &view.projects {
                a.project-item.active[current == Some(item.index)]
                    href={ (item.index + 1) ".html" }
                    data-index=(item.index) {
                    (item.label)
                }
            }
        }
    }
}

pub fn render_gallery(view: &GalleryView, image_base: &str) -> Markup {
    html! {
        div.gallery-container id="galleryContainer" {
            @for image in &view.images {
                div.gallery-img {
                    div.gallery-caption { (image.caption) }
                    img src={ (image_base) (image.src) } loading="lazy" decoding="async" alt=(image.caption);
                }
            }
        }
    }
}
