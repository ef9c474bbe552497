//! The gallery driven through the public API: a minimal projects section,
//! real click events, and the locale toggled midway.

use rak_site::catalog::Category;
use rak_site::config::SiteConfig;
use rak_site::dom::{Display, Document, NodeId, Rect};
use rak_site::forms::{FormData, HttpResponse, SubmitError, Transport};
use rak_site::gallery::NavigationState;
use rak_site::locale::MemoryStorage;
use rak_site::scroll::Viewport;
use rak_site::site::{Event, Site};

/// The gallery never submits anything.
struct NoNetwork;

impl Transport for NoNetwork {
    fn post_json(&self, _: &str, _: &serde_json::Value) -> Result<HttpResponse, SubmitError> {
        panic!("unexpected JSON post");
    }

    fn post_multipart(&self, _: &str, _: &FormData) -> Result<HttpResponse, SubmitError> {
        panic!("unexpected multipart post");
    }
}

fn child(doc: &mut Document, parent: NodeId, tag: &str, id: &str, top: f64, height: f64) -> NodeId {
    let node = doc.append_new(parent, tag);
    doc.element_mut(node)
        .set_attr("id", id)
        .set_rect(Rect::new(top, 0.0, 1280.0, height));
    node
}

fn projects_page() -> Document {
    let mut doc = Document::new();
    let body = doc.body();

    let toggle = doc.append_new(body, "button");
    doc.element_mut(toggle).set_attr("id", "langToggle");

    let section = child(&mut doc, body, "section", "projects", 0.0, 2000.0);
    for filter in ["all", "medical"] {
        let button = doc.append_new(section, "button");
        doc.element_mut(button)
            .add_class("filter-btn")
            .set_attr("data-filter", filter);
    }
    for (id, top) in [
        ("projectBreadcrumb", 100.0),
        ("projectList", 200.0),
        ("galleryContainer", 600.0),
    ] {
        let panel = child(&mut doc, section, "div", id, top, 300.0);
        doc.element_mut(panel).display = Display::None;
    }
    doc
}

fn site() -> Site {
    Site::new(
        &SiteConfig::default(),
        projects_page(),
        Box::new(MemoryStorage::new()),
        Box::new(NoNetwork),
        "/",
        Viewport::new(1280.0, 800.0, 2000.0),
    )
}

fn click(site: &mut Site, selector: &str) {
    let target = site
        .doc()
        .query(selector)
        .unwrap_or_else(|| panic!("nothing matches {selector}"));
    site.dispatch(Event::Click { target });
}

fn texts(site: &Site, selector: &str) -> Vec<String> {
    let doc = site.doc();
    doc.query_all(selector)
        .into_iter()
        .map(|n| doc.element(n).text.clone())
        .collect()
}

fn has_class(site: &Site, selector: &str, class: &str) -> bool {
    let doc = site.doc();
    doc.element(doc.query(selector).unwrap()).has_class(class)
}

fn display(site: &Site, id: &str) -> Display {
    let doc = site.doc();
    doc.element(doc.by_id(id).unwrap()).display
}

#[test]
fn medical_category_to_project_and_back() {
    let mut site = site();
    site.load();

    click(&mut site, r#".filter-btn[data-filter="medical"]"#);
    assert_eq!(
        site.gallery().state(),
        NavigationState::Category(Category::Medical)
    );
    assert_eq!(texts(&site, "#projectList .project-item").len(), 5);
    assert_eq!(display(&site, "projectList"), Display::Grid);
    assert_eq!(display(&site, "galleryContainer"), Display::None);
    assert_eq!(texts(&site, "#projectBreadcrumb .crumb"), ["التصنيفات", "طبي"]);

    click(&mut site, r#".project-item[data-index="2"]"#);
    assert_eq!(
        site.gallery().state(),
        NavigationState::Project {
            category: Category::Medical,
            index: 2
        }
    );
    assert_eq!(display(&site, "galleryContainer"), Display::Grid);
    assert_eq!(texts(&site, "#galleryContainer .gallery-img").len(), 1);
    let img = site.doc().query("#galleryContainer img").unwrap();
    assert_eq!(
        site.doc().element(img).attr("src"),
        Some("medical/juffali_medical_center.jpg")
    );
    assert_eq!(site.doc().element(img).attr("loading"), Some("lazy"));

    click(&mut site, "#langToggle");
    assert_eq!(
        texts(&site, "#galleryContainer .gallery-caption"),
        ["Juffali Medical Center"]
    );
    assert_eq!(
        texts(&site, "#projectBreadcrumb .crumb"),
        ["Categories", "Medical", "Juffali Medical Center"]
    );

    click(&mut site, r#".crumb[data-crumb="category"]"#);
    assert_eq!(
        site.gallery().state(),
        NavigationState::Category(Category::Medical)
    );
    assert_eq!(display(&site, "galleryContainer"), Display::None);

    click(&mut site, r#".crumb[data-crumb="root"]"#);
    assert_eq!(site.gallery().state(), NavigationState::Categories);
    assert_eq!(display(&site, "projectList"), Display::None);
    assert_eq!(display(&site, "projectBreadcrumb"), Display::None);
    assert!(has_class(&site, r#".filter-btn[data-filter="all"]"#, "active"));
    assert!(!has_class(&site, r#".filter-btn[data-filter="medical"]"#, "active"));
}

#[test]
fn all_filter_resets_from_project() {
    let mut site = site();
    site.select_project(Category::Medical, 0).unwrap();
    click(&mut site, r#".filter-btn[data-filter="all"]"#);
    assert_eq!(site.gallery().state(), NavigationState::Categories);
    assert_eq!(display(&site, "galleryContainer"), Display::None);
}

#[test]
fn out_of_range_project_keeps_state() {
    let mut site = site();
    site.select_category(Category::Hospitality);
    assert!(site.select_project(Category::Hospitality, 1).is_err());
    assert!(site.select_category_key("aerospace").is_err());
    assert_eq!(
        site.gallery().state(),
        NavigationState::Category(Category::Hospitality)
    );
}
