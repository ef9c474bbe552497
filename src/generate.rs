//! Static gallery generation.
//!
//! Renders every navigation state of the project gallery, in every locale,
//! to standalone HTML pages. Useful for hosting the portfolio on a plain
//! file server and for eyeballing the catalog.
//!
//! ## Output Structure
//!
//! ```text
//! out/
//! ├── ar/
//! │   └── gallery/
//! │       ├── index.html            # Category grid
//! │       ├── commercial/
//! │       │   ├── index.html        # Project list
//! │       │   ├── 1.html            # Project images
//! │       │   └── ...
//! │       └── ...
//! └── en/
//!     └── gallery/
//!         └── ...
//! ```
//!
//! Categories without projects still get an (empty) list page.

use crate::catalog::Category;
use crate::gallery::{GalleryView, NavigationState};
use crate::locale::Locale;
use crate::render;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// What a generation run wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateSummary {
    pub output_dir: PathBuf,
    /// Written files relative to `output_dir`, in write order.
    pub pages: Vec<PathBuf>,
}

impl GenerateSummary {
    pub fn pages_for(&self, locale: Locale) -> usize {
        self.pages
            .iter()
            .filter(|p| p.starts_with(locale.code()))
            .count()
    }
}

/// Every state the browser can reach, in navigation order.
pub fn all_states() -> Vec<NavigationState> {
    let mut states = vec![NavigationState::Categories];
    for category in Category::ALL {
        states.push(NavigationState::Category(category));
        for index in 0..category.projects().len() {
            states.push(NavigationState::Project { category, index });
        }
    }
    states
}

/// Page path of a state, relative to a locale directory.
pub fn page_path(state: NavigationState) -> PathBuf {
    let gallery = PathBuf::from("gallery");
    match state {
        NavigationState::Categories => gallery.join("index.html"),
        NavigationState::Category(category) => gallery.join(category.key()).join("index.html"),
        NavigationState::Project { category, index } => gallery
            .join(category.key())
            .join(format!("{}.html", index + 1)),
    }
}

pub fn generate(
    output_dir: &Path,
    locales: &[Locale],
    image_base: &str,
) -> Result<GenerateSummary, GenerateError> {
    let mut summary = GenerateSummary {
        output_dir: output_dir.to_path_buf(),
        pages: Vec::new(),
    };

    for &locale in locales {
        for state in all_states() {
            let rel = Path::new(locale.code()).join(page_path(state));
            let path = output_dir.join(&rel);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let view = GalleryView::build(state, locale);
            fs::write(&path, render::render_page(&view, image_base).into_string())?;
            debug!(path = %rel.display(), "page written");
            summary.pages.push(rel);
        }
    }

    Ok(summary)
}
