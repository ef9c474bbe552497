//! CLI output formatting.
//!
//! Output is **information-centric**: entities are shown by positional
//! index and localized name, with source paths as indented secondary
//! context lines.
//!
//! # Output Format
//!
//! ## Catalog
//!
//! ```text
//! Categories
//! 001 Commercial (7 projects)
//!     001 Boulevard Mall (1 image)
//!         Source: commercial/polivard.jpg
//! 003 Infrastructure (0 projects)
//! ```
//!
//! ## Browse
//!
//! ```text
//! Categories › Medical › Juffali Medical Center
//!
//! Projects
//!     001 Abdelkarim Bakr Medical
//!   * 003 Juffali Medical Center
//!
//! Images
//!     001 Juffali Medical Center
//!         Source: medical/juffali_medical_center.jpg
//! ```
//!
//! ## Generate
//!
//! ```text
//! ar: 42 pages → out/ar/gallery/
//! en: 42 pages → out/en/gallery/
//!
//! Generated 84 pages
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure.

use crate::catalog::Category;
use crate::forms::{FormKind, SubmitOutcome};
use crate::gallery::GalleryView;
use crate::generate::GenerateSummary;
use crate::locale::Locale;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// Catalog
// ============================================================================

pub fn format_catalog(locale: Locale) -> Vec<String> {
    let mut lines = vec!["Categories".to_string()];
    for (ci, category) in Category::ALL.into_iter().enumerate() {
        let projects = category.projects();
        lines.push(format!(
            "{} {} ({})",
            format_index(ci + 1),
            category.label().pick(locale),
            plural(projects.len(), "project")
        ));
        for (pi, project) in projects.iter().enumerate() {
            lines.push(format!(
                "{}{} {} ({})",
                indent(1),
                format_index(pi + 1),
                project.name.pick(locale),
                plural(project.images.len(), "image")
            ));
            for image in project.images {
                lines.push(format!("{}Source: {}", indent(2), image.src));
            }
        }
    }
    lines
}

pub fn print_catalog(locale: Locale) {
    for line in format_catalog(locale) {
        println!("{}", line);
    }
}

// ============================================================================
// Browse
// ============================================================================

pub fn format_view(view: &GalleryView) -> Vec<String> {
    let trail: Vec<&str> = view.breadcrumb.iter().map(|c| c.label).collect();
    let mut lines = vec![trail.join(" › ")];

    if !view.list_visible() {
        for (ci, category) in Category::ALL.into_iter().enumerate() {
            lines.push(format!(
                "{}{} {} [{}]",
                indent(1),
                format_index(ci + 1),
                category.label().pick(view.locale),
                category.key()
            ));
        }
        return lines;
    }

    let current = view.state.project_index();
    lines.push(String::new());
    lines.push("Projects".to_string());
    if view.projects.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for item in &view.projects {
        let marker = if current == Some(item.index) { "  * " } else { "    " };
        lines.push(format!("{}{} {}", marker, format_index(item.index + 1), item.label));
    }

    if view.gallery_visible() {
        lines.push(String::new());
        lines.push("Images".to_string());
        for (i, image) in view.images.iter().enumerate() {
            lines.push(format!("{}{} {}", indent(1), format_index(i + 1), image.caption));
            lines.push(format!("{}Source: {}", indent(2), image.src));
        }
    }
    lines
}

pub fn print_view(view: &GalleryView) {
    for line in format_view(view) {
        println!("{}", line);
    }
}

// ============================================================================
// Generate
// ============================================================================

pub fn format_generate(summary: &GenerateSummary) -> Vec<String> {
    let mut lines = Vec::new();
    for locale in Locale::ALL {
        let count = summary.pages_for(locale);
        if count == 0 {
            continue;
        }
        let dir = summary.output_dir.join(locale.code()).join("gallery");
        lines.push(format!(
            "{}: {} → {}/",
            locale,
            plural(count, "page"),
            dir.display()
        ));
    }
    lines.push(String::new());
    lines.push(format!("Generated {}", plural(summary.pages.len(), "page")));
    lines
}

pub fn print_generate(summary: &GenerateSummary) {
    for line in format_generate(summary) {
        println!("{}", line);
    }
}

// ============================================================================
// Forms
// ============================================================================

pub fn format_submit(kind: FormKind, outcome: &SubmitOutcome, locale: Locale) -> Vec<String> {
    match outcome {
        SubmitOutcome::NativeRelay => vec![
            format!("{kind}: form action points at the relay"),
            format!("{}Submit it from a browser instead.", indent(1)),
        ],
        SubmitOutcome::Sent => vec![
            format!("{kind}: sent"),
            format!("{}{}", indent(1), kind.success_text().pick(locale)),
        ],
        SubmitOutcome::Failed(e) => vec![
            format!("{kind}: failed"),
            format!("{}{}", indent(1), kind.failure_text().pick(locale)),
            format!("{}Error: {}", indent(1), e),
        ],
    }
}

pub fn print_submit(kind: FormKind, outcome: &SubmitOutcome, locale: Locale) {
    for line in format_submit(kind, outcome, locale) {
        println!("{}", line);
    }
}

// ============================================================================
// Locale
// ============================================================================

pub fn format_locale(locale: Locale) -> Vec<String> {
    vec![format!(
        "{} ({})",
        locale,
        locale.direction().as_str()
    )]
}

pub fn print_locale(locale: Locale) {
    for line in format_locale(locale) {
        println!("{}", line);
    }
}
