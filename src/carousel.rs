//! Partner logo carousel.
//!
//! A horizontally scrollable strip of fixed slides that snaps the nearest
//! slide to the strip's center. "Circular" only in feel: navigation clamps
//! at both ends. Geometry is in strip content coordinates, so a slide's
//! on-screen center is `offset + width / 2 - scroll_left`.
//!
//! Strip scrolling moves an element, not the window, and is therefore not
//! routed through the scroll guard.

use crate::dom::{Document, NodeId};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slide {
    pub offset: f64,
    pub width: f64,
}

impl Slide {
    pub fn new(offset: f64, width: f64) -> Self {
        Self { offset, width }
    }

    fn center(&self) -> f64 {
        self.offset + self.width / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Drag {
    start_x: f64,
    start_scroll: f64,
}

#[derive(Debug, Clone)]
pub struct Carousel {
    track: Option<NodeId>,
    track_width: f64,
    slides: Vec<Slide>,
    scroll_left: f64,
    drag: Option<Drag>,
}

impl Carousel {
    /// Build a strip and snap the first slide into the center.
    pub fn new(track_width: f64, slides: Vec<Slide>) -> Self {
        let mut carousel = Self {
            track: None,
            track_width,
            slides,
            scroll_left: 0.0,
            drag: None,
        };
        carousel.snap_to(0);
        carousel
    }

    /// Read `#partnersTrack` and its children from the page.
    pub fn from_document(doc: &Document) -> Option<Self> {
        let track = doc.by_id("partnersTrack")?;
        let (track_width, slides) = measure(doc, track);
        let mut carousel = Self::new(track_width, slides);
        carousel.track = Some(track);
        Some(carousel)
    }

    pub fn scroll_left(&self) -> f64 {
        self.scroll_left
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    fn max_scroll(&self) -> f64 {
        let end = self
            .slides
            .iter()
            .map(|s| s.offset + s.width)
            .fold(0.0, f64::max);
        (end - self.track_width).max(0.0)
    }

    fn set_scroll(&mut self, left: f64) -> f64 {
        let before = self.scroll_left;
        self.scroll_left = left.clamp(0.0, self.max_scroll());
        self.scroll_left - before
    }

    /// Slide whose center is closest to the strip's visible center; the
    /// first one wins a tie.
    pub fn center_index(&self) -> usize {
        let center = self.scroll_left + self.track_width / 2.0;
        let mut best = 0;
        let mut best_dist = f64::INFINITY;
        for (i, slide) in self.slides.iter().enumerate() {
            let d = (slide.center() - center).abs();
            if d < best_dist {
                best_dist = d;
                best = i;
            }
        }
        best
    }

    /// Center slide `index` (clamped). Returns the scroll actually applied.
    pub fn snap_to(&mut self, index: isize) -> f64 {
        let max_index = self.slides.len().saturating_sub(1) as isize;
        let clamped = index.clamp(0, max_index) as usize;
        let Some(slide) = self.slides.get(clamped) else {
            return 0.0;
        };
        let delta = slide.center() - self.scroll_left - self.track_width / 2.0;
        let applied = self.set_scroll(self.scroll_left + delta);
        trace!(index = clamped, applied, "carousel snap");
        applied
    }

    pub fn next(&mut self) -> f64 {
        let idx = self.center_index() as isize;
        self.snap_to(idx + 1)
    }

    pub fn prev(&mut self) -> f64 {
        let idx = self.center_index() as isize;
        self.snap_to(idx - 1)
    }

    pub fn pointer_down(&mut self, x: f64) {
        self.drag = Some(Drag {
            start_x: x,
            start_scroll: self.scroll_left,
        });
    }

    pub fn pointer_move(&mut self, x: f64) {
        if let Some(drag) = self.drag {
            self.set_scroll(drag.start_scroll - (x - drag.start_x));
        }
    }

    /// End a drag by snapping to whichever slide ended up centered.
    pub fn pointer_up(&mut self) -> Option<f64> {
        self.drag.take()?;
        let idx = self.center_index() as isize;
        Some(self.snap_to(idx))
    }

    /// Re-measure the strip (when bound to a page) and re-snap.
    pub fn on_resize(&mut self, doc: &Document) -> f64 {
        if let Some(track) = self.track {
            let (track_width, slides) = measure(doc, track);
            self.track_width = track_width;
            self.slides = slides;
            self.set_scroll(self.scroll_left);
        }
        let idx = self.center_index() as isize;
        self.snap_to(idx)
    }
}

fn measure(doc: &Document, track: NodeId) -> (f64, Vec<Slide>) {
    let width = doc.element(track).rect.width;
    let slides = doc
        .element(track)
        .children()
        .iter()
        .map(|&child| {
            let rect = doc.element(child).rect;
            Slide::new(rect.left, rect.width)
        })
        .collect();
    (width, slides)
}
