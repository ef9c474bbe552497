//! # rak-site
//!
//! The behavior layer of the bilingual (Arabic/English) portfolio site of
//! Rafic A. Kreidie Engineers & Contractors: language switching, guarded
//! scrolling, reveal animations, the three-level project gallery, the
//! partners carousel and the contact and career forms.
//!
//! The page is modeled as an in-memory document ([`dom::Document`]) and the
//! browser's timers as a virtual clock ([`timers::Timers`]). A [`site::Site`]
//! owns both plus every component, and is driven by events:
//!
//! ```text
//! Site::new  →  Site::load  →  Site::dispatch(Event) / Site::advance(ms)
//!   │              │                │
//!   │              │                └─ clicks, drags, wheel, keys, hash changes
//!   │              └─ scroll restoration, fragment handling
//!   └─ stored locale, hero sequence, observers, gallery, carousel, forms
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`site`] | Event routing and the shared page context |
//! | [`dom`] | Element tree, classes, attributes, layout boxes, simple selectors |
//! | [`timers`] | Virtual clock and the deferred tasks components schedule |
//! | [`config`] | `config.toml` loading, merging onto stock defaults, validation |
//! | [`locale`] | Active locale, persistence, `data-ar`/`data-en` projection |
//! | [`scroll`] | Permission-gated scrolling and the section jump guard |
//! | [`reveal`] | Intersection observers: reveal animations, stat counters, lazy images |
//! | [`catalog`] | The static project catalog |
//! | [`gallery`] | Categories → projects → images navigation |
//! | [`carousel`] | Partners track snapping and drag gestures |
//! | [`chrome`] | Header state, nav highlighting, mobile menu, scroll-to-top |
//! | [`forms`] | Contact (JSON) and career (multipart) submission |
//! | [`render`] | Maud markup for gallery views |
//! | [`generate`] | Static gallery pages for every state and locale |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Scrolling Is a Privilege
//!
//! Nothing scrolls the window unless a wrapped action (an anchor or nav
//! link click, a gallery panel opening, the scroll-to-top button) granted
//! permission within the last window. Wheel, touch and scroll keys only
//! mark the user as scrolling; they never grant permission. Programmatic
//! scroll requests without permission are dropped, and an unpermitted
//! jump into the guarded section (`career` by default) is undone. Each
//! grant carries a generation number so an older revoke timer never
//! cancels a newer grant.
//!
//! ## One Owner, Borrowed Context
//!
//! Components do not hold references to each other. [`site::Site`] owns
//! them all and lends the document, scroll service, clock and locale to
//! whichever component handles an event, through [`site::Ctx`].
//!
//! ## Static Catalog
//!
//! Projects are compiled in. The gallery never fetches anything, so every
//! state can also be rendered ahead of time by [`generate`].

pub mod carousel;
pub mod catalog;
pub mod chrome;
pub mod config;
pub mod dom;
pub mod forms;
pub mod gallery;
pub mod generate;
pub mod locale;
pub mod output;
pub mod render;
pub mod reveal;
pub mod scroll;
pub mod site;
pub mod timers;

#[cfg(test)]
pub(crate) mod test_helpers;
