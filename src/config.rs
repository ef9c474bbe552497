//! Site behavior configuration.
//!
//! Handles loading, validating, and merging `config.toml`. Every tunable of
//! the behavior layer lives here: the scroll-permission window, header
//! offsets, the anti-jump heuristic, reveal thresholds, counter timing and
//! form endpoints. Stock defaults reproduce the live site.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [locale]
//! default = "ar"              # Locale used when nothing valid is stored
//! storage_key = "language"    # Key in the client key-value store
//!
//! [scroll]
//! permission_window_ms = 600  # Trailing window after an authorized scroll
//! post_load_check_ms = 150    # Second fragment check after load
//! anchor_offset = 80.0        # Offset for in-page anchor links
//! panel_offset = 90.0         # Offset when opening gallery panels
//! header_gap = 10.0           # Added below the measured header height
//! narrow_offset = 70.0        # Fallback offset on narrow viewports
//! wide_offset = 90.0          # Fallback offset on wide viewports
//! narrow_breakpoint = 640.0   # Viewport width below which "narrow" applies
//!
//! [scroll.jump_guard]
//! enabled = true
//! section = "career"          # Section id the page must not snap to
//! threshold_px = 120.0
//! idle_ms = 120               # User-scroll debounce
//!
//! [reveal]
//! threshold = 0.2
//! stat_threshold = 0.5
//! counter_duration_ms = 2000
//! counter_tick_ms = 16
//! hero_stagger_s = 0.12
//! targets = [".hero-title", ".hero-subtitle", ...]
//!
//! [forms]
//! relay_domain = "formsubmit.co"
//! base_url = "http://localhost:5000"
//! contact_endpoint = "/api/contact"
//! career_endpoint = "/api/career"
//! message_clear_ms = 5000
//! timeout_secs = 30
//!
//! [header]
//! scrolled_after = 100.0
//! scroll_top_after = 500.0
//! section_offset = 100.0
//! parallax_factor = 0.5
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [scroll.jump_guard]
//! enabled = false
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::dom::SelectorList;
use crate::locale::Locale;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Behavior configuration loaded from `config.toml`.
///
/// All fields have defaults matching the production site. User config files
/// need only specify the values they want to override.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Locale fallback and persistence key.
    pub locale: LocaleConfig,
    /// Scroll guard timing and offsets.
    pub scroll: ScrollConfig,
    /// Reveal, counter and hero-sequence settings.
    pub reveal: RevealConfig,
    /// Form endpoints and relay detection.
    pub forms: FormsConfig,
    /// Header, nav highlighting and scroll-to-top thresholds.
    pub header: HeaderConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ratio_ok = |v: f64| (0.0..=1.0).contains(&v);
        if !ratio_ok(self.reveal.threshold) || !ratio_ok(self.reveal.stat_threshold) {
            return Err(ConfigError::Validation(
                "reveal thresholds must be within 0.0-1.0".into(),
            ));
        }
        if self.reveal.counter_tick_ms == 0 || self.reveal.counter_duration_ms == 0 {
            return Err(ConfigError::Validation(
                "reveal.counter_tick_ms and reveal.counter_duration_ms must be non-zero".into(),
            ));
        }
        for target in &self.reveal.targets {
            SelectorList::parse(target).map_err(|e| {
                ConfigError::Validation(format!("reveal.targets: '{target}': {e}"))
            })?;
        }
        if self.scroll.permission_window_ms == 0 {
            return Err(ConfigError::Validation(
                "scroll.permission_window_ms must be non-zero".into(),
            ));
        }
        if self.scroll.jump_guard.enabled && self.scroll.jump_guard.section.is_empty() {
            return Err(ConfigError::Validation(
                "scroll.jump_guard.section must not be empty when the guard is enabled".into(),
            ));
        }
        if self.forms.relay_domain.is_empty() {
            return Err(ConfigError::Validation(
                "forms.relay_domain must not be empty".into(),
            ));
        }
        if !self.forms.base_url.starts_with("http://") && !self.forms.base_url.starts_with("https://")
        {
            return Err(ConfigError::Validation(
                "forms.base_url must be an http(s) URL".into(),
            ));
        }
        for endpoint in [&self.forms.contact_endpoint, &self.forms.career_endpoint] {
            if !endpoint.starts_with('/') {
                return Err(ConfigError::Validation(format!(
                    "form endpoint '{endpoint}' must be an absolute path"
                )));
            }
        }
        Ok(())
    }
}

/// Locale fallback and persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LocaleConfig {
    /// Locale used when the store holds nothing usable.
    pub default: Locale,
    /// Key under which the active locale is persisted.
    pub storage_key: String,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            default: Locale::Ar,
            storage_key: "language".to_string(),
        }
    }
}

/// Scroll guard settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScrollConfig {
    /// How long programmatic scrolling stays permitted after the wrapped
    /// action returns, so smooth scrolls can finish.
    pub permission_window_ms: u64,
    /// Delay of the second fragment check after the load event.
    pub post_load_check_ms: u64,
    /// Offset subtracted from a section's top for in-page anchor links.
    pub anchor_offset: f64,
    /// Offset used when scrolling to the project list or gallery panel.
    pub panel_offset: f64,
    /// Gap added below the measured header height for automatic offsets.
    pub header_gap: f64,
    /// Automatic offset on narrow viewports when there is no header.
    pub narrow_offset: f64,
    /// Automatic offset on wide viewports when there is no header.
    pub wide_offset: f64,
    /// Viewport width below which the narrow offset applies.
    pub narrow_breakpoint: f64,
    /// Anti-jump heuristic.
    pub jump_guard: JumpGuardConfig,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            permission_window_ms: 600,
            post_load_check_ms: 150,
            anchor_offset: 80.0,
            panel_offset: 90.0,
            header_gap: 10.0,
            narrow_offset: 70.0,
            wide_offset: 90.0,
            narrow_breakpoint: 640.0,
            jump_guard: JumpGuardConfig::default(),
        }
    }
}

/// Restores the last user scroll position when the page lands next to one
/// section without the user scrolling there.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JumpGuardConfig {
    pub enabled: bool,
    /// Id of the section the page keeps snapping to.
    pub section: String,
    /// Distance from the section top that counts as a jump.
    pub threshold_px: f64,
    /// Quiet time after the last wheel/touch/key event before the user is
    /// considered idle again.
    pub idle_ms: u64,
}

impl Default for JumpGuardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            section: "career".to_string(),
            threshold_px: 120.0,
            idle_ms: 120,
        }
    }
}

/// Reveal animations, stat counters and the hero stagger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RevealConfig {
    /// Selectors whose elements reveal once on entering the viewport.
    pub targets: Vec<String>,
    /// Visible fraction that triggers a reveal.
    pub threshold: f64,
    /// Visible fraction of a stat item that starts its counter.
    pub stat_threshold: f64,
    pub counter_duration_ms: u64,
    pub counter_tick_ms: u64,
    /// Transition delay step between hero items, in seconds.
    pub hero_stagger_s: f64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            targets: default_reveal_targets(),
            threshold: 0.2,
            stat_threshold: 0.5,
            counter_duration_ms: 2000,
            counter_tick_ms: 16,
            hero_stagger_s: 0.12,
        }
    }
}

fn default_reveal_targets() -> Vec<String> {
    [
        ".hero-title",
        ".hero-subtitle",
        ".hero-buttons .btn",
        ".services .section-header .section-title",
        ".services .section-header .section-subtitle",
        ".services .service-card",
        ".projects .project-card .project-overlay .project-info",
        ".divisions .division-title",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Form submission endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormsConfig {
    /// Forms whose action contains this domain submit natively.
    pub relay_domain: String,
    /// Origin the local API paths are resolved against.
    pub base_url: String,
    pub contact_endpoint: String,
    pub career_endpoint: String,
    /// How long the contact status message stays highlighted.
    pub message_clear_ms: u64,
    pub timeout_secs: u64,
}

impl Default for FormsConfig {
    fn default() -> Self {
        Self {
            relay_domain: "formsubmit.co".to_string(),
            base_url: "http://localhost:5000".to_string(),
            contact_endpoint: "/api/contact".to_string(),
            career_endpoint: "/api/career".to_string(),
            message_clear_ms: 5000,
            timeout_secs: 30,
        }
    }
}

/// Header chrome thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeaderConfig {
    /// Scroll offset after which the header gets the `scrolled` class.
    pub scrolled_after: f64,
    /// Scroll offset after which the scroll-to-top button shows.
    pub scroll_top_after: f64,
    /// Look-ahead applied to section tops when highlighting nav links.
    pub section_offset: f64,
    /// Hero video translation per scrolled pixel.
    pub parallax_factor: f64,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            scrolled_after: 100.0,
            scroll_top_after: 500.0,
            section_offset: 100.0,
            parallax_factor: 0.5,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(SiteConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no `config.toml`.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory, on top of the
/// stock defaults.
pub fn load_config(dir: &Path) -> Result<SiteConfig, ConfigError> {
    resolve_config(stock_defaults_value()?, load_raw_config(dir)?)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# rak-site configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Locale
# ---------------------------------------------------------------------------
[locale]
# Locale used when the client store holds nothing (or garbage): "ar" or "en".
default = "ar"

# Key the active locale is persisted under.
storage_key = "language"

# ---------------------------------------------------------------------------
# Scroll guard
# ---------------------------------------------------------------------------
[scroll]
# Programmatic scrolling stays permitted this long after an authorized
# scroll, so smooth scrolls can complete.
permission_window_ms = 600

# Second URL-fragment check after the load event.
post_load_check_ms = 150

# Offsets (px) subtracted from a target's top edge.
anchor_offset = 80.0
panel_offset = 90.0

# Automatic offset: header height + header_gap, or narrow/wide fallbacks
# when the page has no header.
header_gap = 10.0
narrow_offset = 70.0
wide_offset = 90.0
narrow_breakpoint = 640.0

# Restore the last user position when the page lands on `section` without
# the user scrolling there.
[scroll.jump_guard]
enabled = true
section = "career"
threshold_px = 120.0
idle_ms = 120

# ---------------------------------------------------------------------------
# Reveal animations
# ---------------------------------------------------------------------------
[reveal]
threshold = 0.2
stat_threshold = 0.5
counter_duration_ms = 2000
counter_tick_ms = 16
hero_stagger_s = 0.12
targets = [
    ".hero-title",
    ".hero-subtitle",
    ".hero-buttons .btn",
    ".services .section-header .section-title",
    ".services .section-header .section-subtitle",
    ".services .service-card",
    ".projects .project-card .project-overlay .project-info",
    ".divisions .division-title",
]

# ---------------------------------------------------------------------------
# Forms
# ---------------------------------------------------------------------------
[forms]
# Forms whose action points at this domain are submitted natively.
relay_domain = "formsubmit.co"
base_url = "http://localhost:5000"
contact_endpoint = "/api/contact"
career_endpoint = "/api/career"
message_clear_ms = 5000
timeout_secs = 30

# ---------------------------------------------------------------------------
# Header
# ---------------------------------------------------------------------------
[header]
scrolled_after = 100.0
scroll_top_after = 500.0
section_offset = 100.0
parallax_factor = 0.5
"##
}
