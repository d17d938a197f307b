//! Site configuration.
//!
//! Every selector, class name and timing the engine relies on lives here so
//! page variants can be described without touching code. All fields have
//! defaults matching the reference page markup; a JSON document only needs
//! to list what differs.
//!
//! # Example
//!
//! ```ignore
//! let config = SiteConfig::from_json(r#"{ "resize_quiet_ms": 150 }"#)?;
//! assert_eq!(config.modal.root, "#lightbox");
//! ```

use serde::{Deserialize, Serialize};

use crate::error::SiteError;

// =============================================================================
// ROOT CONFIG
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Class applied to the body while the scroll lock is held.
    pub scroll_lock_class: String,
    /// Quiet period before a burst of resize signals is broadcast.
    pub resize_quiet_ms: u32,
    pub header: HeaderConfig,
    pub nav: NavConfig,
    pub particles: ParticleConfig,
    pub modal: ModalConfig,
    /// Mouse-following glow element.
    pub pointer_glow: String,
    /// Horizontal gallery pinning, only active above a width.
    pub pin: Option<PinConfig>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            scroll_lock_class: "no-scroll".to_string(),
            resize_quiet_ms: 200,
            header: HeaderConfig::default(),
            nav: NavConfig::default(),
            particles: ParticleConfig::default(),
            modal: ModalConfig::default(),
            pointer_glow: ".cursor-glow".to_string(),
            pin: None,
        }
    }
}

impl SiteConfig {
    /// Parse a (possibly partial) JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, SiteError> {
        Ok(serde_json::from_str(json)?)
    }
}

// =============================================================================
// SECTIONS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderConfig {
    pub selector: String,
    pub scrolled_class: String,
    /// Scroll offset past which the header counts as scrolled.
    pub scrolled_threshold: f64,
    pub progress_bar: String,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            selector: "#site-header".to_string(),
            scrolled_class: "scrolled".to_string(),
            scrolled_threshold: 50.0,
            progress_bar: ".scroll-progress".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// Section ids in page order.
    pub sections: Vec<String>,
    pub link: String,
    pub active_class: String,
    pub toggle: String,
    pub panel: String,
    pub open_class: String,
    /// The mobile panel closes itself once the viewport reaches this width.
    pub desktop_breakpoint: f64,
    /// Fraction of the viewport height cut from the bottom of the
    /// intersection root, as a percentage.
    pub bottom_margin_percent: f64,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            sections: ["hero", "about", "services", "gallery", "contact"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            link: ".nav-link".to_string(),
            active_class: "active".to_string(),
            toggle: ".nav-toggle".to_string(),
            panel: ".nav-menu".to_string(),
            open_class: "open".to_string(),
            desktop_breakpoint: 1024.0,
            bottom_margin_percent: 40.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub canvas: String,
    /// Section whose visibility gates the render loop.
    pub host_section: String,
    /// One particle per this many pixels of viewport width.
    pub width_per_particle: f64,
    pub max_particles: usize,
    /// Fixed RNG seed; entropy is used when absent.
    pub seed: Option<u64>,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            canvas: "#particles".to_string(),
            host_section: "#hero".to_string(),
            width_per_particle: 15.0,
            max_particles: 80,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModalConfig {
    pub root: String,
    pub overlay: String,
    pub image: String,
    pub title: String,
    pub description: String,
    pub counter: String,
    pub close: String,
    pub prev: String,
    pub next: String,
    pub gallery_item: String,
    /// Focusable controls inside the modal, in tab order.
    pub focusable: String,
    pub open_class: String,
    /// Width requested from the image CDN for the full-size view.
    pub high_res_width: u32,
    pub fade_out_secs: f64,
    pub fade_in_secs: f64,
}

impl Default for ModalConfig {
    fn default() -> Self {
        Self {
            root: "#lightbox".to_string(),
            overlay: ".lightbox-overlay".to_string(),
            image: ".lightbox-image".to_string(),
            title: ".lightbox-title".to_string(),
            description: ".lightbox-description".to_string(),
            counter: ".lightbox-counter".to_string(),
            close: ".lightbox-close".to_string(),
            prev: ".lightbox-prev".to_string(),
            next: ".lightbox-next".to_string(),
            gallery_item: ".gallery-item".to_string(),
            focusable: "button, a[href], [tabindex]".to_string(),
            open_class: "active".to_string(),
            high_res_width: 1600,
            fade_out_secs: 0.2,
            fade_in_secs: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinConfig {
    pub section: String,
    pub track: String,
    /// Pinning is active only while the viewport is at least this wide.
    pub min_width: f64,
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            section: ".horizontal-section".to_string(),
            track: ".horizontal-track".to_string(),
            min_width: 1024.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SiteConfig::default();
        assert_eq!(config.resize_quiet_ms, 200);
        assert_eq!(config.nav.sections.len(), 5);
        assert_eq!(config.particles.max_particles, 80);
        assert!(config.pin.is_none());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SiteConfig::from_json(
            r##"{
                "resize_quiet_ms": 150,
                "modal": { "root": "#viewer" },
                "pin": { "min_width": 900 }
            }"##,
        )
        .unwrap();

        assert_eq!(config.resize_quiet_ms, 150);
        assert_eq!(config.modal.root, "#viewer");
        assert_eq!(config.modal.image, ".lightbox-image");
        let pin = config.pin.unwrap();
        assert_eq!(pin.min_width, 900.0);
        assert_eq!(pin.track, ".horizontal-track");
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let err = SiteConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, SiteError::Config(_)));
    }
}
