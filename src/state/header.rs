//! Header State - Fixed header reacting to scroll
//!
//! Tracks two things:
//! - the `scrolled` class once the page moves past a small threshold
//! - the reading-progress bar width as a percentage of scrollable height
//!
//! The header's rendered height is measured here too and published into
//! [`Environment::header_height`], which the section tracker uses for its
//! observer margins.

use crate::config::HeaderConfig;
use crate::env::Environment;
use crate::host::Host;
use crate::types::ElementId;

pub struct HeaderState {
    header: Option<ElementId>,
    progress_bar: Option<ElementId>,
    scrolled_class: String,
    scrolled_threshold: f64,
    scrolled: bool,
    progress: f64,
}

/// Share of the scrollable distance covered at `offset`, in `0.0..=100.0`.
pub fn scroll_progress(offset: f64, document_height: f64, viewport_height: f64) -> f64 {
    let scrollable = document_height - viewport_height;
    if scrollable <= 0.0 {
        return 0.0;
    }
    (offset / scrollable * 100.0).clamp(0.0, 100.0)
}

impl HeaderState {
    pub fn mount(host: &dyn Host, config: &HeaderConfig) -> Self {
        let header = host.query(&config.selector);
        if header.is_none() {
            tracing::debug!(selector = %config.selector, "no header on page");
        }
        Self {
            header,
            progress_bar: host.query(&config.progress_bar),
            scrolled_class: config.scrolled_class.clone(),
            scrolled_threshold: config.scrolled_threshold,
            scrolled: false,
            progress: 0.0,
        }
    }

    /// Measure the header and publish its height. Missing headers measure 0.
    pub fn measure(&self, host: &dyn Host, env: &Environment) -> f64 {
        let height = self.header.map_or(0.0, |header| host.element_size(header).height);
        if env.header_height.get() != height {
            tracing::debug!(height, "header height changed");
            env.header_height.set(height);
        }
        height
    }

    /// Scroll handler: scrolled class and progress bar.
    pub fn on_scroll(&mut self, host: &mut dyn Host) {
        let offset = host.scroll_offset();

        let scrolled = offset > self.scrolled_threshold;
        if scrolled != self.scrolled {
            self.scrolled = scrolled;
            if let Some(header) = self.header {
                host.set_class(header, &self.scrolled_class, scrolled);
            }
        }

        self.progress = scroll_progress(offset, host.document_height(), host.viewport().height);
        if let Some(bar) = self.progress_bar {
            host.set_style(bar, "width", &format!("{:.2}%", self.progress));
        }
    }

    pub fn is_scrolled(&self) -> bool {
        self.scrolled
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }
}
