//! Section Tracker - Navigation state synchronized to scroll position
//!
//! One intersection observer watches every page section. The observer's
//! root margin trims the fixed header off the top of the viewport and the
//! lower 40% off the bottom, so a section only counts as active once it
//! sits in the upper part of the visible area below the header.
//!
//! Margins are fixed per observer instance: when the header height changes
//! the observer is disconnected and rebuilt, never patched.

use spark_signals::{signal, Signal};

use crate::config::NavConfig;
use crate::host::{Host, IntersectionEntry, ObserverOptions};
use crate::types::{ElementId, Length, ObserverHandle, RootMargin};

/// A navigable page region.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub id: String,
    pub element: ElementId,
}

pub struct SectionTracker {
    sections: Vec<Section>,
    link_selector: String,
    active_class: String,
    bottom_margin_percent: f64,
    observer: Option<ObserverHandle>,
    observed_header_height: Option<f64>,
    active: Signal<Option<String>>,
}

impl SectionTracker {
    /// Resolve the configured section ids. Sections missing from the page
    /// are skipped.
    pub fn new(host: &dyn Host, config: &NavConfig) -> Self {
        let sections = config
            .sections
            .iter()
            .filter_map(|id| match host.query(&format!("#{}", id)) {
                Some(element) => Some(Section {
                    id: id.clone(),
                    element,
                }),
                None => {
                    tracing::debug!(section = %id, "section not on page, skipping");
                    None
                }
            })
            .collect();

        Self {
            sections,
            link_selector: config.link.clone(),
            active_class: config.active_class.clone(),
            bottom_margin_percent: config.bottom_margin_percent,
            observer: None,
            observed_header_height: None,
            active: signal(None),
        }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Observer configuration for a given header height.
    pub fn observer_options(&self, header_height: f64) -> ObserverOptions {
        ObserverOptions {
            root_margin: RootMargin {
                top: Length::Px(-header_height),
                right: Length::Px(0.0),
                bottom: Length::Percent(-self.bottom_margin_percent),
                left: Length::Px(0.0),
            },
            threshold: 0.0,
        }
    }

    /// Start observing with margins derived from `header_height`.
    pub fn start(&mut self, host: &mut dyn Host, header_height: f64) {
        if self.sections.is_empty() {
            return;
        }
        if let Some(observer) = self.observer.take() {
            host.disconnect(observer);
        }
        let targets: Vec<ElementId> = self.sections.iter().map(|s| s.element).collect();
        let options = self.observer_options(header_height);
        self.observer = Some(host.observe(&targets, options));
        self.observed_header_height = Some(header_height);
        tracing::debug!(header_height, sections = targets.len(), "section observer started");
    }

    /// Resize broadcast: rebuild the observer only if the header height
    /// changed. Returns whether a rebuild happened.
    pub fn on_resize(&mut self, host: &mut dyn Host, header_height: f64) -> bool {
        match self.observed_header_height {
            Some(previous) if previous == header_height => false,
            None => false,
            Some(_) => {
                self.start(host, header_height);
                true
            }
        }
    }

    /// Whether an intersection batch belongs to this tracker.
    pub fn owns(&self, observer: ObserverHandle) -> bool {
        self.observer == Some(observer)
    }

    pub fn observer(&self) -> Option<ObserverHandle> {
        self.observer
    }

    /// Apply an observation batch: toggle the matching nav link for every
    /// entry, in entry order.
    pub fn on_entries(&mut self, host: &mut dyn Host, entries: &[IntersectionEntry]) {
        for entry in entries {
            let Some(section) = self.sections.iter().find(|s| s.element == entry.target) else {
                continue;
            };
            let selector = format!("{}[href=\"#{}\"]", self.link_selector, section.id);
            for link in host.query_all(&selector) {
                host.set_class(link, &self.active_class, entry.is_intersecting);
            }
            if entry.is_intersecting {
                self.active.set(Some(section.id.clone()));
            } else if self.active.get().as_deref() == Some(section.id.as_str()) {
                self.active.set(None);
            }
        }
    }

    /// Id of the most recently activated section.
    pub fn active_section(&self) -> Option<String> {
        self.active.get()
    }

    pub fn active_signal(&self) -> Signal<Option<String>> {
        self.active.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::fixture::{brochure_page, BrochurePage, HEADER_HEIGHT};
    use crate::host::MemoryHost;
    use crate::types::Viewport;

    fn setup() -> (MemoryHost, BrochurePage, SectionTracker) {
        let (mut host, page) = brochure_page(Viewport::new(1280.0, 800.0), 3);
        let mut tracker = SectionTracker::new(&host, &NavConfig::default());
        tracker.start(&mut host, HEADER_HEIGHT);
        (host, page, tracker)
    }

    fn entry(target: ElementId, is_intersecting: bool) -> IntersectionEntry {
        IntersectionEntry {
            target,
            is_intersecting,
        }
    }

    #[test]
    fn test_observer_margins() {
        let (host, _, tracker) = setup();
        let observer = tracker.observer().unwrap();
        let record = &host.observers()[&observer];
        assert_eq!(record.targets.len(), 5);
        assert_eq!(record.options.root_margin.to_string(), "-72px 0px -40% 0px");
    }

    #[test]
    fn test_entries_toggle_matching_link() {
        let (mut host, page, mut tracker) = setup();

        tracker.on_entries(&mut host, &[entry(page.sections[1], true)]);
        assert!(host.has_class(page.nav_links[1], "active"));
        assert!(!host.has_class(page.nav_links[0], "active"));
        assert_eq!(tracker.active_section().as_deref(), Some("about"));

        tracker.on_entries(
            &mut host,
            &[entry(page.sections[1], false), entry(page.sections[2], true)],
        );
        assert!(!host.has_class(page.nav_links[1], "active"));
        assert!(host.has_class(page.nav_links[2], "active"));
        assert_eq!(tracker.active_section().as_deref(), Some("services"));
    }

    #[test]
    fn test_rebuild_only_on_header_change() {
        let (mut host, _, mut tracker) = setup();
        let first = tracker.observer().unwrap();

        assert!(!tracker.on_resize(&mut host, HEADER_HEIGHT));
        assert_eq!(tracker.observer(), Some(first));

        assert!(tracker.on_resize(&mut host, 96.0));
        let second = tracker.observer().unwrap();
        assert_ne!(first, second);
        assert_eq!(host.observers().len(), 1);
        assert_eq!(
            host.observers()[&second].options.root_margin.to_string(),
            "-96px 0px -40% 0px"
        );
        assert!(tracker.owns(second));
        assert!(!tracker.owns(first));
    }

    #[test]
    fn test_missing_sections_are_skipped() {
        let (mut host, _) = brochure_page(Viewport::new(1280.0, 800.0), 0);
        let config = NavConfig {
            sections: vec!["about".into(), "pricing".into()],
            ..NavConfig::default()
        };
        let mut tracker = SectionTracker::new(&host, &config);
        assert_eq!(tracker.sections().len(), 1);

        let empty = NavConfig {
            sections: vec!["pricing".into()],
            ..NavConfig::default()
        };
        let mut nothing = SectionTracker::new(&host, &empty);
        nothing.start(&mut host, HEADER_HEIGHT);
        assert!(nothing.observer().is_none());

        tracker.start(&mut host, HEADER_HEIGHT);
        assert!(tracker.observer().is_some());
    }
}
