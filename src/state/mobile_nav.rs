//! Mobile Navigation - Collapsible menu panel for narrow viewports
//!
//! The toggle button opens and closes the panel. While open the panel holds
//! the scroll lock. Following a nav link, pressing Escape, or growing the
//! viewport past the desktop breakpoint closes it again.

use crate::config::NavConfig;
use crate::host::Host;
use crate::types::ElementId;

use super::keyboard::KeyboardEvent;
use super::scroll_lock::ScrollLock;

pub struct MobileNav {
    toggle: ElementId,
    panel: ElementId,
    open_class: String,
    desktop_breakpoint: f64,
    open: bool,
}

impl MobileNav {
    /// Returns `None` when the page has no toggle or no panel.
    pub fn mount(host: &mut dyn Host, config: &NavConfig) -> Option<Self> {
        let toggle = host.query(&config.toggle)?;
        let panel = host.query(&config.panel)?;
        host.set_attribute(toggle, "aria-expanded", "false");
        Some(Self {
            toggle,
            panel,
            open_class: config.open_class.clone(),
            desktop_breakpoint: config.desktop_breakpoint,
            open: false,
        })
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn panel(&self) -> ElementId {
        self.panel
    }

    pub fn toggle(&mut self, host: &mut dyn Host, lock: &mut ScrollLock) {
        if self.open {
            self.close(host, lock);
        } else {
            self.open(host, lock);
        }
    }

    pub fn open(&mut self, host: &mut dyn Host, lock: &mut ScrollLock) {
        if self.open {
            return;
        }
        self.open = true;
        self.render(host);
        lock.acquire(host);
    }

    pub fn close(&mut self, host: &mut dyn Host, lock: &mut ScrollLock) {
        if !self.open {
            return;
        }
        self.open = false;
        self.render(host);
        lock.release(host);
    }

    fn render(&self, host: &mut dyn Host) {
        host.set_class(self.panel, &self.open_class, self.open);
        host.set_class(self.toggle, &self.open_class, self.open);
        host.set_attribute(self.toggle, "aria-expanded", if self.open { "true" } else { "false" });
    }

    /// Escape closes an open panel. Returns whether the key was consumed.
    pub fn on_key(&mut self, host: &mut dyn Host, lock: &mut ScrollLock, event: &KeyboardEvent) -> bool {
        if self.open && event.is_press() && event.is("Escape") {
            self.close(host, lock);
            host.focus(self.toggle);
            return true;
        }
        false
    }

    /// Resize broadcast: the desktop layout has no panel to keep open.
    pub fn on_resize(&mut self, host: &mut dyn Host, lock: &mut ScrollLock, viewport_width: f64) {
        if viewport_width >= self.desktop_breakpoint {
            self.close(host, lock);
        }
    }
}
