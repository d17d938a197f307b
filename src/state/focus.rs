//! Focus System - Focus trap and focus history for the lightbox
//!
//! - Focus trap: Tab on the last control wraps to the first, Shift+Tab on
//!   the first wraps to the last; everything else is left to the browser
//! - Focus history: where focus was before an overlay opened, restored
//!   when it closes
//!
//! # Example
//!
//! ```ignore
//! let trap = FocusTrap::new(modal_root, "button, a[href], [tabindex]");
//! if trap.handle_tab(&mut host, event.modifiers.shift) {
//!     // wrapped: suppress the browser's default Tab handling
//! }
//! ```

use crate::host::Host;
use crate::types::ElementId;

// =============================================================================
// FOCUS TRAP
// =============================================================================

#[derive(Debug, Clone)]
pub struct FocusTrap {
    container: ElementId,
    selector: String,
}

impl FocusTrap {
    pub fn new(container: ElementId, selector: impl Into<String>) -> Self {
        Self {
            container,
            selector: selector.into(),
        }
    }

    /// Focusable controls inside the container, in document order.
    pub fn focusables(&self, host: &dyn Host) -> Vec<ElementId> {
        host.query_within(self.container, &self.selector)
    }

    /// Apply the wrap rule for a Tab press. Returns `true` when focus was
    /// moved (the default action must then be suppressed).
    pub fn handle_tab(&self, host: &mut dyn Host, shift: bool) -> bool {
        let focusables = self.focusables(host);
        let (Some(&first), Some(&last)) = (focusables.first(), focusables.last()) else {
            return false;
        };
        let active = host.active_element();

        match wrap_target(active, first, last, shift) {
            Some(target) => {
                host.focus(target);
                true
            }
            None => false,
        }
    }
}

/// Where focus wraps to from `active`, if it wraps at all.
fn wrap_target(active: Option<ElementId>, first: ElementId, last: ElementId, shift: bool) -> Option<ElementId> {
    match (shift, active) {
        (true, Some(current)) if current == first => Some(last),
        (false, Some(current)) if current == last => Some(first),
        _ => None,
    }
}

// =============================================================================
// FOCUS HISTORY (for restoration)
// =============================================================================

const MAX_HISTORY: usize = 10;

/// Stack of previously focused elements.
#[derive(Debug, Clone, Default)]
pub struct FocusHistory {
    entries: Vec<ElementId>,
}

impl FocusHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember `element` as the place to return to.
    pub fn save(&mut self, element: ElementId) {
        self.entries.push(element);
        if self.entries.len() > MAX_HISTORY {
            self.entries.remove(0);
        }
    }

    /// Focus the most recently saved element. Returns false if the history
    /// was empty.
    pub fn restore(&mut self, host: &mut dyn Host) -> bool {
        match self.entries.pop() {
            Some(element) => {
                host.focus(element);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================
