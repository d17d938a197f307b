//! Host Module - The page the engine runs against
//!
//! The engine never talks to a browser directly. Everything it reads
//! (elements, attributes, sizes, scroll offset) and everything it writes
//! (classes, attributes, styles, focus, canvas frames) goes through the
//! [`Host`] trait. Scheduling (timers, animation frames) is split into
//! [`Scheduler`] so leaf components can depend on it alone.
//!
//! Asynchronous host activity (a timer firing, a frame callback, an
//! intersection batch, an image finishing loading) comes back into the
//! engine as a [`crate::pipeline::SiteEvent`].
//!
//! - [`memory::MemoryHost`] - headless document with a virtual clock
//! - `web::WebHost` - browser binding (feature `web`)

pub mod fixture;
pub mod memory;
#[cfg(feature = "web")]
pub mod web;

use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::Hash;
use std::rc::Rc;

use crate::types::{
    ElementId, FrameHandle, ObserverHandle, RootMargin, Rgba, Size, TimerHandle, Viewport,
};

pub use memory::MemoryHost;

// =============================================================================
// SCHEDULER
// =============================================================================

/// Cancellable timers and animation frames.
pub trait Scheduler {
    /// Schedule a one-shot timer; it comes back as `SiteEvent::Timer`.
    fn set_timeout(&mut self, delay_ms: u32) -> TimerHandle;

    /// Cancel a timer. Unknown or already fired handles are ignored.
    fn clear_timeout(&mut self, handle: TimerHandle);

    /// Request a frame callback; it comes back as `SiteEvent::Frame`.
    fn request_frame(&mut self) -> FrameHandle;

    /// Cancel a frame request. Unknown or already fired handles are ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Host-side ids of scheduled callbacks that have not run yet.
///
/// Clones share one table, so a callback can settle its own entry when it
/// fires. Only pending callbacks are held; the table does not grow with
/// the number of callbacks ever scheduled.
pub struct PendingCallbacks<K> {
    ids: Rc<RefCell<HashMap<K, i32>>>,
}

impl<K> Clone for PendingCallbacks<K> {
    fn clone(&self) -> Self {
        Self {
            ids: Rc::clone(&self.ids),
        }
    }
}

impl<K> Default for PendingCallbacks<K> {
    fn default() -> Self {
        Self {
            ids: Rc::new(RefCell::new(HashMap::new())),
        }
    }
}

impl<K: Eq + Hash> PendingCallbacks<K> {
    pub fn insert(&self, key: K, id: i32) {
        self.ids.borrow_mut().insert(key, id);
    }

    /// The callback for `key` ran. Returns whether it was still pending.
    pub fn settle(&self, key: &K) -> bool {
        self.ids.borrow_mut().remove(key).is_some()
    }

    /// Remove `key`, returning the host id to cancel.
    pub fn take(&self, key: &K) -> Option<i32> {
        self.ids.borrow_mut().remove(key)
    }

    pub fn len(&self) -> usize {
        self.ids.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.borrow().is_empty()
    }
}

// =============================================================================
// OBSERVERS
// =============================================================================

/// Intersection observer configuration. The root is always the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverOptions {
    pub root_margin: RootMargin,
    pub threshold: f64,
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self {
            root_margin: RootMargin::default(),
            threshold: 0.0,
        }
    }
}

/// One element's intersection state change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub target: ElementId,
    pub is_intersecting: bool,
}

// =============================================================================
// DRAWING
// =============================================================================

/// A single 2D drawing instruction for a canvas surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawOp {
    /// Clear the whole surface.
    Clear,
    /// Filled circle.
    Circle { x: f64, y: f64, radius: f64, color: Rgba },
}

// =============================================================================
// HOST
// =============================================================================

/// Everything the engine needs from the page.
///
/// Lookups return `Option`/empty collections; a missing element is a
/// configuration state, never a fault.
pub trait Host: Scheduler {
    // --- queries --------------------------------------------------------

    /// First element matching `selector` in document order.
    fn query(&self, selector: &str) -> Option<ElementId>;

    /// All elements matching `selector` in document order.
    fn query_all(&self, selector: &str) -> Vec<ElementId>;

    /// Descendants of `root` matching `selector` in document order.
    fn query_within(&self, root: ElementId, selector: &str) -> Vec<ElementId>;

    /// Nearest inclusive ancestor of `element` matching `selector`.
    fn closest(&self, element: ElementId, selector: &str) -> Option<ElementId>;

    /// Parent element, `None` at the document root.
    fn parent(&self, element: ElementId) -> Option<ElementId>;

    /// The document body.
    fn body(&self) -> Option<ElementId>;

    fn attribute(&self, element: ElementId, name: &str) -> Option<String>;

    /// Rendered box size of an element.
    fn element_size(&self, element: ElementId) -> Size;

    fn viewport(&self) -> Viewport;

    fn scroll_offset(&self) -> f64;

    /// Total scrollable height of the document.
    fn document_height(&self) -> f64;

    fn active_element(&self) -> Option<ElementId>;

    // --- write-only projections ----------------------------------------

    fn set_class(&mut self, element: ElementId, class: &str, on: bool);

    fn set_attribute(&mut self, element: ElementId, name: &str, value: &str);

    fn set_style(&mut self, element: ElementId, property: &str, value: &str);

    fn set_text(&mut self, element: ElementId, text: &str);

    fn focus(&mut self, element: ElementId);

    // --- observers ------------------------------------------------------

    /// Observe `targets`; batches come back as `SiteEvent::Intersection`.
    fn observe(&mut self, targets: &[ElementId], options: ObserverOptions) -> ObserverHandle;

    fn disconnect(&mut self, observer: ObserverHandle);

    // --- images ---------------------------------------------------------

    /// Assign an image source. Returns `true` when the resource is already
    /// fully loaded at the moment of assignment (cached resources do not
    /// reliably signal readiness again).
    fn set_image_source(&mut self, image: ElementId, src: &str) -> bool;

    /// Attach a readiness listener; readiness comes back as
    /// `SiteEvent::ImageReady` carrying `token`.
    fn watch_image(&mut self, image: ElementId, token: u64);

    /// Remove every readiness listener attached to `image`.
    fn unwatch_image(&mut self, image: ElementId);

    // --- drawing surfaces ----------------------------------------------

    /// Set a canvas surface's pixel size.
    fn resize_surface(&mut self, canvas: ElementId, size: Size);

    /// Paint one frame on a canvas surface.
    fn draw(&mut self, canvas: ElementId, ops: &[DrawOp]);
}
