//! Memory Host - Headless document for tests and non-browser consumers
//!
//! A small in-memory element tree with:
//! - a selector matcher (compound selectors and comma lists, no combinators)
//! - a virtual clock driving timers
//! - queued animation frames
//! - recorded observers, image listeners and canvas frames
//!
//! Nothing fires on its own: the driver advances the clock or drains frames
//! and feeds the resulting handles back to the engine as events.
//!
//! # Example
//!
//! ```ignore
//! let mut host = MemoryHost::new(Viewport::new(1280.0, 800.0));
//! let header = host.element("header").id("site-header").size(1280.0, 72.0).insert();
//! let due = host.advance(200);
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use super::{DrawOp, Host, ObserverOptions, Scheduler};
use crate::types::{ElementId, FrameHandle, ObserverHandle, Size, TimerHandle, Viewport};

// =============================================================================
// ELEMENTS
// =============================================================================

#[derive(Debug, Clone, Default)]
struct MemoryElement {
    tag: String,
    parent: Option<ElementId>,
    classes: BTreeSet<String>,
    attributes: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    text: String,
    size: Size,
}

/// Builder returned by [`MemoryHost::element`].
pub struct ElementBuilder<'a> {
    host: &'a mut MemoryHost,
    element: MemoryElement,
}

impl<'a> ElementBuilder<'a> {
    pub fn id(mut self, id: &str) -> Self {
        self.element.attributes.insert("id".to_string(), id.to_string());
        self
    }

    pub fn class(mut self, class: &str) -> Self {
        self.element.classes.insert(class.to_string());
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.element.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.element.text = text.to_string();
        self
    }

    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.element.size = Size::new(width, height);
        self
    }

    pub fn parent(mut self, parent: ElementId) -> Self {
        self.element.parent = Some(parent);
        self
    }

    /// Append the element and return its id.
    pub fn insert(self) -> ElementId {
        let id = ElementId(self.host.elements.len() as u32);
        self.host.elements.push(self.element);
        id
    }
}

// =============================================================================
// SELECTORS
// =============================================================================

#[derive(Debug, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<(String, Option<String>)>,
}

fn parse_selector(selector: &str) -> Vec<Compound> {
    selector
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(parse_compound)
        .collect()
}

fn parse_compound(text: &str) -> Compound {
    let mut compound = Compound::default();
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;

    let read_ident = |i: &mut usize| -> String {
        let start = *i;
        while *i < chars.len() && !matches!(chars[*i], '#' | '.' | '[') {
            *i += 1;
        }
        chars[start..*i].iter().collect()
    };

    while i < chars.len() {
        match chars[i] {
            '#' => {
                i += 1;
                compound.id = Some(read_ident(&mut i));
            }
            '.' => {
                i += 1;
                compound.classes.push(read_ident(&mut i));
            }
            '[' => {
                let end = chars[i..]
                    .iter()
                    .position(|&c| c == ']')
                    .map(|p| i + p)
                    .unwrap_or(chars.len());
                let inner: String = chars[i + 1..end].iter().collect();
                match inner.split_once('=') {
                    Some((name, value)) => {
                        let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
                        compound
                            .attributes
                            .push((name.trim().to_string(), Some(value.to_string())));
                    }
                    None => compound.attributes.push((inner.trim().to_string(), None)),
                }
                i = end + 1;
            }
            _ => {
                compound.tag = Some(read_ident(&mut i));
            }
        }
    }

    compound
}

fn matches(element: &MemoryElement, compound: &Compound) -> bool {
    if let Some(tag) = &compound.tag {
        if !element.tag.eq_ignore_ascii_case(tag) {
            return false;
        }
    }
    if let Some(id) = &compound.id {
        if element.attributes.get("id") != Some(id) {
            return false;
        }
    }
    if !compound.classes.iter().all(|c| element.classes.contains(c)) {
        return false;
    }
    compound.attributes.iter().all(|(name, value)| {
        match (element.attributes.get(name), value) {
            (Some(actual), Some(expected)) => actual == expected,
            (Some(_), None) => true,
            (None, _) => false,
        }
    })
}

// =============================================================================
// RECORDS
// =============================================================================

#[derive(Debug, Clone)]
pub struct ObserverRecord {
    pub targets: Vec<ElementId>,
    pub options: ObserverOptions,
}

#[derive(Debug, Clone, Default)]
pub struct SurfaceRecord {
    pub size: Size,
    pub frames_drawn: usize,
    pub last_frame: Vec<DrawOp>,
}

// =============================================================================
// MEMORY HOST
// =============================================================================

pub struct MemoryHost {
    elements: Vec<MemoryElement>,
    viewport: Viewport,
    scroll_offset: f64,
    document_height: f64,
    active: Option<ElementId>,

    clock_ms: u64,
    next_handle: u32,
    timers: Vec<(TimerHandle, u64)>,
    frames: Vec<FrameHandle>,

    observers: HashMap<ObserverHandle, ObserverRecord>,
    image_listeners: HashMap<ElementId, Vec<u64>>,
    cached_images: HashSet<String>,
    surfaces: HashMap<ElementId, SurfaceRecord>,
}

impl MemoryHost {
    /// Create a document containing only `<body>` (element 0).
    pub fn new(viewport: Viewport) -> Self {
        let body = MemoryElement {
            tag: "body".to_string(),
            size: Size::new(viewport.width, viewport.height),
            ..Default::default()
        };
        Self {
            elements: vec![body],
            viewport,
            scroll_offset: 0.0,
            document_height: viewport.height,
            active: None,
            clock_ms: 0,
            next_handle: 1,
            timers: Vec::new(),
            frames: Vec::new(),
            observers: HashMap::new(),
            image_listeners: HashMap::new(),
            cached_images: HashSet::new(),
            surfaces: HashMap::new(),
        }
    }

    /// Start building a new element (parented to `<body>` unless set).
    pub fn element(&mut self, tag: &str) -> ElementBuilder<'_> {
        ElementBuilder {
            host: self,
            element: MemoryElement {
                tag: tag.to_string(),
                parent: Some(ElementId(0)),
                ..Default::default()
            },
        }
    }

    fn next_handle(&mut self) -> u32 {
        let id = self.next_handle;
        self.next_handle += 1;
        id
    }

    fn get(&self, element: ElementId) -> Option<&MemoryElement> {
        self.elements.get(element.0 as usize)
    }

    fn get_mut(&mut self, element: ElementId) -> Option<&mut MemoryElement> {
        self.elements.get_mut(element.0 as usize)
    }

    fn is_descendant(&self, element: ElementId, root: ElementId) -> bool {
        let mut current = self.get(element).and_then(|e| e.parent);
        while let Some(id) = current {
            if id == root {
                return true;
            }
            current = self.get(id).and_then(|e| e.parent);
        }
        false
    }

    fn select(&self, selector: &str, scope: Option<ElementId>) -> Vec<ElementId> {
        let compounds = parse_selector(selector);
        self.elements
            .iter()
            .enumerate()
            .map(|(i, e)| (ElementId(i as u32), e))
            .filter(|(id, _)| scope.map_or(true, |root| self.is_descendant(*id, root)))
            .filter(|(_, e)| compounds.iter().any(|c| matches(e, c)))
            .map(|(id, _)| id)
            .collect()
    }

    // -------------------------------------------------------------------------
    // Environment controls
    // -------------------------------------------------------------------------

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn set_scroll_offset(&mut self, offset: f64) {
        self.scroll_offset = offset;
    }

    pub fn set_document_height(&mut self, height: f64) {
        self.document_height = height;
    }

    pub fn set_element_size(&mut self, element: ElementId, size: Size) {
        if let Some(e) = self.get_mut(element) {
            e.size = size;
        }
    }

    /// Mark an image URL as already in the cache.
    pub fn mark_cached(&mut self, src: &str) {
        self.cached_images.insert(src.to_string());
    }

    // -------------------------------------------------------------------------
    // Clock and frames
    // -------------------------------------------------------------------------

    /// Advance the virtual clock and return the timers that came due,
    /// earliest first.
    pub fn advance(&mut self, ms: u64) -> Vec<TimerHandle> {
        self.clock_ms += ms;
        let now = self.clock_ms;
        let mut due: Vec<(TimerHandle, u64)> = Vec::new();
        self.timers.retain(|&(handle, at)| {
            if at <= now {
                due.push((handle, at));
                false
            } else {
                true
            }
        });
        due.sort_by_key(|&(handle, at)| (at, handle.0));
        due.into_iter().map(|(handle, _)| handle).collect()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Drain the frame requests made since the last call.
    pub fn take_frames(&mut self) -> Vec<FrameHandle> {
        std::mem::take(&mut self.frames)
    }

    pub fn pending_frames(&self) -> usize {
        self.frames.len()
    }

    // -------------------------------------------------------------------------
    // Inspection
    // -------------------------------------------------------------------------

    pub fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.get(element).is_some_and(|e| e.classes.contains(class))
    }

    pub fn style(&self, element: ElementId, property: &str) -> Option<String> {
        self.get(element).and_then(|e| e.styles.get(property).cloned())
    }

    pub fn text(&self, element: ElementId) -> String {
        self.get(element).map(|e| e.text.clone()).unwrap_or_default()
    }

    pub fn observers(&self) -> &HashMap<ObserverHandle, ObserverRecord> {
        &self.observers
    }

    /// Observer currently watching `target`, if any.
    pub fn observer_for(&self, target: ElementId) -> Option<ObserverHandle> {
        self.observers
            .iter()
            .find(|(_, record)| record.targets.contains(&target))
            .map(|(handle, _)| *handle)
    }

    /// Number of readiness listeners attached to an image.
    pub fn image_listeners(&self, image: ElementId) -> usize {
        self.image_listeners.get(&image).map_or(0, Vec::len)
    }

    /// Token of the most recently attached readiness listener.
    pub fn latest_image_token(&self, image: ElementId) -> Option<u64> {
        self.image_listeners.get(&image).and_then(|l| l.last().copied())
    }

    pub fn surface(&self, canvas: ElementId) -> Option<&SurfaceRecord> {
        self.surfaces.get(&canvas)
    }
}

// =============================================================================
// TRAIT IMPLS
// =============================================================================

impl Scheduler for MemoryHost {
    fn set_timeout(&mut self, delay_ms: u32) -> TimerHandle {
        let handle = TimerHandle(self.next_handle());
        self.timers.push((handle, self.clock_ms + delay_ms as u64));
        handle
    }

    fn clear_timeout(&mut self, handle: TimerHandle) {
        self.timers.retain(|(h, _)| *h != handle);
    }

    fn request_frame(&mut self) -> FrameHandle {
        let handle = FrameHandle(self.next_handle());
        self.frames.push(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.frames.retain(|h| *h != handle);
    }
}

impl Host for MemoryHost {
    fn query(&self, selector: &str) -> Option<ElementId> {
        self.select(selector, None).into_iter().next()
    }

    fn query_all(&self, selector: &str) -> Vec<ElementId> {
        self.select(selector, None)
    }

    fn query_within(&self, root: ElementId, selector: &str) -> Vec<ElementId> {
        self.select(selector, Some(root))
    }

    fn closest(&self, element: ElementId, selector: &str) -> Option<ElementId> {
        let compounds = parse_selector(selector);
        let mut current = Some(element);
        while let Some(id) = current {
            let e = self.get(id)?;
            if compounds.iter().any(|c| matches(e, c)) {
                return Some(id);
            }
            current = e.parent;
        }
        None
    }

    fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.get(element).and_then(|e| e.parent)
    }

    fn body(&self) -> Option<ElementId> {
        Some(ElementId(0))
    }

    fn attribute(&self, element: ElementId, name: &str) -> Option<String> {
        self.get(element).and_then(|e| e.attributes.get(name).cloned())
    }

    fn element_size(&self, element: ElementId) -> Size {
        self.get(element).map(|e| e.size).unwrap_or_default()
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    fn document_height(&self) -> f64 {
        self.document_height
    }

    fn active_element(&self) -> Option<ElementId> {
        self.active
    }

    fn set_class(&mut self, element: ElementId, class: &str, on: bool) {
        if let Some(e) = self.get_mut(element) {
            if on {
                e.classes.insert(class.to_string());
            } else {
                e.classes.remove(class);
            }
        }
    }

    fn set_attribute(&mut self, element: ElementId, name: &str, value: &str) {
        if let Some(e) = self.get_mut(element) {
            e.attributes.insert(name.to_string(), value.to_string());
        }
    }

    fn set_style(&mut self, element: ElementId, property: &str, value: &str) {
        if let Some(e) = self.get_mut(element) {
            e.styles.insert(property.to_string(), value.to_string());
        }
    }

    fn set_text(&mut self, element: ElementId, text: &str) {
        if let Some(e) = self.get_mut(element) {
            e.text = text.to_string();
        }
    }

    fn focus(&mut self, element: ElementId) {
        if self.get(element).is_some() {
            self.active = Some(element);
        }
    }

    fn observe(&mut self, targets: &[ElementId], options: ObserverOptions) -> ObserverHandle {
        let handle = ObserverHandle(self.next_handle());
        self.observers.insert(
            handle,
            ObserverRecord {
                targets: targets.to_vec(),
                options,
            },
        );
        handle
    }

    fn disconnect(&mut self, observer: ObserverHandle) {
        self.observers.remove(&observer);
    }

    fn set_image_source(&mut self, image: ElementId, src: &str) -> bool {
        self.set_attribute(image, "src", src);
        self.cached_images.contains(src)
    }

    fn watch_image(&mut self, image: ElementId, token: u64) {
        self.image_listeners.entry(image).or_default().push(token);
    }

    fn unwatch_image(&mut self, image: ElementId) {
        self.image_listeners.remove(&image);
    }

    fn resize_surface(&mut self, canvas: ElementId, size: Size) {
        self.surfaces.entry(canvas).or_default().size = size;
    }

    fn draw(&mut self, canvas: ElementId, ops: &[DrawOp]) {
        let surface = self.surfaces.entry(canvas).or_default();
        surface.frames_drawn += 1;
        surface.last_frame = ops.to_vec();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> MemoryHost {
        MemoryHost::new(Viewport::new(1280.0, 800.0))
    }

    #[test]
    fn test_selectors() {
        let mut host = setup();
        let nav = host.element("nav").class("nav-menu").insert();
        let link = host
            .element("a")
            .class("nav-link")
            .attr("href", "#about")
            .parent(nav)
            .insert();
        let button = host.element("button").id("close").insert();

        assert_eq!(host.query(".nav-link[href=\"#about\"]"), Some(link));
        assert_eq!(host.query("a.nav-link"), Some(link));
        assert_eq!(host.query(".nav-link[href='#home']"), None);
        assert_eq!(host.query("#close"), Some(button));
        assert_eq!(host.query_all("button, a[href]"), vec![link, button]);
        assert_eq!(host.query_within(nav, "a"), vec![link]);
        assert_eq!(host.closest(link, ".nav-menu"), Some(nav));
        assert_eq!(host.closest(button, ".nav-menu"), None);
    }

    #[test]
    fn test_timers_fire_in_order() {
        let mut host = setup();
        let late = host.set_timeout(300);
        let early = host.set_timeout(100);
        let cancelled = host.set_timeout(50);
        host.clear_timeout(cancelled);

        assert!(host.advance(99).is_empty());
        assert_eq!(host.advance(201), vec![early, late]);
        assert_eq!(host.pending_timers(), 0);
    }

    #[test]
    fn test_frames_and_cancellation() {
        let mut host = setup();
        let a = host.request_frame();
        let b = host.request_frame();
        host.cancel_frame(a);
        assert_eq!(host.take_frames(), vec![b]);
        assert_eq!(host.pending_frames(), 0);
    }

    #[test]
    fn test_image_listeners() {
        let mut host = setup();
        let img = host.element("img").insert();
        host.mark_cached("a.jpg");

        assert!(host.set_image_source(img, "a.jpg"));
        assert!(!host.set_image_source(img, "b.jpg"));

        host.watch_image(img, 1);
        host.watch_image(img, 2);
        assert_eq!(host.image_listeners(img), 2);
        assert_eq!(host.latest_image_token(img), Some(2));
        host.unwatch_image(img);
        assert_eq!(host.image_listeners(img), 0);
    }
}
