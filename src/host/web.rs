//! Web Host - Browser binding via wasm-bindgen / web-sys
//!
//! [`WebHost`] implements [`Host`] over the live document. Elements are
//! registered on first sight and referred to by [`ElementId`] afterwards.
//! Browser callbacks (timers, frames, observers, image loads, tween
//! completions, DOM events) are turned into [`SiteEvent`]s and pushed
//! through a shared sink into the mounted [`Site`].
//!
//! [`start`] is the wasm entry point: it reads the optional
//! `<script id="site-config" type="application/json">` block, detects the
//! environment once, mounts the engine and wires the document listeners.

use std::cell::RefCell;
use std::collections::HashMap;
use std::f64::consts::TAU;
use std::rc::Rc;

use js_sys::{Array, Function, Object, Reflect};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::convert::FromWasmAbi;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, HtmlElement, HtmlImageElement,
    IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit, MouseEvent, Window,
};

use super::{DrawOp, Host, IntersectionEntry, ObserverOptions, PendingCallbacks, Scheduler};
use crate::animator::{self, AnimationOutcome, Animator, Properties, Timeline, Tween};
use crate::config::SiteConfig;
use crate::env::{Capabilities, PointerCapability};
use crate::error::SiteError;
use crate::pipeline::{Site, SiteEvent};
use crate::state::{KeyState, KeyboardEvent, Modifiers};
use crate::types::{
    AnimationHandle, ElementId, FrameHandle, ObserverHandle, PinHandle, Size, TimerHandle, Viewport,
};

// =============================================================================
// SHARED STATE
// =============================================================================

type Handler = Rc<dyn Fn(SiteEvent) -> bool>;

/// Where browser callbacks deliver their events.
#[derive(Clone, Default)]
pub struct EventSink {
    handler: Rc<RefCell<Option<Handler>>>,
}

impl EventSink {
    fn connect(&self, handler: Handler) {
        *self.handler.borrow_mut() = Some(handler);
    }

    /// Deliver an event. Returns whether the default action should be
    /// suppressed.
    pub fn emit(&self, event: SiteEvent) -> bool {
        let handler = self.handler.borrow().clone();
        match handler {
            Some(handler) => handler(event),
            None => false,
        }
    }
}

/// Element ids handed out so far.
#[derive(Clone, Default)]
pub struct ElementRegistry {
    elements: Rc<RefCell<Vec<Element>>>,
}

impl ElementRegistry {
    /// Id for `element`, registering it if unseen.
    pub fn id_of(&self, element: Element) -> ElementId {
        let mut elements = self.elements.borrow_mut();
        if let Some(index) = elements.iter().position(|known| *known == element) {
            return ElementId(index as u32);
        }
        elements.push(element);
        ElementId((elements.len() - 1) as u32)
    }

    pub fn get(&self, id: ElementId) -> Option<Element> {
        self.elements.borrow().get(id.0 as usize).cloned()
    }
}

fn js_string(value: &str) -> JsValue {
    JsValue::from_str(value)
}

// =============================================================================
// WEB HOST
// =============================================================================

pub struct WebHost {
    window: Window,
    document: Document,
    registry: ElementRegistry,
    sink: EventSink,
    next_handle: u32,
    timers: PendingCallbacks<TimerHandle>,
    frames: PendingCallbacks<FrameHandle>,
    observers: HashMap<ObserverHandle, (IntersectionObserver, Closure<dyn FnMut(Array)>)>,
    image_listeners: HashMap<ElementId, Vec<Closure<dyn FnMut()>>>,
    // Listeners detached while possibly still on the call stack
    retired: Vec<Closure<dyn FnMut()>>,
    contexts: HashMap<ElementId, CanvasRenderingContext2d>,
    surfaces: HashMap<ElementId, Size>,
}

impl WebHost {
    pub fn new() -> Result<Self, SiteError> {
        let window = web_sys::window().ok_or_else(|| SiteError::HostUnavailable("window".into()))?;
        let document = window
            .document()
            .ok_or_else(|| SiteError::HostUnavailable("document".into()))?;
        Ok(Self {
            window,
            document,
            registry: ElementRegistry::default(),
            sink: EventSink::default(),
            next_handle: 1,
            timers: PendingCallbacks::default(),
            frames: PendingCallbacks::default(),
            observers: HashMap::new(),
            image_listeners: HashMap::new(),
            retired: Vec::new(),
            contexts: HashMap::new(),
            surfaces: HashMap::new(),
        })
    }

    pub fn registry(&self) -> ElementRegistry {
        self.registry.clone()
    }

    pub fn sink(&self) -> EventSink {
        self.sink.clone()
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    fn next_handle(&mut self) -> u32 {
        let id = self.next_handle;
        self.next_handle += 1;
        id
    }

    fn element(&self, id: ElementId) -> Option<Element> {
        self.registry.get(id)
    }

    fn html(&self, id: ElementId) -> Option<HtmlElement> {
        self.element(id).and_then(|e| e.dyn_into::<HtmlElement>().ok())
    }

    fn collect(&self, list: Option<web_sys::NodeList>) -> Vec<ElementId> {
        let Some(list) = list else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.get(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .map(|element| self.registry.id_of(element))
            .collect()
    }

    fn context(&mut self, canvas: ElementId) -> Option<CanvasRenderingContext2d> {
        if let Some(context) = self.contexts.get(&canvas) {
            return Some(context.clone());
        }
        let canvas_element = self.element(canvas)?.dyn_into::<HtmlCanvasElement>().ok()?;
        let context = canvas_element
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        self.contexts.insert(canvas, context.clone());
        Some(context)
    }
}

impl Scheduler for WebHost {
    fn set_timeout(&mut self, delay_ms: u32) -> TimerHandle {
        let handle = TimerHandle(self.next_handle());
        let sink = self.sink.clone();
        let pending = self.timers.clone();
        let callback = Closure::once_into_js(move || {
            pending.settle(&handle);
            sink.emit(SiteEvent::Timer(handle));
        });
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay_ms as i32)
        {
            Ok(id) => {
                self.timers.insert(handle, id);
            }
            Err(_) => tracing::warn!("setTimeout failed"),
        }
        handle
    }

    fn clear_timeout(&mut self, handle: TimerHandle) {
        if let Some(id) = self.timers.take(&handle) {
            self.window.clear_timeout_with_handle(id);
        }
    }

    fn request_frame(&mut self) -> FrameHandle {
        let handle = FrameHandle(self.next_handle());
        let sink = self.sink.clone();
        let pending = self.frames.clone();
        let callback = Closure::once_into_js(move || {
            pending.settle(&handle);
            sink.emit(SiteEvent::Frame(handle));
        });
        match self.window.request_animation_frame(callback.unchecked_ref()) {
            Ok(id) => {
                self.frames.insert(handle, id);
            }
            Err(_) => tracing::warn!("requestAnimationFrame failed"),
        }
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Some(id) = self.frames.take(&handle) {
            let _ = self.window.cancel_animation_frame(id);
        }
    }
}

impl Host for WebHost {
    fn query(&self, selector: &str) -> Option<ElementId> {
        let element = self.document.query_selector(selector).ok().flatten()?;
        Some(self.registry.id_of(element))
    }

    fn query_all(&self, selector: &str) -> Vec<ElementId> {
        self.collect(self.document.query_selector_all(selector).ok())
    }

    fn query_within(&self, root: ElementId, selector: &str) -> Vec<ElementId> {
        let list = self.element(root).and_then(|root| root.query_selector_all(selector).ok());
        self.collect(list)
    }

    fn closest(&self, element: ElementId, selector: &str) -> Option<ElementId> {
        let found = self.element(element)?.closest(selector).ok().flatten()?;
        Some(self.registry.id_of(found))
    }

    fn parent(&self, element: ElementId) -> Option<ElementId> {
        let parent = self.element(element)?.parent_element()?;
        Some(self.registry.id_of(parent))
    }

    fn body(&self) -> Option<ElementId> {
        let body: Element = self.document.body()?.into();
        Some(self.registry.id_of(body))
    }

    fn attribute(&self, element: ElementId, name: &str) -> Option<String> {
        self.element(element)?.get_attribute(name)
    }

    fn element_size(&self, element: ElementId) -> Size {
        match self.element(element) {
            Some(element) => {
                let rect = element.get_bounding_client_rect();
                Size::new(rect.width(), rect.height())
            }
            None => Size::default(),
        }
    }

    fn viewport(&self) -> Viewport {
        let dimension = |value: Result<JsValue, JsValue>| value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        Viewport::new(dimension(self.window.inner_width()), dimension(self.window.inner_height()))
    }

    fn scroll_offset(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn document_height(&self) -> f64 {
        self.document
            .document_element()
            .map_or(0.0, |root| root.scroll_height() as f64)
    }

    fn active_element(&self) -> Option<ElementId> {
        let active = self.document.active_element()?;
        Some(self.registry.id_of(active))
    }

    fn set_class(&mut self, element: ElementId, class: &str, on: bool) {
        if let Some(element) = self.element(element) {
            let _ = element.class_list().toggle_with_force(class, on);
        }
    }

    fn set_attribute(&mut self, element: ElementId, name: &str, value: &str) {
        if let Some(element) = self.element(element) {
            let _ = element.set_attribute(name, value);
        }
    }

    fn set_style(&mut self, element: ElementId, property: &str, value: &str) {
        if let Some(element) = self.html(element) {
            let _ = element.style().set_property(property, value);
        }
    }

    fn set_text(&mut self, element: ElementId, text: &str) {
        if let Some(element) = self.element(element) {
            element.set_text_content(Some(text));
        }
    }

    fn focus(&mut self, element: ElementId) {
        if let Some(element) = self.html(element) {
            let _ = element.focus();
        }
    }

    fn observe(&mut self, targets: &[ElementId], options: ObserverOptions) -> ObserverHandle {
        let handle = ObserverHandle(self.next_handle());
        let sink = self.sink.clone();
        let registry = self.registry.clone();
        let callback = Closure::<dyn FnMut(Array)>::new(move |records: Array| {
            let entries = records
                .iter()
                .filter_map(|record| record.dyn_into::<IntersectionObserverEntry>().ok())
                .map(|entry| IntersectionEntry {
                    target: registry.id_of(entry.target()),
                    is_intersecting: entry.is_intersecting(),
                })
                .collect();
            sink.emit(SiteEvent::Intersection {
                observer: handle,
                entries,
            });
        });

        let init = IntersectionObserverInit::new();
        init.set_root_margin(&options.root_margin.to_string());
        init.set_threshold(&JsValue::from_f64(options.threshold));
        match IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init) {
            Ok(observer) => {
                for &target in targets {
                    if let Some(element) = self.element(target) {
                        observer.observe(&element);
                    }
                }
                self.observers.insert(handle, (observer, callback));
            }
            Err(_) => tracing::warn!("IntersectionObserver unavailable"),
        }
        handle
    }

    fn disconnect(&mut self, observer: ObserverHandle) {
        if let Some((observer, _callback)) = self.observers.remove(&observer) {
            observer.disconnect();
        }
    }

    fn set_image_source(&mut self, image: ElementId, src: &str) -> bool {
        let Some(image) = self.element(image).and_then(|e| e.dyn_into::<HtmlImageElement>().ok()) else {
            return false;
        };
        image.set_src(src);
        image.complete() && image.natural_width() > 0
    }

    fn watch_image(&mut self, image: ElementId, token: u64) {
        self.retired.clear();
        let Some(element) = self.element(image) else {
            return;
        };
        let sink = self.sink.clone();
        let callback = Closure::<dyn FnMut()>::new(move || {
            sink.emit(SiteEvent::ImageReady { image, token });
        });
        for event in ["load", "error"] {
            let _ = element.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref());
        }
        self.image_listeners.entry(image).or_default().push(callback);
    }

    fn unwatch_image(&mut self, image: ElementId) {
        let Some(listeners) = self.image_listeners.remove(&image) else {
            return;
        };
        if let Some(element) = self.element(image) {
            for callback in &listeners {
                for event in ["load", "error"] {
                    let _ = element.remove_event_listener_with_callback(event, callback.as_ref().unchecked_ref());
                }
            }
        }
        self.retired.extend(listeners);
    }

    fn resize_surface(&mut self, canvas: ElementId, size: Size) {
        if let Some(element) = self.element(canvas).and_then(|e| e.dyn_into::<HtmlCanvasElement>().ok()) {
            element.set_width(size.width.max(0.0) as u32);
            element.set_height(size.height.max(0.0) as u32);
        }
        self.surfaces.insert(canvas, size);
    }

    fn draw(&mut self, canvas: ElementId, ops: &[DrawOp]) {
        let Some(context) = self.context(canvas) else {
            return;
        };
        let size = self.surfaces.get(&canvas).copied().unwrap_or_default();
        for op in ops {
            match *op {
                DrawOp::Clear => context.clear_rect(0.0, 0.0, size.width, size.height),
                DrawOp::Circle { x, y, radius, color } => {
                    context.begin_path();
                    let _ = context.arc(x, y, radius, 0.0, TAU);
                    context.set_fill_style_str(&color.to_css());
                    context.fill();
                }
            }
        }
    }
}

// =============================================================================
// GSAP ANIMATOR
// =============================================================================

/// Binding to a page-global `gsap` object (and `ScrollTrigger` for pins).
pub struct GsapAnimator {
    gsap: JsValue,
    registry: ElementRegistry,
    sink: EventSink,
    next_handle: u32,
    pins: HashMap<PinHandle, JsValue>,
}

impl GsapAnimator {
    /// `None` when the page has no `gsap` global.
    pub fn detect(host: &WebHost) -> Option<Self> {
        let gsap = Reflect::get(&js_sys::global(), &js_string("gsap")).ok()?;
        if gsap.is_undefined() || gsap.is_null() {
            return None;
        }
        Some(Self {
            gsap,
            registry: host.registry(),
            sink: host.sink(),
            next_handle: 1,
            pins: HashMap::new(),
        })
    }

    fn next_handle(&mut self) -> u32 {
        let id = self.next_handle;
        self.next_handle += 1;
        id
    }

    fn call(&self, method: &str, args: &[&JsValue]) -> Option<JsValue> {
        let function = Reflect::get(&self.gsap, &js_string(method))
            .ok()?
            .dyn_into::<Function>()
            .ok()?;
        let array = Array::new();
        for arg in args {
            array.push(arg);
        }
        function.apply(&self.gsap, &array).ok()
    }

    fn vars(properties: &Properties, tween: &Tween) -> Option<Object> {
        let vars = Object::new();
        let set = |key: &str, value: JsValue| Reflect::set(&vars, &js_string(key), &value).ok();
        if let Some(opacity) = properties.opacity {
            set("opacity", JsValue::from_f64(opacity))?;
        }
        if let Some(x) = properties.x {
            set("x", JsValue::from_f64(x))?;
        }
        if let Some(y) = properties.y {
            set("y", JsValue::from_f64(y))?;
        }
        if let Some(scale) = properties.scale {
            set("scale", JsValue::from_f64(scale))?;
        }
        set("duration", JsValue::from_f64(tween.duration))?;
        set("ease", js_string(tween.ease.name()))?;
        if let Some(delay) = tween.delay {
            set("delay", JsValue::from_f64(delay))?;
        }
        Some(vars)
    }

    fn on_complete(&mut self, vars: &Object) -> Option<AnimationHandle> {
        let handle = AnimationHandle(self.next_handle());
        let sink = self.sink.clone();
        let callback = Closure::once_into_js(move || {
            sink.emit(SiteEvent::AnimationComplete(handle));
        });
        Reflect::set(vars, &js_string("onComplete"), &callback).ok()?;
        Some(handle)
    }

    fn try_animate(&mut self, target: ElementId, properties: &Properties, tween: &Tween) -> Option<AnimationHandle> {
        let element = self.registry.get(target)?;
        let vars = Self::vars(properties, tween)?;
        let handle = self.on_complete(&vars)?;
        self.call("to", &[&JsValue::from(element), &JsValue::from(vars)])?;
        Some(handle)
    }

    fn try_play(&mut self, timeline: &Timeline) -> Option<AnimationHandle> {
        let options = Object::new();
        let handle = self.on_complete(&options)?;
        let tl = self.call("timeline", &[&JsValue::from(options)])?;
        let to = Reflect::get(&tl, &js_string("to")).ok()?.dyn_into::<Function>().ok()?;
        for step in &timeline.steps {
            let element = self.registry.get(step.target)?;
            let vars = Self::vars(&step.properties, &step.tween)?;
            let position = if step.offset < 0.0 {
                format!("-={}", -step.offset)
            } else {
                format!("+={}", step.offset)
            };
            to.call3(&tl, &JsValue::from(element), &JsValue::from(vars), &js_string(&position)).ok()?;
        }
        Some(handle)
    }
}

impl Animator for GsapAnimator {
    fn animate_to(
        &mut self,
        host: &mut dyn Host,
        target: ElementId,
        properties: Properties,
        tween: Tween,
    ) -> AnimationOutcome {
        match self.try_animate(target, &properties, &tween) {
            Some(handle) => AnimationOutcome::Pending(handle),
            None => {
                properties.apply(host, target);
                AnimationOutcome::Completed
            }
        }
    }

    fn play(&mut self, host: &mut dyn Host, timeline: Timeline) -> AnimationOutcome {
        if timeline.is_empty() {
            return AnimationOutcome::Completed;
        }
        match self.try_play(&timeline) {
            Some(handle) => AnimationOutcome::Pending(handle),
            None => {
                for step in &timeline.steps {
                    step.properties.apply(host, step.target);
                }
                AnimationOutcome::Completed
            }
        }
    }

    fn kill_in_flight(&mut self, target: ElementId) {
        if let Some(element) = self.registry.get(target) {
            self.call("killTweensOf", &[&JsValue::from(element)]);
        }
    }

    fn pin_horizontal(
        &mut self,
        _host: &mut dyn Host,
        section: ElementId,
        track: ElementId,
        distance: f64,
    ) -> Option<PinHandle> {
        let scroll_trigger = Reflect::get(&js_sys::global(), &js_string("ScrollTrigger")).ok()?;
        if scroll_trigger.is_undefined() {
            tracing::debug!("ScrollTrigger missing, no horizontal pin");
            return None;
        }
        let section_element = self.registry.get(section)?;
        let track_element = self.registry.get(track)?;

        let trigger = Object::new();
        Reflect::set(&trigger, &js_string("trigger"), &JsValue::from(section_element)).ok()?;
        Reflect::set(&trigger, &js_string("pin"), &JsValue::TRUE).ok()?;
        Reflect::set(&trigger, &js_string("scrub"), &JsValue::from_f64(1.0)).ok()?;
        Reflect::set(&trigger, &js_string("end"), &js_string(&format!("+={}", distance))).ok()?;

        let vars = Object::new();
        Reflect::set(&vars, &js_string("x"), &JsValue::from_f64(-distance)).ok()?;
        Reflect::set(&vars, &js_string("ease"), &js_string("none")).ok()?;
        Reflect::set(&vars, &js_string("scrollTrigger"), &trigger).ok()?;

        let tween = self.call("to", &[&JsValue::from(track_element), &JsValue::from(vars)])?;
        let handle = PinHandle(self.next_handle());
        self.pins.insert(handle, tween);
        Some(handle)
    }

    fn release_pin(&mut self, _host: &mut dyn Host, pin: PinHandle) {
        let Some(tween) = self.pins.remove(&pin) else {
            return;
        };
        let kill = |target: &JsValue| {
            if let Ok(kill) = Reflect::get(target, &js_string("kill")).and_then(|k| k.dyn_into::<Function>()) {
                let _ = kill.call0(target);
            }
        };
        if let Ok(trigger) = Reflect::get(&tween, &js_string("scrollTrigger")) {
            if !trigger.is_undefined() {
                kill(&trigger);
            }
        }
        kill(&tween);
        // Clear the inline transform left behind by the tween
        self.call("set", &[&tween_targets(&tween), &clear_transform()]);
    }
}

fn tween_targets(tween: &JsValue) -> JsValue {
    Reflect::get(tween, &js_string("targets"))
        .ok()
        .and_then(|targets| targets.dyn_into::<Function>().ok())
        .and_then(|targets| targets.call0(tween).ok())
        .unwrap_or(JsValue::UNDEFINED)
}

fn clear_transform() -> JsValue {
    let vars = Object::new();
    let _ = Reflect::set(&vars, &js_string("clearProps"), &js_string("transform"));
    vars.into()
}

// =============================================================================
// ENTRY POINT
// =============================================================================

fn media_matches(window: &Window, query: &str) -> bool {
    window
        .match_media(query)
        .ok()
        .flatten()
        .is_some_and(|list| list.matches())
}

fn detect_capabilities(window: &Window) -> Capabilities {
    let mut pointer = PointerCapability::empty();
    if media_matches(window, "(hover: hover)") {
        pointer |= PointerCapability::HOVER;
    }
    if media_matches(window, "(pointer: fine)") {
        pointer |= PointerCapability::FINE;
    }
    let gsap = Reflect::get(&js_sys::global(), &js_string("gsap")).unwrap_or(JsValue::UNDEFINED);
    Capabilities {
        pointer,
        reduced_motion: media_matches(window, "(prefers-reduced-motion: reduce)"),
        animator: !gsap.is_undefined() && !gsap.is_null(),
    }
}

fn read_config(document: &Document) -> SiteConfig {
    let Some(text) = document
        .get_element_by_id("site-config")
        .and_then(|script| script.text_content())
    else {
        return SiteConfig::default();
    };
    SiteConfig::from_json(&text).unwrap_or_else(|err| {
        tracing::warn!(%err, "falling back to default configuration");
        SiteConfig::default()
    })
}

fn key_event(event: &web_sys::KeyboardEvent) -> KeyboardEvent {
    KeyboardEvent {
        key: event.key(),
        modifiers: Modifiers {
            ctrl: event.ctrl_key(),
            alt: event.alt_key(),
            shift: event.shift_key(),
            meta: event.meta_key(),
        },
        state: if event.repeat() { KeyState::Repeat } else { KeyState::Press },
    }
}

fn listen<E, F>(target: &web_sys::EventTarget, name: &str, handler: F)
where
    E: FromWasmAbi + 'static,
    F: FnMut(E) + 'static,
{
    let callback = Closure::<dyn FnMut(E)>::new(handler);
    let _ = target.add_event_listener_with_callback(name, callback.as_ref().unchecked_ref());
    // Page-lifetime listener
    callback.forget();
}

/// Mount the engine on the current document.
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn start() -> Result<(), JsValue> {
    let host = WebHost::new().map_err(|err| JsValue::from_str(&err.to_string()))?;
    let window = host.window().clone();
    let document = host.document.clone();
    let registry = host.registry();
    let sink = host.sink();

    let config = read_config(&document);
    let capabilities = detect_capabilities(&window);
    let gsap = GsapAnimator::detect(&host);
    let animator = animator::resolve(capabilities, move || -> Box<dyn Animator> {
        match gsap {
            Some(gsap) => Box::new(gsap),
            None => Box::new(animator::StaticAnimator),
        }
    });

    let site = Rc::new(RefCell::new(Site::mount(host, config, capabilities, animator)));
    sink.connect(Rc::new(move |event: SiteEvent| match site.try_borrow_mut() {
        Ok(mut site) => site.handle(event),
        Err(_) => {
            tracing::trace!("event dropped during dispatch");
            false
        }
    }));

    let target_id = {
        let registry = registry.clone();
        move |event: &web_sys::Event| {
            event
                .target()
                .and_then(|target| target.dyn_into::<Element>().ok())
                .map(|element| registry.id_of(element))
        }
    };

    let doc_target: &web_sys::EventTarget = document.as_ref();
    let win_target: &web_sys::EventTarget = window.as_ref();

    {
        let sink = sink.clone();
        listen(doc_target, "click", move |event: MouseEvent| {
            if let Some(target) = target_id(&event) {
                if sink.emit(SiteEvent::Click { target }) {
                    event.prevent_default();
                }
            }
        });
    }
    {
        let sink = sink.clone();
        listen(doc_target, "keydown", move |event: web_sys::KeyboardEvent| {
            if sink.emit(SiteEvent::Key(key_event(&event))) {
                event.prevent_default();
            }
        });
    }
    {
        let sink = sink.clone();
        listen(win_target, "scroll", move |_: web_sys::Event| {
            sink.emit(SiteEvent::Scroll);
        });
    }
    {
        let sink = sink.clone();
        listen(win_target, "resize", move |_: web_sys::Event| {
            sink.emit(SiteEvent::Resize);
        });
    }
    {
        let sink = sink.clone();
        listen(doc_target, "mousemove", move |event: MouseEvent| {
            sink.emit(SiteEvent::PointerMove {
                x: event.client_x() as f64,
                y: event.client_y() as f64,
            });
        });
    }
    if let Some(query) = window.match_media("(prefers-reduced-motion: reduce)").ok().flatten() {
        let sink = sink.clone();
        listen(query.as_ref(), "change", move |event: web_sys::MediaQueryListEvent| {
            sink.emit(SiteEvent::ReducedMotionChanged(event.matches()));
        });
    }

    Ok(())
}
