//! Mount API - Builds the engine on a page and routes events to it.
//!
//! [`Site`] owns every component plus the two shared resources (scroll
//! lock and resize broadcaster). The host feeds it [`SiteEvent`]s; each
//! event is routed to the component(s) that own it.
//!
//! # Example
//!
//! ```ignore
//! use spark_site::{brochure_page, Capabilities, Site, SiteConfig, SiteEvent, StaticAnimator};
//!
//! let (host, page) = brochure_page(Viewport::new(1280.0, 800.0), 6);
//! let mut site = Site::mount(host, SiteConfig::default(), Capabilities::default(), Box::new(StaticAnimator));
//!
//! site.handle(SiteEvent::Click { target: page.gallery_items[2] });
//! assert!(site.modal().is_some_and(|m| m.is_open()));
//! ```

use crate::animator::{Animator, Breakpoint, BreakpointScopes, HorizontalPin};
use crate::config::{PinConfig, SiteConfig};
use crate::env::{Capabilities, Environment};
use crate::error::SiteError;
use crate::host::{Host, IntersectionEntry};
use crate::state::{
    HeaderState, KeyboardEvent, MobileNav, ModalNavigator, ParticleField, PointerGlow,
    ResizeBroadcaster, ScrollLock, SectionTracker, TransitionToken,
};
use crate::types::{AnimationHandle, ElementId, FrameHandle, ObserverHandle, TimerHandle};

use super::dispatch::{Dispatcher, Role, RoleSet};

// =============================================================================
// Events
// =============================================================================

/// Everything the host reports back to the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum SiteEvent {
    Click { target: ElementId },
    Key(KeyboardEvent),
    /// Raw viewport resize, before debouncing.
    Resize,
    Scroll,
    Intersection {
        observer: ObserverHandle,
        entries: Vec<IntersectionEntry>,
    },
    Frame(FrameHandle),
    Timer(TimerHandle),
    ImageReady { image: ElementId, token: TransitionToken },
    AnimationComplete(AnimationHandle),
    PointerMove { x: f64, y: f64 },
    ReducedMotionChanged(bool),
}

// =============================================================================
// Site
// =============================================================================

pub struct Site<H: Host> {
    host: H,
    animator: Box<dyn Animator>,
    env: Environment,
    lock: ScrollLock,
    resize: ResizeBroadcaster<Site<H>>,
    dispatcher: Dispatcher,

    header: HeaderState,
    sections: SectionTracker,
    particles: Option<ParticleField>,
    modal: Option<ModalNavigator>,
    nav: Option<MobileNav>,
    glow: Option<PointerGlow>,
    scopes: BreakpointScopes,
}

impl<H: Host + 'static> Site<H> {
    /// Mount every component on `host`.
    ///
    /// Components whose elements are missing are left out silently. Resize
    /// subscribers are registered in a fixed order: header measurement,
    /// section observer, particle field, mobile menu, breakpoint scopes.
    pub fn mount(mut host: H, config: SiteConfig, capabilities: Capabilities, animator: Box<dyn Animator>) -> Self {
        let env = Environment::new(capabilities, host.viewport());

        let header = HeaderState::mount(&host, &config.header);
        let header_height = header.measure(&host, &env);
        let mut sections = SectionTracker::new(&host, &config.nav);
        sections.start(&mut host, header_height);

        let particles = ParticleField::mount(&mut host, &config.particles, &env);
        let modal = ModalNavigator::mount(&mut host, &config.modal);
        let nav = MobileNav::mount(&mut host, &config.nav);
        let glow = PointerGlow::mount(&host, &config.pointer_glow, &env);

        let mut site = Self {
            host,
            animator,
            env,
            lock: ScrollLock::new(config.scroll_lock_class.clone()),
            resize: ResizeBroadcaster::new(config.resize_quiet_ms),
            dispatcher: Dispatcher::from_config(&config),
            header,
            sections,
            particles,
            modal,
            nav,
            glow,
            scopes: BreakpointScopes::new(),
        };

        if let Some(pin) = &config.pin {
            site.register_pin(pin);
        }
        site.subscribe_resize();
        site.header.on_scroll(&mut site.host);

        tracing::debug!(
            sections = site.sections.sections().len(),
            particles = site.particles.is_some(),
            modal = site.modal.is_some(),
            nav = site.nav.is_some(),
            glow = site.glow.is_some(),
            "site mounted"
        );
        site
    }

    fn register_pin(&mut self, pin: &PinConfig) {
        let Some(section) = self.host.query(&pin.section) else {
            tracing::debug!(selector = %pin.section, "no pinned section on page");
            return;
        };
        let Some(track) = self.host.query_within(section, &pin.track).into_iter().next() else {
            let err = SiteError::MissingElement(pin.track.clone());
            tracing::warn!(%err, "horizontal pin disabled");
            return;
        };
        self.scopes.register(
            Breakpoint::min(pin.min_width),
            Box::new(HorizontalPin::new(section, track)),
            &mut self.host,
            self.animator.as_mut(),
        );
    }

    fn subscribe_resize(&mut self) {
        self.resize.subscribe(|site| {
            let viewport = site.host.viewport();
            site.env.viewport.set(viewport);
            site.header.measure(&site.host, &site.env);
        });
        self.resize.subscribe(|site| {
            let header_height = site.env.header_height.get();
            if site.sections.on_resize(&mut site.host, header_height) {
                tracing::debug!(header_height, "section observer rebuilt");
            }
        });
        self.resize.subscribe(|site| {
            if let Some(particles) = site.particles.as_mut() {
                particles.on_resize(&mut site.host);
            }
        });
        self.resize.subscribe(|site| {
            let width = site.host.viewport().width;
            if let Some(nav) = site.nav.as_mut() {
                nav.on_resize(&mut site.host, &mut site.lock, width);
            }
        });
        self.resize.subscribe(|site| {
            site.scopes.evaluate(&mut site.host, site.animator.as_mut());
        });
    }

    // -------------------------------------------------------------------------
    // Event routing
    // -------------------------------------------------------------------------

    /// Route one host event. Returns `true` when the host should suppress
    /// the event's default action.
    pub fn handle(&mut self, event: SiteEvent) -> bool {
        match event {
            SiteEvent::Click { target } => self.on_click(target),
            SiteEvent::Key(event) => self.on_key(&event),
            SiteEvent::Resize => {
                self.resize.signal(&mut self.host);
                false
            }
            SiteEvent::Scroll => {
                self.header.on_scroll(&mut self.host);
                false
            }
            SiteEvent::Intersection { observer, entries } => {
                self.on_intersection(observer, &entries);
                false
            }
            SiteEvent::Frame(frame) => {
                if let Some(particles) = self.particles.as_mut() {
                    particles.on_frame(&mut self.host, frame);
                }
                false
            }
            SiteEvent::Timer(timer) => {
                if self.resize.take_due(timer) {
                    self.broadcast_resize();
                }
                false
            }
            SiteEvent::ImageReady { image, token } => {
                if let Some(modal) = self.modal.as_mut() {
                    if modal.elements().image == image {
                        modal.on_image_ready(&mut self.host, self.animator.as_mut(), token);
                    }
                }
                false
            }
            SiteEvent::AnimationComplete(handle) => {
                if let Some(modal) = self.modal.as_mut() {
                    modal.on_animation_complete(&mut self.host, self.animator.as_mut(), handle);
                }
                false
            }
            SiteEvent::PointerMove { x, y } => {
                if let Some(glow) = self.glow.as_mut() {
                    glow.on_pointer_move(&mut self.host, self.animator.as_mut(), x, y);
                }
                false
            }
            SiteEvent::ReducedMotionChanged(reduced) => {
                self.env.set_reduced_motion(reduced);
                false
            }
        }
    }

    fn on_click(&mut self, target: ElementId) -> bool {
        match self.dispatcher.resolve(&self.host, target, RoleSet::CLICK) {
            Some((role, element)) => self.activate(role, element),
            None => false,
        }
    }

    fn on_key(&mut self, event: &KeyboardEvent) -> bool {
        if !event.is_press() {
            return false;
        }

        if let Some(modal) = self.modal.as_mut() {
            if modal.is_open() {
                return modal.on_key(&mut self.host, self.animator.as_mut(), &mut self.lock, event);
            }
        }

        if let Some(nav) = self.nav.as_mut() {
            if nav.on_key(&mut self.host, &mut self.lock, event) {
                return true;
            }
        }

        if event.is_activation() && !event.modifiers.has_command() {
            let focused = self.host.active_element();
            let resolved = focused.and_then(|f| self.dispatcher.resolve(&self.host, f, RoleSet::ACTIVATE));
            if let Some((role, element)) = resolved {
                return self.activate(role, element);
            }
        }
        false
    }

    /// Run the handler for `role` on `element`. Returns whether the
    /// default action should be suppressed.
    fn activate(&mut self, role: Role, element: ElementId) -> bool {
        let host = &mut self.host;
        let animator = self.animator.as_mut();
        let lock = &mut self.lock;

        match role {
            Role::GalleryItem => {
                let Some(modal) = self.modal.as_mut() else {
                    return false;
                };
                match modal.trigger_index(&*host, element) {
                    Some(index) => {
                        modal.open(host, animator, lock, index, Some(element));
                        true
                    }
                    None => false,
                }
            }
            Role::ModalClose | Role::ModalOverlay => {
                if let Some(modal) = self.modal.as_mut() {
                    modal.close(host, animator, lock);
                }
                true
            }
            Role::ModalPrev => {
                if let Some(modal) = self.modal.as_mut() {
                    modal.show_previous(host, animator);
                }
                true
            }
            Role::ModalNext => {
                if let Some(modal) = self.modal.as_mut() {
                    modal.show_next(host, animator);
                }
                true
            }
            Role::NavToggle => {
                if let Some(nav) = self.nav.as_mut() {
                    nav.toggle(host, lock);
                }
                true
            }
            // Anchor navigation proceeds normally
            Role::NavLink => {
                if let Some(nav) = self.nav.as_mut() {
                    nav.close(host, lock);
                }
                false
            }
        }
    }

    fn on_intersection(&mut self, observer: ObserverHandle, entries: &[IntersectionEntry]) {
        if self.sections.owns(observer) {
            self.sections.on_entries(&mut self.host, entries);
        }
        if let Some(particles) = self.particles.as_mut() {
            if particles.owns_observer(observer) {
                particles.on_entries(&mut self.host, entries);
            }
        }
    }

    fn broadcast_resize(&mut self) {
        let mut subscribers = self.resize.take_subscribers();
        for subscriber in subscribers.iter_mut() {
            subscriber(self);
        }
        self.resize.restore_subscribers(subscribers);
        tracing::debug!(broadcasts = self.resize.broadcasts(), "resize broadcast");
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn lock(&self) -> &ScrollLock {
        &self.lock
    }

    pub fn header(&self) -> &HeaderState {
        &self.header
    }

    pub fn sections(&self) -> &SectionTracker {
        &self.sections
    }

    pub fn particles(&self) -> Option<&ParticleField> {
        self.particles.as_ref()
    }

    pub fn modal(&self) -> Option<&ModalNavigator> {
        self.modal.as_ref()
    }

    pub fn nav(&self) -> Option<&MobileNav> {
        self.nav.as_ref()
    }

    pub fn glow(&self) -> Option<&PointerGlow> {
        self.glow.as_ref()
    }

    pub fn scopes(&self) -> &BreakpointScopes {
        &self.scopes
    }

    pub fn resize_broadcasts(&self) -> u64 {
        self.resize.broadcasts()
    }

    pub fn is_resize_pending(&self) -> bool {
        self.resize.is_pending()
    }
}

// =============================================================================
// Tests
// =============================================================================
