//! Modal Navigator - Full-screen gallery browser
//!
//! States: `Closed` and `Open { current, pending transition }`.
//!
//! Switching images is asynchronous: fade the current image out, swap the
//! caption, load the new resource, fade it in once it is ready. Every
//! switch issues a new transition token; a fade completion or readiness
//! signal carrying an older token is dropped, so rapid navigation only ever
//! shows the latest target.
//!
//! While open the modal holds the scroll lock, traps Tab focus and handles
//! Escape / ArrowLeft / ArrowRight. Closing returns focus to the gallery
//! element that opened it.

use crate::animator::{AnimationOutcome, Animator, Ease, Properties, Timeline, Tween};
use crate::config::ModalConfig;
use crate::error::parse_index_attribute;
use crate::host::Host;
use crate::types::{AnimationHandle, ElementId};

use super::focus::{FocusHistory, FocusTrap};
use super::keyboard::KeyboardEvent;
use super::scroll_lock::ScrollLock;

/// Identifies one image-switch request.
pub type TransitionToken = u64;

// =============================================================================
// ITEMS
// =============================================================================

/// One gallery entry as shown in the modal.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Item {
    pub thumbnail_url: String,
    pub high_res_url: String,
    pub alt: String,
    pub title: String,
    pub description: String,
}

/// Full-size variant of a CDN thumbnail URL: the `w=` query parameter is
/// rewritten to `width`. URLs without one are returned unchanged.
pub fn high_res_url(thumbnail: &str, width: u32) -> String {
    let Some((base, query)) = thumbnail.split_once('?') else {
        return thumbnail.to_string();
    };
    let mut found = false;
    let params: Vec<String> = query
        .split('&')
        .map(|param| {
            if param.starts_with("w=") {
                found = true;
                format!("w={}", width)
            } else {
                param.to_string()
            }
        })
        .collect();
    if !found {
        return thumbnail.to_string();
    }
    format!("{}?{}", base, params.join("&"))
}

// =============================================================================
// ELEMENTS
// =============================================================================

#[derive(Debug, Clone, Copy)]
pub struct LightboxElements {
    pub root: ElementId,
    pub image: ElementId,
    pub overlay: Option<ElementId>,
    pub title: Option<ElementId>,
    pub description: Option<ElementId>,
    pub counter: Option<ElementId>,
    pub close: Option<ElementId>,
    pub prev: Option<ElementId>,
    pub next: Option<ElementId>,
}

impl LightboxElements {
    fn resolve(host: &dyn Host, config: &ModalConfig) -> Option<Self> {
        let root = host.query(&config.root)?;
        let find = |selector: &str| host.query_within(root, selector).into_iter().next();
        Some(Self {
            root,
            image: find(&config.image)?,
            overlay: find(&config.overlay),
            title: find(&config.title),
            description: find(&config.description),
            counter: find(&config.counter),
            close: find(&config.close),
            prev: find(&config.prev),
            next: find(&config.next),
        })
    }
}

// =============================================================================
// NAVIGATOR
// =============================================================================

pub struct ModalNavigator {
    elements: LightboxElements,
    triggers: Vec<ElementId>,
    gallery_selector: String,
    items: Vec<Item>,
    high_res_width: u32,
    open_class: String,
    fade_out: Tween,
    fade_in: Tween,

    open: bool,
    current: usize,
    next_token: TransitionToken,
    pending: Option<TransitionToken>,
    fading_out: Option<(AnimationHandle, TransitionToken)>,

    trap: FocusTrap,
    history: FocusHistory,
}

impl ModalNavigator {
    /// Resolve the lightbox and its gallery triggers.
    ///
    /// Returns `None` when the page has no lightbox (or no image inside it).
    /// Gallery items with a malformed `data-index` are skipped.
    pub fn mount(host: &mut dyn Host, config: &ModalConfig) -> Option<Self> {
        let Some(elements) = LightboxElements::resolve(host, config) else {
            tracing::debug!(selector = %config.root, "no lightbox on page");
            return None;
        };

        let mut keyed: Vec<(usize, ElementId)> = Vec::new();
        for (position, element) in host.query_all(&config.gallery_item).into_iter().enumerate() {
            match host.attribute(element, "data-index") {
                None => keyed.push((position, element)),
                Some(raw) => match parse_index_attribute("data-index", &raw) {
                    Ok(index) => keyed.push((index, element)),
                    Err(err) => tracing::warn!(%err, "skipping gallery item"),
                },
            }
        }
        keyed.sort_by_key(|&(key, _)| key);
        let triggers: Vec<ElementId> = keyed.into_iter().map(|(_, element)| element).collect();

        for &trigger in &triggers {
            host.set_attribute(trigger, "tabindex", "0");
            host.set_attribute(trigger, "role", "button");
        }
        host.set_attribute(elements.root, "aria-hidden", "true");

        Some(Self {
            elements,
            triggers,
            gallery_selector: config.gallery_item.clone(),
            items: Vec::new(),
            high_res_width: config.high_res_width,
            open_class: config.open_class.clone(),
            fade_out: Tween::new(config.fade_out_secs, Ease::Power2InOut),
            fade_in: Tween::new(config.fade_in_secs, Ease::Power2Out),
            open: false,
            current: 0,
            next_token: 1,
            pending: None,
            fading_out: None,
            trap: FocusTrap::new(elements.root, config.focusable.clone()),
            history: FocusHistory::new(),
        })
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn pending_transition(&self) -> Option<TransitionToken> {
        self.pending
    }

    pub fn elements(&self) -> &LightboxElements {
        &self.elements
    }

    pub fn triggers(&self) -> &[ElementId] {
        &self.triggers
    }

    /// Index of the gallery trigger that is (or contains) `element`.
    pub fn trigger_index(&self, host: &dyn Host, element: ElementId) -> Option<usize> {
        let trigger = host.closest(element, &self.gallery_selector)?;
        self.triggers.iter().position(|&t| t == trigger)
    }

    // -------------------------------------------------------------------------
    // Open / close
    // -------------------------------------------------------------------------

    fn collect_items(&self, host: &dyn Host) -> Vec<Item> {
        self.triggers
            .iter()
            .map(|&trigger| {
                let image = host.query_within(trigger, "img").into_iter().next();
                let from_image = |name: &str| image.and_then(|img| host.attribute(img, name));
                let from_either = |name: &str| host.attribute(trigger, name).or_else(|| from_image(name));

                let thumbnail_url = from_image("src").unwrap_or_default();
                let high_res_url = host
                    .attribute(trigger, "data-full")
                    .unwrap_or_else(|| high_res_url(&thumbnail_url, self.high_res_width));
                Item {
                    high_res_url,
                    thumbnail_url,
                    alt: from_image("alt").unwrap_or_default(),
                    title: from_either("data-title").unwrap_or_default(),
                    description: from_either("data-description").unwrap_or_default(),
                }
            })
            .collect()
    }

    /// Open at `index`, remembering `trigger` for focus return.
    pub fn open(
        &mut self,
        host: &mut dyn Host,
        animator: &mut dyn Animator,
        lock: &mut ScrollLock,
        index: usize,
        trigger: Option<ElementId>,
    ) {
        self.items = self.collect_items(host);
        if self.items.is_empty() {
            return;
        }
        let image = self.elements.image;

        if !self.open {
            if let Some(origin) = trigger.or_else(|| host.active_element()) {
                self.history.save(origin);
            }
        }

        self.cancel_transition(host, animator);
        self.current = index.min(self.items.len() - 1);
        self.show_caption(host);
        let src = self.items[self.current].high_res_url.clone();
        host.set_image_source(image, &src);
        host.set_style(image, "opacity", "1");

        host.set_class(self.elements.root, &self.open_class, true);
        host.set_attribute(self.elements.root, "aria-hidden", "false");

        if !self.open {
            self.open = true;
            lock.acquire(host);

            host.set_style(image, "transform", "translate(0px, 0px) scale(0.95)");
            let mut entrance = Timeline::new();
            if let Some(overlay) = self.elements.overlay {
                host.set_style(overlay, "opacity", "0");
                entrance = entrance.to(overlay, Properties::new().opacity(1.0), Tween::new(0.3, Ease::Power2Out));
            }
            entrance = entrance.to_at(
                image,
                Properties::new().scale(1.0),
                Tween::new(0.4, Ease::Power3Out),
                -0.15,
            );
            animator.play(host, entrance);
        }

        if let Some(close) = self.elements.close {
            host.focus(close);
        }
        tracing::debug!(index = self.current, items = self.items.len(), "lightbox opened");
    }

    /// Close and hand focus back to the opener.
    pub fn close(&mut self, host: &mut dyn Host, animator: &mut dyn Animator, lock: &mut ScrollLock) {
        if !self.open {
            return;
        }
        let image = self.elements.image;

        self.cancel_transition(host, animator);
        host.set_style(image, "opacity", "1");
        host.set_style(image, "transform", "none");

        host.set_class(self.elements.root, &self.open_class, false);
        host.set_attribute(self.elements.root, "aria-hidden", "true");

        self.open = false;
        lock.release(host);
        self.history.restore(host);
        tracing::debug!("lightbox closed");
    }

    /// Drop whatever transition is in flight: tweens are killed, image
    /// listeners removed, and the token cleared so late signals are ignored.
    fn cancel_transition(&mut self, host: &mut dyn Host, animator: &mut dyn Animator) {
        let image = self.elements.image;
        animator.kill_in_flight(image);
        host.unwatch_image(image);
        self.pending = None;
        self.fading_out = None;
    }

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------

    pub fn show_previous(&mut self, host: &mut dyn Host, animator: &mut dyn Animator) {
        if !self.open || self.items.is_empty() {
            return;
        }
        let count = self.items.len();
        self.current = (self.current + count - 1) % count;
        self.transition(host, animator);
    }

    pub fn show_next(&mut self, host: &mut dyn Host, animator: &mut dyn Animator) {
        if !self.open || self.items.is_empty() {
            return;
        }
        self.current = (self.current + 1) % self.items.len();
        self.transition(host, animator);
    }

    /// Start switching to the current item under a fresh token.
    fn transition(&mut self, host: &mut dyn Host, animator: &mut dyn Animator) {
        let token = self.next_token;
        self.next_token += 1;
        self.pending = Some(token);
        self.fading_out = None;

        let image = self.elements.image;
        animator.kill_in_flight(image);
        match animator.animate_to(host, image, Properties::new().opacity(0.0), self.fade_out) {
            AnimationOutcome::Completed => self.on_faded_out(host, animator, token),
            AnimationOutcome::Pending(handle) => self.fading_out = Some((handle, token)),
        }
    }

    /// An animation finished. Returns whether it was this modal's fade-out.
    pub fn on_animation_complete(
        &mut self,
        host: &mut dyn Host,
        animator: &mut dyn Animator,
        handle: AnimationHandle,
    ) -> bool {
        match self.fading_out {
            Some((pending, token)) if pending == handle => {
                self.fading_out = None;
                self.on_faded_out(host, animator, token);
                true
            }
            _ => false,
        }
    }

    fn on_faded_out(&mut self, host: &mut dyn Host, animator: &mut dyn Animator, token: TransitionToken) {
        if self.pending != Some(token) {
            return;
        }
        self.show_caption(host);

        let image = self.elements.image;
        let src = self.items[self.current].high_res_url.clone();
        host.unwatch_image(image);
        host.watch_image(image, token);
        // Cached resources may not signal readiness again
        if host.set_image_source(image, &src) {
            self.on_image_ready(host, animator, token);
        }
    }

    /// The image element signalled readiness for `token`. Stale tokens are
    /// ignored. Returns whether the image was faded in.
    pub fn on_image_ready(
        &mut self,
        host: &mut dyn Host,
        animator: &mut dyn Animator,
        token: TransitionToken,
    ) -> bool {
        if !self.open || self.pending != Some(token) {
            tracing::trace!(token, "stale image readiness dropped");
            return false;
        }
        let image = self.elements.image;
        host.unwatch_image(image);
        self.pending = None;
        animator.animate_to(host, image, Properties::new().opacity(1.0), self.fade_in);
        true
    }

    fn show_caption(&self, host: &mut dyn Host) {
        let item = &self.items[self.current];
        host.set_attribute(self.elements.image, "alt", &item.alt);
        if let Some(title) = self.elements.title {
            host.set_text(title, &item.title);
        }
        if let Some(description) = self.elements.description {
            host.set_text(description, &item.description);
        }
        if let Some(counter) = self.elements.counter {
            host.set_text(counter, &format!("{} / {}", self.current + 1, self.items.len()));
        }
    }

    // -------------------------------------------------------------------------
    // Keyboard
    // -------------------------------------------------------------------------

    /// Keyboard contract while open. Returns whether the key was consumed.
    pub fn on_key(
        &mut self,
        host: &mut dyn Host,
        animator: &mut dyn Animator,
        lock: &mut ScrollLock,
        event: &KeyboardEvent,
    ) -> bool {
        if !self.open || !event.is_press() {
            return false;
        }
        match event.key.as_str() {
            "Escape" => {
                self.close(host, animator, lock);
                true
            }
            "ArrowLeft" => {
                self.show_previous(host, animator);
                true
            }
            "ArrowRight" => {
                self.show_next(host, animator);
                true
            }
            "Tab" => self.trap.handle_tab(host, event.modifiers.shift),
            _ => false,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animator::{AnimationQueue, QueuedAnimator, StaticAnimator};
    use crate::host::fixture::{brochure_page, thumbnail_url, BrochurePage};
    use crate::host::MemoryHost;
    use crate::state::keyboard::Modifiers;
    use crate::types::Viewport;

    struct Fixture {
        host: MemoryHost,
        page: BrochurePage,
        modal: ModalNavigator,
        lock: ScrollLock,
    }

    fn setup(items: usize) -> Fixture {
        let (mut host, page) = brochure_page(Viewport::new(1280.0, 800.0), items);
        let modal = ModalNavigator::mount(&mut host, &ModalConfig::default()).unwrap();
        Fixture {
            host,
            page,
            modal,
            lock: ScrollLock::new("no-scroll"),
        }
    }

    fn full(index: usize) -> String {
        high_res_url(&thumbnail_url(index), 1600)
    }

    fn image_src(f: &Fixture) -> Option<String> {
        f.host.attribute(f.page.modal.image, "src")
    }

    fn key(f: &mut Fixture, animator: &mut dyn Animator, event: KeyboardEvent) -> bool {
        f.modal.on_key(&mut f.host, animator, &mut f.lock, &event)
    }

    #[test]
    fn test_high_res_url() {
        assert_eq!(
            high_res_url("https://cdn.example.com/a.jpg?w=600&q=80", 1600),
            "https://cdn.example.com/a.jpg?w=1600&q=80"
        );
        assert_eq!(high_res_url("/img/a.jpg", 1600), "/img/a.jpg");
        assert_eq!(high_res_url("/img/a.jpg?q=80", 1600), "/img/a.jpg?q=80");
    }

    #[test]
    fn test_mount_makes_triggers_keyboard_reachable() {
        let f = setup(3);
        assert_eq!(f.modal.triggers().len(), 3);
        for &trigger in f.modal.triggers() {
            assert_eq!(f.host.attribute(trigger, "role").as_deref(), Some("button"));
            assert_eq!(f.host.attribute(trigger, "tabindex").as_deref(), Some("0"));
        }
        assert!(!f.modal.is_open());
    }

    #[test]
    fn test_missing_lightbox_is_noop() {
        let mut host = MemoryHost::new(Viewport::new(1280.0, 800.0));
        assert!(ModalNavigator::mount(&mut host, &ModalConfig::default()).is_none());
    }

    #[test]
    fn test_malformed_index_skips_item_and_order_follows_index() {
        let (mut host, page) = brochure_page(Viewport::new(1280.0, 800.0), 3);
        host.set_attribute(page.gallery_items[0], "data-index", "5");
        host.set_attribute(page.gallery_items[1], "data-index", "oops");
        let modal = ModalNavigator::mount(&mut host, &ModalConfig::default()).unwrap();

        assert_eq!(modal.triggers(), &[page.gallery_items[2], page.gallery_items[0]]);
    }

    #[test]
    fn test_open_populates_and_locks() {
        let mut f = setup(5);
        let mut animator = StaticAnimator;
        let trigger = f.page.gallery_items[2];

        f.modal.open(&mut f.host, &mut animator, &mut f.lock, 2, Some(trigger));

        let m = &f.page.modal;
        assert!(f.modal.is_open());
        assert_eq!(f.modal.current_index(), 2);
        assert_eq!(f.modal.items()[2].thumbnail_url, thumbnail_url(2));
        assert_eq!(image_src(&f), Some(full(2)));
        assert_eq!(f.host.attribute(m.image, "alt").as_deref(), Some("Photo 3"));
        assert_eq!(f.host.text(m.title), "Project 3");
        assert_eq!(f.host.text(m.description), "Description of project 3");
        assert_eq!(f.host.text(m.counter), "3 / 5");
        assert!(f.host.has_class(m.root, "active"));
        assert_eq!(f.host.attribute(m.root, "aria-hidden").as_deref(), Some("false"));
        assert!(f.lock.is_locked());
        assert_eq!(f.host.active_element(), Some(m.close));
        // Entrance timeline applied its end state
        assert_eq!(f.host.style(m.overlay, "opacity").as_deref(), Some("1"));
    }

    #[test]
    fn test_close_restores_focus_and_releases() {
        let mut f = setup(3);
        let mut animator = StaticAnimator;
        let trigger = f.page.gallery_items[1];

        f.modal.open(&mut f.host, &mut animator, &mut f.lock, 1, Some(trigger));
        f.modal.close(&mut f.host, &mut animator, &mut f.lock);

        assert!(!f.modal.is_open());
        assert!(!f.lock.is_locked());
        assert!(!f.host.has_class(f.page.modal.root, "active"));
        assert_eq!(f.host.active_element(), Some(trigger));

        // Second close must not release somebody else's hold
        f.lock.acquire(&mut f.host);
        f.modal.close(&mut f.host, &mut animator, &mut f.lock);
        assert!(f.lock.is_locked());
    }

    #[test]
    fn test_reopen_while_open_keeps_single_hold() {
        let mut f = setup(3);
        let mut animator = StaticAnimator;
        f.modal.open(&mut f.host, &mut animator, &mut f.lock, 0, None);
        f.modal.open(&mut f.host, &mut animator, &mut f.lock, 1, None);
        assert_eq!(f.lock.count(), 1);
        assert_eq!(f.modal.current_index(), 1);
    }

    #[test]
    fn test_index_circularity() {
        let mut f = setup(5);
        let mut animator = StaticAnimator;
        f.modal.open(&mut f.host, &mut animator, &mut f.lock, 0, None);

        f.modal.show_previous(&mut f.host, &mut animator);
        assert_eq!(f.modal.current_index(), 4);

        f.modal.show_next(&mut f.host, &mut animator);
        assert_eq!(f.modal.current_index(), 0);
    }

    #[test]
    fn test_keyboard_contract() {
        let mut f = setup(5);
        let mut animator = StaticAnimator;

        // Nothing consumed while closed
        assert!(!key(&mut f, &mut animator, KeyboardEvent::new("ArrowRight")));

        f.modal.open(&mut f.host, &mut animator, &mut f.lock, 0, None);
        assert!(key(&mut f, &mut animator, KeyboardEvent::new("ArrowRight")));
        assert_eq!(f.modal.current_index(), 1);
        assert!(key(&mut f, &mut animator, KeyboardEvent::new("ArrowLeft")));
        assert!(key(&mut f, &mut animator, KeyboardEvent::new("ArrowLeft")));
        assert_eq!(f.modal.current_index(), 4);
        assert!(!key(&mut f, &mut animator, KeyboardEvent::new("a")));

        assert!(key(&mut f, &mut animator, KeyboardEvent::new("Escape")));
        assert!(!f.modal.is_open());
    }

    #[test]
    fn test_focus_trap_while_open() {
        let mut f = setup(2);
        let mut animator = StaticAnimator;
        f.modal.open(&mut f.host, &mut animator, &mut f.lock, 0, None);
        let m = f.page.modal.clone();

        // close -> prev -> next are the focusables
        assert!(key(&mut f, &mut animator, KeyboardEvent::with_modifiers("Tab", Modifiers::shift())));
        assert_eq!(f.host.active_element(), Some(m.next));
        assert!(key(&mut f, &mut animator, KeyboardEvent::new("Tab")));
        assert_eq!(f.host.active_element(), Some(m.close));
        assert!(!key(&mut f, &mut animator, KeyboardEvent::new("Tab")));
    }

    #[test]
    fn test_static_transition_swaps_on_readiness() {
        let mut f = setup(3);
        let mut animator = StaticAnimator;
        f.modal.open(&mut f.host, &mut animator, &mut f.lock, 0, None);

        f.modal.show_next(&mut f.host, &mut animator);
        let token = f.modal.pending_transition().unwrap();
        assert_eq!(image_src(&f), Some(full(1)));
        assert_eq!(f.host.text(f.page.modal.counter), "2 / 3");
        assert_eq!(f.host.style(f.page.modal.image, "opacity").as_deref(), Some("0"));
        assert_eq!(f.host.image_listeners(f.page.modal.image), 1);

        assert!(f.modal.on_image_ready(&mut f.host, &mut animator, token));
        assert_eq!(f.host.style(f.page.modal.image, "opacity").as_deref(), Some("1"));
        assert_eq!(f.host.image_listeners(f.page.modal.image), 0);
        assert!(f.modal.pending_transition().is_none());
    }

    #[test]
    fn test_cached_image_fades_in_without_signal() {
        let mut f = setup(3);
        let mut animator = StaticAnimator;
        f.host.mark_cached(&full(1));
        f.modal.open(&mut f.host, &mut animator, &mut f.lock, 0, None);

        f.modal.show_next(&mut f.host, &mut animator);
        assert!(f.modal.pending_transition().is_none());
        assert_eq!(f.host.style(f.page.modal.image, "opacity").as_deref(), Some("1"));
        assert_eq!(f.host.image_listeners(f.page.modal.image), 0);
    }

    #[test]
    fn test_stale_readiness_is_dropped() {
        let mut f = setup(5);
        let mut animator = StaticAnimator;
        f.modal.open(&mut f.host, &mut animator, &mut f.lock, 0, None);

        f.modal.show_next(&mut f.host, &mut animator);
        let first = f.modal.pending_transition().unwrap();
        f.modal.show_next(&mut f.host, &mut animator);
        let second = f.modal.pending_transition().unwrap();
        assert!(second > first);

        // Old listener removed before the new one was attached
        assert_eq!(f.host.image_listeners(f.page.modal.image), 1);
        assert_eq!(f.host.latest_image_token(f.page.modal.image), Some(second));

        // First resource reports late: no fade-in, no flash
        assert!(!f.modal.on_image_ready(&mut f.host, &mut animator, first));
        assert_eq!(f.host.style(f.page.modal.image, "opacity").as_deref(), Some("0"));

        assert!(f.modal.on_image_ready(&mut f.host, &mut animator, second));
        assert_eq!(image_src(&f), Some(full(2)));
        assert_eq!(f.host.text(f.page.modal.counter), "3 / 5");
        assert_eq!(f.host.style(f.page.modal.image, "opacity").as_deref(), Some("1"));
    }

    fn finish_fades(f: &mut Fixture, animator: &mut QueuedAnimator, queue: &AnimationQueue) {
        for handle in queue.finish_all(&mut f.host) {
            f.modal.on_animation_complete(&mut f.host, animator, handle);
        }
    }

    #[test]
    fn test_rapid_navigation_with_tweens_shows_only_latest() {
        let mut f = setup(5);
        let (mut animator, queue) = QueuedAnimator::new();
        f.modal.open(&mut f.host, &mut animator, &mut f.lock, 0, None);
        finish_fades(&mut f, &mut animator, &queue);

        f.modal.show_next(&mut f.host, &mut animator);
        f.modal.show_next(&mut f.host, &mut animator);
        // First fade-out was killed
        assert_eq!(queue.in_flight_for(f.page.modal.image), 1);
        // Source untouched until a fade-out completes
        assert_eq!(image_src(&f), Some(full(0)));

        finish_fades(&mut f, &mut animator, &queue);
        assert_eq!(image_src(&f), Some(full(2)));

        let token = f.modal.pending_transition().unwrap();
        assert!(f.modal.on_image_ready(&mut f.host, &mut animator, token));
        finish_fades(&mut f, &mut animator, &queue);
        assert_eq!(f.host.style(f.page.modal.image, "opacity").as_deref(), Some("1"));
    }

    #[test]
    fn test_close_suppresses_in_flight_transition() {
        let mut f = setup(5);
        let (mut animator, queue) = QueuedAnimator::new();
        f.modal.open(&mut f.host, &mut animator, &mut f.lock, 0, None);
        f.modal.show_next(&mut f.host, &mut animator);
        assert_eq!(queue.in_flight_for(f.page.modal.image), 1);

        f.modal.close(&mut f.host, &mut animator, &mut f.lock);
        assert_eq!(queue.in_flight_for(f.page.modal.image), 0);
        assert_eq!(f.host.image_listeners(f.page.modal.image), 0);
        assert!(f.modal.pending_transition().is_none());

        // Whatever is left (the overlay entrance) is not a fade-out
        for handle in queue.finish_all(&mut f.host) {
            assert!(!f.modal.on_animation_complete(&mut f.host, &mut animator, handle));
        }
        assert_eq!(f.host.style(f.page.modal.image, "opacity").as_deref(), Some("1"));
        assert_eq!(image_src(&f), Some(full(0)));
    }

    #[test]
    fn test_trigger_index_includes_children() {
        let f = setup(3);
        let child = f.host.query_within(f.page.gallery_items[1], "img")[0];
        assert_eq!(f.modal.trigger_index(&f.host, child), Some(1));
        assert_eq!(f.modal.trigger_index(&f.host, f.page.gallery_items[2]), Some(2));
        assert_eq!(f.modal.trigger_index(&f.host, f.page.header), None);
    }
}
