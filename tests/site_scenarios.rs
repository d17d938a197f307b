//! End-to-end scenarios driving a mounted `Site` on the in-memory host.
//!
//! The driver plays the browser: it advances the virtual clock, drains
//! frame requests and reports intersections and image loads back as
//! `SiteEvent`s.
//!
//! Run with: cargo test --test site_scenarios

use spark_site::host::fixture::{brochure_page, BrochurePage};
use spark_site::{
    Capabilities, Host, IntersectionEntry, KeyboardEvent, MemoryHost, PointerCapability, Site,
    SiteConfig, SiteEvent, StaticAnimator, Viewport,
};

// =============================================================================
// DRIVER
// =============================================================================

fn config() -> SiteConfig {
    SiteConfig::from_json(r#"{ "particles": { "seed": 42 } }"#).unwrap()
}

fn mount(viewport: Viewport, capabilities: Capabilities) -> (Site<MemoryHost>, BrochurePage) {
    let (host, page) = brochure_page(viewport, 5);
    let site = Site::mount(host, config(), capabilities, Box::new(StaticAnimator));
    (site, page)
}

fn desktop() -> (Site<MemoryHost>, BrochurePage) {
    let capabilities = Capabilities {
        pointer: PointerCapability::all(),
        ..Capabilities::default()
    };
    mount(Viewport::new(1280.0, 800.0), capabilities)
}

fn phone() -> (Site<MemoryHost>, BrochurePage) {
    mount(Viewport::new(390.0, 844.0), Capabilities::default())
}

/// Run every pending frame once. Returns how many ran.
fn pump_frames(site: &mut Site<MemoryHost>) -> usize {
    let frames = site.host_mut().take_frames();
    let count = frames.len();
    for frame in frames {
        site.handle(SiteEvent::Frame(frame));
    }
    count
}

/// Advance the clock and deliver the timers that came due.
fn advance(site: &mut Site<MemoryHost>, ms: u64) {
    for timer in site.host_mut().advance(ms) {
        site.handle(SiteEvent::Timer(timer));
    }
}

fn hero_visibility(site: &mut Site<MemoryHost>, page: &BrochurePage, visible: bool) {
    let hero = page.sections[0];
    // The particle field observes the hero alone
    let observer = site
        .host()
        .observers()
        .iter()
        .find(|(_, record)| record.targets == vec![hero])
        .map(|(handle, _)| *handle)
        .unwrap();
    site.handle(SiteEvent::Intersection {
        observer,
        entries: vec![IntersectionEntry {
            target: hero,
            is_intersecting: visible,
        }],
    });
}

fn body_locked(site: &Site<MemoryHost>) -> bool {
    let body = site.host().body().unwrap();
    site.host().has_class(body, "no-scroll")
}

// =============================================================================
// SCROLL LOCK
// =============================================================================

#[test]
fn menu_and_modal_share_the_scroll_lock() {
    let (mut site, page) = phone();

    site.handle(SiteEvent::Click { target: page.nav_toggle });
    assert!(body_locked(&site));

    site.handle(SiteEvent::Click { target: page.gallery_items[1] });
    assert_eq!(site.lock().count(), 2);

    // Closing the modal leaves the menu's hold in place
    site.handle(SiteEvent::Click { target: page.modal.close });
    assert!(body_locked(&site));
    assert_eq!(site.lock().count(), 1);

    site.handle(SiteEvent::Click { target: page.nav_toggle });
    assert!(!body_locked(&site));
    assert_eq!(site.lock().count(), 0);
}

#[test]
fn redundant_closes_never_underflow() {
    let (mut site, page) = phone();
    site.handle(SiteEvent::Click { target: page.modal.close });
    site.handle(SiteEvent::Key(KeyboardEvent::new("Escape")));
    assert_eq!(site.lock().count(), 0);

    site.handle(SiteEvent::Click { target: page.nav_toggle });
    assert_eq!(site.lock().count(), 1);
}

// =============================================================================
// VISIBILITY GATING
// =============================================================================

#[test]
fn particle_loop_halts_while_hero_is_hidden() {
    let (mut site, page) = desktop();
    assert_eq!(pump_frames(&mut site), 1);
    assert_eq!(pump_frames(&mut site), 1);
    let rendered = site.particles().unwrap().frames_rendered();
    assert_eq!(rendered, 2);

    hero_visibility(&mut site, &page, false);
    // The already-requested frame runs once, sees the flag and stops
    assert_eq!(pump_frames(&mut site), 1);
    assert_eq!(site.host().pending_frames(), 0);
    assert!(!site.particles().unwrap().is_running());
    assert_eq!(site.particles().unwrap().frames_rendered(), rendered);

    hero_visibility(&mut site, &page, true);
    assert!(site.particles().unwrap().is_running());
    assert_eq!(pump_frames(&mut site), 1);
    assert_eq!(site.particles().unwrap().frames_rendered(), rendered + 1);
}

#[test]
fn repeated_visible_entries_keep_a_single_loop() {
    let (mut site, page) = desktop();
    hero_visibility(&mut site, &page, true);
    hero_visibility(&mut site, &page, true);
    assert_eq!(site.host().pending_frames(), 1);
}

// =============================================================================
// RESIZE
// =============================================================================

#[test]
fn resize_burst_broadcasts_once_after_quiet_period() {
    let (mut site, page) = desktop();

    for _ in 0..5 {
        site.handle(SiteEvent::Resize);
        advance(&mut site, 100);
    }
    assert_eq!(site.resize_broadcasts(), 0);
    assert!(site.is_resize_pending());

    site.host_mut().set_viewport(Viewport::new(900.0, 700.0));
    site.host_mut().set_element_size(page.sections[0], spark_site::Size::new(900.0, 700.0));
    advance(&mut site, 200);

    assert_eq!(site.resize_broadcasts(), 1);
    assert!(!site.is_resize_pending());
    assert_eq!(site.env().viewport.get(), Viewport::new(900.0, 700.0));

    let particles = site.particles().unwrap();
    assert_eq!(particles.particles().len(), 60);
    assert_eq!(particles.bounds().width, 900.0);
    // Old frame cancelled, exactly one new one pending
    assert_eq!(site.host().pending_frames(), 1);
}

#[test]
fn widening_past_breakpoint_closes_mobile_menu() {
    let (mut site, page) = phone();
    site.handle(SiteEvent::Click { target: page.nav_toggle });

    site.host_mut().set_viewport(Viewport::new(1280.0, 800.0));
    site.handle(SiteEvent::Resize);
    advance(&mut site, 200);

    assert!(site.nav().is_some_and(|nav| !nav.is_open()));
    assert!(!body_locked(&site));
}

// =============================================================================
// NAVIGATION
// =============================================================================

#[test]
fn intersection_batches_highlight_nav_links() {
    let (mut site, page) = desktop();
    let observer = site.sections().observer().unwrap();

    site.handle(SiteEvent::Intersection {
        observer,
        entries: vec![
            IntersectionEntry {
                target: page.sections[0],
                is_intersecting: false,
            },
            IntersectionEntry {
                target: page.sections[3],
                is_intersecting: true,
            },
        ],
    });

    assert!(site.host().has_class(page.nav_links[3], "active"));
    assert!(!site.host().has_class(page.nav_links[0], "active"));
    assert_eq!(site.sections().active_section().as_deref(), Some("gallery"));
}

// =============================================================================
// MODAL
// =============================================================================

#[test]
fn rapid_navigation_never_shows_stale_image() {
    let (mut site, page) = desktop();
    site.handle(SiteEvent::Click { target: page.gallery_items[0] });

    site.handle(SiteEvent::Key(KeyboardEvent::new("ArrowRight")));
    let first = site.modal().and_then(|m| m.pending_transition()).unwrap();
    site.handle(SiteEvent::Key(KeyboardEvent::new("ArrowRight")));
    let second = site.modal().and_then(|m| m.pending_transition()).unwrap();

    site.handle(SiteEvent::ImageReady {
        image: page.modal.image,
        token: first,
    });
    assert_eq!(site.host().style(page.modal.image, "opacity").as_deref(), Some("0"));

    site.handle(SiteEvent::ImageReady {
        image: page.modal.image,
        token: second,
    });
    assert_eq!(site.host().style(page.modal.image, "opacity").as_deref(), Some("1"));
    assert_eq!(site.host().text(page.modal.counter), "3 / 5");
    assert_eq!(site.host().image_listeners(page.modal.image), 0);
}

#[test]
fn modal_wraps_in_both_directions() {
    let (mut site, page) = desktop();
    site.handle(SiteEvent::Click { target: page.gallery_items[0] });

    site.handle(SiteEvent::Click { target: page.modal.prev });
    assert_eq!(site.modal().map(|m| m.current_index()), Some(4));
    site.handle(SiteEvent::Click { target: page.modal.next });
    assert_eq!(site.modal().map(|m| m.current_index()), Some(0));
}

#[test]
fn overlay_click_closes_and_returns_focus() {
    let (mut site, page) = desktop();
    site.handle(SiteEvent::Click { target: page.gallery_items[3] });
    assert_eq!(site.host().active_element(), Some(page.modal.close));

    site.handle(SiteEvent::Click { target: page.modal.overlay });
    assert!(site.modal().is_some_and(|m| !m.is_open()));
    assert_eq!(site.host().active_element(), Some(page.gallery_items[3]));
    assert_eq!(
        site.host().attribute(page.modal.root, "aria-hidden").as_deref(),
        Some("true")
    );
}

// =============================================================================
// ENVIRONMENT
// =============================================================================

#[test]
fn reduced_motion_is_decided_at_mount() {
    let capabilities = Capabilities {
        pointer: PointerCapability::all(),
        reduced_motion: true,
        animator: false,
    };
    let (mut site, _) = mount(Viewport::new(1280.0, 800.0), capabilities);
    assert!(site.particles().is_none());
    assert!(site.glow().is_none());

    site.handle(SiteEvent::ReducedMotionChanged(false));
    assert!(!site.env().reduced_motion.get());
    assert!(site.particles().is_none());
}

#[test]
fn pointer_moves_drive_the_glow() {
    let (mut site, page) = desktop();
    site.handle(SiteEvent::PointerMove { x: 200.0, y: 100.0 });
    assert!(site.host().has_class(page.glow, "visible"));

    let (mut touch, touch_page) = phone();
    touch.handle(SiteEvent::PointerMove { x: 200.0, y: 100.0 });
    assert!(!touch.host().has_class(touch_page.glow, "visible"));
}
