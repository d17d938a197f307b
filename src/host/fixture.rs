//! Reference page markup built on a [`MemoryHost`].
//!
//! Mirrors the structure the default [`crate::config::SiteConfig`] expects:
//! a fixed header with the mobile menu, five sections, a particle canvas in
//! the hero, a gallery and the lightbox. Used by the test suites and handy
//! for driving the engine headlessly.

use super::memory::MemoryHost;
use crate::types::{ElementId, Viewport};

pub const HEADER_HEIGHT: f64 = 72.0;
pub const SECTION_IDS: [&str; 5] = ["hero", "about", "services", "gallery", "contact"];

/// Element ids of the reference page.
#[derive(Debug, Clone)]
pub struct BrochurePage {
    pub header: ElementId,
    pub progress: ElementId,
    pub nav_toggle: ElementId,
    pub nav_panel: ElementId,
    pub nav_links: Vec<ElementId>,
    pub sections: Vec<ElementId>,
    pub canvas: ElementId,
    pub glow: ElementId,
    pub gallery_items: Vec<ElementId>,
    pub modal: LightboxIds,
}

#[derive(Debug, Clone)]
pub struct LightboxIds {
    pub root: ElementId,
    pub overlay: ElementId,
    pub close: ElementId,
    pub prev: ElementId,
    pub image: ElementId,
    pub next: ElementId,
    pub title: ElementId,
    pub description: ElementId,
    pub counter: ElementId,
}

/// Thumbnail URL used for gallery item `index`.
pub fn thumbnail_url(index: usize) -> String {
    format!("https://images.example.com/photo-{}.jpg?w=600&q=80", index)
}

/// Build the reference page with `gallery_items` gallery entries.
pub fn brochure_page(viewport: Viewport, gallery_items: usize) -> (MemoryHost, BrochurePage) {
    let mut host = MemoryHost::new(viewport);
    let width = viewport.width;

    let header = host
        .element("header")
        .id("site-header")
        .size(width, HEADER_HEIGHT)
        .insert();
    let progress = host
        .element("div")
        .class("scroll-progress")
        .parent(header)
        .insert();
    let nav_toggle = host
        .element("button")
        .class("nav-toggle")
        .attr("aria-expanded", "false")
        .parent(header)
        .insert();
    let nav_panel = host.element("nav").class("nav-menu").parent(header).insert();
    let nav_links = SECTION_IDS
        .iter()
        .map(|id| {
            host.element("a")
                .class("nav-link")
                .attr("href", &format!("#{}", id))
                .parent(nav_panel)
                .insert()
        })
        .collect();

    let glow = host.element("div").class("cursor-glow").insert();

    let mut sections = Vec::new();
    let mut canvas = ElementId(0);
    let mut gallery = Vec::new();
    for id in SECTION_IDS {
        let section = host
            .element("section")
            .id(id)
            .size(width, viewport.height)
            .insert();
        sections.push(section);

        if id == "hero" {
            canvas = host
                .element("canvas")
                .id("particles")
                .parent(section)
                .insert();
        }

        if id == "gallery" {
            for i in 0..gallery_items {
                let item = host
                    .element("div")
                    .class("gallery-item")
                    .attr("tabindex", "0")
                    .attr("data-title", &format!("Project {}", i + 1))
                    .attr("data-description", &format!("Description of project {}", i + 1))
                    .parent(section)
                    .insert();
                host.element("img")
                    .attr("src", &thumbnail_url(i))
                    .attr("alt", &format!("Photo {}", i + 1))
                    .parent(item)
                    .insert();
                gallery.push(item);
            }
        }
    }

    let root = host
        .element("div")
        .id("lightbox")
        .attr("aria-hidden", "true")
        .insert();
    let overlay = host.element("div").class("lightbox-overlay").parent(root).insert();
    let close = host.element("button").class("lightbox-close").parent(root).insert();
    let prev = host.element("button").class("lightbox-prev").parent(root).insert();
    let image = host.element("img").class("lightbox-image").parent(root).insert();
    let next = host.element("button").class("lightbox-next").parent(root).insert();
    let title = host.element("h3").class("lightbox-title").parent(root).insert();
    let description = host
        .element("p")
        .class("lightbox-description")
        .parent(root)
        .insert();
    let counter = host
        .element("span")
        .class("lightbox-counter")
        .attr("aria-live", "polite")
        .parent(root)
        .insert();

    host.set_document_height(viewport.height * SECTION_IDS.len() as f64);

    let page = BrochurePage {
        header,
        progress,
        nav_toggle,
        nav_panel,
        nav_links,
        sections,
        canvas,
        glow,
        gallery_items: gallery,
        modal: LightboxIds {
            root,
            overlay,
            close,
            prev,
            image,
            next,
            title,
            description,
            counter,
        },
    };

    (host, page)
}
