//! Dispatch Table - Maps event targets to element roles
//!
//! Every interactive element the engine cares about has a [`Role`], found
//! by walking up from the event target to the nearest ancestor matching a
//! registered selector. Bindings are checked in registration order, so the
//! first matching binding wins when selectors overlap.
//!
//! Each role also declares which interactions it answers to: gallery items
//! are plain `div`s and need Enter/Space activation added, buttons and
//! links get it from the browser already.

use bitflags::bitflags;

use crate::config::SiteConfig;
use crate::host::Host;
use crate::types::ElementId;

bitflags! {
    /// Interactions an element role responds to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct RoleSet: u8 {
        /// Pointer click (or the browser's synthesized click).
        const CLICK = 1 << 0;
        /// Enter / Space while the element is focused.
        const ACTIVATE = 1 << 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    GalleryItem,
    ModalClose,
    ModalPrev,
    ModalNext,
    ModalOverlay,
    NavToggle,
    NavLink,
}

impl Role {
    pub fn accepts(self) -> RoleSet {
        match self {
            Role::GalleryItem => RoleSet::CLICK | RoleSet::ACTIVATE,
            _ => RoleSet::CLICK,
        }
    }
}

#[derive(Debug, Clone)]
struct Binding {
    role: Role,
    selector: String,
}

#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    bindings: Vec<Binding>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bindings for every role, from the configured selectors.
    pub fn from_config(config: &SiteConfig) -> Self {
        let mut dispatcher = Self::new();
        dispatcher.register(Role::ModalClose, &config.modal.close);
        dispatcher.register(Role::ModalPrev, &config.modal.prev);
        dispatcher.register(Role::ModalNext, &config.modal.next);
        dispatcher.register(Role::ModalOverlay, &config.modal.overlay);
        dispatcher.register(Role::GalleryItem, &config.modal.gallery_item);
        dispatcher.register(Role::NavToggle, &config.nav.toggle);
        dispatcher.register(Role::NavLink, &config.nav.link);
        dispatcher
    }

    pub fn register(&mut self, role: Role, selector: &str) {
        self.bindings.push(Binding {
            role,
            selector: selector.to_string(),
        });
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Role of the element an interaction of kind `interaction` on `target`
    /// lands on, together with the element that carries the role.
    pub fn resolve(&self, host: &dyn Host, target: ElementId, interaction: RoleSet) -> Option<(Role, ElementId)> {
        self.bindings
            .iter()
            .filter(|binding| binding.role.accepts().contains(interaction))
            .find_map(|binding| {
                host.closest(target, &binding.selector)
                    .map(|element| (binding.role, element))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::fixture::{brochure_page, BrochurePage};
    use crate::host::MemoryHost;
    use crate::types::Viewport;

    fn setup() -> (MemoryHost, BrochurePage, Dispatcher) {
        let (host, page) = brochure_page(Viewport::new(1280.0, 800.0), 2);
        (host, page, Dispatcher::from_config(&SiteConfig::default()))
    }

    #[test]
    fn test_resolve_walks_up_to_role() {
        let (host, page, dispatcher) = setup();
        let thumbnail = host.query_within(page.gallery_items[1], "img")[0];

        assert_eq!(
            dispatcher.resolve(&host, thumbnail, RoleSet::CLICK),
            Some((Role::GalleryItem, page.gallery_items[1]))
        );
        assert_eq!(
            dispatcher.resolve(&host, page.modal.close, RoleSet::CLICK),
            Some((Role::ModalClose, page.modal.close))
        );
        assert_eq!(
            dispatcher.resolve(&host, page.nav_links[2], RoleSet::CLICK),
            Some((Role::NavLink, page.nav_links[2]))
        );
        assert_eq!(dispatcher.resolve(&host, page.header, RoleSet::CLICK), None);
    }

    #[test]
    fn test_activation_only_for_gallery_items() {
        let (host, page, dispatcher) = setup();
        assert_eq!(
            dispatcher.resolve(&host, page.gallery_items[0], RoleSet::ACTIVATE),
            Some((Role::GalleryItem, page.gallery_items[0]))
        );
        assert_eq!(dispatcher.resolve(&host, page.nav_toggle, RoleSet::ACTIVATE), None);
    }

    #[test]
    fn test_first_binding_wins() {
        let (host, page, _) = setup();
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(Role::NavToggle, "button");
        dispatcher.register(Role::ModalClose, ".lightbox-close");
        assert_eq!(
            dispatcher.resolve(&host, page.modal.close, RoleSet::CLICK),
            Some((Role::NavToggle, page.modal.close))
        );
        assert_eq!(dispatcher.len(), 2);
    }
}
