//! Pointer Glow - Soft highlight that trails the mouse
//!
//! Only mounted when the primary pointer is precise and can hover, and the
//! user did not ask for reduced motion at mount time. Each move retargets
//! the glow; the previous tween is killed so moves never queue up.

use crate::animator::{Animator, Ease, Properties, Tween};
use crate::env::Environment;
use crate::host::Host;
use crate::types::ElementId;

const FOLLOW_SECS: f64 = 0.6;
const VISIBLE_CLASS: &str = "visible";

pub struct PointerGlow {
    glow: ElementId,
    position: Option<(f64, f64)>,
}

impl PointerGlow {
    pub fn mount(host: &dyn Host, selector: &str, env: &Environment) -> Option<Self> {
        if !env.pointer().supports_follow() {
            tracing::debug!("coarse pointer, glow disabled");
            return None;
        }
        if env.reduced_motion_at_mount() {
            tracing::debug!("reduced motion, glow disabled");
            return None;
        }
        let glow = host.query(selector)?;
        Some(Self { glow, position: None })
    }

    pub fn element(&self) -> ElementId {
        self.glow
    }

    /// Last pointer position seen, in viewport pixels.
    pub fn position(&self) -> Option<(f64, f64)> {
        self.position
    }

    /// Center the glow on the pointer.
    pub fn on_pointer_move(&mut self, host: &mut dyn Host, animator: &mut dyn Animator, x: f64, y: f64) {
        if self.position.is_none() {
            host.set_class(self.glow, VISIBLE_CLASS, true);
        }
        self.position = Some((x, y));

        let size = host.element_size(self.glow);
        let target = Properties::new().translate(x - size.width / 2.0, y - size.height / 2.0);
        animator.kill_in_flight(self.glow);
        animator.animate_to(host, self.glow, target, Tween::new(FOLLOW_SECS, Ease::Power2Out));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animator::{QueuedAnimator, StaticAnimator};
    use crate::env::{Capabilities, PointerCapability};
    use crate::host::fixture::{brochure_page, BrochurePage};
    use crate::host::MemoryHost;
    use crate::types::{Size, Viewport};

    fn env(pointer: PointerCapability, reduced_motion: bool) -> Environment {
        let capabilities = Capabilities {
            pointer,
            reduced_motion,
            animator: false,
        };
        Environment::new(capabilities, Viewport::new(1280.0, 800.0))
    }

    fn setup() -> (MemoryHost, BrochurePage) {
        let (mut host, page) = brochure_page(Viewport::new(1280.0, 800.0), 0);
        host.set_element_size(page.glow, Size::new(400.0, 400.0));
        (host, page)
    }

    #[test]
    fn test_mount_requires_fine_hover_pointer() {
        let (host, _) = setup();
        assert!(PointerGlow::mount(&host, ".cursor-glow", &env(PointerCapability::all(), false)).is_some());
        assert!(PointerGlow::mount(&host, ".cursor-glow", &env(PointerCapability::HOVER, false)).is_none());
        assert!(PointerGlow::mount(&host, ".cursor-glow", &env(PointerCapability::all(), true)).is_none());
        assert!(PointerGlow::mount(&host, ".missing", &env(PointerCapability::all(), false)).is_none());
    }

    #[test]
    fn test_glow_centers_on_pointer() {
        let (mut host, page) = setup();
        let mut glow = PointerGlow::mount(&host, ".cursor-glow", &env(PointerCapability::all(), false)).unwrap();

        glow.on_pointer_move(&mut host, &mut StaticAnimator, 500.0, 300.0);
        assert!(host.has_class(page.glow, "visible"));
        assert_eq!(
            host.style(page.glow, "transform").as_deref(),
            Some("translate(300px, 100px) scale(1)")
        );
        assert_eq!(glow.position(), Some((500.0, 300.0)));
    }

    #[test]
    fn test_moves_do_not_queue() {
        let (mut host, page) = setup();
        let mut glow = PointerGlow::mount(&host, ".cursor-glow", &env(PointerCapability::all(), false)).unwrap();
        let (mut animator, queue) = QueuedAnimator::new();

        for i in 0..5 {
            glow.on_pointer_move(&mut host, &mut animator, i as f64 * 10.0, 0.0);
        }
        assert_eq!(queue.in_flight_for(page.glow), 1);
    }
}
