//! Breakpoint-scoped effects.
//!
//! An effect registered here is set up while the viewport width satisfies
//! its [`Breakpoint`] and torn down as soon as it stops doing so. Scopes are
//! re-evaluated on every resize broadcast. An effect whose setup declines
//! stays inactive and is offered setup again on the next evaluation.

use super::Animator;
use crate::host::Host;
use crate::types::{ElementId, PinHandle};

/// Viewport width range, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Breakpoint {
    pub min_width: Option<f64>,
    pub max_width: Option<f64>,
}

impl Breakpoint {
    pub fn min(width: f64) -> Self {
        Self {
            min_width: Some(width),
            max_width: None,
        }
    }

    pub fn max(width: f64) -> Self {
        Self {
            min_width: None,
            max_width: Some(width),
        }
    }

    pub fn matches(&self, width: f64) -> bool {
        self.min_width.is_none_or(|min| width >= min) && self.max_width.is_none_or(|max| width <= max)
    }
}

/// An effect that only exists inside a breakpoint.
pub trait ScopedEffect {
    /// Returns whether the effect is now live.
    fn setup(&mut self, host: &mut dyn Host, animator: &mut dyn Animator) -> bool;
    fn teardown(&mut self, host: &mut dyn Host, animator: &mut dyn Animator);
}

struct Scope {
    breakpoint: Breakpoint,
    effect: Box<dyn ScopedEffect>,
    active: bool,
}

/// Registry of breakpoint-scoped effects.
#[derive(Default)]
pub struct BreakpointScopes {
    scopes: Vec<Scope>,
}

impl BreakpointScopes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an effect and set it up right away if the breakpoint
    /// already applies.
    pub fn register(
        &mut self,
        breakpoint: Breakpoint,
        effect: Box<dyn ScopedEffect>,
        host: &mut dyn Host,
        animator: &mut dyn Animator,
    ) {
        self.scopes.push(Scope {
            breakpoint,
            effect,
            active: false,
        });
        let width = host.viewport().width;
        if let Some(scope) = self.scopes.last_mut() {
            Self::evaluate_scope(scope, width, host, animator);
        }
    }

    /// Bring every scope in line with the current viewport width.
    pub fn evaluate(&mut self, host: &mut dyn Host, animator: &mut dyn Animator) {
        let width = host.viewport().width;
        for scope in &mut self.scopes {
            Self::evaluate_scope(scope, width, host, animator);
        }
    }

    fn evaluate_scope(scope: &mut Scope, width: f64, host: &mut dyn Host, animator: &mut dyn Animator) {
        let applies = scope.breakpoint.matches(width);
        if applies && !scope.active {
            scope.active = scope.effect.setup(host, animator);
        } else if !applies && scope.active {
            scope.effect.teardown(host, animator);
            scope.active = false;
        }
    }

    pub fn active_count(&self) -> usize {
        self.scopes.iter().filter(|s| s.active).count()
    }
}

// =============================================================================
// HORIZONTAL PIN
// =============================================================================

/// Pins a section and scrolls its track sideways while the page scrolls.
pub struct HorizontalPin {
    section: ElementId,
    track: ElementId,
    pin: Option<PinHandle>,
}

impl HorizontalPin {
    pub fn new(section: ElementId, track: ElementId) -> Self {
        Self {
            section,
            track,
            pin: None,
        }
    }
}

impl ScopedEffect for HorizontalPin {
    fn setup(&mut self, host: &mut dyn Host, animator: &mut dyn Animator) -> bool {
        let distance = host.element_size(self.track).width - host.viewport().width;
        if distance <= 0.0 {
            return false;
        }
        self.pin = animator.pin_horizontal(host, self.section, self.track, distance);
        tracing::debug!(distance, pinned = self.pin.is_some(), "horizontal pin set up");
        self.pin.is_some()
    }

    fn teardown(&mut self, host: &mut dyn Host, animator: &mut dyn Animator) {
        if let Some(pin) = self.pin.take() {
            animator.release_pin(host, pin);
            tracing::debug!("horizontal pin torn down");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animator::QueuedAnimator;
    use crate::host::MemoryHost;
    use crate::types::Viewport;

    #[test]
    fn test_breakpoint_matches() {
        assert!(Breakpoint::min(1024.0).matches(1024.0));
        assert!(!Breakpoint::min(1024.0).matches(1023.0));
        assert!(Breakpoint::max(767.0).matches(320.0));
        assert!(Breakpoint::default().matches(0.0));
    }

    #[test]
    fn test_pin_follows_breakpoint() {
        let mut host = MemoryHost::new(Viewport::new(1280.0, 800.0));
        let section = host.element("section").class("horizontal-section").insert();
        let track = host
            .element("div")
            .class("horizontal-track")
            .size(3000.0, 600.0)
            .parent(section)
            .insert();
        let (mut animator, queue) = QueuedAnimator::new();
        let mut scopes = BreakpointScopes::new();

        scopes.register(
            Breakpoint::min(1024.0),
            Box::new(HorizontalPin::new(section, track)),
            &mut host,
            &mut animator,
        );
        assert_eq!(scopes.active_count(), 1);
        assert_eq!(queue.active_pins(), 1);
        assert!(host.has_class(section, "pinned"));

        host.set_viewport(Viewport::new(800.0, 800.0));
        scopes.evaluate(&mut host, &mut animator);
        assert_eq!(scopes.active_count(), 0);
        assert_eq!(queue.active_pins(), 0);
        assert!(!host.has_class(section, "pinned"));
        assert_eq!(host.style(track, "transform").as_deref(), Some("none"));

        host.set_viewport(Viewport::new(1440.0, 900.0));
        scopes.evaluate(&mut host, &mut animator);
        assert_eq!(queue.active_pins(), 1);
    }

    #[test]
    fn test_short_track_pins_once_it_overflows() {
        let mut host = MemoryHost::new(Viewport::new(1280.0, 800.0));
        let section = host.element("section").class("horizontal-section").insert();
        let track = host
            .element("div")
            .class("horizontal-track")
            .size(1000.0, 600.0)
            .parent(section)
            .insert();
        let (mut animator, queue) = QueuedAnimator::new();
        let mut scopes = BreakpointScopes::new();

        scopes.register(
            Breakpoint::min(1024.0),
            Box::new(HorizontalPin::new(section, track)),
            &mut host,
            &mut animator,
        );
        assert_eq!(scopes.active_count(), 0);
        assert_eq!(queue.active_pins(), 0);

        // Still inside the breakpoint; the track now overflows
        host.set_element_size(track, crate::types::Size::new(3000.0, 600.0));
        scopes.evaluate(&mut host, &mut animator);
        assert_eq!(scopes.active_count(), 1);
        assert_eq!(queue.active_pins(), 1);
        assert!(host.has_class(section, "pinned"));
    }
}
