//! Animator Module - The external tween library seen from the engine
//!
//! The engine expresses motion as "animate these properties of this element
//! to these values". How (and whether) that is tweened is the animator's
//! business:
//!
//! - [`StaticAnimator`] - no tween library; end states are applied
//!   immediately and reported as [`AnimationOutcome::Completed`]
//! - [`QueuedAnimator`] - tweens stay in flight until the driver finishes
//!   them; used by headless hosts and tests
//! - `GsapAnimator` - binding to a page-global `gsap` (feature `web`)
//!
//! Which one runs is decided once at mount from [`Capabilities`], so
//! components never branch on library presence themselves.
//!
//! Breakpoint-scoped effects live in [`breakpoint`].

pub mod breakpoint;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::env::Capabilities;
use crate::host::Host;
use crate::types::{AnimationHandle, ElementId, PinHandle};

pub use breakpoint::{Breakpoint, BreakpointScopes, HorizontalPin, ScopedEffect};

// =============================================================================
// PROPERTIES
// =============================================================================

/// Target values for an element's animatable properties.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Properties {
    pub opacity: Option<f64>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub scale: Option<f64>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opacity(mut self, value: f64) -> Self {
        self.opacity = Some(value);
        self
    }

    pub fn translate(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn scale(mut self, value: f64) -> Self {
        self.scale = Some(value);
        self
    }

    /// CSS transform for the positional properties, if any are set.
    pub fn transform(&self) -> Option<String> {
        if self.x.is_none() && self.y.is_none() && self.scale.is_none() {
            return None;
        }
        let x = self.x.unwrap_or(0.0);
        let y = self.y.unwrap_or(0.0);
        let scale = self.scale.unwrap_or(1.0);
        Some(format!("translate({}px, {}px) scale({})", x, y, scale))
    }

    /// Write the end state straight to the element's inline style.
    pub fn apply(&self, host: &mut dyn Host, target: ElementId) {
        if let Some(opacity) = self.opacity {
            host.set_style(target, "opacity", &opacity.to_string());
        }
        if let Some(transform) = self.transform() {
            host.set_style(target, "transform", &transform);
        }
    }
}

/// Easing curves understood by the animators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ease {
    Linear,
    #[default]
    Power2Out,
    Power2InOut,
    Power3Out,
}

impl Ease {
    /// Name used by the tween library.
    pub fn name(self) -> &'static str {
        match self {
            Ease::Linear => "none",
            Ease::Power2Out => "power2.out",
            Ease::Power2InOut => "power2.inOut",
            Ease::Power3Out => "power3.out",
        }
    }
}

/// Timing of a single tween.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Tween {
    /// Seconds.
    pub duration: f64,
    pub ease: Ease,
    /// Seconds.
    pub delay: Option<f64>,
}

impl Tween {
    pub fn new(duration: f64, ease: Ease) -> Self {
        Self {
            duration,
            ease,
            delay: None,
        }
    }

    pub fn delay(mut self, delay: f64) -> Self {
        self.delay = Some(delay);
        self
    }
}

// =============================================================================
// TIMELINE
// =============================================================================

/// One step of a timeline. `offset` is relative to the end of the previous
/// step (negative values overlap).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineStep {
    pub target: ElementId,
    pub properties: Properties,
    pub tween: Tween,
    pub offset: f64,
}

/// Sequenced tweens played as one unit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Timeline {
    pub steps: Vec<TimelineStep>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step that starts when the previous one ends.
    pub fn to(self, target: ElementId, properties: Properties, tween: Tween) -> Self {
        self.to_at(target, properties, tween, 0.0)
    }

    /// Append a step shifted by `offset` seconds from the previous step's end.
    pub fn to_at(mut self, target: ElementId, properties: Properties, tween: Tween, offset: f64) -> Self {
        self.steps.push(TimelineStep {
            target,
            properties,
            tween,
            offset,
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

// =============================================================================
// ANIMATOR
// =============================================================================

/// What happened to a requested animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationOutcome {
    /// End state already applied.
    Completed,
    /// In flight; completion comes back as `SiteEvent::AnimationComplete`.
    Pending(AnimationHandle),
}

/// The external tween library.
pub trait Animator {
    /// Tween `target` to `properties`.
    fn animate_to(
        &mut self,
        host: &mut dyn Host,
        target: ElementId,
        properties: Properties,
        tween: Tween,
    ) -> AnimationOutcome;

    /// Play a sequenced timeline.
    fn play(&mut self, host: &mut dyn Host, timeline: Timeline) -> AnimationOutcome;

    /// Cancel every pending tween on `target`. Their completions never fire.
    fn kill_in_flight(&mut self, target: ElementId);

    /// Pin `section` while scrolling translates `track` horizontally by
    /// `distance` pixels. `None` when pinning is not supported.
    fn pin_horizontal(
        &mut self,
        host: &mut dyn Host,
        section: ElementId,
        track: ElementId,
        distance: f64,
    ) -> Option<PinHandle>;

    /// Undo a pin and restore the track.
    fn release_pin(&mut self, host: &mut dyn Host, pin: PinHandle);
}

/// Pick the animator for this page: the candidate when a tween library is
/// present, the static fallback otherwise.
pub fn resolve(
    capabilities: Capabilities,
    candidate: impl FnOnce() -> Box<dyn Animator>,
) -> Box<dyn Animator> {
    if capabilities.animator {
        candidate()
    } else {
        tracing::debug!("no tween library, using static transitions");
        Box::new(StaticAnimator)
    }
}

// =============================================================================
// STATIC ANIMATOR
// =============================================================================

/// No-animation fallback: every transition jumps to its end state.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticAnimator;

impl Animator for StaticAnimator {
    fn animate_to(
        &mut self,
        host: &mut dyn Host,
        target: ElementId,
        properties: Properties,
        _tween: Tween,
    ) -> AnimationOutcome {
        properties.apply(host, target);
        AnimationOutcome::Completed
    }

    fn play(&mut self, host: &mut dyn Host, timeline: Timeline) -> AnimationOutcome {
        for step in &timeline.steps {
            step.properties.apply(host, step.target);
        }
        AnimationOutcome::Completed
    }

    fn kill_in_flight(&mut self, _target: ElementId) {}

    fn pin_horizontal(
        &mut self,
        _host: &mut dyn Host,
        _section: ElementId,
        _track: ElementId,
        _distance: f64,
    ) -> Option<PinHandle> {
        None
    }

    fn release_pin(&mut self, _host: &mut dyn Host, _pin: PinHandle) {}
}

// =============================================================================
// QUEUED ANIMATOR
// =============================================================================

#[derive(Debug, Default)]
struct QueueState {
    next_handle: u32,
    in_flight: Vec<(AnimationHandle, Vec<TimelineStep>)>,
    pins: HashMap<PinHandle, (ElementId, ElementId, f64)>,
}

impl QueueState {
    fn next_handle(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }
}

/// Animator whose tweens stay in flight until finished through its
/// [`AnimationQueue`].
#[derive(Debug, Default)]
pub struct QueuedAnimator {
    state: Rc<RefCell<QueueState>>,
}

/// Driver-side handle onto a [`QueuedAnimator`].
#[derive(Debug, Clone)]
pub struct AnimationQueue {
    state: Rc<RefCell<QueueState>>,
}

impl QueuedAnimator {
    pub fn new() -> (Self, AnimationQueue) {
        let state = Rc::new(RefCell::new(QueueState::default()));
        (
            Self {
                state: state.clone(),
            },
            AnimationQueue { state },
        )
    }

    fn enqueue(&mut self, steps: Vec<TimelineStep>) -> AnimationOutcome {
        let mut state = self.state.borrow_mut();
        let handle = AnimationHandle(state.next_handle());
        state.in_flight.push((handle, steps));
        AnimationOutcome::Pending(handle)
    }
}

impl Animator for QueuedAnimator {
    fn animate_to(
        &mut self,
        _host: &mut dyn Host,
        target: ElementId,
        properties: Properties,
        tween: Tween,
    ) -> AnimationOutcome {
        self.enqueue(vec![TimelineStep {
            target,
            properties,
            tween,
            offset: 0.0,
        }])
    }

    fn play(&mut self, _host: &mut dyn Host, timeline: Timeline) -> AnimationOutcome {
        if timeline.is_empty() {
            return AnimationOutcome::Completed;
        }
        self.enqueue(timeline.steps)
    }

    fn kill_in_flight(&mut self, target: ElementId) {
        let mut state = self.state.borrow_mut();
        for (_, steps) in state.in_flight.iter_mut() {
            steps.retain(|step| step.target != target);
        }
        state.in_flight.retain(|(_, steps)| !steps.is_empty());
    }

    fn pin_horizontal(
        &mut self,
        host: &mut dyn Host,
        section: ElementId,
        track: ElementId,
        distance: f64,
    ) -> Option<PinHandle> {
        let mut state = self.state.borrow_mut();
        let handle = PinHandle(state.next_handle());
        state.pins.insert(handle, (section, track, distance));
        host.set_class(section, "pinned", true);
        Some(handle)
    }

    fn release_pin(&mut self, host: &mut dyn Host, pin: PinHandle) {
        if let Some((section, track, _)) = self.state.borrow_mut().pins.remove(&pin) {
            host.set_class(section, "pinned", false);
            host.set_style(track, "transform", "none");
        }
    }
}

impl AnimationQueue {
    /// Number of tweens in flight that touch `target`.
    pub fn in_flight_for(&self, target: ElementId) -> usize {
        self.state
            .borrow()
            .in_flight
            .iter()
            .filter(|(_, steps)| steps.iter().any(|s| s.target == target))
            .count()
    }

    pub fn in_flight(&self) -> usize {
        self.state.borrow().in_flight.len()
    }

    /// Apply the end state of one animation. Returns false if it was
    /// killed or already finished.
    pub fn finish(&self, host: &mut dyn Host, handle: AnimationHandle) -> bool {
        let entry = {
            let mut state = self.state.borrow_mut();
            let pos = state.in_flight.iter().position(|(h, _)| *h == handle);
            let removed = pos.map(|p| state.in_flight.remove(p));
            removed
        };
        match entry {
            Some((_, steps)) => {
                for step in steps {
                    step.properties.apply(host, step.target);
                }
                true
            }
            None => false,
        }
    }

    /// Finish everything in flight, oldest first, and return the handles.
    pub fn finish_all(&self, host: &mut dyn Host) -> Vec<AnimationHandle> {
        let entries = std::mem::take(&mut self.state.borrow_mut().in_flight);
        entries
            .into_iter()
            .map(|(handle, steps)| {
                for step in steps {
                    step.properties.apply(host, step.target);
                }
                handle
            })
            .collect()
    }

    pub fn active_pins(&self) -> usize {
        self.state.borrow().pins.len()
    }
}
