//! Particle Field - Visibility-gated render loop
//!
//! A field of drifting, shimmering particles painted on a canvas in the
//! hero section. The loop costs a frame callback per display refresh, so it
//! only runs while the hosting section is on screen:
//!
//! ```text
//! Stopped ──start()──▶ Running ──stop()/hidden frame──▶ Stopped
//! ```
//!
//! `hidden` is orthogonal to the run state. Becoming hidden does not cancel
//! the pending frame; the next frame sees the flag and exits without
//! rescheduling. Becoming visible restarts the loop if it is stopped.
//!
//! Resizes cancel the pending frame, resize the surface and replace the
//! whole particle set before resuming.
//!
//! The field is never built when reduced motion was requested at mount.

use std::f64::consts::TAU;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::ParticleConfig;
use crate::env::Environment;
use crate::host::{DrawOp, Host, IntersectionEntry, ObserverOptions};
use crate::types::{ElementId, FrameHandle, ObserverHandle, Rgba, Size};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Distance past an edge before a particle wraps to the opposite side.
pub const WRAP_MARGIN: f64 = 10.0;

/// Particles larger than this get a faint halo.
pub const HALO_THRESHOLD: f64 = 1.5;

const HALO_SCALE: f64 = 3.0;
const HALO_ALPHA: f64 = 0.15;

/// Warm ember palette.
pub const PALETTE: [Rgba; 5] = [
    Rgba::rgb(255, 209, 102),
    Rgba::rgb(255, 179, 71),
    Rgba::rgb(255, 140, 66),
    Rgba::rgb(255, 236, 179),
    Rgba::rgb(240, 128, 128),
];

/// Number of particles for a viewport width: one per `width_per_particle`
/// pixels, capped at `max`.
pub fn particle_count(viewport_width: f64, width_per_particle: f64, max: usize) -> usize {
    if width_per_particle <= 0.0 || viewport_width <= 0.0 {
        return 0;
    }
    ((viewport_width / width_per_particle).floor() as usize).min(max)
}

// =============================================================================
// PARTICLE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub size: f64,
    pub color: Rgba,
    pub base_opacity: f64,
    pub phase: f64,
    pub phase_speed: f64,
}

impl Particle {
    /// A particle anywhere on a `bounds` surface with a slight sideways
    /// drift and a slow rise.
    pub fn random(rng: &mut impl Rng, bounds: Size) -> Self {
        Self {
            x: rng.r#gen::<f64>() * bounds.width,
            y: rng.r#gen::<f64>() * bounds.height,
            vx: (rng.r#gen::<f64>() - 0.5) * 0.3,
            vy: -(rng.r#gen::<f64>() * 0.4 + 0.1),
            size: rng.r#gen::<f64>() * 2.0 + 0.5,
            color: PALETTE[rng.gen_range(0..PALETTE.len())],
            base_opacity: rng.r#gen::<f64>() * 0.5 + 0.2,
            phase: rng.r#gen::<f64>() * TAU,
            phase_speed: rng.r#gen::<f64>() * 0.02 + 0.005,
        }
    }

    /// Current flicker-modulated opacity.
    pub fn opacity(&self) -> f64 {
        self.base_opacity * (0.6 + 0.4 * self.phase.sin())
    }

    /// Advance one frame and wrap around the surface edges.
    ///
    /// Leaving through the top or bottom re-randomizes `x` so wrapped
    /// particles do not form visible columns; leaving sideways keeps `y`.
    pub fn step(&mut self, rng: &mut impl Rng, bounds: Size) {
        self.x += self.vx;
        self.y += self.vy;
        self.phase += self.phase_speed;

        if self.y < -WRAP_MARGIN {
            self.y = bounds.height + WRAP_MARGIN;
            self.x = rng.r#gen::<f64>() * bounds.width;
        } else if self.y > bounds.height + WRAP_MARGIN {
            self.y = -WRAP_MARGIN;
            self.x = rng.r#gen::<f64>() * bounds.width;
        }

        if self.x < -WRAP_MARGIN {
            self.x = bounds.width + WRAP_MARGIN;
        } else if self.x > bounds.width + WRAP_MARGIN {
            self.x = -WRAP_MARGIN;
        }
    }

    /// Append this particle's draw operations.
    pub fn draw(&self, ops: &mut Vec<DrawOp>) {
        let opacity = self.opacity();
        if self.size > HALO_THRESHOLD {
            ops.push(DrawOp::Circle {
                x: self.x,
                y: self.y,
                radius: self.size * HALO_SCALE,
                color: self.color.with_alpha(opacity * HALO_ALPHA),
            });
        }
        ops.push(DrawOp::Circle {
            x: self.x,
            y: self.y,
            radius: self.size,
            color: self.color.with_alpha(opacity),
        });
    }
}

// =============================================================================
// FIELD
// =============================================================================

pub struct ParticleField {
    canvas: ElementId,
    section: ElementId,
    observer: Option<ObserverHandle>,

    particles: Vec<Particle>,
    bounds: Size,
    rng: ChaCha8Rng,
    width_per_particle: f64,
    max_particles: usize,

    running: bool,
    frame: Option<FrameHandle>,
    hidden: bool,
    frames_rendered: u64,
    ops: Vec<DrawOp>,
}

impl ParticleField {
    /// Build the field on the configured canvas and start it.
    ///
    /// Returns `None` when reduced motion was requested at mount or the
    /// page has no canvas.
    pub fn mount(host: &mut dyn Host, config: &ParticleConfig, env: &Environment) -> Option<Self> {
        if env.reduced_motion_at_mount() {
            tracing::debug!("reduced motion: particle field disabled");
            return None;
        }
        let Some(canvas) = host.query(&config.canvas) else {
            tracing::debug!(selector = %config.canvas, "no particle canvas on page");
            return None;
        };
        let section = host
            .query(&config.host_section)
            .or_else(|| host.closest(canvas, "section"))
            .unwrap_or(canvas);

        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let mut field = Self {
            canvas,
            section,
            observer: None,
            particles: Vec::new(),
            bounds: Size::default(),
            rng,
            width_per_particle: config.width_per_particle,
            max_particles: config.max_particles,
            running: false,
            frame: None,
            hidden: false,
            frames_rendered: 0,
            ops: Vec::new(),
        };

        field.init(host);
        field.observer = Some(host.observe(&[section], ObserverOptions::default()));
        field.start(host);
        Some(field)
    }

    /// Size the surface to its container and repopulate from scratch.
    fn init(&mut self, host: &mut dyn Host) {
        let container = host.parent(self.canvas).unwrap_or(self.section);
        self.bounds = host.element_size(container);
        host.resize_surface(self.canvas, self.bounds);

        let count = particle_count(
            host.viewport().width,
            self.width_per_particle,
            self.max_particles,
        );
        let bounds = self.bounds;
        let rng = &mut self.rng;
        self.particles = (0..count).map(|_| Particle::random(&mut *rng, bounds)).collect();
        tracing::debug!(count, width = bounds.width, height = bounds.height, "particles initialized");
    }

    // -------------------------------------------------------------------------
    // Run state
    // -------------------------------------------------------------------------

    /// Start the loop if it is not running.
    pub fn start(&mut self, host: &mut dyn Host) {
        if self.running {
            return;
        }
        self.running = true;
        self.frame = Some(host.request_frame());
    }

    /// Stop the loop and cancel the pending frame.
    pub fn stop(&mut self, host: &mut dyn Host) {
        if let Some(frame) = self.frame.take() {
            host.cancel_frame(frame);
        }
        self.running = false;
    }

    /// Frame callback: update, draw, reschedule. Exits without
    /// rescheduling while hidden.
    pub fn on_frame(&mut self, host: &mut dyn Host, frame: FrameHandle) {
        if !self.running || self.frame != Some(frame) {
            return;
        }
        self.frame = None;
        if self.hidden {
            self.running = false;
            tracing::trace!("particle loop halted while hidden");
            return;
        }

        self.step();
        self.render(host);
        self.frame = Some(host.request_frame());
    }

    /// Advance every particle one frame.
    pub fn step(&mut self) {
        let bounds = self.bounds;
        for particle in self.particles.iter_mut() {
            particle.step(&mut self.rng, bounds);
        }
    }

    fn render(&mut self, host: &mut dyn Host) {
        self.ops.clear();
        self.ops.push(DrawOp::Clear);
        for particle in &self.particles {
            particle.draw(&mut self.ops);
        }
        host.draw(self.canvas, &self.ops);
        self.frames_rendered += 1;
    }

    // -------------------------------------------------------------------------
    // Visibility
    // -------------------------------------------------------------------------

    pub fn owns_observer(&self, observer: ObserverHandle) -> bool {
        self.observer == Some(observer)
    }

    /// Apply an observation batch for the hosting section, in order.
    pub fn on_entries(&mut self, host: &mut dyn Host, entries: &[IntersectionEntry]) {
        let section = self.section;
        for entry in entries.iter().filter(|e| e.target == section) {
            self.set_visible(host, entry.is_intersecting);
        }
    }

    pub fn set_visible(&mut self, host: &mut dyn Host, visible: bool) {
        let was_hidden = self.hidden;
        self.hidden = !visible;
        if was_hidden && visible && !self.running {
            self.start(host);
        }
    }

    // -------------------------------------------------------------------------
    // Resize
    // -------------------------------------------------------------------------

    /// Resize broadcast: cancel, resize, reinitialize, resume if visible.
    pub fn on_resize(&mut self, host: &mut dyn Host) {
        self.stop(host);
        self.init(host);
        if !self.hidden {
            self.start(host);
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn frame(&self) -> Option<FrameHandle> {
        self.frame
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn bounds(&self) -> Size {
        self.bounds
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }
}

// =============================================================================
// TESTS
// =============================================================================
