//! # spark-site
//!
//! Viewport interaction and animation lifecycle engine for brochure sites.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for
//! the shared reactive values (header height, reduced motion, lock state).
//!
//! ## Architecture
//!
//! The engine is host-agnostic. Page access goes through the [`Host`]
//! trait and motion through the [`Animator`] trait; asynchronous host
//! activity comes back as [`SiteEvent`]s routed by [`Site::handle`]:
//!
//! ```text
//! host event → SiteEvent → Site::handle → component → Host / Animator writes
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Handles, geometry, colors, observer margins
//! - [`host`] - The `Host` trait, `MemoryHost`, the reference page in
//!   `host::fixture`, and the browser binding (feature `web`)
//! - [`animator`] - The `Animator` trait, static and queued animators,
//!   breakpoint-scoped effects
//! - [`state`] - Scroll lock, resize broadcaster, and the page components
//! - [`pipeline`] - Role dispatch and the `Site` composition root
//! - [`config`] - Serde-backed site configuration

pub mod animator;
pub mod config;
pub mod env;
pub mod error;
pub mod host;
pub mod pipeline;
pub mod state;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use animator::{
    resolve as resolve_animator, AnimationOutcome, AnimationQueue, Animator, Breakpoint,
    BreakpointScopes, Ease, HorizontalPin, Properties, QueuedAnimator, ScopedEffect,
    StaticAnimator, Timeline, Tween,
};

pub use config::{HeaderConfig, ModalConfig, NavConfig, ParticleConfig, PinConfig, SiteConfig};

pub use env::{Capabilities, Environment, PointerCapability};

pub use error::SiteError;

pub use host::{DrawOp, Host, IntersectionEntry, MemoryHost, ObserverOptions, Scheduler};

pub use pipeline::{Dispatcher, Role, RoleSet, Site, SiteEvent};

pub use state::{
    FocusHistory, FocusTrap, HeaderState, Item, KeyState, KeyboardEvent, MobileNav, Modifiers,
    ModalNavigator, ParticleField, PointerGlow, ResizeBroadcaster, ScrollLock, Section,
    SectionTracker, TransitionToken,
};

#[cfg(feature = "web")]
pub use host::web::{start, GsapAnimator, WebHost};
