//! State Module - Runtime state of the interactive page
//!
//! Shared resources:
//!
//! - **ScrollLock** - Reference-counted body scroll lock
//! - **Resize** - Debounced resize fan-out
//!
//! Components:
//!
//! - **Sections** - Nav highlighting from section visibility
//! - **Particles** - Visibility-gated canvas loop
//! - **Modal** - Gallery lightbox with stale-transition suppression
//! - **MobileNav** - Collapsible menu panel
//! - **Header** - Scrolled class, progress bar, header height
//! - **Cursor** - Mouse-following glow
//!
//! Support:
//!
//! - **Focus** - Focus trap and history
//! - **Keyboard** - Key event types

pub mod cursor;
pub mod focus;
pub mod header;
pub mod keyboard;
pub mod mobile_nav;
pub mod modal;
pub mod particles;
pub mod resize;
pub mod scroll_lock;
pub mod sections;

pub use cursor::PointerGlow;
pub use focus::{FocusHistory, FocusTrap};
pub use header::HeaderState;
pub use keyboard::{KeyState, KeyboardEvent, Modifiers};
pub use mobile_nav::MobileNav;
pub use modal::{Item, ModalNavigator, TransitionToken};
pub use particles::ParticleField;
pub use resize::ResizeBroadcaster;
pub use scroll_lock::ScrollLock;
pub use sections::{Section, SectionTracker};
