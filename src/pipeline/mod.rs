//! Event Pipeline
//!
//! Connects host events to the components that own them.
//!
//! ```text
//! host event → SiteEvent → Site::handle → component → Host / Animator writes
//! ```
//!
//! - **dispatch** - Role table resolving click and key targets
//! - **mount** - The `Site` composition root and event routing
//!
//! Components never read each other's state. The only things they share
//! are the scroll lock and the resize broadcaster, both owned by `Site`.

pub mod dispatch;
pub mod mount;

pub use dispatch::{Dispatcher, Role, RoleSet};
pub use mount::{Site, SiteEvent};
