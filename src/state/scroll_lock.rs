//! Scroll Lock - Reference-counted page scroll suppression
//!
//! Several independent holders (mobile menu, lightbox) may suppress
//! background scrolling at the same time. The body class is applied on the
//! first `acquire` and removed only when the last holder releases.
//! `release` on a free lock is a no-op, so unmatched releases from early
//! return paths are harmless.
//!
//! # Example
//!
//! ```ignore
//! let mut lock = ScrollLock::new("no-scroll");
//! lock.acquire(&mut host); // menu
//! lock.acquire(&mut host); // lightbox
//! lock.release(&mut host); // lightbox closes, still locked
//! lock.release(&mut host); // menu closes, unlocked
//! ```

use spark_signals::{signal, Signal};

use crate::host::Host;

pub struct ScrollLock {
    count: usize,
    locked: Signal<bool>,
    class: String,
}

impl ScrollLock {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            count: 0,
            locked: signal(false),
            class: class.into(),
        }
    }

    /// Take a hold on the lock.
    pub fn acquire(&mut self, host: &mut dyn Host) {
        self.count += 1;
        if self.count == 1 {
            self.apply(host, true);
        }
    }

    /// Drop a hold on the lock. Does nothing when no hold is outstanding.
    pub fn release(&mut self, host: &mut dyn Host) {
        if self.count == 0 {
            return;
        }
        self.count -= 1;
        if self.count == 0 {
            self.apply(host, false);
        }
    }

    fn apply(&mut self, host: &mut dyn Host, locked: bool) {
        tracing::debug!(locked, "scroll lock");
        self.locked.set(locked);
        if let Some(body) = host.body() {
            host.set_class(body, &self.class, locked);
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked.get()
    }

    /// Outstanding holds.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Reactive view of the lock flag.
    pub fn locked_signal(&self) -> Signal<bool> {
        self.locked.clone()
    }
}
