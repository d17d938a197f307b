//! Resize Broadcaster - Debounced fan-out of viewport resizes
//!
//! Raw resize signals arrive in bursts. Each signal restarts a quiet-period
//! timer; only when the timer survives does the broadcaster notify its
//! subscribers, synchronously and in registration order, exactly once.
//!
//! Subscribers receive the owning context (`Ctx`) mutably. The context owns
//! the broadcaster too, so the driver runs a broadcast in three steps:
//!
//! ```ignore
//! if site.resize.take_due(timer) {
//!     let mut subscribers = site.resize.take_subscribers();
//!     for subscriber in subscribers.iter_mut() {
//!         subscriber(&mut site);
//!     }
//!     site.resize.restore_subscribers(subscribers);
//! }
//! ```
//!
//! [`ResizeBroadcaster::broadcast`] covers the case where the context is a
//! separate value.

use crate::host::Scheduler;
use crate::types::TimerHandle;

/// Default quiet period.
pub const RESIZE_QUIET_MS: u32 = 200;

/// A resize subscriber.
pub type ResizeSubscriber<Ctx> = Box<dyn FnMut(&mut Ctx)>;

pub struct ResizeBroadcaster<Ctx> {
    subscribers: Vec<ResizeSubscriber<Ctx>>,
    pending: Option<TimerHandle>,
    quiet_ms: u32,
    broadcasts: u64,
}

impl<Ctx> ResizeBroadcaster<Ctx> {
    pub fn new(quiet_ms: u32) -> Self {
        Self {
            subscribers: Vec::new(),
            pending: None,
            quiet_ms,
            broadcasts: 0,
        }
    }

    /// Register a subscriber. Subscribers run in registration order.
    pub fn subscribe<F>(&mut self, subscriber: F)
    where
        F: FnMut(&mut Ctx) + 'static,
    {
        self.subscribers.push(Box::new(subscriber));
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// A raw resize arrived: restart the quiet period.
    pub fn signal(&mut self, scheduler: &mut dyn Scheduler) {
        if let Some(pending) = self.pending.take() {
            scheduler.clear_timeout(pending);
        }
        self.pending = Some(scheduler.set_timeout(self.quiet_ms));
    }

    /// Whether `timer` is the quiet-period timer. Consumes it if so.
    pub fn take_due(&mut self, timer: TimerHandle) -> bool {
        if self.pending == Some(timer) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Number of broadcasts delivered so far.
    pub fn broadcasts(&self) -> u64 {
        self.broadcasts
    }

    /// Move the subscriber list out for a broadcast through the owning context.
    pub fn take_subscribers(&mut self) -> Vec<ResizeSubscriber<Ctx>> {
        self.broadcasts += 1;
        std::mem::take(&mut self.subscribers)
    }

    /// Put the subscriber list back after a broadcast. Subscribers
    /// registered during the broadcast are kept after the original ones.
    pub fn restore_subscribers(&mut self, mut subscribers: Vec<ResizeSubscriber<Ctx>>) {
        subscribers.append(&mut self.subscribers);
        self.subscribers = subscribers;
    }

    /// Notify every subscriber of a context held outside the broadcaster.
    pub fn broadcast(&mut self, ctx: &mut Ctx) {
        self.broadcasts += 1;
        for subscriber in self.subscribers.iter_mut() {
            subscriber(ctx);
        }
    }
}

impl<Ctx> Default for ResizeBroadcaster<Ctx> {
    fn default() -> Self {
        Self::new(RESIZE_QUIET_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;
    use crate::types::Viewport;

    fn setup() -> (MemoryHost, ResizeBroadcaster<Vec<&'static str>>) {
        (
            MemoryHost::new(Viewport::new(1280.0, 800.0)),
            ResizeBroadcaster::default(),
        )
    }

    /// Advance the clock and broadcast for every due quiet timer.
    fn advance(
        host: &mut MemoryHost,
        broadcaster: &mut ResizeBroadcaster<Vec<&'static str>>,
        log: &mut Vec<&'static str>,
        ms: u64,
    ) {
        for timer in host.advance(ms) {
            if broadcaster.take_due(timer) {
                broadcaster.broadcast(log);
            }
        }
    }

    #[test]
    fn test_subscribers_run_in_order() {
        let (mut host, mut broadcaster) = setup();
        broadcaster.subscribe(|log| log.push("layout"));
        broadcaster.subscribe(|log| log.push("canvas"));
        broadcaster.subscribe(|log| log.push("overlay"));

        let mut log = Vec::new();
        broadcaster.signal(&mut host);
        advance(&mut host, &mut broadcaster, &mut log, 200);

        assert_eq!(log, vec!["layout", "canvas", "overlay"]);
    }

    #[test]
    fn test_burst_coalesces_to_one_broadcast() {
        let (mut host, mut broadcaster) = setup();
        broadcaster.subscribe(|log| log.push("resize"));
        let mut log = Vec::new();

        // Ten signals 50ms apart: no broadcast while they keep coming
        for _ in 0..10 {
            broadcaster.signal(&mut host);
            advance(&mut host, &mut broadcaster, &mut log, 50);
        }
        assert!(log.is_empty());
        assert_eq!(host.pending_timers(), 1);

        // Quiet period measured from the last signal (50ms already elapsed)
        advance(&mut host, &mut broadcaster, &mut log, 149);
        assert!(log.is_empty());
        advance(&mut host, &mut broadcaster, &mut log, 1);
        assert_eq!(log, vec!["resize"]);
        assert_eq!(broadcaster.broadcasts(), 1);
        assert!(!broadcaster.is_pending());
    }

    #[test]
    fn test_separate_bursts_broadcast_separately() {
        let (mut host, mut broadcaster) = setup();
        broadcaster.subscribe(|log| log.push("resize"));
        let mut log = Vec::new();

        broadcaster.signal(&mut host);
        advance(&mut host, &mut broadcaster, &mut log, 250);
        broadcaster.signal(&mut host);
        advance(&mut host, &mut broadcaster, &mut log, 250);

        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_foreign_timer_is_not_due() {
        let (mut host, mut broadcaster) = setup();
        let other = host.set_timeout(10);
        broadcaster.signal(&mut host);
        assert!(!broadcaster.take_due(other));
        assert!(broadcaster.is_pending());
    }

    #[test]
    fn test_take_and_restore_keeps_late_subscribers() {
        let mut broadcaster: ResizeBroadcaster<Vec<&'static str>> = ResizeBroadcaster::default();
        broadcaster.subscribe(|log| log.push("first"));

        let mut taken = broadcaster.take_subscribers();
        broadcaster.subscribe(|log| log.push("late"));
        let mut log = Vec::new();
        for subscriber in taken.iter_mut() {
            subscriber(&mut log);
        }
        broadcaster.restore_subscribers(taken);

        assert_eq!(broadcaster.subscriber_count(), 2);
        broadcaster.broadcast(&mut log);
        assert_eq!(log, vec!["first", "first", "late"]);
    }
}
