#![forbid(unsafe_code)]

//! Coalescing of alignment requests.
//!
//! Opening a popup, scrolling an ancestor, resizing the window and so on
//! all ask for a re-alignment, often several times within one frame.
//! [`AlignScheduler`] turns those into at most one solver run per flush.
//!
//! # Design
//!
//! Every request bumps a monotonically increasing counter and queues a
//! ticket carrying the counter value. At flush time the queue is drained,
//! and only the ticket equal to the latest counter value is honoured; older
//! tickets are dropped silently. The triggers of every coalesced request are
//! OR-ed together and handed back, so the caller can see why the pass runs.
//!
//! The scheduler also owns the event subscriptions of an open session
//! (ancestor scrollers and the window). Events from sources that are not
//! subscribed are ignored.
//!
//! # Thread Safety
//!
//! Not thread-safe; each popup owns one and drives it from the UI thread.

use std::collections::VecDeque;

use bitflags::bitflags;
use rustc_hash::FxHashSet;

use crate::host::NodeId;

const LOG_TARGET: &str = "anchorage.align";

bitflags! {
    /// Why an alignment was requested.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AlignTrigger: u8 {
        const OPEN              = 0b0000_0001;
        const TARGET_CHANGED    = 0b0000_0010;
        const POPUP_RESIZED     = 0b0000_0100;
        const SCROLLED          = 0b0000_1000;
        const WINDOW_RESIZED    = 0b0001_0000;
        const PLACEMENT_CHANGED = 0b0010_0000;
    }
}

/// Handle for one queued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AlignTicket(u64);

impl AlignTicket {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// A source of re-alignment events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventSource {
    /// An ancestor scroller of the target or popup scrolled.
    Scroll(NodeId),
    /// The window was resized.
    WindowResize,
}

impl EventSource {
    fn trigger(self) -> AlignTrigger {
        match self {
            Self::Scroll(_) => AlignTrigger::SCROLLED,
            Self::WindowResize => AlignTrigger::WINDOW_RESIZED,
        }
    }
}

/// Per-popup request coalescer and subscription list.
#[derive(Debug, Clone, Default)]
pub struct AlignScheduler {
    counter: u64,
    queue: VecDeque<AlignTicket>,
    pending: AlignTrigger,
    subscriptions: FxHashSet<EventSource>,
}

impl AlignScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a request and return its ticket.
    pub fn request(&mut self, trigger: AlignTrigger) -> AlignTicket {
        self.counter += 1;
        let ticket = AlignTicket(self.counter);
        self.queue.push_back(ticket);
        self.pending |= trigger;
        ticket
    }

    /// Whether `ticket` is the most recent request.
    #[inline]
    pub fn is_latest(&self, ticket: AlignTicket) -> bool {
        ticket.0 == self.counter
    }

    /// Whether any request is waiting for a flush.
    #[inline]
    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Triggers accumulated since the last flush.
    #[inline]
    pub fn pending_triggers(&self) -> AlignTrigger {
        self.pending
    }

    /// Drain the queue.
    ///
    /// Returns the coalesced triggers when the latest request was among the
    /// drained tickets, meaning exactly one solver run is due. Returns
    /// `None` when nothing (or only stale tickets) was queued.
    pub fn flush(&mut self) -> Option<AlignTrigger> {
        let mut due = false;
        let mut dropped = 0usize;
        while let Some(ticket) = self.queue.pop_front() {
            if self.is_latest(ticket) {
                due = true;
            } else {
                dropped += 1;
            }
        }
        let triggers = std::mem::take(&mut self.pending);
        if !due {
            return None;
        }
        tracing::debug!(
            target: LOG_TARGET,
            ticket = self.counter,
            dropped,
            triggers = ?triggers,
            "align requests coalesced"
        );
        Some(triggers)
    }

    /// Drop every queued request without running it.
    pub fn cancel(&mut self) {
        self.queue.clear();
        self.pending = AlignTrigger::empty();
    }

    /// Replace the subscription list.
    pub fn subscribe(&mut self, sources: impl IntoIterator<Item = EventSource>) {
        self.subscriptions = sources.into_iter().collect();
        tracing::debug!(
            target: LOG_TARGET,
            count = self.subscriptions.len(),
            "align subscriptions replaced"
        );
    }

    /// Tear down every subscription.
    pub fn unsubscribe_all(&mut self) {
        if !self.subscriptions.is_empty() {
            tracing::debug!(
                target: LOG_TARGET,
                count = self.subscriptions.len(),
                "align subscriptions cleared"
            );
        }
        self.subscriptions.clear();
    }

    pub fn is_subscribed(&self, source: EventSource) -> bool {
        self.subscriptions.contains(&source)
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Route an event; queues a request only for subscribed sources.
    pub fn notify(&mut self, source: EventSource) -> Option<AlignTicket> {
        if !self.is_subscribed(source) {
            return None;
        }
        Some(self.request(source.trigger()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_of_requests_runs_once() {
        let mut scheduler = AlignScheduler::new();
        let first = scheduler.request(AlignTrigger::OPEN);
        let second = scheduler.request(AlignTrigger::SCROLLED);
        let third = scheduler.request(AlignTrigger::WINDOW_RESIZED);
        assert!(!scheduler.is_latest(first));
        assert!(!scheduler.is_latest(second));
        assert!(scheduler.is_latest(third));

        let triggers = scheduler.flush().unwrap();
        assert_eq!(
            triggers,
            AlignTrigger::OPEN | AlignTrigger::SCROLLED | AlignTrigger::WINDOW_RESIZED
        );
        assert!(!scheduler.has_pending());
        assert_eq!(scheduler.flush(), None);
    }

    #[test]
    fn tickets_increase_monotonically() {
        let mut scheduler = AlignScheduler::new();
        let a = scheduler.request(AlignTrigger::OPEN);
        scheduler.flush();
        let b = scheduler.request(AlignTrigger::OPEN);
        assert!(b > a);
        assert_eq!(b.id(), a.id() + 1);
    }

    #[test]
    fn cancel_drops_everything() {
        let mut scheduler = AlignScheduler::new();
        scheduler.request(AlignTrigger::OPEN);
        scheduler.cancel();
        assert!(!scheduler.has_pending());
        assert_eq!(scheduler.pending_triggers(), AlignTrigger::empty());
        assert_eq!(scheduler.flush(), None);
    }

    #[test]
    fn only_subscribed_sources_request() {
        let mut scheduler = AlignScheduler::new();
        let scroller = NodeId(3);
        assert!(scheduler.notify(EventSource::WindowResize).is_none());

        scheduler.subscribe([EventSource::Scroll(scroller), EventSource::WindowResize]);
        assert_eq!(scheduler.subscription_count(), 2);
        assert!(scheduler.notify(EventSource::Scroll(NodeId(9))).is_none());
        assert!(scheduler.notify(EventSource::Scroll(scroller)).is_some());
        assert_eq!(scheduler.flush(), Some(AlignTrigger::SCROLLED));

        scheduler.unsubscribe_all();
        assert!(scheduler.notify(EventSource::WindowResize).is_none());
    }
}
