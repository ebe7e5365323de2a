#![forbid(unsafe_code)]

//! Per-popup alignment session.
//!
//! An [`Aligner`] lives as long as its popup and carries the state that has
//! to survive between passes: the [`FlipCache`], the last [`AlignResult`],
//! the memoized scroller list and its event subscriptions, and the request
//! coalescer.
//!
//! Two ways to drive it:
//!
//! - [`Aligner::align`] runs a pass right away;
//! - [`Aligner::schedule`] records why a pass is needed and
//!   [`Aligner::flush`] runs at most one pass for everything queued since
//!   the previous flush.
//!
//! Closing the popup, or switching to a different placement name, clears the
//! flip cache and marks the result as not ready.

use std::fmt;

use anchorage_core::{Point, Rect};

use crate::flip_cache::FlipCache;
use crate::host::{LayoutHost, NodeId, measure_mirrored};
use crate::placement::{Direction, Placement, PlacementOverride};
use crate::region::{ScrollerCache, collect_regions};
use crate::registry::PlacementRegistry;
use crate::scheduler::{AlignScheduler, AlignTicket, AlignTrigger, EventSource};
use crate::solver::{AlignResult, SolverInput, solve};

const LOG_TARGET: &str = "anchorage.align";

/// What the popup is anchored to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AlignTarget {
    /// An element in the host tree.
    Node(NodeId),
    /// A raw viewport point, e.g. a context-menu click.
    Point(Point),
}

impl AlignTarget {
    pub fn node(self) -> Option<NodeId> {
        match self {
            Self::Node(node) => Some(node),
            Self::Point(_) => None,
        }
    }

    pub fn is_point(self) -> bool {
        matches!(self, Self::Point(_))
    }
}

impl From<NodeId> for AlignTarget {
    fn from(node: NodeId) -> Self {
        Self::Node(node)
    }
}

impl From<Point> for AlignTarget {
    fn from(point: Point) -> Self {
        Self::Point(point)
    }
}

/// Inputs of one `align` call.
#[derive(Debug, Clone, Copy)]
pub struct AlignRequest<'a> {
    pub target: AlignTarget,
    pub popup: NodeId,
    /// Registry key; unknown names fall back to the default placement.
    pub placement: &'a str,
    pub registry: &'a PlacementRegistry,
    pub overrides: Option<&'a PlacementOverride>,
    pub direction: Direction,
}

impl<'a> AlignRequest<'a> {
    pub fn new(
        target: impl Into<AlignTarget>,
        popup: NodeId,
        placement: &'a str,
        registry: &'a PlacementRegistry,
    ) -> Self {
        Self {
            target: target.into(),
            popup,
            placement,
            registry,
            overrides: None,
            direction: Direction::Ltr,
        }
    }

    #[must_use]
    pub fn overrides(mut self, overrides: &'a PlacementOverride) -> Self {
        self.overrides = Some(overrides);
        self
    }

    #[must_use]
    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    fn resolve_placement(&self) -> Placement {
        self.registry.resolve(self.placement, self.overrides)
    }
}

type AlignedCallback = Box<dyn FnMut(&Placement)>;

/// Alignment state for one popup.
pub struct Aligner {
    open: bool,
    placement_name: Option<String>,
    target: Option<AlignTarget>,
    popup: Option<NodeId>,
    flips: FlipCache,
    scheduler: AlignScheduler,
    scrollers: ScrollerCache,
    result: AlignResult,
    passes: u64,
    on_aligned: Option<AlignedCallback>,
}

impl fmt::Debug for Aligner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Aligner")
            .field("open", &self.open)
            .field("placement_name", &self.placement_name)
            .field("target", &self.target)
            .field("popup", &self.popup)
            .field("flips", &self.flips)
            .field("scheduler", &self.scheduler)
            .field("result", &self.result)
            .field("passes", &self.passes)
            .field("on_aligned", &self.on_aligned.is_some())
            .finish()
    }
}

impl Default for Aligner {
    fn default() -> Self {
        Self::new()
    }
}

impl Aligner {
    #[must_use]
    pub fn new() -> Self {
        Self {
            open: false,
            placement_name: None,
            target: None,
            popup: None,
            flips: FlipCache::new(),
            scheduler: AlignScheduler::new(),
            scrollers: ScrollerCache::new(),
            result: AlignResult::default(),
            passes: 0,
            on_aligned: None,
        }
    }

    /// Called with the resolved placement whenever a pass changes the result.
    #[must_use]
    pub fn on_aligned(mut self, callback: impl FnMut(&Placement) + 'static) -> Self {
        self.on_aligned = Some(Box::new(callback));
        self
    }

    pub fn result(&self) -> &AlignResult {
        &self.result
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn flip_cache(&self) -> &FlipCache {
        &self.flips
    }

    pub fn scheduler(&self) -> &AlignScheduler {
        &self.scheduler
    }

    /// Scroller ancestors the session currently listens to.
    pub fn scrollers(&self) -> &[NodeId] {
        self.scrollers.scrollers()
    }

    /// Number of solver passes that produced a result.
    pub fn pass_count(&self) -> u64 {
        self.passes
    }

    /// Run a pass now.
    ///
    /// With `open == false` the session is closed instead and the previous
    /// result is returned with `ready` cleared.
    pub fn align<H: LayoutHost + ?Sized>(
        &mut self,
        host: &H,
        open: bool,
        request: &AlignRequest<'_>,
    ) -> &AlignResult {
        self.sync(host, open, request);
        if self.open {
            self.scheduler.cancel();
            self.run_pass(host, request);
        }
        &self.result
    }

    /// Record that a pass is needed without running it.
    ///
    /// Returns the queued ticket, or `None` when the popup is closed.
    pub fn schedule<H: LayoutHost + ?Sized>(
        &mut self,
        host: &H,
        open: bool,
        request: &AlignRequest<'_>,
    ) -> Option<AlignTicket> {
        let triggers = self.sync(host, open, request);
        if !self.open {
            return None;
        }
        let triggers = if triggers.is_empty() {
            AlignTrigger::POPUP_RESIZED
        } else {
            triggers
        };
        Some(self.scheduler.request(triggers))
    }

    /// Forward a scroll or resize event; ignored unless subscribed.
    pub fn notify(&mut self, source: EventSource) -> Option<AlignTicket> {
        if !self.open {
            return None;
        }
        self.scheduler.notify(source)
    }

    /// Run at most one pass for everything queued since the last flush.
    ///
    /// Returns `true` when a pass ran.
    pub fn flush<H: LayoutHost + ?Sized>(&mut self, host: &H, request: &AlignRequest<'_>) -> bool {
        if !self.open {
            self.scheduler.cancel();
            return false;
        }
        if self.scheduler.flush().is_none() {
            return false;
        }
        self.sync(host, true, request);
        self.run_pass(host, request);
        true
    }

    /// Bring session state in line with `open` and `request`.
    fn sync<H: LayoutHost + ?Sized>(
        &mut self,
        host: &H,
        open: bool,
        request: &AlignRequest<'_>,
    ) -> AlignTrigger {
        if !open {
            if self.open {
                self.close();
            }
            return AlignTrigger::empty();
        }

        let mut triggers = AlignTrigger::empty();
        if !self.open {
            self.open = true;
            self.flips.clear();
            self.result.ready = false;
            triggers |= AlignTrigger::OPEN;
        }

        if self.placement_name.as_deref() != Some(request.placement) {
            if self.placement_name.is_some() {
                tracing::debug!(
                    target: LOG_TARGET,
                    from = ?self.placement_name,
                    to = request.placement,
                    "placement changed, flip cache reset"
                );
                self.flips.clear();
                self.result.ready = false;
            }
            self.placement_name = Some(request.placement.to_owned());
            triggers |= AlignTrigger::PLACEMENT_CHANGED;
        }

        if self.target != Some(request.target) || self.popup != Some(request.popup) {
            self.target = Some(request.target);
            self.popup = Some(request.popup);
            triggers |= AlignTrigger::TARGET_CHANGED;
        }

        let changed = self
            .scrollers
            .refresh(host, request.target.node(), request.popup);
        if changed || triggers.contains(AlignTrigger::OPEN) {
            let sources = self
                .scrollers
                .scrollers()
                .iter()
                .map(|&node| EventSource::Scroll(node))
                .chain(std::iter::once(EventSource::WindowResize));
            self.scheduler.subscribe(sources);
        }
        triggers
    }

    fn close(&mut self) {
        tracing::debug!(target: LOG_TARGET, "popup closed, alignment reset");
        self.open = false;
        self.result.ready = false;
        self.flips.clear();
        self.scheduler.cancel();
        self.scheduler.unsubscribe_all();
        self.scrollers.invalidate();
    }

    fn run_pass<H: LayoutHost + ?Sized>(&mut self, host: &H, request: &AlignRequest<'_>) {
        let span = tracing::debug_span!(
            target: LOG_TARGET,
            "align.pass",
            placement = request.placement,
            point_mode = request.target.is_point(),
        );
        let _guard = span.enter();

        let Some(popup) = host.metrics(request.popup) else {
            tracing::debug!(target: LOG_TARGET, "align pass aborted: popup unmounted");
            return;
        };

        let target = match request.target {
            AlignTarget::Node(node) => match host.metrics(node) {
                Some(metrics) if metrics.is_displayed() => metrics.rect,
                Some(_) => {
                    tracing::debug!(target: LOG_TARGET, "align pass aborted: target not displayed");
                    return;
                }
                None => {
                    tracing::debug!(target: LOG_TARGET, "align pass aborted: target unmounted");
                    return;
                }
            },
            AlignTarget::Point(point) => Rect::at_point(point),
        };

        let container = host.containing_block(request.popup);
        let input = SolverInput {
            target,
            popup: popup.rect,
            popup_css_size: popup.css_size,
            popup_mirror: measure_mirrored(&popup.rect, &container),
            placement: request.resolve_placement(),
            regions: collect_regions(host, self.scrollers.scrollers()),
            direction: request.direction,
        };

        let Some(result) = solve(&input, &mut self.flips) else {
            return;
        };
        self.passes += 1;
        if result == self.result {
            return;
        }
        self.result = result;
        if let Some(callback) = self.on_aligned.as_mut() {
            callback(&self.result.resolved_placement);
        }
    }
}
