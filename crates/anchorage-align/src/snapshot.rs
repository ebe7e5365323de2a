#![forbid(unsafe_code)]

//! In-memory [`LayoutHost`] built from captured measurements.
//!
//! [`LayoutSnapshot`] is a flat arena of elements with parent links. It is
//! what tests drive the solver with, and what an embedder can fill from its
//! own renderer once per frame.

use rustc_hash::FxHashMap;

use anchorage_core::{Point, Rect, Size};

use crate::host::{ContainerMetrics, ElementMetrics, LayoutHost, NodeId, ViewportMetrics};

#[derive(Debug, Clone)]
struct SnapshotNode {
    parent: Option<NodeId>,
    metrics: ElementMetrics,
}

/// Captured element tree plus viewport state.
#[derive(Debug, Clone, Default)]
pub struct LayoutSnapshot {
    nodes: FxHashMap<NodeId, SnapshotNode>,
    containers: FxHashMap<NodeId, ContainerMetrics>,
    viewport: ViewportMetrics,
    next_id: u32,
    generation: u64,
}

impl LayoutSnapshot {
    /// Create an empty snapshot with the given viewport.
    #[must_use]
    pub fn new(viewport: ViewportMetrics) -> Self {
        Self {
            viewport,
            ..Default::default()
        }
    }

    /// Add an element and return its handle.
    pub fn add(&mut self, parent: Option<NodeId>, metrics: ElementMetrics) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, SnapshotNode { parent, metrics });
        self.generation += 1;
        id
    }

    /// Remove an element. Children keep their (now dangling) parent link,
    /// which ends the ancestor walk at that point.
    pub fn remove(&mut self, node: NodeId) -> bool {
        self.containers.remove(&node);
        let removed = self.nodes.remove(&node).is_some();
        if removed {
            self.generation += 1;
        }
        removed
    }

    /// Move an element under a new parent.
    pub fn reparent(&mut self, node: NodeId, parent: Option<NodeId>) {
        if let Some(entry) = self.nodes.get_mut(&node) {
            entry.parent = parent;
            self.generation += 1;
        }
    }

    /// Replace an element's measurements. Layout-only; the generation is kept.
    pub fn set_metrics(&mut self, node: NodeId, metrics: ElementMetrics) {
        if let Some(entry) = self.nodes.get_mut(&node) {
            entry.metrics = metrics;
        }
    }

    /// Move or resize an element's bounding rect.
    pub fn set_rect(&mut self, node: NodeId, rect: Rect) {
        if let Some(entry) = self.nodes.get_mut(&node) {
            entry.metrics.rect = rect;
        }
    }

    /// Shift every element's rect, as scrolling an outer container would.
    pub fn translate_all(&mut self, dx: f64, dy: f64) {
        for entry in self.nodes.values_mut() {
            entry.metrics.rect = entry.metrics.rect.translate(dx, dy);
        }
    }

    pub fn set_viewport(&mut self, viewport: ViewportMetrics) {
        self.viewport = viewport;
    }

    /// Override the positioning container used for a popup.
    pub fn set_container(&mut self, node: NodeId, container: ContainerMetrics) {
        self.containers.insert(node, container);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl LayoutHost for LayoutSnapshot {
    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node).and_then(|n| n.parent)
    }

    fn metrics(&self, node: NodeId) -> Option<ElementMetrics> {
        self.nodes.get(&node).map(|n| n.metrics)
    }

    fn viewport(&self) -> ViewportMetrics {
        self.viewport
    }

    fn containing_block(&self, node: NodeId) -> ContainerMetrics {
        self.containers.get(&node).copied().unwrap_or_else(|| {
            let vp = self.viewport;
            ContainerMetrics::new(
                Point::default(),
                Size::new(vp.client_width, vp.client_height),
            )
        })
    }

    fn generation(&self) -> u64 {
        self.generation
    }
}
