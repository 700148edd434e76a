//! Snapping arrow endpoints to nearby nodes.

use crate::canvas::CanvasDocument;
use crate::shapes::NodeId;
use kurbo::Point;

/// Distance from a node center within which a dragged arrow end snaps to it.
pub const SNAP_DISTANCE: f64 = 50.0;

/// A node an arrow end has snapped to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapTarget {
    /// The node snapped to.
    pub node: NodeId,
    /// Its entry anchor, where the arrow will end.
    pub point: Point,
    /// Distance from the pointer to the node center.
    pub distance: f64,
}

/// Find the node nearest to `point` whose center is closer than `threshold`,
/// skipping `exclude`.
pub fn snap_to_node(
    document: &CanvasDocument,
    point: Point,
    exclude: Option<NodeId>,
    threshold: f64,
) -> Option<SnapTarget> {
    let mut best: Option<SnapTarget> = None;

    for node in document.nodes_ordered() {
        if Some(node.id()) == exclude {
            continue;
        }
        let distance = point.distance(node.position);
        if distance >= threshold {
            continue;
        }
        if best.is_none_or(|b| distance < b.distance) {
            best = Some(SnapTarget {
                node: node.id(),
                point: node.entry_anchor(),
                distance,
            });
        }
    }

    best
}
