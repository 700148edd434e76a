//! Directed connections (arrows) between nodes.

use crate::shapes::{Node, NodeId};
use kurbo::{Line, Point};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for connections.
pub type ConnectionId = Uuid;

/// An arrow from a node to another node or to a point on empty canvas.
///
/// Endpoints are computed from the shape anchors when the connection is made
/// and are not updated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub(crate) id: ConnectionId,
    /// Node the arrow starts from.
    pub source: NodeId,
    /// Node the arrow points at, `None` when it ends in empty space.
    pub target: Option<NodeId>,
    /// Start point.
    pub start: Point,
    /// End point.
    pub end: Point,
}

impl Connection {
    /// Create a connection with explicit endpoints.
    pub fn new(source: NodeId, target: Option<NodeId>, start: Point, end: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            target,
            start,
            end,
        }
    }

    /// Connect the exit anchor of `from` to the entry anchor of `to`.
    pub fn between(from: &Node, to: &Node) -> Self {
        Self::new(from.id(), Some(to.id()), from.exit_anchor(), to.entry_anchor())
    }

    /// Arrow from `from` ending at a free point.
    pub fn dangling(from: &Node, end: Point) -> Self {
        Self::new(from.id(), None, from.exit_anchor(), end)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Check if this connection starts or ends at `node`.
    pub fn references(&self, node: NodeId) -> bool {
        self.source == node || self.target == Some(node)
    }

    /// The arrow as a line segment.
    pub fn line(&self) -> Line {
        Line::new(self.start, self.end)
    }
}
