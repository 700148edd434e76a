//! Placed workflow node.

use super::{NodeData, NodeId, ShapeKind, WorkflowStep};
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A shape placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub(crate) id: NodeId,
    /// Shape kind.
    pub kind: ShapeKind,
    /// Workflow step, fixed when the node is placed.
    pub step: WorkflowStep,
    /// Center point.
    pub position: Point,
    /// Rendered size.
    pub size: Size,
    /// Display label.
    #[serde(default)]
    pub label: Option<String>,
    /// Payload set on this node, layered over the step defaults on export.
    #[serde(default)]
    pub data: Option<NodeData>,
}

impl Node {
    /// Create a node of `kind` centered at `position`, playing the kind's
    /// primary step.
    pub fn new(kind: ShapeKind, position: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            step: WorkflowStep::primary(kind),
            position,
            size: kind.size(),
            label: None,
            data: None,
        }
    }

    /// Set the workflow step.
    pub fn with_step(mut self, step: WorkflowStep) -> Self {
        self.step = step;
        self
    }

    /// Set the display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Bounding box in canvas coordinates.
    pub fn bounds(&self) -> Rect {
        Rect::from_center_size(self.position, self.size)
    }

    /// Check if a point hits this node.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.kind.hit_test(self.position, point, tolerance)
    }

    /// Point incoming arrows attach to.
    pub fn entry_anchor(&self) -> Point {
        self.kind.entry_anchor(self.position)
    }

    /// Point outgoing arrows start from.
    pub fn exit_anchor(&self) -> Point {
        self.kind.exit_anchor(self.position)
    }

    /// Move the node by `delta`.
    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }
}
