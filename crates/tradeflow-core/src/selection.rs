//! Box selection and drag bookkeeping.

use crate::canvas::CanvasDocument;
use crate::shapes::NodeId;
use kurbo::{Point, Rect, Vec2};

/// A rubber-band selection box, live while the pointer is held.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionBox {
    /// Where the box was started.
    pub start: Point,
    /// Current pointer position.
    pub current: Point,
}

impl SelectionBox {
    /// Start a box at `point`.
    pub fn new(point: Point) -> Self {
        Self {
            start: point,
            current: point,
        }
    }

    /// Move the free corner.
    pub fn update(&mut self, point: Point) {
        self.current = point;
    }

    /// The box as a normalized rectangle.
    pub fn rect(&self) -> Rect {
        Rect::from_points(self.start, self.current)
    }

    /// Nodes whose center lies in the box.
    pub fn nodes_within(&self, document: &CanvasDocument) -> Vec<NodeId> {
        document.nodes_in_rect(self.rect())
    }
}

/// State of a single node being dragged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeDrag {
    /// The node being dragged.
    pub node: NodeId,
    /// Offset from the pointer to the node center at press time.
    pub grab_offset: Vec2,
    /// Where the press started.
    pub start_point: Point,
}

impl NodeDrag {
    /// Start dragging `node` centered at `center` from `press`.
    pub fn new(node: NodeId, center: Point, press: Point) -> Self {
        Self {
            node,
            grab_offset: center - press,
            start_point: press,
        }
    }

    /// Where the node center should be for the pointer at `point`.
    pub fn target_position(&self, point: Point) -> Point {
        point + self.grab_offset
    }

    /// Distance the pointer has travelled from the press.
    pub fn travel(&self, point: Point) -> f64 {
        self.start_point.distance(point)
    }
}

/// State for moving every selected node at once.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionDrag {
    /// The nodes being moved.
    pub nodes: Vec<NodeId>,
    /// Where the press started.
    pub start_point: Point,
    /// Pointer position at the last applied move.
    pub last_point: Point,
}

impl SelectionDrag {
    /// Start moving `nodes` from `press`.
    pub fn new(nodes: Vec<NodeId>, press: Point) -> Self {
        Self {
            nodes,
            start_point: press,
            last_point: press,
        }
    }

    /// Record a pointer move and return the delta since the previous one.
    pub fn step(&mut self, point: Point) -> Vec2 {
        let delta = point - self.last_point;
        self.last_point = point;
        delta
    }

    /// Distance the pointer has travelled from the press.
    pub fn travel(&self, point: Point) -> f64 {
        self.start_point.distance(point)
    }
}
