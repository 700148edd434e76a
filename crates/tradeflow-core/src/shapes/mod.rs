//! Shape registry for the workflow canvas.
//!
//! Every node on the canvas is one of five fixed kinds. Each kind has an
//! instance cap and a fixed geometric profile that determines its size, its
//! hit area and the anchor points arrows attach to.

mod data;
mod node;
mod step;

pub use data::{
    NodeData, TradeConfig, TradeConfirmation, TradeDetails, TradeType, VerificationStatus,
};
pub use node::Node;
pub use step::{SEQUENCE, WorkflowStep};

use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for nodes.
pub type NodeId = Uuid;

/// Horizontal distance between a node and a successor placed from it.
pub const HORIZONTAL_OFFSET: f64 = 150.0;

/// Half extent used for the anchors of circles, squares and diamonds.
const ANCHOR_RADIUS: f64 = 32.0;

/// Half width of a rectangle node.
const RECT_HALF_WIDTH: f64 = 64.0;

/// Vertical distance from a triangle's centroid to its base.
const TRIANGLE_BASE_OFFSET: f64 = 24.0;

/// The kinds of node a workflow can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Circle,
    Rectangle,
    Square,
    Diamond,
    Triangle,
}

impl ShapeKind {
    /// All kinds, in palette order.
    pub const ALL: [ShapeKind; 5] = [
        ShapeKind::Circle,
        ShapeKind::Rectangle,
        ShapeKind::Square,
        ShapeKind::Diamond,
        ShapeKind::Triangle,
    ];

    /// Maximum number of nodes of this kind on one canvas.
    pub fn cap(self) -> usize {
        match self {
            ShapeKind::Circle | ShapeKind::Rectangle => 2,
            ShapeKind::Square | ShapeKind::Diamond | ShapeKind::Triangle => 1,
        }
    }

    /// Wire name of the kind.
    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Circle => "circle",
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Square => "square",
            ShapeKind::Diamond => "diamond",
            ShapeKind::Triangle => "triangle",
        }
    }

    /// Rendered size of a node of this kind.
    pub fn size(self) -> Size {
        match self {
            ShapeKind::Circle | ShapeKind::Square | ShapeKind::Diamond => Size::new(64.0, 64.0),
            ShapeKind::Rectangle => Size::new(128.0, 48.0),
            ShapeKind::Triangle => Size::new(64.0, 48.0),
        }
    }

    /// Offset from the center to the point incoming arrows end at.
    pub fn entry_offset(self) -> Vec2 {
        match self {
            ShapeKind::Circle | ShapeKind::Square | ShapeKind::Diamond => {
                Vec2::new(-ANCHOR_RADIUS, 0.0)
            }
            ShapeKind::Rectangle => Vec2::new(-RECT_HALF_WIDTH, 0.0),
            ShapeKind::Triangle => Vec2::new(0.0, TRIANGLE_BASE_OFFSET),
        }
    }

    /// Offset from the center to the point outgoing arrows start from.
    pub fn exit_offset(self) -> Vec2 {
        match self {
            ShapeKind::Circle | ShapeKind::Square | ShapeKind::Diamond => {
                Vec2::new(ANCHOR_RADIUS, 0.0)
            }
            ShapeKind::Rectangle => Vec2::new(RECT_HALF_WIDTH, 0.0),
            // Arrows leave a triangle from its centroid.
            ShapeKind::Triangle => Vec2::ZERO,
        }
    }

    /// Entry anchor for a node of this kind centered at `center`.
    pub fn entry_anchor(self, center: Point) -> Point {
        center + self.entry_offset()
    }

    /// Exit anchor for a node of this kind centered at `center`.
    pub fn exit_anchor(self, center: Point) -> Point {
        center + self.exit_offset()
    }

    /// Bounding box of a node of this kind centered at `center`.
    pub fn bounds(self, center: Point) -> Rect {
        Rect::from_center_size(center, self.size())
    }

    /// Check if `point` hits a node of this kind centered at `center`.
    pub fn hit_test(self, center: Point, point: Point, tolerance: f64) -> bool {
        let size = self.size();
        let half_w = size.width / 2.0;
        let half_h = size.height / 2.0;
        let dx = point.x - center.x;
        let dy = point.y - center.y;

        match self {
            ShapeKind::Circle => center.distance(point) <= half_w + tolerance,
            ShapeKind::Rectangle | ShapeKind::Square => {
                dx.abs() <= half_w + tolerance && dy.abs() <= half_h + tolerance
            }
            ShapeKind::Diamond => {
                // A square rotated by 45 degrees.
                let reach = half_w * std::f64::consts::SQRT_2 + tolerance;
                dx.abs() + dy.abs() <= reach
            }
            ShapeKind::Triangle => {
                if dy < -half_h - tolerance || dy > half_h + tolerance {
                    return false;
                }
                // Apex at the top, base at the bottom: width grows linearly with depth.
                let depth = ((dy + half_h) / size.height).clamp(0.0, 1.0);
                dx.abs() <= half_w * depth + tolerance
            }
        }
    }
}

impl std::fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caps() {
        assert_eq!(ShapeKind::Circle.cap(), 2);
        assert_eq!(ShapeKind::Rectangle.cap(), 2);
        assert_eq!(ShapeKind::Square.cap(), 1);
        assert_eq!(ShapeKind::Diamond.cap(), 1);
        assert_eq!(ShapeKind::Triangle.cap(), 1);
    }

    #[test]
    fn test_circle_anchors() {
        let center = Point::new(100.0, 100.0);
        assert_eq!(ShapeKind::Circle.entry_anchor(center), Point::new(68.0, 100.0));
        assert_eq!(ShapeKind::Circle.exit_anchor(center), Point::new(132.0, 100.0));
    }

    #[test]
    fn test_rectangle_anchors_use_half_width() {
        let center = Point::new(200.0, 50.0);
        assert_eq!(ShapeKind::Rectangle.entry_anchor(center), Point::new(136.0, 50.0));
        assert_eq!(ShapeKind::Rectangle.exit_anchor(center), Point::new(264.0, 50.0));
    }

    #[test]
    fn test_triangle_anchors() {
        let center = Point::new(0.0, 0.0);
        assert_eq!(ShapeKind::Triangle.entry_anchor(center), Point::new(0.0, 24.0));
        assert_eq!(ShapeKind::Triangle.exit_anchor(center), center);
    }

    #[test]
    fn test_circle_hit_test() {
        let center = Point::new(0.0, 0.0);
        assert!(ShapeKind::Circle.hit_test(center, Point::new(32.0, 0.0), 0.0));
        // Corner of the bounding box lies outside the circle.
        assert!(!ShapeKind::Circle.hit_test(center, Point::new(30.0, 30.0), 0.0));
    }

    #[test]
    fn test_diamond_hit_test() {
        let center = Point::new(0.0, 0.0);
        assert!(ShapeKind::Diamond.hit_test(center, Point::new(40.0, 0.0), 0.0));
        assert!(!ShapeKind::Diamond.hit_test(center, Point::new(30.0, 30.0), 0.0));
    }

    #[test]
    fn test_triangle_hit_test() {
        let center = Point::new(0.0, 0.0);
        // Near the apex only the middle is inside.
        assert!(ShapeKind::Triangle.hit_test(center, Point::new(0.0, -20.0), 0.0));
        assert!(!ShapeKind::Triangle.hit_test(center, Point::new(25.0, -20.0), 0.0));
        // The base spans the full width.
        assert!(ShapeKind::Triangle.hit_test(center, Point::new(30.0, 23.0), 0.0));
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        let json = serde_json::to_string(&ShapeKind::Diamond).unwrap();
        assert_eq!(json, "\"diamond\"");
    }
}
