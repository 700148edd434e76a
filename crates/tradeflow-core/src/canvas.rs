//! Canvas document and state management.

use crate::connection::Connection;
use crate::protocol::VerificationData;
use crate::shapes::{HORIZONTAL_OFFSET, Node, NodeData, NodeId, ShapeKind, WorkflowStep};
use crate::widget::{WidgetManager, WidgetState};
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Height of the band at the bottom of the viewport that deletes dropped nodes.
pub const DELETE_ZONE_HEIGHT: f64 = 96.0;

/// A workflow document: placed nodes and the arrows between them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasDocument {
    /// Unique document identifier.
    pub id: String,
    /// All nodes in the document, keyed by ID.
    pub nodes: HashMap<NodeId, Node>,
    /// Placement order of nodes (back to front).
    pub order: Vec<NodeId>,
    /// Directed connections, at most one per source node.
    pub connections: Vec<Connection>,
}

impl Default for CanvasDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasDocument {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            nodes: HashMap::new(),
            order: Vec::new(),
            connections: Vec::new(),
        }
    }

    /// Number of nodes of `kind`.
    pub fn count_of(&self, kind: ShapeKind) -> usize {
        self.nodes.values().filter(|n| n.kind == kind).count()
    }

    /// Check if another node of `kind` fits under its cap.
    pub fn can_place(&self, kind: ShapeKind) -> bool {
        self.count_of(kind) < kind.cap()
    }

    /// First step of `kind` no placed node plays yet. `None` exactly when
    /// the cap for `kind` is reached.
    pub fn free_step(&self, kind: ShapeKind) -> Option<WorkflowStep> {
        WorkflowStep::of_kind(kind)
            .iter()
            .copied()
            .find(|&step| !self.nodes.values().any(|n| n.step == step))
    }

    /// Add a node. A node whose step is already taken is moved to the first
    /// free step of its kind. Returns `None` without changing anything when
    /// the cap for its kind is already reached.
    pub fn add_node(&mut self, mut node: Node) -> Option<NodeId> {
        if !self.can_place(node.kind) {
            log::debug!("{} cap reached, not placing", node.kind);
            return None;
        }
        let taken = !WorkflowStep::of_kind(node.kind).contains(&node.step)
            || self.nodes.values().any(|n| n.step == node.step);
        if taken {
            node.step = self.free_step(node.kind)?;
        }
        let id = node.id();
        self.order.push(id);
        self.nodes.insert(id, node);
        Some(id)
    }

    /// Remove a node and every connection that references it.
    pub fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        let node = self.nodes.remove(&id)?;
        self.order.retain(|&node_id| node_id != id);
        self.connections.retain(|c| !c.references(id));
        Some(node)
    }

    /// Get a node by ID.
    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Get a mutable reference to a node by ID.
    pub fn get_node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Get nodes in placement order.
    pub fn nodes_ordered(&self) -> impl Iterator<Item = &Node> {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }

    /// Find nodes at a point, frontmost first.
    pub fn nodes_at_point(&self, point: Point, tolerance: f64) -> Vec<NodeId> {
        self.order
            .iter()
            .rev()
            .filter_map(|&id| {
                self.nodes
                    .get(&id)
                    .filter(|n| n.hit_test(point, tolerance))
                    .map(|_| id)
            })
            .collect()
    }

    /// Find nodes whose center lies inside `rect`.
    pub fn nodes_in_rect(&self, rect: Rect) -> Vec<NodeId> {
        self.nodes_ordered()
            .filter(|n| {
                let p = n.position;
                p.x >= rect.x0 && p.x <= rect.x1 && p.y >= rect.y0 && p.y <= rect.y1
            })
            .map(|n| n.id())
            .collect()
    }

    /// The workflow step a node plays.
    pub fn step_of(&self, id: NodeId) -> Option<WorkflowStep> {
        self.nodes.get(&id).map(|n| n.step)
    }

    /// Find the node playing `step`, if one is placed.
    pub fn find_step(&self, step: WorkflowStep) -> Option<NodeId> {
        self.order
            .iter()
            .copied()
            .find(|&id| self.step_of(id) == Some(step))
    }

    /// Add a connection, replacing any existing connection from the same
    /// source. Returns false if an endpoint node does not exist.
    pub fn connect(&mut self, connection: Connection) -> bool {
        if !self.nodes.contains_key(&connection.source) {
            return false;
        }
        if let Some(target) = connection.target {
            if !self.nodes.contains_key(&target) {
                return false;
            }
        }

        match self
            .connections
            .iter_mut()
            .find(|c| c.source == connection.source)
        {
            Some(existing) => {
                log::debug!("Replacing connection from {}", connection.source);
                *existing = connection;
            }
            None => self.connections.push(connection),
        }
        true
    }

    /// The outgoing connection of a node.
    pub fn connection_from(&self, source: NodeId) -> Option<&Connection> {
        self.connections.iter().find(|c| c.source == source)
    }
}

/// Runtime canvas state (not persisted).
#[derive(Debug, Clone)]
pub struct Canvas {
    /// The document being edited.
    pub document: CanvasDocument,
    /// Widget manager for UI state (selection, hover, menus).
    pub widgets: WidgetManager,
    /// Viewport size.
    pub viewport_size: Size,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    /// Create a new canvas with an empty document.
    pub fn new() -> Self {
        Self::with_document(CanvasDocument::new())
    }

    /// Create a canvas with an existing document.
    pub fn with_document(document: CanvasDocument) -> Self {
        Self {
            document,
            widgets: WidgetManager::new(),
            viewport_size: Size::new(800.0, 600.0),
        }
    }

    /// Set the viewport size.
    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.viewport_size = Size::new(width, height);
    }

    /// Center of the viewport.
    pub fn viewport_center(&self) -> Point {
        Point::new(self.viewport_size.width / 2.0, self.viewport_size.height / 2.0)
    }

    /// Place a node of `kind`.
    ///
    /// Without an origin the node lands at the viewport center. With an
    /// origin it lands [`HORIZONTAL_OFFSET`] to the right of it and is
    /// connected from it. Returns `None` when the cap for `kind` is reached.
    pub fn place_shape(&mut self, kind: ShapeKind, origin: Option<NodeId>) -> Option<NodeId> {
        if !self.document.can_place(kind) {
            log::debug!("{kind} cap reached, ignoring placement");
            return None;
        }

        let origin = origin.and_then(|id| self.document.get_node(id)).cloned();
        let position = match &origin {
            Some(o) => o.position + Vec2::new(HORIZONTAL_OFFSET, 0.0),
            None => self.viewport_center(),
        };

        let step = self.document.free_step(kind)?;
        let node = Node::new(kind, position)
            .with_step(step)
            .with_label(step.title());
        let connection = origin.as_ref().map(|o| Connection::between(o, &node));
        let id = self.document.add_node(node)?;

        if let Some(connection) = connection {
            self.document.connect(connection);
        }
        log::debug!("Placed {kind} ({step:?}) at {position:?}");
        Some(id)
    }

    /// Kind of the node that would follow `origin` in the workflow.
    pub fn next_kind_for(&self, origin: NodeId) -> Option<ShapeKind> {
        self.document.step_of(origin)?.successor()
    }

    /// Check if "add next shape" is available for `origin`: it has no
    /// outgoing connection and its successor kind is under the cap.
    pub fn can_add_next(&self, origin: NodeId) -> bool {
        if self.document.connection_from(origin).is_some() {
            return false;
        }
        self.next_kind_for(origin)
            .is_some_and(|kind| self.document.can_place(kind))
    }

    /// Place the successor of `origin` and chain it.
    pub fn place_next(&mut self, origin: NodeId) -> Option<NodeId> {
        if !self.can_add_next(origin) {
            return None;
        }
        let kind = self.next_kind_for(origin)?;
        self.place_shape(kind, Some(origin))
    }

    /// Move a node by `delta`. Returns false if the node does not exist.
    pub fn move_node(&mut self, id: NodeId, delta: Vec2) -> bool {
        match self.document.get_node_mut(id) {
            Some(node) => {
                node.translate(delta);
                true
            }
            None => false,
        }
    }

    /// Remove a node, its connections and its UI state.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        self.widgets.remove(id);
        self.document.remove_node(id).is_some()
    }

    /// Remove several nodes. Returns how many were removed.
    pub fn remove_nodes(&mut self, ids: &[NodeId]) -> usize {
        ids.iter().filter(|&&id| self.remove_node(id)).count()
    }

    /// The band at the bottom of the viewport that deletes dropped nodes.
    pub fn delete_zone(&self) -> Rect {
        let Size { width, height } = self.viewport_size;
        Rect::new(0.0, (height - DELETE_ZONE_HEIGHT).max(0.0), width, height)
    }

    /// Check if a point lies in the delete zone.
    pub fn in_delete_zone(&self, point: Point) -> bool {
        point.y >= self.delete_zone().y0
    }

    /// Select a single node (clears previous selection).
    pub fn select(&mut self, id: NodeId) {
        self.widgets.set_selection([id]);
    }

    /// Clear selection.
    pub fn clear_selection(&mut self) {
        self.widgets.clear_selection();
    }

    /// Check if a node is selected.
    pub fn is_selected(&self, id: NodeId) -> bool {
        self.widgets.is_selected(id)
    }

    /// Get widget state for a node.
    pub fn widget_state(&self, id: NodeId) -> WidgetState {
        self.widgets.state(id)
    }

    /// Write verification results onto the verification node's payload.
    ///
    /// Position and connections are untouched. Returns false when no
    /// verification node is placed.
    pub fn apply_verification(&mut self, data: &VerificationData) -> bool {
        let Some(id) = self.document.find_step(WorkflowStep::Verification) else {
            log::debug!("No verification node to update");
            return false;
        };
        let Some(node) = self.document.get_node_mut(id) else {
            return false;
        };

        let update = NodeData {
            verification_status: Some(data.into()),
            ..NodeData::default()
        };
        node.data = Some(node.data.take().unwrap_or_default().overlay(update));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{BalanceCheck, SlippageCheck};
    use crate::shapes::SEQUENCE;

    fn build_full_workflow(canvas: &mut Canvas) -> Vec<NodeId> {
        let mut ids = Vec::new();
        let mut previous = None;
        for kind in SEQUENCE {
            let id = canvas.place_shape(kind, previous).unwrap();
            ids.push(id);
            previous = Some(id);
        }
        ids
    }

    fn sample_verification() -> VerificationData {
        VerificationData {
            wallet_connected: true,
            token_pair_valid: true,
            balance_check: BalanceCheck {
                has_balance: true,
                balance: "0.1 ETH".to_string(),
                required_amount: "0.02 ETH".to_string(),
            },
            slippage_check: SlippageCheck {
                within_limits: true,
                current_slippage: "1%".to_string(),
                max_slippage: "1.5%".to_string(),
                recommended_slippage: "1%".to_string(),
            },
        }
    }

    #[test]
    fn test_document_creation() {
        let doc = CanvasDocument::new();
        assert!(doc.nodes.is_empty());
        assert!(doc.order.is_empty());
        assert!(doc.connections.is_empty());
    }

    #[test]
    fn test_caps_hold_under_repeated_clicks() {
        let mut canvas = Canvas::new();
        for kind in ShapeKind::ALL {
            for _ in 0..10 {
                canvas.place_shape(kind, None);
            }
        }
        for kind in ShapeKind::ALL {
            assert_eq!(canvas.document.count_of(kind), kind.cap());
        }
        assert_eq!(canvas.document.nodes.len(), 7);
    }

    #[test]
    fn test_place_without_origin_uses_viewport_center() {
        let mut canvas = Canvas::new();
        canvas.set_viewport_size(1000.0, 500.0);
        let id = canvas.place_shape(ShapeKind::Square, None).unwrap();
        let node = canvas.document.get_node(id).unwrap();
        assert_eq!(node.position, Point::new(500.0, 250.0));
        assert_eq!(node.label.as_deref(), Some("AI Prompts"));
        assert!(canvas.document.connections.is_empty());
    }

    #[test]
    fn test_place_with_origin_offsets_and_connects() {
        let mut canvas = Canvas::new();
        let circle = canvas.place_shape(ShapeKind::Circle, None).unwrap();
        let rect = canvas.place_shape(ShapeKind::Rectangle, Some(circle)).unwrap();

        let origin = canvas.document.get_node(circle).unwrap().position;
        let placed = canvas.document.get_node(rect).unwrap().position;
        assert_eq!(placed, origin + Vec2::new(HORIZONTAL_OFFSET, 0.0));

        let conn = canvas.document.connection_from(circle).unwrap();
        assert_eq!(conn.target, Some(rect));
        assert_eq!(conn.start, origin + Vec2::new(32.0, 0.0));
        assert_eq!(conn.end, placed - Vec2::new(64.0, 0.0));
    }

    #[test]
    fn test_unknown_origin_places_without_connection() {
        let mut canvas = Canvas::new();
        let id = canvas.place_shape(ShapeKind::Circle, Some(Uuid::new_v4()));
        assert!(id.is_some());
        assert!(canvas.document.connections.is_empty());
    }

    #[test]
    fn test_steps_resolve_by_placement_order() {
        let mut canvas = Canvas::new();
        let ids = build_full_workflow(&mut canvas);
        let steps: Vec<_> = ids
            .iter()
            .map(|&id| canvas.document.step_of(id).unwrap())
            .collect();
        assert_eq!(
            steps,
            vec![
                WorkflowStep::UserInput,
                WorkflowStep::OnChainData,
                WorkflowStep::AiReasoning,
                WorkflowStep::TradeDetails,
                WorkflowStep::Verification,
                WorkflowStep::Confirmation,
                WorkflowStep::Execute,
            ]
        );
        assert_eq!(canvas.document.connections.len(), 6);
    }

    #[test]
    fn test_deleting_keeps_step_identity() {
        let mut canvas = Canvas::new();
        let ids = build_full_workflow(&mut canvas);
        assert!(canvas.remove_node(ids[1]));

        assert_eq!(
            canvas.document.step_of(ids[4]),
            Some(WorkflowStep::Verification)
        );
        assert_eq!(
            canvas.document.find_step(WorkflowStep::Verification),
            Some(ids[4])
        );
        assert_eq!(canvas.document.find_step(WorkflowStep::OnChainData), None);

        assert!(canvas.apply_verification(&sample_verification()));
        let node = canvas.document.get_node(ids[4]).unwrap();
        assert!(node.data.as_ref().unwrap().verification_status.is_some());
        assert_eq!(node.label.as_deref(), Some(WorkflowStep::Verification.title()));

        let refill = canvas.place_shape(ShapeKind::Rectangle, None).unwrap();
        let node = canvas.document.get_node(refill).unwrap();
        assert_eq!(node.step, WorkflowStep::OnChainData);
        assert_eq!(node.label.as_deref(), Some(WorkflowStep::OnChainData.title()));
    }

    #[test]
    fn test_add_node_moves_taken_step() {
        let mut doc = CanvasDocument::new();
        let first = doc.add_node(Node::new(ShapeKind::Circle, Point::ZERO)).unwrap();
        let second = doc
            .add_node(Node::new(ShapeKind::Circle, Point::ZERO).with_step(WorkflowStep::UserInput))
            .unwrap();
        assert_eq!(doc.step_of(first), Some(WorkflowStep::UserInput));
        assert_eq!(doc.step_of(second), Some(WorkflowStep::Execute));
        assert!(doc.free_step(ShapeKind::Circle).is_none());
        assert!(doc.add_node(Node::new(ShapeKind::Circle, Point::ZERO)).is_none());
    }

    #[test]
    fn test_place_next_follows_sequence() {
        let mut canvas = Canvas::new();
        let mut current = canvas.place_shape(ShapeKind::Circle, None).unwrap();
        for expected in &SEQUENCE[1..] {
            assert!(canvas.can_add_next(current));
            let next = canvas.place_next(current).unwrap();
            assert_eq!(canvas.document.get_node(next).unwrap().kind, *expected);
            current = next;
        }
        // The execute step has no successor.
        assert!(!canvas.can_add_next(current));
        assert!(canvas.place_next(current).is_none());
    }

    #[test]
    fn test_place_next_requires_no_outgoing_connection() {
        let mut canvas = Canvas::new();
        let circle = canvas.place_shape(ShapeKind::Circle, None).unwrap();
        canvas.place_next(circle).unwrap();
        assert!(!canvas.can_add_next(circle));
        assert!(canvas.place_next(circle).is_none());
        assert_eq!(canvas.document.count_of(ShapeKind::Rectangle), 1);
    }

    #[test]
    fn test_connect_replaces_connection_from_same_source() {
        let mut canvas = Canvas::new();
        let a = canvas.place_shape(ShapeKind::Circle, None).unwrap();
        let b = canvas.place_shape(ShapeKind::Rectangle, Some(a)).unwrap();
        let c = canvas.place_shape(ShapeKind::Square, None).unwrap();

        let from = canvas.document.get_node(a).unwrap().clone();
        let to = canvas.document.get_node(c).unwrap().clone();
        assert!(canvas.document.connect(Connection::between(&from, &to)));

        assert_eq!(canvas.document.connections.len(), 1);
        let conn = canvas.document.connection_from(a).unwrap();
        assert_eq!(conn.target, Some(c));
        assert!(!conn.references(b));
    }

    #[test]
    fn test_connect_rejects_missing_endpoints() {
        let mut doc = CanvasDocument::new();
        let a = Node::new(ShapeKind::Circle, Point::ZERO);
        let b = Node::new(ShapeKind::Square, Point::new(150.0, 0.0));
        let conn = Connection::between(&a, &b);
        doc.add_node(a);
        assert!(!doc.connect(conn));
        assert!(doc.connections.is_empty());
    }

    #[test]
    fn test_remove_node_drops_its_connections() {
        let mut canvas = Canvas::new();
        let ids = build_full_workflow(&mut canvas);
        let middle = ids[3];
        canvas.select(middle);

        assert!(canvas.remove_node(middle));
        assert!(canvas.document.get_node(middle).is_none());
        assert!(canvas.document.connections.iter().all(|c| !c.references(middle)));
        assert_eq!(canvas.document.connections.len(), 4);
        assert!(!canvas.is_selected(middle));
    }

    #[test]
    fn test_nodes_at_point_front_first() {
        let mut canvas = Canvas::new();
        let back = canvas.place_shape(ShapeKind::Square, None).unwrap();
        let front = canvas.place_shape(ShapeKind::Diamond, None).unwrap();
        let hits = canvas.document.nodes_at_point(canvas.viewport_center(), 0.0);
        assert_eq!(hits, vec![front, back]);
    }

    #[test]
    fn test_nodes_in_rect_uses_centers() {
        let mut canvas = Canvas::new();
        let ids = build_full_workflow(&mut canvas);
        let first = canvas.document.get_node(ids[0]).unwrap().position;
        // Covers the first two centers but only part of the third node.
        let rect = Rect::new(first.x - 10.0, first.y - 10.0, first.x + 160.0, first.y + 10.0);
        assert_eq!(canvas.document.nodes_in_rect(rect), vec![ids[0], ids[1]]);
    }

    #[test]
    fn test_delete_zone_is_bottom_band() {
        let mut canvas = Canvas::new();
        canvas.set_viewport_size(800.0, 600.0);
        assert_eq!(canvas.delete_zone(), Rect::new(0.0, 504.0, 800.0, 600.0));
        assert!(canvas.in_delete_zone(Point::new(10.0, 550.0)));
        assert!(!canvas.in_delete_zone(Point::new(10.0, 500.0)));
    }

    #[test]
    fn test_apply_verification_updates_only_payload() {
        let mut canvas = Canvas::new();
        let ids = build_full_workflow(&mut canvas);
        let verification = ids[4];
        let before = canvas.document.get_node(verification).unwrap().position;
        let connections = canvas.document.connections.clone();

        assert!(canvas.apply_verification(&sample_verification()));

        let node = canvas.document.get_node(verification).unwrap();
        let status = node.data.as_ref().unwrap().verification_status.as_ref().unwrap();
        assert!(status.sufficient_balance);
        assert!(status.slippage_within_limits);
        assert_eq!(node.position, before);
        assert_eq!(canvas.document.connections, connections);
    }

    #[test]
    fn test_apply_verification_without_node_is_noop() {
        let mut canvas = Canvas::new();
        canvas.place_shape(ShapeKind::Rectangle, None);
        assert!(!canvas.apply_verification(&sample_verification()));
    }
}
