//! Interaction state machine.
//!
//! The controller turns pointer, keyboard and time events into changes on a
//! [`Canvas`]. It is the only thing that mutates the canvas while the user
//! interacts with it. Time only advances through [`InteractionController::tick`].

use crate::canvas::Canvas;
use crate::connection::Connection;
use crate::input::{InputState, KeyEvent, Modifiers, MouseButton, PointerEvent};
use crate::selection::{NodeDrag, SelectionBox, SelectionDrag};
use crate::shapes::NodeId;
use crate::snap::{SNAP_DISTANCE, SnapTarget, snap_to_node};
use kurbo::{Line, Point};
use std::time::Duration;

/// Delay after a press before deciding whether it is a hold.
pub const HOLD_DELAY: Duration = Duration::from_millis(100);
/// Time a hold takes to open the context menu.
pub const HOLD_DURATION: Duration = Duration::from_millis(1000);
/// Pointer travel below which a press still counts as a hold.
pub const HOLD_MOVE_THRESHOLD: f64 = 5.0;
/// Time the pointer may be off a node before its hover clears.
pub const HOVER_LEAVE_DELAY: Duration = Duration::from_millis(100);

/// A drag in progress, single node or whole selection.
#[derive(Debug, Clone, PartialEq)]
pub enum Drag {
    Node(NodeDrag),
    Selection(SelectionDrag),
}

impl Drag {
    /// The node under the pointer when the drag started.
    fn anchor_node(&self, pressed: NodeId) -> NodeId {
        match self {
            Drag::Node(d) => d.node,
            Drag::Selection(_) => pressed,
        }
    }

    fn travel(&self, point: Point) -> f64 {
        match self {
            Drag::Node(d) => d.travel(point),
            Drag::Selection(d) => d.travel(point),
        }
    }

    /// Move the dragged node(s) to follow the pointer.
    fn follow(&mut self, canvas: &mut Canvas, point: Point) {
        match self {
            Drag::Node(d) => follow_node(canvas, d, point),
            Drag::Selection(d) => follow_selection(canvas, d, point),
        }
    }

    /// Finish the drag at `point`. Returns how many nodes were deleted.
    fn drop_at(self, canvas: &mut Canvas, point: Point) -> usize {
        if !canvas.in_delete_zone(point) {
            return 0;
        }
        let removed = match self {
            Drag::Node(d) => usize::from(canvas.remove_node(d.node)),
            Drag::Selection(d) => canvas.remove_nodes(&d.nodes),
        };
        log::info!("Deleted {removed} node(s) in delete zone");
        removed
    }
}

fn follow_node(canvas: &mut Canvas, drag: &NodeDrag, point: Point) {
    let target = drag.target_position(point);
    if let Some(node) = canvas.document.get_node_mut(drag.node) {
        node.position = target;
    }
}

fn follow_selection(canvas: &mut Canvas, drag: &mut SelectionDrag, point: Point) {
    let delta = drag.step(point);
    for &id in &drag.nodes {
        canvas.move_node(id, delta);
    }
}

/// A press that is waiting to become a hold, or is filling the hold.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuHold {
    /// Node the menu belongs to.
    pub node: NodeId,
    /// The drag to resume if the pointer moves away.
    pub drag: Drag,
    /// Time spent holding.
    pub elapsed: Duration,
}

impl MenuHold {
    /// Fill level in `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        (self.elapsed.as_secs_f64() / HOLD_DURATION.as_secs_f64()).min(1.0)
    }
}

/// An arrow being drawn from a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowDraft {
    /// Node the arrow starts from.
    pub origin: NodeId,
    /// Latest pointer position.
    pub pointer: Point,
    /// Node the free end currently snaps to.
    pub snap: Option<SnapTarget>,
}

/// Current interaction state.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InteractionState {
    #[default]
    Idle,
    /// Dragging one node. `pending` counts the time since the press until
    /// the hold check runs.
    DraggingNode {
        drag: NodeDrag,
        pressed: NodeId,
        pending: Option<Duration>,
    },
    /// Dragging every selected node.
    DraggingSelection {
        drag: SelectionDrag,
        pressed: NodeId,
        pending: Option<Duration>,
    },
    BoxSelecting(SelectionBox),
    DrawingArrow(ArrowDraft),
    HoldingForMenu(MenuHold),
}

impl InteractionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionState::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(
            self,
            InteractionState::DraggingNode { .. }
                | InteractionState::DraggingSelection { .. }
                | InteractionState::HoldingForMenu(_)
        )
    }
}

/// Drives a [`Canvas`] from input events.
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    state: InteractionState,
    input: InputState,
    /// Time since the pointer left the hovered node.
    hover_leave: Option<Duration>,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Update modifier keys state.
    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.input.set_modifiers(modifiers);
    }

    /// Reset to idle without applying anything.
    pub fn cancel(&mut self) {
        self.state = InteractionState::Idle;
    }

    /// Fill level of the hold gesture, if one is running.
    pub fn hold_progress(&self) -> Option<f64> {
        match &self.state {
            InteractionState::HoldingForMenu(hold) => Some(hold.progress()),
            _ => None,
        }
    }

    /// Whether the delete zone should be shown.
    pub fn delete_zone_visible(&self) -> bool {
        self.state.is_dragging()
    }

    /// The live selection box, if one is being dragged out.
    pub fn selection_box(&self) -> Option<&SelectionBox> {
        match &self.state {
            InteractionState::BoxSelecting(b) => Some(b),
            _ => None,
        }
    }

    /// The arrow being drawn, from the origin's exit anchor to the snapped
    /// entry anchor or the pointer.
    pub fn arrow_preview(&self, canvas: &Canvas) -> Option<Line> {
        let InteractionState::DrawingArrow(draft) = &self.state else {
            return None;
        };
        let origin = canvas.document.get_node(draft.origin)?;
        let end = draft.snap.map_or(draft.pointer, |s| s.point);
        Some(Line::new(origin.exit_anchor(), end))
    }

    /// Start drawing an arrow from `origin`.
    pub fn begin_arrow(&mut self, canvas: &Canvas, origin: NodeId) -> bool {
        if canvas.document.get_node(origin).is_none() {
            return false;
        }
        log::debug!("Drawing arrow from {origin}");
        self.state = InteractionState::DrawingArrow(ArrowDraft {
            origin,
            pointer: self.input.pointer_position,
            snap: None,
        });
        true
    }

    /// Process a pointer event.
    pub fn handle_pointer(&mut self, canvas: &mut Canvas, event: PointerEvent) {
        self.input.begin_frame();
        self.input.handle_pointer_event(&event);
        let position = event.position();

        match event {
            PointerEvent::Down { button, .. } => {
                if button == MouseButton::Left {
                    self.pointer_down(canvas, position);
                }
            }
            PointerEvent::DoubleClick { .. } => {
                if !matches!(self.state, InteractionState::DrawingArrow(_)) {
                    self.double_click(canvas, position);
                }
            }
            PointerEvent::Move { .. } => self.pointer_move(canvas, position),
            PointerEvent::Up { button, .. } => {
                if button == MouseButton::Left {
                    self.pointer_up(canvas, position);
                }
            }
        }
    }

    /// Process a key event.
    pub fn handle_key(&mut self, canvas: &mut Canvas, event: KeyEvent) {
        let KeyEvent::Pressed(key) = event else {
            return;
        };
        if key != "Escape" {
            return;
        }

        match std::mem::take(&mut self.state) {
            InteractionState::DrawingArrow(draft) => {
                log::debug!("Arrow from {} cancelled", draft.origin);
            }
            InteractionState::HoldingForMenu(hold) => {
                self.state = Self::resume_drag(hold);
            }
            InteractionState::BoxSelecting(_) => {}
            other => self.state = other,
        }
        canvas.widgets.close_menu();
    }

    /// Advance time by `dt`. Call once per frame.
    pub fn tick(&mut self, canvas: &mut Canvas, dt: Duration) {
        self.input.advance(dt);

        if let Some(elapsed) = self.hover_leave.as_mut() {
            *elapsed += dt;
            if *elapsed >= HOVER_LEAVE_DELAY {
                self.hover_leave = None;
                canvas.widgets.set_hovered(None);
            }
        }

        let pointer = self.input.pointer_position;
        match std::mem::take(&mut self.state) {
            InteractionState::DraggingNode {
                drag,
                pressed,
                pending: Some(waited),
            } => {
                self.state = Self::check_hold(Drag::Node(drag), pressed, waited + dt, pointer);
            }
            InteractionState::DraggingSelection {
                drag,
                pressed,
                pending: Some(waited),
            } => {
                self.state = Self::check_hold(Drag::Selection(drag), pressed, waited + dt, pointer);
            }
            InteractionState::HoldingForMenu(mut hold) => {
                hold.elapsed += dt;
                if hold.elapsed >= HOLD_DURATION {
                    log::debug!("Opening menu for {}", hold.node);
                    canvas.widgets.open_menu(hold.node);
                } else {
                    self.state = InteractionState::HoldingForMenu(hold);
                }
            }
            other => self.state = other,
        }
    }

    fn check_hold(drag: Drag, pressed: NodeId, waited: Duration, pointer: Point) -> InteractionState {
        if waited < HOLD_DELAY {
            return Self::dragging(drag, pressed, Some(waited));
        }
        if drag.travel(pointer) < HOLD_MOVE_THRESHOLD {
            let node = drag.anchor_node(pressed);
            log::debug!("Hold started on {node}");
            InteractionState::HoldingForMenu(MenuHold {
                node,
                drag,
                elapsed: Duration::ZERO,
            })
        } else {
            Self::dragging(drag, pressed, None)
        }
    }

    fn dragging(drag: Drag, pressed: NodeId, pending: Option<Duration>) -> InteractionState {
        match drag {
            Drag::Node(drag) => InteractionState::DraggingNode {
                drag,
                pressed,
                pending,
            },
            Drag::Selection(drag) => InteractionState::DraggingSelection {
                drag,
                pressed,
                pending,
            },
        }
    }

    fn resume_drag(hold: MenuHold) -> InteractionState {
        Self::dragging(hold.drag, hold.node, None)
    }

    fn pointer_down(&mut self, canvas: &mut Canvas, position: Point) {
        let hit = canvas.document.nodes_at_point(position, 0.0).first().copied();

        if let InteractionState::DrawingArrow(draft) = self.state {
            self.finish_arrow(canvas, draft, hit, position);
            return;
        }

        if self.input.is_double_click() {
            if let Some(id) = hit {
                self.begin_arrow(canvas, id);
                return;
            }
        }

        if hit.is_none() || canvas.widgets.menu() != hit {
            canvas.widgets.close_menu();
        }

        match hit {
            Some(id) => {
                self.hover_leave = None;
                let drag = if canvas.is_selected(id) && canvas.widgets.has_multi_selection() {
                    let nodes = canvas.widgets.selected().iter().copied().collect();
                    Drag::Selection(SelectionDrag::new(nodes, position))
                } else {
                    let center = canvas
                        .document
                        .get_node(id)
                        .map_or(position, |n| n.position);
                    Drag::Node(NodeDrag::new(id, center, position))
                };
                self.state = Self::dragging(drag, id, Some(Duration::ZERO));
            }
            None if self.input.modifiers.shift => {
                canvas.clear_selection();
                self.state = InteractionState::BoxSelecting(SelectionBox::new(position));
            }
            None => {
                canvas.clear_selection();
            }
        }
    }

    fn double_click(&mut self, canvas: &mut Canvas, position: Point) {
        if let Some(&id) = canvas.document.nodes_at_point(position, 0.0).first() {
            self.begin_arrow(canvas, id);
        }
    }

    fn finish_arrow(
        &mut self,
        canvas: &mut Canvas,
        draft: ArrowDraft,
        hit: Option<NodeId>,
        position: Point,
    ) {
        self.state = InteractionState::Idle;
        if hit == Some(draft.origin) {
            log::debug!("Arrow dropped on its origin, cancelled");
            return;
        }
        let Some(origin) = canvas.document.get_node(draft.origin).cloned() else {
            return;
        };

        let target = hit
            .or(draft.snap.map(|s| s.node))
            .and_then(|id| canvas.document.get_node(id));
        let connection = match target {
            Some(target) => Connection::between(&origin, target),
            None => Connection::dangling(&origin, position),
        };
        log::debug!("Connecting {} -> {:?}", origin.id(), connection.target);
        canvas.document.connect(connection);
    }

    fn pointer_move(&mut self, canvas: &mut Canvas, position: Point) {
        if self.state.is_idle() {
            self.update_hover(canvas, position);
            return;
        }

        let mut broken_hold = None;
        match &mut self.state {
            InteractionState::Idle => {}
            InteractionState::DraggingNode { drag, .. } => follow_node(canvas, drag, position),
            InteractionState::DraggingSelection { drag, .. } => {
                follow_selection(canvas, drag, position);
            }
            InteractionState::HoldingForMenu(hold) => {
                hold.drag.follow(canvas, position);
                if hold.drag.travel(position) >= HOLD_MOVE_THRESHOLD {
                    log::debug!("Hold on {} broken by movement", hold.node);
                    broken_hold = Some(hold.clone());
                }
            }
            InteractionState::BoxSelecting(selection) => {
                selection.update(position);
                canvas.widgets.set_selection(selection.nodes_within(&canvas.document));
            }
            InteractionState::DrawingArrow(draft) => {
                draft.pointer = position;
                draft.snap =
                    snap_to_node(&canvas.document, position, Some(draft.origin), SNAP_DISTANCE);
            }
        }

        if let Some(hold) = broken_hold {
            self.state = Self::resume_drag(hold);
        }
    }

    fn pointer_up(&mut self, canvas: &mut Canvas, position: Point) {
        match std::mem::take(&mut self.state) {
            InteractionState::DraggingNode { drag, .. } => {
                Drag::Node(drag).drop_at(canvas, position);
            }
            InteractionState::DraggingSelection { drag, .. } => {
                Drag::Selection(drag).drop_at(canvas, position);
            }
            InteractionState::HoldingForMenu(hold) => {
                hold.drag.drop_at(canvas, position);
            }
            InteractionState::BoxSelecting(_) | InteractionState::Idle => {}
            // Arrows are committed by a click, not by releasing.
            other @ InteractionState::DrawingArrow(_) => self.state = other,
        }
    }

    fn update_hover(&mut self, canvas: &mut Canvas, position: Point) {
        match canvas.document.nodes_at_point(position, 0.0).first() {
            Some(&id) => {
                self.hover_leave = None;
                canvas.widgets.set_hovered(Some(id));
            }
            None => {
                if canvas.widgets.hovered().is_some() && self.hover_leave.is_none() {
                    self.hover_leave = Some(Duration::ZERO);
                }
            }
        }
    }
}
