//! Widget manager for tracking UI state of nodes.

use super::state::WidgetState;
use crate::shapes::NodeId;
use std::collections::HashSet;

/// Manages UI state for all nodes on the canvas.
///
/// Selection, hover and the open menu live here rather than on the nodes,
/// so exported documents never carry interaction state.
#[derive(Debug, Clone, Default)]
pub struct WidgetManager {
    /// Current selection set.
    selected: HashSet<NodeId>,
    /// Node whose context menu is open.
    menu: Option<NodeId>,
    /// Node under the pointer.
    hovered: Option<NodeId>,
}

impl WidgetManager {
    /// Create a new widget manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the state of a node. An open menu takes precedence over
    /// selection, and selection over hover.
    pub fn state(&self, id: NodeId) -> WidgetState {
        if self.menu == Some(id) {
            WidgetState::MenuOpen
        } else if self.selected.contains(&id) {
            WidgetState::Selected
        } else if self.hovered == Some(id) {
            WidgetState::Hovered
        } else {
            WidgetState::Normal
        }
    }

    /// Check if a node is selected.
    pub fn is_selected(&self, id: NodeId) -> bool {
        self.selected.contains(&id)
    }

    /// Get all selected node IDs.
    pub fn selected(&self) -> &HashSet<NodeId> {
        &self.selected
    }

    /// Check if more than one node is selected.
    pub fn has_multi_selection(&self) -> bool {
        self.selected.len() > 1
    }

    /// Replace the selection set.
    pub fn set_selection(&mut self, ids: impl IntoIterator<Item = NodeId>) {
        self.selected = ids.into_iter().collect();
    }

    /// Clear all selections.
    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Get the hovered node ID (if any).
    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    /// Set the hovered node.
    pub fn set_hovered(&mut self, id: Option<NodeId>) {
        self.hovered = id;
    }

    /// Get the node whose menu is open (if any).
    pub fn menu(&self) -> Option<NodeId> {
        self.menu
    }

    /// Open the context menu of a node, closing any other.
    pub fn open_menu(&mut self, id: NodeId) {
        self.menu = Some(id);
    }

    /// Close the open context menu.
    pub fn close_menu(&mut self) {
        self.menu = None;
    }

    /// Forget all state for a node that left the canvas.
    pub fn remove(&mut self, id: NodeId) {
        self.selected.remove(&id);
        if self.menu == Some(id) {
            self.menu = None;
        }
        if self.hovered == Some(id) {
            self.hovered = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_default_state_is_normal() {
        let widgets = WidgetManager::new();
        assert_eq!(widgets.state(Uuid::new_v4()), WidgetState::Normal);
    }

    #[test]
    fn test_state_precedence() {
        let mut widgets = WidgetManager::new();
        let id = Uuid::new_v4();

        widgets.set_hovered(Some(id));
        assert_eq!(widgets.state(id), WidgetState::Hovered);

        widgets.set_selection([id]);
        assert_eq!(widgets.state(id), WidgetState::Selected);

        widgets.open_menu(id);
        assert_eq!(widgets.state(id), WidgetState::MenuOpen);

        widgets.close_menu();
        assert!(widgets.state(id).is_selected());
    }

    #[test]
    fn test_open_menu_replaces_previous() {
        let mut widgets = WidgetManager::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        widgets.open_menu(a);
        widgets.open_menu(b);
        assert_eq!(widgets.menu(), Some(b));
        assert!(!widgets.state(a).is_menu_open());
    }

    #[test]
    fn test_remove_clears_everything() {
        let mut widgets = WidgetManager::new();
        let id = Uuid::new_v4();

        widgets.set_selection([id]);
        widgets.set_hovered(Some(id));
        widgets.open_menu(id);
        widgets.remove(id);

        assert!(widgets.selected().is_empty());
        assert!(widgets.hovered().is_none());
        assert!(widgets.menu().is_none());
    }

    #[test]
    fn test_set_selection_replaces() {
        let mut widgets = WidgetManager::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        widgets.set_selection([a, b]);
        assert!(widgets.has_multi_selection());
        widgets.set_selection([b]);
        assert!(!widgets.is_selected(a));
        assert!(widgets.is_selected(b));
        assert!(!widgets.has_multi_selection());
    }
}
