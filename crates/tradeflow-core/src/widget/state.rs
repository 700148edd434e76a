//! Widget state definitions.

/// The UI state of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WidgetState {
    /// No interaction.
    #[default]
    Normal,
    /// Pointer is over the node.
    Hovered,
    /// Node is part of the selection set.
    Selected,
    /// Node's context menu is open.
    MenuOpen,
}

impl WidgetState {
    /// Check if the node is selected.
    pub fn is_selected(&self) -> bool {
        matches!(self, Self::Selected)
    }

    /// Check if the node's menu is open.
    pub fn is_menu_open(&self) -> bool {
        matches!(self, Self::MenuOpen)
    }
}
