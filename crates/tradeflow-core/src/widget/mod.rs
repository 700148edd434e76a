//! UI state for nodes, kept apart from the document.
//!
//! Tracks hover, selection and the open context menu per node.

mod manager;
mod state;

pub use manager::WidgetManager;
pub use state::WidgetState;
