//! TradeFlow Core Library
//!
//! Platform-agnostic model of the TradeFlow workflow canvas: the shape
//! registry, canvas state, interaction controller, graph export and the
//! trade verification rules shared with the server.

pub mod api;
pub mod canvas;
pub mod connection;
pub mod controller;
pub mod export;
pub mod input;
pub mod protocol;
pub mod selection;
pub mod shapes;
pub mod snap;
pub mod verify;
pub mod wallet;
pub mod widget;

pub use api::{ApiError, ApiResult, HttpTradeApi, LocalTradeApi, TradeApi};
pub use canvas::{Canvas, CanvasDocument, DELETE_ZONE_HEIGHT};
pub use connection::{Connection, ConnectionId};
pub use controller::{InteractionController, InteractionState};
pub use export::{collect_graph, export_graph, verification_request, verify_and_merge};
pub use input::{InputState, KeyEvent, Modifiers, MouseButton, PointerEvent};
pub use protocol::{GraphData, GraphPayload, TradeLimits, VerificationData, VerifyRequest};
pub use selection::SelectionBox;
pub use shapes::{Node, NodeData, NodeId, ShapeKind, TradeConfig, WorkflowStep};
pub use snap::{SNAP_DISTANCE, SnapTarget};
pub use verify::{VerifyError, parse_amount};
pub use wallet::{WalletError, WalletProvider, WalletState};
pub use widget::{WidgetManager, WidgetState};
