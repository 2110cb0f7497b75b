//! Physics-animated expense board.
//!
//! Transactions and categories are laid out by two force simulations. Each node drifts
//! toward a focus point derived from its date or membership, and nodes can be dragged onto
//! categories or day cells to reassign or reschedule them.

pub mod board;
pub mod config;
pub mod error;
pub mod interaction;
pub mod layout;
pub mod ledger;
pub mod reconcile;
pub mod scale;
pub mod sim;
pub mod util;

pub use board::{Board, CategoryNode, Layer, LinkSegment};
pub use config::{BoardConfig, InteractionConfig, LayoutConfig, SimulationConfig};
pub use error::{Error, Result};
pub use interaction::{DropEvent, DropTarget, InteractionController, PointerEvent, PointerPhase, TargetId};
pub use ledger::{Category, Ledger, Link, Transaction};
pub use reconcile::{Placement, Reconciliation};
pub use sim::{Node, NodeSerial, Simulation, SimulationState};
