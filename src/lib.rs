//! Grid View
//!
//! Client-side view synchronizer for a turn-based grid strategy game.  The
//! server owns every rule; this crate mirrors what it pushes and forwards
//! what the user does.
//!
//! ## Architecture
//!
//! ```text
//! Inbound (protocol.rs) ──► ViewState (view.rs) ──► Vec<ViewOp> ──► Surface (surface.rs)
//!                              └── EventBoard (board.rs)   keyed event diff
//! user input ──► ViewState::{click, make_move, start_game} ──► Outbound ──► Channel
//! ```
//!
//! The core modules are platform-neutral.  The browser client in
//! `clients/wasm` supplies a canvas `Surface` and a Socket.IO `Channel`;
//! the `replay` feature adds a transcript driver and the
//! `grid-view-replay` binary.

pub mod board;
pub mod error;
pub mod protocol;
pub mod surface;
pub mod types;
pub mod view;

#[cfg(feature = "replay")]
pub mod replay;

pub use board::{EventBoard, EventPatch, EventSlot};
pub use error::{Error, Result};
pub use protocol::{
    Action, ActiveEvent, Channel, EventKind, GameSnapshot, Inbound, MoveIntent, Outbound,
    Resources,
};
pub use surface::{present, Surface, TextSurface};
pub use types::{GridPos, Marker, PlayerStyle, TerrainStyle, ViewConfig};
pub use view::{CellDraw, GridFrame, ResourceRow, ViewOp, ViewState};
