//! `ViewState`: the view synchronizer.
//!
//! Owns everything the view knows for one session: the assigned player
//! identity, the last snapshot, the event board and the status line.
//! Inbound events go in through [`ViewState::handle`]; what comes out is a
//! list of [`ViewOp`]s for a [`Surface`](crate::surface::Surface) to apply.
//! User input goes in through [`ViewState::start_game`],
//! [`ViewState::make_move`] and [`ViewState::click`], which return the
//! [`Outbound`] intent to send.  Nothing here validates game rules.

use std::time::Duration;

use crate::board::{EventBoard, EventPatch};
use crate::error::{Error, Result};
use crate::protocol::{Action, GameSnapshot, Inbound, MoveIntent, Outbound};
use crate::types::{CellContent, GridPos, Marker, TerrainStyle, ViewConfig};

pub const WAITING_STATUS: &str = "Waiting for game…";
pub const EXTRA_BUILD_NOTICE: &str = "Extra build available this turn!";

// ---------------------------------------------------------------------------
// Render model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ViewOp {
    SetIdentity(String),
    SetStatus(String),
    /// Drop every event element at once, without exit transitions.
    ClearEvents,
    Event(EventPatch),
    DrawGrid(GridFrame),
    SetResources(Vec<ResourceRow>),
    Notice(String),
    ShowRules(bool),
}

/// A full redraw of the grid.  Cells are row-major, `size * size` long.
#[derive(Debug, Clone, PartialEq)]
pub struct GridFrame {
    pub size: usize,
    pub cell_size: f64,
    pub cells: Vec<CellDraw>,
}

impl GridFrame {
    pub fn cell(&self, pos: GridPos) -> Option<&CellDraw> {
        if pos.x < 0 || pos.y < 0 {
            return None;
        }
        let (x, y) = (pos.x as usize, pos.y as usize);
        if x >= self.size || y >= self.size {
            return None;
        }
        self.cells.get(y * self.size + x)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellDraw {
    pub pos: GridPos,
    /// Top-left corner in canvas pixels.
    pub left: f64,
    pub top: f64,
    pub terrain: Option<TerrainStyle>,
    pub marker: Option<Marker>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRow {
    pub player: String,
    pub label: String,
    pub glyph: String,
    pub color: Option<String>,
    pub wood: u32,
    pub gold: u32,
    /// True for the player whose turn it is.
    pub current: bool,
}

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct ViewState {
    config: ViewConfig,
    player: Option<String>,
    status: String,
    board: EventBoard,
    snapshot: Option<GameSnapshot>,
    winner: Option<String>,
    rules_open: bool,
}

impl ViewState {
    pub fn new(config: ViewConfig) -> Self {
        let board = EventBoard::new(Duration::from_millis(config.event_linger_ms));
        Self {
            config,
            player: None,
            status: WAITING_STATUS.to_string(),
            board,
            snapshot: None,
            winner: None,
            rules_open: false,
        }
    }

    // ------------------------------------------------------------------
    // Inbound
    // ------------------------------------------------------------------

    /// Apply one inbound event.
    pub fn handle(&mut self, inbound: Inbound) -> Vec<ViewOp> {
        log::debug!("inbound {}", inbound.name());
        match inbound {
            Inbound::PlayerId(id) => {
                if let Some(prev) = &self.player {
                    if *prev != id {
                        log::warn!("player identity reassigned: {} -> {}", prev, id);
                    }
                }
                let status = format!("Your ID: {id}");
                self.player = Some(id.clone());
                vec![ViewOp::SetIdentity(id), self.set_status(status)]
            }

            Inbound::GameStarted(snapshot) => {
                self.board.clear();
                self.winner = None;
                let mut ops = vec![ViewOp::ClearEvents];
                ops.extend(self.render(snapshot));
                ops
            }

            Inbound::Update(snapshot) => self.render(snapshot),

            Inbound::GameOver(over) => {
                let status = format!("Game Over! Winner: {}", over.winner);
                self.winner = Some(over.winner);
                vec![self.set_status(status)]
            }

            Inbound::Error(message) => vec![self.set_status(message)],

            Inbound::EventTriggered(event) => {
                self.board.push(event).map(ViewOp::Event).into_iter().collect()
            }

            Inbound::ExtraBuildAvailable(extra) => {
                if self.player.as_deref() == Some(extra.player.as_str()) {
                    vec![ViewOp::Notice(EXTRA_BUILD_NOTICE.to_string())]
                } else {
                    vec![]
                }
            }
        }
    }

    /// Full re-render from a snapshot.  Idempotent apart from event patches,
    /// which are empty when the event set did not change.
    pub fn render(&mut self, snapshot: GameSnapshot) -> Vec<ViewOp> {
        let mut ops = Vec::new();

        if let Some(events) = &snapshot.active_events {
            ops.extend(self.board.reconcile(events).into_iter().map(ViewOp::Event));
        }

        let status = self.status_for(&snapshot);
        ops.push(self.set_status(status));
        ops.push(ViewOp::DrawGrid(self.grid_frame(&snapshot)));
        ops.push(ViewOp::SetResources(self.resource_rows(&snapshot)));

        self.snapshot = Some(snapshot);
        ops
    }

    fn set_status(&mut self, status: String) -> ViewOp {
        self.status = status.clone();
        ViewOp::SetStatus(status)
    }

    fn status_for(&self, snapshot: &GameSnapshot) -> String {
        if let Some(message) = &snapshot.message {
            return message.clone();
        }
        let Some(current) = &snapshot.current_player else {
            return WAITING_STATUS.to_string();
        };

        let mut status = format!("Current player: {}", self.config.label_for(current));
        match (snapshot.round, snapshot.max_rounds, snapshot.turn) {
            (Some(round), Some(max), _) => status.push_str(&format!(" | Round {round} / {max}")),
            (Some(round), None, _) => status.push_str(&format!(" | Round {round}")),
            (None, _, Some(turn)) => status.push_str(&format!(" | Turn {turn}")),
            _ => {}
        }
        status
    }

    fn grid_frame(&self, snapshot: &GameSnapshot) -> GridFrame {
        let n = self.config.grid_size;
        let size = self.config.cell_size;

        if snapshot.grid.len() != n || snapshot.grid.iter().any(|row| row.len() != n) {
            log::debug!(
                "snapshot grid is not {}x{}; missing cells are drawn empty",
                n,
                n
            );
        }

        let mut cells = Vec::with_capacity(n * n);
        for y in 0..n {
            for x in 0..n {
                let value = snapshot
                    .grid
                    .get(y)
                    .and_then(|row| row.get(x))
                    .and_then(|cell| cell.as_deref());

                let (terrain, marker) = match self.config.classify(value) {
                    CellContent::Empty => (None, None),
                    CellContent::Terrain(style) => (Some(style.clone()), None),
                    CellContent::Player(id) => (None, Some(self.config.marker_for(id))),
                };

                cells.push(CellDraw {
                    pos: GridPos::new(x as i32, y as i32),
                    left: x as f64 * size,
                    top: y as f64 * size,
                    terrain,
                    marker,
                });
            }
        }

        GridFrame {
            size: n,
            cell_size: size,
            cells,
        }
    }

    fn resource_rows(&self, snapshot: &GameSnapshot) -> Vec<ResourceRow> {
        snapshot
            .resources
            .iter()
            .map(|(player, res)| {
                let marker = self.config.marker_for(player);
                ResourceRow {
                    player: player.clone(),
                    label: self.config.label_for(player).to_string(),
                    glyph: marker.glyph,
                    color: marker.color,
                    wood: res.wood,
                    gold: res.gold,
                    current: snapshot.current_player.as_deref() == Some(player.as_str()),
                }
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Outbound
    // ------------------------------------------------------------------

    /// The server decides whether a start is valid.
    pub fn start_game(&self) -> Outbound {
        Outbound::StartGame
    }

    pub fn make_move(&self, action: Action, position: Option<GridPos>) -> Result<Outbound> {
        let player = self.player.clone().ok_or(Error::IdentityUnassigned)?;
        Ok(Outbound::Move(MoveIntent {
            player,
            action,
            position,
        }))
    }

    /// A click at canvas-relative pixel `(px, py)` becomes an `occupy` move
    /// on the cell under the pointer.
    pub fn click(&self, px: f64, py: f64) -> Result<Outbound> {
        let pos = self.config.cell_at(px, py);
        self.make_move(Action::Occupy, Some(pos))
    }

    // ------------------------------------------------------------------
    // Local-only UI
    // ------------------------------------------------------------------

    pub fn open_rules(&mut self) -> ViewOp {
        self.rules_open = true;
        ViewOp::ShowRules(true)
    }

    pub fn close_rules(&mut self) -> ViewOp {
        self.rules_open = false;
        ViewOp::ShowRules(false)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn player(&self) -> Option<&str> {
        self.player.as_deref()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn board(&self) -> &EventBoard {
        &self.board
    }

    pub fn snapshot(&self) -> Option<&GameSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn winner(&self) -> Option<&str> {
        self.winner.as_deref()
    }

    pub fn rules_open(&self) -> bool {
        self.rules_open
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
