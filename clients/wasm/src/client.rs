//! `GridViewClient`: the primary wasm-bindgen export.
//!
//! ## JavaScript usage
//!
//! ```js
//! import init, { GridViewClient } from './pkg/grid_view_wasm.js';
//!
//! await init();
//!
//! const socket = io();
//! const view = new GridViewClient(socket, JSON.stringify({ grid_size: 9, cell_size: 60 }));
//!
//! document.getElementById('start').onclick = () => view.startGame();
//! document.getElementById('collect-wood').onclick = () => view.makeMove('collect_wood');
//!
//! // In your render loop:
//! function tick() {
//!   view.poll();
//!   requestAnimationFrame(tick);
//! }
//! tick();
//! ```

use grid_view::{present, Action, GridPos, Inbound, Outbound, ViewConfig, ViewOp, ViewState};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::bridge::{self, BridgeHandle, Input, Socket};
use crate::canvas::{CanvasSurface, ElementIds};

// ---------------------------------------------------------------------------
// Client config
// ---------------------------------------------------------------------------

/// JSON accepted by the constructor: the view config plus element ids.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    #[serde(flatten)]
    pub view: ViewConfig,
    pub elements: ElementIds,
}

// ---------------------------------------------------------------------------
// GridViewClient
// ---------------------------------------------------------------------------

/// Primary Wasm API object.
///
/// Instantiate with `new GridViewClient(socket, configJson?)`, then call
/// `view.poll()` each animation frame.
#[wasm_bindgen]
pub struct GridViewClient {
    view: ViewState,
    surface: CanvasSurface,
    bridge: BridgeHandle,
}

#[wasm_bindgen]
impl GridViewClient {
    // -----------------------------------------------------------------------
    // Constructor
    // -----------------------------------------------------------------------

    /// Create a new client.
    ///
    /// @param socket     - a connected Socket.IO socket (`io()`)
    /// @param configJson - optional JSON `ClientConfig`; defaults otherwise
    #[wasm_bindgen(constructor)]
    pub fn new(socket: JsValue, config_json: Option<String>) -> Result<GridViewClient, JsValue> {
        let config: ClientConfig = match config_json.as_deref() {
            Some(text) if !text.trim().is_empty() => serde_json::from_str(text)
                .map_err(|e| JsValue::from_str(&format!("invalid config: {e}")))?,
            _ => ClientConfig::default(),
        };

        let surface = CanvasSurface::attach(
            &config.elements,
            &config.view.default_marker,
            config.view.event_linger_ms,
        )?;
        surface.fit(config.view.canvas_extent());

        let mut bridge = bridge::spawn(socket.unchecked_into::<Socket>());
        bridge.listen_clicks(surface.canvas().clone())?;

        log::info!(
            "[client] {}x{} grid, {}px cells",
            config.view.grid_size,
            config.view.grid_size,
            config.view.cell_size
        );

        Ok(Self {
            view: ViewState::new(config.view),
            surface,
            bridge,
        })
    }

    // -----------------------------------------------------------------------
    // poll(), once per animation frame
    // -----------------------------------------------------------------------

    /// Apply queued server events and clicks in the order they arrived.
    ///
    /// Returns the number of server events taken off the queue.
    #[wasm_bindgen]
    pub fn poll(&mut self) -> u32 {
        let mut applied = 0;
        for input in self.bridge.drain() {
            match input {
                Input::Event(raw) => {
                    applied += 1;
                    match Inbound::decode(raw.name, raw.payload) {
                        Ok(inbound) => {
                            let ops = self.view.handle(inbound);
                            self.apply(&ops);
                        }
                        Err(e) => log::warn!("[client] dropping {}: {}", raw.name, e),
                    }
                }
                Input::Click { px, py } => {
                    let intent = self.view.click(px, py);
                    self.send(intent);
                }
            }
        }
        applied
    }

    // -----------------------------------------------------------------------
    // Intent methods
    // -----------------------------------------------------------------------

    /// Ask the server to start a game.  The server decides if that is valid.
    #[wasm_bindgen(js_name = startGame)]
    pub fn start_game(&mut self) {
        let intent = self.view.start_game();
        self.send(Ok(intent));
    }

    /// Send a move.  `x`/`y` are optional grid coordinates.
    #[wasm_bindgen(js_name = makeMove)]
    pub fn make_move(&mut self, action: &str, x: Option<i32>, y: Option<i32>) {
        let position = match (x, y) {
            (Some(x), Some(y)) => Some(GridPos::new(x, y)),
            _ => None,
        };
        let intent = self.view.make_move(Action::from(action), position);
        self.send(intent);
    }

    // -----------------------------------------------------------------------
    // Local UI
    // -----------------------------------------------------------------------

    #[wasm_bindgen(js_name = openRules)]
    pub fn open_rules(&mut self) {
        let op = self.view.open_rules();
        self.apply(&[op]);
    }

    #[wasm_bindgen(js_name = closeRules)]
    pub fn close_rules(&mut self) {
        let op = self.view.close_rules();
        self.apply(&[op]);
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Identity assigned by the server, or `undefined` before `player_id`.
    #[wasm_bindgen(js_name = playerId)]
    pub fn player_id(&self) -> Option<String> {
        self.view.player().map(str::to_string)
    }

    #[wasm_bindgen]
    pub fn status(&self) -> String {
        self.view.status().to_string()
    }

    /// Winner from `game_over`, or `undefined` while a game is running.
    #[wasm_bindgen]
    pub fn winner(&self) -> Option<String> {
        self.view.winner().map(str::to_string)
    }

    /// Number of active events currently shown.
    #[wasm_bindgen(js_name = eventCount)]
    pub fn event_count(&self) -> u32 {
        self.view.board().len() as u32
    }
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

impl GridViewClient {
    fn apply(&mut self, ops: &[ViewOp]) {
        present(&mut self.surface, ops);
    }

    fn send(&mut self, intent: grid_view::Result<Outbound>) {
        match intent {
            Ok(intent) => {
                if let Err(e) = intent.send(&mut self.bridge) {
                    log::warn!("[client] failed to send {}: {}", intent.name(), e);
                }
            }
            Err(e) => log::warn!("[client] intent not sent: {}", e),
        }
    }
}
