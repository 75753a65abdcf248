//! WASM bridge: Socket.IO channel and input queue.
//!
//! ## Threading model
//!
//! WASM is single-threaded.  Socket and DOM callbacks only enqueue; all view
//! work happens in `GridViewClient::poll()`, which drains one shared queue
//! in arrival order.  Server events and clicks interleave exactly as they
//! happened, and the view is only ever mutated from one call frame.
//!
//! ```text
//! socket.on(<event>)  ──► Input::Event (name, JSON payload) ─┐
//! canvas 'click'      ──► Input::Click (canvas-relative px) ─┴► state.queue
//!
//! GridViewClient::poll()
//!   Event → Inbound::decode → ViewState::handle → Surface
//!   Click → ViewState::click → socket.emit("move", …)
//! ```
//!
//! The page owns the Socket.IO connection (`io()`); this crate never opens,
//! closes or reconnects it.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use grid_view::protocol::{names, Channel};
use serde_json::Value;
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Socket.IO binding
// ---------------------------------------------------------------------------

#[wasm_bindgen]
extern "C" {
    /// Any object with Socket.IO's `on` / `off` / `emit` methods.
    pub type Socket;

    #[wasm_bindgen(method)]
    fn on(this: &Socket, event: &str, handler: &js_sys::Function);

    #[wasm_bindgen(method)]
    fn off(this: &Socket, event: &str, handler: &js_sys::Function);

    #[wasm_bindgen(method, js_name = emit)]
    fn emit_bare(this: &Socket, event: &str);

    #[wasm_bindgen(method, js_name = emit)]
    fn emit_with(this: &Socket, event: &str, payload: &JsValue);
}

// ---------------------------------------------------------------------------
// Shared state (single-threaded, Rc/RefCell)
// ---------------------------------------------------------------------------

/// One inbound event as delivered by the socket, not yet decoded.
#[derive(Debug, Clone)]
pub struct RawEvent {
    pub name: &'static str,
    pub payload: Value,
}

/// One queued input, server or user.
#[derive(Debug, Clone)]
pub enum Input {
    Event(RawEvent),
    Click { px: f64, py: f64 },
}

#[derive(Default)]
struct State {
    queue: VecDeque<Input>,
}

impl State {
    fn push(&mut self, input: Input) {
        self.queue.push_back(input);
    }

    fn drain(&mut self) -> Vec<Input> {
        self.queue.drain(..).collect()
    }
}

type SharedState = Rc<RefCell<State>>;

// ---------------------------------------------------------------------------
// Bridge handle (owned by GridViewClient)
// ---------------------------------------------------------------------------

pub struct BridgeHandle {
    shared: SharedState,
    socket: Socket,
    // Keep closures alive for the lifetime of the bridge.
    handlers: Vec<(&'static str, Closure<dyn FnMut(JsValue)>)>,
    click: Option<(web_sys::HtmlCanvasElement, Closure<dyn FnMut(web_sys::MouseEvent)>)>,
}

impl BridgeHandle {
    /// Drain every pending input, oldest first.
    pub fn drain(&self) -> Vec<Input> {
        self.shared.borrow_mut().drain()
    }

    /// Queue clicks on `canvas` as canvas-relative pixel positions.
    pub fn listen_clicks(&mut self, canvas: web_sys::HtmlCanvasElement) -> Result<(), JsValue> {
        let shared = self.shared.clone();
        let target = canvas.clone();
        let onclick =
            Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |ev: web_sys::MouseEvent| {
                let rect = target.get_bounding_client_rect();
                let px = ev.client_x() as f64 - rect.left();
                let py = ev.client_y() as f64 - rect.top();
                shared.borrow_mut().push(Input::Click { px, py });
            });
        canvas.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        self.click = Some((canvas, onclick));
        Ok(())
    }
}

impl Channel for BridgeHandle {
    fn emit(&mut self, event: &str, payload: Option<&Value>) -> grid_view::Result<()> {
        match payload {
            None => self.socket.emit_bare(event),
            Some(v) => self.socket.emit_with(event, &json_to_js(v)),
        }
        Ok(())
    }
}

impl Drop for BridgeHandle {
    fn drop(&mut self) {
        for (name, handler) in &self.handlers {
            self.socket.off(name, handler.as_ref().unchecked_ref());
        }
        if let Some((canvas, onclick)) = &self.click {
            let _ = canvas
                .remove_event_listener_with_callback("click", onclick.as_ref().unchecked_ref());
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Subscribe to every inbound event on `socket` and return a
/// [`BridgeHandle`] for the client.
pub fn spawn(socket: Socket) -> BridgeHandle {
    let shared: SharedState = Rc::new(RefCell::new(State::default()));

    let handlers = names::INBOUND
        .iter()
        .map(|&name| {
            let shared = shared.clone();
            let handler = Closure::<dyn FnMut(JsValue)>::new(move |payload: JsValue| {
                shared.borrow_mut().push(Input::Event(RawEvent {
                    name,
                    payload: js_to_json(&payload),
                }));
            });
            socket.on(name, handler.as_ref().unchecked_ref());
            (name, handler)
        })
        .collect();

    log::info!("[bridge] listening for {} events", names::INBOUND.len());

    BridgeHandle {
        shared,
        socket,
        handlers,
        click: None,
    }
}

// ---------------------------------------------------------------------------
// JSON helpers
// ---------------------------------------------------------------------------

fn js_to_json(v: &JsValue) -> Value {
    if v.is_undefined() || v.is_null() {
        return Value::Null;
    }
    let text = match js_sys::JSON::stringify(v) {
        Ok(s) => String::from(s),
        Err(e) => {
            log::warn!("[bridge] payload not serialisable: {:?}", e);
            return Value::Null;
        }
    };
    serde_json::from_str(&text).unwrap_or_else(|e| {
        log::warn!("[bridge] bad JSON payload: {}", e);
        Value::Null
    })
}

fn json_to_js(v: &Value) -> JsValue {
    js_sys::JSON::parse(&v.to_string()).unwrap_or(JsValue::NULL)
}
