//! Browser front end for Grid View.
//!
//! The page loads the generated module, opens its own Socket.IO connection
//! and hands the socket to [`GridViewClient`]:
//!
//! | Module     | Role                                                    |
//! |------------|---------------------------------------------------------|
//! | [`bridge`] | socket + canvas callbacks, one ordered input queue      |
//! | [`canvas`] | [`grid_view::Surface`] over `<canvas>` and DOM panels   |
//! | [`client`] | exported `GridViewClient`, `poll()` and intent methods  |
//!
//! Build with `wasm-pack build --target web` (add `--dev` for debug info);
//! browser tests run with `wasm-pack test --headless --firefox`.

pub mod bridge;
pub mod canvas;
pub mod client;

pub use client::GridViewClient;

use wasm_bindgen::prelude::*;

#[cfg(debug_assertions)]
const LOG_LEVEL: log::Level = log::Level::Debug;
#[cfg(not(debug_assertions))]
const LOG_LEVEL: log::Level = log::Level::Info;

/// Runs once when the module is instantiated.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(LOG_LEVEL).is_err() {
        // another module on the page already installed a logger
        return;
    }
    log::info!("grid-view-wasm ready (log level {})", LOG_LEVEL);
}
