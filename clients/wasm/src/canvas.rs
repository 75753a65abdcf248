//! `CanvasSurface`: draws the view into a `<canvas>` and a few DOM panels.
//!
//! | Element id (default) | Content                         |
//! |----------------------|---------------------------------|
//! | `grid`               | `<canvas>` with the board       |
//! | `status`             | status line                     |
//! | `resources`          | one row per player              |
//! | `events`             | active-event list (optional)    |
//! | `notice`             | one-off notices (optional)      |
//! | `rules`              | rules dialog (optional)         |
//!
//! Event elements carry CSS classes so the page's stylesheet owns the
//! transitions: `event-item event-<kind>`, plus `event-entering` for one
//! frame after insertion and `event-leaving` until detach.  The notice
//! element carries `visible` for the linger time after each notice.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use grid_view::{EventKind, EventPatch, EventSlot, GridFrame, ResourceRow, Surface};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{CanvasRenderingContext2d, Document, Element, HtmlCanvasElement};

const GRID_LINE: &str = "#374151";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementIds {
    pub canvas: String,
    pub status: String,
    pub resources: String,
    pub events: String,
    pub notice: String,
    pub rules: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            canvas: "grid".into(),
            status: "status".into(),
            resources: "resources".into(),
            events: "events".into(),
            notice: "notice".into(),
            rules: "rules".into(),
        }
    }
}

pub struct CanvasSurface {
    document: Document,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    status: Element,
    resources: Element,
    events: Option<Element>,
    notice: Option<Element>,
    rules: Option<Element>,
    default_ink: String,
    linger_ms: u32,
    shown: HashMap<EventSlot, Element>,
    // Bumped per notice; a stale hide timer leaves a newer notice alone.
    notice_seq: Rc<Cell<u64>>,
}

impl CanvasSurface {
    /// Look up every element by id.  The canvas, status and resources
    /// elements are required; the rest are skipped when absent.
    pub fn attach(ids: &ElementIds, default_ink: &str, linger_ms: u64) -> Result<Self, JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let required = |id: &str| {
            document
                .get_element_by_id(id)
                .ok_or_else(|| JsValue::from_str(&format!("missing element #{id}")))
        };

        let canvas: HtmlCanvasElement = required(&ids.canvas)?.dyn_into()?;
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into()?;
        let status = required(&ids.status)?;
        let resources = required(&ids.resources)?;

        Ok(Self {
            events: document.get_element_by_id(&ids.events),
            notice: document.get_element_by_id(&ids.notice),
            rules: document.get_element_by_id(&ids.rules),
            document,
            canvas,
            ctx,
            status,
            resources,
            default_ink: default_ink.to_string(),
            linger_ms: linger_ms.min(u32::MAX as u64) as u32,
            shown: HashMap::new(),
            notice_seq: Rc::new(Cell::new(0)),
        })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Resize the canvas backing store to fit the whole grid.
    pub fn fit(&self, extent: f64) {
        let px = extent.ceil() as u32;
        self.canvas.set_width(px);
        self.canvas.set_height(px);
    }

    fn event_element(&self, patch_event: &grid_view::ActiveEvent) -> Result<Element, JsValue> {
        let el = self.document.create_element("div")?;
        el.set_class_name(&event_classes(patch_event.kind));

        let icon = self.document.create_element("span")?;
        icon.set_class_name("event-icon");
        icon.set_text_content(Some(patch_event.kind.icon()));

        let name = self.document.create_element("span")?;
        name.set_class_name("event-name");
        name.set_text_content(Some(&patch_event.name));

        let desc = self.document.create_element("span")?;
        desc.set_class_name("event-description");
        desc.set_text_content(Some(&patch_event.description));

        let duration = self.document.create_element("span")?;
        duration.set_class_name("event-duration");
        duration.set_text_content(Some(&duration_text(patch_event.duration)));

        el.append_child(&icon)?;
        el.append_child(&name)?;
        el.append_child(&desc)?;
        el.append_child(&duration)?;
        el.class_list().add_1("event-entering")?;
        Ok(el)
    }

    fn try_patch(&mut self, patch: &EventPatch) -> Result<(), JsValue> {
        let Some(list) = &self.events else {
            return Ok(());
        };

        match patch {
            EventPatch::Insert { slot, event } => {
                let el = self.event_element(event)?;
                list.append_child(&el)?;
                let entering = el.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    sleep_ms(16).await;
                    let _ = entering.class_list().remove_1("event-entering");
                });
                self.shown.insert(*slot, el);
            }
            EventPatch::Update { slot, duration, .. } => {
                if let Some(el) = self.shown.get(slot) {
                    if let Some(span) = el.query_selector(".event-duration")? {
                        span.set_text_content(Some(&duration_text(*duration)));
                    }
                }
            }
            EventPatch::Remove { slot, linger, .. } => {
                if let Some(el) = self.shown.remove(slot) {
                    el.class_list().add_1("event-leaving")?;
                    let ms = linger.as_millis().min(u32::MAX as u128) as u32;
                    wasm_bindgen_futures::spawn_local(async move {
                        sleep_ms(ms).await;
                        el.remove();
                    });
                }
            }
        }
        Ok(())
    }

    fn try_draw(&self, frame: &GridFrame) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        let size = frame.cell_size;
        ctx.clear_rect(
            0.0,
            0.0,
            self.canvas.width() as f64,
            self.canvas.height() as f64,
        );
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        ctx.set_font(&format!("{}px sans-serif", (size * 0.5).round()));

        for cell in &frame.cells {
            if let Some(terrain) = &cell.terrain {
                ctx.set_fill_style_str(&terrain.fill);
                ctx.fill_rect(cell.left, cell.top, size, size);
            }
            ctx.set_stroke_style_str(GRID_LINE);
            ctx.stroke_rect(cell.left, cell.top, size, size);

            if let Some(marker) = &cell.marker {
                let ink = marker.color.as_deref().unwrap_or(&self.default_ink);
                ctx.set_fill_style_str(ink);
                ctx.fill_text(
                    &marker.glyph,
                    cell.left + size / 2.0,
                    cell.top + size / 2.0,
                )?;
            }
        }
        Ok(())
    }

    fn try_resources(&self, rows: &[ResourceRow]) -> Result<(), JsValue> {
        self.resources.set_inner_html("");
        for row in rows {
            let el = self.document.create_element("div")?;
            el.set_class_name(if row.current {
                "resource-row current"
            } else {
                "resource-row"
            });
            el.set_text_content(Some(&resource_line(row)));
            if let Some(color) = &row.color {
                el.set_attribute("style", &format!("border-left: 4px solid {color}"))?;
            }
            self.resources.append_child(&el)?;
        }
        Ok(())
    }
}

impl Surface for CanvasSurface {
    fn set_identity(&mut self, player: &str) {
        log::info!("[canvas] playing as {}", player);
    }

    fn set_status(&mut self, text: &str) {
        self.status.set_text_content(Some(text));
    }

    fn clear_events(&mut self) {
        for (_, el) in self.shown.drain() {
            el.remove();
        }
        if let Some(list) = &self.events {
            list.set_inner_html("");
        }
    }

    fn patch_event(&mut self, patch: &EventPatch) {
        if let Err(e) = self.try_patch(patch) {
            log::warn!("[canvas] event patch failed: {:?}", e);
        }
    }

    fn draw_grid(&mut self, frame: &GridFrame) {
        if let Err(e) = self.try_draw(frame) {
            log::warn!("[canvas] grid draw failed: {:?}", e);
        }
    }

    fn set_resources(&mut self, rows: &[ResourceRow]) {
        if let Err(e) = self.try_resources(rows) {
            log::warn!("[canvas] resource panel failed: {:?}", e);
        }
    }

    fn show_notice(&mut self, text: &str) {
        let Some(el) = &self.notice else {
            log::info!("[canvas] {}", text);
            return;
        };
        el.set_text_content(Some(text));
        let _ = el.class_list().add_1("visible");

        let seq = self.notice_seq.get() + 1;
        self.notice_seq.set(seq);
        let current = self.notice_seq.clone();
        let el = el.clone();
        let ms = self.linger_ms;
        wasm_bindgen_futures::spawn_local(async move {
            sleep_ms(ms).await;
            if current.get() == seq {
                let _ = el.class_list().remove_1("visible");
            }
        });
    }

    fn show_rules(&mut self, open: bool) {
        if let Some(el) = &self.rules {
            let _ = el.class_list().toggle_with_force("open", open);
        }
    }
}

// ---------------------------------------------------------------------------
// Pure helpers
// ---------------------------------------------------------------------------

pub fn event_classes(kind: EventKind) -> String {
    format!("event-item event-{}", kind.as_str())
}

pub fn duration_text(turns: u32) -> String {
    match turns {
        1 => "1 turn left".into(),
        n => format!("{n} turns left"),
    }
}

pub fn resource_line(row: &ResourceRow) -> String {
    format!(
        "{} {}: Wood={}, Gold={}",
        row.glyph, row.label, row.wood, row.gold
    )
}

/// Yield to the JS event loop for `ms` milliseconds.
async fn sleep_ms(ms: u32) {
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        let scheduled = web_sys::window().map(|w| {
            w.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms as i32)
        });
        if !matches!(scheduled, Some(Ok(_))) {
            let _ = resolve.call0(&JsValue::NULL);
        }
    });
    let _ = JsFuture::from(promise).await;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
