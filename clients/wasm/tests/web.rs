//! Browser tests for the canvas surface.
//!
//! ```bash
//! wasm-pack test --headless --firefox
//! ```
#![cfg(target_arch = "wasm32")]

use std::time::Duration;

use grid_view::{ActiveEvent, EventBoard, EventKind, Surface};
use grid_view_wasm::canvas::{CanvasSurface, ElementIds};
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;
use web_sys::{Document, Element};

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> Document {
    web_sys::window()
        .and_then(|w| w.document())
        .expect("document available")
}

/// Build a fresh set of elements with ids prefixed by `tag`.
fn mount(tag: &str) -> ElementIds {
    let doc = document();
    let body = doc.body().expect("body available");
    let ids = ElementIds {
        canvas: format!("{tag}-grid"),
        status: format!("{tag}-status"),
        resources: format!("{tag}-resources"),
        events: format!("{tag}-events"),
        notice: format!("{tag}-notice"),
        rules: format!("{tag}-rules"),
    };
    for (kind, id) in [
        ("canvas", &ids.canvas),
        ("div", &ids.status),
        ("div", &ids.resources),
        ("div", &ids.events),
        ("div", &ids.notice),
        ("div", &ids.rules),
    ] {
        let el = doc.create_element(kind).expect("create element");
        el.set_id(id);
        body.append_child(&el).expect("append element");
    }
    ids
}

fn by_id(id: &str) -> Element {
    document().get_element_by_id(id).expect("element exists")
}

async fn wait_ms(ms: i32) {
    let promise = js_sys::Promise::new(&mut |resolve, _| {
        web_sys::window()
            .expect("window")
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
            .expect("timer");
    });
    JsFuture::from(promise).await.expect("timer resolves");
}

#[wasm_bindgen_test]
fn update_patch_keeps_the_same_element() {
    let ids = mount("update");
    let mut surface = CanvasSurface::attach(&ids, "#111827", 50).expect("attach");
    let mut board = EventBoard::new(Duration::from_millis(50));
    let list = by_id(&ids.events);

    for patch in board.reconcile(&[ActiveEvent::new("Flood", EventKind::Terrain, "", 3)]) {
        surface.patch_event(&patch);
    }
    let first = list
        .query_selector(".event-item")
        .expect("query")
        .expect("inserted");
    assert!(first.class_name().contains("event-terrain"));

    let patches = board.reconcile(&[ActiveEvent::new("Flood", EventKind::Terrain, "", 2)]);
    assert_eq!(patches.len(), 1);
    surface.patch_event(&patches[0]);

    let second = list
        .query_selector(".event-item")
        .expect("query")
        .expect("still shown");
    assert_eq!(first, second);
    let duration = second
        .query_selector(".event-duration")
        .expect("query")
        .expect("duration span");
    assert_eq!(duration.text_content().as_deref(), Some("2 turns left"));
}

#[wasm_bindgen_test]
async fn removed_event_detaches_after_linger() {
    let ids = mount("remove");
    let mut surface = CanvasSurface::attach(&ids, "#111827", 20).expect("attach");
    let mut board = EventBoard::new(Duration::from_millis(20));
    let list = by_id(&ids.events);

    for patch in board.reconcile(&[ActiveEvent::new("Gold Rush", EventKind::Resource, "", 1)]) {
        surface.patch_event(&patch);
    }
    for patch in board.reconcile(&[]) {
        surface.patch_event(&patch);
    }
    let leaving = list
        .query_selector(".event-item")
        .expect("query")
        .expect("lingers");
    assert!(leaving.class_list().contains("event-leaving"));

    wait_ms(80).await;
    assert!(list.query_selector(".event-item").expect("query").is_none());
}

#[wasm_bindgen_test]
async fn notice_hides_after_linger() {
    let ids = mount("notice");
    let mut surface = CanvasSurface::attach(&ids, "#111827", 20).expect("attach");
    let notice = by_id(&ids.notice);

    surface.show_notice("Extra build available this turn!");
    assert!(notice.class_list().contains("visible"));
    assert_eq!(
        notice.text_content().as_deref(),
        Some("Extra build available this turn!")
    );

    wait_ms(80).await;
    assert!(!notice.class_list().contains("visible"));
}

#[wasm_bindgen_test]
async fn newer_notice_outlives_older_timer() {
    let ids = mount("notice-twice");
    let mut surface = CanvasSurface::attach(&ids, "#111827", 60).expect("attach");
    let notice = by_id(&ids.notice);

    surface.show_notice("first");
    wait_ms(40).await;
    surface.show_notice("second");
    // the first timer fires around here and must leave "second" up
    wait_ms(40).await;
    assert!(notice.class_list().contains("visible"));
    assert_eq!(notice.text_content().as_deref(), Some("second"));

    wait_ms(80).await;
    assert!(!notice.class_list().contains("visible"));
}

#[wasm_bindgen_test]
fn missing_required_element_is_an_error() {
    let ids = ElementIds {
        canvas: "no-such-canvas".into(),
        ..ElementIds::default()
    };
    assert!(CanvasSurface::attach(&ids, "#111827", 0).is_err());
}
