//! Display seam.
//!
//! A [`Surface`] is whatever shows the view: a canvas plus DOM panels in the
//! browser, or the [`TextSurface`] used by the replay tool and tests.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::board::{EventPatch, EventSlot};
use crate::protocol::EventKind;
use crate::view::{GridFrame, ResourceRow, ViewOp};

pub trait Surface {
    fn set_identity(&mut self, player: &str);
    fn set_status(&mut self, text: &str);
    fn clear_events(&mut self);
    fn patch_event(&mut self, patch: &EventPatch);
    fn draw_grid(&mut self, frame: &GridFrame);
    fn set_resources(&mut self, rows: &[ResourceRow]);
    fn show_notice(&mut self, text: &str);
    fn show_rules(&mut self, open: bool);
}

/// Apply a batch of ops in order.
pub fn present<S: Surface + ?Sized>(surface: &mut S, ops: &[ViewOp]) {
    for op in ops {
        match op {
            ViewOp::SetIdentity(id) => surface.set_identity(id),
            ViewOp::SetStatus(text) => surface.set_status(text),
            ViewOp::ClearEvents => surface.clear_events(),
            ViewOp::Event(patch) => surface.patch_event(patch),
            ViewOp::DrawGrid(frame) => surface.draw_grid(frame),
            ViewOp::SetResources(rows) => surface.set_resources(rows),
            ViewOp::Notice(text) => surface.show_notice(text),
            ViewOp::ShowRules(open) => surface.show_rules(*open),
        }
    }
}

// ---------------------------------------------------------------------------
// TextSurface
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEvent {
    pub name: String,
    pub kind: EventKind,
    pub description: String,
    pub duration: u32,
    /// Removed by the last reconcile, still on screen until [`TextSurface::sweep`].
    pub leaving: bool,
}

/// Plain-text rendering of the whole view.
#[derive(Debug, Default)]
pub struct TextSurface {
    pub identity: Option<String>,
    pub status: String,
    pub grid: Vec<String>,
    pub resources: Vec<String>,
    pub events: BTreeMap<EventSlot, TextEvent>,
    pub notices: Vec<String>,
    pub rules_open: bool,
}

impl TextSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Detach every element whose exit transition has started.
    pub fn sweep(&mut self) {
        self.events.retain(|_, e| !e.leaving);
    }

    /// Events currently visible and not leaving, by slot order.
    pub fn visible_events(&self) -> Vec<&TextEvent> {
        self.events.values().filter(|e| !e.leaving).collect()
    }

    /// Render the current frame.
    pub fn frame(&self) -> String {
        let mut out = String::new();
        if let Some(id) = &self.identity {
            let _ = writeln!(out, "id: {id}");
        }
        let _ = writeln!(out, "status: {}", self.status);
        for line in &self.grid {
            let _ = writeln!(out, "{line}");
        }
        for line in &self.resources {
            let _ = writeln!(out, "{line}");
        }
        for ev in self.events.values() {
            let _ = writeln!(
                out,
                "{} {} ({} turns){}{}",
                ev.kind.icon(),
                ev.name,
                ev.duration,
                if ev.description.is_empty() {
                    String::new()
                } else {
                    format!(" - {}", ev.description)
                },
                if ev.leaving { " [fading]" } else { "" },
            );
        }
        for notice in &self.notices {
            let _ = writeln!(out, "! {notice}");
        }
        if self.rules_open {
            let _ = writeln!(out, "[rules open]");
        }
        out
    }
}

impl Surface for TextSurface {
    fn set_identity(&mut self, player: &str) {
        self.identity = Some(player.to_string());
    }

    fn set_status(&mut self, text: &str) {
        self.status = text.to_string();
    }

    fn clear_events(&mut self) {
        self.events.clear();
    }

    fn patch_event(&mut self, patch: &EventPatch) {
        match patch {
            EventPatch::Insert { slot, event } => {
                self.events.insert(
                    *slot,
                    TextEvent {
                        name: event.name.clone(),
                        kind: event.kind,
                        description: event.description.clone(),
                        duration: event.duration,
                        leaving: false,
                    },
                );
            }
            EventPatch::Update { slot, duration, .. } => {
                if let Some(ev) = self.events.get_mut(slot) {
                    ev.duration = *duration;
                }
            }
            EventPatch::Remove { slot, .. } => {
                if let Some(ev) = self.events.get_mut(slot) {
                    ev.leaving = true;
                }
            }
        }
    }

    fn draw_grid(&mut self, frame: &GridFrame) {
        self.grid.clear();
        for row in frame.cells.chunks(frame.size.max(1)) {
            let line: Vec<String> = row
                .iter()
                .map(|cell| {
                    let glyph = match (&cell.marker, &cell.terrain) {
                        (Some(m), _) => m.glyph.as_str(),
                        (None, Some(t)) => t.glyph.as_str(),
                        (None, None) => ".",
                    };
                    format!("[{glyph:^3}]")
                })
                .collect();
            self.grid.push(line.concat());
        }
    }

    fn set_resources(&mut self, rows: &[ResourceRow]) {
        self.resources = rows
            .iter()
            .map(|r| {
                format!(
                    "{}{} {}: Wood={}, Gold={}",
                    if r.current { "> " } else { "  " },
                    r.glyph,
                    r.label,
                    r.wood,
                    r.gold
                )
            })
            .collect();
    }

    fn show_notice(&mut self, text: &str) {
        self.notices.push(text.to_string());
    }

    fn show_rules(&mut self, open: bool) {
        self.rules_open = open;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
