//! `EventBoard`: keyed mirror of the displayed active-event list.
//!
//! The board never touches a display.  It keeps one entry per event name
//! and turns each new event set into a list of [`EventPatch`]es that a
//! surface applies to its own elements.  Every inserted element gets a
//! fresh [`EventSlot`]; in-place updates keep the slot, so a surface can
//! tell "same element, new duration" from "new element".

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use crate::protocol::ActiveEvent;

/// Identity of one rendered event element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventSlot(u64);

impl EventSlot {
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for EventSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "event-{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventPatch {
    /// Create an element for `event` with an entrance transition.
    Insert { slot: EventSlot, event: ActiveEvent },
    /// Change only the duration shown by an existing element.
    Update {
        slot: EventSlot,
        name: String,
        duration: u32,
    },
    /// Start the exit transition; detach the element after `linger`.
    Remove {
        slot: EventSlot,
        name: String,
        linger: Duration,
    },
}

impl EventPatch {
    pub fn slot(&self) -> EventSlot {
        match self {
            EventPatch::Insert { slot, .. }
            | EventPatch::Update { slot, .. }
            | EventPatch::Remove { slot, .. } => *slot,
        }
    }
}

#[derive(Debug, Clone)]
struct Shown {
    slot: EventSlot,
    event: ActiveEvent,
}

#[derive(Debug)]
pub struct EventBoard {
    shown: HashMap<String, Shown>,
    next_slot: u64,
    linger: Duration,
}

impl EventBoard {
    pub fn new(linger: Duration) -> Self {
        Self {
            shown: HashMap::new(),
            next_slot: 1,
            linger,
        }
    }

    /// Bring the board in line with `events` and return the patches that do
    /// the same to a display.  Duplicate names keep their first occurrence.
    ///
    /// Applying the same set twice yields no patches the second time.
    pub fn reconcile(&mut self, events: &[ActiveEvent]) -> Vec<EventPatch> {
        let mut wanted: Vec<&ActiveEvent> = Vec::with_capacity(events.len());
        let mut seen = HashSet::new();
        for ev in events {
            if seen.insert(ev.name.as_str()) {
                wanted.push(ev);
            } else {
                log::warn!("duplicate active event '{}' ignored", ev.name);
            }
        }

        let mut patches = Vec::new();

        let mut gone: Vec<(EventSlot, String)> = self
            .shown
            .iter()
            .filter(|(name, _)| !seen.contains(name.as_str()))
            .map(|(name, s)| (s.slot, name.clone()))
            .collect();
        gone.sort_by_key(|(slot, _)| *slot);
        for (slot, name) in gone {
            self.shown.remove(&name);
            patches.push(EventPatch::Remove {
                slot,
                name,
                linger: self.linger,
            });
        }

        for ev in wanted {
            patches.extend(self.upsert(ev.clone()));
        }

        patches
    }

    /// Add or refresh a single event without touching the others.
    ///
    /// Used for one-off `event_triggered` notifications.  Returns `None` if
    /// the event is already shown with the same duration.
    pub fn push(&mut self, event: ActiveEvent) -> Option<EventPatch> {
        self.upsert(event)
    }

    fn upsert(&mut self, event: ActiveEvent) -> Option<EventPatch> {
        if let Some(shown) = self.shown.get_mut(&event.name) {
            if shown.event.duration == event.duration {
                return None;
            }
            shown.event.duration = event.duration;
            return Some(EventPatch::Update {
                slot: shown.slot,
                name: event.name,
                duration: event.duration,
            });
        }

        let slot = EventSlot(self.next_slot);
        self.next_slot += 1;
        self.shown.insert(
            event.name.clone(),
            Shown {
                slot,
                event: event.clone(),
            },
        );
        Some(EventPatch::Insert { slot, event })
    }

    /// Forget everything.  Slots are never reused.
    pub fn clear(&mut self) {
        self.shown.clear();
    }

    pub fn len(&self) -> usize {
        self.shown.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shown.is_empty()
    }

    pub fn slot_of(&self, name: &str) -> Option<EventSlot> {
        self.shown.get(name).map(|s| s.slot)
    }

    pub fn get(&self, name: &str) -> Option<&ActiveEvent> {
        self.shown.get(name).map(|s| &s.event)
    }

    /// Names currently shown, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.shown.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
