//! Real-time channel protocol.
//!
//! This module owns **every message that crosses the channel boundary**
//! between the game server and the view.
//!
//! ## Events
//!
//! | Direction | Event                   | Payload                  |
//! |-----------|-------------------------|--------------------------|
//! | in        | `player_id`             | player identifier string |
//! | in        | `game_started`          | [`GameSnapshot`]         |
//! | in        | `update`                | [`GameSnapshot`]         |
//! | in        | `game_over`             | [`GameOver`]             |
//! | in        | `error`                 | message string           |
//! | in        | `event_triggered`       | [`ActiveEvent`]          |
//! | in        | `extra_build_available` | [`ExtraBuild`]           |
//! | out       | `start_game`            | *(none)*                 |
//! | out       | `move`                  | [`MoveIntent`]           |
//!
//! ## Design rules
//!
//! 1. Snapshot fields are camelCase on the wire; snake_case aliases are
//!    accepted for servers that send them.
//! 2. Every optional field decodes as absent when missing, never as an error.
//!    Collection and scalar fields also treat an explicit `null` as empty.
//! 3. Outbound intents are fire-and-forget; there is no acknowledgement type.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::types::GridPos;

/// `null` decodes as `T::default()`, the same as a missing field.
fn null_as_default<'de, D, T>(de: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Complete game state at one instant.  Replaces the previous snapshot
/// wholesale on every `game_started` / `update`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    /// Row-major: `grid[y][x]`.  `null` is an empty cell; a string is either
    /// a terrain marker or an owning player identifier.
    #[serde(default, deserialize_with = "null_as_default")]
    pub grid: Vec<Vec<Option<String>>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub resources: BTreeMap<String, Resources>,
    #[serde(default, alias = "current_player")]
    pub current_player: Option<String>,
    #[serde(default)]
    pub round: Option<u32>,
    #[serde(default, alias = "max_rounds")]
    pub max_rounds: Option<u32>,
    /// Running move counter; older servers send this instead of rounds.
    #[serde(default)]
    pub turn: Option<u32>,
    /// `None` means the server did not report events this time, which
    /// leaves the displayed list untouched.
    #[serde(default, alias = "active_events")]
    pub active_events: Option<Vec<ActiveEvent>>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resources {
    #[serde(default, deserialize_with = "null_as_default")]
    pub wood: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub gold: u32,
}

// ---------------------------------------------------------------------------
// Active events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Resource,
    Building,
    Terrain,
    Special,
    #[default]
    #[serde(other)]
    Other,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Resource => "resource",
            EventKind::Building => "building",
            EventKind::Terrain => "terrain",
            EventKind::Special => "special",
            EventKind::Other => "default",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            EventKind::Resource => "💰",
            EventKind::Building => "🏗️",
            EventKind::Terrain => "🌊",
            EventKind::Special => "✨",
            EventKind::Other => "📢",
        }
    }
}

/// A timed, named modifier currently in effect.  `name` is the identity key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveEvent {
    pub name: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: EventKind,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Remaining turns.
    #[serde(default, deserialize_with = "null_as_default")]
    pub duration: u32,
}

impl ActiveEvent {
    pub fn new(name: &str, kind: EventKind, description: &str, duration: u32) -> Self {
        Self {
            name: name.into(),
            kind,
            description: description.into(),
            duration,
        }
    }
}

// ---------------------------------------------------------------------------
// Small inbound payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOver {
    pub winner: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraBuild {
    pub player: String,
}

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// One decoded inbound channel event.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    PlayerId(String),
    GameStarted(GameSnapshot),
    Update(GameSnapshot),
    GameOver(GameOver),
    Error(String),
    EventTriggered(ActiveEvent),
    ExtraBuildAvailable(ExtraBuild),
}

impl Inbound {
    /// Decode a named event and its JSON payload.
    pub fn decode(event: &str, payload: Value) -> Result<Self> {
        let wrap = |source| Error::Payload {
            event: event.to_string(),
            source,
        };

        Ok(match event {
            names::PLAYER_ID => Inbound::PlayerId(serde_json::from_value(payload).map_err(wrap)?),
            names::GAME_STARTED => {
                Inbound::GameStarted(serde_json::from_value(payload).map_err(wrap)?)
            }
            names::UPDATE => Inbound::Update(serde_json::from_value(payload).map_err(wrap)?),
            names::GAME_OVER => Inbound::GameOver(serde_json::from_value(payload).map_err(wrap)?),
            names::ERROR => Inbound::Error(serde_json::from_value(payload).map_err(wrap)?),
            names::EVENT_TRIGGERED => {
                Inbound::EventTriggered(serde_json::from_value(payload).map_err(wrap)?)
            }
            names::EXTRA_BUILD_AVAILABLE => {
                Inbound::ExtraBuildAvailable(serde_json::from_value(payload).map_err(wrap)?)
            }
            other => return Err(Error::UnknownEvent(other.to_string())),
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Inbound::PlayerId(_) => names::PLAYER_ID,
            Inbound::GameStarted(_) => names::GAME_STARTED,
            Inbound::Update(_) => names::UPDATE,
            Inbound::GameOver(_) => names::GAME_OVER,
            Inbound::Error(_) => names::ERROR,
            Inbound::EventTriggered(_) => names::EVENT_TRIGGERED,
            Inbound::ExtraBuildAvailable(_) => names::EXTRA_BUILD_AVAILABLE,
        }
    }
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Occupy,
    CollectWood,
    CollectGold,
    /// Any action the server understands that the view has no name for.
    #[serde(untagged)]
    Other(String),
}

impl Action {
    pub fn as_str(&self) -> &str {
        match self {
            Action::Occupy => "occupy",
            Action::CollectWood => "collect_wood",
            Action::CollectGold => "collect_gold",
            Action::Other(s) => s,
        }
    }
}

impl From<&str> for Action {
    fn from(s: &str) -> Self {
        match s {
            "occupy" => Action::Occupy,
            "collect_wood" => Action::CollectWood,
            "collect_gold" => Action::CollectGold,
            other => Action::Other(other.to_string()),
        }
    }
}

impl FromStr for Action {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Action::from(s))
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveIntent {
    pub player: String,
    pub action: Action,
    /// Serialised as `null` for non-positional actions.
    pub position: Option<GridPos>,
}

/// One outbound intent.  Sent once, never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    StartGame,
    Move(MoveIntent),
}

impl Outbound {
    pub fn name(&self) -> &'static str {
        match self {
            Outbound::StartGame => names::START_GAME,
            Outbound::Move(_) => names::MOVE,
        }
    }

    pub fn payload(&self) -> Result<Option<Value>> {
        match self {
            Outbound::StartGame => Ok(None),
            Outbound::Move(intent) => Ok(Some(serde_json::to_value(intent)?)),
        }
    }

    /// Emit this intent on `channel`.
    pub fn send<C: Channel + ?Sized>(&self, channel: &mut C) -> Result<()> {
        let payload = self.payload()?;
        log::debug!("emit {} {:?}", self.name(), payload);
        channel.emit(self.name(), payload.as_ref())
    }
}

/// Outbound half of the real-time channel.
pub trait Channel {
    fn emit(&mut self, event: &str, payload: Option<&Value>) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Event names
// ---------------------------------------------------------------------------

/// All channel event names, as constants.
pub mod names {
    pub const PLAYER_ID: &str = "player_id";
    pub const GAME_STARTED: &str = "game_started";
    pub const UPDATE: &str = "update";
    pub const GAME_OVER: &str = "game_over";
    pub const ERROR: &str = "error";
    pub const EVENT_TRIGGERED: &str = "event_triggered";
    pub const EXTRA_BUILD_AVAILABLE: &str = "extra_build_available";

    pub const START_GAME: &str = "start_game";
    pub const MOVE: &str = "move";

    /// Every event the view subscribes to.
    pub const INBOUND: [&str; 7] = [
        PLAYER_ID,
        GAME_STARTED,
        UPDATE,
        GAME_OVER,
        ERROR,
        EVENT_TRIGGERED,
        EXTRA_BUILD_AVAILABLE,
    ];
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
