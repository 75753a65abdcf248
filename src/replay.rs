//! Transcript replay – drives a [`ViewState`] from recorded channel traffic.
//!
//! ## Transcript format
//!
//! One JSON object per line:
//!
//! | Line                                          | Meaning                  |
//! |-----------------------------------------------|--------------------------|
//! | `{"event": "update", "data": {...}}`          | inbound channel event    |
//! | `{"click": [250, 150]}`                       | canvas click (pixels)    |
//! | `{"start": true}`                             | start button             |
//! | `{"move": {"action": "collect_wood"}}`        | explicit move            |
//!
//! Blank lines and lines starting with `#` are skipped.  A malformed line is
//! logged and skipped; it never stops the replay.

use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::error::Error;
use crate::protocol::{Action, Channel, Inbound};
use crate::surface::{present, TextSurface};
use crate::types::{GridPos, ViewConfig};
use crate::view::ViewState;

// ---------------------------------------------------------------------------
// Transcript lines
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TranscriptLine {
    Inbound {
        event: String,
        #[serde(default)]
        data: Value,
    },
    Click {
        click: [f64; 2],
    },
    Start {
        start: bool,
    },
    Move {
        #[serde(rename = "move")]
        request: MoveRequest,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct MoveRequest {
    pub action: Action,
    #[serde(default)]
    pub position: Option<GridPos>,
}

impl TranscriptLine {
    /// Parse one line.  `Ok(None)` for blanks and comments.
    pub fn parse(line: &str) -> crate::error::Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        serde_json::from_str(line)
            .map(Some)
            .map_err(|_| Error::Transcript(line.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Outbound channel
// ---------------------------------------------------------------------------

/// Writes every emitted intent as `-> <event> <json>`.
pub struct JsonLinesChannel<'a, W: Write> {
    out: &'a mut W,
    pub sent: usize,
}

impl<'a, W: Write> JsonLinesChannel<'a, W> {
    pub fn new(out: &'a mut W) -> Self {
        Self { out, sent: 0 }
    }
}

impl<W: Write> Channel for JsonLinesChannel<'_, W> {
    fn emit(&mut self, event: &str, payload: Option<&Value>) -> crate::error::Result<()> {
        match payload {
            Some(p) => writeln!(self.out, "-> {event} {p}")?,
            None => writeln!(self.out, "-> {event}")?,
        }
        self.sent += 1;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct ReplayOptions {
    /// Pause between transcript lines.
    pub pace: Duration,
    /// Print a frame after every line instead of only at the end.
    pub every_frame: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub lines: usize,
    pub inbound: usize,
    pub dropped: usize,
    pub intents: usize,
}

/// Replay `input` through a fresh [`ViewState`] and write frames and
/// intents to `out`.
pub async fn run<R, W>(
    input: R,
    out: &mut W,
    config: ViewConfig,
    options: &ReplayOptions,
) -> Result<ReplayStats>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut view = ViewState::new(config);
    let mut surface = TextSurface::new();
    let mut stats = ReplayStats::default();
    let mut lines = input.lines();

    while let Some(raw) = lines.next_line().await.context("reading transcript")? {
        let line = match TranscriptLine::parse(&raw) {
            Ok(Some(line)) => line,
            Ok(None) => continue,
            Err(e) => {
                log::warn!("skipping line: {}", e);
                stats.dropped += 1;
                continue;
            }
        };
        stats.lines += 1;

        step(&mut view, &mut surface, line, out, &mut stats)?;

        if options.every_frame {
            writeln!(out, "--- frame {} ---", stats.lines)?;
            write!(out, "{}", surface.frame())?;
            surface.sweep();
        }

        if !options.pace.is_zero() {
            tokio::time::sleep(options.pace).await;
        }
    }

    surface.sweep();
    writeln!(out, "--- final ---")?;
    write!(out, "{}", surface.frame())?;
    Ok(stats)
}

fn step<W: Write>(
    view: &mut ViewState,
    surface: &mut TextSurface,
    line: TranscriptLine,
    out: &mut W,
    stats: &mut ReplayStats,
) -> Result<()> {
    let outbound = match line {
        TranscriptLine::Inbound { event, data } => {
            match Inbound::decode(&event, data) {
                Ok(inbound) => {
                    stats.inbound += 1;
                    let ops = view.handle(inbound);
                    present(surface, &ops);
                }
                Err(e) => {
                    log::warn!("dropping inbound event: {}", e);
                    stats.dropped += 1;
                }
            }
            None
        }
        TranscriptLine::Click { click: [px, py] } => Some(view.click(px, py)),
        TranscriptLine::Start { start } => start.then(|| Ok(view.start_game())),
        TranscriptLine::Move { request } => Some(view.make_move(request.action, request.position)),
    };

    match outbound {
        Some(Ok(intent)) => {
            let mut channel = JsonLinesChannel::new(out);
            intent.send(&mut channel)?;
            stats.intents += channel.sent;
        }
        Some(Err(e)) => {
            log::warn!("input ignored: {}", e);
            stats.dropped += 1;
        }
        None => {}
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Layer an optional TOML/JSON file under `GRID_VIEW_*` environment
/// variables and deserialize into a [`ViewConfig`].
pub fn load_config(path: Option<&str>) -> Result<ViewConfig> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::with_name(path));
    }
    builder = builder.add_source(
        config::Environment::with_prefix("GRID_VIEW")
            .prefix_separator("_")
            .try_parsing(true)
            .separator("__"),
    );
    builder
        .build()
        .context("loading view config")?
        .try_deserialize()
        .context("invalid view config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_skips_blank_and_comments() {
        assert!(TranscriptLine::parse("").unwrap().is_none());
        assert!(TranscriptLine::parse("   ").unwrap().is_none());
        assert!(TranscriptLine::parse("# recorded 2024").unwrap().is_none());
    }

    #[test]
    fn parse_each_line_kind() {
        assert!(matches!(
            TranscriptLine::parse(r#"{"event":"error","data":"nope"}"#).unwrap(),
            Some(TranscriptLine::Inbound { .. })
        ));
        assert!(matches!(
            TranscriptLine::parse(r#"{"click":[10,20]}"#).unwrap(),
            Some(TranscriptLine::Click { click }) if click == [10.0, 20.0]
        ));
        assert!(matches!(
            TranscriptLine::parse(r#"{"start":true}"#).unwrap(),
            Some(TranscriptLine::Start { start: true })
        ));
        assert!(matches!(
            TranscriptLine::parse(r#"{"move":{"action":"collect_gold"}}"#).unwrap(),
            Some(TranscriptLine::Move { request }) if request.action == Action::CollectGold
        ));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(
            TranscriptLine::parse("not json"),
            Err(Error::Transcript(_))
        ));
        assert!(matches!(
            TranscriptLine::parse(r#"{"unexpected": 1}"#),
            Err(Error::Transcript(_))
        ));
    }

    #[test]
    fn channel_writes_one_line_per_intent() {
        let mut buf = Vec::new();
        {
            let mut ch = JsonLinesChannel::new(&mut buf);
            ch.emit("start_game", None).unwrap();
            ch.emit("move", Some(&serde_json::json!({"action": "occupy"})))
                .unwrap();
            assert_eq!(ch.sent, 2);
        }
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "-> start_game\n-> move {\"action\":\"occupy\"}\n");
    }
}
