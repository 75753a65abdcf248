//! Core view types shared across all modules.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Grid coordinates
// ---------------------------------------------------------------------------

/// Zero-based grid coordinate.  Serialised as a `[x, y]` pair on the wire.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<[i32; 2]> for GridPos {
    fn from([x, y]: [i32; 2]) -> Self {
        Self { x, y }
    }
}

impl From<GridPos> for [i32; 2] {
    fn from(pos: GridPos) -> Self {
        [pos.x, pos.y]
    }
}

impl std::fmt::Display for GridPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{},{}]", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Markers and styles
// ---------------------------------------------------------------------------

/// What gets drawn centred in an owned cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    /// CSS colour; `None` means the surface's default ink.
    pub color: Option<String>,
    pub glyph: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStyle {
    /// Display label used in the status line and resource panel.
    pub label: String,
    pub color: String,
    pub glyph: String,
}

impl PlayerStyle {
    pub fn new(label: &str, color: &str, glyph: &str) -> Self {
        Self {
            label: label.into(),
            color: color.into(),
            glyph: glyph.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainStyle {
    pub label: String,
    /// CSS fill for the whole cell.
    pub fill: String,
    /// Glyph used by text surfaces, which cannot fill.
    pub glyph: String,
}

/// Classification of one grid cell's wire value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellContent<'a> {
    Empty,
    Terrain(&'a TerrainStyle),
    Player(&'a str),
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Side length of the square grid, agreed out-of-band with the server.
    pub grid_size: usize,
    /// Pixel size of one cell on the canvas.
    pub cell_size: f64,
    /// How long a removed event stays on screen (fading) before detach.
    pub event_linger_ms: u64,
    /// Known player identifiers and how to draw them.
    pub players: BTreeMap<String, PlayerStyle>,
    /// Cell values that are terrain markers rather than owners.
    pub terrain: BTreeMap<String, TerrainStyle>,
    /// Ink for markers of unknown players.
    pub default_marker: String,
}

impl Default for ViewConfig {
    fn default() -> Self {
        let mut players = BTreeMap::new();
        players.insert("player".into(), PlayerStyle::new("You", "#2563eb", "P"));
        players.insert("AI1".into(), PlayerStyle::new("AI 1", "#dc2626", "A"));
        players.insert("AI2".into(), PlayerStyle::new("AI 2", "#16a34a", "B"));

        let mut terrain = BTreeMap::new();
        terrain.insert(
            "river".into(),
            TerrainStyle {
                label: "River".into(),
                fill: "#93c5fd".into(),
                glyph: "~".into(),
            },
        );

        Self {
            grid_size: 9,
            cell_size: 60.0,
            event_linger_ms: 500,
            players,
            terrain,
            default_marker: "#111827".into(),
        }
    }
}

impl ViewConfig {
    pub fn player_style(&self, id: &str) -> Option<&PlayerStyle> {
        self.players.get(id)
    }

    /// Display label for a player, falling back to the raw identifier.
    pub fn label_for<'a>(&'a self, id: &'a str) -> &'a str {
        self.players.get(id).map_or(id, |s| s.label.as_str())
    }

    /// Marker for a player.  Unknown identifiers get an unstyled marker
    /// showing the identifier itself.
    pub fn marker_for(&self, id: &str) -> Marker {
        match self.players.get(id) {
            Some(style) => Marker {
                color: Some(style.color.clone()),
                glyph: style.glyph.clone(),
            },
            None => Marker {
                color: None,
                glyph: id.to_string(),
            },
        }
    }

    pub fn classify<'a>(&'a self, cell: Option<&'a str>) -> CellContent<'a> {
        match cell {
            None | Some("") => CellContent::Empty,
            Some(value) => match self.terrain.get(value) {
                Some(style) => CellContent::Terrain(style),
                None => CellContent::Player(value),
            },
        }
    }

    /// Map a pointer position relative to the canvas origin to a cell.
    ///
    /// No bounds check: out-of-grid positions are forwarded as-is.
    pub fn cell_at(&self, px: f64, py: f64) -> GridPos {
        GridPos::new(
            (px / self.cell_size).floor() as i32,
            (py / self.cell_size).floor() as i32,
        )
    }

    /// Canvas size needed to draw the whole grid.
    pub fn canvas_extent(&self) -> f64 {
        self.grid_size as f64 * self.cell_size
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn click_maps_to_floor_of_cell() {
        let cfg = ViewConfig {
            cell_size: 100.0,
            ..Default::default()
        };
        assert_eq!(cfg.cell_at(250.0, 150.0), GridPos::new(2, 1));
        assert_eq!(cfg.cell_at(0.0, 99.9), GridPos::new(0, 0));
        assert_eq!(cfg.cell_at(-1.0, 100.0), GridPos::new(-1, 1));
    }

    #[test]
    fn classify_cells() {
        let cfg = ViewConfig::default();
        assert_eq!(cfg.classify(None), CellContent::Empty);
        assert_eq!(cfg.classify(Some("")), CellContent::Empty);
        assert!(matches!(cfg.classify(Some("river")), CellContent::Terrain(_)));
        assert_eq!(cfg.classify(Some("AI1")), CellContent::Player("AI1"));
    }

    #[test]
    fn unknown_player_gets_plain_marker() {
        let cfg = ViewConfig::default();
        let m = cfg.marker_for("stranger");
        assert_eq!(m.color, None);
        assert_eq!(m.glyph, "stranger");
        assert_eq!(cfg.label_for("stranger"), "stranger");
        assert_eq!(cfg.label_for("AI1"), "AI 1");
    }

    #[test]
    fn grid_pos_is_a_json_pair() {
        let v = serde_json::to_value(GridPos::new(2, 1)).unwrap();
        assert_eq!(v, serde_json::json!([2, 1]));
        let p: GridPos = serde_json::from_str("[4,7]").unwrap();
        assert_eq!(p, GridPos::new(4, 7));
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let cfg: ViewConfig = serde_json::from_str(r#"{"grid_size": 3}"#).unwrap();
        assert_eq!(cfg.grid_size, 3);
        assert_eq!(cfg.event_linger_ms, 500);
        assert!(cfg.players.contains_key("player"));
    }
}
