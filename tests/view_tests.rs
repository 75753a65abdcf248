//! ViewState behaviour through the public API

#[cfg(test)]
mod tests {
    use grid_view::{
        present, ActiveEvent, EventKind, EventPatch, GameSnapshot, GridPos, Inbound, Outbound,
        Resources, TextSurface, ViewConfig, ViewOp, ViewState,
    };
    use serde_json::{json, Value};

    fn make_view(grid_size: usize) -> ViewState {
        ViewState::new(ViewConfig {
            grid_size,
            cell_size: 100.0,
            ..Default::default()
        })
    }

    fn decode(event: &str, payload: Value) -> Inbound {
        Inbound::decode(event, payload).expect("valid inbound")
    }

    fn grid_of(ops: &[ViewOp]) -> &grid_view::GridFrame {
        ops.iter()
            .find_map(|op| match op {
                ViewOp::DrawGrid(f) => Some(f),
                _ => None,
            })
            .expect("render draws the grid")
    }

    fn resources_of(ops: &[ViewOp]) -> &[grid_view::ResourceRow] {
        ops.iter()
            .find_map(|op| match op {
                ViewOp::SetResources(r) => Some(r.as_slice()),
                _ => None,
            })
            .expect("render rebuilds resources")
    }

    fn patches(ops: &[ViewOp]) -> Vec<&EventPatch> {
        ops.iter()
            .filter_map(|op| match op {
                ViewOp::Event(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    fn snapshot_with_events(events: Vec<ActiveEvent>) -> GameSnapshot {
        GameSnapshot {
            active_events: Some(events),
            ..Default::default()
        }
    }

    // -----------------------------------------------------------------------
    // Idempotence
    // -----------------------------------------------------------------------

    #[test]
    fn rendering_same_snapshot_twice_converges() {
        let mut view = make_view(3);
        let mut snap = snapshot_with_events(vec![
            ActiveEvent::new("Gold Rush", EventKind::Resource, "+2 gold", 3),
            ActiveEvent::new("Flood", EventKind::Terrain, "rivers spread", 1),
        ]);
        snap.resources.insert("player".into(), Resources { wood: 10, gold: 5 });
        snap.resources.insert("AI1".into(), Resources { wood: 8, gold: 6 });

        let first = view.render(snap.clone());
        let second = view.render(snap);

        assert_eq!(patches(&first).len(), 2);
        assert!(patches(&second).is_empty());
        assert_eq!(grid_of(&first), grid_of(&second));
        assert_eq!(resources_of(&first), resources_of(&second));
        assert_eq!(view.board().names(), vec!["Flood", "Gold Rush"]);
    }

    // -----------------------------------------------------------------------
    // Resource panel
    // -----------------------------------------------------------------------

    #[test]
    fn one_resource_row_per_player() {
        let mut view = make_view(3);
        let ops = view.handle(decode(
            "update",
            json!({
                "grid": [],
                "resources": {
                    "player": {"wood": 10, "gold": 5},
                    "AI1": {"wood": 7, "gold": 2},
                    "AI2": {"wood": 0, "gold": 11}
                }
            }),
        ));
        let rows = resources_of(&ops);
        assert_eq!(rows.len(), 3);
        for (player, wood, gold) in [("player", 10, 5), ("AI1", 7, 2), ("AI2", 0, 11)] {
            let row = rows.iter().find(|r| r.player == player).unwrap();
            assert_eq!((row.wood, row.gold), (wood, gold));
        }
    }

    // -----------------------------------------------------------------------
    // Grid markers
    // -----------------------------------------------------------------------

    #[test]
    fn only_owned_cell_has_marker() {
        let mut view = make_view(3);
        let ops = view.handle(decode(
            "update",
            json!({
                "grid": [[null, null, null], [null, null, "AI1"], [null, null, null]],
                "resources": {}
            }),
        ));
        let frame = grid_of(&ops);
        for cell in &frame.cells {
            if cell.pos == GridPos::new(2, 1) {
                let marker = cell.marker.as_ref().expect("AI1 marker");
                assert_eq!(marker.glyph, "A");
                assert_eq!(marker.color.as_deref(), Some("#dc2626"));
                assert_eq!((cell.left, cell.top), (200.0, 100.0));
            } else {
                assert!(cell.marker.is_none(), "unexpected marker at {}", cell.pos);
            }
        }
    }

    #[test]
    fn unknown_player_and_terrain_do_not_fail() {
        let mut view = make_view(3);
        let ops = view.handle(decode(
            "update",
            json!({"grid": [["river", "ghost", null]], "resources": {}}),
        ));
        let frame = grid_of(&ops);
        let river = frame.cell(GridPos::new(0, 0)).unwrap();
        assert!(river.terrain.is_some());
        assert!(river.marker.is_none());
        let ghost = frame.cell(GridPos::new(1, 0)).unwrap();
        assert_eq!(ghost.marker.as_ref().unwrap().color, None);
    }

    // -----------------------------------------------------------------------
    // Active-event diff
    // -----------------------------------------------------------------------

    #[test]
    fn event_diff_removes_updates_and_adds() {
        let mut view = make_view(3);
        let mut surface = TextSurface::new();

        let ops = view.render(snapshot_with_events(vec![
            ActiveEvent::new("A", EventKind::Resource, "", 2),
            ActiveEvent::new("B", EventKind::Building, "", 1),
        ]));
        present(&mut surface, &ops);
        let b_slot = view.board().slot_of("B").unwrap();

        let ops = view.render(snapshot_with_events(vec![
            ActiveEvent::new("B", EventKind::Building, "", 0),
            ActiveEvent::new("C", EventKind::Special, "", 3),
        ]));
        present(&mut surface, &ops);

        let diff = patches(&ops);
        assert_eq!(diff.len(), 3);
        assert!(matches!(diff[0], EventPatch::Remove { name, .. } if name == "A"));
        assert!(
            matches!(diff[1], EventPatch::Update { slot, duration: 0, .. } if *slot == b_slot)
        );
        assert!(matches!(diff[2], EventPatch::Insert { event, .. } if event.name == "C"));

        // B is the same element, never recreated.
        assert_eq!(surface.events[&b_slot].duration, 0);
        assert!(!surface.events[&b_slot].leaving);

        surface.sweep();
        let names: Vec<&str> = surface
            .visible_events()
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["B", "C"]);
    }

    #[test]
    fn missing_active_events_leaves_list_untouched() {
        let mut view = make_view(3);
        view.render(snapshot_with_events(vec![ActiveEvent::new(
            "Drought",
            EventKind::Resource,
            "",
            2,
        )]));
        let ops = view.handle(decode("update", json!({"grid": [], "resources": {}})));
        assert!(patches(&ops).is_empty());
        assert_eq!(view.board().len(), 1);
    }

    #[test]
    fn game_started_clears_events_before_render() {
        let mut view = make_view(3);
        view.handle(decode(
            "event_triggered",
            json!({"name": "Meteor", "type": "special", "description": "", "duration": 1}),
        ));
        assert_eq!(view.board().len(), 1);

        let ops = view.handle(decode("game_started", json!({"grid": [], "resources": {}})));
        assert_eq!(ops[0], ViewOp::ClearEvents);
        assert!(view.board().is_empty());
    }

    #[test]
    fn event_triggered_appends_immediately() {
        let mut view = make_view(3);
        let ops = view.handle(decode(
            "event_triggered",
            json!({"name": "Gold Rush", "type": "resource", "description": "+2", "duration": 3}),
        ));
        assert_eq!(ops.len(), 1);
        assert!(matches!(&ops[0], ViewOp::Event(EventPatch::Insert { event, .. }) if event.name == "Gold Rush"));
    }

    // -----------------------------------------------------------------------
    // Input → intents
    // -----------------------------------------------------------------------

    #[test]
    fn click_becomes_occupy_move() {
        let mut view = make_view(3);
        view.handle(decode("player_id", json!("player")));

        let intent = view.click(250.0, 150.0).unwrap();
        assert_eq!(intent.name(), "move");
        assert_eq!(
            intent.payload().unwrap(),
            Some(json!({"player": "player", "action": "occupy", "position": [2, 1]}))
        );
    }

    #[test]
    fn click_outside_grid_is_still_forwarded() {
        let mut view = make_view(3);
        view.handle(decode("player_id", json!("player")));
        let Outbound::Move(intent) = view.click(950.0, 20.0).unwrap() else {
            panic!("expected move");
        };
        assert_eq!(intent.position, Some(GridPos::new(9, 0)));
    }

    #[test]
    fn start_game_is_always_available() {
        let view = make_view(3);
        assert_eq!(view.start_game(), Outbound::StartGame);
    }

    // -----------------------------------------------------------------------
    // Status line
    // -----------------------------------------------------------------------

    #[test]
    fn error_overwrites_status() {
        let mut view = make_view(3);
        view.handle(decode(
            "update",
            json!({"grid": [], "resources": {}, "currentPlayer": "player"}),
        ));
        assert!(view.status().starts_with("Current player"));

        let ops = view.handle(decode("error", json!("Not your turn")));
        assert_eq!(ops, vec![ViewOp::SetStatus("Not your turn".into())]);
        assert_eq!(view.status(), "Not your turn");
    }

    #[test]
    fn game_over_names_winner_and_does_not_render() {
        let mut view = make_view(3);
        let ops = view.handle(decode("game_over", json!({"winner": "AI1"})));
        assert!(view.status().contains("AI1"));
        // raw id, not the "AI 1" display label
        assert_eq!(view.status(), "Game Over! Winner: AI1");
        assert!(ops
            .iter()
            .all(|op| matches!(op, ViewOp::SetStatus(_))));
    }
}
