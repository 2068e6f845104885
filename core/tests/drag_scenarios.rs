use riftbound_core::{
    AnchorName, DragController, DragStart, MemoryStore, PlaySurfaceRect, PlayerCount,
    PointerPosition, Scoreboard, SlotAssignmentManager, SlotCommit,
};

const SURFACE: PlaySurfaceRect = PlaySurfaceRect {
    left: 0.0,
    top: 80.0,
    width: 1200.0,
    height: 800.0,
};

fn point(rel_x: f64, rel_y: f64) -> PointerPosition {
    PointerPosition::new(
        SURFACE.left + SURFACE.width * rel_x,
        SURFACE.top + SURFACE.height * rel_y,
    )
}

fn grab<B: SlotCommit>(drag: &mut DragController, board: &B, player: usize, at: PointerPosition) {
    let origin = (at.client_x - 20.0, at.client_y - 20.0);
    let start = drag.begin(player, at, origin, Some(SURFACE), board.slots());
    assert!(matches!(start, DragStart::Started { .. }), "unexpected start {start:?}");
}

#[test]
fn two_players_drop_on_corner_under_opponent_edge() {
    let mut board = Scoreboard::load(MemoryStore::new());
    assert_eq!(board.slot_manager().anchor_of(0), Some(AnchorName::Top));
    assert_eq!(board.slot_manager().anchor_of(1), Some(AnchorName::Bottom));

    let mut drag = DragController::new();
    grab(&mut drag, &board, 0, point(0.5, 0.2));
    let frame = drag.drag_move(point(0.27, 0.72), board.slots()).unwrap();
    assert_eq!(frame.highlight, Some(AnchorName::BottomLeft));

    let outcome = drag.release(point(0.25, 0.75), &mut board).unwrap();
    assert!(outcome.committed);
    assert_eq!(board.slot_manager().anchor_of(0), Some(AnchorName::BottomLeft));
    assert_eq!(board.slot_manager().anchor_of(1), Some(AnchorName::Bottom));
    assert!(!drag.is_dragging());
}

#[test]
fn four_players_swap_left_column() {
    let mut board = Scoreboard::load(MemoryStore::new());
    board.set_player_count(PlayerCount::new(4).unwrap());

    let mut drag = DragController::new();
    grab(&mut drag, &board, 0, point(0.25, 0.25));
    let outcome = drag.release(point(0.2, 0.8), &mut board).unwrap();
    assert!(outcome.committed);

    let slots = board.slot_manager();
    assert_eq!(slots.anchor_of(0), Some(AnchorName::BottomLeft));
    assert_eq!(slots.anchor_of(2), Some(AnchorName::TopLeft));
    assert_eq!(slots.anchor_of(1), Some(AnchorName::TopRight));
    assert_eq!(slots.anchor_of(3), Some(AnchorName::BottomRight));
}

#[test]
fn blocked_edge_falls_back_to_nearest_corner() {
    let mut slots = SlotAssignmentManager::new(PlayerCount::new(3).unwrap());
    assert!(!slots.valid_drop_targets(2).contains(AnchorName::Left));

    let mut drag = DragController::new();
    grab(&mut drag, &slots, 2, point(0.25, 0.75));
    // Near the top end of the left edge, but player 0 holds the top-left
    // corner, so that corner wins and the two players swap.
    let outcome = drag.release(point(0.05, 0.1), &mut slots).unwrap();
    assert_eq!(outcome.target, Some(AnchorName::TopLeft));
    assert_eq!(slots.anchor_of(2), Some(AnchorName::TopLeft));
    assert_eq!(slots.anchor_of(0), Some(AnchorName::BottomLeft));
}

#[test]
fn free_edge_captures_pointer_near_its_end() {
    let mut slots = SlotAssignmentManager::new(PlayerCount::new(2).unwrap());
    // Move player 1 off the bottom edge so the right column is empty.
    assert!(slots.commit(1, AnchorName::BottomLeft));

    let mut drag = DragController::new();
    grab(&mut drag, &slots, 0, point(0.5, 0.1));
    let outcome = drag.release(point(0.95, 0.45), &mut slots).unwrap();
    assert_eq!(outcome.target, Some(AnchorName::Right));
    assert!(outcome.committed);
    assert_eq!(slots.anchor_of(0), Some(AnchorName::Right));
}

#[test]
fn resize_between_press_and_release_uses_press_snapshot() {
    let mut slots = SlotAssignmentManager::new(PlayerCount::new(4).unwrap());
    let mut drag = DragController::new();
    grab(&mut drag, &slots, 3, point(0.75, 0.75));
    // The surface may be re-measured mid drag; the session keeps its own copy.
    let session = drag.session().unwrap();
    assert_eq!(session.surface, SURFACE);
    let outcome = drag.release(point(0.7, 0.3), &mut slots).unwrap();
    assert_eq!(outcome.target, Some(AnchorName::TopRight));
    assert_eq!(slots.anchor_of(3), Some(AnchorName::TopRight));
    assert_eq!(slots.anchor_of(1), Some(AnchorName::BottomRight));
}
