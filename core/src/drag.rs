//! Pointer-driven reassignment of tiles to anchors.
//!
//! The controller is a two-state machine. `begin` moves it from idle to
//! dragging, `release` and `cancel` always bring it back to idle. Nothing in
//! here touches the DOM: callers feed viewport coordinates in and apply the
//! returned frames to their tiles.

use crate::anchor::{nearest_anchor, AnchorName, AnchorSet};
use crate::layout::{PlaySurfaceRect, TileGeometry};
use crate::slots::{PlayerIndex, SlotAssignmentManager, SlotCommit};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerPosition {
    pub client_x: f64,
    pub client_y: f64,
}

impl PointerPosition {
    pub fn new(client_x: f64, client_y: f64) -> Self {
        Self { client_x, client_y }
    }
}

/// State captured when a drag starts and kept until it ends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragSession {
    pub player: PlayerIndex,
    pub offset_x: f64,
    pub offset_y: f64,
    pub surface: PlaySurfaceRect,
}

impl DragSession {
    fn fraction(&self, pointer: PointerPosition) -> (f64, f64) {
        self.surface.to_fraction(pointer.client_x, pointer.client_y)
    }

    /// Anchors the dragged player may land on: every valid drop target plus
    /// the anchor it already holds.
    fn candidates(&self, slots: &SlotAssignmentManager) -> AnchorSet {
        let mut candidates = slots.valid_drop_targets(self.player);
        if let Some(own) = slots.anchor_of(self.player) {
            candidates.insert(own);
        }
        candidates
    }

    fn resolve(&self, pointer: PointerPosition, slots: &SlotAssignmentManager) -> Option<AnchorName> {
        let (rel_x, rel_y) = self.fraction(pointer);
        nearest_anchor(rel_x, rel_y, self.candidates(slots))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DragStart {
    /// Drag is live; `active` marks every anchor the tile may be dropped on.
    Started { active: AnchorSet },
    /// Another drag is already in progress.
    Busy,
    /// The play surface has no size yet.
    SurfaceUnmeasured,
    /// The player has no anchor to drag from.
    NotSeated,
}

/// What a single pointer move should do to the screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragFrame {
    /// Tile position relative to the play surface origin.
    pub tile_left: f64,
    pub tile_top: f64,
    pub highlight: Option<AnchorName>,
    pub preview: Option<TileGeometry>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DropOutcome {
    pub player: PlayerIndex,
    pub target: Option<AnchorName>,
    pub committed: bool,
}

#[derive(Clone, Debug, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    pub fn session(&self) -> Option<DragSession> {
        match self.state {
            DragState::Dragging(session) => Some(session),
            DragState::Idle => None,
        }
    }

    /// Starts dragging `player`'s tile. `tile_origin` is the tile's top-left
    /// corner in viewport coordinates at the moment of the press.
    pub fn begin(
        &mut self,
        player: PlayerIndex,
        pointer: PointerPosition,
        tile_origin: (f64, f64),
        surface: Option<PlaySurfaceRect>,
        slots: &SlotAssignmentManager,
    ) -> DragStart {
        if self.is_dragging() {
            return DragStart::Busy;
        }
        let Some(surface) = surface.filter(PlaySurfaceRect::is_measured) else {
            return DragStart::SurfaceUnmeasured;
        };
        if slots.anchor_of(player).is_none() {
            return DragStart::NotSeated;
        }
        let session = DragSession {
            player,
            offset_x: pointer.client_x - tile_origin.0,
            offset_y: pointer.client_y - tile_origin.1,
            surface,
        };
        let active = session.candidates(slots);
        self.state = DragState::Dragging(session);
        DragStart::Started { active }
    }

    pub fn drag_move(
        &self,
        pointer: PointerPosition,
        slots: &SlotAssignmentManager,
    ) -> Option<DragFrame> {
        let session = self.session()?;
        let highlight = session.resolve(pointer, slots);
        Some(DragFrame {
            tile_left: pointer.client_x - session.surface.left - session.offset_x,
            tile_top: pointer.client_y - session.surface.top - session.offset_y,
            highlight,
            preview: highlight.map(|anchor| TileGeometry::for_anchor(anchor, &session.surface)),
        })
    }

    /// Ends the drag at `pointer`, committing the nearest valid anchor. The
    /// controller is idle afterwards whether or not anything was committed.
    pub fn release<B>(&mut self, pointer: PointerPosition, board: &mut B) -> Option<DropOutcome>
    where
        B: SlotCommit + ?Sized,
    {
        let session = self.session()?;
        self.state = DragState::Idle;
        let target = session.resolve(pointer, board.slots());
        let committed = match target {
            Some(anchor) if session.candidates(board.slots()).contains(anchor) => {
                board.commit(session.player, anchor)
            }
            _ => false,
        };
        Some(DropOutcome {
            player: session.player,
            target,
            committed,
        })
    }

    /// Abandons the drag without touching any assignment.
    pub fn cancel(&mut self) -> Option<DragSession> {
        let session = self.session();
        self.state = DragState::Idle;
        session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slots::PlayerCount;
    use AnchorName::*;

    fn surface() -> PlaySurfaceRect {
        PlaySurfaceRect::new(0.0, 0.0, 1000.0, 1000.0)
    }

    fn slots(count: u8) -> SlotAssignmentManager {
        SlotAssignmentManager::new(PlayerCount::new(count).unwrap())
    }

    fn at(x: f64, y: f64) -> PointerPosition {
        PointerPosition::new(x, y)
    }

    #[test]
    fn begin_requires_measured_surface() {
        let slots = slots(2);
        let mut drag = DragController::new();
        let start = drag.begin(0, at(10.0, 10.0), (0.0, 0.0), None, &slots);
        assert_eq!(start, DragStart::SurfaceUnmeasured);
        let empty = Some(PlaySurfaceRect::default());
        let start = drag.begin(0, at(10.0, 10.0), (0.0, 0.0), empty, &slots);
        assert_eq!(start, DragStart::SurfaceUnmeasured);
        assert_eq!(drag.state(), DragState::Idle);
    }

    #[test]
    fn second_press_while_dragging_is_ignored() {
        let slots = slots(2);
        let mut drag = DragController::new();
        assert!(matches!(
            drag.begin(0, at(500.0, 100.0), (15.0, 15.0), Some(surface()), &slots),
            DragStart::Started { .. }
        ));
        let start = drag.begin(1, at(500.0, 900.0), (15.0, 515.0), Some(surface()), &slots);
        assert_eq!(start, DragStart::Busy);
        assert_eq!(drag.session().map(|s| s.player), Some(0));
    }

    #[test]
    fn started_drag_marks_targets_and_own_anchor() {
        let slots = slots(2);
        let mut drag = DragController::new();
        let start = drag.begin(0, at(500.0, 100.0), (15.0, 15.0), Some(surface()), &slots);
        let DragStart::Started { active } = start else {
            panic!("drag did not start: {start:?}");
        };
        assert!(active.contains(Top));
        assert!(active.contains(Bottom));
        assert!(active.contains(BottomLeft));
    }

    #[test]
    fn tile_follows_pointer_with_captured_offset() {
        let slots = slots(2);
        let surface = PlaySurfaceRect::new(100.0, 50.0, 1000.0, 1000.0);
        let mut drag = DragController::new();
        drag.begin(0, at(400.0, 120.0), (115.0, 65.0), Some(surface), &slots);
        let frame = drag.drag_move(at(450.0, 300.0), &slots).unwrap();
        // Offset inside the tile is (285, 55).
        assert_eq!(frame.tile_left, 65.0);
        assert_eq!(frame.tile_top, 195.0);
    }

    #[test]
    fn move_highlights_only_the_nearest_anchor() {
        let slots = slots(2);
        let mut drag = DragController::new();
        drag.begin(0, at(500.0, 100.0), (15.0, 15.0), Some(surface()), &slots);
        let frame = drag.drag_move(at(760.0, 740.0), &slots).unwrap();
        assert_eq!(frame.highlight, Some(BottomRight));
        let preview = frame.preview.unwrap();
        assert_eq!(preview.left, 515.0);
        assert_eq!(preview.top, 515.0);
    }

    #[test]
    fn release_on_free_corner_assigns() {
        let mut slots = slots(2);
        let mut drag = DragController::new();
        drag.begin(0, at(500.0, 100.0), (15.0, 15.0), Some(surface()), &slots);
        let outcome = drag.release(at(250.0, 750.0), &mut slots).unwrap();
        assert!(outcome.committed);
        assert_eq!(outcome.target, Some(BottomLeft));
        assert_eq!(slots.anchor_of(0), Some(BottomLeft));
        assert_eq!(slots.anchor_of(1), Some(Bottom));
        assert!(!drag.is_dragging());
    }

    #[test]
    fn release_near_own_anchor_changes_nothing() {
        let mut slots = slots(2);
        let before = slots.clone();
        let mut drag = DragController::new();
        drag.begin(0, at(500.0, 100.0), (15.0, 15.0), Some(surface()), &slots);
        let outcome = drag.release(at(500.0, 60.0), &mut slots).unwrap();
        assert_eq!(outcome.target, Some(Top));
        assert!(!outcome.committed);
        assert_eq!(slots, before);
        assert_eq!(drag.state(), DragState::Idle);
    }

    #[test]
    fn release_while_idle_is_a_no_op() {
        let mut slots = slots(2);
        let mut drag = DragController::new();
        assert!(drag.release(at(0.0, 0.0), &mut slots).is_none());
        assert!(drag.drag_move(at(0.0, 0.0), &slots).is_none());
    }

    #[test]
    fn cancel_returns_to_idle_without_commit() {
        let slots = slots(4);
        let mut drag = DragController::new();
        drag.begin(3, at(700.0, 700.0), (515.0, 515.0), Some(surface()), &slots);
        let session = drag.cancel().unwrap();
        assert_eq!(session.player, 3);
        assert!(!drag.is_dragging());
    }

    #[test]
    fn surface_snapshot_is_kept_for_the_whole_drag() {
        let mut slots = slots(4);
        let mut drag = DragController::new();
        drag.begin(0, at(250.0, 250.0), (15.0, 15.0), Some(surface()), &slots);
        // Fractions are measured against the rect captured at the press, so a
        // release at (750, 250) lands on top-right and swaps with player 1.
        let outcome = drag.release(at(750.0, 250.0), &mut slots).unwrap();
        assert!(outcome.committed);
        assert_eq!(slots.anchor_of(0), Some(TopRight));
        assert_eq!(slots.anchor_of(1), Some(TopLeft));
    }
}
