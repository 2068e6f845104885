pub mod anchor;
pub mod catalog_cache;
pub mod drag;
pub mod layout;
pub mod legend;
pub mod persist;
pub mod scoreboard;
pub mod slots;

pub use anchor::{nearest_anchor, AnchorConfig, AnchorName, AnchorSet, Rotation, ANCHOR_COUNT};
pub use catalog_cache::CatalogCache;
pub use drag::{DragController, DragFrame, DragSession, DragStart, DragState, DropOutcome, PointerPosition};
pub use layout::{LayoutRenderer, PlaySurfaceRect, TileGeometry, TilePlacement, TILE_PADDING_PX};
pub use legend::{prepare_catalog, set_display_name, LegendRecord, LegendSet, EXCLUDED_RARITY};
pub use persist::{KeyValueStore, MemoryStore, PersistedState};
pub use scoreboard::Scoreboard;
pub use slots::{
    PlayerCount, PlayerCountError, PlayerIndex, SlotAssignment, SlotAssignmentManager, SlotCommit,
    MAX_PLAYERS, MIN_PLAYERS,
};
