use crate::anchor::{AnchorName, Rotation};
use crate::slots::{PlayerIndex, SlotAssignmentManager};

/// Gap kept between a tile and the edges of its anchor region, in pixels.
pub const TILE_PADDING_PX: f64 = 15.0;

/// Absolute pixel bounds of the play surface, in viewport coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlaySurfaceRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PlaySurfaceRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// A surface that has not been laid out yet reports zero size.
    pub fn is_measured(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Viewport point as a fraction of the surface.
    pub fn to_fraction(&self, client_x: f64, client_y: f64) -> (f64, f64) {
        (
            (client_x - self.left) / self.width,
            (client_y - self.top) / self.height,
        )
    }
}

/// Placement of one tile relative to the play surface's top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileGeometry {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: Rotation,
}

impl TileGeometry {
    pub fn for_anchor(anchor: AnchorName, surface: &PlaySurfaceRect) -> Self {
        let config = anchor.config();
        let width = surface.width * config.width - TILE_PADDING_PX * 2.0;
        let height = surface.height * config.height - TILE_PADDING_PX * 2.0;
        Self {
            left: surface.width * config.x + TILE_PADDING_PX,
            top: surface.height * config.y + TILE_PADDING_PX,
            width: width.max(0.0),
            height: height.max(0.0),
            rotation: config.rotation,
        }
    }

    pub fn style(&self) -> String {
        format!(
            "left: {:.2}px; top: {:.2}px; width: {:.2}px; height: {:.2}px;",
            self.left, self.top, self.width, self.height
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TilePlacement {
    pub player: PlayerIndex,
    pub anchor: AnchorName,
    pub geometry: TileGeometry,
}

/// Holds the last measured play surface and turns slot assignments into
/// tile geometry.
#[derive(Clone, Debug, Default)]
pub struct LayoutRenderer {
    surface: Option<PlaySurfaceRect>,
}

impl LayoutRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a fresh measurement. Unmeasured rects clear the surface.
    pub fn measure(&mut self, rect: PlaySurfaceRect) {
        self.surface = rect.is_measured().then_some(rect);
    }

    pub fn surface(&self) -> Option<PlaySurfaceRect> {
        self.surface
    }

    /// Geometry for every seated player, in player order. Empty until the
    /// surface has been measured.
    pub fn position_all(&self, slots: &SlotAssignmentManager) -> Vec<TilePlacement> {
        let Some(surface) = self.surface else {
            return Vec::new();
        };
        slots
            .player_count()
            .players()
            .filter_map(|player| {
                let anchor = slots.anchor_of(player)?;
                Some(TilePlacement {
                    player,
                    anchor,
                    geometry: TileGeometry::for_anchor(anchor, &surface),
                })
            })
            .collect()
    }
}
