use std::fmt;

use serde::{Deserialize, Serialize};

pub const ANCHOR_COUNT: usize = 8;

/// Bias applied to edge anchors when picking the point a pointer is measured
/// against. Left/top edges pull toward their outer side, right/bottom mirror it.
pub const EDGE_NEAR_BIAS: f64 = 0.15;
pub const EDGE_FAR_BIAS: f64 = 0.85;

/// One of the eight named regions of the play surface a tile can occupy.
///
/// Declaration order is significant: it is the iteration order of
/// [`AnchorSet`] and therefore the tie-break order of nearest-anchor
/// resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnchorName {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Left,
    Right,
    Top,
    Bottom,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    #[default]
    Upright,
    Quarter,
    Half,
    ThreeQuarter,
}

impl Rotation {
    pub fn css_class(self) -> &'static str {
        match self {
            Rotation::Upright => "",
            Rotation::Quarter => "rotate-90",
            Rotation::Half => "rotate-180",
            Rotation::ThreeQuarter => "rotate-270",
        }
    }
}

/// Fractional rectangle of the play surface plus the rotation a tile placed
/// there is drawn with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnchorConfig {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: Rotation,
}

impl AnchorConfig {
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    pub fn contains(&self, other: &AnchorConfig) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.x + other.width <= self.x + self.width
            && other.y + other.height <= self.y + self.height
    }
}

const fn config(x: f64, y: f64, width: f64, height: f64, rotation: Rotation) -> AnchorConfig {
    AnchorConfig {
        x,
        y,
        width,
        height,
        rotation,
    }
}

// Indexed by `AnchorName as usize`.
const ANCHOR_CONFIGS: [AnchorConfig; ANCHOR_COUNT] = [
    config(0.0, 0.0, 0.5, 0.5, Rotation::Half),
    config(0.5, 0.0, 0.5, 0.5, Rotation::Half),
    config(0.0, 0.5, 0.5, 0.5, Rotation::Upright),
    config(0.5, 0.5, 0.5, 0.5, Rotation::Upright),
    config(0.0, 0.0, 0.5, 1.0, Rotation::Quarter),
    config(0.5, 0.0, 0.5, 1.0, Rotation::ThreeQuarter),
    config(0.0, 0.0, 1.0, 0.5, Rotation::Half),
    config(0.0, 0.5, 1.0, 0.5, Rotation::Upright),
];

impl AnchorName {
    pub const ALL: [AnchorName; ANCHOR_COUNT] = [
        AnchorName::TopLeft,
        AnchorName::TopRight,
        AnchorName::BottomLeft,
        AnchorName::BottomRight,
        AnchorName::Left,
        AnchorName::Right,
        AnchorName::Top,
        AnchorName::Bottom,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn config(self) -> &'static AnchorConfig {
        &ANCHOR_CONFIGS[self.index()]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AnchorName::TopLeft => "top-left",
            AnchorName::TopRight => "top-right",
            AnchorName::BottomLeft => "bottom-left",
            AnchorName::BottomRight => "bottom-right",
            AnchorName::Left => "left",
            AnchorName::Right => "right",
            AnchorName::Top => "top",
            AnchorName::Bottom => "bottom",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|anchor| anchor.as_str() == trimmed)
    }

    pub fn is_edge(self) -> bool {
        matches!(
            self,
            AnchorName::Left | AnchorName::Right | AnchorName::Top | AnchorName::Bottom
        )
    }

    pub fn is_corner(self) -> bool {
        !self.is_edge()
    }

    /// Corners whose quadrant lies inside this anchor. Empty for corners.
    pub fn contained_corners(self) -> AnchorSet {
        let outer = self.config();
        Self::ALL
            .into_iter()
            .filter(|other| *other != self && other.is_corner() && outer.contains(other.config()))
            .collect()
    }

    /// Edges that contain this anchor. Empty for edges.
    pub fn containing_edges(self) -> AnchorSet {
        let inner = self.config();
        Self::ALL
            .into_iter()
            .filter(|other| *other != self && other.is_edge() && other.config().contains(inner))
            .collect()
    }

    /// Two anchors conflict when they are the same region or one contains the other.
    pub fn conflicts_with(self, other: AnchorName) -> bool {
        self == other
            || self.contained_corners().contains(other)
            || other.contained_corners().contains(self)
    }

    /// Point a pointer position is measured against when resolving the
    /// nearest anchor.
    pub fn representative_point(self) -> (f64, f64) {
        let config = self.config();
        let (center_x, center_y) = config.center();
        match self {
            AnchorName::Left => (config.x + config.width * EDGE_NEAR_BIAS, center_y),
            AnchorName::Right => (config.x + config.width * EDGE_FAR_BIAS, center_y),
            AnchorName::Top => (center_x, config.y + config.height * EDGE_NEAR_BIAS),
            AnchorName::Bottom => (center_x, config.y + config.height * EDGE_FAR_BIAS),
            _ => (center_x, center_y),
        }
    }
}

impl fmt::Display for AnchorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Small fixed-capacity set of anchors. Iterates in declaration order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct AnchorSet(u8);

impl AnchorSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn all() -> Self {
        Self(u8::MAX)
    }

    pub fn contains(&self, anchor: AnchorName) -> bool {
        self.0 & (1 << anchor.index()) != 0
    }

    pub fn insert(&mut self, anchor: AnchorName) {
        self.0 |= 1 << anchor.index();
    }

    pub fn remove(&mut self, anchor: AnchorName) {
        self.0 &= !(1 << anchor.index());
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = AnchorName> + '_ {
        AnchorName::ALL
            .into_iter()
            .filter(move |anchor| self.contains(*anchor))
    }
}

impl FromIterator<AnchorName> for AnchorSet {
    fn from_iter<I: IntoIterator<Item = AnchorName>>(iter: I) -> Self {
        let mut set = AnchorSet::empty();
        for anchor in iter {
            set.insert(anchor);
        }
        set
    }
}

impl Extend<AnchorName> for AnchorSet {
    fn extend<I: IntoIterator<Item = AnchorName>>(&mut self, iter: I) {
        for anchor in iter {
            self.insert(anchor);
        }
    }
}

/// Anchor in `candidates` whose representative point is nearest to the
/// fractional position `(rel_x, rel_y)`. Ties keep the first anchor in
/// declaration order.
pub fn nearest_anchor(rel_x: f64, rel_y: f64, candidates: AnchorSet) -> Option<AnchorName> {
    let mut closest = None;
    let mut min_distance = f64::INFINITY;
    for anchor in candidates.iter() {
        let (point_x, point_y) = anchor.representative_point();
        let distance = (point_x - rel_x).hypot(point_y - rel_y);
        if distance < min_distance {
            min_distance = distance;
            closest = Some(anchor);
        }
    }
    closest
}
