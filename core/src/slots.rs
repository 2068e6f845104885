use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::anchor::{AnchorName, AnchorSet};

pub type PlayerIndex = usize;

pub const MIN_PLAYERS: u8 = 2;
pub const MAX_PLAYERS: u8 = 4;

const DEFAULTS_TWO: &[AnchorName] = &[AnchorName::Top, AnchorName::Bottom];
const DEFAULTS_THREE: &[AnchorName] = &[
    AnchorName::TopLeft,
    AnchorName::TopRight,
    AnchorName::BottomLeft,
];
const DEFAULTS_FOUR: &[AnchorName] = &[
    AnchorName::TopLeft,
    AnchorName::TopRight,
    AnchorName::BottomLeft,
    AnchorName::BottomRight,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PlayerCount(u8);

impl PlayerCount {
    pub const DEFAULT: PlayerCount = PlayerCount(MIN_PLAYERS);

    pub fn new(value: u8) -> Result<Self, PlayerCountError> {
        if (MIN_PLAYERS..=MAX_PLAYERS).contains(&value) {
            Ok(Self(value))
        } else {
            Err(PlayerCountError::OutOfRange { found: value })
        }
    }

    pub fn get(self) -> usize {
        self.0 as usize
    }

    pub fn players(self) -> impl Iterator<Item = PlayerIndex> {
        0..self.get()
    }

    pub fn contains(self, player: PlayerIndex) -> bool {
        player < self.get()
    }

    /// Anchors handed out, in order, to players without one.
    pub fn default_anchors(self) -> &'static [AnchorName] {
        match self.0 {
            2 => DEFAULTS_TWO,
            3 => DEFAULTS_THREE,
            _ => DEFAULTS_FOUR,
        }
    }
}

impl Default for PlayerCount {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u8> for PlayerCount {
    type Error = PlayerCountError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PlayerCount> for u8 {
    fn from(count: PlayerCount) -> Self {
        count.0
    }
}

impl fmt::Display for PlayerCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerCountError {
    OutOfRange { found: u8 },
}

impl fmt::Display for PlayerCountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerCountError::OutOfRange { found } => {
                write!(
                    f,
                    "player count must be between {MIN_PLAYERS} and {MAX_PLAYERS}, got {found}"
                )
            }
        }
    }
}

impl std::error::Error for PlayerCountError {}

/// Player to anchor mapping. Stored as a JSON object keyed by player index.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotAssignment(BTreeMap<PlayerIndex, AnchorName>);

impl SlotAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, player: PlayerIndex) -> Option<AnchorName> {
        self.0.get(&player).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlayerIndex, AnchorName)> + '_ {
        self.0.iter().map(|(player, anchor)| (*player, *anchor))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn occupant(&self, anchor: AnchorName) -> Option<PlayerIndex> {
        self.iter()
            .find(|(_, held)| *held == anchor)
            .map(|(player, _)| player)
    }

    fn insert(&mut self, player: PlayerIndex, anchor: AnchorName) {
        self.0.insert(player, anchor);
    }

    fn clear(&mut self) {
        self.0.clear();
    }
}

impl FromIterator<(PlayerIndex, AnchorName)> for SlotAssignment {
    fn from_iter<I: IntoIterator<Item = (PlayerIndex, AnchorName)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Anything that holds a [`SlotAssignmentManager`] and can apply a drop to it.
/// Implementors that persist state write the new assignment before returning.
pub trait SlotCommit {
    fn slots(&self) -> &SlotAssignmentManager;

    fn commit(&mut self, player: PlayerIndex, target: AnchorName) -> bool;
}

/// Owns the player to anchor mapping. Each seated player holds exactly one
/// anchor and no anchor holds two players.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotAssignmentManager {
    player_count: PlayerCount,
    assignment: SlotAssignment,
}

impl SlotAssignmentManager {
    pub fn new(player_count: PlayerCount) -> Self {
        let mut manager = Self {
            player_count,
            assignment: SlotAssignment::new(),
        };
        manager.ensure_assignments();
        manager
    }

    /// Rebuilds a manager from a stored mapping. Entries out of range or
    /// repeating a lower-indexed player's anchor are dropped before the gaps
    /// are filled from the defaults.
    pub fn restore(player_count: PlayerCount, stored: SlotAssignment) -> Self {
        let mut assignment = SlotAssignment::new();
        for (player, anchor) in stored.iter() {
            if !player_count.contains(player) {
                continue;
            }
            if assignment.occupant(anchor).is_none() {
                assignment.insert(player, anchor);
            }
        }
        let mut manager = Self {
            player_count,
            assignment,
        };
        manager.ensure_assignments();
        manager
    }

    pub fn player_count(&self) -> PlayerCount {
        self.player_count
    }

    pub fn assignment(&self) -> &SlotAssignment {
        &self.assignment
    }

    pub fn anchor_of(&self, player: PlayerIndex) -> Option<AnchorName> {
        self.assignment.get(player)
    }

    /// Player other than `excluding` currently holding `anchor`.
    pub fn occupant(&self, anchor: AnchorName, excluding: PlayerIndex) -> Option<PlayerIndex> {
        self.assignment
            .iter()
            .find(|(player, held)| *player != excluding && *held == anchor)
            .map(|(player, _)| player)
    }

    /// Drops assignments for players no longer in the game. Remaining players
    /// keep their anchors.
    pub fn set_player_count(&mut self, player_count: PlayerCount) -> bool {
        let before = self.assignment.len();
        self.player_count = player_count;
        self.assignment = self
            .assignment
            .iter()
            .filter(|(player, _)| player_count.contains(*player))
            .collect();
        before != self.assignment.len()
    }

    /// Gives every player without an anchor the first default anchor that
    /// does not conflict with anyone else's. When the defaults cannot seat
    /// everybody the whole table is reseated from the defaults.
    pub fn ensure_assignments(&mut self) -> bool {
        let trimmed = self.set_player_count(self.player_count);
        let defaults = self.player_count.default_anchors();
        let mut changed = trimmed;
        let mut stranded = false;
        for player in self.player_count.players() {
            if self.assignment.get(player).is_some() {
                continue;
            }
            let free = defaults
                .iter()
                .copied()
                .find(|anchor| !self.blocked_for_claim(*anchor, player));
            match free {
                Some(anchor) => {
                    self.assignment.insert(player, anchor);
                    changed = true;
                }
                None => stranded = true,
            }
        }
        if stranded {
            self.assignment = self
                .player_count
                .players()
                .zip(defaults.iter().copied())
                .collect();
            changed = true;
        }
        changed
    }

    fn blocked_for_claim(&self, anchor: AnchorName, player: PlayerIndex) -> bool {
        self.assignment
            .iter()
            .any(|(other, held)| other != player && held.conflicts_with(anchor))
    }

    /// Anchors `excluding` could move into without displacing anybody.
    ///
    /// An occupied anchor is never available, and an edge is unavailable as
    /// soon as either of its corners is held. A corner below an occupied edge
    /// stays available: the edge holder keeps its anchor.
    pub fn available_anchors(&self, excluding: PlayerIndex) -> AnchorSet {
        let occupied: AnchorSet = self
            .assignment
            .iter()
            .filter(|(player, _)| *player != excluding)
            .map(|(_, anchor)| anchor)
            .collect();
        let mut available = AnchorSet::all();
        for anchor in AnchorName::ALL {
            if occupied.contains(anchor) {
                available.remove(anchor);
                continue;
            }
            if anchor.is_edge()
                && anchor
                    .contained_corners()
                    .iter()
                    .any(|corner| occupied.contains(corner))
            {
                available.remove(anchor);
            }
        }
        available
    }

    /// Available anchors plus every anchor another player holds (a drop there
    /// swaps the two players).
    pub fn valid_drop_targets(&self, excluding: PlayerIndex) -> AnchorSet {
        let mut targets = self.available_anchors(excluding);
        targets.extend(
            self.assignment
                .iter()
                .filter(|(player, _)| *player != excluding)
                .map(|(_, anchor)| anchor),
        );
        targets
    }

    /// Moves `player` to `target`. A player already at `target` receives the
    /// mover's previous anchor. Returns `false` and changes nothing when the
    /// target is not a valid drop target or is the player's own anchor.
    pub fn commit(&mut self, player: PlayerIndex, target: AnchorName) -> bool {
        if !self.player_count.contains(player) {
            return false;
        }
        let Some(current) = self.assignment.get(player) else {
            return false;
        };
        if current == target || !self.valid_drop_targets(player).contains(target) {
            return false;
        }
        if let Some(other) = self.occupant(target, player) {
            self.assignment.insert(other, current);
        }
        self.assignment.insert(player, target);
        true
    }

    pub fn reset_all(&mut self) {
        self.assignment.clear();
        self.ensure_assignments();
    }
}

impl SlotCommit for SlotAssignmentManager {
    fn slots(&self) -> &SlotAssignmentManager {
        self
    }

    fn commit(&mut self, player: PlayerIndex, target: AnchorName) -> bool {
        SlotAssignmentManager::commit(self, player, target)
    }
}
