use rand::Rng;

use crate::anchor::AnchorName;
use crate::legend::toggle_collapsed;
use crate::persist::{
    write_json, CollapsedSets, KeyValueStore, Legends, Names, PersistedState, Scores,
    COLLAPSED_SETS_KEY, LEGENDS_KEY, NAMES_KEY, PLAYER_COUNT_KEY, SCORES_KEY,
    SLOT_ASSIGNMENTS_KEY,
};
use crate::slots::{PlayerCount, PlayerIndex, SlotAssignmentManager, SlotCommit};

pub const NAME_MAX_CHARS: usize = 20;

/// The whole game in progress. Every mutation is written through to the
/// store before the method returns.
pub struct Scoreboard<S: KeyValueStore> {
    store: S,
    scores: Scores,
    names: Names,
    legends: Legends,
    collapsed_sets: CollapsedSets,
    slots: SlotAssignmentManager,
}

impl<S: KeyValueStore> Scoreboard<S> {
    pub fn load(store: S) -> Self {
        let state = PersistedState::load(&store);
        let slots = SlotAssignmentManager::restore(state.player_count, state.slot_assignments.clone());
        let board = Self {
            store,
            scores: state.scores,
            names: state.names,
            legends: state.legends,
            collapsed_sets: state.collapsed_sets,
            slots,
        };
        if board.slots.assignment() != &state.slot_assignments {
            board.save_slots();
        }
        board
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn player_count(&self) -> PlayerCount {
        self.slots.player_count()
    }

    pub fn slot_manager(&self) -> &SlotAssignmentManager {
        &self.slots
    }

    pub fn score(&self, player: PlayerIndex) -> u32 {
        self.scores.get(&player).copied().unwrap_or(0)
    }

    pub fn name(&self, player: PlayerIndex) -> Option<&str> {
        self.names.get(&player).map(String::as_str)
    }

    pub fn display_name(&self, player: PlayerIndex) -> String {
        self.name(player)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Player {}", player + 1))
    }

    pub fn legend(&self, player: PlayerIndex) -> Option<&str> {
        self.legends.get(&player).map(String::as_str)
    }

    pub fn collapsed_sets(&self) -> &CollapsedSets {
        &self.collapsed_sets
    }

    pub fn is_set_collapsed(&self, set_name: &str) -> bool {
        self.collapsed_sets.get(set_name).copied().unwrap_or(false)
    }

    /// Adds `delta` to the player's score. Changes that would drop the score
    /// below zero are ignored.
    pub fn change_score(&mut self, player: PlayerIndex, delta: i32) -> bool {
        if !self.player_count().contains(player) {
            return false;
        }
        let Some(next) = self.score(player).checked_add_signed(delta) else {
            return false;
        };
        self.scores.insert(player, next);
        write_json(&self.store, SCORES_KEY, &self.scores);
        true
    }

    /// Stores a trimmed name. Blank input keeps the previous name.
    pub fn set_name(&mut self, player: PlayerIndex, raw: &str) -> bool {
        let trimmed: String = raw.trim().chars().take(NAME_MAX_CHARS).collect();
        let trimmed = trimmed.trim_end();
        if trimmed.is_empty() || !self.player_count().contains(player) {
            return false;
        }
        if self.name(player) == Some(trimmed) {
            return false;
        }
        self.names.insert(player, trimmed.to_string());
        write_json(&self.store, NAMES_KEY, &self.names);
        true
    }

    pub fn set_legend(&mut self, player: PlayerIndex, photo_url: &str) -> bool {
        if !self.player_count().contains(player) {
            return false;
        }
        self.legends.insert(player, photo_url.to_string());
        write_json(&self.store, LEGENDS_KEY, &self.legends);
        true
    }

    /// Switches to `count` players and reseats everyone from the defaults.
    /// Choosing the current count does nothing.
    pub fn set_player_count(&mut self, count: PlayerCount) -> bool {
        if count == self.player_count() {
            return false;
        }
        self.slots.set_player_count(count);
        self.slots.reset_all();
        write_json(&self.store, PLAYER_COUNT_KEY, &count);
        self.save_slots();
        true
    }

    pub fn toggle_set_collapsed(&mut self, set_name: &str) -> bool {
        let collapsed = toggle_collapsed(&mut self.collapsed_sets, set_name);
        write_json(&self.store, COLLAPSED_SETS_KEY, &self.collapsed_sets);
        collapsed
    }

    pub fn reset_scores(&mut self) {
        self.scores.clear();
        write_json(&self.store, SCORES_KEY, &self.scores);
    }

    /// Clears scores, names, legends and seating. The player count and the
    /// picker's collapsed sets survive.
    pub fn reset_all(&mut self) {
        self.scores.clear();
        self.names.clear();
        self.legends.clear();
        write_json(&self.store, SCORES_KEY, &self.scores);
        write_json(&self.store, NAMES_KEY, &self.names);
        write_json(&self.store, LEGENDS_KEY, &self.legends);
        self.slots.reset_all();
        self.save_slots();
    }

    pub fn pick_random_player<R: Rng + ?Sized>(&self, rng: &mut R) -> PlayerIndex {
        rng.random_range(0..self.player_count().get())
    }

    fn save_slots(&self) {
        write_json(&self.store, SLOT_ASSIGNMENTS_KEY, self.slots.assignment());
    }
}

impl<S: KeyValueStore> SlotCommit for Scoreboard<S> {
    fn slots(&self) -> &SlotAssignmentManager {
        &self.slots
    }

    fn commit(&mut self, player: PlayerIndex, target: AnchorName) -> bool {
        let committed = self.slots.commit(player, target);
        if committed {
            self.save_slots();
        }
        committed
    }
}
