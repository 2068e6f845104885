use std::cell::RefCell;
use std::collections::BTreeMap;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::anchor::AnchorName;
use crate::slots::{PlayerCount, PlayerIndex, SlotAssignment};

pub const PLAYER_COUNT_KEY: &str = "playerCount";
pub const SCORES_KEY: &str = "scores";
pub const NAMES_KEY: &str = "names";
pub const LEGENDS_KEY: &str = "legends";
pub const SLOT_ASSIGNMENTS_KEY: &str = "slotAssignments";
pub const COLLAPSED_SETS_KEY: &str = "collapsedSets";

pub type Scores = BTreeMap<PlayerIndex, u32>;
pub type Names = BTreeMap<PlayerIndex, String>;
pub type Legends = BTreeMap<PlayerIndex, String>;
pub type CollapsedSets = BTreeMap<String, bool>;

/// String key to JSON text store that survives a reload.
///
/// Writes are fire-and-forget: a backend that cannot store a value reports it
/// itself and the in-memory state stays authoritative.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str);
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RefCell::new(
                entries
                    .into_iter()
                    .map(|(key, value)| (key.into(), value.into()))
                    .collect(),
            ),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) {
        (**self).set(key, value)
    }
}

/// Reads and decodes `key`. Absent, empty and malformed values all come back
/// as `None`.
pub fn read_json<T, S>(store: &S, key: &str) -> Option<T>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let raw = store.get(key)?;
    if raw.trim().is_empty() {
        return None;
    }
    serde_json::from_str(&raw).ok()
}

/// Reads a JSON object stored under `key` one entry at a time. Entries whose
/// key or value does not decode are skipped and the rest are kept.
pub fn read_entries<K, V, S>(store: &S, key: &str) -> BTreeMap<K, V>
where
    K: FromStr + Ord,
    V: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let Some(object) = read_json::<Map<String, Value>, S>(store, key) else {
        return BTreeMap::new();
    };
    object
        .into_iter()
        .filter_map(|(raw_key, value)| {
            let key = raw_key.parse().ok()?;
            let value = serde_json::from_value(value).ok()?;
            Some((key, value))
        })
        .collect()
}

pub fn write_json<T, S>(store: &S, key: &str, value: &T)
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    if let Ok(raw) = serde_json::to_string(value) {
        store.set(key, &raw);
    }
}

/// Everything the scoreboard keeps across reloads.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PersistedState {
    pub player_count: PlayerCount,
    pub scores: Scores,
    pub names: Names,
    pub legends: Legends,
    pub slot_assignments: SlotAssignment,
    pub collapsed_sets: CollapsedSets,
}

impl PersistedState {
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        Self {
            player_count: read_json(store, PLAYER_COUNT_KEY).unwrap_or_default(),
            scores: read_entries(store, SCORES_KEY),
            names: read_entries(store, NAMES_KEY),
            legends: read_entries(store, LEGENDS_KEY),
            slot_assignments: read_entries::<PlayerIndex, AnchorName, S>(store, SLOT_ASSIGNMENTS_KEY)
                .into_iter()
                .collect(),
            collapsed_sets: read_entries(store, COLLAPSED_SETS_KEY),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_store_loads_defaults() {
        let state = PersistedState::load(&MemoryStore::new());
        assert_eq!(state, PersistedState::default());
        assert_eq!(state.player_count.get(), 2);
    }

    #[test]
    fn malformed_keys_fall_back_independently() {
        let store = MemoryStore::with_entries([
            (PLAYER_COUNT_KEY, "7"),
            (SCORES_KEY, "{\"0\": 3, \"1\": 12}"),
            (NAMES_KEY, "not json"),
            (LEGENDS_KEY, ""),
            (SLOT_ASSIGNMENTS_KEY, "{\"0\": \"middle\"}"),
            (COLLAPSED_SETS_KEY, "null"),
        ]);
        let state = PersistedState::load(&store);
        assert_eq!(state.player_count, PlayerCount::DEFAULT);
        assert_eq!(state.scores.get(&0), Some(&3));
        assert_eq!(state.scores.get(&1), Some(&12));
        assert!(state.names.is_empty());
        assert!(state.legends.is_empty());
        assert!(state.slot_assignments.is_empty());
        assert!(state.collapsed_sets.is_empty());
    }

    #[test]
    fn bad_entries_are_dropped_one_at_a_time() {
        let store = MemoryStore::with_entries([
            (SCORES_KEY, r#"{"0": 3, "1": -2, "2": "x", "three": 4}"#),
            (SLOT_ASSIGNMENTS_KEY, r#"{"0": "middle", "1": "bottom"}"#),
            (NAMES_KEY, r#"{"0": "Jinx", "1": 5}"#),
        ]);
        let state = PersistedState::load(&store);
        assert_eq!(state.scores.len(), 1);
        assert_eq!(state.scores.get(&0), Some(&3));
        assert_eq!(state.slot_assignments.get(0), None);
        assert_eq!(state.slot_assignments.get(1), Some(AnchorName::Bottom));
        assert_eq!(state.names.get(&0).map(String::as_str), Some("Jinx"));
        assert_eq!(state.names.len(), 1);
    }

    #[test]
    fn written_keys_load_back() {
        let store = MemoryStore::new();
        let mut state = PersistedState {
            player_count: PlayerCount::new(3).unwrap(),
            ..PersistedState::default()
        };
        state.scores.insert(2, 9);
        state.names.insert(0, "Ahri".to_string());
        state.legends.insert(1, "https://cdn.example/jinx.png".to_string());
        state.slot_assignments = [(0, AnchorName::Left), (1, AnchorName::TopRight)]
            .into_iter()
            .collect();
        state.collapsed_sets.insert("OGN".to_string(), true);
        write_json(&store, PLAYER_COUNT_KEY, &state.player_count);
        write_json(&store, SCORES_KEY, &state.scores);
        write_json(&store, NAMES_KEY, &state.names);
        write_json(&store, LEGENDS_KEY, &state.legends);
        write_json(&store, SLOT_ASSIGNMENTS_KEY, &state.slot_assignments);
        write_json(&store, COLLAPSED_SETS_KEY, &state.collapsed_sets);

        assert_eq!(store.get(PLAYER_COUNT_KEY).as_deref(), Some("3"));
        assert_eq!(
            store.get(SLOT_ASSIGNMENTS_KEY).as_deref(),
            Some(r#"{"0":"left","1":"top-right"}"#)
        );
        assert_eq!(PersistedState::load(&store), state);
    }
}
