use riftbound_core::KeyValueStore;
use web_sys::Storage;

/// `window.localStorage`, looked up on every access. A page with storage
/// disabled reads as empty and drops writes.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct LocalStorageStore;

impl LocalStorageStore {
    fn storage() -> Option<Storage> {
        web_sys::window().and_then(|window| window.local_storage().ok().flatten())
    }
}

impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> Option<String> {
        let storage = Self::storage()?;
        storage.get_item(key).ok()?
    }

    fn set(&self, key: &str, value: &str) {
        let Some(storage) = Self::storage() else {
            #[cfg(target_arch = "wasm32")]
            {
                gloo::console::warn!("storage: localStorage unavailable, dropping", key.to_string());
            }
            return;
        };
        if storage.set_item(key, value).is_err() {
            #[cfg(target_arch = "wasm32")]
            {
                gloo::console::warn!("storage: write failed", key.to_string());
            }
        }
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use riftbound_core::{AnchorName, PersistedState, Scoreboard, SlotCommit};
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn clear() {
        if let Some(storage) = LocalStorageStore::storage() {
            let _ = storage.clear();
        }
    }

    #[wasm_bindgen_test]
    fn values_survive_a_fresh_handle() {
        clear();
        LocalStorageStore.set("playerCount", "3");
        assert_eq!(LocalStorageStore.get("playerCount").as_deref(), Some("3"));
        assert_eq!(LocalStorageStore.get("missing"), None);
    }

    #[wasm_bindgen_test]
    fn scoreboard_reloads_from_local_storage() {
        clear();
        let mut board = Scoreboard::load(LocalStorageStore);
        board.change_score(1, 3);
        board.set_name(0, "Ahri");
        assert!(board.commit(0, AnchorName::BottomLeft));

        let state = PersistedState::load(&LocalStorageStore);
        assert_eq!(state.scores.get(&1), Some(&3));
        assert_eq!(state.names.get(&0).map(String::as_str), Some("Ahri"));
        assert_eq!(state.slot_assignments.get(0), Some(AnchorName::BottomLeft));
        clear();
    }

    #[wasm_bindgen_test]
    fn malformed_values_fall_back_to_defaults() {
        clear();
        LocalStorageStore.set("scores", "{not json");
        LocalStorageStore.set("playerCount", "9");
        let state = PersistedState::load(&LocalStorageStore);
        assert!(state.scores.is_empty());
        assert_eq!(state.player_count.get(), 2);
        clear();
    }
}
