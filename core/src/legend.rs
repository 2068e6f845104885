use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::persist::CollapsedSets;

/// Rarity hidden from the picker.
pub const EXCLUDED_RARITY: &str = "Showcase";

/// Set codes shown under a friendlier label.
pub const SET_LABELS: &[(&str, &str)] = &[("SFD", "Spiritforged")];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendRecord {
    pub name: String,
    pub photo_url: String,
    pub rarity: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub set_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegendSet {
    pub set_name: String,
    pub records: Vec<LegendRecord>,
}

impl LegendSet {
    pub fn label(&self) -> &str {
        set_display_name(&self.set_name)
    }
}

pub fn set_display_name(set_name: &str) -> &str {
    SET_LABELS
        .iter()
        .find(|(code, _)| *code == set_name)
        .map(|(_, label)| *label)
        .unwrap_or(set_name)
}

/// Builds the picker's view of the catalog: excluded rarity dropped, one
/// record per photo URL (the first seen wins), grouped by set in encounter
/// order, and the groups reversed so the newest set comes first.
pub fn prepare_catalog(records: &[LegendRecord]) -> Vec<LegendSet> {
    let mut seen_urls = HashSet::new();
    let mut sets: Vec<LegendSet> = Vec::new();
    for record in records {
        if record.rarity.as_deref() == Some(EXCLUDED_RARITY) {
            continue;
        }
        if !seen_urls.insert(record.photo_url.as_str()) {
            continue;
        }
        let set_name = record.set_name.clone().unwrap_or_default();
        match sets.iter_mut().find(|set| set.set_name == set_name) {
            Some(set) => set.records.push(record.clone()),
            None => sets.push(LegendSet {
                set_name,
                records: vec![record.clone()],
            }),
        }
    }
    sets.reverse();
    sets
}

/// Flips a set between collapsed and expanded. Expanded sets are removed from
/// the map rather than stored as `false`. Returns the new collapsed state.
pub fn toggle_collapsed(collapsed: &mut CollapsedSets, set_name: &str) -> bool {
    if collapsed.get(set_name).copied().unwrap_or(false) {
        collapsed.remove(set_name);
        false
    } else {
        collapsed.insert(set_name.to_string(), true);
        true
    }
}
