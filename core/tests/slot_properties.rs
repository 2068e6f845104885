use proptest::prelude::*;
use riftbound_core::{AnchorName, PlayerCount, SlotAssignmentManager};

fn anchor_strategy() -> impl Strategy<Value = AnchorName> {
    (0..AnchorName::ALL.len()).prop_map(|index| AnchorName::ALL[index])
}

fn count_strategy() -> impl Strategy<Value = PlayerCount> {
    (2u8..=4).prop_map(|value| PlayerCount::new(value).unwrap())
}

fn moves_strategy() -> impl Strategy<Value = Vec<(usize, AnchorName)>> {
    prop::collection::vec((0usize..4, anchor_strategy()), 0..24)
}

fn assert_seated(slots: &SlotAssignmentManager) {
    let count = slots.player_count().get();
    let mut held = Vec::new();
    for player in 0..count {
        let anchor = slots.anchor_of(player).expect("every player is seated");
        assert!(!held.contains(&anchor), "{anchor} held twice");
        held.push(anchor);
    }
    assert_eq!(slots.assignment().len(), count);
}

proptest! {
    #[test]
    fn defaults_never_overlap(count in count_strategy()) {
        let slots = SlotAssignmentManager::new(count);
        let held: Vec<_> = slots.assignment().iter().map(|(_, anchor)| anchor).collect();
        for (i, a) in held.iter().enumerate() {
            for b in &held[i + 1..] {
                prop_assert!(!a.conflicts_with(*b), "{a} overlaps {b}");
            }
        }
    }

    #[test]
    fn commits_keep_everyone_seated_once(count in count_strategy(), moves in moves_strategy()) {
        let mut slots = SlotAssignmentManager::new(count);
        for (player, target) in moves {
            slots.commit(player, target);
            assert_seated(&slots);
        }
    }

    #[test]
    fn swap_only_touches_the_two_players(count in count_strategy(), moves in moves_strategy()) {
        let mut slots = SlotAssignmentManager::new(count);
        for (player, target) in moves {
            let before = slots.clone();
            let occupant = before.occupant(target, player);
            if !slots.commit(player, target) {
                prop_assert_eq!(&slots, &before);
                continue;
            }
            prop_assert_eq!(slots.anchor_of(player), Some(target));
            for other in 0..count.get() {
                if other == player {
                    continue;
                }
                if Some(other) == occupant {
                    prop_assert_eq!(slots.anchor_of(other), before.anchor_of(player));
                } else {
                    prop_assert_eq!(slots.anchor_of(other), before.anchor_of(other));
                }
            }
        }
    }

    #[test]
    fn new_edge_claims_never_cover_a_held_corner(count in count_strategy(), moves in moves_strategy()) {
        let mut slots = SlotAssignmentManager::new(count);
        for (player, target) in moves {
            let was_free = slots.occupant(target, player).is_none();
            if slots.commit(player, target) && was_free && target.is_edge() {
                for corner in target.contained_corners().iter() {
                    prop_assert_eq!(slots.occupant(corner, player), None);
                }
            }
        }
    }

    #[test]
    fn ensure_is_idempotent_after_any_history(
        count in count_strategy(),
        next in count_strategy(),
        moves in moves_strategy(),
    ) {
        let mut slots = SlotAssignmentManager::new(count);
        for (player, target) in moves {
            slots.commit(player, target);
        }
        slots.set_player_count(next);
        slots.ensure_assignments();
        assert_seated(&slots);
        let settled = slots.clone();
        prop_assert!(!slots.ensure_assignments());
        prop_assert_eq!(slots, settled);
    }
}
