//! Combination list edits. Each function mutates a loaded document; the
//! store transaction around it decides whether the result is persisted.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::model::{Combination, CombinationId, Settings, StateDocument};
use crate::presets;

/// Fields a client may change on an existing combination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinationPatch {
    #[serde(default)]
    pub winner: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
}

/// The view served to clients: everything except the raw spin history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    pub combinations: Vec<Combination>,
    pub spin_count: usize,
    pub last_combo_id: Option<CombinationId>,
    pub settings: Settings,
}

/// Trim and collapse internal whitespace runs to single spaces.
pub fn normalize_combo(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn snapshot(doc: &StateDocument) -> StateSnapshot {
    StateSnapshot {
        combinations: doc.combinations.clone(),
        spin_count: doc.spin_count(),
        last_combo_id: doc.last_combo_id,
        settings: doc.settings.clone(),
    }
}

pub fn add(doc: &mut StateDocument, text: &str) -> CoreResult<Combination> {
    let combo = normalize_combo(text);
    if combo.is_empty() {
        return Err(CoreError::ComboRequired);
    }
    if doc.combinations.iter().any(|c| c.combo == combo) {
        return Err(CoreError::DuplicateCombo);
    }

    let created = Combination::new(doc.next_combination_id, combo);
    doc.next_combination_id += 1;
    doc.combinations.push(created.clone());
    Ok(created)
}

pub fn remove_by_text(doc: &mut StateDocument, text: &str) -> CoreResult<()> {
    let combo = normalize_combo(text);
    if combo.is_empty() {
        return Err(CoreError::ComboRequired);
    }

    let before = doc.combinations.len();
    doc.combinations.retain(|c| c.combo != combo);
    if doc.combinations.len() == before {
        return Err(CoreError::ComboNotFound);
    }
    doc.revalidate_last_combo();
    Ok(())
}

pub fn patch(
    doc: &mut StateDocument,
    id: CombinationId,
    patch: CombinationPatch,
) -> CoreResult<Combination> {
    let last_combo_id = doc.last_combo_id;
    let item = doc
        .combination_mut(id)
        .ok_or(CoreError::CombinationNotFound(id))?;

    if let Some(winner) = patch.winner {
        item.winner = winner;
    }
    let mut clear_last = false;
    if let Some(enabled) = patch.enabled {
        item.enabled = enabled;
        clear_last = !enabled && last_combo_id == Some(id);
    }
    let updated = item.clone();

    if clear_last {
        doc.last_combo_id = None;
    }
    Ok(updated)
}

pub fn shuffle<R: Rng + ?Sized>(doc: &mut StateDocument, rng: &mut R) {
    doc.combinations.shuffle(rng);
}

/// Back to the preset list. Settings survive.
pub fn reset_defaults(doc: &mut StateDocument) {
    doc.combinations = presets::default_combinations();
    doc.next_combination_id = doc.combinations.len() as CombinationId + 1;
    clear_history(doc);
}

/// Zero every counter but keep the list and its order.
pub fn reset_stats(doc: &mut StateDocument) {
    for c in &mut doc.combinations {
        c.hits = 0;
        c.last_hit = None;
    }
    clear_history(doc);
}

fn clear_history(doc: &mut StateDocument) {
    doc.spins.clear();
    doc.next_spin_id = 1;
    doc.last_combo_id = None;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn normalizes_whitespace() {
        assert_eq!(normalize_combo("  7   7 7 "), "7 7 7");
        assert_eq!(normalize_combo("\t a\n b "), "a b");
        assert_eq!(normalize_combo("   "), "");
    }

    #[test]
    fn add_normalizes_and_rejects_duplicates() {
        let mut doc = StateDocument::default();
        let created = add(&mut doc, "  7   7 7 ").unwrap();
        assert_eq!(created.combo, "7 7 7");
        assert_eq!(created.id, 11);
        assert_eq!(doc.next_combination_id, 12);
        assert!(matches!(add(&mut doc, "7 7 7"), Err(CoreError::DuplicateCombo)));
        assert!(matches!(add(&mut doc, "  "), Err(CoreError::ComboRequired)));
    }

    #[test]
    fn ids_are_not_reused_after_removal() {
        let mut doc = StateDocument::default();
        let first = add(&mut doc, "x").unwrap();
        remove_by_text(&mut doc, "x").unwrap();
        let second = add(&mut doc, "x").unwrap();
        assert!(second.id > first.id);
    }

    #[test]
    fn remove_missing_leaves_list_untouched() {
        let mut doc = StateDocument::default();
        let before = doc.clone();
        assert!(matches!(remove_by_text(&mut doc, "nope"), Err(CoreError::ComboNotFound)));
        assert_eq!(doc, before);
    }

    #[test]
    fn remove_clears_last_combo() {
        let mut doc = StateDocument::default();
        doc.last_combo_id = Some(1);
        remove_by_text(&mut doc, " 777 ").unwrap();
        assert_eq!(doc.last_combo_id, None);
        assert_eq!(doc.combinations.len(), 9);
    }

    #[test]
    fn remove_keeps_unrelated_last_combo() {
        let mut doc = StateDocument::default();
        doc.last_combo_id = Some(2);
        remove_by_text(&mut doc, "777").unwrap();
        assert_eq!(doc.last_combo_id, Some(2));
    }

    #[test]
    fn patch_updates_only_given_fields() {
        let mut doc = StateDocument::default();
        let updated = patch(
            &mut doc,
            3,
            CombinationPatch {
                winner: Some("Carol".into()),
                enabled: None,
            },
        )
        .unwrap();
        assert_eq!(updated.winner, "Carol");
        assert!(updated.enabled);
        assert!(matches!(
            patch(&mut doc, 99, CombinationPatch::default()),
            Err(CoreError::CombinationNotFound(99))
        ));
    }

    #[test]
    fn disabling_last_winner_clears_pointer() {
        let mut doc = StateDocument::default();
        doc.last_combo_id = Some(4);
        let disable = CombinationPatch {
            winner: None,
            enabled: Some(false),
        };
        patch(&mut doc, 5, disable.clone()).unwrap();
        assert_eq!(doc.last_combo_id, Some(4));
        patch(&mut doc, 4, disable).unwrap();
        assert_eq!(doc.last_combo_id, None);
    }

    #[test]
    fn shuffle_only_reorders() {
        let mut doc = StateDocument::default();
        doc.combinations[2].hits = 7;
        let mut rng = StdRng::seed_from_u64(3);
        shuffle(&mut doc, &mut rng);
        let mut sorted = doc.combinations.clone();
        sorted.sort_by_key(|c| c.id);
        let mut expected = StateDocument::default().combinations;
        expected[2].hits = 7;
        assert_eq!(sorted, expected);
    }

    #[test]
    fn reset_stats_keeps_order() {
        let mut doc = StateDocument::default();
        doc.combinations.reverse();
        for c in &mut doc.combinations {
            c.hits = 2;
            c.last_hit = Some("then".into());
        }
        doc.last_combo_id = Some(1);
        doc.next_spin_id = 9;
        let order: Vec<_> = doc.combinations.iter().map(|c| c.id).collect();

        reset_stats(&mut doc);

        assert_eq!(doc.combinations.iter().map(|c| c.id).collect::<Vec<_>>(), order);
        assert!(doc.combinations.iter().all(|c| c.hits == 0 && c.last_hit.is_none()));
        assert_eq!(doc.next_spin_id, 1);
        assert_eq!(doc.last_combo_id, None);
    }

    #[test]
    fn reset_defaults_restores_presets_and_keeps_settings() {
        let mut doc = StateDocument::default();
        add(&mut doc, "extra").unwrap();
        remove_by_text(&mut doc, "777").unwrap();
        doc.settings.reel_speed_ms = 80;

        reset_defaults(&mut doc);

        assert_eq!(doc.combinations, presets::default_combinations());
        assert_eq!(doc.next_combination_id, 11);
        assert_eq!(doc.settings.reel_speed_ms, 80);
    }
}
