use chrono::{DateTime, Local, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::model::{Combination, CombinationId, SpinRecord, StateDocument};

/// `lastHit` format: day.month.year, time of day in local time.
const LAST_HIT_FORMAT: &str = "%d.%m.%Y, %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpinOutcome {
    pub combo: String,
    pub winner: String,
    pub combination_id: CombinationId,
    pub spin_count: usize,
}

pub fn format_last_hit(now: DateTime<Utc>) -> String {
    now.with_timezone(&Local).format(LAST_HIT_FORMAT).to_string()
}

/// Combinations eligible for the next spin: enabled ones, minus the previous
/// winner when something else is enabled, narrowed to the lowest hit count.
pub fn candidates(doc: &StateDocument) -> Vec<&Combination> {
    let active: Vec<&Combination> = doc.combinations.iter().filter(|c| c.enabled).collect();

    let mut pool = active;
    if pool.len() > 1 {
        if let Some(last) = doc.last_combo_id {
            let without_last: Vec<&Combination> =
                pool.iter().copied().filter(|c| c.id != last).collect();
            if !without_last.is_empty() {
                pool = without_last;
            }
        }
    }

    let Some(min_hits) = pool.iter().map(|c| c.hits).min() else {
        return Vec::new();
    };
    pool.into_iter().filter(|c| c.hits == min_hits).collect()
}

/// Pick a winner, bump its counters and append the history record.
///
/// A non-blank `winner_name` replaces the stored winner before the snapshot is
/// taken. The caller is responsible for persisting `doc`.
pub fn spin<R: Rng + ?Sized>(
    doc: &mut StateDocument,
    winner_name: Option<&str>,
    rng: &mut R,
    now: DateTime<Utc>,
) -> CoreResult<SpinOutcome> {
    let winner_id = candidates(doc)
        .choose(rng)
        .map(|c| c.id)
        .ok_or(CoreError::NoActiveCombinations)?;

    let winner = doc
        .combination_mut(winner_id)
        .ok_or(CoreError::CombinationNotFound(winner_id))?;
    winner.hits += 1;
    winner.last_hit = Some(format_last_hit(now));
    if let Some(name) = winner_name.map(str::trim).filter(|n| !n.is_empty()) {
        winner.winner = name.to_string();
    }
    let combo = winner.combo.clone();
    let winner_name = winner.winner.clone();

    doc.last_combo_id = Some(winner_id);
    doc.spins.push(SpinRecord {
        id: doc.next_spin_id,
        combination_id: winner_id,
        combo: combo.clone(),
        winner_name_snapshot: winner_name.clone(),
        created_at: now,
    });
    doc.next_spin_id += 1;

    Ok(SpinOutcome {
        combo,
        winner: winner_name,
        combination_id: winner_id,
        spin_count: doc.spin_count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn doc_with(hits: &[u64]) -> StateDocument {
        let combinations = hits
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let mut c = Combination::new(i as u64 + 1, format!("c{i}"));
                c.hits = *h;
                c
            })
            .collect::<Vec<_>>();
        StateDocument {
            next_combination_id: hits.len() as u64 + 1,
            combinations,
            ..StateDocument::default()
        }
    }

    #[test]
    fn candidates_prefer_lowest_hits() {
        let doc = doc_with(&[3, 1, 1, 2]);
        let ids: Vec<_> = candidates(&doc).iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn candidates_skip_last_winner_when_possible() {
        let mut doc = doc_with(&[0, 0]);
        doc.last_combo_id = Some(1);
        let ids: Vec<_> = candidates(&doc).iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn exclusion_happens_before_min_hits() {
        // the previous winner has the fewest hits but still sits out
        let mut doc = doc_with(&[0, 5, 7]);
        doc.last_combo_id = Some(1);
        let ids: Vec<_> = candidates(&doc).iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn single_active_combination_repeats() {
        let mut doc = doc_with(&[4, 0]);
        doc.combinations[1].enabled = false;
        doc.last_combo_id = Some(1);
        let mut rng = StdRng::seed_from_u64(1);
        let out = spin(&mut doc, None, &mut rng, Utc::now()).unwrap();
        assert_eq!(out.combination_id, 1);
        assert_eq!(doc.combinations[0].hits, 5);
    }

    #[test]
    fn no_active_combinations_is_an_error() {
        let mut doc = doc_with(&[0, 0]);
        for c in &mut doc.combinations {
            c.enabled = false;
        }
        let before = doc.clone();
        let mut rng = StdRng::seed_from_u64(1);
        let err = spin(&mut doc, None, &mut rng, Utc::now()).unwrap_err();
        assert!(matches!(err, CoreError::NoActiveCombinations));
        assert_eq!(doc, before);
    }

    #[test]
    fn spin_records_history_and_override() {
        let mut doc = doc_with(&[0]);
        let mut rng = StdRng::seed_from_u64(9);
        let now = Utc::now();
        let out = spin(&mut doc, Some("  Alice "), &mut rng, now).unwrap();
        assert_eq!(out.winner, "Alice");
        assert_eq!(out.spin_count, 1);
        assert_eq!(doc.last_combo_id, Some(1));
        assert_eq!(doc.next_spin_id, 2);
        let record = &doc.spins[0];
        assert_eq!(record.id, 1);
        assert_eq!(record.winner_name_snapshot, "Alice");
        assert_eq!(record.created_at, now);
        assert!(doc.combinations[0].last_hit.is_some());
    }

    #[test]
    fn blank_override_keeps_stored_winner() {
        let mut doc = doc_with(&[0]);
        doc.combinations[0].winner = "Bob".into();
        let mut rng = StdRng::seed_from_u64(2);
        let out = spin(&mut doc, Some("   "), &mut rng, Utc::now()).unwrap();
        assert_eq!(out.winner, "Bob");
    }
}
