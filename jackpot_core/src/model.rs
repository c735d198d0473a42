use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::presets;

/// Identifier issued to a [`Combination`] from the document's monotonic counter.
pub type CombinationId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Combination {
    pub id: CombinationId,
    pub combo: String,
    #[serde(default)]
    pub winner: String,
    #[serde(default)]
    pub hits: u64,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    /// Human-readable local time of the last win.
    #[serde(default)]
    pub last_hit: Option<String>,
}

fn enabled_by_default() -> bool {
    true
}

impl Combination {
    pub fn new(id: CombinationId, combo: impl Into<String>) -> Self {
        Self {
            id,
            combo: combo.into(),
            winner: String::new(),
            hits: 0,
            enabled: true,
            last_hit: None,
        }
    }
}

/// Immutable history entry appended on every spin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpinRecord {
    pub id: u64,
    pub combination_id: CombinationId,
    pub combo: String,
    #[serde(default)]
    pub winner_name_snapshot: String,
    pub created_at: DateTime<Utc>,
}

/// Presentation settings. Missing keys fall back to [`Settings::default`],
/// which is how stored documents pick up keys added later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub reel_speed_ms: u32,
    pub bg_music_url: String,
    pub spin_sound_url: String,
    pub jackpot_sound_url: String,
    pub bg_music_volume: u8,
    pub spin_sound_volume: u8,
    pub jackpot_sound_volume: u8,
    pub jackpot_sound_loop: bool,
    pub background_image_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        presets::default_settings()
    }
}

/// The whole persisted state. Every top-level field missing from disk is
/// back-filled from [`StateDocument::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StateDocument {
    pub next_combination_id: CombinationId,
    pub next_spin_id: u64,
    pub last_combo_id: Option<CombinationId>,
    pub combinations: Vec<Combination>,
    pub spins: Vec<SpinRecord>,
    #[serde(deserialize_with = "settings_or_default")]
    pub settings: Settings,
}

/// A stored `"settings": null` reads as the default settings.
fn settings_or_default<'de, D>(deserializer: D) -> Result<Settings, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Settings>::deserialize(deserializer)?.unwrap_or_default())
}

impl Default for StateDocument {
    fn default() -> Self {
        let combinations = presets::default_combinations();
        Self {
            next_combination_id: combinations.len() as CombinationId + 1,
            next_spin_id: 1,
            last_combo_id: None,
            combinations,
            spins: Vec::new(),
            settings: Settings::default(),
        }
    }
}

impl StateDocument {
    pub fn spin_count(&self) -> usize {
        self.spins.len()
    }

    pub fn combination(&self, id: CombinationId) -> Option<&Combination> {
        self.combinations.iter().find(|c| c.id == id)
    }

    pub fn combination_mut(&mut self, id: CombinationId) -> Option<&mut Combination> {
        self.combinations.iter_mut().find(|c| c.id == id)
    }

    /// Drop `last_combo_id` if it no longer names a present combination.
    pub fn revalidate_last_combo(&mut self) {
        if let Some(id) = self.last_combo_id {
            if self.combination(id).is_none() {
                self.last_combo_id = None;
            }
        }
    }

    /// Restore counter invariants on a document read from disk: counters must
    /// stay ahead of every issued id even if the stored counters were lost.
    pub fn repair(&mut self) {
        let max_combo = self.combinations.iter().map(|c| c.id).max().unwrap_or(0);
        if self.next_combination_id <= max_combo {
            self.next_combination_id = max_combo + 1;
        }
        let max_spin = self.spins.iter().map(|s| s.id).max().unwrap_or(0);
        if self.next_spin_id <= max_spin {
            self.next_spin_id = max_spin + 1;
        }
        self.revalidate_last_combo();
    }
}
