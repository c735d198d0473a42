use crate::model::{Combination, CombinationId, Settings};

/// Combination texts seeded into a fresh document, in display order.
pub const PRESET_COMBOS: [&str; 10] = [
    "777",
    "\u{1f352}\u{1f352}\u{1f352}",
    "\u{1f48e}\u{1f48e}\u{1f48e}",
    "\u{26a1}\u{fe0f}\u{26a1}\u{fe0f}\u{26a1}\u{fe0f}",
    "\u{1f350}\u{1f350}\u{1f350}",
    "\u{1f34b}\u{1f34b}\u{1f34b}",
    "\u{1f514}\u{1f514}\u{1f514}",
    "\u{1f340}\u{1f340}\u{1f340}",
    "\u{1f4b0}\u{1f4b0}\u{1f4b0}",
    "\u{2b50}\u{fe0f}\u{2b50}\u{fe0f}\u{2b50}\u{fe0f}",
];

pub fn default_combinations() -> Vec<Combination> {
    PRESET_COMBOS
        .iter()
        .enumerate()
        .map(|(i, combo)| Combination::new(i as CombinationId + 1, *combo))
        .collect()
}

pub fn default_settings() -> Settings {
    Settings {
        reel_speed_ms: 35,
        bg_music_url: String::new(),
        spin_sound_url: String::new(),
        jackpot_sound_url: String::new(),
        bg_music_volume: 35,
        spin_sound_volume: 50,
        jackpot_sound_volume: 70,
        jackpot_sound_loop: false,
        background_image_url: String::new(),
    }
}
