use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnknownAudioKind;
use crate::model::{Settings, StateDocument};

const MAX_VOLUME: u32 = 100;

fn volume(v: u32) -> u8 {
    v.min(MAX_VOLUME) as u8
}

/// The settings a client may write directly. URL fields are absent on
/// purpose: they change only through [`set_media_url`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(default)]
    pub reel_speed_ms: Option<u32>,
    #[serde(default)]
    pub bg_music_volume: Option<u32>,
    #[serde(default)]
    pub spin_sound_volume: Option<u32>,
    #[serde(default)]
    pub jackpot_sound_volume: Option<u32>,
    #[serde(default)]
    pub jackpot_sound_loop: Option<bool>,
}

pub fn apply_patch(settings: &mut Settings, patch: SettingsPatch) {
    if let Some(ms) = patch.reel_speed_ms {
        settings.reel_speed_ms = ms;
    }
    if let Some(v) = patch.bg_music_volume {
        settings.bg_music_volume = volume(v);
    }
    if let Some(v) = patch.spin_sound_volume {
        settings.spin_sound_volume = volume(v);
    }
    if let Some(v) = patch.jackpot_sound_volume {
        settings.jackpot_sound_volume = volume(v);
    }
    if let Some(looped) = patch.jackpot_sound_loop {
        settings.jackpot_sound_loop = looped;
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum AudioKind {
    Bg,
    Spin,
    Jackpot,
}

impl AudioKind {
    pub const ALL: [AudioKind; 3] = [AudioKind::Bg, AudioKind::Spin, AudioKind::Jackpot];

    pub fn as_str(self) -> &'static str {
        match self {
            AudioKind::Bg => "bg",
            AudioKind::Spin => "spin",
            AudioKind::Jackpot => "jackpot",
        }
    }
}

impl FromStr for AudioKind {
    type Err = UnknownAudioKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AudioKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownAudioKind(s.to_string()))
    }
}

/// One settings URL field fed by uploads.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MediaSlot {
    Background,
    Audio(AudioKind),
}

impl MediaSlot {
    /// Subdirectory of the uploads root that holds this slot's files.
    pub fn dir_name(self) -> &'static str {
        match self {
            MediaSlot::Background => "misc",
            MediaSlot::Audio(kind) => kind.as_str(),
        }
    }

    pub fn url(self, settings: &Settings) -> &str {
        match self {
            MediaSlot::Background => &settings.background_image_url,
            MediaSlot::Audio(AudioKind::Bg) => &settings.bg_music_url,
            MediaSlot::Audio(AudioKind::Spin) => &settings.spin_sound_url,
            MediaSlot::Audio(AudioKind::Jackpot) => &settings.jackpot_sound_url,
        }
    }

    fn url_mut(self, settings: &mut Settings) -> &mut String {
        match self {
            MediaSlot::Background => &mut settings.background_image_url,
            MediaSlot::Audio(AudioKind::Bg) => &mut settings.bg_music_url,
            MediaSlot::Audio(AudioKind::Spin) => &mut settings.spin_sound_url,
            MediaSlot::Audio(AudioKind::Jackpot) => &mut settings.jackpot_sound_url,
        }
    }
}

/// Point `slot` at `url` (empty clears it) and hand back the URL it held, so
/// the caller can delete the file behind it.
pub fn set_media_url(doc: &mut StateDocument, slot: MediaSlot, url: String) -> Option<String> {
    let previous = std::mem::replace(slot.url_mut(&mut doc.settings), url);
    (!previous.is_empty()).then_some(previous)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_ignores_unknown_keys_and_urls() {
        let patch: SettingsPatch = serde_json::from_str(
            r#"{"reelSpeedMs":60,"bgMusicUrl":"http://evil","foo":1,"jackpotSoundLoop":true}"#,
        )
        .unwrap();
        let mut settings = Settings::default();
        apply_patch(&mut settings, patch);
        assert_eq!(settings.reel_speed_ms, 60);
        assert!(settings.jackpot_sound_loop);
        assert_eq!(settings.bg_music_url, "");
        assert_eq!(settings.bg_music_volume, 35);
    }

    #[test]
    fn volumes_are_capped() {
        let mut settings = Settings::default();
        apply_patch(
            &mut settings,
            SettingsPatch {
                spin_sound_volume: Some(400),
                ..SettingsPatch::default()
            },
        );
        assert_eq!(settings.spin_sound_volume, 100);
    }

    #[test]
    fn audio_kind_parses_known_names() {
        assert_eq!("jackpot".parse::<AudioKind>(), Ok(AudioKind::Jackpot));
        let err = "drums".parse::<AudioKind>().unwrap_err();
        assert_eq!(err, UnknownAudioKind("drums".into()));
        assert_eq!(err.to_string(), "unknown audio type 'drums'");
    }

    #[test]
    fn media_url_swap_returns_previous() {
        let mut doc = StateDocument::default();
        let slot = MediaSlot::Audio(AudioKind::Spin);
        assert_eq!(set_media_url(&mut doc, slot, "/uploads/spin/a.mp3".into()), None);
        assert_eq!(
            set_media_url(&mut doc, slot, String::new()),
            Some("/uploads/spin/a.mp3".to_string())
        );
        assert_eq!(slot.url(&doc.settings), "");
        assert_eq!(MediaSlot::Background.dir_name(), "misc");
    }
}
