//! Request and response bodies of the `/api` surface.

use serde::{Deserialize, Serialize};

pub use jackpot_core::{
    Combination, CombinationPatch, Settings, SettingsPatch, SpinOutcome as SpinResponse,
    StateSnapshot as StateResponse,
};

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct SpinRequest {
    /// Overrides the winner name stored on the winning combination.
    #[serde(default)]
    pub winner_name: Option<String>,
}

/// Body of `POST /api/combinations` and `DELETE /api/combinations/by-text`.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ComboTextRequest {
    #[serde(default)]
    pub combo: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CombinationResponse {
    pub combination: Combination,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PatchCombinationResponse {
    pub ok: bool,
    pub combination: Combination,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SettingsResponse {
    pub ok: bool,
    pub settings: Settings,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UploadResponse {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ErrorBody {
    pub error: String,
}
