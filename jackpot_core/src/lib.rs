pub mod engine;
pub mod error;
pub mod model;
pub mod presets;
pub mod registry;
pub mod settings;
pub mod store;

pub use crate::engine::{spin, SpinOutcome};
pub use crate::error::{CoreError, CoreResult, ErrorKind, StoreError, UnknownAudioKind};
pub use crate::model::{Combination, CombinationId, Settings, SpinRecord, StateDocument};
pub use crate::registry::{CombinationPatch, StateSnapshot};
pub use crate::settings::{AudioKind, MediaSlot, SettingsPatch};
pub use crate::store::StateStore;
