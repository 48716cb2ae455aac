use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Which kind of adapter to ask for.
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Default,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum PowerPreference {
    /// Prefer a discrete, high-performance GPU.
    #[default]
    HighPerformance,
    /// Prefer an integrated, low-power GPU.
    LowPower,
}

impl From<PowerPreference> for wgpu::PowerPreference {
    fn from(p: PowerPreference) -> Self {
        match p {
            PowerPreference::HighPerformance => Self::HighPerformance,
            PowerPreference::LowPower => Self::LowPower,
        }
    }
}

/// Adapter selection.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default, JsonSchema,
)]
#[schemars(title = "Device", inline)]
#[serde(default)]
pub struct DeviceOptions {
    /// Adapter power preference.
    pub power_preference: PowerPreference,
}
