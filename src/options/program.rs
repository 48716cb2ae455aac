use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Compute program parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[schemars(title = "Program", inline)]
#[serde(default)]
pub struct ProgramOptions {
    /// Base label; pipeline, layout, and shader module labels derive from it.
    pub label: String,
    /// Invocations per workgroup, matching the shader's `@workgroup_size`.
    #[schemars(range(min = 1, max = 256))]
    pub workgroup_size: u32,
}

impl Default for ProgramOptions {
    fn default() -> Self {
        Self {
            label: "Boids".to_owned(),
            workgroup_size: 64,
        }
    }
}
