//! Runtime configuration with TOML preset support.
//!
//! Options describe how a compute session is set up: the program label and
//! workgroup size, the bind groups a session flips between, and which
//! adapter to prefer. They serialize to/from TOML.

mod device;
mod program;
mod session;

use std::path::Path;

pub use device::{DeviceOptions, PowerPreference};
pub use program::ProgramOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
pub use session::SessionOptions;

use crate::error::ShadeboxError;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[session]`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Compute program parameters.
    pub program: ProgramOptions,
    /// Per-session bind group and frame parameters.
    pub session: SessionOptions,
    /// Adapter selection.
    pub device: DeviceOptions,
}

impl Options {
    /// Generate JSON Schema describing the options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid options
    /// TOML.
    pub fn load(path: &Path) -> Result<Self, ShadeboxError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse options from a TOML string. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ShadeboxError::OptionsParse`] if the TOML is malformed.
    pub fn from_toml(content: &str) -> Result<Self, ShadeboxError> {
        toml::from_str(content)
            .map_err(|e| ShadeboxError::OptionsParse(e.to_string()))
    }

    /// Check that these options can drive a session whose shader declares
    /// `@workgroup_size(shader_workgroup_size)`.
    ///
    /// # Errors
    ///
    /// Returns [`ShadeboxError::InvalidOptions`] if the workgroup size
    /// differs from the shader's, if no bind groups are listed, or if the
    /// initial bind group is not one of them.
    pub fn validate(&self, shader_workgroup_size: u32) -> Result<(), ShadeboxError> {
        if self.program.workgroup_size != shader_workgroup_size {
            return Err(ShadeboxError::InvalidOptions(format!(
                "program.workgroup_size is {} but the shader declares {}",
                self.program.workgroup_size, shader_workgroup_size
            )));
        }
        if self.session.bind_groups.is_empty() {
            return Err(ShadeboxError::InvalidOptions(
                "session.bind_groups is empty".to_owned(),
            ));
        }
        if let Some(initial) = self.session.initial() {
            if !self.session.bind_groups.iter().any(|name| name == initial) {
                return Err(ShadeboxError::InvalidOptions(format!(
                    "session.initial_bind_group '{initial}' is not in \
                     session.bind_groups"
                )));
            }
        }
        Ok(())
    }

    /// Save options to a TOML file (pretty-printed).
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<(), ShadeboxError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ShadeboxError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed = Options::from_toml(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r#"
[program]
label = "Particles"
"#;
        let opts = Options::from_toml(toml_str).unwrap();
        assert_eq!(opts.program.label, "Particles");
        // Everything else should be default
        assert_eq!(opts.program.workgroup_size, 64);
        assert_eq!(opts.session.bind_groups, vec!["ping", "pong"]);
        assert_eq!(opts.device.power_preference, PowerPreference::HighPerformance);
    }

    #[test]
    fn malformed_toml_is_an_options_error() {
        let err = Options::from_toml("[session\nframes = 3").unwrap_err();
        assert!(matches!(err, ShadeboxError::OptionsParse(_)));
    }

    #[test]
    fn power_preference_uses_snake_case() {
        let opts =
            Options::from_toml("[device]\npower_preference = \"low_power\"")
                .unwrap();
        assert_eq!(opts.device.power_preference, PowerPreference::LowPower);
    }

    #[test]
    fn save_then_load() {
        let dir = std::env::temp_dir()
            .join(format!("shadebox-options-{}", std::process::id()));
        let path = dir.join("preset.toml");

        let mut opts = Options::default();
        opts.session.frames = 12;
        opts.save(&path).unwrap();
        let loaded = Options::load(&path).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(loaded, opts);
    }

    #[test]
    fn defaults_are_valid_for_matching_shader() {
        Options::default().validate(64).unwrap();
    }

    #[test]
    fn workgroup_size_must_match_shader() {
        let opts = Options::from_toml(
            "[program]\nworkgroup_size = 128\n[session]\nelement_count = 256",
        )
        .unwrap();
        let err = opts.validate(64).unwrap_err();
        assert!(matches!(err, ShadeboxError::InvalidOptions(_)));
        assert_eq!(
            err.to_string(),
            "invalid options: program.workgroup_size is 128 but the shader \
             declares 64"
        );
    }

    #[test]
    fn empty_bind_groups_are_rejected() {
        let opts = Options::from_toml("[session]\nbind_groups = []").unwrap();
        let err = opts.validate(64).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid options: session.bind_groups is empty"
        );
    }

    #[test]
    fn unlisted_initial_bind_group_is_rejected() {
        let opts =
            Options::from_toml("[session]\ninitial_bind_group = \"swap\"")
                .unwrap();
        assert!(matches!(
            opts.validate(64),
            Err(ShadeboxError::InvalidOptions(_))
        ));
    }

    #[test]
    fn schema_lists_sections() {
        let schema = Options::json_schema();
        let properties = schema.get("properties").unwrap();
        for section in ["program", "session", "device"] {
            assert!(properties.get(section).is_some(), "missing {section}");
        }
    }
}
