use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Per-session bind group and frame parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[schemars(title = "Session", inline)]
#[serde(default)]
pub struct SessionOptions {
    /// Bind group names, in the order frames cycle through them.
    pub bind_groups: Vec<String>,
    /// Bind group selected before the first frame. Empty means the first
    /// entry of `bind_groups`.
    pub initial_bind_group: String,
    /// Number of frames to dispatch.
    pub frames: u32,
    /// Number of elements each dispatch covers.
    pub element_count: u32,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            bind_groups: vec!["ping".to_owned(), "pong".to_owned()],
            initial_bind_group: String::new(),
            frames: 4,
            element_count: 1024,
        }
    }
}

impl SessionOptions {
    /// Bind group to select before the first frame.
    #[must_use]
    pub fn initial(&self) -> Option<&str> {
        if self.initial_bind_group.is_empty() {
            self.bind_groups.first().map(String::as_str)
        } else {
            Some(self.initial_bind_group.as_str())
        }
    }

    /// Bind group for `frame`, cycling through `bind_groups` starting at
    /// the initial selection. An initial name missing from `bind_groups`
    /// is returned for every frame.
    #[must_use]
    pub fn bind_group_for_frame(&self, frame: u32) -> Option<&str> {
        let initial = self.initial()?;
        let Some(start) =
            self.bind_groups.iter().position(|name| name == initial)
        else {
            return Some(initial);
        };
        let index = (start + frame as usize) % self.bind_groups.len();
        self.bind_groups.get(index).map(String::as_str)
    }

    /// Workgroups needed to cover `element_count` with `workgroup_size`
    /// invocations each, rounded up.
    #[must_use]
    pub fn workgroup_count(&self, workgroup_size: u32) -> u32 {
        self.element_count.div_ceil(workgroup_size.max(1))
    }
}
