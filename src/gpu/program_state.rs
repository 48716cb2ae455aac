//! Bind group selection for compute programs.
//!
//! A [`PipelineDescriptor`] pairs a pipeline with its named bind groups and
//! never changes after construction. Each consumer that dispatches the
//! pipeline keeps its own [`BindingCursor`] recording which bind group is
//! current. [`ComputeProgramState`] bundles one shared descriptor with one
//! cursor for the common single-owner case, e.g. a ping-pong simulation
//! that flips between two bind groups every frame.
//!
//! The cursor stores the selected name and handle together and only ever
//! replaces both at once, so the current handle always equals the
//! descriptor's entry for the current name.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

/// Errors raised by bind group selection and dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// The requested name is not one of the program's bind groups.
    InvalidBindGroupSelection {
        /// Name that was requested.
        name: String,
        /// Names that are available, sorted.
        available: Vec<String>,
    },
    /// A dispatch was recorded before any bind group was selected.
    NoBindGroupSelected,
}

impl fmt::Display for SelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBindGroupSelection { name, available } => write!(
                f,
                "unknown bind group '{name}' (available: {})",
                available.join(", ")
            ),
            Self::NoBindGroupSelected => {
                write!(f, "no bind group selected before dispatch")
            }
        }
    }
}

impl std::error::Error for SelectionError {}

/// A pipeline and its named bind groups, frozen at construction.
#[derive(Debug)]
pub struct PipelineDescriptor<P, B> {
    pipeline: P,
    bind_groups: FxHashMap<String, B>,
}

impl<P, B> PipelineDescriptor<P, B> {
    /// Pair `pipeline` with named bind groups. A repeated name keeps the
    /// last handle given for it.
    pub fn new<N: Into<String>>(
        pipeline: P,
        bind_groups: impl IntoIterator<Item = (N, B)>,
    ) -> Self {
        let mut map = FxHashMap::default();
        for (name, bind_group) in bind_groups {
            let _ = map.insert(name.into(), bind_group);
        }
        Self {
            pipeline,
            bind_groups: map,
        }
    }

    /// The compiled pipeline.
    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    /// Bind group registered under `name`.
    pub fn bind_group(&self, name: &str) -> Option<&B> {
        self.bind_groups.get(name)
    }

    /// Whether a bind group named `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.bind_groups.contains_key(name)
    }

    /// All bind group names, sorted.
    pub fn bind_group_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> =
            self.bind_groups.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of bind groups.
    pub fn len(&self) -> usize {
        self.bind_groups.len()
    }

    /// Whether the descriptor has no bind groups at all.
    pub fn is_empty(&self) -> bool {
        self.bind_groups.is_empty()
    }
}

#[derive(Debug, Clone)]
struct Selection<B> {
    name: String,
    bind_group: B,
}

/// One consumer's current bind group selection.
///
/// The cursor holds the descriptor it selects from, so a selected handle
/// can only ever be resolved against that descriptor's map.
#[derive(Debug, Clone)]
pub struct BindingCursor<P, B> {
    descriptor: Arc<PipelineDescriptor<P, B>>,
    current: Option<Selection<B>>,
}

impl<P, B: Clone> BindingCursor<P, B> {
    /// A cursor over `descriptor` with nothing selected yet.
    pub fn new(descriptor: Arc<PipelineDescriptor<P, B>>) -> Self {
        Self {
            descriptor,
            current: None,
        }
    }

    /// The descriptor this cursor selects from.
    pub fn descriptor(&self) -> &Arc<PipelineDescriptor<P, B>> {
        &self.descriptor
    }

    /// Make `name` the current bind group.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::InvalidBindGroupSelection`] if the
    /// descriptor has no bind group called `name`; the cursor is left as it
    /// was.
    pub fn select(&mut self, name: &str) -> Result<&B, SelectionError> {
        let Some(bind_group) = self.descriptor.bind_group(name) else {
            log::warn!("rejected bind group selection '{name}'");
            return Err(SelectionError::InvalidBindGroupSelection {
                name: name.to_owned(),
                available: self
                    .descriptor
                    .bind_group_names()
                    .into_iter()
                    .map(str::to_owned)
                    .collect(),
            });
        };

        log::trace!("bind group '{name}' selected");
        let selection = Selection {
            name: name.to_owned(),
            bind_group: bind_group.clone(),
        };
        Ok(&self.current.insert(selection).bind_group)
    }

    /// Name of the current bind group, if one was selected.
    pub fn current_name(&self) -> Option<&str> {
        self.current.as_ref().map(|s| s.name.as_str())
    }

    /// Handle of the current bind group, if one was selected.
    pub fn current(&self) -> Option<&B> {
        self.current.as_ref().map(|s| &s.bind_group)
    }
}

/// A shared pipeline descriptor plus the owner's bind group selection.
#[derive(Debug)]
pub struct ComputeProgramState<P, B> {
    cursor: BindingCursor<P, B>,
}

impl<P, B: Clone> ComputeProgramState<P, B> {
    /// State over a new descriptor, with nothing selected.
    pub fn new<N: Into<String>>(
        pipeline: P,
        bind_groups: impl IntoIterator<Item = (N, B)>,
    ) -> Self {
        Self::from_shared(Arc::new(PipelineDescriptor::new(
            pipeline,
            bind_groups,
        )))
    }

    /// State over a descriptor shared with other consumers.
    pub fn from_shared(descriptor: Arc<PipelineDescriptor<P, B>>) -> Self {
        Self {
            cursor: BindingCursor::new(descriptor),
        }
    }

    /// The shared descriptor, for handing to another consumer.
    pub fn descriptor(&self) -> &Arc<PipelineDescriptor<P, B>> {
        self.cursor.descriptor()
    }

    /// The compiled pipeline.
    pub fn pipeline(&self) -> &P {
        self.descriptor().pipeline()
    }

    /// All bind group names, sorted.
    pub fn bind_group_names(&self) -> Vec<&str> {
        self.descriptor().bind_group_names()
    }

    /// Make `name` the current bind group.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::InvalidBindGroupSelection`] for an unknown
    /// name; the previous selection stays current.
    pub fn select_bind_group(&mut self, name: &str) -> Result<(), SelectionError> {
        self.cursor.select(name).map(|_| ())
    }

    /// Name of the current bind group.
    pub fn current_bind_group_name(&self) -> Option<&str> {
        self.cursor.current_name()
    }

    /// Handle of the current bind group.
    pub fn current_bind_group(&self) -> Option<&B> {
        self.cursor.current()
    }
}

impl ComputeProgramState<wgpu::ComputePipeline, wgpu::BindGroup> {
    /// Record a compute pass that dispatches the pipeline with the current
    /// bind group bound at `group_index`.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::NoBindGroupSelected`] if no bind group has
    /// been selected yet.
    pub fn dispatch(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        group_index: u32,
        workgroups: [u32; 3],
    ) -> Result<(), SelectionError> {
        let bind_group = self
            .current_bind_group()
            .ok_or(SelectionError::NoBindGroupSelected)?;
        record_dispatch(
            encoder,
            self.pipeline(),
            group_index,
            bind_group,
            workgroups,
        );
        Ok(())
    }
}

/// Record a single compute pass: set `pipeline`, bind `bind_group` at
/// `group_index`, and dispatch `workgroups`.
pub fn record_dispatch(
    encoder: &mut wgpu::CommandEncoder,
    pipeline: &wgpu::ComputePipeline,
    group_index: u32,
    bind_group: &wgpu::BindGroup,
    workgroups: [u32; 3],
) {
    let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
        label: Some("Compute Pass"),
        timestamp_writes: None,
    });
    pass.set_pipeline(pipeline);
    pass.set_bind_group(group_index, bind_group, &[]);
    pass.dispatch_workgroups(workgroups[0], workgroups[1], workgroups[2]);
}
