//! Layer merge orchestration.
//!
//! A [`Merger`] accumulates the parameters and layers of any number of source
//! controllers into one merged controller. Each layer's state machine is deep
//! copied with its clips rebased below the source's rebase path, layer names
//! are deduplicated, synced layers are reattached to their copied base layer,
//! and layer control behaviours are pointed at their new layer index.
//!
//! # Example
//!
//! ```
//! use avatarlib_anim::merger::{Merger, WriteDefaultsMode};
//! use avatarlib_anim::model::{AnimatorController, Layer, ObjectArena, StateMachine};
//!
//! let mut arena = ObjectArena::new();
//! let machine = arena.insert(StateMachine::new("Base"));
//! let mut controller = AnimatorController::new("Hat");
//! controller.add_layer(Layer::new("Base", Some(machine)));
//! let source = arena.insert(controller);
//!
//! let mut merger = Merger::new(&mut arena);
//! merger.add_graph("Hat", source, WriteDefaultsMode::DoNothing).unwrap();
//! let merged = merger.merge().unwrap();
//! assert_eq!(arena.controller(merged).unwrap().layers.len(), 1);
//! ```

mod config;

#[cfg(test)]
mod tests;

use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::{debug, warn};

use crate::copy::{CopyCache, DeepCopier};
use crate::error::{AnimError, AnimResult};
use crate::model::{AnimatorController, Layer, ObjectArena, ObjectId, Parameter};
use crate::rebase::{ClipRebaser, RebaseHook};
use crate::store::{AssetStore, ContainerHandle, ContainerSink, NullStore};
use crate::walker::walk_states;

pub use config::{MergeConfig, WriteDefaultsMode, DEFAULT_CONTROLLER_NAME};

/// Merges animator controllers into one.
pub struct Merger<'a, S: AssetStore = NullStore> {
    arena: &'a mut ObjectArena,
    store: S,
    container: Option<ContainerHandle>,
    config: MergeConfig,
    rebaser: ClipRebaser,
    merged: ObjectId,
    caches: HashMap<String, CopyCache>,
    parameters: Vec<Parameter>,
    layers: Vec<Layer>,
    duplicate_counts: HashMap<String, u32>,
}

/// Everything one `add_graph` call produces before it is committed.
struct Staged {
    parameters: Vec<Parameter>,
    layers: Vec<Layer>,
    cache: CopyCache,
    duplicate_counts: HashMap<String, u32>,
}

impl<'a> Merger<'a, NullStore> {
    /// Creates a merger without persistence.
    pub fn new(arena: &'a mut ObjectArena) -> Self {
        Self::with_config(arena, MergeConfig::default())
    }

    /// Creates a merger without persistence using `config`.
    pub fn with_config(arena: &'a mut ObjectArena, config: MergeConfig) -> Self {
        let merged = arena.insert(AnimatorController::new(config.controller_name.clone()));
        Self::assemble(arena, NullStore, None, config, merged)
    }
}

impl<'a, S: AssetStore> Merger<'a, S> {
    /// Creates a merger whose merged controller and every copied object are
    /// added to a new container at `container_path` in `store`.
    pub fn with_store(
        arena: &'a mut ObjectArena,
        mut store: S,
        container_path: &Path,
        config: MergeConfig,
    ) -> AnimResult<Self> {
        let merged = arena.insert(AnimatorController::new(config.controller_name.clone()));
        let container = store.create_container(container_path, merged)?;
        debug!(path = %container_path.display(), "created merged controller container");
        Ok(Self::assemble(arena, store, Some(container), config, merged))
    }

    fn assemble(
        arena: &'a mut ObjectArena,
        store: S,
        container: Option<ContainerHandle>,
        config: MergeConfig,
        merged: ObjectId,
    ) -> Self {
        let rebaser = config.rebaser();
        Self {
            arena,
            store,
            container,
            config,
            rebaser,
            merged,
            caches: HashMap::new(),
            parameters: Vec::new(),
            layers: Vec::new(),
            duplicate_counts: HashMap::new(),
        }
    }

    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// Handle of the merged controller.
    pub fn merged_id(&self) -> ObjectId {
        self.merged
    }

    /// Parameters accumulated so far.
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Layers accumulated so far.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn arena(&self) -> &ObjectArena {
        self.arena
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consumes the merger and returns its store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Appends the parameters and layers of the controller behind `source`.
    ///
    /// Clips reached from the copied layers are rebased below `rebase_path`.
    /// On error nothing from this call is committed, although objects already
    /// created in the arena (and reported to the store) stay there.
    pub fn add_graph(
        &mut self,
        rebase_path: &str,
        source: ObjectId,
        write_defaults: WriteDefaultsMode,
    ) -> AnimResult<()> {
        let source = self.arena.controller(source)?.clone();
        let mut staged = Staged {
            parameters: self.stage_parameters(&source)?,
            layers: Vec::with_capacity(source.layers.len()),
            cache: self.caches.get(rebase_path).cloned().unwrap_or_default(),
            duplicate_counts: self.duplicate_counts.clone(),
        };

        let committed = self.layers.len();
        let mut taken: HashSet<String> = self.layers.iter().map(|l| l.name.clone()).collect();

        for (index, source_layer) in source.layers.iter().enumerate() {
            let name = unique_layer_name(&source_layer.name, &taken, &mut staged.duplicate_counts);
            taken.insert(name.clone());

            let mut layer = source_layer.clone();
            layer.name = name;
            layer.overrides.clear();
            if index == 0 {
                layer.default_weight = 1.0;
            }

            let mut hook = RebaseHook::new(&self.rebaser, rebase_path);
            let mut sink = ContainerSink::new(&mut self.store, self.container);
            let mut copier = DeepCopier::new(self.arena, &mut staged.cache, &mut hook, &mut sink);

            layer.state_machine = copier.copy_opt(source_layer.state_machine)?;

            let synced = usize::try_from(source_layer.synced_layer_index)
                .ok()
                .filter(|base| *base < source.layers.len());
            match synced {
                Some(base) => {
                    propagate_overrides(&mut copier, source_layer, &source.layers[base], &mut layer)?;
                    layer.synced_layer_index += committed as i32;
                }
                None if source_layer.is_synced() => {
                    warn!(
                        layer = %source_layer.name,
                        synced_layer_index = source_layer.synced_layer_index,
                        layer_count = source.layers.len(),
                        "synced layer index out of range, overrides not propagated"
                    );
                }
                None => {}
            }

            let created = copier.take_created();
            let layer_index = (committed + staged.layers.len()) as i32;
            retarget_layer_controls(self.arena, &created, layer_index);
            if let Some(machine) = layer.state_machine {
                apply_write_defaults(self.arena, machine, write_defaults)?;
            }

            debug!(
                layer = %layer.name,
                index = layer_index,
                copied = created.len(),
                "merged layer"
            );
            staged.layers.push(layer);
        }

        debug!(
            controller = %source.name,
            rebase_path,
            layers = staged.layers.len(),
            parameters = staged.parameters.len(),
            "added graph"
        );
        self.parameters.extend(staged.parameters);
        self.layers.extend(staged.layers);
        self.caches.insert(rebase_path.to_string(), staged.cache);
        self.duplicate_counts = staged.duplicate_counts;
        Ok(())
    }

    /// Writes the accumulated parameters and layers into the merged controller
    /// and returns its handle. Safe to call repeatedly.
    pub fn merge(&mut self) -> AnimResult<ObjectId> {
        let controller = self.arena.controller_mut(self.merged)?;
        controller.parameters = self.parameters.clone();
        controller.layers = self.layers.clone();
        if self.container.is_some() {
            self.store.save(self.arena)?;
        }
        debug!(
            layers = self.layers.len(),
            parameters = self.parameters.len(),
            "assembled merged controller"
        );
        Ok(self.merged)
    }

    /// Returns the parameters of `source` not yet accumulated, or a conflict
    /// error if a name is already taken by another type.
    fn stage_parameters(&self, source: &AnimatorController) -> AnimResult<Vec<Parameter>> {
        let mut staged: Vec<Parameter> = Vec::new();
        for parameter in &source.parameters {
            let existing = self
                .parameters
                .iter()
                .chain(staged.iter())
                .find(|p| p.name == parameter.name)
                .map(|p| p.parameter_type);
            match existing {
                Some(existing) if existing != parameter.parameter_type => {
                    return Err(AnimError::parameter_type_conflict(
                        &parameter.name,
                        existing,
                        parameter.parameter_type,
                    ));
                }
                Some(_) => {}
                None => staged.push(parameter.clone()),
            }
        }
        Ok(staged)
    }
}

/// Picks a free layer name, appending `_N` from the per-name counter on collision.
fn unique_layer_name(
    name: &str,
    taken: &HashSet<String>,
    duplicate_counts: &mut HashMap<String, u32>,
) -> String {
    if !taken.contains(name) {
        return name.to_string();
    }
    let counter = duplicate_counts.entry(name.to_string()).or_insert(1);
    loop {
        let candidate = format!("{}_{}", name, counter);
        *counter += 1;
        if !taken.contains(&candidate) {
            return candidate;
        }
    }
}

/// Copies the per-state overrides of a synced layer onto `layer`, keyed by
/// the copies of the base layer's states.
fn propagate_overrides(
    copier: &mut DeepCopier<'_>,
    source_layer: &Layer,
    base_layer: &Layer,
    layer: &mut Layer,
) -> AnimResult<()> {
    let Some(base_machine) = base_layer.state_machine else {
        return Ok(());
    };
    let states: Vec<ObjectId> = walk_states(copier.arena(), base_machine).collect();
    for state in states {
        let motion = source_layer.override_motion(state);
        let behaviours = source_layer.override_behaviours(state);
        if motion.is_none() && behaviours.is_empty() {
            continue;
        }

        let copied_state = copier.copy(state)?;
        if let Some(motion) = motion {
            let copied_motion = copier.copy(motion)?;
            layer.set_override_motion(copied_state, Some(copied_motion));
        }
        if !behaviours.is_empty() {
            let copies = behaviours
                .iter()
                .map(|behaviour| copier.copy(*behaviour))
                .collect::<AnimResult<Vec<_>>>()?;
            layer.set_override_behaviours(copied_state, copies);
        }
    }
    Ok(())
}

/// Points every layer control behaviour among `created` at `layer_index`.
fn retarget_layer_controls(arena: &mut ObjectArena, created: &[ObjectId], layer_index: i32) {
    for id in created {
        if let Ok(behaviour) = arena.behaviour_mut(*id) {
            behaviour.retarget_layer(layer_index);
        }
    }
}

/// Forces the write defaults flag of every state reachable from `machine`.
fn apply_write_defaults(
    arena: &mut ObjectArena,
    machine: ObjectId,
    mode: WriteDefaultsMode,
) -> AnimResult<()> {
    let Some(value) = mode.forced_value() else {
        return Ok(());
    };
    let states: Vec<ObjectId> = walk_states(arena, machine).collect();
    for state in states {
        arena.state_mut(state)?.write_default_values = value;
    }
    Ok(())
}
