//! Asset persistence seam.
//!
//! The merge core reports every object it creates to an [`AssetSink`]. Hosts
//! that persist assets implement [`AssetStore`]; [`NullStore`] disables
//! persistence and [`MemoryStore`] records what would have been written.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::model::{ObjectArena, ObjectId};

/// Errors raised by asset stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The handle was not issued by this store.
    #[error("Unknown asset container {handle}")]
    UnknownContainer { handle: u32 },

    /// Writing a container failed.
    #[error("Failed to write asset container {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A container could not be turned into a document.
    #[error("Failed to serialize asset container {path}: {message}")]
    Serialize { path: PathBuf, message: String },
}

/// Handle of a container created by an [`AssetStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerHandle(pub u32);

/// Receives every object created during a copy.
pub trait AssetSink {
    fn register(&mut self, id: ObjectId) -> Result<(), StoreError>;
}

/// Sink that drops every registration.
#[derive(Debug, Clone, Copy, Default)]
pub struct Discard;

impl AssetSink for Discard {
    fn register(&mut self, _id: ObjectId) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Host asset persistence: containers of objects, written on `save`.
///
/// Writes are append-only; a failure leaves earlier additions in place.
pub trait AssetStore {
    /// Creates a container at `path` whose main object is `root`.
    fn create_container(&mut self, path: &Path, root: ObjectId)
        -> Result<ContainerHandle, StoreError>;

    /// Adds `id` to the container.
    fn add_object(&mut self, handle: ContainerHandle, id: ObjectId) -> Result<(), StoreError>;

    /// Flushes every container.
    fn save(&mut self, arena: &ObjectArena) -> Result<(), StoreError>;
}

/// Store that persists nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStore;

impl AssetStore for NullStore {
    fn create_container(
        &mut self,
        _path: &Path,
        _root: ObjectId,
    ) -> Result<ContainerHandle, StoreError> {
        Ok(ContainerHandle(0))
    }

    fn add_object(&mut self, _handle: ContainerHandle, _id: ObjectId) -> Result<(), StoreError> {
        Ok(())
    }

    fn save(&mut self, _arena: &ObjectArena) -> Result<(), StoreError> {
        Ok(())
    }
}

/// A container recorded by [`MemoryStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryContainer {
    pub path: PathBuf,
    pub root: ObjectId,
    pub objects: Vec<ObjectId>,
}

/// Store that keeps containers in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    containers: Vec<MemoryContainer>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn containers(&self) -> &[MemoryContainer] {
        &self.containers
    }

    pub fn container(&self, handle: ContainerHandle) -> Option<&MemoryContainer> {
        self.containers.get(handle.0 as usize)
    }

    /// Number of times `save` was called.
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl AssetStore for MemoryStore {
    fn create_container(
        &mut self,
        path: &Path,
        root: ObjectId,
    ) -> Result<ContainerHandle, StoreError> {
        let handle = ContainerHandle(self.containers.len() as u32);
        self.containers.push(MemoryContainer {
            path: path.to_path_buf(),
            root,
            objects: vec![root],
        });
        Ok(handle)
    }

    fn add_object(&mut self, handle: ContainerHandle, id: ObjectId) -> Result<(), StoreError> {
        let container = self
            .containers
            .get_mut(handle.0 as usize)
            .ok_or(StoreError::UnknownContainer { handle: handle.0 })?;
        container.objects.push(id);
        Ok(())
    }

    fn save(&mut self, _arena: &ObjectArena) -> Result<(), StoreError> {
        self.saves += 1;
        Ok(())
    }
}

/// Binds a store to one container so it can act as a copy sink.
#[derive(Debug)]
pub struct ContainerSink<'s, S: AssetStore + ?Sized> {
    store: &'s mut S,
    container: Option<ContainerHandle>,
}

impl<'s, S: AssetStore + ?Sized> ContainerSink<'s, S> {
    /// A sink adding to `container`, or discarding when `None`.
    pub fn new(store: &'s mut S, container: Option<ContainerHandle>) -> Self {
        Self { store, container }
    }
}

impl<S: AssetStore + ?Sized> AssetSink for ContainerSink<'_, S> {
    fn register(&mut self, id: ObjectId) -> Result<(), StoreError> {
        match self.container {
            Some(handle) => self.store.add_object(handle, id),
            None => Ok(()),
        }
    }
}
