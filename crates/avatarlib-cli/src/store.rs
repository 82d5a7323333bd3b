//! Asset store that writes each container as a JSON asset document.

use std::fs;
use std::path::{Path, PathBuf};

use avatarlib_anim::model::{AssetDocument, ObjectArena, ObjectId};
use avatarlib_anim::store::{AssetStore, ContainerHandle, StoreError};
use tracing::debug;

/// A container tracked by [`JsonFileStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct FileContainer {
    pub path: PathBuf,
    pub root: ObjectId,
    /// Objects added to the container, root first.
    pub objects: Vec<ObjectId>,
}

/// Writes every container to its path on `save`.
///
/// The written document holds everything reachable from the container's
/// root, renumbered so the root is handle 0.
#[derive(Debug, Default)]
pub struct JsonFileStore {
    containers: Vec<FileContainer>,
}

impl JsonFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn containers(&self) -> &[FileContainer] {
        &self.containers
    }

    fn write_container(arena: &ObjectArena, container: &FileContainer) -> Result<(), StoreError> {
        let serialize_error = |e: avatarlib_anim::AnimError| StoreError::Serialize {
            path: container.path.clone(),
            message: e.to_string(),
        };
        let document = AssetDocument::extract(arena, container.root).map_err(serialize_error)?;
        let json = document.to_json_pretty().map_err(serialize_error)?;

        let write_error = |e: std::io::Error| StoreError::Write {
            path: container.path.clone(),
            source: e,
        };
        if let Some(parent) = container.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(write_error)?;
            }
        }
        fs::write(&container.path, json).map_err(write_error)?;
        debug!(
            path = %container.path.display(),
            objects = document.objects.len(),
            "wrote asset document"
        );
        Ok(())
    }
}

impl AssetStore for JsonFileStore {
    fn create_container(
        &mut self,
        path: &Path,
        root: ObjectId,
    ) -> Result<ContainerHandle, StoreError> {
        let handle = ContainerHandle(self.containers.len() as u32);
        self.containers.push(FileContainer {
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

    fn save(&mut self, arena: &ObjectArena) -> Result<(), StoreError> {
        for container in &self.containers {
            Self::write_container(arena, container)?;
        }
        Ok(())
    }
}
