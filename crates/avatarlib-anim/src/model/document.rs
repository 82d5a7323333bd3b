//! Asset documents: a root handle plus the objects it reaches.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use super::arena::ObjectArena;
use super::object::ObjectId;
use crate::error::{AnimError, AnimResult};

/// A self-contained serialized graph.
///
/// Handles inside `objects` index into `objects` itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetDocument {
    pub root: ObjectId,
    pub objects: ObjectArena,
}

impl AssetDocument {
    /// Parses a document from JSON.
    ///
    /// Fails if the root or any handle held by an object does not name an
    /// object of the document.
    pub fn from_json(json: &str) -> AnimResult<Self> {
        let document: AssetDocument =
            serde_json::from_str(json).map_err(AnimError::ParseDocument)?;
        document.objects.object(document.root)?;
        for (_, object) in document.objects.iter() {
            for id in object.object_refs() {
                document.objects.object(id)?;
            }
        }
        Ok(document)
    }

    /// Serializes the document as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> AnimResult<String> {
        serde_json::to_string_pretty(self).map_err(AnimError::SerializeDocument)
    }

    /// Splits the document into its arena and root handle.
    pub fn into_parts(self) -> (ObjectArena, ObjectId) {
        (self.objects, self.root)
    }

    /// Copies everything reachable from `root` into a compact document.
    ///
    /// Objects are renumbered in breadth-first discovery order, so `root`
    /// becomes handle 0.
    pub fn extract(arena: &ObjectArena, root: ObjectId) -> AnimResult<Self> {
        let mut order = vec![root];
        let mut index: HashMap<ObjectId, ObjectId> = HashMap::from([(root, ObjectId(0))]);
        let mut queue = VecDeque::from([root]);

        while let Some(id) = queue.pop_front() {
            for child in arena.object(id)?.object_refs() {
                if index.contains_key(&child) {
                    continue;
                }
                index.insert(child, ObjectId(order.len() as u32));
                order.push(child);
                queue.push_back(child);
            }
        }

        let mut objects = Vec::with_capacity(order.len());
        for id in order {
            let mut object = arena.object(id)?.clone();
            for slot in object.object_refs_mut() {
                // Every reachable handle was numbered during discovery.
                if let Some(mapped) = index.get(slot) {
                    *slot = *mapped;
                }
            }
            objects.push(object);
        }

        Ok(Self {
            root: ObjectId(0),
            objects: ObjectArena::from_objects(objects),
        })
    }
}
