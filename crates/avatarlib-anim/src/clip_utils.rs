//! Helpers for authoring toggle and blendshape clips.

use crate::model::{AnimationClip, AnimationCurve, BindingType, CurveBinding};

/// Property animated to show or hide a game object.
pub const GAME_OBJECT_ACTIVE_PROPERTY: &str = "m_IsActive";

/// Property animated to enable or disable a component.
pub const COMPONENT_ENABLED_PROPERTY: &str = "m_Enabled";

/// Prefix of blendshape weight properties on skinned mesh renderers.
pub const BLENDSHAPE_PROPERTY_PREFIX: &str = "blendShape.";

/// Index of a node in a [`Hierarchy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct Node {
    name: String,
    parent: Option<NodeId>,
}

/// A scene hierarchy reduced to names and parent links.
#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    nodes: Vec<Node>,
}

impl Hierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node without a parent.
    pub fn add_root(&mut self, name: impl Into<String>) -> NodeId {
        self.push(name.into(), None)
    }

    /// Adds a node below `parent`.
    pub fn add_child(&mut self, parent: NodeId, name: impl Into<String>) -> NodeId {
        self.push(name.into(), Some(parent))
    }

    fn push(&mut self, name: String, parent: Option<NodeId>) -> NodeId {
        self.nodes.push(Node { name, parent });
        NodeId(self.nodes.len() - 1)
    }

    pub fn name(&self, node: NodeId) -> &str {
        &self.nodes[node.0].name
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    /// Finds the direct child of `parent` named `name`.
    pub fn find(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|node| node.parent == Some(parent) && node.name == name)
            .map(NodeId)
    }

    /// Returns the path from below the top-most ancestor down to `node`.
    ///
    /// With `until`, the path starts below that ancestor instead. The top-most
    /// ancestor is never part of the path, matching how clip bindings are
    /// relative to the animated root.
    pub fn relative_path(
        &self,
        node: NodeId,
        until: Option<NodeId>,
        prefix: &str,
        suffix: &str,
    ) -> String {
        let mut path = self.name(node).to_string();
        let mut current = node;
        while let Some(parent) = self.parent(current) {
            if self.parent(parent).is_none() || Some(parent) == until {
                break;
            }
            path = format!("{}/{}", self.name(parent), path);
            current = parent;
        }
        format!("{}{}{}", prefix, path, suffix)
    }

    /// Relative paths of several nodes.
    pub fn relative_paths(
        &self,
        nodes: &[NodeId],
        until: Option<NodeId>,
        prefix: &str,
        suffix: &str,
    ) -> Vec<String> {
        nodes
            .iter()
            .map(|node| self.relative_path(*node, until, prefix, suffix))
            .collect()
    }
}

fn single_frame(value: f32) -> AnimationCurve {
    AnimationCurve::constant(0.0, 0.0, value)
}

fn enabled_value(enabled: bool) -> f32 {
    if enabled {
        1.0
    } else {
        0.0
    }
}

/// Animates the active flag of the game object at `path`.
pub fn set_game_object_enabled_curve(clip: &mut AnimationClip, path: &str, curve: AnimationCurve) {
    clip.set_curve(
        CurveBinding::new(path, BindingType::GameObject, GAME_OBJECT_ACTIVE_PROPERTY),
        curve,
    );
}

/// Animates the active flag of every game object in `paths`.
pub fn set_game_object_enabled_curves<P: AsRef<str>>(
    clip: &mut AnimationClip,
    paths: &[P],
    curve: &AnimationCurve,
) {
    for path in paths {
        set_game_object_enabled_curve(clip, path.as_ref(), curve.clone());
    }
}

/// Shows or hides the game object at `path` on the first frame.
pub fn set_single_frame_game_object_enabled_curve(clip: &mut AnimationClip, path: &str, enabled: bool) {
    set_game_object_enabled_curve(clip, path, single_frame(enabled_value(enabled)));
}

/// Shows or hides every game object in `paths` on the first frame.
pub fn set_single_frame_game_object_enabled_curves<P: AsRef<str>>(
    clip: &mut AnimationClip,
    paths: &[P],
    enabled: bool,
) {
    set_game_object_enabled_curves(clip, paths, &single_frame(enabled_value(enabled)));
}

/// Animates the enabled flag of a component of type `component_type` at `path`.
pub fn set_component_enabled_curve(
    clip: &mut AnimationClip,
    path: &str,
    component_type: &str,
    curve: AnimationCurve,
) {
    clip.set_curve(
        CurveBinding::new(
            path,
            BindingType::Component(component_type.to_string()),
            COMPONENT_ENABLED_PROPERTY,
        ),
        curve,
    );
}

/// Enables or disables a component on the first frame.
pub fn set_single_frame_component_enabled_curve(
    clip: &mut AnimationClip,
    path: &str,
    component_type: &str,
    enabled: bool,
) {
    set_component_enabled_curve(clip, path, component_type, single_frame(enabled_value(enabled)));
}

/// Animates blendshape `blendshape` of the skinned mesh at `path`.
pub fn set_blendshape_curve(
    clip: &mut AnimationClip,
    path: &str,
    blendshape: &str,
    curve: AnimationCurve,
) {
    clip.set_curve(
        CurveBinding::new(
            path,
            BindingType::SkinnedMeshRenderer,
            format!("{}{}", BLENDSHAPE_PROPERTY_PREFIX, blendshape),
        ),
        curve,
    );
}

/// Sets a blendshape to `value` on the first frame.
pub fn set_single_frame_blendshape_curve(
    clip: &mut AnimationClip,
    path: &str,
    blendshape: &str,
    value: f32,
) {
    set_blendshape_curve(clip, path, blendshape, single_frame(value));
}

/// Drives a blendshape from 0 to 100 over 100 seconds, for motion time layers.
pub fn set_linear_zero_to_hundred_blendshape_curve(
    clip: &mut AnimationClip,
    path: &str,
    blendshape: &str,
) {
    set_blendshape_curve(
        clip,
        path,
        blendshape,
        AnimationCurve::linear(0.0, 0.0, 100.0, 100.0),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefab() -> (Hierarchy, Vec<NodeId>) {
        let mut hierarchy = Hierarchy::new();
        let root = hierarchy.add_root("AnimationUtilsTestObject1");
        let obj2 = hierarchy.add_child(root, "Object2");
        let obj3 = hierarchy.add_child(obj2, "Object3");
        let obj6 = hierarchy.add_child(obj3, "Object6");
        let obj7 = hierarchy.add_child(obj6, "Object7");
        (hierarchy, vec![root, obj2, obj3, obj6, obj7])
    }

    #[test]
    fn test_relative_path_from_root() {
        let (hierarchy, nodes) = prefab();
        assert_eq!(
            hierarchy.relative_path(nodes[4], None, "", ""),
            "Object2/Object3/Object6/Object7"
        );
    }

    #[test]
    fn test_relative_path_until() {
        let (hierarchy, nodes) = prefab();
        assert_eq!(
            hierarchy.relative_path(nodes[4], Some(nodes[2]), "", ""),
            "Object6/Object7"
        );
    }

    #[test]
    fn test_relative_path_prefix_suffix() {
        let (hierarchy, nodes) = prefab();
        assert_eq!(
            hierarchy.relative_path(nodes[3], None, "AnimationUtilsTestObject1/", "/Object7"),
            "AnimationUtilsTestObject1/Object2/Object3/Object6/Object7"
        );
        assert_eq!(hierarchy.find(nodes[1], "Object3"), Some(nodes[2]));
    }

    #[test]
    fn test_single_frame_enabled_curves() {
        let (hierarchy, nodes) = prefab();
        let paths = hierarchy.relative_paths(&nodes[3..], None, "", "");
        let mut clip = AnimationClip::new("Show");
        set_single_frame_game_object_enabled_curves(&mut clip, &paths, true);

        assert_eq!(clip.binding_count(), 2);
        let binding = CurveBinding::new(
            "Object2/Object3/Object6",
            BindingType::GameObject,
            "m_IsActive",
        );
        let curve = clip.curve(&binding).unwrap();
        assert_eq!(curve.keys.len(), 1);
        assert_eq!(curve.keys[0].time, 0.0);
        assert_eq!(curve.keys[0].value, 1.0);
    }

    #[test]
    fn test_component_and_blendshape_curves() {
        let mut clip = AnimationClip::new("Face");
        set_single_frame_component_enabled_curve(&mut clip, "Body", "VRCPhysBone", false);
        set_single_frame_blendshape_curve(&mut clip, "Body", "Smile", 100.0);
        set_linear_zero_to_hundred_blendshape_curve(&mut clip, "Body", "Blink");

        let enabled = CurveBinding::new(
            "Body",
            BindingType::Component("VRCPhysBone".to_string()),
            "m_Enabled",
        );
        assert_eq!(clip.curve(&enabled).unwrap().keys[0].value, 0.0);

        let smile = CurveBinding::new("Body", BindingType::SkinnedMeshRenderer, "blendShape.Smile");
        assert_eq!(clip.curve(&smile).unwrap().keys[0].value, 100.0);

        let blink = CurveBinding::new("Body", BindingType::SkinnedMeshRenderer, "blendShape.Blink");
        let keys = &clip.curve(&blink).unwrap().keys;
        assert_eq!((keys[1].time, keys[1].value), (100.0, 100.0));
    }
}
