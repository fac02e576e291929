// core/scene.rs
//
// Scene graph — the transform hierarchy the orbital model writes into every
// frame and the camera rig reads world positions from.
//
// Nodes are created at scene initialisation and never destroyed, so a node
// id is simply its index. Each node either inherits its parent's orientation
// (the usual case) or is a *compass* node: it translates and scales with its
// parent but keeps a world-fixed orientation. Compass nodes are what stop a
// parent's spin from tilting the orbits of its children.
//
// Usage:
//   let mut graph = SceneGraph::new();
//   let root = graph.add(None, LocalTransform::new());
//   let sys = graph.add(Some(root), LocalTransform::new().with_offset(x));
//   graph.propagate();
//   let p = graph.world_position(sys);

use glam::{DQuat, DVec3};
use crate::api::types::NodeId;

/// Local transform data for a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalTransform {
    /// Position relative to parent (or world if no parent).
    pub offset: DVec3,
    /// Rotation relative to parent, or relative to the world for compass nodes.
    pub rotation: DQuat,
    /// Uniform scale multiplier relative to parent.
    pub scale: f64,
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self {
            offset: DVec3::ZERO,
            rotation: DQuat::IDENTITY,
            scale: 1.0,
        }
    }
}

impl LocalTransform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_offset(mut self, offset: DVec3) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_rotation(mut self, rotation: DQuat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }
}

/// Resolved world-space transform of a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldTransform {
    pub position: DVec3,
    pub rotation: DQuat,
    pub scale: f64,
}

impl WorldTransform {
    pub const IDENTITY: Self = Self {
        position: DVec3::ZERO,
        rotation: DQuat::IDENTITY,
        scale: 1.0,
    };

    /// Map a point expressed in this node's frame into world space.
    pub fn transform_point(&self, local: DVec3) -> DVec3 {
        self.position + self.rotation * (local * self.scale)
    }
}

/// How a node's world orientation is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// World rotation = parent world rotation × local rotation.
    #[default]
    Inherit,
    /// World rotation = local rotation; only position and scale follow the parent.
    Compass,
}

#[derive(Debug, Clone)]
struct SceneNode {
    children: Vec<NodeId>,
    local: LocalTransform,
    orientation: Orientation,
    world: WorldTransform,
    renderable: bool,
}

/// Transform hierarchy with compass-node support.
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    /// Nodes with no parent (top-level).
    roots: Vec<NodeId>,
    /// Set when hierarchy or local data changes, cleared after propagate.
    dirty: bool,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node that inherits its parent's orientation.
    pub fn add(&mut self, parent: Option<NodeId>, local: LocalTransform) -> NodeId {
        self.insert(parent, local, Orientation::Inherit)
    }

    /// Add a compass node (world-fixed orientation).
    pub fn add_compass(&mut self, parent: Option<NodeId>, local: LocalTransform) -> NodeId {
        self.insert(parent, local, Orientation::Compass)
    }

    fn insert(
        &mut self,
        parent: Option<NodeId>,
        local: LocalTransform,
        orientation: Orientation,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let parent = parent.filter(|p| self.contains(*p));
        self.nodes.push(SceneNode {
            children: Vec::new(),
            local,
            orientation,
            world: WorldTransform::IDENTITY,
            renderable: false,
        });
        match parent {
            Some(p) => self.nodes[p.0 as usize].children.push(id),
            None => self.roots.push(id),
        }
        self.dirty = true;
        id
    }

    pub fn contains(&self, id: NodeId) -> bool {
        (id.0 as usize) < self.nodes.len()
    }

    pub fn set_local(&mut self, id: NodeId, local: LocalTransform) {
        if let Some(node) = self.nodes.get_mut(id.0 as usize) {
            node.local = local;
            self.dirty = true;
        }
    }

    /// Flag a node as something the renderer should draw.
    pub fn set_renderable(&mut self, id: NodeId, renderable: bool) {
        if let Some(node) = self.nodes.get_mut(id.0 as usize) {
            node.renderable = renderable;
        }
    }

    /// Renderable nodes with their world transforms, in creation order.
    pub fn renderables(&self) -> impl Iterator<Item = (NodeId, &WorldTransform)> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.renderable)
            .map(|(i, n)| (NodeId(i as u32), &n.world))
    }

    /// Recompute world transforms from the roots down. Cheap no-op when clean.
    pub fn propagate(&mut self) {
        if !self.dirty {
            return;
        }
        let roots = self.roots.clone();
        for root in roots {
            self.propagate_recursive(root, &WorldTransform::IDENTITY);
        }
        self.dirty = false;
    }

    fn propagate_recursive(&mut self, id: NodeId, parent: &WorldTransform) {
        let Some(node) = self.nodes.get(id.0 as usize) else { return };
        let local = node.local;

        let rotation = match node.orientation {
            Orientation::Inherit => parent.rotation * local.rotation,
            Orientation::Compass => local.rotation,
        };
        let world = WorldTransform {
            position: parent.transform_point(local.offset),
            rotation,
            scale: parent.scale * local.scale,
        };

        let children = node.children.clone();
        self.nodes[id.0 as usize].world = world;
        for child in children {
            self.propagate_recursive(child, &world);
        }
    }

    /// World transform as of the last propagate.
    pub fn world(&self, id: NodeId) -> Option<&WorldTransform> {
        self.nodes.get(id.0 as usize).map(|n| &n.world)
    }

    pub fn world_position(&self, id: NodeId) -> Option<DVec3> {
        self.world(id).map(|w| w.position)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn close(a: DVec3, b: DVec3) -> bool {
        (a - b).length() < 1e-9
    }

    #[test]
    fn child_offset_follows_parent() {
        let mut graph = SceneGraph::new();
        let parent = graph.add(None, LocalTransform::new().with_offset(DVec3::X));
        let child = graph.add(Some(parent), LocalTransform::new().with_offset(DVec3::Y));
        graph.propagate();
        assert!(close(graph.world_position(child).unwrap(), DVec3::new(1.0, 1.0, 0.0)));
    }

    #[test]
    fn propagate_composes_rotation_and_offset() {
        let mut graph = SceneGraph::new();
        let root = graph.add(
            None,
            LocalTransform::new().with_rotation(DQuat::from_rotation_z(FRAC_PI_2)),
        );
        let sys = graph.add(
            Some(root),
            LocalTransform::new().with_offset(DVec3::new(10.0, 0.0, 0.0)),
        );
        graph.propagate();

        // A quarter turn about Z carries +X onto +Y.
        assert!(close(graph.world_position(sys).unwrap(), DVec3::new(0.0, 10.0, 0.0)));
    }

    #[test]
    fn compass_node_translates_but_keeps_world_orientation() {
        let mut graph = SceneGraph::new();
        let root = graph.add(
            None,
            LocalTransform::new().with_rotation(DQuat::from_rotation_z(1.234)),
        );
        let sys = graph.add(
            Some(root),
            LocalTransform::new().with_offset(DVec3::new(5.0, 0.0, 0.0)),
        );
        let compass = graph.add_compass(Some(sys), LocalTransform::new());
        let child = graph.add(
            Some(compass),
            LocalTransform::new().with_offset(DVec3::new(1.0, 0.0, 0.0)),
        );
        graph.propagate();

        let cw = graph.world(compass).unwrap();
        assert!(cw.rotation.abs_diff_eq(DQuat::IDENTITY, 1e-12));
        assert!(close(cw.position, graph.world_position(sys).unwrap()));
        // The child offset is applied along world +X, not the rotated axis.
        assert!(close(graph.world_position(child).unwrap(), cw.position + DVec3::X));
    }

    #[test]
    fn compass_local_rotation_is_world_rotation() {
        let mut graph = SceneGraph::new();
        let root = graph.add(
            None,
            LocalTransform::new().with_rotation(DQuat::from_rotation_z(2.0)),
        );
        let tilt = DQuat::from_rotation_x(0.4);
        let compass = graph.add_compass(Some(root), LocalTransform::new().with_rotation(tilt));
        graph.propagate();
        assert!(graph.world(compass).unwrap().rotation.abs_diff_eq(tilt, 1e-12));
    }

    #[test]
    fn scale_is_inherited_by_offsets() {
        let mut graph = SceneGraph::new();
        let root = graph.add(None, LocalTransform::new().with_scale(2.0));
        let child = graph.add(
            Some(root),
            LocalTransform::new().with_offset(DVec3::new(0.0, 3.0, 0.0)),
        );
        graph.propagate();
        assert!(close(graph.world_position(child).unwrap(), DVec3::new(0.0, 6.0, 0.0)));
        assert_eq!(graph.world(child).unwrap().scale, 2.0);
    }

    #[test]
    fn propagate_clears_dirty_flag() {
        let mut graph = SceneGraph::new();
        let a = graph.add(None, LocalTransform::new());
        assert!(graph.dirty);
        graph.propagate();
        assert!(!graph.dirty);
        graph.set_local(a, LocalTransform::new().with_offset(DVec3::ONE));
        assert!(graph.dirty);
    }

    #[test]
    fn renderables_only_lists_flagged_nodes() {
        let mut graph = SceneGraph::new();
        let a = graph.add(None, LocalTransform::new());
        let _b = graph.add(None, LocalTransform::new());
        graph.set_renderable(a, true);
        graph.propagate();
        let ids: Vec<NodeId> = graph.renderables().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![a]);
    }
}
