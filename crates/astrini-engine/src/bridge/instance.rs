use bytemuck::{Pod, Zeroable};

use crate::camera::rig::CameraPose;
use crate::core::scene::SceneGraph;

/// Per-body transform written to the shared buffer for the host renderer.
/// Must match the TypeScript protocol: 8 floats = 32 bytes stride.
///
/// Positions are narrowed to f32 only here, after all placement math is done
/// in f64.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct BodyInstance {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Rotation quaternion.
    pub qx: f32,
    pub qy: f32,
    pub qz: f32,
    pub qw: f32,
    /// Rendered radius in world units.
    pub scale: f32,
}

impl BodyInstance {
    pub const FLOATS: usize = 8;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;
}

/// Camera placement: position, look-at point, field of view and a flag
/// telling whether the look-at point is meaningful.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct CameraInstance {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub target_x: f32,
    pub target_y: f32,
    pub target_z: f32,
    pub fov_deg: f32,
    /// 1.0 when looking at a target, 0.0 when free-looking.
    pub looking: f32,
}

impl CameraInstance {
    pub const FLOATS: usize = 8;
}

impl From<CameraPose> for CameraInstance {
    fn from(pose: CameraPose) -> Self {
        let target = pose.look_at.unwrap_or(pose.position);
        Self {
            x: pose.position.x as f32,
            y: pose.position.y as f32,
            z: pose.position.z as f32,
            target_x: target.x as f32,
            target_y: target.y as f32,
            target_z: target.z as f32,
            fov_deg: pose.fov_deg as f32,
            looking: if pose.look_at.is_some() { 1.0 } else { 0.0 },
        }
    }
}

/// Instances for one frame.
pub struct InstanceBuffer {
    pub instances: Vec<BodyInstance>,
    pub camera: CameraInstance,
    capacity: usize,
}

impl InstanceBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            instances: Vec::with_capacity(capacity),
            camera: CameraInstance::default(),
            capacity,
        }
    }

    /// Refill from the renderable nodes of `scene`, dropping any beyond capacity.
    pub fn build(&mut self, scene: &SceneGraph, camera: Option<CameraPose>) {
        self.instances.clear();
        for (_, world) in scene.renderables().take(self.capacity) {
            let q = world.rotation;
            self.instances.push(BodyInstance {
                x: world.position.x as f32,
                y: world.position.y as f32,
                z: world.position.z as f32,
                qx: q.x as f32,
                qy: q.y as f32,
                qz: q.z as f32,
                qw: q.w as f32,
                scale: world.scale as f32,
            });
        }
        if let Some(pose) = camera {
            self.camera = pose.into();
        }
    }

    pub fn instance_count(&self) -> u32 {
        self.instances.len() as u32
    }

    /// Raw pointer to instance data for SharedArrayBuffer reads.
    pub fn instances_ptr(&self) -> *const f32 {
        self.instances.as_ptr() as *const f32
    }

    pub fn camera_ptr(&self) -> *const f32 {
        &self.camera as *const CameraInstance as *const f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scene::LocalTransform;
    use glam::DVec3;

    #[test]
    fn instances_are_8_floats() {
        assert_eq!(std::mem::size_of::<BodyInstance>(), 32);
        assert_eq!(std::mem::size_of::<CameraInstance>(), CameraInstance::FLOATS * 4);
    }

    #[test]
    fn build_copies_renderables_up_to_capacity() {
        let mut scene = SceneGraph::new();
        for i in 0..3 {
            let id = scene.add(
                None,
                LocalTransform::new().with_offset(DVec3::new(i as f64, 0.0, 0.0)).with_scale(2.0),
            );
            scene.set_renderable(id, true);
        }
        scene.add(None, LocalTransform::new());
        scene.propagate();

        let mut buf = InstanceBuffer::with_capacity(2);
        buf.build(&scene, None);
        assert_eq!(buf.instance_count(), 2);
        assert_eq!(buf.instances[1].x, 1.0);
        assert_eq!(buf.instances[1].scale, 2.0);
        assert_eq!(buf.instances[1].qw, 1.0);
    }

    #[test]
    fn camera_without_focus_is_flagged() {
        let pose = CameraPose { position: DVec3::new(1.0, 2.0, 3.0), look_at: None, fov_deg: 45.0 };
        let cam = CameraInstance::from(pose);
        assert_eq!(cam.looking, 0.0);
        assert_eq!((cam.target_x, cam.target_y, cam.target_z), (1.0, 2.0, 3.0));
    }
}
