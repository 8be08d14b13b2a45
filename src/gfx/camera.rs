use cgmath::{InnerSpace, Vector3};

/// Camera position and view direction, the only camera data the core reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vector3<f32>,
    /// Unit forward vector
    pub forward: Vector3<f32>,
}

impl CameraPose {
    pub fn new(position: Vector3<f32>, forward: Vector3<f32>) -> Self {
        Self {
            position,
            forward: forward.normalize(),
        }
    }

    /// Pose from first-person yaw and pitch in radians.
    ///
    /// Yaw 0 looks down -Z (Y up), positive yaw turns left, positive pitch looks up.
    pub fn from_yaw_pitch(position: Vector3<f32>, yaw: f32, pitch: f32) -> Self {
        let forward = Vector3::new(
            -yaw.sin() * pitch.cos(),
            pitch.sin(),
            -yaw.cos() * pitch.cos(),
        );
        Self::new(position, forward)
    }

    /// A point `distance` units in front of the camera
    pub fn point_ahead(&self, distance: f32) -> Vector3<f32> {
        self.position + self.forward * distance
    }
}
