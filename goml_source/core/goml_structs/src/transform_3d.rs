use glam::Mat4;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Euler, Vector3};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Transform3D {
    pub position: Vector3,
    pub rotation: Euler,
    pub scale: Vector3,
}

impl Default for Transform3D {
    fn default() -> Self {
        Self {
            position: Vector3::ZERO,
            rotation: Euler::default(),
            scale: Vector3::ONE,
        }
    }
}

impl fmt::Display for Transform3D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transform3D(position:{}, rotation:({}, {}, {} {}), scale:{})",
            self.position,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
            self.rotation.order,
            self.scale
        )
    }
}

impl Transform3D {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Moves along `axis` (a unit vector in local space) by `distance`.
    pub fn translate_on_axis(&mut self, axis: Vector3, distance: f32) {
        let world = self.rotation.to_quat() * axis.to_glam();
        self.position += Vector3::from_glam(world * distance);
    }

    pub fn translate_x(&mut self, distance: f32) {
        self.translate_on_axis(Vector3::new(1.0, 0.0, 0.0), distance);
    }

    pub fn translate_y(&mut self, distance: f32) {
        self.translate_on_axis(Vector3::new(0.0, 1.0, 0.0), distance);
    }

    pub fn translate_z(&mut self, distance: f32) {
        self.translate_on_axis(Vector3::new(0.0, 0.0, 1.0), distance);
    }

    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale.to_glam(),
            self.rotation.to_quat(),
            self.position.to_glam(),
        )
    }
}
