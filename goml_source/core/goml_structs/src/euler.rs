use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Axis order in which euler angles are applied.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum RotationOrder {
    #[default]
    XYZ,
    YZX,
    ZXY,
    XZY,
    YXZ,
    ZYX,
}

impl RotationOrder {
    pub const ALL: [RotationOrder; 6] = [
        RotationOrder::XYZ,
        RotationOrder::YZX,
        RotationOrder::ZXY,
        RotationOrder::XZY,
        RotationOrder::YXZ,
        RotationOrder::ZYX,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            RotationOrder::XYZ => "XYZ",
            RotationOrder::YZX => "YZX",
            RotationOrder::ZXY => "ZXY",
            RotationOrder::XZY => "XZY",
            RotationOrder::YXZ => "YXZ",
            RotationOrder::ZYX => "ZYX",
        }
    }

    /// Orders are intrinsic, matching glam's non-`Ex` variants.
    fn to_glam(self) -> glam::EulerRot {
        match self {
            RotationOrder::XYZ => glam::EulerRot::XYZ,
            RotationOrder::YZX => glam::EulerRot::YZX,
            RotationOrder::ZXY => glam::EulerRot::ZXY,
            RotationOrder::XZY => glam::EulerRot::XZY,
            RotationOrder::YXZ => glam::EulerRot::YXZ,
            RotationOrder::ZYX => glam::EulerRot::ZYX,
        }
    }
}

impl fmt::Display for RotationOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RotationOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RotationOrder::ALL
            .into_iter()
            .find(|o| o.as_str() == s)
            .ok_or_else(|| format!("Unknown rotation order: {s}"))
    }
}

/// Euler rotation in radians, applied in `order`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Default)]
pub struct Euler {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub order: RotationOrder,
}

impl Euler {
    pub const fn new(x: f32, y: f32, z: f32, order: RotationOrder) -> Self {
        Self { x, y, z, order }
    }

    pub fn to_quat(&self) -> glam::Quat {
        // glam takes the angles in the order its enum names the axes.
        let angles = |axis: char| match axis {
            'X' => self.x,
            'Y' => self.y,
            _ => self.z,
        };
        let mut letters = self.order.as_str().chars();
        let (a, b, c) = match (letters.next(), letters.next(), letters.next()) {
            (Some(a), Some(b), Some(c)) => (angles(a), angles(b), angles(c)),
            _ => (self.x, self.y, self.z),
        };
        glam::Quat::from_euler(self.order.to_glam(), a, b, c)
    }
}
