use goml_ids::ObjectID;

use crate::camera::Camera;
use crate::graph::ObjectGraph;

/// Debug visualisers, keyed by the name of the object type they draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HelperKind {
    DirectionalLight,
    HemisphereLight,
    PointLight,
    SpotLight,
    RectAreaLight,
    Camera,
}

impl HelperKind {
    /// Helper factory lookup. `AmbientLight` has no helper.
    pub fn for_type_name(name: &str) -> Option<HelperKind> {
        Some(match name {
            "DirectionalLight" => HelperKind::DirectionalLight,
            "HemisphereLight" => HelperKind::HemisphereLight,
            "PointLight" => HelperKind::PointLight,
            "SpotLight" => HelperKind::SpotLight,
            "RectAreaLight" => HelperKind::RectAreaLight,
            "Camera" => HelperKind::Camera,
            _ => return None,
        })
    }

    pub const fn type_name(self) -> &'static str {
        match self {
            HelperKind::DirectionalLight => "DirectionalLight",
            HelperKind::HemisphereLight => "HemisphereLight",
            HelperKind::PointLight => "PointLight",
            HelperKind::SpotLight => "SpotLight",
            HelperKind::RectAreaLight => "RectAreaLight",
            HelperKind::Camera => "Camera",
        }
    }

    pub const fn is_camera(self) -> bool {
        matches!(self, HelperKind::Camera)
    }
}

/// What a helper draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HelperTarget {
    Object(ObjectID),
    /// The shadow camera owned by this light.
    ShadowCamera(ObjectID),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Helper {
    pub kind: HelperKind,
    pub target: HelperTarget,
}

impl Helper {
    /// Camera a camera helper draws: the target camera, or the light's shadow
    /// camera.
    pub fn camera<'a>(&self, graph: &'a ObjectGraph) -> Option<&'a Camera> {
        match self.target {
            HelperTarget::Object(id) => graph.get(id)?.camera(),
            HelperTarget::ShadowCamera(light) => graph.get(light)?.shadow_camera(),
        }
    }
}
