use std::sync::Arc;

use goml_variant::Variant;

/// Geometry built from a `{ type, value }` descriptor. `kind` is the full class
/// name (`"BoxGeometry"`), `params` the positional constructor arguments.
#[derive(Clone, Debug, PartialEq)]
pub struct Geometry {
    pub kind: Arc<str>,
    pub params: Vec<Variant>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub kind: Arc<str>,
    pub params: Variant,
    /// Texture path from the `txr` parameter, queued for loading by the host.
    pub texture: Option<Arc<str>>,
}

/// Geometry + material slot shared by meshes, lines and points.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Drawable {
    pub geometry: Option<Arc<Geometry>>,
    pub material: Option<Arc<Material>>,
}

impl Drawable {
    pub fn new(geometry: Option<Arc<Geometry>>, material: Option<Arc<Material>>) -> Self {
        Self { geometry, material }
    }
}
