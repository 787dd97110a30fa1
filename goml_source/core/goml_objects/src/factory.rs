use std::sync::Arc;

use ahash::AHashMap;
use goml_variant::Variant;

use crate::drawable::{Geometry, Material};
use crate::error::FactoryError;

/// Builds geometries and materials from attribute descriptors.
pub trait ResourceFactory {
    fn create_geometry(&mut self, descriptor: &Variant) -> Result<Arc<Geometry>, FactoryError>;
    fn create_material(&mut self, descriptor: &Variant) -> Result<Arc<Material>, FactoryError>;
}

const GEOMETRY_TYPES: &[&str] = &[
    "BoxGeometry",
    "CircleGeometry",
    "ConeGeometry",
    "CylinderGeometry",
    "DodecahedronGeometry",
    "IcosahedronGeometry",
    "OctahedronGeometry",
    "PlaneGeometry",
    "RingGeometry",
    "SphereGeometry",
    "TetrahedronGeometry",
    "TorusGeometry",
    "TorusKnotGeometry",
    "BufferGeometry",
];

const MATERIAL_TYPES: &[&str] = &[
    "MeshBasicMaterial",
    "MeshLambertMaterial",
    "MeshPhongMaterial",
    "MeshStandardMaterial",
    "MeshPhysicalMaterial",
    "MeshNormalMaterial",
    "MeshDepthMaterial",
    "LineBasicMaterial",
    "LineDashedMaterial",
    "PointsMaterial",
    "SpriteMaterial",
    "ShaderMaterial",
];

/// Default factory: validates descriptors against the known class names and
/// caches the result per descriptor, so equal descriptors share one resource.
#[derive(Default)]
pub struct DescriptorFactory {
    geometries: AHashMap<String, Arc<Geometry>>,
    materials: AHashMap<String, Arc<Material>>,
}

impl DescriptorFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cached_geometries(&self) -> usize {
        self.geometries.len()
    }

    pub fn cached_materials(&self) -> usize {
        self.materials.len()
    }
}

impl ResourceFactory for DescriptorFactory {
    fn create_geometry(&mut self, descriptor: &Variant) -> Result<Arc<Geometry>, FactoryError> {
        let key = descriptor.to_string();
        if let Some(hit) = self.geometries.get(&key) {
            return Ok(Arc::clone(hit));
        }

        let (kind, value) = split_descriptor(descriptor)?;
        let kind = resolve_type("geometry", kind, "Geometry", GEOMETRY_TYPES)?;
        let params = match value {
            Some(Variant::Array(items)) => items.clone(),
            Some(Variant::Null) | None => Vec::new(),
            Some(other) => vec![other.clone()],
        };

        let geometry = Arc::new(Geometry { kind, params });
        self.geometries.insert(key, Arc::clone(&geometry));
        Ok(geometry)
    }

    fn create_material(&mut self, descriptor: &Variant) -> Result<Arc<Material>, FactoryError> {
        let key = descriptor.to_string();
        if let Some(hit) = self.materials.get(&key) {
            return Ok(Arc::clone(hit));
        }

        let (kind, value) = split_descriptor(descriptor)?;
        let kind = resolve_type("material", kind, "Material", MATERIAL_TYPES)?;
        let params = value.cloned().unwrap_or_else(Variant::object);
        let texture = params.get("txr").and_then(Variant::as_str).map(Arc::from);
        if let Some(path) = &texture {
            log::debug!("material {kind} references texture {path}");
        }

        let material = Arc::new(Material {
            kind,
            params,
            texture,
        });
        self.materials.insert(key, Arc::clone(&material));
        Ok(material)
    }
}

/// `"Box"` or `{ type: "Box", value: .. }`.
fn split_descriptor(descriptor: &Variant) -> Result<(&str, Option<&Variant>), FactoryError> {
    if let Some(name) = descriptor.as_str() {
        return Ok((name, None));
    }
    match descriptor.get("type").and_then(Variant::as_str) {
        Some(name) => Ok((name, descriptor.get("value"))),
        None => Err(FactoryError::InvalidDescriptor(descriptor.to_string())),
    }
}

/// Accepts both the short (`Box`) and full (`BoxGeometry`) class name.
fn resolve_type(
    category: &'static str,
    name: &str,
    suffix: &str,
    known: &[&'static str],
) -> Result<Arc<str>, FactoryError> {
    let full = if name.ends_with(suffix) {
        name.to_string()
    } else {
        format!("{name}{suffix}")
    };
    known
        .iter()
        .find(|k| **k == full)
        .map(|k| Arc::from(*k))
        .ok_or_else(|| FactoryError::UnknownType {
            category,
            name: name.to_string(),
        })
}
