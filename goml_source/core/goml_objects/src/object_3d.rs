use std::borrow::Cow;
use std::sync::Arc;

use goml_ids::ObjectID;
use goml_structs::Transform3D;
use smallvec::SmallVec;

use crate::camera::Camera;
use crate::drawable::{Drawable, Material};
use crate::helper::Helper;
use crate::light::Light;

#[derive(Clone, Debug, PartialEq)]
pub enum ObjectKind {
    Group,
    Scene,
    Camera(Camera),
    Light(Light),
    Mesh(Drawable),
    Line(Drawable),
    Points(Drawable),
    Sprite { material: Option<Arc<Material>> },
    Helper(Helper),
}

impl ObjectKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ObjectKind::Group => "Group",
            ObjectKind::Scene => "Scene",
            ObjectKind::Camera(Camera::Perspective(_)) => "PerspectiveCamera",
            ObjectKind::Camera(Camera::Orthographic(_)) => "OrthographicCamera",
            ObjectKind::Light(light) => light.kind.class_name(),
            ObjectKind::Mesh(_) => "Mesh",
            ObjectKind::Line(_) => "Line",
            ObjectKind::Points(_) => "Points",
            ObjectKind::Sprite { .. } => "Sprite",
            ObjectKind::Helper(_) => "Helper",
        }
    }
}

/// A retained scene-graph object.
#[derive(Clone, Debug, PartialEq)]
pub struct Object3D {
    pub name: Cow<'static, str>,
    pub kind: ObjectKind,

    pub visible: bool,
    pub render_order: i32,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    pub transform: Transform3D,

    pub parent: ObjectID,
    pub children: SmallVec<[ObjectID; 4]>,
}

impl Object3D {
    pub fn new(kind: ObjectKind) -> Self {
        Self {
            name: Cow::Borrowed(kind.type_name()),
            kind,
            visible: true,
            render_order: 0,
            cast_shadow: false,
            receive_shadow: false,
            transform: Transform3D::default(),
            parent: ObjectID::nil(),
            children: SmallVec::new(),
        }
    }

    pub fn group() -> Self {
        Self::new(ObjectKind::Group)
    }

    pub fn light(&self) -> Option<&Light> {
        match &self.kind {
            ObjectKind::Light(light) => Some(light),
            _ => None,
        }
    }

    pub fn light_mut(&mut self) -> Option<&mut Light> {
        match &mut self.kind {
            ObjectKind::Light(light) => Some(light),
            _ => None,
        }
    }

    /// Geometry/material slot of meshes, lines and points.
    pub fn drawable_mut(&mut self) -> Option<&mut Drawable> {
        match &mut self.kind {
            ObjectKind::Mesh(d) | ObjectKind::Line(d) | ObjectKind::Points(d) => Some(d),
            _ => None,
        }
    }

    pub fn drawable(&self) -> Option<&Drawable> {
        match &self.kind {
            ObjectKind::Mesh(d) | ObjectKind::Line(d) | ObjectKind::Points(d) => Some(d),
            _ => None,
        }
    }

    /// Material slot shared by drawables and sprites.
    pub fn material_slot(&mut self) -> Option<&mut Option<Arc<Material>>> {
        match &mut self.kind {
            ObjectKind::Mesh(d) | ObjectKind::Line(d) | ObjectKind::Points(d) => {
                Some(&mut d.material)
            }
            ObjectKind::Sprite { material } => Some(material),
            _ => None,
        }
    }

    pub fn camera(&self) -> Option<&Camera> {
        match &self.kind {
            ObjectKind::Camera(cam) => Some(cam),
            _ => None,
        }
    }

    pub fn camera_mut(&mut self) -> Option<&mut Camera> {
        match &mut self.kind {
            ObjectKind::Camera(cam) => Some(cam),
            _ => None,
        }
    }

    pub fn shadow_camera(&self) -> Option<&Camera> {
        self.light()
            .and_then(|light| light.shadow.as_ref())
            .map(|shadow| &shadow.camera)
    }

    /// Shadow camera of a shadow-casting light.
    pub fn shadow_camera_mut(&mut self) -> Option<&mut Camera> {
        self.light_mut()
            .and_then(|light| light.shadow.as_mut())
            .map(|shadow| &mut shadow.camera)
    }
}
