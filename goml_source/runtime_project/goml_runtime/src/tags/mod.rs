//! Tag registry and attribute dispatch.
//!
//! Every write is stored on the element first, then routed here: the common
//! hook runs for every tag owning a core object, then the tag's own hook.

pub mod camera;
pub mod common;
pub mod drawable;
pub mod light;
pub mod render;
pub mod scene;

use std::fmt;
use std::str::FromStr;

use goml_ids::NodeID;
use goml_objects::{Camera, Drawable, Object3D, ObjectKind, OrthographicCamera, PerspectiveCamera};
use goml_variant::Variant;

use crate::document::Document;
use crate::error::{DocumentError, Result};

/// Generates `ElementTag`, its name table and its `FromStr`.
macro_rules! define_tags {
    ( $( $variant:ident => $name:tt ),+ $(,)? ) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ElementTag { $( $variant, )+ }

        static TAG_NAMES: phf::Map<&'static str, ElementTag> = phf::phf_map! {
            $( $name => ElementTag::$variant, )+
        };

        impl ElementTag {
            pub const ALL: &'static [ElementTag] = &[ $( ElementTag::$variant, )+ ];

            pub const fn as_str(self) -> &'static str {
                match self {
                    $( ElementTag::$variant => $name, )+
                }
            }
        }
    };
}

define_tags! {
    Asset => "asset",
    Body => "body",
    Cam => "cam",
    Head => "head",
    Light => "light",
    Line => "line",
    Mesh => "mesh",
    Meshes => "meshes",
    Obj => "obj",
    Ocam => "ocam",
    Points => "points",
    Rdr => "rdr",
    Rdrs => "rdrs",
    Scene => "scene",
    Scenes => "scenes",
    Sprite => "sprite",
    Vp => "vp",
    Vps => "vps",
}

impl FromStr for ElementTag {
    type Err = DocumentError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        TAG_NAMES
            .get(s)
            .copied()
            .ok_or_else(|| DocumentError::UnknownTag(s.to_string()))
    }
}

impl fmt::Display for ElementTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ElementTag {
    /// Core object built in the element's constructor. `light` gets its core
    /// from `init`; structural tags never get one.
    pub fn new_core(self) -> Option<Object3D> {
        let kind = match self {
            ElementTag::Asset | ElementTag::Obj | ElementTag::Meshes => ObjectKind::Group,
            ElementTag::Scene => ObjectKind::Scene,
            ElementTag::Cam => ObjectKind::Camera(Camera::Perspective(PerspectiveCamera::default())),
            ElementTag::Ocam => {
                ObjectKind::Camera(Camera::Orthographic(OrthographicCamera::default()))
            }
            ElementTag::Mesh => ObjectKind::Mesh(Drawable::default()),
            ElementTag::Line => ObjectKind::Line(Drawable::default()),
            ElementTag::Points => ObjectKind::Points(Drawable::default()),
            ElementTag::Sprite => ObjectKind::Sprite { material: None },
            ElementTag::Light
            | ElementTag::Body
            | ElementTag::Head
            | ElementTag::Scenes
            | ElementTag::Rdrs
            | ElementTag::Rdr
            | ElementTag::Vps
            | ElementTag::Vp => return None,
        };
        Some(Object3D::new(kind))
    }
}

pub(crate) fn set_attr_hook(
    doc: &mut Document,
    id: NodeID,
    tag: ElementTag,
    name: &str,
    value: &Variant,
) -> Result<()> {
    let common = common::set_attr(doc, id, name, value);
    let handled = match tag {
        ElementTag::Cam | ElementTag::Ocam => camera::set_attr(doc, id, tag, name, value),
        ElementTag::Light => light::set_attr(doc, id, name, value)?,
        ElementTag::Mesh | ElementTag::Line | ElementTag::Points | ElementTag::Sprite => {
            drawable::set_attr(doc, id, tag, name, value)
        }
        ElementTag::Meshes => drawable::set_meshes_attr(doc, id, name, value),
        ElementTag::Scene => scene::set_scene_attr(doc, id, name, value),
        ElementTag::Asset => scene::set_asset_attr(doc, id, name, value)?,
        ElementTag::Rdr => render::set_renderer_attr(doc, id, name, value),
        ElementTag::Vp => render::set_viewport_attr(doc, id, name, value),
        _ => false,
    };
    if !common && !handled && name != "id" {
        log::debug!("<{tag}> ignores attribute {name}");
    }
    Ok(())
}

pub(crate) fn get_attr_hook(
    doc: &Document,
    id: NodeID,
    tag: ElementTag,
    name: &str,
) -> Option<Variant> {
    let specific = match tag {
        ElementTag::Cam | ElementTag::Ocam => camera::get_attr(doc, id, tag, name),
        ElementTag::Light => light::get_attr(doc, id, name),
        ElementTag::Rdr => render::get_renderer_attr(doc, id, name),
        _ => None,
    };
    specific.or_else(|| common::get_attr(doc, id, name))
}

/// `child` was linked under `parent`.
pub(crate) fn append_hook(doc: &mut Document, parent: NodeID, child: NodeID) {
    common::append_hook(doc, parent, child);
    if doc.tag(parent) == Some(ElementTag::Vps) {
        render::vps_append_hook(doc, parent, child);
    }
}

/// `child` is about to be unlinked from `parent`.
pub(crate) fn remove_hook(doc: &mut Document, parent: NodeID, child: NodeID) {
    common::remove_hook(doc, parent, child);
}

/// `id` became part of the connected tree.
pub(crate) fn appended_hook(doc: &mut Document, id: NodeID) {
    match doc.tag(id) {
        Some(ElementTag::Mesh) => drawable::mesh_appended_hook(doc, id),
        Some(ElementTag::Rdr) => render::renderer_appended_hook(doc, id),
        _ => {}
    }
}

/// `id` is about to leave the connected tree.
pub(crate) fn removed_hook(doc: &mut Document, id: NodeID) {
    match doc.tag(id) {
        Some(ElementTag::Mesh) => drawable::mesh_removed_hook(doc, id),
        Some(ElementTag::Rdr) => render::renderer_removed_hook(doc, id),
        _ => {}
    }
}
