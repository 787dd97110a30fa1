use goml_ids::NodeID;
use goml_variant::Variant;

use crate::document::Document;
use crate::tags::ElementTag;

const PERSPECTIVE_ATTRIBUTES: &[&str] = &["fov", "near", "far", "zoom", "aspect"];

const ORTHOGRAPHIC_ATTRIBUTES: &[&str] = &[
    "zoom", "near", "far", "width", "height", "left", "right", "top", "bottom",
];

fn attributes(tag: ElementTag) -> &'static [&'static str] {
    match tag {
        ElementTag::Ocam => ORTHOGRAPHIC_ATTRIBUTES,
        _ => PERSPECTIVE_ATTRIBUTES,
    }
}

/// `cam` / `ocam`: write the projection field, then recompute the matrix.
pub(crate) fn set_attr(
    doc: &mut Document,
    id: NodeID,
    tag: ElementTag,
    name: &str,
    value: &Variant,
) -> bool {
    if !attributes(tag).contains(&name) {
        return false;
    }
    let Some(v) = value.as_f32() else {
        log::warn!("<{tag}> {name}: expected a number, got {value}");
        return true;
    };
    if let Some(camera) = doc
        .core(id)
        .and_then(|core| doc.objects.get_mut(core))
        .and_then(|object| object.camera_mut())
    {
        camera.set_property(name, v);
        camera.update_projection_matrix();
    }
    true
}

pub(crate) fn get_attr(doc: &Document, id: NodeID, tag: ElementTag, name: &str) -> Option<Variant> {
    if !attributes(tag).contains(&name) {
        return None;
    }
    doc.object(doc.core(id)?)?
        .camera()?
        .property(name)
        .map(Variant::from)
}
