use goml_ids::NodeID;
use goml_structs::{Euler, RotationOrder, Vector3};
use goml_variant::Variant;

use crate::document::Document;

const COMMON_ATTRIBUTES: &[&str] = &[
    "display",
    "rotateOrder",
    "renderOrder",
    "castShadow",
    "receiveShadow",
    "position",
    "rotation",
    "scale",
];

/// Attributes shared by every tag owning a core object. No-op while the core
/// is absent. Returns whether `name` is one of them.
pub(crate) fn set_attr(doc: &mut Document, id: NodeID, name: &str, value: &Variant) -> bool {
    if !COMMON_ATTRIBUTES.contains(&name) {
        return false;
    }
    let Some(object) = doc.core(id).and_then(|core| doc.objects.get_mut(core)) else {
        return true;
    };

    match name {
        // Only a literal `false` hides.
        "display" => object.visible = !value.is_false(),
        "rotateOrder" => match value.as_str().map(str::parse::<RotationOrder>) {
            Some(Ok(order)) => object.transform.rotation.order = order,
            _ => log::warn!("rotateOrder: expected one of XYZ, YZX, ZXY, XZY, YXZ, ZYX, got {value}"),
        },
        "renderOrder" => match value.as_i64() {
            Some(order) => object.render_order = order.clamp(i32::MIN as i64, i32::MAX as i64) as i32,
            None => log::warn!("renderOrder: expected a number, got {value}"),
        },
        "castShadow" => object.cast_shadow = value.is_truthy(),
        "receiveShadow" => object.receive_shadow = value.is_truthy(),
        "position" => match vec3_arg(value) {
            Some(v) => object.transform.position = v,
            None => log::warn!("position: expected (x, y, z), got {value}"),
        },
        "rotation" => match vec3_arg(value) {
            Some(v) => {
                let order = object.transform.rotation.order;
                object.transform.rotation = Euler::new(v.x, v.y, v.z, order);
            }
            None => log::warn!("rotation: expected (x, y, z), got {value}"),
        },
        // A single number scales uniformly.
        "scale" => match value.as_vec3() {
            Some(v) => object.transform.scale = v,
            None => log::warn!("scale: expected (x, y, z) or a number, got {value}"),
        },
        _ => {}
    }
    true
}

fn vec3_arg(value: &Variant) -> Option<Vector3> {
    value.as_array().and(value.as_vec3())
}

pub(crate) fn get_attr(doc: &Document, id: NodeID, name: &str) -> Option<Variant> {
    let object = doc.object(doc.core(id)?)?;
    let transform = &object.transform;
    Some(match name {
        "display" => Variant::Bool(object.visible),
        "rotateOrder" => Variant::from(transform.rotation.order.as_str()),
        "renderOrder" => Variant::from(object.render_order),
        "castShadow" => Variant::Bool(object.cast_shadow),
        "receiveShadow" => Variant::Bool(object.receive_shadow),
        "position" => Variant::from(transform.position),
        "rotation" => Variant::from(Vector3::new(
            transform.rotation.x,
            transform.rotation.y,
            transform.rotation.z,
        )),
        "scale" => Variant::from(transform.scale),
        _ => return None,
    })
}

/// Attaches the child's core under the parent's core when both exist.
pub(crate) fn append_hook(doc: &mut Document, parent: NodeID, child: NodeID) {
    let (Some(parent_core), Some(child_core)) = (doc.core(parent), doc.core(child)) else {
        return;
    };
    if let Err(err) = doc.objects.add(parent_core, child_core) {
        log::warn!("could not attach core of {child} to {parent}: {err}");
    }
}

pub(crate) fn remove_hook(doc: &mut Document, parent: NodeID, child: NodeID) {
    if let (Some(parent_core), Some(child_core)) = (doc.core(parent), doc.core(child)) {
        doc.objects.remove(parent_core, child_core);
    }
}
