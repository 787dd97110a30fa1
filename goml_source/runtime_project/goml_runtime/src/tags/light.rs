use goml_ids::NodeID;
use goml_objects::{HelperTarget, Light, LightKind, Object3D, ObjectKind};
use goml_variant::Variant;

use crate::document::Document;
use crate::element::TagState;
use crate::error::Result;
use crate::tags::{self, ElementTag};

pub(crate) fn set_attr(doc: &mut Document, id: NodeID, name: &str, value: &Variant) -> Result<bool> {
    match name {
        "init" => {
            init(doc, id, value)?;
            Ok(true)
        }
        "helper" => {
            helper(doc, id, value);
            Ok(true)
        }
        "castShadow" => {
            if value.as_object().is_some() {
                configure_shadow(doc, id, value);
            }
            // The flag itself is handled by the common hook.
            Ok(true)
        }
        _ => Ok(false),
    }
}

pub(crate) fn get_attr(doc: &Document, id: NodeID, name: &str) -> Option<Variant> {
    match name {
        "helper" => {
            let element = doc.element(id)?;
            element.core()?;
            Some(Variant::Bool(element.helpers().light.is_some()))
        }
        _ => None,
    }
}

fn is_initialized(doc: &Document, id: NodeID) -> bool {
    matches!(
        doc.element(id).map(|e| &e.state),
        Some(TagState::Light { initialized: true })
    )
}

/// `init = { type: "Dir", value: [color, intensity, ..] }`, applied once.
fn init(doc: &mut Document, id: NodeID, value: &Variant) -> Result<()> {
    if is_initialized(doc, id) {
        log::debug!("light {id} is already initialized; ignoring init");
        return Ok(());
    }

    let code = value.get("type").and_then(Variant::as_str);
    let Some(kind) = code.and_then(LightKind::from_code) else {
        log::warn!("light {id}: unknown light type {}", code.unwrap_or("<missing>"));
        return Ok(());
    };
    let params = value.get("value").and_then(Variant::as_array).unwrap_or(&[]);
    let light = Light::from_params(kind, params);

    let core = doc.insert_core(id, Object3D::new(ObjectKind::Light(light)));
    if let Some(element) = doc.elements.get_mut(id) {
        element.state = TagState::Light { initialized: true };
    }
    let parent = doc.element(id).map(|e| e.parent()).unwrap_or_else(NodeID::nil);
    if let Some(parent_core) = doc.core(parent) {
        doc.objects.add(parent_core, core)?;
    }

    // Attributes written before init had no core to act on.
    let stored: Vec<(String, Variant)> = doc
        .element(id)
        .map(|e| {
            e.attributes()
                .iter()
                .filter(|(k, _)| k.as_str() != "init")
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()
        })
        .unwrap_or_default();
    for (name, value) in stored {
        tags::set_attr_hook(doc, id, ElementTag::Light, &name, &value)?;
    }
    Ok(())
}

/// Truthy shows the light helper, falsy removes it. With `castShadow` set the
/// shadow camera helper follows along.
fn helper(doc: &mut Document, id: NodeID, value: &Variant) {
    let Some(core) = doc.core(id) else {
        log::debug!("light {id}: helper set before init");
        return;
    };
    let Some(class_name) = doc
        .object(core)
        .and_then(|o| o.light())
        .map(|light| light.kind.class_name())
    else {
        return;
    };

    let show = value.is_truthy();
    doc.set_helper(id, class_name, show.then_some(HelperTarget::Object(core)));

    let cast_shadow = doc
        .stored_attribute(id, "castShadow")
        .is_some_and(Variant::is_truthy);
    if cast_shadow {
        doc.set_helper(id, "Camera", show.then_some(HelperTarget::ShadowCamera(core)));
    }
}

/// `castShadow = { mapSize, bias, <shadow camera property>.. }`
fn configure_shadow(doc: &mut Document, id: NodeID, value: &Variant) {
    let Some(entries) = value.as_object() else {
        return;
    };
    let Some(object) = doc.core(id).and_then(|core| doc.objects.get_mut(core)) else {
        return;
    };
    let Some(shadow) = object.light_mut().and_then(|light| light.shadow.as_mut()) else {
        log::debug!("light {id} has no shadow to configure");
        return;
    };

    for (key, v) in entries {
        match key.as_ref() {
            "mapSize" => match v.as_i64().and_then(|n| u32::try_from(n).ok()) {
                Some(size) => shadow.set_map_size(size),
                None => log::warn!("castShadow.mapSize: expected a positive integer, got {v}"),
            },
            "bias" => match v.as_f32() {
                Some(bias) => shadow.bias = bias,
                None => log::warn!("castShadow.bias: expected a number, got {v}"),
            },
            other => match v.as_f32() {
                Some(n) if shadow.camera.set_property(other, n) => {}
                _ => log::warn!("castShadow.{other}: not a shadow camera property, got {v}"),
            },
        }
    }
    shadow.camera.update_projection_matrix();
}
