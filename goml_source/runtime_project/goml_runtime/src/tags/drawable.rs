use goml_ids::{NodeID, ObjectID};
use goml_objects::{Drawable, Object3D, ObjectKind};
use goml_variant::Variant;

use crate::document::Document;
use crate::element::TagState;
use crate::tags::ElementTag;

/// `mesh`, `line`, `points`: `geo` + `mtl`. `sprite`: `mtl` only.
/// `mesh` also tracks `physics`.
pub(crate) fn set_attr(
    doc: &mut Document,
    id: NodeID,
    tag: ElementTag,
    name: &str,
    value: &Variant,
) -> bool {
    match name {
        "geo" if tag != ElementTag::Sprite => {
            let geometry = match doc.services.factory.create_geometry(value) {
                Ok(geometry) => geometry,
                Err(err) => {
                    log::warn!("<{tag}> geo: {err}");
                    return true;
                }
            };
            if let Some(drawable) = doc
                .core(id)
                .and_then(|core| doc.objects.get_mut(core))
                .and_then(|object| object.drawable_mut())
            {
                drawable.geometry = Some(geometry);
            }
            true
        }
        "mtl" => {
            let material = match doc.services.factory.create_material(value) {
                Ok(material) => material,
                Err(err) => {
                    log::warn!("<{tag}> mtl: {err}");
                    return true;
                }
            };
            if let Some(slot) = doc
                .core(id)
                .and_then(|core| doc.objects.get_mut(core))
                .and_then(|object| object.material_slot())
            {
                *slot = Some(material);
            }
            true
        }
        "physics" if tag == ElementTag::Mesh => {
            if physics_registered(doc, id) {
                doc.services.physics.style_changed(id, value);
            }
            true
        }
        _ => false,
    }
}

fn physics_registered(doc: &Document, id: NodeID) -> bool {
    matches!(
        doc.element(id).map(|e| &e.state),
        Some(TagState::Mesh {
            physics_registered: true
        })
    )
}

fn set_physics_registered(doc: &mut Document, id: NodeID, registered: bool) {
    if let Some(element) = doc.elements.get_mut(id) {
        element.state = TagState::Mesh {
            physics_registered: registered,
        };
    }
}

pub(crate) fn mesh_appended_hook(doc: &mut Document, id: NodeID) {
    let Some(config) = doc.stored_attribute(id, "physics").cloned() else {
        return;
    };
    if config.is_truthy() && !physics_registered(doc, id) {
        doc.services.physics.register(id, &config);
        set_physics_registered(doc, id, true);
    }
}

pub(crate) fn mesh_removed_hook(doc: &mut Document, id: NodeID) {
    if physics_registered(doc, id) {
        doc.services.physics.unregister(id);
        set_physics_registered(doc, id, false);
    }
}

/// `meshes`: one child mesh per `geos[n]` / `mtls[n]` pair. The attribute
/// being set decides how many meshes are built.
pub(crate) fn set_meshes_attr(doc: &mut Document, id: NodeID, name: &str, value: &Variant) -> bool {
    match name {
        "geos" => {
            let Some(geos) = value.as_array() else {
                log::warn!("<meshes> geos: expected an array, got {value}");
                return true;
            };
            let Some(mtls) = doc.stored_attribute(id, "mtls").cloned() else {
                return true;
            };
            let mtls = mtls.as_array().unwrap_or(&[]);
            build_meshes(doc, id, geos, mtls, geos.len());
            true
        }
        "mtls" => {
            let Some(mtls) = value.as_array() else {
                log::warn!("<meshes> mtls: expected an array, got {value}");
                return true;
            };
            // Builds every material up front so their textures start loading.
            for descriptor in mtls {
                if let Err(err) = doc.services.factory.create_material(descriptor) {
                    log::warn!("<meshes> mtls: {err}");
                }
            }
            let geos = doc.stored_attribute(id, "geos").cloned();
            let has_children = doc.element(id).is_some_and(|e| !e.children().is_empty());
            if let Some(geos) = geos.as_ref().and_then(Variant::as_array) {
                if !has_children {
                    build_meshes(doc, id, geos, mtls, mtls.len());
                }
            }
            true
        }
        _ => false,
    }
}

fn build_meshes(
    doc: &mut Document,
    id: NodeID,
    geos: &[Variant],
    mtls: &[Variant],
    count: usize,
) {
    let Some(group) = doc.core(id) else {
        return;
    };

    // Rebuilding replaces the meshes from the previous pairing.
    let previous = match doc.elements.get_mut(id).map(|e| &mut e.state) {
        Some(TagState::Meshes { generated }) => std::mem::take(generated),
        _ => Vec::new(),
    };
    for mesh in previous {
        doc.objects.destroy(mesh);
    }

    let mut generated: Vec<ObjectID> = Vec::with_capacity(count);
    for n in 0..count {
        let Some(geo) = geos.get(n) else {
            log::debug!("<meshes> no geos[{n}] for mtls[{n}]");
            continue;
        };
        let geometry = match doc.services.factory.create_geometry(geo) {
            Ok(geometry) => geometry,
            Err(err) => {
                log::warn!("<meshes> geos[{n}]: {err}");
                continue;
            }
        };
        let material = mtls
            .get(n)
            .and_then(|m| match doc.services.factory.create_material(m) {
                Ok(material) => Some(material),
                Err(err) => {
                    log::warn!("<meshes> mtls[{n}]: {err}");
                    None
                }
            });

        let mesh = doc.objects.insert(Object3D::new(ObjectKind::Mesh(Drawable::new(
            Some(geometry),
            material,
        ))));
        match doc.objects.add(group, mesh) {
            Ok(()) => generated.push(mesh),
            Err(err) => {
                log::warn!("<meshes> could not attach mesh {n}: {err}");
                doc.objects.destroy(mesh);
            }
        }
    }

    if let Some(TagState::Meshes { generated: slot }) =
        doc.elements.get_mut(id).map(|e| &mut e.state)
    {
        *slot = generated;
    }
}
