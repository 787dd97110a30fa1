use goml_ids::NodeID;
use goml_variant::Variant;

use crate::document::Document;
use crate::error::{DocumentError, Result};
use crate::tags::ElementTag;

pub const INVALID_ASSET_PATH: &str =
    "src attribute of asset must be full, absolute or relative path.";

pub(crate) fn set_scene_attr(doc: &mut Document, id: NodeID, name: &str, value: &Variant) -> bool {
    if name != "physicsWorld" {
        return false;
    }
    doc.services.physics.create_world(id, value);
    true
}

/// `asset src`: the path must contain a `/`.
pub(crate) fn set_asset_attr(
    doc: &mut Document,
    id: NodeID,
    name: &str,
    value: &Variant,
) -> Result<bool> {
    if name != "src" {
        return Ok(false);
    }
    match value.as_str() {
        Some(path) if path.contains('/') => {
            doc.services.assets.load(id, path);
            Ok(true)
        }
        _ => Err(DocumentError::Attribute {
            tag: ElementTag::Asset,
            name: name.to_string(),
            message: INVALID_ASSET_PATH.to_string(),
        }),
    }
}
