use anyhow::anyhow;
use goml_ids::NodeID;
use goml_objects::{Camera, parse_color};
use goml_variant::Variant;

use crate::document::Document;
use crate::element::{RendererState, TagState, ViewportState};
use crate::frame_loop::FrameCallback;
use crate::render::Viewport;
use crate::tags::ElementTag;

fn renderer_state(doc: &Document, id: NodeID) -> Option<&RendererState> {
    match &doc.element(id)?.state {
        TagState::Renderer(state) => Some(state),
        _ => None,
    }
}

fn renderer_state_mut(doc: &mut Document, id: NodeID) -> Option<&mut RendererState> {
    match &mut doc.elements.get_mut(id)?.state {
        TagState::Renderer(state) => Some(state),
        _ => None,
    }
}

/// `rdr`: canvas `width`, `height` and `clearColor`.
pub(crate) fn set_renderer_attr(doc: &mut Document, id: NodeID, name: &str, value: &Variant) -> bool {
    match name {
        "width" | "height" => {
            let Some(size) = value.as_f32().filter(|v| *v >= 1.0) else {
                log::warn!("<rdr> {name}: expected a positive number, got {value}");
                return true;
            };
            if let Some(state) = renderer_state_mut(doc, id) {
                if name == "width" {
                    state.width = size.round() as u32;
                } else {
                    state.height = size.round() as u32;
                }
            }
            resize_viewports(doc, id);
            true
        }
        "clearColor" => {
            match (parse_color(value), renderer_state_mut(doc, id)) {
                (Some(color), Some(state)) => state.clear_color = color,
                (None, _) => log::warn!("<rdr> clearColor: expected a color, got {value}"),
                _ => {}
            }
            true
        }
        _ => false,
    }
}

pub(crate) fn get_renderer_attr(doc: &Document, id: NodeID, name: &str) -> Option<Variant> {
    let state = renderer_state(doc, id)?;
    match name {
        "width" => Some(Variant::from(state.width)),
        "height" => Some(Variant::from(state.height)),
        "clearColor" => Some(Variant::from(state.clear_color)),
        _ => None,
    }
}

/// Canvas size of the renderer owning `vps`, if `vps` sits under one.
fn canvas_of_vps(doc: &Document, vps: NodeID) -> Option<(f32, f32)> {
    let rdr = doc.element(vps)?.parent();
    let state = renderer_state(doc, rdr)?;
    Some((state.width as f32, state.height as f32))
}

fn resize_viewports(doc: &mut Document, rdr: NodeID) {
    let Some((width, height)) = renderer_state(doc, rdr).map(|s| (s.width as f32, s.height as f32))
    else {
        return;
    };
    for vp in viewports_of(doc, rdr) {
        set_size(doc, vp, width, height);
    }
}

/// Every `vp` under the renderer's `vps` children, in tree order.
pub(crate) fn viewports_of(doc: &Document, rdr: NodeID) -> Vec<NodeID> {
    let Some(element) = doc.element(rdr) else {
        return Vec::new();
    };
    element
        .children()
        .iter()
        .filter(|c| doc.tag(**c) == Some(ElementTag::Vps))
        .flat_map(|vps| doc.element(*vps).map(|e| e.children().to_vec()).unwrap_or_default())
        .filter(|c| doc.tag(*c) == Some(ElementTag::Vp))
        .collect()
}

/// `vps` sizes each appended child to the renderer canvas.
pub(crate) fn vps_append_hook(doc: &mut Document, vps: NodeID, child: NodeID) {
    if doc.tag(child) != Some(ElementTag::Vp) {
        log::debug!("<vps> only sizes <vp> children");
        return;
    }
    match canvas_of_vps(doc, vps) {
        Some((width, height)) => set_size(doc, child, width, height),
        None => log::debug!("<vps> {vps} is not inside an <rdr>"),
    }
}

fn fraction(doc: &Document, vp: NodeID, name: &str, default: f32) -> f32 {
    doc.stored_attribute(vp, name)
        .and_then(Variant::as_f32)
        .unwrap_or(default)
}

/// Lays `vp` out on a `width` x `height` canvas and fits its camera's aspect.
pub fn set_size(doc: &mut Document, vp: NodeID, width: f32, height: f32) {
    let rect = Viewport {
        x: fraction(doc, vp, "left", 0.0) * width,
        y: fraction(doc, vp, "top", 0.0) * height,
        width: fraction(doc, vp, "width", 1.0) * width,
        height: fraction(doc, vp, "height", 1.0) * height,
    };
    match doc.elements.get_mut(vp).map(|e| &mut e.state) {
        Some(TagState::Viewport(state)) => {
            *state = ViewportState {
                canvas: Some((width, height)),
                rect,
            };
        }
        _ => return,
    }
    fit_camera(doc, vp, rect);
}

/// Element referenced by a `vp` attribute (`"#id"` or `"id"`).
pub(crate) fn resolve_reference(doc: &Document, vp: NodeID, name: &str) -> Option<NodeID> {
    let reference = doc.stored_attribute(vp, name)?.as_str()?;
    doc.get_element_by_id(reference.strip_prefix('#').unwrap_or(reference))
}

/// Perspective cameras follow the viewport's aspect ratio.
pub(crate) fn fit_camera(doc: &mut Document, vp: NodeID, rect: Viewport) {
    if let Some(cam) = resolve_reference(doc, vp, "cam") {
        fit_camera_element(doc, cam, rect);
    }
}

/// [`fit_camera`] for an already resolved `cam` element.
pub(crate) fn fit_camera_element(doc: &mut Document, cam: NodeID, rect: Viewport) {
    let aspect = rect.aspect();
    if let Some(Camera::Perspective(camera)) = doc
        .core(cam)
        .and_then(|core| doc.objects.get_mut(core))
        .and_then(|object| object.camera_mut())
    {
        if camera.aspect != aspect {
            camera.aspect = aspect;
            camera.update_projection_matrix();
        }
    }
}

/// `vp`: `left`, `top`, `width`, `height` are canvas fractions; `cam` and
/// `scene` are read when drawing.
pub(crate) fn set_viewport_attr(doc: &mut Document, id: NodeID, name: &str, value: &Variant) -> bool {
    match name {
        "left" | "top" | "width" | "height" => {
            if value.as_f32().is_none() {
                log::warn!("<vp> {name}: expected a number, got {value}");
            }
            let canvas = match doc.element(id).map(|e| &e.state) {
                Some(TagState::Viewport(state)) => state.canvas,
                _ => None,
            };
            if let Some((width, height)) = canvas {
                set_size(doc, id, width, height);
            }
            true
        }
        "cam" | "scene" => true,
        _ => false,
    }
}

/// Registers the draw callback with the document's frame loop.
pub(crate) fn renderer_appended_hook(doc: &mut Document, id: NodeID) {
    if renderer_state(doc, id).is_some_and(|s| s.callback.is_some()) {
        return;
    }
    let handle = doc.weak_handle();
    if handle.strong_count() == 0 {
        log::warn!("<rdr> {id}: document is not shared, frames will not draw it");
        return;
    }

    let callback = FrameCallback::new(move |_time| {
        let Some(doc) = handle.upgrade() else {
            return Ok(());
        };
        let mut doc = doc
            .try_borrow_mut()
            .map_err(|_| anyhow!("document is borrowed while renderer {id} draws"))?;
        doc.render(id)?;
        Ok(())
    });
    doc.services.frame_loop.register_tree(&callback);
    if let Some(state) = renderer_state_mut(doc, id) {
        state.callback = Some(callback);
    }
}

pub(crate) fn renderer_removed_hook(doc: &mut Document, id: NodeID) {
    let Some(callback) = renderer_state_mut(doc, id).and_then(|s| s.callback.take()) else {
        return;
    };
    doc.services.frame_loop.unregister_tree(&callback);
}
