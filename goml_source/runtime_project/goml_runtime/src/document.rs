use std::cell::RefCell;
use std::rc::{Rc, Weak};

use ahash::AHashMap;
use goml_ids::{NodeID, ObjectID};
use goml_markup::{MarkupDocument, MarkupElement, MarkupNode};
use goml_objects::{
    DescriptorFactory, Helper, HelperKind, HelperTarget, Object3D, ObjectGraph, ObjectKind,
    ResourceFactory,
};
use goml_variant::Variant;
use smallvec::SmallVec;

use crate::assets::{AssetLoader, QueuedAssetLoader};
use crate::element::{Element, TagState};
use crate::element_arena::ElementArena;
use crate::error::{DocumentError, Result};
use crate::frame_loop::{self, FrameLoop};
use crate::physics::{NullPhysics, PhysicsBridge};
use crate::render::{RecordingBackend, RenderBackend, RenderPass};
use crate::tags::{self, ElementTag, render};

/// External collaborators a document drives.
pub struct DocumentServices {
    pub factory: Box<dyn ResourceFactory>,
    pub assets: Box<dyn AssetLoader>,
    pub physics: Box<dyn PhysicsBridge>,
    pub renderer: Box<dyn RenderBackend>,
    pub frame_loop: Rc<FrameLoop>,
}

impl Default for DocumentServices {
    fn default() -> Self {
        Self {
            factory: Box::new(DescriptorFactory::new()),
            assets: Box::new(QueuedAssetLoader::new()),
            physics: Box::new(NullPhysics::new()),
            renderer: Box::new(RecordingBackend::new()),
            frame_loop: frame_loop::default_loop(),
        }
    }
}

/// Element tree plus the core objects its elements own.
///
/// Top-level elements are tracked as roots; an element is *connected* when
/// its ancestor chain ends at a root. Connecting a subtree runs the appended
/// hooks, disconnecting it runs the removed hooks.
pub struct Document {
    pub(crate) elements: ElementArena,
    pub(crate) objects: ObjectGraph,
    pub(crate) services: DocumentServices,
    roots: Vec<NodeID>,
    owners: AHashMap<ObjectID, NodeID>,
    self_handle: Weak<RefCell<Document>>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self::with_services(DocumentServices::default())
    }

    pub fn with_services(services: DocumentServices) -> Self {
        Self {
            elements: ElementArena::new(),
            objects: ObjectGraph::new(),
            services,
            roots: Vec::new(),
            owners: AHashMap::default(),
            self_handle: Weak::new(),
        }
    }

    /// A document renderers can reach from frame callbacks.
    pub fn new_shared() -> Rc<RefCell<Document>> {
        Self::new_shared_with(DocumentServices::default())
    }

    pub fn new_shared_with(services: DocumentServices) -> Rc<RefCell<Document>> {
        Rc::new_cyclic(|weak| {
            let mut doc = Document::with_services(services);
            doc.self_handle = weak.clone();
            RefCell::new(doc)
        })
    }

    pub(crate) fn weak_handle(&self) -> Weak<RefCell<Document>> {
        self.self_handle.clone()
    }

    // ---------- lookup ----------

    pub fn element(&self, id: NodeID) -> Option<&Element> {
        self.elements.get(id)
    }

    fn element_or_err(&self, id: NodeID) -> Result<&Element> {
        self.elements.get(id).ok_or(DocumentError::Missing(id))
    }

    pub fn contains(&self, id: NodeID) -> bool {
        self.elements.contains(id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn tag(&self, id: NodeID) -> Option<ElementTag> {
        self.elements.get(id).map(Element::tag)
    }

    pub fn core(&self, id: NodeID) -> Option<ObjectID> {
        self.elements.get(id).and_then(Element::core)
    }

    pub fn object(&self, id: ObjectID) -> Option<&Object3D> {
        self.objects.get(id)
    }

    pub fn objects(&self) -> &ObjectGraph {
        &self.objects
    }

    pub fn services(&self) -> &DocumentServices {
        &self.services
    }

    pub fn services_mut(&mut self) -> &mut DocumentServices {
        &mut self.services
    }

    /// Core object of `id`, resolved through the element.
    pub fn core_object(&self, id: NodeID) -> Option<&Object3D> {
        self.objects.get(self.core(id)?)
    }

    /// Reverse lookup: the element owning a core object.
    pub fn element_for_object(&self, object: ObjectID) -> Option<NodeID> {
        self.owners.get(&object).copied()
    }

    pub fn roots(&self) -> &[NodeID] {
        &self.roots
    }

    pub fn parent(&self, id: NodeID) -> Option<NodeID> {
        self.elements
            .get(id)
            .map(Element::parent)
            .filter(|p| !p.is_nil())
    }

    pub fn children(&self, id: NodeID) -> &[NodeID] {
        self.elements.get(id).map(Element::children).unwrap_or(&[])
    }

    /// `id` and its descendants, depth-first pre-order.
    pub fn subtree(&self, id: NodeID) -> Vec<NodeID> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(element) = self.elements.get(current) {
                out.push(current);
                stack.extend(element.children.iter().rev().copied());
            }
        }
        out
    }

    /// Every connected element in tree order.
    pub fn traverse(&self) -> Vec<NodeID> {
        self.roots.iter().flat_map(|root| self.subtree(*root)).collect()
    }

    pub fn is_connected(&self, id: NodeID) -> bool {
        let mut current = id;
        loop {
            match self.elements.get(current) {
                Some(element) if element.parent.is_nil() => return self.roots.contains(&current),
                Some(element) => current = element.parent,
                None => return false,
            }
        }
    }

    /// First element whose `id` attribute equals `element_id`, connected
    /// elements first in document order. Stops at the first match.
    pub fn get_element_by_id(&self, element_id: &str) -> Option<NodeID> {
        let matches = |id: NodeID| {
            self.elements
                .get(id)
                .and_then(Element::id_attribute)
                .is_some_and(|v| v == element_id)
        };

        let mut stack: SmallVec<[NodeID; 32]> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if matches(id) {
                return Some(id);
            }
            if let Some(element) = self.elements.get(id) {
                stack.extend(element.children.iter().rev().copied());
            }
        }
        self.elements.iter().map(|(id, _)| id).find(|id| matches(*id))
    }

    /// Nearest ancestor-or-self `scene`.
    pub fn get_scene(&self, id: NodeID) -> Option<NodeID> {
        let mut current = id;
        while let Some(element) = self.elements.get(current) {
            if element.tag == ElementTag::Scene {
                return Some(current);
            }
            current = element.parent;
        }
        None
    }

    // ---------- creation and attributes ----------

    /// Creates a detached element and its core object.
    pub fn create_element(&mut self, tag: &str) -> Result<NodeID> {
        let tag: ElementTag = tag.parse()?;
        let id = self.elements.insert(Element::new(tag, None));
        if let Some(object) = tag.new_core() {
            self.insert_core(id, object);
        }
        Ok(id)
    }

    pub(crate) fn insert_core(&mut self, id: NodeID, object: Object3D) -> ObjectID {
        let core = self.objects.insert(object);
        self.owners.insert(core, id);
        if let Some(element) = self.elements.get_mut(id) {
            element.core = Some(core);
        }
        core
    }

    /// Stores the value, then runs the tag's attribute hook.
    pub fn set_attribute(&mut self, id: NodeID, name: &str, value: impl Into<Variant>) -> Result<()> {
        let value = value.into();
        let element = self.elements.get_mut(id).ok_or(DocumentError::Missing(id))?;
        let tag = element.tag;
        element.attributes.insert(name.to_string(), value.clone());
        tags::set_attr_hook(self, id, tag, name, &value)
    }

    /// Reads through the tag's hook, falling back to the stored value.
    pub fn get_attribute(&self, id: NodeID, name: &str) -> Option<Variant> {
        let tag = self.tag(id)?;
        tags::get_attr_hook(self, id, tag, name).or_else(|| self.stored_attribute(id, name).cloned())
    }

    pub fn stored_attribute(&self, id: NodeID, name: &str) -> Option<&Variant> {
        self.elements.get(id)?.attributes.get(name)
    }

    // ---------- tree mutation ----------

    pub fn append_child(&mut self, parent: NodeID, child: NodeID) -> Result<()> {
        self.insert_before(parent, child, None)
    }

    /// Links `child` under `parent` before `reference` (or last). A child that
    /// already has a place in the tree is moved, not destroyed.
    pub fn insert_before(
        &mut self,
        parent: NodeID,
        child: NodeID,
        reference: Option<NodeID>,
    ) -> Result<()> {
        self.element_or_err(parent)?;
        self.element_or_err(child)?;
        if self.is_ancestor_or_self(child, parent) {
            return Err(DocumentError::Cycle { parent, child });
        }
        if let Some(reference) = reference {
            if self.parent(reference) != Some(parent) {
                return Err(DocumentError::NotAChild {
                    parent,
                    child: reference,
                });
            }
        }

        self.detach(child);

        if let Some(element) = self.elements.get_mut(parent) {
            let position = reference
                .and_then(|r| element.children.iter().position(|c| *c == r))
                .unwrap_or(element.children.len());
            element.children.insert(position, child);
        }
        if let Some(element) = self.elements.get_mut(child) {
            element.parent = parent;
        }

        tags::append_hook(self, parent, child);
        if self.is_connected(parent) {
            for id in self.subtree(child) {
                tags::appended_hook(self, id);
            }
        }
        Ok(())
    }

    /// Adds a top-level element; its subtree becomes connected.
    pub fn append_root(&mut self, id: NodeID) -> Result<()> {
        self.element_or_err(id)?;
        self.detach(id);
        self.roots.push(id);
        for element in self.subtree(id) {
            tags::appended_hook(self, element);
        }
        Ok(())
    }

    /// Unlinks `child` from `parent` and destroys it with its subtree.
    pub fn remove_child(&mut self, parent: NodeID, child: NodeID) -> Result<()> {
        if self.parent(child) != Some(parent) {
            return Err(DocumentError::NotAChild { parent, child });
        }
        self.detach(child);
        self.destroy(child);
        Ok(())
    }

    /// Removes a top-level element and destroys its subtree.
    pub fn remove_root(&mut self, id: NodeID) -> Result<()> {
        if !self.roots.contains(&id) {
            return Err(DocumentError::Missing(id));
        }
        self.detach(id);
        self.destroy(id);
        Ok(())
    }

    fn is_ancestor_or_self(&self, ancestor: NodeID, id: NodeID) -> bool {
        let mut current = id;
        while !current.is_nil() {
            if current == ancestor {
                return true;
            }
            current = self.elements.get(current).map(|e| e.parent).unwrap_or_else(NodeID::nil);
        }
        false
    }

    /// Takes `id` out of its parent (or the roots) without destroying it.
    fn detach(&mut self, id: NodeID) {
        let parent = match self.elements.get(id) {
            Some(element) => element.parent,
            None => return,
        };
        let is_root = parent.is_nil() && self.roots.contains(&id);
        if parent.is_nil() && !is_root {
            return;
        }

        if self.is_connected(id) {
            for element in self.subtree(id) {
                tags::removed_hook(self, element);
            }
        }

        if is_root {
            self.roots.retain(|r| *r != id);
        } else {
            tags::remove_hook(self, parent, id);
            if let Some(p) = self.elements.get_mut(parent) {
                p.children.retain(|c| *c != id);
            }
            if let Some(element) = self.elements.get_mut(id) {
                element.parent = NodeID::nil();
            }
        }
    }

    /// Frees a detached subtree: elements, core objects and helpers.
    fn destroy(&mut self, id: NodeID) {
        for element_id in self.subtree(id) {
            let Some(element) = self.elements.remove(element_id) else {
                continue;
            };
            for helper in [element.helpers.light, element.helpers.camera].into_iter().flatten() {
                self.objects.destroy(helper);
            }
            if let Some(core) = element.core {
                self.owners.remove(&core);
                self.objects.destroy(core);
            }
            if let TagState::Renderer(state) = &element.state {
                if let Some(callback) = &state.callback {
                    self.services.frame_loop.unregister_tree(callback);
                }
            }
        }
    }

    // ---------- object helpers ----------

    /// Adds (with `target`) or removes (without) a debug helper on `id`'s
    /// core. `"Camera"` uses the camera slot, every other name the light slot.
    pub fn set_helper(&mut self, id: NodeID, type_name: &str, target: Option<HelperTarget>) {
        let camera_slot = type_name == "Camera";
        let Some(element) = self.elements.get_mut(id) else {
            return;
        };
        let core = element.core;
        let slot = if camera_slot {
            &mut element.helpers.camera
        } else {
            &mut element.helpers.light
        };

        let Some(target) = target else {
            if let Some(old) = slot.take() {
                self.objects.destroy(old);
            }
            return;
        };
        let Some(kind) = HelperKind::for_type_name(type_name) else {
            log::warn!("no helper exists for {type_name}");
            return;
        };
        let Some(core) = core else {
            log::warn!("element {id} has no core object to hold a helper");
            return;
        };

        let previous = slot.take();
        if let Some(old) = previous {
            self.objects.destroy(old);
        }
        let helper = self
            .objects
            .insert(Object3D::new(ObjectKind::Helper(Helper { kind, target })));
        if let Err(err) = self.objects.add(core, helper) {
            log::warn!("could not attach helper to {id}: {err}");
            self.objects.destroy(helper);
            return;
        }
        if let Some(element) = self.elements.get_mut(id) {
            if camera_slot {
                element.helpers.camera = Some(helper);
            } else {
                element.helpers.light = Some(helper);
            }
        }
    }

    /// Moves `id`'s core along `(x, y, z)` normalized, by its length.
    pub fn translate(&mut self, id: NodeID, x: f32, y: f32, z: f32) -> bool {
        match self.core(id) {
            Some(core) => self.objects.translate(core, x, y, z),
            None => false,
        }
    }

    pub fn translate_x(&mut self, id: NodeID, distance: f32) -> bool {
        self.translate_axis(id, |t| t.translate_x(distance))
    }

    pub fn translate_y(&mut self, id: NodeID, distance: f32) -> bool {
        self.translate_axis(id, |t| t.translate_y(distance))
    }

    pub fn translate_z(&mut self, id: NodeID, distance: f32) -> bool {
        self.translate_axis(id, |t| t.translate_z(distance))
    }

    fn translate_axis(&mut self, id: NodeID, f: impl FnOnce(&mut goml_structs::Transform3D)) -> bool {
        match self.core(id).and_then(|core| self.objects.get_mut(core)) {
            Some(object) => {
                f(&mut object.transform);
                true
            }
            None => false,
        }
    }

    /// Sizes a `vp` element to a canvas.
    pub fn set_viewport_size(&mut self, vp: NodeID, width: f32, height: f32) {
        render::set_size(self, vp, width, height);
    }

    // ---------- markup ----------

    /// Parses and builds `src`, appending its top-level elements as roots.
    pub fn load_str(&mut self, src: &str) -> Result<Vec<NodeID>> {
        let markup = goml_markup::parse(src)?;
        Ok(self.build(&markup))
    }

    /// Builds elements for a parsed document. Unknown tags are skipped with
    /// their subtree; attribute errors are logged and the build continues.
    pub fn build(&mut self, markup: &MarkupDocument) -> Vec<NodeID> {
        markup
            .roots
            .iter()
            .filter_map(|root| self.build_element(None, root))
            .collect()
    }

    fn build_element(&mut self, parent: Option<NodeID>, markup: &MarkupElement) -> Option<NodeID> {
        let id = match self.create_element(&markup.tag) {
            Ok(id) => id,
            Err(err) => {
                log::warn!("line {}: {err}, skipping its subtree", markup.line);
                return None;
            }
        };
        for (name, value) in &markup.attributes {
            if let Err(err) = self.set_attribute(id, name, value.clone()) {
                log::error!("line {}: <{}> {name}: {err}", markup.line, markup.tag);
            }
        }

        let attached = match parent {
            Some(parent) => self.append_child(parent, id),
            None => self.append_root(id),
        };
        if let Err(err) = attached {
            log::error!("line {}: {err}", markup.line);
            self.destroy(id);
            return None;
        }

        for child in &markup.children {
            match child {
                MarkupNode::Element(element) => {
                    self.build_element(Some(id), element);
                }
                MarkupNode::Text(text) => {
                    log::debug!("<{}> ignores text {text:?}", markup.tag);
                }
            }
        }
        Some(id)
    }

    // ---------- drawing ----------

    /// Draws every viewport of renderer `rdr`. Viewports missing a camera or a
    /// scene are skipped. Returns the number of passes drawn.
    pub fn render(&mut self, rdr: NodeID) -> anyhow::Result<usize> {
        let clear_color = match self.elements.get(rdr).map(|e| &e.state) {
            Some(TagState::Renderer(state)) => state.clear_color,
            _ => anyhow::bail!("element {rdr} is not a renderer"),
        };

        let mut drawn = 0;
        for vp in render::viewports_of(self, rdr) {
            let rect = match self.elements.get(vp).map(|e| &e.state) {
                Some(TagState::Viewport(state)) => state.rect,
                _ => continue,
            };
            let camera_element = render::resolve_reference(self, vp, "cam");
            let scene_element = render::resolve_reference(self, vp, "scene");
            let (Some(camera_element), Some(scene_element)) = (camera_element, scene_element) else {
                log::debug!("vp {vp} has no camera or scene to draw");
                continue;
            };
            let (Some(camera), Some(scene)) = (self.core(camera_element), self.core(scene_element))
            else {
                continue;
            };

            // The camera may have been created after the viewport was sized.
            render::fit_camera_element(self, camera_element, rect);

            let Some(projection) = self
                .objects
                .get(camera)
                .and_then(|o| o.camera())
                .map(|c| c.projection())
            else {
                log::debug!("vp {vp}: cam does not point at a camera");
                continue;
            };
            let view = self
                .objects
                .world_matrix(camera)
                .map(|m| m.inverse())
                .unwrap_or_default();

            let pass = RenderPass {
                renderer: rdr,
                viewport: rect,
                clear_color,
                scene,
                camera,
                view_projection: projection * view,
            };
            self.services.renderer.render(&pass, &self.objects)?;
            drawn += 1;
        }
        Ok(drawn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame_loop::CallbackList;
    use crate::physics::PhysicsEvent;
    use crate::tags::scene::INVALID_ASSET_PATH;
    use goml_objects::Camera;

    struct Fixture {
        physics: NullPhysics,
        assets: QueuedAssetLoader,
        backend: RecordingBackend,
        frame_loop: Rc<FrameLoop>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                physics: NullPhysics::new(),
                assets: QueuedAssetLoader::new(),
                backend: RecordingBackend::new(),
                frame_loop: Rc::new(FrameLoop::new()),
            }
        }

        fn services(&self) -> DocumentServices {
            DocumentServices {
                factory: Box::new(DescriptorFactory::new()),
                assets: Box::new(self.assets.clone()),
                physics: Box::new(self.physics.clone()),
                renderer: Box::new(self.backend.clone()),
                frame_loop: Rc::clone(&self.frame_loop),
            }
        }

        fn document(&self) -> Document {
            Document::with_services(self.services())
        }
    }

    fn by_id(doc: &Document, id: &str) -> NodeID {
        doc.get_element_by_id(id).unwrap()
    }

    fn camera_of(doc: &Document, id: NodeID) -> Camera {
        doc.core_object(id).and_then(|o| o.camera()).cloned().unwrap()
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let mut doc = Document::new();
        assert!(matches!(
            doc.create_element("div"),
            Err(DocumentError::UnknownTag(name)) if name == "div"
        ));
    }

    #[test]
    fn lookup_by_id_prefers_connected_elements_in_document_order() {
        let mut doc = Document::new();
        let detached = doc.create_element("obj").unwrap();
        doc.set_attribute(detached, "id", "dup").unwrap();
        assert_eq!(doc.get_element_by_id("dup"), Some(detached));

        doc.load_str(
            r#"<scene id="a"><obj id="outer"><obj id="dup" /></obj></scene>
               <scene id="b"><obj id="dup" /></scene>"#,
        )
        .unwrap();
        let found = doc.get_element_by_id("dup").unwrap();
        let outer = by_id(&doc, "outer");
        assert_eq!(doc.element(found).unwrap().parent(), outer);

        doc.remove_child(outer, found).unwrap();
        let scene_b = doc.get_element_by_id("b");
        let next = doc.get_element_by_id("dup").unwrap();
        assert_eq!(doc.get_scene(next), scene_b);
        assert_eq!(doc.get_element_by_id("missing"), None);
    }

    #[test]
    fn only_literal_false_hides() {
        let mut doc = Document::new();
        let mesh = doc.create_element("mesh").unwrap();
        let visible = |doc: &Document| doc.core_object(mesh).unwrap().visible;

        doc.set_attribute(mesh, "display", false).unwrap();
        assert!(!visible(&doc));
        assert_eq!(doc.get_attribute(mesh, "display"), Some(Variant::Bool(false)));

        doc.set_attribute(mesh, "display", 0).unwrap();
        assert!(visible(&doc));
        doc.set_attribute(mesh, "display", Variant::Null).unwrap();
        assert!(visible(&doc));
        doc.set_attribute(mesh, "display", "").unwrap();
        assert!(visible(&doc));
    }

    #[test]
    fn common_attributes_reach_the_core() {
        let mut doc = Document::new();
        doc.load_str(
            r#"<scene><obj id="o" position=(1, 2, 3) scale=2 renderOrder=5 rotateOrder="ZYX" castShadow /></scene>"#,
        )
        .unwrap();
        let obj = by_id(&doc, "o");
        let object = doc.core_object(obj).unwrap();
        assert_eq!(object.transform.position, goml_structs::Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(object.transform.scale, goml_structs::Vector3::splat(2.0));
        assert_eq!(object.render_order, 5);
        assert_eq!(object.transform.rotation.order, goml_structs::RotationOrder::ZYX);
        assert!(object.cast_shadow);
        assert!(!object.receive_shadow);
    }

    #[test]
    fn camera_attributes_update_projection() {
        let mut doc = Document::new();
        let cam = doc.create_element("cam").unwrap();
        let before = camera_of(&doc, cam).projection();

        doc.set_attribute(cam, "fov", 75).unwrap();
        let after = camera_of(&doc, cam);
        assert_ne!(after.projection(), before);
        assert_eq!(after.property("fov"), Some(75.0));
        assert_eq!(doc.get_attribute(cam, "fov").and_then(|v| v.as_f32()), Some(75.0));

        let ocam = doc.create_element("ocam").unwrap();
        doc.set_attribute(ocam, "width", 20).unwrap();
        let Camera::Orthographic(ortho) = camera_of(&doc, ocam) else {
            panic!("ocam core is not orthographic");
        };
        assert_eq!((ortho.left, ortho.right), (-10.0, 10.0));
        assert_eq!(doc.get_attribute(ocam, "width").and_then(|v| v.as_f32()), Some(20.0));
    }

    #[test]
    fn light_init_replays_earlier_attributes() {
        let mut doc = Document::new();
        doc.load_str(
            r##"<scene id="s">
                  <light id="sun" helper castShadow={mapSize: 1024, far: 100}
                         init={type: "Dir", value: ["#ff0000", 2]} />
                </scene>"##,
        )
        .unwrap();
        let sun = by_id(&doc, "sun");
        let scene_core = doc.core(by_id(&doc, "s")).unwrap();
        let core = doc.core(sun).unwrap();
        assert_eq!(doc.object(core).unwrap().parent, scene_core);

        let light = doc.object(core).and_then(|o| o.light()).unwrap();
        assert_eq!(light.color, 0xff0000);
        assert_eq!(light.intensity, 2.0);
        let shadow = light.shadow.as_ref().unwrap();
        assert_eq!((shadow.map_width, shadow.map_height), (1024, 1024));
        assert_eq!(shadow.camera.property("far"), Some(100.0));
        assert!(doc.object(core).unwrap().cast_shadow);

        let helpers = doc.element(sun).unwrap().helpers();
        let light_helper = doc.object(helpers.light.unwrap()).unwrap();
        assert!(matches!(
            &light_helper.kind,
            ObjectKind::Helper(Helper { kind: HelperKind::DirectionalLight, target })
                if *target == HelperTarget::Object(core)
        ));
        let camera_helper = doc.object(helpers.camera.unwrap()).unwrap();
        let ObjectKind::Helper(camera_helper) = &camera_helper.kind else {
            panic!("camera slot does not hold a helper");
        };
        assert_eq!(camera_helper.kind, HelperKind::Camera);
        assert_eq!(camera_helper.target, HelperTarget::ShadowCamera(core));
        let drawn = camera_helper.camera(doc.objects()).map(|cam| cam.projection());
        assert_eq!(drawn, Some(shadow.camera.projection()));
        assert_eq!(doc.get_attribute(sun, "helper"), Some(Variant::Bool(true)));

        doc.set_attribute(sun, "helper", false).unwrap();
        assert_eq!(doc.element(sun).unwrap().helpers(), Default::default());
        assert_eq!(doc.get_attribute(sun, "helper"), Some(Variant::Bool(false)));
    }

    #[test]
    fn light_init_applies_once() {
        let mut doc = Document::new();
        let light = doc.create_element("light").unwrap();
        assert!(doc.core(light).is_none());

        let init = |code: &str| Variant::object_from([("type", Variant::from(code))]);
        doc.set_attribute(light, "init", init("Poi")).unwrap();
        doc.set_attribute(light, "init", init("Amb")).unwrap();
        let kind = doc.core_object(light).and_then(|o| o.light()).map(|l| l.kind);
        assert_eq!(kind, Some(goml_objects::LightKind::Point));
    }

    #[test]
    fn meshes_pairs_geometries_with_materials() {
        let mut doc = Document::new();
        doc.load_str(
            r#"<meshes id="m" geos=["Box", "Sphere"] mtls=["MeshBasic", "MeshPhong"] />"#,
        )
        .unwrap();
        let meshes = by_id(&doc, "m");
        let group = doc.core(meshes).unwrap();
        let children = doc.object(group).unwrap().children.clone();
        assert_eq!(children.len(), 2);

        let second = doc.object(children[1]).and_then(|o| o.drawable()).unwrap();
        assert_eq!(second.geometry.as_ref().map(|g| &*g.kind), Some("SphereGeometry"));
        assert_eq!(second.material.as_ref().map(|m| &*m.kind), Some("MeshPhongMaterial"));

        doc.set_attribute(meshes, "geos", Variant::from(vec![Variant::from("Plane")]))
            .unwrap();
        let rebuilt = doc.object(group).unwrap().children.clone();
        assert_eq!(rebuilt.len(), 1);
        assert!(children.iter().all(|old| !doc.objects().contains(*old)));
        let plane = doc.object(rebuilt[0]).and_then(|o| o.drawable()).unwrap();
        assert_eq!(plane.material.as_ref().map(|m| &*m.kind), Some("MeshBasicMaterial"));
    }

    #[test]
    fn meshes_count_follows_the_attribute_being_set() {
        let mut doc = Document::new();
        doc.load_str(
            r#"<meshes id="m" geos=["Box", "Sphere", "Plane"] mtls=["MeshBasic", "MeshPhong"] />"#,
        )
        .unwrap();
        let meshes = by_id(&doc, "m");
        let group = doc.core(meshes).unwrap();
        assert_eq!(doc.object(group).unwrap().children.len(), 2);

        let geos = doc.get_attribute(meshes, "geos").unwrap();
        doc.set_attribute(meshes, "geos", geos).unwrap();
        let children = doc.object(group).unwrap().children.clone();
        assert_eq!(children.len(), 3);
        let third = doc.object(children[2]).and_then(|o| o.drawable()).unwrap();
        assert!(third.material.is_none());

        let mtls = ["MeshBasic", "MeshPhong", "MeshLambert", "MeshBasic"].map(Variant::from);
        doc.set_attribute(meshes, "mtls", Variant::from(mtls.to_vec())).unwrap();
        assert_eq!(doc.object(group).unwrap().children.len(), 3);
    }

    #[test]
    fn asset_src_must_be_a_path() {
        let fixture = Fixture::new();
        let mut doc = fixture.document();
        let asset = doc.create_element("asset").unwrap();

        let err = doc.set_attribute(asset, "src", "model.glb").unwrap_err();
        assert!(matches!(err, DocumentError::Attribute { tag: ElementTag::Asset, .. }));
        assert_eq!(err.to_string(), INVALID_ASSET_PATH);
        assert_eq!(fixture.assets.pending(), 0);

        doc.set_attribute(asset, "src", "models/ship.glb").unwrap();
        let requests = fixture.assets.drain();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].element, asset);
        assert_eq!(requests[0].path, "models/ship.glb");
    }

    #[test]
    fn building_continues_past_a_bad_asset() {
        let mut doc = Document::new();
        doc.load_str(r#"<scene><asset src="bad" /><obj id="after" /></scene>"#)
            .unwrap();
        assert!(doc.get_element_by_id("after").is_some());
    }

    #[test]
    fn physics_follows_the_connected_tree() {
        let fixture = Fixture::new();
        let mut doc = fixture.document();
        doc.load_str(r#"<scene id="s" physicsWorld={gravity: -9.8} />"#)
            .unwrap();
        let scene = by_id(&doc, "s");

        let mesh = doc.create_element("mesh").unwrap();
        doc.set_attribute(mesh, "physics", Variant::object_from([("mass", 1)]))
            .unwrap();
        assert_eq!(fixture.physics.events(), vec![PhysicsEvent::WorldCreated(scene)]);

        doc.append_child(scene, mesh).unwrap();
        doc.set_attribute(mesh, "physics", Variant::object_from([("mass", 2)]))
            .unwrap();
        doc.remove_child(scene, mesh).unwrap();

        assert_eq!(
            fixture.physics.events(),
            vec![
                PhysicsEvent::WorldCreated(scene),
                PhysicsEvent::Registered(mesh),
                PhysicsEvent::StyleChanged(mesh),
                PhysicsEvent::Unregistered(mesh),
            ]
        );
        assert!(!doc.contains(mesh));
    }

    #[test]
    fn tree_operations_keep_cores_in_step() {
        let mut doc = Document::new();
        let scene = doc.create_element("scene").unwrap();
        let a = doc.create_element("obj").unwrap();
        let b = doc.create_element("obj").unwrap();
        let c = doc.create_element("mesh").unwrap();
        doc.append_root(scene).unwrap();
        doc.append_child(scene, a).unwrap();
        doc.insert_before(scene, b, Some(a)).unwrap();
        doc.append_child(a, c).unwrap();

        assert_eq!(doc.children(scene), &[b, a]);
        assert_eq!(doc.traverse(), vec![scene, b, a, c]);
        let scene_core = doc.core(scene).unwrap();
        assert_eq!(doc.object(scene_core).unwrap().children.as_slice(), &[
            doc.core(a).unwrap(),
            doc.core(b).unwrap()
        ]);
        assert_eq!(doc.get_scene(c), Some(scene));
        assert_eq!(doc.element_for_object(doc.core(c).unwrap()), Some(c));

        assert!(matches!(doc.append_child(c, a), Err(DocumentError::Cycle { .. })));
        assert!(matches!(doc.remove_child(b, a), Err(DocumentError::NotAChild { .. })));

        // Moving keeps the subtree alive.
        doc.append_child(b, a).unwrap();
        assert_eq!(doc.parent(a), Some(b));
        assert_eq!(doc.object(doc.core(a).unwrap()).unwrap().parent, doc.core(b).unwrap());

        let c_core = doc.core(c).unwrap();
        doc.remove_child(scene, b).unwrap();
        assert!(!doc.contains(a) && !doc.contains(c));
        assert!(!doc.objects().contains(c_core));
        assert_eq!(doc.element_for_object(c_core), None);
        assert_eq!(doc.objects().len(), 1);
    }

    #[test]
    fn translate_moves_the_core() {
        let mut doc = Document::new();
        let obj = doc.create_element("obj").unwrap();
        assert!(doc.translate(obj, 0.0, 3.0, 4.0));
        assert!(doc.translate_x(obj, 1.0));
        let position = doc.core_object(obj).unwrap().transform.position;
        assert!((position.x - 1.0).abs() < 1e-5);
        assert!((position.y - 3.0).abs() < 1e-5);
        assert!((position.z - 4.0).abs() < 1e-5);

        let rdr = doc.create_element("rdr").unwrap();
        assert!(!doc.translate_y(rdr, 1.0));
    }

    const RENDER: &str = r##"
        <head>
          <scene id="main"><cam id="eye" position=(0, 0, 5) /></scene>
        </head>
        <body>
          <rdr id="r" width=800 height=600 clearColor="#202020">
            <vps>
              <vp id="left" cam="#eye" scene="#main" width=0.5 />
              <vp id="right" cam="eye" scene="main" left=0.5 width=0.5 />
            </vps>
          </rdr>
        </body>
    "##;

    fn rect(doc: &Document, vp: NodeID) -> crate::render::Viewport {
        match doc.element(vp).map(Element::state) {
            Some(TagState::Viewport(state)) => state.rect,
            _ => panic!("not a vp"),
        }
    }

    #[test]
    fn viewports_follow_the_renderer_size() {
        let mut doc = Document::new();
        doc.load_str(RENDER).unwrap();
        let right = by_id(&doc, "right");
        let r = rect(&doc, right);
        assert_eq!((r.x, r.y, r.width, r.height), (400.0, 0.0, 400.0, 600.0));

        let eye = by_id(&doc, "eye");
        let Camera::Perspective(cam) = camera_of(&doc, eye) else {
            panic!("cam core is not perspective");
        };
        assert!((cam.aspect - 400.0 / 600.0).abs() < 1e-6);

        let rdr = by_id(&doc, "r");
        doc.set_attribute(rdr, "width", 1000).unwrap();
        assert_eq!(rect(&doc, right).x, 500.0);
        assert_eq!(doc.get_attribute(rdr, "clearColor"), Some(Variant::from(0x202020u32)));

        doc.set_viewport_size(right, 100.0, 100.0);
        assert_eq!(rect(&doc, right).width, 50.0);
    }

    #[test]
    fn quoted_sizes_read_as_numbers() {
        let mut doc = Document::new();
        doc.load_str(&RENDER.replace("width=800 height=600", r#"width="800" height="600""#))
            .unwrap();
        let right = by_id(&doc, "right");
        let r = rect(&doc, right);
        assert_eq!((r.x, r.width, r.height), (400.0, 400.0, 600.0));

        let rdr = by_id(&doc, "r");
        doc.set_attribute(rdr, "width", "640").unwrap();
        assert_eq!(doc.get_attribute(rdr, "width").and_then(|v| v.as_f64()), Some(640.0));
        assert_eq!(rect(&doc, right).x, 320.0);

        // Only scalars coerce; a quoted list is left alone.
        let eye = by_id(&doc, "eye");
        doc.set_attribute(eye, "position", "[1, 2, 3]").unwrap();
        let position = doc.core_object(eye).unwrap().transform.position;
        assert_eq!(position.z, 5.0);
    }

    #[test]
    fn renderer_draws_through_the_frame_loop() {
        let fixture = Fixture::new();
        let doc = Document::new_shared_with(fixture.services());
        doc.borrow_mut().load_str(RENDER).unwrap();
        assert_eq!(fixture.frame_loop.len(CallbackList::Tree), 1);

        let report = fixture.frame_loop.tick(16.0).unwrap();
        assert!(report.is_ok());
        let passes = fixture.backend.passes();
        assert_eq!(passes.len(), 2);
        assert_eq!(passes[0].clear_color, 0x202020);
        assert_eq!(passes[1].viewport.x, 400.0);

        let eye_core = doc.borrow().core(by_id(&doc.borrow(), "eye")).unwrap();
        assert_eq!(passes[0].camera, eye_core);

        let body = doc.borrow().roots()[1];
        doc.borrow_mut().remove_root(body).unwrap();
        assert_eq!(fixture.frame_loop.len(CallbackList::Tree), 0);
    }

    #[test]
    fn unshared_document_renders_on_demand() {
        let fixture = Fixture::new();
        let mut doc = fixture.document();
        doc.load_str(RENDER).unwrap();
        assert_eq!(fixture.frame_loop.len(CallbackList::Tree), 0);

        let rdr = by_id(&doc, "r");
        assert_eq!(doc.render(rdr).unwrap(), 2);
        assert!(doc.render(by_id(&doc, "eye")).is_err());
    }
}
