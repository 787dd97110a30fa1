use std::cell::RefCell;
use std::rc::Rc;

use glam::Mat4;
use goml_ids::{NodeID, ObjectID};
use goml_objects::ObjectGraph;

/// Pixel rectangle inside a renderer's canvas, origin top-left.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

/// One camera drawing one scene into one viewport.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderPass {
    pub renderer: NodeID,
    pub viewport: Viewport,
    pub clear_color: u32,
    pub scene: ObjectID,
    pub camera: ObjectID,
    pub view_projection: Mat4,
}

pub trait RenderBackend {
    fn render(&mut self, pass: &RenderPass, objects: &ObjectGraph) -> anyhow::Result<()>;
}

/// Keeps every pass it is asked to draw. Clones share one record.
#[derive(Clone, Default)]
pub struct RecordingBackend {
    passes: Rc<RefCell<Vec<RenderPass>>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn passes(&self) -> Vec<RenderPass> {
        self.passes.borrow().clone()
    }

    pub fn clear(&self) {
        self.passes.borrow_mut().clear();
    }
}

impl RenderBackend for RecordingBackend {
    fn render(&mut self, pass: &RenderPass, objects: &ObjectGraph) -> anyhow::Result<()> {
        log::trace!(
            "render pass {:?}: {} objects in graph",
            pass.viewport,
            objects.descendants(pass.scene).len()
        );
        self.passes.borrow_mut().push(pass.clone());
        Ok(())
    }
}
