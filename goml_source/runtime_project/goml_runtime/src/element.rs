use goml_ids::{NodeID, ObjectID};
use goml_variant::Variant;
use indexmap::IndexMap;

use crate::frame_loop::FrameCallback;
use crate::render::Viewport;
use crate::tags::ElementTag;

/// Debug helpers owned by an element. Light and shadow-camera helpers are
/// tracked separately so either can be toggled alone.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Helpers {
    pub light: Option<ObjectID>,
    pub camera: Option<ObjectID>,
}

#[derive(Debug, Clone)]
pub struct RendererState {
    pub width: u32,
    pub height: u32,
    pub clear_color: u32,
    pub(crate) callback: Option<FrameCallback>,
}

impl Default for RendererState {
    fn default() -> Self {
        Self {
            width: 300,
            height: 150,
            clear_color: 0x000000,
            callback: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewportState {
    /// Canvas size from the last `set_size`.
    pub canvas: Option<(f32, f32)>,
    pub rect: Viewport,
}

/// Tag-specific runtime state.
#[derive(Debug, Clone)]
pub enum TagState {
    Plain,
    Light { initialized: bool },
    Mesh { physics_registered: bool },
    Meshes { generated: Vec<ObjectID> },
    Renderer(RendererState),
    Viewport(ViewportState),
}

impl TagState {
    pub fn for_tag(tag: ElementTag) -> Self {
        match tag {
            ElementTag::Light => TagState::Light { initialized: false },
            ElementTag::Mesh => TagState::Mesh {
                physics_registered: false,
            },
            ElementTag::Meshes => TagState::Meshes {
                generated: Vec::new(),
            },
            ElementTag::Rdr => TagState::Renderer(RendererState::default()),
            ElementTag::Vp => TagState::Viewport(ViewportState::default()),
            _ => TagState::Plain,
        }
    }
}

/// A markup node in a [`crate::Document`].
#[derive(Debug, Clone)]
pub struct Element {
    pub(crate) tag: ElementTag,
    pub(crate) attributes: IndexMap<String, Variant>,
    pub(crate) parent: NodeID,
    pub(crate) children: Vec<NodeID>,
    pub(crate) core: Option<ObjectID>,
    pub(crate) helpers: Helpers,
    pub(crate) state: TagState,
}

impl Element {
    pub(crate) fn new(tag: ElementTag, core: Option<ObjectID>) -> Self {
        Self {
            tag,
            attributes: IndexMap::new(),
            parent: NodeID::nil(),
            children: Vec::new(),
            core,
            helpers: Helpers::default(),
            state: TagState::for_tag(tag),
        }
    }

    pub fn tag(&self) -> ElementTag {
        self.tag
    }

    /// Stored attribute values, in first-write order.
    pub fn attributes(&self) -> &IndexMap<String, Variant> {
        &self.attributes
    }

    pub fn parent(&self) -> NodeID {
        self.parent
    }

    pub fn children(&self) -> &[NodeID] {
        &self.children
    }

    pub fn core(&self) -> Option<ObjectID> {
        self.core
    }

    pub fn helpers(&self) -> Helpers {
        self.helpers
    }

    pub fn state(&self) -> &TagState {
        &self.state
    }

    /// The `id` attribute, if it is a string.
    pub fn id_attribute(&self) -> Option<&str> {
        self.attributes.get("id").and_then(Variant::as_str)
    }
}
