mod assets;
mod document;
mod element;
mod element_arena;
mod error;
mod frame_loop;
mod physics;
mod render;
mod runtime;
mod tags;

pub use assets::{AssetLoader, AssetRequest, QueuedAssetLoader};
pub use document::{Document, DocumentServices};
pub use element::{Element, Helpers, RendererState, TagState, ViewportState};
pub use element_arena::ElementArena;
pub use error::{DocumentError, Result};
pub use frame_loop::{
    CallbackFailure, CallbackList, FrameCallback, FrameLoop, FrameReport, FrameTime,
    default_loop, register_system, register_tree, reset, tick, unregister_system,
    unregister_tree, update_system, update_tree,
};
pub use physics::{NullPhysics, PhysicsBridge, PhysicsEvent};
pub use render::{RecordingBackend, RenderBackend, RenderPass, Viewport};
pub use runtime::{RunSummary, Runtime};
pub use tags::ElementTag;
pub use tags::scene::INVALID_ASSET_PATH;
