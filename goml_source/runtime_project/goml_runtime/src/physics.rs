use std::cell::RefCell;
use std::rc::Rc;

use goml_ids::NodeID;
use goml_variant::Variant;

/// Physics engine hooks driven by `scene` and `mesh` elements.
pub trait PhysicsBridge {
    fn create_world(&mut self, scene: NodeID, config: &Variant);
    fn register(&mut self, mesh: NodeID, config: &Variant);
    fn unregister(&mut self, mesh: NodeID);
    /// The `physics` attribute of a registered mesh changed.
    fn style_changed(&mut self, mesh: NodeID, config: &Variant);
}

#[derive(Clone, Debug, PartialEq)]
pub enum PhysicsEvent {
    WorldCreated(NodeID),
    Registered(NodeID),
    Unregistered(NodeID),
    StyleChanged(NodeID),
}

/// Simulates nothing; keeps the call log. Clones share one log.
#[derive(Clone, Default)]
pub struct NullPhysics {
    events: Rc<RefCell<Vec<PhysicsEvent>>>,
}

impl NullPhysics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PhysicsEvent> {
        self.events.borrow().clone()
    }

    fn push(&self, event: PhysicsEvent) {
        log::debug!("physics: {event:?}");
        self.events.borrow_mut().push(event);
    }
}

impl PhysicsBridge for NullPhysics {
    fn create_world(&mut self, scene: NodeID, _config: &Variant) {
        self.push(PhysicsEvent::WorldCreated(scene));
    }

    fn register(&mut self, mesh: NodeID, _config: &Variant) {
        self.push(PhysicsEvent::Registered(mesh));
    }

    fn unregister(&mut self, mesh: NodeID) {
        self.push(PhysicsEvent::Unregistered(mesh));
    }

    fn style_changed(&mut self, mesh: NodeID, _config: &Variant) {
        self.push(PhysicsEvent::StyleChanged(mesh));
    }
}
