use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use goml_ids::NodeID;

/// Loads the file an `asset` element points at.
pub trait AssetLoader {
    fn load(&mut self, element: NodeID, path: &str);
}

#[derive(Clone, Debug, PartialEq)]
pub struct AssetRequest {
    pub element: NodeID,
    pub path: String,
}

/// Queues requests for the host to service. Clones share one queue.
#[derive(Clone, Default)]
pub struct QueuedAssetLoader {
    queue: Rc<RefCell<VecDeque<AssetRequest>>>,
}

impl QueuedAssetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn drain(&self) -> Vec<AssetRequest> {
        self.queue.borrow_mut().drain(..).collect()
    }
}

impl AssetLoader for QueuedAssetLoader {
    fn load(&mut self, element: NodeID, path: &str) {
        log::debug!("queued asset {path} for {element}");
        self.queue.borrow_mut().push_back(AssetRequest {
            element,
            path: path.to_string(),
        });
    }
}
