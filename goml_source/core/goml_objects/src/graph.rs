use glam::Mat4;
use goml_ids::ObjectID;
use goml_structs::Vector3;

use crate::error::{ObjectError, Result};
use crate::object_3d::Object3D;

/// Generational arena owning every core object of a document.
pub struct ObjectGraph {
    objects: Vec<Option<Object3D>>,
    generations: Vec<u32>,
    free_indices: Vec<usize>,
}

impl Default for ObjectGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectGraph {
    pub fn new() -> Self {
        // Index 0 is the nil sentinel.
        Self {
            objects: vec![None],
            generations: vec![0],
            free_indices: Vec::new(),
        }
    }

    fn slot(&self, id: ObjectID) -> Option<usize> {
        let index = id.index() as usize;
        if id.is_nil()
            || index == 0
            || index >= self.objects.len()
            || self.generations[index] != id.generation()
        {
            return None;
        }
        Some(index)
    }

    pub fn insert(&mut self, object: Object3D) -> ObjectID {
        if let Some(index) = self.free_indices.pop() {
            self.objects[index] = Some(object);
            return ObjectID::from_parts(index as u32, self.generations[index]);
        }
        let index = self.objects.len();
        self.objects.push(Some(object));
        self.generations.push(0);
        ObjectID::from_parts(index as u32, 0)
    }

    pub fn get(&self, id: ObjectID) -> Option<&Object3D> {
        self.slot(id).and_then(|i| self.objects[i].as_ref())
    }

    pub fn get_mut(&mut self, id: ObjectID) -> Option<&mut Object3D> {
        self.slot(id).and_then(|i| self.objects[i].as_mut())
    }

    pub fn contains(&self, id: ObjectID) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.objects.iter().filter(|o| o.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectID, &Object3D)> {
        self.objects
            .iter()
            .enumerate()
            .skip(1)
            .filter_map(|(index, object)| {
                object
                    .as_ref()
                    .map(|o| (ObjectID::from_parts(index as u32, self.generations[index]), o))
            })
    }

    /// Re-parents `child` under `parent`, detaching it from any previous parent.
    pub fn add(&mut self, parent: ObjectID, child: ObjectID) -> Result<()> {
        if parent == child {
            return Err(ObjectError::SelfParent(child));
        }
        if !self.contains(parent) {
            return Err(ObjectError::Missing(parent));
        }
        if !self.contains(child) {
            return Err(ObjectError::Missing(child));
        }

        let mut cursor = parent;
        while !cursor.is_nil() {
            if cursor == child {
                return Err(ObjectError::Cycle { parent, child });
            }
            cursor = self.get(cursor).map(|o| o.parent).unwrap_or_else(ObjectID::nil);
        }

        self.detach(child);
        if let Some(p) = self.get_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.get_mut(child) {
            c.parent = parent;
        }
        Ok(())
    }

    /// Detaches `child` if `parent` is its parent. Returns whether it was.
    pub fn remove(&mut self, parent: ObjectID, child: ObjectID) -> bool {
        match self.get(child) {
            Some(c) if c.parent == parent && !parent.is_nil() => {
                self.detach(child);
                true
            }
            _ => false,
        }
    }

    fn detach(&mut self, child: ObjectID) {
        let old_parent = match self.get_mut(child) {
            Some(c) => std::mem::replace(&mut c.parent, ObjectID::nil()),
            None => return,
        };
        if let Some(p) = self.get_mut(old_parent) {
            p.children.retain(|c| *c != child);
        }
    }

    /// Frees `id` and everything under it. Returns the number of objects freed.
    pub fn destroy(&mut self, id: ObjectID) -> usize {
        if !self.contains(id) {
            return 0;
        }
        self.detach(id);

        let mut freed = 0;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(index) = self.slot(current) else {
                continue;
            };
            if let Some(object) = self.objects[index].take() {
                stack.extend(object.children.iter().copied());
                self.generations[index] = self.generations[index].wrapping_add(1);
                self.free_indices.push(index);
                freed += 1;
            }
        }
        freed
    }

    /// Moves along the normalized `(x, y, z)` by its length, in local space.
    pub fn translate(&mut self, id: ObjectID, x: f32, y: f32, z: f32) -> bool {
        let v = Vector3::new(x, y, z);
        match self.get_mut(id) {
            Some(object) => {
                object.transform.translate_on_axis(v.normalized(), v.length());
                true
            }
            None => false,
        }
    }

    /// Parent chain transforms composed root-first.
    pub fn world_matrix(&self, id: ObjectID) -> Option<Mat4> {
        let mut object = self.get(id)?;
        let mut matrix = object.transform.to_mat4();
        while let Some(parent) = self.get(object.parent) {
            matrix = parent.transform.to_mat4() * matrix;
            object = parent;
        }
        Some(matrix)
    }

    /// Depth-first, pre-order ids of `root` and its descendants.
    pub fn descendants(&self, root: ObjectID) -> Vec<ObjectID> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(current) = stack.pop() {
            if let Some(object) = self.get(current) {
                out.push(current);
                stack.extend(object.children.iter().rev().copied());
            }
        }
        out
    }
}
