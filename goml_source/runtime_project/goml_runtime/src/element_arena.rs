use goml_ids::NodeID;

use crate::element::Element;

pub struct ElementArena {
    elements: Vec<Option<Element>>,
    generations: Vec<u32>,
    free_indices: Vec<usize>,
}

impl Default for ElementArena {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementArena {
    pub fn new() -> Self {
        // Reserve index 0 as nil sentinel so the first real id is 1.
        Self {
            elements: vec![None],
            generations: vec![0],
            free_indices: Vec::new(),
        }
    }

    fn slot(&self, id: NodeID) -> Option<usize> {
        let index = id.index() as usize;
        if id.is_nil()
            || index == 0
            || index >= self.elements.len()
            || self.generations[index] != id.generation()
        {
            return None;
        }
        Some(index)
    }

    pub fn insert(&mut self, element: Element) -> NodeID {
        if let Some(index) = self.free_indices.pop() {
            self.elements[index] = Some(element);
            return NodeID::from_parts(index as u32, self.generations[index]);
        }
        let index = self.elements.len();
        self.elements.push(Some(element));
        self.generations.push(0);
        NodeID::from_parts(index as u32, 0)
    }

    pub fn get(&self, id: NodeID) -> Option<&Element> {
        self.slot(id).and_then(|i| self.elements[i].as_ref())
    }

    pub fn get_mut(&mut self, id: NodeID) -> Option<&mut Element> {
        self.slot(id).and_then(|i| self.elements[i].as_mut())
    }

    /// Removes an element, bumping the slot generation.
    pub fn remove(&mut self, id: NodeID) -> Option<Element> {
        let index = self.slot(id)?;
        let removed = self.elements[index].take();
        if removed.is_some() {
            self.generations[index] = self.generations[index].wrapping_add(1);
            self.free_indices.push(index);
        }
        removed
    }

    pub fn contains(&self, id: NodeID) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeID, &Element)> {
        self.elements
            .iter()
            .enumerate()
            .skip(1)
            .filter_map(|(index, element)| {
                element
                    .as_ref()
                    .map(|e| (NodeID::from_parts(index as u32, self.generations[index]), e))
            })
    }

    pub fn len(&self) -> usize {
        self.elements.iter().filter(|e| e.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
