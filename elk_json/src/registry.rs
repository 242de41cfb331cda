use crate::adapter::ElementId;
use elk_graph::{EdgeIndex, LabelIndex, NodeIndex, PortIndex, SectionIndex};
use log::warn;
use std::collections::HashMap;
use std::hash::Hash;

/// Bidirectional map between ids and graph elements of one kind.
///
/// Registering an id that is already taken moves it to the new element,
/// the previous element loses its id.
#[derive(Debug, Clone)]
pub struct BiRegistry<K> {
    by_id: HashMap<ElementId, K>,
    by_element: HashMap<K, ElementId>,
}

impl<K> Default for BiRegistry<K> {
    fn default() -> Self {
        BiRegistry {
            by_id: HashMap::new(),
            by_element: HashMap::new(),
        }
    }
}

impl<K: Copy + Eq + Hash + std::fmt::Debug> BiRegistry<K> {
    pub fn insert(&mut self, id: ElementId, element: K) {
        if let Some(previous) = self.by_element.remove(&element) {
            self.by_id.remove(&previous);
        }
        if let Some(previous) = self.by_id.insert(id.clone(), element) {
            if previous != element {
                warn!("Id {id} is used twice, {previous:?} is no longer reachable by id");
                self.by_element.remove(&previous);
            }
        }
        self.by_element.insert(element, id);
    }

    pub fn get(&self, id: &ElementId) -> Option<K> {
        self.by_id.get(id).copied()
    }

    pub fn id_of(&self, element: K) -> Option<&ElementId> {
        self.by_element.get(&element)
    }

    pub fn contains_id(&self, id: &ElementId) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_id.clear();
        self.by_element.clear();
    }
}

/// Where each element lives in a JSON document, as JSON pointers.
#[derive(Debug, Clone)]
pub struct PointerMap<K> {
    pointers: HashMap<K, String>,
}

impl<K> Default for PointerMap<K> {
    fn default() -> Self {
        PointerMap {
            pointers: HashMap::new(),
        }
    }
}

impl<K: Copy + Eq + Hash> PointerMap<K> {
    pub fn insert(&mut self, element: K, pointer: String) {
        self.pointers.insert(element, pointer);
    }

    pub fn get(&self, element: K) -> Option<&str> {
        self.pointers.get(&element).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.pointers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pointers.is_empty()
    }

    pub fn clear(&mut self) {
        self.pointers.clear();
    }
}

/// All per-call bookkeeping of an import or export: ids of nodes, ports,
/// edges and sections, and the JSON location of every element.
#[derive(Debug, Clone, Default)]
pub struct ElementRegistry {
    pub nodes: BiRegistry<NodeIndex>,
    pub ports: BiRegistry<PortIndex>,
    pub edges: BiRegistry<EdgeIndex>,
    pub sections: BiRegistry<SectionIndex>,

    pub node_json: PointerMap<NodeIndex>,
    pub port_json: PointerMap<PortIndex>,
    pub edge_json: PointerMap<EdgeIndex>,
    pub section_json: PointerMap<SectionIndex>,
    pub label_json: PointerMap<LabelIndex>,
}

impl ElementRegistry {
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.ports.clear();
        self.edges.clear();
        self.sections.clear();
        self.node_json.clear();
        self.port_json.clear();
        self.edge_json.clear();
        self.section_json.clear();
        self.label_json.clear();
    }
}
