use crate::element::*;
use elk_traits::{ElkError, ElkResult};
use elk_value::PropertyHolder;
use log::trace;
use std::collections::HashSet;

/// A hierarchical layout graph.
///
/// All elements live in per-kind arenas owned by the graph and are addressed
/// by typed indices. A graph always has a root node, created with it.
#[derive(Clone, Debug)]
pub struct ElkGraph {
    nodes: Vec<ElkNode>,
    ports: Vec<ElkPort>,
    edges: Vec<ElkEdge>,
    sections: Vec<ElkEdgeSection>,
    labels: Vec<ElkLabel>,
}

impl Default for ElkGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl ElkGraph {
    pub fn new() -> Self {
        ElkGraph {
            nodes: vec![ElkNode::default()],
            ports: Vec::new(),
            edges: Vec::new(),
            sections: Vec::new(),
            labels: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeIndex {
        NodeIndex(0)
    }

    pub fn node(&self, index: NodeIndex) -> &ElkNode {
        &self.nodes[index.0]
    }

    pub fn node_mut(&mut self, index: NodeIndex) -> &mut ElkNode {
        &mut self.nodes[index.0]
    }

    pub fn port(&self, index: PortIndex) -> &ElkPort {
        &self.ports[index.0]
    }

    pub fn port_mut(&mut self, index: PortIndex) -> &mut ElkPort {
        &mut self.ports[index.0]
    }

    pub fn edge(&self, index: EdgeIndex) -> &ElkEdge {
        &self.edges[index.0]
    }

    pub fn edge_mut(&mut self, index: EdgeIndex) -> &mut ElkEdge {
        &mut self.edges[index.0]
    }

    pub fn section(&self, index: SectionIndex) -> &ElkEdgeSection {
        &self.sections[index.0]
    }

    pub fn section_mut(&mut self, index: SectionIndex) -> &mut ElkEdgeSection {
        &mut self.sections[index.0]
    }

    pub fn label(&self, index: LabelIndex) -> &ElkLabel {
        &self.labels[index.0]
    }

    pub fn label_mut(&mut self, index: LabelIndex) -> &mut ElkLabel {
        &mut self.labels[index.0]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn port_count(&self) -> usize {
        self.ports.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    /// Creates a node as the last child of `parent`.
    pub fn create_node(&mut self, parent: NodeIndex) -> NodeIndex {
        let index = NodeIndex(self.nodes.len());
        self.nodes.push(ElkNode {
            parent: Some(parent),
            ..Default::default()
        });
        self.nodes[parent.0].children.push(index);
        index
    }

    pub fn create_port(&mut self, parent: NodeIndex) -> PortIndex {
        let index = PortIndex(self.ports.len());
        self.ports.push(ElkPort {
            identifier: None,
            bounds: Bounds::default(),
            properties: PropertyHolder::new(),
            parent,
            labels: Vec::new(),
        });
        self.nodes[parent.0].ports.push(index);
        index
    }

    /// Creates an unconnected edge contained by `containing_node`. Once its
    /// endpoints are set, [`ElkGraph::update_containment`] moves it to the
    /// right node.
    pub fn create_edge(&mut self, containing_node: NodeIndex) -> EdgeIndex {
        let index = EdgeIndex(self.edges.len());
        self.edges.push(ElkEdge {
            identifier: None,
            properties: PropertyHolder::new(),
            containing_node,
            sources: Vec::new(),
            targets: Vec::new(),
            sections: Vec::new(),
            labels: Vec::new(),
        });
        self.nodes[containing_node.0].contained_edges.push(index);
        index
    }

    pub fn add_source(&mut self, edge: EdgeIndex, shape: Shape) {
        self.edges[edge.0].sources.push(shape);
    }

    pub fn add_target(&mut self, edge: EdgeIndex, shape: Shape) {
        self.edges[edge.0].targets.push(shape);
    }

    pub fn create_section(&mut self, edge: EdgeIndex) -> SectionIndex {
        let index = SectionIndex(self.sections.len());
        self.sections.push(ElkEdgeSection {
            identifier: None,
            start: Default::default(),
            end: Default::default(),
            bend_points: Vec::new(),
            incoming_shape: None,
            outgoing_shape: None,
            properties: PropertyHolder::new(),
            parent: edge,
            incoming_sections: Vec::new(),
            outgoing_sections: Vec::new(),
        });
        self.edges[edge.0].sections.push(index);
        index
    }

    pub fn create_label(&mut self, parent: LabelParent, text: &str) -> LabelIndex {
        let index = LabelIndex(self.labels.len());
        self.labels.push(ElkLabel {
            identifier: None,
            text: text.to_string(),
            bounds: Bounds::default(),
            properties: PropertyHolder::new(),
            parent,
            labels: Vec::new(),
        });
        match parent {
            LabelParent::Node(n) => self.nodes[n.0].labels.push(index),
            LabelParent::Port(p) => self.ports[p.0].labels.push(index),
            LabelParent::Edge(e) => self.edges[e.0].labels.push(index),
            LabelParent::Label(l) => self.labels[l.0].labels.push(index),
        }
        index
    }

    /// Records that the route continues from section `from` into section `to`.
    /// Both directions of the link are kept in sync and never duplicated.
    pub fn connect_sections(&mut self, from: SectionIndex, to: SectionIndex) {
        if !self.sections[from.0].outgoing_sections.contains(&to) {
            self.sections[from.0].outgoing_sections.push(to);
        }
        if !self.sections[to.0].incoming_sections.contains(&from) {
            self.sections[to.0].incoming_sections.push(from);
        }
    }

    pub fn labels_of(&self, parent: LabelParent) -> &[LabelIndex] {
        match parent {
            LabelParent::Node(n) => &self.nodes[n.0].labels,
            LabelParent::Port(p) => &self.ports[p.0].labels,
            LabelParent::Edge(e) => &self.edges[e.0].labels,
            LabelParent::Label(l) => &self.labels[l.0].labels,
        }
    }

    pub fn properties(&self, element: GraphElement) -> &PropertyHolder {
        match element {
            GraphElement::Node(n) => &self.nodes[n.0].properties,
            GraphElement::Port(p) => &self.ports[p.0].properties,
            GraphElement::Edge(e) => &self.edges[e.0].properties,
            GraphElement::Section(s) => &self.sections[s.0].properties,
            GraphElement::Label(l) => &self.labels[l.0].properties,
        }
    }

    pub fn properties_mut(&mut self, element: GraphElement) -> &mut PropertyHolder {
        match element {
            GraphElement::Node(n) => &mut self.nodes[n.0].properties,
            GraphElement::Port(p) => &mut self.ports[p.0].properties,
            GraphElement::Edge(e) => &mut self.edges[e.0].properties,
            GraphElement::Section(s) => &mut self.sections[s.0].properties,
            GraphElement::Label(l) => &mut self.labels[l.0].properties,
        }
    }

    pub fn identifier(&self, element: GraphElement) -> Option<&str> {
        match element {
            GraphElement::Node(n) => self.nodes[n.0].identifier.as_deref(),
            GraphElement::Port(p) => self.ports[p.0].identifier.as_deref(),
            GraphElement::Edge(e) => self.edges[e.0].identifier.as_deref(),
            GraphElement::Section(s) => self.sections[s.0].identifier.as_deref(),
            GraphElement::Label(l) => self.labels[l.0].identifier.as_deref(),
        }
    }

    /// Bounds of the element, `None` for edges and sections.
    pub fn bounds(&self, element: GraphElement) -> Option<&Bounds> {
        match element {
            GraphElement::Node(n) => Some(&self.nodes[n.0].bounds),
            GraphElement::Port(p) => Some(&self.ports[p.0].bounds),
            GraphElement::Label(l) => Some(&self.labels[l.0].bounds),
            GraphElement::Edge(_) | GraphElement::Section(_) => None,
        }
    }

    pub fn bounds_mut(&mut self, element: GraphElement) -> Option<&mut Bounds> {
        match element {
            GraphElement::Node(n) => Some(&mut self.nodes[n.0].bounds),
            GraphElement::Port(p) => Some(&mut self.ports[p.0].bounds),
            GraphElement::Label(l) => Some(&mut self.labels[l.0].bounds),
            GraphElement::Edge(_) | GraphElement::Section(_) => None,
        }
    }

    /// The node a shape belongs to: the node itself, or the port's node.
    pub fn connectable_shape_to_node(&self, shape: Shape) -> NodeIndex {
        match shape {
            Shape::Node(n) => n,
            Shape::Port(p) => self.ports[p.0].parent,
        }
    }

    /// Whether `ancestor` is a strict ancestor of `node`.
    pub fn is_descendant(&self, node: NodeIndex, ancestor: NodeIndex) -> bool {
        let mut current = self.nodes[node.0].parent;
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.nodes[n.0].parent;
        }
        false
    }

    pub fn lowest_common_ancestor(&self, a: NodeIndex, b: NodeIndex) -> NodeIndex {
        let mut ancestors = HashSet::new();
        let mut current = Some(a);
        while let Some(n) = current {
            ancestors.insert(n);
            current = self.nodes[n.0].parent;
        }
        let mut current = b;
        loop {
            if ancestors.contains(&current) {
                return current;
            }
            match self.nodes[current.0].parent {
                Some(parent) => current = parent,
                // single tree, the root is always a common ancestor
                None => return self.root(),
            }
        }
    }

    /// Computes the node that should contain `edge` given its endpoints.
    pub fn find_best_edge_containment(&self, edge: EdgeIndex) -> ElkResult<NodeIndex> {
        let e = &self.edges[edge.0];
        if !e.is_connected() {
            return Err(ElkError::from(format!(
                "Edge {} has no source or no target, its containment is undefined.",
                e.identifier.as_deref().unwrap_or("<unnamed>")
            )));
        }

        if !e.is_hyperedge() {
            let source = self.connectable_shape_to_node(e.sources[0]);
            let target = self.connectable_shape_to_node(e.targets[0]);
            let source_parent = self.nodes[source.0].parent;
            let target_parent = self.nodes[target.0].parent;
            if let (Some(sp), Some(tp)) = (source_parent, target_parent) {
                if sp == tp {
                    return Ok(sp);
                }
            }
            if Some(source) == target_parent {
                return Ok(source);
            } else if Some(target) == source_parent {
                return Ok(target);
            }
        }

        let mut common: Option<NodeIndex> = None;
        for shape in e.sources.iter().chain(e.targets.iter()) {
            let node = self.connectable_shape_to_node(*shape);
            // an edge can only live inside the root, never outside of it
            let scope = self.nodes[node.0].parent.unwrap_or(node);
            common = Some(match common {
                None => scope,
                Some(c) => self.lowest_common_ancestor(c, scope),
            });
        }
        Ok(common.unwrap_or(self.root()))
    }

    /// Moves `edge` to the node returned by [`ElkGraph::find_best_edge_containment`].
    pub fn update_containment(&mut self, edge: EdgeIndex) -> ElkResult<()> {
        let best = self.find_best_edge_containment(edge)?;
        let current = self.edges[edge.0].containing_node;
        if best != current {
            trace!("Moving edge {} from node {} to node {}", edge.0, current.0, best.0);
            self.nodes[current.0].contained_edges.retain(|e| *e != edge);
            self.nodes[best.0].contained_edges.push(edge);
            self.edges[edge.0].containing_node = best;
        }
        Ok(())
    }
}
