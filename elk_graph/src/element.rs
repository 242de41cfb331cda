use elk_value::{KVector, PropertyHolder};

macro_rules! index_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub usize);

        impl $name {
            pub fn index(&self) -> usize {
                self.0
            }
        }
    };
}

index_type!(
    /// Handle of a node in an [`crate::ElkGraph`].
    NodeIndex
);
index_type!(PortIndex);
index_type!(EdgeIndex);
index_type!(SectionIndex);
index_type!(LabelIndex);

/// Something an edge can connect to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    Node(NodeIndex),
    Port(PortIndex),
}

/// The element owning a label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LabelParent {
    Node(NodeIndex),
    Port(PortIndex),
    Edge(EdgeIndex),
    Label(LabelIndex),
}

/// Any element of the graph. Per-kind processing matches on this.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GraphElement {
    Node(NodeIndex),
    Port(PortIndex),
    Edge(EdgeIndex),
    Section(SectionIndex),
    Label(LabelIndex),
}

impl From<Shape> for GraphElement {
    fn from(shape: Shape) -> Self {
        match shape {
            Shape::Node(n) => GraphElement::Node(n),
            Shape::Port(p) => GraphElement::Port(p),
        }
    }
}

impl From<LabelParent> for GraphElement {
    fn from(parent: LabelParent) -> Self {
        match parent {
            LabelParent::Node(n) => GraphElement::Node(n),
            LabelParent::Port(p) => GraphElement::Port(p),
            LabelParent::Edge(e) => GraphElement::Edge(e),
            LabelParent::Label(l) => GraphElement::Label(l),
        }
    }
}

/// Position and size of a node, port or label.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn set_location(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    pub fn set_dimensions(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }
}

#[derive(Clone, Debug, Default)]
pub struct ElkNode {
    pub identifier: Option<String>,
    pub bounds: Bounds,
    pub properties: PropertyHolder,
    pub(crate) parent: Option<NodeIndex>,
    pub(crate) children: Vec<NodeIndex>,
    pub(crate) ports: Vec<PortIndex>,
    pub(crate) labels: Vec<LabelIndex>,
    pub(crate) contained_edges: Vec<EdgeIndex>,
}

impl ElkNode {
    /// `None` for the root of the graph.
    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    pub fn children(&self) -> &[NodeIndex] {
        &self.children
    }

    pub fn ports(&self) -> &[PortIndex] {
        &self.ports
    }

    pub fn labels(&self) -> &[LabelIndex] {
        &self.labels
    }

    /// Edges whose lowest common ancestor is this node.
    pub fn contained_edges(&self) -> &[EdgeIndex] {
        &self.contained_edges
    }
}

#[derive(Clone, Debug)]
pub struct ElkPort {
    pub identifier: Option<String>,
    pub bounds: Bounds,
    pub properties: PropertyHolder,
    pub(crate) parent: NodeIndex,
    pub(crate) labels: Vec<LabelIndex>,
}

impl ElkPort {
    pub fn parent(&self) -> NodeIndex {
        self.parent
    }

    pub fn labels(&self) -> &[LabelIndex] {
        &self.labels
    }
}

#[derive(Clone, Debug)]
pub struct ElkEdge {
    pub identifier: Option<String>,
    pub properties: PropertyHolder,
    pub(crate) containing_node: NodeIndex,
    pub(crate) sources: Vec<Shape>,
    pub(crate) targets: Vec<Shape>,
    pub(crate) sections: Vec<SectionIndex>,
    pub(crate) labels: Vec<LabelIndex>,
}

impl ElkEdge {
    pub fn containing_node(&self) -> NodeIndex {
        self.containing_node
    }

    pub fn sources(&self) -> &[Shape] {
        &self.sources
    }

    pub fn targets(&self) -> &[Shape] {
        &self.targets
    }

    pub fn sections(&self) -> &[SectionIndex] {
        &self.sections
    }

    pub fn labels(&self) -> &[LabelIndex] {
        &self.labels
    }

    /// More than one source or more than one target.
    pub fn is_hyperedge(&self) -> bool {
        self.sources.len() > 1 || self.targets.len() > 1
    }

    /// At least one source and one target.
    pub fn is_connected(&self) -> bool {
        !self.sources.is_empty() && !self.targets.is_empty()
    }
}

/// One piece of the route of an edge.
#[derive(Clone, Debug)]
pub struct ElkEdgeSection {
    pub identifier: Option<String>,
    pub start: KVector,
    pub end: KVector,
    pub bend_points: Vec<KVector>,
    pub incoming_shape: Option<Shape>,
    pub outgoing_shape: Option<Shape>,
    pub properties: PropertyHolder,
    pub(crate) parent: EdgeIndex,
    pub(crate) incoming_sections: Vec<SectionIndex>,
    pub(crate) outgoing_sections: Vec<SectionIndex>,
}

impl ElkEdgeSection {
    pub fn parent(&self) -> EdgeIndex {
        self.parent
    }

    pub fn incoming_sections(&self) -> &[SectionIndex] {
        &self.incoming_sections
    }

    pub fn outgoing_sections(&self) -> &[SectionIndex] {
        &self.outgoing_sections
    }
}

#[derive(Clone, Debug)]
pub struct ElkLabel {
    pub identifier: Option<String>,
    pub text: String,
    pub bounds: Bounds,
    pub properties: PropertyHolder,
    pub(crate) parent: LabelParent,
    pub(crate) labels: Vec<LabelIndex>,
}

impl ElkLabel {
    pub fn parent(&self) -> LabelParent {
        self.parent
    }

    pub fn labels(&self) -> &[LabelIndex] {
        &self.labels
    }
}
