use crate::element::{GraphElement, NodeIndex};
use crate::ElkGraph;

/// Pre-order walk over the elements contained in a node, skipping property
/// values. A node yields its labels, ports (each followed by its labels),
/// children, then contained edges (each followed by its labels and sections).
/// Labels yield their nested labels.
pub struct Elements<'g> {
    graph: &'g ElkGraph,
    stack: Vec<GraphElement>,
}

impl<'g> Elements<'g> {
    pub(crate) fn new(graph: &'g ElkGraph, start: NodeIndex) -> Self {
        Elements {
            graph,
            stack: vec![GraphElement::Node(start)],
        }
    }

    fn push_all(&mut self, contents: Vec<GraphElement>) {
        self.stack.extend(contents.into_iter().rev());
    }
}

impl Iterator for Elements<'_> {
    type Item = GraphElement;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.stack.pop()?;
        let g = self.graph;
        let contents: Vec<GraphElement> = match element {
            GraphElement::Node(n) => {
                let node = g.node(n);
                node.labels()
                    .iter()
                    .map(|l| GraphElement::Label(*l))
                    .chain(node.ports().iter().map(|p| GraphElement::Port(*p)))
                    .chain(node.children().iter().map(|c| GraphElement::Node(*c)))
                    .chain(node.contained_edges().iter().map(|e| GraphElement::Edge(*e)))
                    .collect()
            }
            GraphElement::Port(p) => g
                .port(p)
                .labels()
                .iter()
                .map(|l| GraphElement::Label(*l))
                .collect(),
            GraphElement::Edge(e) => {
                let edge = g.edge(e);
                edge.labels()
                    .iter()
                    .map(|l| GraphElement::Label(*l))
                    .chain(edge.sections().iter().map(|s| GraphElement::Section(*s)))
                    .collect()
            }
            GraphElement::Section(_) => Vec::new(),
            GraphElement::Label(l) => g
                .label(l)
                .labels()
                .iter()
                .map(|l| GraphElement::Label(*l))
                .collect(),
        };
        self.push_all(contents);
        Some(element)
    }
}

impl ElkGraph {
    /// All elements of the graph, root included.
    pub fn elements(&self) -> Elements<'_> {
        Elements::new(self, self.root())
    }

    /// All elements below `node`, `node` included.
    pub fn elements_from(&self, node: NodeIndex) -> Elements<'_> {
        Elements::new(self, node)
    }
}
