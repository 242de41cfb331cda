use crate::adapter::*;
use crate::options::ExportOptions;
use crate::registry::{BiRegistry, ElementRegistry};
use elk_graph::{
    EdgeIndex, ElkGraph, GraphElement, LabelIndex, NodeIndex, PortIndex, SectionIndex, Shape,
};
use elk_meta::core_options::{JUNCTION_POINTS, SPACING_INDIVIDUAL};
use elk_meta::{LayoutMetaDataProvider, LayoutMetaDataService};
use elk_traits::{ElkError, ElkResult};
use elk_value::PropertyHolder;
use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;
use std::hash::Hash;

/// Writes an [`ElkGraph`] in its JSON form.
///
/// Elements without an identifier get one from a per-kind counter (`n0`,
/// `p0`, `e0`, `s0`, ...). Identifiers that are already taken get a random
/// `_g` suffix until they are unique.
pub struct JsonExporter<'m> {
    metadata: &'m dyn LayoutMetaDataProvider,
    options: ExportOptions,
    registry: ElementRegistry,
    node_counter: usize,
    port_counter: usize,
    edge_counter: usize,
    section_counter: usize,
    rng: StdRng,
}

impl Default for JsonExporter<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonExporter<'static> {
    /// An exporter shortening option keys against the core layout options.
    pub fn new() -> Self {
        JsonExporter::with_metadata(LayoutMetaDataService::core())
    }

    /// Like [`JsonExporter::new`], with reproducible collision suffixes.
    pub fn with_seed(seed: u64) -> Self {
        let mut exporter = Self::new();
        exporter.set_seed(seed);
        exporter
    }
}

impl<'m> JsonExporter<'m> {
    pub fn with_metadata(metadata: &'m dyn LayoutMetaDataProvider) -> Self {
        JsonExporter {
            metadata,
            options: ExportOptions::default(),
            registry: ElementRegistry::default(),
            node_counter: 0,
            port_counter: 0,
            edge_counter: 0,
            section_counter: 0,
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    pub fn set_export_options(&mut self, options: ExportOptions) {
        self.options = options;
    }

    pub fn set_options(
        &mut self,
        omit_zero_pos: bool,
        omit_zero_dim: bool,
        omit_layout: bool,
        short_layout_option_keys: bool,
        omit_unknown_layout_options: bool,
    ) {
        self.options.set_options(
            omit_zero_pos,
            omit_zero_dim,
            omit_layout,
            short_layout_option_keys,
            omit_unknown_layout_options,
        );
    }

    pub fn registry(&self) -> &ElementRegistry {
        &self.registry
    }

    /// The id `element` received in the last export. Labels have none.
    pub fn registered_id(&self, element: GraphElement) -> Option<&ElementId> {
        match element {
            GraphElement::Node(n) => self.registry.nodes.id_of(n),
            GraphElement::Port(p) => self.registry.ports.id_of(p),
            GraphElement::Edge(e) => self.registry.edges.id_of(e),
            GraphElement::Section(s) => self.registry.sections.id_of(s),
            GraphElement::Label(_) => None,
        }
    }

    pub fn export(&mut self, graph: &ElkGraph) -> ElkResult<Value> {
        self.export_from(graph, graph.root())
    }

    /// Exports the subgraph below `root`. Edges reaching outside of it are
    /// reported as unknown sources or targets.
    pub fn export_from(&mut self, graph: &ElkGraph, root: NodeIndex) -> ElkResult<Value> {
        self.init();
        let mut json = Value::Object(self.transform_node(graph, root, String::new()));
        self.transform_edges(graph, root, &mut json)?;
        debug!(
            "Exported {} nodes, {} ports, {} edges, {} sections",
            self.registry.nodes.len(),
            self.registry.ports.len(),
            self.registry.edges.len(),
            self.registry.sections.len()
        );
        Ok(json)
    }

    fn init(&mut self) {
        self.registry.clear();
        self.node_counter = 0;
        self.port_counter = 0;
        self.edge_counter = 0;
        self.section_counter = 0;
    }

    fn transform_node(&mut self, graph: &ElkGraph, node: NodeIndex, pointer: String) -> JsonObject {
        let n = graph.node(node);
        let id = unique_id(
            n.identifier.as_deref(),
            'n',
            &mut self.node_counter,
            &self.registry.nodes,
            &mut self.rng,
        );
        let mut obj = new_object();
        add_value(&mut obj, "id", id.to_json());
        self.registry.nodes.insert(id, node);

        if !n.labels().is_empty() {
            let labels = self.transform_labels(graph, n.labels(), &pointer);
            add_value(&mut obj, "labels", labels);
        }
        if !n.ports().is_empty() {
            let ports: Vec<Value> = n
                .ports()
                .iter()
                .enumerate()
                .map(|(i, p)| Value::Object(self.transform_port(graph, *p, child_pointer(&pointer, "ports", i))))
                .collect();
            add_value(&mut obj, "ports", Value::Array(ports));
        }
        if !n.children().is_empty() {
            let children: Vec<Value> = n
                .children()
                .iter()
                .enumerate()
                .map(|(i, c)| {
                    Value::Object(self.transform_node(graph, *c, child_pointer(&pointer, "children", i)))
                })
                .collect();
            add_value(&mut obj, "children", Value::Array(children));
        }

        self.transform_properties(&n.properties, &mut obj);
        self.transform_individual_spacings(&n.properties, &mut obj);
        self.transfer_shape_layout(graph, GraphElement::Node(node), &mut obj);
        self.registry.node_json.insert(node, pointer);
        obj
    }

    fn transform_port(&mut self, graph: &ElkGraph, port: PortIndex, pointer: String) -> JsonObject {
        let p = graph.port(port);
        let id = unique_id(
            p.identifier.as_deref(),
            'p',
            &mut self.port_counter,
            &self.registry.ports,
            &mut self.rng,
        );
        let mut obj = new_object();
        add_value(&mut obj, "id", id.to_json());
        self.registry.ports.insert(id, port);

        if !p.labels().is_empty() {
            let labels = self.transform_labels(graph, p.labels(), &pointer);
            add_value(&mut obj, "labels", labels);
        }
        self.transform_properties(&p.properties, &mut obj);
        self.transfer_shape_layout(graph, GraphElement::Port(port), &mut obj);
        self.registry.port_json.insert(port, pointer);
        obj
    }

    fn transform_labels(&mut self, graph: &ElkGraph, labels: &[LabelIndex], pointer: &str) -> Value {
        Value::Array(
            labels
                .iter()
                .enumerate()
                .map(|(i, l)| Value::Object(self.transform_label(graph, *l, child_pointer(pointer, "labels", i))))
                .collect(),
        )
    }

    fn transform_label(&mut self, graph: &ElkGraph, label: LabelIndex, pointer: String) -> JsonObject {
        let l = graph.label(label);
        let mut obj = new_object();
        add_string(&mut obj, "text", &l.text);
        if let Some(id) = l.identifier.as_deref().filter(|id| !id.is_empty()) {
            add_string(&mut obj, "id", id);
        }
        self.transform_properties(&l.properties, &mut obj);
        self.transfer_shape_layout(graph, GraphElement::Label(label), &mut obj);
        if !l.labels().is_empty() {
            let labels = self.transform_labels(graph, l.labels(), &pointer);
            add_value(&mut obj, "labels", labels);
        }
        self.registry.label_json.insert(label, pointer);
        obj
    }

    /// Second pass: every node gets the edges it contains. All nodes and
    /// ports have their ids by now.
    fn transform_edges(&mut self, graph: &ElkGraph, node: NodeIndex, json: &mut Value) -> ElkResult<()> {
        let n = graph.node(node);
        if !n.contained_edges().is_empty() {
            let node_pointer = self
                .registry
                .node_json
                .get(node)
                .map(str::to_string)
                .unwrap_or_default();
            let mut edges = new_array();
            for (i, edge) in n.contained_edges().iter().enumerate() {
                let edge_pointer = child_pointer(&node_pointer, "edges", i);
                edges.push(Value::Object(self.transform_edge(graph, *edge, edge_pointer)?));
            }
            let obj = json
                .pointer_mut(&node_pointer)
                .and_then(Value::as_object_mut)
                .ok_or_else(|| ElkError::from(format!("No JSON object for node at '{node_pointer}'.")))?;
            add_value(obj, "edges", Value::Array(edges));
        }
        for child in n.children() {
            self.transform_edges(graph, *child, json)?;
        }
        Ok(())
    }

    fn transform_edge(&mut self, graph: &ElkGraph, edge: EdgeIndex, pointer: String) -> ElkResult<JsonObject> {
        let e = graph.edge(edge);
        let id = unique_id(
            e.identifier.as_deref(),
            'e',
            &mut self.edge_counter,
            &self.registry.edges,
            &mut self.rng,
        );
        trace!("Exporting edge {id}");
        let mut obj = new_object();
        add_value(&mut obj, "id", id.to_json());
        self.registry.edges.insert(id, edge);

        let sources = self.endpoint_ids(graph, e.sources(), "source")?;
        add_value(&mut obj, "sources", sources);
        let targets = self.endpoint_ids(graph, e.targets(), "target")?;
        add_value(&mut obj, "targets", targets);

        if !e.labels().is_empty() {
            let labels = self.transform_labels(graph, e.labels(), &pointer);
            add_value(&mut obj, "labels", labels);
        }

        if !self.options.omit_layout && !e.sections().is_empty() {
            // register the whole edge first so sections can refer forward
            for section in e.sections() {
                let s = graph.section(*section);
                let id = unique_id(
                    s.identifier.as_deref(),
                    's',
                    &mut self.section_counter,
                    &self.registry.sections,
                    &mut self.rng,
                );
                self.registry.sections.insert(id, *section);
            }
            let sections: Vec<Value> = e
                .sections()
                .iter()
                .enumerate()
                .map(|(i, s)| Value::Object(self.transform_section(graph, *s, child_pointer(&pointer, "sections", i))))
                .collect();
            add_value(&mut obj, "sections", Value::Array(sections));
        }

        if !self.options.omit_layout {
            if let Some(junction_points) = e
                .properties
                .get(JUNCTION_POINTS)
                .and_then(|v| v.as_vector_chain())
                .filter(|chain| !chain.is_empty())
            {
                add_value(&mut obj, "junctionPoints", point_array(junction_points.iter()));
            }
        }

        self.transform_properties(&e.properties, &mut obj);
        self.registry.edge_json.insert(edge, pointer);
        Ok(obj)
    }

    fn endpoint_ids(&self, graph: &ElkGraph, shapes: &[Shape], kind: &str) -> ElkResult<Value> {
        let mut ids = new_array();
        for shape in shapes {
            let id = match shape {
                Shape::Port(p) => self.registry.ports.id_of(*p),
                Shape::Node(n) => self.registry.nodes.id_of(*n),
            };
            match id {
                Some(id) => ids.push(id.to_json()),
                None => {
                    return Err(ElkError::from(format!(
                        "Unknown edge {kind}: {}",
                        describe_shape(graph, *shape)
                    )))
                }
            }
        }
        Ok(Value::Array(ids))
    }

    fn transform_section(&mut self, graph: &ElkGraph, section: SectionIndex, pointer: String) -> JsonObject {
        let s = graph.section(section);
        let mut obj = new_object();
        if let Some(id) = self.registry.sections.id_of(section) {
            add_value(&mut obj, "id", id.to_json());
        }
        add_value(&mut obj, "startPoint", point(&s.start));
        add_value(&mut obj, "endPoint", point(&s.end));
        if !s.bend_points.is_empty() {
            add_value(&mut obj, "bendPoints", point_array(s.bend_points.iter()));
        }
        for (key, shape) in [("incomingShape", s.incoming_shape), ("outgoingShape", s.outgoing_shape)] {
            if let Some(shape) = shape {
                match self.shape_id(shape) {
                    Some(id) => add_value(&mut obj, key, id.to_json()),
                    None => warn!("Section {key} {} was not exported", describe_shape(graph, shape)),
                }
            }
        }
        for (key, linked) in [
            ("incomingSections", s.incoming_sections()),
            ("outgoingSections", s.outgoing_sections()),
        ] {
            if !linked.is_empty() {
                let ids: Vec<Value> = linked
                    .iter()
                    .filter_map(|l| self.registry.sections.id_of(*l))
                    .map(ElementId::to_json)
                    .collect();
                add_value(&mut obj, key, Value::Array(ids));
            }
        }
        self.transform_properties(&s.properties, &mut obj);
        self.registry.section_json.insert(section, pointer);
        obj
    }

    fn shape_id(&self, shape: Shape) -> Option<&ElementId> {
        match shape {
            Shape::Node(n) => self.registry.nodes.id_of(n),
            Shape::Port(p) => self.registry.ports.id_of(p),
        }
    }

    fn transform_properties(&self, holder: &PropertyHolder, obj: &mut JsonObject) {
        let options = self.option_entries(holder.iter().filter(|(key, _)| key.as_str() != SPACING_INDIVIDUAL));
        if !options.is_empty() {
            add_value(obj, "layoutOptions", Value::Object(options));
        }
    }

    fn transform_individual_spacings(&self, holder: &PropertyHolder, obj: &mut JsonObject) {
        if let Some(spacings) = holder.nested(SPACING_INDIVIDUAL) {
            let options = self.option_entries(spacings.iter());
            if !options.is_empty() {
                add_value(obj, "individualSpacings", Value::Object(options));
            }
        }
    }

    fn option_entries<'a>(
        &self,
        entries: impl Iterator<Item = (&'a String, &'a elk_value::Value)>,
    ) -> JsonObject {
        let mut options = new_object();
        for (key, value) in entries {
            if self.options.omit_unknown_layout_options && !self.is_known(key) {
                debug!("Omitting unknown layout option {key}");
                continue;
            }
            let json_key = if self.options.short_layout_option_keys {
                self.short_option_key(key)
            } else {
                key.clone()
            };
            add_string(&mut options, &json_key, &value.to_string());
        }
        options
    }

    fn is_known(&self, id: &str) -> bool {
        self.metadata.option_data_by_suffix(id).is_some()
    }

    /// The shortest dot separated suffix of the option id that still resolves
    /// to the same option, starting at the option's group when it directly
    /// precedes the name.
    pub fn short_option_key(&self, full_id: &str) -> String {
        let Some(option) = self.metadata.option_data_by_suffix(full_id) else {
            return full_id.to_string();
        };
        let segments: Vec<&str> = option.id.split('.').collect();
        let mut first = segments.len() - 1;
        if first >= 1 && option.group.as_deref() == Some(segments[first - 1]) {
            first -= 1;
        }
        for start in (0..=first).rev() {
            let suffix = segments[start..].join(".");
            let resolved = self.metadata.option_data_by_suffix(&suffix);
            if resolved.map(|o| o.id == option.id).unwrap_or(false) {
                return suffix;
            }
        }
        option.id.clone()
    }

    fn transfer_shape_layout(&self, graph: &ElkGraph, element: GraphElement, obj: &mut JsonObject) {
        if self.options.omit_layout {
            return;
        }
        let Some(bounds) = graph.bounds(element) else {
            return;
        };
        if !(self.options.omit_zero_pos && bounds.x == 0.0 && bounds.y == 0.0) {
            add_number(obj, "x", bounds.x);
            add_number(obj, "y", bounds.y);
        }
        if !(self.options.omit_zero_dim && bounds.width == 0.0 && bounds.height == 0.0) {
            add_number(obj, "width", bounds.width);
            add_number(obj, "height", bounds.height);
        }
    }
}

/// An id for an element: its identifier, or the next counter value, made
/// unique among the ids already registered.
fn unique_id<K: Copy + Eq + Hash + std::fmt::Debug>(
    identifier: Option<&str>,
    prefix: char,
    counter: &mut usize,
    registry: &BiRegistry<K>,
    rng: &mut StdRng,
) -> ElementId {
    let base = match identifier {
        Some(identifier) => identifier.to_string(),
        None => {
            let generated = format!("{prefix}{counter}");
            *counter += 1;
            generated
        }
    };
    let mut id = ElementId::from(base.as_str());
    while registry.contains_id(&id) {
        let candidate = format!("{base}_g{:06}", rng.random_range(0..1_000_000u32));
        warn!("Id {id} is taken, trying {candidate}");
        id = ElementId::from(candidate);
    }
    id
}

fn describe_shape(graph: &ElkGraph, shape: Shape) -> String {
    let identifier = graph.identifier(shape.into());
    match (shape, identifier) {
        (_, Some(identifier)) => identifier.to_string(),
        (Shape::Node(n), None) => format!("node #{}", n.index()),
        (Shape::Port(p), None) => format!("port #{}", p.index()),
    }
}
