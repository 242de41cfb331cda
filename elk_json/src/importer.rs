use crate::adapter::*;
use crate::registry::ElementRegistry;
use elk_graph::{
    EdgeIndex, ElkGraph, GraphElement, LabelParent, NodeIndex, SectionIndex, Shape,
};
use elk_meta::core_options::{JUNCTION_POINTS, SPACING_INDIVIDUAL};
use elk_meta::{LayoutMetaDataProvider, LayoutMetaDataService};
use elk_traits::{ElkError, ElkResult};
use elk_value::PropertyHolder;
use log::{debug, trace, warn};
use serde_json::Value;

/// Reads the JSON form of a graph into an [`ElkGraph`] and writes computed
/// layout back into that same JSON.
///
/// The importer keeps the JSON it was given, along with where every element
/// came from, so that [`JsonImporter::transfer_layout`] can update it in place.
pub struct JsonImporter<'m> {
    metadata: &'m dyn LayoutMetaDataProvider,
    registry: ElementRegistry,
    input_model: Value,
}

impl Default for JsonImporter<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonImporter<'static> {
    /// An importer resolving option keys against the core layout options.
    pub fn new() -> Self {
        JsonImporter::with_metadata(LayoutMetaDataService::core())
    }
}

impl<'m> JsonImporter<'m> {
    pub fn with_metadata(metadata: &'m dyn LayoutMetaDataProvider) -> Self {
        JsonImporter {
            metadata,
            registry: ElementRegistry::default(),
            input_model: Value::Null,
        }
    }

    /// The JSON of the last [`JsonImporter::transform`] call, including any
    /// layout transferred into it since.
    pub fn input_model(&self) -> &Value {
        &self.input_model
    }

    pub fn into_input_model(self) -> Value {
        self.input_model
    }

    pub fn registry(&self) -> &ElementRegistry {
        &self.registry
    }

    /// Builds the graph described by `json`. The JSON is retained as the
    /// input model, even when the import fails.
    pub fn transform(&mut self, json: Value) -> ElkResult<ElkGraph> {
        self.registry.clear();
        let result = self.transform_graph(&json);
        self.input_model = json;
        result
    }

    fn transform_graph(&mut self, json: &Value) -> ElkResult<ElkGraph> {
        let root_obj = json
            .as_object()
            .ok_or_else(|| ElkError::from("The graph must be a JSON object."))?;
        let mut graph = ElkGraph::new();
        let root = graph.root();
        self.transform_node(&mut graph, root_obj, String::new(), root)?;
        self.transform_edges(&mut graph, root_obj, String::new(), root)?;
        debug!(
            "Imported graph with {} nodes, {} ports, {} edges, {} sections, {} labels",
            graph.node_count(),
            graph.port_count(),
            graph.edge_count(),
            graph.section_count(),
            graph.label_count()
        );
        Ok(graph)
    }

    fn transform_node(
        &mut self,
        graph: &mut ElkGraph,
        obj: &JsonObject,
        pointer: String,
        node: NodeIndex,
    ) -> ElkResult<()> {
        let id = get_id(obj)?;
        trace!("Importing node {id}");
        self.registry.nodes.insert(id, node);
        graph.node_mut(node).identifier = id_or_none(obj);

        self.transform_properties(obj, &mut graph.node_mut(node).properties);
        self.transform_individual_spacings(obj, &mut graph.node_mut(node).properties);
        transform_shape_layout(obj, graph, GraphElement::Node(node));

        for (i, port_obj) in objects_of(obj, "ports") {
            let port = graph.create_port(node);
            let port_pointer = child_pointer(&pointer, "ports", i);
            self.registry.ports.insert(get_id(port_obj)?, port);
            graph.port_mut(port).identifier = id_or_none(port_obj);
            self.transform_properties(port_obj, &mut graph.port_mut(port).properties);
            transform_shape_layout(port_obj, graph, GraphElement::Port(port));
            self.transform_labels(graph, port_obj, &port_pointer, LabelParent::Port(port));
            self.registry.port_json.insert(port, port_pointer);
        }

        self.transform_labels(graph, obj, &pointer, LabelParent::Node(node));

        for (i, child_obj) in objects_of(obj, "children") {
            let child = graph.create_node(node);
            self.transform_node(graph, child_obj, child_pointer(&pointer, "children", i), child)?;
        }

        self.registry.node_json.insert(node, pointer);
        Ok(())
    }

    fn transform_labels(
        &mut self,
        graph: &mut ElkGraph,
        obj: &JsonObject,
        pointer: &str,
        parent: LabelParent,
    ) {
        for (i, label_obj) in objects_of(obj, "labels") {
            let text = opt_string(label_obj, "text").unwrap_or_default();
            let label = graph.create_label(parent, &text);
            let label_pointer = child_pointer(pointer, "labels", i);
            if has(label_obj, "id") {
                graph.label_mut(label).identifier = id_or_none(label_obj);
            }
            self.transform_properties(label_obj, &mut graph.label_mut(label).properties);
            transform_shape_layout(label_obj, graph, GraphElement::Label(label));
            self.transform_labels(graph, label_obj, &label_pointer, LabelParent::Label(label));
            self.registry.label_json.insert(label, label_pointer);
        }
    }

    /// Imports the edges of `node` and, recursively, of its children. Runs
    /// once all nodes and ports are registered.
    fn transform_edges(
        &mut self,
        graph: &mut ElkGraph,
        obj: &JsonObject,
        pointer: String,
        node: NodeIndex,
    ) -> ElkResult<()> {
        for (i, edge_obj) in objects_of(obj, "edges") {
            let edge_pointer = child_pointer(&pointer, "edges", i);
            let edge = if has(edge_obj, "sources") || has(edge_obj, "targets") {
                self.transform_edge(graph, edge_obj, &edge_pointer, node)?
            } else {
                self.transform_primitive_edge(graph, edge_obj, &edge_pointer, node)?
            };
            graph.update_containment(edge)?;
            self.registry.edge_json.insert(edge, edge_pointer);
        }

        // children were created in the order of their JSON objects
        let children: Vec<NodeIndex> = graph.node(node).children().to_vec();
        for ((i, child_obj), child) in objects_of(obj, "children").zip(children) {
            self.transform_edges(graph, child_obj, child_pointer(&pointer, "children", i), child)?;
        }
        Ok(())
    }

    fn transform_primitive_edge(
        &mut self,
        graph: &mut ElkGraph,
        obj: &JsonObject,
        pointer: &str,
        parent: NodeIndex,
    ) -> ElkResult<EdgeIndex> {
        let id = get_id(obj)?;
        let edge = graph.create_edge(parent);
        self.registry.edges.insert(id.clone(), edge);
        graph.edge_mut(edge).identifier = id_or_none(obj);

        let source = self.primitive_endpoint(graph, obj, &id, "source", "sourcePort")?;
        graph.add_source(edge, source);
        let target = self.primitive_endpoint(graph, obj, &id, "target", "targetPort")?;
        graph.add_target(edge, target);

        self.transform_properties(obj, &mut graph.edge_mut(edge).properties);

        if has(obj, "sourcePoint") || has(obj, "targetPoint") || has(obj, "bendPoints") {
            let section = graph.create_section(edge);
            let s = graph.section_mut(section);
            if let Some(p) = opt_object(obj, "sourcePoint") {
                s.start = read_point(p);
            }
            if let Some(p) = opt_object(obj, "targetPoint") {
                s.end = read_point(p);
            }
            s.bend_points = objects_of(obj, "bendPoints")
                .map(|(_, p)| read_point(p))
                .collect();
        }

        self.transform_labels(graph, obj, pointer, LabelParent::Edge(edge));
        Ok(edge)
    }

    /// Resolves `node_key` and the optional `port_key` of a primitive edge.
    fn primitive_endpoint(
        &self,
        graph: &ElkGraph,
        obj: &JsonObject,
        edge_id: &ElementId,
        node_key: &str,
        port_key: &str,
    ) -> ElkResult<Shape> {
        let node = match obj.get(node_key) {
            Some(v) => self.registry.nodes.get(&as_id(v)?),
            None => None,
        };
        let node = node.ok_or_else(|| {
            ElkError::from(format!(
                "An edge must have a {node_key} node (edge id: '{edge_id}')."
            ))
        })?;
        let port = match obj.get(port_key) {
            Some(v) => self.registry.ports.get(&as_id(v)?),
            None => None,
        };
        match port {
            Some(port) if graph.port(port).parent() != node => Err(ElkError::from(format!(
                "The {node_key} port of an edge must be a port of the edge's {node_key} node (edge id: '{edge_id}')."
            ))),
            Some(port) => Ok(Shape::Port(port)),
            None => Ok(Shape::Node(node)),
        }
    }

    fn transform_edge(
        &mut self,
        graph: &mut ElkGraph,
        obj: &JsonObject,
        pointer: &str,
        parent: NodeIndex,
    ) -> ElkResult<EdgeIndex> {
        let id = get_id(obj)?;
        let edge = graph.create_edge(parent);
        self.registry.edges.insert(id.clone(), edge);
        graph.edge_mut(edge).identifier = id_or_none(obj);

        for source in opt_array(obj, "sources").into_iter().flatten() {
            let shape = self.shape_by_id(&as_id(source)?)?;
            graph.add_source(edge, shape);
        }
        for target in opt_array(obj, "targets").into_iter().flatten() {
            let shape = self.shape_by_id(&as_id(target)?)?;
            graph.add_target(edge, shape);
        }
        if !graph.edge(edge).is_connected() {
            return Err(ElkError::from(format!(
                "An edge must have at least one source and one target (edge id: '{id}')."
            )));
        }

        self.transform_properties(obj, &mut graph.edge_mut(edge).properties);
        self.transform_edge_sections(graph, obj, pointer, edge, &id)?;
        self.transform_labels(graph, obj, pointer, LabelParent::Edge(edge));
        Ok(edge)
    }

    fn transform_edge_sections(
        &mut self,
        graph: &mut ElkGraph,
        obj: &JsonObject,
        pointer: &str,
        edge: EdgeIndex,
        edge_id: &ElementId,
    ) -> ElkResult<()> {
        // section references may point forward, resolve them once all
        // sections of the edge are registered
        let mut incoming: Vec<(SectionIndex, ElementId)> = Vec::new();
        let mut outgoing: Vec<(SectionIndex, ElementId)> = Vec::new();

        for (i, section_obj) in objects_of(obj, "sections") {
            let section = graph.create_section(edge);
            self.registry.sections.insert(get_id(section_obj)?, section);
            self.registry
                .section_json
                .insert(section, child_pointer(pointer, "sections", i));

            let start = opt_object(section_obj, "startPoint")
                .ok_or_else(|| ElkError::from("All edge sections need a start point."))?;
            let end = opt_object(section_obj, "endPoint")
                .ok_or_else(|| ElkError::from("All edge sections need an end point."))?;
            let incoming_shape = match section_obj.get("incomingShape") {
                Some(v) => Some(self.shape_by_id(&as_id(v)?)?),
                None => None,
            };
            let outgoing_shape = match section_obj.get("outgoingShape") {
                Some(v) => Some(self.shape_by_id(&as_id(v)?)?),
                None => None,
            };
            for id in opt_array(section_obj, "incomingSections").into_iter().flatten() {
                incoming.push((section, as_id(id)?));
            }
            for id in opt_array(section_obj, "outgoingSections").into_iter().flatten() {
                outgoing.push((section, as_id(id)?));
            }

            let s = graph.section_mut(section);
            s.identifier = id_or_none(section_obj);
            s.start = read_point(start);
            s.end = read_point(end);
            s.bend_points = objects_of(section_obj, "bendPoints")
                .map(|(_, p)| read_point(p))
                .collect();
            s.incoming_shape = incoming_shape;
            s.outgoing_shape = outgoing_shape;
            self.transform_properties(section_obj, &mut s.properties);
        }

        for (section, id) in incoming {
            let referenced = self.section_of_edge(graph, edge, &id, edge_id)?;
            graph.connect_sections(referenced, section);
        }
        for (section, id) in outgoing {
            let referenced = self.section_of_edge(graph, edge, &id, edge_id)?;
            graph.connect_sections(section, referenced);
        }

        let e = graph.edge(edge);
        if e.is_connected() && !e.is_hyperedge() && e.sections().len() == 1 {
            let (source, target, section) = (e.sources()[0], e.targets()[0], e.sections()[0]);
            let s = graph.section_mut(section);
            if s.incoming_shape.is_none() && s.outgoing_shape.is_none() {
                s.incoming_shape = Some(source);
                s.outgoing_shape = Some(target);
            }
        }
        Ok(())
    }

    /// Sections only link to sections of the same edge.
    fn section_of_edge(
        &self,
        graph: &ElkGraph,
        edge: EdgeIndex,
        id: &ElementId,
        edge_id: &ElementId,
    ) -> ElkResult<SectionIndex> {
        self.registry
            .sections
            .get(id)
            .filter(|s| graph.section(*s).parent() == edge)
            .ok_or_else(|| {
                ElkError::from(format!(
                    "Referenced edge section does not exist: {id} (edge id: '{edge_id}')."
                ))
            })
    }

    fn shape_by_id(&self, id: &ElementId) -> ElkResult<Shape> {
        if let Some(node) = self.registry.nodes.get(id) {
            return Ok(Shape::Node(node));
        }
        if let Some(port) = self.registry.ports.get(id) {
            return Ok(Shape::Port(port));
        }
        Err(ElkError::from(format!("Referenced shape does not exist: {id}")))
    }

    /// Reads `layoutOptions`, or the older `properties`, into `holder`.
    fn transform_properties(&self, obj: &JsonObject, holder: &mut PropertyHolder) {
        let options = opt_object(obj, "layoutOptions").or_else(|| opt_object(obj, "properties"));
        if let Some(options) = options {
            for key in keys(options) {
                self.set_option(holder, key, &options[key]);
            }
        }
    }

    fn transform_individual_spacings(&self, obj: &JsonObject, holder: &mut PropertyHolder) {
        if let Some(options) = opt_object(obj, "individualSpacings") {
            holder.update_nested(SPACING_INDIVIDUAL, |spacings| {
                for key in keys(options) {
                    self.set_option(spacings, key, &options[key]);
                }
            });
        }
    }

    fn set_option(&self, holder: &mut PropertyHolder, key: &str, raw: &Value) {
        let Some(option) = self.metadata.option_data_by_suffix(key) else {
            warn!("Dropping unknown layout option {key}");
            return;
        };
        let Some(text) = string_val(raw) else {
            warn!("Dropping layout option {key}, its value is not a primitive");
            return;
        };
        match option.parse_value(&text) {
            Some(value) => holder.set(&option.id, value),
            None => warn!("Dropping layout option {key}, cannot parse '{text}'"),
        }
    }

    /// Writes the layout of `graph`, which must come from the last
    /// [`JsonImporter::transform`] call, back into the input model.
    ///
    /// Shapes get their position and size, edges their sections, junction
    /// points and the id of the node containing them. Sections created after
    /// the import are added to the JSON and remembered, so transferring
    /// again updates them instead of adding more.
    pub fn transfer_layout(&mut self, graph: &ElkGraph) -> ElkResult<()> {
        for element in graph.elements() {
            match element {
                GraphElement::Node(n) => {
                    let pointer = self.registry.node_json.get(n);
                    let obj = json_at(&mut self.input_model, pointer, "Node did not exist in input.")?;
                    transfer_shape_layout(graph, element, obj);
                }
                GraphElement::Port(p) => {
                    let pointer = self.registry.port_json.get(p);
                    let obj = json_at(&mut self.input_model, pointer, "Port did not exist in input.")?;
                    transfer_shape_layout(graph, element, obj);
                }
                GraphElement::Label(l) => {
                    let pointer = self.registry.label_json.get(l);
                    let obj = json_at(&mut self.input_model, pointer, "Label did not exist in input.")?;
                    transfer_shape_layout(graph, element, obj);
                }
                GraphElement::Edge(e) => self.transfer_edge_layout(graph, e)?,
                // written along with their edge
                GraphElement::Section(_) => {}
            }
        }
        debug!("Layout transferred to the input model");
        Ok(())
    }

    fn transfer_edge_layout(&mut self, graph: &ElkGraph, edge: EdgeIndex) -> ElkResult<()> {
        const MISSING: &str = "Edge did not exist in input.";
        let edge_pointer = self
            .registry
            .edge_json
            .get(edge)
            .ok_or_else(|| ElkError::from(MISSING))?
            .to_string();
        let edge_id = self
            .registry
            .edges
            .id_of(edge)
            .cloned()
            .ok_or_else(|| ElkError::from(MISSING))?;
        let e = graph.edge(edge);

        if !e.sections().is_empty() {
            // every section needs an id before references to it are written
            for (i, section) in e.sections().iter().enumerate() {
                if self.registry.sections.id_of(*section).is_none() {
                    let mut n = i;
                    let mut id = ElementId::from(format!("{edge_id}_s{n}"));
                    while self.registry.sections.contains_id(&id) {
                        n += 1;
                        id = ElementId::from(format!("{edge_id}_s{n}"));
                    }
                    trace!("Section {i} of edge {edge_id} gets id {id}");
                    self.registry.sections.insert(id, *section);
                }
            }

            let obj = json_at(&mut self.input_model, Some(&edge_pointer), MISSING)?;
            let mut previous = match obj.remove("sections") {
                Some(Value::Array(sections)) => sections,
                _ => Vec::new(),
            };
            let mut sections = new_array();
            for (i, section) in e.sections().iter().enumerate() {
                let reused = self
                    .registry
                    .section_json
                    .get(*section)
                    .and_then(pointer_position)
                    .and_then(|k| previous.get_mut(k))
                    .map(Value::take);
                let mut section_obj = match reused {
                    Some(Value::Object(o)) => o,
                    _ => {
                        let mut o = new_object();
                        if let Some(id) = self.registry.sections.id_of(*section) {
                            add_value(&mut o, "id", id.to_json());
                        }
                        o
                    }
                };
                write_section(graph, &self.registry, *section, &mut section_obj);
                sections.push(Value::Object(section_obj));
                self.registry
                    .section_json
                    .insert(*section, child_pointer(&edge_pointer, "sections", i));
            }
            add_value(obj, "sections", Value::Array(sections));
        }

        let container = self
            .registry
            .nodes
            .id_of(e.containing_node())
            .map(ElementId::to_json)
            .ok_or_else(|| ElkError::from("Node did not exist in input."))?;
        let obj = json_at(&mut self.input_model, Some(&edge_pointer), MISSING)?;
        if let Some(junction_points) = e
            .properties
            .get(JUNCTION_POINTS)
            .and_then(|v| v.as_vector_chain())
            .filter(|chain| !chain.is_empty())
        {
            add_value(obj, "junctionPoints", point_array(junction_points.iter()));
        }
        add_value(obj, "container", container);
        Ok(())
    }
}

fn write_section(
    graph: &ElkGraph,
    registry: &ElementRegistry,
    section: SectionIndex,
    obj: &mut JsonObject,
) {
    let s = graph.section(section);
    add_value(obj, "startPoint", point(&s.start));
    add_value(obj, "endPoint", point(&s.end));
    if s.bend_points.is_empty() {
        obj.remove("bendPoints");
    } else {
        add_value(obj, "bendPoints", point_array(s.bend_points.iter()));
    }

    let shape_id = |shape: Shape| match shape {
        Shape::Node(n) => registry.nodes.id_of(n),
        Shape::Port(p) => registry.ports.id_of(p),
    };
    for (key, shape) in [("incomingShape", s.incoming_shape), ("outgoingShape", s.outgoing_shape)] {
        match shape.and_then(shape_id) {
            Some(id) => add_value(obj, key, id.to_json()),
            None => {
                obj.remove(key);
            }
        }
    }

    for (key, linked) in [
        ("incomingSections", s.incoming_sections()),
        ("outgoingSections", s.outgoing_sections()),
    ] {
        let ids: Vec<Value> = linked
            .iter()
            .filter_map(|l| registry.sections.id_of(*l))
            .map(ElementId::to_json)
            .collect();
        if ids.is_empty() {
            obj.remove(key);
        } else {
            add_value(obj, key, Value::Array(ids));
        }
    }
}

fn transform_shape_layout(obj: &JsonObject, graph: &mut ElkGraph, element: GraphElement) {
    let Some(bounds) = graph.bounds_mut(element) else {
        return;
    };
    for (key, slot) in [
        ("x", &mut bounds.x),
        ("y", &mut bounds.y),
        ("width", &mut bounds.width),
        ("height", &mut bounds.height),
    ] {
        if let Some(v) = opt_double(obj, key) {
            *slot = valid_double(key, v);
        }
    }
}

fn valid_double(key: &str, v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        warn!("Replacing non finite {key} with 0");
        0.0
    }
}

fn transfer_shape_layout(graph: &ElkGraph, element: GraphElement, obj: &mut JsonObject) {
    if let Some(bounds) = graph.bounds(element) {
        add_number(obj, "x", bounds.x);
        add_number(obj, "y", bounds.y);
        add_number(obj, "width", bounds.width);
        add_number(obj, "height", bounds.height);
    }
}

/// The object `pointer` refers to in `model`.
fn json_at<'a>(
    model: &'a mut Value,
    pointer: Option<&str>,
    missing: &str,
) -> ElkResult<&'a mut JsonObject> {
    let value = match pointer {
        Some(p) => model.pointer_mut(p),
        None => None,
    };
    value
        .and_then(Value::as_object_mut)
        .ok_or_else(|| ElkError::from(missing))
}

/// Array position encoded in the last segment of a pointer.
fn pointer_position(pointer: &str) -> Option<usize> {
    pointer.rsplit('/').next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pointer_position() {
        assert_eq!(pointer_position("/edges/0/sections/12"), Some(12));
        assert_eq!(pointer_position(""), None);
    }

    #[test]
    fn test_root_must_be_object() {
        let mut importer = JsonImporter::new();
        let err = importer.transform(json!([1, 2])).unwrap_err();
        assert_eq!(err.message(), "The graph must be a JSON object.");
        assert_eq!(importer.input_model(), &json!([1, 2]));
    }

    #[test]
    fn test_geometry_defaults() {
        let mut importer = JsonImporter::new();
        let graph = importer
            .transform(json!({"id": "root", "x": "12", "width": 30.5, "children": [{"id": "a"}]}))
            .unwrap();
        let root = graph.node(graph.root());
        assert_eq!(root.bounds.x, 12.0);
        assert_eq!(root.bounds.y, 0.0);
        assert_eq!(root.bounds.width, 30.5);
        assert_eq!(graph.node(root.children()[0]).bounds.height, 0.0);
    }

    #[test]
    fn test_non_finite_geometry_is_zeroed() {
        let mut importer = JsonImporter::new();
        let graph = importer
            .transform(json!({"id": "root", "x": "NaN", "y": "inf", "width": "-Infinity", "height": 3}))
            .unwrap();
        let bounds = graph.node(graph.root()).bounds;
        assert_eq!(bounds.x, 0.0);
        assert_eq!(bounds.y, 0.0);
        assert_eq!(bounds.width, 0.0);
        assert_eq!(bounds.height, 3.0);
    }

    #[test]
    fn test_labels_need_no_id() {
        let mut importer = JsonImporter::new();
        let graph = importer
            .transform(json!({
                "id": "root",
                "labels": [{"text": "outer", "labels": [{"text": "inner", "id": 4}]}]
            }))
            .unwrap();
        let outer = graph.node(graph.root()).labels()[0];
        assert_eq!(graph.label(outer).text, "outer");
        assert_eq!(graph.label(outer).identifier, None);
        let inner = graph.label(outer).labels()[0];
        assert_eq!(graph.label(inner).identifier.as_deref(), Some("4"));
        assert_eq!(importer.registry().label_json.get(inner), Some("/labels/0/labels/0"));
    }
}
