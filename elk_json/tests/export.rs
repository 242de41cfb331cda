mod common;

use common::{import, init_logging};
use elk_graph::{ElkGraph, GraphElement, LabelParent, Shape};
use elk_json::{ExportOptions, JsonExporter, JsonImporter};
use elk_meta::core_options::{DIRECTION, JUNCTION_POINTS, PRIORITY};
use elk_meta::{LayoutMetaDataService, LayoutOptionData, OptionType};
use elk_value::{KVector, KVectorChain, Value as ElkValue};
use serde_json::{json, Value};
use std::collections::HashSet;

fn ids(values: &Value) -> Vec<String> {
    values
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["id"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn generated_ids_never_collide() {
    init_logging();
    let mut graph = ElkGraph::new();
    let root = graph.root();
    let given = graph.create_node(root);
    graph.node_mut(given).identifier = Some("n1".to_string());
    let generated = graph.create_node(root);
    let twin_a = graph.create_node(root);
    graph.node_mut(twin_a).identifier = Some("x".to_string());
    let twin_b = graph.create_node(root);
    graph.node_mut(twin_b).identifier = Some("x".to_string());
    let port = graph.create_port(given);
    let edge = graph.create_edge(root);
    graph.add_source(edge, Shape::Port(port));
    graph.add_target(edge, Shape::Node(generated));

    let mut exporter = JsonExporter::with_seed(42);
    let output = exporter.export(&graph).unwrap();

    assert_eq!(output["id"], json!("n0"));
    let children = ids(&output["children"]);
    assert_eq!(children[0], "n1");
    assert!(children[1].starts_with("n1_g"), "{}", children[1]);
    assert_eq!(children[1].len(), "n1_g".len() + 6);
    assert_eq!(children[2], "x");
    assert!(children[3].starts_with("x_g"), "{}", children[3]);
    let unique: HashSet<&String> = children.iter().collect();
    assert_eq!(unique.len(), 4);

    assert_eq!(output["children"][0]["ports"][0]["id"], json!("p0"));
    assert_eq!(
        output["edges"][0],
        json!({"id": "e0", "sources": ["p0"], "targets": [children[1].clone()]})
    );
    assert_eq!(
        exporter.registered_id(GraphElement::Node(generated)).map(|id| id.to_string()),
        Some(children[1].clone())
    );
}

#[test]
fn counters_restart_with_every_export() {
    init_logging();
    let mut graph = ElkGraph::new();
    let root = graph.root();
    graph.create_node(root);
    let mut exporter = JsonExporter::new();
    let first = exporter.export(&graph).unwrap();
    let second = exporter.export(&graph).unwrap();
    assert_eq!(first, second);
    assert_eq!(ids(&second["children"]), vec!["n1".to_string()]);
}

#[test]
fn geometry_is_omitted_as_configured() {
    init_logging();
    let mut graph = ElkGraph::new();
    let root = graph.root();
    let sized = graph.create_node(root);
    graph.node_mut(sized).identifier = Some("sized".to_string());
    graph.node_mut(sized).bounds.set_dimensions(10.0, 0.0);
    let placed = graph.create_node(root);
    graph.node_mut(placed).identifier = Some("placed".to_string());
    graph.node_mut(placed).bounds.set_location(0.0, 5.0);
    let edge = graph.create_edge(root);
    graph.add_source(edge, Shape::Node(sized));
    graph.add_target(edge, Shape::Node(placed));
    let section = graph.create_section(edge);
    graph.section_mut(section).end = KVector::new(0.0, 5.0);
    graph
        .edge_mut(edge)
        .properties
        .set(JUNCTION_POINTS, KVectorChain(vec![KVector::new(0.0, 2.0)]));

    let mut exporter = JsonExporter::new();
    let output = exporter.export(&graph).unwrap();
    assert_eq!(
        output["children"],
        json!([
            {"id": "sized", "width": 10.0, "height": 0.0},
            {"id": "placed", "x": 0.0, "y": 5.0}
        ])
    );
    assert!(output.get("x").is_none());
    assert_eq!(output["edges"][0]["sections"][0]["id"], json!("s0"));
    assert_eq!(output["edges"][0]["junctionPoints"], json!([{"x": 0.0, "y": 2.0}]));

    exporter.set_export_options(ExportOptions::default().omit_zero_pos(false).omit_zero_dim(false));
    let output = exporter.export(&graph).unwrap();
    assert_eq!(output["x"], json!(0.0));
    assert_eq!(output["width"], json!(0.0));

    exporter.set_options(true, true, true, true, true);
    let output = exporter.export(&graph).unwrap();
    assert_eq!(output["children"], json!([{"id": "sized"}, {"id": "placed"}]));
    assert_eq!(
        output["edges"][0],
        json!({"id": "e0", "sources": ["sized"], "targets": ["placed"]})
    );
}

#[test]
fn option_keys_are_shortened() {
    let (_, graph) = import(json!({
        "id": "root",
        "layoutOptions": {
            "org.eclipse.elk.direction": "right",
            "nodeNode": "20",
            "org.eclipse.elk.layered.crossingMinimization.strategy": "LAYER_SWEEP",
            "org.eclipse.elk.layered.spacing.nodeNodeBetweenLayers": 30
        }
    }));
    assert_eq!(
        graph.node(graph.root()).properties.get(DIRECTION),
        Some(&ElkValue::Enum("RIGHT".to_string()))
    );

    let mut exporter = JsonExporter::new();
    let output = exporter.export(&graph).unwrap();
    assert_eq!(
        output["layoutOptions"],
        json!({
            "direction": "RIGHT",
            "spacing.nodeNode": "20.0",
            "crossingMinimization.strategy": "LAYER_SWEEP",
            "spacing.nodeNodeBetweenLayers": "30.0"
        })
    );

    exporter.set_export_options(ExportOptions::default().short_layout_option_keys(false));
    let output = exporter.export(&graph).unwrap();
    assert_eq!(output["layoutOptions"]["org.eclipse.elk.direction"], json!("RIGHT"));
    assert_eq!(
        output["layoutOptions"]["org.eclipse.elk.layered.spacing.nodeNodeBetweenLayers"],
        json!("30.0")
    );
}

#[test]
fn short_keys_of_ambiguous_names_read_back() {
    init_logging();
    let mut service = LayoutMetaDataService::new();
    service.register_option(LayoutOptionData::new("a.b.c.optionName", OptionType::Int));
    service.register_option(LayoutOptionData::new("a.b.d.optionName", OptionType::Int));

    let mut importer = JsonImporter::with_metadata(&service);
    let graph = importer
        .transform(json!({
            "id": "root",
            "layoutOptions": {"a.b.c.optionName": 3, "d.optionName": "4", "optionName": "5"}
        }))
        .unwrap();
    let properties = &graph.node(graph.root()).properties;
    assert_eq!(properties.len(), 2);
    assert_eq!(properties.get("a.b.c.optionName"), Some(&ElkValue::Int(3)));

    let mut exporter = JsonExporter::with_metadata(&service);
    let output = exporter.export(&graph).unwrap();
    assert_eq!(
        output["layoutOptions"],
        json!({"c.optionName": "3", "d.optionName": "4"})
    );

    let again = importer.transform(output).unwrap();
    assert_eq!(&again.node(again.root()).properties, properties);
}

#[test]
fn unknown_options_are_dropped_unless_asked_for() {
    init_logging();
    let mut graph = ElkGraph::new();
    let root = graph.root();
    graph.node_mut(root).identifier = Some("root".to_string());
    let label = graph.create_label(LabelParent::Node(root), "title");
    graph.label_mut(label).properties.set("com.example.color", "red");
    graph.label_mut(label).properties.set(PRIORITY, 2);

    let mut exporter = JsonExporter::new();
    let output = exporter.export(&graph).unwrap();
    assert_eq!(
        output["labels"],
        json!([{"text": "title", "layoutOptions": {"priority": "2"}}])
    );

    exporter.set_export_options(ExportOptions::default().omit_unknown_layout_options(false));
    let output = exporter.export(&graph).unwrap();
    assert_eq!(
        output["labels"][0]["layoutOptions"],
        json!({"com.example.color": "red", "priority": "2"})
    );
}

#[test]
fn nested_labels_are_exported() {
    let input = json!({
        "id": "root",
        "labels": [{"text": "outer", "id": "l", "labels": [{"text": "inner", "width": 4.0, "height": 2.0}]}]
    });
    let (_, graph) = import(input.clone());
    assert_eq!(JsonExporter::new().export(&graph).unwrap(), input);
}

#[test]
fn sections_keep_shapes_and_section_links() {
    let input = json!({
        "id": "root",
        "children": [{"id": "a"}, {"id": "b"}, {"id": "c"}],
        "edges": [{
            "id": "h",
            "sources": ["a", "b"],
            "targets": ["c"],
            "sections": [
                {"id": "s1", "startPoint": {"x": 0.0, "y": 0.0}, "endPoint": {"x": 5.0, "y": 5.0},
                 "incomingShape": "a", "outgoingSections": ["s3"]},
                {"id": "s2", "startPoint": {"x": 9.0, "y": 0.0}, "endPoint": {"x": 5.0, "y": 5.0},
                 "incomingShape": "b", "outgoingSections": ["s3"]},
                {"id": "s3", "startPoint": {"x": 5.0, "y": 5.0}, "endPoint": {"x": 5.0, "y": 9.0},
                 "incomingShape": "a", "incomingSections": ["s1", "s2"], "outgoingShape": "c",
                 "layoutOptions": {"priority": "1"}}
            ]
        }]
    });
    let (_, graph) = import(input.clone());
    assert_eq!(JsonExporter::new().export(&graph).unwrap(), input);
}

#[test]
fn exporting_a_subgraph_reports_outside_endpoints() {
    init_logging();
    let mut graph = ElkGraph::new();
    let root = graph.root();
    let inner = graph.create_node(root);
    graph.node_mut(inner).identifier = Some("inner".to_string());
    let leaf = graph.create_node(inner);
    let outside = graph.create_node(root);
    graph.node_mut(outside).identifier = Some("outside".to_string());

    let edge = graph.create_edge(inner);
    graph.add_source(edge, Shape::Node(leaf));
    graph.add_target(edge, Shape::Node(outside));
    let mut exporter = JsonExporter::new();
    assert_eq!(
        exporter.export_from(&graph, inner).unwrap_err().message(),
        "Unknown edge target: outside"
    );

    let back = graph.create_edge(inner);
    graph.add_source(back, Shape::Node(outside));
    graph.add_target(back, Shape::Node(leaf));
    let mut exporter = JsonExporter::new();
    assert!(exporter.export(&graph).is_ok());
    assert_eq!(
        exporter.export_from(&graph, inner).unwrap_err().message(),
        "Unknown edge target: outside"
    );
    let leaf_only = JsonExporter::new().export_from(&graph, leaf).unwrap();
    assert_eq!(leaf_only, json!({"id": "n0"}));
}
