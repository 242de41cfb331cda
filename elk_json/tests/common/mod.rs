#![allow(dead_code)]

use elk_json::JsonImporter;
use elk_graph::ElkGraph;
use serde_json::Value;
use simplelog::{Config, LevelFilter, TestLogger};

pub fn init_logging() {
    // several tests race to install it, the first one wins
    let _ = TestLogger::init(LevelFilter::Trace, Config::default());
}

pub fn import(json: Value) -> (JsonImporter<'static>, ElkGraph) {
    init_logging();
    let mut importer = JsonImporter::new();
    let graph = importer.transform(json).unwrap();
    (importer, graph)
}

pub fn import_error(json: Value) -> String {
    init_logging();
    let mut importer = JsonImporter::new();
    importer.transform(json).unwrap_err().message().to_string()
}
