//! The JSON form of layout graphs.
//!
//! [`JsonImporter`] turns a JSON graph into an [`elk_graph::ElkGraph`] and,
//! once a layout has been computed, writes positions, sizes and edge routes
//! back into the JSON it read. [`JsonExporter`] goes the other way and
//! produces a fresh document from any graph.
//!
//! ```
//! use elk_json::JsonImporter;
//! use serde_json::json;
//!
//! let mut importer = JsonImporter::new();
//! let graph = importer
//!     .transform(json!({"id": "root", "children": [{"id": "n1", "width": 10}]}))
//!     .unwrap();
//! assert_eq!(graph.node_count(), 2);
//! ```

pub mod adapter;
pub mod exporter;
pub mod importer;
pub mod metadata;
pub mod options;
pub mod registry;

pub use adapter::ElementId;
pub use exporter::JsonExporter;
pub use importer::JsonImporter;
pub use options::ExportOptions;
pub use registry::ElementRegistry;
