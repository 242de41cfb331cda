//! Descriptions of layout options, algorithms and categories, and the
//! lookup service the graph codecs resolve option keys with.

mod data;
mod service;

pub use data::*;
pub use service::LayoutMetaDataService;

/// Ids of the options every layout run understands.
pub mod core_options {
    pub const ALGORITHM: &str = "org.eclipse.elk.algorithm";
    pub const DIRECTION: &str = "org.eclipse.elk.direction";
    pub const SPACING_NODE_NODE: &str = "org.eclipse.elk.spacing.nodeNode";
    pub const SPACING_EDGE_EDGE: &str = "org.eclipse.elk.spacing.edgeEdge";
    pub const SPACING_EDGE_NODE: &str = "org.eclipse.elk.spacing.edgeNode";
    pub const SPACING_PORT_PORT: &str = "org.eclipse.elk.spacing.portPort";
    pub const SPACING_LABEL_LABEL: &str = "org.eclipse.elk.spacing.labelLabel";
    /// Nested holder of per-element spacing overrides.
    pub const SPACING_INDIVIDUAL: &str = "org.eclipse.elk.spacing.individual";
    pub const PADDING: &str = "org.eclipse.elk.padding";
    pub const EDGE_ROUTING: &str = "org.eclipse.elk.edgeRouting";
    pub const JUNCTION_POINTS: &str = "org.eclipse.elk.junctionPoints";
    pub const POSITION: &str = "org.eclipse.elk.position";
    pub const PORT_CONSTRAINTS: &str = "org.eclipse.elk.portConstraints";
    pub const NODE_SIZE_CONSTRAINTS: &str = "org.eclipse.elk.nodeSize.constraints";
    pub const ASPECT_RATIO: &str = "org.eclipse.elk.aspectRatio";
    pub const HIERARCHY_HANDLING: &str = "org.eclipse.elk.hierarchyHandling";
    pub const PRIORITY: &str = "org.eclipse.elk.priority";
    pub const RANDOM_SEED: &str = "org.eclipse.elk.randomSeed";
    pub const LAYERED_SPACING_BETWEEN_LAYERS: &str =
        "org.eclipse.elk.layered.spacing.nodeNodeBetweenLayers";
    pub const LAYERED_CROSSING_MINIMIZATION_STRATEGY: &str =
        "org.eclipse.elk.layered.crossingMinimization.strategy";
}

/// Read access to layout metadata.
pub trait LayoutMetaDataProvider {
    /// Option registered under exactly `id`.
    fn option_data(&self, id: &str) -> Option<&LayoutOptionData>;

    /// Resolves a possibly shortened option key: an exact id, a legacy id,
    /// or a trailing run of dot separated segments of exactly one option id.
    /// An ambiguous suffix resolves to nothing.
    fn option_data_by_suffix(&self, suffix: &str) -> Option<&LayoutOptionData>;

    fn options(&self) -> Vec<&LayoutOptionData>;

    fn algorithms(&self) -> Vec<&LayoutAlgorithmData>;

    fn categories(&self) -> Vec<&LayoutCategoryData>;
}
