use crate::core_options::*;
use crate::data::*;
use crate::LayoutMetaDataProvider;
use elk_value::{ElkPadding, Value};
use log::{debug, warn};
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

/// In-memory registry of layout option, algorithm and category descriptions.
#[derive(Clone, Debug, Default)]
pub struct LayoutMetaDataService {
    options: BTreeMap<String, LayoutOptionData>,
    legacy_ids: HashMap<String, String>,
    algorithms: BTreeMap<String, LayoutAlgorithmData>,
    categories: BTreeMap<String, LayoutCategoryData>,
}

static CORE: OnceLock<LayoutMetaDataService> = OnceLock::new();

impl LayoutMetaDataService {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the core options, algorithms and categories.
    pub fn with_core_options() -> Self {
        let mut service = Self::new();
        register_core(&mut service);
        service
    }

    /// The process wide registry with the core option set, built on first use.
    pub fn core() -> &'static LayoutMetaDataService {
        CORE.get_or_init(Self::with_core_options)
    }

    pub fn register_option(&mut self, option: LayoutOptionData) {
        for legacy in option.legacy_ids.iter() {
            self.legacy_ids.insert(legacy.clone(), option.id.clone());
        }
        if self.options.contains_key(&option.id) {
            warn!("Layout option {} registered twice, keeping the last one", option.id);
        }
        self.options.insert(option.id.clone(), option);
    }

    pub fn register_algorithm(&mut self, algorithm: LayoutAlgorithmData) {
        if let Some(category_id) = algorithm.category_id.as_ref() {
            let category = self
                .categories
                .entry(category_id.clone())
                .or_insert_with(|| LayoutCategoryData::new(category_id));
            if !category.layouters.contains(&algorithm.id) {
                category.layouters.push(algorithm.id.clone());
            }
        }
        self.algorithms.insert(algorithm.id.clone(), algorithm);
    }

    /// Registers a category. Algorithms already registered under its id stay
    /// listed as its layouters.
    pub fn register_category(&mut self, mut category: LayoutCategoryData) {
        if let Some(existing) = self.categories.remove(&category.id) {
            for layouter in existing.layouters {
                if !category.layouters.contains(&layouter) {
                    category.layouters.push(layouter);
                }
            }
        }
        self.categories.insert(category.id.clone(), category);
    }

    pub fn algorithm_data(&self, id: &str) -> Option<&LayoutAlgorithmData> {
        self.algorithms.get(id)
    }

    pub fn category_data(&self, id: &str) -> Option<&LayoutCategoryData> {
        self.categories.get(id)
    }

    pub fn option_count(&self) -> usize {
        self.options.len()
    }
}

impl LayoutMetaDataProvider for LayoutMetaDataService {
    fn option_data(&self, id: &str) -> Option<&LayoutOptionData> {
        self.options.get(id)
    }

    fn option_data_by_suffix(&self, suffix: &str) -> Option<&LayoutOptionData> {
        if suffix.is_empty() {
            return None;
        }
        if let Some(option) = self.options.get(suffix) {
            return Some(option);
        }
        if let Some(id) = self.legacy_ids.get(suffix) {
            return self.options.get(id);
        }

        let mut found: Option<&LayoutOptionData> = None;
        for option in self.options.values() {
            if is_dotted_suffix(&option.id, suffix) {
                if found.is_some() {
                    debug!("Option suffix {suffix} is ambiguous");
                    return None;
                }
                found = Some(option);
            }
        }
        found
    }

    fn options(&self) -> Vec<&LayoutOptionData> {
        self.options.values().collect()
    }

    fn algorithms(&self) -> Vec<&LayoutAlgorithmData> {
        self.algorithms.values().collect()
    }

    fn categories(&self) -> Vec<&LayoutCategoryData> {
        self.categories.values().collect()
    }
}

/// `suffix` is the tail of `id` starting right after a `.`.
fn is_dotted_suffix(id: &str, suffix: &str) -> bool {
    id.len() > suffix.len()
        && id.ends_with(suffix)
        && id.as_bytes()[id.len() - suffix.len() - 1] == b'.'
}

fn literals(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn register_core(service: &mut LayoutMetaDataService) {
    use Target::*;

    let spacing = |id: &str, name: &str, default: f64| {
        LayoutOptionData::new(id, OptionType::Double)
            .with_group("spacing")
            .with_name(name)
            .with_targets(&[Parents])
            .with_default(default)
    };

    let options = vec![
        LayoutOptionData::new(ALGORITHM, OptionType::String)
            .with_name("Layout Algorithm")
            .with_description("Select a specific layout algorithm.")
            .with_targets(&[Parents]),
        LayoutOptionData::new(
            DIRECTION,
            OptionType::Enum(literals(&["UNDEFINED", "RIGHT", "LEFT", "DOWN", "UP"])),
        )
        .with_name("Direction")
        .with_description("Overall direction of edges.")
        .with_targets(&[Parents])
        .with_default(Value::Enum("UNDEFINED".into())),
        spacing(SPACING_NODE_NODE, "Node Spacing", 20.0),
        spacing(SPACING_EDGE_EDGE, "Edge Spacing", 10.0),
        spacing(SPACING_EDGE_NODE, "Edge Node Spacing", 10.0),
        spacing(SPACING_PORT_PORT, "Port Spacing", 10.0),
        spacing(SPACING_LABEL_LABEL, "Label Spacing", 0.0),
        LayoutOptionData::new(
            SPACING_INDIVIDUAL,
            OptionType::Object(ObjectKind::IndividualSpacings),
        )
        .with_group("spacing")
        .with_name("Individual Spacing")
        .with_targets(&[Nodes, Edges, Ports, Labels]),
        LayoutOptionData::new(PADDING, OptionType::Object(ObjectKind::Padding))
            .with_name("Padding")
            .with_targets(&[Parents, Nodes])
            .with_default(ElkPadding::uniform(12.0)),
        LayoutOptionData::new(
            EDGE_ROUTING,
            OptionType::Enum(literals(&["UNDEFINED", "POLYLINE", "ORTHOGONAL", "SPLINES"])),
        )
        .with_name("Edge Routing")
        .with_targets(&[Parents]),
        LayoutOptionData::new(JUNCTION_POINTS, OptionType::Object(ObjectKind::VectorChain))
            .with_name("Junction Points")
            .with_targets(&[Edges]),
        LayoutOptionData::new(POSITION, OptionType::Object(ObjectKind::Vector))
            .with_name("Position")
            .with_targets(&[Nodes, Ports, Labels]),
        LayoutOptionData::new(
            PORT_CONSTRAINTS,
            OptionType::Enum(literals(&[
                "UNDEFINED",
                "FREE",
                "FIXED_SIDE",
                "FIXED_ORDER",
                "FIXED_RATIO",
                "FIXED_POS",
            ])),
        )
        .with_name("Port Constraints")
        .with_targets(&[Nodes]),
        LayoutOptionData::new(
            NODE_SIZE_CONSTRAINTS,
            OptionType::EnumSet(literals(&["PORTS", "PORT_LABELS", "NODE_LABELS", "MINIMUM_SIZE"])),
        )
        .with_group("nodeSize")
        .with_name("Node Size Constraints")
        .with_targets(&[Nodes])
        .with_legacy_id("org.eclipse.elk.sizeConstraint"),
        LayoutOptionData::new(ASPECT_RATIO, OptionType::Double)
            .with_name("Aspect Ratio")
            .with_targets(&[Parents]),
        LayoutOptionData::new(
            HIERARCHY_HANDLING,
            OptionType::Enum(literals(&["INHERIT", "INCLUDE_CHILDREN", "SEPARATE_CHILDREN"])),
        )
        .with_name("Hierarchy Handling")
        .with_targets(&[Parents, Nodes]),
        LayoutOptionData::new(PRIORITY, OptionType::Int)
            .with_name("Priority")
            .with_targets(&[Nodes, Edges]),
        LayoutOptionData::new(RANDOM_SEED, OptionType::Int)
            .with_name("Randomization Seed")
            .with_targets(&[Parents]),
        LayoutOptionData::new(LAYERED_SPACING_BETWEEN_LAYERS, OptionType::Double)
            .with_group("spacing")
            .with_name("Node Spacing Between Layers")
            .with_targets(&[Parents])
            .with_default(20.0),
        LayoutOptionData::new(
            LAYERED_CROSSING_MINIMIZATION_STRATEGY,
            OptionType::Enum(literals(&["LAYER_SWEEP", "INTERACTIVE", "NONE"])),
        )
        .with_group("crossingMinimization")
        .with_name("Crossing Minimization Strategy")
        .with_targets(&[Parents]),
    ];
    for option in options {
        service.register_option(option);
    }

    let mut layered = LayoutCategoryData::new("org.eclipse.elk.layered");
    layered.name = Some("Layered".to_string());
    layered.description = Some("Layer based algorithms for directed graphs.".to_string());
    service.register_category(layered);

    service.register_algorithm(LayoutAlgorithmData {
        id: "org.eclipse.elk.layered".to_string(),
        name: Some("ELK Layered".to_string()),
        description: Some("Layer based layout of directed graphs.".to_string()),
        category_id: Some("org.eclipse.elk.layered".to_string()),
        known_option_ids: literals(&[
            DIRECTION,
            SPACING_NODE_NODE,
            SPACING_EDGE_EDGE,
            EDGE_ROUTING,
            PORT_CONSTRAINTS,
            LAYERED_SPACING_BETWEEN_LAYERS,
            LAYERED_CROSSING_MINIMIZATION_STRATEGY,
        ]),
        supported_features: vec![
            GraphFeature::SelfLoops,
            GraphFeature::InsideSelfLoops,
            GraphFeature::MultiEdges,
            GraphFeature::EdgeLabels,
            GraphFeature::Ports,
            GraphFeature::Compound,
            GraphFeature::Clusters,
        ],
    });
    service.register_algorithm(LayoutAlgorithmData {
        id: "org.eclipse.elk.fixed".to_string(),
        name: Some("ELK Fixed".to_string()),
        description: Some("Keeps the current layout as it is.".to_string()),
        category_id: None,
        known_option_ids: literals(&[POSITION, JUNCTION_POINTS, PADDING]),
        supported_features: Vec::new(),
    });

    debug!(
        "Core layout metadata registered: {} options, {} algorithms",
        service.options.len(),
        service.algorithms.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_and_suffix_lookup() {
        let service = LayoutMetaDataService::core();
        assert_eq!(
            service.option_data_by_suffix(DIRECTION).map(|o| o.id.as_str()),
            Some(DIRECTION)
        );
        assert_eq!(
            service.option_data_by_suffix("direction").map(|o| o.id.as_str()),
            Some(DIRECTION)
        );
        assert_eq!(
            service.option_data_by_suffix("elk.direction").map(|o| o.id.as_str()),
            Some(DIRECTION)
        );
        // only dotted boundaries count
        assert!(service.option_data_by_suffix("irection").is_none());
        assert!(service.option_data_by_suffix("").is_none());
    }

    #[test]
    fn test_ambiguous_suffix() {
        let mut service = LayoutMetaDataService::new();
        service.register_option(LayoutOptionData::new("a.b.c.optionName", OptionType::Int));
        service.register_option(LayoutOptionData::new("a.b.d.optionName", OptionType::Int));
        assert!(service.option_data_by_suffix("optionName").is_none());
        assert_eq!(
            service.option_data_by_suffix("c.optionName").map(|o| o.id.as_str()),
            Some("a.b.c.optionName")
        );
    }

    #[test]
    fn test_legacy_lookup() {
        let service = LayoutMetaDataService::core();
        assert_eq!(
            service
                .option_data_by_suffix("org.eclipse.elk.sizeConstraint")
                .map(|o| o.id.as_str()),
            Some(NODE_SIZE_CONSTRAINTS)
        );
        assert!(service.option_data("org.eclipse.elk.sizeConstraint").is_none());
    }

    #[test]
    fn test_spacing_suffixes() {
        let service = LayoutMetaDataService::core();
        assert_eq!(
            service.option_data_by_suffix("spacing.nodeNode").map(|o| o.id.as_str()),
            Some(SPACING_NODE_NODE)
        );
        assert_eq!(
            service
                .option_data_by_suffix("spacing.nodeNodeBetweenLayers")
                .map(|o| o.id.as_str()),
            Some(LAYERED_SPACING_BETWEEN_LAYERS)
        );
    }

    #[test]
    fn test_categories_track_algorithms() {
        let mut service = LayoutMetaDataService::new();
        let mut algorithm = LayoutAlgorithmData::new("my.tree");
        algorithm.category_id = Some("my.trees".to_string());
        service.register_algorithm(algorithm);
        let mut category = LayoutCategoryData::new("my.trees");
        category.name = Some("Trees".to_string());
        service.register_category(category);

        let category = service.category_data("my.trees").unwrap();
        assert_eq!(category.name.as_deref(), Some("Trees"));
        assert_eq!(category.layouters, vec!["my.tree".to_string()]);
        assert_eq!(service.algorithms().len(), 1);
    }

    #[test]
    fn test_core_is_shared() {
        let a = LayoutMetaDataService::core() as *const _;
        let b = LayoutMetaDataService::core() as *const _;
        assert_eq!(a, b);
        assert!(LayoutMetaDataService::core().option_count() >= 19);
    }
}
