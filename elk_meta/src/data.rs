use elk_value::{ElkPadding, KVector, KVectorChain, Value};
use std::fmt::{Display, Formatter};

/// Kind of structured value held by an [`OptionType::Object`] option.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectKind {
    Vector,
    VectorChain,
    Padding,
    /// A nested set of options overriding spacings for one element.
    IndividualSpacings,
}

/// Value type of a layout option, drives parsing of textual values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OptionType {
    Boolean,
    Int,
    Double,
    String,
    /// One literal out of the given list.
    Enum(Vec<String>),
    /// Any subset of the given literals.
    EnumSet(Vec<String>),
    Object(ObjectKind),
}

impl Display for OptionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OptionType::Boolean => "BOOLEAN",
            OptionType::Int => "INT",
            OptionType::Double => "DOUBLE",
            OptionType::String => "STRING",
            OptionType::Enum(_) => "ENUM",
            OptionType::EnumSet(_) => "ENUMSET",
            OptionType::Object(_) => "OBJECT",
        };
        write!(f, "{name}")
    }
}

/// Kind of graph element an option applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    Parents,
    Nodes,
    Edges,
    Ports,
    Labels,
}

impl Display for Target {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Target::Parents => "PARENTS",
            Target::Nodes => "NODES",
            Target::Edges => "EDGES",
            Target::Ports => "PORTS",
            Target::Labels => "LABELS",
        };
        write!(f, "{name}")
    }
}

/// Structural graph feature a layout algorithm can handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraphFeature {
    SelfLoops,
    InsideSelfLoops,
    MultiEdges,
    EdgeLabels,
    Ports,
    Compound,
    Clusters,
    Disconnected,
}

impl Display for GraphFeature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GraphFeature::SelfLoops => "SELF_LOOPS",
            GraphFeature::InsideSelfLoops => "INSIDE_SELF_LOOPS",
            GraphFeature::MultiEdges => "MULTI_EDGES",
            GraphFeature::EdgeLabels => "EDGE_LABELS",
            GraphFeature::Ports => "PORTS",
            GraphFeature::Compound => "COMPOUND",
            GraphFeature::Clusters => "CLUSTERS",
            GraphFeature::Disconnected => "DISCONNECTED",
        };
        write!(f, "{name}")
    }
}

/// Description of one layout option.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutOptionData {
    pub id: String,
    pub group: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub option_type: OptionType,
    pub targets: Vec<Target>,
    /// Ids this option was known under in earlier versions.
    pub legacy_ids: Vec<String>,
    pub default: Option<Value>,
}

impl LayoutOptionData {
    pub fn new(id: &str, option_type: OptionType) -> Self {
        LayoutOptionData {
            id: id.to_string(),
            group: None,
            name: None,
            description: None,
            option_type,
            targets: Vec::new(),
            legacy_ids: Vec::new(),
            default: None,
        }
    }

    pub fn with_group(mut self, group: &str) -> Self {
        self.group = Some(group.to_string());
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_targets(mut self, targets: &[Target]) -> Self {
        self.targets = targets.to_vec();
        self
    }

    pub fn with_legacy_id(mut self, legacy_id: &str) -> Self {
        self.legacy_ids.push(legacy_id.to_string());
        self
    }

    pub fn with_default<T: Into<Value>>(mut self, default: T) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Parses the textual form of a value of this option.
    ///
    /// Returns `None` when the text is not a valid value. Booleans accept
    /// anything and read as `true` only for `true` (any case). Enum literals
    /// are matched ignoring case and stored in their declared spelling.
    /// Individual spacings have no flat textual form and never parse.
    pub fn parse_value(&self, text: &str) -> Option<Value> {
        let text = text.trim();
        match &self.option_type {
            OptionType::Boolean => Some(Value::Bool(text.eq_ignore_ascii_case("true"))),
            OptionType::Int => text.parse::<i32>().ok().map(Value::Int),
            OptionType::Double => text.parse::<f64>().ok().map(Value::Double),
            OptionType::String => Some(Value::String(text.to_string())),
            OptionType::Enum(literals) => enum_literal(literals, text).map(Value::Enum),
            OptionType::EnumSet(literals) => text
                .split(|c: char| c.is_whitespace() || matches!(c, '[' | ']' | ','))
                .filter(|token| !token.is_empty())
                .map(|token| enum_literal(literals, token))
                .collect::<Option<Vec<String>>>()
                .map(Value::EnumSet),
            OptionType::Object(ObjectKind::Vector) => KVector::parse(text).map(Value::Vector),
            OptionType::Object(ObjectKind::VectorChain) => {
                KVectorChain::parse(text).map(Value::VectorChain)
            }
            OptionType::Object(ObjectKind::Padding) => ElkPadding::parse(text).map(Value::Padding),
            OptionType::Object(ObjectKind::IndividualSpacings) => None,
        }
    }
}

fn enum_literal(literals: &[String], text: &str) -> Option<String> {
    literals
        .iter()
        .find(|literal| literal.eq_ignore_ascii_case(text))
        .cloned()
}

/// Description of one layout algorithm.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayoutAlgorithmData {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<String>,
    pub known_option_ids: Vec<String>,
    pub supported_features: Vec<GraphFeature>,
}

impl LayoutAlgorithmData {
    pub fn new(id: &str) -> Self {
        LayoutAlgorithmData {
            id: id.to_string(),
            ..Default::default()
        }
    }
}

/// A group of related layout algorithms.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayoutCategoryData {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    /// Ids of the algorithms registered under this category.
    pub layouters: Vec<String>,
}

impl LayoutCategoryData {
    pub fn new(id: &str) -> Self {
        LayoutCategoryData {
            id: id.to_string(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literals(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_parse_primitives() {
        let int = LayoutOptionData::new("x.priority", OptionType::Int);
        assert_eq!(int.parse_value("12"), Some(Value::Int(12)));
        assert_eq!(int.parse_value("12.5"), None);

        let double = LayoutOptionData::new("x.spacing", OptionType::Double);
        assert_eq!(double.parse_value("20"), Some(Value::Double(20.0)));
        assert_eq!(double.parse_value("wide"), None);

        let boolean = LayoutOptionData::new("x.flag", OptionType::Boolean);
        assert_eq!(boolean.parse_value("TRUE"), Some(Value::Bool(true)));
        assert_eq!(boolean.parse_value("yes"), Some(Value::Bool(false)));
    }

    #[test]
    fn test_parse_enums() {
        let direction = LayoutOptionData::new(
            "x.direction",
            OptionType::Enum(literals(&["RIGHT", "DOWN"])),
        );
        assert_eq!(direction.parse_value("down"), Some(Value::Enum("DOWN".into())));
        assert_eq!(direction.parse_value("sideways"), None);

        let constraints = LayoutOptionData::new(
            "x.constraints",
            OptionType::EnumSet(literals(&["PORTS", "MINIMUM_SIZE"])),
        );
        assert_eq!(
            constraints.parse_value("[MINIMUM_SIZE, ports]"),
            Some(Value::EnumSet(literals(&["MINIMUM_SIZE", "PORTS"])))
        );
        assert_eq!(constraints.parse_value("[]"), Some(Value::EnumSet(vec![])));
        assert_eq!(constraints.parse_value("PORTS NOPE"), None);
    }

    #[test]
    fn test_parse_objects() {
        let padding = LayoutOptionData::new("x.padding", OptionType::Object(ObjectKind::Padding));
        assert_eq!(
            padding.parse_value("[top=1.0,left=2.0,bottom=3.0,right=4.0]"),
            Some(Value::Padding(ElkPadding::new(1.0, 4.0, 3.0, 2.0)))
        );
        let chain = LayoutOptionData::new("x.jp", OptionType::Object(ObjectKind::VectorChain));
        assert_eq!(
            chain.parse_value("(1,2; 3,4)").map(|v| v.to_string()),
            Some("(1.0,2.0; 3.0,4.0)".to_string())
        );
        let spacings = LayoutOptionData::new(
            "x.individual",
            OptionType::Object(ObjectKind::IndividualSpacings),
        );
        assert_eq!(spacings.parse_value("anything"), None);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(OptionType::EnumSet(vec![]).to_string(), "ENUMSET");
        assert_eq!(Target::Parents.to_string(), "PARENTS");
        assert_eq!(GraphFeature::InsideSelfLoops.to_string(), "INSIDE_SELF_LOOPS");
    }
}
