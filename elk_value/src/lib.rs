mod holder;
pub mod math;

pub use holder::PropertyHolder;
pub use math::{ElkPadding, KVector, KVectorChain};

use std::fmt::{Display, Formatter};

/// A typed layout property value.
///
/// The `Display` form of every variant is the textual form the option
/// parsers accept back, so values can travel through JSON as plain strings.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i32),
    Double(f64),
    String(String),

    /// A single enum literal, e.g. `RIGHT`.
    Enum(String),
    /// A set of enum literals, e.g. `[MINIMUM_SIZE, PORTS]`.
    EnumSet(Vec<String>),

    Vector(KVector),
    VectorChain(KVectorChain),
    Padding(ElkPadding),

    /// A nested holder, used for individual spacing overrides.
    Properties(PropertyHolder),
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v:?}"),
            Value::String(v) => write!(f, "{v}"),
            Value::Enum(v) => write!(f, "{v}"),
            Value::EnumSet(v) => {
                write!(f, "[")?;
                for (i, literal) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{literal}")?;
                }
                write!(f, "]")
            }
            Value::Vector(v) => write!(f, "{v}"),
            Value::VectorChain(v) => write!(f, "{v}"),
            Value::Padding(v) => write!(f, "{v}"),
            Value::Properties(v) => write!(f, "{v}"),
        }
    }
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric view of the value; integers widen to doubles.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) | Value::Enum(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&KVector> {
        match self {
            Value::Vector(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_vector_chain(&self) -> Option<&KVectorChain> {
        match self {
            Value::VectorChain(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_padding(&self) -> Option<&ElkPadding> {
        match self {
            Value::Padding(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_properties(&self) -> Option<&PropertyHolder> {
        match self {
            Value::Properties(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<KVector> for Value {
    fn from(v: KVector) -> Self {
        Value::Vector(v)
    }
}

impl From<KVectorChain> for Value {
    fn from(v: KVectorChain) -> Self {
        Value::VectorChain(v)
    }
}

impl From<ElkPadding> for Value {
    fn from(v: ElkPadding) -> Self {
        Value::Padding(v)
    }
}

impl From<PropertyHolder> for Value {
    fn from(v: PropertyHolder) -> Self {
        Value::Properties(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_forms() {
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Int(-3).to_string(), "-3");
        assert_eq!(Value::Double(20.0).to_string(), "20.0");
        assert_eq!(Value::Double(0.25).to_string(), "0.25");
        assert_eq!(Value::Enum("RIGHT".into()).to_string(), "RIGHT");
        assert_eq!(
            Value::EnumSet(vec!["MINIMUM_SIZE".into(), "PORTS".into()]).to_string(),
            "[MINIMUM_SIZE, PORTS]"
        );
        assert_eq!(Value::EnumSet(vec![]).to_string(), "[]");
        assert_eq!(Value::from(KVector::new(1.0, 2.0)).to_string(), "(1.0,2.0)");
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Value::Int(4).as_f64(), Some(4.0));
        assert_eq!(Value::Double(4.5).as_i32(), None);
        assert_eq!(Value::Enum("DOWN".into()).as_str(), Some("DOWN"));
        assert_eq!(Value::from("x").as_bool(), None);
        let padding = ElkPadding::uniform(12.0);
        assert_eq!(Value::from(padding).as_padding(), Some(&padding));
    }
}
