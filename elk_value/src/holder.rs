use crate::Value;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// The set of layout properties attached to a graph element.
/// Keys are fully qualified option ids, e.g. `org.eclipse.elk.direction`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyHolder(pub BTreeMap<String, Value>);

impl Display for PropertyHolder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        write!(f, "{{")?;
        for (key, value) in self.0.iter() {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{key}={value}")?;
            first = false;
        }
        write!(f, "}}")
    }
}

// forward map interface
impl PropertyHolder {
    pub fn new() -> Self {
        PropertyHolder(BTreeMap::new())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    pub fn set<T: Into<Value>>(&mut self, key: &str, value: T) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn has(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Runs `f` on the nested holder stored under `key`, creating it if absent.
    /// A non-holder value stored under that key is replaced.
    pub fn update_nested<R>(&mut self, key: &str, f: impl FnOnce(&mut PropertyHolder) -> R) -> R {
        let mut nested = match self.0.remove(key) {
            Some(Value::Properties(holder)) => holder,
            _ => PropertyHolder::new(),
        };
        let result = f(&mut nested);
        self.0.insert(key.to_string(), Value::Properties(nested));
        result
    }

    pub fn nested(&self, key: &str) -> Option<&PropertyHolder> {
        match self.0.get(key) {
            Some(Value::Properties(holder)) => Some(holder),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_map() {
        let mut holder = PropertyHolder::new();
        holder.set("org.eclipse.elk.spacing.nodeNode", 20.0);
        holder.set("org.eclipse.elk.priority", 3);
        assert!(holder.has("org.eclipse.elk.priority"));
        assert_eq!(
            holder.get("org.eclipse.elk.spacing.nodeNode").and_then(Value::as_f64),
            Some(20.0)
        );
        assert_eq!(holder.remove("org.eclipse.elk.priority"), Some(Value::Int(3)));
        assert_eq!(holder.len(), 1);
    }

    #[test]
    fn test_nested_holder() {
        let mut holder = PropertyHolder::new();
        holder.set("org.eclipse.elk.spacing.individual", true);
        holder.update_nested("org.eclipse.elk.spacing.individual", |nested| {
            nested.set("org.eclipse.elk.spacing.nodeNode", 5.0)
        });
        let count = holder.update_nested("org.eclipse.elk.spacing.individual", |nested| nested.len());
        assert_eq!(count, 1);
        let nested = holder.nested("org.eclipse.elk.spacing.individual").unwrap();
        assert_eq!(nested.len(), 1);
        assert_eq!(holder.to_string(), "{org.eclipse.elk.spacing.individual={org.eclipse.elk.spacing.nodeNode=5.0}}");
    }
}
