use std::fmt::{Display, Formatter};
use std::ops::{Deref, DerefMut};

/// A two dimensional vector, used for points and bend points.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct KVector {
    pub x: f64,
    pub y: f64,
}

impl KVector {
    pub fn new(x: f64, y: f64) -> Self {
        KVector { x, y }
    }

    /// Parses the `(x,y)` form written by `Display`. Brackets are optional.
    pub fn parse(s: &str) -> Option<KVector> {
        let numbers = parse_numbers(s)?;
        match numbers.as_slice() {
            [x, y] => Some(KVector::new(*x, *y)),
            _ => None,
        }
    }
}

impl Display for KVector {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:?},{:?})", self.x, self.y)
    }
}

/// An ordered list of vectors, e.g. junction points of an edge.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KVectorChain(pub Vec<KVector>);

impl KVectorChain {
    pub fn new() -> Self {
        KVectorChain(Vec::new())
    }

    /// Parses the `(x1,y1; x2,y2)` form written by `Display`.
    /// Any separator of spaces, commas, semicolons and brackets is accepted;
    /// an odd count of numbers is rejected.
    pub fn parse(s: &str) -> Option<KVectorChain> {
        let numbers = parse_numbers(s)?;
        if numbers.len() % 2 != 0 {
            return None;
        }
        Some(KVectorChain(
            numbers
                .chunks(2)
                .map(|pair| KVector::new(pair[0], pair[1]))
                .collect(),
        ))
    }
}

impl Deref for KVectorChain {
    type Target = Vec<KVector>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for KVectorChain {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl FromIterator<KVector> for KVectorChain {
    fn from_iter<I: IntoIterator<Item = KVector>>(iter: I) -> Self {
        KVectorChain(iter.into_iter().collect())
    }
}

impl Display for KVectorChain {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{:?},{:?}", v.x, v.y)?;
        }
        write!(f, ")")
    }
}

/// Padding around the content of a node.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ElkPadding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl ElkPadding {
    pub fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        ElkPadding {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn uniform(value: f64) -> Self {
        ElkPadding::new(value, value, value, value)
    }

    /// Parses `[top=1,left=2,bottom=3,right=4]`. Keys may come in any order,
    /// may use `:` instead of `=`, and missing sides stay 0.
    pub fn parse(s: &str) -> Option<ElkPadding> {
        let body = s.trim().trim_start_matches(['[', '{']).trim_end_matches([']', '}']);
        let mut padding = ElkPadding::default();
        for entry in body.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (key, value) = entry.split_once(['=', ':'])?;
            let value: f64 = value.trim().parse().ok()?;
            match key.trim() {
                "top" => padding.top = value,
                "right" => padding.right = value,
                "bottom" => padding.bottom = value,
                "left" => padding.left = value,
                _ => return None,
            }
        }
        Some(padding)
    }
}

impl Display for ElkPadding {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[top={:?},left={:?},bottom={:?},right={:?}]",
            self.top, self.left, self.bottom, self.right
        )
    }
}

fn parse_numbers(s: &str) -> Option<Vec<f64>> {
    s.split(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | '(' | ')' | '[' | ']' | '{' | '}'))
        .filter(|token| !token.is_empty())
        .map(|token| token.parse::<f64>().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_display_parse() {
        let v = KVector::new(3.0, -4.5);
        assert_eq!(v.to_string(), "(3.0,-4.5)");
        assert_eq!(KVector::parse(&v.to_string()), Some(v));
        assert_eq!(KVector::parse("1 2"), Some(KVector::new(1.0, 2.0)));
        assert_eq!(KVector::parse("(1,2,3)"), None);
    }

    #[test]
    fn test_chain_display_parse() {
        let chain: KVectorChain = vec![KVector::new(1.0, 2.0), KVector::new(3.0, 4.0)]
            .into_iter()
            .collect();
        assert_eq!(chain.to_string(), "(1.0,2.0; 3.0,4.0)");
        assert_eq!(KVectorChain::parse(&chain.to_string()), Some(chain));
        assert_eq!(KVectorChain::parse("(1,2; 3)"), None);
        assert_eq!(KVectorChain::parse("()"), Some(KVectorChain::new()));
    }

    #[test]
    fn test_padding_display_parse() {
        let padding = ElkPadding::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(padding.to_string(), "[top=1.0,left=4.0,bottom=3.0,right=2.0]");
        assert_eq!(ElkPadding::parse(&padding.to_string()), Some(padding));
        assert_eq!(
            ElkPadding::parse("[left: 12]"),
            Some(ElkPadding::new(0.0, 0.0, 0.0, 12.0))
        );
        assert_eq!(ElkPadding::parse("[middle=3]"), None);
    }
}
