use std::error::Error;
use std::fmt::{Display, Formatter};

/// Common error type of the graph interchange crates.
///
/// Every structural or format problem found while importing, exporting or
/// transferring a graph ends up as one of these, with a human readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElkError {
    message: String,
    cause: Option<String>,
}

impl Display for ElkError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{}\n   cause: {}", self.message, cause),
            None => write!(f, "{}", self.message),
        }
    }
}

impl Error for ElkError {}

impl From<&str> for ElkError {
    fn from(s: &str) -> ElkError {
        ElkError {
            message: s.to_string(),
            cause: None,
        }
    }
}

impl From<String> for ElkError {
    fn from(s: String) -> ElkError {
        ElkError {
            message: s,
            cause: None,
        }
    }
}

impl ElkError {
    pub fn new_with_cause(message: &str, cause: impl Error) -> ElkError {
        ElkError {
            message: message.to_string(),
            cause: Some(cause.to_string()),
        }
    }

    pub fn add_cause(mut self, cause: &str) -> ElkError {
        self.cause = Some(cause.into());
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> Option<&str> {
        self.cause.as_deref()
    }
}

// Generic Result type for the graph interchange crates.
pub type ElkResult<T> = Result<T, ElkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_without_cause() {
        let err = ElkError::from("Every element must have an id.");
        assert_eq!(err.to_string(), "Every element must have an id.");
        assert!(err.cause().is_none());
    }

    #[test]
    fn test_display_with_cause() {
        let err = ElkError::from(format!("Bad option '{}'", "elk.direction")).add_cause("unknown");
        assert_eq!(err.message(), "Bad option 'elk.direction'");
        assert_eq!(err.to_string(), "Bad option 'elk.direction'\n   cause: unknown");
    }

    #[test]
    fn test_new_with_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::InvalidData, "truncated");
        let err = ElkError::new_with_cause("Could not read options", io);
        assert_eq!(err.cause(), Some("truncated"));
    }
}
