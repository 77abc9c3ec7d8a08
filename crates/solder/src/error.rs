//! Error types for stub generation.
//!
//! Classification failures never abort a pass.  Each one is recorded in an
//! [`ErrorList`] and generation continues with the remaining entities, so a
//! caller always sees the complete set of problems at once.

use std::fmt;

use thiserror::Error;

/// A host type with no mapping onto the extension ABI.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ClassifyError(pub String);

/// A single generation error, tagged with the entity it was found on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenError {
    /// A function or method parameter could not be classified.
    #[error("function {func}: parameter `{name}`: {source}")]
    Param {
        func: String,
        name: String,
        source: ClassifyError,
    },

    /// A function or method result could not be classified.
    #[error("function {func}: result {index}: {source}")]
    Result {
        func: String,
        index: usize,
        source: ClassifyError,
    },

    /// A struct field could not be classified.
    #[error("struct {strct}: field `{name}`: {source}")]
    Field {
        strct: String,
        name: String,
        source: ClassifyError,
    },
}

/// Ordered collection of errors accumulated over one generation pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ErrorList(Vec<GenError>);

impl ErrorList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error.
    pub fn push(&mut self, err: GenError) {
        self.0.push(err);
    }

    /// Whether the pass completed without errors.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of recorded errors.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over the recorded errors in the order they occurred.
    pub fn iter(&self) -> impl Iterator<Item = &GenError> {
        self.0.iter()
    }

    /// Consume the list.
    pub fn into_vec(self) -> Vec<GenError> {
        self.0
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} generation error(s):", self.0.len())?;
        for err in &self.0 {
            writeln!(f, "  {err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorList {}

impl IntoIterator for ErrorList {
    type Item = GenError;
    type IntoIter = std::vec::IntoIter<GenError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_list_display() {
        let mut errs = ErrorList::new();
        assert!(errs.is_empty());

        errs.push(GenError::Param {
            func: "Add".to_string(),
            name: "cb".to_string(),
            source: ClassifyError("function type `func()` cannot cross the extension ABI".into()),
        });

        assert_eq!(errs.len(), 1);
        let text = errs.to_string();
        assert!(text.contains("1 generation error(s)"));
        assert!(text.contains("parameter `cb`"));
    }
}
