//! Hydration failure record with dotted-path accumulation.
//!
//! A [`HydrationError`] is created at the point of first failure and
//! annotated with a path segment by each enclosing recursive frame as it
//! unwinds, so the outermost caller sees the full dotted path of the field
//! that failed (e.g. `user.addresses.[2].zip`).

use std::fmt;

use thiserror::Error;

/// Underlying reason a value failed to hydrate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureCause {
    /// Runtime type of the input does not match the schema expectation.
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        /// Type the schema expected (e.g. `"number"`, `"object"`).
        expected: &'static str,
        /// Type tag of the value actually encountered.
        found: &'static str,
    },
    /// The `never` schema, which no value can satisfy.
    #[error("no value can satisfy a 'never' schema")]
    Never,
}

/// Failure surfaced by the hydration engine.
///
/// Carries an accumulated dotted path (built innermost-out) and an optional
/// wrapped [`FailureCause`]. Optional schema nodes absorb failures before a
/// record is ever constructed for their subtree, so this is only ever seen
/// for required properties.
///
/// # Examples
///
/// ```
/// use hydrator_core::{Schema, Value, hydrate_root};
///
/// let schema = Schema::object([("x", Schema::number())]);
/// let input = Value::object([("unrelated", Value::from(true))]);
/// let err = hydrate_root(&input, &schema).unwrap_err();
/// assert_eq!(err.path(), Some("x"));
/// assert_eq!(
///     err.to_string(),
///     "Failed to parse required property at path 'x': expected number, found undefined",
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HydrationError {
    path: Option<String>,
    cause: Option<FailureCause>,
}

impl HydrationError {
    /// Creates a record for a failure with a known cause and no path yet.
    pub fn new(cause: FailureCause) -> Self {
        Self {
            path: None,
            cause: Some(cause),
        }
    }

    /// Creates a record with neither path nor cause.
    pub fn bare() -> Self {
        Self {
            path: None,
            cause: None,
        }
    }

    /// Shorthand for a [`FailureCause::TypeMismatch`] record.
    pub fn mismatch(expected: &'static str, found: &'static str) -> Self {
        Self::new(FailureCause::TypeMismatch { expected, found })
    }

    /// Dotted path to the failing field, if any frame recorded one.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// The innermost cause, if one was recorded.
    pub fn cause(&self) -> Option<&FailureCause> {
        self.cause.as_ref()
    }

    /// Prepends `segment` to the accumulated path, dot-joined.
    ///
    /// Called by each enclosing frame as the failure unwinds.
    pub(crate) fn prefix_path(mut self, segment: &str) -> Self {
        self.path = Some(match self.path.take() {
            Some(inner) => format!("{segment}.{inner}"),
            None => segment.to_string(),
        });
        self
    }
}

impl fmt::Display for HydrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to parse required property")?;
        if let Some(path) = &self.path {
            write!(f, " at path '{path}'")?;
        }
        if let Some(cause) = &self.cause {
            write!(f, ": {cause}")?;
        }
        Ok(())
    }
}

impl std::error::Error for HydrationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause.as_ref().map(|c| c as &(dyn std::error::Error + 'static))
    }
}

/// Convenience alias for results with [`HydrationError`].
pub type HydrationResult<T> = std::result::Result<T, HydrationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_without_path_or_cause() {
        let err = HydrationError::bare();
        assert_eq!(err.to_string(), "Failed to parse required property");
    }

    #[test]
    fn test_message_with_path_only() {
        let err = HydrationError::bare().prefix_path("x");
        assert_eq!(
            err.to_string(),
            "Failed to parse required property at path 'x'"
        );
    }

    #[test]
    fn test_path_accumulates_innermost_out() {
        let err = HydrationError::mismatch("number", "string")
            .prefix_path("b")
            .prefix_path("[0]")
            .prefix_path("a");
        assert_eq!(err.path(), Some("a.[0].b"));
        assert_eq!(
            err.to_string(),
            "Failed to parse required property at path 'a.[0].b': expected number, found string"
        );
    }
}
