//! Context error handling with error trails
//!
//! Failures from the effectful shell (fetching the country dataset, posting a
//! request) are wrapped in [`ContextError`], which records what the form was
//! doing when the error surfaced. The trail goes from inner to outer.
//!
//! # Examples
//!
//! ```
//! use financing_form::{ContextError, FormError};
//!
//! let err = ContextError::new(FormError::Status(502))
//!     .context("fetching country dataset")
//!     .context("loading reference data");
//!
//! assert_eq!(err.inner(), &FormError::Status(502));
//! assert_eq!(err.context_trail().len(), 2);
//! ```

use std::error::Error as StdError;
use std::fmt;

/// An error wrapper that accumulates context as it propagates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextError<E> {
    error: E,
    context: Vec<String>,
}

impl<E> ContextError<E> {
    /// Wrap an error with an empty context trail.
    pub fn new(error: E) -> Self {
        ContextError {
            error,
            context: Vec::new(),
        }
    }

    /// Append a context layer.
    pub fn context(mut self, msg: impl Into<String>) -> Self {
        self.context.push(msg.into());
        self
    }

    /// The underlying error.
    pub fn inner(&self) -> &E {
        &self.error
    }

    /// Consume and return the underlying error, discarding the trail.
    pub fn into_inner(self) -> E {
        self.error
    }

    /// All context messages in the order they were added.
    pub fn context_trail(&self) -> &[String] {
        &self.context
    }
}

impl<E: fmt::Display> fmt::Display for ContextError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: {}", self.error)?;
        for ctx in &self.context {
            write!(f, "\n  -> {}", ctx)?;
        }
        Ok(())
    }
}

impl<E: StdError + 'static> StdError for ContextError<E> {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.error)
    }
}

/// Attach context to the error side of a `Result`.
pub trait ResultContext<T, E> {
    /// Wrap the error in a [`ContextError`] with `msg` as its next layer.
    fn context(self, msg: impl Into<String>) -> Result<T, ContextError<E>>;
}

impl<T, E> ResultContext<T, E> for Result<T, E> {
    fn context(self, msg: impl Into<String>) -> Result<T, ContextError<E>> {
        self.map_err(|err| ContextError::new(err).context(msg))
    }
}
