//! Error taxonomy of the form

use thiserror::Error;

use crate::{Field, FieldErrors};

/// Everything that can go wrong in a form session.
///
/// None of these are fatal: validation errors and rejected edits are fixed by
/// editing, transport failures by submitting again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    /// The draft failed one or more rules.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// An amount keystroke that is not digits only.
    #[error("amount input must contain digits only, got {0:?}")]
    InvalidAmountInput(String),

    /// The field is disabled for direct input.
    #[error("{0} is locked for editing")]
    FieldLocked(Field),

    /// A submission is already in flight.
    #[error("a submission is already in progress")]
    Busy,

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("server responded with status {0}")]
    Status(u16),

    /// The response body did not have the expected shape.
    #[error("malformed response: {0}")]
    Decode(String),
}

impl FormError {
    /// Field errors carried by a [`FormError::Validation`].
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            FormError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<FieldErrors> for FormError {
    fn from(errors: FieldErrors) -> Self {
        FormError::Validation(errors)
    }
}
