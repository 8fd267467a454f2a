//! Validation type for accumulating errors
//!
//! `Validation` is similar to `Result`, but combining two failures keeps both
//! error sets instead of stopping at the first. The validator uses it to turn
//! a draft into a [`ValidDraft`](crate::ValidDraft) while still reporting
//! every failing field at once.
//!
//! # Examples
//!
//! ```
//! use financing_form::{Field, FieldErrors, Validation};
//!
//! let name = Validation::<&str, FieldErrors>::success("Ada");
//! let amount = Validation::<&str, FieldErrors>::failure(
//!     FieldErrors::single(Field::Amount, "Amount is required"),
//! );
//! let currency = Validation::<&str, FieldErrors>::failure(
//!     FieldErrors::single(Field::Currency, "Currency is required"),
//! );
//!
//! let combined = name.and(amount).and(currency);
//! match combined {
//!     Validation::Failure(errors) => assert_eq!(errors.len(), 2),
//!     Validation::Success(_) => unreachable!(),
//! }
//! ```

use crate::Semigroup;

/// A validation that either succeeds with a value or fails with accumulated errors
///
/// # Type Parameters
///
/// * `T` - The type of the success value
/// * `E` - The type of the error value (must implement `Semigroup` for accumulation)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation<T, E> {
    /// Successful validation with a value
    Success(T),
    /// Failed validation with accumulated errors
    Failure(E),
}

impl<T, E> Validation<T, E> {
    /// Create a successful validation
    #[inline]
    pub fn success(value: T) -> Self {
        Validation::Success(value)
    }

    /// Create a failed validation
    #[inline]
    pub fn failure(error: E) -> Self {
        Validation::Failure(error)
    }

    /// Convert this validation to a Result
    ///
    /// # Examples
    ///
    /// ```
    /// use financing_form::Validation;
    ///
    /// let v = Validation::<_, String>::success(42);
    /// assert_eq!(v.into_result(), Ok(42));
    /// ```
    #[inline]
    pub fn into_result(self) -> Result<T, E> {
        match self {
            Validation::Success(value) => Ok(value),
            Validation::Failure(error) => Err(error),
        }
    }

    /// Transform the success value if present
    #[inline]
    pub fn map<U, F>(self, f: F) -> Validation<U, E>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Validation::Success(value) => Validation::Success(f(value)),
            Validation::Failure(error) => Validation::Failure(error),
        }
    }
}

impl<T, E: Semigroup> Validation<T, E> {
    /// Combine two validations, accumulating errors using the Semigroup instance
    ///
    /// If both validations are successful, returns a success with a tuple of both values.
    /// If either or both fail, accumulates the errors using `Semigroup::combine`.
    #[inline]
    pub fn and<U>(self, other: Validation<U, E>) -> Validation<(T, U), E> {
        match (self, other) {
            (Validation::Success(a), Validation::Success(b)) => Validation::Success((a, b)),
            (Validation::Failure(e1), Validation::Failure(e2)) => {
                Validation::Failure(e1.combine(e2))
            }
            (Validation::Failure(e), _) | (_, Validation::Failure(e)) => Validation::Failure(e),
        }
    }

    /// Keep this validation's value, but fold in the errors of a unit check.
    ///
    /// ```
    /// use financing_form::Validation;
    ///
    /// let v = Validation::<_, Vec<&str>>::success(1)
    ///     .also(Validation::failure(vec!["too small"]));
    /// assert_eq!(v, Validation::Failure(vec!["too small"]));
    /// ```
    #[inline]
    pub fn also(self, check: Validation<(), E>) -> Validation<T, E> {
        self.and(check).map(|(value, ())| value)
    }
}
