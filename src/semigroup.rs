//! Semigroup trait for merging rule results
//!
//! Every validation rule produces its own error set. The validator merges
//! them with [`Semigroup::combine`], so the merge order of the rules decides
//! which message a field ends up with.
//!
//! # Examples
//!
//! ```
//! use financing_form::{Field, FieldErrors, Semigroup};
//!
//! let required = FieldErrors::single(Field::ProjectCode, "Project code is required");
//! let format = FieldErrors::single(Field::Name, "Name is required");
//!
//! let merged = required.combine(format);
//! assert_eq!(merged.len(), 2);
//! ```

/// A type that supports an associative binary operation
///
/// # Laws
///
/// Implementations must satisfy the associativity law:
/// ```text
/// a.combine(b).combine(c) == a.combine(b.combine(c))
/// ```
///
/// `combine` takes `self` by value. Clone first if the original is still
/// needed.
pub trait Semigroup: Sized {
    /// Combine this value with another value associatively
    fn combine(self, other: Self) -> Self;
}

impl<T> Semigroup for Vec<T> {
    #[inline]
    fn combine(mut self, other: Self) -> Self {
        self.extend(other);
        self
    }
}

impl Semigroup for () {
    #[inline]
    fn combine(self, _other: Self) -> Self {}
}
