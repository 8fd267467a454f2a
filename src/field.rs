//! Draft field names and the per-field error set

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::Semigroup;

/// One of the eight inputs of a financing request.
///
/// The declaration order is the order the form renders its inputs, and the
/// order [`FieldErrors`] iterates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    /// Applicant name and surname.
    Name,
    /// Country of the applicant, chosen from the reference list.
    Country,
    /// Project code in `ABCD-1234` form.
    ProjectCode,
    /// Free-text project description.
    Description,
    /// First day of the financed period.
    StartDate,
    /// Last day of the financed period.
    EndDate,
    /// Requested amount, canonical digits without separators.
    Amount,
    /// Currency of the requested amount.
    Currency,
}

impl Field {
    /// Every field, in form order.
    pub const ALL: [Field; 8] = [
        Field::Name,
        Field::Country,
        Field::ProjectCode,
        Field::Description,
        Field::StartDate,
        Field::EndDate,
        Field::Amount,
        Field::Currency,
    ];

    /// Key used in the JSON payload sent to the submission endpoint.
    pub fn key(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Country => "country",
            Field::ProjectCode => "projectCode",
            Field::Description => "description",
            Field::StartDate => "startDate",
            Field::EndDate => "endDate",
            Field::Amount => "amount",
            Field::Currency => "currency",
        }
    }

    /// Human label, as used in the "is required" messages.
    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Country => "Country",
            Field::ProjectCode => "Project code",
            Field::Description => "Description",
            Field::StartDate => "Start Date",
            Field::EndDate => "End Date",
            Field::Amount => "Amount",
            Field::Currency => "Currency",
        }
    }

    /// Fixed message reported when the field is blank.
    pub fn required_message(self) -> String {
        format!("{} is required", self.label())
    }

    /// Look a field up by its payload key.
    pub fn from_key(key: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|field| field.key() == key)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

/// Mapping from failing fields to their error message.
///
/// A field that is absent is currently valid. The set is recomputed in full
/// by every validation pass; the session only ever removes single entries in
/// between (the optimistic clear on edit).
///
/// Combining two sets is right-biased: when both name the same field, the
/// message from `other` wins.
///
/// # Examples
///
/// ```
/// use financing_form::{Field, FieldErrors};
///
/// let mut errors = FieldErrors::new();
/// errors.insert(Field::Name, "Name is required");
/// assert_eq!(errors.get(Field::Name), Some("Name is required"));
///
/// errors.clear(Field::Name);
/// assert!(errors.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    /// An empty error set.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// An error set with exactly one entry.
    pub fn single(field: Field, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.insert(field, message);
        errors
    }

    /// Set (or replace) the message for `field`.
    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    /// Message for `field`, if it failed.
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// Whether `field` currently has an error.
    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    /// Drop the error for `field`. Returns the removed message.
    pub fn clear(&mut self, field: Field) -> Option<String> {
        self.0.remove(&field)
    }

    /// `true` when no field failed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failing fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Failing fields and their messages, in form order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    /// Failing fields, in form order.
    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.keys().copied()
    }
}

impl Semigroup for FieldErrors {
    fn combine(mut self, other: Self) -> Self {
        self.0.extend(other.0);
        self
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

impl FromIterator<(Field, String)> for FieldErrors {
    fn from_iter<I: IntoIterator<Item = (Field, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
