//! The in-progress submission and its validated form

use serde::{Deserialize, Serialize};

use crate::Field;

/// The form's working state.
///
/// Every field is a plain string until validation runs. `amount` holds the
/// canonical digits only; the grouped projection lives in the session.
///
/// Serialises with the camelCase keys the submission endpoint expects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmissionDraft {
    /// Applicant name and surname.
    pub name: String,
    /// Country common name.
    pub country: String,
    /// Project code, `ABCD-1234`.
    pub project_code: String,
    /// Project description.
    pub description: String,
    /// Start date, `YYYY-MM-DD`.
    pub start_date: String,
    /// End date, `YYYY-MM-DD`.
    pub end_date: String,
    /// Requested amount without grouping separators.
    pub amount: String,
    /// Currency display string or code.
    pub currency: String,
}

impl SubmissionDraft {
    /// An all-empty draft.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of `field`.
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Country => &self.country,
            Field::ProjectCode => &self.project_code,
            Field::Description => &self.description,
            Field::StartDate => &self.start_date,
            Field::EndDate => &self.end_date,
            Field::Amount => &self.amount,
            Field::Currency => &self.currency,
        }
    }

    /// Overwrite `field` with `value`, bypassing any input rules.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::Name => &mut self.name,
            Field::Country => &mut self.country,
            Field::ProjectCode => &mut self.project_code,
            Field::Description => &mut self.description,
            Field::StartDate => &mut self.start_date,
            Field::EndDate => &mut self.end_date,
            Field::Amount => &mut self.amount,
            Field::Currency => &mut self.currency,
        };
        *slot = value.into();
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Whether `field` is empty or whitespace only.
    pub fn is_blank(&self, field: Field) -> bool {
        self.get(field).trim().is_empty()
    }

    /// The completeness predicate: every field holds non-blank text.
    pub fn is_complete(&self) -> bool {
        Field::ALL.iter().all(|field| !self.is_blank(*field))
    }

    /// Empty every field.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// A draft that passed every validation rule.
///
/// Only the validator can build one, so holding a `ValidDraft` is proof the
/// payload was checked before it reaches the submission endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidDraft(SubmissionDraft);

impl ValidDraft {
    pub(crate) fn new(draft: SubmissionDraft) -> Self {
        Self(draft)
    }

    /// The checked draft.
    pub fn draft(&self) -> &SubmissionDraft {
        &self.0
    }

    /// Give the draft back.
    pub fn into_inner(self) -> SubmissionDraft {
        self.0
    }
}

impl AsRef<SubmissionDraft> for ValidDraft {
    fn as_ref(&self) -> &SubmissionDraft {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_and_set_cover_every_field() {
        let mut draft = SubmissionDraft::new();
        for field in Field::ALL {
            draft.set(field, field.key());
        }
        for field in Field::ALL {
            assert_eq!(draft.get(field), field.key());
        }
        assert!(draft.is_complete());
    }

    #[test]
    fn test_whitespace_is_blank() {
        let draft = SubmissionDraft::new().with(Field::Name, "   ");
        assert!(draft.is_blank(Field::Name));
        assert!(!draft.is_complete());
    }

    #[test]
    fn test_reset_empties_everything() {
        let mut draft = SubmissionDraft::new()
            .with(Field::Name, "Ada Lovelace")
            .with(Field::Amount, "1000");
        draft.reset();
        assert_eq!(draft, SubmissionDraft::default());
    }

    #[test]
    fn test_serializes_with_camel_case_keys() {
        let draft = SubmissionDraft::new()
            .with(Field::ProjectCode, "ABCD-1234")
            .with(Field::StartDate, "2027-01-01");
        let json = serde_json::to_value(&draft).unwrap();

        assert_eq!(json["projectCode"], "ABCD-1234");
        assert_eq!(json["startDate"], "2027-01-01");
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys.len(), 8);
        for field in Field::ALL {
            assert!(keys.contains(&field.key()));
        }
    }

    #[test]
    fn test_valid_draft_serializes_as_plain_draft() {
        let draft = SubmissionDraft::new().with(Field::Name, "Ada");
        let valid = ValidDraft::new(draft.clone());
        assert_eq!(
            serde_json::to_value(&valid).unwrap(),
            serde_json::to_value(&draft).unwrap()
        );
    }
}
