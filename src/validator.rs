//! Business rules for a financing request
//!
//! The validator is a pure function of a draft and "today". Each rule
//! produces its own [`FieldErrors`]; the results are folded together with
//! [`Validation::also`], so a later rule replaces an earlier rule's message for
//! the same field. Rule order is: required fields, project code format, OPEC
//! currency, dates, description length.
//!
//! # Examples
//!
//! ```
//! use chrono::NaiveDate;
//! use financing_form::clock::FixedClock;
//! use financing_form::{Field, SubmissionDraft, Validator};
//!
//! let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
//! let validator = Validator::new(FixedClock::new(today));
//!
//! let errors = validator.validate(&SubmissionDraft::new());
//! assert_eq!(errors.get(Field::Name), Some("Name is required"));
//! assert_eq!(errors.len(), 8);
//! ```

use std::sync::LazyLock;

use chrono::{DateTime, Days, Months, NaiveDate};
use regex::Regex;

use crate::clock::{Clock, SystemClock};
use crate::{opec, Field, FieldErrors, FormConfig, SubmissionDraft, ValidDraft, Validation};

/// Four uppercase letters, a hyphen, four digits from 1 to 9.
static PROJECT_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{4}-[1-9]{4}$").unwrap());

/// Message for a project code that is present but malformed.
pub const PROJECT_CODE_FORMAT_MESSAGE: &str =
    "Project code must be in format ABCD-1234 with no zeros";

/// Date rule parameters, copied out of a [`FormConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Limits {
    description: usize,
    lead_days: u32,
    min_term_years: u32,
    max_term_years: u32,
}

impl From<&FormConfig> for Limits {
    fn from(config: &FormConfig) -> Self {
        Self {
            description: config.description_limit(),
            lead_days: config.min_lead_days(),
            min_term_years: config.min_term_years(),
            max_term_years: config.max_term_years(),
        }
    }
}

/// Bounds the start and end date pickers should offer.
///
/// They mirror the date rules, so a picker restricted to these bounds can
/// only produce dates the validator accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateBounds {
    /// Earliest start date.
    pub min_start: NaiveDate,
    /// Earliest end date; `None` until the start date parses.
    pub min_end: Option<NaiveDate>,
    /// Latest end date; `None` until the start date parses.
    pub max_end: Option<NaiveDate>,
    /// The end picker stays disabled while the start date is blank.
    pub end_enabled: bool,
}

/// Checks drafts against the financing rules.
#[derive(Debug, Clone)]
pub struct Validator<C = SystemClock> {
    clock: C,
    limits: Limits,
}

impl Default for Validator<SystemClock> {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}

impl<C: Clock> Validator<C> {
    /// A validator with the default rule parameters.
    pub fn new(clock: C) -> Self {
        Self::with_config(clock, &FormConfig::default())
    }

    /// A validator using the rule parameters of `config`.
    pub fn with_config(clock: C, config: &FormConfig) -> Self {
        Self {
            clock,
            limits: Limits::from(config),
        }
    }

    /// Every failing field of `draft`. Empty means submittable.
    pub fn validate(&self, draft: &SubmissionDraft) -> FieldErrors {
        match self.run(draft) {
            Validation::Success(()) => FieldErrors::new(),
            Validation::Failure(errors) => errors,
        }
    }

    /// Validate and, on success, certify the draft for submission.
    pub fn check(&self, draft: &SubmissionDraft) -> Validation<ValidDraft, FieldErrors> {
        self.run(draft).map(|()| ValidDraft::new(draft.clone()))
    }

    /// Picker bounds for the current draft.
    pub fn date_bounds(&self, draft: &SubmissionDraft) -> DateBounds {
        let start = parse_date(&draft.start_date);
        DateBounds {
            min_start: self.min_start(),
            min_end: start.and_then(|s| add_years(s, self.limits.min_term_years)),
            max_end: start.and_then(|s| add_years(s, self.limits.max_term_years)),
            end_enabled: !draft.is_blank(Field::StartDate),
        }
    }

    fn run(&self, draft: &SubmissionDraft) -> Validation<(), FieldErrors> {
        Validation::success(())
            .also(check_required(draft))
            .also(check_project_code(draft))
            .also(check_opec_currency(draft))
            .also(self.check_dates(draft))
            .also(self.check_description_length(draft))
    }

    fn min_start(&self) -> NaiveDate {
        let today = self.clock.today();
        today
            .checked_add_days(Days::new(u64::from(self.limits.lead_days)))
            .unwrap_or(NaiveDate::MAX)
    }

    fn check_dates(&self, draft: &SubmissionDraft) -> Validation<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        let start = parse_date(&draft.start_date);
        let end = parse_date(&draft.end_date);

        if start.is_none() && !draft.is_blank(Field::StartDate) {
            errors.insert(Field::StartDate, "Start date must be a valid date");
        }
        if end.is_none() && !draft.is_blank(Field::EndDate) {
            errors.insert(Field::EndDate, "End date must be a valid date");
        }

        if let Some(start) = start {
            if start < self.min_start() {
                errors.insert(
                    Field::StartDate,
                    format!(
                        "Start date must be at least {} days from today",
                        self.limits.lead_days
                    ),
                );
            } else if let Some(end) = end {
                let min_end = add_years(start, self.limits.min_term_years);
                let max_end = add_years(start, self.limits.max_term_years);
                let in_range = matches!(
                    (min_end, max_end),
                    (Some(lo), Some(hi)) if lo <= end && end <= hi
                );
                if !in_range {
                    errors.insert(
                        Field::EndDate,
                        format!(
                            "End date must be between {} and {} years from the start date",
                            self.limits.min_term_years, self.limits.max_term_years
                        ),
                    );
                }
            }
        }

        into_check(errors)
    }

    fn check_description_length(&self, draft: &SubmissionDraft) -> Validation<(), FieldErrors> {
        let limit = self.limits.description;
        if draft.description.chars().count() > limit {
            Validation::failure(FieldErrors::single(
                Field::Description,
                format!("Description must be at most {} characters", limit),
            ))
        } else {
            Validation::success(())
        }
    }
}

/// Parse a date input: `YYYY-MM-DD`, or an RFC 3339 timestamp whose
/// calendar date is used.
///
/// ```
/// use chrono::NaiveDate;
/// use financing_form::validator::parse_date;
///
/// let day = NaiveDate::from_ymd_opt(2027, 3, 1).unwrap();
/// assert_eq!(parse_date("2027-03-01"), Some(day));
/// assert_eq!(parse_date("2027-03-01T09:30:00Z"), Some(day));
/// assert_eq!(parse_date("03/01/2027"), None);
/// ```
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// Whether `code` is a well-formed project code.
pub fn is_valid_project_code(code: &str) -> bool {
    PROJECT_CODE_REGEX.is_match(code)
}

/// Same month and day, `years` later. Feb 29 falls back to Feb 28.
fn add_years(date: NaiveDate, years: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(years.checked_mul(12)?))
}

fn into_check(errors: FieldErrors) -> Validation<(), FieldErrors> {
    if errors.is_empty() {
        Validation::success(())
    } else {
        Validation::failure(errors)
    }
}

fn check_required(draft: &SubmissionDraft) -> Validation<(), FieldErrors> {
    let errors = Field::ALL
        .into_iter()
        .filter(|field| *field != Field::ProjectCode && draft.is_blank(*field))
        .map(|field| (field, field.required_message()))
        .collect();
    into_check(errors)
}

fn check_project_code(draft: &SubmissionDraft) -> Validation<(), FieldErrors> {
    if draft.is_blank(Field::ProjectCode) {
        return Validation::failure(FieldErrors::single(
            Field::ProjectCode,
            Field::ProjectCode.required_message(),
        ));
    }
    if is_valid_project_code(&draft.project_code) {
        Validation::success(())
    } else {
        Validation::failure(FieldErrors::single(
            Field::ProjectCode,
            PROJECT_CODE_FORMAT_MESSAGE,
        ))
    }
}

fn check_opec_currency(draft: &SubmissionDraft) -> Validation<(), FieldErrors> {
    if draft.is_blank(Field::Country) || draft.is_blank(Field::Currency) {
        return Validation::success(());
    }
    if opec::is_member(&draft.country) && !opec::is_us_dollar(&draft.currency) {
        return Validation::failure(FieldErrors::single(
            Field::Currency,
            format!("Currency must be USD for {} (OPEC member)", draft.country),
        ));
    }
    Validation::success(())
}
