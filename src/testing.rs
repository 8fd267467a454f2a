//! Testing utilities for form sessions
//!
//! In-memory doubles for the two remote services, a fixed clock, assertion
//! macros for [`FieldErrors`](crate::FieldErrors) and, with the `proptest`
//! feature, strategies for generating drafts.
//!
//! # Examples
//!
//! ```rust
//! use financing_form::testing::MockEndpoint;
//! use financing_form::{assert_field_error, Field, FormSession, ReferenceData};
//!
//! let endpoint = MockEndpoint::accepting();
//! let mut session = FormSession::new(endpoint.clone(), ReferenceData::default());
//!
//! assert!(session.begin_submission().is_err());
//! assert_field_error!(session.errors(), Field::Name, "Name is required");
//! assert_eq!(endpoint.calls(), 0);
//! ```

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{self, BoxFuture, FutureExt};

use crate::{CountrySource, FormError, SubmissionDraft, SubmissionEndpoint, ValidDraft};

pub use crate::clock::FixedClock;

#[derive(Debug)]
struct EndpointState {
    scripted: VecDeque<Result<(), FormError>>,
    fallback: Result<(), FormError>,
    received: Vec<SubmissionDraft>,
}

/// Submission endpoint that records payloads and answers from a script.
///
/// Clones share state, so a test can keep one handle and give the other to
/// the session.
#[derive(Debug, Clone)]
pub struct MockEndpoint {
    state: Arc<Mutex<EndpointState>>,
}

impl MockEndpoint {
    /// Accepts every request.
    pub fn accepting() -> Self {
        Self::with_fallback(Ok(()))
    }

    /// Fails every request with `error`.
    pub fn failing(error: FormError) -> Self {
        Self::with_fallback(Err(error))
    }

    /// Answers with `responses` in order, then accepts everything.
    pub fn scripted(responses: impl IntoIterator<Item = Result<(), FormError>>) -> Self {
        let endpoint = Self::accepting();
        endpoint.lock().scripted.extend(responses);
        endpoint
    }

    fn with_fallback(fallback: Result<(), FormError>) -> Self {
        Self {
            state: Arc::new(Mutex::new(EndpointState {
                scripted: VecDeque::new(),
                fallback,
                received: Vec::new(),
            })),
        }
    }

    /// Number of requests received.
    pub fn calls(&self) -> usize {
        self.lock().received.len()
    }

    /// Every payload received, oldest first.
    pub fn received(&self) -> Vec<SubmissionDraft> {
        self.lock().received.clone()
    }

    fn lock(&self) -> MutexGuard<'_, EndpointState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SubmissionEndpoint for MockEndpoint {
    fn submit<'a>(&'a self, draft: &'a ValidDraft) -> BoxFuture<'a, Result<(), FormError>> {
        let result = {
            let mut state = self.lock();
            state.received.push(draft.draft().clone());
            match state.scripted.pop_front() {
                Some(result) => result,
                None => state.fallback.clone(),
            }
        };
        future::ready(result).boxed()
    }
}

/// Country source serving a fixed dataset, or a fixed error.
#[derive(Debug, Clone)]
pub struct StaticCountrySource {
    response: Result<Vec<serde_json::Value>, FormError>,
    calls: Arc<AtomicUsize>,
}

impl StaticCountrySource {
    /// Serve `records` on every fetch.
    pub fn new(records: Vec<serde_json::Value>) -> Self {
        Self {
            response: Ok(records),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Fail every fetch with `error`.
    pub fn failing(error: FormError) -> Self {
        Self {
            response: Err(error),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of fetches so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CountrySource for StaticCountrySource {
    fn fetch_countries(&self) -> BoxFuture<'_, Result<Vec<serde_json::Value>, FormError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        future::ready(self.response.clone()).boxed()
    }
}

/// Assert that an error set has an error on a field, optionally with an
/// exact message.
///
/// ```rust
/// use financing_form::{assert_field_error, Field, FieldErrors};
///
/// let errors = FieldErrors::single(Field::Amount, "Amount is required");
/// assert_field_error!(errors, Field::Amount);
/// assert_field_error!(errors, Field::Amount, "Amount is required");
/// ```
#[macro_export]
macro_rules! assert_field_error {
    ($errors:expr, $field:expr) => {{
        let errors: &$crate::FieldErrors = &$errors;
        let field: $crate::Field = $field;
        if !errors.contains(field) {
            panic!("Expected an error on {}, got: {:?}", field, errors);
        }
    }};
    ($errors:expr, $field:expr, $message:expr) => {{
        let errors: &$crate::FieldErrors = &$errors;
        let field: $crate::Field = $field;
        match errors.get(field) {
            Some(actual) => assert_eq!(actual, $message, "wrong message on {}", field),
            None => panic!("Expected an error on {}, got: {:?}", field, errors),
        }
    }};
}

/// Assert that an error set has no error on a field.
///
/// ```rust
/// use financing_form::{assert_no_field_error, Field, FieldErrors};
///
/// assert_no_field_error!(FieldErrors::new(), Field::Currency);
/// ```
#[macro_export]
macro_rules! assert_no_field_error {
    ($errors:expr, $field:expr) => {{
        let errors: &$crate::FieldErrors = &$errors;
        let field: $crate::Field = $field;
        if let Some(message) = errors.get(field) {
            panic!("Expected no error on {}, got {:?}", field, message);
        }
    }};
}

/// Proptest strategies for drafts.
#[cfg(feature = "proptest")]
pub mod strategies {
    use chrono::{Days, Months, NaiveDate};
    use proptest::prelude::*;

    use crate::SubmissionDraft;

    /// Non-OPEC countries with their everyday currency.
    const COUNTRIES: [(&str, &str); 5] = [
        ("Norway", "Norwegian krone (kr)"),
        ("Japan", "Japanese yen (¥)"),
        ("Brazil", "Brazilian real (R$)"),
        ("Kenya", "Kenyan shilling (Sh)"),
        ("Canada", "Canadian dollar ($)"),
    ];

    /// Well-formed project codes.
    pub fn project_code() -> impl Strategy<Value = String> {
        "[A-Z]{4}-[1-9]{4}"
    }

    /// Empty or whitespace-only input.
    pub fn blank() -> impl Strategy<Value = String> {
        "[ \t]{0,4}"
    }

    /// Drafts that pass every rule when validated on `today`.
    pub fn valid_draft(today: NaiveDate) -> impl Strategy<Value = SubmissionDraft> {
        (
            "[A-Z][a-z]{1,12} [A-Z][a-z]{1,12}",
            0..COUNTRIES.len(),
            project_code(),
            "[A-Za-z0-9][A-Za-z0-9 ]{0,149}",
            15u64..400,
            12u32..=36,
            "[1-9][0-9]{0,9}",
        )
            .prop_map(
                move |(name, country, code, description, lead, months, amount)| {
                    let (country, currency) = COUNTRIES[country];
                    let start = today + Days::new(lead);
                    let end = start + Months::new(months);
                    SubmissionDraft {
                        name,
                        country: country.to_string(),
                        project_code: code,
                        description,
                        start_date: start.to_string(),
                        end_date: end.to_string(),
                        amount,
                        currency: currency.to_string(),
                    }
                },
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Field, FieldErrors, Validator};
    use chrono::NaiveDate;

    fn valid() -> ValidDraft {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let draft = SubmissionDraft::new()
            .with(Field::Name, "Ada Lovelace")
            .with(Field::Country, "Norway")
            .with(Field::ProjectCode, "ABCD-1234")
            .with(Field::Description, "Engine")
            .with(Field::StartDate, "2026-12-01")
            .with(Field::EndDate, "2028-12-01")
            .with(Field::Amount, "100")
            .with(Field::Currency, "Norwegian krone (kr)");
        Validator::new(FixedClock::new(today))
            .check(&draft)
            .into_result()
            .unwrap()
    }

    #[tokio::test]
    async fn mock_endpoint_follows_script_then_accepts() {
        let endpoint = MockEndpoint::scripted([Err(FormError::Status(500))]);
        let draft = valid();
        assert_eq!(endpoint.submit(&draft).await, Err(FormError::Status(500)));
        assert_eq!(endpoint.submit(&draft).await, Ok(()));
        assert_eq!(endpoint.calls(), 2);
        assert_eq!(endpoint.received()[0].name, "Ada Lovelace");
    }

    #[tokio::test]
    async fn static_source_counts_fetches() {
        let source = StaticCountrySource::failing(FormError::Status(503));
        assert_eq!(source.fetch_countries().await, Err(FormError::Status(503)));
        assert_eq!(source.calls(), 1);
    }

    #[test]
    fn assert_field_error_macro() {
        let errors = FieldErrors::single(Field::Name, "Name is required");
        assert_field_error!(errors, Field::Name);
        assert_field_error!(errors, Field::Name, "Name is required");
        assert_no_field_error!(errors, Field::Amount);
    }

    #[test]
    #[should_panic(expected = "Expected an error on amount")]
    fn assert_field_error_panics_when_missing() {
        assert_field_error!(FieldErrors::new(), Field::Amount);
    }

    #[test]
    #[should_panic(expected = "Expected no error on name")]
    fn assert_no_field_error_panics_when_present() {
        assert_no_field_error!(FieldErrors::single(Field::Name, "x"), Field::Name);
    }

    #[cfg(feature = "proptest")]
    mod proptest_tests {
        use super::super::strategies;
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn generated_drafts_validate(
                draft in strategies::valid_draft(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap())
            ) {
                let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
                let errors = Validator::new(FixedClock::new(today)).validate(&draft);
                prop_assert!(errors.is_empty(), "{}", errors);
            }
        }
    }
}
