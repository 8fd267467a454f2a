//! The form session: draft, errors and the submission state machine
//!
//! ```text
//! Idle ──edit (complete draft)──▶ Validating ──▶ Idle | Invalid
//! Idle ──begin_submission──▶ Validating ──▶ Invalid
//!                                      └──▶ Submitting ──▶ Succeeded | Failed
//! Succeeded | Failed ──ttl elapsed / dismiss──▶ Idle
//! ```
//!
//! A session owns its draft exclusively and is driven from one task. An
//! outcome carries a deadline: once it passes, [`FormSession::outcome`] and
//! [`FormSession::phase`] report no outcome and `Idle`, whether or not
//! anything woke the session. Inside a tokio runtime a timer task also posts
//! a generation-tagged [`SessionEvent`] so a host can wait on
//! [`FormSession::next_event`]; an event whose generation is stale is
//! dropped, and dropping the session aborts the timer.
//!
//! # Examples
//!
//! ```rust
//! use financing_form::testing::MockEndpoint;
//! use financing_form::{Field, FormError, FormSession, ReferenceData};
//!
//! let mut session = FormSession::new(MockEndpoint::accepting(), ReferenceData::default());
//!
//! session.edit(Field::Country, "Kuwait").unwrap();
//! assert_eq!(session.draft().currency, "USD");
//! assert!(session.currency_locked());
//! assert_eq!(
//!     session.edit(Field::Currency, "Euro"),
//!     Err(FormError::FieldLocked(Field::Currency))
//! );
//!
//! session.edit(Field::Amount, "2500000").unwrap();
//! assert_eq!(session.display_amount(), "2,500,000");
//! assert_eq!(session.draft().amount, "2500000");
//! ```

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::Instrument;

use crate::clock::{Clock, SystemClock};
use crate::format::{format_amount, sanitize_amount_input};
use crate::reference::{ReferenceData, ReferenceLoad};
use crate::validator::{DateBounds, Validator};
use crate::{
    opec, Field, FieldErrors, FormConfig, FormError, SubmissionDraft, SubmissionEndpoint,
    ValidDraft, Validation,
};

/// Where the session is in the submission flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Editing; nothing pending.
    Idle,
    /// A validation pass is running.
    Validating,
    /// The last validation pass found errors.
    Invalid,
    /// A request is in flight; further submissions are refused.
    Submitting,
    /// The last request was accepted; the success outcome is showing.
    Succeeded,
    /// The last request failed; the failure outcome is showing.
    Failed,
}

/// The transient notification after a submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The request was accepted.
    Success,
    /// The request could not be delivered.
    Failure,
}

impl Outcome {
    /// Notification heading.
    pub fn title(self) -> &'static str {
        match self {
            Outcome::Success => "Request Submitted",
            Outcome::Failure => "Submission Failed",
        }
    }

    /// Notification body.
    pub fn message(self) -> &'static str {
        match self {
            Outcome::Success => {
                "Your financing request has been successfully submitted. \
                 Our team will review your application and contact you shortly."
            }
            Outcome::Failure => {
                "We encountered an issue processing your request. \
                 Please verify your information and try again."
            }
        }
    }
}

/// Events posted to a session by its background tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The outcome armed as `generation` reached its time to live.
    OutcomeExpired {
        /// Generation of the outcome this timer belonged to.
        generation: u64,
    },
}

/// A validated draft on its way to the endpoint.
///
/// Returned by [`FormSession::begin_submission`]; hand it back to
/// [`FormSession::complete_submission`] with the endpoint's result, or to
/// [`FormSession::abandon_submission`].
#[derive(Debug)]
#[must_use = "a pending submission keeps the session in the Submitting phase"]
pub struct PendingSubmission {
    draft: ValidDraft,
}

impl PendingSubmission {
    /// The payload to send.
    pub fn draft(&self) -> &ValidDraft {
        &self.draft
    }
}

/// One user's form: draft, errors, reference lists and submission flow.
#[derive(Debug)]
pub struct FormSession<E, C = SystemClock> {
    draft: SubmissionDraft,
    errors: FieldErrors,
    display_amount: String,
    phase: Phase,
    last_failure: Option<FormError>,
    reference: Arc<ReferenceData>,
    reference_notice: Option<String>,
    validator: Validator<C>,
    endpoint: E,
    config: FormConfig,
    generation: u64,
    expires_at: Option<Instant>,
    expiry: Option<JoinHandle<()>>,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    events_rx: mpsc::UnboundedReceiver<SessionEvent>,
}

impl<E: SubmissionEndpoint> FormSession<E, SystemClock> {
    /// A session on the system clock with the default configuration.
    pub fn new(endpoint: E, reference: impl Into<ReferenceLoad>) -> Self {
        Self::with_clock(endpoint, reference, SystemClock, FormConfig::default())
    }
}

impl<E: SubmissionEndpoint, C: Clock> FormSession<E, C> {
    /// A session with an explicit clock and configuration.
    pub fn with_clock(
        endpoint: E,
        reference: impl Into<ReferenceLoad>,
        clock: C,
        config: FormConfig,
    ) -> Self {
        let reference = reference.into();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            draft: SubmissionDraft::new(),
            errors: FieldErrors::new(),
            display_amount: String::new(),
            phase: Phase::Idle,
            last_failure: None,
            reference: reference.data,
            reference_notice: reference.notice,
            validator: Validator::with_config(clock, &config),
            endpoint,
            config,
            generation: 0,
            expires_at: None,
            expiry: None,
            events_tx,
            events_rx,
        }
    }

    /// Apply one user edit.
    ///
    /// The field's error is cleared straight away. Once every field is
    /// filled, each edit also re-runs the validator so errors show up live.
    ///
    /// Field-specific input rules:
    /// - `Amount` accepts digits (with or without separators) only; other
    ///   input is rejected with [`FormError::InvalidAmountInput`].
    /// - `Country` forces the currency to `USD` for OPEC members and clears
    ///   it otherwise; either way the currency error is cleared too.
    /// - `Currency` is rejected with [`FormError::FieldLocked`] while the
    ///   country is an OPEC member.
    /// - `Description` is cut at the configured character limit.
    ///
    /// Edits are refused with [`FormError::Busy`] while a submission is in
    /// flight, since a successful submission resets the draft.
    pub fn edit(&mut self, field: Field, value: &str) -> Result<(), FormError> {
        self.settle_outcome();
        if self.phase == Phase::Submitting {
            tracing::warn!(%field, "rejected edit, a submission is in flight");
            return Err(FormError::Busy);
        }

        match field {
            Field::Amount => {
                let Some(canonical) = sanitize_amount_input(value) else {
                    tracing::warn!(value, "rejected non-numeric amount input");
                    return Err(FormError::InvalidAmountInput(value.to_string()));
                };
                self.display_amount = format_amount(&canonical);
                self.draft.amount = canonical;
            }
            Field::Country => {
                self.draft.country = value.to_string();
                self.draft.currency = if opec::is_member(value) {
                    opec::FORCED_CURRENCY.to_string()
                } else {
                    String::new()
                };
                self.errors.clear(Field::Currency);
            }
            Field::Currency if self.currency_locked() => {
                tracing::warn!(country = %self.draft.country, "rejected currency edit, field is locked");
                return Err(FormError::FieldLocked(Field::Currency));
            }
            Field::Description => {
                let limit = self.config.description_limit();
                self.draft.description = value.chars().take(limit).collect();
            }
            _ => self.draft.set(field, value),
        }

        self.errors.clear(field);
        tracing::debug!(%field, "field edited");

        if matches!(self.phase, Phase::Invalid | Phase::Validating) {
            self.phase = Phase::Idle;
        }
        if self.draft.is_complete() {
            self.revalidate();
        }
        Ok(())
    }

    /// Validate the draft and, if it passes, enter `Submitting`.
    ///
    /// Fails with [`FormError::Busy`] while another submission is in
    /// flight, and with [`FormError::Validation`] (phase `Invalid`) when any
    /// rule fails; neither case reaches the network. A showing outcome is
    /// dismissed when a new submission starts.
    pub fn begin_submission(&mut self) -> Result<PendingSubmission, FormError> {
        self.settle_outcome();
        if self.phase == Phase::Submitting {
            tracing::warn!("submission refused, another one is in flight");
            return Err(FormError::Busy);
        }

        self.phase = Phase::Validating;
        match self.validator.check(&self.draft) {
            Validation::Failure(errors) => {
                tracing::debug!(failing = errors.len(), "submission blocked by validation");
                self.errors = errors.clone();
                self.phase = Phase::Invalid;
                Err(FormError::Validation(errors))
            }
            Validation::Success(draft) => {
                self.cancel_expiry();
                self.errors = FieldErrors::new();
                self.last_failure = None;
                self.phase = Phase::Submitting;
                tracing::info!(project_code = %draft.draft().project_code, "submitting financing request");
                Ok(PendingSubmission { draft })
            }
        }
    }

    /// Record the endpoint's answer for `pending` and arm the outcome timer.
    ///
    /// Success resets the draft; failure keeps it for another attempt.
    /// Outside a tokio runtime no timer task is spawned; the outcome still
    /// lapses at its deadline.
    pub fn complete_submission(
        &mut self,
        pending: PendingSubmission,
        result: Result<(), FormError>,
    ) -> Outcome {
        drop(pending);
        let outcome = match result {
            Ok(()) => {
                tracing::info!("financing request accepted");
                self.draft.reset();
                self.display_amount.clear();
                self.errors = FieldErrors::new();
                self.phase = Phase::Succeeded;
                Outcome::Success
            }
            Err(err) => {
                tracing::error!(error = %err, "financing request failed");
                self.last_failure = Some(err);
                self.phase = Phase::Failed;
                Outcome::Failure
            }
        };
        self.arm_expiry();
        outcome
    }

    /// Give up on `pending` without an answer; back to `Idle`.
    pub fn abandon_submission(&mut self, pending: PendingSubmission) {
        drop(pending);
        tracing::debug!("pending submission abandoned");
        self.phase = Phase::Idle;
    }

    /// Validate, send through the endpoint, and record the outcome.
    ///
    /// Transport failures are not errors of this call: they produce
    /// [`Outcome::Failure`] and are kept in [`last_failure`](Self::last_failure).
    pub async fn submit(&mut self) -> Result<Outcome, FormError> {
        let pending = self.begin_submission()?;
        let span = tracing::info_span!("submit_request");
        let result = self
            .endpoint
            .submit(pending.draft())
            .instrument(span)
            .await;
        Ok(self.complete_submission(pending, result))
    }

    /// Close the outcome notification now and cancel its timer.
    pub fn dismiss_outcome(&mut self) {
        if self.outcome().is_some() {
            self.clear_outcome();
            tracing::debug!("outcome dismissed");
        } else {
            self.settle_outcome();
        }
    }

    /// Wait for the next background event and apply it.
    ///
    /// Only returns `None` if the channel closed, which cannot happen while
    /// the session holds its own sender.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        let event = self.events_rx.recv().await?;
        self.apply(event);
        Some(event)
    }

    /// Apply every event already queued and settle a lapsed outcome.
    /// Returns how many events were applied.
    pub fn drain_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply(event);
            applied += 1;
        }
        self.settle_outcome();
        applied
    }

    /// Resolve once the showing outcome (if any) has expired or been dismissed.
    pub async fn outcome_expired(&mut self) {
        while self.outcome().is_some() {
            match self.expires_at {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => futures::future::pending::<()>().await,
            }
            self.settle_outcome();
        }
    }

    /// Swap in freshly loaded reference lists, e.g. after a manual reload.
    pub fn replace_reference_data(&mut self, reference: impl Into<ReferenceLoad>) {
        let reference = reference.into();
        self.reference = reference.data;
        self.reference_notice = reference.notice;
    }

    /// Whether the submit control is enabled. Computed fresh on every call.
    pub fn can_submit(&self) -> bool {
        self.draft.is_complete() && self.errors.is_empty() && self.phase != Phase::Submitting
    }

    /// The working draft.
    pub fn draft(&self) -> &SubmissionDraft {
        &self.draft
    }

    /// Errors from the last validation pass, minus fields edited since.
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Error message for `field`, if any.
    pub fn error(&self, field: Field) -> Option<&str> {
        self.errors.get(field)
    }

    /// Current phase. A lapsed outcome reads as `Idle`.
    pub fn phase(&self) -> Phase {
        if self.outcome_lapsed() {
            Phase::Idle
        } else {
            self.phase
        }
    }

    /// The showing outcome, if any.
    pub fn outcome(&self) -> Option<Outcome> {
        match self.phase() {
            Phase::Succeeded => Some(Outcome::Success),
            Phase::Failed => Some(Outcome::Failure),
            _ => None,
        }
    }

    /// Heading and body of the showing outcome notification.
    pub fn outcome_message(&self) -> Option<(&'static str, &'static str)> {
        self.outcome().map(|outcome| (outcome.title(), outcome.message()))
    }

    /// Error behind the most recent failed submission.
    pub fn last_failure(&self) -> Option<&FormError> {
        self.last_failure.as_ref()
    }

    /// The amount with thousands separators, for display.
    pub fn display_amount(&self) -> &str {
        &self.display_amount
    }

    /// Whether the currency input is disabled (OPEC country selected).
    pub fn currency_locked(&self) -> bool {
        opec::is_member(&self.draft.country)
    }

    /// Live description counter, e.g. `"42/150"`.
    pub fn description_counter(&self) -> String {
        format!(
            "{}/{}",
            self.draft.description.chars().count(),
            self.config.description_limit()
        )
    }

    /// Bounds for the date pickers.
    pub fn date_bounds(&self) -> DateBounds {
        self.validator.date_bounds(&self.draft)
    }

    /// Selectable countries.
    pub fn countries(&self) -> &[String] {
        self.reference.countries()
    }

    /// Known currencies.
    pub fn currencies(&self) -> &[String] {
        self.reference.currencies()
    }

    /// Notice to show when the reference lists could not be loaded.
    pub fn reference_notice(&self) -> Option<&str> {
        self.reference_notice.as_deref()
    }

    /// The session configuration.
    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    fn revalidate(&mut self) {
        let resting = self.phase;
        if resting == Phase::Idle {
            self.phase = Phase::Validating;
        }
        self.errors = self.validator.validate(&self.draft);
        tracing::debug!(failing = self.errors.len(), "live validation pass");
        if resting == Phase::Idle {
            self.phase = if self.errors.is_empty() {
                Phase::Idle
            } else {
                Phase::Invalid
            };
        }
    }

    fn arm_expiry(&mut self) {
        self.cancel_expiry();
        let ttl = self.config.outcome_ttl();
        // None: too far out to represent, the outcome stays until dismissed
        self.expires_at = Instant::now().checked_add(ttl);

        let Ok(runtime) = Handle::try_current() else {
            tracing::debug!("no tokio runtime, outcome lapses on its deadline");
            return;
        };
        let generation = self.generation;
        let events = self.events_tx.clone();
        let timer = async move {
            tokio::time::sleep(ttl).await;
            tracing::debug!("outcome timer fired");
            // the session may be gone; nothing to do then
            let _ = events.send(SessionEvent::OutcomeExpired { generation });
        };
        self.expiry = Some(
            runtime.spawn(timer.instrument(tracing::debug_span!("outcome_timer", generation))),
        );
    }

    fn cancel_expiry(&mut self) {
        if let Some(timer) = self.expiry.take() {
            timer.abort();
        }
        self.expires_at = None;
        self.generation += 1;
    }

    fn outcome_lapsed(&self) -> bool {
        matches!(self.phase, Phase::Succeeded | Phase::Failed)
            && self
                .expires_at
                .is_some_and(|deadline| Instant::now() >= deadline)
    }

    fn settle_outcome(&mut self) {
        if self.outcome_lapsed() {
            tracing::debug!(generation = self.generation, "outcome expired");
            self.clear_outcome();
        }
    }

    fn clear_outcome(&mut self) {
        self.cancel_expiry();
        self.phase = Phase::Idle;
    }

    fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::OutcomeExpired { generation } => {
                let showing = matches!(self.phase, Phase::Succeeded | Phase::Failed);
                if generation != self.generation || !showing {
                    tracing::debug!(generation, current = self.generation, "stale outcome timer");
                    return;
                }
                self.expiry = None;
                self.clear_outcome();
                tracing::debug!(generation, "outcome expired");
            }
        }
    }
}

impl<E, C> Drop for FormSession<E, C> {
    fn drop(&mut self) {
        if let Some(timer) = self.expiry.take() {
            timer.abort();
            tracing::debug!(generation = self.generation, "outcome timer aborted");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::testing::MockEndpoint;

    fn session() -> FormSession<MockEndpoint> {
        FormSession::new(MockEndpoint::accepting(), ReferenceData::default())
    }

    #[test]
    fn test_amount_edit_keeps_canonical_digits() {
        let mut session = session();
        session.edit(Field::Amount, "1,234,567").unwrap();
        assert_eq!(session.draft().amount, "1234567");
        assert_eq!(session.display_amount(), "1,234,567");

        let err = session.edit(Field::Amount, "12x").unwrap_err();
        assert_eq!(err, FormError::InvalidAmountInput("12x".to_string()));
        assert_eq!(session.draft().amount, "1234567");

        session.edit(Field::Amount, "").unwrap();
        assert_eq!(session.display_amount(), "");
    }

    #[test]
    fn test_country_side_channel() {
        let mut session = session();
        session.edit(Field::Currency, "Euro (€)").unwrap();
        session.edit(Field::Country, "Nigeria").unwrap();
        assert_eq!(session.draft().currency, "USD");
        assert!(session.currency_locked());

        session.edit(Field::Country, "Ghana").unwrap();
        assert_eq!(session.draft().currency, "");
        assert!(!session.currency_locked());
        session.edit(Field::Currency, "Ghanaian cedi (₵)").unwrap();
        assert_eq!(session.draft().currency, "Ghanaian cedi (₵)");
    }

    #[test]
    fn test_description_is_capped() {
        let mut session = session();
        session.edit(Field::Description, &"a".repeat(200)).unwrap();
        assert_eq!(session.draft().description.chars().count(), 150);
        assert_eq!(session.description_counter(), "150/150");
    }

    #[test]
    fn test_edit_clears_only_that_field() {
        let mut session = session();
        let err = session.begin_submission().unwrap_err();
        assert_eq!(err.field_errors().map(FieldErrors::len), Some(8));
        assert_eq!(session.phase(), Phase::Invalid);

        session.edit(Field::Name, "Ada").unwrap();
        assert_eq!(session.error(Field::Name), None);
        assert_eq!(session.error(Field::Country), Some("Country is required"));
        assert_eq!(session.phase(), Phase::Idle);
        assert!(!session.can_submit());
    }

    #[test]
    fn test_country_change_clears_currency_error() {
        let mut session = session();
        assert!(session.begin_submission().is_err());
        assert_eq!(session.error(Field::Currency), Some("Currency is required"));

        session.edit(Field::Country, "Kuwait").unwrap();
        assert_eq!(session.error(Field::Currency), None);
        assert_eq!(session.draft().currency, "USD");
    }

    #[test]
    fn test_edit_refused_while_submitting() {
        let mut session = session();
        session.phase = Phase::Submitting;
        assert_eq!(session.edit(Field::Name, "Ada"), Err(FormError::Busy));
        assert_eq!(session.draft().name, "");
    }

    #[test]
    fn test_outcome_lapses_without_runtime() {
        let config = FormConfig::default().with_outcome_ttl(Duration::from_millis(10));
        let mut session = FormSession::with_clock(
            MockEndpoint::accepting(),
            ReferenceData::default(),
            SystemClock,
            config,
        );
        session.phase = Phase::Submitting;
        let pending = PendingSubmission {
            draft: ValidDraft::new(SubmissionDraft::new()),
        };

        assert_eq!(session.complete_submission(pending, Ok(())), Outcome::Success);
        assert_eq!(session.outcome(), Some(Outcome::Success));
        assert!(session.expiry.is_none());

        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(session.outcome(), None);
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.outcome_message(), None);
        assert_eq!(session.drain_events(), 0);
        assert_eq!(session.phase, Phase::Idle);
    }

    #[test]
    fn test_outcome_copy() {
        assert_eq!(Outcome::Success.title(), "Request Submitted");
        assert!(Outcome::Failure.message().starts_with("We encountered an issue"));
        assert_eq!(session().outcome_message(), None);
    }

    #[tokio::test]
    async fn test_failure_outcome_message() {
        let mut session = session();
        session.phase = Phase::Submitting;
        let pending = PendingSubmission {
            draft: ValidDraft::new(SubmissionDraft::new()),
        };
        session.complete_submission(pending, Err(FormError::Status(500)));
        let (title, body) = session.outcome_message().unwrap();
        assert_eq!(title, "Submission Failed");
        assert_eq!(body, Outcome::Failure.message());
    }
}
