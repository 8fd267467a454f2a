//! # Financing Form
//!
//! The core of a financing-request form: the draft, its validation rules,
//! the country and currency reference lists, and the submission flow.
//!
//! ## Philosophy
//!
//! The crate follows the **pure core, imperative shell** split:
//! - **Core** = formatting, validation and the OPEC rule are plain functions
//!   of the draft and an injected [`Clock`](clock::Clock)
//! - **Shell** = the reference loader and the [`FormSession`] talk to remote
//!   services through the [`CountrySource`] and [`SubmissionEndpoint`] seams
//!
//! Validation accumulates: every failing field is reported at once through
//! [`Validation`] and the [`Semigroup`] instance of [`FieldErrors`].
//!
//! ## Quick Example
//!
//! ```rust
//! use financing_form::testing::{FixedClock, MockEndpoint};
//! use financing_form::{Field, FormConfig, FormSession, Outcome, ReferenceData};
//! use chrono::NaiveDate;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
//! let endpoint = MockEndpoint::accepting();
//! let mut session = FormSession::with_clock(
//!     endpoint.clone(),
//!     ReferenceData::default(),
//!     FixedClock::new(today),
//!     FormConfig::default(),
//! );
//!
//! for (field, value) in [
//!     (Field::Name, "Ada Lovelace"),
//!     (Field::Country, "Norway"),
//!     (Field::ProjectCode, "ABCD-1234"),
//!     (Field::Description, "Analytical engine"),
//!     (Field::StartDate, "2026-12-01"),
//!     (Field::EndDate, "2028-12-01"),
//!     (Field::Amount, "250000"),
//!     (Field::Currency, "Norwegian krone (kr)"),
//! ] {
//!     session.edit(field, value).unwrap();
//! }
//!
//! assert!(session.can_submit());
//! assert_eq!(session.submit().await, Ok(Outcome::Success));
//! assert_eq!(endpoint.received()[0].amount, "250000");
//! # }
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod clock;
pub mod config;
pub mod context;
pub mod draft;
pub mod endpoint;
pub mod error;
pub mod field;
pub mod format;
#[cfg(feature = "http")]
pub mod http;
pub mod opec;
pub mod reference;
pub mod semigroup;
pub mod session;
pub mod testing;
pub mod validation;
pub mod validator;

// Re-exports
pub use config::FormConfig;
pub use context::{ContextError, ResultContext};
pub use draft::{SubmissionDraft, ValidDraft};
pub use endpoint::{CountrySource, SubmissionEndpoint};
pub use error::FormError;
pub use field::{Field, FieldErrors};
#[cfg(feature = "http")]
pub use http::HttpClient;
pub use reference::{ReferenceData, ReferenceLoad};
pub use semigroup::Semigroup;
pub use session::{FormSession, Outcome, PendingSubmission, Phase, SessionEvent};
pub use validation::Validation;
pub use validator::{DateBounds, Validator};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::clock::{Clock, SystemClock};
    pub use crate::context::{ContextError, ResultContext};
    pub use crate::endpoint::{CountrySource, SubmissionEndpoint};
    pub use crate::field::{Field, FieldErrors};
    pub use crate::semigroup::Semigroup;
    pub use crate::session::{FormSession, Outcome, Phase};
    pub use crate::validation::Validation;
    pub use crate::{FormConfig, FormError, SubmissionDraft};
}
