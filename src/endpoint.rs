//! Seams to the two remote services
//!
//! The form only depends on these traits. [`HttpClient`](crate::http::HttpClient)
//! implements both over HTTP; [`testing`](crate::testing) provides in-memory
//! doubles.

use std::sync::Arc;

use futures::future::BoxFuture;

use crate::{FormError, ValidDraft};

/// Provider of the raw country dataset.
///
/// Returns one JSON value per country. Shapes are not trusted here; the
/// reference loader decodes each record and skips the malformed ones.
pub trait CountrySource: Send + Sync {
    /// Fetch every country record.
    fn fetch_countries(&self) -> BoxFuture<'_, Result<Vec<serde_json::Value>, FormError>>;
}

/// Receiver of financing requests.
pub trait SubmissionEndpoint: Send + Sync {
    /// Deliver `draft`. `Ok` means the service acknowledged it with a 2xx.
    fn submit<'a>(&'a self, draft: &'a ValidDraft) -> BoxFuture<'a, Result<(), FormError>>;
}

impl<S: CountrySource + ?Sized> CountrySource for Arc<S> {
    fn fetch_countries(&self) -> BoxFuture<'_, Result<Vec<serde_json::Value>, FormError>> {
        (**self).fetch_countries()
    }
}

impl<S: SubmissionEndpoint + ?Sized> SubmissionEndpoint for Arc<S> {
    fn submit<'a>(&'a self, draft: &'a ValidDraft) -> BoxFuture<'a, Result<(), FormError>> {
        (**self).submit(draft)
    }
}
