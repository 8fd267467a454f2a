//! Walks a financing request through the form against the live services
//!
//! Run with: cargo run --example submit_request
//!
//! Pass `--send` to actually post the request; without it the demo stops
//! after validation. Endpoints can be overridden with the
//! `FINANCING_FORM_REFERENCE_URL` and `FINANCING_FORM_SUBMISSION_URL`
//! environment variables.

use chrono::{Days, Local, Months};
use financing_form::reference;
use financing_form::{Field, FormConfig, FormSession, HttpClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let send = std::env::args().any(|arg| arg == "--send");
    let config = FormConfig::from_env();
    let client = HttpClient::new(&config)?;

    let reference = reference::load_or_empty(&client).await;
    if let Some(notice) = &reference.notice {
        tracing::warn!("{}", notice);
    }
    tracing::info!(
        countries = reference.data.countries().len(),
        currencies = reference.data.currencies().len(),
        "reference lists ready"
    );

    let mut session = FormSession::with_clock(
        client,
        reference,
        financing_form::clock::SystemClock,
        config,
    );

    let start = Local::now().date_naive() + Days::new(30);
    let end = (start + Months::new(24)).to_string();
    let start = start.to_string();

    // Kuwait is an OPEC member, so the currency is filled in and locked.
    for (field, value) in [
        (Field::Name, "Demo Applicant"),
        (Field::Country, "Kuwait"),
        (Field::ProjectCode, "DEMO-2468"),
        (Field::Description, "Solar desalination pilot"),
        (Field::StartDate, start.as_str()),
        (Field::EndDate, end.as_str()),
        (Field::Amount, "1500000"),
    ] {
        session.edit(field, value)?;
    }

    tracing::info!(
        currency = %session.draft().currency,
        locked = session.currency_locked(),
        amount = %session.display_amount(),
        description = %session.description_counter(),
        "draft filled"
    );

    if !session.can_submit() {
        for (field, message) in session.errors().iter() {
            tracing::error!(%field, "{}", message);
        }
        return Ok(());
    }

    if !send {
        tracing::info!("draft is valid; rerun with --send to post it");
        return Ok(());
    }

    let outcome = session.submit().await?;
    println!("{}: {}", outcome.title(), outcome.message());
    if let Some(err) = session.last_failure() {
        tracing::error!(error = %err, "submission failed");
    }

    session.outcome_expired().await;
    tracing::info!(phase = ?session.phase(), "outcome cleared");
    Ok(())
}
