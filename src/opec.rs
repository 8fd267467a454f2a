//! OPEC membership and the USD-only currency rule

/// Member countries, by the common names the country dataset uses.
pub const OPEC_COUNTRIES: [&str; 12] = [
    "Algeria",
    "Equatorial Guinea",
    "Gabon",
    "Iran",
    "Iraq",
    "Kuwait",
    "Libya",
    "Nigeria",
    "Republic of the Congo",
    "Saudi Arabia",
    "United Arab Emirates",
    "Venezuela",
];

/// Currency value forced onto the draft when an OPEC country is selected.
pub const FORCED_CURRENCY: &str = "USD";

/// Whether `country` is an OPEC member. Exact match on the common name.
pub fn is_member(country: &str) -> bool {
    OPEC_COUNTRIES.contains(&country)
}

/// Whether `currency` names the US dollar.
///
/// Accepts any text containing "us dollar" or "united states dollar"
/// (case-insensitive), and the bare code `USD` that the country side
/// channel writes.
///
/// ```
/// use financing_form::opec::is_us_dollar;
///
/// assert!(is_us_dollar("United States dollar ($)"));
/// assert!(is_us_dollar("US Dollar"));
/// assert!(is_us_dollar("usd"));
/// assert!(!is_us_dollar("Euro (€)"));
/// ```
pub fn is_us_dollar(currency: &str) -> bool {
    let lowered = currency.to_lowercase();
    lowered.contains("us dollar")
        || lowered.contains("united states dollar")
        || currency.trim().eq_ignore_ascii_case(FORCED_CURRENCY)
}
