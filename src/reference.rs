//! Country and currency reference lists
//!
//! The country dataset is fetched once per session through a
//! [`CountrySource`] and boiled down to two sorted, duplicate-free lists.
//! Derivation is pure ([`ReferenceData::from_records`]); only [`load`] and
//! [`load_or_empty`] touch the network.
//!
//! # Examples
//!
//! ```
//! use financing_form::reference::ReferenceData;
//! use serde_json::json;
//!
//! let raw = vec![
//!     json!({ "name": { "common": "Norway" },
//!             "currencies": { "NOK": { "name": "Norwegian krone", "symbol": "kr" } } }),
//!     json!({ "name": { "common": "Åland Islands" },
//!             "currencies": { "EUR": { "name": "Euro", "symbol": "€" } } }),
//!     json!({ "name": { "common": "Finland" },
//!             "currencies": { "EUR": { "name": "Euro", "symbol": "€" } } }),
//! ];
//!
//! let (data, skipped) = ReferenceData::from_values(raw);
//! assert_eq!(skipped, 0);
//! assert_eq!(data.countries(), ["Åland Islands", "Finland", "Norway"]);
//! assert_eq!(data.currencies(), ["Euro (€)", "Norwegian krone (kr)"]);
//! ```

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::Deserialize;

use crate::context::ResultContext;
use crate::{ContextError, CountrySource, FormError};

/// Notice shown when the country list could not be loaded.
pub const UNAVAILABLE_NOTICE: &str = "Country list is unavailable; please try again later";

/// One country as delivered by the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CountryRecord {
    /// Country names.
    pub name: CountryName,
    /// Currencies keyed by ISO code. Some territories have none.
    #[serde(default)]
    pub currencies: Option<BTreeMap<String, CurrencyInfo>>,
}

/// Name block of a [`CountryRecord`]; only the common name is used.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CountryName {
    /// Everyday name, e.g. "Norway".
    pub common: String,
}

/// A currency entry of a [`CountryRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CurrencyInfo {
    /// Currency name, e.g. "Norwegian krone".
    #[serde(default)]
    pub name: Option<String>,
    /// Currency symbol, e.g. "kr".
    #[serde(default)]
    pub symbol: Option<String>,
}

impl CurrencyInfo {
    /// "{name} ({symbol})", or "{name}" without a symbol. `None` without a name.
    pub fn display(&self) -> Option<String> {
        let name = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())?;
        match self.symbol.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(symbol) => Some(format!("{} ({})", name, symbol)),
            None => Some(name.to_string()),
        }
    }
}

/// The two selection lists of the form. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceData {
    countries: Vec<String>,
    currencies: Vec<String>,
}

impl ReferenceData {
    /// Derive both lists from decoded records.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a CountryRecord>) -> Self {
        let mut countries = Vec::new();
        let mut currencies = BTreeSet::new();

        for record in records {
            let common = record.name.common.trim();
            if !common.is_empty() {
                countries.push(common.to_string());
            }
            let entries = record.currencies.iter().flat_map(|map| map.values());
            currencies.extend(entries.filter_map(CurrencyInfo::display));
        }

        countries.sort_by(|a, b| locale_cmp(a, b));
        countries.dedup();
        let mut currencies: Vec<String> = currencies.into_iter().collect();
        currencies.sort_by(|a, b| locale_cmp(a, b));

        Self {
            countries,
            currencies,
        }
    }

    /// Decode raw JSON records, skipping the malformed ones, and derive the
    /// lists. Also returns how many records were skipped.
    pub fn from_values(values: Vec<serde_json::Value>) -> (Self, usize) {
        let total = values.len();
        let records: Vec<CountryRecord> = values
            .into_iter()
            .filter_map(|value| serde_json::from_value(value).ok())
            .collect();
        let skipped = total - records.len();
        (Self::from_records(&records), skipped)
    }

    /// Build directly from lists, which are sorted and deduplicated here.
    pub fn from_lists(countries: Vec<String>, currencies: Vec<String>) -> Self {
        let mut countries = countries;
        let mut currencies = currencies;
        for list in [&mut countries, &mut currencies] {
            list.sort_by(|a, b| locale_cmp(a, b));
            list.dedup();
        }
        Self {
            countries,
            currencies,
        }
    }

    /// Country common names, locale-sorted.
    pub fn countries(&self) -> &[String] {
        &self.countries
    }

    /// Currency display strings, locale-sorted.
    pub fn currencies(&self) -> &[String] {
        &self.currencies
    }

    /// Whether `country` is one of the selectable countries.
    pub fn has_country(&self, country: &str) -> bool {
        self.countries.iter().any(|c| c == country)
    }

    /// `true` when both lists are empty.
    pub fn is_empty(&self) -> bool {
        self.countries.is_empty() && self.currencies.is_empty()
    }
}

/// Reference data handed to a session at start-up.
#[derive(Debug, Clone)]
pub struct ReferenceLoad {
    /// The lists; empty when loading failed.
    pub data: Arc<ReferenceData>,
    /// Non-blocking notice for the user when loading failed.
    pub notice: Option<String>,
}

impl From<ReferenceData> for ReferenceLoad {
    fn from(data: ReferenceData) -> Self {
        ReferenceLoad {
            data: Arc::new(data),
            notice: None,
        }
    }
}

impl From<Arc<ReferenceData>> for ReferenceLoad {
    fn from(data: Arc<ReferenceData>) -> Self {
        ReferenceLoad { data, notice: None }
    }
}

/// Fetch and derive the reference lists.
#[tracing::instrument(name = "load_reference_data", skip_all)]
pub async fn load<S>(source: &S) -> Result<ReferenceData, ContextError<FormError>>
where
    S: CountrySource + ?Sized,
{
    let values = source
        .fetch_countries()
        .await
        .context("fetching country dataset")
        .map_err(|err| err.context("loading reference data"))?;

    let (data, skipped) = ReferenceData::from_values(values);
    if skipped > 0 {
        tracing::debug!(skipped, "skipped malformed country records");
    }
    tracing::info!(
        countries = data.countries().len(),
        currencies = data.currencies().len(),
        "reference data loaded"
    );
    Ok(data)
}

/// [`load`], degrading to empty lists plus a notice on failure.
///
/// There is no automatic retry; a host offering a reload button calls this
/// again and hands the result to
/// [`FormSession::replace_reference_data`](crate::FormSession::replace_reference_data).
///
/// ```
/// use financing_form::reference::{load_or_empty, UNAVAILABLE_NOTICE};
/// use financing_form::testing::StaticCountrySource;
/// use financing_form::FormError;
///
/// # tokio_test::block_on(async {
/// let source = StaticCountrySource::failing(FormError::Status(503));
/// let load = load_or_empty(&source).await;
/// assert!(load.data.is_empty());
/// assert_eq!(load.notice.as_deref(), Some(UNAVAILABLE_NOTICE));
/// # });
/// ```
pub async fn load_or_empty<S>(source: &S) -> ReferenceLoad
where
    S: CountrySource + ?Sized,
{
    match load(source).await {
        Ok(data) => ReferenceLoad {
            data: Arc::new(data),
            notice: None,
        },
        Err(err) => {
            tracing::warn!(error = %err, "reference data unavailable");
            ReferenceLoad {
                data: Arc::new(ReferenceData::default()),
                notice: Some(UNAVAILABLE_NOTICE.to_string()),
            }
        }
    }
}

/// Locale-style ordering: case and accents are ignored first, the exact
/// text breaks ties.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

fn collation_key(s: &str) -> String {
    let mut key = String::with_capacity(s.len());
    for c in s.chars().flat_map(char::to_lowercase) {
        match fold_char(c) {
            Some(folded) => key.push_str(folded),
            None => key.push(c),
        }
    }
    key
}

/// Base letters for the accented Latin characters found in country and
/// currency names.
fn fold_char(c: char) -> Option<&'static str> {
    let folded = match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' | 'ā' | 'ą' => "a",
        'æ' => "ae",
        'ç' | 'ć' | 'č' => "c",
        'ď' | 'đ' => "d",
        'é' | 'è' | 'ê' | 'ë' | 'ē' | 'ę' | 'ě' => "e",
        'í' | 'ì' | 'î' | 'ï' | 'ī' => "i",
        'ł' => "l",
        'ñ' | 'ń' | 'ň' => "n",
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' | 'ø' | 'ō' | 'ő' => "o",
        'œ' => "oe",
        'ř' => "r",
        'ś' | 'š' | 'ş' | 'ș' => "s",
        'ß' => "ss",
        'ť' | 'ţ' | 'ț' => "t",
        'ú' | 'ù' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' => "u",
        'ý' | 'ÿ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        _ => return None,
    };
    Some(folded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(name: &str, currencies: serde_json::Value) -> serde_json::Value {
        json!({ "name": { "common": name, "official": name }, "currencies": currencies })
    }

    #[test]
    fn test_countries_sorted_ignoring_accents_and_case() {
        let names = ["Zambia", "Curaçao", "côte d'Ivoire", "Colombia", "Åland Islands", "Albania"];
        let values = names.iter().map(|n| record(n, json!({}))).collect();
        let (data, _) = ReferenceData::from_values(values);
        assert_eq!(
            data.countries(),
            ["Åland Islands", "Albania", "Colombia", "côte d'Ivoire", "Curaçao", "Zambia"]
        );
    }

    #[test]
    fn test_currencies_deduplicated_and_formatted() {
        let values = vec![
            record("France", json!({ "EUR": { "name": "Euro", "symbol": "€" } })),
            record("Germany", json!({ "EUR": { "name": "Euro", "symbol": "€" } })),
            record(
                "Switzerland",
                json!({ "CHF": { "name": "Swiss franc", "symbol": "Fr." } }),
            ),
            record("Nowhere", json!({ "XXX": { "name": "Token" } })),
            record("Blank", json!({ "YYY": { "symbol": "?" } })),
        ];
        let (data, skipped) = ReferenceData::from_values(values);
        assert_eq!(skipped, 0);
        assert_eq!(data.currencies(), ["Euro (€)", "Swiss franc (Fr.)", "Token"]);
    }

    #[test]
    fn test_multiple_currencies_per_country() {
        let values = vec![record(
            "Panama",
            json!({
                "PAB": { "name": "Panamanian balboa", "symbol": "B/." },
                "USD": { "name": "United States dollar", "symbol": "$" }
            }),
        )];
        let (data, _) = ReferenceData::from_values(values);
        assert_eq!(
            data.currencies(),
            ["Panamanian balboa (B/.)", "United States dollar ($)"]
        );
    }

    #[test]
    fn test_malformed_records_are_skipped() {
        let values = vec![
            record("Norway", json!({ "NOK": { "name": "Norwegian krone", "symbol": "kr" } })),
            json!({ "name": "Atlantis" }),
            json!("not an object"),
            json!({ "currencies": {} }),
            json!({ "name": { "common": "Antarctica" } }),
            json!({ "name": { "common": "Svalbard" }, "currencies": null }),
        ];
        let (data, skipped) = ReferenceData::from_values(values);
        assert_eq!(skipped, 3);
        assert_eq!(data.countries(), ["Antarctica", "Norway", "Svalbard"]);
        assert_eq!(data.currencies(), ["Norwegian krone (kr)"]);
    }

    #[test]
    fn test_duplicate_countries_collapse() {
        let values = vec![record("Chad", json!({})), record("Chad", json!({}))];
        let (data, _) = ReferenceData::from_values(values);
        assert_eq!(data.countries(), ["Chad"]);
        assert!(data.has_country("Chad"));
        assert!(!data.has_country("chad"));
    }

    #[test]
    fn test_from_lists_sorts() {
        let data = ReferenceData::from_lists(
            vec!["Peru".into(), "Ecuador".into(), "Peru".into()],
            vec!["Sol".into(), "Dollar".into()],
        );
        assert_eq!(data.countries(), ["Ecuador", "Peru"]);
        assert_eq!(data.currencies(), ["Dollar", "Sol"]);
        assert!(!data.is_empty());
        assert!(ReferenceData::default().is_empty());
    }

    #[test]
    fn test_locale_cmp_ties_on_exact_text() {
        assert_eq!(locale_cmp("Eé", "Ee"), Ordering::Greater);
        assert_eq!(locale_cmp("réunion", "Reunion"), Ordering::Greater);
        assert_eq!(locale_cmp("a", "B"), Ordering::Less);
    }
}
