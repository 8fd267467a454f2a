//! Amount formatting
//!
//! The draft stores the amount as bare digits; only the displayed projection
//! carries thousands separators. These functions convert between the two.
//!
//! # Examples
//!
//! ```
//! use financing_form::format::{format_amount, sanitize_amount_input, strip_separators};
//!
//! assert_eq!(format_amount("1000000"), "1,000,000");
//! assert_eq!(strip_separators("1,000,000"), "1000000");
//! assert_eq!(sanitize_amount_input("12,500"), Some("12500".to_string()));
//! assert_eq!(sanitize_amount_input("12a"), None);
//! ```

/// Grouping separator used by the display projection.
pub const SEPARATOR: char = ',';

/// Fraction digits kept by [`format_amount`].
const MAX_FRACTION_DIGITS: usize = 3;

/// Remove every grouping separator from `raw`.
pub fn strip_separators(raw: &str) -> String {
    raw.chars().filter(|c| *c != SEPARATOR).collect()
}

/// Render `raw` with en-US thousands grouping.
///
/// Separators already in `raw` are ignored. Returns an empty string when
/// the cleaned input is empty or is not a non-negative decimal number.
/// Leading zeros are dropped and at most three fraction digits are kept
/// (rounded half-up, trailing zeros removed).
///
/// ```
/// use financing_form::format::format_amount;
///
/// assert_eq!(format_amount("0012345"), "12,345");
/// assert_eq!(format_amount("1234.5678"), "1,234.568");
/// assert_eq!(format_amount("-5"), "");
/// assert_eq!(format_amount(""), "");
/// ```
pub fn format_amount(raw: &str) -> String {
    let cleaned = strip_separators(raw);
    let cleaned = cleaned.trim();
    match parse_decimal(cleaned) {
        Some((integer, fraction)) => render(integer, fraction),
        None => String::new(),
    }
}

/// Normalise a keystroke on the amount input.
///
/// Returns the canonical digits when the input (separators removed) is
/// digits only, or empty. Anything else is rejected with `None` and the
/// previous amount should be kept.
pub fn sanitize_amount_input(raw: &str) -> Option<String> {
    let cleaned = strip_separators(raw);
    if cleaned.chars().all(|c| c.is_ascii_digit()) {
        Some(cleaned)
    } else {
        None
    }
}

fn parse_decimal(cleaned: &str) -> Option<(&str, &str)> {
    let (integer, fraction) = match cleaned.split_once('.') {
        Some((integer, fraction)) => (integer, fraction),
        None => (cleaned, ""),
    };
    if integer.is_empty() && fraction.is_empty() {
        return None;
    }
    let digits_only = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !digits_only(integer) || !digits_only(fraction) {
        return None;
    }
    Some((integer, fraction))
}

fn render(integer: &str, fraction: &str) -> String {
    let kept = fraction.len().min(MAX_FRACTION_DIGITS);
    let mut digits: Vec<u8> = integer
        .bytes()
        .chain(fraction.bytes().take(kept))
        .map(|b| b - b'0')
        .collect();

    let round_up = fraction
        .as_bytes()
        .get(MAX_FRACTION_DIGITS)
        .is_some_and(|b| *b >= b'5');
    let mut integer_len = integer.len();
    if round_up && increment(&mut digits) {
        digits.insert(0, 1);
        integer_len += 1;
    }

    let (int_digits, frac_digits) = digits.split_at(integer_len);
    let int_digits = trim_leading_zeros(int_digits);
    let frac_digits = trim_trailing_zeros(frac_digits);

    let mut out = group(int_digits);
    if !frac_digits.is_empty() {
        out.push('.');
        out.extend(frac_digits.iter().map(|d| char::from(b'0' + d)));
    }
    out
}

/// Add one to the last digit. Returns `true` when the carry overflows.
fn increment(digits: &mut [u8]) -> bool {
    for digit in digits.iter_mut().rev() {
        if *digit == 9 {
            *digit = 0;
        } else {
            *digit += 1;
            return false;
        }
    }
    true
}

fn trim_leading_zeros(digits: &[u8]) -> &[u8] {
    let start = digits.iter().position(|d| *d != 0).unwrap_or(digits.len());
    &digits[start..]
}

fn trim_trailing_zeros(digits: &[u8]) -> &[u8] {
    let end = digits.iter().rposition(|d| *d != 0).map_or(0, |i| i + 1);
    &digits[..end]
}

fn group(digits: &[u8]) -> String {
    if digits.is_empty() {
        return "0".to_string();
    }
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(SEPARATOR);
        }
        out.push(char::from(b'0' + digit));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_groups_thousands() {
        assert_eq!(format_amount("1"), "1");
        assert_eq!(format_amount("999"), "999");
        assert_eq!(format_amount("1000"), "1,000");
        assert_eq!(format_amount("1000000"), "1,000,000");
        assert_eq!(format_amount("123456789"), "123,456,789");
    }

    #[test]
    fn test_ignores_existing_separators() {
        assert_eq!(format_amount("1,0,0,0"), "1,000");
        assert_eq!(format_amount("1,000,000"), "1,000,000");
    }

    #[test]
    fn test_rejects_non_numeric() {
        assert_eq!(format_amount("abc"), "");
        assert_eq!(format_amount("12abc"), "");
        assert_eq!(format_amount("1.2.3"), "");
        assert_eq!(format_amount("."), "");
        assert_eq!(format_amount(","), "");
    }

    #[test]
    fn test_zero_and_leading_zeros() {
        assert_eq!(format_amount("0"), "0");
        assert_eq!(format_amount("000"), "0");
        assert_eq!(format_amount("0001000"), "1,000");
    }

    #[test]
    fn test_fraction_rounding() {
        assert_eq!(format_amount("1.5"), "1.5");
        assert_eq!(format_amount("1.50"), "1.5");
        assert_eq!(format_amount("1.0"), "1");
        assert_eq!(format_amount("1.2344"), "1.234");
        assert_eq!(format_amount("1.2345"), "1.235");
        assert_eq!(format_amount("999.9995"), "1,000");
        assert_eq!(format_amount(".5"), "0.5");
    }

    #[test]
    fn test_sanitize_amount_input() {
        assert_eq!(sanitize_amount_input(""), Some(String::new()));
        assert_eq!(sanitize_amount_input("1,234"), Some("1234".to_string()));
        assert_eq!(sanitize_amount_input("12.5"), None);
        assert_eq!(sanitize_amount_input("-1"), None);
        assert_eq!(sanitize_amount_input("1 000"), None);
    }

    proptest! {
        #[test]
        fn prop_format_is_idempotent(raw in "[0-9,]{0,20}(\\.[0-9]{0,5})?") {
            let once = format_amount(&raw);
            let twice = format_amount(&strip_separators(&once));
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_digits_survive_grouping(n in 0u64..u64::MAX) {
            let formatted = format_amount(&n.to_string());
            prop_assert_eq!(strip_separators(&formatted), n.to_string());
        }

        #[test]
        fn prop_groups_have_three_digits(n in 1000u64..u64::MAX) {
            let formatted = format_amount(&n.to_string());
            let groups: Vec<&str> = formatted.split(SEPARATOR).collect();
            prop_assert!(groups[0].len() <= 3);
            for group in &groups[1..] {
                prop_assert_eq!(group.len(), 3);
            }
        }

        #[test]
        fn prop_letters_format_to_empty(raw in "[0-9]*[a-z]+[0-9]*") {
            prop_assert_eq!(format_amount(&raw), "");
        }
    }
}
