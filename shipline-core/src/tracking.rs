//! Tracking number conventions.
//!
//! Tracking numbers are 2–4 uppercase ASCII letters followed by 6–8 digits
//! (`LST123456`). Users may type them with hyphens or spaces; those are
//! ignored by validation. The format is a client-side convention, the
//! backend does not enforce it.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ValidationError;

static VALID_TRACKING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{2,4}[0-9]{6,8}$").expect("Invalid tracking number regex"));

static LETTERS_THEN_DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z]+)([0-9]+)$").expect("Invalid letters-digits regex"));

/// Remove the hyphens and whitespace users put in tracking numbers.
pub fn normalize_tracking_number(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .collect()
}

/// Check a tracking number against the `LLL999999` convention.
///
/// Lowercase letters are rejected; the check never fails otherwise.
pub fn is_valid_tracking_number(raw: &str) -> bool {
    VALID_TRACKING_NUMBER.is_match(&normalize_tracking_number(raw))
}

/// Normalize and validate in one step.
pub fn parse_tracking_number(raw: &str) -> Result<String, ValidationError> {
    let normalized = normalize_tracking_number(raw);
    if VALID_TRACKING_NUMBER.is_match(&normalized) {
        Ok(normalized)
    } else {
        Err(ValidationError::InvalidTrackingNumber {
            value: raw.to_string(),
        })
    }
}

/// Format a tracking number for display: `LST123456` becomes `LST-123-456`.
///
/// The letter prefix is always split from the digits. When there are at
/// least six digits, the last three are split off as well, so the final
/// six read as two triples. Anything that is not letters followed by
/// digits comes back unchanged.
pub fn format_tracking_number(raw: &str) -> String {
    let Some(caps) = LETTERS_THEN_DIGITS.captures(raw) else {
        return raw.to_string();
    };
    let letters = &caps[1];
    let digits = &caps[2];

    if digits.len() >= 6 {
        let (head, tail) = digits.split_at(digits.len() - 3);
        format!("{}-{}-{}", letters, head, tail)
    } else {
        format!("{}-{}", letters, digits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_tracking_numbers() {
        assert!(is_valid_tracking_number("LST123456"));
        assert!(is_valid_tracking_number("LST-123-456"));
        assert!(is_valid_tracking_number("AB 1234 5678"));
        assert!(is_valid_tracking_number("ABCD12345678"));
    }

    #[test]
    fn test_invalid_tracking_numbers() {
        assert!(!is_valid_tracking_number("lst123456"));
        assert!(!is_valid_tracking_number("LST12"));
        assert!(!is_valid_tracking_number("A123456"));
        assert!(!is_valid_tracking_number("ABCDE123456"));
        assert!(!is_valid_tracking_number("LST123456789"));
        assert!(!is_valid_tracking_number(""));
    }

    #[test]
    fn test_parse_tracking_number_normalizes() {
        assert_eq!(parse_tracking_number("LST-123-456").unwrap(), "LST123456");
        assert_eq!(
            parse_tracking_number("x"),
            Err(ValidationError::InvalidTrackingNumber {
                value: "x".to_string()
            })
        );
    }

    #[test]
    fn test_format_tracking_number() {
        assert_eq!(format_tracking_number("LST123456"), "LST-123-456");
        assert_eq!(format_tracking_number("AB12345678"), "AB-12345-678");
        assert_eq!(format_tracking_number("LST12345"), "LST-12345");
    }

    #[test]
    fn test_format_leaves_other_shapes_alone() {
        assert_eq!(format_tracking_number("lst123456"), "lst123456");
        assert_eq!(format_tracking_number("LST-123-456"), "LST-123-456");
        assert_eq!(format_tracking_number("123456"), "123456");
        assert_eq!(format_tracking_number(""), "");
    }
}
