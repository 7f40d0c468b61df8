//! Numeric string normalisation.

/// Normalise decimal or integer string text towards a plain numeric literal.
///
/// Trims whitespace, drops a leading `+`, writes a leading `.` as `0.`,
/// removes redundant leading zeros and completes a trailing `.` as `.0`.
/// Text without any digits before an exponent is returned trimmed but
/// otherwise untouched, so callers can reject it.
///
/// ```
/// use dtt_codec::fix_numeric_string;
///
/// assert_eq!(fix_numeric_string(".123"), "0.123");
/// assert_eq!(fix_numeric_string(" 0000012."), "12.0");
/// assert_eq!(fix_numeric_string("-.123"), "-0.123");
/// ```
#[must_use]
pub fn fix_numeric_string(text: &str) -> String {
    let trimmed = text.trim();
    let (sign, unsigned) = match trimmed.as_bytes().first() {
        Some(b'+') => ("", &trimmed[1..]),
        Some(b'-') => ("-", &trimmed[1..]),
        _ => ("", trimmed),
    };
    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(index) => unsigned.split_at(index),
        None => (unsigned, ""),
    };
    if !mantissa.bytes().any(|b| b.is_ascii_digit()) {
        return trimmed.to_string();
    }
    let (integer, fraction) = match mantissa.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (mantissa, None),
    };
    let integer = integer.trim_start_matches('0');

    let mut fixed = String::with_capacity(trimmed.len() + 2);
    fixed.push_str(sign);
    fixed.push_str(if integer.is_empty() { "0" } else { integer });
    if let Some(fraction) = fraction {
        fixed.push('.');
        fixed.push_str(if fraction.is_empty() { "0" } else { fraction });
    }
    fixed.push_str(exponent);
    fixed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixups() {
        assert_eq!(fix_numeric_string(".123"), "0.123");
        assert_eq!(fix_numeric_string(" 0000012."), "12.0");
        assert_eq!(fix_numeric_string("-.123"), "-0.123");
        assert_eq!(fix_numeric_string("+5"), "5");
        assert_eq!(fix_numeric_string("000"), "0");
        assert_eq!(fix_numeric_string("0.5"), "0.5");
        assert_eq!(fix_numeric_string("1.e5"), "1.0e5");
        assert_eq!(fix_numeric_string("-001.5E-3"), "-1.5E-3");
    }

    #[test]
    fn test_untouched_without_digits() {
        assert_eq!(fix_numeric_string("   "), "");
        assert_eq!(fix_numeric_string(" abc "), "abc");
        assert_eq!(fix_numeric_string("-"), "-");
        assert_eq!(fix_numeric_string("."), ".");
    }
}
