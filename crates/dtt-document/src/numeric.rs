//! Numeric string values as JSON number literals.

use dtt_codec::fix_numeric_string;
use dtt_model::Vr;
use serde_json::Number;

use crate::error::{DocumentError, Result};
use crate::options::JsonMode;

/// Convert one DS or IS component to a JSON number.
///
/// Returns `None` for a blank component.
pub(crate) fn json_number(key: &str, vr: Vr, part: &str, mode: JsonMode) -> Result<Option<Number>> {
    let trimmed = match mode {
        JsonMode::Lenient => part.trim_end_matches(|c: char| c == '\0' || c.is_whitespace()),
        JsonMode::Strict => {
            if part.contains('\0') {
                return Err(DocumentError::format(key, vr, part.escape_debug().to_string()));
            }
            part.trim_end_matches(' ')
        }
    };
    let trimmed = trimmed.trim_start_matches(' ');
    if trimmed.is_empty() {
        return Ok(None);
    }

    let fixed = fix_numeric_string(trimmed);
    let acceptable = match (vr, mode) {
        (Vr::IS, JsonMode::Strict) => fixed.parse::<i32>().is_ok(),
        (Vr::IS, JsonMode::Lenient) => is_integer_literal(&fixed),
        _ => true,
    };
    if !acceptable {
        return Err(DocumentError::format(key, vr, part));
    }
    serde_json::from_str::<Number>(&fixed)
        .map(Some)
        .map_err(|_| DocumentError::format(key, vr, part))
}

fn is_integer_literal(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lenient(vr: Vr, part: &str) -> Result<Option<String>> {
        json_number("k", vr, part, JsonMode::Lenient).map(|n| n.map(|n| n.to_string()))
    }

    fn strict(vr: Vr, part: &str) -> Result<Option<String>> {
        json_number("k", vr, part, JsonMode::Strict).map(|n| n.map(|n| n.to_string()))
    }

    #[test]
    fn test_decimal_fixups() {
        assert_eq!(lenient(Vr::DS, ".123").unwrap().as_deref(), Some("0.123"));
        assert_eq!(lenient(Vr::DS, " 0000012.").unwrap().as_deref(), Some("12.0"));
        assert_eq!(lenient(Vr::DS, "-.123").unwrap().as_deref(), Some("-0.123"));
        assert_eq!(lenient(Vr::DS, "1.5e3 ").unwrap().as_deref(), Some("1.5e3"));
        assert_eq!(lenient(Vr::DS, "   ").unwrap(), None);
    }

    #[test]
    fn test_nul_padding() {
        assert_eq!(lenient(Vr::IS, "42\0").unwrap().as_deref(), Some("42"));
        assert!(matches!(strict(Vr::IS, "42\0"), Err(DocumentError::Format { .. })));
    }

    #[test]
    fn test_integer_range() {
        assert_eq!(lenient(Vr::IS, "4294967296").unwrap().as_deref(), Some("4294967296"));
        assert!(strict(Vr::IS, "4294967296").is_err());
        assert_eq!(strict(Vr::IS, "-2147483648").unwrap().as_deref(), Some("-2147483648"));
        assert!(lenient(Vr::IS, "1.5").is_err());
    }

    #[test]
    fn test_unrepairable() {
        assert!(lenient(Vr::DS, "abc").is_err());
        assert!(lenient(Vr::DS, "1.2.3").is_err());
        assert!(strict(Vr::DS, "12 ").is_ok());
    }
}
