//! Coercion of submitted form strings into typed option values.

use crate::schema::{OptionType, SelectOption};
use crate::validator::{cached_pattern, is_unparsed_key};
use quarry_kernel::domain::ConfigValue;
use std::collections::BTreeMap;

/// One `ip: header` line of the trusted proxies textarea.
pub(crate) const TRUSTED_PROXY_PATTERN: &str = r"^(.+):[ ]?(\w+)$";

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IntakeError {
    #[error("Not a valid number!")]
    NotANumber,
    /// The value is not one of the select choices.
    #[error("Incorrect value!")]
    NotAllowed,
}

/// Converts a submitted value. `raw` is `None` when the browser sent nothing,
/// which only happens for unchecked checkboxes.
///
/// # Errors
/// [`IntakeError::NotANumber`] for unparsable numbers and
/// [`IntakeError::NotAllowed`] for values outside `choices`.
pub fn coerce(
    option_type: OptionType,
    raw: Option<&str>,
    choices: &[SelectOption],
) -> Result<ConfigValue, IntakeError> {
    let raw = raw.unwrap_or_default();
    match option_type {
        OptionType::Boolean => Ok(ConfigValue::Bool(!raw.is_empty() && raw != "0")),
        OptionType::Integer => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(ConfigValue::String(String::new()));
            }
            trimmed.parse::<i64>().map(ConfigValue::Int).map_err(|_| IntakeError::NotANumber)
        },
        OptionType::Double => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(ConfigValue::Double(0.0));
            }
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|d| d.is_finite())
                .map(ConfigValue::Double)
                .ok_or(IntakeError::NotANumber)
        },
        OptionType::String | OptionType::ShortString => Ok(ConfigValue::from(raw.trim())),
        OptionType::Select => validate_select(raw, choices).ok_or(IntakeError::NotAllowed),
        OptionType::Array => Ok(ConfigValue::List(
            raw.split('\n')
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(ConfigValue::from)
                .collect(),
        )),
    }
}

/// The stored value of the first choice matching `raw`, if any.
///
/// A choice matches when its key is identical to the value, or when both are
/// numeric and numerically equal.
#[must_use]
pub fn validate_select(raw: &str, choices: &[SelectOption]) -> Option<ConfigValue> {
    let value = ConfigValue::from(raw);
    choices.iter().find(|choice| select_matches(&choice.key, &value)).map(SelectOption::stored_value)
}

/// Loose select comparison, also used to mark the selected `<option>`.
#[must_use]
pub fn select_matches(key: &ConfigValue, value: &ConfigValue) -> bool {
    if key == value {
        return true;
    }
    match (numeric(key), numeric(value)) {
        (Some(k), Some(v)) => (k - v).abs() < f64::EPSILON,
        _ => false,
    }
}

fn numeric(value: &ConfigValue) -> Option<f64> {
    match value {
        ConfigValue::Int(_) | ConfigValue::Double(_) | ConfigValue::Bool(_) => value.as_f64(),
        ConfigValue::String(s) => s.trim().parse::<f64>().ok().filter(|d| d.is_finite()),
        _ => None,
    }
}

/// Turns textarea lines into an `ip -> header` map. Lines that do not parse
/// are kept under `-0`, `-1`, ... so they can be shown again.
#[must_use]
pub fn parse_trusted_proxies(value: ConfigValue) -> ConfigValue {
    let pattern = cached_pattern(TRUSTED_PROXY_PATTERN);
    let mut proxies = BTreeMap::new();
    let mut unparsed = 0usize;

    for line in value.into_list() {
        let line = line.as_display_string();
        let parsed = pattern.as_ref().and_then(|re| re.captures(&line)).and_then(|c| {
            Some((c.get(1)?.as_str().trim().to_owned(), c.get(2)?.as_str().trim().to_owned()))
        });
        match parsed {
            Some((ip, header)) => {
                proxies.insert(ip, ConfigValue::String(header));
            },
            None => {
                proxies.insert(format!("-{unparsed}"), ConfigValue::String(line));
                unparsed += 1;
            },
        }
    }
    ConfigValue::Map(proxies)
}

/// Textarea text of a trusted proxies map, one `ip: header` line per entry.
#[must_use]
pub fn format_trusted_proxies(value: &ConfigValue) -> String {
    match value {
        ConfigValue::Map(map) => map
            .iter()
            .map(|(ip, header)| {
                if is_unparsed_key(ip) {
                    header.as_display_string()
                } else {
                    format!("{ip}: {}", header.as_display_string())
                }
            })
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.as_display_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;

    fn choices(path: &str) -> Vec<SelectOption> {
        Schema::global().option_value_list(path).unwrap()
    }

    #[test]
    fn booleans() {
        assert_eq!(coerce(OptionType::Boolean, None, &[]), Ok(ConfigValue::Bool(false)));
        assert_eq!(coerce(OptionType::Boolean, Some("0"), &[]), Ok(ConfigValue::Bool(false)));
        assert_eq!(coerce(OptionType::Boolean, Some(""), &[]), Ok(ConfigValue::Bool(false)));
        assert_eq!(coerce(OptionType::Boolean, Some("on"), &[]), Ok(ConfigValue::Bool(true)));
    }

    #[test]
    fn numbers() {
        assert_eq!(coerce(OptionType::Integer, Some(" 42 "), &[]), Ok(ConfigValue::Int(42)));
        assert_eq!(coerce(OptionType::Integer, Some(""), &[]), Ok(ConfigValue::from("")));
        assert_eq!(coerce(OptionType::Integer, Some("4x"), &[]), Err(IntakeError::NotANumber));
        assert_eq!(coerce(OptionType::Integer, Some("1.5"), &[]), Err(IntakeError::NotANumber));
        assert_eq!(coerce(OptionType::Double, Some(""), &[]), Ok(ConfigValue::Double(0.0)));
        assert_eq!(coerce(OptionType::Double, Some("2.5"), &[]), Ok(ConfigValue::Double(2.5)));
        assert_eq!(coerce(OptionType::Double, Some("NaN"), &[]), Err(IntakeError::NotANumber));
    }

    #[test]
    fn strings_and_lists() {
        assert_eq!(coerce(OptionType::String, Some("  db1 "), &[]), Ok(ConfigValue::from("db1")));
        assert_eq!(
            coerce(OptionType::Array, Some("allow a\r\n\n  deny b \n"), &[]),
            Ok(ConfigValue::from(vec![ConfigValue::from("allow a"), ConfigValue::from("deny b")]))
        );
    }

    #[test]
    fn selects_take_the_key_type() {
        let rows = choices("MaxRows");
        assert_eq!(coerce(OptionType::Select, Some("50"), &rows), Ok(ConfigValue::Int(50)));
        assert_eq!(coerce(OptionType::Select, Some("50.0"), &rows), Ok(ConfigValue::Int(50)));
        assert_eq!(coerce(OptionType::Select, Some("51"), &rows), Err(IntakeError::NotAllowed));

        let protect = choices("ProtectBinary");
        assert_eq!(validate_select("0", &protect), Some(ConfigValue::Bool(false)));
        assert_eq!(validate_select("blob", &protect), Some(ConfigValue::from("blob")));
        assert_eq!(validate_select("abc", &protect), None);

        let local = choices("Import/ldi_local_option");
        assert_eq!(validate_select("1", &local), Some(ConfigValue::Bool(true)));
        assert_eq!(validate_select("auto", &local), Some(ConfigValue::from("auto")));
    }

    #[test]
    fn errors_carry_the_form_messages() {
        assert_eq!(IntakeError::NotANumber.to_string(), "Not a valid number!");
        assert_eq!(IntakeError::NotAllowed.to_string(), "Incorrect value!");
    }

    #[test]
    fn empty_key_only_matches_empty_value() {
        let order = choices("Servers/1/AllowDeny/order");
        assert_eq!(validate_select("", &order), Some(ConfigValue::from("")));
        assert!(!select_matches(&ConfigValue::Int(0), &ConfigValue::from("")));
        assert!(select_matches(&ConfigValue::Int(1), &ConfigValue::Bool(true)));
    }

    #[test]
    fn trusted_proxies_keep_unparsed_lines() {
        let raw = coerce(
            OptionType::Array,
            Some("1.2.3.4: HTTP_X_FORWARDED_FOR\nnot a proxy\n::1:HTTP_X_REAL_IP"),
            &[],
        )
        .unwrap();
        let parsed = parse_trusted_proxies(raw);
        let ConfigValue::Map(map) = &parsed else { panic!("expected a map") };
        assert_eq!(map["1.2.3.4"], ConfigValue::from("HTTP_X_FORWARDED_FOR"));
        assert_eq!(map["::1"], ConfigValue::from("HTTP_X_REAL_IP"));
        assert_eq!(map["-0"], ConfigValue::from("not a proxy"));

        assert_eq!(
            format_trusted_proxies(&parsed),
            "not a proxy\n1.2.3.4: HTTP_X_FORWARDED_FOR\n::1: HTTP_X_REAL_IP"
        );
    }
}
