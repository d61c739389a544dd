//! Field value coercion
//!
//! Runtime values arrive as loosely typed JSON and are converted according
//! to the kind of element they land on.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::element::Element;

/// Plain string rendering: strings verbatim, `null` as empty, arrays joined
/// with commas
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items.iter().map(stringify).collect::<Vec<_>>().join(","),
        Value::Object(_) => value.to_string(),
    }
}

/// Truthiness for check boxes
pub fn to_checked(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => {
            let s = s.trim();
            s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("yes")
        }
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Selection list for dropdowns and option lists
pub fn to_selection(value: &Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().map(stringify).collect(),
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        other => vec![stringify(other)],
    }
}

/// Dates from RFC 3339 / ISO strings, plain `YYYY-MM-DD[ HH:MM:SS]` strings
/// (read as UTC) or epoch milliseconds
pub fn to_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms as i64).single()),
        Value::String(s) => parse_date_str(s.trim()),
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, pattern) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    for pattern in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, pattern) {
            return date.and_hms_opt(0, 0, 0).map(|n| Utc.from_utc_datetime(&n));
        }
    }
    s.parse::<i64>()
        .ok()
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
}

pub(crate) fn deserialize_opt_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(Value::Null) => None,
        Some(value) => {
            let parsed = to_date(&value);
            if parsed.is_none() {
                tracing::warn!(value = %value, "Ignoring unparseable date");
            }
            parsed
        }
    })
}

/// Apply `value` to one element. Returns `true` when the element changed
/// kind-specific state; unsupported kinds are left alone.
pub fn apply_field_value(element: &mut Element, value: &Value) -> bool {
    match element {
        Element::TextField(field) => {
            field.text = Some(stringify(value));
            true
        }
        Element::DateInput(input) => {
            input.date = to_date(value);
            if input.date.is_none() {
                tracing::warn!(field = %input.field.name, value = %value, "Unparseable date value");
            }
            true
        }
        Element::RadioGroup(group) => {
            group.selected_option = match value {
                Value::Null => None,
                other => Some(stringify(other)),
            };
            true
        }
        Element::CheckBox(check) => {
            check.checked = to_checked(value);
            true
        }
        Element::Dropdown(dropdown) => {
            dropdown.selected_options = to_selection(value);
            true
        }
        Element::OptionList(list) => {
            list.selected_options = to_selection(value);
            true
        }
        Element::Signature(sig) => {
            sig.set_anchor_string(stringify(value));
            true
        }
        Element::Text(_)
        | Element::Image(_)
        | Element::Rectangle(_)
        | Element::Square(_)
        | Element::Circle(_)
        | Element::Ellipse(_)
        | Element::Line(_)
        | Element::SvgPath(_)
        | Element::Button(_)
        | Element::Unknown(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stringify() {
        assert_eq!(stringify(&json!(null)), "");
        assert_eq!(stringify(&json!("abc")), "abc");
        assert_eq!(stringify(&json!(12)), "12");
        assert_eq!(stringify(&json!(1.5)), "1.5");
        assert_eq!(stringify(&json!(["a", 2])), "a,2");
    }

    #[test]
    fn test_checked_coercion() {
        assert!(to_checked(&json!(true)));
        assert!(to_checked(&json!("YES")));
        assert!(to_checked(&json!("True")));
        assert!(to_checked(&json!(1)));
        assert!(to_checked(&json!(-0.5)));
        assert!(!to_checked(&json!("no")));
        assert!(!to_checked(&json!(0)));
        assert!(!to_checked(&json!(null)));
    }

    #[test]
    fn test_selection_coercion() {
        assert_eq!(to_selection(&json!("a, b ,,c")), vec!["a", "b", "c"]);
        assert_eq!(to_selection(&json!(["x", 1])), vec!["x", "1"]);
        assert_eq!(to_selection(&json!(5)), vec!["5"]);
        assert!(to_selection(&json!(null)).is_empty());
    }

    #[test]
    fn test_date_coercion() {
        let d = to_date(&json!("2024-01-02")).unwrap();
        assert_eq!(d.to_rfc3339(), "2024-01-02T00:00:00+00:00");
        let d = to_date(&json!(86_400_000)).unwrap();
        assert_eq!(d.to_rfc3339(), "1970-01-02T00:00:00+00:00");
        let d = to_date(&json!("2024-01-02T03:04:05+07:00")).unwrap();
        assert_eq!(d.to_rfc3339(), "2024-01-01T20:04:05+00:00");
        assert!(to_date(&json!("not a date")).is_none());
        assert!(to_date(&json!(true)).is_none());
    }
}
