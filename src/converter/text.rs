//! Converters producing display text

use std::fmt::Write;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{
    converter::value::Value,
    domain::error::ConvertError,
    i18n::Language,
    port::converter::{ConvertBack, ValueConverter}
};

/// Formats a date with a strftime pattern and the culture's month and day names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateTimeToString {
    pub date_format: String
}

impl Default for DateTimeToString {
    fn default() -> Self {
        Self { date_format: "%d %b %Y".to_string() }
    }
}

impl ValueConverter for DateTimeToString {
    fn name(&self) -> &'static str {
        "date_time_to_string"
    }

    /// A text parameter overrides the configured format; non-dates and invalid formats render empty
    fn convert(&self, value: &Value, parameter: Option<&Value>, culture: Language) -> Value {
        let Value::DateTime(date_time) = value else {
            return Value::Text(String::new());
        };
        let format = parameter.and_then(Value::as_text).unwrap_or(self.date_format.as_str());

        let mut rendered = String::new();
        match write!(rendered, "{}", date_time.and_utc().format_localized(format, culture.locale())) {
            Ok(()) => Value::Text(rendered),
            Err(_) => Value::Text(String::new())
        }
    }

    /// Parses with the configured format, first as a date and time, then as a date alone
    fn convert_back(
        &self,
        value: &Value,
        _parameter: Option<&Value>,
        _culture: Language
    ) -> Result<ConvertBack, ConvertError> {
        let Some(text) = value.as_text() else {
            return Ok(ConvertBack::NoChange);
        };
        let text = text.trim();

        let parsed = NaiveDateTime::parse_from_str(text, &self.date_format).ok().or_else(|| {
            NaiveDate::parse_from_str(text, &self.date_format).ok().and_then(|date| date.and_hms_opt(0, 0, 0))
        });
        Ok(parsed.map_or(ConvertBack::NoChange, |date_time| ConvertBack::Value(Value::DateTime(date_time))))
    }
}

/// Renders the value into the format string given as parameter.
///
/// Supports `{0}`, `{0:Fn}` (fixed point), `{0:Nn}` (fixed point with group
/// separators) and `{{`/`}}` escapes. Items referring to other indices are
/// left as written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StringFormat {}

impl ValueConverter for StringFormat {
    fn name(&self) -> &'static str {
        "string_format"
    }

    fn convert(&self, value: &Value, parameter: Option<&Value>, culture: Language) -> Value {
        match parameter.and_then(Value::as_text) {
            Some(format) => Value::Text(format_with(format, value, culture)),
            None => Value::Text(value.to_string())
        }
    }
}

fn format_with(format: &str, value: &Value, culture: Language) -> String {
    let mut output = String::with_capacity(format.len());
    let mut chars = format.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                output.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                output.push('}');
            }
            '{' => {
                let mut item = String::new();
                let mut closed = false;
                for next in chars.by_ref() {
                    if next == '}' {
                        closed = true;
                        break;
                    }
                    item.push(next);
                }
                match (closed, format_item(&item, value, culture)) {
                    (true, Some(rendered)) => output.push_str(&rendered),
                    (true, None) => {
                        output.push('{');
                        output.push_str(&item);
                        output.push('}');
                    }
                    (false, _) => {
                        output.push('{');
                        output.push_str(&item);
                    }
                }
            }
            other => output.push(other)
        }
    }
    output
}

fn format_item(item: &str, value: &Value, culture: Language) -> Option<String> {
    let (index, spec) = match item.split_once(':') {
        Some((index, spec)) => (index, Some(spec.trim())),
        None => (item, None)
    };
    if index.trim() != "0" {
        return None;
    }

    let Some(spec) = spec.filter(|spec| !spec.is_empty()) else {
        return Some(value.display_in(culture));
    };
    let mut spec_chars = spec.chars();
    let kind = spec_chars.next()?;
    let precision = spec_chars.as_str();
    let precision = if precision.is_empty() { 2 } else { precision.parse::<usize>().ok()? };

    match (kind, value.as_f64()) {
        ('F' | 'f', Some(number)) => Some(fixed(number, precision, culture, false)),
        ('N' | 'n', Some(number)) => Some(fixed(number, precision, culture, true)),
        _ => Some(value.display_in(culture))
    }
}

fn fixed(number: f64, precision: usize, culture: Language, grouped: bool) -> String {
    let digits = format!("{:.*}", precision, number.abs());
    let (integer, fraction) = match digits.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (digits.as_str(), None)
    };

    let mut rendered = String::new();
    if number.is_sign_negative() && digits.chars().any(|c| c.is_ascii_digit() && c != '0') {
        rendered.push('-');
    }
    if grouped {
        for (position, digit) in integer.chars().enumerate() {
            if position > 0 && (integer.len() - position) % 3 == 0 {
                rendered.push(culture.group_separator());
            }
            rendered.push(digit);
        }
    } else {
        rendered.push_str(integer);
    }
    if let Some(fraction) = fraction {
        rendered.push(culture.decimal_separator());
        rendered.push_str(fraction);
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    const EN: Language = Language::English;
    const ES: Language = Language::Spanish;

    fn march_fifth() -> Value {
        Value::DateTime(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap().and_hms_opt(14, 30, 0).unwrap())
    }

    fn text(value: Value) -> String {
        match value {
            Value::Text(text) => text,
            other => panic!("Expected text, got {:?}", other)
        }
    }

    #[test]
    fn test_date_uses_culture_month_names() {
        let converter = DateTimeToString::default();

        assert_eq!(text(converter.convert(&march_fifth(), None, EN)), "05 Mar 2024");
        assert_eq!(text(converter.convert(&march_fifth(), None, ES)), "05 mar 2024");
        assert_eq!(text(converter.convert(&march_fifth(), Some(&Value::from("%Y/%m/%d %H:%M")), EN)), "2024/03/05 14:30");
        assert_eq!(text(converter.convert(&Value::from("2024-03-05"), None, EN)), "");
    }

    #[test]
    fn test_invalid_date_format_renders_empty() {
        let converter = DateTimeToString { date_format: "%Q".to_string() };

        assert_eq!(text(converter.convert(&march_fifth(), None, EN)), "");
    }

    #[test]
    fn test_date_back_conversion() {
        let converter = DateTimeToString::default();
        let midnight = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap().and_hms_opt(0, 0, 0).unwrap();

        assert_eq!(
            converter.convert_back(&Value::from("05 Mar 2024"), None, EN),
            Ok(ConvertBack::Value(Value::DateTime(midnight)))
        );
        assert_eq!(converter.convert_back(&Value::from("tomorrow"), None, EN), Ok(ConvertBack::NoChange));
        assert_eq!(converter.convert_back(&Value::Int(3), None, EN), Ok(ConvertBack::NoChange));
    }

    #[test]
    fn test_string_format_placeholders() {
        let converter = StringFormat::default();
        let format = |pattern: &str, value: Value, culture| text(converter.convert(&value, Some(&Value::from(pattern)), culture));

        assert_eq!(format("Total: {0}", Value::Int(12), EN), "Total: 12");
        assert_eq!(format("{0:F2} %", Value::Float(3.14159), EN), "3.14 %");
        assert_eq!(format("{0:F1}", Value::Float(2.26), ES), "2,3");
        assert_eq!(format("{0:N2}", Value::Float(1234567.891), EN), "1,234,567.89");
        assert_eq!(format("{0:N0}", Value::Int(-1234), ES), "-1.234");
        assert_eq!(format("{0:F}", Value::Int(7), EN), "7.00");
        assert_eq!(format("{{{0}}}", Value::from("x"), EN), "{x}");
        assert_eq!(format("{1} and {0}", Value::from("x"), EN), "{1} and x");
        assert_eq!(format("{0:F2}", Value::from("n/a"), EN), "n/a");
        assert_eq!(format("{0", Value::Int(1), EN), "{0");
    }

    #[test]
    fn test_string_format_without_pattern() {
        let converter = StringFormat::default();

        assert_eq!(text(converter.convert(&Value::Int(5), None, EN)), "5");
        assert_eq!(text(converter.convert(&Value::Null, None, EN)), "");
        assert_eq!(text(converter.convert(&Value::Int(5), Some(&Value::Int(2)), EN)), "5");
    }
}
