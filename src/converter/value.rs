//! Dynamic values flowing through converters

use std::{fmt, str::FromStr};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{domain::error::ConvertError, i18n::Language};

/// How a bound element is laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    Visible,
    /// Invisible, still takes up layout space
    Hidden,
    /// Invisible, takes no layout space
    Collapsed
}

impl Visibility {
    /// Visible, otherwise Collapsed or Hidden
    pub fn from_flag(visible: bool, collapse: bool) -> Self {
        match (visible, collapse) {
            (true, _) => Visibility::Visible,
            (false, true) => Visibility::Collapsed,
            (false, false) => Visibility::Hidden
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Visible => "Visible",
            Visibility::Hidden => "Hidden",
            Visibility::Collapsed => "Collapsed"
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ARGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8
}

impl Color {
    pub const TRANSPARENT: Color = Color::from_argb(0x00, 0xFF, 0xFF, 0xFF);
    pub const BLACK: Color = Color::from_argb(0xFF, 0x00, 0x00, 0x00);
    pub const WHITE: Color = Color::from_argb(0xFF, 0xFF, 0xFF, 0xFF);
    pub const RED: Color = Color::from_argb(0xFF, 0xFF, 0x00, 0x00);
    pub const GREEN: Color = Color::from_argb(0xFF, 0x00, 0x80, 0x00);
    pub const BLUE: Color = Color::from_argb(0xFF, 0x00, 0x00, 0xFF);
    pub const YELLOW: Color = Color::from_argb(0xFF, 0xFF, 0xFF, 0x00);

    const NAMED: [(&'static str, Color); 7] = [
        ("Transparent", Color::TRANSPARENT),
        ("Black", Color::BLACK),
        ("White", Color::WHITE),
        ("Red", Color::RED),
        ("Green", Color::GREEN),
        ("Blue", Color::BLUE),
        ("Yellow", Color::YELLOW)
    ];

    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self { a, r, g, b }
    }

    /// Channel-wise linear interpolation; `fraction` is clamped to [0, 1] and NaN counts as 0
    pub fn interpolate(start: Color, end: Color, fraction: f64) -> Color {
        let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
        let channel = |from: u8, to: u8| (from as f64 + (to as f64 - from as f64) * fraction) as u8;
        Color::from_argb(
            channel(start.a, end.a),
            channel(start.r, end.r),
            channel(start.g, end.g),
            channel(start.b, end.b)
        )
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}{:02X}", self.a, self.r, self.g, self.b)
    }
}

/// Parses `#RRGGBB`, `#AARRGGBB` or a color name
impl FromStr for Color {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let literal = s.trim();
        let invalid = || ConvertError::InvalidColor(s.to_string());

        if let Some(hex) = literal.strip_prefix('#') {
            if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            let byte = |at: usize| u8::from_str_radix(&hex[at..at + 2], 16).map_err(|_| invalid());
            return match hex.len() {
                6 => Ok(Color::from_argb(0xFF, byte(0)?, byte(2)?, byte(4)?)),
                8 => Ok(Color::from_argb(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
                _ => Err(invalid())
            };
        }

        Color::NAMED
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(literal))
            .map(|(_, color)| *color)
            .ok_or_else(invalid)
    }
}

impl TryFrom<String> for Color {
    type Error = ConvertError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// A bound value or a display primitive produced by a converter
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    DateTime(NaiveDateTime),
    Visibility(Visibility),
    Color(Color)
}

const DATE_TIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

impl Value {
    /// Best-effort reading of a literal typed by a user
    pub fn parse(input: &str) -> Value {
        let literal = input.trim();
        match literal {
            "" | "null" => return Value::Null,
            "true" => return Value::Bool(true),
            "false" => return Value::Bool(false),
            _ => {}
        }

        if let Ok(int) = literal.parse::<i64>() {
            return Value::Int(int);
        }
        if let Ok(float) = literal.parse::<f64>() {
            return Value::Float(float);
        }
        if let Some(date_time) =
            DATE_TIME_FORMATS.iter().find_map(|format| NaiveDateTime::parse_from_str(literal, format).ok())
        {
            return Value::DateTime(date_time);
        }
        if let Some(date_time) =
            NaiveDate::parse_from_str(literal, "%Y-%m-%d").ok().and_then(|date| date.and_hms_opt(0, 0, 0))
        {
            return Value::DateTime(date_time);
        }
        if literal.starts_with('#')
            && let Ok(color) = literal.parse()
        {
            return Value::Color(color);
        }

        Value::Text(input.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None
        }
    }

    /// Numeric value of an `Int` or `Float`
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(int) => Some(*int as f64),
            Value::Float(float) => Some(*float),
            _ => None
        }
    }

    /// Numeric reading of anything convertible to a number: numbers, booleans
    /// and numeric text written with the culture's separators
    pub fn to_f64_in(&self, culture: Language) -> Option<f64> {
        match self {
            Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
            Value::Text(text) => {
                let normalized: String = text
                    .trim()
                    .chars()
                    .filter(|c| *c != culture.group_separator())
                    .map(|c| if c == culture.decimal_separator() { '.' } else { c })
                    .collect();
                normalized.parse().ok()
            }
            other => other.as_f64()
        }
    }

    /// Display form using the culture's decimal separator
    pub fn display_in(&self, culture: Language) -> String {
        match self {
            Value::Float(float) => float.to_string().replace('.', &culture.decimal_separator().to_string()),
            other => other.to_string()
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(flag) => write!(f, "{}", flag),
            Value::Int(int) => write!(f, "{}", int),
            Value::Float(float) => write!(f, "{}", float),
            Value::Text(text) => f.write_str(text),
            Value::DateTime(date_time) => write!(f, "{}", date_time.format("%Y-%m-%d %H:%M:%S")),
            Value::Visibility(visibility) => write!(f, "{}", visibility),
            Value::Color(color) => write!(f, "{}", color)
        }
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Value::Bool(flag)
    }
}

impl From<i64> for Value {
    fn from(int: i64) -> Self {
        Value::Int(int)
    }
}

impl From<f64> for Value {
    fn from(float: f64) -> Self {
        Value::Float(float)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(date_time: NaiveDateTime) -> Self {
        Value::DateTime(date_time)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_literals() {
        assert_eq!("#FF0000".parse::<Color>().unwrap(), Color::RED);
        assert_eq!("#80112233".parse::<Color>().unwrap(), Color::from_argb(0x80, 0x11, 0x22, 0x33));
        assert_eq!("green".parse::<Color>().unwrap(), Color::GREEN);
        assert_eq!(Color::GREEN.to_string(), "#FF008000");

        assert!(matches!("#12345".parse::<Color>(), Err(ConvertError::InvalidColor(_))));
        assert!(matches!("#GG0000".parse::<Color>(), Err(ConvertError::InvalidColor(_))));
        assert!(matches!("teal".parse::<Color>(), Err(ConvertError::InvalidColor(_))));
    }

    #[test]
    fn test_interpolation_is_clamped() {
        assert_eq!(Color::interpolate(Color::BLUE, Color::RED, 0.0), Color::BLUE);
        assert_eq!(Color::interpolate(Color::BLUE, Color::RED, 1.0), Color::RED);
        assert_eq!(Color::interpolate(Color::BLUE, Color::RED, 0.5), Color::from_argb(0xFF, 0x7F, 0x00, 0x7F));
        assert_eq!(Color::interpolate(Color::BLUE, Color::RED, -3.0), Color::BLUE);
        assert_eq!(Color::interpolate(Color::BLUE, Color::RED, 7.0), Color::RED);
        assert_eq!(Color::interpolate(Color::BLUE, Color::RED, f64::NAN), Color::BLUE);
    }

    #[test]
    fn test_parse_user_literals() {
        assert_eq!(Value::parse("null"), Value::Null);
        assert_eq!(Value::parse("true"), Value::Bool(true));
        assert_eq!(Value::parse("42"), Value::Int(42));
        assert_eq!(Value::parse("4.5"), Value::Float(4.5));
        assert_eq!(Value::parse("#0000FF"), Value::Color(Color::BLUE));
        assert_eq!(Value::parse("hello"), Value::Text("hello".to_string()));
        assert!(matches!(Value::parse("2024-03-05"), Value::DateTime(_)));
        assert!(matches!(Value::parse("2024-03-05 14:30:00"), Value::DateTime(_)));
    }

    #[test]
    fn test_numeric_reading_honours_culture() {
        assert_eq!(Value::from("1.5").to_f64_in(Language::English), Some(1.5));
        assert_eq!(Value::from("1,5").to_f64_in(Language::Spanish), Some(1.5));
        assert_eq!(Value::from("1,000.25").to_f64_in(Language::English), Some(1000.25));
        assert_eq!(Value::Bool(true).to_f64_in(Language::English), Some(1.0));
        assert_eq!(Value::from("abc").to_f64_in(Language::English), None);
        assert_eq!(Value::Null.to_f64_in(Language::English), None);
        assert_eq!(Value::Float(2.5).display_in(Language::Spanish), "2,5");
    }
}
