//! Converters producing or consuming booleans

use serde::{Deserialize, Serialize};

use crate::{
    converter::value::Value,
    domain::error::ConvertError,
    i18n::Language,
    port::converter::{ConvertBack, MultiValueConverter, ValueConverter}
};

fn is_true(value: &Value) -> bool {
    matches!(value, Value::Bool(true))
}

/// Maps a boolean to one of two opacities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BooleanToOpacity {
    pub true_opacity:  f64,
    pub false_opacity: f64,
    pub invert:        bool
}

impl Default for BooleanToOpacity {
    fn default() -> Self {
        Self { true_opacity: 1.0, false_opacity: 0.5, invert: false }
    }
}

impl ValueConverter for BooleanToOpacity {
    fn name(&self) -> &'static str {
        "boolean_to_opacity"
    }

    /// Anything but `true` counts as false
    fn convert(&self, value: &Value, _parameter: Option<&Value>, _culture: Language) -> Value {
        let flag = is_true(value) != self.invert;
        Value::Float(if flag { self.true_opacity } else { self.false_opacity })
    }

    /// True exactly when the opacity equals `true_opacity`; a non-float reads as fully opaque
    fn convert_back(
        &self,
        value: &Value,
        _parameter: Option<&Value>,
        _culture: Language
    ) -> Result<ConvertBack, ConvertError> {
        let opacity = match value {
            Value::Float(opacity) => *opacity,
            _ => 1.0
        };
        Ok(ConvertBack::Value(Value::Bool(opacity == self.true_opacity)))
    }
}

/// True when the value equals the parameter, for radio-button style bindings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumToBool {
    pub invert: bool
}

impl ValueConverter for EnumToBool {
    fn name(&self) -> &'static str {
        "enum_to_bool"
    }

    fn convert(&self, value: &Value, parameter: Option<&Value>, _culture: Language) -> Value {
        match parameter {
            Some(parameter) if !value.is_null() && !parameter.is_null() => Value::Bool((value == parameter) != self.invert),
            _ => Value::Bool(false)
        }
    }

    /// A checked control writes the parameter back; anything else leaves the source alone
    fn convert_back(
        &self,
        value: &Value,
        parameter: Option<&Value>,
        _culture: Language
    ) -> Result<ConvertBack, ConvertError> {
        if is_true(value) {
            return Ok(ConvertBack::Value(parameter.cloned().unwrap_or(Value::Null)));
        }
        Ok(ConvertBack::NoChange)
    }
}

/// Folds several booleans into one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiBooleanToBoolean {
    pub invert:           bool,
    pub use_and_operator: bool
}

impl Default for MultiBooleanToBoolean {
    fn default() -> Self {
        Self { invert: false, use_and_operator: true }
    }
}

/// All (or any) of `values` are `Bool(true)`
pub(crate) fn fold_booleans(values: &[Value], use_and_operator: bool) -> bool {
    if use_and_operator { values.iter().all(is_true) } else { values.iter().any(is_true) }
}

impl MultiValueConverter for MultiBooleanToBoolean {
    fn name(&self) -> &'static str {
        "multi_boolean_to_boolean"
    }

    fn convert(&self, values: &[Value], _parameter: Option<&Value>, _culture: Language) -> Value {
        Value::Bool(fold_booleans(values, self.use_and_operator) != self.invert)
    }
}

/// True when the value lies in `[minimum, maximum]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeToBoolean {
    pub minimum: f64,
    pub maximum: f64,
    pub invert:  bool
}

impl Default for RangeToBoolean {
    fn default() -> Self {
        Self { minimum: f64::MIN, maximum: f64::MAX, invert: false }
    }
}

impl ValueConverter for RangeToBoolean {
    fn name(&self) -> &'static str {
        "range_to_boolean"
    }

    /// Values without a numeric reading are false regardless of `invert`
    fn convert(&self, value: &Value, _parameter: Option<&Value>, culture: Language) -> Value {
        match value.to_f64_in(culture) {
            Some(number) => {
                let in_range = number >= self.minimum && number <= self.maximum;
                Value::Bool(in_range != self.invert)
            }
            None => Value::Bool(false)
        }
    }
}

/// True for null or empty text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StringIsNullOrEmpty {
    pub invert: bool
}

impl ValueConverter for StringIsNullOrEmpty {
    fn name(&self) -> &'static str {
        "string_is_null_or_empty"
    }

    /// Non-text values count as null
    fn convert(&self, value: &Value, _parameter: Option<&Value>, _culture: Language) -> Value {
        let null_or_empty = value.as_text().is_none_or(str::is_empty);
        Value::Bool(null_or_empty != self.invert)
    }
}
