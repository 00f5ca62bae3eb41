//! Converters producing a [`Visibility`]

use serde::{Deserialize, Serialize};

use crate::{
    converter::{
        boolean::fold_booleans,
        value::{Value, Visibility}
    },
    i18n::Language,
    port::converter::{MultiValueConverter, ValueConverter}
};

/// Visible when all (or any) of the values are true
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiBooleanToVisibility {
    pub invert:           bool,
    pub collapse:         bool,
    pub use_and_operator: bool
}

impl Default for MultiBooleanToVisibility {
    fn default() -> Self {
        Self { invert: false, collapse: true, use_and_operator: true }
    }
}

impl MultiValueConverter for MultiBooleanToVisibility {
    fn name(&self) -> &'static str {
        "multi_boolean_to_visibility"
    }

    fn convert(&self, values: &[Value], _parameter: Option<&Value>, _culture: Language) -> Value {
        let visible = fold_booleans(values, self.use_and_operator) != self.invert;
        Value::Visibility(Visibility::from_flag(visible, self.collapse))
    }
}

/// Visible when the value is null
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NullToVisibility {
    pub invert:   bool,
    pub collapse: bool
}

impl Default for NullToVisibility {
    fn default() -> Self {
        Self { invert: false, collapse: true }
    }
}

impl ValueConverter for NullToVisibility {
    fn name(&self) -> &'static str {
        "null_to_visibility"
    }

    fn convert(&self, value: &Value, _parameter: Option<&Value>, _culture: Language) -> Value {
        let visible = value.is_null() != self.invert;
        Value::Visibility(Visibility::from_flag(visible, self.collapse))
    }
}

/// Visible when the value is null, empty or whitespace text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StringToVisibility {
    pub invert:   bool,
    pub collapse: bool
}

impl Default for StringToVisibility {
    fn default() -> Self {
        Self { invert: false, collapse: true }
    }
}

impl ValueConverter for StringToVisibility {
    fn name(&self) -> &'static str {
        "string_to_visibility"
    }

    fn convert(&self, value: &Value, _parameter: Option<&Value>, _culture: Language) -> Value {
        let blank = value.as_text().is_none_or(|text| text.trim().is_empty());
        Value::Visibility(Visibility::from_flag(blank != self.invert, self.collapse))
    }
}
