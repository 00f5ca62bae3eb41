//! Named converter instances built from YAML

use std::{collections::BTreeMap, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{
    converter::{
        boolean::{BooleanToOpacity, EnumToBool, MultiBooleanToBoolean, RangeToBoolean, StringIsNullOrEmpty},
        color::{NumberToBrush, NumberToColor, RangeToColor, ValueToGradientBrush},
        text::{DateTimeToString, StringFormat},
        value::Value,
        visibility::{MultiBooleanToVisibility, NullToVisibility, StringToVisibility}
    },
    domain::error::{AppError, ConvertError},
    i18n::Language,
    port::converter::{ConvertBack, MultiValueConverter, ValueConverter}
};

/// One converter declaration, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConverterSpec {
    BooleanToOpacity(BooleanToOpacity),
    DateTimeToString(DateTimeToString),
    EnumToBool(EnumToBool),
    MultiBooleanToBoolean(MultiBooleanToBoolean),
    MultiBooleanToVisibility(MultiBooleanToVisibility),
    NullToVisibility(NullToVisibility),
    NumberToBrush(NumberToBrush),
    NumberToColor(NumberToColor),
    RangeToBoolean(RangeToBoolean),
    RangeToColor(RangeToColor),
    StringFormat(StringFormat),
    StringIsNullOrEmpty(StringIsNullOrEmpty),
    StringToVisibility(StringToVisibility),
    ValueToGradientBrush(ValueToGradientBrush)
}

/// A registered converter
#[derive(Clone)]
pub enum Converter {
    Single(Arc<dyn ValueConverter>),
    Multi(Arc<dyn MultiValueConverter>)
}

impl Converter {
    pub fn kind(&self) -> &'static str {
        match self {
            Converter::Single(converter) => converter.name(),
            Converter::Multi(converter) => converter.name()
        }
    }
}

impl From<ConverterSpec> for Converter {
    fn from(spec: ConverterSpec) -> Self {
        match spec {
            ConverterSpec::BooleanToOpacity(c) => Converter::Single(Arc::new(c)),
            ConverterSpec::DateTimeToString(c) => Converter::Single(Arc::new(c)),
            ConverterSpec::EnumToBool(c) => Converter::Single(Arc::new(c)),
            ConverterSpec::MultiBooleanToBoolean(c) => Converter::Multi(Arc::new(c)),
            ConverterSpec::MultiBooleanToVisibility(c) => Converter::Multi(Arc::new(c)),
            ConverterSpec::NullToVisibility(c) => Converter::Single(Arc::new(c)),
            ConverterSpec::NumberToBrush(c) => Converter::Single(Arc::new(c)),
            ConverterSpec::NumberToColor(c) => Converter::Single(Arc::new(c)),
            ConverterSpec::RangeToBoolean(c) => Converter::Single(Arc::new(c)),
            ConverterSpec::RangeToColor(c) => Converter::Single(Arc::new(c)),
            ConverterSpec::StringFormat(c) => Converter::Single(Arc::new(c)),
            ConverterSpec::StringIsNullOrEmpty(c) => Converter::Single(Arc::new(c)),
            ConverterSpec::StringToVisibility(c) => Converter::Single(Arc::new(c)),
            ConverterSpec::ValueToGradientBrush(c) => Converter::Single(Arc::new(c))
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConverterFile {
    #[serde(default)]
    converters: BTreeMap<String, ConverterSpec>
}

/// Converters by name.
///
/// [`ConverterRegistry::defaults`] registers every converter kind under its
/// own name with default options; YAML documents add or replace entries:
///
/// ```yaml
/// converters:
///   dimmed:
///     kind: boolean_to_opacity
///     false_opacity: 0.2
/// ```
#[derive(Clone, Default)]
pub struct ConverterRegistry {
    converters: BTreeMap<String, Converter>
}

impl ConverterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn defaults() -> Self {
        let mut registry = Self::new();
        let kinds = [
            ConverterSpec::BooleanToOpacity(Default::default()),
            ConverterSpec::DateTimeToString(Default::default()),
            ConverterSpec::EnumToBool(Default::default()),
            ConverterSpec::MultiBooleanToBoolean(Default::default()),
            ConverterSpec::MultiBooleanToVisibility(Default::default()),
            ConverterSpec::NullToVisibility(Default::default()),
            ConverterSpec::NumberToBrush(Default::default()),
            ConverterSpec::NumberToColor(Default::default()),
            ConverterSpec::RangeToBoolean(Default::default()),
            ConverterSpec::RangeToColor(Default::default()),
            ConverterSpec::StringFormat(Default::default()),
            ConverterSpec::StringIsNullOrEmpty(Default::default()),
            ConverterSpec::StringToVisibility(Default::default()),
            ConverterSpec::ValueToGradientBrush(Default::default())
        ];
        for spec in kinds {
            let converter = Converter::from(spec);
            registry.insert(converter.kind(), converter);
        }
        registry
    }

    pub fn insert(&mut self, name: impl Into<String>, converter: Converter) {
        self.converters.insert(name.into(), converter);
    }

    /// Add or replace the converters declared in a YAML document; returns how many were declared
    pub fn load_yaml(&mut self, yaml: &str) -> Result<usize, AppError> {
        let file: ConverterFile = serde_yaml::from_str(yaml)?;
        let declared = file.converters.len();
        for (name, spec) in file.converters {
            self.insert(name, spec.into());
        }
        Ok(declared)
    }

    pub fn get(&self, name: &str) -> Result<&Converter, ConvertError> {
        self.converters.get(name).ok_or_else(|| ConvertError::UnknownConverter(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.converters.keys().map(String::as_str)
    }

    /// Convert with a named converter; multi-value converters receive `value` as their only input
    pub fn convert(
        &self,
        name: &str,
        value: &Value,
        parameter: Option<&Value>,
        culture: Language
    ) -> Result<Value, ConvertError> {
        Ok(match self.get(name)? {
            Converter::Single(converter) => converter.convert(value, parameter, culture),
            Converter::Multi(converter) => converter.convert(std::slice::from_ref(value), parameter, culture)
        })
    }

    pub fn convert_many(
        &self,
        name: &str,
        values: &[Value],
        parameter: Option<&Value>,
        culture: Language
    ) -> Result<Value, ConvertError> {
        match self.get(name)? {
            Converter::Multi(converter) => Ok(converter.convert(values, parameter, culture)),
            Converter::Single(converter) => match values {
                [value] => Ok(converter.convert(value, parameter, culture)),
                _ => Err(ConvertError::Unsupported(converter.name()))
            }
        }
    }

    pub fn convert_back(
        &self,
        name: &str,
        value: &Value,
        parameter: Option<&Value>,
        culture: Language
    ) -> Result<ConvertBack, ConvertError> {
        match self.get(name)? {
            Converter::Single(converter) => converter.convert_back(value, parameter, culture),
            Converter::Multi(converter) => Err(ConvertError::Unsupported(converter.name()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::value::{Color, Visibility};

    const EN: Language = Language::English;

    #[test]
    fn test_defaults_register_every_kind() {
        let registry = ConverterRegistry::defaults();
        let names: Vec<&str> = registry.names().collect();

        assert_eq!(names.len(), 14);
        assert!(names.contains(&"boolean_to_opacity"));
        assert!(names.contains(&"multi_boolean_to_visibility"));
        assert_eq!(registry.convert("number_to_brush", &Value::Int(50), None, EN), Ok(Value::Color(Color::YELLOW)));
    }

    #[test]
    fn test_yaml_declarations_override_defaults() {
        let mut registry = ConverterRegistry::defaults();
        let declared = registry
            .load_yaml(
                "converters:\n  boolean_to_opacity:\n    kind: boolean_to_opacity\n    false_opacity: 0.2\n  heat:\n    kind: range_to_color\n    ranges:\n      - {minimum: 0, maximum: 10, color: Blue}\n"
            )
            .unwrap();

        assert_eq!(declared, 2);
        assert_eq!(registry.convert("boolean_to_opacity", &Value::Bool(false), None, EN), Ok(Value::Float(0.2)));
        assert_eq!(registry.convert("heat", &Value::Int(3), None, EN), Ok(Value::Color(Color::BLUE)));
        assert_eq!(registry.get("heat").unwrap().kind(), "range_to_color");
    }

    #[test]
    fn test_unknown_kind_is_a_serialization_error() {
        let mut registry = ConverterRegistry::new();

        assert!(matches!(
            registry.load_yaml("converters:\n  x:\n    kind: sepia_filter\n"),
            Err(AppError::Serialization(_))
        ));
    }

    #[test]
    fn test_unknown_name_is_reported() {
        let registry = ConverterRegistry::defaults();

        assert_eq!(
            registry.convert("missing", &Value::Null, None, EN),
            Err(ConvertError::UnknownConverter("missing".to_string()))
        );
    }

    #[test]
    fn test_multi_and_back_dispatch() {
        let registry = ConverterRegistry::defaults();

        assert_eq!(
            registry.convert_many("multi_boolean_to_visibility", &[Value::Bool(true), Value::Bool(true)], None, EN),
            Ok(Value::Visibility(Visibility::Visible))
        );
        assert_eq!(
            registry.convert_back("multi_boolean_to_boolean", &Value::Bool(true), None, EN),
            Err(ConvertError::Unsupported("multi_boolean_to_boolean"))
        );
        assert_eq!(
            registry.convert_back("enum_to_bool", &Value::Bool(true), Some(&Value::from("Dark")), EN),
            Ok(ConvertBack::Value(Value::from("Dark")))
        );
        assert!(registry.convert_many("null_to_visibility", &[Value::Null, Value::Null], None, EN).is_err());
    }
}
