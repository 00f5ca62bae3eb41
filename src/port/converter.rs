use crate::{
    converter::value::Value,
    domain::error::ConvertError,
    i18n::Language
};

/// Result of converting a display value back to the domain
#[derive(Debug, Clone, PartialEq)]
pub enum ConvertBack {
    /// Write this value back to the source
    Value(Value),
    /// Leave the source untouched
    NoChange
}

/// Maps a bound domain value to a display primitive.
///
/// Implementations are pure functions of their inputs and configured options.
pub trait ValueConverter: Send + Sync {
    /// Converter name (for registries and error messages)
    fn name(&self) -> &'static str;

    fn convert(&self, value: &Value, parameter: Option<&Value>, culture: Language) -> Value;

    fn convert_back(
        &self,
        _value: &Value,
        _parameter: Option<&Value>,
        _culture: Language
    ) -> Result<ConvertBack, ConvertError> {
        Err(ConvertError::Unsupported(self.name()))
    }
}

/// Maps several bound values to one display primitive
pub trait MultiValueConverter: Send + Sync {
    fn name(&self) -> &'static str;

    fn convert(&self, values: &[Value], parameter: Option<&Value>, culture: Language) -> Value;
}
