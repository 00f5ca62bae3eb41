//! Converters mapping numbers to colors

use serde::{Deserialize, Serialize};

use crate::{
    converter::value::{Color, Value},
    i18n::Language,
    port::converter::ValueConverter
};

/// Three-band traffic light over a number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberToBrush {
    pub low_brush:      Color,
    pub medium_brush:   Color,
    pub high_brush:     Color,
    pub low_threshold:  f64,
    pub high_threshold: f64
}

impl Default for NumberToBrush {
    fn default() -> Self {
        Self {
            low_brush:      Color::GREEN,
            medium_brush:   Color::YELLOW,
            high_brush:     Color::RED,
            low_threshold:  33.33,
            high_threshold: 66.66
        }
    }
}

impl ValueConverter for NumberToBrush {
    fn name(&self) -> &'static str {
        "number_to_brush"
    }

    fn convert(&self, value: &Value, _parameter: Option<&Value>, _culture: Language) -> Value {
        let Some(number) = value.as_f64() else {
            return Value::Color(Color::TRANSPARENT);
        };
        let brush = if number <= self.low_threshold {
            self.low_brush
        } else if number <= self.high_threshold {
            self.medium_brush
        } else {
            self.high_brush
        };
        Value::Color(brush)
    }
}

/// Position of a number within `[minimum, maximum]` mapped onto a color ramp
fn ramp(start: Color, end: Color, minimum: f64, maximum: f64, value: &Value) -> Value {
    let Some(number) = value.as_f64() else {
        return Value::Color(start);
    };
    let fraction = (number - minimum) / (maximum - minimum);
    Value::Color(Color::interpolate(start, end, fraction))
}

/// Blue to red ramp over 0..100
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberToColor {
    pub start_color: Color,
    pub end_color:   Color,
    pub minimum:     f64,
    pub maximum:     f64
}

impl Default for NumberToColor {
    fn default() -> Self {
        Self { start_color: Color::BLUE, end_color: Color::RED, minimum: 0.0, maximum: 100.0 }
    }
}

impl ValueConverter for NumberToColor {
    fn name(&self) -> &'static str {
        "number_to_color"
    }

    fn convert(&self, value: &Value, _parameter: Option<&Value>, _culture: Language) -> Value {
        ramp(self.start_color, self.end_color, self.minimum, self.maximum, value)
    }
}

/// Green to red ramp over 0..100
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueToGradientBrush {
    pub start_color: Color,
    pub end_color:   Color,
    pub minimum:     f64,
    pub maximum:     f64
}

impl Default for ValueToGradientBrush {
    fn default() -> Self {
        Self { start_color: Color::GREEN, end_color: Color::RED, minimum: 0.0, maximum: 100.0 }
    }
}

impl ValueConverter for ValueToGradientBrush {
    fn name(&self) -> &'static str {
        "value_to_gradient_brush"
    }

    fn convert(&self, value: &Value, _parameter: Option<&Value>, _culture: Language) -> Value {
        ramp(self.start_color, self.end_color, self.minimum, self.maximum, value)
    }
}

/// Inclusive numeric band painted with one color
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeColor {
    pub minimum: f64,
    pub maximum: f64,
    pub color:   Color
}

/// Color of the first band containing the number
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeToColor {
    pub ranges: Vec<RangeColor>
}

impl ValueConverter for RangeToColor {
    fn name(&self) -> &'static str {
        "range_to_color"
    }

    fn convert(&self, value: &Value, _parameter: Option<&Value>, _culture: Language) -> Value {
        let color = value
            .as_f64()
            .and_then(|number| self.ranges.iter().find(|range| number >= range.minimum && number <= range.maximum))
            .map_or(Color::TRANSPARENT, |range| range.color);
        Value::Color(color)
    }
}
