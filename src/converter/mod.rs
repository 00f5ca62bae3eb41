//! Stateless value converters between bound domain values and display primitives

pub mod boolean;
pub mod color;
pub mod registry;
pub mod text;
pub mod value;
pub mod visibility;

pub use registry::{Converter, ConverterRegistry, ConverterSpec};
pub use value::{Color, Value, Visibility};
