//! Untyped command payload passed through the binding layer

use std::{
    any::{Any, type_name},
    fmt,
    sync::Arc
};

use crate::domain::error::CommandError;

/// Payload handed to [`Invocable`](crate::port::command::Invocable) operations.
///
/// Hosts bind commands without knowing their payload type, so the parameter is
/// type-erased here and recovered by the typed command with [`Parameter::extract`].
#[derive(Clone, Default)]
pub struct Parameter(Option<Arc<dyn Any + Send + Sync>>);

impl Parameter {
    /// The absent parameter
    pub fn none() -> Self {
        Self(None)
    }

    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Some(Arc::new(value)))
    }

    pub fn is_none(&self) -> bool {
        self.0.is_none()
    }

    /// Borrow the payload if present and of type `T`
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_ref().and_then(|value| (**value).downcast_ref::<T>())
    }

    /// Recover a typed payload for `command`.
    ///
    /// An absent parameter yields `T::default()`. A payload of another type is a
    /// [`CommandError::TypeMismatch`].
    pub fn extract<T: Any + Clone + Default>(&self, command: &str) -> Result<T, CommandError> {
        match &self.0 {
            None => Ok(T::default()),
            Some(value) => (**value).downcast_ref::<T>().cloned().ok_or_else(|| CommandError::TypeMismatch {
                command:  command.to_string(),
                expected: type_name::<T>()
            })
        }
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            None => f.write_str("Parameter(None)"),
            Some(_) => f.write_str("Parameter(..)")
        }
    }
}
