use std::{any::Any, fmt, sync::Arc};

use crate::domain::{error::NavigationError, parameter::Parameter};

/// A page handed to the host frame for display
#[derive(Clone)]
pub struct Page {
    /// Page resource (for key routes) or view name (for view-model routes)
    pub view:         String,
    /// View model bound to the page, for view-model routes
    pub data_context: Option<Arc<dyn Any + Send + Sync>>,
    /// Navigation parameter
    pub parameter:    Parameter
}

impl Page {
    pub fn resource(resource: impl Into<String>, parameter: Parameter) -> Self {
        Self { view: resource.into(), data_context: None, parameter }
    }

    pub fn with_data_context(view: impl Into<String>, data_context: Arc<dyn Any + Send + Sync>) -> Self {
        Self { view: view.into(), data_context: Some(data_context), parameter: Parameter::none() }
    }

    /// Borrow the bound view model as `T`
    pub fn data_context<T: Any>(&self) -> Option<&T> {
        self.data_context.as_ref().and_then(|context| (**context).downcast_ref::<T>())
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("view", &self.view)
            .field("has_data_context", &self.data_context.is_some())
            .field("parameter", &self.parameter)
            .finish()
    }
}

/// Host-provided page hosting surface
pub trait Frame: Send + Sync {
    /// Display `page`
    fn navigate(&self, page: Page) -> Result<(), NavigationError>;

    /// Whether there is a page to go back to
    fn can_go_back(&self) -> bool;

    /// Return to the previous page
    fn go_back(&self);
}
