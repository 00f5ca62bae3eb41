//! Registry of pages by key or view-model type, displayed through a host frame

mod frame;

use std::{
    any::{Any, TypeId, type_name},
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock}
};

pub use frame::HistoryFrame;
use tracing::{Level, event};

use crate::{
    domain::{constant::navigation, error::NavigationError, parameter::Parameter},
    port::frame::{Frame, Page}
};

/// A view model that can be built from a navigation parameter
pub trait ViewModel: Any + Send + Sync + Sized {
    fn create(parameter: &Parameter) -> anyhow::Result<Self>;
}

type Factory = Arc<dyn Fn(&Parameter) -> anyhow::Result<Arc<dyn Any + Send + Sync>> + Send + Sync>;

struct ViewRoute {
    view:    String,
    factory: Factory
}

/// Page routes and the frame that displays them.
///
/// Routes are configured once at startup; the first registration of a key or
/// view-model type wins.
#[derive(Default)]
pub struct NavigationService {
    pages_by_key:        RwLock<HashMap<String, String>>,
    pages_by_view_model: RwLock<HashMap<TypeId, ViewRoute>>,
    frame:               RwLock<Option<Arc<dyn Frame>>>
}

impl NavigationService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_frame(&self, frame: Arc<dyn Frame>) {
        *self.frame.write().unwrap_or_else(PoisonError::into_inner) = Some(frame);
        event!(Level::DEBUG, event = navigation::FRAME_ATTACHED);
    }

    fn frame(&self) -> Option<Arc<dyn Frame>> {
        self.frame.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Route `key` to a page resource. Returns false when the key was already configured.
    pub fn configure(&self, key: impl Into<String>, resource: impl Into<String>) -> bool {
        let key = key.into();
        let mut pages = self.pages_by_key.write().unwrap_or_else(PoisonError::into_inner);
        if pages.contains_key(&key) {
            return false;
        }

        let resource = resource.into();
        event!(Level::DEBUG, event = navigation::ROUTE_CONFIGURED, key = %key, resource = %resource);
        pages.insert(key, resource);
        true
    }

    /// Route view model `VM` to `view`. Returns false when `VM` was already configured.
    pub fn configure_view<VM: ViewModel>(&self, view: impl Into<String>) -> bool {
        let mut pages = self.pages_by_view_model.write().unwrap_or_else(PoisonError::into_inner);
        if pages.contains_key(&TypeId::of::<VM>()) {
            return false;
        }

        let view = view.into();
        event!(Level::DEBUG, event = navigation::VIEW_CONFIGURED, view_model = type_name::<VM>(), view = %view);
        let factory: Factory = Arc::new(|parameter: &Parameter| -> anyhow::Result<Arc<dyn Any + Send + Sync>> {
            let view_model: Arc<dyn Any + Send + Sync> = Arc::new(VM::create(parameter)?);
            Ok(view_model)
        });
        pages.insert(TypeId::of::<VM>(), ViewRoute { view, factory });
        true
    }

    /// Configured route keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let pages = self.pages_by_key.read().unwrap_or_else(PoisonError::into_inner);
        let mut keys: Vec<String> = pages.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Display the page routed under `key`
    pub fn navigate_to(&self, key: &str, parameter: Parameter) -> Result<(), NavigationError> {
        let resource = self.pages_by_key.read().unwrap_or_else(PoisonError::into_inner).get(key).cloned();
        let Some(resource) = resource else {
            event!(Level::WARN, event = navigation::NAVIGATION_FAILED, key = %key, reason = "not_found");
            return Err(NavigationError::NotFound(key.to_string()));
        };
        let frame = self.frame().ok_or(NavigationError::NoFrame)?;

        frame.navigate(Page::resource(resource.clone(), parameter))?;
        event!(Level::INFO, event = navigation::NAVIGATED, key = %key, resource = %resource);
        Ok(())
    }

    /// Build `VM` from `parameter` and display its view with the view model bound to it
    pub fn navigate_to_view_model<VM: ViewModel>(&self, parameter: Parameter) -> Result<(), NavigationError> {
        let route = self
            .pages_by_view_model
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&TypeId::of::<VM>())
            .map(|route| (route.view.clone(), route.factory.clone()));
        let Some((view, factory)) = route else {
            event!(Level::WARN, event = navigation::NAVIGATION_FAILED,
                   view_model = type_name::<VM>(), reason = "not_found");
            return Err(NavigationError::NotFound(type_name::<VM>().to_string()));
        };
        let frame = self.frame().ok_or(NavigationError::NoFrame)?;

        let view_model = factory(&parameter).map_err(|e| {
            event!(Level::WARN, event = navigation::NAVIGATION_FAILED, view_model = type_name::<VM>(), error = %e);
            NavigationError::ViewModel { view_model: type_name::<VM>(), reason: e.to_string() }
        })?;

        let mut page = Page::with_data_context(view.clone(), view_model);
        page.parameter = parameter;
        frame.navigate(page)?;
        event!(Level::INFO, event = navigation::NAVIGATED, view_model = type_name::<VM>(), view = %view);
        Ok(())
    }

    /// Return to the previous page; a no-op without a frame or history
    pub fn go_back(&self) -> bool {
        match self.frame() {
            Some(frame) if frame.can_go_back() => {
                frame.go_back();
                event!(Level::INFO, event = navigation::WENT_BACK);
                true
            }
            _ => false
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::bail;

    use super::*;

    #[derive(Debug)]
    struct DetailsViewModel {
        item_id: u32
    }

    impl ViewModel for DetailsViewModel {
        fn create(parameter: &Parameter) -> anyhow::Result<Self> {
            let item_id = parameter.downcast_ref::<u32>().copied().unwrap_or_default();
            if item_id == 404 {
                bail!("item {} does not exist", item_id);
            }
            Ok(Self { item_id })
        }
    }

    struct UnroutedViewModel;

    impl ViewModel for UnroutedViewModel {
        fn create(_parameter: &Parameter) -> anyhow::Result<Self> {
            Ok(Self)
        }
    }

    fn service_with_frame() -> (NavigationService, Arc<HistoryFrame>) {
        let service = NavigationService::new();
        let frame = Arc::new(HistoryFrame::new());
        service.set_frame(frame.clone());
        (service, frame)
    }

    #[test]
    fn test_first_registration_wins() {
        let (service, frame) = service_with_frame();

        assert!(service.configure("home", "views/home.page"));
        assert!(!service.configure("home", "views/other.page"));
        service.navigate_to("home", Parameter::none()).unwrap();

        assert_eq!(frame.current().unwrap().view, "views/home.page");
        assert_eq!(service.keys(), vec!["home".to_string()]);
    }

    #[test]
    fn test_unknown_key_is_not_found() {
        let (service, frame) = service_with_frame();

        assert_eq!(
            service.navigate_to("missing", Parameter::none()),
            Err(NavigationError::NotFound("missing".to_string()))
        );
        assert!(frame.current().is_none());
    }

    #[test]
    fn test_navigation_requires_a_frame() {
        let service = NavigationService::new();
        service.configure("home", "views/home.page");

        assert_eq!(service.navigate_to("home", Parameter::none()), Err(NavigationError::NoFrame));
        assert!(!service.go_back());
    }

    #[test]
    fn test_parameter_reaches_frame() {
        let (service, frame) = service_with_frame();
        service.configure("details", "views/details.page");

        service.navigate_to("details", Parameter::new(7_u32)).unwrap();

        assert_eq!(frame.current().unwrap().parameter.downcast_ref::<u32>(), Some(&7));
    }

    #[test]
    fn test_view_model_is_bound_to_page() {
        let (service, frame) = service_with_frame();
        assert!(service.configure_view::<DetailsViewModel>("DetailsView"));
        assert!(!service.configure_view::<DetailsViewModel>("OtherView"));

        service.navigate_to_view_model::<DetailsViewModel>(Parameter::new(42_u32)).unwrap();

        let page = frame.current().unwrap();
        assert_eq!(page.view, "DetailsView");
        assert_eq!(page.data_context::<DetailsViewModel>().map(|vm| vm.item_id), Some(42));
    }

    #[test]
    fn test_view_model_failures() {
        let (service, frame) = service_with_frame();
        service.configure_view::<DetailsViewModel>("DetailsView");

        assert!(matches!(
            service.navigate_to_view_model::<DetailsViewModel>(Parameter::new(404_u32)),
            Err(NavigationError::ViewModel { .. })
        ));
        assert!(matches!(
            service.navigate_to_view_model::<UnroutedViewModel>(Parameter::none()),
            Err(NavigationError::NotFound(_))
        ));
        assert!(frame.current().is_none());
    }

    #[test]
    fn test_go_back_follows_history() {
        let (service, frame) = service_with_frame();
        service.configure("home", "home.page");
        service.configure("settings", "settings.page");

        assert!(!service.go_back());
        service.navigate_to("home", Parameter::none()).unwrap();
        service.navigate_to("settings", Parameter::none()).unwrap();

        assert!(service.go_back());
        assert_eq!(frame.current().unwrap().view, "home.page");
        assert!(!service.go_back());
    }
}
