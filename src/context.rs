use std::sync::Arc;

use anyhow::Result;

use crate::{
    config::{AppConfig, Settings},
    i18n::Localizer,
    navigation::NavigationService
};

/// Process-scoped services, built once at startup and passed down explicitly
#[derive(Clone)]
pub struct AppContext {
    pub config:     AppConfig,
    pub settings:   Settings,
    pub localizer:  Arc<Localizer>,
    pub navigation: Arc<NavigationService>
}

impl AppContext {
    /// Load settings and translations from `config`
    pub fn load(config: AppConfig) -> Result<Self> {
        let settings = config.load()?;
        let localizer = Localizer::load(Some(&config.i18n_dir()), settings.language);

        Ok(Self {
            config,
            settings,
            localizer: Arc::new(localizer),
            navigation: Arc::new(NavigationService::new())
        })
    }

    /// Localized text for `key`
    pub fn t(&self, key: &str) -> String {
        self.localizer.lookup(key)
    }

    /// Localized text for `key` with `{0}`, `{1}`... substituted
    pub fn t_params(&self, key: &str, params: &[&str]) -> String {
        self.localizer.lookup_params(key, params)
    }
}
