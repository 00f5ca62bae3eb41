use std::{
    fs,
    path::{Path, PathBuf}
};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{Level, event};

use crate::{
    domain::constant::config,
    i18n::{self, Language}
};

/// Persisted user settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Currently selected language
    pub language:  Language,
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String
}

impl Default for Settings {
    fn default() -> Self {
        Self { language: Language::English, log_level: "warn".to_string() }
    }
}

/// Location of the configuration directory and the files inside it
#[derive(Debug, Clone)]
pub struct AppConfig {
    config_dir: PathBuf
}

impl AppConfig {
    /// Use the platform configuration directory
    pub fn from_project_dirs() -> Result<Self> {
        let project_dirs =
            ProjectDirs::from("", "", "mvvm-template").context("Failed to determine project directories")?;
        Ok(Self::at(project_dirs.config_dir()))
    }

    /// Use `config_dir`
    pub fn at(config_dir: impl AsRef<Path>) -> Self {
        Self { config_dir: config_dir.as_ref().to_path_buf() }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn i18n_dir(&self) -> PathBuf {
        self.config_dir.join("i18n")
    }

    pub fn config_file_path(&self) -> PathBuf {
        self.config_dir.join("config.yaml")
    }

    /// Optional converter declarations picked up by `mvvm convert`
    pub fn converters_file_path(&self) -> PathBuf {
        self.config_dir.join("converters.yaml")
    }

    /// Load settings, writing the defaults when there is no config file yet
    pub fn load(&self) -> Result<Settings> {
        let config_path = self.config_file_path();

        if config_path.exists() {
            let content = fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
            let settings = serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;
            event!(Level::DEBUG, event = config::CONFIG_LOADED, path = %config_path.display());
            Ok(settings)
        } else {
            let settings = Settings::default();
            self.save(&settings)?;
            Ok(settings)
        }
    }

    pub fn save(&self, settings: &Settings) -> Result<()> {
        let config_path = self.config_file_path();

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let content = serde_yaml::to_string(settings).context("Failed to serialize config")?;
        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        event!(Level::DEBUG, event = config::CONFIG_SAVED, path = %config_path.display());
        Ok(())
    }

    /// Create the directories and seed the default translations and settings
    pub fn init_dirs(&self) -> Result<()> {
        let i18n_dir = self.i18n_dir();
        fs::create_dir_all(&i18n_dir)
            .with_context(|| format!("Failed to create i18n directory: {}", i18n_dir.display()))?;

        for lang in Language::all() {
            let file = i18n_dir.join(format!("{}.yaml", lang.code()));
            if !file.exists() {
                fs::write(&file, i18n::embedded_texts(lang))
                    .with_context(|| format!("Failed to write {} translations: {}", lang.native_name(), file.display()))?;
            }
        }

        if !self.config_file_path().exists() {
            self.save(&Settings::default())?;
        }

        event!(Level::DEBUG, event = config::DIRS_INITIALIZED, path = %self.config_dir.display());
        Ok(())
    }

    /// Persist `language` as the selected language
    pub fn set_language(&self, language: Language) -> Result<()> {
        let mut settings = self.load()?;
        settings.language = language;
        self.save(&settings)
    }

    /// Languages with a translation file in the i18n directory
    pub fn list_available_languages(&self) -> Result<Vec<Language>> {
        let i18n_dir = self.i18n_dir();
        if !i18n_dir.exists() {
            self.init_dirs()?;
        }

        let entries = fs::read_dir(&i18n_dir)
            .with_context(|| format!("Failed to read i18n directory: {}", i18n_dir.display()))?;

        let mut languages: Vec<Language> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "yaml"))
            .filter_map(|path| path.file_stem().and_then(|stem| stem.to_str()).and_then(Language::from_code))
            .collect();
        languages.sort_by_key(|lang| lang.code());
        languages.dedup();
        Ok(languages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let app_config = AppConfig::at(dir.path());

        let settings = app_config.load().unwrap();

        assert_eq!(settings, Settings::default());
        assert!(app_config.config_file_path().exists());
    }

    #[test]
    fn test_language_persists() {
        let dir = tempfile::tempdir().unwrap();
        let app_config = AppConfig::at(dir.path());

        app_config.set_language(Language::Spanish).unwrap();

        assert_eq!(app_config.load().unwrap().language, Language::Spanish);
        let raw = fs::read_to_string(app_config.config_file_path()).unwrap();
        assert!(raw.contains("language: es"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let app_config = AppConfig::at(dir.path());
        fs::write(app_config.config_file_path(), "log_level: debug\n").unwrap();

        let settings = app_config.load().unwrap();

        assert_eq!(settings.language, Language::English);
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let app_config = AppConfig::at(dir.path());
        fs::write(app_config.config_file_path(), "language: klingon\n").unwrap();

        assert!(app_config.load().is_err());
    }

    #[test]
    fn test_init_seeds_translations_without_overwriting() {
        let dir = tempfile::tempdir().unwrap();
        let app_config = AppConfig::at(dir.path());
        fs::create_dir_all(app_config.i18n_dir()).unwrap();
        fs::write(app_config.i18n_dir().join("en.yaml"), "greeting: Custom\n").unwrap();

        app_config.init_dirs().unwrap();

        let english = fs::read_to_string(app_config.i18n_dir().join("en.yaml")).unwrap();
        assert_eq!(english, "greeting: Custom\n");
        assert!(app_config.i18n_dir().join("es.yaml").exists());
        assert_eq!(app_config.list_available_languages().unwrap(), vec![Language::English, Language::Spanish]);
    }
}
