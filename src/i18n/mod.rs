mod loader;

use std::{
    collections::HashMap,
    fmt,
    path::Path,
    str::FromStr,
    sync::{PoisonError, RwLock}
};

use chrono::Locale;
pub use loader::*;
use serde::{Deserialize, Serialize};
use tracing::{Level, event};

use crate::domain::{constant::localization, error::AppError, event::EventSource};

/// Supported languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "es")]
    Spanish
}

impl Language {
    pub fn all() -> [Language; 2] {
        [Language::English, Language::Spanish]
    }

    /// Get the file code for this language
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Spanish => "es"
        }
    }

    /// Parse language from code
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "en" => Some(Language::English),
            "es" => Some(Language::Spanish),
            _ => None
        }
    }

    /// Native name, for language pickers
    pub fn native_name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Spanish => "Español"
        }
    }

    /// Locale used for month and day names
    pub fn locale(&self) -> Locale {
        match self {
            Language::English => Locale::en_US,
            Language::Spanish => Locale::es_ES
        }
    }

    pub fn decimal_separator(&self) -> char {
        match self {
            Language::English => '.',
            Language::Spanish => ','
        }
    }

    pub fn group_separator(&self) -> char {
        match self {
            Language::English => ',',
            Language::Spanish => '.'
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = AppError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        Language::from_code(code.trim()).ok_or_else(|| AppError::UnsupportedLanguage(code.to_string()))
    }
}

/// Text mapping type
pub type TextMap = HashMap<String, String>;

/// Published by [`Localizer::set_language`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CultureChanged {
    pub previous: Language,
    pub current:  Language
}

/// Keyed string lookup against the current culture.
///
/// Lookups fall back to English, marked with an `[EN] ` prefix, and then to
/// `[MISSING: key]`. Bound views subscribe to
/// [`culture_changed`](Localizer::culture_changed) and re-read every string.
pub struct Localizer {
    current:         RwLock<Language>,
    texts:           HashMap<Language, TextMap>,
    culture_changed: EventSource<CultureChanged>
}

impl Localizer {
    pub fn new(texts: HashMap<Language, TextMap>, language: Language) -> Self {
        Self { current: RwLock::new(language), texts, culture_changed: EventSource::new() }
    }

    /// Load every language from `i18n_dir`, falling back to the embedded translations
    pub fn load(i18n_dir: Option<&Path>, language: Language) -> Self {
        let texts = Language::all().into_iter().map(|lang| (lang, load_language_texts(lang, i18n_dir))).collect();
        Self::new(texts, language)
    }

    /// Only the embedded translations
    pub fn embedded(language: Language) -> Self {
        Self::load(None, language)
    }

    pub fn language(&self) -> Language {
        *self.current.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Switch the current culture and notify subscribers. Returns the previous culture.
    pub fn set_language(&self, language: Language) -> Language {
        let previous = {
            let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *current, language)
        };

        event!(Level::INFO, event = localization::CULTURE_CHANGED, previous = %previous, current = %language);
        self.culture_changed.publish(&CultureChanged { previous, current: language });
        previous
    }

    pub fn culture_changed(&self) -> &EventSource<CultureChanged> {
        &self.culture_changed
    }

    /// Text for `key` in the current culture
    pub fn lookup(&self, key: &str) -> String {
        self.lookup_in(key, self.language())
    }

    /// Text for `key` in `language`
    pub fn lookup_in(&self, key: &str, language: Language) -> String {
        if let Some(text) = self.texts.get(&language).and_then(|texts| texts.get(key)) {
            return text.clone();
        }

        if language != Language::English
            && let Some(text) = self.texts.get(&Language::English).and_then(|texts| texts.get(key))
        {
            return format!("[EN] {}", text);
        }

        format!("[MISSING: {}]", key)
    }

    /// Text for `key` with `{0}`, `{1}`... replaced by `params`
    pub fn lookup_params(&self, key: &str, params: &[&str]) -> String {
        let mut result = self.lookup(key);
        for (i, param) in params.iter().enumerate() {
            result = result.replace(&format!("{{{}}}", i), param);
        }
        result
    }

    /// Languages with at least one loaded string
    pub fn available_languages(&self) -> Vec<Language> {
        Language::all()
            .into_iter()
            .filter(|lang| self.texts.get(lang).is_some_and(|texts| !texts.is_empty()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn localizer() -> Localizer {
        let english = TextMap::from([
            ("greeting".to_string(), "Hello".to_string()),
            ("only_english".to_string(), "Only here".to_string()),
            ("progress".to_string(), "{0} of {1} done".to_string())
        ]);
        let spanish = TextMap::from([
            ("greeting".to_string(), "Hola".to_string()),
            ("progress".to_string(), "{0} de {1} listo".to_string())
        ]);
        Localizer::new(HashMap::from([(Language::English, english), (Language::Spanish, spanish)]), Language::English)
    }

    #[test]
    fn test_language_codes() {
        assert_eq!("es".parse::<Language>().unwrap(), Language::Spanish);
        assert!(matches!("fr".parse::<Language>(), Err(AppError::UnsupportedLanguage(code)) if code == "fr"));
        assert_eq!(Language::Spanish.to_string(), "es");
        assert_eq!(serde_yaml::to_string(&Language::Spanish).unwrap().trim(), "es");
    }

    #[test]
    fn test_lookup_falls_back_to_english_then_missing() {
        let localizer = localizer();
        localizer.set_language(Language::Spanish);

        assert_eq!(localizer.lookup("greeting"), "Hola");
        assert_eq!(localizer.lookup("only_english"), "[EN] Only here");
        assert_eq!(localizer.lookup("nowhere"), "[MISSING: nowhere]");
        assert_eq!(localizer.lookup_in("nowhere", Language::English), "[MISSING: nowhere]");
    }

    #[test]
    fn test_parameters_are_substituted() {
        let localizer = localizer();

        assert_eq!(localizer.lookup_params("progress", &["3", "5"]), "3 of 5 done");
        localizer.set_language(Language::Spanish);
        assert_eq!(localizer.lookup_params("progress", &["3", "5"]), "3 de 5 listo");
    }

    #[test]
    fn test_culture_change_is_published() {
        let localizer = localizer();
        let changes = Arc::new(Mutex::new(Vec::new()));
        let recorder = changes.clone();
        localizer.culture_changed().subscribe(move |change| recorder.lock().unwrap().push(*change));

        let previous = localizer.set_language(Language::Spanish);

        assert_eq!(previous, Language::English);
        assert_eq!(localizer.language(), Language::Spanish);
        assert_eq!(
            *changes.lock().unwrap(),
            vec![CultureChanged { previous: Language::English, current: Language::Spanish }]
        );
    }

    #[test]
    fn test_embedded_translations_cover_both_languages() {
        let localizer = Localizer::embedded(Language::English);

        assert_eq!(localizer.available_languages(), vec![Language::English, Language::Spanish]);
        assert!(!localizer.lookup_in("lang_current", Language::Spanish).starts_with("[MISSING"));
    }
}
