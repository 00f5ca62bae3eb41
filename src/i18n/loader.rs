use std::{collections::HashMap, path::Path};

use serde_yaml::Value;
use tracing::{Level, event};

use super::{Language, TextMap};
use crate::domain::constant::localization;

/// Translations compiled into the binary
pub fn embedded_texts(lang: Language) -> &'static str {
    match lang {
        Language::English => include_str!("../../config/i18n/en.yaml"),
        Language::Spanish => include_str!("../../config/i18n/es.yaml")
    }
}

fn parse_texts(content: &str) -> Result<TextMap, serde_yaml::Error> {
    let yaml_map: HashMap<String, Value> = serde_yaml::from_str(content)?;
    Ok(yaml_map.into_iter().filter_map(|(k, v)| if let Value::String(s) = v { Some((k, s)) } else { None }).collect())
}

/// Load text mappings for a specific language.
///
/// Reads `<i18n_dir>/<code>.yaml` when present and valid, otherwise the embedded file.
pub fn load_language_texts(lang: Language, i18n_dir: Option<&Path>) -> TextMap {
    if let Some(i18n_dir) = i18n_dir {
        let path = i18n_dir.join(format!("{}.yaml", lang.code()));

        if let Ok(content) = std::fs::read_to_string(&path) {
            match parse_texts(&content) {
                Ok(texts) => {
                    event!(Level::DEBUG, event = localization::TRANSLATIONS_LOADED,
                           language = %lang, path = %path.display(), keys = texts.len());
                    return texts;
                }
                Err(e) => {
                    event!(Level::WARN, event = localization::TRANSLATIONS_INVALID,
                           language = %lang, path = %path.display(), error = %e);
                }
            }
        }
    }

    match parse_texts(embedded_texts(lang)) {
        Ok(texts) => texts,
        Err(e) => {
            event!(Level::WARN, event = localization::TRANSLATIONS_INVALID, language = %lang, path = "embedded", error = %e);
            HashMap::new()
        }
    }
}
