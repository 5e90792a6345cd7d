//! Runtime configuration
//!
//! Settings are read from TOML, either from a single string (fixtures,
//! embedded defaults) or layered from a configuration directory:
//!
//! 1. `default.toml`
//! 2. `{env}.toml`
//! 3. `local.toml`
//! 4. `FOLIO__*` environment variables (`FOLIO__CONTENT__MAX_NAME_LENGTH=120`)

use std::collections::HashSet;
use std::path::Path;

use config as cfg;
use serde::{Deserialize, Serialize};

use crate::errors::{FolioError, Result};
use crate::model::culture::canonical_culture;
use crate::model::Language;

pub const DEFAULT_MAX_NAME_LENGTH: usize = 255;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub content: ContentSettings,
    #[serde(default = "default_languages")]
    pub languages: Vec<LanguageSettings>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentSettings {
    /// Overrides the language flagged `is_default`
    #[serde(default)]
    pub default_culture: Option<String>,
    #[serde(default = "default_max_name_length")]
    pub max_name_length: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageSettings {
    pub iso_code: String,
    pub name: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub is_mandatory: bool,
}

fn default_max_name_length() -> usize {
    DEFAULT_MAX_NAME_LENGTH
}

fn default_languages() -> Vec<LanguageSettings> {
    vec![LanguageSettings {
        iso_code: "en-US".to_string(),
        name: "English (United States)".to_string(),
        is_default: true,
        is_mandatory: false,
    }]
}

impl Default for ContentSettings {
    fn default() -> Self {
        Self {
            default_culture: None,
            max_name_length: DEFAULT_MAX_NAME_LENGTH,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            content: ContentSettings::default(),
            languages: default_languages(),
        }
    }
}

impl Settings {
    /// Parse and validate settings from a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load layered settings from `config_dir` for environment `env_name`
    ///
    /// Missing files are skipped.
    pub fn load_from_sources(config_dir: &Path, env_name: &str) -> Result<Self> {
        let settings: Settings = cfg::Config::builder()
            .add_source(cfg::File::from(config_dir.join("default.toml")).required(false))
            .add_source(
                cfg::File::from(config_dir.join(format!("{}.toml", env_name))).required(false),
            )
            .add_source(cfg::File::from(config_dir.join("local.toml")).required(false))
            .add_source(cfg::Environment::with_prefix("FOLIO").separator("__"))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.content.max_name_length == 0 {
            return Err(invalid("max_name_length must be positive"));
        }
        if self.languages.is_empty() {
            return Err(invalid("at least one language must be configured"));
        }

        let mut seen = HashSet::new();
        for language in &self.languages {
            let code = canonical_culture(&language.iso_code)?;
            if !seen.insert(code) {
                return Err(invalid(&format!(
                    "language '{}' is configured twice",
                    language.iso_code
                )));
            }
        }

        if self.languages.iter().filter(|l| l.is_default).count() > 1 {
            return Err(invalid("more than one language is flagged is_default"));
        }

        if let Some(default_culture) = &self.content.default_culture {
            let code = canonical_culture(default_culture)?;
            if !seen.contains(&code) {
                return Err(invalid(&format!(
                    "default_culture '{}' is not a configured language",
                    default_culture
                )));
            }
        }

        Ok(())
    }

    /// Configured languages with canonical codes and exactly one default
    pub fn languages(&self) -> Result<Vec<Language>> {
        let explicit_default = match &self.content.default_culture {
            Some(code) => Some(canonical_culture(code)?),
            None => None,
        };
        let flagged_any = self.languages.iter().any(|l| l.is_default);

        self.languages
            .iter()
            .enumerate()
            .map(|(index, l)| {
                let iso_code = canonical_culture(&l.iso_code)?;
                let is_default = match &explicit_default {
                    Some(code) => *code == iso_code,
                    None if flagged_any => l.is_default,
                    None => index == 0,
                };
                Ok(Language {
                    iso_code,
                    name: l.name.clone(),
                    is_default,
                    is_mandatory: l.is_mandatory,
                })
            })
            .collect()
    }
}

fn invalid(reason: &str) -> FolioError {
    FolioError::InvalidConfig {
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_LANGUAGES: &str = r#"
[content]
max_name_length = 100

[[languages]]
iso_code = "en-US"
name = "English (United States)"
is_default = true
is_mandatory = true

[[languages]]
iso_code = "fr-FR"
name = "French (France)"
"#;

    #[test]
    fn test_from_toml_str_reads_languages() {
        let settings = Settings::from_toml_str(TWO_LANGUAGES).expect("Should parse");
        assert_eq!(settings.content.max_name_length, 100);

        let languages = settings.languages().expect("Should resolve languages");
        assert_eq!(languages.len(), 2);
        assert_eq!(languages[0].iso_code, "en-us");
        assert!(languages[0].is_default);
        assert!(languages[0].is_mandatory);
        assert!(!languages[1].is_default);
    }

    #[test]
    fn test_default_culture_overrides_flag() {
        let toml = format!(
            "{}\n",
            TWO_LANGUAGES.replace("max_name_length = 100", "default_culture = \"fr-FR\"")
        );
        let settings = Settings::from_toml_str(&toml).expect("Should parse");
        let languages = settings.languages().expect("Should resolve languages");
        assert!(!languages[0].is_default);
        assert!(languages[1].is_default);
    }

    #[test]
    fn test_duplicate_language_rejected() {
        let toml = r#"
[[languages]]
iso_code = "en-US"
name = "English"

[[languages]]
iso_code = "EN-us"
name = "English again"
"#;
        let result = Settings::from_toml_str(toml);
        assert!(matches!(result, Err(FolioError::InvalidConfig { .. })));
    }

    #[test]
    fn test_unknown_default_culture_rejected() {
        let toml = r#"
[content]
default_culture = "de-DE"

[[languages]]
iso_code = "en-US"
name = "English"
"#;
        let result = Settings::from_toml_str(toml);
        assert!(matches!(result, Err(FolioError::InvalidConfig { .. })));
    }

    #[test]
    fn test_defaults_when_sections_missing() {
        let settings = Settings::from_toml_str("").expect("Should parse empty document");
        assert_eq!(settings.content.max_name_length, DEFAULT_MAX_NAME_LENGTH);
        assert_eq!(settings.languages.len(), 1);
    }

    #[test]
    fn test_load_from_sources_layers_files() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        std::fs::write(dir.path().join("default.toml"), TWO_LANGUAGES).expect("Should write");
        std::fs::write(
            dir.path().join("test.toml"),
            "[content]\nmax_name_length = 64\n",
        )
        .expect("Should write");

        let settings = Settings::load_from_sources(dir.path(), "test").expect("Should load");
        assert_eq!(settings.content.max_name_length, 64);
        assert_eq!(settings.languages.len(), 2);
    }
}
