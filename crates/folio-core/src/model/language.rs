use serde::{Deserialize, Serialize};

/// A configured language. `iso_code` is canonical (lowercase).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub iso_code: String,
    pub name: String,
    pub is_default: bool,
    pub is_mandatory: bool,
}

impl Language {
    pub fn new(iso_code: &str, name: &str) -> Self {
        Self {
            iso_code: iso_code.to_lowercase(),
            name: name.to_string(),
            is_default: false,
            is_mandatory: false,
        }
    }

    pub fn default_language(mut self) -> Self {
        self.is_default = true;
        self
    }

    pub fn mandatory(mut self) -> Self {
        self.is_mandatory = true;
        self
    }
}

/// The default culture code among `languages`, if any
pub fn default_culture(languages: &[Language]) -> Option<&str> {
    languages
        .iter()
        .find(|l| l.is_default)
        .map(|l| l.iso_code.as_str())
}

/// Comma separated display names of `cultures`, in configuration order
pub fn display_names<'a, I>(languages: &[Language], cultures: I) -> String
where
    I: IntoIterator<Item = &'a String>,
{
    let wanted: Vec<&String> = cultures.into_iter().collect();
    languages
        .iter()
        .filter(|l| wanted.iter().any(|c| **c == l.iso_code))
        .map(|l| l.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
