//! Supported languages for canonical content and translation overlays.
//!
//! The language set is a closed enumeration with one designated default:
//! canonical content is authored in German, and every other language is a
//! translation target. Nothing outside this module enumerates the variants
//! when computing targets, so adding a language is a one-file change.

use crate::error::ParseError;
use serde::{Deserialize, Serialize};

/// A supported content language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    De,
    En,
    Pt,
}

impl Language {
    /// All supported languages, default first.
    pub fn all() -> &'static [Language] {
        &[Language::De, Language::En, Language::Pt]
    }

    /// The default/source language canonical content is authored in.
    pub fn default_lang() -> Language {
        Language::De
    }

    /// Translation targets for a run originating in `source`: every
    /// supported language except `source` itself.
    pub fn targets(source: Language) -> Vec<Language> {
        Self::all()
            .iter()
            .copied()
            .filter(|l| *l != source)
            .collect()
    }

    /// ISO 639-1 code, used as the storage key for overlays and tasks.
    pub fn code(&self) -> &'static str {
        match self {
            Language::De => "de",
            Language::En => "en",
            Language::Pt => "pt",
        }
    }

    /// English name, used when building provider prompts.
    pub fn name(&self) -> &'static str {
        match self {
            Language::De => "German",
            Language::En => "English",
            Language::Pt => "Portuguese",
        }
    }

    /// Whether this is the default/source language.
    pub fn is_default(&self) -> bool {
        *self == Self::default_lang()
    }

    pub fn from_code(code: &str) -> Result<Language, ParseError> {
        match code.to_ascii_lowercase().as_str() {
            "de" => Ok(Language::De),
            "en" => Ok(Language::En),
            "pt" => Ok(Language::Pt),
            other => Err(ParseError::UnknownLanguage(other.to_string())),
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::default_lang()
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Code and Name Tests ====================

    #[test]
    fn test_language_codes() {
        assert_eq!(Language::De.code(), "de");
        assert_eq!(Language::En.code(), "en");
        assert_eq!(Language::Pt.code(), "pt");
    }

    #[test]
    fn test_language_names() {
        assert_eq!(Language::De.name(), "German");
        assert_eq!(Language::En.name(), "English");
        assert_eq!(Language::Pt.name(), "Portuguese");
    }

    #[test]
    fn test_display_matches_code() {
        assert_eq!(Language::Pt.to_string(), "pt");
    }

    // ==================== from_code Tests ====================

    #[test]
    fn test_from_code_valid() {
        assert_eq!(Language::from_code("de").unwrap(), Language::De);
        assert_eq!(Language::from_code("en").unwrap(), Language::En);
        assert_eq!(Language::from_code("pt").unwrap(), Language::Pt);
    }

    #[test]
    fn test_from_code_case_insensitive() {
        assert_eq!(Language::from_code("DE").unwrap(), Language::De);
        assert_eq!(Language::from_code("Pt").unwrap(), Language::Pt);
    }

    #[test]
    fn test_from_code_invalid() {
        assert!(Language::from_code("fr").is_err());
        assert!(Language::from_code("").is_err());
        assert!(Language::from_code("german").is_err());
    }

    // ==================== Default and Target Tests ====================

    #[test]
    fn test_default_lang_is_german() {
        assert_eq!(Language::default_lang(), Language::De);
        assert!(Language::De.is_default());
        assert!(!Language::En.is_default());
        assert!(!Language::Pt.is_default());
    }

    #[test]
    fn test_targets_exclude_source() {
        let targets = Language::targets(Language::De);
        assert_eq!(targets, vec![Language::En, Language::Pt]);
    }

    #[test]
    fn test_targets_from_non_default_source() {
        let targets = Language::targets(Language::En);
        assert_eq!(targets, vec![Language::De, Language::Pt]);
    }

    #[test]
    fn test_targets_count_generalizes() {
        // Every language has exactly N-1 targets.
        for lang in Language::all() {
            assert_eq!(Language::targets(*lang).len(), Language::all().len() - 1);
        }
    }
}
