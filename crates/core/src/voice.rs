//! Synthesis voice metadata

use serde::{Deserialize, Serialize};

/// Voice gender as reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VoiceGender {
    Female,
    Male,
    #[default]
    Unspecified,
}

/// One entry of the platform's synthesis voice list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceInfo {
    /// Platform voice name (e.g. "Google UK English Female")
    pub name: String,
    /// BCP-47 locale tag (e.g. "en-IN")
    pub locale: String,
    pub gender: VoiceGender,
}

impl VoiceInfo {
    pub fn new(name: impl Into<String>, locale: impl Into<String>, gender: VoiceGender) -> Self {
        Self {
            name: name.into(),
            locale: locale.into(),
            gender,
        }
    }

    /// Locale match ignoring region case ("en-in" matches "en-IN")
    pub fn matches_locale(&self, locale: &str) -> bool {
        self.locale.eq_ignore_ascii_case(locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_match_is_case_insensitive() {
        let voice = VoiceInfo::new("Test", "en-IN", VoiceGender::Female);
        assert!(voice.matches_locale("en-in"));
        assert!(voice.matches_locale("EN-IN"));
        assert!(!voice.matches_locale("hi-IN"));
    }
}
