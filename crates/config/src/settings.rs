//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use ops_voice_core::VoiceGender;

use crate::ConfigError;

/// Top-level assistant settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantSettings {
    /// Recognition and synthesis locale (BCP-47)
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Language hint forwarded to the answer backend
    #[serde(default = "default_language")]
    pub language: String,

    /// Spoken when voice mode is activated
    #[serde(default = "default_greeting_line")]
    pub greeting_line: String,

    /// Spoken after an answered turn, before listening again
    #[serde(default = "default_followup_line")]
    pub followup_line: String,

    /// Shown when listening halts on a recognition error
    #[serde(default = "default_stopped_line")]
    pub stopped_line: String,

    /// Shown once when the platform has no speech recognition API
    #[serde(default = "default_unsupported_line")]
    pub unsupported_line: String,

    /// Appended when the answer backend fails
    #[serde(default = "default_apology_line")]
    pub apology_line: String,

    /// Bot acknowledgement for a routed navigation command
    #[serde(default = "default_navigation_ack_line")]
    pub navigation_ack_line: String,

    /// Spoken phrase that interrupts speech output (barge-in)
    #[serde(default = "default_interrupt_phrase")]
    pub interrupt_phrase: String,

    /// Ordered voice preference list for synthesis voice resolution
    #[serde(default = "default_voice_preferences")]
    pub voice_preferences: Vec<VoicePreference>,

    /// Ordered command-phrase to navigation-path mapping.
    /// First containment match wins, so keep more specific phrases first.
    #[serde(default = "default_commands")]
    pub commands: Vec<CommandMapping>,

    /// Phrases that close the assistant. Deliberately configurable: the set
    /// mixes languages and registers and deployments tune it.
    #[serde(default = "default_close_phrases")]
    pub close_phrases: Vec<String>,

    /// Answer/device-status backend endpoints
    #[serde(default)]
    pub backend: BackendConfig,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            language: default_language(),
            greeting_line: default_greeting_line(),
            followup_line: default_followup_line(),
            stopped_line: default_stopped_line(),
            unsupported_line: default_unsupported_line(),
            apology_line: default_apology_line(),
            navigation_ack_line: default_navigation_ack_line(),
            interrupt_phrase: default_interrupt_phrase(),
            voice_preferences: default_voice_preferences(),
            commands: default_commands(),
            close_phrases: default_close_phrases(),
            backend: BackendConfig::default(),
        }
    }
}

impl AssistantSettings {
    /// Load settings from the default locations:
    /// `ops-voice.toml` (optional) overlaid with `OPS_VOICE_*` env vars.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("ops-voice.toml")
    }

    /// Load settings from a specific file path plus the env overlay
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()).required(false))
            .add_source(Environment::with_prefix("OPS_VOICE").separator("__"))
            .build()?
            .try_deserialize::<AssistantSettings>()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.interrupt_phrase.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "interrupt_phrase must not be empty".to_string(),
            ));
        }
        for cmd in &self.commands {
            if cmd.phrase.trim().is_empty() || cmd.path.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "command mapping {:?} has an empty phrase or path",
                    cmd
                )));
            }
        }
        Ok(())
    }
}

/// One entry of the ordered synthesis voice preference list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoicePreference {
    /// Substring the platform voice name must contain (case-insensitive)
    pub name_contains: String,
    /// Required locale tag
    pub locale: String,
    /// Required gender, if any
    #[serde(default)]
    pub gender: Option<VoiceGender>,
}

/// One entry of the ordered command map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandMapping {
    /// Lowercase phrase matched by containment
    pub phrase: String,
    /// Navigation path executed on match
    pub path: String,
}

impl CommandMapping {
    pub fn new(phrase: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into(),
            path: path.into(),
        }
    }
}

/// Answer/device-status backend endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the REST backend
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the ask endpoint (POST)
    #[serde(default = "default_ask_path")]
    pub ask_path: String,

    /// Path of the device-status endpoint (GET)
    #[serde(default = "default_device_status_path")]
    pub device_status_path: String,

    /// HTTP request timeout in seconds. Applies to the HTTP client only;
    /// listening and speaking have no timeouts by design.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            ask_path: default_ask_path(),
            device_status_path: default_device_status_path(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_locale() -> String {
    "en-IN".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_greeting_line() -> String {
    "Hello! I am your assistant. How can I help you today?".to_string()
}

fn default_followup_line() -> String {
    "Is there anything else I can help you with?".to_string()
}

fn default_stopped_line() -> String {
    "Stopped listening. Tap the microphone to start again.".to_string()
}

fn default_unsupported_line() -> String {
    "Voice input is not supported on this device.".to_string()
}

fn default_apology_line() -> String {
    "Sorry, I could not fetch an answer right now. Please try again.".to_string()
}

fn default_navigation_ack_line() -> String {
    "Opening as requested!".to_string()
}

fn default_interrupt_phrase() -> String {
    "skip".to_string()
}

fn default_voice_preferences() -> Vec<VoicePreference> {
    vec![
        VoicePreference {
            name_contains: "Google".to_string(),
            locale: "en-IN".to_string(),
            gender: Some(VoiceGender::Female),
        },
        VoicePreference {
            name_contains: "Microsoft".to_string(),
            locale: "en-IN".to_string(),
            gender: Some(VoiceGender::Female),
        },
        VoicePreference {
            name_contains: "".to_string(),
            locale: "en-IN".to_string(),
            gender: None,
        },
    ]
}

fn default_commands() -> Vec<CommandMapping> {
    vec![
        CommandMapping::new("device master", "/device-master"),
        CommandMapping::new("branch master", "/branch-master"),
        CommandMapping::new("alert master", "/alerts"),
        CommandMapping::new("open dashboard", "/dashboard"),
        CommandMapping::new("dashboard", "/dashboard"),
        CommandMapping::new("reports", "/reports"),
    ]
}

fn default_close_phrases() -> Vec<String> {
    [
        "exit",
        "close assistant",
        "stop assistant",
        "band karo",
        "thank you",
        "bye",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_ask_path() -> String {
    "/api/assistant/ask".to_string()
}

fn default_device_status_path() -> String {
    "/api/devices/status".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = AssistantSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.locale, "en-IN");
        assert_eq!(settings.interrupt_phrase, "skip");
        assert!(!settings.commands.is_empty());
        assert!(settings
            .close_phrases
            .iter()
            .any(|p| p == "thank you"));
    }

    #[test]
    fn test_specific_commands_precede_general_ones() {
        // "open dashboard" must not be shadowed by "device master" etc, and
        // "dashboard" alone must come after "open dashboard".
        let commands = default_commands();
        let open_idx = commands
            .iter()
            .position(|c| c.phrase == "open dashboard")
            .unwrap();
        let bare_idx = commands.iter().position(|c| c.phrase == "dashboard").unwrap();
        assert!(open_idx < bare_idx);
    }

    #[test]
    fn test_deserialize_partial_toml() {
        let settings: AssistantSettings = toml::from_str(
            r#"
            locale = "hi-IN"
            interrupt_phrase = "ruko"

            [[commands]]
            phrase = "device master"
            path = "/device-master"
            "#,
        )
        .unwrap();
        assert_eq!(settings.locale, "hi-IN");
        assert_eq!(settings.interrupt_phrase, "ruko");
        assert_eq!(settings.commands.len(), 1);
        // Untouched fields fall back to defaults
        assert_eq!(settings.navigation_ack_line, "Opening as requested!");
    }

    #[test]
    fn test_empty_interrupt_phrase_rejected() {
        let mut settings = AssistantSettings::default();
        settings.interrupt_phrase = "  ".to_string();
        assert!(settings.validate().is_err());
    }
}
