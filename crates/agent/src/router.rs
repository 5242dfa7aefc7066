//! Command router
//!
//! Maps a normalized utterance to a navigation path, or recognizes a close
//! phrase. Matching is ordered containment over lowercased text: the first
//! mapping whose phrase occurs anywhere in the utterance wins, so the
//! configured list keeps more specific phrases ahead of general ones
//! ("open dashboard" before "dashboard"). The orchestrator always checks
//! navigation before close, so "close the dashboard" navigates rather than
//! exits.

use ops_voice_config::CommandMapping;

/// Ordered containment matcher over the configured command map
pub struct CommandRouter {
    commands: Vec<CommandMapping>,
    close_phrases: Vec<String>,
}

impl CommandRouter {
    pub fn new(commands: Vec<CommandMapping>, close_phrases: Vec<String>) -> Self {
        Self {
            commands: commands
                .into_iter()
                .map(|c| CommandMapping {
                    phrase: c.phrase.to_lowercase(),
                    path: c.path,
                })
                .collect(),
            close_phrases: close_phrases.into_iter().map(|p| p.to_lowercase()).collect(),
        }
    }

    /// First command mapping whose phrase is contained in the utterance
    pub fn route(&self, utterance: &str) -> Option<&str> {
        let lowered = utterance.to_lowercase();
        self.commands
            .iter()
            .find(|cmd| lowered.contains(&cmd.phrase))
            .map(|cmd| cmd.path.as_str())
    }

    /// Whether the utterance contains any configured close phrase
    pub fn is_close_command(&self, utterance: &str) -> bool {
        let lowered = utterance.to_lowercase();
        self.close_phrases.iter().any(|p| lowered.contains(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> CommandRouter {
        CommandRouter::new(
            vec![
                CommandMapping::new("device master", "/device-master"),
                CommandMapping::new("open dashboard", "/dashboard"),
                CommandMapping::new("dashboard", "/dashboard"),
            ],
            vec!["exit".to_string(), "thank you".to_string()],
        )
    }

    #[test]
    fn test_containment_match_is_case_insensitive() {
        let r = router();
        assert_eq!(r.route("please OPEN Dashboard now"), Some("/dashboard"));
        assert_eq!(r.route("Device Master"), Some("/device-master"));
        assert_eq!(r.route("show me the weather"), None);
    }

    #[test]
    fn test_first_match_wins_for_overlapping_phrases() {
        let r = router();
        // Both "open dashboard" and "dashboard" are contained; the earlier
        // (more specific) mapping is the one that fires.
        assert_eq!(r.route("open dashboard"), Some("/dashboard"));
        // A bare mention still matches the general entry.
        assert_eq!(r.route("go to dashboard"), Some("/dashboard"));
    }

    #[test]
    fn test_close_phrases() {
        let r = router();
        assert!(r.is_close_command("okay thank you"));
        assert!(r.is_close_command("EXIT"));
        assert!(!r.is_close_command("how many devices"));
    }

    #[test]
    fn test_route_and_close_can_both_match() {
        // "exit" is a close phrase but the utterance also names a command.
        // The router reports both; precedence (navigation first) is the
        // orchestrator's call.
        let r = router();
        assert_eq!(r.route("exit the dashboard"), Some("/dashboard"));
        assert!(r.is_close_command("exit the dashboard"));
    }
}
