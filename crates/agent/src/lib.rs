//! Conversation orchestrator
//!
//! The top of the stack: [`VoiceAssistant`] drives the dual-mode (chat and
//! voice) conversation over the pipeline managers, the command router and
//! the dual-mode history store. The embedding application constructs one
//! assistant with its platform backends, subscribes to
//! [`AssistantEvent`]s, and calls the operation methods from its UI
//! handlers.

pub mod assistant;
pub mod history;
pub mod router;

pub use assistant::{AssistantBackends, AssistantEvent, VoiceAssistant};
pub use history::HistoryStore;
pub use router::CommandRouter;
