//! AutoScrum - AI Scrum assistant
//!
//! Turns a backlog CSV into a sprint plan, a risk report on that plan, and a
//! summary of both, by driving a chat model through role-specialised agents
//! that share one conversation memory.
//!
//! # Modules
//!
//! - [`backlog`] - CSV backlog parsing and flattening to prompt text
//! - [`calendar`] - Working-day calendar and its prompt placeholders
//! - [`prompts`] - Template lookup, placeholder substitution, rendering
//! - [`llm`] - LLM client trait with OpenAI and Anthropic implementations
//! - [`memory`] - Conversation memory shared by the agents
//! - [`agent`] - Role-parametrised agent
//! - [`router`] - Question classification
//! - [`session`] - The action flow over one loaded backlog
//! - [`repl`] - Interactive terminal front end
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod agent;
pub mod backlog;
pub mod calendar;
pub mod cli;
pub mod config;
pub mod llm;
pub mod memory;
pub mod prompts;
pub mod repl;
pub mod router;
pub mod session;

// Re-export commonly used types
pub use agent::{Agent, AgentRole};
pub use backlog::{Backlog, BacklogError, format_backlog_as_text};
pub use calendar::{WorkingDays, get_working_days};
pub use config::{Config, LlmConfig};
pub use llm::{
    AnthropicClient, CompletionRequest, CompletionResponse, LlmClient, LlmError, Message, ModelReply, OpenAIClient,
    Role, create_client,
};
pub use memory::ConversationMemory;
pub use prompts::{Placeholders, TemplateError, TemplateSource, TemplateStore};
pub use router::{GeneralClassifier, QueryClassifier, QueryKind};
pub use session::{Action, ActionOutcome, ScrumSession, SessionError, SessionState};
