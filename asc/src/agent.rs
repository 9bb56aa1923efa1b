//! Role-specialised agents
//!
//! Every agent makes the same kind of call: its role's system instruction,
//! the shared conversation so far, then one user turn. Only the role differs.

use tracing::{debug, info};

use crate::llm::{CompletionRequest, LlmClient, LlmError, Message};
use crate::memory::ConversationMemory;

/// Default response budget for agent calls
pub const AGENT_MAX_TOKENS: u32 = 4096;

/// Which job an agent does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentRole {
    Planner,
    RiskDetector,
    ReportGenerator,
}

impl AgentRole {
    /// Fixed system instruction identifying the role
    pub fn system_instruction(&self) -> &'static str {
        match self {
            Self::Planner => "You are a Sprint Planning Agent.",
            Self::RiskDetector => "You are a Risk Detection Agent.",
            Self::ReportGenerator => "You are a Report Generation Agent.",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Planner => "planner",
            Self::RiskDetector => "risk-detector",
            Self::ReportGenerator => "report-generator",
        }
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A single-call agent parametrised by role
#[derive(Debug, Clone)]
pub struct Agent {
    role: AgentRole,
    max_tokens: u32,
}

impl Agent {
    pub fn new(role: AgentRole) -> Self {
        Self {
            role,
            max_tokens: AGENT_MAX_TOKENS,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn role(&self) -> AgentRole {
        self.role
    }

    /// Build the chat request for one run
    pub fn build_request(&self, memory: &ConversationMemory, input: &str) -> CompletionRequest {
        let mut messages = memory.history().to_vec();
        messages.push(Message::user(input));
        CompletionRequest {
            system_prompt: self.role.system_instruction().to_string(),
            messages,
            max_tokens: self.max_tokens,
            temperature: None,
        }
    }

    /// Run the agent once and return the model's text
    ///
    /// Errors from the model call are returned unchanged.
    pub async fn run(&self, llm: &dyn LlmClient, memory: &ConversationMemory, input: &str) -> Result<String, LlmError> {
        debug!(role = %self.role, history_len = memory.len(), input_len = input.len(), "Agent::run: called");
        let request = self.build_request(memory, input);
        let reply = llm.invoke(request).await?;
        if reply.is_raw() {
            debug!(role = %self.role, "Agent::run: response had no text content, using raw form");
        }
        let text = reply.into_text();
        info!("{} agent produced {} chars", self.role, text.len());
        Ok(text)
    }
}
