//! ScrumSession - the action flow over one loaded backlog
//!
//! Load a backlog, then pick actions: sprint planning stores a plan; risk and
//! summary reports require that plan. Free-form questions and follow-ups are
//! one-shot model calls that bypass the agents and the shared memory.

use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::agent::{Agent, AgentRole};
use crate::backlog::{Backlog, BacklogError};
use crate::calendar::WorkingDays;
use crate::config::Config;
use crate::llm::{CompletionRequest, LlmClient, LlmError};
use crate::memory::ConversationMemory;
use crate::prompts::{Placeholders, TemplateError, TemplateStore, embedded};
use crate::router::{GeneralClassifier, QueryClassifier, QueryKind};

/// Response budget for one-shot questions
const QUESTION_MAX_TOKENS: u32 = 2048;

pub const RISK_GUARD_WARNING: &str = "Please generate Sprint Plan first before running Risk Report.";
pub const SUMMARY_GUARD_WARNING: &str = "Please generate Sprint Plan first.";

/// Errors from session operations
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No backlog loaded. Load a backlog CSV first.")]
    NoBacklog,

    #[error("No result to follow up on. Run an action first.")]
    NoOutput,

    #[error(transparent)]
    Backlog(#[from] BacklogError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
}

/// The action selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    None,
    SprintPlanning,
    RiskReport,
    SummaryReport,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::None, Action::SprintPlanning, Action::RiskReport, Action::SummaryReport];

    pub fn label(&self) -> &'static str {
        match self {
            Action::None => "None",
            Action::SprintPlanning => "Sprint Planning",
            Action::RiskReport => "Risk Report",
            Action::SummaryReport => "Summary Report",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', '_'], " ");
        match normalized.as_str() {
            "none" => Ok(Action::None),
            "plan" | "sprint" | "sprint planning" | "sprint plan" => Ok(Action::SprintPlanning),
            "risk" | "risks" | "risk report" => Ok(Action::RiskReport),
            "summary" | "report" | "summary report" => Ok(Action::SummaryReport),
            _ => Err(format!("Unknown action: {}. Use: none, plan, risk, or summary", s)),
        }
    }
}

/// Where the session is in the action flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NoBacklog,
    BacklogLoaded,
    /// Backlog loaded, no action selected
    Idle,
    PlanGenerated,
    RiskGenerated,
    SummaryGenerated,
}

impl SessionState {
    /// Whether the last action left a result on screen
    pub fn has_result(self) -> bool {
        matches!(self, Self::PlanGenerated | Self::RiskGenerated | Self::SummaryGenerated)
    }
}

/// Result of running an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// `Action::None` was selected
    Idle,
    /// The action ran and produced text
    Completed { action: Action, output: String },
    /// The action's precondition failed; no model call was made
    Rejected { action: Action, warning: String },
}

/// One interactive session
pub struct ScrumSession {
    llm: Arc<dyn LlmClient>,
    templates: TemplateStore,
    working_days: WorkingDays,
    classifier: Box<dyn QueryClassifier>,
    memory: ConversationMemory,
    record_exchanges: bool,
    planner: Agent,
    risk_detector: Agent,
    report_generator: Agent,
    backlog: Option<Backlog>,
    backlog_text: String,
    sprint_plan: String,
    last_output: Option<String>,
    state: SessionState,
}

impl ScrumSession {
    pub fn new(llm: Arc<dyn LlmClient>, templates: TemplateStore, working_days: WorkingDays) -> Self {
        debug!(day_count = working_days.len(), "ScrumSession::new: called");
        Self {
            llm,
            templates,
            working_days,
            classifier: Box::new(GeneralClassifier),
            memory: ConversationMemory::new(),
            record_exchanges: true,
            planner: Agent::new(AgentRole::Planner),
            risk_detector: Agent::new(AgentRole::RiskDetector),
            report_generator: Agent::new(AgentRole::ReportGenerator),
            backlog: None,
            backlog_text: String::new(),
            sprint_plan: String::new(),
            last_output: None,
            state: SessionState::NoBacklog,
        }
    }

    /// Build a session from config, with templates rooted at `root`
    ///
    /// Working days are computed here, once, starting today.
    pub fn from_config(llm: Arc<dyn LlmClient>, config: &Config, root: impl AsRef<Path>) -> Self {
        let templates = TemplateStore::new(root, &config.prompts.dir);
        let working_days = WorkingDays::from_today(config.planning.working_days);
        let max_tokens = config.llm.max_tokens;
        let mut session = Self::new(llm, templates, working_days).with_record_exchanges(config.memory.record_exchanges);
        session.planner = session.planner.with_max_tokens(max_tokens);
        session.risk_detector = session.risk_detector.with_max_tokens(max_tokens);
        session.report_generator = session.report_generator.with_max_tokens(max_tokens);
        session
    }

    pub fn with_classifier(mut self, classifier: Box<dyn QueryClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_record_exchanges(mut self, record: bool) -> Self {
        self.record_exchanges = record;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn backlog(&self) -> Option<&Backlog> {
        self.backlog.as_ref()
    }

    pub fn backlog_text(&self) -> &str {
        &self.backlog_text
    }

    /// Current sprint plan; empty until the first successful planning action
    pub fn sprint_plan(&self) -> &str {
        &self.sprint_plan
    }

    pub fn last_output(&self) -> Option<&str> {
        self.last_output.as_deref()
    }

    pub fn working_days(&self) -> &WorkingDays {
        &self.working_days
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    pub fn templates(&self) -> &TemplateStore {
        &self.templates
    }

    /// Install a parsed backlog
    ///
    /// The sprint plan survives a reload; the last action result does not.
    pub fn set_backlog(&mut self, backlog: Backlog) -> &Backlog {
        info!("Backlog set: {} rows, {} columns", backlog.len(), backlog.headers().len());
        self.backlog_text = backlog.format_as_text();
        self.last_output = None;
        self.state = SessionState::BacklogLoaded;
        self.backlog.insert(backlog)
    }

    /// Load a backlog CSV file; on failure the session is left as it was
    pub fn load_backlog(&mut self, path: impl AsRef<Path>) -> Result<&Backlog, SessionError> {
        let backlog = Backlog::load(path)?;
        Ok(self.set_backlog(backlog))
    }

    /// Parse a backlog from any reader; on failure the session is left as it was
    pub fn load_backlog_from_reader<R: Read>(&mut self, reader: R) -> Result<&Backlog, SessionError> {
        let backlog = Backlog::parse(reader)?;
        Ok(self.set_backlog(backlog))
    }

    /// Answer a free-form question about the backlog
    ///
    /// A direct one-shot call: no agent, no shared memory.
    pub async fn ask_backlog(&self, question: &str) -> Result<String, SessionError> {
        debug!(question_len = question.len(), "ask_backlog: called");
        if self.backlog.is_none() {
            return Err(SessionError::NoBacklog);
        }

        let kind = self.classifier.classify(question);
        info!("Backlog question classified as {}", kind);
        let prompt = match kind {
            QueryKind::General => self.templates.backlog_question(&self.backlog_text, question)?,
        };

        self.one_shot(prompt).await
    }

    /// Ask a follow-up question about the most recent action result
    pub async fn follow_up(&self, question: &str) -> Result<String, SessionError> {
        debug!(question_len = question.len(), "follow_up: called");
        let response = match self.last_output.as_deref() {
            Some(output) if self.state.has_result() && !output.is_empty() => output,
            _ => return Err(SessionError::NoOutput),
        };

        let prompt = self.templates.follow_up(response, question)?;
        self.one_shot(prompt).await
    }

    async fn one_shot(&self, prompt: String) -> Result<String, SessionError> {
        let request = CompletionRequest::single("", prompt, QUESTION_MAX_TOKENS);
        let reply = self.llm.invoke(request).await?;
        Ok(reply.into_text())
    }

    /// Run the selected action
    pub async fn run_action(&mut self, action: Action) -> Result<ActionOutcome, SessionError> {
        debug!(%action, state = ?self.state, "run_action: called");
        let result = match action {
            Action::None => {
                self.last_output = None;
                if self.backlog.is_some() {
                    self.state = SessionState::Idle;
                }
                Ok(ActionOutcome::Idle)
            }
            Action::SprintPlanning => self.plan_sprint().await,
            Action::RiskReport => self.risk_report().await,
            Action::SummaryReport => self.summary_report().await,
        };
        // A failed action leaves nothing to follow up on
        if result.is_err() {
            self.last_output = None;
        }
        result
    }

    /// Generate a sprint plan from the backlog, replacing any previous plan
    pub async fn plan_sprint(&mut self) -> Result<ActionOutcome, SessionError> {
        debug!("plan_sprint: called");
        if self.backlog.is_none() {
            return Err(SessionError::NoBacklog);
        }

        let mut placeholders = self.working_days.placeholders();
        placeholders.insert(Placeholders::token("TASKS"), self.backlog_text.clone());
        let prompt = self.templates.render(embedded::SPRINT_NAME, &placeholders)?;

        let plan = self.run_agent(AgentRole::Planner, &prompt).await?;
        if !self.sprint_plan.is_empty() {
            info!("Replacing previous sprint plan");
        }
        self.sprint_plan = plan.clone();
        Ok(self.complete(Action::SprintPlanning, plan, SessionState::PlanGenerated))
    }

    /// Detect risks in the current sprint plan
    pub async fn risk_report(&mut self) -> Result<ActionOutcome, SessionError> {
        debug!("risk_report: called");
        if self.sprint_plan.is_empty() {
            warn!("Risk Report requested before a sprint plan exists");
            return Ok(ActionOutcome::Rejected {
                action: Action::RiskReport,
                warning: RISK_GUARD_WARNING.to_string(),
            });
        }

        let risks = self.detect_risks().await?;
        Ok(self.complete(Action::RiskReport, risks, SessionState::RiskGenerated))
    }

    /// Summarise the sprint plan together with a fresh risk analysis
    pub async fn summary_report(&mut self) -> Result<ActionOutcome, SessionError> {
        debug!("summary_report: called");
        if self.sprint_plan.is_empty() {
            warn!("Summary Report requested before a sprint plan exists");
            return Ok(ActionOutcome::Rejected {
                action: Action::SummaryReport,
                warning: SUMMARY_GUARD_WARNING.to_string(),
            });
        }

        // Risks are recomputed here, never taken from an earlier Risk Report
        let risks = self.detect_risks().await?;
        let combined = format!("Sprint Plan:\n{}\n\nRisks:\n{}", self.sprint_plan, risks);
        let placeholders = Placeholders::new().with(Placeholders::token("TASKS"), combined);
        let prompt = self.templates.render(embedded::REPORT_NAME, &placeholders)?;

        let report = self.run_agent(AgentRole::ReportGenerator, &prompt).await?;
        Ok(self.complete(Action::SummaryReport, report, SessionState::SummaryGenerated))
    }

    async fn detect_risks(&mut self) -> Result<String, SessionError> {
        let placeholders = Placeholders::new().with(Placeholders::token("TASKS"), self.sprint_plan.clone());
        let prompt = self.templates.render(embedded::RISK_NAME, &placeholders)?;
        self.run_agent(AgentRole::RiskDetector, &prompt).await
    }

    async fn run_agent(&mut self, role: AgentRole, prompt: &str) -> Result<String, SessionError> {
        let agent = match role {
            AgentRole::Planner => &self.planner,
            AgentRole::RiskDetector => &self.risk_detector,
            AgentRole::ReportGenerator => &self.report_generator,
        };
        let output = agent.run(self.llm.as_ref(), &self.memory, prompt).await?;
        if self.record_exchanges {
            self.memory.record_exchange(prompt, output.clone());
        }
        Ok(output)
    }

    fn complete(&mut self, action: Action, output: String, state: SessionState) -> ActionOutcome {
        info!("{} complete ({} chars)", action, output.len());
        self.last_output = Some(output.clone());
        self.state = state;
        ActionOutcome::Completed { action, output }
    }
}
