//! Interactive REPL over a ScrumSession

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{debug, warn};

use crate::llm::Role;
use crate::session::{Action, ActionOutcome, ScrumSession, SessionError};

/// Result of handling one command
enum SlashResult {
    Continue,
    Quit,
}

/// Line-oriented front end for one session
pub struct Repl {
    session: ScrumSession,
}

impl Repl {
    pub fn new(session: ScrumSession) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &ScrumSession {
        &self.session
    }

    /// Run the REPL main loop
    pub async fn run(&mut self, initial_backlog: Option<String>) -> Result<()> {
        self.print_welcome();

        if let Some(path) = initial_backlog {
            self.load(&path);
        }

        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        loop {
            let readline = rl.readline(&format!("{} ", "scrum>".bright_green()));

            match readline {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }

                    let _ = rl.add_history_entry(input);

                    if input.starts_with('/') {
                        match self.handle_slash_command(input).await {
                            SlashResult::Continue => continue,
                            SlashResult::Quit => break,
                        }
                    } else {
                        self.ask(input).await;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("{}", "AutoScrum: AI Scrum Assistant".bright_cyan().bold());
        println!(
            "Load a backlog with {}, then pick an action with {}",
            "/load <csv>".yellow(),
            "/action".yellow()
        );
        println!("Type {} for help, {} to quit", "/help".yellow(), "/quit".yellow());
        println!();
    }

    async fn handle_slash_command(&mut self, input: &str) -> SlashResult {
        let (cmd, rest) = match input.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd, rest.trim()),
            None => (input, ""),
        };
        debug!(%cmd, rest_len = rest.len(), "handle_slash_command: called");

        match cmd {
            "/help" | "/h" => self.print_help(),
            "/quit" | "/q" | "/exit" => return SlashResult::Quit,
            "/load" | "/l" => {
                if rest.is_empty() {
                    println!("Usage: {}", "/load <path-to-backlog.csv>".yellow());
                } else {
                    self.load(rest);
                }
            }
            "/backlog" | "/b" => self.print_backlog(),
            "/ask" | "/a" => {
                if rest.is_empty() {
                    println!("Usage: {}", "/ask <question>".yellow());
                } else {
                    self.ask(rest).await;
                }
            }
            "/action" => match rest.parse::<Action>() {
                Ok(action) => self.run_action(action).await,
                Err(_) if rest.is_empty() => self.print_actions(),
                Err(e) => println!("{} {}", "?".yellow(), e),
            },
            "/plan" => self.run_action(Action::SprintPlanning).await,
            "/risk" => self.run_action(Action::RiskReport).await,
            "/summary" => self.run_action(Action::SummaryReport).await,
            "/followup" | "/f" => {
                if rest.is_empty() {
                    println!("Usage: {}", "/followup <question>".yellow());
                } else {
                    self.follow_up(rest).await;
                }
            }
            "/days" => self.print_days(),
            "/history" => self.print_history(),
            "/status" => self.print_status(),
            _ => {
                println!("{} Unknown command: {}", "?".yellow(), cmd);
                println!("Type {} for available commands", "/help".yellow());
            }
        }
        SlashResult::Continue
    }

    fn load(&mut self, path: &str) {
        match self.session.load_backlog(path) {
            Ok(backlog) => {
                println!("{} Loaded {} backlog rows from {}", "✓".bright_green(), backlog.len(), path);
                println!();
                println!("{}", "Backlog Preview:".bright_cyan());
                println!("{}", backlog.render_table());
                println!();
            }
            Err(e) => {
                warn!("Failed to load backlog {}: {}", path, e);
                print_error(&e);
            }
        }
    }

    async fn ask(&self, question: &str) {
        thinking();
        match self.session.ask_backlog(question).await {
            Ok(answer) => print_result("AI Response", &answer),
            Err(e) => print_error(&e),
        }
    }

    async fn follow_up(&self, question: &str) {
        thinking();
        match self.session.follow_up(question).await {
            Ok(answer) => print_result("Follow-up Answer", &answer),
            Err(e) => print_error(&e),
        }
    }

    async fn run_action(&mut self, action: Action) {
        if action != Action::None {
            thinking();
        }
        match self.session.run_action(action).await {
            Ok(ActionOutcome::Idle) => println!("{}", "No action selected.".dimmed()),
            Ok(ActionOutcome::Completed { action, output }) => {
                print_result(action.label(), &output);
                println!("Ask a follow-up with {}", "/followup <question>".yellow());
            }
            Ok(ActionOutcome::Rejected { warning, .. }) => {
                println!("{} {}", "⚠️".yellow(), warning.yellow());
            }
            Err(e) => print_error(&e),
        }
    }

    fn print_help(&self) {
        println!();
        println!("{}", "Available Commands:".bright_cyan());
        println!("  {:22} Load a backlog CSV file", "/load <csv>".yellow());
        println!("  {:22} Show the loaded backlog", "/backlog".yellow());
        println!("  {:22} Ask a question about the backlog", "/ask <question>".yellow());
        println!("  {:22} Run an action (none, plan, risk, summary)", "/action <name>".yellow());
        println!("  {:22} Generate a sprint plan", "/plan".yellow());
        println!("  {:22} Detect risks in the sprint plan", "/risk".yellow());
        println!("  {:22} Summarise the plan and its risks", "/summary".yellow());
        println!("  {:22} Ask about the last result", "/followup <question>".yellow());
        println!("  {:22} Show the sprint working days", "/days".yellow());
        println!("  {:22} Show the agents' shared conversation", "/history".yellow());
        println!("  {:22} Show session state", "/status".yellow());
        println!("  {:22} Show this help", "/help".yellow());
        println!("  {:22} Exit the REPL", "/quit".yellow());
        println!();
        println!("Any line not starting with {} is asked as a backlog question.", "/".yellow());
        println!();
    }

    fn print_actions(&self) {
        println!();
        println!("{}", "Actions:".bright_cyan());
        for action in Action::ALL {
            println!("  {}", action.label());
        }
        println!();
    }

    fn print_backlog(&self) {
        match self.session.backlog() {
            Some(backlog) => {
                println!();
                println!("{}", backlog.render_table());
                println!();
            }
            None => println!("{}", "No backlog loaded.".dimmed()),
        }
    }

    fn print_days(&self) {
        println!();
        println!("{}", "Sprint Working Days:".bright_cyan());
        for (i, label) in self.session.working_days().labels().iter().enumerate() {
            println!("  {:>2}. {}", i + 1, label);
        }
        println!();
    }

    fn print_history(&self) {
        let history = self.session.memory().history();
        if history.is_empty() {
            println!("{}", "No conversation history.".dimmed());
            return;
        }

        println!();
        println!("{}", "Conversation History:".bright_cyan());
        for (i, msg) in history.iter().enumerate() {
            let role = match msg.role {
                Role::System => "System".bright_magenta(),
                Role::User => "User".bright_green(),
                Role::Assistant => "Assistant".bright_blue(),
            };
            let preview: String = msg.content.chars().take(60).collect();
            let preview = preview.replace('\n', " ");
            let ellipsis = if msg.content.chars().count() > 60 { "..." } else { "" };
            println!("  {}. {}: {}{}", i + 1, role, preview, ellipsis);
        }
        println!();
    }

    fn print_status(&self) {
        let session = &self.session;
        println!();
        println!("{}", "Session Status:".bright_cyan());
        println!("  State:       {:?}", session.state());
        match session.backlog() {
            Some(backlog) => println!("  Backlog:     {} rows", backlog.len()),
            None => println!("  Backlog:     {}", "none".dimmed()),
        }
        let plan = if session.sprint_plan().is_empty() {
            "none".dimmed().to_string()
        } else {
            format!("{} chars", session.sprint_plan().len())
        };
        println!("  Sprint plan: {}", plan);
        println!("  Memory:      {} messages", session.memory().len());
        println!();
    }
}

fn thinking() {
    println!("{}", "Thinking...".dimmed());
}

fn print_result(title: &str, text: &str) {
    println!();
    println!("{}", format!("{}:", title).bright_cyan().bold());
    println!("{}", text);
    println!();
}

fn print_error(err: &SessionError) {
    println!("{} {}", "Error:".bright_red(), err);
    if let Some(hint) = error_hint(err) {
        println!("{}", hint.yellow());
    }
}

/// Follow-up advice for provider failures the user can act on
fn error_hint(err: &SessionError) -> Option<String> {
    let SessionError::Llm(e) = err else {
        return None;
    };
    if e.is_auth() {
        Some("Check the API key for the configured provider.".to_string())
    } else if e.is_rate_limit() {
        let wait = e.retry_after().unwrap_or_default();
        Some(format!("The provider is rate limiting requests. Try again in {}s.", wait.as_secs()))
    } else {
        None
    }
}
