//! AutoScrum - AI Scrum assistant
//!
//! CLI entry point: interactive session by default, plus batch commands.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use clap::{CommandFactory, FromArgMatches};
use colored::Colorize;
use eyre::{Context, Result};
use tracing::{debug, info, warn};

use autoscrum::calendar::WorkingDays;
use autoscrum::cli::{Cli, Command, OutputFormat, generate_after_help, get_log_path};
use autoscrum::config::Config;
use autoscrum::llm::create_client;
use autoscrum::prompts::{TemplateStore, embedded};
use autoscrum::repl::Repl;
use autoscrum::session::{Action, ActionOutcome, ScrumSession};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Logging is not initialized yet, so nothing here can be traced
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("autoscrum")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("autoscrum.log"))
        .context("Failed to open log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional; a real environment variable always wins
    let dotenv = dotenvy::dotenv();

    // --config is not parsed yet, so help reflects the default config chain
    let help_config = Config::load(None).unwrap_or_default();
    let cmd = Cli::command().after_help(generate_after_help(&help_config.llm));
    let cli = Cli::from_arg_matches(&cmd.get_matches())?;

    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    match dotenv {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => debug!("main: no .env file found"),
        Err(e) => warn!("Failed to read .env file: {}", e),
    }

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(
        "AutoScrum loaded config: provider={} model={}",
        config.llm.provider,
        config.llm.model()
    );

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        None => cmd_repl(&config, None).await,
        Some(Command::Repl { backlog }) => cmd_repl(&config, backlog).await,
        Some(Command::Run {
            action,
            backlog,
            format,
        }) => cmd_run(&config, action, &backlog, format).await,
        Some(Command::Days { count }) => cmd_days(&config, count),
        Some(Command::Templates) => cmd_templates(&config),
        Some(Command::Logs { lines }) => cmd_logs(lines),
    }
}

/// Exit with status 1 unless the model credential is available
fn require_credentials(config: &Config) {
    debug!(env_var = %config.llm.api_key_env(), "require_credentials: called");
    if config.llm.api_key().is_err() {
        warn!("Credential {} is not set", config.llm.api_key_env());
        eprintln!(
            "{}",
            format!("❌ Please set your {} in the .env file.", config.llm.api_key_env()).bright_red()
        );
        std::process::exit(1);
    }
}

fn build_session(config: &Config) -> Result<ScrumSession> {
    require_credentials(config);
    config.validate()?;

    let llm = create_client(&config.llm).context("Failed to create LLM client")?;
    let root = std::env::current_dir().context("Failed to read working directory")?;
    Ok(ScrumSession::from_config(llm, config, root))
}

async fn cmd_repl(config: &Config, backlog: Option<PathBuf>) -> Result<()> {
    debug!(?backlog, "cmd_repl: called");
    let session = build_session(config)?;
    let mut repl = Repl::new(session);
    repl.run(backlog.map(|p| p.display().to_string())).await
}

/// Run one action to completion, generating the sprint plan first when needed
async fn cmd_run(config: &Config, action: Action, backlog: &Path, format: OutputFormat) -> Result<()> {
    debug!(%action, ?backlog, %format, "cmd_run: called");
    if action == Action::None {
        return Err(eyre::eyre!("Nothing to run. Use: plan, risk, or summary"));
    }

    let mut session = build_session(config)?;
    session
        .load_backlog(backlog)
        .context(format!("Failed to load backlog {}", backlog.display()))?;

    let plan = expect_output(session.run_action(Action::SprintPlanning).await?)?;
    let output = if action == Action::SprintPlanning {
        plan
    } else {
        expect_output(session.run_action(action).await?)?
    };

    match format {
        OutputFormat::Text => println!("{}", output),
        OutputFormat::Json => {
            let json = serde_json::json!({
                "action": action.label(),
                "working_days": session.working_days().labels(),
                "output": output,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }
    Ok(())
}

fn expect_output(outcome: ActionOutcome) -> Result<String> {
    match outcome {
        ActionOutcome::Completed { output, .. } => Ok(output),
        ActionOutcome::Rejected { warning, .. } => Err(eyre::eyre!(warning)),
        ActionOutcome::Idle => Err(eyre::eyre!("No action selected")),
    }
}

fn cmd_days(config: &Config, count: Option<usize>) -> Result<()> {
    let count = count.unwrap_or(config.planning.working_days);
    debug!(count, "cmd_days: called");
    if count == 0 {
        return Err(eyre::eyre!("Working day count must be at least 1"));
    }

    for (i, label) in WorkingDays::from_today(count).labels().iter().enumerate() {
        println!("{:>2}. {}", i + 1, label);
    }
    Ok(())
}

fn cmd_templates(config: &Config) -> Result<()> {
    debug!(prompts_dir = ?config.prompts.dir, "cmd_templates: called");
    let root = std::env::current_dir().context("Failed to read working directory")?;
    let store = TemplateStore::new(root, &config.prompts.dir);

    for name in embedded::ALL {
        match store.source(name) {
            Some(source) => println!("{:<18} {}", name, source),
            None => println!("{:<18} {}", name, "missing".bright_red()),
        }
    }
    Ok(())
}

fn cmd_logs(lines: usize) -> Result<()> {
    debug!(lines, "cmd_logs: called");
    let log_path = get_log_path();

    if !log_path.exists() {
        println!("No log file found at: {}", log_path.display());
        return Ok(());
    }

    let file = fs::File::open(&log_path).context("Failed to open log file")?;
    let all_lines: Vec<String> = BufReader::new(file).lines().map_while(Result::ok).collect();
    let start = all_lines.len().saturating_sub(lines);

    for line in &all_lines[start..] {
        println!("{}", line);
    }
    Ok(())
}
