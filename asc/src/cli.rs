//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use crate::config::LlmConfig;
use crate::session::Action;

/// AutoScrum - AI Scrum assistant for sprint planning and risk reports
#[derive(Parser)]
#[command(
    name = "asc",
    about = "Sprint plans, risk reports and summaries from a backlog CSV",
    version = env!("CARGO_PKG_VERSION"),
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute (defaults to the REPL)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the interactive session (default)
    Repl {
        /// Backlog CSV to load on startup
        #[arg(short, long)]
        backlog: Option<PathBuf>,
    },

    /// Run one action against a backlog and print the result (batch mode)
    Run {
        /// Action to run (plan, risk, summary)
        #[arg(value_name = "ACTION")]
        action: Action,

        /// Backlog CSV file
        #[arg(short, long)]
        backlog: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the sprint's working days
    Days {
        /// Number of working days
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },

    /// Show where each prompt template resolves from
    Templates,

    /// Show recent log lines
    Logs {
        /// Number of lines to show
        #[arg(short = 'n', long, default_value = "50")]
        lines: usize,
    },
}

/// Credential env var and whether it is set
pub struct CredentialCheck {
    pub env_var: String,
    pub present: bool,
}

impl CredentialCheck {
    pub fn check(env_var: &str) -> Self {
        debug!(env_var, "CredentialCheck::check: called");
        let present = std::env::var(env_var).map(|v| !v.trim().is_empty()).unwrap_or(false);
        Self {
            env_var: env_var.to_string(),
            present,
        }
    }
}

pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    let path = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("autoscrum")
        .join("logs")
        .join("autoscrum.log");
    debug!(?path, "get_log_path: returning path");
    path
}

pub fn generate_after_help(llm: &LlmConfig) -> String {
    debug!(provider = %llm.provider, "generate_after_help: called");
    let mut help = String::new();

    let check = CredentialCheck::check(llm.api_key_env());
    let icon = if check.present { "\u{2705}" } else { "\u{274C}" };
    let status = if check.present { "set" } else { "not set" };
    help.push_str(&format!("Credentials ({}):\n", llm.provider));
    help.push_str(&format!("  {} {:<18} {}\n", icon, check.env_var, status));

    help.push('\n');
    help.push_str(&format!("Logs are written to: {}\n", get_log_path().display()));
    help
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_command() {
        let cli = Cli::parse_from(["asc"]);
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_cli_parse_repl_with_backlog() {
        let cli = Cli::parse_from(["asc", "repl", "--backlog", "backlog.csv"]);
        match cli.command {
            Some(Command::Repl { backlog }) => assert_eq!(backlog, Some(PathBuf::from("backlog.csv"))),
            other => panic!("Expected Repl command, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_parse_run() {
        let cli = Cli::parse_from(["asc", "run", "risk", "-b", "backlog.csv"]);
        if let Some(Command::Run {
            action,
            backlog,
            format,
        }) = cli.command
        {
            assert_eq!(action, Action::RiskReport);
            assert_eq!(backlog, PathBuf::from("backlog.csv"));
            assert_eq!(format, OutputFormat::Text);
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn test_cli_parse_run_json() {
        let cli = Cli::parse_from(["asc", "run", "summary", "--backlog", "b.csv", "--format", "json"]);
        assert!(matches!(
            cli.command,
            Some(Command::Run {
                action: Action::SummaryReport,
                format: OutputFormat::Json,
                ..
            })
        ));
    }

    #[test]
    fn test_cli_run_rejects_unknown_action() {
        assert!(Cli::try_parse_from(["asc", "run", "deploy", "-b", "b.csv"]).is_err());
    }

    #[test]
    fn test_cli_run_requires_backlog() {
        assert!(Cli::try_parse_from(["asc", "run", "plan"]).is_err());
    }

    #[test]
    fn test_cli_parse_days() {
        let cli = Cli::parse_from(["asc", "days", "-n", "5"]);
        assert!(matches!(cli.command, Some(Command::Days { count: Some(5) })));
    }

    #[test]
    fn test_cli_global_flags() {
        let cli = Cli::parse_from(["asc", "templates", "-c", "/path/to/config.yml", "--log-level", "debug"]);
        assert_eq!(cli.config, Some(PathBuf::from("/path/to/config.yml")));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(matches!(cli.command, Some(Command::Templates)));
    }

    #[test]
    fn test_cli_parse_logs_default() {
        let cli = Cli::parse_from(["asc", "logs"]);
        assert!(matches!(cli.command, Some(Command::Logs { lines: 50 })));
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("plain".parse::<OutputFormat>(), Ok(OutputFormat::Text));
        assert!("table".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_log_path_location() {
        let path = get_log_path();
        assert!(path.ends_with("autoscrum/logs/autoscrum.log"));
    }

    #[test]
    fn test_after_help_mentions_log_path() {
        let help = generate_after_help(&LlmConfig::default());
        assert!(help.contains("OPENAI_API_KEY"));
        assert!(help.contains("autoscrum.log"));
    }

    #[test]
    fn test_after_help_reports_configured_key() {
        let llm = LlmConfig {
            api_key_env: Some("AUTOSCRUM_HELP_KEY".to_string()),
            ..Default::default()
        };
        let help = generate_after_help(&llm);
        assert!(help.contains("AUTOSCRUM_HELP_KEY"));
        assert!(!help.contains("OPENAI_API_KEY"));
        assert!(!help.contains("ANTHROPIC_API_KEY"));
    }

    #[test]
    fn test_after_help_follows_provider() {
        let llm = LlmConfig {
            provider: "anthropic".to_string(),
            ..Default::default()
        };
        let help = generate_after_help(&llm);
        assert!(help.contains("Credentials (anthropic)"));
        assert!(help.contains("ANTHROPIC_API_KEY"));
    }
}
