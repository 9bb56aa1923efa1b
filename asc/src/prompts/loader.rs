//! Prompt Loader
//!
//! Loads prompt templates from files or falls back to embedded defaults.

use std::path::{Path, PathBuf};

use handlebars::Handlebars;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use super::Placeholders;
use super::embedded;

/// File extension of prompt templates on disk
const TEMPLATE_EXT: &str = "txt";

/// Errors from loading or rendering a template
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Prompt template not found: {0}")]
    NotFound(String),

    #[error("Failed to read prompt {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to render template {name}: {message}")]
    Render { name: String, message: String },
}

/// Where a template name resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    User(PathBuf),
    Repo(PathBuf),
    Embedded,
}

impl std::fmt::Display for TemplateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User(path) => write!(f, "user override ({})", path.display()),
            Self::Repo(path) => write!(f, "prompts dir ({})", path.display()),
            Self::Embedded => write!(f, "embedded"),
        }
    }
}

/// Context for the free-form backlog question template
#[derive(Debug, Clone, Serialize)]
pub struct QuestionContext<'a> {
    pub backlog: &'a str,
    pub question: &'a str,
}

/// Context for the follow-up question template
#[derive(Debug, Clone, Serialize)]
pub struct FollowUpContext<'a> {
    pub response: &'a str,
    pub question: &'a str,
}

/// Loads and renders prompt templates
pub struct TemplateStore {
    /// Handlebars engine for the named-variable templates
    hbs: Handlebars<'static>,
    /// User override directory (e.g., `.autoscrum/prompts/`)
    user_dir: Option<PathBuf>,
    /// Configured prompts directory (e.g., `prompts/`)
    repo_dir: Option<PathBuf>,
}

impl TemplateStore {
    /// Create a template store rooted at `root`
    ///
    /// `prompts_dir` is taken relative to `root` unless it is absolute.
    pub fn new(root: impl AsRef<Path>, prompts_dir: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        debug!(?root, prompts_dir = ?prompts_dir.as_ref(), "TemplateStore::new: called");
        let user_dir = root.join(".autoscrum/prompts");
        let repo_dir = root.join(prompts_dir);

        let user_dir_exists = user_dir.is_dir();
        let repo_dir_exists = repo_dir.is_dir();
        debug!(
            ?user_dir,
            %user_dir_exists,
            ?repo_dir,
            %repo_dir_exists,
            "TemplateStore::new: checking directories"
        );

        Self {
            hbs: Self::engine(),
            user_dir: user_dir_exists.then_some(user_dir),
            repo_dir: repo_dir_exists.then_some(repo_dir),
        }
    }

    /// Create a store that only uses embedded prompts (for testing)
    pub fn embedded_only() -> Self {
        debug!("TemplateStore::embedded_only: called");
        Self {
            hbs: Self::engine(),
            user_dir: None,
            repo_dir: None,
        }
    }

    fn engine() -> Handlebars<'static> {
        let mut hbs = Handlebars::new();
        // Prompts are plain text, not HTML
        hbs.register_escape_fn(handlebars::no_escape);
        hbs
    }

    /// Find where a template would be loaded from
    ///
    /// Checks in order:
    /// 1. User override: `.autoscrum/prompts/{name}.txt`
    /// 2. Prompts directory: `prompts/{name}.txt`
    /// 3. Embedded fallback
    pub fn source(&self, name: &str) -> Option<TemplateSource> {
        debug!(%name, "TemplateStore::source: called");
        let file_name = format!("{}.{}", name, TEMPLATE_EXT);

        if let Some(path) = self.user_dir.as_ref().map(|d| d.join(&file_name))
            && path.is_file()
        {
            return Some(TemplateSource::User(path));
        }

        if let Some(path) = self.repo_dir.as_ref().map(|d| d.join(&file_name))
            && path.is_file()
        {
            return Some(TemplateSource::Repo(path));
        }

        embedded::get_embedded(name).map(|_| TemplateSource::Embedded)
    }

    /// Load a template by name
    pub fn load(&self, name: &str) -> Result<String, TemplateError> {
        debug!(%name, "TemplateStore::load: called");
        match self.source(name) {
            Some(TemplateSource::User(path)) | Some(TemplateSource::Repo(path)) => {
                debug!(?path, "TemplateStore::load: reading from disk");
                std::fs::read_to_string(&path).map_err(|source| TemplateError::Io { path, source })
            }
            Some(TemplateSource::Embedded) => {
                debug!(%name, "TemplateStore::load: using embedded");
                embedded::get_embedded(name)
                    .map(str::to_string)
                    .ok_or_else(|| TemplateError::NotFound(name.to_string()))
            }
            None => {
                debug!(%name, "TemplateStore::load: not found anywhere");
                Err(TemplateError::NotFound(name.to_string()))
            }
        }
    }

    /// Load a template and substitute literal placeholders
    pub fn render(&self, name: &str, placeholders: &Placeholders) -> Result<String, TemplateError> {
        let template = self.load(name)?;
        info!("Rendering template '{}' with {} placeholders", name, placeholders.len());
        Ok(placeholders.apply(&template))
    }

    /// Load a template and render it with Handlebars
    pub fn render_with<T: Serialize>(&self, name: &str, context: &T) -> Result<String, TemplateError> {
        let template = self.load(name)?;
        debug!(%name, "TemplateStore::render_with: rendering template with handlebars");
        self.hbs
            .render_template(&template, context)
            .map_err(|e| TemplateError::Render {
                name: name.to_string(),
                message: e.to_string(),
            })
    }

    /// Render the free-form backlog question prompt
    pub fn backlog_question(&self, backlog: &str, question: &str) -> Result<String, TemplateError> {
        self.render_with(embedded::BACKLOG_QUESTION_NAME, &QuestionContext { backlog, question })
    }

    /// Render the follow-up question prompt
    pub fn follow_up(&self, response: &str, question: &str) -> Result<String, TemplateError> {
        self.render_with(embedded::FOLLOW_UP_NAME, &FollowUpContext { response, question })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_embedded() {
        let store = TemplateStore::embedded_only();
        let sprint = store.load("sprint").unwrap();
        assert!(sprint.contains("{{TASKS}}"));
        assert_eq!(store.source("risk"), Some(TemplateSource::Embedded));
    }

    #[test]
    fn test_load_unknown_template() {
        let store = TemplateStore::embedded_only();
        let err = store.load("nonexistent-template").unwrap_err();
        assert!(matches!(err, TemplateError::NotFound(ref n) if n == "nonexistent-template"));
        assert!(store.source("nonexistent-template").is_none());
    }

    #[test]
    fn test_repo_dir_overrides_embedded() {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("prompts")).unwrap();
        fs::write(root.path().join("prompts/risk.txt"), "custom risk {{TASKS}}").unwrap();

        let store = TemplateStore::new(root.path(), "prompts");
        assert_eq!(store.load("risk").unwrap(), "custom risk {{TASKS}}");
        assert!(matches!(store.source("risk"), Some(TemplateSource::Repo(_))));
        // Templates missing on disk still fall back
        assert_eq!(store.source("report"), Some(TemplateSource::Embedded));
    }

    #[test]
    fn test_user_dir_overrides_repo_dir() {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("prompts")).unwrap();
        fs::create_dir_all(root.path().join(".autoscrum/prompts")).unwrap();
        fs::write(root.path().join("prompts/sprint.txt"), "repo").unwrap();
        fs::write(root.path().join(".autoscrum/prompts/sprint.txt"), "user").unwrap();

        let store = TemplateStore::new(root.path(), "prompts");
        assert_eq!(store.load("sprint").unwrap(), "user");
    }

    #[test]
    fn test_disk_only_template() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("my-prompts");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("retro.txt"), "What went well in {{TASKS}}?").unwrap();

        let store = TemplateStore::new(root.path(), &dir);
        let rendered = store
            .render("retro", &Placeholders::new().with("{{TASKS}}", "sprint 4"))
            .unwrap();
        assert_eq!(rendered, "What went well in sprint 4?");
    }

    #[test]
    fn test_render_substitutes_tasks() {
        let store = TemplateStore::embedded_only();
        let rendered = store
            .render("risk", &Placeholders::new().with("{{TASKS}}", "Day 1: Fix login bug"))
            .unwrap();
        assert!(rendered.contains("Day 1: Fix login bug"));
        assert!(!rendered.contains("{{TASKS}}"));
    }

    #[test]
    fn test_backlog_question_is_not_html_escaped() {
        let store = TemplateStore::embedded_only();
        let prompt = store
            .backlog_question("Fix <login> & logout, High", "What's first?")
            .unwrap();
        assert!(prompt.contains("Backlog:\nFix <login> & logout, High"));
        assert!(prompt.contains("User's Question:\nWhat's first?"));
        assert!(prompt.trim_end().ends_with("Answer:"));
    }

    #[test]
    fn test_follow_up_prompt() {
        let store = TemplateStore::embedded_only();
        let prompt = store.follow_up("Day 1: Fix login bug", "Why first?").unwrap();
        assert!(prompt.contains("Response:\nDay 1: Fix login bug"));
        assert!(prompt.contains("Follow-up Question:\nWhy first?"));
    }

    #[test]
    fn test_render_error_from_broken_override() {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("prompts")).unwrap();
        fs::write(root.path().join("prompts/follow-up.txt"), "{{#if response}}unclosed").unwrap();

        let store = TemplateStore::new(root.path(), "prompts");
        let err = store.follow_up("x", "y").unwrap_err();
        assert!(matches!(err, TemplateError::Render { .. }));
    }
}
