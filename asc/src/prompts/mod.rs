//! Prompt Template System
//!
//! Template loading chain:
//! 1. `.autoscrum/prompts/{name}.txt` (user override)
//! 2. `prompts/{name}.txt` (configured prompts directory)
//! 3. Embedded fallback in code
//!
//! The sprint, risk and report templates use literal `{{TOKEN}}` placeholders
//! (see [`Placeholders`]). The question and follow-up templates use Handlebars.

pub mod embedded;
mod loader;
mod placeholders;

pub use loader::{FollowUpContext, QuestionContext, TemplateError, TemplateSource, TemplateStore};
pub use placeholders::Placeholders;
