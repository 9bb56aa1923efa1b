//! Embedded prompts
//!
//! These are compiled into the binary from the .txt files at build time.

use tracing::debug;

pub const SPRINT_NAME: &str = "sprint";
pub const RISK_NAME: &str = "risk";
pub const REPORT_NAME: &str = "report";
pub const BACKLOG_QUESTION_NAME: &str = "backlog-question";
pub const FOLLOW_UP_NAME: &str = "follow-up";

/// Sprint planning prompt
pub const SPRINT: &str = include_str!("../../prompts/sprint.txt");

/// Risk detection prompt
pub const RISK: &str = include_str!("../../prompts/risk.txt");

/// Summary report prompt
pub const REPORT: &str = include_str!("../../prompts/report.txt");

/// Free-form backlog question prompt (Handlebars)
pub const BACKLOG_QUESTION: &str = include_str!("../../prompts/backlog-question.txt");

/// Follow-up question prompt (Handlebars)
pub const FOLLOW_UP: &str = include_str!("../../prompts/follow-up.txt");

/// Every template name the application uses
pub const ALL: [&str; 5] = [SPRINT_NAME, RISK_NAME, REPORT_NAME, BACKLOG_QUESTION_NAME, FOLLOW_UP_NAME];

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        SPRINT_NAME => Some(SPRINT),
        RISK_NAME => Some(RISK),
        REPORT_NAME => Some(REPORT),
        BACKLOG_QUESTION_NAME => Some(BACKLOG_QUESTION),
        FOLLOW_UP_NAME => Some(FOLLOW_UP),
        _ => {
            debug!("get_embedded: no match found");
            None
        }
    }
}
