//! Output formatting for CLI display
//!
//! The plan banner printed before any store access, so the operator can see
//! what is about to happen to which list.

use colored::Colorize;

use crate::request::{MutationRequest, Visibility};

/// Lines describing what a request will do
#[must_use]
pub fn plan_lines(request: &MutationRequest) -> Vec<String> {
    let mut lines = vec!["Beginning list edit:".to_string()];

    if let Some(mid) = &request.message_id {
        lines.push(format!("  - Message ID: {mid}"));
    }
    if let Some(source) = &request.source {
        let mode = if request.wildcard { " (wildcard)" } else { "" };
        lines.push(format!("  - List ID: {source}{mode}"));
    }
    if let Some(target) = &request.target {
        lines.push(format!("  - Target ID: {target}"));
    }
    match request.visibility {
        Some(Visibility::Public) => lines.push("  - Action: Mark all emails public".to_string()),
        Some(Visibility::Private) => lines.push("  - Action: Mark all emails private".to_string()),
        None => {}
    }
    if request.delete {
        lines.push("  - Action: Delete all matching emails".to_string());
    }
    if let Some(redact) = &request.redact {
        lines.push(format!(
            "  - Action: Obfuscate {redact:?} in body, subject and sender"
        ));
    }
    if let Some(description) = &request.description {
        lines.push(format!("  - Action: Set list description to {description:?}"));
    }
    lines
}

/// Print the plan banner
pub fn print_plan(request: &MutationRequest) {
    for line in plan_lines(request) {
        println!("{line}");
    }
    if request.dry_run {
        println!("{}", "Test mode: nothing will be written".yellow());
    }
}
