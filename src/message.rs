use std::env;
use std::fs;
use std::process::Command;

use crate::error::{Result, SageError};
use crate::llm::prompts::QA_NOT_REQUIRED;
use crate::parse::StructuredResult;

const SECTION_RELATED: &str = "## Related issues or context";

/// Fixed commit-message template.
pub fn assemble_commit(result: &StructuredResult) -> String {
    format!("{}: {}\n\n{}", result.category, result.summary, result.body)
}

/// Render a ticket token, as a tracker link when a base URL is configured.
pub fn format_ticket_link(ticket: &str, base_url: Option<&str>) -> String {
    match base_url {
        Some(base) => format!("[{ticket}]({}/{ticket})", base.trim_end_matches('/')),
        None => ticket.to_string(),
    }
}

/// Build the final PR body from the parsed description.
///
/// A description that already carries markdown sections is kept as-is with
/// the ticket link slotted under "Related issues or context" (the section
/// is created when missing). Anything else is wrapped into the full
/// three-section template.
pub fn assemble_pr_body(
    result: &StructuredResult,
    ticket: Option<&str>,
    ticket_url: Option<&str>,
) -> String {
    let ticket_line = ticket.map(|t| format!("- {}", format_ticket_link(t, ticket_url)));
    let body = result.body.trim();

    if body.starts_with("## ") || body.contains("\n## ") {
        let mut out = body.to_string();
        if let Some(line) = ticket_line {
            if let Some(pos) = out.find(SECTION_RELATED) {
                match out[pos..].find('\n') {
                    Some(i) => out.insert_str(pos + i + 1, &format!("{line}\n")),
                    None => {
                        out.push('\n');
                        out.push_str(&line);
                    }
                }
            } else {
                out.push_str(&format!("\n\n{SECTION_RELATED}\n{line}"));
            }
        }
        return out;
    }

    let related = ticket_line.unwrap_or_else(|| "None".to_string());
    format!(
        "## Description\n{body}\n\n{SECTION_RELATED}\n{related}\n\n## QA\n{QA_NOT_REQUIRED}"
    )
}

/// Display text handed to the editor on the PR path; `parse_edited_pr`
/// understands exactly this shape.
pub fn pr_edit_buffer(title: &str, body: &str) -> String {
    format!("title: {title}\ndescription:\n{body}\n")
}

/// Outcome of the human-in-the-loop editing step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edited {
    Accepted(String),
    Cancelled,
}

/// Synchronous human-in-the-loop hook. The production implementation
/// shells out to an external editor; tests substitute a scripted double.
pub trait Editor {
    fn edit(&self, text: &str) -> Result<Edited>;
}

/// Hands the text to `$EDITOR` (falling back to `vi`) via a temp file.
/// A non-zero editor exit is treated as cancellation, like git does.
pub struct ShellEditor;

impl Editor for ShellEditor {
    fn edit(&self, text: &str) -> Result<Edited> {
        let path = env::temp_dir().join(format!("gsg-message-{}.md", std::process::id()));
        fs::write(&path, text)
            .map_err(|e| SageError::Tool(format!("failed to write edit buffer {path:?}: {e}")))?;

        let editor = env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
        // Values like "code --wait" carry their own arguments.
        let (program, args) = editor_invocation(&editor);
        let status = Command::new(&program)
            .args(&args)
            .arg(&path)
            .status()
            .map_err(|e| SageError::Tool(format!("failed to launch editor '{editor}': {e}")))?;

        if !status.success() {
            let _ = fs::remove_file(&path);
            return Ok(Edited::Cancelled);
        }

        let edited = fs::read_to_string(&path)
            .map_err(|e| SageError::Tool(format!("failed to read edit buffer back: {e}")))?;
        let _ = fs::remove_file(&path);
        Ok(Edited::Accepted(edited))
    }
}

/// Split an `$EDITOR` value into the program and its leading arguments.
fn editor_invocation(value: &str) -> (String, Vec<String>) {
    let mut parts = value.split_whitespace().map(String::from);
    let program = parts.next().unwrap_or_else(|| "vi".to_string());
    (program, parts.collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_edited_pr;

    fn result(category: &str, summary: &str, body: &str) -> StructuredResult {
        StructuredResult {
            category: category.to_string(),
            summary: summary.to_string(),
            body: body.to_string(),
        }
    }

    #[test]
    fn commit_template_is_category_summary_body() {
        let text = assemble_commit(&result("fix", "Fix login bug", "Resolve null check."));
        assert_eq!(text, "fix: Fix login bug\n\nResolve null check.");
    }

    #[test]
    fn ticket_renders_as_link_when_base_url_configured() {
        assert_eq!(
            format_ticket_link("ABC-123", Some("https://issues.example.com/browse/")),
            "[ABC-123](https://issues.example.com/browse/ABC-123)"
        );
        assert_eq!(format_ticket_link("ABC-123", None), "ABC-123");
    }

    #[test]
    fn unsectioned_description_is_wrapped_into_the_template() {
        let body = assemble_pr_body(&result("docs", "T", "Just some prose."), None, None);
        assert!(body.starts_with("## Description\nJust some prose."));
        assert!(body.contains("## Related issues or context\nNone"));
        assert!(body.ends_with("## QA\nNo QA required"));
    }

    #[test]
    fn ticket_is_inserted_under_the_related_section() {
        let sectioned =
            "## Description\nStuff.\n\n## Related issues or context\n\n## QA\nNo QA required";
        let body = assemble_pr_body(
            &result("docs", "T", sectioned),
            Some("ABC-123"),
            Some("https://tracker.example.com"),
        );
        assert!(body.contains(
            "## Related issues or context\n- [ABC-123](https://tracker.example.com/ABC-123)"
        ));
        // QA section untouched.
        assert!(body.ends_with("## QA\nNo QA required"));
    }

    #[test]
    fn missing_related_section_is_appended_when_ticket_present() {
        let sectioned = "## Description\nStuff.";
        let body = assemble_pr_body(&result("docs", "T", sectioned), Some("OPS-9"), None);
        assert!(body.ends_with("## Related issues or context\n- OPS-9"));
    }

    #[test]
    fn sectioned_model_response_survives_parse_and_assembly() {
        let response = "title: Add search box\n\
                        description:\n\
                        ## Description\n\
                        Adds a search box to the header.\n\
                        ## Related issues or context\n\
                        None\n\
                        ## QA\n\
                        No QA required";
        let result = crate::parse::parse_pr_response(response);
        let body = assemble_pr_body(&result, None, None);

        assert!(body.starts_with("## Description\nAdds a search box to the header."));
        assert!(body.contains("\n## Related issues or context\nNone"));
        assert!(body.contains("\n## QA\nNo QA required"));
    }

    #[test]
    fn edit_buffer_round_trips_through_the_label_parser() {
        let buffer = pr_edit_buffer("My title", "## Description\nBody text.");
        let (title, body) = parse_edited_pr(&buffer).unwrap();
        assert_eq!(title, "My title");
        assert_eq!(body, "## Description\nBody text.");
    }

    /// Scripted editor double, per the synchronous `(text) -> text|cancelled`
    /// interface.
    struct CannedEditor(&'static str);

    impl Editor for CannedEditor {
        fn edit(&self, _text: &str) -> crate::error::Result<Edited> {
            Ok(Edited::Accepted(self.0.to_string()))
        }
    }

    #[test]
    fn multi_word_editor_value_splits_into_program_and_args() {
        assert_eq!(
            editor_invocation("code --wait"),
            ("code".to_string(), vec!["--wait".to_string()])
        );
        assert_eq!(editor_invocation("vi"), ("vi".to_string(), vec![]));
        assert_eq!(editor_invocation("   "), ("vi".to_string(), vec![]));
    }

    #[test]
    fn emptied_title_from_the_editor_cancels_the_pr() {
        let editor = CannedEditor("title:\ndescription:\nstill here");
        let Edited::Accepted(text) = editor.edit("ignored").unwrap() else {
            panic!("double always accepts");
        };
        assert!(parse_edited_pr(&text).is_none());
    }
}
