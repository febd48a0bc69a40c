use serde::{Deserialize, Serialize};

/// Fixed defaults applied when the model's response is missing a field.
/// The commit/PR path never fails because of a malformed response; it
/// degrades to these.
pub const DEFAULT_CATEGORY: &str = "docs";
pub const DEFAULT_SUMMARY: &str = "Update documentation";
pub const DEFAULT_BODY: &str = "Update project documentation and improve clarity.";

/// The closed change-classification taxonomy the model chooses from,
/// grouped by semver impact in the prompt. A response header line of the
/// form `tag: subject` with one of these tags is accepted directly.
pub const COMMIT_TAGS: &[&str] = &[
    "fix", "build", "maint", "maintenance", "test", "patch", // PATCH
    "feat", "feature", "new", "minor", "update", // MINOR
    "breaking", "major", // MAJOR
    "docs", "chore", // NO-OP
];

/// Normalized record derived from raw model output. All three fields are
/// always populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredResult {
    pub category: String,
    pub summary: String,
    pub body: String,
}

/// Which `label: value` markers a parse pass recognizes.
struct Labels {
    category: Option<&'static str>,
    summary: &'static str,
    body: &'static str,
    /// Accept a conventional `tag: subject` header as category + summary.
    header_tags: bool,
}

const COMMIT_LABELS: Labels = Labels {
    category: Some("type"),
    summary: "subject",
    body: "body",
    header_tags: true,
};

const PR_LABELS: Labels = Labels {
    category: None,
    summary: "title",
    body: "description",
    header_tags: false,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    SeekingField,
    InBody,
}

#[derive(Debug, Default)]
struct RawFields {
    category: Option<String>,
    summary: Option<String>,
    body: String,
}

/// Parse a `type`/`subject`/`body` commit response.
pub fn parse_commit_response(text: &str) -> StructuredResult {
    apply_defaults(scan(text, &COMMIT_LABELS))
}

/// Parse a `title`/`description` pull-request response. `category` is not
/// meaningful on this path and lands on its default.
pub fn parse_pr_response(text: &str) -> StructuredResult {
    apply_defaults(scan(text, &PR_LABELS))
}

fn apply_defaults(fields: RawFields) -> StructuredResult {
    StructuredResult {
        category: fields
            .category
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        summary: fields
            .summary
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SUMMARY.to_string()),
        body: if fields.body.is_empty() {
            DEFAULT_BODY.to_string()
        } else {
            fields.body
        },
    }
}

/// Single forward pass over trimmed, non-empty lines with two states.
///
/// SEEKING_FIELD: a `label: value` line captures category/summary on first
/// occurrence; the body label (or a taxonomy header line) transitions to
/// IN_BODY. Unrecognized lines are dropped.
///
/// IN_BODY: every line is accumulated until input ends, except restated
/// category/summary labels, which are ignored so a model re-stating the
/// format mid-body cannot overwrite captured fields.
fn scan(text: &str, labels: &Labels) -> RawFields {
    let mut fields = RawFields::default();
    let mut body = BodyAccumulator::default();
    let mut state = State::SeekingField;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        match state {
            State::SeekingField => {
                let Some((key, value)) = line.split_once(':') else {
                    continue;
                };
                let key = key.trim().to_ascii_lowercase();
                let value = value.trim();

                if labels.category == Some(key.as_str()) {
                    if fields.category.is_none() {
                        fields.category = Some(value.to_string());
                    }
                } else if key == labels.summary {
                    if fields.summary.is_none() {
                        fields.summary = Some(value.to_string());
                    }
                } else if key == labels.body {
                    state = State::InBody;
                    if !value.is_empty() {
                        body.push(value);
                    }
                } else if labels.header_tags
                    && fields.category.is_none()
                    && fields.summary.is_none()
                    && COMMIT_TAGS.contains(&key.as_str())
                {
                    // Conventional `tag: subject` header; what follows is
                    // the body.
                    fields.category = Some(key);
                    fields.summary = Some(value.to_string());
                    state = State::InBody;
                }
            }
            State::InBody => {
                if let Some((key, value)) = line.split_once(':') {
                    let key = key.trim().to_ascii_lowercase();
                    if labels.category == Some(key.as_str()) || key == labels.summary {
                        continue;
                    }
                    if key == labels.body {
                        let value = value.trim();
                        if !value.is_empty() {
                            body.push(value);
                        }
                        continue;
                    }
                }
                body.push(line);
            }
        }
    }

    fields.body = body.finish();
    fields
}

/// Assembles body lines: list-marker and markdown-header lines stay
/// discrete, prose lines are joined with single spaces.
#[derive(Debug, Default)]
struct BodyAccumulator(String);

impl BodyAccumulator {
    fn push(&mut self, line: &str) {
        let is_item = line.starts_with('-')
            || line.starts_with('*')
            || line.starts_with('•')
            || line.starts_with('#');

        if is_item {
            if !self.0.is_empty() && !self.0.ends_with('\n') {
                self.0.push('\n');
            }
            self.0.push_str(line);
            self.0.push('\n');
        } else {
            if !self.0.is_empty() && !self.0.ends_with('\n') {
                self.0.push(' ');
            }
            self.0.push_str(line);
        }
    }

    fn finish(self) -> String {
        self.0.trim_end().to_string()
    }
}

/// Re-parse editor output on the PR path. Only the title and description
/// markers are recognized; description lines are kept verbatim because
/// the edited body is markdown. An empty title means the user cancelled.
pub fn parse_edited_pr(text: &str) -> Option<(String, String)> {
    let mut title: Option<String> = None;
    let mut body_lines: Vec<String> = Vec::new();
    let mut in_body = false;

    for raw in text.lines() {
        if in_body {
            body_lines.push(raw.to_string());
            continue;
        }

        let line = raw.trim();
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        match key.trim().to_ascii_lowercase().as_str() {
            "title" if title.is_none() => title = Some(value.trim().to_string()),
            "description" => {
                in_body = true;
                let value = value.trim();
                if !value.is_empty() {
                    body_lines.push(value.to_string());
                }
            }
            _ => {}
        }
    }

    let title = title.unwrap_or_default();
    if title.is_empty() {
        return None;
    }
    Some((title, body_lines.join("\n").trim().to_string()))
}

/// Review verdict decoded from the model's JSON response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub status: ValidationStatus,
    #[serde(default)]
    pub issues: Vec<Finding>,
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValidationStatus {
    Pass,
    Fail,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub file: String,
    #[serde(default)]
    pub line: Option<u32>,
    pub rule: String,
    pub description: String,
}

impl ValidationResult {
    pub fn error(summary: impl Into<String>) -> Self {
        ValidationResult {
            status: ValidationStatus::Error,
            issues: Vec::new(),
            summary: summary.into(),
        }
    }

    pub fn fail(summary: impl Into<String>) -> Self {
        ValidationResult {
            status: ValidationStatus::Fail,
            issues: Vec::new(),
            summary: summary.into(),
        }
    }
}

/// Decode the structured-review response. A malformed payload degrades to
/// status `ERROR` so downstream exit-code logic still functions; the
/// typed parse error is never raised past this point.
pub fn parse_review_response(text: &str) -> ValidationResult {
    match decode_validation(strip_code_fences(text)) {
        Ok(result) => result,
        Err(e) => ValidationResult::error(e.to_string()),
    }
}

fn decode_validation(payload: &str) -> crate::error::Result<ValidationResult> {
    serde_json::from_str::<ValidationResult>(payload).map_err(|e| {
        log::debug!("unparseable review response: {e}\n{payload}");
        crate::error::SageError::Parse(format!("Failed to parse model response: {e}"))
    })
}

/// Remove a surrounding markdown code fence (with optional language tag).
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }

    let inner = match trimmed.split_once('\n') {
        Some((_, rest)) => rest,
        None => return trimmed,
    };
    let inner = inner.trim_end();
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_response_parses_all_fields() {
        let r = parse_commit_response(
            "type: feat\nsubject: Add login flow\nbody: Implement the session handshake.",
        );
        assert_eq!(r.category, "feat");
        assert_eq!(r.summary, "Add login flow");
        assert_eq!(r.body, "Implement the session handshake.");
    }

    #[test]
    fn missing_fields_receive_fixed_defaults() {
        let r = parse_commit_response("some chatter without any labels");
        assert_eq!(r.category, DEFAULT_CATEGORY);
        assert_eq!(r.summary, DEFAULT_SUMMARY);
        assert_eq!(r.body, DEFAULT_BODY);

        let r = parse_commit_response("type: fix");
        assert_eq!(r.category, "fix");
        assert_eq!(r.summary, DEFAULT_SUMMARY);
        assert_eq!(r.body, DEFAULT_BODY);
    }

    #[test]
    fn first_occurrence_wins_for_repeated_labels() {
        let r = parse_commit_response(
            "type: fix\nsubject: Real subject\nbody: Start of body.\ntype: docs\nsubject: Restated\nmore body text",
        );
        assert_eq!(r.category, "fix");
        assert_eq!(r.summary, "Real subject");
        assert_eq!(r.body, "Start of body. more body text");
    }

    #[test]
    fn list_items_keep_their_own_lines_in_order() {
        let r = parse_commit_response(
            "type: feat\nsubject: S\nbody: Overview line\n- first item\n- second item\ntrailing prose",
        );
        assert_eq!(
            r.body,
            "Overview line\n- first item\n- second item\ntrailing prose"
        );
    }

    #[test]
    fn prose_body_lines_join_with_spaces() {
        let r = parse_commit_response("type: fix\nsubject: S\nbody: one\ntwo\nthree");
        assert_eq!(r.body, "one two three");
    }

    #[test]
    fn labels_match_case_insensitively() {
        let r = parse_commit_response("Type: fix\nSUBJECT: Caps\nBody: b");
        assert_eq!(r.category, "fix");
        assert_eq!(r.summary, "Caps");
        assert_eq!(r.body, "b");
    }

    #[test]
    fn assemble_then_parse_round_trips() {
        let original = StructuredResult {
            category: "fix".to_string(),
            summary: "Fix login bug".to_string(),
            body: "Resolve null check.".to_string(),
        };
        let text = crate::message::assemble_commit(&original);
        let reparsed = parse_commit_response(&text);
        assert_eq!(reparsed, original);
    }

    #[test]
    fn pr_labels_capture_title_and_description() {
        let r = parse_pr_response("title: Ship search\ndescription: Adds the search box.\nmore detail");
        assert_eq!(r.summary, "Ship search");
        assert_eq!(r.body, "Adds the search box. more detail");
        assert_eq!(r.category, DEFAULT_CATEGORY);
    }

    #[test]
    fn markdown_section_headers_keep_their_own_lines() {
        let r = parse_pr_response(
            "title: T\ndescription:\n## Description\nline one\nline two\n## QA\nNo QA required",
        );
        assert_eq!(
            r.body,
            "## Description\nline one line two\n## QA\nNo QA required"
        );
    }

    #[test]
    fn edited_pr_preserves_markdown_body_verbatim() {
        let text = "title: My PR\ndescription:\n## Description\nDoes things.\n\n## QA\nNo QA required";
        let (title, body) = parse_edited_pr(text).unwrap();
        assert_eq!(title, "My PR");
        assert_eq!(body, "## Description\nDoes things.\n\n## QA\nNo QA required");
    }

    #[test]
    fn empty_title_after_editing_means_cancelled() {
        assert!(parse_edited_pr("title:\ndescription:\nbody").is_none());
        assert!(parse_edited_pr("no markers at all").is_none());
    }

    #[test]
    fn review_json_decodes_with_findings() {
        let json = r#"{"status": "FAIL", "issues": [{"file": "src/a.rs", "line": 10, "rule": "no-unwrap", "description": "unwrap in library code"}], "summary": "one issue"}"#;
        let result = parse_review_response(json);
        assert_eq!(result.status, ValidationStatus::Fail);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].file, "src/a.rs");
        assert_eq!(result.issues[0].line, Some(10));
    }

    #[test]
    fn fenced_review_json_is_unwrapped_first() {
        let fenced = "```json\n{\"status\": \"PASS\", \"issues\": [], \"summary\": \"ok\"}\n```";
        let result = parse_review_response(fenced);
        assert_eq!(result.status, ValidationStatus::Pass);
        assert_eq!(result.summary, "ok");
    }

    #[test]
    fn malformed_review_json_degrades_to_error_status() {
        let result = parse_review_response("the model rambled instead of emitting JSON");
        assert_eq!(result.status, ValidationStatus::Error);
        assert!(result.summary.contains("Failed to parse"));
    }
}
