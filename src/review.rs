use std::fs;

use crate::config;
use crate::error::{Result, SageError};
use crate::git;
use crate::llm::{prompt_builder, LlmClient};
use crate::parse::{self, ValidationResult, ValidationStatus};

/// Load one ruleset file from the prompts directory. A missing template is
/// a configuration problem, not a pipeline defect.
fn load_ruleset(name: &str) -> Result<String> {
    let path = config::prompts_dir()?.join(format!("{name}.txt"));
    fs::read_to_string(&path)
        .map_err(|e| SageError::Config(format!("missing prompt template {path:?}: {e}")))
}

/// Combine the common ruleset with an optionally named one.
pub fn combined_rules(rule_type: &str) -> Result<String> {
    let common = load_ruleset("common")?;
    if rule_type == "common" {
        return Ok(common);
    }

    let specific = load_ruleset(rule_type)?;
    Ok(format!(
        "{common}\n\nAdditionally, apply these specific rules:\n\n{specific}"
    ))
}

/// Validate the branch's divergence from the comparison branch against the
/// named ruleset. Provider failures propagate; a response the parser
/// cannot decode comes back as status `ERROR`, never an error value.
pub fn run_review(ruleset: &str, client: &dyn LlmClient) -> Result<ValidationResult> {
    let main_branch = git::main_branch_name();
    let Some(diff) = git::branch_diff(&main_branch) else {
        return Ok(ValidationResult::fail("No changes to analyze"));
    };

    let rules = combined_rules(ruleset)?;
    log::info!("Reviewing diff against {main_branch} with ruleset '{ruleset}'");
    validate_diff(&rules, &diff, client)
}

/// Send one diff through the backend and decode the verdict. Backend
/// failures propagate as-is; only undecodable responses degrade.
fn validate_diff(rules: &str, diff: &str, client: &dyn LlmClient) -> Result<ValidationResult> {
    let prompt = prompt_builder::review_prompt(rules, diff);
    let response = client.send(&prompt)?;
    Ok(parse::parse_review_response(&response))
}

/// Human-readable findings report.
pub fn format_validation_result(result: &ValidationResult) -> String {
    let mut out: Vec<String> = Vec::new();

    match result.status {
        ValidationStatus::Pass => {
            out.push("✅ Validation passed. All checks conform to the rules.".to_string());
        }
        ValidationStatus::Error => {
            out.push(format!("❌ Validation errored: {}", result.summary));
        }
        ValidationStatus::Fail => {
            out.push("❌ Issues found:".to_string());
        }
    }

    if !result.issues.is_empty() {
        for issue in &result.issues {
            let line = issue
                .line
                .map(|l| l.to_string())
                .unwrap_or_else(|| "N/A".to_string());
            out.push(format!("\n• Location: {}:{}", issue.file, line));
            out.push(format!("  Rule: {}", issue.rule));
            out.push(format!("  Description: {}", issue.description));
        }
    } else if result.status == ValidationStatus::Fail {
        out.push("  No issue details were returned; check the validator configuration.".to_string());
    }

    out.push(format!("\nSummary: {}", result.summary));
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Finding;

    /// Scripted backend double: either a canned response or a canned
    /// transport failure.
    struct CannedClient(crate::error::Result<&'static str>);

    impl LlmClient for CannedClient {
        fn send(&self, _instruction: &str) -> crate::error::Result<String> {
            match &self.0 {
                Ok(text) => Ok(text.to_string()),
                Err(SageError::Provider {
                    backend,
                    operation,
                    detail,
                }) => Err(SageError::provider(*backend, *operation, detail.clone())),
                Err(_) => unreachable!("double only scripts provider failures"),
            }
        }
    }

    #[test]
    fn backend_failure_propagates_naming_backend_and_operation() {
        let client = CannedClient(Err(SageError::provider(
            "ollama",
            "chat",
            "connection refused",
        )));
        let err = validate_diff("Rule one.", "diff --git a/x b/x", &client).unwrap_err();

        assert!(matches!(err, SageError::Provider { .. }));
        let display = err.to_string();
        assert!(display.contains("ollama"));
        assert!(display.contains("chat"));
        assert!(display.contains("connection refused"));
    }

    #[test]
    fn decodable_verdict_comes_back_as_a_result_value() {
        let client =
            CannedClient(Ok(r#"{"status": "PASS", "issues": [], "summary": "clean"}"#));
        let result = validate_diff("Rule one.", "diff --git a/x b/x", &client).unwrap();
        assert_eq!(result.status, ValidationStatus::Pass);
        assert_eq!(result.summary, "clean");
    }

    #[test]
    fn pass_report_has_no_issue_block() {
        let result = ValidationResult {
            status: ValidationStatus::Pass,
            issues: vec![],
            summary: "clean".to_string(),
        };
        let report = format_validation_result(&result);
        assert!(report.starts_with("✅"));
        assert!(report.ends_with("Summary: clean"));
    }

    #[test]
    fn fail_report_lists_each_finding_with_location() {
        let result = ValidationResult {
            status: ValidationStatus::Fail,
            issues: vec![
                Finding {
                    file: "src/a.rs".to_string(),
                    line: Some(3),
                    rule: "no-todo".to_string(),
                    description: "stray TODO".to_string(),
                },
                Finding {
                    file: "src/b.rs".to_string(),
                    line: None,
                    rule: "naming".to_string(),
                    description: "bad name".to_string(),
                },
            ],
            summary: "two issues".to_string(),
        };
        let report = format_validation_result(&result);
        assert!(report.contains("Location: src/a.rs:3"));
        assert!(report.contains("Location: src/b.rs:N/A"));
        assert!(report.contains("Rule: no-todo"));
    }

    #[test]
    fn fail_without_details_notes_the_gap() {
        let report = format_validation_result(&ValidationResult::fail("nothing staged"));
        assert!(report.contains("No issue details were returned"));
    }
}
