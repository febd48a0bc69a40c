/// Fixed marker for changes that need no human verification.
pub const QA_NOT_REQUIRED: &str = "No QA required";

/// The closed classification taxonomy, grouped by semantic-versioning
/// impact. The chosen tag becomes the commit message's `type`.
pub const COMMIT_TAXONOMY: &str = r#"Commit Tags Explanation:

Patch Version (PATCH) Tags:
- fix: For bug fixes
- build: For build process changes only
- maint/maintenance: For small maintenance tasks like technical debt cleanup, refactoring, and non-breaking dependency updates
- test: For application end-to-end tests
- patch: Generic patch tag when other patch tags don't apply

Minor Version (MINOR) Tags:
- feat/feature/new: For implementing new features
- minor: Generic minor tag when other minor tags don't apply
- update: For backward-compatible enhancements to existing features

Major Version (MAJOR) Tags:
- breaking: For backward-incompatible enhancements or features
- major: Generic major tag when other major tags don't apply

No Version Update (NO-OP) Tags:
- docs: For documentation changes only
- chore: For other changes that don't affect the actual environment (code comments, non-package files, unit tests)"#;

/// Output-format contract for the commit path: exactly three labeled lines.
pub const COMMIT_FORMAT: &str = r#"You must respond in exactly this format:
type: [choose the most appropriate tag from the above list]
subject: [brief description, max 50 chars]
body: [detailed explanation of the changes shown in the diff]

Example of good format:
type: docs
subject: Update README with project features
body: Convert README to English and improve documentation structure. Add detailed feature list and installation instructions. Include language support information."#;

/// Output-format contract for the PR path: a title line and a description
/// containing three fixed named sections.
pub const PR_FORMAT: &str = r#"You must respond in exactly this format:
title: [concise pull-request title, max 72 chars, no formatting]
description: [the full description, containing exactly these three markdown sections]
## Description
[what changed and why, focused on intent rather than line-by-line diffs]
## Related issues or context
[links or references; write None if there are none]
## QA
[see the QA rule below]"#;

/// QA-disclosure rubric applied when verification is enabled.
pub const QA_RUBRIC: &str = r#"QA rule: decide the content of the ## QA section from whether the change is user-visible.
- UI changes or API-surface changes: list the concrete steps a reviewer should take to verify the behavior.
- Pure backend changes, refactors, documentation, or test-only changes: write exactly "No QA required"."#;

/// QA-disclosure rule when the caller disabled verification.
pub const QA_FORCED: &str =
    r#"QA rule: verification is disabled for this change. In the ## QA section write exactly "No QA required"."#;

/// Output contract for the structured-review path.
pub const REVIEW_OUTPUT: &str = r#"You must respond with a single JSON object and nothing else, in exactly this shape:
{
  "status": "PASS" or "FAIL",
  "issues": [
    {"file": "path/to/file", "line": 123, "rule": "rule-id", "description": "what violates the rule and why"}
  ],
  "summary": "one-paragraph overall assessment"
}
Use "PASS" with an empty issues list when every rule is satisfied. Do not wrap the JSON in markdown code fences."#;
