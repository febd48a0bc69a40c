use crate::config::Language;
use crate::git::DiffContext;
use crate::llm::prompts;

/// Compile the commit-message instruction: language directive (stated
/// before and after the task to bias compliance), the tag taxonomy, the
/// diff body, and the three-line format contract.
pub fn commit_prompt(ctx: &DiffContext, language: Language) -> String {
    let lang = language.display_name();
    let code = language.code();

    format!(
        "You are a commit message generator. Analyze the following git diff and generate a \
         structured commit message in {lang}. Focus only on describing the actual changes shown \
         in the diff, not any potential follow-up actions.\n\n\
         {taxonomy}\n\n\
         The diff content is:\n\n\
         {diff}\n\n\
         {format}\n\n\
         Remember:\n\
         1. Keep the format exactly as shown\n\
         2. Write every value in {lang} ({code})\n\
         3. Choose type from the given tag options based on the nature of changes\n\
         4. Keep subject under 50 characters\n\
         5. Only describe changes shown in the diff\n\
         6. Do not include any installation steps or commands in the message\n\
         7. Choose the most specific and appropriate tag for the changes\n\n\
         Your response:",
        taxonomy = prompts::COMMIT_TAXONOMY,
        diff = ctx.staged_diff,
        format = prompts::COMMIT_FORMAT,
    )
}

/// Compile the pull-request instruction: branch context, unique commits,
/// ticket token, the title/description contract, and the QA-disclosure
/// rule. The language directive brackets the task like the commit path.
pub fn pr_prompt(
    ctx: &DiffContext,
    language: Language,
    qa_enabled: bool,
    base_branch: &str,
    head_branch: &str,
) -> String {
    let lang = language.display_name();
    let diff = ctx.branch_diff.as_deref().unwrap_or_default();
    let qa_rule = if qa_enabled {
        prompts::QA_RUBRIC
    } else {
        prompts::QA_FORCED
    };

    let mut commits_block = String::new();
    for c in &ctx.commits {
        commits_block.push_str(&format!(
            "- {} {} ({}, {})\n",
            c.short_hash, c.message, c.author, c.timestamp
        ));
    }
    if commits_block.is_empty() {
        commits_block.push_str("(none)\n");
    }

    let ticket_line = match &ctx.ticket {
        Some(t) => format!("Ticket: {t}\n"),
        None => String::new(),
    };

    format!(
        "You are a pull-request description generator. Summarize the overall goal of the branch \
         and its important changes in {lang}.\n\n\
         Base branch: {base_branch}\n\
         Feature branch: {head_branch}\n\
         {ticket_line}\n\
         Commits unique to this branch (newest first):\n\
         {commits_block}\n\
         The diff against the base branch is:\n\n\
         {diff}\n\n\
         {format}\n\n\
         {qa_rule}\n\n\
         Remember:\n\
         1. Keep the format exactly as shown\n\
         2. Write the entire response, including every section, in {lang}\n\
         3. Focus on user-visible behavior and domain-level intent, not line-by-line diffs\n\
         4. Avoid generic phrases like 'misc changes' or 'small fixes'; be specific\n\n\
         Your response:",
        format = prompts::PR_FORMAT,
    )
}

/// Compile the review instruction: the caller-supplied combined ruleset,
/// the diff under review, and the JSON output contract.
pub fn review_prompt(rules: &str, diff: &str) -> String {
    format!(
        "{rules}\n\n\
         The code changes under review are:\n\n\
         ```diff\n{diff}\n```\n\n\
         {output}",
        output = prompts::REVIEW_OUTPUT,
    )
}
