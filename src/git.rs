use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::process::Command as GitCommand;

use crate::error::{Result, SageError};

/// One commit reachable from the current branch but not from the
/// comparison branch. Ordered newest-first, as `git log` emits them.
#[derive(Debug, Clone)]
pub struct CommitRecord {
    pub short_hash: String,
    pub message: String,
    pub author: String,
    pub timestamp: String,
}

/// Immutable snapshot of what is being analyzed for one invocation.
#[derive(Debug, Clone)]
pub struct DiffContext {
    pub staged_diff: String,
    pub branch_diff: Option<String>,
    pub commits: Vec<CommitRecord>,
    pub ticket: Option<String>,
}

impl DiffContext {
    /// Context for the commit path: staged changes only.
    pub fn for_commit() -> Result<Self> {
        Ok(DiffContext {
            staged_diff: staged_diff()?,
            branch_diff: None,
            commits: Vec::new(),
            ticket: extract_ticket(&current_branch()?),
        })
    }

    /// Context for the PR/review paths: divergence from the comparison
    /// branch. An absent branch diff means "nothing to analyze", not an
    /// error.
    pub fn against(main_branch: &str) -> Result<Self> {
        let branch_diff = branch_diff(main_branch);
        let commits = if branch_diff.is_some() {
            branch_commits(main_branch)?
        } else {
            Vec::new()
        };

        Ok(DiffContext {
            staged_diff: String::new(),
            branch_diff,
            commits,
            ticket: extract_ticket(&current_branch()?),
        })
    }
}

/// Run a git command and capture stdout as String.
pub fn git_output(args: &[&str]) -> Result<String> {
    let output = GitCommand::new("git")
        .args(args)
        .output()
        .map_err(|e| SageError::Repository(format!("failed to run git {args:?}: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SageError::Repository(format!(
            "git {:?} exited with status {:?}: {}",
            args,
            output.status.code(),
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Run a git command for its exit status only.
fn git_ok(args: &[&str]) -> bool {
    GitCommand::new("git")
        .args(args)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

pub fn is_git_repository() -> bool {
    git_ok(&["rev-parse", "--is-inside-work-tree"])
}

/// A repository with zero commits has no HEAD to diff against.
fn head_exists() -> bool {
    git_ok(&["rev-parse", "--verify", "--quiet", "HEAD"])
}

/// Get the current branch name.
pub fn current_branch() -> Result<String> {
    let name = git_output(&["rev-parse", "--abbrev-ref", "HEAD"])?
        .trim()
        .to_string();
    Ok(name)
}

/// List staged file paths, deduplicated, in first-seen order.
pub fn staged_files() -> Result<Vec<String>> {
    let output = if head_exists() {
        git_output(&["diff", "--cached", "--name-only"])?
    } else {
        // No HEAD yet; the index is the only record of staged files.
        git_output(&["ls-files", "--cached"])?
    };

    let mut seen = HashSet::new();
    let files = output
        .lines()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty() && seen.insert(l.clone()))
        .collect();
    Ok(files)
}

pub fn has_staged_changes() -> Result<bool> {
    Ok(!staged_files()?.is_empty())
}

/// Get the full staged diff. In a repository with no commits yet there is
/// no HEAD to diff against, so a "new file" diff is synthesized from the
/// staged paths instead.
pub fn staged_diff() -> Result<String> {
    if head_exists() {
        git_output(&["diff", "--cached"])
    } else {
        let files = staged_files()?;
        Ok(synthesize_new_file_diff(Path::new("."), &files))
    }
}

/// Build a unified-diff-shaped block for each file as if it were newly
/// added, every content line prefixed as an addition. Unreadable files are
/// skipped with a warning; they must not abort the remaining files.
pub fn synthesize_new_file_diff(root: &Path, files: &[String]) -> String {
    let mut diff = String::new();

    for path in files {
        let content = match fs::read_to_string(root.join(path)) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("Could not read file {path}: {e}");
                continue;
            }
        };

        diff.push_str(&format!("diff --git a/{path} b/{path}\n"));
        diff.push_str("new file mode 100644\n");
        diff.push_str("--- /dev/null\n");
        diff.push_str(&format!("+++ b/{path}\n"));
        for line in content.lines() {
            diff.push('+');
            diff.push_str(line);
            diff.push('\n');
        }
        diff.push('\n');
    }

    diff
}

/// Diff between the comparison branch and the current HEAD. Any failure
/// (missing branch, detached state) yields `None`: callers treat absence
/// as "nothing to analyze".
pub fn branch_diff(main_branch: &str) -> Option<String> {
    let range = format!("{main_branch}...HEAD");
    match git_output(&["diff", &range]) {
        Ok(diff) if !diff.trim().is_empty() => Some(diff),
        Ok(_) => None,
        Err(e) => {
            log::debug!("branch diff unavailable: {e}");
            None
        }
    }
}

/// Determine the comparison ("main") branch name.
///
/// Ordered fallback chain: the remote's symbolic default-branch pointer
/// (accepted only if that branch verifiably exists), then the conventional
/// names `main`, `master`, `develop`, then the literal `"main"`.
pub fn main_branch_name() -> String {
    let remote_head = git_output(&["symbolic-ref", "refs/remotes/origin/HEAD"]).ok();
    pick_default_branch(remote_head.as_deref(), branch_exists)
}

fn pick_default_branch<F>(remote_head: Option<&str>, exists: F) -> String
where
    F: Fn(&str) -> bool,
{
    if let Some(name) = remote_head.and_then(|r| r.trim().rsplit('/').next()) {
        // An unverified pointer is discarded.
        if !name.is_empty() && exists(name) {
            return name.to_string();
        }
    }

    for candidate in ["main", "master", "develop"] {
        if exists(candidate) {
            return candidate.to_string();
        }
    }

    "main".to_string()
}

fn branch_exists(name: &str) -> bool {
    git_ok(&["rev-parse", "--verify", "--quiet", &format!("refs/heads/{name}")])
        || git_ok(&[
            "rev-parse",
            "--verify",
            "--quiet",
            &format!("refs/remotes/origin/{name}"),
        ])
}

/// First issue-tracker token (e.g. `ABC-123`) embedded in a branch name.
pub fn extract_ticket(branch: &str) -> Option<String> {
    let re = Regex::new(r"[A-Z]+-[0-9]+").ok()?;
    Some(re.find(branch)?.as_str().to_string())
}

/// Commits reachable from the current branch but not from the comparison
/// branch, newest-first.
pub fn branch_commits(main_branch: &str) -> Result<Vec<CommitRecord>> {
    let range = format!("{main_branch}..HEAD");
    let output = git_output(&[
        "log",
        "--pretty=format:%h%x09%an%x09%ad%x09%s",
        "--date=iso",
        &range,
    ])?;

    Ok(output.lines().filter_map(parse_log_line).collect())
}

fn parse_log_line(line: &str) -> Option<CommitRecord> {
    let mut parts = line.splitn(4, '\t');
    let short_hash = parts.next()?.trim().to_string();
    let author = parts.next()?.trim().to_string();
    let timestamp = parts.next()?.trim().to_string();
    let message = parts.next()?.trim().to_string();

    if short_hash.is_empty() {
        return None;
    }

    Some(CommitRecord {
        short_hash,
        message,
        author,
        timestamp,
    })
}

/// Create the commit. The caller is responsible for the explicit human
/// confirmation step before calling this.
pub fn commit(message: &str) -> Result<()> {
    git_output(&["commit", "-m", message])?;
    Ok(())
}
