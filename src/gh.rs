use std::process::Command;

use crate::error::{Result, SageError};

/// Hand the assembled title and body to the external `gh` collaborator.
/// Returns the created pull-request URL on success.
pub fn create_pull_request(title: &str, body: &str, base_branch: &str) -> Result<String> {
    let output = Command::new("gh")
        .args(["pr", "create", "--title", title, "--body", body, "--base", base_branch])
        .output()
        .map_err(|e| {
            SageError::Tool(format!(
                "failed to run gh (is the GitHub CLI installed?): {e}"
            ))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SageError::Tool(format!(
            "gh pr create failed: {}",
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
