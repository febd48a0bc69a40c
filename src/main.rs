mod cli_args;
mod config;
mod error;
mod gh;
mod git;
mod llm;
mod logging;
mod message;
mod parse;
mod review;

use anyhow::{bail, Result};
use clap::Parser;
use std::io::{self, Write};

use cli_args::{Cli, Command, ConfigArgs};
use config::Config;
use git::DiffContext;
use llm::prompt_builder;
use message::{Edited, Editor, ShellEditor};
use parse::ValidationStatus;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logger(cli.verbose);

    match &cli.command {
        Some(Command::Config(args)) => run_config(args),
        Some(Command::Pr {
            base,
            no_qa,
            dry_run,
        }) => run_pr(&cli, base.as_deref(), *no_qa, *dry_run),
        Some(Command::Review { ruleset }) => run_review_cmd(&cli, ruleset),
        Some(Command::Commit) | None => run_commit(&cli),
    }
}

/// Analyze staged changes, generate a commit message, confirm, commit.
fn run_commit(cli: &Cli) -> Result<()> {
    ensure_repository()?;
    let cfg = Config::from_sources(cli)?;

    if !git::has_staged_changes()? {
        println!("No staged changes found. Please 'git add' some files first.");
        return Ok(());
    }

    let ctx = DiffContext::for_commit()?;
    if ctx.staged_diff.trim().is_empty() {
        println!("No changes to analyze.");
        return Ok(());
    }

    let client = llm::build_client(&cfg)?;
    println!("Analyzing changes...");
    let prompt = prompt_builder::commit_prompt(&ctx, cfg.language);
    let response = client.send(&prompt)?;
    let result = parse::parse_commit_response(&response);
    let mut text = message::assemble_commit(&result);

    if cli.edit {
        match ShellEditor.edit(&text)? {
            Edited::Accepted(edited) if !edited.trim().is_empty() => {
                text = edited.trim().to_string();
            }
            _ => {
                println!("Commit cancelled.");
                return Ok(());
            }
        }
    }

    println!("\nCommit message:");
    println!("{}", "-".repeat(50));
    println!("{text}");
    println!("{}", "-".repeat(50));

    if !confirm("\nDo you want to proceed with this commit? [y/N]: ")? {
        println!("Commit cancelled.");
        return Ok(());
    }

    git::commit(&text)?;
    println!("Changes committed successfully!");
    Ok(())
}

/// Generate a PR title/description for the branch's divergence from the
/// comparison branch and hand it to `gh pr create`.
fn run_pr(cli: &Cli, base: Option<&str>, no_qa: bool, dry_run: bool) -> Result<()> {
    ensure_repository()?;
    let cfg = Config::from_sources(cli)?;

    let base_branch = match base {
        Some(name) => name.to_string(),
        None => git::main_branch_name(),
    };
    let head_branch = git::current_branch()?;
    let ctx = DiffContext::against(&base_branch)?;

    if ctx.branch_diff.is_none() {
        println!("No changes to analyze between {base_branch} and {head_branch}.");
        return Ok(());
    }

    let client = llm::build_client(&cfg)?;
    println!("Analyzing changes...");
    let prompt = prompt_builder::pr_prompt(&ctx, cfg.language, !no_qa, &base_branch, &head_branch);
    let response = client.send(&prompt)?;
    let result = parse::parse_pr_response(&response);

    let mut title = result.summary.clone();
    let mut body =
        message::assemble_pr_body(&result, ctx.ticket.as_deref(), cfg.ticket_url.as_deref());

    if cli.edit {
        match ShellEditor.edit(&message::pr_edit_buffer(&title, &body))? {
            Edited::Accepted(edited) => match parse::parse_edited_pr(&edited) {
                Some((t, b)) => {
                    title = t;
                    body = b;
                }
                None => {
                    println!("Pull request cancelled.");
                    return Ok(());
                }
            },
            Edited::Cancelled => {
                println!("Pull request cancelled.");
                return Ok(());
            }
        }
    }

    println!("\n{title}\n\n{body}\n");

    if dry_run {
        return Ok(());
    }

    if !confirm("Create this pull request with gh? [y/N]: ")? {
        println!("Pull request cancelled.");
        return Ok(());
    }

    let url = gh::create_pull_request(&title, &body, &base_branch)?;
    println!("Created pull request: {url}");
    Ok(())
}

fn run_review_cmd(cli: &Cli, ruleset: &str) -> Result<()> {
    ensure_repository()?;
    let cfg = Config::from_sources(cli)?;
    let client = llm::build_client(&cfg)?;

    let result = review::run_review(ruleset, client.as_ref())?;
    println!("{}", review::format_validation_result(&result));

    // Exit-status contract: non-zero whenever the verdict is not PASS.
    if result.status != ValidationStatus::Pass {
        std::process::exit(1);
    }
    Ok(())
}

/// Show or update the persisted configuration.
fn run_config(args: &ConfigArgs) -> Result<()> {
    let mut file_cfg = config::load_file_config().unwrap_or_default();

    let updating = args.provider.is_some()
        || args.model.is_some()
        || args.endpoint.is_some()
        || args.api_key.is_some()
        || args.language.is_some()
        || args.ticket_url.is_some();

    if updating {
        config::apply_update(&mut file_cfg, args)?;
        config::save_file_config(&file_cfg)?;
        println!("Configuration updated.");
    }

    let provider: config::Provider = file_cfg.provider.as_deref().unwrap_or("ollama").parse()?;
    println!("\nCurrent configuration:");
    println!("Provider: {}", provider.id());
    println!(
        "Model: {}",
        file_cfg.model.as_deref().unwrap_or(provider.default_model())
    );
    println!(
        "Endpoint: {}",
        file_cfg
            .endpoint
            .as_deref()
            .unwrap_or(provider.default_endpoint())
    );
    println!("Language: {}", file_cfg.language.as_deref().unwrap_or("en"));
    println!(
        "API key: {}",
        if file_cfg.api_key.is_some() {
            "********"
        } else {
            "(not set)"
        }
    );
    println!(
        "Ticket URL: {}",
        file_cfg.ticket_url.as_deref().unwrap_or("(not set)")
    );
    Ok(())
}

fn ensure_repository() -> Result<()> {
    if !git::is_git_repository() {
        bail!("Not a git repository");
    }
    Ok(())
}

/// Ask the user a yes/no question; anything but y/Y declines.
fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt}");
    io::stdout().flush()?;

    let mut buf = String::new();
    io::stdin().read_line(&mut buf)?;
    Ok(buf.trim().eq_ignore_ascii_case("y"))
}
