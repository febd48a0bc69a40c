use clap::{Args, Parser, Subcommand};

/// CLI options
#[derive(Parser, Debug)]
#[command(
    name = "gsg",
    version,
    about = "AI-powered Git assistant: commit messages, PR descriptions, code review"
)]
pub struct Cli {
    /// Verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Open the generated text in $EDITOR before it is used
    #[arg(long, global = true)]
    pub edit: bool,

    /// Model name to use, overriding the configured one
    #[arg(long, env = "GSG_MODEL", global = true)]
    pub model: Option<String>,

    /// API key for the configured provider (otherwise its env var is used)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Response language: en or zh
    #[arg(long, global = true)]
    pub language: Option<String>,

    /// Subcommand; omitting it behaves like `gsg commit`
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze staged changes and commit with a generated message
    Commit,

    /// Generate a pull-request description for the current branch
    Pr {
        /// Base branch to compare against; auto-detected when omitted
        #[arg(long)]
        base: Option<String>,

        /// Skip the QA rubric and force the fixed "No QA required" marker
        #[arg(long)]
        no_qa: bool,

        /// Print the PR text without invoking `gh pr create`
        #[arg(long)]
        dry_run: bool,
    },

    /// Review the branch diff against prompt rulesets; exits non-zero unless PASS
    Review {
        /// Ruleset name under ~/.config/git-sage/prompts (common.txt is always applied)
        #[arg(default_value = "common")]
        ruleset: String,
    },

    /// Show or update persisted configuration
    Config(ConfigArgs),
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Backend provider: ollama, openai, modelscope, or dashscope.
    /// Switching provider resets model and endpoint to its defaults.
    #[arg(long)]
    pub provider: Option<String>,

    /// Model name for the selected provider
    #[arg(long)]
    pub model: Option<String>,

    /// Service endpoint URL
    #[arg(long)]
    pub endpoint: Option<String>,

    /// API key for hosted providers
    #[arg(long)]
    pub api_key: Option<String>,

    /// Response language: en or zh
    #[arg(long)]
    pub language: Option<String>,

    /// Issue-tracker base URL used to render ticket tokens as links
    #[arg(long)]
    pub ticket_url: Option<String>,
}
