#![forbid(unsafe_code)]

mod cmd;
mod config;
mod markdown;
mod output;
mod tui;

use clap::{CommandFactory, Parser, Subcommand};
use output::OutputMode;
use std::env;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "wikiscope: browse your GitLab projects and read their wikis",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Derive the output mode from flags.
    fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Session",
        about = "Validate a token and save credentials",
        long_about = "Validate a personal access token against the instance and save it.",
        after_help = "EXAMPLES:\n    # Log in to gitlab.com\n    wks login --token glpat-...\n\n    # Log in to a self-hosted instance, token from the environment\n    WIKISCOPE_TOKEN=glpat-... wks login --url https://git.example.com"
    )]
    Login(cmd::login::LoginArgs),

    #[command(
        next_help_heading = "Session",
        about = "Delete saved credentials",
        long_about = "Delete saved credentials and the session state; the cache survives unless purged.",
        after_help = "EXAMPLES:\n    # Log out, keep the cached project list\n    wks logout\n\n    # Log out and drop the cache too\n    wks logout --purge-cache"
    )]
    Logout(cmd::logout::LogoutArgs),

    #[command(
        next_help_heading = "Cache",
        about = "Refresh the cached project list",
        long_about = "Fetch the project list from GitLab and replace the local snapshot.",
        after_help = "EXAMPLES:\n    # Refresh the snapshot\n    wks sync\n\n    # Emit machine-readable output\n    wks sync --json"
    )]
    Sync(cmd::sync::SyncArgs),

    #[command(
        next_help_heading = "Cache",
        about = "Show credentials, cache, and selection state",
        after_help = "EXAMPLES:\n    # Human summary\n    wks status\n\n    # Emit machine-readable output\n    wks status --json"
    )]
    Status(cmd::status::StatusArgs),

    #[command(
        next_help_heading = "Read",
        about = "List cached projects as a group tree",
        long_about = "List the cached projects, grouped into their namespace hierarchy and scoped to the active group selection.",
        after_help = "EXAMPLES:\n    # Tree of visible projects\n    wks projects\n\n    # Flat list narrowed by a query\n    wks projects --flat api\n\n    # Force a refresh first\n    wks projects --refresh"
    )]
    Projects(cmd::projects::ProjectsArgs),

    #[command(
        next_help_heading = "Read",
        about = "List groups and manage the active selection",
        long_about = "List accessible groups and select which ones scope the project list. An empty selection shows every project.",
        after_help = "EXAMPLES:\n    # List groups, active ones marked\n    wks groups\n\n    # Scope to two groups (subgroups are included automatically)\n    wks groups select 42 50\n\n    # Back to everything\n    wks groups none"
    )]
    Groups(cmd::groups::GroupsArgs),

    #[command(
        next_help_heading = "Read",
        about = "Read a project's wiki",
        long_about = "List a project's wiki pages or render one to the terminal.",
        after_help = "EXAMPLES:\n    # First page of a project's wiki\n    wks wiki acme/core/docs\n\n    # A specific page by slug\n    wks wiki acme/core/docs getting-started\n\n    # Just the page listing\n    wks wiki 42 --pages"
    )]
    Wiki(cmd::wiki::WikiArgs),

    #[command(
        next_help_heading = "Read",
        about = "Interactive full-screen browser",
        long_about = "Open the interactive browser: the group tree with search, background refresh, and an inline wiki reader.",
        after_help = "EXAMPLES:\n    # Browse interactively\n    wks browse"
    )]
    Browse(cmd::browse::BrowseArgs),

    #[command(
        next_help_heading = "Maintenance",
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    wks completions bash\n\n    # Generate zsh completions\n    wks completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool, quiet: bool) {
    let default = if verbose || env::var("DEBUG").is_ok() {
        "wikiscope=debug,info"
    } else if quiet {
        "wikiscope=warn,error"
    } else {
        "wikiscope=info,warn"
    };
    let filter =
        EnvFilter::try_from_env("WIKISCOPE_LOG").unwrap_or_else(|_| EnvFilter::new(default));

    let format = env::var("WIKISCOPE_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    // Logs go to stderr: stdout belongs to command output (and the TUI).
    let registry = tracing_subscriber::registry().with(filter);
    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let output = cli.output_mode();

    match cli.command {
        Commands::Login(ref args) => cmd::login::run_login(args, output).await,
        Commands::Logout(ref args) => cmd::logout::run_logout(args, output),
        Commands::Sync(ref args) => cmd::sync::run_sync(args, output).await,
        Commands::Status(ref args) => cmd::status::run_status(args, output),
        Commands::Projects(ref args) => cmd::projects::run_projects(args, output).await,
        Commands::Groups(ref args) => cmd::groups::run_groups(args, output).await,
        Commands::Wiki(ref args) => cmd::wiki::run_wiki(args, output).await,
        Commands::Browse(ref args) => cmd::browse::run_browse(args).await,
        Commands::Completions(args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_flag_sets_output_mode() {
        let cli = Cli::parse_from(["wks", "--json", "status"]);
        assert!(cli.json);
        assert!(cli.output_mode().is_json());
    }

    #[test]
    fn json_flag_after_subcommand() {
        let cli = Cli::parse_from(["wks", "status", "--json"]);
        assert!(cli.json);
        assert!(cli.output_mode().is_json());
    }

    #[test]
    fn default_output_is_human() {
        let cli = Cli::parse_from(["wks", "status"]);
        assert!(!cli.json);
        assert!(!cli.output_mode().is_json());
    }

    #[test]
    fn quiet_flag_parsed() {
        let cli = Cli::parse_from(["wks", "-q", "status"]);
        assert!(cli.quiet);
    }

    #[test]
    fn quiet_short_flag_works_alongside_the_projects_query() {
        // `-q` is reserved for the global quiet flag; the query is long-only.
        let cli = Cli::parse_from(["wks", "projects", "-q", "--query", "api"]);
        assert!(cli.quiet);
        match cli.command {
            Commands::Projects(args) => assert_eq!(args.query, "api"),
            other => panic!("expected projects, got {other:?}"),
        }
    }

    #[test]
    fn verbose_flag_parses_after_subcommand() {
        let cli = Cli::parse_from(["wks", "sync", "--verbose"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Sync(_)));
    }

    #[test]
    fn login_subcommand_parses() {
        let cli = Cli::parse_from(["wks", "login", "--token", "glpat-x"]);
        assert!(matches!(cli.command, Commands::Login(_)));
    }

    #[test]
    fn wiki_subcommand_parses() {
        let cli = Cli::parse_from(["wks", "wiki", "acme/docs"]);
        assert!(matches!(cli.command, Commands::Wiki(_)));
    }

    #[test]
    fn groups_select_parses() {
        let cli = Cli::parse_from(["wks", "groups", "select", "42"]);
        assert!(matches!(cli.command, Commands::Groups(_)));
    }

    #[test]
    fn completions_subcommand_parses() {
        let cli = Cli::parse_from(["wks", "completions", "bash"]);
        assert!(matches!(
            cli.command,
            Commands::Completions(cmd::completions::CompletionsArgs {
                shell: clap_complete::Shell::Bash,
            })
        ));
    }

    #[test]
    fn all_subcommands_listed() {
        // Verify every documented subcommand exists by parsing each.
        let subcommands = [
            vec!["wks", "login", "--token", "t"],
            vec!["wks", "logout"],
            vec!["wks", "sync"],
            vec!["wks", "status"],
            vec!["wks", "projects"],
            vec!["wks", "groups"],
            vec!["wks", "groups", "select", "1"],
            vec!["wks", "wiki", "p"],
            vec!["wks", "browse"],
            vec!["wks", "completions", "zsh"],
        ];
        for args in &subcommands {
            let result = Cli::try_parse_from(args.iter());
            assert!(
                result.is_ok(),
                "Failed to parse: {:?} — error: {:?}",
                args,
                result.err()
            );
        }
    }
}
