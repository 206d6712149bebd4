//! Command-line interface definition and dispatch.

use clap::{Parser, Subcommand};

use crate::commands;
use crate::config::Config;
use crate::output::{LogLevel, OutputContext};

/// OCM demo playground — set up, run, and tear down local OCM demos.
#[derive(Parser)]
#[command(name = "ocm-demo", version, about, long_about = None)]
pub struct Cli {
    /// Minimum message severity to print.
    #[arg(long, global = true, value_enum, default_value = "INFO")]
    pub log_level: LogLevel,

    /// Print the commands that would run without executing them.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Install missing prerequisites and start the local registry.
    Setup {
        /// Only report what is missing; change nothing.
        #[arg(long)]
        check_only: bool,
    },
    /// Run the guided demo walkthrough, or one example.
    Demo {
        /// Run a single example instead of the full walkthrough.
        #[arg(long)]
        example: Option<String>,
        /// Do not pause between demo steps.
        #[arg(long)]
        non_interactive: bool,
    },
    /// Run the example scripts as tests.
    Test {
        /// Test a single example instead of all of them.
        #[arg(long)]
        example: Option<String>,
    },
    /// List the available examples.
    List,
    /// Show the environment status.
    Status {
        /// Also list examples and registry contents.
        #[arg(long, short)]
        verbose: bool,
    },
    /// Stop the local registry and clean up.
    Cleanup,
}

impl Cli {
    /// Dispatch the selected command and map its outcome to an exit code:
    /// `0` for success, `1` for failure of any kind.
    #[must_use]
    pub fn run(self) -> i32 {
        let ctx = OutputContext::new(self.no_color, self.log_level);
        let config = Config::from_env();
        let dry_run = self.dry_run;

        let outcome = match self.command {
            Commands::Setup { check_only } => {
                commands::setup::run(&config, &ctx, dry_run, check_only)
            }
            Commands::Demo {
                example,
                non_interactive,
            } => commands::demo::run(&config, &ctx, dry_run, example.as_deref(), non_interactive),
            Commands::Test { example } => {
                commands::test::run(&config, &ctx, dry_run, example.as_deref())
            }
            Commands::List => commands::list::run(&config, &ctx),
            Commands::Status { verbose } => commands::status::run(&config, &ctx, dry_run, verbose),
            Commands::Cleanup => commands::cleanup::run(&config, &ctx, dry_run),
        };

        match outcome {
            Ok(true) => 0,
            Ok(false) => 1,
            Err(e) => {
                ctx.error(&format!("{e:#}"));
                1
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["ocm-demo", "setup", "--dry-run", "--log-level", "DEBUG"])
            .expect("valid invocation");
        assert!(cli.dry_run);
        assert_eq!(cli.log_level, LogLevel::Debug);
        assert!(matches!(cli.command, Commands::Setup { check_only: false }));
    }

    #[test]
    fn test_demo_example_flag_parses() {
        let cli = Cli::try_parse_from(["ocm-demo", "demo", "--example", "01-basic"])
            .expect("valid invocation");
        match cli.command {
            Commands::Demo { example, non_interactive } => {
                assert_eq!(example.as_deref(), Some("01-basic"));
                assert!(!non_interactive);
            }
            _ => panic!("expected demo subcommand"),
        }
    }

    #[test]
    fn test_unknown_log_level_is_rejected() {
        assert!(Cli::try_parse_from(["ocm-demo", "status", "--log-level", "TRACE"]).is_err());
    }
}
