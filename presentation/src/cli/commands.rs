//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for consultation reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Per-role attribution, rounds, consensus and narrative
    Full,
    /// Only consensus buckets and the narrative
    Summary,
    /// JSON output
    Json,
}

/// CLI arguments for agora
#[derive(Parser, Debug)]
#[command(name = "agora")]
#[command(author, version, about = "Agent lifecycles and multi-role consultations")]
#[command(long_about = r#"
Agora puts a question to several specialist roles at once and compiles
what they agree on.

A consultation runs in phases:
1. Dispatch: every role answers in parallel, each with its own timeout
2. Synthesis rounds: roles critique each other and refine their positions
3. Consensus: positions are bucketed into unanimous, majority, dissent, open
4. Compile: a report with per-role attribution and a synthesis narrative

Configuration files are loaded from (in priority order):
1. AGORA_<SECTION>__<KEY>  Environment variables
2. --config <path>         Explicit config file
3. ./agora.toml            Project-level config
4. ~/.config/agora/config.toml   Global config

Example:
  agora consult "Should we shard the orders table?"
  agora consult -r security -r performance --rounds 1 "Cache session tokens in Redis?"
  agora simulate scout orient act echo consolidate rest --fracture 0.8
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Also write logs to a daily rolling file in this directory
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a consultation
    Consult(ConsultArgs),

    /// List the built-in roles, optionally scored against a query
    Roles {
        /// Score every role against this query
        query: Option<String>,
    },

    /// Walk one agent through a sequence of requested states
    Simulate(SimulateArgs),

    /// Show configuration sources and the merged configuration
    ShowConfig,
}

#[derive(Args, Debug)]
pub struct ConsultArgs {
    /// The question to put to the roles
    pub query: String,

    /// Roles to consult (can be specified multiple times); default selects automatically
    #[arg(short, long, value_name = "ROLE")]
    pub role: Vec<String>,

    /// Number of critique/refine rounds
    #[arg(long, value_name = "N")]
    pub rounds: Option<usize>,

    /// Model writing the synthesis narrative
    #[arg(long, value_name = "MODEL")]
    pub moderator: Option<String>,

    /// Per-role timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub role_timeout: Option<u64>,

    /// Session budget in seconds
    #[arg(long, value_name = "SECS")]
    pub budget: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    pub output: OutputFormat,
}

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Agent id to register
    pub agent: String,

    /// Requested states, in order (e.g. orient act echo)
    #[arg(required = true, value_name = "STATE")]
    pub states: Vec<String>,

    /// Agent type whose lifecycle profile applies
    #[arg(long, default_value = "default")]
    pub agent_type: String,

    /// Fracture index set before the first transition
    #[arg(long, value_name = "F")]
    pub fracture: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_consult() {
        let cli = Cli::try_parse_from([
            "agora", "-vv", "consult", "-r", "security", "-r", "ux", "--rounds", "1", "Q?",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Consult(args) => {
                assert_eq!(args.query, "Q?");
                assert_eq!(args.role, vec!["security", "ux"]);
                assert_eq!(args.rounds, Some(1));
                assert_eq!(args.output, OutputFormat::Summary);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_simulate() {
        let cli = Cli::try_parse_from([
            "agora", "simulate", "scout", "orient", "act", "--fracture", "0.8",
        ])
        .unwrap();
        match cli.command {
            Command::Simulate(args) => {
                assert_eq!(args.agent, "scout");
                assert_eq!(args.states, vec!["orient", "act"]);
                assert_eq!(args.fracture, Some(0.8));
                assert_eq!(args.agent_type, "default");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_simulate_requires_states() {
        assert!(Cli::try_parse_from(["agora", "simulate", "scout"]).is_err());
    }
}
