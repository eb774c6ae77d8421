//! Command-line surface.
//!
//! The tool takes either no arguments at all, in which case the built-in
//! defaults are used, or exactly seven positionals.

use crate::config::RunConfig;
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use ftsim_common::{Boundary, EcScheme};
use std::ffi::OsString;

#[derive(Parser, Debug)]
#[command(
    name = "ftsim",
    version,
    about = "Monte Carlo fault-tolerance simulations of a surface code",
    after_help = "Run without arguments to use the defaults: 2 primal open 0.01 0.5 100 true.\n\
                  Environment: FTSIM_SEED, FTSIM_THREADS, RUST_LOG."
)]
struct Cli {
    /// Code distance
    distance: usize,

    /// Error-correction sector(s): primal, dual or both
    ec: EcScheme,

    /// Boundary condition: open or periodic
    boundaries: Boundary,

    /// Noise width (GKP squeezing) parameter
    delta: f64,

    /// Probability of swapping a GKP state for a p-squeezed state
    p_swap: f64,

    /// Number of Monte Carlo trials
    trials: usize,

    /// Use the passive (macronode) architecture
    #[arg(action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    passive: bool,
}

impl From<Cli> for RunConfig {
    fn from(cli: Cli) -> Self {
        RunConfig {
            distance: cli.distance,
            ec: cli.ec,
            boundaries: cli.boundaries,
            delta: cli.delta,
            p_swap: cli.p_swap,
            trials: cli.trials,
            passive: cli.passive,
        }
    }
}

/// Builds the run configuration from a full argument list, program name
/// included.
pub fn parse_args<I, T>(args: I) -> Result<RunConfig, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    if args.len() <= 1 {
        return Ok(RunConfig::default());
    }
    Cli::try_parse_from(args).map(RunConfig::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments_use_defaults() {
        assert_eq!(parse_args(["ftsim"]).unwrap(), RunConfig::default());
    }

    #[test]
    fn seven_positionals() {
        let config =
            parse_args(["ftsim", "3", "both", "periodic", "0.1", "0.25", "500", "false"]).unwrap();
        assert_eq!(config.distance, 3);
        assert_eq!(config.ec, EcScheme::Both);
        assert_eq!(config.boundaries, Boundary::Periodic);
        assert_eq!(config.delta, 0.1);
        assert_eq!(config.p_swap, 0.25);
        assert_eq!(config.trials, 500);
        assert!(!config.passive);
    }

    #[test]
    fn passive_accepts_boolish_words() {
        for (word, expected) in [("yes", true), ("1", true), ("off", false), ("no", false)] {
            let config =
                parse_args(["ftsim", "2", "primal", "open", "0.01", "0.5", "10", word]).unwrap();
            assert_eq!(config.passive, expected, "{word}");
        }
    }

    #[test]
    fn partial_or_malformed_arguments_fail() {
        assert!(parse_args(["ftsim", "3", "primal"]).is_err());
        assert!(parse_args(["ftsim", "3", "sideways", "open", "0.1", "0.5", "10", "true"]).is_err());
        assert!(parse_args(["ftsim", "x", "primal", "open", "0.1", "0.5", "10", "true"]).is_err());
        assert!(parse_args(["ftsim", "3", "primal", "open", "0.1", "0.5", "10", "maybe"]).is_err());
    }
}
