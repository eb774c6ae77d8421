//! Common definitions and constants shared across the simulation workspace.
//!
//! This crate provides the vocabulary that the command-line layer, the
//! reference code models and the results ledger agree on: error-correction
//! schemes, boundary conditions, default run parameters and the ledger
//! layout. It carries no dependencies so every other crate can use it,
//! including the `no_std` trial engine.

#![no_std]

use core::fmt;
use core::str::FromStr;

/// Error-correction sector selection for a surface code.
///
/// Selects which stabilizer sector(s) of the code are decoded. A primal
/// code corrects one error type on the primal lattice, a dual code the
/// conjugate type on the dual lattice, and `Both` runs the two sectors
/// side by side with a single logical verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EcScheme {
    /// Primal lattice only.
    Primal,
    /// Dual lattice only.
    Dual,
    /// Primal and dual lattices.
    Both,
}

impl EcScheme {
    /// Number of independent decoding sectors this scheme produces.
    pub fn sectors(self) -> usize {
        match self {
            EcScheme::Primal | EcScheme::Dual => 1,
            EcScheme::Both => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EcScheme::Primal => "primal",
            EcScheme::Dual => "dual",
            EcScheme::Both => "both",
        }
    }
}

/// Boundary condition of the code lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Boundary {
    /// Planar code with rough/smooth boundaries.
    Open,
    /// Toric code, every direction wraps around.
    Periodic,
}

impl Boundary {
    pub fn as_str(self) -> &'static str {
        match self {
            Boundary::Open => "open",
            Boundary::Periodic => "periodic",
        }
    }

    /// Whether macronode construction pads the lattice boundary.
    ///
    /// Every boundary except the periodic one is padded.
    pub fn pads_macronodes(self) -> bool {
        self != Boundary::Periodic
    }
}

/// The shared enum a textual tag failed to parse as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    Ec,
    Boundaries,
}

/// Failure to parse one of the shared enums from its textual tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseTagError {
    /// Which enum was being parsed.
    pub kind: TagKind,
}

impl fmt::Display for ParseTagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TagKind::Ec => {
                f.write_str("unknown error-correction scheme (expected primal, dual or both)")
            }
            TagKind::Boundaries => {
                f.write_str("unknown boundary condition (expected open or periodic)")
            }
        }
    }
}

impl core::error::Error for ParseTagError {}

impl FromStr for EcScheme {
    type Err = ParseTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "primal" => Ok(EcScheme::Primal),
            "dual" => Ok(EcScheme::Dual),
            "both" => Ok(EcScheme::Both),
            _ => Err(ParseTagError { kind: TagKind::Ec }),
        }
    }
}

impl FromStr for Boundary {
    type Err = ParseTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "open" => Ok(Boundary::Open),
            "periodic" => Ok(Boundary::Periodic),
            _ => Err(ParseTagError {
                kind: TagKind::Boundaries,
            }),
        }
    }
}

impl fmt::Display for EcScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default run parameters used when the simulator is started without
/// command-line arguments.
///
/// These are plain constants; the command-line layer copies them into an
/// explicit run configuration value before anything else sees them.
pub mod defaults {
    use super::{Boundary, EcScheme};

    /// Code distance.
    pub const DISTANCE: usize = 2;

    /// Error-correction sector(s).
    pub const EC: EcScheme = EcScheme::Primal;

    /// Boundary condition.
    pub const BOUNDARIES: Boundary = Boundary::Open;

    /// Noise width (GKP squeezing) parameter.
    pub const DELTA: f64 = 0.01;

    /// Probability of swapping a GKP state for a p-squeezed state.
    pub const P_SWAP: f64 = 0.5;

    /// Number of Monte Carlo trials.
    pub const TRIALS: usize = 100;

    /// Passive (macronode) architecture.
    pub const PASSIVE: bool = true;
}

/// Layout of the results ledger.
///
/// The ledger is a CSV file with a fixed header. Rows are appended once
/// per run and never rewritten.
pub mod ledger {
    /// Relative location of the ledger written by the command-line tool.
    pub const LEDGER_PATH: &str = "./sims_data/sims_results.csv";

    /// Column names, in order.
    pub const LEDGER_HEADER: [&str; 8] = [
        "distance",
        "ec",
        "boundaries",
        "delta",
        "p_swap",
        "errors",
        "trials",
        "current_time",
    ];

    /// Wall-clock timestamp format (local time, no date).
    pub const TIME_FORMAT: &str = "%H:%M:%S";
}

/// Macronode geometry for the passive architecture.
pub mod macronode {
    /// Modes per macronode: the star at index 0, planets at 1..=3.
    pub const MACRONODE_SIZE: usize = 4;

    /// Index of the star mode inside a macronode.
    pub const STAR: usize = 0;
}
