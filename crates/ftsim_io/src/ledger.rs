use anyhow::{Context, Result, anyhow, bail};
use ftsim_common::ledger::{LEDGER_HEADER, LEDGER_PATH};
use ftsim_common::{Boundary, EcScheme};
use nom::Finish;
use nom::IResult;
use nom::bytes::complete::take_while1;
use nom::character::complete::{alpha1, char, digit1};
use nom::combinator::{all_consuming, map_res};
use nom::number::complete::double;
use nom::sequence::preceded;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// One completed run: its parameters, the failure count and the wall-clock
/// time it finished.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub distance: usize,
    pub ec: EcScheme,
    pub boundaries: Boundary,
    pub delta: f64,
    pub p_swap: f64,
    pub errors: usize,
    pub trials: usize,
    /// Local time as `HH:MM:SS`.
    pub current_time: String,
}

impl fmt::Display for ResultRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{},{},{},{}",
            self.distance,
            self.ec,
            self.boundaries,
            self.delta,
            self.p_swap,
            self.errors,
            self.trials,
            self.current_time
        )
    }
}

/// Whether a ledger file must be started with a header line.
pub fn needs_header(exists: bool) -> bool {
    !exists
}

fn header_line() -> String {
    LEDGER_HEADER.join(",")
}

fn field<'a, O, F>(parser: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    preceded(char(','), parser)
}

fn parse_row(input: &str) -> IResult<&str, ResultRow> {
    let (input, distance) = map_res(digit1, str::parse::<usize>)(input)?;
    let (input, ec) = field(map_res(alpha1, str::parse::<EcScheme>))(input)?;
    let (input, boundaries) = field(map_res(alpha1, str::parse::<Boundary>))(input)?;
    let (input, delta) = field(double)(input)?;
    let (input, p_swap) = field(double)(input)?;
    let (input, errors) = field(map_res(digit1, str::parse::<usize>))(input)?;
    let (input, trials) = field(map_res(digit1, str::parse::<usize>))(input)?;
    let (input, current_time) = field(take_while1(|c: char| c != ','))(input)?;

    Ok((
        input,
        ResultRow {
            distance,
            ec,
            boundaries,
            delta,
            p_swap,
            errors,
            trials,
            current_time: current_time.to_string(),
        },
    ))
}

/// CSV file that accumulates one row per run.
#[derive(Debug, Clone)]
pub struct Ledger {
    path: PathBuf,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(LEDGER_PATH)
    }
}

impl Ledger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `row`, creating the file with its header when absent.
    ///
    /// The existence check happens once, up front. A missing file is
    /// created exclusively (together with its parent directory); an
    /// existing one is opened append-only and its contents are never
    /// rewritten.
    pub fn append(&self, row: &ResultRow) -> Result<()> {
        let exists = self
            .path
            .try_exists()
            .with_context(|| format!("Failed to check ledger {}", self.path.display()))?;

        let mut text = String::new();
        let mut file = if needs_header(exists) {
            if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create ledger directory {}", parent.display())
                })?;
            }
            text.push_str(&header_line());
            text.push('\n');
            OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&self.path)
                .with_context(|| format!("Failed to create ledger {}", self.path.display()))?
        } else {
            OpenOptions::new()
                .append(true)
                .open(&self.path)
                .with_context(|| format!("Failed to open ledger {}", self.path.display()))?
        };

        text.push_str(&row.to_string());
        text.push('\n');
        file.write_all(text.as_bytes())
            .with_context(|| format!("Failed to write ledger {}", self.path.display()))?;
        Ok(())
    }

    /// Reads every row back, checking the header first.
    pub fn read_rows(&self) -> Result<Vec<ResultRow>> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read ledger {}", self.path.display()))?;
        let mut lines = contents.lines();

        let header = lines
            .next()
            .ok_or_else(|| anyhow!("Ledger {} is empty", self.path.display()))?;
        if header.trim_end() != header_line() {
            bail!("Unexpected ledger header: {header}");
        }

        lines
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                all_consuming(parse_row)(line.trim_end())
                    .finish()
                    .map(|(_, row)| row)
                    .map_err(|e| anyhow!("Malformed ledger row {}: {}", i + 2, e))
            })
            .collect()
    }
}
