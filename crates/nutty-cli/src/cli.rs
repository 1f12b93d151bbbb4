use std::str::FromStr;

use chrono::FixedOffset;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "nutty",
    about = "Generate and inspect Nutty IDs and fractional indices",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Zone for rendering creation times: `local`, `utc` or an offset like `+09:00`
    #[arg(long, global = true, env = "NUTTY_ZONE", default_value = "local")]
    pub zone: Zone,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Zone {
    Local,
    Utc,
    Fixed(FixedOffset),
}

impl FromStr for Zone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(Zone::Local),
            "utc" | "z" => Ok(Zone::Utc),
            _ => parse_offset(s)
                .map(Zone::Fixed)
                .ok_or_else(|| format!("expected `local`, `utc` or `±HH:MM`, got `{s}`")),
        }
    }
}

fn parse_offset(s: &str) -> Option<FixedOffset> {
    let (sign, rest) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };
    let (hours, minutes) = rest.split_once(':').unwrap_or((rest, "00"));
    let hours = unsigned_component(hours)?;
    let minutes = unsigned_component(minutes)?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// One or two ASCII digits, no sign.
fn unsigned_component(s: &str) -> Option<i32> {
    if s.is_empty() || s.len() > 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate new identifiers
    New(NewArgs),
    /// Decode a wire identifier or short code
    Inspect(InspectArgs),
    /// Check whether a short code is valid
    Check(CheckArgs),
    /// Generate an index between two indices
    Between(BetweenArgs),
    /// Generate a run of ascending indices
    Sequence(SequenceArgs),
    /// Show key growth under repeated insertion into one gap
    Growth(GrowthArgs),
    /// Extract [[tags]] from text
    Tags(TagsArgs),
}

#[derive(Args)]
pub struct NewArgs {
    #[arg(short = 'n', long, default_value = "1")]
    pub count: usize,
    /// Creation time (RFC 3339) instead of the current clock
    #[arg(long)]
    pub at: Option<String>,
}

#[derive(Args)]
pub struct InspectArgs {
    pub id: String,
}

#[derive(Args)]
pub struct CheckArgs {
    pub code: String,
}

#[derive(Args)]
pub struct BetweenArgs {
    pub before: String,
    pub after: String,
}

#[derive(Args)]
pub struct SequenceArgs {
    #[arg(short = 'n', long, default_value = "5")]
    pub count: usize,
}

#[derive(Args)]
pub struct GrowthArgs {
    #[arg(long, default_value = "100")]
    pub steps: usize,
    /// Print a row every this many steps
    #[arg(long, default_value = "10")]
    pub every: usize,
}

#[derive(Args)]
pub struct TagsArgs {
    /// Text to scan; read from stdin when omitted
    pub text: Option<String>,
}
