use std::io::Read;

use anyhow::{Context, bail};
use chrono::{DateTime, Local, Utc};
use nutty::{AnyNuttyId, FractionalIndex, NuttyId, NuttyTag, is_valid_short_code};
use serde::Serialize;
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let out = Output {
        format: cli.format,
        zone: cli.zone,
    };
    match cli.command {
        Command::New(args) => cmd_new(&out, args),
        Command::Inspect(args) => cmd_inspect(&out, args),
        Command::Check(args) => cmd_check(&out, args),
        Command::Between(args) => cmd_between(&out, args),
        Command::Sequence(args) => cmd_sequence(&out, args),
        Command::Growth(args) => cmd_growth(&out, args),
        Command::Tags(args) => cmd_tags(&out, args),
    }
}

struct Output {
    format: OutputFormat,
    zone: Zone,
}

impl Output {
    /// Prints `value` as JSON, or each of `lines` as text.
    fn emit<T: Serialize>(&self, value: &T, lines: impl IntoIterator<Item = String>) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
            OutputFormat::Text => {
                for line in lines {
                    println!("{line}");
                }
            }
        }
        Ok(())
    }

    fn timestamp(&self, id: &NuttyId) -> String {
        match self.zone {
            Zone::Local => id.created_at_in(&Local).to_rfc3339(),
            Zone::Utc => id.created_at_in(&Utc).to_rfc3339(),
            Zone::Fixed(offset) => id.created_at_in(&offset).to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
struct IdReport {
    wire: String,
    uuid: String,
    short_code: String,
    created_at: String,
}

impl IdReport {
    fn new(out: &Output, id: &NuttyId) -> Self {
        Self {
            wire: id.to_wire_string(),
            uuid: id.uuid().to_string(),
            short_code: id.short_code().to_string(),
            created_at: out.timestamp(id),
        }
    }

    fn lines(&self) -> Vec<String> {
        vec![
            format!("wire:       {}", self.wire),
            format!("uuid:       {}", self.uuid),
            format!("short code: {}", self.short_code),
            format!("created at: {}", self.created_at),
        ]
    }
}

fn cmd_new(out: &Output, args: NewArgs) -> anyhow::Result<()> {
    let at = args
        .at
        .as_deref()
        .map(|s| {
            DateTime::parse_from_rfc3339(s)
                .map(|t| t.with_timezone(&Utc))
                .with_context(|| format!("invalid --at timestamp `{s}`"))
        })
        .transpose()?;

    let ids: Vec<NuttyId> = (0..args.count)
        .map(|_| at.map_or_else(NuttyId::now, NuttyId::at))
        .collect();
    debug!(count = ids.len(), "generated ids");

    let wires: Vec<String> = ids.iter().map(NuttyId::to_wire_string).collect();
    match out.format {
        OutputFormat::Json => {
            let reports: Vec<IdReport> = ids.iter().map(|id| IdReport::new(out, id)).collect();
            out.emit(&reports, Vec::new())
        }
        OutputFormat::Text => out.emit(&wires, wires.clone()),
    }
}

#[derive(Serialize)]
#[serde(tag = "form", rename_all = "snake_case")]
enum InspectReport {
    Associated(IdReport),
    Dissociated { short_code: String },
}

fn cmd_inspect(out: &Output, args: InspectArgs) -> anyhow::Result<()> {
    let any = AnyNuttyId::parse(args.id.trim())
        .with_context(|| format!("`{}` is neither a wire id nor a short code", args.id))?;

    match any {
        AnyNuttyId::Associated(id) => {
            let report = IdReport::new(out, &id);
            let lines = report.lines();
            out.emit(&InspectReport::Associated(report), lines)
        }
        AnyNuttyId::Dissociated(code) => {
            let short_code = code.to_string();
            let lines = vec![
                format!("short code: {short_code}"),
                "dissociated: the full id cannot be recovered from a short code".to_string(),
            ];
            out.emit(&InspectReport::Dissociated { short_code }, lines)
        }
    }
}

#[derive(Serialize)]
struct CheckReport {
    code: String,
    valid: bool,
}

fn cmd_check(out: &Output, args: CheckArgs) -> anyhow::Result<()> {
    let report = CheckReport {
        valid: is_valid_short_code(&args.code),
        code: args.code,
    };
    let verdict = if report.valid { "valid" } else { "invalid" };
    let lines = vec![format!("{}: {verdict}", report.code)];
    out.emit(&report, lines)?;
    if !report.valid {
        bail!("`{}` is not a valid short code", report.code);
    }
    Ok(())
}

#[derive(Serialize)]
struct BetweenReport {
    before: FractionalIndex,
    after: FractionalIndex,
    between: FractionalIndex,
}

fn cmd_between(out: &Output, args: BetweenArgs) -> anyhow::Result<()> {
    let before = FractionalIndex::new(args.before.as_str())
        .with_context(|| format!("invalid index `{}`", args.before))?;
    let after = FractionalIndex::new(args.after.as_str())
        .with_context(|| format!("invalid index `{}`", args.after))?;
    let between = FractionalIndex::between(&before, &after)?;

    let lines = vec![between.to_string()];
    out.emit(&BetweenReport { before, after, between }, lines)
}

/// Ascending keys, each appended after the last.
fn ascending(count: usize) -> anyhow::Result<Vec<FractionalIndex>> {
    let mut keys: Vec<FractionalIndex> = Vec::with_capacity(count);
    for _ in 0..count {
        let next = match keys.last() {
            Some(last) => last.after()?,
            None => FractionalIndex::between(&FractionalIndex::start(), &FractionalIndex::end())?,
        };
        keys.push(next);
    }
    Ok(keys)
}

fn cmd_sequence(out: &Output, args: SequenceArgs) -> anyhow::Result<()> {
    let keys = ascending(args.count)?;
    let lines: Vec<String> = keys.iter().map(ToString::to_string).collect();
    out.emit(&keys, lines)
}

#[derive(Serialize)]
struct GrowthRow {
    step: usize,
    length: usize,
    key: FractionalIndex,
}

/// Inserts repeatedly just after `start()`, halving the same gap each time.
fn narrow_growth(steps: usize, every: usize) -> anyhow::Result<Vec<GrowthRow>> {
    let every = every.max(1);
    let low = FractionalIndex::start();
    let mut high = FractionalIndex::end();
    let mut rows = Vec::new();
    for step in 1..=steps {
        high = FractionalIndex::between(&low, &high)?;
        if step % every == 0 || step == steps {
            rows.push(GrowthRow {
                step,
                length: high.len(),
                key: high.clone(),
            });
        }
    }
    Ok(rows)
}

fn cmd_growth(out: &Output, args: GrowthArgs) -> anyhow::Result<()> {
    let rows = narrow_growth(args.steps, args.every)?;
    let lines: Vec<String> = rows
        .iter()
        .map(|row| format!("{:>6}  {:>4}  {}", row.step, row.length, row.key))
        .collect();
    out.emit(&rows, lines)
}

#[derive(Serialize)]
struct TagReport {
    short_code: String,
    display_text: Option<String>,
}

fn cmd_tags(out: &Output, args: TagsArgs) -> anyhow::Result<()> {
    let text = match args.text {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };

    let tags: Vec<TagReport> = NuttyTag::parse_all(&text)
        .into_iter()
        .map(|tag| TagReport {
            short_code: tag.short_code().to_string(),
            display_text: tag.display_text().map(str::to_string),
        })
        .collect();
    let lines = tags.iter().map(|tag| match &tag.display_text {
        Some(display) => format!("{}  {display}", tag.short_code),
        None => tag.short_code.clone(),
    });
    out.emit(&tags, lines.collect::<Vec<_>>())
}
