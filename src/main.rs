use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Instant;

use relative_keys::aggregate::DedupScope;
use relative_keys::keys::{GroupBy, UngroupedPolicy};
use relative_keys::pipeline::PipelineConfig;
use relative_keys::progress::{create_spinner, finish_phase, format_duration, set_log_only};
use relative_keys::report::{render_json, render_text, DEFAULT_BAR_WIDTH};
use relative_keys::safety::validate_output_paths;
use relative_keys::session::Session;
use relative_keys::source::read_records;

#[derive(Parser)]
#[command(name = "relative-keys")]
#[command(about = "Group an artist's tracks by musical key from search result pages")]
struct Args {
    /// Search result pages (JSON). Reads stdin when omitted.
    inputs: Vec<PathBuf>,

    /// Artist to keep (case-insensitive substring of the primary performer)
    #[arg(short, long)]
    query: String,

    #[arg(long, value_enum, default_value = "relative")]
    group_by: GroupByArg,

    /// Keys missing from the relative table: own group, or drop the track
    #[arg(long, value_enum, default_value = "permissive")]
    ungrouped: UngroupedArg,

    /// Compare titles across the whole query or only within a group
    #[arg(long, value_enum, default_value = "query")]
    dedup: DedupArg,

    #[arg(long, value_enum, default_value = "text")]
    format: FormatArg,

    /// Write the report here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write pipeline stats as JSON
    #[arg(long)]
    stats: Option<PathBuf>,

    #[arg(long, default_value_t = DEFAULT_BAR_WIDTH)]
    width: usize,

    /// Hide spinners (tail-friendly output)
    #[arg(long)]
    log_only: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum GroupByArg {
    Relative,
    Key,
}

#[derive(Clone, Copy, ValueEnum)]
enum UngroupedArg {
    Permissive,
    Strict,
}

#[derive(Clone, Copy, ValueEnum)]
enum DedupArg {
    Query,
    Group,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

impl Args {
    fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            group_by: match self.group_by {
                GroupByArg::Relative => GroupBy::Relative,
                GroupByArg::Key => GroupBy::Key,
            },
            ungrouped: match self.ungrouped {
                UngroupedArg::Permissive => UngroupedPolicy::Permissive,
                UngroupedArg::Strict => UngroupedPolicy::Strict,
            },
            dedup_scope: match self.dedup {
                DedupArg::Query => DedupScope::Query,
                DedupArg::Group => DedupScope::Group,
            },
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();
    set_log_only(args.log_only);

    let query = args.query.trim();
    if query.is_empty() {
        bail!("Query must not be blank");
    }

    let sources: Vec<&Path> = args.inputs.iter().map(PathBuf::as_path).collect();
    let mut outputs: Vec<(&Path, &str)> = Vec::new();
    if let Some(ref output) = args.output {
        let extension = match args.format {
            FormatArg::Text => "txt",
            FormatArg::Json => "json",
        };
        outputs.push((output.as_path(), extension));
    }
    if let Some(ref stats) = args.stats {
        outputs.push((stats.as_path(), "json"));
    }
    validate_output_paths(&outputs, &sources)?;

    let start = Instant::now();

    let spinner = create_spinner("Phase 1: Reading search pages");
    let records = read_records(&args.inputs)?;
    finish_phase(&spinner, format!("Phase 1: Read {} records", records.len()));

    let session = Session::new(args.pipeline_config());
    let spinner = create_spinner("Phase 2: Grouping by key");
    let result = session
        .submit(&records, query)
        .context("Query results were superseded")?;
    finish_phase(
        &spinner,
        format!(
            "Phase 2: {} tracks in {} groups ({:.1}% of input)",
            result.stats.accepted_tracks,
            result.stats.groups,
            result.stats.acceptance_rate()
        ),
    );

    if args.log_only {
        result.stats.log_phase("grouping");
    }
    if let Some(ref path) = args.stats {
        result
            .stats
            .write_to_file(path)
            .with_context(|| format!("Failed to write stats to {}", path.display()))?;
    }

    if result.is_empty() {
        eprintln!("No tracks found for '{}'", query);
    }

    let rendered = match args.format {
        FormatArg::Text => render_text(&result.summaries, args.width),
        FormatArg::Json => render_json(&result.summaries).context("Failed to serialize groups")?,
    };

    match args.output {
        Some(ref path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("Wrote {}", path.display());
        }
        None => println!("{}", rendered),
    }

    log::info!("Done in {}", format_duration(start.elapsed()));
    Ok(())
}
