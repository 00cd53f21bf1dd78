//! `calls` command: scan a calls stream into a filtered flat list.

use crate::codec::{ByteReader, CallScanner};
use crate::filter::{RecordFilter, StreamCallFilter};
use crate::meta::{resolve_calls, Dictionary};
use crate::model::{DurationRange, TimeRange};
use crate::output::schema::{CallListDocument, CallRow};
use crate::output::write_document;
use crate::utils::config::SCHEMA_VERSION;
use anyhow::{Context, Result};
use log::{info, warn};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

/// Arguments for the `calls` command
#[derive(Debug)]
pub struct CallsArgs {
    pub input: PathBuf,
    pub dictionary: Option<PathBuf>,
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub min_duration: u32,
    pub max_duration: Option<u32>,
    pub query: String,
    pub output: PathBuf,
    pub print_summary: bool,
}

impl CallsArgs {
    fn window(&self) -> TimeRange {
        TimeRange::new(self.from.unwrap_or(i64::MIN), self.to.unwrap_or(i64::MAX))
    }

    fn duration_range(&self) -> DurationRange {
        DurationRange {
            min: self.min_duration,
            max: self.max_duration.unwrap_or(u32::MAX),
        }
    }
}

pub fn execute_calls(args: CallsArgs) -> Result<()> {
    let dict = load_dictionary(args.dictionary.as_ref())?;

    let mut filter = StreamCallFilter::new(args.duration_range(), &args.query);
    if let Some(dict) = &dict {
        filter = filter.enrich(&dict.name_ids());
    }

    let file = File::open(&args.input)
        .with_context(|| format!("cannot open calls stream {}", args.input.display()))?;
    let reader = ByteReader::new(BufReader::new(file));
    let mut scanner = CallScanner::new(reader, args.window());
    let scanned = scanner
        .scan(&filter, i64::MAX)
        .with_context(|| format!("failed to scan {}", args.input.display()))?;

    info!(
        "parsed {} calls, {} passed the early filter",
        scanner.parsed_count(),
        scanner.result_count()
    );

    // name-based pass for the general keywords the early filter deferred;
    // without a dictionary there are no names to match against
    let strict_pass = dict.is_some();
    let resolved = resolve_calls(scanned.calls, &dict.unwrap_or_default());
    let record_filter = RecordFilter::new(&args.query);
    let rows: Vec<CallRow> = resolved
        .iter()
        .filter(|call| !strict_pass || record_filter.accept(call))
        .map(CallRow::from)
        .collect();

    let document = CallListDocument {
        version: SCHEMA_VERSION.to_string(),
        parsed: scanner.parsed_count(),
        matched: rows.len() as u64,
        calls: rows,
        generated_at: chrono::Utc::now().to_rfc3339(),
    };

    if args.print_summary {
        println!(
            "{}: {} scanned, {} matched",
            args.input.display(),
            document.parsed,
            document.matched
        );
    }

    write_document(&document, &args.output)?;
    info!("call list written to {}", args.output.display());
    Ok(())
}

pub(crate) fn load_dictionary(path: Option<&PathBuf>) -> Result<Option<Dictionary>> {
    let Some(path) = path else {
        warn!("no dictionary provided, method names will appear as #id");
        return Ok(None);
    };
    let file = File::open(path)
        .with_context(|| format!("cannot open dictionary {}", path.display()))?;
    let dict = Dictionary::from_lines(BufReader::new(file))
        .with_context(|| format!("failed to read dictionary {}", path.display()))?;
    info!("loaded dictionary with {} names", dict.ids().count());
    Ok(Some(dict))
}
