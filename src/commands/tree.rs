//! `tree` command: aggregate one or more calls streams into a merged
//! hotspot tree.

use crate::codec::{ByteReader, CallScanner, ScanResult};
use crate::filter::StreamCallFilter;
use crate::flamegraph::{generate_flamegraph, FlamegraphConfig};
use crate::meta::{ClobIndex, Dictionary};
use crate::model::{CallEvent, DurationRange, TimeRange};
use crate::output::schema::TreeDocument;
use crate::output::write_document;
use crate::tree::{ProfiledTree, TagKey, TagValue};
use anyhow::{bail, Context, Result};
use log::{debug, info};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for the `tree` command
#[derive(Debug)]
pub struct TreeArgs {
    pub inputs: Vec<PathBuf>,
    pub dictionary: Option<PathBuf>,
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub min_duration: u32,
    pub max_duration: Option<u32>,
    pub query: String,
    pub output: PathBuf,
    pub flamegraph: Option<PathBuf>,
    pub title: Option<String>,
    pub width: usize,
}

pub fn execute_tree(args: TreeArgs) -> Result<()> {
    if args.inputs.is_empty() {
        bail!("at least one calls stream is required");
    }

    let dict = super::calls::load_dictionary(args.dictionary.as_ref())?
        .unwrap_or_default();
    let dict = Arc::new(dict);

    let window = TimeRange::new(args.from.unwrap_or(i64::MIN), args.to.unwrap_or(i64::MAX));
    let range = DurationRange {
        min: args.min_duration,
        max: args.max_duration.unwrap_or(u32::MAX),
    };
    let mut filter = StreamCallFilter::new(range, &args.query);
    filter = filter.enrich(&dict.name_ids());

    // fragments decode independently; the accumulator folds them one by one
    let mut accumulator: Option<ProfiledTree> = None;
    for input in &args.inputs {
        let file = File::open(input)
            .with_context(|| format!("cannot open calls stream {}", input.display()))?;
        let reader = ByteReader::new(BufReader::new(file));
        let mut scanner = CallScanner::new(reader, window);
        let scanned = scanner
            .scan(&filter, i64::MAX)
            .with_context(|| format!("failed to scan {}", input.display()))?;
        info!(
            "{}: {} calls parsed, {} in the tree",
            input.display(),
            scanner.parsed_count(),
            scanner.result_count()
        );

        let fragment = fragment_tree(&scanned, Arc::clone(&dict));
        match &mut accumulator {
            None => accumulator = Some(fragment),
            Some(acc) => acc
                .merge(fragment)
                .context("failed to merge fragment tree")?,
        }
    }

    let Some(mut tree) = accumulator else {
        bail!("no fragments produced a tree");
    };
    tree.finalize().context("failed to finalize tree")?;

    let document = TreeDocument::from_tree(&tree);
    write_document(&document, &args.output)?;
    info!("tree written to {}", args.output.display());

    if let Some(svg_path) = &args.flamegraph {
        let mut config = FlamegraphConfig::new();
        if let Some(title) = &args.title {
            config = config.with_title(title.clone());
        }
        config.width = args.width;
        let svg = generate_flamegraph(&tree, &config)?;
        std::fs::write(svg_path, svg)
            .with_context(|| format!("cannot write flamegraph {}", svg_path.display()))?;
        info!("flamegraph written to {}", svg_path.display());
    }
    Ok(())
}

/// Build one fragment's tree from its scanned call records: each method
/// becomes a call site under the root, its parameter values become tags
/// weighted by the call's duration.
fn fragment_tree(scanned: &ScanResult, dict: Arc<Dictionary>) -> ProfiledTree {
    let mut tree = ProfiledTree::new(dict, ClobIndex::new());
    for call in &scanned.calls {
        fold_call(&mut tree, call);
    }
    debug!("fragment tree built from {} calls", scanned.calls.len());
    tree
}

fn fold_call(tree: &mut ProfiledTree, call: &CallEvent) {
    let root = tree.root_mut();
    root.count += 1;
    root.start_time = root.start_time.min(call.time);
    root.end_time = root.end_time.max(call.end_time());

    let node = root.get_or_create_child(call.method as i32);
    node.total_time += call.duration as i64;
    node.suspension_time += call.suspend_duration as i64;
    node.count += call.calls.max(1) as u64;
    node.start_time = node.start_time.min(call.time);
    node.end_time = node.end_time.max(call.end_time());

    for (&param_id, values) in &call.params {
        for value in values {
            node.tags.fold(
                TagKey::new(param_id as i32, TagValue::Text(value.clone())),
                1,
                call.duration as i64,
            );
        }
    }
}
