//! SVG flamegraph rendering for finalized hotspot trees.
//!
//! The tree is folded into collapsed-stack lines ("a;b;c weight", weight
//! being the node's self time) and rendered through inferno.

use crate::tree::{HotspotNode, ProfiledTree};
use crate::utils::error::OutputError;
use log::{debug, info};

/// Flamegraph configuration
#[derive(Debug, Clone)]
pub struct FlamegraphConfig {
    pub title: String,
    pub width: usize,
}

impl Default for FlamegraphConfig {
    fn default() -> Self {
        Self {
            title: "Hotspot Profile".to_string(),
            width: 1200,
        }
    }
}

impl FlamegraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

/// One collapsed stack line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollapsedStack {
    pub stack: String,
    pub weight: u64,
}

impl CollapsedStack {
    pub fn to_line(&self) -> String {
        format!("{} {}", self.stack, self.weight)
    }
}

/// Fold a finalized tree into collapsed stacks, one line per node with
/// positive self time. Names resolve through the tree's dictionary.
pub fn fold_tree(tree: &ProfiledTree) -> Vec<CollapsedStack> {
    fn walk(
        node: &HotspotNode,
        prefix: &str,
        name_of: &dyn Fn(i32) -> String,
        out: &mut Vec<CollapsedStack>,
    ) {
        let name = name_of(node.id);
        let stack = if prefix.is_empty() {
            name
        } else {
            format!("{};{}", prefix, name)
        };
        let weight = node.self_time().max(0) as u64;
        if weight > 0 {
            out.push(CollapsedStack {
                stack: stack.clone(),
                weight,
            });
        }
        for child in &node.children {
            walk(child, &stack, name_of, out);
        }
    }

    let dict = tree.dict();
    let name_of = |id: i32| -> String {
        if id < 0 {
            return "all".to_string();
        }
        match dict.get(id as u32) {
            Some(name) => name.to_string(),
            None => format!("#{}", id),
        }
    };

    let mut stacks = Vec::new();
    walk(tree.root(), "", &name_of, &mut stacks);
    debug!("folded tree into {} collapsed stacks", stacks.len());
    stacks
}

/// Render a finalized tree as an SVG flamegraph
pub fn generate_flamegraph(
    tree: &ProfiledTree,
    config: &FlamegraphConfig,
) -> Result<String, OutputError> {
    let stacks = fold_tree(tree);
    if stacks.is_empty() {
        return Err(OutputError::EmptyTree);
    }
    info!("Generating flamegraph from {} stacks", stacks.len());

    let lines: Vec<String> = stacks.iter().map(CollapsedStack::to_line).collect();

    let mut options = inferno::flamegraph::Options::default();
    options.title = config.title.clone();
    options.image_width = Some(config.width);
    options.count_name = "ms".to_string();

    let mut svg = Vec::new();
    inferno::flamegraph::from_lines(&mut options, lines.iter().map(String::as_str), &mut svg)
        .map_err(|e| OutputError::WriteFailed(std::io::Error::other(e.to_string())))?;

    String::from_utf8(svg)
        .map_err(|e| OutputError::WriteFailed(std::io::Error::other(e.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::{ClobIndex, Dictionary};
    use std::sync::Arc;

    #[test]
    fn folds_self_time_per_call_site() {
        let mut dict = Dictionary::new();
        dict.put(1, "outer");
        dict.put(2, "inner");
        let mut tree = ProfiledTree::new(Arc::new(dict), ClobIndex::new());

        let outer = tree.root_mut().get_or_create_child(1);
        outer.total_time = 100;
        outer.count = 1;
        let inner = outer.get_or_create_child(2);
        inner.total_time = 30;
        inner.count = 1;
        tree.finalize().unwrap();

        let stacks = fold_tree(&tree);
        assert!(stacks.contains(&CollapsedStack {
            stack: "all;outer".to_string(),
            weight: 70,
        }));
        assert!(stacks.contains(&CollapsedStack {
            stack: "all;outer;inner".to_string(),
            weight: 30,
        }));
    }
}
