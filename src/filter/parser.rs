//! Parser for the search query mini-language.
//!
//! 1. Use `+` before a word for mandatory, `-` to exclude, or quotes for
//!    'exact phrase' filtering
//! 2. Use `$param=value` for filtering on a parameter value
//! 3. Keywords without modifiers work as a SHOULD condition - at least one
//!    of them has to be found
//! 4. Keywords match by containment, not equality
//!
//! Examples:
//! `+clust1 sysadm administrator`      - all (sysadm OR administrator) requests made to clust1.
//! `'test page' -cust2`                - requests matching phrase 'test page' except those to cust2.
//! `+clust1 -jsp sysadm administrator` - (sysadm OR administrator) requests on clust1 except jsp calls.
//! `+$node.name=clust1 -$web.url=jsp $nc.user=sysadm $nc.user=administrator`
//!                                     - the same search with explicit parameters.

use super::condition::FilterCondition;
use super::term::FilterTerm;
use regex::Regex;
use std::sync::LazyLock;

static TOKEN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([+-]?(("[^"]*?")|('[^']*?')|(`[^`]*?`)))|\S+"#).unwrap()
});

static PARAMETER_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$(\S+)=(\S+)").unwrap());

/// Parse a query string into a structured condition.
///
/// Never fails: malformed fragments degrade to plain keywords.
pub fn parse(query: &str) -> FilterCondition {
    if query.trim().is_empty() {
        return FilterCondition::default();
    }

    let mut mandatory = Vec::new();
    let mut included = Vec::new();
    let mut excluded = Vec::new();

    for token in TOKEN_REGEX.find_iter(query) {
        let mut expr = token.as_str();
        if expr.trim().is_empty() {
            continue;
        }

        let first = expr.chars().next().unwrap_or(' ');
        let bucket = match first {
            '+' => &mut mandatory,
            '-' => &mut excluded,
            _ => &mut included,
        };
        if first == '+' || first == '-' {
            expr = &expr[1..];
        }
        let expr = strip_quotes(expr);
        if expr.trim().is_empty() {
            continue;
        }

        let mut found_param = false;
        for captures in PARAMETER_REGEX.captures_iter(expr) {
            if let (Some(param), Some(value)) = (captures.get(1), captures.get(2)) {
                found_param = true;
                bucket.push(FilterTerm::for_param(
                    strip_quotes(param.as_str()),
                    strip_quotes(value.as_str()),
                ));
            }
        }
        if !found_param {
            bucket.push(FilterTerm::general(expr));
        }
    }

    FilterCondition::new(included, excluded, mandatory)
}

/// Strip one matching layer of `"`, `'` or `` ` `` quotes
fn strip_quotes(expr: &str) -> &str {
    let mut expr = expr;
    for quote in ['"', '\'', '`'] {
        if expr.len() > 2 && expr.starts_with(quote) && expr.ends_with(quote) {
            expr = &expr[1..expr.len() - 1];
        }
    }
    expr
}
