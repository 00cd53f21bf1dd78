//! Filter DSL behaviour: matcher truth tables over general strings and
//! parameter values, in both id-based and name-based modes.

use calltree_studio::filter::{parse, FilterCondition};
use std::collections::HashMap;

fn matches_general(condition: &FilterCondition, lines: &[&str]) -> bool {
    let mut matcher = condition.start(true);
    for line in lines {
        matcher.add_general_string(line);
    }
    matcher.matches()
}

#[test]
fn matcher_reports_intermediate_failure() {
    let c = parse("worker +complex -ignored");
    let mut t = c.start(true);
    assert!(!t.add_general_string("worker"));
    assert!(!t.add_general_string("worker2"));
    assert!(!t.add_general_string("worke"));
    assert!(!t.add_general_string("complex"));
    assert!(!t.add_general_string("complex2"));
    assert!(!t.add_general_string("comple"));
    assert!(t.add_general_string("ignored"));
    assert!(t.add_general_string("ignored2"));
    assert!(!t.add_general_string("ignore"));
}

#[test]
fn matches_general_strings() {
    let c = parse("option worker +complex +mandatory -ignored");

    assert!(!matches_general(&c, &["complex mandatory"]));
    assert!(matches_general(&c, &["worker complex mandatory"]));
    assert!(matches_general(&c, &["option complex mandatory"]));
    assert!(matches_general(&c, &["option complexed mandatory2"]));

    assert!(!matches_general(&c, &["worker complex"]));
    assert!(!matches_general(&c, &["worker mandatory"]));
    assert!(!matches_general(&c, &["complex"]));
    assert!(!matches_general(&c, &["mandatory"]));

    assert!(!matches_general(&c, &["complex mandatory ignored"]));
    assert!(!matches_general(&c, &["complex mandatory ignored.long"]));
    assert!(matches_general(&c, &["worker complex mandatory ignore"]));
    assert!(!matches_general(&c, &["worker ignore"]));
}

#[test]
fn literal_query_from_the_search_help() {
    // `+clust1 -jsp sysadm administrator`: (sysadm OR administrator)
    // requests on clust1, except jsp calls
    let c = parse("+clust1 -jsp sysadm administrator");

    assert!(matches_general(&c, &["clust1", "administrator"]));
    assert!(matches_general(&c, &["clust1", "sysadm", "administrator"]));
    // missing the mandatory clust1
    assert!(!matches_general(&c, &["sysadm", "administrator"]));
    // excluded keyword kills the record regardless of the rest
    assert!(!matches_general(&c, &["clust1", "administrator", "some.jsp"]));
    // mandatory present but no included keyword found
    assert!(!matches_general(&c, &["clust1"]));
}

fn matches_by_name(condition: &FilterCondition, params: &[(&str, &[&str])]) -> bool {
    let mut matcher = condition.start(true);
    for (name, values) in params {
        let values: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        matcher.add_values_by_name(name, &values);
    }
    matcher.matches()
}

#[test]
fn matches_parameter_values_by_name() {
    let c = parse("+$param1=complex -$param2=ignored");

    assert!(matches_by_name(&c, &[("param1", &["complex mandatory"])]));
    assert!(!matches_by_name(&c, &[("param2", &["complex mandatory"])]));
    assert!(!matches_by_name(&c, &[("param1", &["comple mandatory"])]));
    assert!(matches_by_name(
        &c,
        &[("param1", &["complex mandatory"]), ("param3", &["ignored"])]
    ));
    assert!(matches_by_name(
        &c,
        &[("param1", &["complex mandatory"]), ("param2", &["ignore"])]
    ));
    assert!(!matches_by_name(
        &c,
        &[("param1", &["complex mandatory"]), ("param2", &["ignored"])]
    ));
}

fn matches_by_id(condition: &FilterCondition, params: &[(u32, &[&str])]) -> bool {
    let mut matcher = condition.start(true);
    for (id, values) in params {
        let values: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        matcher.add_values_by_id(*id, &values);
    }
    matcher.matches()
}

#[test]
fn matches_parameter_values_by_id_after_population() {
    let c = parse("+$param1=complex -$param2=ignored");
    let c = c.with_param_ids(&HashMap::from([
        ("param1".to_string(), 1u32),
        ("param2".to_string(), 2u32),
    ]));

    assert!(matches_by_id(&c, &[(1, &["complex mandatory"])]));
    assert!(!matches_by_id(&c, &[(2, &["complex mandatory"])]));
    assert!(!matches_by_id(&c, &[(1, &["comple mandatory"])]));
    assert!(matches_by_id(
        &c,
        &[(1, &["complex mandatory"]), (3, &["ignored"])]
    ));
    assert!(matches_by_id(
        &c,
        &[(1, &["complex mandatory"]), (2, &["ignore"])]
    ));
    assert!(!matches_by_id(
        &c,
        &[(1, &["complex mandatory"]), (2, &["ignored"])]
    ));
}

#[test]
fn empty_condition_matches_everything() {
    let c = parse("");
    assert!(c.is_empty());
    assert!(matches_general(&c, &[]));
    assert!(matches_general(&c, &["anything at all"]));
}

#[test]
fn matching_is_commutative_over_feed_order() {
    let c = parse("+clust1 -jsp sysadm");
    let lines = ["administrator", "clust1", "sysadm"];
    for rotation in 0..lines.len() {
        let mut rotated = lines.to_vec();
        rotated.rotate_left(rotation);
        assert!(matches_general(&c, &rotated), "order {:?}", rotated);
    }
}

#[test]
fn general_keyword_can_match_a_parameter_name() {
    let c = parse("web.url");
    assert!(matches_by_name(&c, &[("web.url", &["/orders"])]));
    assert!(!matches_by_name(&c, &[("nc.user", &["sysadm"])]));
}
