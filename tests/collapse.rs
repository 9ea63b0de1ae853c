//! Tests for folding subgraphs into composite nodes and unfolding them.
mod common;
use common::*;
use fude::prelude::*;
use fude::schema::{collapse_each, expand_each, minimal_collapsible};

fn sorted(set: ahash::AHashSet<String>) -> Vec<String> {
    let mut ids: Vec<String> = set.into_iter().collect();
    ids.sort();
    ids
}

/// `A -> C -> D <- B`: C and D hang off A, but D is also fed by B.
fn branch_schema() -> Schema {
    Schema::new(
        vec![
            source_node("A", "port-a", "noise"),
            source_node("B", "port-b", "noise"),
            filter_node("C", "port-c-in", "port-c-out", "blur"),
            merge_node("D", "port-d1", "port-d2", "port-d3", "merge"),
        ],
        vec![
            link("port-a", "port-c-in"),
            link("port-c-out", "port-d1"),
            link("port-b", "port-d2"),
        ],
    )
}

#[test]
fn test_collapsible_from_takes_the_whole_exclusive_chain() {
    let set = collapsible_from(&["A"], &chain_schema());
    assert_eq!(sorted(set), ["B", "C"]);
}

#[test]
fn test_collapsible_from_leaves_shared_consumers_alone() {
    // C is also fed by B, so collapsing A must not swallow it
    let set = collapsible_from(&["A"], &abc_schema());
    assert!(set.is_empty());
}

#[test]
fn test_collapsible_from_stops_at_the_shared_merge() {
    // C is exclusive to A; D is reachable from B as well
    let set = collapsible_from(&["A"], &branch_schema());
    assert_eq!(sorted(set), ["C"]);
}

#[test]
fn test_minimal_collapsible_reports_surviving_seeds() {
    let seeds = minimal_collapsible(&["A", "B"], &chain_schema());
    assert_eq!(sorted(seeds), ["A"]);

    let lone = minimal_collapsible(&["A"], &abc_schema());
    assert_eq!(sorted(lone), ["A"]);
}

#[test]
fn test_collapse_from_folds_the_cone_into_one_composite() {
    let collapsed = collapse_from("A", &chain_schema());

    assert_eq!(collapsed.nodes.len(), 1);
    assert!(collapsed.links.is_empty());

    let composite = &collapsed.nodes[0];
    assert_eq!(composite.id, "node-0");
    assert!(composite.inputs.is_empty());
    let outputs: Vec<&str> = composite.outputs.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(outputs, ["port-c-out"]);
    // the composite wears the anchor's payload
    assert_eq!(composite.data.op.as_deref(), Some("noise"));

    let inner = composite.collapsed.as_ref().expect("inner schema");
    assert_eq!(inner.nodes.len(), 3);
    assert_eq!(inner.links.len(), 2);
}

#[test]
fn test_collapse_from_keeps_boundary_links_resolving() {
    let collapsed = collapse_from("A", &abc_schema());

    // only A folded; B, C and both links survive at the outer level
    assert_eq!(collapsed.nodes.len(), 3);
    assert_eq!(collapsed.nodes[0].id, "node-0");
    assert_eq!(collapsed.links.len(), 2);

    // the replacement carries A's output, so port-a -> port-c1 still resolves
    assert_eq!(validate_schema(&collapsed), Ok(()));
    let composite = &collapsed.nodes[0];
    let outputs: Vec<&str> = composite.outputs.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(outputs, ["port-a"]);
}

#[test]
fn test_collapse_exposes_inputs_fed_from_outside() {
    let collapsed = collapse_from("C", &branch_schema());

    // C folds alone; its input is fed by the non-member A and stays visible
    let composite = &collapsed.nodes[0];
    let inputs: Vec<&str> = composite.inputs.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(inputs, ["port-c-in"]);
    assert_eq!(validate_schema(&collapsed), Ok(()));
}

#[test]
fn test_collapse_allocates_the_first_gap_id() {
    let schema = Schema::new(
        vec![
            source_node("node-0", "port-0", "noise"),
            source_node("node-2", "port-2", "noise"),
            source_node("X", "port-x", "noise"),
        ],
        vec![],
    );

    let collapsed = collapse_from("X", &schema);
    assert_eq!(collapsed.nodes[0].id, "node-1");
}

#[test]
fn test_collapse_rebases_inner_coordinates_on_the_anchor() {
    let mut schema = chain_schema();
    schema.nodes[0].coordinates = [100.0, 50.0];
    schema.nodes[1].coordinates = [130.0, 80.0];
    schema.nodes[2].coordinates = [160.0, 110.0];

    let collapsed = collapse_from("A", &schema);
    let composite = &collapsed.nodes[0];
    assert_eq!(composite.coordinates, [100.0, 50.0]);

    let inner = composite.collapsed.as_ref().expect("inner schema");
    let a = inner.nodes.iter().find(|n| n.id == "A").expect("A inside");
    let c = inner.nodes.iter().find(|n| n.id == "C").expect("C inside");
    assert_eq!(a.coordinates, [0.0, 0.0]);
    assert_eq!(c.coordinates, [60.0, 60.0]);
}

#[test]
fn test_collapse_with_unknown_id_is_a_noop() {
    let schema = abc_schema();
    assert_eq!(collapse_from("ghost", &schema), schema);
}

#[test]
fn test_expand_inverts_a_collapse_exactly() {
    let chain = chain_schema();
    let round_tripped = expand_from("node-0", &collapse_from("A", &chain));
    assert_eq!(round_tripped, chain);

    let abc = abc_schema();
    let round_tripped = expand_from("node-0", &collapse_from("A", &abc));
    assert_eq!(round_tripped, abc);
}

#[test]
fn test_expand_restores_canvas_coordinates() {
    let mut schema = chain_schema();
    schema.nodes[0].coordinates = [100.0, 50.0];
    schema.nodes[2].coordinates = [160.0, 110.0];

    let expanded = expand_from("node-0", &collapse_from("A", &schema));
    let c = expanded.nodes.iter().find(|n| n.id == "C").expect("C back");
    assert_eq!(c.coordinates, [160.0, 110.0]);
}

#[test]
fn test_expand_without_collapsed_content_is_a_noop() {
    let schema = abc_schema();
    // A exists but carries no collapsed schema
    assert_eq!(expand_from("A", &schema), schema);
    assert_eq!(expand_from("ghost", &schema), schema);
}

#[test]
fn test_collapse_each_noops_on_swallowed_ids() {
    let chain = chain_schema();
    // the first fold swallows B, so B's turn does nothing
    let each = collapse_each(&["A", "B"], &chain);
    assert_eq!(each, collapse_from("A", &chain));
}

#[test]
fn test_collapse_each_then_expand_each_restores_the_node_set() {
    let abc = abc_schema();
    let collapsed = collapse_each(&["A", "B"], &abc);

    // two separate composites plus the untouched C
    assert_eq!(collapsed.nodes.len(), 3);
    assert_eq!(validate_schema(&collapsed), Ok(()));

    let expanded = expand_each(&["node-0", "node-1"], &collapsed);
    let mut ids: Vec<&str> = expanded.nodes.iter().map(|n| n.id.as_str()).collect();
    ids.sort();
    assert_eq!(ids, ["A", "B", "C"]);
    assert_eq!(expanded.links.len(), 2);
    assert_eq!(validate_schema(&expanded), Ok(()));
}
