//! Tests for the schema-to-graph projection and the reachability queries.
mod common;
use common::*;
use fude::prelude::*;

/// Two filters feeding each other: the smallest cyclic diagram.
fn cyclic_schema() -> Schema {
    Schema::new(
        vec![
            filter_node("A", "port-a-in", "port-a-out", "blur"),
            filter_node("B", "port-b-in", "port-b-out", "blur"),
        ],
        vec![
            link("port-a-out", "port-b-in"),
            link("port-b-out", "port-a-in"),
        ],
    )
}

fn key_set(graph: &Graph) -> Vec<&str> {
    let mut ids: Vec<&str> = graph.ids().collect();
    ids.sort();
    ids
}

// adjacency as a deduplicated edge list; undirecting may store an edge twice
fn edge_set(graph: &Graph) -> Vec<(String, String)> {
    let mut edges: Vec<(String, String)> = Vec::new();
    for id in graph.ids() {
        for target in graph.neighbors(id).unwrap() {
            edges.push((id.to_string(), target.clone()));
        }
    }
    edges.sort();
    edges.dedup();
    edges
}

#[test]
fn test_graph_builds_producer_consumer_edges() {
    let graph = Graph::from_schema(&abc_schema());

    assert_eq!(graph.len(), 3);
    assert_eq!(graph.neighbors("A").unwrap(), ["C"]);
    assert_eq!(graph.neighbors("B").unwrap(), ["C"]);
    assert!(graph.neighbors("C").unwrap().is_empty());
}

#[test]
fn test_graph_keys_every_node_even_without_links() {
    let schema = Schema::new(vec![source_node("lone", "port-l", "noise")], vec![]);
    let graph = Graph::from_schema(&schema);

    assert!(graph.contains("lone"));
    assert!(graph.neighbors("lone").unwrap().is_empty());
}

#[test]
fn test_graph_resolves_swapped_link_orientation() {
    // the same diagram as abc_schema, but every link records its ends
    // the other way around
    let schema = Schema::new(
        vec![
            source_node("A", "port-a", "noise"),
            source_node("B", "port-b", "noise"),
            merge_node("C", "port-c1", "port-c2", "port-c3", "merge"),
        ],
        vec![link("port-c1", "port-a"), link("port-c2", "port-b")],
    );
    let graph = Graph::from_schema(&schema);

    assert_eq!(graph.neighbors("A").unwrap(), ["C"]);
    assert_eq!(graph.neighbors("B").unwrap(), ["C"]);
}

#[test]
fn test_graph_skips_links_that_resolve_in_neither_orientation() {
    let mut schema = abc_schema();
    schema.links.push(link("port-a", "no-such-port"));
    let graph = Graph::from_schema(&schema);

    assert_eq!(graph.len(), 3);
    assert_eq!(graph.neighbors("A").unwrap(), ["C"]);
}

#[test]
fn test_children_walks_downstream_and_excludes_seeds() {
    let graph = Graph::from_schema(&chain_schema());

    let from_a = graph.children(&["A"]);
    assert_eq!(from_a.len(), 2);
    assert!(from_a.contains("B"));
    assert!(from_a.contains("C"));
    assert!(!from_a.contains("A"));

    let from_b = graph.children(&["B"]);
    assert_eq!(from_b.len(), 1);
    assert!(from_b.contains("C"));

    assert!(graph.children(&["C"]).is_empty());
}

#[test]
fn test_children_includes_seed_reached_through_cycle() {
    let graph = Graph::from_schema(&cyclic_schema());

    let from_a = graph.children(&["A"]);
    assert!(from_a.contains("B"));
    assert!(from_a.contains("A"));
}

#[test]
fn test_children_ignores_unknown_seeds() {
    let graph = Graph::from_schema(&abc_schema());
    assert!(graph.children(&["ghost"]).is_empty());
}

#[test]
fn test_children_closure_is_idempotent() {
    for schema in [abc_schema(), chain_schema(), cyclic_schema()] {
        let graph = Graph::from_schema(&schema);
        for seeds in [vec!["A"], vec!["B"], vec!["A", "B"]] {
            // close over the seeds, then walk again from the whole closure
            let mut closed = graph.children(&seeds);
            for seed in &seeds {
                closed.insert((*seed).to_string());
            }
            let as_refs: Vec<&str> = closed.iter().map(String::as_str).collect();
            for id in graph.children(&as_refs) {
                assert!(closed.contains(&id), "walking {:?} again reached '{}'", seeds, id);
            }
        }
    }
}

#[test]
fn test_reversed_flips_every_edge() {
    let graph = Graph::from_schema(&abc_schema()).reversed();

    let into_c = graph.neighbors("C").unwrap();
    assert_eq!(into_c.len(), 2);
    assert!(into_c.contains(&"A".to_string()));
    assert!(into_c.contains(&"B".to_string()));
    assert!(graph.neighbors("A").unwrap().is_empty());
}

#[test]
fn test_reversing_twice_restores_the_graph() {
    for schema in [abc_schema(), chain_schema(), cyclic_schema()] {
        let graph = Graph::from_schema(&schema);
        let round_trip = graph.reversed().reversed();

        assert_eq!(key_set(&round_trip), key_set(&graph));
        assert_eq!(edge_set(&round_trip), edge_set(&graph));
    }
}

#[test]
fn test_undirected_reaches_siblings_through_shared_consumer() {
    let graph = Graph::from_schema(&abc_schema()).undirected();

    let component = graph.children(&["A"]);
    assert!(component.contains("B"));
    assert!(component.contains("C"));
}

#[test]
fn test_undirecting_twice_adds_nothing() {
    for schema in [abc_schema(), chain_schema(), cyclic_schema()] {
        let once = Graph::from_schema(&schema).undirected();
        let twice = once.undirected();

        assert_eq!(key_set(&twice), key_set(&once));
        assert_eq!(edge_set(&twice), edge_set(&once));
    }
}

#[test]
fn test_roots_are_the_dataflow_sources() {
    let roots = Graph::from_schema(&abc_schema()).roots();
    assert_eq!(roots.len(), 2);
    assert!(roots.contains("A"));
    assert!(roots.contains("B"));

    let chain_roots = Graph::from_schema(&chain_schema()).roots();
    assert_eq!(chain_roots.len(), 1);
    assert!(chain_roots.contains("A"));
}

#[test]
fn test_roots_from_is_scoped_to_the_seed_component() {
    // abc plus an unrelated two-node pipeline
    let mut schema = abc_schema();
    schema.nodes.push(source_node("D", "port-d", "noise"));
    schema
        .nodes
        .push(filter_node("E", "port-e-in", "port-e-out", "blur"));
    schema.links.push(link("port-d", "port-e-in"));
    let graph = Graph::from_schema(&schema);

    let from_c = graph.roots_from(&["C"]);
    assert_eq!(from_c.len(), 2);
    assert!(from_c.contains("A"));
    assert!(from_c.contains("B"));

    let from_e = graph.roots_from(&["E"]);
    assert_eq!(from_e.len(), 1);
    assert!(from_e.contains("D"));
}

#[test]
fn test_roots_from_drops_fully_isolated_seeds() {
    let mut schema = abc_schema();
    schema.nodes.push(source_node("L", "port-l", "noise"));
    let graph = Graph::from_schema(&schema);

    // an unlinked node reaches nothing, so no roots come back for it
    assert!(graph.roots_from(&["L"]).is_empty());
}

#[test]
fn test_without_removes_keys_and_edges() {
    let graph = Graph::from_schema(&abc_schema());
    let trimmed = graph.without(&["C"]);

    assert_eq!(trimmed.len(), 2);
    assert!(!trimmed.contains("C"));
    assert!(trimmed.neighbors("A").unwrap().is_empty());

    // the receiver is untouched
    assert_eq!(graph.neighbors("A").unwrap(), ["C"]);
}

#[test]
fn test_empty_schema_projects_to_empty_graph() {
    let graph = Graph::from_schema(&Schema::default());
    assert!(graph.is_empty());
    assert!(graph.roots().is_empty());
    assert!(graph.children(&[]).is_empty());
}
