//! Folding a subgraph into a single composite node and unfolding it again.
//!
//! A composite node carries the folded inner schema in its `collapsed` field
//! and keeps the subset's boundary ports visible, so outer links keep
//! resolving and the compiler can lower the inner schema recursively.

use super::model::{id_number, Node, Schema};
use super::partition::{exposed_outputs, exposed_ports, split_schema, SchemaSplit};
use crate::graph::Graph;
use ahash::AHashSet;
use itertools::Itertools;

/// The nodes reachable from the seeds that are reachable *only* through the
/// seeds: removing the seeds disconnects them from every other root of their
/// component. These are the nodes a collapse starting at the seeds may
/// swallow. The seeds themselves are never part of the result; callers union
/// them in explicitly.
pub fn collapsible_from(ids: &[&str], schema: &Schema) -> AHashSet<String> {
    let graph = Graph::from_schema(schema);
    let downstream = graph.children(ids);
    let root_set = graph.roots_from(ids);
    let root_refs: Vec<&str> = root_set.iter().map(String::as_str).collect();
    let still_reachable = graph.without(ids).children(&root_refs);
    downstream
        .difference(&still_reachable)
        .cloned()
        .collect()
}

/// The seeds that did not make it into their own collapsible set. Selection
/// tooling uses this to show which picked nodes would survive a fold.
pub fn minimal_collapsible(ids: &[&str], schema: &Schema) -> AHashSet<String> {
    let collapsible = collapsible_from(ids, schema);
    ids.iter()
        .filter(|id| !collapsible.contains(**id))
        .map(|id| (*id).to_string())
        .collect()
}

/// First unused `node-<n>` id among the given nodes, scanning numeric
/// suffixes in ascending order from zero.
fn next_gap_id(nodes: &[Node]) -> String {
    let mut candidate = 0usize;
    for n in nodes
        .iter()
        .filter_map(|node| id_number(&node.id, "node-"))
        .sorted()
    {
        match n.cmp(&candidate) {
            std::cmp::Ordering::Less => {}
            std::cmp::Ordering::Equal => candidate += 1,
            std::cmp::Ordering::Greater => break,
        }
    }
    format!("node-{candidate}")
}

/// Folds the node `id` together with everything collapsible from it into a
/// single composite node.
///
/// The composite takes the anchor node's coordinates and data, a freshly
/// allocated first-gap id, the fold set's exposed input and output ports,
/// and the inner schema (coordinates re-based relative to the anchor) in its
/// `collapsed` field. Unknown ids leave the schema untouched.
pub fn collapse_from(id: &str, schema: &Schema) -> Schema {
    let Some(anchor) = schema.node(id) else {
        return schema.clone();
    };
    let anchor_at = anchor.coordinates;
    let anchor_data = anchor.data.clone();

    let mut fold: AHashSet<String> = collapsible_from(&[id], schema);
    fold.insert(id.to_string());
    let fold_refs: Vec<&str> = fold.iter().map(String::as_str).collect();
    tracing::debug!(anchor = id, folded = fold_refs.len(), "collapsing subgraph");

    let SchemaSplit { inner, outer } = split_schema(&fold_refs, schema);

    let inner_nodes: Vec<Node> = inner
        .nodes
        .into_iter()
        .map(|mut node| {
            node.coordinates = [
                node.coordinates[0] - anchor_at[0],
                node.coordinates[1] - anchor_at[1],
            ];
            node
        })
        .collect();

    let replacement_id = next_gap_id(&outer.nodes);
    let replacement = Node {
        id: replacement_id,
        coordinates: anchor_at,
        inputs: exposed_ports(&fold_refs, schema),
        outputs: exposed_outputs(&fold_refs, schema),
        data: anchor_data,
        collapsed: Some(Schema::new(inner_nodes, inner.links)),
    };

    let mut nodes = Vec::with_capacity(outer.nodes.len() + 1);
    nodes.push(replacement);
    nodes.extend(outer.nodes);
    Schema::new(nodes, outer.links)
}

/// Unfolds the composite node `id`, splicing its inner nodes and links back
/// into the schema with their coordinates re-based to the canvas.
///
/// A node without collapsed content, or an unknown id, is an explicit no-op:
/// the schema comes back unchanged.
pub fn expand_from(id: &str, schema: &Schema) -> Schema {
    let Some(node) = schema.node(id) else {
        return schema.clone();
    };
    let Some(inner) = &node.collapsed else {
        return schema.clone();
    };
    let anchor_at = node.coordinates;

    let restored: Vec<Node> = inner
        .nodes
        .iter()
        .cloned()
        .map(|mut inner_node| {
            inner_node.coordinates = [
                inner_node.coordinates[0] + anchor_at[0],
                inner_node.coordinates[1] + anchor_at[1],
            ];
            inner_node
        })
        .collect();

    let mut nodes: Vec<Node> = Vec::with_capacity(schema.nodes.len() + restored.len());
    for n in &schema.nodes {
        if n.id == id {
            nodes.extend(restored.iter().cloned());
        } else {
            nodes.push(n.clone());
        }
    }

    let mut links = schema.links.clone();
    links.extend(inner.links.iter().cloned());
    Schema::new(nodes, links)
}

/// Collapses each selected id in turn. Ids swallowed by an earlier fold
/// simply no-op when their turn comes.
pub fn collapse_each(ids: &[&str], schema: &Schema) -> Schema {
    ids.iter()
        .fold(schema.clone(), |acc, id| collapse_from(id, &acc))
}

/// Expands each selected id in turn.
pub fn expand_each(ids: &[&str], schema: &Schema) -> Schema {
    ids.iter().fold(schema.clone(), |acc, id| expand_from(id, &acc))
}
