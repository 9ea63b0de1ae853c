//! A plain adjacency-list projection of a schema.
//!
//! Links between ports flatten into directed node-to-node edges pointing
//! producer -> consumer, so a root is a node no other node feeds: a source.
//! Every operation here is a pure function; none of them mutate the receiver.

use crate::schema::Schema;
use ahash::{AHashMap, AHashSet};
use std::collections::VecDeque;

/// A directed graph over node ids. Every node of the originating schema is
/// present as a key, even when it has no edges.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    adjacency: AHashMap<String, Vec<String>>,
}

impl Graph {
    /// Projects a schema onto its node graph.
    ///
    /// Each link contributes one edge from the node owning its output port to
    /// the node owning its input port. Both orientations of a link are tried,
    /// since hand-authored diagrams sometimes record the ends swapped. A link
    /// resolving in neither orientation contributes nothing; rejecting such
    /// links is the job of schema validation, not of this projection.
    pub fn from_schema(schema: &Schema) -> Self {
        let mut adjacency: AHashMap<String, Vec<String>> =
            AHashMap::with_capacity(schema.nodes.len());
        for node in &schema.nodes {
            adjacency.insert(node.id.clone(), Vec::new());
        }

        let mut in_ports: AHashMap<&str, &str> = AHashMap::new();
        let mut out_ports: AHashMap<&str, &str> = AHashMap::new();
        for node in &schema.nodes {
            for port in &node.inputs {
                in_ports.insert(port.id.as_str(), node.id.as_str());
            }
            for port in &node.outputs {
                out_ports.insert(port.id.as_str(), node.id.as_str());
            }
        }

        for link in &schema.links {
            let straight = (
                out_ports.get(link.output.as_str()),
                in_ports.get(link.input.as_str()),
            );
            let (from, to) = match straight {
                (Some(from), Some(to)) => (*from, *to),
                _ => {
                    let swapped = (
                        out_ports.get(link.input.as_str()),
                        in_ports.get(link.output.as_str()),
                    );
                    match swapped {
                        (Some(from), Some(to)) => (*from, *to),
                        _ => continue,
                    }
                }
            };
            if let Some(edges) = adjacency.get_mut(from) {
                edges.push(to.to_string());
            }
        }

        Self { adjacency }
    }

    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.adjacency.contains_key(id)
    }

    /// The direct successors of a node, in link order.
    pub fn neighbors(&self, id: &str) -> Option<&[String]> {
        self.adjacency.get(id).map(Vec::as_slice)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.adjacency.keys().map(String::as_str)
    }

    /// Uses a breadth-first search to find every node reachable from the
    /// seed set through one or more edges.
    ///
    /// The seeds themselves are not part of the result unless a path leaves
    /// the set and comes back to them. Seeds missing from the graph are
    /// skipped. Each node is enqueued at most once, so the search is
    /// O(V + E) even on cyclic graphs.
    pub fn children(&self, seeds: &[&str]) -> AHashSet<String> {
        let mut seen: AHashSet<String> = AHashSet::new();
        let mut queue: VecDeque<&str> = seeds
            .iter()
            .copied()
            .filter(|id| self.adjacency.contains_key(*id))
            .collect();

        while let Some(id) = queue.pop_front() {
            if let Some(edges) = self.adjacency.get(id) {
                for child in edges {
                    if seen.insert(child.clone()) {
                        queue.push_back(child.as_str());
                    }
                }
            }
        }

        seen
    }

    /// The same graph with every edge flipped.
    pub fn reversed(&self) -> Self {
        let mut adjacency: AHashMap<String, Vec<String>> = self
            .adjacency
            .keys()
            .map(|id| (id.clone(), Vec::new()))
            .collect();
        for (from, edges) in &self.adjacency {
            for to in edges {
                adjacency.entry(to.clone()).or_default().push(from.clone());
            }
        }
        Self { adjacency }
    }

    /// The union of the graph and its reverse: every edge walkable both
    /// ways. Edge lists may contain duplicates; the searches tolerate them.
    pub fn undirected(&self) -> Self {
        let mut adjacency = self.adjacency.clone();
        for (id, edges) in self.reversed().adjacency {
            adjacency.entry(id).or_default().extend(edges);
        }
        Self { adjacency }
    }

    /// The nodes no edge points to. With producer -> consumer edges these
    /// are the source nodes of the dataflow.
    pub fn roots(&self) -> AHashSet<String> {
        let mut has_incoming: AHashSet<&str> = AHashSet::new();
        for edges in self.adjacency.values() {
            for to in edges {
                has_incoming.insert(to.as_str());
            }
        }
        self.adjacency
            .keys()
            .filter(|id| !has_incoming.contains(id.as_str()))
            .cloned()
            .collect()
    }

    /// The roots of the weakly-connected component(s) the seeds belong to:
    /// `roots()` filtered to what an undirected walk from the seeds can
    /// reach.
    pub fn roots_from(&self, seeds: &[&str]) -> AHashSet<String> {
        let component = self.undirected().children(seeds);
        self.roots()
            .into_iter()
            .filter(|id| component.contains(id))
            .collect()
    }

    /// The induced subgraph with the given ids removed: their keys are gone
    /// and so is every edge touching them. A pure counterpart to deleting
    /// entries in place.
    pub fn without(&self, ids: &[&str]) -> Self {
        let drop: AHashSet<&str> = ids.iter().copied().collect();
        let adjacency = self
            .adjacency
            .iter()
            .filter(|(id, _)| !drop.contains(id.as_str()))
            .map(|(id, edges)| {
                let kept: Vec<String> = edges
                    .iter()
                    .filter(|to| !drop.contains(to.as_str()))
                    .cloned()
                    .collect();
                (id.clone(), kept)
            })
            .collect();
        Self { adjacency }
    }
}
