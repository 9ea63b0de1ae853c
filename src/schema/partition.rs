//! Splitting a schema across a node-subset boundary.
//!
//! Collapse needs to know three things about a subset of nodes: which ports
//! stay visible on a replacement node, which links are internal to the
//! subset, and what is left of the schema once the subset is taken out.

use super::model::{Link, Node, Port, Schema};
use ahash::{AHashMap, AHashSet};
use itertools::{Either, Itertools};

/// Maps every linked port id to the id of the node *producing* into that
/// link, resolving both link orientations. Both ends of a link map to the
/// producer, so looking up a consumer-side port answers "who feeds this".
/// Unlinked ports are absent.
pub fn port_to_node(schema: &Schema) -> AHashMap<String, String> {
    let mut out_ports: AHashMap<&str, &str> = AHashMap::new();
    for node in &schema.nodes {
        for port in &node.outputs {
            out_ports.insert(port.id.as_str(), node.id.as_str());
        }
    }

    let mut port_map: AHashMap<String, String> = AHashMap::new();
    for link in &schema.links {
        if let Some(producer) = out_ports.get(link.output.as_str()) {
            port_map.insert(link.input.clone(), (*producer).to_string());
            port_map.insert(link.output.clone(), (*producer).to_string());
        } else if let Some(producer) = out_ports.get(link.input.as_str()) {
            port_map.insert(link.output.clone(), (*producer).to_string());
            port_map.insert(link.input.clone(), (*producer).to_string());
        }
    }
    port_map
}

/// The input ports a folded subgraph must keep visible: every input port of
/// a member node that is not fed from inside the subset. Inputs satisfied by
/// a member producer are absorbed; inputs fed from outside, or not linked at
/// all, survive.
///
/// ```text
///            +--------+      +--------+
///  port0 --> |        | p3   |        | --> port5
///            | node0  | ---> | node1  | --> port6
///  port1 --> |        |  p4  |        | --> port7
///            +--------+      +--------+
/// ```
///
/// For `ids = {node0, node1}` the exposed inputs are `port0` and `port1`:
/// `p4` is fed by `node0`, a member, and is absorbed.
pub fn exposed_ports(ids: &[&str], schema: &Schema) -> Vec<Port> {
    let members: AHashSet<&str> = ids.iter().copied().collect();
    let port_map = port_to_node(schema);
    schema
        .nodes
        .iter()
        .filter(|node| members.contains(node.id.as_str()))
        .flat_map(|node| node.inputs.iter())
        .filter(|port| match port_map.get(port.id.as_str()) {
            Some(producer) => !members.contains(producer.as_str()),
            None => true,
        })
        .cloned()
        .collect()
}

/// The output ports a folded subgraph must keep visible: every output port
/// of a member node that feeds at least one non-member consumer, or feeds
/// nothing at all (the subgraph's own product). Outputs consumed entirely
/// inside the subset are absorbed.
pub fn exposed_outputs(ids: &[&str], schema: &Schema) -> Vec<Port> {
    let members: AHashSet<&str> = ids.iter().copied().collect();

    let mut in_ports: AHashMap<&str, &str> = AHashMap::new();
    let mut out_ports: AHashSet<&str> = AHashSet::new();
    for node in &schema.nodes {
        for port in &node.inputs {
            in_ports.insert(port.id.as_str(), node.id.as_str());
        }
        for port in &node.outputs {
            out_ports.insert(port.id.as_str());
        }
    }

    // output port id -> consumer node ids, both link orientations resolved
    let mut consumers: AHashMap<&str, Vec<&str>> = AHashMap::new();
    for link in &schema.links {
        if out_ports.contains(link.output.as_str()) {
            if let Some(consumer) = in_ports.get(link.input.as_str()) {
                consumers.entry(link.output.as_str()).or_default().push(consumer);
            }
        } else if out_ports.contains(link.input.as_str()) {
            if let Some(consumer) = in_ports.get(link.output.as_str()) {
                consumers.entry(link.input.as_str()).or_default().push(consumer);
            }
        }
    }

    schema
        .nodes
        .iter()
        .filter(|node| members.contains(node.id.as_str()))
        .flat_map(|node| node.outputs.iter())
        .filter(|port| match consumers.get(port.id.as_str()) {
            Some(nodes) => nodes.iter().any(|n| !members.contains(n)),
            None => true,
        })
        .cloned()
        .collect()
}

/// Member / non-member partition of a schema's nodes, order preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSplit {
    pub inner: Vec<Node>,
    pub outer: Vec<Node>,
}

/// Internal / external partition of a schema's links.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkSplit {
    pub inner: Vec<Link>,
    pub outer: Vec<Link>,
}

/// A schema split in two across the membership boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaSplit {
    pub inner: Schema,
    pub outer: Schema,
}

pub fn split_nodes(ids: &[&str], schema: &Schema) -> NodeSplit {
    let members: AHashSet<&str> = ids.iter().copied().collect();
    let (inner, outer) = schema
        .nodes
        .iter()
        .cloned()
        .partition(|node| members.contains(node.id.as_str()));
    NodeSplit { inner, outer }
}

/// A link is internal only when *both* endpoint ports belong to member
/// nodes. A link straddling the boundary is external; rewiring it is the
/// caller's concern.
pub fn split_links(ids: &[&str], schema: &Schema) -> LinkSplit {
    let members: AHashSet<&str> = ids.iter().copied().collect();
    let mut owner: AHashMap<&str, &str> = AHashMap::new();
    for node in &schema.nodes {
        for port in node.inputs.iter().chain(&node.outputs) {
            owner.insert(port.id.as_str(), node.id.as_str());
        }
    }
    let inside = |port: &str| {
        owner
            .get(port)
            .is_some_and(|node| members.contains(node))
    };

    let (inner, outer) = schema.links.iter().cloned().partition_map(|link| {
        if inside(&link.input) && inside(&link.output) {
            Either::Left(link)
        } else {
            Either::Right(link)
        }
    });
    LinkSplit { inner, outer }
}

/// Splits the whole schema: inner = member nodes with their internal links,
/// outer = everything else including boundary links.
pub fn split_schema(ids: &[&str], schema: &Schema) -> SchemaSplit {
    let NodeSplit {
        inner: inner_nodes,
        outer: outer_nodes,
    } = split_nodes(ids, schema);
    let LinkSplit {
        inner: inner_links,
        outer: outer_links,
    } = split_links(ids, schema);
    SchemaSplit {
        inner: Schema::new(inner_nodes, inner_links),
        outer: Schema::new(outer_nodes, outer_links),
    }
}
