//! The canonical diagram model and everything that operates on it short of
//! compilation: validation, conversion, subset partitioning, collapse.

pub mod collapse;
mod convert;
mod model;
pub mod partition;
mod validate;

pub use collapse::{
    collapse_each, collapse_from, collapsible_from, expand_each, expand_from, minimal_collapsible,
};
pub use convert::IntoSchema;
pub use model::{
    CanLink, Coords, IdAllocator, Link, Node, NodeData, Port, PortAlignment, PortRole, Schema,
};
pub use partition::{
    exposed_outputs, exposed_ports, port_to_node, split_links, split_nodes, split_schema,
    LinkSplit, NodeSplit, SchemaSplit,
};
pub use validate::{
    create_schema, ensure_ids, validate_link, validate_node, validate_port, validate_schema,
};

use crate::graph::Graph;
use ahash::AHashSet;

/// Every node reachable downstream of the given ids. Convenience wrapper
/// that projects the schema first.
pub fn children_of(ids: &[&str], schema: &Schema) -> AHashSet<String> {
    Graph::from_schema(schema).children(ids)
}

/// The root (source) nodes of the schema.
pub fn roots_in(schema: &Schema) -> AHashSet<String> {
    Graph::from_schema(schema).roots()
}

/// The roots of the component(s) the given ids belong to.
pub fn roots_from(ids: &[&str], schema: &Schema) -> AHashSet<String> {
    Graph::from_schema(schema).roots_from(ids)
}

/// True when every one of the ids can be reached again from the id set
/// itself: some path leaves the set and comes back, so the ids sit on a
/// cycle. Probing a single node therefore answers "does any cycle pass
/// through it".
pub fn cycle_with(ids: &[&str], schema: &Schema) -> bool {
    let children = children_of(ids, schema);
    ids.iter().all(|id| children.contains(*id))
}

fn find_port<'a>(schema: &'a Schema, port_id: &str) -> Option<(&'a Node, PortRole, &'a Port)> {
    for node in &schema.nodes {
        for port in &node.inputs {
            if port.id == port_id {
                return Some((node, PortRole::Input, port));
            }
        }
        for port in &node.outputs {
            if port.id == port_id {
                return Some((node, PortRole::Output, port));
            }
        }
    }
    None
}

/// Gesture-time veto for a candidate link.
///
/// The link is acceptable when its ends resolve to one input-role and one
/// output-role port, neither port's `can_link` callback objects, and adding
/// the link would not close a cycle through the consuming node.
pub fn should_link(link: &Link, schema: &Schema) -> bool {
    let Some((node_a, role_a, port_a)) = find_port(schema, &link.input) else {
        return false;
    };
    let Some((node_b, role_b, port_b)) = find_port(schema, &link.output) else {
        return false;
    };
    if role_a == role_b {
        return false;
    }

    if let Some(can_link) = &port_a.can_link {
        if !can_link.allows(&port_a.id, &port_b.id, role_a) {
            return false;
        }
    }
    if let Some(can_link) = &port_b.can_link {
        if !can_link.allows(&port_b.id, &port_a.id, role_b) {
            return false;
        }
    }

    let consumer = if role_a == PortRole::Input { node_a } else { node_b };
    let mut candidate = schema.clone();
    candidate.links.push(link.clone());
    !cycle_with(&[consumer.id.as_str()], &candidate)
}
