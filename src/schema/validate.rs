use super::model::{IdAllocator, Link, Node, Port, Schema};
use crate::error::SchemaError;
use ahash::{AHashMap, AHashSet};

/// Checks a single port: a port must carry a non-empty id.
pub fn validate_port(port: &Port, node_id: &str) -> Result<(), SchemaError> {
    if port.id.is_empty() {
        return Err(SchemaError::EmptyPortId {
            node_id: node_id.to_string(),
        });
    }
    Ok(())
}

/// Checks a single node and its ports.
pub fn validate_node(node: &Node) -> Result<(), SchemaError> {
    if node.id.is_empty() {
        return Err(SchemaError::EmptyNodeId);
    }
    for port in node.inputs.iter().chain(&node.outputs) {
        validate_port(port, &node.id)?;
    }
    Ok(())
}

/// Checks a single link in isolation: both endpoints must be non-empty.
pub fn validate_link(link: &Link) -> Result<(), SchemaError> {
    if link.input.is_empty() || link.output.is_empty() {
        return Err(SchemaError::EmptyLinkEnd {
            input: link.input.clone(),
            output: link.output.clone(),
        });
    }
    Ok(())
}

/// Validates a whole schema at the construction boundary.
///
/// Enforces the invariants every later stage assumes: non-empty unique node
/// ids, globally unique port ids, and links whose endpoints resolve to ports
/// on two different nodes. Collapsed inner schemas are validated recursively;
/// each one is its own id namespace.
pub fn validate_schema(schema: &Schema) -> Result<(), SchemaError> {
    let mut node_ids: AHashSet<&str> = AHashSet::with_capacity(schema.nodes.len());
    let mut port_owner: AHashMap<&str, &str> = AHashMap::new();

    for node in &schema.nodes {
        validate_node(node)?;
        if !node_ids.insert(node.id.as_str()) {
            return Err(SchemaError::DuplicateNodeId {
                node_id: node.id.clone(),
            });
        }
        for port in node.inputs.iter().chain(&node.outputs) {
            if port_owner.insert(port.id.as_str(), node.id.as_str()).is_some() {
                return Err(SchemaError::DuplicatePortId {
                    port_id: port.id.clone(),
                });
            }
        }
        if let Some(inner) = &node.collapsed {
            validate_schema(inner)?;
        }
    }

    for link in &schema.links {
        validate_link(link)?;
        let input_owner = port_owner
            .get(link.input.as_str())
            .ok_or_else(|| SchemaError::UnknownPort {
                port_id: link.input.clone(),
            })?;
        let output_owner = port_owner
            .get(link.output.as_str())
            .ok_or_else(|| SchemaError::UnknownPort {
                port_id: link.output.clone(),
            })?;
        if input_owner == output_owner {
            return Err(SchemaError::SelfLink {
                input: link.input.clone(),
                output: link.output.clone(),
            });
        }
    }

    Ok(())
}

/// Fills every empty node and port id from the allocator, recursing into
/// collapsed inner schemas.
pub fn ensure_ids(schema: &mut Schema, ids: &mut IdAllocator) {
    for node in &mut schema.nodes {
        if node.id.is_empty() {
            node.id = ids.node_id();
        }
        for port in node.inputs.iter_mut().chain(&mut node.outputs) {
            if port.id.is_empty() {
                port.id = ids.port_id();
            }
        }
        if let Some(inner) = &mut node.collapsed {
            ensure_ids(inner, ids);
        }
    }
}

/// The one constructor an editor layer needs: fill missing ids, then
/// validate. Returns the normalized schema.
pub fn create_schema(mut schema: Schema, ids: &mut IdAllocator) -> Result<Schema, SchemaError> {
    ensure_ids(&mut schema, ids);
    validate_schema(&schema)?;
    Ok(schema)
}
