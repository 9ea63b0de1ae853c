//! The lowering pass: schema -> ordered transform list.

use super::{optimise_transforms, RendererFactory};
use crate::error::CompileError;
use crate::graph::Graph;
use crate::plan::{SlotId, Transform, TransformPlan};
use crate::render::{CompositeRenderer, Renderer};
use crate::schema::{Node, Schema};
use ahash::AHashMap;
use std::collections::VecDeque;
use std::sync::Arc;

/// Lowers a validated schema into an unoptimised transform plan.
///
/// The declared external ports take slots `0..k` in declaration order; the
/// caller seeds them with source images at execution time. Every node then
/// lowers to exactly one transform in topological order, so producers always
/// run before their consumers. An input port that is both external and fed
/// by a link resolves as external.
pub(super) fn to_transforms(
    schema: &Schema,
    externals: &[String],
    registry: &AHashMap<String, Box<dyn RendererFactory>>,
) -> Result<TransformPlan, CompileError> {
    let source_count = externals.len();

    let mut external_slots: AHashMap<&str, SlotId> = AHashMap::with_capacity(source_count);
    for (slot, port_id) in externals.iter().enumerate() {
        if external_slots.insert(port_id.as_str(), slot).is_some() {
            return Err(CompileError::DuplicateExternal {
                port_id: port_id.clone(),
            });
        }
    }

    let mut node_by_id: AHashMap<&str, &Node> = AHashMap::with_capacity(schema.nodes.len());
    let mut in_ports: AHashMap<&str, &str> = AHashMap::new();
    let mut out_ports: AHashMap<&str, &str> = AHashMap::new();
    for node in &schema.nodes {
        node_by_id.insert(node.id.as_str(), node);
        for port in &node.inputs {
            in_ports.insert(port.id.as_str(), node.id.as_str());
        }
        for port in &node.outputs {
            out_ports.insert(port.id.as_str(), node.id.as_str());
        }
    }

    for port_id in externals {
        if !in_ports.contains_key(port_id.as_str()) {
            return Err(CompileError::UnknownExternal {
                port_id: port_id.clone(),
            });
        }
    }

    // consumer input port -> producer node ids, both link orientations tried
    let mut feeds: AHashMap<&str, Vec<&str>> = AHashMap::new();
    for link in &schema.links {
        if let (Some(producer), Some(_)) = (
            out_ports.get(link.output.as_str()),
            in_ports.get(link.input.as_str()),
        ) {
            feeds.entry(link.input.as_str()).or_default().push(*producer);
        } else if let (Some(producer), Some(_)) = (
            out_ports.get(link.input.as_str()),
            in_ports.get(link.output.as_str()),
        ) {
            feeds.entry(link.output.as_str()).or_default().push(*producer);
        }
    }

    let order = topological_order(schema)?;
    let slot_of: AHashMap<&str, SlotId> = order
        .iter()
        .enumerate()
        .map(|(position, id)| (*id, source_count + position))
        .collect();

    let mut transforms = Vec::with_capacity(order.len());
    for id in &order {
        let node = match node_by_id.get(id) {
            Some(node) => *node,
            None => continue,
        };
        let (renderer, op) = renderer_for(node, registry)?;

        let mut inputs = Vec::with_capacity(node.inputs.len());
        for port in &node.inputs {
            if let Some(slot) = external_slots.get(port.id.as_str()) {
                inputs.push(*slot);
                continue;
            }
            let producers = feeds.get(port.id.as_str()).map(Vec::as_slice).unwrap_or(&[]);
            match producers {
                [] => {
                    return Err(CompileError::UnresolvedInput {
                        node_id: node.id.clone(),
                        port_id: port.id.clone(),
                    });
                }
                [producer] => {
                    let slot = slot_of.get(*producer).copied().ok_or_else(|| {
                        CompileError::UnresolvedInput {
                            node_id: node.id.clone(),
                            port_id: port.id.clone(),
                        }
                    })?;
                    inputs.push(slot);
                }
                _ => {
                    return Err(CompileError::AmbiguousInput {
                        node_id: node.id.clone(),
                        port_id: port.id.clone(),
                    });
                }
            }
        }

        transforms.push(Transform {
            node: node.id.clone(),
            op,
            renderer,
            output: slot_of[*id],
            inputs,
        });
    }

    Ok(TransformPlan::new(
        transforms,
        source_count,
        source_count + order.len(),
    ))
}

/// Kahn's algorithm over producer -> consumer edges. The queue is seeded in
/// schema node order, so compilation of the same schema is deterministic.
/// Any node left unordered sits on or behind a cycle; that fails fast
/// instead of looping.
fn topological_order(schema: &Schema) -> Result<Vec<&str>, CompileError> {
    let graph = Graph::from_schema(schema);

    let mut indegree: AHashMap<&str, usize> = schema
        .nodes
        .iter()
        .map(|node| (node.id.as_str(), 0usize))
        .collect();
    for id in schema.node_ids() {
        if let Some(edges) = graph.neighbors(id) {
            for to in edges {
                if let Some(count) = indegree.get_mut(to.as_str()) {
                    *count += 1;
                }
            }
        }
    }

    let mut queue: VecDeque<&str> = schema
        .node_ids()
        .filter(|id| indegree.get(id) == Some(&0))
        .collect();
    let mut order: Vec<&str> = Vec::with_capacity(schema.nodes.len());

    while let Some(id) = queue.pop_front() {
        order.push(id);
        if let Some(edges) = graph.neighbors(id) {
            for to in edges {
                let mut ready = false;
                if let Some(count) = indegree.get_mut(to.as_str()) {
                    *count -= 1;
                    ready = *count == 0;
                }
                if ready {
                    // requeue the id borrowed from the schema, not the graph copy
                    if let Some((node_id, _)) = indegree.get_key_value(to.as_str()) {
                        queue.push_back(*node_id);
                    }
                }
            }
        }
    }

    if order.len() != schema.nodes.len() {
        let ordered: ahash::AHashSet<&str> = order.iter().copied().collect();
        let mut remaining: Vec<String> = schema
            .node_ids()
            .filter(|id| !ordered.contains(id))
            .map(str::to_string)
            .collect();
        remaining.sort();
        return Err(CompileError::CycleDetected { nodes: remaining });
    }

    Ok(order)
}

/// Resolves the renderer handle for one node: a collapsed node compiles its
/// inner schema into a `CompositeRenderer` (external inputs = the node's own
/// input ports), everything else goes through the registry by operation
/// name.
fn renderer_for(
    node: &Node,
    registry: &AHashMap<String, Box<dyn RendererFactory>>,
) -> Result<(Arc<dyn Renderer>, String), CompileError> {
    if let Some(inner) = &node.collapsed {
        let inner_externals: Vec<String> = node.inputs.iter().map(|p| p.id.clone()).collect();
        let inner_plan = to_transforms(inner, &inner_externals, registry)?;
        let inner_plan = optimise_transforms(&inner_plan);
        let handle: Arc<dyn Renderer> = Arc::new(CompositeRenderer::new(inner_plan));
        return Ok((handle, "composite".to_string()));
    }

    let op = node.data.op.as_deref().ok_or_else(|| CompileError::MissingOp {
        node_id: node.id.clone(),
    })?;
    let factory = registry.get(op).ok_or_else(|| CompileError::UnknownOp {
        node_id: node.id.clone(),
        op: op.to_string(),
    })?;
    let handle = factory.build(node)?;
    if let Some(expected) = handle.arity() {
        if expected != node.inputs.len() {
            return Err(CompileError::ArityMismatch {
                node_id: node.id.clone(),
                op: op.to_string(),
                expected,
                found: node.inputs.len(),
            });
        }
    }
    Ok((handle, op.to_string()))
}
