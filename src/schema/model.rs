use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Editor-canvas position of a node, `[x, y]`.
pub type Coords = [f64; 2];

/// Which edge of the node body a port is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortAlignment {
    Left,
    Right,
    Top,
    Bottom,
}

/// The role a port plays in a link: `Output` ports produce images,
/// `Input` ports consume them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortRole {
    Input,
    Output,
}

/// A shared callback deciding whether a port accepts a candidate link.
///
/// The callback receives the port's own id, the id of the port at the other
/// end, and the role of the port being asked. It is never serialized and is
/// ignored when comparing ports for equality.
#[derive(Clone)]
pub struct CanLink(Arc<dyn Fn(&str, &str, PortRole) -> bool + Send + Sync>);

impl CanLink {
    pub fn new(f: impl Fn(&str, &str, PortRole) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn allows(&self, port_id: &str, other_id: &str, role: PortRole) -> bool {
        (self.0)(port_id, other_id, role)
    }
}

impl fmt::Debug for CanLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CanLink(..)")
    }
}

/// A connection point on a node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Port {
    pub id: String,
    #[serde(default)]
    pub alignment: Option<PortAlignment>,
    #[serde(skip)]
    pub can_link: Option<CanLink>,
}

impl Port {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            alignment: None,
            can_link: None,
        }
    }
}

// `can_link` is behavior, not identity, so it does not take part in equality.
impl PartialEq for Port {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.alignment == other.alignment
    }
}

impl Eq for Port {}

/// A connection between two ports. `output` names the upstream (producing)
/// end and `input` the downstream (consuming) end, although diagrams authored
/// by hand sometimes record the two swapped; consumers resolve both
/// orientations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub input: String,
    pub output: String,
}

impl Link {
    /// Builds a link from a producing port to a consuming port.
    pub fn new(output: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }
}

/// The tagged payload of a node. `op` selects the renderer factory at compile
/// time; `params` is an opaque bag the factory may interpret.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    #[serde(default)]
    pub op: Option<String>,
    #[serde(default, with = "params_codec")]
    pub params: serde_json::Value,
}

/// Free-form `params` stay natural JSON in human-readable formats. Binary
/// formats cannot decode free-form values, so there the bag travels as JSON
/// text instead.
mod params_codec {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn serialize<S: Serializer>(value: &Value, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serde::Serialize::serialize(value, serializer)
        } else {
            serializer.serialize_str(&value.to_string())
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Value, D::Error> {
        if deserializer.is_human_readable() {
            Value::deserialize(deserializer)
        } else {
            let text = String::deserialize(deserializer)?;
            serde_json::from_str(&text).map_err(D::Error::custom)
        }
    }
}

impl NodeData {
    pub fn with_op(op: impl Into<String>) -> Self {
        Self {
            op: Some(op.into()),
            params: serde_json::Value::Null,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.op.is_none() && self.params.is_null()
    }
}

/// A single diagram node. A node with a `collapsed` schema is a composite:
/// the inner nodes stay hidden from the outer schema until expanded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(default)]
    pub coordinates: Coords,
    #[serde(default)]
    pub inputs: Vec<Port>,
    #[serde(default)]
    pub outputs: Vec<Port>,
    #[serde(default)]
    pub data: NodeData,
    #[serde(default)]
    pub collapsed: Option<Schema>,
}

impl Node {
    pub fn new(id: impl Into<String>, coordinates: Coords) -> Self {
        Self {
            id: id.into(),
            coordinates,
            inputs: Vec::new(),
            outputs: Vec::new(),
            data: NodeData::default(),
            collapsed: None,
        }
    }
}

/// A complete diagram: nodes plus the links wiring their ports together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl Schema {
    pub fn new(nodes: Vec<Node>, links: Vec<Link>) -> Self {
        Self { nodes, links }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.id.as_str())
    }
}

/// Parses the numeric suffix of a generated id, e.g. `node-12` -> `12`.
pub(crate) fn id_number(id: &str, prefix: &str) -> Option<usize> {
    id.strip_prefix(prefix).and_then(|n| n.parse().ok())
}

/// Deterministic source of fresh `node-<n>` / `port-<n>` ids.
///
/// Always an explicit argument: there are no global counters and no random
/// fallbacks, so two runs over the same schema hand out the same ids.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next_node: usize,
    next_port: usize,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts counting past the highest generated id already present in the
    /// schema, including ids inside collapsed inner schemas.
    pub fn seeded(schema: &Schema) -> Self {
        let mut alloc = Self::new();
        alloc.observe(schema);
        alloc
    }

    fn observe(&mut self, schema: &Schema) {
        for node in &schema.nodes {
            if let Some(n) = id_number(&node.id, "node-") {
                self.next_node = self.next_node.max(n + 1);
            }
            for port in node.inputs.iter().chain(&node.outputs) {
                if let Some(n) = id_number(&port.id, "port-") {
                    self.next_port = self.next_port.max(n + 1);
                }
            }
            if let Some(inner) = &node.collapsed {
                self.observe(inner);
            }
        }
    }

    pub fn node_id(&mut self) -> String {
        let id = format!("node-{}", self.next_node);
        self.next_node += 1;
        id
    }

    pub fn port_id(&mut self) -> String {
        let id = format!("port-{}", self.next_port);
        self.next_port += 1;
        id
    }
}
