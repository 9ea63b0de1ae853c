use thiserror::Error;

/// Errors raised while validating a schema at the construction boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("A node has an empty id")]
    EmptyNodeId,

    #[error("A port on node '{node_id}' has an empty id")]
    EmptyPortId { node_id: String },

    #[error("Node id '{node_id}' is used by more than one node")]
    DuplicateNodeId { node_id: String },

    #[error("Port id '{port_id}' is used by more than one port")]
    DuplicatePortId { port_id: String },

    #[error("A link has an empty endpoint (input: '{input}', output: '{output}')")]
    EmptyLinkEnd { input: String, output: String },

    #[error("Link endpoint '{port_id}' does not name any port in the schema")]
    UnknownPort { port_id: String },

    #[error("Link between '{input}' and '{output}' connects a node to itself")]
    SelfLink { input: String, output: String },
}

/// Errors raised when converting a custom user format into a `Schema`.
#[derive(Error, Debug, Clone)]
pub enum ConversionError {
    #[error("Invalid custom data: {0}")]
    ValidationError(String),
}

/// Errors raised while lowering a schema into a transform plan.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Cyclic dependency between nodes [{}]", nodes.join(", "))]
    CycleDetected { nodes: Vec<String> },

    #[error("Node '{node_id}' has neither an operation name nor a collapsed schema")]
    MissingOp { node_id: String },

    #[error("Node '{node_id}' has an unregistered operation: '{op}'")]
    UnknownOp { node_id: String, op: String },

    #[error(
        "Renderer '{op}' on node '{node_id}' takes {expected} sources, but the node has {found} input ports"
    )]
    ArityMismatch {
        node_id: String,
        op: String,
        expected: usize,
        found: usize,
    },

    #[error("Input port '{port_id}' on node '{node_id}' is not fed by any link or external source")]
    UnresolvedInput { node_id: String, port_id: String },

    #[error("Input port '{port_id}' on node '{node_id}' is fed by more than one link")]
    AmbiguousInput { node_id: String, port_id: String },

    #[error("External source port '{port_id}' is declared more than once")]
    DuplicateExternal { port_id: String },

    #[error("External source port '{port_id}' is not an input port of any node")]
    UnknownExternal { port_id: String },

    #[error("Failed to write debug file: {0}")]
    DebugDump(String),
}

/// Errors raised while executing a transform plan.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("Plan takes {expected} source images, but {found} were supplied")]
    SourceCount { expected: usize, found: usize },

    #[error("Cannot execute an empty transform plan")]
    EmptyPlan,

    #[error("Transform read slot {slot} before any image was written to it")]
    UnfilledSlot { slot: usize },

    #[error("Transform addressed slot {slot}, which is outside the plan's slot range")]
    SlotOutOfRange { slot: usize },

    #[error("Image buffer holds {found} bytes, but {expected} are required for its dimensions")]
    PixelCount { expected: usize, found: usize },

    #[error("Renderer '{op}' failed: {message}")]
    Op { op: String, message: String },
}

/// Errors raised while saving or loading a stash of schemas.
#[derive(Error, Debug)]
pub enum StashError {
    #[error("Could not access stash file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize stash: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("Failed to deserialize stash: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("Failed to convert stash to or from JSON: {0}")]
    Json(#[from] serde_json::Error),
}
