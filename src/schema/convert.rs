use super::model::Schema;
use crate::error::ConversionError;

/// A trait for custom data models that can be converted into a `Schema`.
///
/// This is the extension point that keeps the engine format-agnostic. Diagram
/// editors rarely agree on a wire shape; by implementing this trait on your
/// own parsed structs you provide the translation layer into the canonical
/// model the compiler works with.
///
/// # Example
///
/// ```rust,no_run
/// use fude::prelude::{IntoSchema, Node, NodeData, Schema};
/// use fude::error::ConversionError;
///
/// // 1. Define your custom structs for parsing your format.
/// struct MyCustomNode { id: String, op: String }
/// struct MyCustomDiagram { nodes: Vec<MyCustomNode> }
///
/// // 2. Implement `IntoSchema` for your top-level struct.
/// impl IntoSchema for MyCustomDiagram {
///     fn into_schema(self) -> Result<Schema, ConversionError> {
///         let mut nodes = Vec::new();
///         for raw in self.nodes {
///             // Your logic to convert `MyCustomNode` into a `Node`
///             let mut node = Node::new(raw.id, [0.0, 0.0]);
///             node.data = NodeData::with_op(raw.op);
///             nodes.push(node);
///         }
///
///         Ok(Schema {
///             nodes,
///             links: vec![], // Convert your links here as well
///         })
///     }
/// }
/// ```
pub trait IntoSchema {
    /// Consumes the object and converts it into a canonical schema.
    fn into_schema(self) -> Result<Schema, ConversionError>;
}

impl IntoSchema for Schema {
    fn into_schema(self) -> Result<Schema, ConversionError> {
        Ok(self)
    }
}
