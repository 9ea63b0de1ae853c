//! # Fude - Brush Compilation and Rendering Engine
//!
//! **Fude** is a brush compilation and compositing engine that flattens
//! node-based brush diagrams into linear transform plans. Diagrams are
//! compiled ahead of time, so replaying a stroke executes a flat list of
//! renderer invocations instead of walking the graph again.
//!
//! ## Core Workflow
//!
//! The engine is format-agnostic. It operates on a canonical internal model
//! of a diagram, the `Schema`. The primary workflow is:
//!
//! 1.  **Load Your Diagram**: Parse your editor's own format (e.g. from JSON) into your own Rust structs.
//! 2.  **Convert to Fude's Model**: Implement the `IntoSchema` trait for your structs to provide a translation layer into Fude's `Schema`.
//! 3.  **Compile**: Use `Compiler::builder` to pair the schema with a registry of renderers, one per operation name. The compiler validates the schema and flattens it into an optimised `TransformPlan`.
//! 4.  **Render**: Execute the plan repeatedly against different source images. Each execution fills a slot table and returns the final composited image.
//!
//! Schemas stay editable between compilations: nodes can be collapsed into
//! composite nodes and expanded back (see [`schema::collapse`]), split along
//! a selection (see [`schema::partition`]), and stored by name in a
//! [`stash::Stash`].
//!
//! ## Quick Start
//!
//! The following example compiles and renders a single-node diagram whose
//! two inputs are fed externally.
//!
//! ```rust
//! use fude::prelude::*;
//! use std::sync::Arc;
//!
//! // A renderer that multiplies two source images together.
//! struct Multiply;
//!
//! impl Renderer for Multiply {
//!     fn arity(&self) -> Option<usize> {
//!         Some(2)
//!     }
//!
//!     fn render(&self, sources: &[&Image]) -> std::result::Result<Image, RenderError> {
//!         let (a, b) = (sources[0], sources[1]);
//!         let pixels = a
//!             .pixels()
//!             .iter()
//!             .zip(b.pixels())
//!             .map(|(&x, &y)| ((x as u16 * y as u16) / 255) as u8)
//!             .collect();
//!         Image::from_pixels(a.width(), a.height(), pixels)
//!     }
//! }
//!
//! fn main() -> Result<()> {
//!     // 1. + 2. Describe the diagram. Real editors would go through the
//!     // `IntoSchema` trait instead of building the schema by hand.
//!     let mut node = Node::new("node-0", [0.0, 0.0]);
//!     node.inputs = vec![Port::new("port-0"), Port::new("port-1")];
//!     node.outputs = vec![Port::new("port-2")];
//!     node.data = NodeData::with_op("multiply");
//!     let schema = Schema::new(vec![node], vec![]);
//!
//!     // 3. Compile with a renderer registered for every operation name.
//!     let brush = Compiler::builder(schema)
//!         .with_renderer("multiply", Arc::new(Multiply))
//!         .with_externals(["port-0", "port-1"])
//!         .build()
//!         .compile()?;
//!
//!     // 4. Execute against concrete source images.
//!     let red = Image::filled(64, 64, [255, 0, 0, 255]);
//!     let white = Image::filled(64, 64, [255, 255, 255, 255]);
//!     let out = brush.plan.execute(&[red, white])?;
//!
//!     println!("rendered {}x{} pixels", out.width(), out.height());
//!     Ok(())
//! }
//! ```

pub mod compiler;
pub mod error;
pub mod graph;
pub mod plan;
pub mod prelude;
pub mod render;
pub mod schema;
pub mod stash;
