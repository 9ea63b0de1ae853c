//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the fude crate.
//! Import this module to get access to the core functionality without having to import
//! each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! // Use the prelude to get easy access to all the core types.
//! use fude::prelude::*;
//! use std::sync::Arc;
//!
//! # struct Blur;
//! # impl Renderer for Blur {
//! #     fn render(&self, sources: &[&Image]) -> std::result::Result<Image, RenderError> {
//! #         Ok(sources[0].clone())
//! #     }
//! # }
//! # fn run_example() -> Result<()> {
//! // Load a brush schema saved by the editor
//! let json = std::fs::read_to_string("path/to/brush.json")?;
//! let schema: Schema = serde_json::from_str(&json)?;
//!
//! // Compile it against a renderer registry and render a stroke
//! let brush = Compiler::builder(schema)
//!     .with_renderer("blur", Arc::new(Blur))
//!     .with_external("port-0")
//!     .build()
//!     .compile()?;
//!
//! let canvas = Image::filled(256, 256, [0, 0, 0, 0]);
//! let result = brush.plan.execute(&[canvas])?;
//!
//! println!("Rendered: {:?}", result);
//! # Ok(())
//! # }
//! ```

// Core compilation and execution
pub use crate::compiler::{
    optimise_transforms, CompiledBrush, Compiler, CompilerBuilder, RendererFactory,
};
pub use crate::plan::{visualize_plan, SlotId, Transform, TransformPlan};
pub use crate::render::{CompositeRenderer, Image, Renderer};

// Diagram model and editing operations
pub use crate::schema::{
    collapse_from, collapsible_from, create_schema, cycle_with, expand_from, should_link,
    validate_schema, CanLink, Coords, IdAllocator, IntoSchema, Link, Node, NodeData, Port,
    PortAlignment, PortRole, Schema,
};

// Reachability queries
pub use crate::graph::Graph;

// Persistence
pub use crate::stash::Stash;

// Error types
pub use crate::error::{CompileError, ConversionError, RenderError, SchemaError, StashError};

// Standard library re-exports commonly used with this crate
pub use std::collections::HashMap;
pub use std::path::Path;

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
