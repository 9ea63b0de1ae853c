//! Lowering a schema into an executable transform plan.
//!
//! The compiler owns a registry of renderer factories keyed by operation
//! name. `compile` validates the schema, lowers it to a flat transform list
//! (`to_transforms`), and runs the plan optimiser over the result. Collapsed
//! nodes lower recursively through the same registry.

use crate::error::CompileError;
use crate::plan::TransformPlan;
use crate::render::Renderer;
use crate::schema::{validate_schema, Node, Schema};
use ahash::AHashMap;
use std::sync::Arc;

#[cfg(feature = "debug-tools")]
use {crate::plan::visualize_plan, std::fs};

mod lower;
mod optimiser;

pub use optimiser::optimise_transforms;

/// Builds a renderer handle for every node carrying this factory's
/// operation name.
pub trait RendererFactory: Send + Sync {
    fn op(&self) -> &str;
    fn build(&self, node: &Node) -> Result<Arc<dyn Renderer>, CompileError>;
}

/// Factory wrapping a single shared renderer handle: every node with the
/// operation gets the same instance.
struct SharedRenderer {
    op: String,
    handle: Arc<dyn Renderer>,
}

impl RendererFactory for SharedRenderer {
    fn op(&self) -> &str {
        &self.op
    }

    fn build(&self, _node: &Node) -> Result<Arc<dyn Renderer>, CompileError> {
        Ok(Arc::clone(&self.handle))
    }
}

/// The result of a successful compilation: the optimised plan plus the
/// external input ports feeding slots `0..k`, in slot order.
pub struct CompiledBrush {
    pub plan: TransformPlan,
    pub source_ports: Vec<String>,
}

pub struct CompilerBuilder {
    schema: Schema,
    registry: AHashMap<String, Box<dyn RendererFactory>>,
    externals: Vec<String>,
    optimise: bool,
}

impl CompilerBuilder {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            registry: AHashMap::new(),
            externals: Vec::new(),
            optimise: true,
        }
    }

    /// Registers a factory under its own operation name, replacing any
    /// earlier registration.
    pub fn with_factory(mut self, factory: Box<dyn RendererFactory>) -> Self {
        self.registry.insert(factory.op().to_string(), factory);
        self
    }

    /// Registers a single shared renderer handle for an operation name.
    pub fn with_renderer(mut self, op: impl Into<String>, handle: Arc<dyn Renderer>) -> Self {
        let op = op.into();
        self.registry.insert(
            op.clone(),
            Box::new(SharedRenderer { op, handle }),
        );
        self
    }

    /// Declares an input port as externally fed. Externals take slots
    /// `0..k` in declaration order.
    pub fn with_external(mut self, port_id: impl Into<String>) -> Self {
        self.externals.push(port_id.into());
        self
    }

    pub fn with_externals<I, S>(mut self, port_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.externals.extend(port_ids.into_iter().map(Into::into));
        self
    }

    /// Skips the optimiser pass, leaving the raw lowering untouched.
    /// Inner plans of collapsed nodes are always optimised.
    pub fn without_optimisation(mut self) -> Self {
        self.optimise = false;
        self
    }

    pub fn build(self) -> Compiler {
        Compiler {
            schema: self.schema,
            registry: self.registry,
            externals: self.externals,
            optimise: self.optimise,
        }
    }
}

pub struct Compiler {
    schema: Schema,
    registry: AHashMap<String, Box<dyn RendererFactory>>,
    externals: Vec<String>,
    optimise: bool,
}

impl Compiler {
    pub fn builder(schema: Schema) -> CompilerBuilder {
        CompilerBuilder::new(schema)
    }

    /// Validates and lowers the schema without optimising the result.
    pub fn to_transforms(&self) -> Result<TransformPlan, CompileError> {
        validate_schema(&self.schema)?;
        lower::to_transforms(&self.schema, &self.externals, &self.registry)
    }

    /// Runs the full pipeline: validate, lower, optimise.
    #[tracing::instrument(skip(self), fields(nodes = self.schema.nodes.len()))]
    pub fn compile(self) -> Result<CompiledBrush, CompileError> {
        validate_schema(&self.schema)?;
        let unoptimised = lower::to_transforms(&self.schema, &self.externals, &self.registry)?;

        #[cfg(feature = "debug-tools")]
        self.write_debug_file(
            "tmp/plan_unoptimised.txt",
            &visualize_plan(&unoptimised, "unoptimised"),
        )?;

        let plan = if self.optimise {
            optimise_transforms(&unoptimised)
        } else {
            unoptimised
        };

        #[cfg(feature = "debug-tools")]
        self.write_debug_file("tmp/plan_optimised.txt", &visualize_plan(&plan, "optimised"))?;

        Ok(CompiledBrush {
            plan,
            source_ports: self.externals,
        })
    }

    #[cfg(feature = "debug-tools")]
    fn write_debug_file(&self, path: &str, content: &str) -> Result<(), CompileError> {
        if let Some(parent) = std::path::Path::new(path).parent() {
            fs::create_dir_all(parent)
                .map_err(|e| CompileError::DebugDump(format!("create '{}': {}", path, e)))?;
        }
        fs::write(path, content)
            .map_err(|e| CompileError::DebugDump(format!("write '{}': {}", path, e)))
    }
}
