//! The flat program a schema compiles down to.
//!
//! A plan is an ordered list of transforms over a slot-indexed image array.
//! Slots `0..source_count` are reserved for the caller's source images;
//! every transform writes its node's single output slot, and the last
//! transform's output is the plan's product.

use crate::error::RenderError;
use crate::render::{Image, Renderer};
use std::fmt::{self, Write};
use std::sync::Arc;

/// Index into the image array during plan execution.
pub type SlotId = usize;

/// One step of a compiled plan: invoke `renderer` over the images in
/// `inputs` and write the result to `output`.
#[derive(Clone)]
pub struct Transform {
    /// Id of the schema node this step was lowered from.
    pub node: String,
    /// Operation name, for diagnostics and plan dumps.
    pub op: String,
    pub renderer: Arc<dyn Renderer>,
    pub output: SlotId,
    pub inputs: Vec<SlotId>,
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transform")
            .field("node", &self.node)
            .field("op", &self.op)
            .field("output", &self.output)
            .field("inputs", &self.inputs)
            .finish()
    }
}

/// An immutable, executable sequence of transforms.
#[derive(Debug, Clone)]
pub struct TransformPlan {
    transforms: Vec<Transform>,
    source_count: usize,
    slot_count: usize,
}

impl TransformPlan {
    pub(crate) fn new(transforms: Vec<Transform>, source_count: usize, slot_count: usize) -> Self {
        Self {
            transforms,
            source_count,
            slot_count,
        }
    }

    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    /// Number of external source images the plan expects, occupying slots
    /// `0..source_count`.
    pub fn source_count(&self) -> usize {
        self.source_count
    }

    /// Size of the image array `execute` allocates.
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// The slot holding the plan's product: the last transform's output.
    pub fn final_output(&self) -> Option<SlotId> {
        self.transforms.last().map(|t| t.output)
    }

    /// Runs the plan over owned source images.
    pub fn execute(&self, sources: &[Image]) -> Result<Image, RenderError> {
        let refs: Vec<&Image> = sources.iter().collect();
        self.execute_refs(&refs)
    }

    /// Runs the plan: seeds the reserved slots, applies every transform in
    /// order, and takes the final transform's output.
    pub fn execute_refs(&self, sources: &[&Image]) -> Result<Image, RenderError> {
        if sources.len() != self.source_count {
            return Err(RenderError::SourceCount {
                expected: self.source_count,
                found: sources.len(),
            });
        }
        let Some(final_slot) = self.final_output() else {
            return Err(RenderError::EmptyPlan);
        };

        let mut slots: Vec<Option<Image>> = vec![None; self.slot_count];
        for (slot, source) in sources.iter().enumerate() {
            slots[slot] = Some((*source).clone());
        }

        for transform in &self.transforms {
            let mut gathered: Vec<&Image> = Vec::with_capacity(transform.inputs.len());
            for slot in &transform.inputs {
                let image = slots
                    .get(*slot)
                    .and_then(Option::as_ref)
                    .ok_or(RenderError::UnfilledSlot { slot: *slot })?;
                gathered.push(image);
            }
            let rendered =
                transform
                    .renderer
                    .render(&gathered)
                    .map_err(|e| RenderError::Op {
                        op: transform.op.clone(),
                        message: e.to_string(),
                    })?;
            let cell = slots
                .get_mut(transform.output)
                .ok_or(RenderError::SlotOutOfRange {
                    slot: transform.output,
                })?;
            *cell = Some(rendered);
        }

        slots
            .get_mut(final_slot)
            .ok_or(RenderError::SlotOutOfRange { slot: final_slot })?
            .take()
            .ok_or(RenderError::UnfilledSlot { slot: final_slot })
    }
}

/// Formats a complete plan into a human-readable string for debugging.
pub fn visualize_plan(plan: &TransformPlan, name: &str) -> String {
    let mut output = String::new();
    writeln!(&mut output, "======== TRANSFORM PLAN for Brush: {} ========", name).unwrap();
    writeln!(
        &mut output,
        "Sources: {}   Slots: {}   Transforms: {}",
        plan.source_count(),
        plan.slot_count(),
        plan.len()
    )
    .unwrap();
    writeln!(&mut output).unwrap();

    for (i, t) in plan.transforms().iter().enumerate() {
        let inputs = t
            .inputs
            .iter()
            .map(|s| format!("s{}", s))
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(
            &mut output,
            "{:04}: {:<16} {:<16} s{} <- [{}]",
            i, t.node, t.op, t.output, inputs
        )
        .unwrap();
    }

    writeln!(&mut output, "\n================ END OF PLAN ================").unwrap();
    output
}
