use std::sync::Arc;

use ahash::{AHashMap, AHashSet};

use crate::plan::{SlotId, Transform, TransformPlan};

/// Shrinks a transform plan without changing the image it produces.
///
/// Duplicate-work elimination and dead-transform pruning run in a loop until
/// the plan reaches a fixed point, after which the surviving slots are
/// renumbered densely so execution allocates no unused slots. Source slots
/// keep their positions.
pub fn optimise_transforms(plan: &TransformPlan) -> TransformPlan {
    let mut transforms: Vec<Transform> = plan.transforms().to_vec();
    let Some(mut product) = plan.final_output() else {
        return TransformPlan::new(Vec::new(), plan.source_count(), plan.source_count());
    };
    let before = transforms.len();

    // Both passes only ever remove transforms, so an unchanged length
    // means neither found anything left to do.
    loop {
        let len = transforms.len();
        dedup_transforms(&mut transforms, &mut product);
        prune_dead(&mut transforms, product);
        if transforms.len() == len {
            break;
        }
    }

    let slot_count = compact_slots(&mut transforms, plan.source_count());
    tracing::debug!(before, after = transforms.len(), "optimised transform plan");
    TransformPlan::new(transforms, plan.source_count(), slot_count)
}

/// Pass 1: duplicate elimination.
///
/// Two transforms are duplicates when they invoke the same renderer handle
/// over the same input slots. The later one is dropped and every consumer of
/// its output is rewired onto the surviving slot. Renderers built per node
/// get distinct handles and are never merged.
fn dedup_transforms(transforms: &mut Vec<Transform>, product: &mut SlotId) {
    let mut seen: AHashMap<(usize, Vec<SlotId>), SlotId> = AHashMap::new();
    let mut alias: AHashMap<SlotId, SlotId> = AHashMap::new();
    let mut kept = Vec::with_capacity(transforms.len());

    for mut transform in transforms.drain(..) {
        for slot in &mut transform.inputs {
            if let Some(target) = alias.get(slot) {
                *slot = *target;
            }
        }
        let key = (
            Arc::as_ptr(&transform.renderer).cast::<()>() as usize,
            transform.inputs.clone(),
        );
        match seen.get(&key) {
            Some(existing) => {
                // alias targets are outputs of kept transforms, so
                // chains cannot form and one hop always resolves
                alias.insert(transform.output, *existing);
            }
            None => {
                seen.insert(key, transform.output);
                kept.push(transform);
            }
        }
    }

    if let Some(target) = alias.get(product) {
        *product = *target;
    }
    *transforms = kept;
}

/// Pass 2: dead transform pruning.
///
/// Walks the plan backwards from the product slot and keeps only the
/// transforms whose output is consumed on some path to it. Side branches
/// that never reach the product disappear here.
fn prune_dead(transforms: &mut Vec<Transform>, product: SlotId) {
    let mut needed: AHashSet<SlotId> = AHashSet::new();
    needed.insert(product);
    let mut kept = Vec::with_capacity(transforms.len());

    for transform in transforms.drain(..).rev() {
        if needed.contains(&transform.output) {
            needed.extend(transform.inputs.iter().copied());
            kept.push(transform);
        }
    }

    kept.reverse();
    *transforms = kept;
}

/// Renumbers slots densely after the pruning passes punched holes in the
/// slot space. Sources keep slots `0..source_count`, surviving outputs
/// follow in execution order. Returns the new slot count.
fn compact_slots(transforms: &mut [Transform], source_count: usize) -> usize {
    let mut remap: AHashMap<SlotId, SlotId> = AHashMap::new();
    let mut next = source_count;

    for transform in transforms.iter_mut() {
        for slot in &mut transform.inputs {
            if *slot >= source_count {
                if let Some(mapped) = remap.get(slot) {
                    *slot = *mapped;
                }
            }
        }
        remap.insert(transform.output, next);
        transform.output = next;
        next += 1;
    }

    next
}
