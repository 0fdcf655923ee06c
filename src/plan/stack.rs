use std::collections::BTreeMap;

use crate::annotate::record::AnnotationKind;
use crate::foundation::core::TimeInterval;
use crate::plan::resolve::ResolvedEvent;

/// Assign a stack level to each window, in order.
///
/// A window takes the lowest level not held by any earlier window it overlaps, so a window that
/// only overlaps the upper entries of a stack drops back to the base. Overlap is strict: touching
/// windows share a level. All-pairs scan, `O(n²)`.
pub fn stack_levels(windows: &[TimeInterval]) -> Vec<u32> {
    let mut levels: Vec<u32> = Vec::with_capacity(windows.len());
    for (i, w) in windows.iter().enumerate() {
        let mut taken: Vec<u32> = windows[..i]
            .iter()
            .zip(&levels)
            .filter(|(prev, _)| w.overlaps(**prev))
            .map(|(_, &lvl)| lvl)
            .collect();
        taken.sort_unstable();
        taken.dedup();
        let level = taken
            .iter()
            .enumerate()
            .find(|(want, got)| *want as u32 != **got)
            .map_or(taken.len() as u32, |(want, _)| want as u32);
        levels.push(level);
    }
    levels
}

/// Write [`stack_levels`] of the events' windows back into the events.
pub fn assign_stack_levels(events: &mut [ResolvedEvent]) {
    let windows: Vec<TimeInterval> = events.iter().map(|e| e.window).collect();
    for (event, level) in events.iter_mut().zip(stack_levels(&windows)) {
        event.stack_level = level;
    }
}

/// Make the text cards of each block continuous: every card ends where the next one in the same
/// block starts, closing gaps and trimming overlaps alike. Other kinds keep their windows even
/// inside a block.
///
/// Two passes: block membership is collected first, then boundaries are rewritten.
pub fn normalize_blocks(events: &mut [ResolvedEvent]) {
    let mut blocks: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for (idx, event) in events.iter().enumerate() {
        if event.kind != AnnotationKind::Text {
            continue;
        }
        if let Some(id) = event.block_id {
            blocks.entry(id).or_default().push(idx);
        }
    }

    for members in blocks.values() {
        for pair in members.windows(2) {
            let next_start = events[pair[1]].window.start;
            let prev = &mut events[pair[0]];
            if prev.window.end != next_start {
                prev.window = TimeInterval::clamped(prev.window.start, next_start);
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/plan/stack.rs"]
mod tests;
