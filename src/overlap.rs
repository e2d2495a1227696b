//! Overlap construction and per-overlap core decisions.
//!
//! For every occupied cell, the cell itself and its one-ring neighbors
//! each gain a claim on a "flower" centered at that neighbor. Flowers with
//! two or more occupied cells are candidate clusters; they are resolved in
//! ascending size so tight spatial groupings claim free rows before looser
//! ones do.

use std::collections::HashMap;

use h3o::CellIndex;

use crate::cell_state::{CellState, Core};
use crate::grid;

/// One successful cluster decision: a set of member rows adopting
/// `core_index`, plus the provenance a debug trace needs.
pub struct AssignEvent {
    pub members: Vec<usize>,
    pub core_index: usize,
    pub core_precision: u8,
    pub join_precision: u8,
    pub dot_level: bool,
}

/// Run one overlap-clustering pass at `current_p` and return the resulting
/// assignments. Mutates `cells` in place: successful clusters push a new
/// `Core` onto the anchor cell and clear the `free`/`ids` of every cell in
/// the overlap.
pub fn run_pass(
    cells: &mut HashMap<CellIndex, CellState>,
    current_p: u8,
    k: usize,
    dot_level: bool,
) -> Vec<AssignEvent> {
    let mut occupied: Vec<CellIndex> = cells.keys().copied().collect();
    occupied.sort();

    let mut flowers: HashMap<CellIndex, Vec<CellIndex>> = HashMap::new();
    for &h in &occupied {
        for petal in grid::one_ring(h) {
            flowers.entry(petal).or_default().push(h);
        }
    }

    let mut buckets: Vec<Vec<CellIndex>> = Vec::new();
    for (_, mut members) in flowers {
        members.sort();
        members.dedup();
        if members.len() >= 2 {
            buckets.push(members);
        }
    }
    // ascending size, then lexicographic on the member-cell tuple
    buckets.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));

    let mut events = Vec::new();
    for overlap in buckets {
        let anchor = argmax_free(cells, &overlap);

        let mut combined = CellState::new(k);
        for &h in &overlap {
            if let Some(state) = cells.get(&h) {
                combined.combine(state);
            }
        }

        let pool_len = if dot_level {
            combined.free.len()
        } else {
            combined.ids.len()
        };

        let core = if pool_len >= k {
            let core_index = cells[&anchor].free[0];
            let core_precision = current_p - 1;
            let core = Core {
                core_index,
                core_precision,
                anchor_cell: anchor,
                dot_level,
            };
            cells.get_mut(&anchor).unwrap().push_core(core);
            Some(core)
        } else if !combined.free.is_empty() && !combined.cores.is_empty() {
            Some(attach_core(&combined.cores, anchor))
        } else {
            None
        };

        if let Some(core) = core {
            events.push(AssignEvent {
                members: combined.free.clone(),
                core_index: core.core_index,
                core_precision: core.core_precision,
                join_precision: current_p - 1,
                dot_level: core.dot_level,
            });
            for &h in &overlap {
                cells.get_mut(&h).unwrap().clear_free();
            }
        }
    }
    events
}

/// `argmax_{h in overlap} |cells[h].free|`, ties broken by the first `h`
/// encountered in `overlap`'s (already deterministic) order.
fn argmax_free(cells: &HashMap<CellIndex, CellState>, overlap: &[CellIndex]) -> CellIndex {
    let mut best = overlap[0];
    let mut best_len = cells.get(&best).map_or(0, |c| c.free.len());
    for &h in &overlap[1..] {
        let len = cells.get(&h).map_or(0, |c| c.free.len());
        if len > best_len {
            best = h;
            best_len = len;
        }
    }
    best
}

/// `argmin_{c in combined.cores} mixed_distance(anchor, c.anchor_cell, p_high)`,
/// ties broken by the first core encountered in `cores`'s order.
fn attach_core(cores: &[Core], anchor: CellIndex) -> Core {
    let p_high = cores.iter().map(|c| c.core_precision as u32).max().unwrap() as u8 + 1;
    let mut best = cores[0];
    let mut best_dist = grid::mixed_distance(anchor, best.anchor_cell, p_high);
    for &c in &cores[1..] {
        let dist = grid::mixed_distance(anchor, c.anchor_cell, p_high);
        if dist < best_dist {
            best = c;
            best_dist = dist;
        }
    }
    best
}
