//! Per-cell bag of free members, established cores, and a bounded
//! sampled-id set. Forms a monoid under [`CellState::combine`], which lets
//! the overlap clusterer build a non-destructive union over a flower of
//! cells without touching the originals.

use std::collections::HashSet;

use h3o::CellIndex;

/// A designated representative row for a cluster.
#[derive(Debug, Clone, Copy)]
pub struct Core {
    /// Row index adopted by all members of this cluster.
    pub core_index: usize,
    /// Precision at which this core was created (`current_p - 1`).
    pub core_precision: u8,
    /// The occupied cell whose free pool produced the representative.
    pub anchor_cell: CellIndex,
    /// Whether this core was promoted under loc-level (dot) rules.
    /// Debug-only; irrelevant to clustering decisions.
    pub dot_level: bool,
}

/// State of a single hex cell during the descent: rows not yet assigned
/// to a cluster, cores already established anchored here, and a bounded
/// sample of the distinct entity ids among the free rows.
#[derive(Debug, Clone)]
pub struct CellState {
    pub free: Vec<usize>,
    pub cores: Vec<Core>,
    pub ids: HashSet<String>,
    soft_max_ids: usize,
}

impl CellState {
    /// An empty cell state. `soft_max_ids` is the performance guard on
    /// `ids`: once that many distinct ids are observed, further ids are
    /// irrelevant to a `>= K` check and are no longer collected.
    pub fn new(soft_max_ids: usize) -> Self {
        Self {
            free: Vec::new(),
            cores: Vec::new(),
            ids: HashSet::new(),
            soft_max_ids,
        }
    }

    /// Append a free row to this cell.
    pub fn push_free(&mut self, row: usize, id: &str) {
        self.free.push(row);
        if self.ids.len() < self.soft_max_ids {
            self.ids.insert(id.to_string());
        }
    }

    /// Append an established core anchored at this cell.
    pub fn push_core(&mut self, core: Core) {
        self.cores.push(core);
    }

    /// Drop the free pool (and its id sample). Cores are untouched.
    pub fn clear_free(&mut self) {
        self.free.clear();
        self.ids.clear();
    }

    /// Merge `other` into `self` in place: `free` and `cores` are
    /// concatenated in order, `ids` only absorbs `other`'s ids while still
    /// under the soft cap.
    pub fn combine(&mut self, other: &CellState) {
        self.free.extend_from_slice(&other.free);
        self.cores.extend_from_slice(&other.cores);
        if self.ids.len() < self.soft_max_ids {
            self.ids.extend(other.ids.iter().cloned());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_cell() -> CellIndex {
        h3o::LatLng::new(0.0, 0.0).unwrap().to_cell(h3o::Resolution::Zero)
    }

    #[test]
    fn combine_concatenates_free_and_cores() {
        let mut a = CellState::new(10);
        a.push_free(0, "x");
        let mut b = CellState::new(10);
        b.push_free(1, "y");
        b.push_core(Core {
            core_index: 1,
            core_precision: 3,
            anchor_cell: dummy_cell(),
            dot_level: false,
        });

        a.combine(&b);
        assert_eq!(a.free, vec![0, 1]);
        assert_eq!(a.cores.len(), 1);
        assert!(a.ids.contains("x") && a.ids.contains("y"));
    }

    #[test]
    fn soft_cap_stops_id_absorption() {
        let mut a = CellState::new(1);
        a.push_free(0, "x");
        assert_eq!(a.ids.len(), 1);

        let mut b = CellState::new(1);
        b.push_free(1, "y");

        a.combine(&b);
        // already at the soft cap, so `y` is not absorbed
        assert_eq!(a.ids.len(), 1);
        assert!(a.ids.contains("x"));
    }

    #[test]
    fn clear_free_drops_free_and_ids_but_keeps_cores() {
        let mut a = CellState::new(10);
        a.push_free(0, "x");
        a.push_core(Core {
            core_index: 0,
            core_precision: 2,
            anchor_cell: dummy_cell(),
            dot_level: false,
        });
        a.clear_free();
        assert!(a.free.is_empty());
        assert!(a.ids.is_empty());
        assert_eq!(a.cores.len(), 1);
    }
}
