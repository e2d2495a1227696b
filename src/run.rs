//! Per-invocation mutable state: the row -> core index map plus the cells
//! map at whatever precision the descent is currently operating on.

use std::collections::HashMap;

use h3o::CellIndex;

use crate::cell_state::CellState;
use crate::grid;

/// Debug provenance accumulated alongside the index map, one entry per row.
pub struct DebugTrace {
    pub center_p: Vec<u8>,
    pub line_p: Vec<u8>,
    pub id_safe: Vec<u8>,
    pub loc_safe: Vec<u8>,
    pub unsafe_flag: Vec<u8>,
}

impl DebugTrace {
    pub fn new(n_rows: usize) -> Self {
        Self {
            center_p: vec![0; n_rows],
            line_p: vec![0; n_rows],
            id_safe: vec![0; n_rows],
            loc_safe: vec![0; n_rows],
            unsafe_flag: vec![0; n_rows],
        }
    }
}

/// Holds algorithm parameters and the state threaded through one descent.
pub struct AnonRun {
    pub k: usize,
    pub min_p: u8,
    pub max_p: u8,
    /// `index_map[i]` is the row this row currently adopts. Initialized to
    /// the identity; only ever overwritten with a core or outlier index.
    pub index_map: Vec<usize>,
    pub cells: HashMap<CellIndex, CellState>,
}

impl AnonRun {
    pub fn new(n_rows: usize, k: usize, min_p: u8, max_p: u8) -> Self {
        Self {
            k,
            min_p,
            max_p,
            index_map: (0..n_rows).collect(),
            cells: HashMap::new(),
        }
    }

    /// Seed the cells map at `seed_p` (normally `max_p + 1`) from a flat
    /// list of `(row, lat, lon, id)` tuples.
    pub fn seed<'a>(
        &mut self,
        rows: impl Iterator<Item = (usize, f64, f64, &'a str)>,
        seed_p: u8,
    ) -> Result<(), crate::error::Error> {
        for (i, lat, lon, id) in rows {
            let cell = grid::cell_of(lat, lon, seed_p)?;
            self.cells
                .entry(cell)
                .or_insert_with(|| CellState::new(self.k))
                .push_free(i, id);
        }
        Ok(())
    }

    /// Coarsen every current cell to its ancestor at `new_p`, combining
    /// states that land on the same parent. Returns whether any free rows
    /// remain in the coarsened map.
    pub fn coarsen_to(&mut self, new_p: u8) -> bool {
        let mut parent_cells: HashMap<CellIndex, CellState> = HashMap::new();
        let mut any_free = false;
        for (h, state) in self.cells.drain() {
            any_free = any_free || !state.free.is_empty();
            let parent = grid::parent(h, new_p);
            parent_cells
                .entry(parent)
                .or_insert_with(|| CellState::new(self.k))
                .combine(&state);
        }
        self.cells = parent_cells;
        any_free
    }

    /// Group every remaining free row with itself at `floor_p`: the first
    /// free row of each cell becomes the representative for the rest.
    pub fn finalize_outliers(&mut self, floor_p: u8, mut debug: Option<&mut DebugTrace>) {
        for state in self.cells.values() {
            let Some(&first) = state.free.first() else {
                continue;
            };
            for &i in &state.free {
                self.index_map[i] = first;
                if let Some(trace) = debug.as_deref_mut() {
                    trace.center_p[i] = floor_p;
                    trace.line_p[i] = floor_p;
                    trace.unsafe_flag[i] = 1;
                }
            }
        }
    }
}
