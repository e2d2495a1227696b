//! HexGrid adapter - wraps `h3o` primitives behind the shapes the
//! clustering loop needs, and supplies the one operation `h3o` doesn't:
//! distance between cells living at different precisions.

use h3o::{CellIndex, LatLng, Resolution};

use crate::error::Error;

/// Highest valid precision level this engine will ever hand to `h3o`.
///
/// Precisions 0..=14 are the ones callers configure; the descent loop
/// additionally seeds at `max_p + 1`, so 15 must stay representable.
pub const MAX_PRECISION: u8 = 15;

/// Convert a plain precision counter into an `h3o::Resolution`.
///
/// Every precision value the descent loop produces is derived from
/// `min_p`/`max_p` (both validated to lie in `0..=14`) via `+1` or `-1`
/// steps, so it always lands in `0..=15`.
pub fn resolution(p: u8) -> Resolution {
    Resolution::try_from(p).unwrap_or_else(|_| panic!("precision {p} out of range 0..=15"))
}

/// `cell_of(lat, lon, p) -> h`
pub fn cell_of(lat: f64, lon: f64, p: u8) -> Result<CellIndex, Error> {
    let latlng = LatLng::new(lat, lon)
        .map_err(|e| Error::InvalidCoordinates(format!("({lat}, {lon}): {e}")))?;
    Ok(latlng.to_cell(resolution(p)))
}

/// `parent(h, p) -> h'` - coarsen a cell to an ancestor precision.
pub fn parent(h: CellIndex, p: u8) -> CellIndex {
    h.parent(resolution(p))
        .unwrap_or_else(|| panic!("cell {h} has no parent at precision {p}"))
}

/// `one_ring(h) -> 7 cells` - h plus its six same-precision neighbors.
pub fn one_ring(h: CellIndex) -> Vec<CellIndex> {
    h.grid_disk::<Vec<_>>(1)
}

/// `center_child(h, p_target) -> h''` - refine to the canonical descendant.
fn center_child(h: CellIndex, p_target: u8) -> CellIndex {
    h.center_child(resolution(p_target))
        .unwrap_or_else(|| panic!("cell {h} has no center child at precision {p_target}"))
}

/// `mixed_distance(h1, h2, p_high) -> grid distance`
///
/// Refines both inputs to `p_high` via `center_child` before invoking the
/// library's same-precision grid distance. `p_high` must be the highest
/// precision among the cells being compared - `center_child` only refines,
/// it cannot coarsen.
///
/// `grid_distance` is itself fallible (undefined across disjoint base
/// cells); since this is a tie-break heuristic and not a correctness
/// requirement, a failure is mapped to `u32::MAX` rather than propagated.
pub fn mixed_distance(h1: CellIndex, h2: CellIndex, p_high: u8) -> u32 {
    if h1 == h2 {
        return 0;
    }
    let a = center_child(h1, p_high);
    let b = center_child(h2, p_high);
    a.grid_distance(b).map(|d| d as u32).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_of_same_point_is_stable() {
        let a = cell_of(42.2239522, -8.7354573, 9).unwrap();
        let b = cell_of(42.2239522, -8.7354573, 9).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn parent_is_coarser_ancestor() {
        let h = cell_of(42.2239522, -8.7354573, 9).unwrap();
        let p = parent(h, 5);
        assert_eq!(p.resolution(), resolution(5));
    }

    #[test]
    fn one_ring_contains_self() {
        let h = cell_of(42.2239522, -8.7354573, 9).unwrap();
        let ring = one_ring(h);
        assert!(ring.contains(&h));
        assert!(ring.len() <= 7);
    }

    #[test]
    fn mixed_distance_to_self_is_zero() {
        let h = cell_of(42.2239522, -8.7354573, 9).unwrap();
        assert_eq!(mixed_distance(h, h, 9), 0);
    }

    #[test]
    fn invalid_coordinates_are_rejected() {
        assert!(cell_of(200.0, 0.0, 9).is_err());
    }
}
