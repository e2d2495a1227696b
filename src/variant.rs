//! Descent strategies. Each variant walks the precision ladder from
//! `max_p + 1` down to `min_p`, clustering at each precision before
//! deciding whether to flip from id-level to loc-level (dot) counting and
//! whether to step to the next coarser precision.
//!
//! The three variants share the same clustering/bookkeeping plumbing
//! ([`apply_events`]) and differ only in when a pass runs under dot-level
//! rules and when the ladder stops: [`Variant::IdHex`] computes dot-level
//! purely from how `current_p` compares to `break_p`, while
//! [`Variant::Strict`] and [`Variant::Classic`] flip once, in place, at
//! `min_p + 1` and take one extra pass there before stopping.

use crate::cell_state::Core;
use crate::config::{AnonConfig, Variant};
use crate::overlap::{self, AssignEvent};
use crate::run::{AnonRun, DebugTrace};

/// Run the full precision descent for `config` over the seeded `run`,
/// optionally recording provenance into `debug`. `run` must already be
/// seeded at `config.max_p + 1`.
pub fn run_descent(config: &AnonConfig, run: &mut AnonRun, mut debug: Option<&mut DebugTrace>) {
    match config.variant {
        Variant::IdHex { break_p } => run_idhex(config, run, break_p, &mut debug),
        Variant::Strict => run_flip_once(config, run, false, &mut debug),
        Variant::Classic => run_flip_once(config, run, true, &mut debug),
    }
    run.finalize_outliers(config.min_p, debug);
}

/// `IdHex`: at every precision, dot-level is active once `current_p` has
/// dropped to `break_p + 1` or below - purely a function of the current
/// precision, so it can already be true on the very first pass if
/// `break_p == max_p`. Always decrements after a pass.
fn run_idhex(config: &AnonConfig, run: &mut AnonRun, break_p: u8, debug: &mut Option<&mut DebugTrace>) {
    let mut current_p = config.max_p + 1;
    while current_p > config.min_p {
        let dot_level = current_p <= break_p + 1;
        let events = overlap::run_pass(&mut run.cells, current_p, config.k, dot_level);
        apply_events(run, &events, debug);

        current_p -= 1;
        if !run.coarsen_to(current_p) {
            break;
        }
    }
}

/// `Strict`/`Classic`: id-level passes run at every precision down to
/// `min_p + 1`; once there, flip to dot-level in place (no decrement,
/// same precision gets one more pass), then resume decrementing.
fn run_flip_once(config: &AnonConfig, run: &mut AnonRun, classic: bool, debug: &mut Option<&mut DebugTrace>) {
    let mut current_p = config.max_p + 1;
    let mut dot_level = false;
    while current_p > config.min_p {
        let events = if classic {
            classic_pass(run, current_p, config.k, dot_level)
        } else {
            overlap::run_pass(&mut run.cells, current_p, config.k, dot_level)
        };
        apply_events(run, &events, debug);

        if current_p == config.min_p + 1 && !dot_level {
            dot_level = true;
        } else {
            current_p -= 1;
            if !run.coarsen_to(current_p) {
                break;
            }
        }
    }
}

/// Apply a pass's assignments to the index map and, if present, the debug
/// trace.
fn apply_events(run: &mut AnonRun, events: &[AssignEvent], debug: &mut Option<&mut DebugTrace>) {
    for event in events {
        for &member in &event.members {
            run.index_map[member] = event.core_index;
        }
        if let Some(trace) = debug.as_deref_mut() {
            for &member in &event.members {
                trace.center_p[member] = event.core_precision;
                trace.line_p[member] = event.join_precision;
                if event.dot_level {
                    trace.loc_safe[member] = 1;
                } else {
                    trace.id_safe[member] = 1;
                }
            }
        }
    }
}

/// A Classic pass considers each occupied cell on its own: no flower, no
/// overlap construction. A cell with enough free rows becomes its own
/// core; otherwise it attaches to the first already-established core
/// anchored at that same cell, if any.
fn classic_pass(run: &mut AnonRun, current_p: u8, k: usize, dot_level: bool) -> Vec<AssignEvent> {
    let mut events = Vec::new();
    let mut keys: Vec<_> = run.cells.keys().copied().collect();
    keys.sort();

    for h in keys {
        let state = run.cells.get_mut(&h).unwrap();
        let pool_len = if dot_level {
            state.free.len()
        } else {
            state.ids.len()
        };

        if pool_len >= k && !state.free.is_empty() {
            let core_index = state.free[0];
            let core_precision = current_p - 1;
            let core = Core {
                core_index,
                core_precision,
                anchor_cell: h,
                dot_level,
            };
            events.push(AssignEvent {
                members: state.free.clone(),
                core_index,
                core_precision,
                join_precision: current_p - 1,
                dot_level,
            });
            state.push_core(core);
            state.clear_free();
        } else if !state.free.is_empty() && !state.cores.is_empty() {
            let core = state.cores[0];
            events.push(AssignEvent {
                members: state.free.clone(),
                core_index: core.core_index,
                core_precision: core.core_precision,
                join_precision: current_p - 1,
                dot_level: core.dot_level,
            });
            state.clear_free();
        }
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnonConfig;

    fn seeded_run(coords: &[(f64, f64, &str)], k: usize, min_p: u8, max_p: u8) -> AnonRun {
        let mut run = AnonRun::new(coords.len(), k, min_p, max_p);
        run.seed(
            coords
                .iter()
                .enumerate()
                .map(|(i, (lat, lon, id))| (i, *lat, *lon, *id)),
            max_p + 1,
        )
        .unwrap();
        run
    }

    #[test]
    fn strict_descent_clusters_close_points() {
        let coords = [
            (42.2239522, -8.7354573, "1"),
            (42.224499, -8.7357169, "2"),
        ];
        let config = AnonConfig::new(2, 0, 14, None, false).unwrap();
        let mut run = seeded_run(&coords, 2, 0, 14);
        run_descent(&config, &mut run, None);
        assert_eq!(run.index_map[0], run.index_map[1]);
    }

    #[test]
    fn classic_descent_clusters_close_points() {
        let coords = [
            (42.2239522, -8.7354573, "1"),
            (42.224499, -8.7357169, "2"),
        ];
        let config = AnonConfig::new(2, 0, 14, None, true).unwrap();
        let mut run = seeded_run(&coords, 2, 0, 14);
        run_descent(&config, &mut run, None);
        assert_eq!(run.index_map[0], run.index_map[1]);
    }

    #[test]
    fn far_apart_points_become_outliers_at_k1() {
        let coords = [
            (42.2239522, -8.7354573, "1"),
            (-33.45, -70.66, "2"),
        ];
        let config = AnonConfig::new(1, 0, 14, None, false).unwrap();
        let mut run = seeded_run(&coords, 1, 0, 14);
        run_descent(&config, &mut run, None);
        assert_eq!(run.index_map[0], 0);
        assert_eq!(run.index_map[1], 1);
    }

    // A first pass must always happen at `max_p + 1`, so a core created
    // there carries `core_precision == max_p` - regression test for the
    // ladder skipping that pass when `max_p == min_p`.
    #[test]
    fn first_pass_runs_even_when_min_p_equals_max_p() {
        let coords = [
            (42.2239522, -8.7354573, "1"),
            (42.224499, -8.7357169, "2"),
        ];
        let config = AnonConfig::new(2, 9, 9, None, false).unwrap();
        let mut run = seeded_run(&coords, 2, 9, 9);
        let mut trace = DebugTrace::new(2);
        run_descent(&config, &mut run, Some(&mut trace));
        assert_eq!(run.index_map[0], run.index_map[1]);
        assert_eq!(trace.center_p[0], 9);
    }

    #[test]
    fn idhex_can_start_in_dot_level_when_break_p_is_max_p() {
        let coords = [
            (42.2239522, -8.7354573, "1"),
            (42.224499, -8.7357169, "2"),
        ];
        let config = AnonConfig::new(2, 0, 14, Some(14), false).unwrap();
        let mut run = seeded_run(&coords, 2, 0, 14);
        let mut trace = DebugTrace::new(2);
        run_descent(&config, &mut run, Some(&mut trace));
        assert_eq!(run.index_map[0], run.index_map[1]);
        assert_eq!(trace.loc_safe[0], 1);
    }
}
