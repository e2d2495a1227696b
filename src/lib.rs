//! Hierarchical hex-grid K-anonymization for geolocation tables.
//!
//! Given a table of rows carrying coordinates and an entity id, this crate
//! groups rows into clusters of at least `k` distinct entities (or, once a
//! cluster has formed, at least `k` located points) and rewrites every
//! row's coordinates to its cluster's representative. Clustering descends
//! from a fine hex precision to a coarse one, merging neighborhoods as it
//! goes; see [`config::Variant`] for the three descent strategies.

pub mod cell_state;
pub mod config;
pub mod error;
pub mod grid;
pub mod overlap;
pub mod run;
pub mod table;
pub mod variant;
pub mod viz;

pub use config::{AnonConfig, Variant};
pub use error::Error;
pub use run::DebugTrace;
pub use table::{Column, Table};

use run::AnonRun;

/// Anonymize `table` using separate latitude/longitude columns and an
/// entity-id column, returning a new table with `lat_col`, `lon_col`, and
/// every column named in `sensitive_cols` rewritten to each cluster's
/// representative row. Every other column, including `id_col`, is copied
/// unchanged.
pub fn anonymize(
    table: &Table,
    lat_col: &str,
    lon_col: &str,
    id_col: &str,
    sensitive_cols: &[&str],
    config: &AnonConfig,
) -> Result<Table, Error> {
    let index_map = cluster(table, lat_col, lon_col, id_col, config, None)?;
    let cols = rewrite_cols(&[lat_col, lon_col], sensitive_cols);
    table.rewrite_rows(&index_map, &cols)
}

/// As [`anonymize`], but reads coordinates from one combined `"lon,lat"`
/// string column instead of two separate numeric columns; that combined
/// column (and every `sensitive_cols` entry) is rewritten, everything else
/// including `id_col` is copied unchanged.
pub fn anonymize_latlon_col(
    table: &Table,
    combined_col: &str,
    id_col: &str,
    sensitive_cols: &[&str],
    config: &AnonConfig,
) -> Result<Table, Error> {
    let coords = table.latlon_from_combined(combined_col)?;
    let index_map = cluster_coords(table, &coords, id_col, config, None)?;
    let cols = rewrite_cols(&[combined_col], sensitive_cols);
    table.rewrite_rows(&index_map, &cols)
}

/// As [`anonymize`], but also returns a provenance table carrying, per
/// original row, the precision its cluster core was created at, the
/// precision its own join happened at, and one-hot id-safe/loc-safe/unsafe
/// flags.
pub fn anonymize_debug(
    table: &Table,
    lat_col: &str,
    lon_col: &str,
    id_col: &str,
    sensitive_cols: &[&str],
    config: &AnonConfig,
) -> Result<(Table, Table), Error> {
    let mut trace = DebugTrace::new(table.n_rows());
    let index_map = cluster(table, lat_col, lon_col, id_col, config, Some(&mut trace))?;
    let cols = rewrite_cols(&[lat_col, lon_col], sensitive_cols);
    let rewritten = table.rewrite_rows(&index_map, &cols)?;
    Ok((rewritten, debug_trace_table(&trace)))
}

fn rewrite_cols<'a>(coord_cols: &[&'a str], sensitive_cols: &[&'a str]) -> Vec<&'a str> {
    let mut cols = coord_cols.to_vec();
    cols.extend_from_slice(sensitive_cols);
    cols
}

fn debug_trace_table(trace: &DebugTrace) -> Table {
    let mut out = Table::new();
    out.push_column("core_p", Column::I64(to_i64(&trace.center_p)))
        .unwrap();
    out.push_column("join_p", Column::I64(to_i64(&trace.line_p)))
        .unwrap();
    out.push_column("id_safe", Column::I64(to_i64(&trace.id_safe)))
        .unwrap();
    out.push_column("loc_safe", Column::I64(to_i64(&trace.loc_safe)))
        .unwrap();
    out.push_column("unsafe", Column::I64(to_i64(&trace.unsafe_flag)))
        .unwrap();
    out
}

fn to_i64(values: &[u8]) -> Vec<i64> {
    values.iter().map(|&v| v as i64).collect()
}

fn cluster(
    table: &Table,
    lat_col: &str,
    lon_col: &str,
    id_col: &str,
    config: &AnonConfig,
    debug: Option<&mut DebugTrace>,
) -> Result<Vec<usize>, Error> {
    let coords = table.latlon_from_columns(lat_col, lon_col)?;
    cluster_coords(table, &coords, id_col, config, debug)
}

fn cluster_coords(
    table: &Table,
    coords: &[(f64, f64)],
    id_col: &str,
    config: &AnonConfig,
    debug: Option<&mut DebugTrace>,
) -> Result<Vec<usize>, Error> {
    let n_rows = table.n_rows();
    if coords.len() != n_rows {
        return Err(Error::ColumnLengthMismatch {
            column: "coordinates".to_string(),
            expected: n_rows,
            got: coords.len(),
        });
    }

    let ids: Vec<String> = (0..n_rows)
        .map(|i| table.render_cell(id_col, i))
        .collect::<Result<_, _>>()?;

    let mut run = AnonRun::new(n_rows, config.k, config.min_p, config.max_p);
    let seed_p = config.max_p + 1;
    run.seed(
        (0..n_rows).map(|i| (i, coords[i].0, coords[i].1, ids[i].as_str())),
        seed_p,
    )?;

    variant::run_descent(config, &mut run, debug);

    Ok(run.index_map)
}
