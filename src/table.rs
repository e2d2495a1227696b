//! Minimal tabular container: just enough column typing to pull out
//! coordinates and ids, and to rewrite rows once clustering decides who
//! adopts whom.

use crate::error::Error;

/// A single column's values, tagged by type.
#[derive(Debug, Clone)]
pub enum Column {
    F64(Vec<f64>),
    Str(Vec<String>),
    I64(Vec<i64>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::F64(v) => v.len(),
            Column::Str(v) => v.len(),
            Column::I64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn as_f64(&self, name: &str) -> Result<&[f64], Error> {
        match self {
            Column::F64(v) => Ok(v),
            _ => Err(Error::NonNumericColumn(name.to_string())),
        }
    }

    /// Render row `i` as a string, regardless of column type. Used to feed
    /// a column's values into [`CellState`](crate::cell_state::CellState)'s
    /// id sample, where any stable string representation suffices.
    fn render(&self, i: usize) -> String {
        match self {
            Column::F64(v) => v[i].to_string(),
            Column::Str(v) => v[i].clone(),
            Column::I64(v) => v[i].to_string(),
        }
    }
}

/// A named collection of equal-length columns plus a row count.
#[derive(Debug, Clone, Default)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    pub fn new() -> Self {
        Self {
            names: Vec::new(),
            columns: Vec::new(),
            n_rows: 0,
        }
    }

    /// Append a column, checking it matches the row count established by
    /// any prior column.
    pub fn push_column(&mut self, name: impl Into<String>, column: Column) -> Result<(), Error> {
        let name = name.into();
        if self.columns.is_empty() {
            self.n_rows = column.len();
        } else if column.len() != self.n_rows {
            return Err(Error::ColumnLengthMismatch {
                column: name,
                expected: self.n_rows,
                got: column.len(),
            });
        }
        self.names.push(name);
        self.columns.push(column);
        Ok(())
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn column(&self, name: &str) -> Result<&Column, Error> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.columns[i])
            .ok_or_else(|| Error::MissingColumn(name.to_string()))
    }

    /// Render row `i` of `column` as a string (see [`Column::render`]).
    pub fn render_cell(&self, column: &str, i: usize) -> Result<String, Error> {
        let col = self.column(column)?;
        if i >= col.len() {
            return Err(Error::RowOutOfBounds(i));
        }
        Ok(col.render(i))
    }

    /// Pull `(lat, lon)` out of two separate numeric columns, row by row.
    pub fn latlon_from_columns(
        &self,
        lat_col: &str,
        lon_col: &str,
    ) -> Result<Vec<(f64, f64)>, Error> {
        let lat = self.column(lat_col)?.as_f64(lat_col)?;
        let lon = self.column(lon_col)?.as_f64(lon_col)?;
        Ok(lat.iter().copied().zip(lon.iter().copied()).collect())
    }

    /// Pull `(lat, lon)` out of one combined `"lon,lat"` string column.
    ///
    /// Matches the order produced by the original tooling's combined
    /// coordinate column: the first field is longitude, the second is
    /// latitude.
    pub fn latlon_from_combined(&self, combined_col: &str) -> Result<Vec<(f64, f64)>, Error> {
        let col = self.column(combined_col)?;
        let values = match col {
            Column::Str(v) => v,
            _ => return Err(Error::NonNumericColumn(combined_col.to_string())),
        };
        values.iter().map(|raw| parse_latlon(raw)).collect()
    }

    /// Build a new table of the same shape where only the columns named in
    /// `rewrite_cols` (lat/lon and any designated sensitive columns) are
    /// replaced by the row each `index_map` entry points to; every other
    /// column - including the id column - is copied unchanged from its own
    /// row.
    pub fn rewrite_rows(&self, index_map: &[usize], rewrite_cols: &[&str]) -> Result<Table, Error> {
        if index_map.len() != self.n_rows {
            return Err(Error::ColumnLengthMismatch {
                column: "index_map".to_string(),
                expected: self.n_rows,
                got: index_map.len(),
            });
        }
        let mut out = Table::new();
        for (name, col) in self.names.iter().zip(self.columns.iter()) {
            let rewritten = if rewrite_cols.contains(&name.as_str()) {
                match col {
                    Column::F64(v) => Column::F64(index_map.iter().map(|&i| v[i]).collect()),
                    Column::Str(v) => Column::Str(index_map.iter().map(|&i| v[i].clone()).collect()),
                    Column::I64(v) => Column::I64(index_map.iter().map(|&i| v[i]).collect()),
                }
            } else {
                col.clone()
            };
            out.push_column(name.clone(), rewritten)?;
        }
        Ok(out)
    }
}

/// Parse a combined `"lon,lat"` coordinate string into `(lat, lon)`.
pub fn parse_latlon(raw: &str) -> Result<(f64, f64), Error> {
    let mut parts = raw.trim().split(',');
    let lon = parts.next();
    let lat = parts.next();
    let extra = parts.next();
    match (lon, lat, extra) {
        (Some(lon), Some(lat), None) => {
            let lon: f64 = lon
                .trim()
                .parse()
                .map_err(|_| Error::MalformedLatLon(raw.to_string()))?;
            let lat: f64 = lat
                .trim()
                .parse()
                .map_err(|_| Error::MalformedLatLon(raw.to_string()))?;
            Ok((lat, lon))
        }
        _ => Err(Error::MalformedLatLon(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_latlon_is_lon_first() {
        let (lat, lon) = parse_latlon("-8.7354573,42.2239522").unwrap();
        approx::assert_relative_eq!(lon, -8.7354573);
        approx::assert_relative_eq!(lat, 42.2239522);
    }

    #[test]
    fn parse_latlon_rejects_malformed() {
        assert!(parse_latlon("not-a-coordinate").is_err());
        assert!(parse_latlon("1.0,2.0,3.0").is_err());
    }

    #[test]
    fn push_column_rejects_length_mismatch() {
        let mut t = Table::new();
        t.push_column("a", Column::F64(vec![1.0, 2.0])).unwrap();
        let err = t.push_column("b", Column::F64(vec![1.0])).unwrap_err();
        assert!(matches!(err, Error::ColumnLengthMismatch { .. }));
    }

    #[test]
    fn rewrite_rows_only_touches_named_columns() {
        let mut t = Table::new();
        t.push_column("id", Column::Str(vec!["a".into(), "b".into(), "c".into()]))
            .unwrap();
        t.push_column("lat", Column::F64(vec![1.0, 2.0, 3.0]))
            .unwrap();
        let rewritten = t.rewrite_rows(&[0, 0, 0], &["lat"]).unwrap();
        match rewritten.column("id").unwrap() {
            Column::Str(v) => assert_eq!(v, &["a", "b", "c"]),
            _ => panic!("wrong column type"),
        }
        match rewritten.column("lat").unwrap() {
            Column::F64(v) => assert_eq!(v, &[1.0, 1.0, 1.0]),
            _ => panic!("wrong column type"),
        }
    }

    #[test]
    fn missing_column_is_reported() {
        let t = Table::new();
        assert!(matches!(
            t.column("nope"),
            Err(Error::MissingColumn(_))
        ));
    }
}
