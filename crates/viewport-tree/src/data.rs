//! Data rows (spec §3, "Data row"). Rows are append-only under a schema id;
//! the protocol exposes no row-delete primitive.

use crate::schema::{ColumnType, SchemaColumn};

/// One typed cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
	Str(String),
	U64(u64),
	I64(i64),
	F64(f64),
	Bool(bool),
	/// Seconds since the Unix epoch.
	Timestamp(i64),
}

impl Cell {
	/// Canonical to-string used by the `default` column format (spec §4.5).
	pub fn to_canonical_string(&self) -> String {
		match self {
			Cell::Str(s) => s.clone(),
			Cell::U64(v) => v.to_string(),
			Cell::I64(v) => v.to_string(),
			Cell::F64(v) => v.to_string(),
			Cell::Bool(v) => v.to_string(),
			Cell::Timestamp(v) => v.to_string(),
		}
	}

	/// This cell's value as `f64`, for numeric formats like `human_bytes`.
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Cell::U64(v) => Some(*v as f64),
			Cell::I64(v) => Some(*v as f64),
			Cell::F64(v) => Some(*v),
			_ => None,
		}
	}

	/// This cell's value as a Unix timestamp in seconds, for `relative_time`.
	pub fn as_timestamp_secs(&self) -> Option<i64> {
		match self {
			Cell::Timestamp(v) => Some(*v),
			Cell::I64(v) => Some(*v),
			Cell::U64(v) => i64::try_from(*v).ok(),
			_ => None,
		}
	}
}

/// A positional tuple of cells, matching a schema's column order.
#[derive(Debug, Clone, PartialEq)]
pub struct DataRow(pub Vec<Cell>);

impl DataRow {
	/// Builds a positional row from a named record, using `schema` to
	/// determine column order (spec §3: "a named record convertible to a
	/// positional tuple via the current schema"). Fields missing from
	/// `named` are left out of the resulting row at that position, which
	/// callers should avoid; this is a convenience for well-formed input.
	pub fn from_named(named: &[(String, Cell)], schema: &[SchemaColumn]) -> Self {
		let mut cells = Vec::with_capacity(schema.len());
		for col in schema {
			let cell = named
				.iter()
				.find(|(name, _)| name == &col.name)
				.map(|(_, cell)| cell.clone())
				.unwrap_or_else(|| default_cell_for(col.column_type));
			cells.push(cell);
		}
		DataRow(cells)
	}
}

fn default_cell_for(column_type: ColumnType) -> Cell {
	match column_type {
		ColumnType::String => Cell::Str(String::new()),
		ColumnType::Uint64 => Cell::U64(0),
		ColumnType::Int64 => Cell::I64(0),
		ColumnType::Float64 => Cell::F64(0.0),
		ColumnType::Bool => Cell::Bool(false),
		ColumnType::Timestamp => Cell::Timestamp(0),
	}
}
