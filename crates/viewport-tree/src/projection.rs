//! Text projection (C5, spec §4.5): a deterministic, renderer-independent
//! reduction of a render tree to a plain string.

use chrono::{DateTime, Utc};

use crate::data::Cell;
use crate::ids::{NodeId, SlotId};
use crate::node::NodeType;
use crate::props::Direction;
use crate::schema::{ColumnFormat, SchemaColumn};
use crate::slot::SlotValue;
use crate::tree::RenderTree;

const SEPARATOR_DASHES: &str = "────────────────";

/// Projects `tree` to a plain string, using `now` as the reference clock for
/// `relative_time` cell formatting (spec §4.5, §4.6 invariant: "for fixed
/// input (including a fixed \"now\"...) text projection is deterministic").
pub fn project(tree: &RenderTree, now: DateTime<Utc>) -> String {
	match tree.root_id() {
		Some(root) => project_node(tree, root, now),
		None => String::new(),
	}
}

fn project_node(tree: &RenderTree, id: NodeId, now: DateTime<Utc>) -> String {
	let Some(record) = tree.get(id) else {
		return String::new();
	};

	if let Some(alt) = &record.text_alt {
		return alt.clone();
	}

	match record.node_type {
		NodeType::Text => record.props.content.clone().unwrap_or_default(),
		NodeType::Box => {
			let joiner = match record.props.direction.unwrap_or_default() {
				Direction::Column => "\n",
				Direction::Row => "\t",
			};
			join_children(tree, &record.children, joiner, now)
		}
		NodeType::Scroll => {
			let mut parts: Vec<String> = record
				.children
				.iter()
				.map(|child| project_node(tree, *child, now))
				.filter(|s| !s.is_empty())
				.collect();
			if let Some(table) = project_row_template(tree, &record.props, now) {
				parts.push(table);
			}
			parts.join("\n")
		}
		NodeType::Input => record
			.props
			.value
			.clone()
			.or_else(|| record.props.placeholder.clone())
			.unwrap_or_default(),
		NodeType::Image | NodeType::Canvas => record
			.props
			.alt_text
			.clone()
			.unwrap_or_else(|| "[image]".to_string()),
		NodeType::Separator => SEPARATOR_DASHES.to_string(),
	}
}

fn join_children(tree: &RenderTree, children: &[NodeId], joiner: &str, now: DateTime<Utc>) -> String {
	children
		.iter()
		.map(|child| project_node(tree, *child, now))
		.filter(|s| !s.is_empty())
		.collect::<Vec<_>>()
		.join(joiner)
}

/// Resolves `props.template` to a `row_template` slot, then that slot's
/// schema, and renders a header + one TSV row per data row (spec §4.5,
/// worked example in §8.6). Returns `None` if the chain doesn't resolve
/// (missing slot, wrong slot kind, or schema not yet defined — I6/I7
/// tolerate this as "late-arriving schema").
fn project_row_template(tree: &RenderTree, props: &crate::props::Props, now: DateTime<Utc>) -> Option<String> {
	let template_slot = SlotId(props.template?);
	let schema_id = match tree.slot(template_slot)? {
		SlotValue::RowTemplate { schema } => *schema,
		_ => return None,
	};
	let columns = tree.schema(schema_id)?;
	let rows = tree.data_rows(schema_id).unwrap_or(&[]);

	let mut out = String::new();
	out.push_str(&columns.iter().map(|c| c.name.as_str()).collect::<Vec<_>>().join("\t"));
	for row in rows {
		out.push('\n');
		out.push_str(&format_row(row.0.as_slice(), columns, now));
	}
	Some(out)
}

fn format_row(cells: &[Cell], columns: &[SchemaColumn], now: DateTime<Utc>) -> String {
	cells
		.iter()
		.zip(columns.iter())
		.map(|(cell, col)| format_cell(cell, col, now))
		.collect::<Vec<_>>()
		.join("\t")
}

fn format_cell(cell: &Cell, col: &SchemaColumn, now: DateTime<Utc>) -> String {
	match &col.format {
		Some(ColumnFormat::HumanBytes) => cell.as_f64().map(format_human_bytes).unwrap_or_else(|| cell.to_canonical_string()),
		Some(ColumnFormat::RelativeTime) => cell
			.as_timestamp_secs()
			.map(|ts| format_relative_time(ts, now))
			.unwrap_or_else(|| cell.to_canonical_string()),
		_ => cell.to_canonical_string(),
	}
}

fn format_human_bytes(value: f64) -> String {
	const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];
	if value.abs() < 1024.0 {
		return format!("{:.0} {}", value, UNITS[0]);
	}
	let mut scaled = value;
	let mut unit_idx = 0;
	while scaled.abs() >= 1024.0 && unit_idx < UNITS.len() - 1 {
		scaled /= 1024.0;
		unit_idx += 1;
	}
	format!("{:.1} {}", scaled, UNITS[unit_idx])
}

fn format_relative_time(timestamp_secs: i64, now: DateTime<Utc>) -> String {
	let diff = now.timestamp() - timestamp_secs;
	if diff < 60 {
		"just now".to_string()
	} else if diff < 3600 {
		format!("{}m ago", diff / 60)
	} else if diff < 86_400 {
		format!("{}h ago", diff / 3600)
	} else {
		format!("{}d ago", diff / 86_400)
	}
}
