use crate::node::{Node, NodeType};
use crate::projection::project;
use crate::props::Direction;
use crate::tree::RenderTree;
use crate::NodeId;

fn now() -> chrono::DateTime<chrono::Utc> {
	chrono::Utc::now()
}

fn text(id: u32, content: &str) -> Node {
	let mut n = Node::new(NodeId(id), NodeType::Text);
	n.props.content = Some(content.to_string());
	n
}

#[test]
fn box_row_direction_joins_with_tab() {
	let mut tree = RenderTree::new();
	let mut root = Node::new(NodeId(1), NodeType::Box);
	root.props.direction = Some(Direction::Row);
	root.children = vec![text(2, "a"), text(3, "b")];
	tree.set_tree(Some(root), 1).unwrap();
	assert_eq!(project(&tree, now()), "a\tb");
}

#[test]
fn box_column_is_the_default_direction() {
	let mut tree = RenderTree::new();
	let root = Node {
		children: vec![text(2, "a"), text(3, "b")],
		..Node::new(NodeId(1), NodeType::Box)
	};
	tree.set_tree(Some(root), 1).unwrap();
	assert_eq!(project(&tree, now()), "a\nb");
}

#[test]
fn empty_child_projections_are_skipped() {
	let mut tree = RenderTree::new();
	let root = Node {
		children: vec![text(2, "a"), text(3, ""), text(4, "b")],
		..Node::new(NodeId(1), NodeType::Box)
	};
	tree.set_tree(Some(root), 1).unwrap();
	assert_eq!(project(&tree, now()), "a\nb");
}

#[test]
fn input_falls_back_to_placeholder_then_empty() {
	let mut tree = RenderTree::new();
	let mut with_placeholder = Node::new(NodeId(2), NodeType::Input);
	with_placeholder.props.placeholder = Some("type here".to_string());
	let empty = Node::new(NodeId(3), NodeType::Input);
	let root = Node {
		children: vec![with_placeholder, empty],
		..Node::new(NodeId(1), NodeType::Box)
	};
	tree.set_tree(Some(root), 1).unwrap();
	assert_eq!(project(&tree, now()), "type here");
}

#[test]
fn image_without_alt_text_falls_back_to_bracket_label() {
	let mut tree = RenderTree::new();
	tree.set_tree(Some(Node::new(NodeId(1), NodeType::Image)), 1).unwrap();
	assert_eq!(project(&tree, now()), "[image]");
}

#[test]
fn separator_renders_sixteen_dashes() {
	let mut tree = RenderTree::new();
	tree.set_tree(Some(Node::new(NodeId(1), NodeType::Separator)), 1).unwrap();
	assert_eq!(project(&tree, now()).chars().count(), 16);
}

#[test]
fn text_alt_overrides_default_projection() {
	let mut tree = RenderTree::new();
	let mut node = text(1, "real content");
	node.text_alt = Some("override".to_string());
	tree.set_tree(Some(node), 1).unwrap();
	assert_eq!(project(&tree, now()), "override");
}

#[test]
fn relative_time_buckets() {
	use crate::data::{Cell, DataRow};
	use crate::schema::{ColumnFormat, ColumnType, SchemaColumn};
	use crate::{SchemaId, SlotId};

	let now_dt = now();
	let mut tree = RenderTree::new();
	tree.define_schema(
		SchemaId(1),
		vec![SchemaColumn {
			id: 0,
			name: "when".to_string(),
			column_type: ColumnType::Timestamp,
			unit: None,
			format: Some(ColumnFormat::RelativeTime),
		}],
		1,
	);
	tree.define_slot(SlotId(1), crate::slot::SlotValue::RowTemplate { schema: SchemaId(1) }, 1);
	let mut root = Node::new(NodeId(1), NodeType::Scroll);
	root.props.template = Some(1);
	tree.set_tree(Some(root), 1).unwrap();

	tree.append_data(SchemaId(1), DataRow(vec![Cell::Timestamp(now_dt.timestamp() - 30)]), 1);
	tree.append_data(SchemaId(1), DataRow(vec![Cell::Timestamp(now_dt.timestamp() - 300)]), 2);
	tree.append_data(SchemaId(1), DataRow(vec![Cell::Timestamp(now_dt.timestamp() - 7200)]), 3);
	tree.append_data(SchemaId(1), DataRow(vec![Cell::Timestamp(now_dt.timestamp() - 172_800)]), 4);

	let text = project(&tree, now_dt);
	assert!(text.contains("just now"));
	assert!(text.contains("5m ago"));
	assert!(text.contains("2h ago"));
	assert!(text.contains("2d ago"));
}

#[test]
fn row_template_with_unresolved_schema_is_tolerated() {
	use crate::{SchemaId, SlotId};
	let mut tree = RenderTree::new();
	// slot references a schema id that was never defined (I6: late-arriving schema tolerated)
	tree.define_slot(SlotId(1), crate::slot::SlotValue::RowTemplate { schema: SchemaId(404) }, 1);
	let mut root = Node::new(NodeId(1), NodeType::Scroll);
	root.props.template = Some(1);
	tree.set_tree(Some(root), 1).unwrap();
	assert_eq!(project(&tree, now()), "");
}
