//! CBOR conversion for [`viewport_tree::Node`] and [`viewport_tree::Props`]
//! (spec §4.2, §6). A node's own fields (`id`, `type`, `children`) and its
//! props bag share one flat `NodeKey`-keyed CBOR map — `NodeKey::Id/Type/
//! Children` never collide with a prop key since the prop keys start at
//! `Content = 3`.

use ciborium::Value as Cbor;

use viewport_tree::props::{
	Align, Border, CanvasMode, Decoration, Direction, FontFamily, FontWeight, ImageFormat, Interactive, Justify, Shadow,
	Spacing, SizeValue, TextAlign,
};
use viewport_tree::{Node, NodeId, NodeType, Props};

use crate::error::PayloadError;
use crate::keys::NodeKey;

fn find<'a>(entries: &'a [(Cbor, Cbor)], key: NodeKey) -> Option<&'a Cbor> {
	let target = key as i64;
	entries.iter().find_map(|(k, v)| match k {
		Cbor::Integer(i) if i64::try_from(*i) == Ok(target) => Some(v),
		_ => None,
	})
}

fn as_f64(v: &Cbor) -> Option<f64> {
	match v {
		Cbor::Float(f) => Some(*f),
		Cbor::Integer(i) => i64::try_from(*i).ok().map(|x| x as f64),
		_ => None,
	}
}

fn as_str(v: &Cbor) -> Option<&str> {
	match v {
		Cbor::Text(s) => Some(s.as_str()),
		_ => None,
	}
}

fn as_bool(v: &Cbor) -> Option<bool> {
	match v {
		Cbor::Bool(b) => Some(*b),
		_ => None,
	}
}

fn as_i64(v: &Cbor) -> Option<i64> {
	match v {
		Cbor::Integer(i) => i64::try_from(*i).ok(),
		_ => None,
	}
}

fn as_u32(v: &Cbor) -> Option<u32> {
	as_i64(v).and_then(|i| u32::try_from(i).ok())
}

fn as_bytes(v: &Cbor) -> Option<Vec<u8>> {
	match v {
		Cbor::Bytes(b) => Some(b.clone()),
		_ => None,
	}
}

fn size_value_to_cbor(v: SizeValue) -> Cbor {
	match v {
		SizeValue::Px(px) => Cbor::Float(px),
		SizeValue::Percent(pct) => Cbor::Text(format!("{pct}%")),
	}
}

fn cbor_to_size_value(v: &Cbor) -> Option<SizeValue> {
	match v {
		Cbor::Text(s) => s.strip_suffix('%').and_then(|n| n.parse().ok()).map(SizeValue::Percent),
		_ => as_f64(v).map(SizeValue::Px),
	}
}

fn spacing_to_cbor(v: Spacing) -> Cbor {
	match v {
		Spacing::Uniform(n) => Cbor::Float(n),
		Spacing::Two(v, h) => Cbor::Array(vec![Cbor::Float(v), Cbor::Float(h)]),
		Spacing::Four(t, r, b, l) => Cbor::Array(vec![Cbor::Float(t), Cbor::Float(r), Cbor::Float(b), Cbor::Float(l)]),
	}
}

fn cbor_to_spacing(v: &Cbor) -> Option<Spacing> {
	match v {
		Cbor::Array(items) => match items.as_slice() {
			[a, b] => Some(Spacing::Two(as_f64(a)?, as_f64(b)?)),
			[a, b, c, d] => Some(Spacing::Four(as_f64(a)?, as_f64(b)?, as_f64(c)?, as_f64(d)?)),
			_ => None,
		},
		_ => as_f64(v).map(Spacing::Uniform),
	}
}

fn string_map(pairs: &[(&str, Cbor)]) -> Cbor {
	Cbor::Map(pairs.iter().map(|(k, v)| (Cbor::Text((*k).to_string()), v.clone())).collect())
}

fn string_field<'a>(map: &'a [(Cbor, Cbor)], key: &str) -> Option<&'a Cbor> {
	map.iter().find_map(|(k, v)| match k {
		Cbor::Text(s) if s == key => Some(v),
		_ => None,
	})
}

fn as_map(v: &Cbor) -> Option<&[(Cbor, Cbor)]> {
	match v {
		Cbor::Map(entries) => Some(entries.as_slice()),
		_ => None,
	}
}

fn border_to_cbor(b: &Border) -> Cbor {
	string_map(&[
		("width", Cbor::Float(b.width)),
		("color", Cbor::Text(b.color.clone())),
		("style", Cbor::Text(b.style.clone())),
	])
}

fn cbor_to_border(v: &Cbor) -> Option<Border> {
	let map = as_map(v)?;
	Some(Border {
		width: as_f64(string_field(map, "width")?)?,
		color: as_str(string_field(map, "color")?)?.to_string(),
		style: as_str(string_field(map, "style")?)?.to_string(),
	})
}

fn shadow_to_cbor(s: &Shadow) -> Cbor {
	string_map(&[
		("x", Cbor::Float(s.x)),
		("y", Cbor::Float(s.y)),
		("blur", Cbor::Float(s.blur)),
		("color", Cbor::Text(s.color.clone())),
	])
}

fn cbor_to_shadow(v: &Cbor) -> Option<Shadow> {
	let map = as_map(v)?;
	Some(Shadow {
		x: as_f64(string_field(map, "x")?)?,
		y: as_f64(string_field(map, "y")?)?,
		blur: as_f64(string_field(map, "blur")?)?,
		color: as_str(string_field(map, "color")?)?.to_string(),
	})
}

macro_rules! enum_str {
	($ty:ty, $to:ident, $from:ident, [$($variant:ident => $s:literal),+ $(,)?]) => {
		fn $to(v: $ty) -> &'static str {
			match v { $(<$ty>::$variant => $s),+ }
		}
		fn $from(s: &str) -> Option<$ty> {
			match s { $($s => Some(<$ty>::$variant)),+, _ => None }
		}
	};
}

enum_str!(Direction, direction_str, direction_from_str, [Column => "column", Row => "row"]);
enum_str!(Justify, justify_str, justify_from_str, [
	Start => "start", End => "end", Center => "center", Between => "between", Around => "around", Evenly => "evenly",
]);
enum_str!(Align, align_str, align_from_str, [
	Start => "start", End => "end", Center => "center", Stretch => "stretch", Baseline => "baseline",
]);
enum_str!(FontFamily, font_family_str, font_family_from_str, [Proportional => "proportional", Monospace => "monospace"]);
enum_str!(FontWeight, weight_str, weight_from_str, [Normal => "normal", Bold => "bold", Light => "light"]);
enum_str!(Decoration, decoration_str, decoration_from_str, [
	None => "none", Underline => "underline", Strikethrough => "strikethrough",
]);
enum_str!(TextAlign, text_align_str, text_align_from_str, [Left => "left", Center => "center", Right => "right"]);
enum_str!(ImageFormat, image_format_str, image_format_from_str, [Png => "png", Jpeg => "jpeg", Svg => "svg"]);
enum_str!(CanvasMode, canvas_mode_str, canvas_mode_from_str, [
	Vector2d => "vector2d", Webgpu => "webgpu", RemoteStream => "remote_stream",
]);
enum_str!(Interactive, interactive_str, interactive_from_str, [Clickable => "clickable", Focusable => "focusable"]);

/// Builds the CBOR entries for `props`' present fields, `NodeKey`-keyed.
/// Absent (`None`) fields emit nothing, matching §4.4 rule 3's "unspecified
/// keys retain their prior value" (there is simply no entry to apply).
pub fn props_to_entries(props: &Props) -> Vec<(Cbor, Cbor)> {
	let mut out = Vec::new();
	macro_rules! put {
		($key:expr, $val:expr, $conv:expr) => {
			if let Some(v) = $val {
				out.push((Cbor::Integer((($key) as i64).into()), $conv(v.clone())));
			}
		};
	}
	put!(NodeKey::Direction, &props.direction, |d| Cbor::Text(direction_str(d).to_string()));
	put!(NodeKey::Wrap, &props.wrap, Cbor::Bool);
	put!(NodeKey::Justify, &props.justify, |j| Cbor::Text(justify_str(j).to_string()));
	put!(NodeKey::Align, &props.align, |a| Cbor::Text(align_str(a).to_string()));
	put!(NodeKey::Gap, &props.gap, Cbor::Float);
	put!(NodeKey::Padding, &props.padding, spacing_to_cbor);
	put!(NodeKey::Margin, &props.margin, spacing_to_cbor);
	put!(NodeKey::Border, &props.border, |b: Border| border_to_cbor(&b));
	put!(NodeKey::BorderRadius, &props.border_radius, Cbor::Float);
	put!(NodeKey::Background, &props.background, Cbor::Text);
	put!(NodeKey::Opacity, &props.opacity, Cbor::Float);
	put!(NodeKey::Shadow, &props.shadow, |s: Shadow| shadow_to_cbor(&s));
	put!(NodeKey::Width, &props.width, size_value_to_cbor);
	put!(NodeKey::Height, &props.height, size_value_to_cbor);
	put!(NodeKey::Flex, &props.flex, Cbor::Float);
	put!(NodeKey::MinWidth, &props.min_width, size_value_to_cbor);
	put!(NodeKey::MinHeight, &props.min_height, size_value_to_cbor);
	put!(NodeKey::MaxWidth, &props.max_width, size_value_to_cbor);
	put!(NodeKey::MaxHeight, &props.max_height, size_value_to_cbor);
	put!(NodeKey::Content, &props.content, Cbor::Text);
	put!(NodeKey::FontFamily, &props.font_family, |f| Cbor::Text(font_family_str(f).to_string()));
	put!(NodeKey::Size, &props.size, Cbor::Float);
	put!(NodeKey::Weight, &props.weight, |w| Cbor::Text(weight_str(w).to_string()));
	put!(NodeKey::Color, &props.color, Cbor::Text);
	put!(NodeKey::Decoration, &props.decoration, |d| Cbor::Text(decoration_str(d).to_string()));
	put!(NodeKey::TextAlign, &props.text_align, |t| Cbor::Text(text_align_str(t).to_string()));
	put!(NodeKey::Italic, &props.italic, Cbor::Bool);
	put!(NodeKey::VirtualHeight, &props.virtual_height, Cbor::Float);
	put!(NodeKey::VirtualWidth, &props.virtual_width, Cbor::Float);
	put!(NodeKey::ScrollTop, &props.scroll_top, Cbor::Float);
	put!(NodeKey::ScrollLeft, &props.scroll_left, Cbor::Float);
	put!(NodeKey::Template, &props.template, |t: u32| Cbor::Integer((t as i64).into()));
	put!(NodeKey::Schema, &props.schema, |s: u32| Cbor::Integer((s as i64).into()));
	put!(NodeKey::Value, &props.value, Cbor::Text);
	put!(NodeKey::Placeholder, &props.placeholder, Cbor::Text);
	put!(NodeKey::Multiline, &props.multiline, Cbor::Bool);
	put!(NodeKey::Disabled, &props.disabled, Cbor::Bool);
	put!(NodeKey::Data, &props.data, Cbor::Bytes);
	put!(NodeKey::Format, &props.format, |f| Cbor::Text(image_format_str(f).to_string()));
	put!(NodeKey::AltText, &props.alt_text, Cbor::Text);
	put!(NodeKey::Mode, &props.mode, |m| Cbor::Text(canvas_mode_str(m).to_string()));
	put!(NodeKey::Interactive, &props.interactive, |i| Cbor::Text(interactive_str(i).to_string()));
	put!(NodeKey::TabIndex, &props.tab_index, |t: i64| Cbor::Integer(t.into()));
	put!(NodeKey::Style, &props.style, |s: u32| Cbor::Integer((s as i64).into()));
	put!(NodeKey::Transition, &props.transition, |t: u32| Cbor::Integer((t as i64).into()));
	out
}

/// Parses `Props` out of a `NodeKey`-keyed map, ignoring keys that don't
/// resolve to a known `NodeKey` or whose value has the wrong shape (spec
/// §4.2: "unknown keys in a node or patch op are ignored").
pub fn entries_to_props(entries: &[(Cbor, Cbor)]) -> Props {
	let mut props = Props::default();
	macro_rules! take {
		($key:expr, $field:expr, $conv:expr) => {
			if let Some(v) = find(entries, $key) {
				if let Some(parsed) = $conv(v) {
					$field = Some(parsed);
				}
			}
		};
	}
	take!(NodeKey::Direction, props.direction, |v: &Cbor| as_str(v).and_then(direction_from_str));
	take!(NodeKey::Wrap, props.wrap, as_bool);
	take!(NodeKey::Justify, props.justify, |v: &Cbor| as_str(v).and_then(justify_from_str));
	take!(NodeKey::Align, props.align, |v: &Cbor| as_str(v).and_then(align_from_str));
	take!(NodeKey::Gap, props.gap, as_f64);
	take!(NodeKey::Padding, props.padding, cbor_to_spacing);
	take!(NodeKey::Margin, props.margin, cbor_to_spacing);
	take!(NodeKey::Border, props.border, cbor_to_border);
	take!(NodeKey::BorderRadius, props.border_radius, as_f64);
	take!(NodeKey::Background, props.background, |v: &Cbor| as_str(v).map(str::to_string));
	take!(NodeKey::Opacity, props.opacity, as_f64);
	take!(NodeKey::Shadow, props.shadow, cbor_to_shadow);
	take!(NodeKey::Width, props.width, cbor_to_size_value);
	take!(NodeKey::Height, props.height, cbor_to_size_value);
	take!(NodeKey::Flex, props.flex, as_f64);
	take!(NodeKey::MinWidth, props.min_width, cbor_to_size_value);
	take!(NodeKey::MinHeight, props.min_height, cbor_to_size_value);
	take!(NodeKey::MaxWidth, props.max_width, cbor_to_size_value);
	take!(NodeKey::MaxHeight, props.max_height, cbor_to_size_value);
	take!(NodeKey::Content, props.content, |v: &Cbor| as_str(v).map(str::to_string));
	take!(NodeKey::FontFamily, props.font_family, |v: &Cbor| as_str(v).and_then(font_family_from_str));
	take!(NodeKey::Size, props.size, as_f64);
	take!(NodeKey::Weight, props.weight, |v: &Cbor| as_str(v).and_then(weight_from_str));
	take!(NodeKey::Color, props.color, |v: &Cbor| as_str(v).map(str::to_string));
	take!(NodeKey::Decoration, props.decoration, |v: &Cbor| as_str(v).and_then(decoration_from_str));
	take!(NodeKey::TextAlign, props.text_align, |v: &Cbor| as_str(v).and_then(text_align_from_str));
	take!(NodeKey::Italic, props.italic, as_bool);
	take!(NodeKey::VirtualHeight, props.virtual_height, as_f64);
	take!(NodeKey::VirtualWidth, props.virtual_width, as_f64);
	take!(NodeKey::ScrollTop, props.scroll_top, as_f64);
	take!(NodeKey::ScrollLeft, props.scroll_left, as_f64);
	take!(NodeKey::Template, props.template, as_u32);
	take!(NodeKey::Schema, props.schema, as_u32);
	take!(NodeKey::Value, props.value, |v: &Cbor| as_str(v).map(str::to_string));
	take!(NodeKey::Placeholder, props.placeholder, |v: &Cbor| as_str(v).map(str::to_string));
	take!(NodeKey::Multiline, props.multiline, as_bool);
	take!(NodeKey::Disabled, props.disabled, as_bool);
	take!(NodeKey::Data, props.data, as_bytes);
	take!(NodeKey::Format, props.format, |v: &Cbor| as_str(v).and_then(image_format_from_str));
	take!(NodeKey::AltText, props.alt_text, |v: &Cbor| as_str(v).map(str::to_string));
	take!(NodeKey::Mode, props.mode, |v: &Cbor| as_str(v).and_then(canvas_mode_from_str));
	take!(NodeKey::Interactive, props.interactive, |v: &Cbor| as_str(v).and_then(interactive_from_str));
	take!(NodeKey::TabIndex, props.tab_index, as_i64);
	take!(NodeKey::Style, props.style, as_u32);
	take!(NodeKey::Transition, props.transition, as_u32);
	props
}

fn node_type_str(t: NodeType) -> &'static str {
	match t {
		NodeType::Box => "box",
		NodeType::Text => "text",
		NodeType::Scroll => "scroll",
		NodeType::Input => "input",
		NodeType::Image => "image",
		NodeType::Canvas => "canvas",
		NodeType::Separator => "separator",
	}
}

fn node_type_from_str(s: &str) -> Option<NodeType> {
	Some(match s {
		"box" => NodeType::Box,
		"text" => NodeType::Text,
		"scroll" => NodeType::Scroll,
		"input" => NodeType::Input,
		"image" => NodeType::Image,
		"canvas" => NodeType::Canvas,
		"separator" => NodeType::Separator,
		_ => return None,
	})
}

/// Encodes a whole (owned) [`Node`] subtree into one CBOR map, recursing
/// into `children` (spec §4.2: `NodeKey::Children`).
pub fn node_to_cbor(node: &Node) -> Cbor {
	let mut entries = vec![
		(Cbor::Integer((NodeKey::Id as i64).into()), Cbor::Integer((node.id.0 as i64).into())),
		(Cbor::Integer((NodeKey::Type as i64).into()), Cbor::Text(node_type_str(node.node_type).to_string())),
	];
	if !node.children.is_empty() {
		entries.push((
			Cbor::Integer((NodeKey::Children as i64).into()),
			Cbor::Array(node.children.iter().map(node_to_cbor).collect()),
		));
	}
	if let Some(text_alt) = &node.text_alt {
		entries.push((Cbor::Integer((NodeKey::TextAlt as i64).into()), Cbor::Text(text_alt.clone())));
	}
	entries.extend(props_to_entries(&node.props));
	Cbor::Map(entries)
}

/// Decodes a [`Node`] subtree from its CBOR map. `id` and `type` are
/// required; a missing or unrecognized `type` is `Malformed` (spec §7).
pub fn cbor_to_node(value: &Cbor) -> Result<Node, PayloadError> {
	let entries = as_map(value).ok_or_else(|| PayloadError::Malformed("node is not a map".into()))?;
	let id = find(entries, NodeKey::Id)
		.and_then(as_u32)
		.ok_or_else(|| PayloadError::Malformed("node missing id".into()))?;
	let node_type = find(entries, NodeKey::Type)
		.and_then(as_str)
		.and_then(node_type_from_str)
		.ok_or_else(|| PayloadError::Malformed("node missing or unrecognized type".into()))?;
	let children = match find(entries, NodeKey::Children) {
		Some(Cbor::Array(items)) => items.iter().map(cbor_to_node).collect::<Result<Vec<_>, _>>()?,
		_ => Vec::new(),
	};
	let text_alt = find(entries, NodeKey::TextAlt).and_then(as_str).map(str::to_string);
	Ok(Node {
		id: NodeId(id),
		node_type,
		props: entries_to_props(entries),
		children,
		text_alt,
	})
}
