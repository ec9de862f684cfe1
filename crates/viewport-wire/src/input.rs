//! `InputEvent` and `EnvInfo` (spec §6), concrete types for the viewer→source
//! direction (§15: "modeled as concrete structs consumed by
//! `ViewerState::apply_message` for `INPUT`/`ENV`").

use viewport_tree::NodeId;

/// The closed set of input event kinds (spec §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
	Click,
	Hover,
	Focus,
	Blur,
	Key,
	ValueChange,
	CanvasPointer,
	CanvasKey,
	Scroll,
}

impl InputKind {
	pub fn as_str(self) -> &'static str {
		match self {
			InputKind::Click => "click",
			InputKind::Hover => "hover",
			InputKind::Focus => "focus",
			InputKind::Blur => "blur",
			InputKind::Key => "key",
			InputKind::ValueChange => "value_change",
			InputKind::CanvasPointer => "canvas_pointer",
			InputKind::CanvasKey => "canvas_key",
			InputKind::Scroll => "scroll",
		}
	}

	pub fn from_str(s: &str) -> Option<Self> {
		Some(match s {
			"click" => InputKind::Click,
			"hover" => InputKind::Hover,
			"focus" => InputKind::Focus,
			"blur" => InputKind::Blur,
			"key" => InputKind::Key,
			"value_change" => InputKind::ValueChange,
			"canvas_pointer" => InputKind::CanvasPointer,
			"canvas_key" => InputKind::CanvasKey,
			"scroll" => InputKind::Scroll,
			_ => return None,
		})
	}
}

/// A viewer→source input event (spec §6).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputEvent {
	pub target: Option<NodeId>,
	pub kind: Option<InputKind>,
	pub key: Option<String>,
	pub value: Option<String>,
	pub x: Option<f64>,
	pub y: Option<f64>,
	pub button: Option<i64>,
	pub action: Option<String>,
	pub scroll_top: Option<f64>,
	pub scroll_left: Option<f64>,
}

/// Viewer environment metadata (spec §6, "Env info").
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvInfo {
	pub viewport_version: Option<u32>,
	pub display_width: Option<f64>,
	pub display_height: Option<f64>,
	pub pixel_density: Option<f64>,
	pub gpu: Option<String>,
	pub gpu_api: Option<String>,
	pub color_depth: Option<u32>,
	pub video_decode: Option<bool>,
	pub remote: Option<bool>,
	pub latency_ms: Option<f64>,
}
