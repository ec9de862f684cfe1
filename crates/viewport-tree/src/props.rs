//! The node property vocabulary (spec §6), modeled as a fixed record with one
//! optional field per key rather than an open string-keyed map (design note
//! in §9: "Dynamic props bag").
//!
//! Unlike [`crate::slot::SlotValue`], the props bag is *not* open-ended on
//! the wire: keys absent from the §4.2 integer-key enum are dropped on
//! encode and ignored on decode, so there is no passthrough bag here.

/// Flex-axis direction for a `box` node's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
	/// Children stack top-to-bottom. The default when unset.
	#[default]
	Column,
	/// Children lay out left-to-right.
	Row,
}

/// Main-axis distribution of children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Justify {
	Start,
	End,
	Center,
	Between,
	Around,
	Evenly,
}

/// Cross-axis alignment of children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
	Start,
	End,
	Center,
	Stretch,
	Baseline,
}

/// A size value: either an absolute number or a percentage of the parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizeValue {
	Px(f64),
	Percent(f64),
}

/// Uniform, horizontal/vertical, or per-side spacing (padding/margin).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Spacing {
	Uniform(f64),
	/// `(vertical, horizontal)`.
	Two(f64, f64),
	/// `(top, right, bottom, left)`.
	Four(f64, f64, f64, f64),
}

/// Border visual properties.
#[derive(Debug, Clone, PartialEq)]
pub struct Border {
	pub width: f64,
	pub color: String,
	pub style: String,
}

/// Drop-shadow visual properties.
#[derive(Debug, Clone, PartialEq)]
pub struct Shadow {
	pub x: f64,
	pub y: f64,
	pub blur: f64,
	pub color: String,
}

/// Text face: proportional (default) or fixed-width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFamily {
	Proportional,
	Monospace,
}

/// Font weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
	Normal,
	Bold,
	Light,
}

/// Text decoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoration {
	None,
	Underline,
	Strikethrough,
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
	Left,
	Center,
	Right,
}

/// `image`/`canvas` source encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
	Png,
	Jpeg,
	Svg,
}

/// `canvas` rendering backend hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasMode {
	Vector2d,
	Webgpu,
	RemoteStream,
}

/// Interaction affordance for `interactive` nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interactive {
	Clickable,
	Focusable,
}

/// The full props bag for one node (spec §6). Every field is optional; a
/// `set` patch only overrides fields present in the incoming map (§4.4
/// rule 3: "unspecified keys retain their prior value").
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props {
	// Layout
	pub direction: Option<Direction>,
	pub wrap: Option<bool>,
	pub justify: Option<Justify>,
	pub align: Option<Align>,
	pub gap: Option<f64>,
	// Spacing
	pub padding: Option<Spacing>,
	pub margin: Option<Spacing>,
	// Visual
	pub border: Option<Border>,
	pub border_radius: Option<f64>,
	pub background: Option<String>,
	pub opacity: Option<f64>,
	pub shadow: Option<Shadow>,
	// Sizing
	pub width: Option<SizeValue>,
	pub height: Option<SizeValue>,
	pub flex: Option<f64>,
	pub min_width: Option<SizeValue>,
	pub min_height: Option<SizeValue>,
	pub max_width: Option<SizeValue>,
	pub max_height: Option<SizeValue>,
	// Text
	pub content: Option<String>,
	pub font_family: Option<FontFamily>,
	pub size: Option<f64>,
	pub weight: Option<FontWeight>,
	pub color: Option<String>,
	pub decoration: Option<Decoration>,
	pub text_align: Option<TextAlign>,
	pub italic: Option<bool>,
	// Scroll
	pub virtual_height: Option<f64>,
	pub virtual_width: Option<f64>,
	pub scroll_top: Option<f64>,
	pub scroll_left: Option<f64>,
	pub template: Option<u32>,
	pub schema: Option<u32>,
	// Input
	pub value: Option<String>,
	pub placeholder: Option<String>,
	pub multiline: Option<bool>,
	pub disabled: Option<bool>,
	// Image/canvas
	pub data: Option<Vec<u8>>,
	pub format: Option<ImageFormat>,
	pub alt_text: Option<String>,
	pub mode: Option<CanvasMode>,
	// Interactive
	pub interactive: Option<Interactive>,
	pub tab_index: Option<i64>,
	// References
	pub style: Option<u32>,
	pub transition: Option<u32>,
}

impl Props {
	/// Merges `incoming` into `self`, last-write-wins per key. Fields absent
	/// (`None`) in `incoming` do not clear the corresponding field in `self`
	/// (§4.4 rule 3). There is no way to explicitly clear a prop (§9 open
	/// question); this repo keeps the reference behavior as-is.
	pub fn merge_from(&mut self, incoming: &Props) {
		macro_rules! merge {
			($($field:ident),+ $(,)?) => {
				$(
					if incoming.$field.is_some() {
						self.$field = incoming.$field.clone();
					}
				)+
			};
		}
		merge!(
			direction, wrap, justify, align, gap, padding, margin, border, border_radius,
			background, opacity, shadow, width, height, flex, min_width, min_height, max_width,
			max_height, content, font_family, size, weight, color, decoration, text_align, italic,
			virtual_height, virtual_width, scroll_top, scroll_left, template, schema, value,
			placeholder, multiline, disabled, data, format, alt_text, mode, interactive, tab_index,
			style, transition,
		);
	}
}
