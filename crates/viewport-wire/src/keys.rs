//! The complete integer-key enumerations for the wire contract (spec §4.2,
//! §15). `spec.md` gives a representative subset ("…"); this module fixes
//! the full set used by this crate's protocol-version-1 encoder/decoder,
//! derived from the node property vocabulary in spec §6.
//!
//! Keys absent from these enums are dropped on encode (spec §4.2: "Keys
//! absent from the enum are dropped on encode") except within
//! [`viewport_tree::SlotValue::Other`], which keeps string keys.

/// Property keys for a node's props bag (spec §4.2, §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i64)]
pub enum NodeKey {
	Id = 0,
	Type = 1,
	Children = 2,
	Content = 3,
	Direction = 4,
	Wrap = 5,
	Justify = 6,
	Align = 7,
	Gap = 8,
	Padding = 9,
	Margin = 10,
	Border = 11,
	BorderRadius = 12,
	Background = 13,
	Opacity = 14,
	Shadow = 15,
	Width = 16,
	Height = 17,
	Flex = 18,
	MinWidth = 19,
	MinHeight = 20,
	MaxWidth = 21,
	MaxHeight = 22,
	FontFamily = 23,
	Size = 24,
	Weight = 25,
	Color = 26,
	Decoration = 27,
	TextAlign = 28,
	Italic = 29,
	VirtualHeight = 30,
	VirtualWidth = 31,
	ScrollTop = 32,
	ScrollLeft = 33,
	Template = 34,
	Schema = 35,
	Value = 36,
	Placeholder = 37,
	Multiline = 38,
	Disabled = 39,
	Data = 40,
	Format = 41,
	AltText = 42,
	Mode = 43,
	Interactive = 44,
	TabIndex = 45,
	Style = 46,
	Transition = 47,
	TextAlt = 48,
}

impl NodeKey {
	pub fn from_i64(v: i64) -> Option<Self> {
		use NodeKey::*;
		Some(match v {
			0 => Id,
			1 => Type,
			2 => Children,
			3 => Content,
			4 => Direction,
			5 => Wrap,
			6 => Justify,
			7 => Align,
			8 => Gap,
			9 => Padding,
			10 => Margin,
			11 => Border,
			12 => BorderRadius,
			13 => Background,
			14 => Opacity,
			15 => Shadow,
			16 => Width,
			17 => Height,
			18 => Flex,
			19 => MinWidth,
			20 => MinHeight,
			21 => MaxWidth,
			22 => MaxHeight,
			23 => FontFamily,
			24 => Size,
			25 => Weight,
			26 => Color,
			27 => Decoration,
			28 => TextAlign,
			29 => Italic,
			30 => VirtualHeight,
			31 => VirtualWidth,
			32 => ScrollTop,
			33 => ScrollLeft,
			34 => Template,
			35 => Schema,
			36 => Value,
			37 => Placeholder,
			38 => Multiline,
			39 => Disabled,
			40 => Data,
			41 => Format,
			42 => AltText,
			43 => Mode,
			44 => Interactive,
			45 => TabIndex,
			46 => Style,
			47 => Transition,
			48 => TextAlt,
			_ => return None,
		})
	}
}

/// `PatchKey` — keys within one `PatchOp` map (spec §4.2, given in full).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i64)]
pub enum PatchKey {
	Target = 0,
	Set = 1,
	Remove = 2,
	Replace = 3,
	ChildrenInsert = 4,
	ChildrenRemove = 5,
	ChildrenMove = 6,
	Index = 7,
	Node = 8,
	From = 9,
	To = 10,
	Transition = 11,
}

impl PatchKey {
	pub fn from_i64(v: i64) -> Option<Self> {
		use PatchKey::*;
		Some(match v {
			0 => Target,
			1 => Set,
			2 => Remove,
			3 => Replace,
			4 => ChildrenInsert,
			5 => ChildrenRemove,
			6 => ChildrenMove,
			7 => Index,
			8 => Node,
			9 => From,
			10 => To,
			11 => Transition,
			_ => return None,
		})
	}
}

/// `InputKey` — keys within an input event map (spec §4.2, given in full).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i64)]
pub enum InputKey {
	Target = 0,
	Kind = 1,
	Key = 2,
	Value = 3,
	X = 4,
	Y = 5,
	Button = 6,
	Action = 7,
	ScrollTop = 8,
	ScrollLeft = 9,
}

impl InputKey {
	pub fn from_i64(v: i64) -> Option<Self> {
		use InputKey::*;
		Some(match v {
			0 => Target,
			1 => Kind,
			2 => Key,
			3 => Value,
			4 => X,
			5 => Y,
			6 => Button,
			7 => Action,
			8 => ScrollTop,
			9 => ScrollLeft,
			_ => return None,
		})
	}
}

/// `SchemaKey` — keys within one schema column map (spec §4.2, given in full).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i64)]
pub enum SchemaKey {
	Id = 0,
	Name = 1,
	Type = 2,
	Unit = 3,
	Format = 4,
}

impl SchemaKey {
	pub fn from_i64(v: i64) -> Option<Self> {
		use SchemaKey::*;
		Some(match v {
			0 => Id,
			1 => Name,
			2 => Type,
			3 => Unit,
			4 => Format,
			_ => return None,
		})
	}
}

/// `SlotKey` — `kind` is the only integer-keyed field (spec §4.2: "`kind`
/// takes integer key 0; other slot fields may keep string keys because the
/// slot value is open-ended").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i64)]
pub enum SlotKey {
	Kind = 0,
}

/// `EnvKey` — keys within an `ENV` message map (spec §6, "Env info"; not
/// itemized by name in spec §4.2's representative list, fixed here as part
/// of this crate's protocol-version-1 contract per §15).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i64)]
pub enum EnvKey {
	ViewportVersion = 0,
	DisplayWidth = 1,
	DisplayHeight = 2,
	PixelDensity = 3,
	Gpu = 4,
	GpuApi = 5,
	ColorDepth = 6,
	VideoDecode = 7,
	Remote = 8,
	LatencyMs = 9,
}

impl EnvKey {
	pub fn from_i64(v: i64) -> Option<Self> {
		use EnvKey::*;
		Some(match v {
			0 => ViewportVersion,
			1 => DisplayWidth,
			2 => DisplayHeight,
			3 => PixelDensity,
			4 => Gpu,
			5 => GpuApi,
			6 => ColorDepth,
			7 => VideoDecode,
			8 => Remote,
			9 => LatencyMs,
			_ => return None,
		})
	}
}
