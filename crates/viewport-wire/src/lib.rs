//! Frame and payload codec for the Viewport protocol (C1, C2). Carries
//! [`viewport_tree`]'s domain types over the wire; holds no session state of
//! its own — that belongs to `viewport-source`/`viewport-viewer`.

pub mod codec;
pub mod error;
pub mod frame;
pub mod header;
pub mod input;
pub mod keys;
pub mod message;
pub mod props_conv;
pub mod value_conv;

pub use codec::{decode_message, encode_message};
pub use error::{PayloadError, UnknownMessageType};
pub use frame::{FrameEvent, FrameReader, PayloadTooLarge, DEFAULT_MAX_PAYLOAD_LEN};
pub use header::{Header, InvalidMagic, MessageType, HEADER_LEN, MAGIC, VERSION};
pub use input::{EnvInfo, InputEvent, InputKind};
pub use message::{Opcode, ProtocolMessage};
