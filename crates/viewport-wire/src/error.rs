//! Wire-crossing error codes (spec §7). Plain `Copy` enums, not opaque
//! `thiserror` types, because these values are shared between the frame
//! codec's internal recovery logic and a caller that just wants `?` — see
//! `xeno-broker-proto::types::ErrorCode` for the pattern this follows.

/// Surfaced by [`crate::frame::FrameReader`] for a header byte outside the
/// enumerated [`crate::header::MessageType`] set. The frame is still
/// consumed (spec §4.1: "the frame is still consumed so subsequent frames
/// parse"); this is informational, not a reason to stop scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown message type byte {0:#04x}")]
pub struct UnknownMessageType(pub u8);

/// CBOR decode failure, or a payload whose shape didn't match its opcode
/// (spec §7: "`Malformed` — CBOR decode failed or payload did not match
/// opcode shape").
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
	#[error("malformed payload: {0}")]
	Malformed(String),
	#[error("unknown opcode {0}")]
	UnknownOpcode(i64),
}
