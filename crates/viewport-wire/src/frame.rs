//! The frame codec (C1, spec §4.1): header encode/decode plus the stateful
//! stream scanner that resyncs on garbage bytes.

use crate::header::{Header, HEADER_LEN, MessageType};

/// Built-in ceiling used by [`FrameReader::default`]. The codec itself
/// imposes no maximum (spec §4.1: "the codec itself does not impose a
/// maximum but callers SHOULD reject frames exceeding an implementation
/// limit"); this is that caller-supplied limit, generalized from
/// `xeno-broker-proto`'s hardcoded 16 MiB frame ceiling into a named
/// constant plus constructor argument.
pub const DEFAULT_MAX_PAYLOAD_LEN: usize = 64 * 1024 * 1024;

/// One fully-read frame, or a frame whose header type wasn't recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameEvent {
	/// A frame with a recognized message type.
	Frame {
		header: Header,
		message_type: MessageType,
		payload: Vec<u8>,
	},
	/// The header decoded (magic and length were fine) but
	/// `message_type_byte` fell outside the enumerated set (spec §7:
	/// "surface to caller, continue stream"). The frame is still consumed.
	UnknownMessageType { header: Header, payload: Vec<u8> },
}

impl FrameEvent {
	pub fn header(&self) -> &Header {
		match self {
			FrameEvent::Frame { header, .. } => header,
			FrameEvent::UnknownMessageType { header, .. } => header,
		}
	}
}

/// A frame's declared payload length exceeded the reader's configured
/// ceiling. Not part of the core error taxonomy in spec §7 (which leaves
/// this to caller policy) — this is that policy, made concrete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("frame payload length {len} exceeds configured maximum {max}")]
pub struct PayloadTooLarge {
	pub len: u32,
	pub max: usize,
}

/// Stateful byte-stream scanner (spec §4.1). Owns no payload memory beyond
/// an internal accumulation buffer; each `push` call drains as many
/// complete frames as the buffer currently holds.
#[derive(Debug)]
pub struct FrameReader {
	buf: Vec<u8>,
	max_payload_len: usize,
}

impl Default for FrameReader {
	fn default() -> Self {
		Self::new(DEFAULT_MAX_PAYLOAD_LEN)
	}
}

enum Step {
	Emit(FrameEvent),
	Resynced,
	Short,
}

impl FrameReader {
	pub fn new(max_payload_len: usize) -> Self {
		Self {
			buf: Vec::new(),
			max_payload_len,
		}
	}

	/// Appends `bytes` to the internal buffer and drains every complete
	/// frame now available, in order. On a magic mismatch the reader
	/// advances by exactly one byte and keeps scanning (spec §4.1); on a
	/// short buffer it stops and waits for more bytes on the next `push`.
	pub fn push(&mut self, bytes: &[u8]) -> Result<Vec<FrameEvent>, PayloadTooLarge> {
		self.buf.extend_from_slice(bytes);
		let mut events = Vec::new();
		loop {
			match self.try_take_one()? {
				Step::Emit(event) => events.push(event),
				Step::Resynced => continue,
				Step::Short => break,
			}
		}
		Ok(events)
	}

	fn try_take_one(&mut self) -> Result<Step, PayloadTooLarge> {
		if self.buf.len() < HEADER_LEN {
			return Ok(Step::Short);
		}
		let header_bytes: [u8; HEADER_LEN] = self.buf[0..HEADER_LEN].try_into().unwrap();
		let header = match Header::decode(&header_bytes) {
			Ok(header) => header,
			Err(_invalid_magic) => {
				self.buf.remove(0);
				tracing::debug!("frame resync: advanced one byte past invalid magic");
				return Ok(Step::Resynced);
			}
		};

		let payload_len = header.payload_len as usize;
		if payload_len > self.max_payload_len {
			return Err(PayloadTooLarge {
				len: header.payload_len,
				max: self.max_payload_len,
			});
		}
		if self.buf.len() < HEADER_LEN + payload_len {
			return Ok(Step::Short);
		}

		let payload = self.buf[HEADER_LEN..HEADER_LEN + payload_len].to_vec();
		self.buf.drain(0..HEADER_LEN + payload_len);

		Ok(Step::Emit(match header.message_type() {
			Some(message_type) => FrameEvent::Frame {
				header,
				message_type,
				payload,
			},
			None => {
				tracing::warn!(byte = header.message_type_byte, "unknown message type byte");
				FrameEvent::UnknownMessageType { header, payload }
			}
		}))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::header::MessageType;

	fn frame_bytes(message_type: MessageType, payload: &[u8]) -> Vec<u8> {
		let header = Header::new(message_type, payload.len() as u32, 0, 0);
		let mut out = header.encode().to_vec();
		out.extend_from_slice(payload);
		out
	}

	/// Spec §8 scenario 5: garbage prefix followed by one well-formed frame.
	#[test]
	fn resyncs_past_garbage_prefix() {
		let mut reader = FrameReader::default();
		let mut stream = vec![0xFF, 0xFF];
		stream.extend(frame_bytes(MessageType::Patch, b"\x01\x02\x03"));

		let events = reader.push(&stream).unwrap();
		assert_eq!(events.len(), 1);
		match &events[0] {
			FrameEvent::Frame { message_type, payload, .. } => {
				assert_eq!(*message_type, MessageType::Patch);
				assert_eq!(payload, b"\x01\x02\x03");
			}
			other => panic!("expected a Patch frame, got {other:?}"),
		}
	}

	#[test]
	fn defers_on_short_buffer_and_resumes_on_next_push() {
		let mut reader = FrameReader::default();
		let full = frame_bytes(MessageType::Tree, b"hello");
		let (first, second) = full.split_at(10);

		assert!(reader.push(first).unwrap().is_empty());
		let events = reader.push(second).unwrap();
		assert_eq!(events.len(), 1);
	}

	#[test]
	fn unknown_message_type_is_surfaced_but_consumed() {
		let mut reader = FrameReader::default();
		let header = Header::new(MessageType::Patch, 2, 0, 0);
		let mut bytes = header.encode().to_vec();
		bytes[3] = 0xEE; // out-of-range type byte, payload length (2) still matches "ok"
		bytes.extend_from_slice(b"ok");
		bytes.extend(frame_bytes(MessageType::Env, b"x"));

		let events = reader.push(&bytes).unwrap();
		assert_eq!(events.len(), 2);
		assert!(matches!(events[0], FrameEvent::UnknownMessageType { .. }));
		assert!(matches!(events[1], FrameEvent::Frame { message_type: MessageType::Env, .. }));
	}

	#[test]
	fn rejects_payload_beyond_configured_maximum() {
		let mut reader = FrameReader::new(4);
		let bytes = frame_bytes(MessageType::Data, b"too-long-payload");
		let err = reader.push(&bytes).unwrap_err();
		assert_eq!(err.max, 4);
	}

	/// P4: well-formed frames concatenated with arbitrary leading garbage
	/// emit exactly the frame sequence, in order.
	#[test]
	fn multiple_frames_with_interleaved_garbage() {
		let mut reader = FrameReader::default();
		let mut stream = Vec::new();
		stream.push(0xAB);
		stream.extend(frame_bytes(MessageType::Define, b"a"));
		stream.extend_from_slice(&[0xCD, 0xEF]);
		stream.extend(frame_bytes(MessageType::Schema, b"bb"));

		let events = reader.push(&stream).unwrap();
		assert_eq!(events.len(), 2);
		assert!(matches!(events[0], FrameEvent::Frame { message_type: MessageType::Define, .. }));
		assert!(matches!(events[1], FrameEvent::Frame { message_type: MessageType::Schema, .. }));
	}

	// P4 (frame alignment, spec §8): concatenating well-formed frames with
	// arbitrary leading garbage yields exactly that frame sequence, in order.
	proptest::proptest! {
		#[test]
		fn resyncs_past_arbitrary_garbage(
			garbage in proptest::collection::vec(proptest::num::u8::ANY, 0..8),
			payload_a in proptest::collection::vec(proptest::num::u8::ANY, 0..16),
			payload_b in proptest::collection::vec(proptest::num::u8::ANY, 0..16),
		) {
			let mut reader = FrameReader::default();
			let mut stream = garbage;
			stream.extend(frame_bytes(MessageType::Patch, &payload_a));
			stream.extend(frame_bytes(MessageType::Data, &payload_b));

			let events = reader.push(&stream).unwrap();
			proptest::prop_assert_eq!(events.len(), 2);
			match &events[0] {
				FrameEvent::Frame { message_type, payload, .. } => {
					proptest::prop_assert_eq!(*message_type, MessageType::Patch);
					proptest::prop_assert_eq!(payload, &payload_a);
				}
				other => panic!("expected a Patch frame, got {other:?}"),
			}
			match &events[1] {
				FrameEvent::Frame { message_type, payload, .. } => {
					proptest::prop_assert_eq!(*message_type, MessageType::Data);
					proptest::prop_assert_eq!(payload, &payload_b);
				}
				other => panic!("expected a Data frame, got {other:?}"),
			}
		}
	}
}
