//! Message codec: inbound display payloads and outbound event payloads.
//!
//! Inbound wire format (one JSON object per payload, every field optional):
//!
//! ```text
//! { "size": 1..4, "pos": [x, y], "text": "..." }
//! ```
//!
//! `size` and `pos` update the text style used for the next message; a
//! payload only produces a [`Message`] when it carries `text`. The codec
//! is independent of the transport the payload arrived on.
//!
//! Outbound events are internally tagged: `{"type":"miss_you_button"}`.

use core::fmt;

use log::debug;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::render::{DISPLAY_HEIGHT, DISPLAY_WIDTH};

/// Longest payload the codec will look at.
pub const MAX_PAYLOAD_LEN: usize = 512;
/// Longest message text kept after sanitising.
pub const MAX_TEXT_LEN: usize = 200;
pub const MIN_TEXT_SIZE: u8 = 1;
pub const MAX_TEXT_SIZE: u8 = 4;

/// Bounded, display-safe message text.
pub type MessageText = heapless::String<MAX_TEXT_LEN>;

// ---------------------------------------------------------------------------
// Domain types
// ---------------------------------------------------------------------------

/// Pixel offset of the text cursor, always inside the panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    pub x: u8,
    pub y: u8,
}

/// Scale and cursor applied to the next rendered message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStyle {
    pub size: u8,
    pub position: Position,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size: MIN_TEXT_SIZE,
            position: Position::default(),
        }
    }
}

/// The most recent message shown on the Message screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: MessageText,
    pub size: u8,
    pub position: Position,
}

impl Message {
    pub fn style(&self) -> TextStyle {
        TextStyle {
            size: self.size,
            position: self.position,
        }
    }
}

/// Validated fields of one inbound payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decoded {
    pub size: Option<u8>,
    pub position: Option<Position>,
    pub text: Option<MessageText>,
}

impl Decoded {
    /// Fold the payload into the current style and build the message, if any.
    ///
    /// Absent `size` / `pos` keep their previous values; the text is always
    /// replaced as a whole.
    pub fn apply(self, style: &mut TextStyle) -> Option<Message> {
        if let Some(size) = self.size {
            style.size = size;
        }
        if let Some(position) = self.position {
            style.position = position;
        }
        self.text.map(|text| Message {
            text,
            size: style.size,
            position: style.position,
        })
    }
}

/// Events sent to the remote peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundEvent {
    MissYouButton,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// Not valid JSON, or not a JSON object.
    Malformed,
    /// Payload longer than [`MAX_PAYLOAD_LEN`].
    TooLong,
    /// A stored record is missing a required field.
    MissingField(&'static str),
    /// Serialisation failed.
    Encode,
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed payload"),
            Self::TooLong => write!(f, "payload exceeds {} bytes", MAX_PAYLOAD_LEN),
            Self::MissingField(name) => write!(f, "missing field '{}'", name),
            Self::Encode => write!(f, "encode failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Wire representation
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct WireMessage<'a> {
    size: u8,
    pos: [u8; 2],
    text: &'a str,
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Parse and validate one inbound payload.
///
/// The payload must be a JSON object. A field of the wrong type is ignored
/// and keeps its previous value, like an absent one. Numbers may be floats;
/// a short `pos` array fills the missing coordinate with 0. Out-of-range values
/// are clamped: `size` into 1–4, `pos` onto the panel. Text is reduced to
/// printable ASCII plus `\n` and truncated.
pub fn decode(payload: &str) -> Result<Decoded, CodecError> {
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(CodecError::TooLong);
    }
    let value: Value = serde_json::from_str(payload).map_err(|_| CodecError::Malformed)?;
    let Value::Object(fields) = value else {
        return Err(CodecError::Malformed);
    };

    Ok(Decoded {
        size: field_size(&fields),
        position: field_position(&fields),
        text: field_text(&fields),
    })
}

fn field_size(fields: &Map<String, Value>) -> Option<u8> {
    let raw = fields.get("size")?;
    let Some(size) = as_int(raw) else {
        debug!("Codec: ignoring non-numeric size");
        return None;
    };
    Some(size.clamp(MIN_TEXT_SIZE as i64, MAX_TEXT_SIZE as i64) as u8)
}

fn field_position(fields: &Map<String, Value>) -> Option<Position> {
    let raw = fields.get("pos")?;
    let Some(coords) = raw.as_array() else {
        debug!("Codec: ignoring non-array pos");
        return None;
    };
    // A missing or non-numeric coordinate reads as 0.
    let coord = |i: usize| coords.get(i).and_then(as_int).unwrap_or(0);
    let (x, y) = (coord(0), coord(1));
    Some(Position {
        x: x.clamp(0, DISPLAY_WIDTH as i64 - 1) as u8,
        y: y.clamp(0, DISPLAY_HEIGHT as i64 - 1) as u8,
    })
}

/// Integers as-is, floats truncated toward zero.
fn as_int(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| value.as_f64().map(|f| f as i64))
}

fn field_text(fields: &Map<String, Value>) -> Option<MessageText> {
    let raw = fields.get("text")?;
    let Some(text) = raw.as_str() else {
        debug!("Codec: ignoring non-string text");
        return None;
    };
    Some(sanitize_text(text))
}

/// Decode a persisted `lastMessage` record. Every field is required.
pub fn decode_stored_message(record: &str) -> Result<Message, CodecError> {
    let decoded = decode(record)?;
    let size = decoded.size.ok_or(CodecError::MissingField("size"))?;
    let position = decoded.position.ok_or(CodecError::MissingField("pos"))?;
    let text = decoded.text.ok_or(CodecError::MissingField("text"))?;
    Ok(Message {
        text,
        size,
        position,
    })
}

fn sanitize_text(raw: &str) -> MessageText {
    let mut out = MessageText::new();
    for c in raw.chars() {
        let c = match c {
            '\n' => '\n',
            '\t' => ' ',
            c if c.is_ascii_graphic() || c == ' ' => c,
            c if c.is_control() => continue,
            _ => '?',
        };
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Serialise a message in the inbound payload shape (used for persistence).
pub fn encode_message(msg: &Message) -> Result<String, CodecError> {
    let wire = WireMessage {
        size: msg.size,
        pos: [msg.position.x, msg.position.y],
        text: msg.text.as_str(),
    };
    serde_json::to_string(&wire).map_err(|_| CodecError::Encode)
}

/// Serialise an outbound event payload.
pub fn encode_event(event: OutboundEvent) -> Result<String, CodecError> {
    serde_json::to_string(&event).map_err(|_| CodecError::Encode)
}
