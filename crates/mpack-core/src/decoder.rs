//! MessagePack decoder: reconstructs [`Value`] trees from a complete byte buffer.
//!
//! The decoder reads one tag byte, asks [`Marker::from_u8`] what it announces,
//! then reads the payload. Open containers wait on an explicit stack until
//! their declared number of children has arrived, so nesting depth costs heap
//! rather than call frames. Every read is bounds-checked against the remaining input before
//! anything is allocated, so a lying length prefix produces
//! [`DecodeError::TruncatedInput`] instead of a huge allocation or an
//! out-of-bounds read.
//!
//! # Key design decisions
//!
//! - **One value per call**: [`decode`] returns the value and the number of
//!   bytes it used. Trailing bytes are left for the caller, which makes
//!   concatenated streams ([`decode_all`], [`Decoder::iter`]) fall out for free.
//! - **Depth guard**: array/map nesting is counted and capped by
//!   [`DecoderConfig::max_depth`] (default 512).
//! - **Count guard**: an array needs at least one byte per element and a map
//!   two per pair, so counts larger than the remaining input are rejected
//!   before the element vector is allocated.
//! - **Integer normalisation**: any integer that fits in `i64` comes back as
//!   [`Value::Int`], whatever width it was sent in.

use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, Result};
use crate::format::Marker;
use crate::value::Value;

/// Default cap on array/map nesting.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Decoder limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Maximum number of nested arrays/maps. A top-level array is depth 1.
    pub max_depth: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl DecoderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Decode the first value in `bytes` with the default configuration.
///
/// Returns the value and how many bytes it occupied. Bytes after the value
/// are ignored.
///
/// # Example
/// ```
/// use mpack_core::{decode, Value};
///
/// let (value, used) = decode(&[0x05, 0xc0]).unwrap();
/// assert_eq!(value, Value::Int(5));
/// assert_eq!(used, 1);
/// ```
pub fn decode(bytes: &[u8]) -> Result<(Value, usize)> {
    decode_with(bytes, &DecoderConfig::default())
}

/// Decode the first value in `bytes` under `config`.
pub fn decode_with(bytes: &[u8], config: &DecoderConfig) -> Result<(Value, usize)> {
    let mut decoder = Decoder::with_config(bytes, *config);
    let value = decoder.read_value()?;
    Ok((value, decoder.position()))
}

/// Decode every value in a buffer of back-to-back encodings.
///
/// An empty buffer yields an empty vector. Fails on the first bad value.
pub fn decode_all(bytes: &[u8]) -> Result<Vec<Value>> {
    Decoder::new(bytes).iter().collect()
}

/// A cursor over a borrowed buffer holding zero or more encoded values.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    buf: &'a [u8],
    pos: usize,
    config: DecoderConfig,
}

impl<'a> Decoder<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self::with_config(buf, DecoderConfig::default())
    }

    pub fn with_config(buf: &'a [u8], config: DecoderConfig) -> Self {
        Self {
            buf,
            pos: 0,
            config,
        }
    }

    /// Offset of the next unread byte.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// True once every byte has been consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Decode the next value and advance past it.
    ///
    /// On error the cursor stays where the value started, so the caller may
    /// inspect the offending bytes or give up; nothing partial is returned.
    pub fn read_value(&mut self) -> Result<Value> {
        let start = self.pos;
        let result = self.read_any();
        if result.is_err() {
            self.pos = start;
        }
        result
    }

    /// Validate the framing of the next value and advance past it without
    /// building it. Returns the number of bytes skipped.
    ///
    /// String payloads are not checked for UTF-8; only lengths, tags and depth.
    pub fn skip_value(&mut self) -> Result<usize> {
        let start = self.pos;
        match self.skip_any() {
            Ok(()) => Ok(self.pos - start),
            Err(e) => {
                self.pos = start;
                Err(e)
            }
        }
    }

    /// Iterate over the remaining values. Iteration ends when the buffer is
    /// exhausted or right after the first error.
    pub fn iter(&mut self) -> ValueIter<'_, 'a> {
        ValueIter {
            decoder: self,
            failed: false,
        }
    }

    fn read_any(&mut self) -> Result<Value> {
        let mut open: Vec<Frame> = Vec::new();
        loop {
            let marker = self.read_marker()?;
            let mut value = match self.read_node(marker)? {
                Node::Scalar(value) => value,
                Node::Open(kind, len) => {
                    self.enter(open.len())?;
                    self.ensure_elements(len, kind.per_entry())?;
                    let frame = Frame::new(kind, len);
                    if len > 0 {
                        open.push(frame);
                        continue;
                    }
                    frame.into_value()
                }
            };
            // Hand the value to its parent, closing every container it completes.
            loop {
                let Some(frame) = open.last_mut() else {
                    return Ok(value);
                };
                if !frame.push(value) {
                    break;
                }
                value = match open.pop() {
                    Some(frame) => frame.into_value(),
                    None => break,
                };
            }
        }
    }

    /// Read the payload of a scalar, or the length of a container.
    fn read_node(&mut self, marker: Marker) -> Result<Node> {
        let value = match marker {
            Marker::FixPos(n) => Value::Int(i64::from(n)),
            Marker::FixNeg(n) => Value::Int(i64::from(n)),
            Marker::Nil => Value::Nil,
            Marker::False => Value::Bool(false),
            Marker::True => Value::Bool(true),
            Marker::U8 => Value::Int(i64::from(self.read_u8()?)),
            Marker::U16 => Value::Int(i64::from(u16::from_be_bytes(self.read_array()?))),
            Marker::U32 => Value::Int(i64::from(u32::from_be_bytes(self.read_array()?))),
            Marker::U64 => Value::from(u64::from_be_bytes(self.read_array()?)),
            Marker::I8 => Value::Int(i64::from(self.read_u8()? as i8)),
            Marker::I16 => Value::Int(i64::from(i16::from_be_bytes(self.read_array()?))),
            Marker::I32 => Value::Int(i64::from(i32::from_be_bytes(self.read_array()?))),
            Marker::I64 => Value::Int(i64::from_be_bytes(self.read_array()?)),
            Marker::F32 => Value::F32(f32::from_be_bytes(self.read_array()?)),
            Marker::F64 => Value::F64(f64::from_be_bytes(self.read_array()?)),
            Marker::FixStr(n) => self.read_str(usize::from(n))?,
            Marker::Str8 | Marker::Str16 | Marker::Str32 => {
                let len = self.read_len(marker)?;
                self.read_str(len)?
            }
            Marker::Bin8 | Marker::Bin16 | Marker::Bin32 => {
                let len = self.read_len(marker)?;
                Value::Bin(self.take(len)?.to_vec())
            }
            Marker::FixExt1
            | Marker::FixExt2
            | Marker::FixExt4
            | Marker::FixExt8
            | Marker::FixExt16 => self.read_ext(marker.fixed_width())?,
            Marker::Ext8 | Marker::Ext16 | Marker::Ext32 => {
                let len = self.read_len(marker)?;
                self.read_ext(len)?
            }
            Marker::FixArray(n) => return Ok(Node::Open(Container::Array, usize::from(n))),
            Marker::Array16 | Marker::Array32 => {
                return Ok(Node::Open(Container::Array, self.read_len(marker)?));
            }
            Marker::FixMap(n) => return Ok(Node::Open(Container::Map, usize::from(n))),
            Marker::Map16 | Marker::Map32 => {
                return Ok(Node::Open(Container::Map, self.read_len(marker)?));
            }
        };
        Ok(Node::Scalar(value))
    }

    fn read_str(&mut self, len: usize) -> Result<Value> {
        let offset = self.pos;
        let bytes = self.take(len)?;
        let s = std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8 { offset })?;
        Ok(Value::Str(s.to_owned()))
    }

    fn read_ext(&mut self, len: usize) -> Result<Value> {
        let ty = self.read_u8()? as i8;
        let data = self.take(len)?;
        Ok(Value::Ext(ty, data.to_vec()))
    }

    fn skip_any(&mut self) -> Result<()> {
        // Values still owed to each open container, innermost last.
        let mut owed: Vec<usize> = Vec::new();
        loop {
            let marker = self.read_marker()?;
            if let Some((kind, len)) = self.skip_node(marker)? {
                self.enter(owed.len())?;
                self.ensure_elements(len, kind.per_entry())?;
                if len > 0 {
                    owed.push(len * kind.per_entry());
                    continue;
                }
            }
            loop {
                let Some(left) = owed.last_mut() else {
                    return Ok(());
                };
                *left -= 1;
                if *left > 0 {
                    break;
                }
                owed.pop();
            }
        }
    }

    /// Step over a scalar's payload, or return a container's kind and length.
    fn skip_node(&mut self, marker: Marker) -> Result<Option<(Container, usize)>> {
        match marker {
            Marker::FixPos(_) | Marker::FixNeg(_) | Marker::Nil | Marker::False | Marker::True => {}
            Marker::FixStr(n) => {
                self.take(usize::from(n))?;
            }
            Marker::Str8
            | Marker::Str16
            | Marker::Str32
            | Marker::Bin8
            | Marker::Bin16
            | Marker::Bin32 => {
                let len = self.read_len(marker)?;
                self.take(len)?;
            }
            Marker::Ext8 | Marker::Ext16 | Marker::Ext32 => {
                let len = self.read_len(marker)?;
                self.take(1)?;
                self.take(len)?;
            }
            Marker::FixExt1
            | Marker::FixExt2
            | Marker::FixExt4
            | Marker::FixExt8
            | Marker::FixExt16 => {
                self.take(1)?;
                self.take(marker.fixed_width())?;
            }
            Marker::FixArray(n) => return Ok(Some((Container::Array, usize::from(n)))),
            Marker::Array16 | Marker::Array32 => {
                return Ok(Some((Container::Array, self.read_len(marker)?)));
            }
            Marker::FixMap(n) => return Ok(Some((Container::Map, usize::from(n)))),
            Marker::Map16 | Marker::Map32 => {
                return Ok(Some((Container::Map, self.read_len(marker)?)));
            }
            // Remaining markers are fixed-width scalars.
            _ => {
                self.take(marker.fixed_width())?;
            }
        }
        Ok(None)
    }

    /// Check that opening one more container inside `open` stays within the
    /// depth limit.
    fn enter(&self, open: usize) -> Result<()> {
        if open >= self.config.max_depth {
            return Err(DecodeError::DepthExceeded {
                limit: self.config.max_depth,
            });
        }
        Ok(())
    }

    /// Every encoded value is at least one byte, so `count` entries of
    /// `per_entry` values each cannot fit in fewer bytes than that.
    fn ensure_elements(&self, count: usize, per_entry: usize) -> Result<()> {
        let needed = count.saturating_mul(per_entry);
        if needed > self.remaining() {
            return Err(self.truncated(needed));
        }
        Ok(())
    }

    fn read_marker(&mut self) -> Result<Marker> {
        let offset = self.pos;
        let tag = self.read_u8()?;
        Marker::from_u8(tag).ok_or(DecodeError::UnknownTag { tag, offset })
    }

    /// Read the explicit length field that follows `marker`.
    fn read_len(&mut self, marker: Marker) -> Result<usize> {
        let len = match marker.len_width() {
            1 => u32::from(self.read_u8()?),
            2 => u32::from(u16::from_be_bytes(self.read_array()?)),
            _ => u32::from_be_bytes(self.read_array()?),
        };
        // usize is at least 32 bits on every supported target.
        Ok(len as usize)
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    /// Borrow the next `n` bytes and advance, or fail without moving.
    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(self.truncated(n));
        }
        let buf: &'a [u8] = self.buf;
        let bytes = &buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    fn truncated(&self, needed: usize) -> DecodeError {
        DecodeError::TruncatedInput {
            offset: self.pos,
            needed,
            remaining: self.remaining(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Container {
    Array,
    Map,
}

impl Container {
    /// Values per entry: one per array item, two per map pair.
    fn per_entry(self) -> usize {
        match self {
            Container::Array => 1,
            Container::Map => 2,
        }
    }
}

/// What a tag byte introduced: a finished scalar or a container to fill.
enum Node {
    Scalar(Value),
    Open(Container, usize),
}

/// A container still collecting its children.
enum Frame {
    Array {
        items: Vec<Value>,
        len: usize,
    },
    Map {
        entries: Vec<(Value, Value)>,
        len: usize,
        key: Option<Value>,
    },
}

impl Frame {
    fn new(kind: Container, len: usize) -> Self {
        match kind {
            Container::Array => Frame::Array {
                items: Vec::with_capacity(len),
                len,
            },
            Container::Map => Frame::Map {
                entries: Vec::with_capacity(len),
                len,
                key: None,
            },
        }
    }

    /// Add the next child. Returns true once the container is full.
    fn push(&mut self, value: Value) -> bool {
        match self {
            Frame::Array { items, len } => {
                items.push(value);
                items.len() == *len
            }
            Frame::Map { entries, len, key } => match key.take() {
                None => {
                    *key = Some(value);
                    false
                }
                Some(k) => {
                    entries.push((k, value));
                    entries.len() == *len
                }
            },
        }
    }

    fn into_value(self) -> Value {
        match self {
            Frame::Array { items, .. } => Value::Array(items),
            Frame::Map { entries, .. } => Value::Map(entries),
        }
    }
}

/// Iterator over consecutive values in a [`Decoder`]'s buffer.
#[derive(Debug)]
pub struct ValueIter<'d, 'a> {
    decoder: &'d mut Decoder<'a>,
    failed: bool,
}

impl Iterator for ValueIter<'_, '_> {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.decoder.is_empty() {
            return None;
        }
        let result = self.decoder.read_value();
        self.failed = result.is_err();
        Some(result)
    }
}
