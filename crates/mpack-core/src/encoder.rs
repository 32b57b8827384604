//! MessagePack encoder: walks a [`Value`] tree and appends its bytes to a sink.
//!
//! Emission is depth-first. Every node writes its header first (chosen by
//! [`crate::format`] as the smallest class that fits), then its children in
//! order; map entries go key then value in the order they are stored. The
//! output depends only on the input tree, so encoding the same value twice
//! yields identical bytes.
//!
//! # Example
//! ```
//! use mpack_core::{encode, Value};
//!
//! let bytes = encode(&Value::from(5)).unwrap();
//! assert_eq!(bytes, [0x05]);
//! ```

use crate::error::EncodeResult;
use crate::format::{self, Marker};
use crate::value::Value;

/// Encode a value into a freshly allocated buffer.
///
/// Fails only with [`EncodeError::PayloadTooLarge`](crate::EncodeError) when
/// some str, bin, ext, array or map is longer than `u32::MAX`.
pub fn encode(value: &Value) -> EncodeResult<Vec<u8>> {
    let mut encoder = Encoder::new();
    encoder.write_value(value)?;
    Ok(encoder.into_inner())
}

/// Append the encoding of `value` to `out`.
///
/// On failure `out` is restored to its length before the call.
pub fn encode_into(value: &Value, out: &mut Vec<u8>) -> EncodeResult<()> {
    let start = out.len();
    let result = write_value(value, out);
    if result.is_err() {
        out.truncate(start);
    }
    result
}

/// Owns a growable byte sink and appends encoded values to it.
///
/// Useful for packing several values back to back into one buffer that a
/// [`Decoder`](crate::Decoder) can later walk value by value.
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Append one value. A failed write leaves previously written values intact
    /// and adds nothing.
    pub fn write_value(&mut self, value: &Value) -> EncodeResult<()> {
        encode_into(value, &mut self.buf)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Drop all written bytes, keeping the allocation.
    pub fn clear(&mut self) {
        self.buf.clear();
    }
}

/// Recursive dispatch on the value variant.
fn write_value(value: &Value, out: &mut Vec<u8>) -> EncodeResult<()> {
    match value {
        Value::Nil => out.push(Marker::Nil.to_u8()),
        Value::Bool(false) => out.push(Marker::False.to_u8()),
        Value::Bool(true) => out.push(Marker::True.to_u8()),
        Value::Int(n) => write_int(*n, out),
        Value::UInt(n) => write_uint(*n, out),
        Value::F32(f) => {
            out.push(Marker::F32.to_u8());
            out.extend_from_slice(&f.to_be_bytes());
        }
        Value::F64(f) => {
            out.push(Marker::F64.to_u8());
            out.extend_from_slice(&f.to_be_bytes());
        }
        Value::Str(s) => {
            format::str_header(s.len())?.write_to(out);
            out.extend_from_slice(s.as_bytes());
        }
        Value::Bin(b) => {
            format::bin_header(b.len())?.write_to(out);
            out.extend_from_slice(b);
        }
        Value::Array(items) => {
            format::array_header(items.len())?.write_to(out);
            for item in items {
                write_value(item, out)?;
            }
        }
        Value::Map(entries) => {
            format::map_header(entries.len())?.write_to(out);
            for (key, val) in entries {
                write_value(key, out)?;
                write_value(val, out)?;
            }
        }
        Value::Ext(ty, data) => {
            format::ext_header(data.len())?.write_to(out);
            out.push(*ty as u8);
            out.extend_from_slice(data);
        }
    }
    Ok(())
}

/// Emit an unsigned integer in the smallest class that holds it.
fn write_uint(n: u64, out: &mut Vec<u8>) {
    let marker = format::uint_marker(n);
    out.push(marker.to_u8());
    match marker {
        Marker::U8 => out.push(n as u8),
        Marker::U16 => out.extend_from_slice(&(n as u16).to_be_bytes()),
        Marker::U32 => out.extend_from_slice(&(n as u32).to_be_bytes()),
        Marker::U64 => out.extend_from_slice(&n.to_be_bytes()),
        _ => {}
    }
}

/// Emit a signed integer. Non-negative values share the unsigned encoding.
fn write_int(n: i64, out: &mut Vec<u8>) {
    if n >= 0 {
        write_uint(n as u64, out);
        return;
    }
    let marker = format::int_marker(n);
    out.push(marker.to_u8());
    match marker {
        Marker::I8 => out.push(n as i8 as u8),
        Marker::I16 => out.extend_from_slice(&(n as i16).to_be_bytes()),
        Marker::I32 => out.extend_from_slice(&(n as i32).to_be_bytes()),
        Marker::I64 => out.extend_from_slice(&n.to_be_bytes()),
        _ => {}
    }
}
