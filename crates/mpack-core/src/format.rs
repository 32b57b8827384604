//! MessagePack format grammar: tag bytes, size classes and header selection.
//!
//! This module is the only place that knows which byte means what. The encoder
//! asks it for the smallest header that fits a value; the decoder asks it what a
//! byte it just read announces. Both directions go through [`Marker`], so a
//! threshold cannot drift between them.
//!
//! ```text
//! 0x00..=0x7f  positive fixint      0xc4..=0xc6  bin 8/16/32
//! 0x80..=0x8f  fixmap   (n < 16)    0xc7..=0xc9  ext 8/16/32
//! 0x90..=0x9f  fixarray (n < 16)    0xca, 0xcb   float 32/64
//! 0xa0..=0xbf  fixstr   (n < 32)    0xcc..=0xcf  uint 8/16/32/64
//! 0xc0         nil                  0xd0..=0xd3  int 8/16/32/64
//! 0xc1         never used           0xd4..=0xd8  fixext 1/2/4/8/16
//! 0xc2, 0xc3   false, true          0xd9..=0xdb  str 8/16/32
//!                                   0xdc, 0xdd   array 16/32
//!                                   0xde, 0xdf   map 16/32
//! 0xe0..=0xff  negative fixint (-32..=-1)
//! ```
//!
//! All multi-byte fields are big-endian.

use crate::error::{EncodeError, EncodeResult};

/// Largest length any str/bin/ext/array/map header can carry.
pub const MAX_LEN: usize = u32::MAX as usize;

/// Largest value stored directly in a positive fixint byte.
pub const FIXINT_POS_MAX: u64 = 0x7f;
/// Smallest value stored directly in a negative fixint byte.
pub const FIXINT_NEG_MIN: i64 = -32;
/// Exclusive upper bound on fixstr byte length.
pub const FIXSTR_LIMIT: usize = 32;
/// Exclusive upper bound on fixarray/fixmap element counts.
pub const FIXCOLLECTION_LIMIT: usize = 16;

/// The extension type reserved for timestamps.
pub const TIMESTAMP_EXT_TYPE: i8 = -1;

/// A decoded tag byte.
///
/// Variants carrying a payload are the "fix" forms whose value or length lives
/// in the low bits of the tag itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    FixPos(u8),
    FixNeg(i8),
    FixMap(u8),
    FixArray(u8),
    FixStr(u8),
    Nil,
    False,
    True,
    Bin8,
    Bin16,
    Bin32,
    Ext8,
    Ext16,
    Ext32,
    F32,
    F64,
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    FixExt1,
    FixExt2,
    FixExt4,
    FixExt8,
    FixExt16,
    Str8,
    Str16,
    Str32,
    Array16,
    Array32,
    Map16,
    Map32,
}

impl Marker {
    /// Classify a tag byte. Returns `None` for the one byte the format never
    /// assigns (`0xc1`).
    pub fn from_u8(byte: u8) -> Option<Marker> {
        let marker = match byte {
            0x00..=0x7f => Marker::FixPos(byte),
            0x80..=0x8f => Marker::FixMap(byte & 0x0f),
            0x90..=0x9f => Marker::FixArray(byte & 0x0f),
            0xa0..=0xbf => Marker::FixStr(byte & 0x1f),
            0xc0 => Marker::Nil,
            0xc1 => return None,
            0xc2 => Marker::False,
            0xc3 => Marker::True,
            0xc4 => Marker::Bin8,
            0xc5 => Marker::Bin16,
            0xc6 => Marker::Bin32,
            0xc7 => Marker::Ext8,
            0xc8 => Marker::Ext16,
            0xc9 => Marker::Ext32,
            0xca => Marker::F32,
            0xcb => Marker::F64,
            0xcc => Marker::U8,
            0xcd => Marker::U16,
            0xce => Marker::U32,
            0xcf => Marker::U64,
            0xd0 => Marker::I8,
            0xd1 => Marker::I16,
            0xd2 => Marker::I32,
            0xd3 => Marker::I64,
            0xd4 => Marker::FixExt1,
            0xd5 => Marker::FixExt2,
            0xd6 => Marker::FixExt4,
            0xd7 => Marker::FixExt8,
            0xd8 => Marker::FixExt16,
            0xd9 => Marker::Str8,
            0xda => Marker::Str16,
            0xdb => Marker::Str32,
            0xdc => Marker::Array16,
            0xdd => Marker::Array32,
            0xde => Marker::Map16,
            0xdf => Marker::Map32,
            0xe0..=0xff => Marker::FixNeg(byte as i8),
        };
        Some(marker)
    }

    /// The tag byte for this marker.
    pub fn to_u8(self) -> u8 {
        match self {
            Marker::FixPos(n) => n & 0x7f,
            Marker::FixNeg(n) => (n as u8) | 0xe0,
            Marker::FixMap(n) => 0x80 | (n & 0x0f),
            Marker::FixArray(n) => 0x90 | (n & 0x0f),
            Marker::FixStr(n) => 0xa0 | (n & 0x1f),
            Marker::Nil => 0xc0,
            Marker::False => 0xc2,
            Marker::True => 0xc3,
            Marker::Bin8 => 0xc4,
            Marker::Bin16 => 0xc5,
            Marker::Bin32 => 0xc6,
            Marker::Ext8 => 0xc7,
            Marker::Ext16 => 0xc8,
            Marker::Ext32 => 0xc9,
            Marker::F32 => 0xca,
            Marker::F64 => 0xcb,
            Marker::U8 => 0xcc,
            Marker::U16 => 0xcd,
            Marker::U32 => 0xce,
            Marker::U64 => 0xcf,
            Marker::I8 => 0xd0,
            Marker::I16 => 0xd1,
            Marker::I32 => 0xd2,
            Marker::I64 => 0xd3,
            Marker::FixExt1 => 0xd4,
            Marker::FixExt2 => 0xd5,
            Marker::FixExt4 => 0xd6,
            Marker::FixExt8 => 0xd7,
            Marker::FixExt16 => 0xd8,
            Marker::Str8 => 0xd9,
            Marker::Str16 => 0xda,
            Marker::Str32 => 0xdb,
            Marker::Array16 => 0xdc,
            Marker::Array32 => 0xdd,
            Marker::Map16 => 0xde,
            Marker::Map32 => 0xdf,
        }
    }

    /// Width in bytes of the explicit length field following this marker.
    /// Zero for markers whose length is implicit or absent.
    pub fn len_width(self) -> usize {
        match self {
            Marker::Bin8 | Marker::Ext8 | Marker::Str8 => 1,
            Marker::Bin16 | Marker::Ext16 | Marker::Str16 | Marker::Array16 | Marker::Map16 => 2,
            Marker::Bin32 | Marker::Ext32 | Marker::Str32 | Marker::Array32 | Marker::Map32 => 4,
            _ => 0,
        }
    }

    /// Width in bytes of the fixed payload of a scalar marker, or the data
    /// length of a fixext (excluding its type byte).
    pub fn fixed_width(self) -> usize {
        match self {
            Marker::U8 | Marker::I8 | Marker::FixExt1 => 1,
            Marker::U16 | Marker::I16 | Marker::FixExt2 => 2,
            Marker::U32 | Marker::I32 | Marker::F32 | Marker::FixExt4 => 4,
            Marker::U64 | Marker::I64 | Marker::F64 | Marker::FixExt8 => 8,
            Marker::FixExt16 => 16,
            _ => 0,
        }
    }
}

/// A container header: the marker plus the length it announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub marker: Marker,
    pub len: usize,
}

impl Header {
    /// Append the tag byte and, if the marker has one, the big-endian length
    /// field.
    pub fn write_to(self, out: &mut Vec<u8>) {
        out.push(self.marker.to_u8());
        // Lengths were range-checked when the header was selected.
        match self.marker.len_width() {
            1 => out.push(self.len as u8),
            2 => out.extend_from_slice(&(self.len as u16).to_be_bytes()),
            4 => out.extend_from_slice(&(self.len as u32).to_be_bytes()),
            _ => {}
        }
    }
}

/// Smallest marker for a non-negative integer.
pub fn uint_marker(n: u64) -> Marker {
    if n <= FIXINT_POS_MAX {
        Marker::FixPos(n as u8)
    } else if n <= u64::from(u8::MAX) {
        Marker::U8
    } else if n <= u64::from(u16::MAX) {
        Marker::U16
    } else if n <= u64::from(u32::MAX) {
        Marker::U32
    } else {
        Marker::U64
    }
}

/// Smallest marker for a signed integer. Non-negative values take the unsigned
/// classes, which are never wider than the signed ones.
pub fn int_marker(n: i64) -> Marker {
    if n >= 0 {
        return uint_marker(n as u64);
    }
    if n >= FIXINT_NEG_MIN {
        Marker::FixNeg(n as i8)
    } else if n >= i64::from(i8::MIN) {
        Marker::I8
    } else if n >= i64::from(i16::MIN) {
        Marker::I16
    } else if n >= i64::from(i32::MIN) {
        Marker::I32
    } else {
        Marker::I64
    }
}

fn too_large(kind: &'static str, len: usize) -> EncodeError {
    EncodeError::PayloadTooLarge { kind, len }
}

/// Header for a UTF-8 string of `len` bytes.
pub fn str_header(len: usize) -> EncodeResult<Header> {
    let marker = if len < FIXSTR_LIMIT {
        Marker::FixStr(len as u8)
    } else if len <= usize::from(u8::MAX) {
        Marker::Str8
    } else if len <= usize::from(u16::MAX) {
        Marker::Str16
    } else if len <= MAX_LEN {
        Marker::Str32
    } else {
        return Err(too_large("str", len));
    };
    Ok(Header { marker, len })
}

/// Header for a binary blob of `len` bytes.
pub fn bin_header(len: usize) -> EncodeResult<Header> {
    let marker = if len <= usize::from(u8::MAX) {
        Marker::Bin8
    } else if len <= usize::from(u16::MAX) {
        Marker::Bin16
    } else if len <= MAX_LEN {
        Marker::Bin32
    } else {
        return Err(too_large("bin", len));
    };
    Ok(Header { marker, len })
}

/// Header for an array of `len` elements.
pub fn array_header(len: usize) -> EncodeResult<Header> {
    let marker = if len < FIXCOLLECTION_LIMIT {
        Marker::FixArray(len as u8)
    } else if len <= usize::from(u16::MAX) {
        Marker::Array16
    } else if len <= MAX_LEN {
        Marker::Array32
    } else {
        return Err(too_large("array", len));
    };
    Ok(Header { marker, len })
}

/// Header for a map of `len` key-value pairs.
pub fn map_header(len: usize) -> EncodeResult<Header> {
    let marker = if len < FIXCOLLECTION_LIMIT {
        Marker::FixMap(len as u8)
    } else if len <= usize::from(u16::MAX) {
        Marker::Map16
    } else if len <= MAX_LEN {
        Marker::Map32
    } else {
        return Err(too_large("map", len));
    };
    Ok(Header { marker, len })
}

/// Header for an extension payload of `len` bytes. The type byte is written
/// separately, right after the header.
pub fn ext_header(len: usize) -> EncodeResult<Header> {
    let marker = match len {
        1 => Marker::FixExt1,
        2 => Marker::FixExt2,
        4 => Marker::FixExt4,
        8 => Marker::FixExt8,
        16 => Marker::FixExt16,
        _ if len <= usize::from(u8::MAX) => Marker::Ext8,
        _ if len <= usize::from(u16::MAX) => Marker::Ext16,
        _ if len <= MAX_LEN => Marker::Ext32,
        _ => return Err(too_large("ext", len)),
    };
    Ok(Header { marker, len })
}
