//! # mpack-core
//!
//! Pure-Rust encoder and decoder for **MessagePack**, the compact, self-describing
//! binary format with tagged integers, floats, strings, binary blobs, arrays,
//! ordered maps and extension values.
//!
//! Values are held in a closed [`Value`] tree. Encoding always picks the
//! smallest size class for integers and length prefixes and is deterministic;
//! decoding validates framing as it goes and never reads past the buffer or
//! nests deeper than a configurable limit.
//!
//! ## Quick start
//!
//! ```rust
//! use mpack_core::{decode, encode, Value};
//!
//! let value = Value::Map(vec![
//!     (Value::from("a"), Value::from(1)),
//!     (Value::from("b"), Value::from(2)),
//! ]);
//! let bytes = encode(&value).unwrap();
//! assert_eq!(bytes, [0x82, 0xa1, b'a', 0x01, 0xa1, b'b', 0x02]);
//!
//! let (back, used) = decode(&bytes).unwrap();
//! assert_eq!(back, value);
//! assert_eq!(used, bytes.len());
//! ```
//!
//! ## Modules
//!
//! - [`value`] — `Value` tree, conversions and accessors
//! - [`format`] — tag bytes, size classes and header selection
//! - [`encoder`] — `Value` → bytes
//! - [`decoder`] — bytes → `Value`, with depth and length guards
//! - [`ext`] — typed extension values (`Timestamp`)
//! - [`json`] — `serde_json::Value` conversion and `Serialize` for `Value`
//! - [`error`] — error types for each direction

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod ext;
pub mod format;
pub mod json;
pub mod value;

pub use decoder::{decode, decode_all, decode_with, Decoder, DecoderConfig, ValueIter};
pub use encoder::{encode, encode_into, Encoder};
pub use error::{DecodeError, EncodeError, ExtError};
pub use ext::Timestamp;
pub use format::Marker;
pub use value::Value;
