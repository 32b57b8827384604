//! Typed views over extension values.
//!
//! MessagePack reserves negative extension types for itself; type `-1` is the
//! timestamp. It has three layouts, and [`Timestamp::to_ext`] picks the
//! shortest one that holds the value:
//!
//! | data length | layout |
//! | --- | --- |
//! | 4 | `u32` seconds, no nanoseconds |
//! | 8 | `u64`: nanoseconds in the upper 30 bits, seconds in the lower 34 |
//! | 12 | `u32` nanoseconds, then `i64` seconds |

use crate::error::ExtError;
use crate::format::TIMESTAMP_EXT_TYPE;
use crate::value::Value;

const NANOS_PER_SEC: u32 = 1_000_000_000;
const SECONDS_34_BIT_MASK: u64 = (1 << 34) - 1;

/// A point in time as seconds and nanoseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    seconds: i64,
    nanoseconds: u32,
}

impl Timestamp {
    /// Build a timestamp. `nanoseconds` must be below one second.
    pub fn new(seconds: i64, nanoseconds: u32) -> Result<Self, ExtError> {
        if nanoseconds >= NANOS_PER_SEC {
            return Err(ExtError::InvalidNanoseconds(nanoseconds));
        }
        Ok(Self {
            seconds,
            nanoseconds,
        })
    }

    pub fn seconds(&self) -> i64 {
        self.seconds
    }

    pub fn nanoseconds(&self) -> u32 {
        self.nanoseconds
    }

    /// Extension type and payload in the most compact layout.
    pub fn to_ext(&self) -> (i8, Vec<u8>) {
        let data = match u64::try_from(self.seconds) {
            Ok(secs) if secs <= SECONDS_34_BIT_MASK => {
                if self.nanoseconds == 0 && secs <= u64::from(u32::MAX) {
                    (secs as u32).to_be_bytes().to_vec()
                } else {
                    let packed = (u64::from(self.nanoseconds) << 34) | secs;
                    packed.to_be_bytes().to_vec()
                }
            }
            _ => {
                let mut data = Vec::with_capacity(12);
                data.extend_from_slice(&self.nanoseconds.to_be_bytes());
                data.extend_from_slice(&self.seconds.to_be_bytes());
                data
            }
        };
        (TIMESTAMP_EXT_TYPE, data)
    }

    /// Parse any of the three timestamp layouts.
    pub fn from_ext(ty: i8, data: &[u8]) -> Result<Self, ExtError> {
        if ty != TIMESTAMP_EXT_TYPE {
            return Err(ExtError::WrongType {
                expected: TIMESTAMP_EXT_TYPE,
                found: ty,
            });
        }
        match data {
            &[a, b, c, d] => Self::new(i64::from(u32::from_be_bytes([a, b, c, d])), 0),
            &[a, b, c, d, e, f, g, h] => {
                let packed = u64::from_be_bytes([a, b, c, d, e, f, g, h]);
                let nanos = (packed >> 34) as u32;
                Self::new((packed & SECONDS_34_BIT_MASK) as i64, nanos)
            }
            &[n0, n1, n2, n3, s0, s1, s2, s3, s4, s5, s6, s7] => {
                let nanos = u32::from_be_bytes([n0, n1, n2, n3]);
                let secs = i64::from_be_bytes([s0, s1, s2, s3, s4, s5, s6, s7]);
                Self::new(secs, nanos)
            }
            _ => Err(ExtError::InvalidLength(data.len())),
        }
    }
}

impl From<Timestamp> for Value {
    fn from(ts: Timestamp) -> Self {
        let (ty, data) = ts.to_ext();
        Value::Ext(ty, data)
    }
}

impl TryFrom<&Value> for Timestamp {
    type Error = ExtError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        let (ty, data) = value.as_ext().ok_or(ExtError::NotExt)?;
        Timestamp::from_ext(ty, data)
    }
}
