/// Decoder contract tests: every marker, every error variant, the depth guard,
/// skipping and multi-value iteration.
use mpack_core::{decode, decode_all, decode_with, DecodeError, Decoder, DecoderConfig, Value};

/// Decode and assert the whole buffer was consumed.
fn dec(bytes: &[u8]) -> Value {
    let (value, used) = decode(bytes).unwrap();
    assert_eq!(used, bytes.len(), "decoder left bytes behind in {bytes:02x?}");
    value
}

fn nested_arrays(depth: usize) -> Vec<u8> {
    let mut bytes = vec![0x91; depth];
    bytes.push(0xc0);
    bytes
}

// ============================================================================
// Scalars
// ============================================================================

#[test]
fn decode_nil_and_bools() {
    assert_eq!(dec(&[0xc0]), Value::Nil);
    assert_eq!(dec(&[0xc2]), Value::Bool(false));
    assert_eq!(dec(&[0xc3]), Value::Bool(true));
}

#[test]
fn decode_fixints() {
    assert_eq!(dec(&[0x05]), Value::Int(5));
    assert_eq!(dec(&[0x7f]), Value::Int(127));
    assert_eq!(dec(&[0xff]), Value::Int(-1));
    assert_eq!(dec(&[0xe0]), Value::Int(-32));
}

#[test]
fn decode_unsigned_widths() {
    assert_eq!(dec(&[0xcc, 0xff]), Value::Int(255));
    assert_eq!(dec(&[0xcd, 0x01, 0x00]), Value::Int(256));
    assert_eq!(dec(&[0xce, 0x00, 0x01, 0x00, 0x00]), Value::Int(65536));
    assert_eq!(
        dec(&[0xcf, 0, 0, 0, 0x01, 0, 0, 0, 0]),
        Value::Int(1 << 32)
    );
}

#[test]
fn decode_uint64_above_i64_max_is_uint() {
    let value = dec(&[0xcf, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]);
    assert!(matches!(value, Value::UInt(u64::MAX)));
    let value = dec(&[0xcf, 0x80, 0, 0, 0, 0, 0, 0, 0]);
    assert!(matches!(value, Value::UInt(n) if n == 1 << 63));
}

#[test]
fn decode_normalises_small_uints_to_int() {
    // uint64 carrying 5 is legal on the wire even though it is not minimal.
    let value = dec(&[0xcf, 0, 0, 0, 0, 0, 0, 0, 5]);
    assert!(matches!(value, Value::Int(5)));
}

#[test]
fn decode_signed_widths() {
    assert_eq!(dec(&[0xd0, 0x80]), Value::Int(-128));
    assert_eq!(dec(&[0xd1, 0x80, 0x00]), Value::Int(-32768));
    assert_eq!(dec(&[0xd2, 0x80, 0, 0, 0]), Value::Int(i64::from(i32::MIN)));
    assert_eq!(dec(&[0xd3, 0x80, 0, 0, 0, 0, 0, 0, 0]), Value::Int(i64::MIN));
    // Signed markers may carry positive values too.
    assert_eq!(dec(&[0xd0, 0x05]), Value::Int(5));
}

#[test]
fn decode_int_equals_uint_of_same_value() {
    assert_eq!(dec(&[0x05]), Value::UInt(5));
}

#[test]
fn decode_floats() {
    assert_eq!(dec(&[0xca, 0x3f, 0xc0, 0x00, 0x00]), Value::F32(1.5));
    assert_eq!(dec(&[0xcb, 0x3f, 0xf8, 0, 0, 0, 0, 0, 0]), Value::F64(1.5));
}

#[test]
fn decode_float_widths_are_distinct() {
    assert_ne!(dec(&[0xca, 0x3f, 0xc0, 0x00, 0x00]), Value::F64(1.5));
}

#[test]
fn decode_nan_bits_are_preserved() {
    let bits = 0x7ff8_0000_0000_0001u64;
    let mut bytes = vec![0xcb];
    bytes.extend_from_slice(&bits.to_be_bytes());
    match dec(&bytes) {
        Value::F64(f) => assert_eq!(f.to_bits(), bits),
        other => panic!("expected F64, got {other:?}"),
    }
}

// ============================================================================
// Strings and binary
// ============================================================================

#[test]
fn decode_fixstr() {
    assert_eq!(dec(&[0xa5, b'h', b'e', b'l', b'l', b'o']), Value::from("hello"));
    assert_eq!(dec(&[0xa0]), Value::from(""));
}

#[test]
fn decode_str8_str16_str32() {
    assert_eq!(dec(&[0xd9, 0x02, b'h', b'i']), Value::from("hi"));
    assert_eq!(dec(&[0xda, 0x00, 0x02, b'h', b'i']), Value::from("hi"));
    assert_eq!(dec(&[0xdb, 0, 0, 0, 0x02, b'h', b'i']), Value::from("hi"));
}

#[test]
fn decode_bin_variants() {
    assert_eq!(dec(&[0xc4, 0x02, 0xde, 0xad]), Value::Bin(vec![0xde, 0xad]));
    assert_eq!(dec(&[0xc5, 0x00, 0x01, 0x07]), Value::Bin(vec![0x07]));
    assert_eq!(dec(&[0xc6, 0, 0, 0, 0]), Value::Bin(vec![]));
}

#[test]
fn decode_bin_and_str_are_distinct() {
    assert_ne!(dec(&[0xc4, 0x01, b'a']), Value::from("a"));
}

#[test]
fn decode_invalid_utf8() {
    let err = decode(&[0xa2, 0xc3, 0x28]).unwrap_err();
    assert_eq!(err, DecodeError::InvalidUtf8 { offset: 1 });
}

// ============================================================================
// Arrays and maps
// ============================================================================

#[test]
fn decode_fixarray() {
    assert_eq!(
        dec(&[0x93, 0x01, 0x02, 0x03]),
        Value::Array(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
    );
}

#[test]
fn decode_array16_and_array32() {
    assert_eq!(
        dec(&[0xdc, 0x00, 0x02, 0xc0, 0xc3]),
        Value::Array(vec![Value::Nil, Value::Bool(true)])
    );
    assert_eq!(dec(&[0xdd, 0, 0, 0, 0]), Value::Array(vec![]));
}

#[test]
fn decode_map_preserves_order_and_duplicates() {
    let value = dec(&[0x83, 0xa1, b'b', 0x02, 0xa1, b'a', 0x01, 0xa1, b'b', 0x03]);
    assert_eq!(
        value,
        Value::Map(vec![
            (Value::from("b"), Value::from(2)),
            (Value::from("a"), Value::from(1)),
            (Value::from("b"), Value::from(3)),
        ])
    );
    assert_eq!(value.get("b"), Some(&Value::Int(2)));
}

#[test]
fn decode_map16_and_map32() {
    assert_eq!(
        dec(&[0xde, 0x00, 0x01, 0x01, 0x02]),
        Value::Map(vec![(Value::Int(1), Value::Int(2))])
    );
    assert_eq!(dec(&[0xdf, 0, 0, 0, 0]), Value::Map(vec![]));
}

#[test]
fn decode_coordinate_record() {
    // {"x": 0.5, "opts": {"1": [1, true]}}
    let mut bytes = vec![0x82, 0xa1, b'x', 0xcb];
    bytes.extend_from_slice(&0.5f64.to_be_bytes());
    bytes.extend_from_slice(&[0xa4, b'o', b'p', b't', b's', 0x81, 0xa1, b'1', 0x92, 0x01, 0xc3]);
    let value = dec(&bytes);
    assert_eq!(value["x"], Value::F64(0.5));
    assert_eq!(value["opts"]["1"][0], Value::Int(1));
    assert_eq!(value["opts"]["1"][1], Value::Bool(true));
    assert_eq!(value["missing"], Value::Nil);
}

// ============================================================================
// Extensions
// ============================================================================

#[test]
fn decode_fixext() {
    assert_eq!(dec(&[0xd4, 0x05, 0xaa]), Value::Ext(5, vec![0xaa]));
    assert_eq!(
        dec(&[0xd6, 0xff, 0, 0, 0, 1]),
        Value::Ext(-1, vec![0, 0, 0, 1])
    );
}

#[test]
fn decode_ext8() {
    assert_eq!(dec(&[0xc7, 0x00, 0xfd]), Value::Ext(-3, vec![]));
    assert_eq!(dec(&[0xc7, 0x02, 0x01, 9, 9]), Value::Ext(1, vec![9, 9]));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn decode_empty_input_is_truncated() {
    assert_eq!(
        decode(&[]).unwrap_err(),
        DecodeError::TruncatedInput {
            offset: 0,
            needed: 1,
            remaining: 0
        }
    );
}

#[test]
fn decode_unknown_tag() {
    assert_eq!(
        decode(&[0xc1]).unwrap_err(),
        DecodeError::UnknownTag {
            tag: 0xc1,
            offset: 0
        }
    );
}

#[test]
fn decode_unknown_tag_inside_container_reports_offset() {
    assert_eq!(
        decode(&[0x92, 0x01, 0xc1]).unwrap_err(),
        DecodeError::UnknownTag {
            tag: 0xc1,
            offset: 2
        }
    );
}

#[test]
fn decode_truncated_fixed_width() {
    assert_eq!(
        decode(&[0xcd, 0x01]).unwrap_err(),
        DecodeError::TruncatedInput {
            offset: 1,
            needed: 2,
            remaining: 1
        }
    );
}

#[test]
fn decode_truncated_length_prefix() {
    assert!(matches!(
        decode(&[0xda, 0x00]),
        Err(DecodeError::TruncatedInput { .. })
    ));
}

#[test]
fn decode_string_claiming_more_than_available() {
    // str16 claiming 1000 bytes with only 10 present
    let mut bytes = vec![0xda, 0x03, 0xe8];
    bytes.extend_from_slice(b"0123456789");
    assert_eq!(
        decode(&bytes).unwrap_err(),
        DecodeError::TruncatedInput {
            offset: 3,
            needed: 1000,
            remaining: 10
        }
    );
}

#[test]
fn decode_huge_array_count_fails_before_allocating() {
    assert_eq!(
        decode(&[0xdd, 0xff, 0xff, 0xff, 0xff, 0xc0]).unwrap_err(),
        DecodeError::TruncatedInput {
            offset: 5,
            needed: u32::MAX as usize,
            remaining: 1
        }
    );
}

#[test]
fn decode_huge_map_count_fails_before_allocating() {
    assert!(matches!(
        decode(&[0xdf, 0xff, 0xff, 0xff, 0xff, 0xc0, 0xc0]),
        Err(DecodeError::TruncatedInput { .. })
    ));
}

#[test]
fn decode_map_missing_value() {
    assert!(matches!(
        decode(&[0x81, 0xc0]),
        Err(DecodeError::TruncatedInput { .. })
    ));
}

#[test]
fn decode_truncated_ext_type_byte() {
    assert!(matches!(
        decode(&[0xd4]),
        Err(DecodeError::TruncatedInput { .. })
    ));
}

#[test]
fn decode_error_messages() {
    assert_eq!(
        DecodeError::UnknownTag {
            tag: 0xc1,
            offset: 7
        }
        .to_string(),
        "unknown tag byte 0xc1 at offset 7"
    );
    assert_eq!(
        DecodeError::DepthExceeded { limit: 4 }.to_string(),
        "nesting depth exceeds limit of 4"
    );
}

// ============================================================================
// Depth guard
// ============================================================================

#[test]
fn decode_at_default_depth_limit() {
    let bytes = nested_arrays(512);
    let (_, used) = decode(&bytes).unwrap();
    assert_eq!(used, bytes.len());
}

#[test]
fn decode_beyond_default_depth_limit() {
    assert_eq!(
        decode(&nested_arrays(513)).unwrap_err(),
        DecodeError::DepthExceeded { limit: 512 }
    );
}

#[test]
fn decode_with_custom_depth_limit() {
    let config = DecoderConfig::new().max_depth(2);
    assert!(decode_with(&nested_arrays(2), &config).is_ok());
    assert_eq!(
        decode_with(&nested_arrays(3), &config).unwrap_err(),
        DecodeError::DepthExceeded { limit: 2 }
    );
}

#[test]
fn decode_maps_count_toward_depth() {
    let config = DecoderConfig::new().max_depth(1);
    // {1: [nil]}
    assert_eq!(
        decode_with(&[0x81, 0x01, 0x91, 0xc0], &config).unwrap_err(),
        DecodeError::DepthExceeded { limit: 1 }
    );
}

#[test]
fn decode_zero_depth_allows_scalars_only() {
    let config = DecoderConfig::new().max_depth(0);
    assert!(decode_with(&[0x05], &config).is_ok());
    assert!(decode_with(&[0x90], &config).is_err());
}

#[test]
fn decode_adversarial_depth_does_not_overflow_stack() {
    let bytes = vec![0x91; 1_000_000];
    assert_eq!(
        decode(&bytes).unwrap_err(),
        DecodeError::DepthExceeded { limit: 512 }
    );
}

/// Run `f` on a thread with a 2 MiB stack, the default for spawned threads.
fn on_small_stack<F: FnOnce() + Send + 'static>(f: F) {
    std::thread::Builder::new()
        .stack_size(2 << 20)
        .spawn(f)
        .unwrap()
        .join()
        .unwrap();
}

#[test]
fn decode_default_depth_fits_small_stack() {
    on_small_stack(|| {
        let bytes = nested_arrays(512);
        assert_eq!(decode(&bytes).unwrap().1, bytes.len());
        assert_eq!(Decoder::new(&bytes).skip_value().unwrap(), bytes.len());

        let bytes = vec![0x91; 1_000_000];
        assert_eq!(
            decode(&bytes).unwrap_err(),
            DecodeError::DepthExceeded { limit: 512 }
        );
        assert_eq!(
            Decoder::new(&bytes).skip_value().unwrap_err(),
            DecodeError::DepthExceeded { limit: 512 }
        );
    });
}

#[test]
fn decode_nested_maps_on_small_stack() {
    on_small_stack(|| {
        // {0: {0: ... {0: nil}}}
        let mut bytes = [0x81, 0x00].repeat(512);
        bytes.push(0xc0);
        let (value, used) = decode(&bytes).unwrap();
        assert_eq!(used, bytes.len());
        assert!(matches!(value, Value::Map(ref entries) if entries.len() == 1));
    });
}

#[test]
fn skip_far_beyond_default_depth_on_small_stack() {
    on_small_stack(|| {
        let config = DecoderConfig::new().max_depth(200_000);
        let bytes = nested_arrays(100_000);
        let mut decoder = Decoder::with_config(&bytes, config);
        assert_eq!(decoder.skip_value().unwrap(), bytes.len());
    });
}

#[test]
fn decoder_config_from_json() {
    let config: DecoderConfig = serde_json::from_str(r#"{"max_depth": 8}"#).unwrap();
    assert_eq!(config, DecoderConfig::new().max_depth(8));
    let config: DecoderConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config, DecoderConfig::default());
}

// ============================================================================
// Multiple values, iteration and skipping
// ============================================================================

#[test]
fn decode_reports_consumed_bytes_and_ignores_trailing() {
    let (value, used) = decode(&[0xa1, b'a', 0x01, 0x02]).unwrap();
    assert_eq!(value, Value::from("a"));
    assert_eq!(used, 2);
}

#[test]
fn decode_all_concatenated_values() {
    let values = decode_all(&[0x01, 0xc0, 0x91, 0xc3]).unwrap();
    assert_eq!(
        values,
        vec![Value::Int(1), Value::Nil, Value::Array(vec![Value::Bool(true)])]
    );
    assert!(decode_all(&[]).unwrap().is_empty());
}

#[test]
fn decode_all_fails_on_trailing_garbage() {
    assert_eq!(
        decode_all(&[0x01, 0xc1]).unwrap_err(),
        DecodeError::UnknownTag {
            tag: 0xc1,
            offset: 1
        }
    );
}

#[test]
fn decoder_iter_stops_after_error() {
    let bytes = [0x01, 0xcd, 0x00];
    let mut decoder = Decoder::new(&bytes);
    let results: Vec<_> = decoder.iter().collect();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0], Ok(Value::Int(1)));
    assert!(matches!(results[1], Err(DecodeError::TruncatedInput { .. })));
    // The cursor rests at the start of the bad value.
    assert_eq!(decoder.position(), 1);
    assert_eq!(decoder.remaining(), 2);
}

#[test]
fn decoder_failed_read_does_not_advance() {
    let bytes = [0x92, 0x01];
    let mut decoder = Decoder::new(&bytes);
    assert!(decoder.read_value().is_err());
    assert_eq!(decoder.position(), 0);
}

#[test]
fn decoder_skip_value() {
    let bytes = [0x82, 0xa1, b'a', 0x91, 0x01, 0xa1, b'b', 0xc4, 0x01, 0xff, 0x07];
    let mut decoder = Decoder::new(&bytes);
    assert_eq!(decoder.skip_value().unwrap(), 10);
    assert_eq!(decoder.read_value().unwrap(), Value::Int(7));
    assert!(decoder.is_empty());
}

#[test]
fn decoder_skip_respects_guards() {
    let mut decoder = Decoder::with_config(&[0x91, 0x91, 0xc0], DecoderConfig::new().max_depth(1));
    assert_eq!(
        decoder.skip_value().unwrap_err(),
        DecodeError::DepthExceeded { limit: 1 }
    );
    assert_eq!(decoder.position(), 0);

    let mut decoder = Decoder::new(&[0xc1]);
    assert!(matches!(
        decoder.skip_value(),
        Err(DecodeError::UnknownTag { tag: 0xc1, .. })
    ));

    let mut decoder = Decoder::new(&[0xd9, 0x05, b'a']);
    assert!(matches!(
        decoder.skip_value(),
        Err(DecodeError::TruncatedInput { .. })
    ));
}
