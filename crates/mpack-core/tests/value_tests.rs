/// Value model tests: structural equality, conversions and accessors.
use mpack_core::Value;

// ============================================================================
// Equality
// ============================================================================

#[test]
fn int_and_uint_compare_by_value() {
    assert_eq!(Value::Int(7), Value::UInt(7));
    assert_eq!(Value::UInt(7), Value::Int(7));
    assert_ne!(Value::Int(-1), Value::UInt(u64::MAX));
}

#[test]
fn floats_compare_by_bits() {
    assert_eq!(Value::F64(f64::NAN), Value::F64(f64::NAN));
    assert_ne!(Value::F64(0.0), Value::F64(-0.0));
    assert_ne!(Value::F32(1.0), Value::F64(1.0));
    assert_ne!(Value::F64(1.0), Value::Int(1));
}

#[test]
fn containers_compare_in_order() {
    let ab = Value::Map(vec![
        (Value::from("a"), Value::Nil),
        (Value::from("b"), Value::Nil),
    ]);
    let ba = Value::Map(vec![
        (Value::from("b"), Value::Nil),
        (Value::from("a"), Value::Nil),
    ]);
    assert_ne!(ab, ba);
    assert_eq!(
        Value::Array(vec![Value::Int(1), Value::UInt(2)]),
        Value::Array(vec![Value::UInt(1), Value::Int(2)])
    );
}

// ============================================================================
// Conversions
// ============================================================================

#[test]
fn from_integers() {
    assert!(matches!(Value::from(5u8), Value::Int(5)));
    assert!(matches!(Value::from(-5i16), Value::Int(-5)));
    assert!(matches!(Value::from(5u64), Value::Int(5)));
    assert!(matches!(Value::from(u64::MAX), Value::UInt(u64::MAX)));
}

#[test]
fn from_option() {
    assert_eq!(Value::from(None::<i32>), Value::Nil);
    assert_eq!(Value::from(Some("x")), Value::from("x"));
}

#[test]
fn collect_pairs_into_map() {
    let value: Value = vec![("k1", 1), ("k2", 2)].into_iter().collect();
    assert_eq!(
        value,
        Value::Map(vec![
            (Value::from("k1"), Value::from(1)),
            (Value::from("k2"), Value::from(2)),
        ])
    );
}

#[test]
fn from_bytes_is_bin() {
    assert_eq!(Value::from(&b"ab"[..]), Value::Bin(vec![b'a', b'b']));
}

// ============================================================================
// Accessors
// ============================================================================

#[test]
fn numeric_accessors() {
    assert_eq!(Value::Int(-3).as_i64(), Some(-3));
    assert_eq!(Value::Int(-3).as_u64(), None);
    assert_eq!(Value::UInt(u64::MAX).as_i64(), None);
    assert_eq!(Value::UInt(9).as_i64(), Some(9));
    assert_eq!(Value::F32(0.5).as_f64(), Some(0.5));
    assert_eq!(Value::Int(2).as_f64(), Some(2.0));
    assert_eq!(Value::from("2").as_i64(), None);
}

#[test]
fn map_lookup_first_match_wins() {
    let value = Value::Map(vec![
        (Value::Int(1), Value::from("int key")),
        (Value::from("k"), Value::from(1)),
        (Value::from("k"), Value::from(2)),
    ]);
    assert_eq!(value.get("k"), Some(&Value::Int(1)));
    assert_eq!(value.get("missing"), None);
    assert_eq!(Value::Nil.get("k"), None);
}

#[test]
fn indexing_misses_yield_nil() {
    let value = Value::Array(vec![Value::from(true)]);
    assert_eq!(value[0], Value::Bool(true));
    assert!(value[1].is_nil());
    assert!(value["k"].is_nil());
    assert!(Value::Nil[0]["k"].is_nil());
}

#[test]
fn kind_names() {
    assert_eq!(Value::UInt(1).kind(), "int");
    assert_eq!(Value::Ext(1, vec![]).kind(), "ext");
    assert_eq!(Value::default().kind(), "nil");
}
