use idl_ir::{LiteralKind, RawLiteral, Span};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;
use crate::typespace::TypeId;

#[test]
fn integer_conversion_checks_range() {
    let value = ConstantValue::Int64(300);
    assert_eq!(
        value.convert(ConstantValueKind::Uint16),
        Ok(ConstantValue::Uint16(300))
    );
    assert_eq!(
        value.convert(ConstantValueKind::Uint8),
        Err(ConstantError::Overflow {
            value: "300".to_owned(),
            target: ConstantValueKind::Uint8,
        })
    );
    assert!(ConstantValue::Int8(-1)
        .convert(ConstantValueKind::Uint64)
        .is_err());
}

#[test]
fn size_aliases_behave_like_uint64() {
    let value = ConstantValue::Uint64(u64::MAX);
    assert_eq!(
        value.convert(ConstantValueKind::ZxUsize64),
        Ok(ConstantValue::ZxUsize64(u64::MAX))
    );
    assert_eq!(
        ConstantValue::ZxUintptr64(7).convert(ConstantValueKind::Int8),
        Ok(ConstantValue::Int8(7))
    );
}

#[test]
fn floats_never_become_integers() {
    assert_eq!(
        ConstantValue::Float64(1.0).convert(ConstantValueKind::Int32),
        Err(ConstantError::KindMismatch {
            from: ConstantValueKind::Float64,
            to: ConstantValueKind::Int32,
        })
    );
}

#[test]
fn integers_widen_to_floats() {
    assert_eq!(
        ConstantValue::Int32(-4).convert(ConstantValueKind::Float32),
        Ok(ConstantValue::Float32(-4.0))
    );
    assert!(ConstantValue::Float64(1e300)
        .convert(ConstantValueKind::Float32)
        .is_err());
}

#[test]
fn non_numeric_kinds_convert_only_to_themselves() {
    let text = ConstantValue::String("hi".to_owned());
    assert_eq!(text.convert(ConstantValueKind::String), Ok(text.clone()));
    assert!(text.convert(ConstantValueKind::DocComment).is_err());
    assert!(ConstantValue::Bool(true)
        .convert(ConstantValueKind::Uint8)
        .is_err());
    assert!(ConstantValue::Uint8(1)
        .convert(ConstantValueKind::Bool)
        .is_err());
}

#[test]
fn bitwise_or_requires_same_kind() {
    let a = ConstantValue::Uint32(0b0101);
    let b = ConstantValue::Uint32(0b0010);
    assert_eq!(a.bitwise_or(&b), Ok(ConstantValue::Uint32(0b0111)));
    assert_eq!(
        a.bitwise_or(&ConstantValue::Uint8(1)),
        Err(ConstantError::OperandMismatch {
            left: ConstantValueKind::Uint32,
            right: ConstantValueKind::Uint8,
        })
    );
    assert!(ConstantValue::Float64(1.0)
        .bitwise_or(&ConstantValue::Float64(2.0))
        .is_err());
}

#[test]
fn numeric_literal_forms() {
    assert_eq!(
        numeric_value("0x2A", ConstantValueKind::Uint8),
        Ok(ConstantValue::Uint8(42))
    );
    assert_eq!(
        numeric_value("0b101", ConstantValueKind::Int16),
        Ok(ConstantValue::Int16(5))
    );
    assert_eq!(
        numeric_value("-128", ConstantValueKind::Int8),
        Ok(ConstantValue::Int8(-128))
    );
    assert_eq!(
        numeric_value("1.5", ConstantValueKind::Float64),
        Ok(ConstantValue::Float64(1.5))
    );
    assert_eq!(
        numeric_value("3", ConstantValueKind::Float32),
        Ok(ConstantValue::Float32(3.0))
    );
}

#[test]
fn numeric_literal_errors() {
    assert!(matches!(
        numeric_value("-1", ConstantValueKind::Uint32),
        Err(ConstantError::Overflow { .. })
    ));
    assert!(matches!(
        numeric_value("2.5", ConstantValueKind::Uint32),
        Err(ConstantError::KindMismatch { .. })
    ));
    // No octal form; a leading zero is still decimal.
    assert_eq!(
        numeric_value("017", ConstantValueKind::Int64),
        Ok(ConstantValue::Int64(17))
    );
    for bad in ["", "-", "0x", "12ab", "1..2", "nan", "0b2", "0o17"] {
        assert_eq!(
            numeric_value(bad, ConstantValueKind::Int64),
            Err(ConstantError::MalformedLiteral(bad.to_owned())),
            "{bad:?}"
        );
    }
}

#[test]
fn untyped_numeric_inference() {
    assert_eq!(untyped_numeric_value("5"), Ok(ConstantValue::Int64(5)));
    assert_eq!(
        untyped_numeric_value("18446744073709551615"),
        Ok(ConstantValue::Uint64(u64::MAX))
    );
    assert_eq!(untyped_numeric_value("0.25"), Ok(ConstantValue::Float64(0.25)));
    assert!(untyped_numeric_value("18446744073709551616").is_err());
}

#[test]
fn clone_drops_compiled_value() {
    let mut constant = Constant::literal(RawLiteral::new(
        LiteralKind::Numeric,
        "4",
        Span::new(0, 1),
    ));
    constant.set_resolved(ConstantValue::Uint8(4), TypeId::UINT8);
    assert!(constant.is_compiled());
    assert_eq!(constant.value(), Some(&ConstantValue::Uint8(4)));

    let copy = constant.clone();
    assert!(!copy.is_compiled());
    assert_eq!(copy.value(), None);
    assert_eq!(copy.span, constant.span);
}

proptest! {
    #[test]
    fn integral_conversion_matches_try_from(value in any::<i64>()) {
        let converted = ConstantValue::Int64(value).convert(ConstantValueKind::Uint32);
        match u32::try_from(value) {
            Ok(expected) => prop_assert_eq!(converted, Ok(ConstantValue::Uint32(expected))),
            Err(_) => prop_assert!(converted.is_err()),
        }
    }

    #[test]
    fn decimal_literals_parse_exactly(value in any::<i32>()) {
        prop_assert_eq!(
            numeric_value(&value.to_string(), ConstantValueKind::Int32),
            Ok(ConstantValue::Int32(value))
        );
    }
}
