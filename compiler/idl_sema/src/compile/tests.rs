use idl_diagnostic::ErrorCode;
use pretty_assertions::assert_eq;

use super::{narrow_constant, CompileStep};
use crate::compiler::{CompileConfig, CompileOutput};
use crate::constant::{ConstantValue, ConstantValueKind};
use crate::element::{
    Decl, DeclBody, DeclId, DeclKind, ElementKind, Library, LibraryId, MemberId,
};
use crate::lookup::Lookup;
use crate::problem::SemanticProblem;
use crate::reporter::Reporter;
use crate::resolve::ResolveStep;
use crate::testing::Fixture;
use crate::type_ctor::LayoutParameter;
use crate::typespace::{Nullability, Type, TypeId, Typespace};

fn codes(output: &CompileOutput) -> Vec<ErrorCode> {
    output.problems().iter().map(SemanticProblem::code).collect()
}

fn decl(output: &CompileOutput, library: LibraryId, index: u32) -> &Decl {
    output.libraries.decl(DeclId::new(library, index))
}

fn const_value(output: &CompileOutput, library: LibraryId, index: u32) -> Option<ConstantValue> {
    match &decl(output, library, index).body {
        DeclBody::Const { value, .. } => value.value().cloned(),
        _ => panic!("not a const"),
    }
}

fn member_type(output: &CompileOutput, library: LibraryId, decl: u32, member: u32) -> Option<TypeId> {
    output
        .libraries
        .member(MemberId::new(DeclId::new(library, decl), member))
        .type_ctor()
        .and_then(|ctor| ctor.ty())
}

fn display(fx: &Fixture, output: &CompileOutput, ty: TypeId) -> String {
    output.typespace.display(ty, &output.libraries, &fx.interner)
}

// Constants

#[test]
fn const_takes_its_declared_type() {
    let mut fx = Fixture::new();
    let lib = fx
        .library("test")
        .with_decl(fx.const_decl("A", fx.type_ctor("uint8"), fx.numeric("200")))
        .with_decl(fx.const_decl("B", fx.type_ctor("float64"), fx.numeric("1.5")))
        .with_decl(fx.const_decl("C", fx.type_ctor("bool"), fx.boolean(true)))
        .with_decl(fx.const_decl("D", fx.type_ctor("string"), fx.string("hi")));
    let lib = fx.add(lib);
    let output = fx.compile();
    assert_eq!(codes(&output), vec![]);

    assert_eq!(const_value(&output, lib, 0), Some(ConstantValue::Uint8(200)));
    assert_eq!(const_value(&output, lib, 1), Some(ConstantValue::Float64(1.5)));
    assert_eq!(const_value(&output, lib, 2), Some(ConstantValue::Bool(true)));
    assert_eq!(
        const_value(&output, lib, 3),
        Some(ConstantValue::String("hi".to_owned()))
    );
    let DeclBody::Const { value, .. } = &decl(&output, lib, 0).body else {
        panic!("not a const");
    };
    assert_eq!(value.ty(), Some(TypeId::UINT8));
}

#[test]
fn const_overflow_is_reported() {
    let mut fx = Fixture::new();
    let value = fx.numeric("300");
    let span = value.span;
    let lib = fx
        .library("test")
        .with_decl(fx.const_decl("A", fx.type_ctor("uint8"), value));
    let lib = fx.add(lib);
    let output = fx.compile();

    assert_eq!(
        output.problems(),
        &[SemanticProblem::ConstantOverflow {
            span,
            value: "300".to_owned(),
            ty: "uint8".to_owned(),
        }]
    );
    assert_eq!(const_value(&output, lib, 0), None);
}

#[test]
fn consts_compile_on_demand_and_convert() {
    let mut fx = Fixture::new();
    // `B` names `A` before `A` is declared.
    let lib = fx
        .library("test")
        .with_decl(fx.const_decl("B", fx.type_ctor("uint64"), fx.named("A")))
        .with_decl(fx.const_decl("A", fx.type_ctor("uint32"), fx.numeric("5")))
        .with_decl(fx.const_decl("C", fx.type_ctor("int8"), fx.named("A")));
    let lib = fx.add(lib);
    let output = fx.compile();
    assert_eq!(codes(&output), vec![]);

    assert_eq!(const_value(&output, lib, 0), Some(ConstantValue::Uint64(5)));
    assert_eq!(const_value(&output, lib, 1), Some(ConstantValue::Uint32(5)));
    assert_eq!(const_value(&output, lib, 2), Some(ConstantValue::Int8(5)));
}

#[test]
fn failed_const_is_reported_once() {
    let mut fx = Fixture::new();
    let lib = fx
        .library("test")
        .with_decl(fx.const_decl("A", fx.type_ctor("uint8"), fx.numeric("300")))
        .with_decl(fx.const_decl("B", fx.type_ctor("uint8"), fx.named("A")))
        .with_decl(fx.const_decl("C", fx.type_ctor("uint8"), fx.named("A")));
    fx.add(lib);
    let output = fx.compile();
    assert_eq!(codes(&output), vec![ErrorCode::E2001]);
}

#[test]
fn string_const_respects_its_bound() {
    let mut fx = Fixture::new();
    let bounded = |fx: &Fixture| fx.type_ctor_with("string", vec![], vec![fx.numeric("3")]);
    let too_long = fx.string("abcd");
    let span = too_long.span;
    let lib = fx
        .library("test")
        .with_decl(fx.const_decl("OK", bounded(&fx), fx.string("abc")))
        .with_decl(fx.const_decl("LONG", bounded(&fx), too_long));
    let lib = fx.add(lib);
    let output = fx.compile();

    assert_eq!(
        output.problems(),
        &[SemanticProblem::ConstantOverflow {
            span,
            value: "\"abcd\"".to_owned(),
            ty: "string:3".to_owned(),
        }]
    );
    assert_eq!(
        const_value(&output, lib, 0),
        Some(ConstantValue::String("abc".to_owned()))
    );
}

#[test]
fn const_type_must_be_constable() {
    let mut fx = Fixture::new();
    let optional = fx.type_ctor_with("string", vec![], vec![fx.named("optional")]);
    let vector = fx.type_ctor_with(
        "vector",
        vec![LayoutParameter::Type(fx.type_ctor("uint8"))],
        vec![],
    );
    let lib = fx
        .library("test")
        .with_decl(fx.const_decl("A", optional, fx.string("a")))
        .with_decl(fx.const_decl("B", vector, fx.numeric("1")));
    fx.add(lib);
    let output = fx.compile();

    let types: Vec<&str> = output
        .problems()
        .iter()
        .map(|problem| match problem {
            SemanticProblem::InvalidConstantType { ty, .. } => ty.as_str(),
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(types, vec!["string:optional", "vector<uint8>"]);
}

#[test]
fn const_must_name_a_constant() {
    let mut fx = Fixture::new();
    let lib = fx
        .library("test")
        .with_decl(fx.struct_decl("S", vec![]))
        .with_decl(fx.const_decl("A", fx.type_ctor("uint32"), fx.named("S")));
    fx.add(lib);
    let output = fx.compile();

    assert!(matches!(
        output.problems(),
        [SemanticProblem::ExpectedConstant { name, kind: ElementKind::Struct, .. }]
            if name == "test/S"
    ));
}

#[test]
fn string_cannot_become_a_number() {
    let mut fx = Fixture::new();
    let lib = fx
        .library("test")
        .with_decl(fx.const_decl("A", fx.type_ctor("uint32"), fx.string("x")));
    fx.add(lib);
    let output = fx.compile();

    assert!(matches!(
        output.problems(),
        [SemanticProblem::CannotConvert { from, to, .. }] if from == "string:1" && to == "uint32"
    ));
}

#[test]
fn members_convert_but_named_types_do_not_mix() {
    let mut fx = Fixture::new();
    let lib = fx
        .library("test")
        .with_decl(fx.enum_decl("E1", None, vec![("A", fx.numeric("1"))]))
        .with_decl(fx.enum_decl("E2", None, vec![("B", fx.numeric("1"))]))
        .with_decl(fx.const_decl("SAME", fx.type_ctor("E1"), fx.named("E1.A")))
        .with_decl(fx.const_decl("NUMBER", fx.type_ctor("uint8"), fx.named("E1.A")))
        .with_decl(fx.const_decl("LITERAL", fx.type_ctor("E1"), fx.numeric("7")))
        .with_decl(fx.const_decl("OTHER", fx.type_ctor("E1"), fx.named("E2.B")));
    let lib = fx.add(lib);
    let output = fx.compile();

    assert!(matches!(
        output.problems(),
        [SemanticProblem::MismatchedNameTypeAssignment { expected, found, .. }]
            if expected == "test/E1" && found == "test/E2"
    ));
    assert_eq!(const_value(&output, lib, 2), Some(ConstantValue::Uint32(1)));
    assert_eq!(const_value(&output, lib, 3), Some(ConstantValue::Uint8(1)));
    assert_eq!(const_value(&output, lib, 4), Some(ConstantValue::Uint32(7)));
    assert_eq!(const_value(&output, lib, 5), None);
}

#[test]
fn bits_members_combine_with_or() {
    let mut fx = Fixture::new();
    let flags = fx.bits_decl(
        "F",
        Some(fx.type_ctor("uint8")),
        vec![("A", fx.numeric("1")), ("B", fx.numeric("2"))],
    );
    let both = fx.or(fx.named("F.A"), fx.named("F.B"));
    let lib = fx
        .library("test")
        .with_decl(flags)
        .with_decl(fx.const_decl("BOTH", fx.type_ctor("F"), both))
        .with_decl(fx.const_decl(
            "MASK",
            fx.type_ctor("uint16"),
            fx.or(fx.numeric("4"), fx.numeric("8")),
        ));
    let lib = fx.add(lib);
    let output = fx.compile();
    assert_eq!(codes(&output), vec![]);

    assert_eq!(const_value(&output, lib, 1), Some(ConstantValue::Uint8(3)));
    assert_eq!(const_value(&output, lib, 2), Some(ConstantValue::Uint16(12)));
}

#[test]
fn mismatched_or_operands() {
    let mut fx = Fixture::new();
    let attribute = fx.attribute("flags", vec![(None, fx.or(fx.numeric("1"), fx.boolean(true)))]);
    let lib = fx
        .library("test")
        .with_decl(fx.struct_decl("S", vec![]).with_attributes(fx.attributes(vec![attribute])));
    fx.add(lib);
    let output = fx.compile();

    assert!(matches!(
        output.problems(),
        [SemanticProblem::BinaryOperandsMismatch { left, right, .. }]
            if left == "int64" && right == "bool"
    ));
}

#[test]
fn narrow_untyped_attribute_values() {
    let mut fx = Fixture::new();
    let attribute = fx.attribute(
        "limits",
        vec![(Some("small"), fx.numeric("7")), (Some("big"), fx.numeric("300"))],
    );
    let lib = fx
        .library("test")
        .with_decl(fx.struct_decl("S", vec![]).with_attributes(fx.attributes(vec![attribute])));
    let lib = fx.add(lib);
    let mut output = fx.compile();
    assert_eq!(codes(&output), vec![]);

    let decl = output.libraries.decl_mut(DeclId::new(lib, 0));
    let attribute = decl
        .attributes
        .iter_mut()
        .next()
        .unwrap_or_else(|| panic!("attribute"));
    let (small, big) = match attribute.args.as_mut_slice() {
        [small, big] => (&mut small.value, &mut big.value),
        _ => panic!("two args"),
    };
    assert_eq!(small.ty(), Some(TypeId::UNTYPED_NUMERIC));
    assert_eq!(small.value(), Some(&ConstantValue::Int64(7)));

    narrow_constant(small, TypeId::UINT8, ConstantValueKind::Uint8).unwrap();
    assert_eq!(small.ty(), Some(TypeId::UINT8));
    assert_eq!(small.value(), Some(&ConstantValue::Uint8(7)));
    // Already typed: left alone.
    narrow_constant(small, TypeId::UINT16, ConstantValueKind::Uint16).unwrap();
    assert_eq!(small.ty(), Some(TypeId::UINT8));

    assert!(narrow_constant(big, TypeId::UINT8, ConstantValueKind::Uint8).is_err());
    assert_eq!(big.ty(), Some(TypeId::UNTYPED_NUMERIC));
}

// Bits and enums

#[test]
fn enum_defaults_to_uint32() {
    let mut fx = Fixture::new();
    let lib = fx.library("test").with_decl(fx.enum_decl(
        "E",
        None,
        vec![("A", fx.numeric("1")), ("B", fx.numeric("0x10"))],
    ));
    let lib = fx.add(lib);
    let output = fx.compile();
    assert_eq!(codes(&output), vec![]);

    let e = decl(&output, lib, 0);
    assert_eq!(
        e.body.type_ctor().and_then(|ctor| ctor.ty()),
        Some(TypeId::UINT32)
    );
    let values: Vec<Option<&ConstantValue>> = e
        .members
        .iter()
        .map(|member| member.value().and_then(|value| value.value()))
        .collect();
    assert_eq!(
        values,
        vec![Some(&ConstantValue::Uint32(1)), Some(&ConstantValue::Uint32(16))]
    );
}

#[test]
fn duplicate_enum_values() {
    let mut fx = Fixture::new();
    let lib = fx.library("test").with_decl(fx.enum_decl(
        "E",
        Some(fx.type_ctor("int8")),
        vec![
            ("A", fx.numeric("-1")),
            ("B", fx.numeric("2")),
            ("C", fx.numeric("-1")),
        ],
    ));
    fx.add(lib);
    let output = fx.compile();

    match output.problems() {
        [SemanticProblem::DuplicateMemberValue {
            member,
            previous,
            value,
            ..
        }] => {
            assert_eq!(member, "C");
            assert_eq!(previous, "A");
            assert_eq!(value, "-1");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn bits_members_are_powers_of_two() {
    let mut fx = Fixture::new();
    let lib = fx.library("test").with_decl(fx.bits_decl(
        "F",
        None,
        vec![("A", fx.numeric("1")), ("B", fx.numeric("3")), ("C", fx.numeric("4"))],
    ));
    fx.add(lib);
    let output = fx.compile();

    assert!(matches!(
        output.problems(),
        [SemanticProblem::BitsMemberNotPowerOfTwo { member, value, .. }]
            if member == "B" && value == "3"
    ));
}

#[test]
fn enum_subtype_must_be_integral() {
    let mut fx = Fixture::new();
    let lib = fx
        .library("test")
        .with_decl(fx.enum_decl("E", Some(fx.type_ctor("float32")), vec![]))
        .with_decl(fx.bits_decl("F", Some(fx.type_ctor("string")), vec![]));
    fx.add(lib);
    let output = fx.compile();

    assert_eq!(
        output
            .problems()
            .iter()
            .map(|problem| match problem {
                SemanticProblem::InvalidEnumSubtype { kind, ty, .. } => (*kind, ty.as_str()),
                other => panic!("unexpected {other:?}"),
            })
            .collect::<Vec<_>>(),
        vec![(ElementKind::Enum, "float32"), (ElementKind::Bits, "string")]
    );
}

#[test]
fn bits_subtype_must_be_unsigned() {
    let mut fx = Fixture::new();
    let lib = fx
        .library("test")
        .with_decl(fx.bits_decl("B", Some(fx.type_ctor("int8")), vec![("A", fx.numeric("1"))]))
        .with_decl(fx.bits_decl("U", Some(fx.type_ctor("uint8")), vec![("A", fx.numeric("1"))]))
        .with_decl(fx.enum_decl("E", Some(fx.type_ctor("int8")), vec![("A", fx.numeric("1"))]));
    fx.add(lib);
    let output = fx.compile();

    assert!(
        matches!(
            output.problems(),
            [SemanticProblem::InvalidEnumSubtype { kind: ElementKind::Bits, ty, .. }] if ty == "int8"
        ),
        "{:?}",
        output.problems()
    );
}

#[test]
fn compose_must_name_a_protocol() {
    let mut fx = Fixture::new();
    let lib = fx
        .library("test")
        .with_decl(fx.struct_decl("S", vec![]))
        .with_decl(fx.protocol_decl("Base", vec![fx.method("Ping")]))
        .with_decl(fx.protocol_decl("P", vec![fx.compose("S"), fx.method("M")]))
        .with_decl(fx.protocol_decl("Q", vec![fx.compose("Base")]));
    fx.add(lib);
    let output = fx.compile();

    assert!(
        matches!(
            output.problems(),
            [SemanticProblem::ComposingNonProtocol { name, kind: ElementKind::Struct, .. }]
                if name == "test/S"
        ),
        "{:?}",
        output.problems()
    );
    assert_eq!(
        output.problems()[0].code(),
        ErrorCode::E5004
    );
}

#[test]
fn enum_member_referring_to_itself_is_a_cycle() {
    let mut fx = Fixture::new();
    let lib = fx
        .library("test")
        .with_decl(fx.enum_decl("E", None, vec![("A", fx.named("E.A"))]));
    fx.add(lib);
    let output = fx.compile();

    assert!(matches!(
        output.problems(),
        [SemanticProblem::IncludeCycle { decl, .. }] if decl == "test/E"
    ));
}

// Cycles

#[test]
fn const_cycle_is_reported_once() {
    let mut fx = Fixture::new();
    let back = fx.named("A");
    let span = back.span;
    let lib = fx
        .library("test")
        .with_decl(fx.const_decl("A", fx.type_ctor("uint32"), fx.named("B")))
        .with_decl(fx.const_decl("B", fx.type_ctor("uint32"), back));
    let lib = fx.add(lib);
    let output = fx.compile();

    assert_eq!(
        output.problems(),
        &[SemanticProblem::IncludeCycle {
            span,
            decl: "test/A".to_owned(),
        }]
    );
    assert_eq!(const_value(&output, lib, 0), None);
    assert_eq!(const_value(&output, lib, 1), None);
}

#[test]
fn alias_cycle() {
    let mut fx = Fixture::new();
    let lib = fx
        .library("test")
        .with_decl(fx.alias_decl("X", fx.type_ctor("Y")))
        .with_decl(fx.alias_decl("Y", fx.type_ctor("X")));
    fx.add(lib);
    let output = fx.compile();
    assert_eq!(codes(&output), vec![ErrorCode::E1008]);
}

#[test]
fn structs_may_refer_to_each_other() {
    let mut fx = Fixture::new();
    let lib = fx
        .library("test")
        .with_decl(fx.struct_decl(
            "A",
            vec![("b", fx.type_ctor_with("B", vec![], vec![fx.named("optional")]))],
        ))
        .with_decl(fx.struct_decl(
            "B",
            vec![("a", fx.type_ctor_with("A", vec![], vec![fx.named("optional")]))],
        ));
    fx.add(lib);
    let output = fx.compile();
    assert_eq!(codes(&output), vec![]);
}

// Types

#[test]
fn equal_types_share_an_id() {
    let mut fx = Fixture::new();
    let bytes = |fx: &Fixture| {
        fx.type_ctor_with(
            "vector",
            vec![LayoutParameter::Type(fx.type_ctor("uint8"))],
            vec![fx.numeric("10")],
        )
    };
    let lib = fx
        .library("test")
        .with_decl(fx.alias_decl("Bytes", bytes(&fx)))
        .with_decl(fx.struct_decl("S", vec![("a", bytes(&fx)), ("b", fx.type_ctor("Bytes"))]))
        .with_decl(fx.table_decl("T", vec![("c", bytes(&fx))]));
    let lib = fx.add(lib);
    let output = fx.compile();
    assert_eq!(codes(&output), vec![]);

    let a = member_type(&output, lib, 1, 0);
    assert!(a.is_some());
    assert_eq!(a, member_type(&output, lib, 1, 1));
    assert_eq!(a, member_type(&output, lib, 2, 0));
    assert_eq!(
        a.map(|ty| *output.typespace.get(ty)),
        Some(Type::Vector {
            element: TypeId::UINT8,
            max_size: Some(10),
            nullability: Nullability::Nonnullable,
        })
    );
}

#[test]
fn alias_constraints_layer() {
    let mut fx = Fixture::new();
    let bytes = fx.type_ctor_with(
        "vector",
        vec![LayoutParameter::Type(fx.type_ctor("uint8"))],
        vec![fx.numeric("10")],
    );
    let rebound = fx.type_ctor_with("V", vec![], vec![fx.numeric("20")]);
    let rebound_span = rebound.constraints[0].span;
    let lib = fx
        .library("test")
        .with_decl(fx.struct_decl(
            "S",
            vec![
                ("a", rebound),
                ("b", fx.type_ctor_with("V", vec![], vec![fx.named("optional")])),
            ],
        ))
        .with_decl(fx.alias_decl("V", bytes));
    let lib = fx.add(lib);
    let output = fx.compile();

    assert_eq!(
        output.problems(),
        &[SemanticProblem::CannotBoundTwice {
            span: rebound_span,
            layout: "test/V".to_owned(),
        }]
    );
    let b = member_type(&output, lib, 0, 1).unwrap_or_else(|| panic!("b compiles"));
    assert_eq!(display(&fx, &output, b), "vector<uint8>:<10, optional>");
}

#[test]
fn builtin_max_is_the_unbounded_size() {
    let mut fx = Fixture::new();
    let bounded = fx.type_ctor_with(
        "vector",
        vec![LayoutParameter::Type(fx.type_ctor("uint8"))],
        vec![fx.named("MAX")],
    );
    let unbounded = fx.type_ctor_with(
        "vector",
        vec![LayoutParameter::Type(fx.type_ctor("uint8"))],
        vec![],
    );
    let string = fx.type_ctor_with("string", vec![], vec![fx.named("MAX")]);
    let lib = fx.library("test").with_decl(fx.struct_decl(
        "S",
        vec![("v", bounded), ("w", unbounded), ("s", string)],
    ));
    let lib = fx.add(lib);
    let output = fx.compile();
    assert_eq!(codes(&output), vec![]);

    let v = member_type(&output, lib, 0, 0);
    assert_eq!(v, member_type(&output, lib, 0, 1));
    assert_eq!(
        v.map(|ty| *output.typespace.get(ty)),
        Some(Type::Vector {
            element: TypeId::UINT8,
            max_size: None,
            nullability: Nullability::Nonnullable,
        })
    );
    assert_eq!(member_type(&output, lib, 0, 2), Some(TypeId::UNBOUNDED_STRING));
}

#[test]
fn sizes_from_consts_and_contextual_names() {
    let mut fx = Fixture::new();
    let array = fx.type_ctor_with(
        "array",
        vec![
            LayoutParameter::Type(fx.type_ctor("uint8")),
            LayoutParameter::Type(fx.type_ctor("N")),
        ],
        vec![],
    );
    let vector = fx.type_ctor_with(
        "vector",
        vec![LayoutParameter::Type(fx.type_ctor("bool"))],
        vec![fx.named("LIMIT")],
    );
    let lib = fx
        .library("test")
        .with_decl(fx.const_decl("N", fx.type_ctor("uint32"), fx.numeric("4")))
        .with_decl(fx.const_decl("LIMIT", fx.type_ctor("uint16"), fx.numeric("16")))
        .with_decl(fx.struct_decl("S", vec![("a", array), ("v", vector)]));
    let lib = fx.add(lib);
    let output = fx.compile();
    assert_eq!(codes(&output), vec![]);

    assert_eq!(
        member_type(&output, lib, 2, 0).map(|ty| *output.typespace.get(ty)),
        Some(Type::Array {
            element: TypeId::UINT8,
            size: 4,
        })
    );
    assert_eq!(
        member_type(&output, lib, 2, 1).map(|ty| *output.typespace.get(ty)),
        Some(Type::Vector {
            element: TypeId::BOOL,
            max_size: Some(16),
            nullability: Nullability::Nonnullable,
        })
    );
    let member = output.libraries.member(MemberId::new(DeclId::new(lib, 2), 0));
    let ctor = member.type_ctor().unwrap_or_else(|| panic!("typed member"));
    assert!(matches!(ctor.parameters[1], LayoutParameter::Constant(_)));
}

#[test]
fn layout_errors() {
    let mut fx = Fixture::new();
    let bare_vector = fx.type_ctor("vector");
    let sized_vector = fx.type_ctor_with(
        "vector",
        vec![LayoutParameter::Constant(fx.numeric("5"))],
        vec![],
    );
    let typed_array = fx.type_ctor_with(
        "array",
        vec![
            LayoutParameter::Type(fx.type_ctor("uint8")),
            LayoutParameter::Type(fx.type_ctor("uint16")),
        ],
        vec![],
    );
    let optional_int = fx.type_ctor_with("uint8", vec![], vec![fx.named("optional")]);
    let bounded_int = fx.type_ctor_with("uint8", vec![], vec![fx.numeric("5")]);
    let string = fx.type_ctor_with(
        "string",
        vec![],
        vec![fx.numeric("1"), fx.named("optional"), fx.numeric("2")],
    );
    let twice = fx.type_ctor_with(
        "string",
        vec![],
        vec![fx.named("optional"), fx.named("optional")],
    );
    let lib = fx.library("test").with_decl(fx.struct_decl(
        "S",
        vec![
            ("a", bare_vector),
            ("b", sized_vector),
            ("c", typed_array),
            ("d", optional_int),
            ("e", bounded_int),
            ("f", string),
            ("g", twice),
        ],
    ));
    fx.add(lib);
    let output = fx.compile();

    assert_eq!(
        codes(&output),
        vec![
            ErrorCode::E4001,
            ErrorCode::E4005,
            ErrorCode::E4006,
            ErrorCode::E4003,
            ErrorCode::E4004,
            ErrorCode::E4002,
            ErrorCode::E4011,
        ]
    );
    assert!(matches!(
        &output.problems()[1],
        SemanticProblem::ExpectedType { name, .. } if name == "5"
    ));
    assert!(matches!(
        &output.problems()[5],
        SemanticProblem::TooManyConstraints { max: 2, found: 3, .. }
    ));
}

#[test]
fn value_used_as_type() {
    let mut fx = Fixture::new();
    let ctor = fx.type_ctor("C");
    let span = ctor.span;
    let lib = fx
        .library("test")
        .with_decl(fx.const_decl("C", fx.type_ctor("uint32"), fx.numeric("1")))
        .with_decl(fx.struct_decl("S", vec![("a", ctor)]));
    fx.add(lib);
    let output = fx.compile();

    assert_eq!(
        output.problems(),
        &[SemanticProblem::ExpectedType {
            span,
            name: "test/C".to_owned(),
        }]
    );
}

#[test]
fn boxes_hold_structs() {
    let mut fx = Fixture::new();
    let boxed_int = fx.type_ctor("uint8");
    let span = boxed_int.span;
    let lib = fx
        .library("test")
        .with_decl(fx.struct_decl("Inner", vec![]))
        .with_decl(fx.struct_decl(
            "S",
            vec![
                (
                    "a",
                    fx.type_ctor_with("box", vec![LayoutParameter::Type(fx.type_ctor("Inner"))], vec![]),
                ),
                (
                    "b",
                    fx.type_ctor_with("box", vec![LayoutParameter::Type(boxed_int)], vec![]),
                ),
            ],
        ));
    let lib = fx.add(lib);
    let output = fx.compile();

    assert_eq!(output.problems(), &[SemanticProblem::BoxedTypeMustBeStruct { span }]);
    let boxed = member_type(&output, lib, 1, 0).map(|ty| *output.typespace.get(ty));
    let Some(Type::Box { boxed }) = boxed else {
        panic!("expected a box, got {boxed:?}");
    };
    assert_eq!(
        *output.typespace.get(boxed),
        Type::Identifier {
            decl: DeclId::new(lib, 0),
            kind: DeclKind::Struct,
            nullability: Nullability::Nonnullable,
        }
    );
}

#[test]
fn transport_ends_need_a_protocol() {
    let mut fx = Fixture::new();
    let lib = fx
        .library("test")
        .with_decl(fx.protocol_decl("P", vec![]))
        .with_decl(fx.struct_decl(
            "S",
            vec![
                ("a", fx.type_ctor_with("client_end", vec![], vec![fx.named("P")])),
                (
                    "b",
                    fx.type_ctor_with(
                        "server_end",
                        vec![],
                        vec![fx.named("P"), fx.named("optional")],
                    ),
                ),
                ("c", fx.type_ctor("client_end")),
                ("d", fx.type_ctor_with("client_end", vec![], vec![fx.named("S")])),
            ],
        ));
    let lib = fx.add(lib);
    let output = fx.compile();

    assert_eq!(codes(&output), vec![ErrorCode::E4008, ErrorCode::E4009]);
    let a = member_type(&output, lib, 1, 0).unwrap_or_else(|| panic!("a compiles"));
    let b = member_type(&output, lib, 1, 1).unwrap_or_else(|| panic!("b compiles"));
    assert_eq!(display(&fx, &output, a), "client_end:test/P");
    assert_eq!(display(&fx, &output, b), "server_end:<test/P, optional>");
}

// Handles

/// `enum ObjType { CHANNEL = 4; VMO = 3; }` and `resource handle : uint32`
/// with `subtype ObjType` and `rights uint32` properties.
fn with_handle(fx: &Fixture, library: Library) -> Library {
    library
        .with_decl(fx.enum_decl(
            "ObjType",
            None,
            vec![("CHANNEL", fx.numeric("4")), ("VMO", fx.numeric("3"))],
        ))
        .with_decl(fx.resource_decl(
            "handle",
            fx.type_ctor("uint32"),
            vec![("subtype", fx.type_ctor("ObjType")), ("rights", fx.type_ctor("uint32"))],
        ))
}

#[test]
fn handle_subtype_and_rights() {
    let mut fx = Fixture::new();
    let lib = fx.library("test");
    let lib = with_handle(&fx, lib).with_decl(fx.struct_decl(
        "S",
        vec![
            (
                "h",
                fx.type_ctor_with("handle", vec![], vec![fx.named("VMO"), fx.numeric("5")]),
            ),
            (
                "c",
                fx.type_ctor_with(
                    "handle",
                    vec![],
                    vec![fx.named("CHANNEL"), fx.named("optional")],
                ),
            ),
        ],
    ));
    let lib = fx.add(lib);
    let output = fx.compile();
    assert_eq!(codes(&output), vec![]);

    let resource = DeclId::new(lib, 1);
    let h = member_type(&output, lib, 2, 0).unwrap_or_else(|| panic!("h compiles"));
    assert_eq!(
        *output.typespace.get(h),
        Type::Handle {
            resource,
            subtype: Some(3),
            rights: Some(5),
            nullability: Nullability::Nonnullable,
        }
    );
    let c = member_type(&output, lib, 2, 1).unwrap_or_else(|| panic!("c compiles"));
    assert_eq!(display(&fx, &output, c), "test/handle:<4, optional>");
}

#[test]
fn resource_subtype_must_be_uint32() {
    let mut fx = Fixture::new();
    let lib = fx
        .library("test")
        .with_decl(fx.resource_decl("handle", fx.type_ctor("uint8"), vec![]));
    fx.add(lib);
    let output = fx.compile();

    assert!(matches!(
        output.problems(),
        [SemanticProblem::InvalidEnumSubtype { kind: ElementKind::Resource, ty, .. }]
            if ty == "uint8"
    ));
}

#[test]
fn contextual_name_matching_member_and_decl_is_ambiguous() {
    let mut fx = Fixture::new();
    let lib = fx
        .library("test")
        .with_decl(fx.const_decl("VMO", fx.type_ctor("uint32"), fx.numeric("3")));
    let lib = with_handle(&fx, lib).with_decl(fx.struct_decl(
        "S",
        vec![("h", fx.type_ctor_with("handle", vec![], vec![fx.named("VMO")]))],
    ));
    let lib = fx.add(lib);
    let output = fx.compile();

    match output.problems() {
        [SemanticProblem::AmbiguousContextualReference {
            name, member, decl, ..
        }] => {
            assert_eq!(name, "VMO");
            assert_eq!(member, "test/ObjType.VMO");
            assert_eq!(decl, "test/VMO");
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(member_type(&output, lib, 3, 0), None);
}

#[test]
fn unknown_contextual_name() {
    let mut fx = Fixture::new();
    let vector = fx.type_ctor_with(
        "vector",
        vec![LayoutParameter::Type(fx.type_ctor("uint8"))],
        vec![fx.named("NOPE")],
    );
    let lib = fx.library("test").with_decl(fx.struct_decl("S", vec![("v", vector)]));
    fx.add(lib);
    let output = fx.compile();

    assert!(matches!(
        output.problems(),
        [SemanticProblem::ContextualNameNotFound { name, .. }] if name == "NOPE"
    ));
}

// Attributes

#[test]
fn anonymous_arg_is_named_by_schema() {
    let mut fx = Fixture::new();
    let doc = fx.attribute("doc", vec![(None, fx.string("hello"))]);
    let custom = fx.attribute("custom", vec![(None, fx.numeric("3"))]);
    let lib = fx.library("test").with_decl(
        fx.struct_decl("S", vec![])
            .with_attributes(fx.attributes(vec![doc, custom])),
    );
    let lib = fx.add(lib);
    let output = fx.compile();
    assert_eq!(codes(&output), vec![]);

    let attributes = &decl(&output, lib, 0).attributes;
    let doc = attributes
        .get("doc")
        .and_then(|attribute| attribute.get_arg("value"))
        .unwrap_or_else(|| panic!("doc value"));
    assert_eq!(doc.value.value(), Some(&ConstantValue::String("hello".to_owned())));
    assert_eq!(doc.value.ty(), Some(TypeId::UNBOUNDED_STRING));
    assert!(attributes
        .get("custom")
        .and_then(|attribute| attribute.get_arg("value"))
        .is_some());
}

#[test]
fn doc_comments_compile_to_doc_attributes() {
    let mut fx = Fixture::new();
    let lib = fx.library("test").with_decl(
        fx.struct_decl("S", vec![])
            .with_attributes(fx.attributes(vec![fx.doc_comment(" Says hi.")])),
    );
    let lib = fx.add(lib);
    let output = fx.compile();
    assert_eq!(codes(&output), vec![]);

    let arg = decl(&output, lib, 0)
        .attributes
        .get("doc")
        .and_then(|attribute| attribute.get_arg("value"))
        .unwrap_or_else(|| panic!("doc value"));
    assert_eq!(arg.value.value().and_then(ConstantValue::as_str), Some(" Says hi."));
}

#[test]
fn official_attribute_checks() {
    let mut fx = Fixture::new();
    let misplaced = fx.attribute("selector", vec![(None, fx.string("x"))]);
    let missing = fx.attribute("doc", vec![]);
    let unknown_arg = fx.attribute("discoverable", vec![(Some("path"), fx.string("a"))]);
    let lib = fx
        .library("test")
        .with_decl(
            fx.struct_decl("S", vec![])
                .with_attributes(fx.attributes(vec![misplaced, missing])),
        )
        .with_decl(
            fx.protocol_decl("P", vec![])
                .with_attributes(fx.attributes(vec![unknown_arg])),
        );
    fx.add(lib);
    let output = fx.compile();

    match output.problems() {
        [
            SemanticProblem::InvalidAttributePlacement {
                attribute,
                placement,
                ..
            },
            SemanticProblem::MissingRequiredAttributeArg { arg: missing, .. },
            SemanticProblem::UnknownAttributeArg { arg: unknown, .. },
        ] => {
            assert_eq!(attribute, "selector");
            assert_eq!(*placement, ElementKind::Struct);
            assert_eq!(missing, "value");
            assert_eq!(unknown, "path");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn duplicate_attributes_and_args() {
    let mut fx = Fixture::new();
    let first = fx.attribute("doc", vec![(None, fx.string("a"))]);
    let second = fx.attribute("Doc", vec![(None, fx.string("b"))]);
    let mixed = fx.attribute("custom", vec![(None, fx.string("a")), (Some("b"), fx.string("c"))]);
    let repeated = fx.attribute(
        "other",
        vec![(Some("some_arg"), fx.string("a")), (Some("SomeArg"), fx.string("b"))],
    );
    let lib = fx.library("test").with_decl(
        fx.struct_decl("S", vec![])
            .with_attributes(fx.attributes(vec![first, second, mixed, repeated])),
    );
    fx.add(lib);
    let output = fx.compile();

    assert_eq!(
        codes(&output),
        vec![ErrorCode::E3001, ErrorCode::E3003, ErrorCode::E3002]
    );
}

#[test]
fn unknown_attributes_warn_when_asked() {
    let build = || {
        let mut fx = Fixture::new();
        let lib = fx.library("test").with_decl(
            fx.struct_decl("S", vec![])
                .with_attributes(fx.attributes(vec![fx.attribute("mystery", vec![])])),
        );
        fx.add(lib);
        fx
    };

    let output = build().compile();
    assert!(output.problems().is_empty());

    let strict = CompileConfig {
        allow_unknown_attributes: false,
        ..CompileConfig::default()
    };
    let output = build().compile_with(&strict);
    assert!(matches!(
        output.problems(),
        [SemanticProblem::UnknownAttribute { name, .. }] if name == "mystery"
    ));
    assert!(output.has_errors().is_none());

    let fatal = CompileConfig {
        warnings_as_errors: true,
        ..strict
    };
    assert!(build().compile_with(&fatal).has_errors().is_some());
}

#[test]
fn library_and_member_attributes_are_checked() {
    let mut fx = Fixture::new();
    let method = fx
        .method("M")
        .with_attributes(fx.attributes(vec![fx.attribute("discoverable", vec![])]));
    let mut lib = fx
        .library("test")
        .with_decl(fx.protocol_decl("P", vec![method]));
    lib.attributes = fx.attributes(vec![fx.attribute("no_doc", vec![])]);
    fx.add(lib);
    let output = fx.compile();

    assert!(matches!(
        output.problems(),
        [SemanticProblem::InvalidAttributePlacement {
            placement: ElementKind::ProtocolMethod,
            ..
        }]
    ));
}

// Re-traversal

#[test]
fn second_run_reports_nothing_new() {
    let mut fx = Fixture::new();
    let repeated = || {
        fx.attributes(vec![
            fx.attribute("custom", vec![]),
            fx.attribute("Custom", vec![]),
        ])
    };
    let mut lib = fx
        .library("test")
        .with_decl(fx.struct_decl("S", vec![]).with_attributes(repeated()))
        .with_decl(fx.const_decl("A", fx.type_ctor("uint8"), fx.numeric("300")));
    lib.attributes = repeated();
    fx.add(lib);

    let mut reporter = Reporter::default();
    let mut typespace = Typespace::new();
    let lookup = Lookup::build(&fx.libraries, &fx.interner, &mut reporter);
    ResolveStep::new(&lookup, &fx.interner, &mut reporter).run(&mut fx.libraries);
    let mut first_pass = Vec::new();
    for _ in 0..2 {
        CompileStep::new(
            &mut fx.libraries,
            &lookup,
            &mut typespace,
            &mut reporter,
            &fx.interner,
        )
        .run();
        if first_pass.is_empty() {
            first_pass = reporter.problems().to_vec();
        }
    }

    assert_eq!(reporter.problems(), first_pass.as_slice());
    let codes: Vec<ErrorCode> = reporter.problems().iter().map(SemanticProblem::code).collect();
    assert_eq!(codes, vec![ErrorCode::E3001, ErrorCode::E3001, ErrorCode::E2001]);
}
