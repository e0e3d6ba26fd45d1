use idl_ir::{
    AttributeProvenance, Identifier, LiteralKind, RawAttribute, RawAttributeArg, RawConstant,
    RawLiteral, Span, StringInterner,
};
use pretty_assertions::assert_eq;

use super::schema::{official_schema, ArgType};
use super::*;
use crate::element::ElementKind;

fn string_arg(interner: &StringInterner, name: Option<&str>, text: &str) -> RawAttributeArg {
    RawAttributeArg {
        name: name.map(|n| Identifier::new(interner.intern(n), Span::new(0, 1))),
        value: RawConstant::Literal(RawLiteral::new(
            LiteralKind::String,
            format!("\"{text}\""),
            Span::new(2, 3),
        )),
        span: Span::new(0, 3),
    }
}

fn raw(interner: &StringInterner, name: &str, args: Vec<RawAttributeArg>) -> RawAttribute {
    RawAttribute {
        name: Some(Identifier::new(interner.intern(name), Span::new(0, 4))),
        args,
        provenance: AttributeProvenance::Default,
        span: Span::new(0, 10),
    }
}

#[test]
fn lookup_is_canonical() {
    let interner = StringInterner::new();
    let list = AttributeList::from_raw(
        &[
            raw(&interner, "NoDoc", vec![]),
            raw(&interner, "for_deprecated_c_bindings", vec![]),
        ],
        &interner,
    );
    assert_eq!(list.len(), 2);
    assert!(list.get("no_doc").is_some());
    assert!(list.get("noDoc").is_some());
    assert!(list.get("ForDeprecatedCBindings").is_some());
    assert!(list.get("selector").is_none());
}

#[test]
fn doc_comment_is_named_doc() {
    let interner = StringInterner::new();
    let doc = Attribute::from_raw(
        &RawAttribute::doc_comment(" Frobs the widget.", Span::new(5, 25)),
        &interner,
    );
    assert_eq!(doc.canonical_name(), "doc");
    assert_eq!(doc.name, interner.intern("doc"));
    assert_eq!(doc.name_span, None);
    assert_eq!(doc.provenance, AttributeProvenance::DocComment);
    assert!(doc.standalone_anonymous_arg().is_some());
}

#[test]
fn get_arg_matches_canonical_names() {
    let interner = StringInterner::new();
    let attribute = Attribute::from_raw(
        &raw(
            &interner,
            "foo",
            vec![
                string_arg(&interner, Some("MaxSize"), "1"),
                string_arg(&interner, Some("other"), "2"),
            ],
        ),
        &interner,
    );
    assert!(attribute.get_arg("max_size").is_some());
    assert!(attribute.get_arg("maxSize").is_some());
    assert!(attribute.get_arg("missing").is_none());
    assert_eq!(attribute.standalone_anonymous_arg().map(|a| a.span), None);
}

#[test]
fn inferred_name_is_visible_to_get_arg() {
    let interner = StringInterner::new();
    let mut attribute = Attribute::from_raw(
        &raw(&interner, "foo", vec![string_arg(&interner, None, "x")]),
        &interner,
    );
    assert!(attribute.get_arg(DEFAULT_ARG_NAME).is_none());
    attribute.args[0].set_inferred_name(DEFAULT_ARG_NAME);
    attribute.mark_compiled();
    assert!(attribute.get_arg("value").is_some());

    let copy = attribute.clone();
    assert!(!copy.is_compiled());
    assert!(copy.get_arg("value").is_none());
}

#[test]
#[should_panic(expected = "standalone_anonymous_arg called on compiled attribute `foo`")]
fn standalone_anonymous_arg_after_compile_panics() {
    let interner = StringInterner::new();
    let mut attribute = Attribute::from_raw(
        &raw(&interner, "foo", vec![string_arg(&interner, None, "x")]),
        &interner,
    );
    attribute.mark_compiled();
    let _ = attribute.standalone_anonymous_arg();
}

#[test]
fn official_schemas() {
    let doc = official_schema("doc").unwrap();
    assert!(doc.allows(ElementKind::StructMember));
    assert_eq!(doc.anonymous_arg_name(), "value");
    assert_eq!(doc.arg("value").map(|a| a.ty), Some(ArgType::String));

    let selector = official_schema("selector").unwrap();
    assert!(selector.allows(ElementKind::ProtocolMethod));
    assert!(!selector.allows(ElementKind::Struct));

    let discoverable = official_schema("discoverable").unwrap();
    assert_eq!(discoverable.anonymous_arg_name(), "name");

    assert!(official_schema("no_doc").unwrap().args.is_empty());
    assert!(official_schema("foo").is_none());
}
