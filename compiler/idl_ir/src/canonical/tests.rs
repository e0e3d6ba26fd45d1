use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[test]
fn canonicalize_word_boundaries() {
    assert_eq!(canonicalize("foo"), "foo");
    assert_eq!(canonicalize("FooBar"), "foo_bar");
    assert_eq!(canonicalize("fooBar"), "foo_bar");
    assert_eq!(canonicalize("foo_bar"), "foo_bar");
    assert_eq!(canonicalize("FOO_BAR"), "foo_bar");
    assert_eq!(canonicalize("HTTPServer"), "http_server");
    assert_eq!(canonicalize("foo2Bar"), "foo2_bar");
    assert_eq!(canonicalize("NoDoc"), "no_doc");
}

#[test]
fn canonicalize_collapses_underscores() {
    assert_eq!(canonicalize("foo__bar"), "foo_bar");
    assert_eq!(canonicalize("Foo_Bar"), "foo_bar");
}

#[test]
fn identifier_validity() {
    assert!(is_valid_identifier("Echo"));
    assert!(is_valid_identifier("echo_string2"));
    assert!(!is_valid_identifier(""));
    assert!(!is_valid_identifier("_leading"));
    assert!(!is_valid_identifier("trailing_"));
    assert!(!is_valid_identifier("2d"));
    assert!(!is_valid_identifier("has.dot"));
}

#[test]
fn library_component_validity() {
    assert!(is_valid_library_component("fuchsia"));
    assert!(is_valid_library_component("io2"));
    assert!(!is_valid_library_component("Fuchsia"));
    assert!(!is_valid_library_component("2io"));
    assert!(!is_valid_library_component(""));
}

proptest! {
    #[test]
    fn canonicalize_is_idempotent(ident in "[a-zA-Z][a-zA-Z0-9_]{0,16}") {
        let once = canonicalize(&ident);
        prop_assert_eq!(canonicalize(&once), once);
    }

    #[test]
    fn canonical_form_is_lowercase(ident in "[a-zA-Z][a-zA-Z0-9_]{0,16}") {
        let canonical = canonicalize(&ident);
        prop_assert!(!canonical.bytes().any(|b| b.is_ascii_uppercase()));
    }
}
