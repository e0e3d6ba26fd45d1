use pretty_assertions::assert_eq;

use super::*;

#[test]
fn ordinal_of_method_name() {
    assert_eq!(
        method_ordinal("example", "Foo", "Bar", None),
        Ok("example/Foo.Bar: 0x11ba5d6a0c1185a1 (1277436154363348385)\n".to_owned())
    );
}

#[test]
fn ordinal_through_selector_override() {
    let out = method_ordinal("example", "Foo", "Baz", Some("test.name/Protocol.Method"));
    assert_eq!(
        out,
        Ok("example/Foo.Baz: 0x4db15ea0a12f7942 (5598359855790258498)\n".to_owned())
    );
    let out = method_ordinal("example", "Foo", "Baz", Some("Bar"));
    assert_eq!(
        out,
        Ok("example/Foo.Baz: 0x11ba5d6a0c1185a1 (1277436154363348385)\n".to_owned())
    );
}

#[test]
fn ordinal_rejects_bad_names() {
    assert_eq!(
        method_ordinal("Example", "Foo", "Bar", None),
        Err(CommandError::InvalidLibraryName("Example".to_owned()))
    );
    assert_eq!(
        method_ordinal("a..b", "Foo", "Bar", None),
        Err(CommandError::InvalidLibraryName("a..b".to_owned()))
    );
    assert_eq!(
        method_ordinal("example", "Foo", "_bar", None),
        Err(CommandError::InvalidIdentifier("_bar".to_owned()))
    );
    assert_eq!(
        method_ordinal("example", "Foo", "Bar", Some("lib/Proto")),
        Err(CommandError::InvalidSelector("lib/Proto".to_owned()))
    );
}

#[test]
fn canonical_names_one_per_line() {
    assert_eq!(
        canonical_names(&["FooBar", "HTTPServer", "foo_bar"]),
        Ok("FooBar -> foo_bar\nHTTPServer -> http_server\nfoo_bar -> foo_bar\n".to_owned())
    );
}

#[test]
fn canonical_names_need_valid_input() {
    let none: [&str; 0] = [];
    assert_eq!(
        canonical_names(&none),
        Err(CommandError::MissingArgument("identifier"))
    );
    assert_eq!(
        canonical_names(&["ok", "2bad"]),
        Err(CommandError::InvalidIdentifier("2bad".to_owned()))
    );
}

#[test]
fn explain_known_and_unknown_codes() {
    assert_eq!(
        explain_error("E9002"),
        Ok("E9002 (error): compilation stopped after reaching the error limit".to_owned())
    );
    assert!(explain_error("W3001").is_ok_and(|text| text.starts_with("W3001 (warning): ")));
    assert_eq!(
        explain_error("E0000"),
        Err(CommandError::UnknownErrorCode("E0000".to_owned()))
    );
}

#[test]
fn selector_forms() {
    assert_eq!(
        check_selector("Bar"),
        Ok("Bar: valid method name selector\n".to_owned())
    );
    assert_eq!(
        check_selector("fuchsia.io/Node.Open"),
        Ok("fuchsia.io/Node.Open: valid fully qualified selector\n".to_owned())
    );
    assert_eq!(
        check_selector("Fuchsia/Node.Open"),
        Err(CommandError::InvalidSelector("Fuchsia/Node.Open".to_owned()))
    );
}

#[test]
fn errors_render_for_the_terminal() {
    assert_eq!(
        CommandError::MissingArgument("method").to_string(),
        "missing method"
    );
    assert_eq!(
        CommandError::UnknownErrorCode("X1".to_owned()).to_string(),
        "unknown error code 'X1'"
    );
}
