use super::*;

#[test]
fn test_intern_and_lookup() {
    let interner = StringInterner::new();

    let echo = interner.intern("Echo");
    let method = interner.intern("EchoString");
    let echo2 = interner.intern("Echo");

    assert_eq!(echo, echo2);
    assert_ne!(echo, method);
    assert_eq!(interner.lookup(echo), "Echo");
    assert_eq!(interner.lookup(method), "EchoString");
}

#[test]
fn test_empty_string() {
    let interner = StringInterner::new();
    assert_eq!(interner.intern(""), Name::EMPTY);
    assert_eq!(interner.lookup(Name::EMPTY), "");
}

#[test]
fn test_vocabulary_pre_interned() {
    let interner = StringInterner::new();
    assert!(interner.get("vector").is_some());
    assert!(interner.get("selector").is_some());
    assert!(interner.get("NotInterned").is_none());
    assert!(!interner.is_empty());
}

#[test]
fn test_get_does_not_insert() {
    let interner = StringInterner::new();
    let before = interner.len();
    assert!(interner.get("fresh").is_none());
    assert_eq!(interner.len(), before);
    let fresh = interner.intern("fresh");
    assert_eq!(interner.get("fresh"), Some(fresh));
    assert_eq!(interner.len(), before + 1);
}

