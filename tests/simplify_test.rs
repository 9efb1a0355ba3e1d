use std::sync::Arc;

use rstest::rstest;
use serde_json::json;

use structured::domain::{Metadata, SimplifyOptions, Simplified, Slot, Structured, StructuredError};
use structured::util::testing;

#[ctor::ctor]
fn init() {
    testing::init_test_setup();
}

fn wrap(inner: Structured<i64>) -> Structured<i64> {
    Structured::from_root(Slot::nested(inner))
}

#[test]
fn given_bare_root_value_when_simplifying_with_unwrap_then_returns_payload() {
    let mut s = Structured::from_root(Slot::value(5));
    let result = s.simplify(SimplifyOptions::default()).unwrap();
    assert_eq!(result.as_unwrapped(), Some(&Slot::value(5)));
}

#[test]
fn given_bare_root_value_when_simplifying_without_unwrap_then_keeps_container() {
    let mut s = Structured::from_root(Slot::value(5));
    let result = s.simplify(SimplifyOptions::new().unwrap(false)).unwrap();
    let simplified = result.as_structured().unwrap();
    assert_eq!(simplified.root(), Some(&Slot::value(5)));
    assert_eq!(simplified.len(), 1);
}

#[rstest]
#[case(1)]
#[case(3)]
fn given_wrapped_container_when_simplifying_then_wrappers_collapse(#[case] depth: usize) {
    let core = Structured::builder().value("a", 1).value("b", 2).build().unwrap();
    let mut s = (0..depth).fold(core.clone(), |acc, _| wrap(acc));

    let result = s.simplify(SimplifyOptions::new().unwrap(false)).unwrap();
    assert_eq!(result.as_structured(), Some(&core));
}

#[test]
fn given_wrapped_payload_when_simplifying_with_unwrap_then_walks_to_payload() {
    let mut s = wrap(wrap(Structured::from_root(Slot::group([1, 2]))));
    let result = s.simplify(SimplifyOptions::default()).unwrap();
    assert_eq!(result.as_unwrapped(), Some(&Slot::group([1, 2])));
}

#[test]
fn given_nested_wrappers_when_simplifying_recursively_then_nested_slots_unwrap() {
    let s = Structured::builder()
        .nested("a", Structured::from_root(Slot::value(1)))
        .nested("b", wrap(Structured::builder().value("x", 2).build().unwrap()))
        .value("c", 3)
        .build()
        .unwrap();

    let mut deep = s.clone();
    let result = deep.simplify(SimplifyOptions::new().unwrap(false)).unwrap();
    let simplified = result.as_structured().unwrap();
    assert_eq!(simplified.get("a").unwrap(), &Slot::value(1));
    let b = simplified.get("b").unwrap().as_nested().unwrap();
    assert_eq!(b.get("x").unwrap(), &Slot::value(2));
    assert_eq!(simplified.keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);

    let mut shallow = s.clone();
    let result = shallow
        .simplify(SimplifyOptions::new().recurse(false).unwrap(false))
        .unwrap();
    assert_eq!(result.as_structured(), Some(&s));
}

#[test]
fn given_inplace_and_unwrap_when_simplifying_then_fails_untouched() {
    let mut s = wrap(Structured::builder().value("a", 1).build().unwrap());
    let before = s.clone();
    let err = s
        .simplify(SimplifyOptions::new().inplace(true))
        .unwrap_err();
    assert!(matches!(err, StructuredError::InvalidOperation(_)));
    assert_eq!(s, before);
}

#[test]
fn given_inplace_when_simplifying_then_source_is_replaced() {
    let core = Structured::builder().value("a", 1).value("b", 2).build().unwrap();
    let mut s = wrap(wrap(core.clone()));

    let result = s
        .simplify(SimplifyOptions::new().unwrap(false).inplace(true))
        .unwrap();
    assert!(matches!(result, Simplified::InPlace(_)));
    assert_eq!(s, core);
}

#[test]
fn given_side_tables_when_simplifying_then_result_shares_them() {
    let metadata = Metadata::from_iter([("source".to_string(), json!("unit"))]);
    let mut s = Structured::builder()
        .root(Slot::nested(Structured::builder().value("a", 1).build().unwrap()))
        .mapped_attr("len")
        .metadata(metadata)
        .build()
        .unwrap();
    let source_metadata = s.shared_metadata().unwrap();

    let result = s.simplify(SimplifyOptions::new().unwrap(false)).unwrap();
    let simplified = result.as_structured().unwrap();
    assert!(simplified.mapped_attrs().contains("len"));
    assert!(Arc::ptr_eq(&simplified.shared_metadata().unwrap(), &source_metadata));
}

#[test]
fn given_structured_container_when_simplifying_then_equal_to_source() {
    let mut s = Structured::builder()
        .root(Slot::value(0))
        .group("g", [1, 2])
        .build()
        .unwrap();
    let source = s.clone();
    let result = s.simplify(SimplifyOptions::default()).unwrap();
    assert_eq!(result.as_structured(), Some(&source));
}
