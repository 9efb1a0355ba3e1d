use std::fs;
use std::path::Path;

use rstest::rstest;
use tempfile::TempDir;

use structured::application::{ApplicationError, Document, Format, Scalar};
use structured::domain::{Attribute, Renderer, Slot, SlotRef};
use structured::util::testing;

#[ctor::ctor]
fn init() {
    testing::init_test_setup();
}

const TOML_DOC: &str = r#"
root = ["x", "y"]
name = "model"

[terms]
lhs = ["y"]
rhs = ["a", "b", "c"]
"#;

fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[rstest]
#[case("doc.toml", Format::Toml)]
#[case("doc.json", Format::Json)]
fn given_known_extension_when_detecting_format_then_matches(
    #[case] name: &str,
    #[case] expected: Format,
) {
    assert_eq!(Format::from_path(Path::new(name)).unwrap(), expected);
}

#[test]
fn given_unknown_extension_when_loading_then_fails_with_unsupported_format() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "doc.yaml", "a: 1");
    assert!(matches!(
        Document::load(&path),
        Err(ApplicationError::UnsupportedFormat(p)) if p == path
    ));
}

#[test]
fn given_missing_file_when_loading_then_fails_with_context() {
    let dir = TempDir::new().unwrap();
    let err = Document::load(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ApplicationError::OperationFailed { .. }));
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn given_toml_file_when_loading_then_structure_and_metadata_are_set() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "model.toml", TOML_DOC);

    let document = Document::load(&path).unwrap();
    assert_eq!(document.path(), Some(path.as_path()));

    let s = document.structured();
    assert_eq!(s.keys().collect::<Vec<_>>(), vec!["root", "name", "terms"]);
    assert_eq!(
        s.index("root").unwrap(),
        SlotRef::Group(&[Scalar::from("x"), Scalar::from("y")])
    );
    let terms = s.get("terms").unwrap().as_nested().unwrap();
    assert_eq!(terms.get("rhs").unwrap().as_group().map(<[Scalar]>::len), Some(3));

    let metadata = s.metadata().unwrap();
    assert_eq!(metadata["format"], "toml");
    assert_eq!(metadata["source"], path.display().to_string());
}

#[test]
fn given_json_file_when_loading_then_types_are_preserved() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "values.json",
        r#"{"flag": true, "count": 3, "ratio": 0.5, "label": "x", "nothing": null}"#,
    );

    let document = Document::load(&path).unwrap();
    let kinds: Vec<_> = document
        .structured()
        .iter()
        .filter_map(|item| item.as_value().map(Scalar::type_name))
        .collect();
    assert_eq!(kinds, vec!["bool", "int", "float", "text", "null"]);
}

#[test]
fn given_mapped_attrs_when_reading_attribute_then_projects_onto_leaves() {
    let document = Document::from_toml_str(TOML_DOC)
        .unwrap()
        .with_mapped_attrs(["len"]);

    let projected = document
        .structured()
        .attr("len")
        .unwrap()
        .into_mapped()
        .unwrap();
    assert_eq!(projected.get("name").unwrap(), &Slot::value(Scalar::Int(5)));
    let terms = projected.get("terms").unwrap().as_nested().unwrap();
    assert_eq!(
        terms.get("rhs").unwrap(),
        &Slot::group([Scalar::Int(1), Scalar::Int(1), Scalar::Int(1)])
    );
}

#[test]
fn given_null_leaf_when_projecting_len_then_zero() {
    let document = Document::from_json_str(r#"{"nothing": null, "flag": false, "word": "abc"}"#)
        .unwrap()
        .with_mapped_attrs(["len"]);
    let projected = document.structured().attr("len").unwrap().into_mapped().unwrap();
    assert_eq!(projected.get("nothing").unwrap(), &Slot::value(Scalar::Int(0)));
    assert_eq!(projected.get("flag").unwrap(), &Slot::value(Scalar::Int(1)));
    assert_eq!(projected.get("word").unwrap(), &Slot::value(Scalar::Int(3)));
}

#[test]
fn given_stored_slot_when_reading_mapped_name_then_slot_wins() {
    let document = Document::from_toml_str("len = 7\nother = \"abc\"")
        .unwrap()
        .with_mapped_attrs(["len"]);
    let attr = document.structured().attr("len").unwrap();
    assert!(matches!(attr, Attribute::Slot(slot) if slot == &Slot::value(Scalar::Int(7))));
}

#[test]
fn given_unregistered_name_when_reading_attribute_then_not_found() {
    let document = Document::from_toml_str(TOML_DOC).unwrap();
    let err = document.structured().attr("len").unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn given_document_when_converting_to_json_then_root_first_and_nested() {
    let document = Document::from_toml_str(TOML_DOC).unwrap();
    let value: serde_json::Value = serde_json::from_str(&document.to_json(true).unwrap()).unwrap();

    assert_eq!(
        value,
        serde_json::json!({
            "root": ["x", "y"],
            "name": "model",
            "terms": {"lhs": ["y"], "rhs": ["a", "b", "c"]}
        })
    );
    let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys, vec!["root", "name", "terms"]);
}

#[test]
fn given_document_when_rendering_then_uses_root_and_dotted_keys() {
    let document = Document::from_toml_str("root = 1\nb = [2, 3]").unwrap();
    let text = Renderer::new(2).render(document.structured());
    assert_eq!(text, "root:\n  1\n.b:\n  [0]:\n    2\n  [1]:\n    3");
}

#[test]
fn given_malformed_content_when_parsing_then_fails_with_parse_error() {
    assert!(matches!(
        Document::from_json_str("{not json"),
        Err(ApplicationError::Parse { format: "json", .. })
    ));
    assert!(matches!(
        Document::from_toml_str("= broken"),
        Err(ApplicationError::Parse { format: "toml", .. })
    ));
}
