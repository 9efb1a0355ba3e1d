use std::fs;

use tempfile::TempDir;

use structured::application::ApplicationError;
use structured::config::{RenderStyle, Settings};
use structured::util::testing;

#[ctor::ctor]
fn init() {
    testing::init_test_setup();
}

#[test]
fn given_local_config_when_loading_then_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("structured.toml");
    fs::write(
        &path,
        r#"
mapped_attrs = ["text"]

[render]
indent = 2
style = "tree"

[simplify]
unwrap = false
"#,
    )
    .unwrap();

    let settings = Settings::load(Some(&path)).unwrap();
    assert_eq!(settings.render.indent, 2);
    assert_eq!(settings.render.style, RenderStyle::Tree);
    assert!(!settings.simplify.unwrap);
    assert_eq!(settings.mapped_attrs, vec!["text"]);
}

#[test]
fn given_missing_local_config_when_loading_then_fails() {
    let dir = TempDir::new().unwrap();
    let result = Settings::load(Some(&dir.path().join("absent.toml")));
    assert!(matches!(result, Err(ApplicationError::OperationFailed { .. })));
}

#[test]
fn given_invalid_local_config_when_loading_then_fails_with_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[render]\nstyle = \"fancy\"\n").unwrap();
    assert!(matches!(
        Settings::load(Some(&path)),
        Err(ApplicationError::Config { .. })
    ));
}

#[test]
fn given_template_when_written_and_loaded_then_defaults_apply() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("template.toml");
    fs::write(&path, Settings::template()).unwrap();

    let settings = Settings::load(Some(&path)).unwrap();
    assert_eq!(settings.render.indent, 4);
}
