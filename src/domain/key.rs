//! Slot identifiers and bracket keys

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use super::error::{StructuredError, StructuredResult};

/// Name of the slot that receives root treatment.
pub const ROOT: &str = "root";

/// Leading character reserved for internal names.
pub const RESERVED_MARKER: char = '_';

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[\p{XID_Start}_]\p{XID_Continue}*$").expect("identifier pattern is valid")
    })
}

/// Whether `name` is a syntactically valid identifier.
pub fn is_identifier(name: &str) -> bool {
    identifier_pattern().is_match(name)
}

/// Check that `name` may be used as a slot key.
///
/// Keys must be non-empty identifiers and must not start with
/// [`RESERVED_MARKER`]. `root` is accepted.
pub fn validate_key(name: &str) -> StructuredResult<()> {
    if name.is_empty() {
        return Err(StructuredError::invalid_key(name, "key is empty"));
    }
    if name.starts_with(RESERVED_MARKER) {
        return Err(StructuredError::invalid_key(
            name,
            format!("substructure keys cannot start with `{RESERVED_MARKER}`"),
        ));
    }
    if !is_identifier(name) {
        return Err(StructuredError::invalid_key(name, "not a valid identifier"));
    }
    Ok(())
}

/// Key used for bracket-style access.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// The `None` sentinel, equivalent to `Name("root")`.
    Root,
    Name(String),
    /// Only meaningful when delegating to a root group.
    Index(usize),
}

impl Key {
    /// True for `Root` and for `Name("root")`.
    pub fn is_root(&self) -> bool {
        match self {
            Key::Root => true,
            Key::Name(name) => name == ROOT,
            Key::Index(_) => false,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Root => write!(f, "None"),
            Key::Name(name) => write!(f, "'{name}'"),
            Key::Index(index) => write!(f, "[{index}]"),
        }
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Name(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Name(name)
    }
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        Key::Index(index)
    }
}

impl From<Option<&str>> for Key {
    fn from(name: Option<&str>) -> Self {
        name.map_or(Key::Root, Key::from)
    }
}

/// Parse a command-line style key: digits become an index, `None` the root sentinel.
impl std::str::FromStr for Key {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "None" {
            return Ok(Key::Root);
        }
        Ok(s.parse::<usize>()
            .map(Key::Index)
            .unwrap_or_else(|_| Key::Name(s.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("a")]
    #[case("root")]
    #[case("lhs_2")]
    #[case("größe")]
    fn valid_keys_pass(#[case] key: &str) {
        assert!(validate_key(key).is_ok());
    }

    #[rstest]
    #[case("")]
    #[case("_hidden")]
    #[case("two words")]
    #[case("1st")]
    #[case("a-b")]
    fn invalid_keys_fail(#[case] key: &str) {
        assert!(matches!(
            validate_key(key),
            Err(StructuredError::InvalidKey { .. })
        ));
    }

    #[test]
    fn parse_key() {
        assert_eq!("None".parse::<Key>().unwrap(), Key::Root);
        assert_eq!("3".parse::<Key>().unwrap(), Key::Index(3));
        assert_eq!("lhs".parse::<Key>().unwrap(), Key::Name("lhs".into()));
        assert!(Key::from("root").is_root());
        assert!(Key::from(None::<&str>).is_root());
    }
}
