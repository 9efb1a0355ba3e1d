//! Human-readable rendering: indented text blocks and `termtree` trees

use std::fmt;

use itertools::Itertools;
use termtree::Tree;

use super::key::ROOT;
use super::slot::Slot;
use super::structured::Structured;

/// Text renderer.
///
/// ```text
/// root:
///     [0]:
///         1
///     [1]:
///         2
/// .b:
///     3
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Renderer {
    indent: usize,
}

impl Default for Renderer {
    fn default() -> Self {
        Self { indent: 4 }
    }
}

impl Renderer {
    pub fn new(indent: usize) -> Self {
        Self { indent }
    }

    pub fn render<T: fmt::Display>(&self, structured: &Structured<T>) -> String {
        self.render_with(structured, &|value: &T| value.to_string())
    }

    /// Render with a custom payload formatter, e.g. `Debug` output.
    pub fn render_with<T>(&self, structured: &Structured<T>, format: &dyn Fn(&T) -> String) -> String {
        let pad = " ".repeat(self.indent);
        let mut out = Vec::with_capacity(structured.len() * 2);
        for (key, slot) in structured.entries() {
            if key == ROOT {
                out.push(format!("{ROOT}:"));
            } else {
                out.push(format!(".{key}:"));
            }
            match slot {
                Slot::Group(values) => {
                    for (i, value) in values.iter().enumerate() {
                        out.push(format!("{pad}[{i}]:"));
                        out.push(indent(&format(value), &pad.repeat(2)));
                    }
                }
                Slot::Value(value) => out.push(indent(&format(value), &pad)),
                Slot::Nested(nested) => out.push(indent(&self.render_with(nested, format), &pad)),
            }
        }
        out.join("\n")
    }

    /// Render a single slot, e.g. the payload left by an unwrapping simplify.
    pub fn render_slot<T: fmt::Display>(&self, slot: &Slot<T>) -> String {
        match slot {
            Slot::Value(value) => value.to_string(),
            Slot::Group(values) => {
                let pad = " ".repeat(self.indent);
                values
                    .iter()
                    .enumerate()
                    .map(|(i, value)| format!("[{i}]:\n{}", indent(&value.to_string(), &pad)))
                    .join("\n")
            }
            Slot::Nested(nested) => self.render(nested),
        }
    }
}

/// Prefix every line that is not blank.
fn indent(text: &str, prefix: &str) -> String {
    text.split('\n')
        .map(|line| {
            if line.trim().is_empty() {
                line.to_string()
            } else {
                format!("{prefix}{line}")
            }
        })
        .join("\n")
}

impl<T: fmt::Display> fmt::Display for Structured<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&Renderer::default().render(self))
    }
}

impl<T: fmt::Display> Structured<T> {
    /// Tree view with `label` at the top.
    pub fn to_tree(&self, label: impl Into<String>) -> Tree<String> {
        Tree::new(label.into()).with_leaves(self.tree_leaves())
    }

    fn tree_leaves(&self) -> Vec<Tree<String>> {
        self.entries()
            .map(|(key, slot)| {
                let label = if key == ROOT {
                    ROOT.to_string()
                } else {
                    format!(".{key}")
                };
                let children = match slot {
                    Slot::Value(value) => vec![Tree::new(value.to_string())],
                    Slot::Group(values) => values
                        .iter()
                        .enumerate()
                        .map(|(i, value)| {
                            Tree::new(format!("[{i}]")).with_leaves([Tree::new(value.to_string())])
                        })
                        .collect(),
                    Slot::Nested(nested) => nested.tree_leaves(),
                };
                Tree::new(label).with_leaves(children)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Structured<i64> {
        Structured::builder()
            .root(Slot::group([1, 2]))
            .value("b", 3)
            .group("c", [4, 5])
            .build()
            .unwrap()
    }

    #[test]
    fn renders_blocks_root_first() {
        let expected = "\
root:
    [0]:
        1
    [1]:
        2
.b:
    3
.c:
    [0]:
        4
    [1]:
        5";
        assert_eq!(sample().to_string(), expected);
    }

    #[test]
    fn renders_nested_indented() {
        let inner = Structured::builder().value("x", 1).build().unwrap();
        let s = Structured::builder().nested("a", inner).build().unwrap();
        assert_eq!(Renderer::new(2).render(&s), ".a:\n  .x:\n    1");
    }

    #[test]
    fn renders_with_custom_formatter() {
        let s = Structured::builder().value("name", "y").build().unwrap();
        let out = Renderer::default().render_with(&s, &|v: &&str| format!("{v:?}"));
        assert_eq!(out, ".name:\n    \"y\"");
    }

    #[test]
    fn tree_lists_every_slot() {
        let tree = sample().to_tree("sample").to_string();
        assert!(tree.starts_with("sample\n"));
        for label in ["root", ".b", ".c", "[1]", "5"] {
            assert!(tree.contains(label), "missing {label} in\n{tree}");
        }
    }
}
