//! Helpers shared by the tagsoup integration tests: tree snapshots, line
//! diffs and the golden-case manifest.

use serde::Deserialize;
use std::collections::BTreeSet;
use std::fmt::Write;
use std::fs;
use std::path::Path;
use tagsoup::{Dom, NodeData, NodeId};

pub const GOLDEN_FORMAT_V1: &str = "tagsoup-golden-v1";

/// Quote `text` for a snapshot line. Control characters are spelled out so
/// every node stays on one line.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ch if ch < ' ' => {
                let _ = write!(out, "\\u{{{:02X}}}", ch as u32);
            }
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

/// One line per node below `node`, indented two spaces per level.
///
/// Elements are `<name>` followed by their attributes on deeper lines as
/// `name="value"`; text is quoted; comments are `<!-- ... -->` and doctypes
/// `<!DOCTYPE ...>`.
pub fn tree_snapshot(dom: &Dom, node: NodeId) -> Vec<String> {
    let mut lines = Vec::new();
    let mut stack: Vec<(NodeId, usize)> = dom.children(node).map(|c| (c, 0)).collect();
    stack.reverse();
    while let Some((id, depth)) = stack.pop() {
        let indent = "  ".repeat(depth);
        match &dom[id].data {
            NodeData::Document => lines.push(format!("{indent}#document")),
            NodeData::Element(element) => {
                let marker = if element.self_closing { "/" } else { "" };
                lines.push(format!("{indent}<{}{marker}>", element.name));
                for attr in &element.attributes {
                    lines.push(format!(
                        "{indent}  {}={}",
                        attr.name,
                        escape_text(&attr.value)
                    ));
                }
            }
            NodeData::Text(text) => lines.push(format!("{indent}{}", escape_text(text))),
            NodeData::Comment(text) => lines.push(format!("{indent}<!-- {text} -->")),
            NodeData::Doctype(text) => lines.push(format!("{indent}<!DOCTYPE {text}>")),
        }
        let children: Vec<NodeId> = dom.children(id).collect();
        stack.extend(children.into_iter().rev().map(|c| (c, depth + 1)));
    }
    lines
}

/// Describe the first differing line with two lines of context each side.
pub fn diff_lines(expected: &[String], actual: &[String]) -> String {
    fn line(lines: &[String], i: usize) -> &str {
        lines.get(i).map(String::as_str).unwrap_or("<missing>")
    }
    let max = expected.len().max(actual.len());
    let mut out = String::new();

    match (0..max).find(|&i| line(expected, i) != line(actual, i)) {
        Some(first) => {
            let start = first.saturating_sub(2);
            let end = (first + 3).min(max);
            let _ = writeln!(out, "first mismatch at line {}:", first + 1);
            for i in start..end {
                let marker = if i == first { ">" } else { " " };
                let _ = writeln!(out, "{marker} {:>4}  expected: {}", i + 1, line(expected, i));
                let _ = writeln!(out, "{marker} {:>4}    actual: {}", i + 1, line(actual, i));
            }
        }
        None => {
            let _ = writeln!(out, "no differing line");
        }
    }
    let _ = writeln!(
        out,
        "expected {} lines, actual {} lines",
        expected.len(),
        actual.len()
    );
    out
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
struct GoldenManifest {
    format: String,
    cases: Vec<GoldenCase>,
}

/// One input and what parsing it must produce.
///
/// A case expects either success (checked through `render` and/or `tree`)
/// or an `error`, compared against the error's display text.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct GoldenCase {
    pub id: String,
    pub input: String,
    #[serde(default)]
    pub render: Option<String>,
    #[serde(default)]
    pub tree: Option<Vec<String>>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Load and validate a golden manifest. Panics on any malformed entry.
pub fn load_golden(path: &Path) -> Vec<GoldenCase> {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|err| panic!("failed to read golden manifest {path:?}: {err}"));
    let manifest: GoldenManifest = toml::from_str(&content)
        .unwrap_or_else(|err| panic!("failed to parse golden manifest {path:?}: {err}"));
    assert_eq!(
        manifest.format, GOLDEN_FORMAT_V1,
        "unsupported golden manifest format in {path:?}"
    );

    let mut ids = BTreeSet::new();
    for case in &manifest.cases {
        assert!(!case.id.trim().is_empty(), "empty id in {path:?}");
        assert!(ids.insert(case.id.as_str()), "duplicate id '{}' in {path:?}", case.id);
        let expects_success = case.render.is_some() || case.tree.is_some();
        assert!(
            expects_success != case.error.is_some(),
            "case '{}' must set `error` or at least one of `render`/`tree`, not both",
            case.id
        );
    }
    manifest.cases
}

/// Case-id substring filter from `TAGSOUP_GOLDEN_FILTER`. Unset matches everything.
pub fn case_filter() -> Option<String> {
    std::env::var("TAGSOUP_GOLDEN_FILTER")
        .ok()
        .filter(|value| !value.trim().is_empty())
}
