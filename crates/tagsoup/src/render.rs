//! Serialize a tree back to markup.
//!
//! Output is normalized rather than faithful: attribute values are always
//! double-quoted, void elements are written `<br/>`, and doctypes use the
//! upper-case keyword. Anything the builder produced renders to markup the
//! builder accepts again.

use crate::arena::NodeId;
use crate::category::{Category, categorize};
use crate::dom::{Dom, NodeData};
use std::fmt::{self, Write};

/// Render `node` and its subtree.
pub fn render(dom: &Dom, node: NodeId) -> String {
    let mut out = String::new();
    // Writing into a String does not fail.
    let _ = render_to(dom, node, &mut out);
    out
}

enum Step {
    Enter(NodeId),
    Leave(NodeId),
}

/// Render `node` and its subtree into `out`.
///
/// A document node renders as its children. Children of void elements are
/// not rendered.
pub fn render_to<W: Write>(dom: &Dom, node: NodeId, out: &mut W) -> fmt::Result {
    let mut stack = vec![Step::Enter(node)];
    while let Some(step) = stack.pop() {
        let id = match step {
            Step::Enter(id) => id,
            Step::Leave(id) => {
                if let Some(element) = dom.element(id) {
                    write!(out, "</{}>", element.name)?;
                }
                continue;
            }
        };

        let node = &dom[id];
        match &node.data {
            NodeData::Document => {}
            NodeData::Element(element) => {
                write!(out, "<{}", element.name)?;
                for attr in &element.attributes {
                    write!(out, " {}=\"", attr.name)?;
                    escape(&attr.value, out)?;
                    out.write_char('"')?;
                }
                if categorize(element.tag) == Category::Void {
                    out.write_str("/>")?;
                    continue;
                }
                out.write_char('>')?;
                stack.push(Step::Leave(id));
            }
            NodeData::Text(text) => {
                let raw_parent = node
                    .parent()
                    .and_then(|parent| dom.element(parent))
                    .is_some_and(|parent| categorize(parent.tag) == Category::Raw);
                if raw_parent {
                    out.write_str(text)?;
                } else {
                    escape(text, out)?;
                }
                continue;
            }
            NodeData::Comment(text) => {
                write!(out, "<!--{text}-->")?;
                continue;
            }
            NodeData::Doctype(text) => {
                write!(out, "<!DOCTYPE {text}>")?;
                continue;
            }
        }

        let mut child = node.last_child();
        while let Some(c) = child {
            stack.push(Step::Enter(c));
            child = dom[c].prev_sibling();
        }
    }
    Ok(())
}

fn escape<W: Write>(text: &str, out: &mut W) -> fmt::Result {
    let mut start = 0;
    for (i, byte) in text.bytes().enumerate() {
        let replacement = match byte {
            b'&' => "&amp;",
            b'\'' => "&#39;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            b'"' => "&#34;",
            b'\r' => "&#13;",
            _ => continue,
        };
        out.write_str(&text[start..i])?;
        out.write_str(replacement)?;
        start = i + 1;
    }
    out.write_str(&text[start..])
}
