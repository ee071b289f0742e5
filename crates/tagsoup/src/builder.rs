//! Single-pass tree builder.
//!
//! The builder walks the input once, left to right, and attaches nodes under
//! the caller's parent as it recognizes them. Nesting follows the literal
//! input: an element is closed only by a close tag naming it, and nothing is
//! ever implied, reordered or repaired.
//!
//! Open elements live on an explicit stack rather than the native call stack,
//! so nesting depth is bounded only by memory (or [`ParserConfig::max_depth`]).
//! Elements whose bodies are raw text are scanned to their close tag as soon as
//! they open and never reach the stack.

use crate::arena::NodeId;
use crate::category::{Category, categorize};
use crate::dom::{Attribute, Dom, ElementData, NodeData};
use crate::entities::decode_entities;
use crate::error::{ByteContext, Eof, ParseError};
use crate::scanner;
use memchr::{memchr, memmem};
use std::borrow::Cow;

#[derive(Clone, Debug, Default)]
pub struct ParserConfig {
    /// Fail with [`ParseError::TooDeep`] once this many elements are open at
    /// once. `None` means unlimited.
    pub max_depth: Option<usize>,
}

/// Counts gathered over one parse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub elements: usize,
    pub texts: usize,
    pub comments: usize,
    pub doctypes: usize,
    /// Deepest element nesting seen, raw-text elements excluded.
    pub max_depth: usize,
}

/// Parse `input` as the children of `parent`.
///
/// On error, children appended before the fault stay attached and the tree
/// under `parent` should be treated as incomplete.
pub fn parse(dom: &mut Dom, parent: NodeId, input: &[u8]) -> Result<(), ParseError> {
    parse_with_config(dom, parent, input, &ParserConfig::default()).map(|_| ())
}

/// [`parse`], returning the [`ParseStats`].
pub fn parse_with_stats(
    dom: &mut Dom,
    parent: NodeId,
    input: &[u8],
) -> Result<ParseStats, ParseError> {
    parse_with_config(dom, parent, input, &ParserConfig::default())
}

pub fn parse_with_config(
    dom: &mut Dom,
    parent: NodeId,
    input: &[u8],
    config: &ParserConfig,
) -> Result<ParseStats, ParseError> {
    let mut builder = TreeBuilder {
        dom,
        config,
        scratch: Vec::new(),
        root: parent,
        open: Vec::new(),
        stats: ParseStats::default(),
    };
    match builder.run(input) {
        Ok(()) => {
            log::debug!(target: "tagsoup.builder", "parsed {} bytes: {:?}", input.len(), builder.stats);
            Ok(builder.stats)
        }
        Err(err) => {
            log::debug!(
                target: "tagsoup.builder",
                "parse failed after {:?}: {err}",
                builder.stats
            );
            Err(err)
        }
    }
}

/// Parse a whole document into a fresh [`Dom`].
pub fn parse_document(input: &[u8]) -> Result<Dom, ParseError> {
    let mut dom = Dom::new();
    let root = dom.root();
    parse(&mut dom, root, input)?;
    Ok(dom)
}

struct TreeBuilder<'d, 'c> {
    dom: &'d mut Dom,
    config: &'c ParserConfig,
    /// Case-folding buffer shared by every identifier scan.
    scratch: Vec<u8>,
    root: NodeId,
    /// Open elements, innermost last. Empty at document level.
    open: Vec<NodeId>,
    stats: ParseStats,
}

impl TreeBuilder<'_, '_> {
    fn current(&self) -> NodeId {
        self.open.last().copied().unwrap_or(self.root)
    }

    fn run(&mut self, mut input: &[u8]) -> Result<(), ParseError> {
        loop {
            let Some(lt) = memchr(b'<', input) else {
                self.push_text(self.current(), input, true);
                return match self.open.last() {
                    Some(&top) => Err(self.unclosed(top)),
                    None => Ok(()),
                };
            };

            let (text, markup) = input.split_at(lt);
            self.push_text(self.current(), text, true);

            input = match markup.get(1) {
                None => return Err(ParseError::UnexpectedEof(Eof::OpeningTag)),
                Some(b'/') => self.close_element(markup)?,
                Some(b'!') => self.markup_declaration(&markup[2..])?,
                Some(_) => self.open_element(&markup[1..])?,
            };
        }
    }

    /// `input` starts just after `<`.
    fn open_element<'a>(&mut self, input: &'a [u8]) -> Result<&'a [u8], ParseError> {
        let input = scanner::skip_space(input);
        let (ident, rest) = scanner::next_ident(input, &mut self.scratch);
        if ident.is_empty() {
            return Err(match rest.first() {
                Some(&byte) => ParseError::UnexpectedByte {
                    byte,
                    context: ByteContext::OpeningTag,
                },
                None => ParseError::UnexpectedEof(Eof::OpeningTag),
            });
        }

        let mut element = ElementData::new(ident.name(), ident.tag());
        let rest = self.scan_attributes(&mut element, rest)?;
        let category = categorize(element.tag);
        let self_closing = element.self_closing;

        log::trace!(
            target: "tagsoup.builder",
            "open <{}> ({category:?}, depth {})",
            element.name,
            self.open.len()
        );
        let parent = self.current();
        let id = self.dom.new_node(NodeData::Element(element));
        self.dom.append_child(parent, id);
        self.stats.elements += 1;

        if self_closing {
            return Ok(rest);
        }
        if category.is_raw_text() {
            return self.raw_text(id, rest, category == Category::EscapableRaw);
        }
        if category.parses_markup() {
            self.push_open(id)?;
        }
        Ok(rest)
    }

    /// Scan attributes through the closing `>` (or `/>`).
    fn scan_attributes<'a>(
        &mut self,
        element: &mut ElementData,
        mut input: &'a [u8],
    ) -> Result<&'a [u8], ParseError> {
        loop {
            input = scanner::skip_space(input);
            match input.first() {
                None => return Err(ParseError::UnexpectedEof(Eof::OpeningTag)),
                Some(b'>') => return Ok(&input[1..]),
                Some(b'/') => {
                    let rest = scanner::skip_space(&input[1..]);
                    return match rest.first() {
                        Some(b'>') => {
                            element.self_closing = true;
                            Ok(&rest[1..])
                        }
                        Some(&byte) => Err(ParseError::UnexpectedByte {
                            byte,
                            context: ByteContext::SelfClosing {
                                tag: element.name.clone(),
                            },
                        }),
                        None => Err(ParseError::UnexpectedEof(Eof::OpeningTag)),
                    };
                }
                Some(&first) => {
                    let (ident, rest) = scanner::next_ident(input, &mut self.scratch);
                    if ident.is_empty() {
                        return Err(ParseError::UnexpectedByte {
                            byte: first,
                            context: ByteContext::InTag {
                                tag: element.name.clone(),
                            },
                        });
                    }
                    let name = ident.name().into_owned();

                    let mut value = String::new();
                    input = scanner::skip_space(rest);
                    if let Some(after_eq) = input.strip_prefix(b"=") {
                        let (raw, rest) = scanner::next_value(scanner::skip_space(after_eq))
                            .map_err(|_| ParseError::UnexpectedEof(Eof::AttributeValue))?;
                        value = String::from_utf8_lossy(raw).into_owned();
                        input = rest;
                    }
                    element.attributes.push(Attribute { name, value });
                }
            }
        }
    }

    /// `input` starts at `</`.
    fn close_element<'a>(&mut self, input: &'a [u8]) -> Result<&'a [u8], ParseError> {
        let Some(&top) = self.open.last() else {
            return Err(self.stray_end_tag(&input[2..]));
        };
        match self.match_close_tag(input, top)? {
            Some(rest) => {
                self.open.pop();
                log::trace!(target: "tagsoup.builder", "close {top:?} (depth {})", self.open.len());
                Ok(rest)
            }
            None => Err(self.unclosed(top)),
        }
    }

    /// Try to read `</name>` closing `element`, starting at `</`.
    ///
    /// `Ok(None)` means the name belongs to some other element and nothing
    /// was consumed. An empty name, or a matching name not followed by `>`,
    /// is an error.
    fn match_close_tag<'a>(
        &mut self,
        input: &'a [u8],
        element: NodeId,
    ) -> Result<Option<&'a [u8]>, ParseError> {
        let (ident, rest) = scanner::next_ident(&input[2..], &mut self.scratch);
        if ident.is_empty() {
            return Err(closing_name_fault(rest));
        }
        let Some(open) = self.dom.element(element) else {
            return Ok(None);
        };
        if !open.is_closed_by(ident.tag(), ident.as_bytes()) {
            return Ok(None);
        }

        let rest = scanner::skip_space(rest);
        match rest.first() {
            Some(b'>') => Ok(Some(&rest[1..])),
            Some(&byte) => Err(ParseError::UnexpectedByte {
                byte,
                context: ByteContext::ClosingTagEnd {
                    tag: open.name.clone(),
                },
            }),
            None => Err(ParseError::UnexpectedEof(Eof::ClosingTag)),
        }
    }

    /// Scan the body of a raw-text element up to its close tag.
    ///
    /// Any `<` that does not start the element's own close tag is literal
    /// text, and so is the byte after it. The body is one contiguous slice,
    /// so a failed close-tag attempt needs no undo beyond moving the search
    /// offset.
    fn raw_text<'a>(
        &mut self,
        element: NodeId,
        body: &'a [u8],
        escapable: bool,
    ) -> Result<&'a [u8], ParseError> {
        let mut offset = 0;
        loop {
            let Some(lt) = memchr(b'<', &body[offset..]).map(|i| offset + i) else {
                return Err(self.unclosed(element));
            };
            match body.get(lt + 1) {
                None => return Err(ParseError::UnexpectedEof(Eof::OpeningTag)),
                Some(b'/') => {
                    if let Some(rest) = self.match_close_tag(&body[lt..], element)? {
                        log::trace!(
                            target: "tagsoup.builder",
                            "raw text of {element:?}: {} bytes",
                            lt
                        );
                        self.push_text(element, &body[..lt], escapable);
                        return Ok(rest);
                    }
                }
                Some(_) => {}
            }
            offset = lt + 2;
        }
    }

    /// `input` starts just after `<!`.
    fn markup_declaration<'a>(&mut self, input: &'a [u8]) -> Result<&'a [u8], ParseError> {
        if input.is_empty() {
            return Err(ParseError::UnexpectedEof(Eof::Comment));
        }

        let (data, rest) = if let Some(body) = input.strip_prefix(b"--") {
            let end = memmem::find(body, b"-->").ok_or(ParseError::UnexpectedEof(Eof::Comment))?;
            (NodeData::Comment(lossy(&body[..end])), &body[end + 3..])
        } else {
            let (ident, after) = scanner::next_ident(input, &mut self.scratch);
            if ident.as_bytes() == b"doctype" {
                let body = scanner::skip_space(after);
                let end = memchr(b'>', body).ok_or(ParseError::UnexpectedEof(Eof::Doctype))?;
                (NodeData::Doctype(lossy(&body[..end])), &body[end + 1..])
            } else {
                // Anything else, CDATA included, is kept as a comment.
                let end = memchr(b'>', input).ok_or(ParseError::UnexpectedEof(Eof::Comment))?;
                (NodeData::Comment(lossy(&input[..end])), &input[end + 1..])
            }
        };

        match data {
            NodeData::Doctype(_) => self.stats.doctypes += 1,
            _ => self.stats.comments += 1,
        }
        let parent = self.current();
        let id = self.dom.new_node(data);
        self.dom.append_child(parent, id);
        Ok(rest)
    }

    fn push_open(&mut self, id: NodeId) -> Result<(), ParseError> {
        if let Some(limit) = self.config.max_depth {
            if self.open.len() >= limit {
                return Err(ParseError::TooDeep { limit });
            }
        }
        self.open.push(id);
        self.stats.max_depth = self.stats.max_depth.max(self.open.len());
        Ok(())
    }

    /// Append a text node unless `raw` is empty.
    fn push_text(&mut self, parent: NodeId, raw: &[u8], decode: bool) {
        if raw.is_empty() {
            return;
        }
        let text = if decode { decode_text(raw) } else { lossy(raw) };
        let id = self.dom.new_node(NodeData::Text(text));
        self.dom.append_child(parent, id);
        self.stats.texts += 1;
    }

    fn unclosed(&self, element: NodeId) -> ParseError {
        let tag = match self.dom.element(element) {
            Some(open) => open.name.clone(),
            None => Cow::Borrowed("#document"),
        };
        ParseError::Unclosed { tag }
    }

    /// A close tag at document level. `input` starts just after `</`.
    fn stray_end_tag(&mut self, input: &[u8]) -> ParseError {
        let (ident, rest) = scanner::next_ident(input, &mut self.scratch);
        if ident.is_empty() {
            return closing_name_fault(rest);
        }
        ParseError::StrayEndTag { tag: ident.name() }
    }
}

fn closing_name_fault(rest: &[u8]) -> ParseError {
    match rest.first() {
        Some(&byte) => ParseError::UnexpectedByte {
            byte,
            context: ByteContext::ClosingTag,
        },
        None => ParseError::UnexpectedEof(Eof::ClosingTag),
    }
}

fn lossy(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

fn decode_text(raw: &[u8]) -> String {
    match String::from_utf8_lossy(raw) {
        Cow::Borrowed(text) => decode_entities(text).into_owned(),
        Cow::Owned(text) => decode_entities(&text).into_owned(),
    }
}
