//! Parse failures. Every fault is fatal to the parse that raised it.

use std::borrow::Cow;
use std::fmt;

/// What the input ended in the middle of.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Eof {
    OpeningTag,
    ClosingTag,
    Comment,
    Doctype,
    AttributeValue,
}

impl fmt::Display for Eof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Eof::OpeningTag => "opening tag",
            Eof::ClosingTag => "closing tag",
            Eof::Comment => "comment",
            Eof::Doctype => "doctype",
            Eof::AttributeValue => "quoted attribute value",
        })
    }
}

/// Where an unexpected byte was found.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ByteContext {
    /// Right after `<`, where a tag name should start.
    OpeningTag,
    /// Where an attribute name should start.
    InTag { tag: Cow<'static, str> },
    /// Right after `</`, where a tag name should start.
    ClosingTag,
    /// After the `/` of `<tag/`, where `>` must follow.
    SelfClosing { tag: Cow<'static, str> },
    /// After the name of a matching close tag, where `>` must follow.
    ClosingTagEnd { tag: Cow<'static, str> },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
    UnexpectedEof(Eof),
    UnexpectedByte { byte: u8, context: ByteContext },
    /// The input ran out, or a close tag for something else arrived, while
    /// `tag` was still open.
    Unclosed { tag: Cow<'static, str> },
    /// A close tag with no open element to close.
    StrayEndTag { tag: Cow<'static, str> },
    TooDeep { limit: usize },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnexpectedEof(what) => {
                write!(f, "unexpected end of input in {what}")
            }
            ParseError::UnexpectedByte { byte, context } => {
                if byte.is_ascii() {
                    write!(f, "unexpected byte {:?} ", char::from(*byte))?;
                } else {
                    write!(f, "unexpected byte {byte:#04x} ")?;
                }
                match context {
                    ByteContext::OpeningTag => f.write_str("at start of tag name"),
                    ByteContext::InTag { tag } => write!(f, "in <{tag}>"),
                    ByteContext::ClosingTag => f.write_str("at start of closing tag name"),
                    ByteContext::SelfClosing { tag } => {
                        write!(f, "after '/' in <{tag}>, expected '>'")
                    }
                    ByteContext::ClosingTagEnd { tag } => {
                        write!(f, "in </{tag}>, expected '>'")
                    }
                }
            }
            ParseError::Unclosed { tag } => write!(f, "unclosed element <{tag}>"),
            ParseError::StrayEndTag { tag } => {
                write!(f, "closing tag </{tag}> without an open element")
            }
            ParseError::TooDeep { limit } => {
                write!(f, "elements nested deeper than {limit}")
            }
        }
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_tag() {
        let err = ParseError::Unclosed {
            tag: Cow::Borrowed("script"),
        };
        assert_eq!(err.to_string(), "unclosed element <script>");

        let err = ParseError::UnexpectedByte {
            byte: b'x',
            context: ByteContext::SelfClosing {
                tag: Cow::Borrowed("br"),
            },
        };
        assert_eq!(err.to_string(), "unexpected byte 'x' after '/' in <br>, expected '>'");
    }

    #[test]
    fn display_shows_non_ascii_bytes_in_hex() {
        let err = ParseError::UnexpectedByte {
            byte: 0xff,
            context: ByteContext::OpeningTag,
        };
        assert_eq!(err.to_string(), "unexpected byte 0xff at start of tag name");

        let err = ParseError::UnexpectedByte {
            byte: 0xe9,
            context: ByteContext::InTag {
                tag: Cow::Borrowed("a"),
            },
        };
        assert_eq!(err.to_string(), "unexpected byte 0xe9 in <a>");
    }

    #[test]
    fn display_eof() {
        assert_eq!(
            ParseError::UnexpectedEof(Eof::AttributeValue).to_string(),
            "unexpected end of input in quoted attribute value"
        );
    }

    #[test]
    fn is_a_std_error() {
        fn assert_error<E: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<ParseError>();
    }
}
