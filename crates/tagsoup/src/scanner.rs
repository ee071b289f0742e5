//! Byte-class scanners over the unparsed input suffix.
//!
//! Every function takes the remaining input and returns what it recognized
//! together with the input that follows it. Nothing here allocates except the
//! caller-supplied scratch buffer used for case folding.
//!
//! Names are ASCII-folded only. Non-ASCII bytes pass through untouched.

use crate::tag::Tag;
use std::borrow::Cow;

const fn byte_class(stops: &[u8]) -> [bool; 256] {
    let mut table = [false; 256];
    let mut i = 0;
    while i < stops.len() {
        table[stops[i] as usize] = true;
        i += 1;
    }
    table
}

const SPACE: [bool; 256] = byte_class(b" \t\n\x0c\r");
const IDENT_STOP: [bool; 256] = byte_class(b" \t\n\x0c\r\0\"'>/=");
const UNQUOTED_STOP: [bool; 256] = byte_class(b" \t\n\x0c\r\0\"'=<>`");

fn is_space(byte: u8) -> bool {
    SPACE[byte as usize]
}

/// Drop the leading run of space, tab, newline, form feed and carriage return.
pub fn skip_space(input: &[u8]) -> &[u8] {
    let start = input
        .iter()
        .position(|&b| !is_space(b))
        .unwrap_or(input.len());
    &input[start..]
}

/// A case-folded identifier living in the scanner's scratch buffer.
///
/// The borrow ties it to that buffer, so it cannot outlive the next scan.
/// Use [`Ident::name`] to keep it.
#[derive(Debug)]
pub struct Ident<'s> {
    folded: &'s [u8],
    tag: Option<Tag>,
}

impl<'s> Ident<'s> {
    /// True when no identifier byte was found. Callers treat that as a syntax fault.
    pub fn is_empty(&self) -> bool {
        self.folded.is_empty()
    }

    pub fn tag(&self) -> Option<Tag> {
        self.tag
    }

    /// The folded bytes, valid until the next scan.
    pub fn as_bytes(&self) -> &'s [u8] {
        self.folded
    }

    /// Canonical spelling for known tags, otherwise an owned copy of the folded bytes.
    pub fn name(&self) -> Cow<'static, str> {
        match self.tag {
            Some(tag) => Cow::Borrowed(tag.as_str()),
            None => Cow::Owned(String::from_utf8_lossy(self.folded).into_owned()),
        }
    }
}

/// Scan the longest run of identifier bytes, fold it to ASCII lowercase in
/// `scratch` and look it up in the tag table.
pub fn next_ident<'a, 's>(input: &'a [u8], scratch: &'s mut Vec<u8>) -> (Ident<'s>, &'a [u8]) {
    let len = input
        .iter()
        .position(|&b| IDENT_STOP[b as usize])
        .unwrap_or(input.len());
    let (raw, rest) = input.split_at(len);

    scratch.clear();
    scratch.extend(raw.iter().map(u8::to_ascii_lowercase));
    let tag = if scratch.is_empty() {
        None
    } else {
        Tag::lookup(scratch)
    };

    (
        Ident {
            folded: scratch.as_slice(),
            tag,
        },
        rest,
    )
}

/// A quoted value ran into the end of the input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Unterminated {
    pub quote: u8,
}

/// Scan an attribute value.
///
/// A value opened by `'` or `"` runs to the matching quote, which is consumed
/// and not included. Anything else is an unquoted run, possibly empty.
pub fn next_value(input: &[u8]) -> Result<(&[u8], &[u8]), Unterminated> {
    match input.first() {
        Some(&quote) if quote == b'"' || quote == b'\'' => {
            let body = &input[1..];
            let end = memchr::memchr(quote, body).ok_or(Unterminated { quote })?;
            Ok((&body[..end], &body[end + 1..]))
        }
        _ => {
            let len = input
                .iter()
                .position(|&b| UNQUOTED_STOP[b as usize])
                .unwrap_or(input.len());
            Ok(input.split_at(len))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_space_stops_at_first_non_space() {
        assert_eq!(skip_space(b" \t\r\n\x0cx y"), b"x y");
        assert_eq!(skip_space(b"x"), b"x");
        assert_eq!(skip_space(b"   "), b"");
        // Vertical tab is not HTML whitespace.
        assert_eq!(skip_space(b"\x0bx"), b"\x0bx");
    }

    #[test]
    fn next_ident_folds_and_finds_known_tags() {
        let mut scratch = Vec::new();
        let (ident, rest) = next_ident(b"DiV class=x>", &mut scratch);
        assert_eq!(ident.tag(), Some(Tag::Div));
        assert_eq!(ident.as_bytes(), b"div");
        assert_eq!(ident.name(), "div");
        assert_eq!(rest, b" class=x>");
    }

    #[test]
    fn next_ident_keeps_unknown_names() {
        let mut scratch = Vec::new();
        let (ident, rest) = next_ident(b"My-Widget/>", &mut scratch);
        assert_eq!(ident.tag(), None);
        assert_eq!(ident.name(), "my-widget");
        assert_eq!(rest, b"/>");
    }

    #[test]
    fn next_ident_stops_at_every_delimiter() {
        let mut scratch = Vec::new();
        for stop in [b' ', b'\t', b'\n', b'\x0c', b'\r', 0, b'"', b'\'', b'>', b'/', b'='] {
            let input = [b'a', stop, b'b'];
            let (ident, rest) = next_ident(&input, &mut scratch);
            assert_eq!(ident.as_bytes(), b"a", "stop byte {stop:#x}");
            assert_eq!(rest, &input[1..]);
        }
    }

    #[test]
    fn next_ident_empty_run() {
        let mut scratch = b"stale".to_vec();
        let (ident, rest) = next_ident(b">", &mut scratch);
        assert!(ident.is_empty());
        assert_eq!(ident.tag(), None);
        assert_eq!(rest, b">");

        let (ident, rest) = next_ident(b"", &mut scratch);
        assert!(ident.is_empty());
        assert_eq!(rest, b"");
    }

    #[test]
    fn next_ident_runs_to_end_of_input() {
        let mut scratch = Vec::new();
        let (ident, rest) = next_ident(b"SPAN", &mut scratch);
        assert_eq!(ident.tag(), Some(Tag::Span));
        assert!(rest.is_empty());
    }

    #[test]
    fn next_ident_passes_non_ascii_through() {
        let mut scratch = Vec::new();
        let (ident, _) = next_ident("Ünï>".as_bytes(), &mut scratch);
        assert_eq!(ident.name(), "Ünï");
    }

    #[test]
    fn next_value_quoted() {
        assert_eq!(next_value(b"\"a b\" c"), Ok((&b"a b"[..], &b" c"[..])));
        assert_eq!(next_value(b"'a\"b'>"), Ok((&b"a\"b"[..], &b">"[..])));
        assert_eq!(next_value(b"\"\""), Ok((&b""[..], &b""[..])));
    }

    #[test]
    fn next_value_unterminated_quote() {
        assert_eq!(next_value(b"\"abc"), Err(Unterminated { quote: b'"' }));
        assert_eq!(next_value(b"'"), Err(Unterminated { quote: b'\'' }));
    }

    #[test]
    fn next_value_unquoted() {
        assert_eq!(next_value(b"foo bar"), Ok((&b"foo"[..], &b" bar"[..])));
        assert_eq!(next_value(b"/a/b/>"), Ok((&b"/a/b/"[..], &b">"[..])));
        assert_eq!(next_value(b"x`y"), Ok((&b"x"[..], &b"`y"[..])));
        assert_eq!(next_value(b"x<y"), Ok((&b"x"[..], &b"<y"[..])));
        assert_eq!(next_value(b">"), Ok((&b""[..], &b">"[..])));
        assert_eq!(next_value(b""), Ok((&b""[..], &b""[..])));
    }
}
