//! Static table of known HTML element names.
//!
//! Every name maps to a [`Tag`] and back to its canonical lowercase spelling.
//! Both directions are generated from the same list, so they cannot drift apart.
//! The table is immutable and needs no initialization, which makes it safe to
//! share across any number of concurrent parses.

macro_rules! tags {
    ($($variant:ident => $name:literal,)*) => {
        /// Canonical identity of a known HTML element.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Tag {
            $($variant,)*
        }

        impl Tag {
            /// Every known tag, in table order.
            pub const ALL: &'static [Tag] = &[$(Tag::$variant,)*];

            /// Canonical lowercase spelling.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Tag::$variant => $name,)*
                }
            }

            /// Look up an already-lowercased name.
            ///
            /// Case folding is the caller's job; `b"DIV"` is not found.
            pub fn lookup(name: &[u8]) -> Option<Tag> {
                let name = std::str::from_utf8(name).ok()?;
                match name {
                    $($name => Some(Tag::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

tags! {
    A => "a",
    Abbr => "abbr",
    Acronym => "acronym",
    Address => "address",
    Applet => "applet",
    Area => "area",
    Article => "article",
    Aside => "aside",
    Audio => "audio",
    B => "b",
    Base => "base",
    Basefont => "basefont",
    Bdi => "bdi",
    Bdo => "bdo",
    Bgsound => "bgsound",
    Big => "big",
    Blink => "blink",
    Blockquote => "blockquote",
    Body => "body",
    Br => "br",
    Button => "button",
    Canvas => "canvas",
    Caption => "caption",
    Center => "center",
    Cite => "cite",
    Code => "code",
    Col => "col",
    Colgroup => "colgroup",
    Data => "data",
    Datalist => "datalist",
    Dd => "dd",
    Del => "del",
    Details => "details",
    Dfn => "dfn",
    Dialog => "dialog",
    Dir => "dir",
    Div => "div",
    Dl => "dl",
    Dt => "dt",
    Em => "em",
    Embed => "embed",
    Fieldset => "fieldset",
    Figcaption => "figcaption",
    Figure => "figure",
    Font => "font",
    Footer => "footer",
    Form => "form",
    Frame => "frame",
    Frameset => "frameset",
    H1 => "h1",
    H2 => "h2",
    H3 => "h3",
    H4 => "h4",
    H5 => "h5",
    H6 => "h6",
    Head => "head",
    Header => "header",
    Hgroup => "hgroup",
    Hr => "hr",
    Html => "html",
    I => "i",
    Iframe => "iframe",
    Image => "image",
    Img => "img",
    Input => "input",
    Ins => "ins",
    Isindex => "isindex",
    Kbd => "kbd",
    Keygen => "keygen",
    Label => "label",
    Legend => "legend",
    Li => "li",
    Link => "link",
    Listing => "listing",
    Main => "main",
    Map => "map",
    Mark => "mark",
    Marquee => "marquee",
    Math => "math",
    Menu => "menu",
    Menuitem => "menuitem",
    Meta => "meta",
    Meter => "meter",
    Nav => "nav",
    Nobr => "nobr",
    Noembed => "noembed",
    Noframes => "noframes",
    Noscript => "noscript",
    Object => "object",
    Ol => "ol",
    Optgroup => "optgroup",
    Option => "option",
    Output => "output",
    P => "p",
    Param => "param",
    Picture => "picture",
    Plaintext => "plaintext",
    Pre => "pre",
    Progress => "progress",
    Q => "q",
    Rb => "rb",
    Rp => "rp",
    Rt => "rt",
    Rtc => "rtc",
    Ruby => "ruby",
    S => "s",
    Samp => "samp",
    Script => "script",
    Search => "search",
    Section => "section",
    Select => "select",
    Slot => "slot",
    Small => "small",
    Source => "source",
    Span => "span",
    Strike => "strike",
    Strong => "strong",
    Style => "style",
    Sub => "sub",
    Summary => "summary",
    Sup => "sup",
    Svg => "svg",
    Table => "table",
    Tbody => "tbody",
    Td => "td",
    Template => "template",
    Textarea => "textarea",
    Tfoot => "tfoot",
    Th => "th",
    Thead => "thead",
    Time => "time",
    Title => "title",
    Tr => "tr",
    Track => "track",
    Tt => "tt",
    U => "u",
    Ul => "ul",
    Var => "var",
    Video => "video",
    Wbr => "wbr",
    Xmp => "xmp",
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tag_round_trips_through_its_spelling() {
        for &tag in Tag::ALL {
            assert_eq!(Tag::lookup(tag.as_str().as_bytes()), Some(tag), "{tag:?}");
        }
    }

    #[test]
    fn spellings_are_lowercase_and_unique() {
        let mut seen = std::collections::HashSet::new();
        for &tag in Tag::ALL {
            let name = tag.as_str();
            assert!(!name.bytes().any(|b| b.is_ascii_uppercase()), "{name}");
            assert!(seen.insert(name), "duplicate spelling {name}");
        }
    }

    #[test]
    fn lookup_is_case_sensitive_and_rejects_unknown_names() {
        assert_eq!(Tag::lookup(b"div"), Some(Tag::Div));
        assert_eq!(Tag::lookup(b"DIV"), None);
        assert_eq!(Tag::lookup(b"my-widget"), None);
        assert_eq!(Tag::lookup(b""), None);
        assert_eq!(Tag::lookup(&[0xff, 0xfe]), None);
    }
}
