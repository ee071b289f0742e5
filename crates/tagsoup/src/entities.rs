//! Character reference decoding for text content.
//!
//! Contract:
//! - Named references decode when followed by `;` and present in the table
//!   (`&alpha;`, `&AMP;`). Names are case-sensitive.
//! - Without `;`, only the legacy names decode (`&amp`, `&lt`, `&copy`, the
//!   Latin-1 letters, ...). The longest legacy prefix of the alphanumeric run
//!   wins, so `&ampx` becomes `&x` while `&alpha` stays literal.
//! - Numeric references `&#NNN` / `&#xHH` decode with or without `;`. C1
//!   controls (0x80..=0x9F) are remapped through Windows-1252; zero, surrogates
//!   and values above U+10FFFF become U+FFFD.
//! - Everything else passes through unchanged.

use memchr::memchr;
use std::borrow::Cow;

/// Longest legacy name ("frac12", "atilde", ...).
const LONGEST_LEGACY: usize = 6;

/// Decode character references in `s`. Borrows when there is nothing to decode.
pub fn decode_entities(s: &str) -> Cow<'_, str> {
    let bytes = s.as_bytes();
    let Some(first) = memchr(b'&', bytes) else {
        return Cow::Borrowed(s);
    };

    let mut out = String::with_capacity(s.len());
    let mut copy_start = 0;
    let mut i = first;

    while i < bytes.len() {
        if bytes[i] != b'&' {
            i += memchr(b'&', &bytes[i..]).unwrap_or(bytes.len() - i);
            continue;
        }

        let decoded = if bytes.get(i + 1) == Some(&b'#') {
            numeric_reference(bytes, i)
        } else {
            named_reference(s, i)
        };

        match decoded {
            Some((replacement, end)) => {
                out.push_str(&s[copy_start..i]);
                replacement.push_to(&mut out);
                i = end;
                copy_start = end;
            }
            // Left as is; the bytes get flushed with the next copy.
            None => i += 1,
        }
    }

    if copy_start == 0 {
        return Cow::Borrowed(s);
    }
    out.push_str(&s[copy_start..]);
    Cow::Owned(out)
}

/// Replacement text for a reference.
enum Replacement {
    Char(char),
    Str(&'static str),
}

impl Replacement {
    fn push_to(&self, out: &mut String) {
        match self {
            Replacement::Char(c) => out.push(*c),
            Replacement::Str(s) => out.push_str(s),
        }
    }
}

/// `&#...` starting at `start`. Returns the replacement and the index just past it.
fn numeric_reference(bytes: &[u8], start: usize) -> Option<(Replacement, usize)> {
    let mut j = start + 2;
    let hex = matches!(bytes.get(j), Some(b'x' | b'X'));
    if hex {
        j += 1;
    }
    let digits_start = j;
    let radix = if hex { 16 } else { 10 };

    // Saturates instead of overflowing; anything past U+10FFFF becomes U+FFFD anyway.
    let mut value: u32 = 0;
    while let Some(digit) = bytes.get(j).and_then(|&b| (b as char).to_digit(radix)) {
        value = value.saturating_mul(radix).saturating_add(digit);
        j += 1;
    }
    if j == digits_start {
        return None;
    }
    if bytes.get(j) == Some(&b';') {
        j += 1;
    }

    Some((Replacement::Char(numeric_char(value)), j))
}

fn numeric_char(value: u32) -> char {
    if (0x80..=0x9f).contains(&value) {
        return WINDOWS_1252[(value - 0x80) as usize];
    }
    match value {
        0 => '\u{FFFD}',
        _ => char::from_u32(value).unwrap_or('\u{FFFD}'),
    }
}

/// `&name` starting at `start`.
fn named_reference(s: &str, start: usize) -> Option<(Replacement, usize)> {
    let bytes = s.as_bytes();
    let name_start = start + 1;
    let name_end = bytes[name_start..]
        .iter()
        .position(|b| !b.is_ascii_alphanumeric())
        .map_or(bytes.len(), |n| name_start + n);
    let name = &s[name_start..name_end];
    if name.is_empty() {
        return None;
    }

    let terminated = bytes.get(name_end) == Some(&b';');
    if terminated {
        if let Some(value) = lookup_named(name) {
            return Some((Replacement::Str(value), name_end + 1));
        }
    }

    // Without a terminator only legacy names count, longest prefix first. An
    // unterminated full-length name is included since it was never looked up.
    let longest = if terminated {
        name.len()
    } else {
        name.len() + 1
    };
    for len in (2..longest.min(LONGEST_LEGACY + 1)).rev() {
        let prefix = &name[..len];
        if is_legacy(prefix) {
            let value = lookup_named(prefix)?;
            return Some((Replacement::Str(value), name_start + len));
        }
    }
    None
}

const WINDOWS_1252: [char; 32] = [
    '\u{20AC}', '\u{0081}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{008D}', '\u{017D}', '\u{008F}',
    '\u{0090}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\u{009D}', '\u{017E}', '\u{0178}',
];

/// Names that decode without a trailing `;`.
fn is_legacy(name: &str) -> bool {
    matches!(
        name,
        "AElig" | "AMP" | "Aacute" | "Acirc" | "Agrave" | "Aring" | "Atilde" | "Auml"
            | "COPY" | "Ccedil" | "ETH" | "Eacute" | "Ecirc" | "Egrave" | "Euml" | "GT"
            | "Iacute" | "Icirc" | "Igrave" | "Iuml" | "LT" | "Ntilde" | "Oacute" | "Ocirc"
            | "Ograve" | "Oslash" | "Otilde" | "Ouml" | "QUOT" | "REG" | "THORN" | "Uacute"
            | "Ucirc" | "Ugrave" | "Uuml" | "Yacute" | "aacute" | "acirc" | "acute" | "aelig"
            | "agrave" | "amp" | "aring" | "atilde" | "auml" | "brvbar" | "ccedil" | "cedil"
            | "cent" | "copy" | "curren" | "deg" | "divide" | "eacute" | "ecirc" | "egrave"
            | "eth" | "euml" | "frac12" | "frac14" | "frac34" | "gt" | "iacute" | "icirc"
            | "iexcl" | "igrave" | "iquest" | "iuml" | "laquo" | "lt" | "macr" | "micro"
            | "middot" | "nbsp" | "not" | "ntilde" | "oacute" | "ocirc" | "ograve" | "ordf"
            | "ordm" | "oslash" | "otilde" | "ouml" | "para" | "plusmn" | "pound" | "quot"
            | "raquo" | "reg" | "sect" | "shy" | "sup1" | "sup2" | "sup3" | "szlig" | "thorn"
            | "times" | "uacute" | "ucirc" | "ugrave" | "uml" | "uuml" | "yacute" | "yen"
            | "yuml"
    )
}

/// Named references, keyed without the `;`.
fn lookup_named(name: &str) -> Option<&'static str> {
    let value = match name {
        // Markup-significant
        "amp" | "AMP" => "&",
        "lt" | "LT" => "<",
        "gt" | "GT" => ">",
        "quot" | "QUOT" => "\"",
        "apos" => "'",
        // Latin-1 symbols
        "nbsp" => "\u{00A0}",
        "iexcl" => "\u{00A1}",
        "cent" => "\u{00A2}",
        "pound" => "\u{00A3}",
        "curren" => "\u{00A4}",
        "yen" => "\u{00A5}",
        "brvbar" => "\u{00A6}",
        "sect" => "\u{00A7}",
        "uml" => "\u{00A8}",
        "copy" | "COPY" => "\u{00A9}",
        "ordf" => "\u{00AA}",
        "laquo" => "\u{00AB}",
        "not" => "\u{00AC}",
        "shy" => "\u{00AD}",
        "reg" | "REG" => "\u{00AE}",
        "macr" => "\u{00AF}",
        "deg" => "\u{00B0}",
        "plusmn" => "\u{00B1}",
        "sup2" => "\u{00B2}",
        "sup3" => "\u{00B3}",
        "acute" => "\u{00B4}",
        "micro" => "\u{00B5}",
        "para" => "\u{00B6}",
        "middot" => "\u{00B7}",
        "cedil" => "\u{00B8}",
        "sup1" => "\u{00B9}",
        "ordm" => "\u{00BA}",
        "raquo" => "\u{00BB}",
        "frac14" => "\u{00BC}",
        "frac12" => "\u{00BD}",
        "frac34" => "\u{00BE}",
        "iquest" => "\u{00BF}",
        "times" => "\u{00D7}",
        "divide" => "\u{00F7}",
        // Latin-1 letters
        "Agrave" => "\u{00C0}",
        "Aacute" => "\u{00C1}",
        "Acirc" => "\u{00C2}",
        "Atilde" => "\u{00C3}",
        "Auml" => "\u{00C4}",
        "Aring" => "\u{00C5}",
        "AElig" => "\u{00C6}",
        "Ccedil" => "\u{00C7}",
        "Egrave" => "\u{00C8}",
        "Eacute" => "\u{00C9}",
        "Ecirc" => "\u{00CA}",
        "Euml" => "\u{00CB}",
        "Igrave" => "\u{00CC}",
        "Iacute" => "\u{00CD}",
        "Icirc" => "\u{00CE}",
        "Iuml" => "\u{00CF}",
        "ETH" => "\u{00D0}",
        "Ntilde" => "\u{00D1}",
        "Ograve" => "\u{00D2}",
        "Oacute" => "\u{00D3}",
        "Ocirc" => "\u{00D4}",
        "Otilde" => "\u{00D5}",
        "Ouml" => "\u{00D6}",
        "Oslash" => "\u{00D8}",
        "Ugrave" => "\u{00D9}",
        "Uacute" => "\u{00DA}",
        "Ucirc" => "\u{00DB}",
        "Uuml" => "\u{00DC}",
        "Yacute" => "\u{00DD}",
        "THORN" => "\u{00DE}",
        "szlig" => "\u{00DF}",
        "agrave" => "\u{00E0}",
        "aacute" => "\u{00E1}",
        "acirc" => "\u{00E2}",
        "atilde" => "\u{00E3}",
        "auml" => "\u{00E4}",
        "aring" => "\u{00E5}",
        "aelig" => "\u{00E6}",
        "ccedil" => "\u{00E7}",
        "egrave" => "\u{00E8}",
        "eacute" => "\u{00E9}",
        "ecirc" => "\u{00EA}",
        "euml" => "\u{00EB}",
        "igrave" => "\u{00EC}",
        "iacute" => "\u{00ED}",
        "icirc" => "\u{00EE}",
        "iuml" => "\u{00EF}",
        "eth" => "\u{00F0}",
        "ntilde" => "\u{00F1}",
        "ograve" => "\u{00F2}",
        "oacute" => "\u{00F3}",
        "ocirc" => "\u{00F4}",
        "otilde" => "\u{00F5}",
        "ouml" => "\u{00F6}",
        "oslash" => "\u{00F8}",
        "ugrave" => "\u{00F9}",
        "uacute" => "\u{00FA}",
        "ucirc" => "\u{00FB}",
        "uuml" => "\u{00FC}",
        "yacute" => "\u{00FD}",
        "thorn" => "\u{00FE}",
        "yuml" => "\u{00FF}",
        // Latin Extended
        "OElig" => "\u{0152}",
        "oelig" => "\u{0153}",
        "Scaron" => "\u{0160}",
        "scaron" => "\u{0161}",
        "Yuml" => "\u{0178}",
        "fnof" => "\u{0192}",
        "circ" => "\u{02C6}",
        "tilde" => "\u{02DC}",
        // Greek
        "Alpha" => "\u{0391}",
        "Beta" => "\u{0392}",
        "Gamma" => "\u{0393}",
        "Delta" => "\u{0394}",
        "Epsilon" => "\u{0395}",
        "Zeta" => "\u{0396}",
        "Eta" => "\u{0397}",
        "Theta" => "\u{0398}",
        "Iota" => "\u{0399}",
        "Kappa" => "\u{039A}",
        "Lambda" => "\u{039B}",
        "Mu" => "\u{039C}",
        "Nu" => "\u{039D}",
        "Xi" => "\u{039E}",
        "Omicron" => "\u{039F}",
        "Pi" => "\u{03A0}",
        "Rho" => "\u{03A1}",
        "Sigma" => "\u{03A3}",
        "Tau" => "\u{03A4}",
        "Upsilon" => "\u{03A5}",
        "Phi" => "\u{03A6}",
        "Chi" => "\u{03A7}",
        "Psi" => "\u{03A8}",
        "Omega" => "\u{03A9}",
        "alpha" => "\u{03B1}",
        "beta" => "\u{03B2}",
        "gamma" => "\u{03B3}",
        "delta" => "\u{03B4}",
        "epsilon" => "\u{03B5}",
        "zeta" => "\u{03B6}",
        "eta" => "\u{03B7}",
        "theta" => "\u{03B8}",
        "iota" => "\u{03B9}",
        "kappa" => "\u{03BA}",
        "lambda" => "\u{03BB}",
        "mu" => "\u{03BC}",
        "nu" => "\u{03BD}",
        "xi" => "\u{03BE}",
        "omicron" => "\u{03BF}",
        "pi" => "\u{03C0}",
        "rho" => "\u{03C1}",
        "sigmaf" => "\u{03C2}",
        "sigma" => "\u{03C3}",
        "tau" => "\u{03C4}",
        "upsilon" => "\u{03C5}",
        "phi" => "\u{03C6}",
        "chi" => "\u{03C7}",
        "psi" => "\u{03C8}",
        "omega" => "\u{03C9}",
        "thetasym" => "\u{03D1}",
        "upsih" => "\u{03D2}",
        "piv" => "\u{03D6}",
        // Punctuation
        "ensp" => "\u{2002}",
        "emsp" => "\u{2003}",
        "thinsp" => "\u{2009}",
        "zwnj" => "\u{200C}",
        "zwj" => "\u{200D}",
        "lrm" => "\u{200E}",
        "rlm" => "\u{200F}",
        "ndash" => "\u{2013}",
        "mdash" => "\u{2014}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "sbquo" => "\u{201A}",
        "ldquo" => "\u{201C}",
        "rdquo" => "\u{201D}",
        "bdquo" => "\u{201E}",
        "dagger" => "\u{2020}",
        "Dagger" => "\u{2021}",
        "bull" => "\u{2022}",
        "hellip" => "\u{2026}",
        "permil" => "\u{2030}",
        "prime" => "\u{2032}",
        "Prime" => "\u{2033}",
        "lsaquo" => "\u{2039}",
        "rsaquo" => "\u{203A}",
        "oline" => "\u{203E}",
        "frasl" => "\u{2044}",
        "euro" => "\u{20AC}",
        "image" => "\u{2111}",
        "weierp" => "\u{2118}",
        "real" => "\u{211C}",
        "trade" => "\u{2122}",
        "alefsym" => "\u{2135}",
        // Arrows
        "larr" => "\u{2190}",
        "uarr" => "\u{2191}",
        "rarr" => "\u{2192}",
        "darr" => "\u{2193}",
        "harr" => "\u{2194}",
        "crarr" => "\u{21B5}",
        "lArr" => "\u{21D0}",
        "uArr" => "\u{21D1}",
        "rArr" => "\u{21D2}",
        "dArr" => "\u{21D3}",
        "hArr" => "\u{21D4}",
        // Math
        "forall" => "\u{2200}",
        "part" => "\u{2202}",
        "exist" => "\u{2203}",
        "empty" => "\u{2205}",
        "nabla" => "\u{2207}",
        "isin" => "\u{2208}",
        "notin" => "\u{2209}",
        "ni" => "\u{220B}",
        "prod" => "\u{220F}",
        "sum" => "\u{2211}",
        "minus" => "\u{2212}",
        "lowast" => "\u{2217}",
        "radic" => "\u{221A}",
        "prop" => "\u{221D}",
        "infin" => "\u{221E}",
        "ang" => "\u{2220}",
        "and" => "\u{2227}",
        "or" => "\u{2228}",
        "cap" => "\u{2229}",
        "cup" => "\u{222A}",
        "int" => "\u{222B}",
        "there4" => "\u{2234}",
        "sim" => "\u{223C}",
        "cong" => "\u{2245}",
        "asymp" => "\u{2248}",
        "ne" => "\u{2260}",
        "equiv" => "\u{2261}",
        "le" => "\u{2264}",
        "ge" => "\u{2265}",
        "sub" => "\u{2282}",
        "sup" => "\u{2283}",
        "nsub" => "\u{2284}",
        "sube" => "\u{2286}",
        "supe" => "\u{2287}",
        "oplus" => "\u{2295}",
        "otimes" => "\u{2297}",
        "perp" => "\u{22A5}",
        "sdot" => "\u{22C5}",
        "lceil" => "\u{2308}",
        "rceil" => "\u{2309}",
        "lfloor" => "\u{230A}",
        "rfloor" => "\u{230B}",
        "lang" => "\u{27E8}",
        "rang" => "\u{27E9}",
        // Shapes
        "loz" => "\u{25CA}",
        "spades" => "\u{2660}",
        "clubs" => "\u{2663}",
        "hearts" => "\u{2665}",
        "diams" => "\u{2666}",
        // Whitespace-ish
        "Tab" => "\t",
        "NewLine" => "\n",
        _ => return None,
    };
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_borrowed() {
        assert!(matches!(decode_entities("no refs here"), Cow::Borrowed(_)));
        assert!(matches!(decode_entities("a & b"), Cow::Borrowed(_)));
        assert!(matches!(decode_entities("&alpha"), Cow::Borrowed(_)));
        assert_eq!(decode_entities("120×32"), "120×32");
    }

    #[test]
    fn named_with_semicolon() {
        assert_eq!(decode_entities("a &amp; b"), "a & b");
        assert_eq!(decode_entities("&lt;tag&gt;"), "<tag>");
        assert_eq!(decode_entities("&quot;hi&quot;"), "\"hi\"");
        assert_eq!(decode_entities("&apos;x&apos;"), "'x'");
        assert_eq!(decode_entities("a&nbsp;b"), "a\u{00A0}b");
        assert_eq!(decode_entities("&alpha;"), "α");
        assert_eq!(decode_entities("&AMP;"), "&");
    }

    #[test]
    fn names_are_case_sensitive() {
        assert_eq!(decode_entities("&ALPHA;"), "&ALPHA;");
        assert_eq!(decode_entities("&Alpha;"), "Α");
    }

    #[test]
    fn legacy_names_without_semicolon() {
        assert_eq!(decode_entities("&amp"), "&");
        assert_eq!(decode_entities("loose &amp space"), "loose & space");
        assert_eq!(decode_entities("&copy 2024"), "© 2024");
        assert_eq!(decode_entities("&ampfoo"), "&foo");
        assert_eq!(decode_entities("&notit;"), "¬it;");
        assert_eq!(decode_entities("&alpha"), "&alpha");
        assert_eq!(decode_entities("&apos"), "&apos");
    }

    #[test]
    fn mixed_line() {
        assert_eq!(
            decode_entities("&amp &amp; &AMP; &alpha &alpha; &ALPHA;"),
            "& & & &alpha α &ALPHA;"
        );
        assert_eq!(
            decode_entities("& &amp; \" &#34; \" &quot;"),
            "& & \" \" \" \""
        );
    }

    #[test]
    fn numeric_references() {
        assert_eq!(decode_entities("&#215;"), "×");
        assert_eq!(decode_entities("&#xD7;"), "×");
        assert_eq!(decode_entities("&#XD7;"), "×");
        assert_eq!(decode_entities("&#34 x"), "\" x");
        assert_eq!(decode_entities("&#x41B"), "\u{41B}");
        assert_eq!(decode_entities("&#1114111;"), "\u{10FFFF}");
    }

    #[test]
    fn numeric_replacements() {
        assert_eq!(decode_entities("&#0;"), "\u{FFFD}");
        assert_eq!(decode_entities("&#xD800;"), "\u{FFFD}");
        assert_eq!(decode_entities("&#x110000;"), "\u{FFFD}");
        assert_eq!(decode_entities("&#99999999999999999999;"), "\u{FFFD}");
        assert_eq!(decode_entities("&#x80;"), "€");
        assert_eq!(decode_entities("&#150;"), "–");
        assert_eq!(decode_entities("&#x81;"), "\u{81}");
    }

    #[test]
    fn malformed_numeric_passes_through() {
        assert_eq!(decode_entities("&#;"), "&#;");
        assert_eq!(decode_entities("&#x;"), "&#x;");
        assert_eq!(decode_entities("&#xZZ;"), "&#xZZ;");
        assert_eq!(decode_entities("&#"), "&#");
        assert_eq!(decode_entities("&#-1;"), "&#-1;");
    }

    #[test]
    fn unknown_names_pass_through() {
        assert_eq!(
            decode_entities("before &notanentity; after"),
            "before ¬anentity; after"
        );
        assert_eq!(decode_entities("&zzz; &dquot;"), "&zzz; &dquot;");
        assert_eq!(decode_entities("&;"), "&;");
        assert_eq!(decode_entities("&&amp;"), "&&");
    }

    #[test]
    fn preserves_utf8_around_references() {
        assert_eq!(decode_entities("π &amp; σ"), "π & σ");
        assert_eq!(decode_entities("é&lt;ï"), "é<ï");
    }

    #[test]
    fn legacy_names_are_known() {
        for name in [
            "amp", "AMP", "lt", "gt", "quot", "nbsp", "copy", "reg", "frac12", "yuml", "AElig",
        ] {
            assert!(is_legacy(name), "{name}");
            assert!(lookup_named(name).is_some(), "{name}");
        }
    }

    #[test]
    fn decoding_is_idempotent_on_its_own_output_for_plain_samples() {
        for s in ["", "plain", "πσ", "&", "&&", "&;", "&#;", "&unknown;"] {
            let out = decode_entities(s);
            assert_eq!(decode_entities(&out), out);
        }
    }
}
