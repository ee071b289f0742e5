//! Content categories: how the builder treats an element's body.

use crate::tag::Tag;

/// How the body of an opened element is consumed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    /// Never has content; no close tag is expected.
    Void,
    /// Parsed as nested markup, like [`Category::Normal`].
    Template,
    /// Literal text up to the matching close tag, stored verbatim.
    Raw,
    /// Literal text up to the matching close tag, entity-decoded.
    EscapableRaw,
    /// Reserved for foreign content. [`categorize`] never returns it today and
    /// the builder handles it like [`Category::Normal`].
    Foreign,
    /// Parsed as nested markup.
    Normal,
}

impl Category {
    /// Whether the body is parsed as nested markup.
    pub fn parses_markup(self) -> bool {
        matches!(
            self,
            Category::Template | Category::Foreign | Category::Normal
        )
    }

    /// Whether the body is scanned as literal text.
    pub fn is_raw_text(self) -> bool {
        matches!(self, Category::Raw | Category::EscapableRaw)
    }
}

/// Classify a tag identity. Unknown tags (`None`) are [`Category::Normal`].
pub fn categorize(tag: Option<Tag>) -> Category {
    let Some(tag) = tag else {
        return Category::Normal;
    };
    match tag {
        Tag::Area
        | Tag::Base
        | Tag::Br
        | Tag::Col
        | Tag::Embed
        | Tag::Hr
        | Tag::Img
        | Tag::Input
        | Tag::Link
        | Tag::Meta
        | Tag::Param
        | Tag::Source
        | Tag::Track
        | Tag::Wbr => Category::Void,
        Tag::Template => Category::Template,
        Tag::Script | Tag::Style => Category::Raw,
        Tag::Textarea | Tag::Title => Category::EscapableRaw,
        _ => Category::Normal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn void_elements() {
        for name in [
            "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
            "source", "track", "wbr",
        ] {
            let tag = Tag::lookup(name.as_bytes());
            assert!(tag.is_some(), "{name} missing from the tag table");
            assert_eq!(categorize(tag), Category::Void, "{name}");
        }
    }

    #[test]
    fn raw_text_elements() {
        assert_eq!(categorize(Some(Tag::Script)), Category::Raw);
        assert_eq!(categorize(Some(Tag::Style)), Category::Raw);
        assert_eq!(categorize(Some(Tag::Textarea)), Category::EscapableRaw);
        assert_eq!(categorize(Some(Tag::Title)), Category::EscapableRaw);
        assert!(categorize(Some(Tag::Title)).is_raw_text());
    }

    #[test]
    fn everything_else_parses_markup() {
        assert_eq!(categorize(Some(Tag::Template)), Category::Template);
        assert_eq!(categorize(Some(Tag::Div)), Category::Normal);
        assert_eq!(categorize(Some(Tag::Svg)), Category::Normal);
        assert_eq!(categorize(Some(Tag::Noscript)), Category::Normal);
        assert_eq!(categorize(None), Category::Normal);

        let markup = Tag::ALL
            .iter()
            .filter(|&&tag| categorize(Some(tag)).parses_markup())
            .count();
        assert_eq!(markup, Tag::ALL.len() - 14 - 4);
    }
}
