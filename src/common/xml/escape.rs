use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;
use smallvec::SmallVec;

// Static initialization: automata are built only once, thread-safe
static XML_ESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .build(["&", "<", ">", "\"", "'", "\n", "\r", "\t"])
        .expect("Failed to build XML escaper")
});

static TEXT_ESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .build(["&", "<", ">"])
        .expect("Failed to build XML text escaper")
});

/// Escape XML special characters for use inside attribute values.
///
/// Newlines, carriage returns and tabs become character references, since a
/// reader normalizes them to spaces when they appear raw in an attribute.
///
/// # Examples
///
/// ```
/// use blipswap::common::xml::escape_xml;
/// assert_eq!(escape_xml("a & b"), "a &amp; b");
/// assert_eq!(
///     escape_xml("<tag>\"hello\"</tag>"),
///     "&lt;tag&gt;&quot;hello&quot;&lt;/tag&gt;"
/// );
/// assert_eq!(escape_xml("one\ntwo\tthree"), "one&#xA;two&#x9;three");
/// ```
#[inline]
pub fn escape_xml(s: &str) -> String {
    XML_ESCAPER.replace_all(
        s,
        &["&amp;", "&lt;", "&gt;", "&quot;", "&apos;", "&#xA;", "&#xD;", "&#x9;"],
    )
}

/// Escape only the characters that are mandatory in character data.
///
/// ```
/// use blipswap::common::xml::escape_text;
/// assert_eq!(escape_text("it's <b> & \"c\""), "it's &lt;b&gt; &amp; \"c\"");
/// ```
#[inline]
pub fn escape_text(s: &str) -> String {
    TEXT_ESCAPER.replace_all(s, &["&amp;", "&lt;", "&gt;"])
}

/// Every spelling under which `value` can appear in serialized XML.
///
/// The fully escaped form is what attribute serialization produces; the
/// text form and the raw value cover character data written by other
/// tools. Duplicates are removed, longest spelling first.
pub fn serialized_spellings(value: &str) -> SmallVec<[String; 3]> {
    let mut spellings: SmallVec<[String; 3]> = SmallVec::new();
    for candidate in [escape_xml(value), escape_text(value), value.to_string()] {
        if !candidate.is_empty() && !spellings.contains(&candidate) {
            spellings.push(candidate);
        }
    }
    spellings.sort_by_key(|s| std::cmp::Reverse(s.len()));
    spellings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spellings_of_plain_value() {
        assert_eq!(serialized_spellings("http://img/a.png").as_slice(), ["http://img/a.png"]);
    }

    #[test]
    fn test_spellings_of_value_with_entities() {
        let spellings = serialized_spellings("a?x=1&y='2'");
        assert_eq!(
            spellings.as_slice(),
            ["a?x=1&amp;y=&apos;2&apos;", "a?x=1&amp;y='2'", "a?x=1&y='2'"]
        );
    }

    #[test]
    fn test_spellings_of_multiline_value() {
        let spellings = serialized_spellings("line one\nline two");
        assert_eq!(spellings.as_slice(), ["line one&#xA;line two", "line one\nline two"]);
    }

    #[test]
    fn test_empty_value_has_no_spelling() {
        assert!(serialized_spellings("").is_empty());
    }
}
