//! Small helpers shared by the quick-xml based parsers.

use std::borrow::Cow;

use quick_xml::events::BytesStart;
use quick_xml::reader::Reader;

/// A reader configured for the loosely-formed markup found in real books.
pub(crate) fn lenient_reader(content: &[u8]) -> Reader<&[u8]> {
    let mut reader = Reader::from_reader(content);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;
    reader
}

/// Lowercased local part of a possibly prefixed name (`opf:item` -> `item`).
pub(crate) fn local_name(raw: &[u8]) -> String {
    let name = raw.rsplit(|&b| b == b':').next().unwrap_or(raw);
    String::from_utf8_lossy(name).to_ascii_lowercase()
}

/// Value of the attribute whose local name matches `name`, unescaped.
pub(crate) fn attr(reader: &Reader<&[u8]>, e: &BytesStart<'_>, name: &str) -> Option<String> {
    e.attributes().flatten().find_map(|a| {
        if local_name(a.key.as_ref()) != name {
            return None;
        }
        let raw = reader.decoder().decode(a.value.as_ref()).ok()?;
        Some(unescape(&raw).into_owned())
    })
}

/// Resolve XML and the common HTML named entities; unknown ones stay verbatim.
pub(crate) fn unescape(raw: &str) -> Cow<'_, str> {
    quick_xml::escape::unescape_with(raw, html_entity).unwrap_or(Cow::Borrowed(raw))
}

/// Text for a single `&name;` reference reported by the reader.
pub(crate) fn resolve_reference(name: &str) -> String {
    let reference = format!("&{};", name);
    match unescape(&reference) {
        Cow::Owned(s) => s,
        Cow::Borrowed(s) => s.to_string(),
    }
}

fn html_entity(name: &str) -> Option<&'static str> {
    Some(match name {
        "nbsp" => "\u{a0}",
        "mdash" => "\u{2014}",
        "ndash" => "\u{2013}",
        "hellip" => "\u{2026}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "copy" => "\u{a9}",
        "shy" => "\u{ad}",
        _ => return quick_xml::escape::resolve_predefined_entity(name),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_name_strips_prefix() {
        assert_eq!(local_name(b"opf:item"), "item");
        assert_eq!(local_name(b"H1"), "h1");
    }

    #[test]
    fn test_unescape_entities() {
        assert_eq!(unescape("Tom &amp; Jerry"), "Tom & Jerry");
        assert_eq!(unescape("a&nbsp;b"), "a\u{a0}b");
        assert_eq!(unescape("&#8217;"), "\u{2019}");
        assert_eq!(unescape("&bogus;"), "&bogus;");
    }

    #[test]
    fn test_resolve_reference() {
        assert_eq!(resolve_reference("mdash"), "\u{2014}");
        assert_eq!(resolve_reference("lt"), "<");
        assert_eq!(resolve_reference("#x41"), "A");
    }
}
