//! Resolution of package-relative hrefs to archive entry names.

/// Resolve `href` against the directory of `base_path` (the OPF path).
///
/// Fragments and queries are dropped, `%XX` escapes are decoded and
/// `.`/`..` segments are collapsed. An href starting with `/` is taken
/// relative to the archive root.
pub fn resolve_path(base_path: &str, href: &str) -> String {
    let href = href.split(['#', '?']).next().unwrap_or_default();
    let href = percent_decode(href);

    let mut segments: Vec<&str> = Vec::new();
    if !href.starts_with('/') {
        if let Some((dir, _)) = base_path.rsplit_once('/') {
            segments.extend(dir.split('/'));
        }
    }

    for segment in href.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    segments.retain(|s| !s.is_empty() && *s != ".");
    segments.join("/")
}

fn percent_decode(input: &str) -> String {
    if !input.contains('%') {
        return input.to_string();
    }

    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(value) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(value);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_to_opf_directory() {
        assert_eq!(resolve_path("OEBPS/content.opf", "text/ch1.xhtml"), "OEBPS/text/ch1.xhtml");
    }

    #[test]
    fn test_opf_at_archive_root() {
        assert_eq!(resolve_path("content.opf", "ch1.xhtml"), "ch1.xhtml");
    }

    #[test]
    fn test_parent_segments_collapse() {
        assert_eq!(
            resolve_path("OEBPS/pkg/content.opf", "../Text/./ch1.xhtml"),
            "OEBPS/Text/ch1.xhtml"
        );
    }

    #[test]
    fn test_fragment_and_escapes() {
        assert_eq!(
            resolve_path("OPS/book.opf", "chapter%20one.xhtml#start"),
            "OPS/chapter one.xhtml"
        );
    }

    #[test]
    fn test_archive_rooted_href() {
        assert_eq!(resolve_path("OPS/book.opf", "/images/cover.xhtml"), "images/cover.xhtml");
    }

    #[test]
    fn test_malformed_escape_is_kept() {
        assert_eq!(resolve_path("a.opf", "100%.xhtml"), "100%.xhtml");
        assert_eq!(resolve_path("a.opf", "x%zz.xhtml"), "x%zz.xhtml");
    }
}
