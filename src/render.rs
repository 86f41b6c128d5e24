//! Turning a chapter into something to look at.

use crate::epub::Chapter;
use crate::epub::html::{body_html, to_plain_text};
use crate::settings::Settings;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const MIN_WIDTH: usize = 20;

/// Chapter text word-wrapped to `width` columns.
pub fn render_chapter_text(chapter: &Chapter, width: usize) -> String {
    let text = to_plain_text(&chapter.content);
    wrap(&text, width.max(MIN_WIDTH))
}

/// Wrap each line of `text` at word boundaries, measured in terminal columns.
///
/// A word wider than `width` (a long URL, unspaced CJK text) is broken
/// between characters.
pub fn wrap(text: &str, width: usize) -> String {
    let width = width.max(1);
    let mut out = String::with_capacity(text.len() + text.len() / width);

    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let mut column = 0;
        for word in line.split(' ').filter(|w| !w.is_empty()) {
            let len = word.width();
            if column > 0 && column + 1 + len <= width {
                out.push(' ');
                column += 1;
            } else if column > 0 {
                out.push('\n');
                column = 0;
            }

            if len <= width {
                out.push_str(word);
                column += len;
                continue;
            }
            for c in word.chars() {
                let w = c.width().unwrap_or(0);
                if column > 0 && column + w > width {
                    out.push('\n');
                    column = 0;
                }
                out.push(c);
                column += w;
            }
        }
    }

    out
}

/// Standalone HTML page showing one chapter with the reader's font settings.
pub fn render_chapter_page(chapter: &Chapter, settings: &Settings, book_title: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title} - {book}</title>
<style>
  .font-default {{ font-family: Georgia, serif; }}
  .font-inter {{ font-family: "Inter", sans-serif; }}
  .font-poppins {{ font-family: "Poppins", sans-serif; }}
</style>
</head>
<body>
<div id="pageContent" class="{class}" style="font-size: {size}px">
{body}
</div>
</body>
</html>
"#,
        title = escape(&chapter.title),
        book = escape(book_title),
        class = settings.font_family.css_class(),
        size = settings.font_size,
        body = body_html(&chapter.content),
    )
}

fn escape(text: &str) -> String {
    quick_xml::escape::escape(text).into_owned()
}
