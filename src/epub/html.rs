//! Chapter document handling: titles, body markup and plain text.
//!
//! Chapters are XHTML in theory and tag soup in practice, so every
//! function here degrades gracefully: a tokenizer error ends the scan and
//! whatever was collected so far is used.

use quick_xml::events::Event;

use super::xml::{lenient_reader, local_name, resolve_reference};

/// Title of a chapter document.
///
/// The `<title>` element wins, then the first `h1`/`h2`/`h3`, then a
/// positional `Chapter {index + 1}` fallback.
pub fn chapter_title(html: &str, index: usize) -> String {
    let mut reader = lenient_reader(html.as_bytes());
    let mut buf = Vec::new();

    let mut title: Option<String> = None;
    let mut heading: Option<String> = None;
    // (element, text so far)
    let mut capture: Option<(String, String)> = None;
    let mut skip_depth = 0usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = local_name(e.name().as_ref());
                if is_script(&name) {
                    skip_depth += 1;
                } else if capture.is_none() && skip_depth == 0 {
                    let wanted = match name.as_str() {
                        "title" => title.is_none(),
                        "h1" | "h2" | "h3" => heading.is_none(),
                        _ => false,
                    };
                    if wanted {
                        capture = Some((name, String::new()));
                    }
                }
            }
            Ok(Event::Text(t)) if skip_depth == 0 => {
                if let Some((_, text)) = capture.as_mut() {
                    text.push_str(&t.decode().unwrap_or_default());
                }
            }
            Ok(Event::CData(t)) if skip_depth == 0 => {
                if let Some((_, text)) = capture.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&t));
                }
            }
            Ok(Event::GeneralRef(r)) if skip_depth == 0 => {
                if let Some((_, text)) = capture.as_mut() {
                    text.push_str(&resolve_reference(&r.decode().unwrap_or_default()));
                }
            }
            Ok(Event::End(e)) => {
                let name = local_name(e.name().as_ref());
                if is_script(&name) {
                    skip_depth = skip_depth.saturating_sub(1);
                } else if capture.as_ref().is_some_and(|(open, _)| *open == name) {
                    if let Some((open, text)) = capture.take() {
                        let text = collapse_whitespace(&text);
                        if !text.is_empty() {
                            if open == "title" {
                                title = Some(text);
                                break;
                            }
                            heading = Some(text);
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(error = %e, "stopped scanning chapter for a title");
                break;
            }
        }
        buf.clear();
    }

    title
        .or(heading)
        .unwrap_or_else(|| format!("Chapter {}", index + 1))
}

/// Inner markup of `<body>`, or the whole document when it has none.
pub fn body_html(html: &str) -> &str {
    // ASCII lowercasing keeps byte offsets valid for slicing `html`.
    let lower = html.to_ascii_lowercase();

    let open = lower.match_indices("<body").find(|(i, _)| {
        lower[i + 5..]
            .chars()
            .next()
            .is_some_and(|c| c == '>' || c == '/' || c.is_ascii_whitespace())
    });
    let Some((open, _)) = open else {
        return html.trim();
    };
    let Some(tag_end) = lower[open..].find('>') else {
        return "";
    };
    let start = open + tag_end + 1;
    if lower[open..start].ends_with("/>") {
        return "";
    }
    let end = lower[start..]
        .rfind("</body")
        .map_or(html.len(), |i| start + i);

    html[start..end].trim()
}

/// Readable text of a chapter, one paragraph per block element.
pub fn to_plain_text(html: &str) -> String {
    let mut reader = lenient_reader(html.as_bytes());
    let mut buf = Vec::new();
    let mut text = TextBuilder::default();
    let mut skip_depth = 0usize;
    let mut pre_depth = 0usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = local_name(e.name().as_ref());
                if is_skipped(&name) {
                    skip_depth += 1;
                } else if skip_depth == 0 {
                    match name.as_str() {
                        "br" => text.line_break(),
                        "pre" => {
                            pre_depth += 1;
                            text.end_block();
                        }
                        "li" => {
                            text.end_block();
                            text.push("\u{2022} ", true);
                        }
                        n if is_block(n) => text.end_block(),
                        _ => {}
                    }
                }
            }
            Ok(Event::Empty(e)) if skip_depth == 0 => match local_name(e.name().as_ref()).as_str() {
                "br" => text.line_break(),
                "hr" => {
                    text.end_block();
                    text.push("* * *", true);
                    text.end_block();
                }
                "img" => {
                    let alt = super::xml::attr(&reader, &e, "alt").unwrap_or_default();
                    if !alt.trim().is_empty() {
                        text.push(&format!("[{}]", alt.trim()), false);
                    }
                }
                _ => {}
            },
            Ok(Event::End(e)) => {
                let name = local_name(e.name().as_ref());
                if is_skipped(&name) {
                    skip_depth = skip_depth.saturating_sub(1);
                } else if skip_depth == 0 {
                    if name == "pre" {
                        pre_depth = pre_depth.saturating_sub(1);
                        text.end_block();
                    } else if name == "li" || is_block(&name) {
                        text.end_block();
                    }
                }
            }
            Ok(Event::Text(t)) if skip_depth == 0 => {
                text.push(&t.decode().unwrap_or_default(), pre_depth > 0);
            }
            Ok(Event::CData(t)) if skip_depth == 0 => {
                text.push(&String::from_utf8_lossy(&t), pre_depth > 0);
            }
            Ok(Event::GeneralRef(r)) if skip_depth == 0 => {
                let resolved = resolve_reference(&r.decode().unwrap_or_default());
                text.push(&resolved, true);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, "chapter markup is malformed, text may be truncated");
                break;
            }
        }
        buf.clear();
    }

    text.finish()
}

fn is_script(name: &str) -> bool {
    matches!(name, "script" | "style")
}

fn is_skipped(name: &str) -> bool {
    name == "head" || name == "svg" || is_script(name)
}

fn is_block(name: &str) -> bool {
    matches!(
        name,
        "p" | "div"
            | "section"
            | "article"
            | "aside"
            | "header"
            | "footer"
            | "nav"
            | "blockquote"
            | "figure"
            | "figcaption"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "ul"
            | "ol"
            | "dl"
            | "dt"
            | "dd"
            | "table"
            | "tr"
            | "body"
    )
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Default)]
struct TextBuilder {
    blocks: Vec<String>,
    current: String,
    pending_space: bool,
}

impl TextBuilder {
    /// Append text; `verbatim` keeps whitespace as-is (inside `pre`, entities).
    fn push(&mut self, text: &str, verbatim: bool) {
        if verbatim {
            if self.pending_space && !self.current.is_empty() && !self.current.ends_with('\n') {
                self.current.push(' ');
            }
            self.pending_space = false;
            self.current.push_str(text);
            return;
        }

        for (i, word) in text.split_whitespace().enumerate() {
            let needs_space = i > 0 || self.pending_space || text.starts_with(char::is_whitespace);
            if needs_space && !self.current.is_empty() && !self.current.ends_with(['\n', ' ']) {
                self.current.push(' ');
            }
            self.current.push_str(word);
            self.pending_space = false;
        }
        if text.ends_with(char::is_whitespace) {
            self.pending_space = true;
        }
    }

    fn line_break(&mut self) {
        self.current.push('\n');
        self.pending_space = false;
    }

    fn end_block(&mut self) {
        let block = self.current.trim();
        if !block.is_empty() {
            self.blocks.push(block.to_string());
        }
        self.current.clear();
        self.pending_space = false;
    }

    fn finish(mut self) -> String {
        self.end_block();
        self.blocks.join("\n\n")
    }
}
