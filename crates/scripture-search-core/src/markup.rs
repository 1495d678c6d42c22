//! Structural walk over a book's HTML markup.
//!
//! Books are plain HTML: a run of `<div class="page">` containers holding
//! `<p>` blocks, chapter numbers in `<b>`, verses separated by `<br>`. The
//! walk tokenizes with `quick-xml` in a lenient mode (HTML void elements and
//! unclosed tags are tolerated) and returns borrowed slices of the input so
//! the extractor can hand back the original line fragments untouched.
//!
//! Before tokenizing, the input is screened the way an HTML tokenizer reads
//! it: a `<` that cannot open a tag is text, and comments, `<!...>`, `<?...>`
//! and `</` junk are skipped up to their closing `>`. The reader only ever
//! sees element tags and text. A construct cut off by the end of input ends
//! the walk with whatever was collected so far.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;
use thiserror::Error;

static TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<!--.*?(?:-->|\z)|<[A-Za-z/!?][^>]*(?:>|\z)").expect("tag pattern is valid")
});

static ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(?:#[0-9]+|#[xX][0-9a-fA-F]+|[A-Za-z][A-Za-z0-9]*);")
        .expect("entity pattern is valid")
});

const PAGE_CLASS: &str = "page";

/// A reader failure other than input cut off mid-construct.
#[derive(Debug, Error)]
#[error("malformed markup at byte {position}: {message}")]
pub struct MarkupError {
    pub position: usize,
    pub message: String,
}

/// A page container and the paragraphs found inside it.
#[derive(Debug, Clone)]
pub struct Page<'a> {
    /// Zero-based, in document order.
    pub index: usize,
    /// Inner markup of the container.
    pub raw: &'a str,
    pub paragraphs: Vec<Paragraph<'a>>,
}

#[derive(Debug, Clone)]
pub struct Paragraph<'a> {
    /// Inner markup of the `<p>`.
    pub raw: &'a str,
    /// Entity-decoded content of every plain-text `<b>` span, in order.
    pub bold: Vec<Cow<'a, str>>,
    /// Raw fragments between `<br>` tags, in order. Never empty.
    pub lines: Vec<&'a str>,
}

impl Paragraph<'_> {
    /// Paragraph content with tags removed and entities decoded, one entry
    /// per non-empty line.
    pub fn text_lines(&self) -> Vec<String> {
        self.lines
            .iter()
            .map(|line| strip_tags(line))
            .filter(|line| !line.is_empty())
            .collect()
    }
}

struct OpenPage<'a> {
    content_start: usize,
    nested_divs: usize,
    paragraphs: Vec<Paragraph<'a>>,
}

struct OpenParagraph<'a> {
    content_start: usize,
    bold: Vec<Cow<'a, str>>,
    breaks: Vec<(usize, usize)>,
    open_bold: Option<OpenBold>,
}

struct OpenBold {
    content_start: usize,
    plain: bool,
}

impl<'a> OpenParagraph<'a> {
    fn new(content_start: usize) -> Self {
        Self {
            content_start,
            bold: Vec::new(),
            breaks: Vec::new(),
            open_bold: None,
        }
    }

    fn taint_bold(&mut self) {
        if let Some(bold) = self.open_bold.as_mut() {
            bold.plain = false;
        }
    }

    fn finish(self, markup: &'a str, end: usize) -> Paragraph<'a> {
        let mut lines = Vec::with_capacity(self.breaks.len() + 1);
        let mut cursor = self.content_start;
        for (start, stop) in self.breaks {
            lines.push(&markup[cursor..start]);
            cursor = stop;
        }
        lines.push(&markup[cursor..end.max(cursor)]);

        Paragraph {
            raw: &markup[self.content_start..end.max(self.content_start)],
            bold: self.bold,
            lines,
        }
    }
}

/// Walks every page container of `markup`.
pub fn pages(markup: &str) -> Result<Vec<Page<'_>>, MarkupError> {
    let screened = screen(markup);
    let mut reader = Reader::from_str(&screened);
    {
        let config = reader.config_mut();
        config.check_end_names = false;
        config.allow_unmatched_ends = true;
        config.check_comments = false;
    }

    let mut pages: Vec<Page<'_>> = Vec::new();
    let mut page: Option<OpenPage<'_>> = None;
    let mut para: Option<OpenParagraph<'_>> = None;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(quick_xml::Error::IllFormed(e)) => {
                tracing::debug!(
                    position = reader.buffer_position(),
                    error = %e,
                    "ignoring ill-formed markup"
                );
                continue;
            }
            // Screened input only fails to tokenize when a tag runs into the end
            Err(quick_xml::Error::Syntax(e)) => {
                tracing::debug!(
                    position = reader.buffer_position(),
                    error = %e,
                    "markup ends inside a tag"
                );
                Event::Eof
            }
            Err(e) => {
                return Err(MarkupError {
                    position: reader.buffer_position() as usize,
                    message: e.to_string(),
                })
            }
        };
        let tag_end = (reader.buffer_position() as usize).min(markup.len());
        let tag_start = screened
            .get(..tag_end)
            .and_then(|head| head.rfind('<'))
            .unwrap_or(tag_end);

        match event {
            Event::Start(e) => {
                let name = e.local_name();
                let name = name.as_ref();
                if let Some(open) = para.as_mut() {
                    if !name.eq_ignore_ascii_case(b"b") {
                        open.taint_bold();
                    }
                }

                if name.eq_ignore_ascii_case(b"div") {
                    match page.as_mut() {
                        Some(open) => open.nested_divs += 1,
                        None if has_class(&e, PAGE_CLASS) => {
                            page = Some(OpenPage {
                                content_start: tag_end,
                                nested_divs: 0,
                                paragraphs: Vec::new(),
                            });
                        }
                        None => {}
                    }
                } else if name.eq_ignore_ascii_case(b"p") {
                    if let Some(open_page) = page.as_mut() {
                        if let Some(prev) = para.take() {
                            open_page.paragraphs.push(prev.finish(markup, tag_start));
                        }
                        para = Some(OpenParagraph::new(tag_end));
                    }
                } else if name.eq_ignore_ascii_case(b"br") {
                    if let Some(open) = para.as_mut() {
                        open.breaks.push((tag_start, tag_end));
                    }
                } else if name.eq_ignore_ascii_case(b"b") {
                    if let Some(open) = para.as_mut() {
                        open.open_bold = Some(OpenBold {
                            content_start: tag_end,
                            plain: true,
                        });
                    }
                }
            }
            Event::Empty(e) => {
                let name = e.local_name();
                let name = name.as_ref();
                if let Some(open) = para.as_mut() {
                    open.taint_bold();
                }

                if name.eq_ignore_ascii_case(b"br") {
                    if let Some(open) = para.as_mut() {
                        open.breaks.push((tag_start, tag_end));
                    }
                } else if name.eq_ignore_ascii_case(b"p") {
                    if let Some(open_page) = page.as_mut() {
                        if let Some(prev) = para.take() {
                            open_page.paragraphs.push(prev.finish(markup, tag_start));
                        }
                        open_page
                            .paragraphs
                            .push(OpenParagraph::new(tag_end).finish(markup, tag_end));
                    }
                }
            }
            Event::End(e) => {
                let name = e.local_name();
                let name = name.as_ref();

                if name.eq_ignore_ascii_case(b"b") {
                    if let Some(open) = para.as_mut() {
                        if let Some(bold) = open.open_bold.take() {
                            if bold.plain {
                                let content = &markup[bold.content_start..tag_start];
                                open.bold.push(decode_entities(content));
                            }
                        }
                    }
                    continue;
                }
                if let Some(open) = para.as_mut() {
                    open.taint_bold();
                }

                if name.eq_ignore_ascii_case(b"p") {
                    if let (Some(open_page), Some(open)) = (page.as_mut(), para.take()) {
                        open_page.paragraphs.push(open.finish(markup, tag_start));
                    }
                } else if name.eq_ignore_ascii_case(b"div") {
                    let closes_page = match page.as_mut() {
                        Some(open) if open.nested_divs > 0 => {
                            open.nested_divs -= 1;
                            false
                        }
                        Some(_) => true,
                        None => false,
                    };
                    if closes_page {
                        if let Some(open) = page.take() {
                            pages.push(close_page(markup, open, para.take(), tag_start, pages.len()));
                        }
                    }
                }
            }
            Event::Text(_) => {}
            Event::Eof => {
                if let Some(open) = page.take() {
                    let end = markup.len();
                    pages.push(close_page(markup, open, para.take(), end, pages.len()));
                }
                break;
            }
            _ => {
                if let Some(open) = para.as_mut() {
                    open.taint_bold();
                }
            }
        }
    }

    Ok(pages)
}

/// Walks `markup` and returns the page at `index`, if there is one.
pub fn page(markup: &str, index: usize) -> Result<Option<Page<'_>>, MarkupError> {
    Ok(pages(markup)?.into_iter().nth(index))
}

fn close_page<'a>(
    markup: &'a str,
    mut open: OpenPage<'a>,
    para: Option<OpenParagraph<'a>>,
    end: usize,
    index: usize,
) -> Page<'a> {
    if let Some(p) = para {
        open.paragraphs.push(p.finish(markup, end));
    }
    Page {
        index,
        raw: &markup[open.content_start..end.max(open.content_start)],
        paragraphs: open.paragraphs,
    }
}

/// Same-length copy of `markup` with every `<` that does not open an element
/// tag, and every comment or bogus-comment span, replaced by spaces.
fn screen(markup: &str) -> String {
    let bytes = markup.as_bytes();
    let mut out = bytes.to_vec();
    let mut pos = 0;

    while let Some(found) = markup[pos..].find('<') {
        let start = pos + found;
        let rest = &bytes[start + 1..];
        let end = match rest {
            [first, ..] if first.is_ascii_alphabetic() => {
                pos = start + 1;
                continue;
            }
            [b'/', second, ..] if second.is_ascii_alphabetic() => {
                pos = start + 1;
                continue;
            }
            [b'!', b'-', b'-', ..] => {
                find_after(markup, start + 4, "-->").map_or(bytes.len(), |at| at + 3)
            }
            [b'!' | b'/' | b'?', ..] => {
                find_after(markup, start + 2, ">").map_or(bytes.len(), |at| at + 1)
            }
            _ => start + 1,
        };
        out[start..end].fill(b' ');
        pos = end;
    }

    // Only whole ASCII-delimited spans were blanked, so this is still UTF-8.
    String::from_utf8(out).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

fn find_after(haystack: &str, from: usize, needle: &str) -> Option<usize> {
    haystack
        .get(from..)
        .and_then(|tail| tail.find(needle))
        .map(|at| from + at)
}

fn has_class(e: &BytesStart<'_>, class: &str) -> bool {
    e.html_attributes().flatten().any(|attr| {
        attr.key.as_ref().eq_ignore_ascii_case(b"class")
            && std::str::from_utf8(&attr.value)
                .map(|value| value.split_ascii_whitespace().any(|c| c == class))
                .unwrap_or(false)
    })
}

/// Removes every tag, decodes entities and trims surrounding whitespace.
pub fn strip_tags(fragment: &str) -> String {
    let without_tags = TAG.replace_all(fragment, "");
    decode_entities(&without_tags).trim().to_string()
}

/// Decodes XML entities, `&nbsp;` and numeric references. Anything else is
/// left as written.
pub fn decode_entities(raw: &str) -> Cow<'_, str> {
    if !raw.contains('&') {
        return Cow::Borrowed(raw);
    }
    ENTITY.replace_all(raw, |caps: &regex::Captures<'_>| {
        let entity = &caps[0];
        quick_xml::escape::unescape_with(entity, |name| {
            quick_xml::escape::resolve_predefined_entity(name).or(match name {
                "nbsp" => Some("\u{a0}"),
                _ => None,
            })
        })
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| entity.to_string())
    })
}
