//! Terminal text rendering.
//!
//! Model replies arrive as markdown; [`markdown`] flattens them into wrapped
//! plain text with `pulldown_cmark` and `textwrap`. Arabic lines are wrapped
//! and then right-aligned by display width, so combining marks (tashkeel)
//! don't throw the alignment off.

use pulldown_cmark::{CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use unicode_width::UnicodeWidthStr;

use noor::quran::Ayah;
use noor::quran::text::to_arabic_numerals;

/// Flatten markdown into plain text wrapped at `width` columns.
pub fn markdown(content: &str, width: usize) -> String {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_STRIKETHROUGH);

    let mut w = Writer::default();
    for event in Parser::new_ext(content, opts) {
        w.handle(event);
    }
    w.finish(width)
}

// ── Writer ──────────────────────────────────────────────────────────────────

/// One output line before wrapping.
struct Block {
    /// Prefix on the first wrapped line (blockquote bar, list marker).
    first: String,
    /// Prefix on continuation lines.
    rest: String,
    text: String,
    /// Code blocks keep their line breaks.
    wrap: bool,
}

#[derive(Default)]
struct Writer {
    blocks: Vec<Block>,
    /// Per-line prefixes (blockquote `│`).
    line_prefixes: Vec<&'static str>,
    /// List nesting: None = unordered, Some(n) = ordered at index n.
    list_indices: Vec<Option<u64>>,
    in_code: bool,
    link_url: Option<String>,
    /// Heading text is underlined once it closes.
    heading: Option<HeadingLevel>,
    needs_newline: bool,
}

impl Writer {
    fn prefix(&self) -> String {
        self.line_prefixes.concat()
    }

    fn push_line(&mut self, marker: &str, wrap: bool) {
        let base = self.prefix();
        let pad = " ".repeat(UnicodeWidthStr::width(marker));
        self.blocks.push(Block {
            first: format!("{base}{marker}"),
            rest: format!("{base}{pad}"),
            text: String::new(),
            wrap,
        });
    }

    fn push_text(&mut self, text: &str) {
        if self.blocks.is_empty() {
            self.push_line("", true);
        }
        if let Some(block) = self.blocks.last_mut() {
            block.text.push_str(text);
        }
    }

    fn blank_line_if_needed(&mut self) {
        if self.needs_newline {
            self.push_line("", false);
            self.needs_newline = false;
        }
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.open(tag),
            Event::End(tag) => self.close(tag),
            Event::Text(t) => self.text(t),
            Event::Code(c) => self.push_text(&c),
            Event::SoftBreak => self.push_text(" "),
            Event::HardBreak => self.push_line("", true),
            Event::Rule => {
                self.blank_line_if_needed();
                self.push_line("", false);
                self.push_text(&"─".repeat(40));
                self.needs_newline = true;
            }
            _ => {} // HTML, footnotes, math
        }
    }

    fn open(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                self.blank_line_if_needed();
                // A list item already opened a line for its marker
                if self.list_indices.is_empty() || !self.last_is_empty() {
                    self.push_line("", true);
                }
            }
            Tag::Heading { level, .. } => {
                self.blank_line_if_needed();
                self.push_line("", true);
                self.heading = Some(level);
            }
            Tag::BlockQuote(_) => {
                self.blank_line_if_needed();
                self.line_prefixes.push("│ ");
            }
            Tag::CodeBlock(_) => {
                self.blank_line_if_needed();
                self.in_code = true;
            }
            Tag::List(start) => {
                if self.list_indices.is_empty() {
                    self.blank_line_if_needed();
                }
                self.list_indices.push(start);
            }
            Tag::Item => {
                let depth = self.list_indices.len().saturating_sub(1);
                let indent = "  ".repeat(depth);
                let marker = match self.list_indices.last_mut() {
                    Some(Some(n)) => {
                        let s = format!("{indent}{n}. ");
                        *n += 1;
                        s
                    }
                    _ => format!("{indent}- "),
                };
                self.push_line(&marker, true);
            }
            Tag::Link { dest_url, .. } => self.link_url = Some(dest_url.to_string()),
            _ => {} // Emphasis, tables, images: text passes through
        }
    }

    fn close(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.needs_newline = true,
            TagEnd::Heading(_) => {
                if let Some(level) = self.heading.take() {
                    let width = self
                        .blocks
                        .last()
                        .map(|b| UnicodeWidthStr::width(b.text.as_str()))
                        .unwrap_or(0);
                    let rule = if level == HeadingLevel::H1 { "═" } else { "─" };
                    self.push_line("", false);
                    self.push_text(&rule.repeat(width));
                }
                self.needs_newline = true;
            }
            TagEnd::BlockQuote(_) => {
                self.line_prefixes.pop();
                self.needs_newline = true;
            }
            TagEnd::CodeBlock => {
                self.in_code = false;
                self.needs_newline = true;
            }
            TagEnd::List(_) => {
                self.list_indices.pop();
                self.needs_newline = true;
            }
            TagEnd::Link => {
                if let Some(url) = self.link_url.take() {
                    self.push_text(&format!(" ({url})"));
                }
            }
            _ => {}
        }
    }

    fn last_is_empty(&self) -> bool {
        self.blocks.last().is_some_and(|b| b.text.is_empty())
    }

    fn text(&mut self, cow: CowStr<'_>) {
        let text = cow.replace('\t', "    ");
        if self.in_code {
            for line in text.lines() {
                self.push_line("    ", false);
                self.push_text(line);
            }
            return;
        }
        self.push_text(&text);
    }

    fn finish(self, width: usize) -> String {
        let mut out: Vec<String> = Vec::new();
        for block in self.blocks {
            if !block.wrap || block.text.is_empty() {
                out.push(format!("{}{}", block.first, block.text).trim_end().to_string());
                continue;
            }
            let opts = textwrap::Options::new(width.max(20))
                .initial_indent(&block.first)
                .subsequent_indent(&block.rest);
            out.extend(textwrap::wrap(&block.text, opts).into_iter().map(|l| l.into_owned()));
        }
        // Drop leading/trailing blank lines
        while out.first().is_some_and(|l| l.is_empty()) {
            out.remove(0);
        }
        while out.last().is_some_and(|l| l.is_empty()) {
            out.pop();
        }
        out.join("\n")
    }
}

// ── Arabic ──────────────────────────────────────────────────────────────────

/// Wraps right-to-left text and pads each line so it ends at `width`.
pub fn right_align(text: &str, width: usize) -> Vec<String> {
    textwrap::wrap(text, width.max(20))
        .into_iter()
        .map(|line| {
            let used = UnicodeWidthStr::width(line.as_ref());
            format!("{}{}", " ".repeat(width.saturating_sub(used)), line)
        })
        .collect()
}

/// A verse as printed by `read`: Arabic right-aligned with its number in
/// Eastern Arabic digits, then the translation wrapped underneath.
pub fn verse(ayah: &Ayah, width: usize, show_translation: bool) -> String {
    let number = to_arabic_numerals(&ayah.verse_number().to_string());
    let arabic = format!("{} ﴿{}﴾", ayah.text, number);
    let mut lines = right_align(&arabic, width);
    if show_translation && let Some(t) = &ayah.translation {
        let opts = textwrap::Options::new(width.max(20))
            .initial_indent("  ")
            .subsequent_indent("  ");
        lines.push(String::new());
        lines.extend(
            textwrap::wrap(&format!("({}) {}", ayah.verse_key, t), opts)
                .into_iter()
                .map(|l| l.into_owned()),
        );
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use noor::quran::VerseKey;

    #[test]
    fn heading_is_underlined() {
        let out = markdown("## Hello", 80);
        assert_eq!(out, "Hello\n─────");
    }

    #[test]
    fn emphasis_is_flattened() {
        assert_eq!(markdown("Some **bold** and *soft* text", 80), "Some bold and soft text");
    }

    #[test]
    fn paragraphs_are_separated_and_wrapped() {
        let out = markdown("one two three four five six seven eight nine ten\n\nnext", 20);
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines.iter().all(|l| UnicodeWidthStr::width(*l) <= 20), "{lines:?}");
        assert_eq!(lines.last(), Some(&"next"));
        assert!(lines.contains(&""));
    }

    #[test]
    fn lists_get_markers_and_hanging_indent() {
        let out = markdown("- first\n- second item that is long enough to wrap", 24);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "- first");
        assert!(lines[1].starts_with("- second"));
        assert!(lines[2].starts_with("  "));

        let out = markdown("1. a\n2. b", 40);
        assert_eq!(out, "1. a\n2. b");
    }

    #[test]
    fn blockquote_has_bar() {
        assert_eq!(markdown("> patience", 40), "│ patience");
    }

    #[test]
    fn link_url_is_appended() {
        assert_eq!(markdown("[quran](https://quran.com)", 80), "quran (https://quran.com)");
    }

    #[test]
    fn right_align_pads_to_width() {
        let lines = right_align("بِسْمِ ٱللَّهِ", 30);
        assert_eq!(lines.len(), 1);
        assert_eq!(UnicodeWidthStr::width(lines[0].as_str()), 30);
        assert!(lines[0].ends_with("ٱللَّهِ"));
    }

    #[test]
    fn verse_shows_arabic_number_and_translation() {
        let ayah = Ayah {
            id: 1,
            verse_key: VerseKey::new(1, 1).unwrap(),
            text: "بِسْمِ ٱللَّهِ ٱلرَّحْمَٰنِ ٱلرَّحِيمِ".to_string(),
            translation: Some("In the Name of Allah".to_string()),
        };
        let out = verse(&ayah, 60, true);
        assert!(out.contains("﴿١﴾"));
        assert!(out.contains("(1:1) In the Name of Allah"));
        assert!(!verse(&ayah, 60, false).contains("In the Name"));
    }
}
