//! Markdown to plaintext rendering.
//!
//! The pipeline walks pulldown-cmark events instead of producing HTML, so no
//! markup or entities ever reach the output. Inline text nodes concatenate
//! directly; block boundaries become line breaks; everything is collapsed to
//! single spaces at the end. Bare `$$` math delimiters are dropped and
//! `[[target]]` / `[[target|alias]]` cross-references resolve to their
//! display text.
//!
//! The function is pure. It runs once per note at index-build time and again
//! at query time for snippet derivation, so the displayed snippet always
//! matches the indexed text.

use std::sync::LazyLock;

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use regex::{Captures, Regex};

static WIKILINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[([^\]|]+)(?:\|([^\]]+))?\]\]").expect("wikilink pattern")
});

/// Render a Markdown body to plaintext.
pub fn to_plaintext(markdown: &str) -> String {
    let options =
        Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES | Options::ENABLE_TASKLISTS;
    let parser = Parser::new_ext(markdown, options);

    let mut text = String::new();
    let mut image_depth = 0usize;

    for event in parser {
        match event {
            Event::Start(Tag::Image { .. }) => image_depth += 1,
            Event::End(TagEnd::Image) => image_depth = image_depth.saturating_sub(1),
            // Alt text of images never reaches the output.
            _ if image_depth > 0 => {}
            Event::Text(t) | Event::Code(t) => text.push_str(&t),
            Event::SoftBreak | Event::HardBreak => text.push('\n'),
            Event::End(tag) => match tag {
                // Inline spans concatenate directly, like text nodes do.
                TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link => {}
                // Every other tag closes a block.
                _ => text.push('\n'),
            },
            // HTML fragments are markup, not content.
            Event::Html(_) | Event::InlineHtml(_) => {}
            _ => {}
        }
    }

    let text = text.replace("$$", "");
    let text = WIKILINK.replace_all(&text, |caps: &Captures| {
        caps.get(2)
            .or_else(|| caps.get(1))
            .map(|m| m.as_str())
            .unwrap_or_default()
            .to_string()
    });

    // Collapse all whitespace runs to single spaces and trim the ends.
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
