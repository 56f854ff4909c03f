//! Rich-text markup transformer.
//!
//! Converts one message body's markup into plain prose paragraphs and an
//! ordered list of image URLs. Only `img`, `br`, and `p` elements carry
//! meaning here; everything else contributes bare text.

use scraper::{ElementRef, Html, Node, Selector};

/// Minimal entity set decoded on extracted text, after parser-level decoding
///
/// The parser resolves entities once at parse time; this second pass decodes
/// one more level, so double-encoded content (`&amp;amp;`) comes out fully
/// decoded. Entities outside this set that survive both passes are left
/// unchanged.
const ENTITIES: &[(&str, &str)] = &[
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&nbsp;", " "),
];

/// Result of transforming one markup string
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MarkupContent {
    /// Paragraph text, paragraphs separated by blank lines
    pub prose: String,
    /// Image URLs in document order
    pub images: Vec<String>,
}

fn selector(css: &str) -> Selector {
    // Static known-good selectors; parse cannot fail
    #[allow(clippy::expect_used)]
    Selector::parse(css).expect("valid static selector")
}

/// Transform one rich-text markup string
///
/// Extracts every image reference in document order, turns `br` elements into
/// newlines, and appends each `p` element's decoded text followed by a blank
/// line. Non-breaking spaces are normalized to plain spaces. Empty input
/// yields an empty result.
pub fn transform(markup: &str) -> MarkupContent {
    if markup.trim().is_empty() {
        return MarkupContent::default();
    }

    let fragment = Html::parse_fragment(markup);

    let mut images = Vec::new();
    for img in fragment.select(&selector("img")) {
        if let Some(src) = img.value().attr("src") {
            let src = src.trim();
            if !src.is_empty() {
                images.push(src.to_string());
            }
        }
    }

    let mut prose = String::new();
    for paragraph in fragment.select(&selector("p")) {
        let mut text = String::new();
        collect_text(paragraph, &mut text);
        prose.push_str(text.trim());
        prose.push_str("\n\n");
    }

    MarkupContent {
        prose: decode_entities(prose.trim()).replace('\u{a0}', " "),
        images,
    }
}

/// Accumulate an element's text content, with `br` elements as newlines
fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if el.name() == "br" => out.push('\n'),
            Node::Element(_) => {
                if let Some(nested) = ElementRef::wrap(child) {
                    collect_text(nested, out);
                }
            }
            _ => {}
        }
    }
}

/// Decode the minimal entity set in a single left-to-right pass
fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        match ENTITIES.iter().find(|(name, _)| rest.starts_with(name)) {
            Some((name, decoded)) => {
                out.push_str(decoded);
                rest = &rest[name.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}
