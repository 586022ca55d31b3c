//! Content segmentation: raw page markup → bounded-length text chunks.
//!
//! Strips comments, script/style/hidden elements, splits the remaining text
//! on terminal punctuation, and greedily packs the fragments into chunks of
//! at most the configured bound. Only the final remainder segment of a page
//! may fall short of a full buffer; no chunk is ever empty.

use std::sync::LazyLock;

use ego_tree::NodeRef;
use regex::Regex;
use scraper::node::Element;
use scraper::{Html, Node};

use answerscout_shared::ContentChunk;

/// Elements whose text never counts as page content.
const EXCLUDED_TAGS: &[&str] = &["script", "style", "noscript", "iframe", "head", "template"];

/// Sentence-like fragments: runs of text closed by terminal punctuation.
static SENTENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^.!?]+[.!?]+").expect("invalid sentence regex")
});

/// Segment a page into ordered content chunks.
///
/// Chunk identifiers are `chunk_<page_id>_<seq>` with a zero-based sequence
/// counter. Pages that yield no visible text produce zero chunks.
pub fn segment_page(html: &str, page_id: &str, max_chars: usize) -> Vec<ContentChunk> {
    let text = visible_text(html);
    let mut chunks = Vec::new();
    let mut buffer = String::new();
    let mut seq = 0usize;

    let close = |buffer: &mut String, seq: &mut usize, chunks: &mut Vec<ContentChunk>| {
        let content = buffer.trim().to_string();
        if !content.is_empty() {
            chunks.push(ContentChunk {
                id: format!("chunk_{page_id}_{seq}"),
                content,
                embedding: None,
                urls: Vec::new(),
                parent_page_id: page_id.to_string(),
            });
            *seq += 1;
        }
        buffer.clear();
    };

    for fragment in SENTENCE_RE.find_iter(&text) {
        let fragment = fragment.as_str().trim();
        if fragment.is_empty() {
            continue;
        }

        // A single fragment longer than the bound is hard-split so no
        // emitted chunk exceeds it.
        if fragment.len() > max_chars {
            close(&mut buffer, &mut seq, &mut chunks);
            for piece in split_at_chars(fragment, max_chars) {
                buffer.push_str(piece);
                close(&mut buffer, &mut seq, &mut chunks);
            }
            continue;
        }

        if !buffer.is_empty() && buffer.len() + 1 + fragment.len() > max_chars {
            close(&mut buffer, &mut seq, &mut chunks);
        }
        if !buffer.is_empty() {
            buffer.push(' ');
        }
        buffer.push_str(fragment);
    }

    close(&mut buffer, &mut seq, &mut chunks);
    chunks
}

/// Extract the visible text of a document, whitespace-collapsed.
fn visible_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    let mut raw = String::new();
    collect_text(doc.tree.root(), &mut raw);

    // Collapse whitespace runs into single spaces.
    let mut out = String::with_capacity(raw.len());
    let mut last_was_space = true;
    for ch in raw.chars() {
        if ch.is_whitespace() {
            if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
        } else {
            out.push(ch);
            last_was_space = false;
        }
    }
    out.trim().to_string()
}

fn collect_text(node: NodeRef<'_, Node>, out: &mut String) {
    let value: &Node = node.value();
    match value {
        Node::Text(text) => {
            out.push_str(&text.text);
            out.push(' ');
        }
        Node::Element(element) => {
            if EXCLUDED_TAGS.contains(&element.name()) || is_hidden(element) {
                return;
            }
            for child in node.children() {
                collect_text(child, out);
            }
        }
        // Comments and doctypes contribute nothing; documents and fragments
        // just recurse.
        Node::Comment(_) | Node::Doctype(_) | Node::ProcessingInstruction(_) => {}
        _ => {
            for child in node.children() {
                collect_text(child, out);
            }
        }
    }
}

fn is_hidden(element: &Element) -> bool {
    if element.attr("hidden").is_some() {
        return true;
    }
    if element.classes().any(|c| c == "hidden") {
        return true;
    }
    if let Some(style) = element.attr("style") {
        let compact: String = style.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.contains("display:none") {
            return true;
        }
    }
    false
}

/// Split a string into pieces of at most `max_chars` characters.
fn split_at_chars(s: &str, max_chars: usize) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut count = 0;
    for (idx, _) in s.char_indices() {
        if count == max_chars {
            pieces.push(&s[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    if start < s.len() {
        pieces.push(&s[start..]);
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_scripts_styles_and_comments() {
        let html = r#"<html><head><style>body { color: red; }</style></head><body>
            <!-- navigation boilerplate -->
            <script>var tracking = true;</script>
            <p>Visible sentence one.</p>
            <noscript>Enable JS.</noscript>
        </body></html>"#;

        let chunks = segment_page(html, "p1", 1000);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "Visible sentence one.");
    }

    #[test]
    fn strips_hidden_elements() {
        let html = r#"<body>
            <div hidden>Hidden attribute text.</div>
            <div class="hidden">Hidden class text.</div>
            <div style="display: none">Inline hidden text.</div>
            <p>Shown text here.</p>
        </body>"#;

        let chunks = segment_page(html, "p1", 1000);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "Shown text here.");
    }

    #[test]
    fn empty_page_yields_zero_chunks() {
        let chunks = segment_page("<html><body></body></html>", "p1", 1000);
        assert!(chunks.is_empty());

        // Text without terminal punctuation produces no fragments either.
        let chunks = segment_page("<body>no punctuation at all</body>", "p1", 1000);
        assert!(chunks.is_empty());
    }

    #[test]
    fn chunk_ids_are_stable_and_sequential() {
        let html = "<body><p>First sentence. Second sentence.</p></body>";
        let chunks = segment_page(html, "page42", 1000);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].id, "chunk_page42_0");
        assert_eq!(chunks[0].parent_page_id, "page42");
    }

    #[test]
    fn chunks_respect_length_bound() {
        // Twelve ~60-char sentences against a 200-char bound.
        let body: String = (0..12)
            .map(|i| format!("Sentence number {i} padded with filler words to gain length. "))
            .collect();
        let html = format!("<body><p>{body}</p></body>");

        let chunks = segment_page(&html, "p1", 200);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(
                chunk.content.len() <= 200,
                "chunk {} has {} chars",
                chunk.id,
                chunk.content.len()
            );
            assert!(!chunk.content.is_empty());
        }
    }

    #[test]
    fn remainder_becomes_final_chunk() {
        let html = "<body><p>A long opening sentence that fills most of the space available. Tail.</p></body>";
        let chunks = segment_page(html, "p1", 65);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].content, "Tail.");
    }

    #[test]
    fn oversized_fragment_is_hard_split() {
        let long = format!("{}.", "x".repeat(450));
        let html = format!("<body><p>{long}</p></body>");
        let chunks = segment_page(&html, "p1", 200);
        assert!(chunks.len() >= 2);
        for chunk in &chunks[..chunks.len() - 1] {
            assert!(chunk.content.len() <= 200);
        }
    }

    #[test]
    fn hard_split_holds_at_exact_boundary() {
        // A sentence of bound * 2 + 1 characters sitting mid-page: every
        // piece, including the split remainders, must stay within the bound.
        let long = format!("{}.", "x".repeat(400));
        let html = format!("<body><p>{long} Trailing sentence closes the page.</p></body>");
        let chunks = segment_page(&html, "p1", 200);

        assert!(chunks.len() >= 3);
        for chunk in &chunks {
            assert!(
                chunk.content.len() <= 200,
                "chunk {} has {} chars",
                chunk.id,
                chunk.content.len()
            );
        }
        assert_eq!(chunks.last().unwrap().content, "Trailing sentence closes the page.");

        // One char over the bound must still split.
        let barely = format!("{}.", "y".repeat(200));
        let html = format!("<body><p>{barely}</p></body>");
        let chunks = segment_page(&html, "p1", 200);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].content.len(), 200);
        assert_eq!(chunks[1].content, ".");
    }
}
