//! Whole-pipeline properties over malformed and generated markup.

use proptest::prelude::*;
use xsml_lexer::{Scanner, TokenKind};
use xsml_parser::{parse, Document, NodeId, StructuralIndex};
use xsml_vocabulary::{DataVocabulary, Vocabulary};

// =============================================================================
// Corpus
// =============================================================================

const CORPUS: &[&str] = &[
    "",
    "<",
    "</",
    "<>",
    "</>",
    "<!",
    "<!--",
    "<!-- -- >",
    "<div",
    "<div ",
    "<div class",
    "<div class=",
    "<div class=\"",
    "<div class='a",
    "<div class=a/>",
    "<a><b></a>",
    "<a><b><c></b></c></a>",
    "</p></p><p>",
    "<br><br/><br></br>",
    "<ul><li>a<li>b</ul>",
    "<div<span></span>",
    "<a href=\"x\"<b>",
    "<script>if (a < b) { x = '</scr' + 'ipt>'; }</script>",
    "<script><!-- <script> </script> --></script>",
    "<style>a{}</style",
    "<DIV></div>",
    "<x-a.b:c_d></x-a.b:c_d>",
    "<p>caf\u{e9} \u{1F600}</p><\u{e9}>",
    "<a \u{e9}t\u{e9}=\u{fc}ber>",
    "<!DOCTYPE html><html><head><title>t</title></head><body></body></html>",
    "<![CDATA[ x ]]>",
    "< div>",
    "<div/ >",
    "text only",
    "<a b c d=e f='g' h=\"i\" j=>",
];

fn vocab() -> &'static DataVocabulary {
    DataVocabulary::html()
}

// =============================================================================
// Checks
// =============================================================================

/// Tokens tile the input and end with exactly one `Eof`.
fn check_scanner(text: &str) {
    let tokens: Vec<_> = Scanner::new(text, 0, vocab()).collect();
    let eofs = tokens.iter().filter(|t| t.kind == TokenKind::Eof).count();
    assert_eq!(eofs, 1, "{text:?}");
    assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));

    let mut rebuilt = String::new();
    let mut expected = 0;
    for token in &tokens {
        assert_eq!(token.span.start, expected, "{text:?}: gap before {token:?}");
        rebuilt.push_str(token.text);
        expected = token.span.end;
    }
    assert_eq!(rebuilt, text);
}

/// Boundaries are ordered and children nest inside their parent.
fn check_tree(text: &str, doc: &Document) {
    let root = doc.node(doc.root());
    assert_eq!(root.tag, None);
    assert_eq!((root.start, root.end), (0, text.len()));

    let mut pending = vec![doc.root()];
    while let Some(id) = pending.pop() {
        let node = doc.node(id);
        assert!(node.start <= node.end, "{text:?}: {node:?}");
        assert!(node.start <= node.content_start(), "{text:?}: {node:?}");
        assert!(node.content_start() <= node.content_end(), "{text:?}: {node:?}");
        assert!(node.content_end() <= node.end, "{text:?}: {node:?}");

        if node.tag.as_deref().is_some_and(|t| vocab().is_void(t)) {
            assert!(node.children.is_empty(), "{text:?}: void with children");
            assert!(node.closed, "{text:?}: void not closed");
        }

        let mut previous_end = node.start;
        for &child_id in &node.children {
            let child = doc.node(child_id);
            assert_eq!(child.parent, Some(id));
            assert!(child.start >= previous_end, "{text:?}: overlapping siblings");
            assert!(child.end <= node.end, "{text:?}: child escapes parent");
            previous_end = child.end;
            pending.push(child_id);
        }
    }
}

/// Every matched name points back to where it came from.
fn check_matching_symmetry(text: &str, doc: &Document) {
    let index = StructuralIndex::new(doc);
    for offset in 0..=text.len() {
        if let Some(found) = index.matching_tag(offset) {
            let back = index
                .matching_tag(found.counterpart.start)
                .unwrap_or_else(|| panic!("{text:?}: no way back from {offset}"));
            assert_eq!(back.counterpart, found.current, "{text:?} at {offset}");
            let current = &text[found.current.start..found.current.end];
            let counterpart = &text[found.counterpart.start..found.counterpart.end];
            assert!(current.eq_ignore_ascii_case(counterpart), "{text:?} at {offset}");
        }
    }
}

/// `node_at` returns a node covering the offset.
fn check_node_at(text: &str, doc: &Document) {
    let index = StructuralIndex::new(doc);
    for offset in 0..=text.len() {
        let id: NodeId = index.node_at(offset).expect("offset in range");
        let node = doc.node(id);
        assert!(node.start <= offset && offset <= node.end, "{text:?} at {offset}");
    }
    assert_eq!(index.node_at(text.len() + 1), None);
}

fn check_all(text: &str) {
    check_scanner(text);
    let doc = parse(text, vocab());
    check_tree(text, &doc);
    check_matching_symmetry(text, &doc);
    check_node_at(text, &doc);
}

// =============================================================================
// Tests
// =============================================================================

#[test]
fn test_corpus_properties() {
    for text in CORPUS {
        check_all(text);
    }
}

#[test]
fn test_scanner_restarts_at_every_offset() {
    for text in CORPUS {
        for offset in (0..=text.len()).filter(|&o| text.is_char_boundary(o)) {
            let tokens: Vec<_> = Scanner::new(text, offset, vocab()).collect();
            assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
            assert_eq!(tokens[0].span.start, offset);
        }
    }
}

#[test]
fn test_void_rule() {
    let doc = parse("<br><span>x</span>", vocab());
    let tags: Vec<_> = doc
        .children(doc.root())
        .iter()
        .map(|&id| doc.node(id).tag.clone())
        .collect();
    assert_eq!(tags, vec![Some("br".to_string()), Some("span".to_string())]);
}

#[test]
fn test_mismatched_close_recovery() {
    let doc = parse("<a><b></a>", vocab());
    let a = doc.children(doc.root())[0];
    let b = doc.children(a)[0];
    assert!(doc.node(a).closed);
    assert!(!doc.node(b).closed);
}

proptest! {
    #[test]
    fn test_generated_markup(text in "[<>/=\"' !a-dipv\\-\u{e9}]{0,48}") {
        check_all(&text);
    }

    #[test]
    fn test_generated_tag_soup(
        parts in prop::collection::vec(
            prop_oneof![
                Just("<div>"), Just("</div>"), Just("<p "), Just("</p>"),
                Just("<br>"), Just("<script>"), Just("</script>"), Just("<!--"),
                Just("-->"), Just(" class=\"a"), Just("\""), Just("text"),
                Just("<"), Just(">"), Just("/>"),
            ],
            0..16,
        )
    ) {
        check_all(&parts.concat());
    }
}
