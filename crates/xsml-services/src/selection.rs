//! Selection ranges: the chain of ever-larger constructs around a cursor.

use xsml_lexer::Span;
use xsml_parser::{Document, Node, NodeId, StructuralIndex};

/// One chain per offset, innermost span first. Every span strictly
/// contains the one before it; the last is the whole document.
///
/// An out-of-range offset gets an empty chain.
pub fn selection_ranges(document: &Document, offsets: &[usize]) -> Vec<Vec<Span>> {
    let index = StructuralIndex::new(document);
    offsets
        .iter()
        .map(|&offset| selection_chain(&index, offset))
        .collect()
}

fn selection_chain(index: &StructuralIndex<'_>, offset: usize) -> Vec<Span> {
    let Some(id) = index.node_at(offset) else {
        return Vec::new();
    };
    let document = index.document();
    let node = document.node(id);

    let mut candidates = Vec::new();
    if !node.is_root() {
        let start_tag_end = node.start_tag_end.unwrap_or(node.end);
        if offset < start_tag_end {
            start_tag_ranges(node, offset, &mut candidates);
        } else if let Some(end_tag_start) = node.end_tag_start.filter(|&e| offset > e) {
            if let Some(name) = node.end_name_span.filter(|n| n.touches(offset)) {
                candidates.push(name);
            }
            candidates.push(Span::new(end_tag_start, node.end));
        } else if node.start_tag_end.is_some() {
            candidates.push(Span::new(node.content_start(), node.content_end()));
        }
    }
    candidates.push(node.span());
    candidates.extend(enclosing_ranges(document, id));

    let mut chain: Vec<Span> = Vec::with_capacity(candidates.len());
    for span in candidates {
        let grows = chain
            .last()
            .map_or(true, |&inner| span != inner && span.contains_span(inner));
        if grows {
            chain.push(span);
        }
    }
    chain
}

/// Attribute value, attribute, tag interior and the whole start tag.
fn start_tag_ranges(node: &Node, offset: usize, out: &mut Vec<Span>) {
    if let Some(attribute) = node.attributes.iter().find(|a| a.span().touches(offset)) {
        match attribute.value_span.filter(|v| v.touches(offset)) {
            Some(value) => {
                if let Some(content) = attribute.value_content_span().filter(|c| c.touches(offset)) {
                    out.push(content);
                }
                out.push(value);
            }
            None => out.push(attribute.name_span),
        }
        out.push(attribute.span());
    }

    let interior_end = match node.start_tag_end {
        Some(end) if node.self_closing => end.saturating_sub(2),
        Some(end) => end - 1,
        None => node.end,
    };
    if interior_end > node.start {
        let interior = Span::new(node.start + 1, interior_end);
        if interior.touches(offset) {
            out.push(interior);
        }
    }
    if let Some(end) = node.start_tag_end {
        out.push(Span::new(node.start, end));
    }
}

/// Content and span of every ancestor, nearest first.
fn enclosing_ranges(document: &Document, id: NodeId) -> impl Iterator<Item = Span> + '_ {
    document.ancestors(id).flat_map(move |ancestor| {
        let node = document.node(ancestor);
        let content = node
            .start_tag_end
            .map(|_| Span::new(node.content_start(), node.content_end()));
        content.into_iter().chain(std::iter::once(node.span()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use xsml_parser::parse;
    use xsml_vocabulary::DataVocabulary;

    fn chain(text: &str, offset: usize) -> Vec<(usize, usize)> {
        let doc = parse(text, DataVocabulary::html());
        selection_ranges(&doc, &[offset])
            .remove(0)
            .into_iter()
            .map(|s| (s.start, s.end))
            .collect()
    }

    #[test]
    fn test_inside_quoted_value() {
        let text = r#"<div class="a b">text</div>"#;
        assert_eq!(
            chain(text, 13),
            vec![(12, 15), (11, 16), (5, 16), (1, 16), (0, 17), (0, 27)]
        );
    }

    #[test]
    fn test_on_attribute_name() {
        let text = r#"<div class="a">x</div>"#;
        assert_eq!(chain(text, 7), vec![(5, 10), (5, 14), (1, 14), (0, 15), (0, 22)]);
    }

    #[test]
    fn test_in_content() {
        let text = "<div>text</div>";
        assert_eq!(chain(text, 7), vec![(5, 9), (0, 15)]);
    }

    #[test]
    fn test_nested_elements() {
        let text = "<ul><li>a</li></ul>";
        assert_eq!(chain(text, 8), vec![(8, 9), (4, 14), (0, 19)]);
    }

    #[test]
    fn test_in_end_tag() {
        let text = "<ul><li>a</li></ul>";
        assert_eq!(chain(text, 11), vec![(11, 13), (9, 14), (4, 14), (0, 19)]);
    }

    #[test]
    fn test_self_closing_tag() {
        let text = r#"<p><img src="x"/></p>"#;
        assert_eq!(chain(text, 5), vec![(4, 15), (3, 17), (0, 21)]);
        assert_eq!(
            chain(text, 13),
            vec![(13, 14), (12, 15), (8, 15), (4, 15), (3, 17), (0, 21)]
        );
    }

    #[test]
    fn test_between_slash_and_close_of_self_closing_tag() {
        let text = r#"<div id="x"><span class='a'>t</span><br><img/></div>"#;
        // the cursor sits after `/`, outside the `img` interior
        assert_eq!(chain(text, 45), vec![(40, 46), (12, 46), (0, 52)]);
        let text = r#"<p><img src="x"/></p>"#;
        assert_eq!(chain(text, 16), vec![(3, 17), (0, 21)]);
    }

    #[test]
    fn test_multiple_offsets() {
        let doc = parse("<p>a</p><p>b</p>", DataVocabulary::html());
        let chains = selection_ranges(&doc, &[3, 11, 99]);
        assert_eq!(chains.len(), 3);
        assert_eq!(chains[0][0], Span::new(3, 4));
        assert_eq!(chains[1][0], Span::new(11, 12));
        assert_eq!(chains[2], vec![]);
    }

    #[test]
    fn test_chains_strictly_grow_everywhere() {
        let texts = [
            r#"<div id="x"><span class='a'>t</span><br><img/></div>"#,
            "<ul><li>a<li>b</ul><p",
            "<a href=\"x\"<b>",
            "<div></span>",
            "",
        ];
        for text in texts {
            let doc = parse(text, DataVocabulary::html());
            let offsets: Vec<usize> = (0..=text.len()).collect();
            for (offset, chain) in offsets.iter().zip(selection_ranges(&doc, &offsets)) {
                assert!(!chain.is_empty(), "{text:?} at {offset}");
                assert_eq!(chain.last(), Some(&Span::new(0, text.len())));
                for pair in chain.windows(2) {
                    assert!(pair[1] != pair[0] && pair[1].contains_span(pair[0]), "{text:?} at {offset}: {chain:?}");
                }
                assert!(chain[0].touches(*offset), "{text:?} at {offset}: {chain:?}");
            }
        }
    }
}
