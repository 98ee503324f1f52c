//! Folding ranges for elements, comments and `#region` markers.

use std::cmp::Reverse;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use xsml_parser::Document;

use crate::config::FoldingConfig;
use crate::text::LineIndex;

static REGION_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*#(region|endregion)\b").expect("valid region regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FoldingRangeKind {
    Comment,
    Region,
}

/// A foldable byte range with the lines it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FoldingRange {
    pub start: usize,
    pub end: usize,
    pub start_line: usize,
    pub end_line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<FoldingRangeKind>,
}

/// Folding ranges of `document`, sorted by start.
///
/// An element folds from the end of its start tag to its own end, so the
/// start tag stays visible. When two ranges begin on the same line only the
/// innermost is kept.
pub fn folding_ranges(text: &str, document: &Document, config: &FoldingConfig) -> Vec<FoldingRange> {
    if text.len() != document.text_len() {
        return Vec::new();
    }
    let lines = LineIndex::new(text);
    let mut ranges = Vec::new();
    let mut push = |start: usize, end: usize, kind: Option<FoldingRangeKind>| {
        let (start_line, end_line) = (lines.line_of(start), lines.line_of(end));
        if start_line < end_line {
            ranges.push(FoldingRange {
                start,
                end,
                start_line,
                end_line,
                kind,
            });
        }
    };

    for id in document.elements() {
        let node = document.node(id);
        if let Some(start_tag_end) = node.start_tag_end {
            push(start_tag_end, node.end, None);
        }
    }

    let mut regions = Vec::new();
    for comment in document.comments() {
        let Some(content) = text.get(comment.content.start..comment.content.end) else {
            continue;
        };
        match REGION_MARKER.captures(content).and_then(|c| c.get(1)) {
            Some(marker) if marker.as_str() == "region" => regions.push(comment.span.start),
            Some(_) => {
                if let Some(start) = regions.pop() {
                    push(start, comment.span.end, Some(FoldingRangeKind::Region));
                }
            }
            None => push(comment.span.start, comment.span.end, Some(FoldingRangeKind::Comment)),
        }
    }

    // innermost first within a start line
    ranges.sort_by_key(|r| (r.start_line, Reverse(r.start), r.end));
    ranges.dedup_by_key(|r| r.start_line);
    ranges.sort_by_key(|r| (r.start, Reverse(r.end)));

    match config.range_limit {
        Some(limit) if ranges.len() > limit => limit_ranges(ranges, limit),
        _ => ranges,
    }
}

/// Keep at most `limit` ranges, dropping the deepest nesting levels first.
/// Within the last level that partly fits, earlier ranges win.
fn limit_ranges(ranges: Vec<FoldingRange>, limit: usize) -> Vec<FoldingRange> {
    let mut levels = Vec::with_capacity(ranges.len());
    let mut open: Vec<usize> = Vec::new();
    for range in &ranges {
        while open.last().is_some_and(|&end_line| range.start_line > end_line) {
            open.pop();
        }
        levels.push(open.len());
        open.push(range.end_line);
    }

    let max_level = levels.iter().copied().max().unwrap_or(0);
    let mut per_level = vec![0usize; max_level + 1];
    for &level in &levels {
        per_level[level] += 1;
    }

    // deepest level kept in full, and how many ranges that leaves room for
    let mut kept = 0;
    let mut cutoff = per_level.len();
    for (level, &count) in per_level.iter().enumerate() {
        if kept + count > limit {
            cutoff = level;
            break;
        }
        kept += count;
    }

    let mut room = limit - kept;
    ranges
        .into_iter()
        .zip(levels)
        .filter(|&(_, level)| {
            if level < cutoff {
                true
            } else if level == cutoff && room > 0 {
                room -= 1;
                true
            } else {
                false
            }
        })
        .map(|(range, _)| range)
        .collect()
}
