//! Text helpers shared by the services: line lookup and fuzzy scoring.

/// Line start offsets of a text, for offset-to-line conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    /// `\n`, `\r\n` and lone `\r` all end a line.
    pub fn new(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut starts = vec![0];
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\r' if bytes.get(i + 1) == Some(&b'\n') => {
                    starts.push(i + 2);
                    i += 2;
                    continue;
                }
                b'\r' | b'\n' => starts.push(i + 1),
                _ => {}
            }
            i += 1;
        }
        Self { starts }
    }

    /// Zero-based line containing `offset`.
    pub fn line_of(&self, offset: usize) -> usize {
        self.starts.partition_point(|&start| start <= offset) - 1
    }

    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.starts.get(line).copied()
    }

    pub fn line_count(&self) -> usize {
        self.starts.len()
    }
}

/// Whether `offset` is inside `text` and on a character boundary.
pub fn is_valid_offset(text: &str, offset: usize) -> bool {
    text.is_char_boundary(offset)
}

/// Similarity of two strings: longest common subsequence length, minus the
/// square root of the length difference. Strings whose lengths differ by
/// more than `max_len_delta` score 0.
pub fn difference(first: &str, second: &str, max_len_delta: usize) -> f64 {
    let first: Vec<char> = first.chars().collect();
    let second: Vec<char> = second.chars().collect();
    let length_difference = first.len().abs_diff(second.len());
    if length_difference > max_len_delta {
        return 0.0;
    }

    // two-row LCS table
    let mut previous = vec![0usize; second.len() + 1];
    let mut current = vec![0usize; second.len() + 1];
    for a in &first {
        for (j, b) in second.iter().enumerate() {
            current[j + 1] = if a == b {
                previous[j] + 1
            } else {
                previous[j + 1].max(current[j])
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[second.len()] as f64 - (length_difference as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_line_index() {
        let index = LineIndex::new("a\nbc\r\nd\re");
        assert_eq!(index.line_count(), 4);
        assert_eq!(index.line_of(0), 0);
        assert_eq!(index.line_of(1), 0);
        assert_eq!(index.line_of(2), 1);
        assert_eq!(index.line_of(6), 2);
        assert_eq!(index.line_of(8), 3);
        assert_eq!(index.line_start(1), Some(2));
        assert_eq!(index.line_start(9), None);
    }

    #[test]
    fn test_difference_exact_and_partial() {
        assert_eq!(difference("class", "class", 4), 5.0);
        assert_eq!(difference("clas", "class", 4), 4.0 - 1.0);
        assert_eq!(difference("", "", 4), 0.0);
    }

    #[test]
    fn test_difference_length_cutoff() {
        assert_eq!(difference("a", "abcdefg", 4), 0.0);
    }

    #[test]
    fn test_difference_is_a_real_lcs() {
        // "ace" is a subsequence of "abcde"
        let score = difference("ace", "abcde", 4);
        assert!((score - (3.0 - 2f64.sqrt())).abs() < 1e-9);
        // no characters in common
        assert!(difference("xyz", "abc", 4) < 0.5);
    }

    #[test]
    fn test_closer_strings_score_higher() {
        assert!(difference("clas", "class", 4) > difference("clas", "accesskey", 4));
        assert!(difference("clas", "class", 4) > difference("clas", "slot", 4));
    }
}
