//! Marking search-term occurrences in titles.

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// A run of title text, highlighted when it matches the search term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub highlighted: bool,
}

impl Segment {
    fn new(text: String, highlighted: bool) -> Self {
        Self { text, highlighted }
    }
}

/// Split `text` into segments, marking every occurrence of `term`.
///
/// Matching ignores case and accents ("acao" matches "Ação"). A blank term
/// yields the whole text as one plain segment.
pub fn highlight(text: &str, term: &str) -> Vec<Segment> {
    let term = term.trim();
    if term.is_empty() || text.is_empty() {
        return vec![Segment::new(text.to_string(), false)];
    }

    let chars: Vec<char> = text.chars().collect();
    let (folded, origin) = fold(&chars);
    let (needle, _) = fold(&term.chars().collect::<Vec<_>>());

    let mut marks = vec![false; chars.len()];
    if !needle.is_empty() {
        let mut start = 0;
        while start + needle.len() <= folded.len() {
            if folded[start..start + needle.len()] == needle[..] {
                let first = origin[start];
                let last = origin[start + needle.len() - 1];
                for mark in &mut marks[first..=last] {
                    *mark = true;
                }
                start += needle.len();
            } else {
                start += 1;
            }
        }
    }

    // Characters dropped by folding (combining marks) follow their base.
    for i in 1..chars.len() {
        if !origin.contains(&i) {
            marks[i] = marks[i - 1];
        }
    }

    let mut segments: Vec<Segment> = Vec::new();
    for (c, mark) in chars.into_iter().zip(marks) {
        match segments.last_mut() {
            Some(last) if last.highlighted == mark => last.text.push(c),
            _ => segments.push(Segment::new(c.to_string(), mark)),
        }
    }
    segments
}

/// Lowercase and strip accents. Returns the folded characters and, for each,
/// the index of the source character it came from.
fn fold(chars: &[char]) -> (Vec<char>, Vec<usize>) {
    let mut folded = Vec::with_capacity(chars.len());
    let mut origin = Vec::with_capacity(chars.len());

    for (i, c) in chars.iter().enumerate() {
        for lower in c.to_lowercase() {
            for base in std::iter::once(lower).nfd().filter(|c| !is_combining_mark(*c)) {
                folded.push(base);
                origin.push(i);
            }
        }
    }
    (folded, origin)
}
