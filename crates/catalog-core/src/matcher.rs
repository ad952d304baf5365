//! Fuzzy path search.
//!
//! A candidate matches when every character of the query appears in its
//! path in order (an ordered subsequence). Matching is case-insensitive. The
//! tag is never matched against.

use crate::storage::TaggedPath;
use std::cmp::Ordering;

const FIRST_CHAR_BONUS: i64 = 10;
const BOUNDARY_BONUS: i64 = 10;
const ADJACENT_BONUS: i64 = 5;
const GAP_START_PENALTY: i64 = -10;
const GAP_EXTENSION_PENALTY: i64 = -1;
const LEADING_PENALTY: i64 = -5;
const MAX_LEADING_PENALTY: i64 = -15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMatch<'a> {
    pub candidate: &'a TaggedPath,
    pub score: i64,
    /// The query spells out the whole path.
    pub exact: bool,
    /// Char positions in `candidate.path` that matched the query.
    pub matched: Vec<usize>,
}

pub struct PathMatcher;

impl PathMatcher {
    /// Ranks every candidate whose path contains `query` as a subsequence.
    ///
    /// Whole-path matches come first, then higher scores; equal scores keep
    /// candidate order. An empty query matches nothing.
    pub fn find<'a>(query: &str, candidates: &'a [TaggedPath]) -> Vec<PathMatch<'a>> {
        let query: Vec<char> = query.chars().collect();
        if query.is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<PathMatch<'a>> = candidates
            .iter()
            .filter_map(|candidate| score(&query, candidate))
            .collect();

        // stable sort keeps candidate order among ties
        matches.sort_by(|a, b| match b.exact.cmp(&a.exact) {
            Ordering::Equal => b.score.cmp(&a.score),
            other => other,
        });
        matches
    }
}

fn score<'a>(query: &[char], candidate: &'a TaggedPath) -> Option<PathMatch<'a>> {
    let path: Vec<char> = candidate.path.chars().collect();

    // every occurrence of the first query char is a possible alignment
    let mut best: Option<(i64, Vec<usize>)> = None;
    for start in 0..path.len() {
        if !same_char(path[start], query[0]) {
            continue;
        }
        let Some((total, matched)) = align(query, &path, start) else {
            // no later start can complete the query either
            break;
        };
        if best.as_ref().map_or(true, |(b, _)| total > *b) {
            best = Some((total, matched));
        }
    }

    let (total, matched) = best?;
    Some(PathMatch {
        candidate,
        score: total,
        exact: matched.len() == path.len(),
        matched,
    })
}

/// Greedy alignment of `query` starting at `path[start]`.
fn align(query: &[char], path: &[char], start: usize) -> Option<(i64, Vec<usize>)> {
    let mut matched = Vec::with_capacity(query.len());
    let mut total = 0i64;
    let mut run = 0i64;
    let mut next = 0;

    for (idx, &c) in path.iter().enumerate().skip(start) {
        if next == query.len() {
            break;
        }
        if !same_char(c, query[next]) {
            run = 0;
            continue;
        }

        if idx == 0 {
            total += FIRST_CHAR_BONUS + BOUNDARY_BONUS;
        } else if is_boundary(path[idx - 1], c) {
            total += BOUNDARY_BONUS;
        }
        if run > 0 {
            total += ADJACENT_BONUS * run;
        } else if let Some(&prev) = matched.last() {
            let skipped = (idx - prev - 1) as i64;
            total += GAP_START_PENALTY + GAP_EXTENSION_PENALTY * skipped;
        }

        run += 1;
        matched.push(idx);
        next += 1;
    }

    if next < query.len() {
        return None;
    }

    total += (LEADING_PENALTY * start as i64).max(MAX_LEADING_PENALTY);
    total -= (path.len() - matched.len()) as i64;
    Some((total, matched))
}

fn same_char(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

fn is_boundary(prev: char, current: char) -> bool {
    matches!(prev, '/' | '\\' | '_' | '-' | '.' | ' ')
        || (prev.is_lowercase() && current.is_uppercase())
}
