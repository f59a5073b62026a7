use super::*;

use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

const SEPARATORS: [char; 2] = [' ', '_'];

fn is_sep(c: char) -> bool {
    SEPARATORS.contains(&c)
}

/// Collapsed edge path for a word: a separator run contributes its first
/// character only, mirroring the insertion walk.
fn collapse(word: &str) -> Vec<char> {
    let mut path = Vec::new();
    let mut chars = word.chars().peekable();
    while let Some(c) = chars.next() {
        path.push(c);
        if is_sep(c) {
            while chars.peek().copied().is_some_and(is_sep) {
                chars.next();
            }
        }
    }
    path
}

/// Reference matcher over a single collapsed path, mirroring the traversal
/// semantics: a query separator is satisfied by the matching edge, by any
/// single edge without consuming it, or by nothing; query exhaustion
/// anywhere along the path is a match (prefix completion).
fn path_matches(path: &[char], query: &[char]) -> bool {
    fn step(
        path: &[char],
        query: &[char],
        i: usize,
        j: usize,
        seen: &mut HashSet<(usize, usize)>,
    ) -> bool {
        if !seen.insert((i, j)) {
            return false;
        }
        if j == query.len() {
            return true;
        }
        let c = query[j];
        if is_sep(c) {
            (i < path.len() && path[i] == c && step(path, query, i + 1, j + 1, seen))
                || (i < path.len() && step(path, query, i + 1, j, seen))
                || step(path, query, i, j + 1, seen)
        } else {
            i < path.len() && path[i] == c && step(path, query, i + 1, j + 1, seen)
        }
    }

    let mut seen = HashSet::new();
    step(path, query, 0, 0, &mut seen)
}

fn word_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[ab _]{1,8}").unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_search_matches_reference(
        words in prop::collection::vec(word_strategy(), 1..32),
        queries in prop::collection::vec(word_strategy(), 1..16),
    ) {
        let mut trie = Trie::with_separators(SEPARATORS);
        // First word inserted for a collapsed path owns the terminal.
        let mut stored: HashMap<Vec<char>, &str> = HashMap::new();
        for word in &words {
            trie.add(word).unwrap();
            stored.entry(collapse(word)).or_insert(word.as_str());
        }
        prop_assert_eq!(trie.len(), stored.len());

        for query in &queries {
            let query_chars: Vec<char> = query.chars().collect();
            let expected: HashSet<&str> = stored
                .iter()
                .filter(|(path, _)| path_matches(path, &query_chars))
                .map(|(_, word)| *word)
                .collect();
            let got: HashSet<&str> = trie.search(query).unwrap().collect();
            prop_assert_eq!(got, expected, "query {:?}", query);
        }
    }

    #[test]
    fn prop_every_word_finds_its_path(
        words in prop::collection::vec(word_strategy(), 1..32),
    ) {
        let mut trie = Trie::with_separators(SEPARATORS);
        for word in &words {
            trie.add(word).unwrap();
        }

        for word in &words {
            let got: Vec<&str> = trie.search(word).unwrap().collect();
            prop_assert!(
                got.iter().any(|hit| collapse(hit) == collapse(word)),
                "searching {:?} must yield the stored spelling of its own path",
                word
            );
        }
    }

    #[test]
    fn prop_collapsed_prefix_words_always_returned(
        words in prop::collection::vec(word_strategy(), 1..24),
        k in 1usize..8,
    ) {
        // Lower bound stated independently of the traversal: a query that
        // is a character prefix of an added word must resolve that word's
        // stored spelling, whatever else the separator branches admit.
        let mut trie = Trie::with_separators(SEPARATORS);
        for word in &words {
            trie.add(word).unwrap();
        }

        for word in &words {
            let query: String = word.chars().take(k).collect();
            let got: Vec<&str> = trie.search(&query).unwrap().collect();
            prop_assert!(
                got.iter().any(|hit| collapse(hit) == collapse(word)),
                "prefix {:?} of {:?} must resolve it",
                query,
                word
            );
        }
    }

    #[test]
    fn prop_add_is_idempotent(
        words in prop::collection::vec(word_strategy(), 1..24),
        query in word_strategy(),
    ) {
        let mut once = Trie::with_separators(SEPARATORS);
        let mut twice = Trie::with_separators(SEPARATORS);
        for word in &words {
            once.add(word).unwrap();
            twice.add(word).unwrap();
            twice.add(word).unwrap();
        }

        prop_assert_eq!(once.len(), twice.len());
        prop_assert_eq!(once.node_count(), twice.node_count());

        let mut a: Vec<&str> = once.search(&query).unwrap().collect();
        let mut b: Vec<&str> = twice.search(&query).unwrap().collect();
        a.sort_unstable();
        b.sort_unstable();
        prop_assert_eq!(a, b);
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

#[test]
fn insert_order_invariance_small_set() {
    // Distinct collapsed paths, so results cannot depend on which spelling
    // claimed a shared terminal first.
    let words = ["ab", "a b", "a_b", "b", "ba"];
    let queries = ["a", "a ", "a b", "b", "ab"];

    let mut reference: Option<Vec<Vec<String>>> = None;
    for_each_permutation(&words, |perm| {
        let mut trie = Trie::with_separators(SEPARATORS);
        for word in perm {
            trie.add(word).unwrap();
        }

        let results: Vec<Vec<String>> = queries
            .iter()
            .map(|q| {
                let mut hits: Vec<String> =
                    trie.search(q).unwrap().map(str::to_owned).collect();
                hits.sort();
                hits
            })
            .collect();

        match &reference {
            None => reference = Some(results),
            Some(expected) => assert_eq!(&results, expected),
        }
    });
}
