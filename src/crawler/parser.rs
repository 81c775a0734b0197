//! Extractors for content API pages
//!
//! This module turns fetched pages into:
//! - Word counts (from plain-text extracts)
//! - Linked article titles (from link lists)

use crate::crawler::fetcher::Page;
use crate::state::WordCounts;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

lazy_static! {
    // Anything but word characters, hyphens, slashes and apostrophes
    static ref NON_WORD_CHARS: Regex =
        Regex::new(r"[^\w\-/']").expect("NON_WORD_CHARS pattern is valid");
}

/// Counts the words of a plain-text page
///
/// # Tokenization Rules
///
/// - Split on whitespace
/// - Strip every character that is not a word character, `-`, `/` or `'`
/// - Drop tokens left empty by stripping
///
/// Case is preserved, so `Lorem` and `lorem` are different words.
///
/// # Example
///
/// ```
/// use word_ripple::crawler::count_words;
///
/// let words = count_words("a b a");
/// assert_eq!(words["a"], 2);
/// assert_eq!(words["b"], 1);
/// ```
pub fn count_words(text: &str) -> WordCounts {
    let mut words = WordCounts::new();
    add_words(&mut words, text);
    words
}

fn add_words(words: &mut WordCounts, text: &str) {
    for token in text.split_whitespace() {
        let word = NON_WORD_CHARS.replace_all(token, "");
        if word.is_empty() {
            continue;
        }
        *words.entry(word.into_owned()).or_insert(0) += 1;
    }
}

/// Counts the words of every page's extract; counts add up across pages
pub fn count_page_words(pages: &[Page]) -> WordCounts {
    let mut words = WordCounts::new();
    for page in pages {
        if let Some(extract) = &page.extract {
            add_words(&mut words, extract);
        }
    }
    words
}

/// Collects the linked titles of every page
///
/// Each title appears once, in the order it was first seen. Links without a
/// title are skipped.
pub fn collect_links(pages: &[Page]) -> Vec<String> {
    let mut seen = HashSet::new();
    pages
        .iter()
        .flat_map(|page| page.links.iter())
        .filter_map(|link| link.title.as_deref())
        .filter(|title| seen.insert(*title))
        .map(str::to_string)
        .collect()
}
