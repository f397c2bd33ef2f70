//! Splits raw tagged-line content into line units and phrase units per
//! the segmentation contract used at ingest.

use unicode_segmentation::UnicodeSegmentation;

use crate::input_format::split_intraline_breaks;

const PHRASE_DELIMITERS: [char; 5] = ['.', '?', '!', ';', ':'];

/// Counts word tokens (as opposed to punctuation/whitespace) in a
/// fragment, used to decide whether a trailing partial phrase should
/// be kept.
pub fn word_token_count(fragment: &str) -> usize {
    fragment
        .split_word_bounds()
        .filter(|w| w.chars().any(char::is_alphanumeric))
        .count()
}

/// Breaks a sequence of raw line contents (already tag-stripped) into
/// line units: every physical line is further split on its intra-line
/// `/` marker, and empty results are dropped.
pub fn split_into_lines<'a, I: IntoIterator<Item = &'a str>>(raw_lines: I) -> Vec<String> {
    raw_lines
        .into_iter()
        .flat_map(|line| split_intraline_breaks(line).into_iter().map(str::to_string))
        .filter(|l| !l.is_empty())
        .collect()
}

/// Breaks the already-line-segmented content of a text into phrase
/// units: phrases are delimited by any of `. ? ! ; :`, consecutive
/// delimiters never produce empty phrases, and a trailing partial
/// phrase with fewer than two word tokens is dropped.
pub fn split_into_phrases(lines: &[String]) -> Vec<String> {
    let joined = lines.join(" ");
    let mut phrases: Vec<String> = joined
        .split(|c| PHRASE_DELIMITERS.contains(&c))
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();

    if let Some(last) = phrases.last() {
        if word_token_count(last) < 2 {
            phrases.pop();
        }
    }
    phrases
}
