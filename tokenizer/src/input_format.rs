//! Parsing of the line-oriented raw text format described by the
//! external interfaces: each line opens with a whitespace-separated tag
//! in angle brackets whose last field is the locus, followed by content.
//! A `/` inside the content marks an intra-line break.

use crate::error::TokenizerError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedLine {
    pub locus: String,
    pub content: String,
}

/// Parses a single raw line such as `<verg. aen. 1.12> content here`.
///
/// Validation here is advisory per the external interface contract: a
/// missing tag or locus is reported as an error so the caller can warn
/// and skip, rather than aborting the whole ingest.
pub fn parse_tagged_line(line: &str) -> Result<TaggedLine, TokenizerError> {
    let line = line.trim_end();
    let Some(open) = line.find('<') else {
        return Err(TokenizerError::MissingTag(line.to_string()));
    };
    let Some(close) = line[open..].find('>').map(|i| i + open) else {
        return Err(TokenizerError::MissingTag(line.to_string()));
    };
    let tag = &line[open + 1..close];
    let locus = tag
        .split_whitespace()
        .last()
        .ok_or_else(|| TokenizerError::MissingLocus(tag.to_string()))?
        .to_string();
    let content = line[close + 1..].trim_start().to_string();
    Ok(TaggedLine { locus, content })
}

/// Splits a line's content on its intra-line break marker `/`.
///
/// Empty fragments produced by leading/trailing/duplicate markers are
/// dropped; the remaining fragments are trimmed.
pub fn split_intraline_breaks(content: &str) -> Vec<&str> {
    content
        .split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}
