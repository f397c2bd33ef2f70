//! The result-row contract exposed to external exporters (CSV/JSON/XML
//! rendering itself is out of scope; this produces the row data they
//! all render from).

use serde::{Deserialize, Serialize};

use crate::store::Match;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultRow {
    pub index: usize,
    pub target_tag: String,
    pub target_snippet: String,
    pub source_tag: String,
    pub source_snippet: String,
    pub matched_features: String,
    pub normalized_score: f64,
    pub raw_score: f64,
}

/// Wraps the matched positions of `snippet` in `open`/`close` markup.
fn highlight(snippet: &str, positions: &[u32], open: &str, close: &str) -> String {
    let mut words: Vec<String> = snippet.split_whitespace().map(str::to_string).collect();
    for &pos in positions {
        if let Some(word) = words.get_mut(pos as usize) {
            *word = format!("{open}{word}{close}");
        }
    }
    words.join(" ")
}

/// Builds the exporter row for each match, normalizing its score
/// against the highest score in the search (0-10 scale).
pub fn build_rows(matches: &[Match], max_score: f64, open_markup: &str, close_markup: &str) -> Vec<ResultRow> {
    matches
        .iter()
        .enumerate()
        .map(|(idx, m)| {
            let source_positions: Vec<u32> = m.highlight.iter().map(|(s, _)| *s).collect();
            let target_positions: Vec<u32> = m.highlight.iter().map(|(_, t)| *t).collect();
            ResultRow {
                index: idx,
                target_tag: m.target_tag.clone(),
                target_snippet: highlight(&m.target_snippet, &target_positions, open_markup, close_markup),
                source_tag: m.source_tag.clone(),
                source_snippet: highlight(&m.source_snippet, &source_positions, open_markup, close_markup),
                matched_features: m.matched_tokens.join("; "),
                normalized_score: if max_score > 0.0 { m.score * 10.0 / max_score } else { 0.0 },
                raw_score: m.score,
            }
        })
        .collect()
}

/// Writes rows to the §6 CSV row contract.
pub fn write_csv<W: std::io::Write>(writer: W, rows: &[ResultRow]) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush().map_err(csv::Error::from)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn highlight_wraps_matched_words() {
        let result = highlight("arma virumque cano", &[0, 2], "<b>", "</b>");
        assert_eq!(result, "<b>arma</b> virumque <b>cano</b>");
    }
}
