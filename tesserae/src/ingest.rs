//! Wires the tokenizer crate's segmentation and normalization into the
//! core data model: turns the raw tagged-line text format of §6 into
//! `Unit`s for both unit-types, interning every derived feature along
//! the way. Lemmatization, phonetic transcription and synonym lookup
//! are external collaborators behind [`FeatureExtractor`] — this
//! module only knows how to call them and weave the results into the
//! feature tables.

use charabia::normalizer::NormalizerOption;
use indexmap::IndexMap;

use tesserae_core::feature::{FeatureIndex, FeatureKind, FeatureRegistry};
use tesserae_core::language::Language;
use tesserae_core::text::TextId;
use tesserae_core::token::Token;
use tesserae_core::unit::{Unit, UnitId, UnitType};
use tesserae_tokenizer::input_format::{parse_tagged_line, split_intraline_breaks};
use tesserae_tokenizer::unicode_segmenter::UnicodeSegmenterTokenIter;

use crate::error::TesseraeError;

/// Mirrors `tesserae_tokenizer::segmentation`'s private delimiter set;
/// phrase boundaries are decided here because this module tracks the
/// flat token stream the tokenizer crate's own phrase splitter doesn't
/// see (it operates on plain strings, not on feature-bearing tokens).
const PHRASE_DELIMITERS: [char; 5] = ['.', '?', '!', ';', ':'];

/// External collaborator boundary: given a language and a normalized
/// word surface, derives the lemmata, phonetic trigrams and semantic
/// synonyms used to populate the non-form feature kinds. Tokenization
/// and surface normalization are handled by this module; everything
/// linguistic about a specific language lives behind this trait.
pub trait FeatureExtractor {
    fn lemmata(&self, language: &Language, surface: &str) -> Vec<String>;
    fn sound(&self, language: &Language, surface: &str) -> Vec<String>;
    fn semantic(&self, language: &Language, lemmata: &[String]) -> Vec<String>;
}

/// An extractor that treats the surface form as its own lemma and
/// derives no phonetic or semantic features. Useful for tests and for
/// languages with no linguistic pipeline wired in yet.
#[derive(Debug, Default, Copy, Clone)]
pub struct IdentityExtractor;

impl FeatureExtractor for IdentityExtractor {
    fn lemmata(&self, _language: &Language, surface: &str) -> Vec<String> {
        vec![surface.to_string()]
    }

    fn sound(&self, _language: &Language, _surface: &str) -> Vec<String> {
        Vec::new()
    }

    fn semantic(&self, _language: &Language, _lemmata: &[String]) -> Vec<String> {
        Vec::new()
    }
}

struct WordEntry {
    locus: String,
    position: u32,
    features: IndexMap<FeatureKind, Vec<FeatureIndex>>,
    surface: String,
}

enum StreamEntry {
    Word(WordEntry),
    Delimiter,
}

/// Line and phrase units built from one text's raw content, ready to
/// be persisted via `UnitIndex::put_text_units` and `BigramStore::ingest`.
pub struct BuiltUnits {
    pub lines: Vec<Unit>,
    pub phrases: Vec<Unit>,
    pub tokens: Vec<Token>,
}

fn is_word(raw: &str) -> bool {
    raw.chars().any(char::is_alphanumeric)
}

fn intern_all(registry: &FeatureRegistry, language: &Language, kind: FeatureKind, text_id: TextId, tokens: &[String]) -> Vec<FeatureIndex> {
    tokens
        .iter()
        .map(|t| {
            let index = registry.intern(language, kind, t);
            registry.count_inc(language, kind, index, text_id, 1);
            index
        })
        .collect()
}

/// Tokenizes every tagged line of `raw_content`, derives features for
/// every word position via `extractor`, and builds both the line units
/// and the phrase units per the segmentation contract of §4.2.
pub fn ingest_text(
    registry: &FeatureRegistry,
    language: &Language,
    text_id: TextId,
    raw_content: &str,
    extractor: &dyn FeatureExtractor,
) -> Result<BuiltUnits, TesseraeError> {
    let normalizer_options = NormalizerOption::default();
    let mut stream: Vec<StreamEntry> = Vec::new();
    let mut lines: Vec<Unit> = Vec::new();
    let mut tokens: Vec<Token> = Vec::new();
    let mut position: u32 = 0;

    for raw_line in raw_content.lines() {
        if raw_line.trim().is_empty() {
            continue;
        }
        let tagged = match parse_tagged_line(raw_line) {
            Ok(tagged) => tagged,
            Err(e) => {
                log::warn!("skipping malformed line while ingesting text {}: {e}", text_id.get());
                continue;
            }
        };
        for fragment in split_intraline_breaks(&tagged.content) {
            let mut word_rows: Vec<IndexMap<FeatureKind, Vec<FeatureIndex>>> = Vec::new();
            let mut token_positions: Vec<u32> = Vec::new();
            let mut surfaces: Vec<String> = Vec::new();

            for (raw, _token) in UnicodeSegmenterTokenIter::new(fragment, &normalizer_options) {
                if !is_word(raw) {
                    if PHRASE_DELIMITERS.contains(&raw.chars().next().unwrap_or(' ')) {
                        stream.push(StreamEntry::Delimiter);
                    }
                    continue;
                }
                let surface = raw.to_lowercase();
                let lemmata = extractor.lemmata(language, &surface);
                let sound = extractor.sound(language, &surface);
                let semantic = extractor.semantic(language, &lemmata);

                let mut features = IndexMap::new();
                features.insert(FeatureKind::Form, intern_all(registry, language, FeatureKind::Form, text_id, &[surface.clone()]));
                let lemma_idx = intern_all(registry, language, FeatureKind::Lemmata, text_id, &lemmata);
                features.insert(FeatureKind::Lemmata, lemma_idx.clone());
                features.insert(FeatureKind::Sound, intern_all(registry, language, FeatureKind::Sound, text_id, &sound));
                let semantic_idx = intern_all(registry, language, FeatureKind::Semantic, text_id, &semantic);
                features.insert(FeatureKind::Semantic, semantic_idx.clone());
                let mut union = lemma_idx;
                for idx in semantic_idx {
                    if !union.contains(&idx) {
                        union.push(idx);
                    }
                }
                features.insert(FeatureKind::SemanticLemmata, union);

                word_rows.push(features.clone());
                token_positions.push(position);
                surfaces.push(surface.clone());
                let mut token = Token::new(text_id, position, surface.clone());
                token.features = features.clone();
                tokens.push(token);
                stream.push(StreamEntry::Word(WordEntry {
                    locus: tagged.locus.clone(),
                    position,
                    features,
                    surface,
                }));
                position += 1;
            }

            if word_rows.is_empty() {
                continue;
            }
            lines.push(Unit {
                id: UnitId::new(lines.len() as u64),
                text_id,
                unit_type: UnitType::Line,
                ordinal: lines.len() as u32,
                locus_tags: vec![tagged.locus.clone()],
                snippet: surfaces.join(" "),
                token_positions,
                features_by_position: word_rows,
            });
        }
    }

    let phrases = build_phrases(text_id, &stream);
    Ok(BuiltUnits { lines, phrases, tokens })
}

/// Re-segments the flat token stream (words and phrase-delimiter
/// markers, in document order) into phrase units, dropping a trailing
/// partial phrase with fewer than two word tokens.
fn build_phrases(text_id: TextId, stream: &[StreamEntry]) -> Vec<Unit> {
    let mut phrases = Vec::new();
    let mut current: Vec<&WordEntry> = Vec::new();

    let mut flush = |current: &mut Vec<&WordEntry>, phrases: &mut Vec<Unit>, is_trailing: bool| {
        if current.is_empty() {
            return;
        }
        if is_trailing && current.len() < 2 {
            current.clear();
            return;
        }
        let mut locus_tags = Vec::new();
        for entry in current.iter() {
            if locus_tags.last() != Some(&entry.locus) {
                locus_tags.push(entry.locus.clone());
            }
        }
        let snippet = current.iter().map(|e| e.surface.as_str()).collect::<Vec<_>>().join(" ");
        let token_positions: Vec<u32> = current.iter().map(|e| e.position).collect();
        let features_by_position: Vec<IndexMap<FeatureKind, Vec<FeatureIndex>>> = current.iter().map(|e| e.features.clone()).collect();
        phrases.push(Unit {
            id: UnitId::new(phrases.len() as u64),
            text_id,
            unit_type: UnitType::Phrase,
            ordinal: phrases.len() as u32,
            locus_tags,
            snippet,
            token_positions,
            features_by_position,
        });
        current.clear();
    };

    for entry in stream {
        match entry {
            StreamEntry::Word(word) => current.push(word),
            StreamEntry::Delimiter => flush(&mut current, &mut phrases, false),
        }
    }
    flush(&mut current, &mut phrases, true);
    phrases
}
