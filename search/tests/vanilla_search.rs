//! End-to-end vanilla search scenarios: a same-language match over
//! hand-built units, with and without a stopword filter.

use indexmap::IndexMap;
use std::path::PathBuf;

use tesserae_core::feature::{FeatureIndex, FeatureKind, FeatureRegistry};
use tesserae_core::language::Language;
use tesserae_core::text::{Text, TextId, TextStatus};
use tesserae_core::unit::{Unit, UnitId, UnitType};
use tesserae_core::unit_index::UnitIndex;
use tesserae_scoring::DistanceBasis;
use tesserae_search::lifecycle::SearchId;
use tesserae_search::params::{MatcherMethod, SearchParams, StopwordBasis, Stopwords, TextOptions};
use tesserae_search::pipeline::{run_vanilla, SearchContext};

struct Fixture {
    registry: FeatureRegistry,
    units: UnitIndex,
    source_text: Text,
    target_text: Text,
}

fn intern(registry: &FeatureRegistry, lang: &Language, text_id: TextId, surface: &str, lemma: &str) -> (FeatureIndex, FeatureIndex) {
    let form = registry.intern(lang, FeatureKind::Form, surface);
    registry.count_inc(lang, FeatureKind::Form, form, text_id, 1);
    let lemma_idx = registry.intern(lang, FeatureKind::Lemmata, lemma);
    registry.count_inc(lang, FeatureKind::Lemmata, lemma_idx, text_id, 1);
    (form, lemma_idx)
}

fn text(id: u64, path: &str) -> Text {
    Text {
        id: TextId::new(id),
        language: "latin".into(),
        title: "poem".into(),
        author: "anon".into(),
        year: None,
        is_prose: false,
        unit_types: vec![UnitType::Line],
        path: PathBuf::from(path),
        content_hash: 0,
        status: TextStatus::Done,
        status_message: None,
    }
}

fn build() -> Fixture {
    let registry = FeatureRegistry::new();
    let lang: Language = "latin".into();
    let units = UnitIndex::new();

    let source_text = text(1, "source.tess");
    let target_text = text(2, "target.tess");

    let source_words = [("arma", "arma"), ("virumque", "vir"), ("cano", "cano"), ("troiae", "troiae")];
    let target_words = [("arma", "arma"), ("virum", "vir"), ("cano", "cano"), ("roma", "roma")];

    let mut source_features = Vec::new();
    for (surface, lemma) in source_words {
        let (_, lemma_idx) = intern(&registry, &lang, source_text.id, surface, lemma);
        let mut row = IndexMap::new();
        row.insert(FeatureKind::Lemmata, vec![lemma_idx]);
        source_features.push(row);
    }
    let mut target_features = Vec::new();
    for (surface, lemma) in target_words {
        let (_, lemma_idx) = intern(&registry, &lang, target_text.id, surface, lemma);
        let mut row = IndexMap::new();
        row.insert(FeatureKind::Lemmata, vec![lemma_idx]);
        target_features.push(row);
    }

    let source_unit = Unit {
        id: UnitId::new(0),
        text_id: source_text.id,
        unit_type: UnitType::Line,
        ordinal: 0,
        locus_tags: vec!["1.1".into()],
        snippet: "arma virumque cano troiae".into(),
        token_positions: vec![0, 1, 2, 3],
        features_by_position: source_features,
    };
    let target_unit = Unit {
        id: UnitId::new(0),
        text_id: target_text.id,
        unit_type: UnitType::Line,
        ordinal: 0,
        locus_tags: vec!["2.1".into()],
        snippet: "arma virum cano roma".into(),
        token_positions: vec![0, 1, 2, 3],
        features_by_position: target_features,
    };

    units.put_text_units(source_text.id, UnitType::Line, vec![source_unit]);
    units.put_text_units(target_text.id, UnitType::Line, vec![target_unit]);

    Fixture { registry, units, source_text, target_text }
}

fn params(stopwords: Stopwords) -> SearchParams {
    SearchParams {
        source: TextOptions { object_id: TextId::new(1), units: UnitType::Line },
        target: TextOptions { object_id: TextId::new(2), units: UnitType::Line },
        method: MatcherMethod::Vanilla { feature: FeatureKind::Lemmata, stopwords, stopword_basis: StopwordBasis::Corpus },
        freq_basis: tesserae_core::frequency::FrequencyBasis::Texts,
        max_distance: 10,
        distance_basis: DistanceBasis::Span,
        min_score: 0.0,
    }
}

#[test]
fn vanilla_latin_lemmata_search_texts_basis_span_distance() {
    let fixture = build();
    let ctx = SearchContext { registry: &fixture.registry, units: &fixture.units, dictionary: None, bigram_store: None };
    let outcome = run_vanilla(&ctx, SearchId::new(), &params(Stopwords::default()), &fixture.source_text, &fixture.target_text).unwrap();

    assert_eq!(outcome.matches.len(), 1);
    let m = &outcome.matches[0];
    let mut matched: Vec<&str> = m.matched_tokens.iter().map(String::as_str).collect();
    matched.sort();
    assert_eq!(matched, vec!["arma", "cano", "vir"]);

    // inv-freq(each) = 4 total positions / 1 occurrence = 4; three shared
    // features sum to 12; both sides span positions 0..=2, distance 3 each.
    let expected = (12.0_f64).ln() - (6.0_f64).ln();
    assert!((m.score - expected).abs() < 1e-9, "score was {}", m.score);
}

#[test]
fn stopword_filter_drops_cano_from_matched_features() {
    let fixture = build();
    let ctx = SearchContext { registry: &fixture.registry, units: &fixture.units, dictionary: None, bigram_store: None };
    let stopwords = Stopwords::Tokens(vec!["cano".to_string()]);
    let outcome = run_vanilla(&ctx, SearchId::new(), &params(stopwords), &fixture.source_text, &fixture.target_text).unwrap();

    for m in &outcome.matches {
        assert!(!m.matched_tokens.iter().any(|t| t == "cano"));
    }
    if let Some(m) = outcome.matches.first() {
        let mut matched: Vec<&str> = m.matched_tokens.iter().map(String::as_str).collect();
        matched.sort();
        assert_eq!(matched, vec!["arma", "vir"]);
    }
}
