//! Orchestrates a full search end to end: resolves stopwords, builds
//! projections, generates candidates, scores them, and materializes
//! `Match` records. Separate entry points exist for the vanilla and
//! Greek-to-Latin matchers since they project units differently; both
//! funnel into the same scoring path.

use std::collections::{HashMap, HashSet};

use string_interner::Symbol;
use tesserae_core::bigram::BigramStore;
use tesserae_core::feature::{FeatureIndex, FeatureKind, FeatureRegistry};
use tesserae_core::frequency::{FrequencyBasis, FrequencyService};
use tesserae_core::language::Language;
use tesserae_core::matcher::greek_to_latin::{project_translated, GreekToLatinDictionary};
use tesserae_core::matcher::{candidate_pairs, Candidate};
use tesserae_core::text::Text;
use tesserae_core::unit::{Unit, UnitId, UnitType};
use tesserae_core::unit_index::UnitIndex;
use tesserae_scoring::ScoreGate;

use crate::errors::SearchError;
use crate::lifecycle::SearchId;
use crate::matching::{projections_for, score_candidates, ScoredCandidate};
use crate::params::{MatcherMethod, SearchParams, StopwordBasis, Stopwords};
use crate::store::{Match, MatchId};

/// The read-only context a search runs against: the feature registry,
/// the unit index, and (when configured) the Greek-to-Latin dictionary
/// and bigram store needed by the matchers that use them.
pub struct SearchContext<'r> {
    pub registry: &'r FeatureRegistry,
    pub units: &'r UnitIndex,
    pub dictionary: Option<&'r GreekToLatinDictionary>,
    pub bigram_store: Option<&'r BigramStore>,
}

/// A scored search, still carrying the candidates that produced each
/// match so a subsequent multitext pass can reuse their shared
/// features without recomputing projections.
pub struct SearchOutcome {
    pub matches: Vec<Match>,
    pub candidates: Vec<Candidate>,
}

fn resolve_stopwords(
    ctx: &SearchContext,
    language: &Language,
    kind: FeatureKind,
    stopwords: &Stopwords,
    basis: StopwordBasis,
    corpus_texts: &[tesserae_core::text::TextId],
) -> HashSet<FeatureIndex> {
    match stopwords {
        Stopwords::Tokens(tokens) => tokens.iter().filter_map(|t| ctx.registry.lookup_index(language, kind, t)).collect(),
        Stopwords::Count(n) => {
            let texts = match basis {
                StopwordBasis::Corpus => None,
                StopwordBasis::Texts => Some(corpus_texts),
            };
            ctx.registry.top_n_by_count(language, kind, texts, *n).into_iter().collect()
        }
    }
}

/// Merges the per-unit inverse-frequency tables of every unit in
/// `units` into one lookup, first-seen value winning on overlap.
fn merged_frequency_table(
    service: &FrequencyService,
    language: &Language,
    kind: FeatureKind,
    basis: FrequencyBasis,
    text_id: tesserae_core::text::TextId,
    units: &[Unit],
    registry: &FeatureRegistry,
) -> HashMap<FeatureIndex, f64> {
    let total_word_positions = registry.text_total_occurrences(language, kind, text_id);
    let mut table = HashMap::new();
    for unit in units {
        for (index, freq) in service.table_for_unit(language, kind, basis, text_id, unit, total_word_positions) {
            table.entry(index).or_insert(freq);
        }
    }
    table
}

/// Greek-side counterpart of [`merged_frequency_table`]: builds the
/// pooled Greek inverse-frequency table of §4.3/§4.6, keyed by the
/// *Greek* lemma index (before translation into Latin), via
/// [`GreekToLatinDictionary::pooled_with`].
fn merged_greek_frequency_table(
    service: &FrequencyService,
    greek_language: &Language,
    kind: FeatureKind,
    basis: FrequencyBasis,
    text_id: tesserae_core::text::TextId,
    units: &[Unit],
    registry: &FeatureRegistry,
    dictionary: &GreekToLatinDictionary,
) -> HashMap<FeatureIndex, f64> {
    let total_word_positions = registry.text_total_occurrences(greek_language, kind, text_id);
    let mut table = HashMap::new();
    for unit in units {
        let pooled = service.table_for_unit_pooled(
            greek_language,
            kind,
            basis,
            text_id,
            unit,
            total_word_positions,
            |index| dictionary.pooled_with(index),
        );
        for (index, freq) in pooled {
            table.entry(index).or_insert(freq);
        }
    }
    table
}

fn by_id(units: &[Unit]) -> HashMap<UnitId, &Unit> {
    units.iter().map(|u| (u.id, u)).collect()
}

/// Builds the deduplicated `(source_position, target_position)`
/// highlight pairs from a candidate's shared-position triples.
fn highlight_pairs(candidate: &Candidate) -> Vec<(u32, u32)> {
    let mut seen = indexmap::IndexSet::new();
    for &(_, s, t) in &candidate.shared_positions {
        seen.insert((s, t));
    }
    seen.into_iter().collect()
}

fn matched_tokens(registry: &FeatureRegistry, language: &Language, kind: FeatureKind, candidate: &Candidate) -> Vec<String> {
    candidate
        .shared_features
        .iter()
        .filter_map(|&f| registry.lookup_token(language, kind, f))
        .collect()
}

/// Builds `Match`/`Candidate` pairs from scored candidates and orders
/// them score-descending, ties broken by ascending
/// `(source_unit_id, target_unit_id)`, per §5's ordering guarantee.
/// `Match::id` is assigned after sorting so it reflects final rank.
fn build_matches(
    search_id: SearchId,
    registry: &FeatureRegistry,
    language: &Language,
    kind: FeatureKind,
    source_units: &[Unit],
    target_units: &[Unit],
    mut scored: Vec<ScoredCandidate>,
) -> (Vec<Match>, Vec<Candidate>) {
    let source_by_id = by_id(source_units);
    let target_by_id = by_id(target_units);

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.candidate.source_unit.cmp(&b.candidate.source_unit))
            .then_with(|| a.candidate.target_unit.cmp(&b.candidate.target_unit))
    });

    let mut matches = Vec::with_capacity(scored.len());
    let mut candidates = Vec::with_capacity(scored.len());

    for (idx, ScoredCandidate { candidate, score }) in scored.into_iter().enumerate() {
        let Some(source) = source_by_id.get(&candidate.source_unit) else { continue };
        let Some(target) = target_by_id.get(&candidate.target_unit) else { continue };

        matches.push(Match {
            id: MatchId::new(idx as u64),
            search_id,
            source_unit: source.id,
            target_unit: target.id,
            source_tag: source.locus_tags.join(" "),
            target_tag: target.locus_tags.join(" "),
            source_snippet: source.snippet.clone(),
            target_snippet: target.snippet.clone(),
            matched_tokens: matched_tokens(registry, language, kind, &candidate),
            highlight: highlight_pairs(&candidate),
            score,
        });
        candidates.push(candidate);
    }

    (matches, candidates)
}

/// Runs a vanilla (same-language) search. `params.method` must be
/// [`MatcherMethod::Vanilla`].
pub fn run_vanilla(
    ctx: &SearchContext,
    search_id: SearchId,
    params: &SearchParams,
    source_text: &Text,
    target_text: &Text,
) -> Result<SearchOutcome, SearchError> {
    params.validate()?;
    let MatcherMethod::Vanilla { feature, stopwords, stopword_basis } = &params.method else {
        return Err(SearchError::Validation("run_vanilla requires MatcherMethod::Vanilla".into()));
    };
    if source_text.language != target_text.language {
        return Err(SearchError::Validation("vanilla search requires source and target to share a language".into()));
    }
    let language = &source_text.language;
    let kind = *feature;

    let source_units = ctx.units.units_of(source_text.id, params.source.units);
    let target_units = ctx.units.units_of(target_text.id, params.target.units);

    let corpus = [source_text.id, target_text.id];
    let stopword_set = resolve_stopwords(ctx, language, kind, stopwords, *stopword_basis, &corpus);

    let source_proj = projections_for(&source_units, kind, &stopword_set);
    let target_proj = projections_for(&target_units, kind, &stopword_set);
    let candidates = candidate_pairs(&source_proj, &target_proj);

    let service = FrequencyService::new(ctx.registry);
    let mut inv_freq = merged_frequency_table(&service, language, kind, params.freq_basis, source_text.id, &source_units, ctx.registry);
    for (index, freq) in merged_frequency_table(&service, language, kind, params.freq_basis, target_text.id, &target_units, ctx.registry) {
        inv_freq.entry(index).or_insert(freq);
    }

    let gate = ScoreGate { max_distance: params.max_distance, min_score: params.min_score };
    let scored = score_candidates(candidates, &inv_freq, params.distance_basis, gate);

    let (matches, candidates) = build_matches(search_id, ctx.registry, language, kind, &source_units, &target_units, scored);
    Ok(SearchOutcome { matches, candidates })
}

/// Runs a Greek-to-Latin search: the source text's lemmata are
/// projected through the dictionary into the target's (Latin) lemma
/// namespace before the usual sparse intersection and scoring.
pub fn run_greek_to_latin(
    ctx: &SearchContext,
    search_id: SearchId,
    params: &SearchParams,
    source_text: &Text,
    target_text: &Text,
) -> Result<SearchOutcome, SearchError> {
    params.validate()?;
    let MatcherMethod::GreekToLatin { greek_stopwords, latin_stopwords, stopword_basis, .. } = &params.method else {
        return Err(SearchError::Validation("run_greek_to_latin requires MatcherMethod::GreekToLatin".into()));
    };
    let dictionary = ctx.dictionary.ok_or_else(|| SearchError::Validation("no greek-to-latin dictionary loaded".into()))?;
    let kind = FeatureKind::Lemmata;

    let source_units = ctx.units.units_of(source_text.id, params.source.units);
    let target_units = ctx.units.units_of(target_text.id, params.target.units);

    let greek_stop = resolve_stopwords(ctx, &source_text.language, kind, greek_stopwords, *stopword_basis, &[source_text.id]);
    let latin_stop = resolve_stopwords(ctx, &target_text.language, kind, latin_stopwords, *stopword_basis, &[target_text.id]);

    let source_proj: Vec<_> = source_units
        .iter()
        .map(|u| {
            let mut projection = project_translated(u, dictionary, &latin_stop);
            projection.positions.retain(|(_, f)| f.iter().any(|f| !greek_stop.contains(f)));
            projection
        })
        .collect();
    let target_proj = projections_for(&target_units, kind, &latin_stop);
    let candidates = candidate_pairs(&source_proj, &target_proj);

    let service = FrequencyService::new(ctx.registry);
    let mut inv_freq = merged_frequency_table(&service, &target_text.language, kind, params.freq_basis, target_text.id, &target_units, ctx.registry);

    // The Greek side of a translated match is scored on the pooled Greek
    // frequency (§4.3), not the Latin target's own frequency: fold each
    // Greek index's pooled frequency onto every Latin index it
    // translates to, overriding the plain Latin value there. Greek
    // indices are visited in ascending raw order so that when two Greek
    // lemmas translate to the same Latin index the outcome does not
    // depend on hash-map iteration order.
    let greek_inv_freq =
        merged_greek_frequency_table(&service, &source_text.language, kind, params.freq_basis, source_text.id, &source_units, ctx.registry, dictionary);
    let mut greek_entries: Vec<_> = greek_inv_freq.into_iter().collect();
    greek_entries.sort_by_key(|(index, _)| index.to_usize());
    for (greek_index, freq) in greek_entries {
        for &latin_index in dictionary.translations(greek_index) {
            inv_freq.insert(latin_index, freq);
        }
    }

    let gate = ScoreGate { max_distance: params.max_distance, min_score: params.min_score };
    let scored = score_candidates(candidates, &inv_freq, params.distance_basis, gate);

    let (matches, candidates) =
        build_matches(search_id, ctx.registry, &target_text.language, kind, &source_units, &target_units, scored);
    Ok(SearchOutcome { matches, candidates })
}

/// Runs the multitext extension over an already-scored search,
/// looking up every pairwise combination of each match's shared
/// features against the bigram store for every text in `corpus`.
pub fn run_multitext(
    ctx: &SearchContext,
    outcome: &SearchOutcome,
    unit_type: UnitType,
    kind: FeatureKind,
    corpus: &[tesserae_core::text::TextId],
    inv_freq: &HashMap<FeatureIndex, f64>,
) -> Result<Vec<HashMap<(FeatureIndex, FeatureIndex), Vec<(UnitId, f64)>>>, SearchError> {
    let store = ctx.bigram_store.ok_or_else(|| SearchError::Validation("no bigram store configured".into()))?;
    Ok(tesserae_core::multitext::run_multitext(store, &outcome.candidates, unit_type, kind, corpus, inv_freq)?)
}

#[cfg(test)]
mod test {
    use super::*;
    use indexmap::IndexMap;
    use std::path::PathBuf;
    use tesserae_core::text::{TextId, TextStatus};
    use tesserae_core::unit::UnitId as CoreUnitId;
    use tesserae_scoring::DistanceBasis;

    fn text(id: u64, language: &str) -> Text {
        Text {
            id: TextId::new(id),
            language: language.into(),
            title: "test".into(),
            author: "test".into(),
            year: None,
            is_prose: false,
            unit_types: vec![UnitType::Line],
            path: PathBuf::from("test.txt"),
            content_hash: 0,
            status: TextStatus::Done,
            status_message: None,
        }
    }

    fn unit(id: u64, text_id: u64, ordinal: u32, features: Vec<(u32, Vec<FeatureIndex>)>) -> Unit {
        let mut features_by_position = vec![IndexMap::new(); features.len()];
        let mut token_positions = Vec::new();
        for (pos, feats) in &features {
            let mut row = IndexMap::new();
            row.insert(FeatureKind::Lemmata, feats.clone());
            features_by_position[*pos as usize] = row;
            token_positions.push(*pos);
        }
        Unit {
            id: CoreUnitId::new(id),
            text_id: TextId::new(text_id),
            unit_type: UnitType::Line,
            ordinal,
            locus_tags: vec![format!("1.{ordinal}")],
            snippet: "arma virumque cano".into(),
            token_positions,
            features_by_position,
        }
    }

    fn dummy_params(source: TextId, target: TextId) -> SearchParams {
        use crate::params::TextOptions;
        SearchParams {
            source: crate::params::TextOptions { object_id: source, units: UnitType::Line },
            target: TextOptions { object_id: target, units: UnitType::Line },
            method: MatcherMethod::Vanilla {
                feature: FeatureKind::Lemmata,
                stopwords: Stopwords::default(),
                stopword_basis: StopwordBasis::Corpus,
            },
            freq_basis: FrequencyBasis::Corpus,
            max_distance: 10,
            distance_basis: DistanceBasis::Span,
            min_score: 0.0,
        }
    }

    #[test]
    fn vanilla_search_produces_matches_for_shared_features() {
        let registry = FeatureRegistry::new();
        let units_index = UnitIndex::new();
        let lang: Language = "latin".into();

        let arma = registry.intern(&lang, FeatureKind::Lemmata, "arma");
        let cano = registry.intern(&lang, FeatureKind::Lemmata, "cano");

        let source_text = text(1, "latin");
        let target_text = text(2, "latin");

        registry.count_inc(&lang, FeatureKind::Lemmata, arma, source_text.id, 1);
        registry.count_inc(&lang, FeatureKind::Lemmata, cano, source_text.id, 1);
        registry.count_inc(&lang, FeatureKind::Lemmata, arma, target_text.id, 1);
        registry.count_inc(&lang, FeatureKind::Lemmata, cano, target_text.id, 1);

        let source_unit = unit(1, 1, 0, vec![(0, vec![arma]), (2, vec![cano])]);
        let target_unit = unit(2, 2, 0, vec![(1, vec![arma]), (3, vec![cano])]);
        units_index.put_text_units(source_text.id, UnitType::Line, vec![source_unit]);
        units_index.put_text_units(target_text.id, UnitType::Line, vec![target_unit]);

        let ctx = SearchContext { registry: &registry, units: &units_index, dictionary: None, bigram_store: None };
        let params = dummy_params(source_text.id, target_text.id);
        let outcome = run_vanilla(&ctx, SearchId::new(), &params, &source_text, &target_text).unwrap();

        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.matches[0].matched_tokens.len(), 2);
    }

    #[test]
    fn vanilla_search_rejects_cross_language_texts() {
        let registry = FeatureRegistry::new();
        let units_index = UnitIndex::new();
        let source_text = text(1, "greek");
        let target_text = text(2, "latin");
        let ctx = SearchContext { registry: &registry, units: &units_index, dictionary: None, bigram_store: None };
        let params = dummy_params(source_text.id, target_text.id);
        assert!(run_vanilla(&ctx, SearchId::new(), &params, &source_text, &target_text).is_err());
    }

    #[test]
    fn greek_to_latin_scores_on_pooled_greek_frequency() {
        let registry = FeatureRegistry::new();
        let units_index = UnitIndex::new();
        let greek: Language = "greek".into();
        let latin: Language = "latin".into();

        let menis = registry.intern(&greek, FeatureKind::Lemmata, "menis");
        let orge = registry.intern(&greek, FeatureKind::Lemmata, "orge");
        let thymos = registry.intern(&greek, FeatureKind::Lemmata, "thymos");
        let ira = registry.intern(&latin, FeatureKind::Lemmata, "ira");
        let furor = registry.intern(&latin, FeatureKind::Lemmata, "furor");

        let source_text = text(1, "greek");
        let target_text = text(2, "latin");

        // menis and orge both translate to ira, so their counts pool;
        // thymos translates only to furor and has no pooling partner.
        registry.count_inc(&greek, FeatureKind::Lemmata, menis, source_text.id, 1);
        registry.count_inc(&greek, FeatureKind::Lemmata, orge, source_text.id, 9);
        registry.count_inc(&greek, FeatureKind::Lemmata, thymos, source_text.id, 5);
        registry.count_inc(&latin, FeatureKind::Lemmata, ira, target_text.id, 2);
        registry.count_inc(&latin, FeatureKind::Lemmata, furor, target_text.id, 3);

        let mut dictionary = GreekToLatinDictionary::default();
        dictionary.insert(menis, [ira]);
        dictionary.insert(orge, [ira]);
        dictionary.insert(thymos, [furor]);

        let source_unit = unit(1, 1, 0, vec![(0, vec![menis]), (1, vec![thymos])]);
        let target_unit = unit(2, 2, 0, vec![(0, vec![ira]), (1, vec![furor])]);
        units_index.put_text_units(source_text.id, UnitType::Line, vec![source_unit]);
        units_index.put_text_units(target_text.id, UnitType::Line, vec![target_unit]);

        let ctx = SearchContext { registry: &registry, units: &units_index, dictionary: Some(&dictionary), bigram_store: None };
        let params = SearchParams {
            source: crate::params::TextOptions { object_id: source_text.id, units: UnitType::Line },
            target: crate::params::TextOptions { object_id: target_text.id, units: UnitType::Line },
            method: MatcherMethod::GreekToLatin {
                feature: FeatureKind::Lemmata,
                greek_stopwords: Stopwords::default(),
                latin_stopwords: Stopwords::default(),
                stopword_basis: StopwordBasis::Corpus,
            },
            freq_basis: FrequencyBasis::Texts,
            max_distance: 10,
            distance_basis: DistanceBasis::Span,
            min_score: 0.0,
        };

        let outcome = run_greek_to_latin(&ctx, SearchId::new(), &params, &source_text, &target_text).unwrap();
        assert_eq!(outcome.matches.len(), 1);

        // ira's pooled Greek frequency (menis+orge over 15 total positions)
        // is 15.0/10.0 = 1.5, overriding its own plain Latin text
        // frequency of 5.0/2.0 = 2.5; furor has no pooling partner, so its
        // frequency stays at the Greek text value 15.0/5.0 = 3.0. Both
        // sides have span distance 2 (positions 0 and 1), so distance
        // sums to 4 and the ln(distance) term does not cancel exactly.
        let expected = (1.5_f64 + 3.0).ln() - 4.0_f64.ln();
        assert!((outcome.matches[0].score - expected).abs() < 1e-9, "got {}, expected {expected}", outcome.matches[0].score);
    }
}
