//! Ties every collaborator crate together into one running instance:
//! text registration and ingestion, search submission with
//! deduplication, paging, multitext, export, and the TTL sweep. Owns
//! the one `FeatureRegistry`/`UnitIndex`/`BigramStore` the process
//! keeps alive for its lifetime, plus the worker pools that drain
//! ingest and search jobs per §5.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use camino::Utf8PathBuf;
use strum::IntoEnumIterator;

use tesserae_core::bigram::BigramStore;
use tesserae_core::feature::{FeatureKind, FeatureRegistry};
use tesserae_core::language::Language;
use tesserae_core::matcher::greek_to_latin::GreekToLatinDictionary;
use tesserae_core::text::{Text, TextId, TextStatus};
use tesserae_core::token::TokenIndex;
use tesserae_core::unit::UnitType;
use tesserae_core::unit_index::UnitIndex;
use tesserae_search::cache::CanonicalKey;
use tesserae_search::errors::SearchError;
use tesserae_search::export::{build_rows, ResultRow};
use tesserae_search::gc::sweep_expired;
use tesserae_search::lifecycle::{Search, SearchId, SearchStatus, SearchType};
use tesserae_search::paging::{paginate, Paging, SortBy};
use tesserae_search::params::SearchParams;
use tesserae_search::pipeline::{run_greek_to_latin, run_multitext, run_vanilla, SearchContext};
use tesserae_search::store::{InMemoryResultStore, Match, MultiResult, ResultStore};
use tesserae_search::worker::WorkerPool;

use crate::config::TesseraeConfig;
use crate::error::TesseraeError;
use crate::ingest::{ingest_text as build_units, FeatureExtractor};

/// A page of matches plus the total before pagination, for a caller
/// building a paged view.
pub struct MatchPage {
    pub matches: Vec<Match>,
    pub total: usize,
}

/// A running engine instance. Cheap to wrap in an `Arc` for submission
/// to its own worker pools from multiple callers.
pub struct Engine {
    registry: FeatureRegistry,
    units: UnitIndex,
    tokens: TokenIndex,
    bigram_store: BigramStore,
    dictionary: RwLock<Option<GreekToLatinDictionary>>,
    texts: RwLock<HashMap<TextId, Text>>,
    next_text_id: AtomicU64,
    results: InMemoryResultStore,
    ingest_pool: WorkerPool,
    search_pool: WorkerPool,
}

impl Engine {
    pub fn new(config: &TesseraeConfig) -> Self {
        let base_dir = Utf8PathBuf::from_path_buf(config.bigram_store_dir.clone())
            .unwrap_or_else(|path| Utf8PathBuf::from(path.to_string_lossy().into_owned()));
        Self {
            registry: FeatureRegistry::new(),
            units: UnitIndex::new(),
            tokens: TokenIndex::new(),
            bigram_store: BigramStore::new(base_dir),
            dictionary: RwLock::new(None),
            texts: RwLock::new(HashMap::new()),
            next_text_id: AtomicU64::new(1),
            results: InMemoryResultStore::new(),
            ingest_pool: WorkerPool::new("ingest", config.ingest_workers, 64),
            search_pool: WorkerPool::new("search", config.search_workers, 64),
        }
    }

    /// Installs the static Greek-to-Latin dictionary used by
    /// [`SearchType::GreekToLatin`] searches.
    pub fn load_dictionary(&self, dictionary: GreekToLatinDictionary) {
        *self.dictionary.write().unwrap() = Some(dictionary);
    }

    pub fn register_text(&self, language: Language, title: impl Into<String>, author: impl Into<String>, path: PathBuf) -> TextId {
        let id = TextId::new(self.next_text_id.fetch_add(1, Ordering::SeqCst));
        let text = Text::new(id, language, title, author, path);
        self.texts.write().unwrap().insert(id, text);
        id
    }

    pub fn text(&self, text_id: TextId) -> Option<Text> {
        self.texts.read().unwrap().get(&text_id).cloned()
    }

    fn update_text_status(&self, text_id: TextId, status: TextStatus, message: Option<String>) {
        if let Some(text) = self.texts.write().unwrap().get_mut(&text_id) {
            text.status = status;
            text.status_message = message;
        }
    }

    /// Tokenizes and persists one text's units and bigram shards.
    /// Blocking; call through [`Self::submit_ingest`] to run it on the
    /// ingest worker pool instead.
    pub fn ingest_text(&self, text_id: TextId, raw_content: &str, extractor: &dyn FeatureExtractor) -> Result<(), TesseraeError> {
        let language = self
            .texts
            .read()
            .unwrap()
            .get(&text_id)
            .map(|t| t.language.clone())
            .ok_or(TesseraeError::TextNotFound(text_id.get()))?;

        self.update_text_status(text_id, TextStatus::Running, None);
        log::info!("ingesting text {}", text_id.get());

        let built = match build_units(&self.registry, &language, text_id, raw_content, extractor) {
            Ok(built) => built,
            Err(e) => {
                self.update_text_status(text_id, TextStatus::Failed, Some(e.to_string()));
                return Err(e);
            }
        };

        self.units.put_text_units(text_id, UnitType::Line, built.lines);
        self.units.put_text_units(text_id, UnitType::Phrase, built.phrases);
        self.tokens.put_text_tokens(text_id, built.tokens);

        for unit_type in [UnitType::Line, UnitType::Phrase] {
            let units = self.units.units_of(text_id, unit_type);
            for kind in FeatureKind::iter() {
                if let Err(e) = self.bigram_store.ingest(text_id, unit_type, kind, &units) {
                    self.update_text_status(text_id, TextStatus::Failed, Some(e.to_string()));
                    return Err(e.into());
                }
            }
        }

        let hash = Text::hash_content(raw_content);
        if let Some(text) = self.texts.write().unwrap().get_mut(&text_id) {
            text.content_hash = hash;
        }
        self.update_text_status(text_id, TextStatus::Done, None);
        log::info!("finished ingesting text {}", text_id.get());
        Ok(())
    }

    /// Queues ingestion on the ingest worker pool.
    pub fn submit_ingest(self: &Arc<Self>, text_id: TextId, raw_content: String, extractor: Arc<dyn FeatureExtractor + Send + Sync>) {
        let engine = Arc::clone(self);
        self.ingest_pool.submit(Box::new(move || {
            if let Err(e) = engine.ingest_text(text_id, &raw_content, extractor.as_ref()) {
                log::error!("ingest of text {} failed: {e}", text_id.get());
            }
        }));
    }

    /// Deletes a text and, per §4.9, every search that references it as
    /// source or target, along with its units, bigram shards, and
    /// frequency counts.
    pub fn delete_text(&self, text_id: TextId) -> Result<(), TesseraeError> {
        self.registry.forget_text(text_id);
        self.units.delete_text(text_id);
        self.tokens.delete_text(text_id);
        self.bigram_store.delete_text(text_id)?;

        let affected: Vec<SearchId> = self
            .results
            .all_searches()
            .into_iter()
            .filter(|s| s.parameters.source.object_id == text_id || s.parameters.target.object_id == text_id)
            .map(|s| s.id)
            .collect();
        for id in affected {
            self.results.delete_search_cascading(id);
        }

        self.texts.write().unwrap().remove(&text_id);
        log::info!("deleted text {}", text_id.get());
        Ok(())
    }

    /// Returns an existing non-failed search with the same canonical
    /// key if one exists, otherwise registers a new one in `init`.
    pub fn find_or_create_search(&self, search_type: SearchType, params: SearchParams, results_id: Option<SearchId>) -> Result<SearchId, TesseraeError> {
        params.validate()?;
        let key = CanonicalKey::from_params(search_type, &params);
        let existing = self.results.all_searches().into_iter().find(|s| {
            s.search_type == search_type && s.status != SearchStatus::Failed && CanonicalKey::from_params(s.search_type, &s.parameters) == key
        });
        if let Some(search) = existing {
            self.results.update_search(search.id, |s| s.touch());
            return Ok(search.id);
        }
        let search = Search::new(search_type, params, results_id);
        let id = search.id;
        self.results.put_search(search);
        Ok(id)
    }

    pub fn search(&self, search_id: SearchId) -> Option<Search> {
        let search = self.results.get_search(search_id)?;
        self.results.update_search(search_id, |s| s.touch());
        Some(search)
    }

    /// Runs a vanilla or Greek-to-Latin search to completion, writing
    /// its matches through the result store. Blocking; call through
    /// [`Self::submit_search`] to run it on the search worker pool.
    pub fn run_search(&self, search_id: SearchId) -> Result<(), TesseraeError> {
        let search = self.results.get_search(search_id).ok_or(SearchError::SearchNotFound(search_id.get()))?;
        if matches!(search.search_type, SearchType::Multitext) {
            return Err(SearchError::Validation("multitext searches run through run_multitext_search".into()).into());
        }

        self.results.update_search(search_id, |s| s.start());

        let source_text = self
            .text(search.parameters.source.object_id)
            .ok_or(TesseraeError::TextNotFound(search.parameters.source.object_id.get()))?;
        let target_text = self
            .text(search.parameters.target.object_id)
            .ok_or(TesseraeError::TextNotFound(search.parameters.target.object_id.get()))?;

        if !source_text.is_ready() || !target_text.is_ready() {
            let message = "source or target text is not done ingesting".to_string();
            self.results.update_search(search_id, |s| s.fail(message.clone()));
            return Err(SearchError::Validation(message).into());
        }

        let dictionary = self.dictionary.read().unwrap();
        let ctx = SearchContext {
            registry: &self.registry,
            units: &self.units,
            dictionary: dictionary.as_ref(),
            bigram_store: Some(&self.bigram_store),
        };

        let outcome = match search.search_type {
            SearchType::Vanilla => run_vanilla(&ctx, search_id, &search.parameters, &source_text, &target_text),
            SearchType::GreekToLatin => run_greek_to_latin(&ctx, search_id, &search.parameters, &source_text, &target_text),
            SearchType::Multitext => unreachable!(),
        };
        drop(dictionary);

        match outcome {
            Ok(outcome) => {
                self.results.put_matches(search_id, outcome.matches);
                self.results.update_search(search_id, |s| s.finish());
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                self.results.update_search(search_id, |s| s.fail(message));
                Err(e.into())
            }
        }
    }

    /// Runs a multitext pass over an already-completed vanilla or
    /// Greek-to-Latin search: rebuilds the minimal candidate shape
    /// `run_multitext` needs from the persisted matches, since the
    /// scoring candidates themselves aren't retained past the run that
    /// produced them.
    pub fn run_multitext_search(&self, multitext_id: SearchId, corpus: &[TextId]) -> Result<(), TesseraeError> {
        let multitext_search = self.results.get_search(multitext_id).ok_or(SearchError::SearchNotFound(multitext_id.get()))?;
        let source_id = multitext_search.results_id.ok_or_else(|| SearchError::Validation("multitext search has no source search".into()))?;
        let source_search = self.results.get_search(source_id).ok_or(SearchError::SearchNotFound(source_id.get()))?;

        let kind = source_search.parameters.method.feature();
        let language = self
            .text(source_search.parameters.source.object_id)
            .map(|t| t.language)
            .ok_or(TesseraeError::TextNotFound(source_search.parameters.source.object_id.get()))?;

        self.results.update_search(multitext_id, |s| s.start());

        let matches = self.results.matches_of(source_id);
        let candidates: Vec<tesserae_core::matcher::Candidate> = matches
            .iter()
            .map(|m| tesserae_core::matcher::Candidate {
                source_unit: m.source_unit,
                target_unit: m.target_unit,
                shared_features: m.matched_tokens.iter().filter_map(|t| self.registry.lookup_index(&language, kind, t)).collect(),
                shared_positions: Vec::new(),
            })
            .collect();

        let service = tesserae_core::frequency::FrequencyService::new(&self.registry);
        let inv_freq: HashMap<_, _> = self
            .registry
            .iter_indices(&language, kind)
            .into_iter()
            .filter_map(|idx| service.corpus_inverse_frequency(&language, kind, idx).ok().map(|f| (idx, f)))
            .collect();

        let ctx = SearchContext { registry: &self.registry, units: &self.units, dictionary: None, bigram_store: Some(&self.bigram_store) };
        let outcome = tesserae_search::pipeline::SearchOutcome { matches: Vec::new(), candidates };
        let unit_type = multitext_search.parameters.source.units;

        match run_multitext(&ctx, &outcome, unit_type, kind, corpus, &inv_freq) {
            Ok(per_match) => {
                let mut multiresults = Vec::new();
                for (m, bigrams) in matches.iter().zip(per_match.into_iter()) {
                    for ((a, b), hits) in bigrams {
                        multiresults.push(MultiResult {
                            match_id: m.id,
                            search_id: multitext_id,
                            bigram: (
                                self.registry.lookup_token(&language, kind, a).unwrap_or_default(),
                                self.registry.lookup_token(&language, kind, b).unwrap_or_default(),
                            ),
                            units: hits.iter().map(|(unit, _)| *unit).collect(),
                            scores: hits.iter().map(|(_, score)| *score).collect(),
                        });
                    }
                }
                self.results.put_multiresults(multitext_id, multiresults);
                self.results.update_search(multitext_id, |s| s.finish());
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                self.results.update_search(multitext_id, |s| s.fail(message));
                Err(e.into())
            }
        }
    }

    /// Queues a vanilla or Greek-to-Latin search on the search worker pool.
    pub fn submit_search(self: &Arc<Self>, search_id: SearchId) {
        let engine = Arc::clone(self);
        self.search_pool.submit(Box::new(move || {
            if let Err(e) = engine.run_search(search_id) {
                log::error!("search {search_id:?} failed: {e}");
            }
        }));
    }

    /// Returns one page of a completed search's matches.
    pub fn matches_page(&self, search_id: SearchId, paging: &Paging) -> MatchPage {
        let matches = self.results.matches_of(search_id);
        let total = matches.len();
        let page = paginate(matches, paging, |m, sort_by| match sort_by {
            SortBy::Score => String::new(),
            SortBy::SourceTag => m.source_tag.clone(),
            SortBy::TargetTag => m.target_tag.clone(),
            SortBy::MatchedFeatures => m.matched_tokens.join(" "),
        });
        MatchPage { matches: page, total }
    }

    /// Exports a completed search's matches as rows ready for the CSV
    /// writer in [`tesserae_search::export`].
    pub fn export_rows(&self, search_id: SearchId, open_markup: &str, close_markup: &str) -> Vec<ResultRow> {
        let matches = self.results.matches_of(search_id);
        let max_score = matches.iter().map(|m| m.score).fold(f64::MIN, f64::max);
        build_rows(&matches, max_score.max(0.0), open_markup, close_markup)
    }

    pub fn delete_search(&self, search_id: SearchId) {
        self.results.delete_search_cascading(search_id);
    }

    /// Sweeps searches past the 28-day TTL, per §4.9. Call periodically
    /// from a scheduled job at `config.gc_interval_secs`.
    pub fn sweep_expired_searches(&self) -> usize {
        sweep_expired(&self.results, SystemTime::now())
    }

    pub fn shutdown(self) {
        self.ingest_pool.shutdown();
        self.search_pool.shutdown();
    }
}
