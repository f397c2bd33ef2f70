use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use tesserae_core::unit::UnitId;

use crate::lifecycle::{Search, SearchId};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[repr(transparent)]
pub struct MatchId(u64);

impl MatchId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub search_id: SearchId,
    pub source_unit: UnitId,
    pub target_unit: UnitId,
    pub source_tag: String,
    pub target_tag: String,
    pub source_snippet: String,
    pub target_snippet: String,
    pub matched_tokens: Vec<String>,
    pub highlight: Vec<(u32, u32)>,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiResult {
    pub match_id: MatchId,
    pub search_id: SearchId,
    pub bigram: (String, String),
    pub units: Vec<UnitId>,
    pub scores: Vec<f64>,
}

/// The persistence seam for searches and their matches/multiresults.
/// Implementations must honor the deletion cascade: removing a search
/// removes its matches and (for a vanilla search) any multitext search
/// keyed to its results-id.
pub trait ResultStore: Send + Sync {
    fn put_search(&self, search: Search);
    fn get_search(&self, id: SearchId) -> Option<Search>;
    fn update_search(&self, id: SearchId, f: impl FnOnce(&mut Search));
    fn find_by_results_id(&self, results_id: SearchId) -> Option<Search>;
    fn all_searches(&self) -> Vec<Search>;
    fn delete_search(&self, id: SearchId);

    fn put_matches(&self, search_id: SearchId, matches: Vec<Match>);
    fn matches_of(&self, search_id: SearchId) -> Vec<Match>;
    fn delete_matches_of(&self, search_id: SearchId);

    fn put_multiresults(&self, search_id: SearchId, results: Vec<MultiResult>);
    fn multiresults_of(&self, search_id: SearchId) -> Vec<MultiResult>;
    fn delete_multiresults_of(&self, search_id: SearchId);

    /// Deletes a search along with everything the cascade in §4.9
    /// requires: its matches, its multiresults, and (if it is a
    /// vanilla search) any multitext search keyed to it.
    fn delete_search_cascading(&self, id: SearchId) {
        if let Some(search) = self.get_search(id) {
            if let Some(dependent) = self.find_by_results_id(id) {
                self.delete_search_cascading(dependent.id);
            }
            let _ = search;
        }
        self.delete_multiresults_of(id);
        self.delete_matches_of(id);
        self.delete_search(id);
    }
}

#[derive(Default)]
pub struct InMemoryResultStore {
    searches: RwLock<HashMap<SearchId, Search>>,
    matches: RwLock<HashMap<SearchId, Vec<Match>>>,
    multiresults: RwLock<HashMap<SearchId, Vec<MultiResult>>>,
}

impl InMemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultStore for InMemoryResultStore {
    fn put_search(&self, search: Search) {
        self.searches.write().unwrap().insert(search.id, search);
    }

    fn get_search(&self, id: SearchId) -> Option<Search> {
        self.searches.read().unwrap().get(&id).cloned()
    }

    fn update_search(&self, id: SearchId, f: impl FnOnce(&mut Search)) {
        if let Some(search) = self.searches.write().unwrap().get_mut(&id) {
            f(search);
        }
    }

    fn find_by_results_id(&self, results_id: SearchId) -> Option<Search> {
        self.searches.read().unwrap().values().find(|s| s.results_id == Some(results_id)).cloned()
    }

    fn all_searches(&self) -> Vec<Search> {
        self.searches.read().unwrap().values().cloned().collect()
    }

    fn delete_search(&self, id: SearchId) {
        self.searches.write().unwrap().remove(&id);
    }

    fn put_matches(&self, search_id: SearchId, matches: Vec<Match>) {
        self.matches.write().unwrap().insert(search_id, matches);
    }

    fn matches_of(&self, search_id: SearchId) -> Vec<Match> {
        self.matches.read().unwrap().get(&search_id).cloned().unwrap_or_default()
    }

    fn delete_matches_of(&self, search_id: SearchId) {
        self.matches.write().unwrap().remove(&search_id);
    }

    fn put_multiresults(&self, search_id: SearchId, results: Vec<MultiResult>) {
        self.multiresults.write().unwrap().insert(search_id, results);
    }

    fn multiresults_of(&self, search_id: SearchId) -> Vec<MultiResult> {
        self.multiresults.read().unwrap().get(&search_id).cloned().unwrap_or_default()
    }

    fn delete_multiresults_of(&self, search_id: SearchId) {
        self.multiresults.write().unwrap().remove(&search_id);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lifecycle::SearchType;
    use crate::params::{MatcherMethod, StopwordBasis, Stopwords, SearchParams, TextOptions};
    use tesserae_core::feature::FeatureKind;
    use tesserae_core::frequency::FrequencyBasis;
    use tesserae_core::text::TextId;
    use tesserae_core::unit::UnitType;
    use tesserae_scoring::DistanceBasis;

    fn dummy_params() -> SearchParams {
        SearchParams {
            source: TextOptions { object_id: TextId::new(1), units: UnitType::Line },
            target: TextOptions { object_id: TextId::new(2), units: UnitType::Line },
            method: MatcherMethod::Vanilla {
                feature: FeatureKind::Lemmata,
                stopwords: Stopwords::default(),
                stopword_basis: StopwordBasis::Corpus,
            },
            freq_basis: FrequencyBasis::Texts,
            max_distance: 10,
            distance_basis: DistanceBasis::Span,
            min_score: 0.0,
        }
    }

    #[test]
    fn cascading_delete_removes_dependent_multitext_search() {
        let store = InMemoryResultStore::new();
        let vanilla = Search::new(SearchType::Vanilla, dummy_params(), None);
        let vanilla_id = vanilla.id;
        store.put_search(vanilla);

        let multitext = Search::new(SearchType::Multitext, dummy_params(), Some(vanilla_id));
        let multitext_id = multitext.id;
        store.put_search(multitext);

        store.delete_search_cascading(vanilla_id);

        assert!(store.get_search(vanilla_id).is_none());
        assert!(store.get_search(multitext_id).is_none());
    }
}
