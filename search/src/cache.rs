use crate::lifecycle::SearchType;
use crate::params::{MatcherMethod, SearchParams, Stopwords};

/// A canonical, hashable view of a search's parameters, used to detect
/// and reuse an existing non-failed search instead of rerunning it.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct CanonicalKey {
    search_type: &'static str,
    source: (u64, String),
    target: (u64, String),
    method: &'static str,
    feature: String,
    stopwords: Vec<String>,
    freq_basis: String,
    max_distance: u32,
    distance_basis: String,
    min_score_bits: u64,
}

fn normalize_stopwords(stopwords: &Stopwords) -> Vec<String> {
    match stopwords {
        Stopwords::Tokens(tokens) => {
            let mut sorted = tokens.clone();
            sorted.sort();
            sorted
        }
        Stopwords::Count(n) => vec![format!("#count:{n}")],
    }
}

impl CanonicalKey {
    pub fn from_params(search_type: SearchType, params: &SearchParams) -> Self {
        let (method, feature, mut stopwords) = match &params.method {
            MatcherMethod::Vanilla { feature, stopwords, .. } => ("vanilla", *feature, normalize_stopwords(stopwords)),
            MatcherMethod::GreekToLatin { feature, greek_stopwords, latin_stopwords, .. } => {
                let mut combined = normalize_stopwords(greek_stopwords);
                combined.extend(normalize_stopwords(latin_stopwords));
                ("greek_to_latin", *feature, combined)
            }
        };
        stopwords.sort();

        Self {
            search_type: match search_type {
                SearchType::Vanilla => "vanilla",
                SearchType::Multitext => "multitext",
                SearchType::GreekToLatin => "greek_to_latin",
            },
            source: (params.source.object_id.get(), format!("{}", params.source.units)),
            target: (params.target.object_id.get(), format!("{}", params.target.units)),
            method,
            feature: feature.to_string(),
            stopwords,
            freq_basis: format!("{:?}", params.freq_basis),
            max_distance: params.max_distance,
            distance_basis: format!("{:?}", params.distance_basis),
            min_score_bits: params.min_score.to_bits(),
        }
    }
}
