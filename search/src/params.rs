use serde::{Deserialize, Serialize};

use tesserae_core::feature::FeatureKind;
use tesserae_core::frequency::FrequencyBasis;
use tesserae_core::text::TextId;
use tesserae_core::unit::UnitType;
use tesserae_scoring::DistanceBasis;

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TextOptions {
    pub object_id: TextId,
    pub units: UnitType,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum Stopwords {
    Tokens(Vec<String>),
    Count(u32),
}

impl Default for Stopwords {
    fn default() -> Self {
        Stopwords::Tokens(Vec::new())
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum StopwordBasis {
    Corpus,
    Texts,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum MatcherMethod {
    Vanilla {
        feature: FeatureKind,
        stopwords: Stopwords,
        stopword_basis: StopwordBasis,
    },
    GreekToLatin {
        feature: FeatureKind,
        greek_stopwords: Stopwords,
        latin_stopwords: Stopwords,
        stopword_basis: StopwordBasis,
    },
}

impl MatcherMethod {
    pub fn feature(&self) -> FeatureKind {
        match self {
            MatcherMethod::Vanilla { feature, .. } => *feature,
            MatcherMethod::GreekToLatin { feature, .. } => *feature,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MatcherMethod::Vanilla { .. } => "vanilla",
            MatcherMethod::GreekToLatin { .. } => "greek_to_latin",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchParams {
    pub source: TextOptions,
    pub target: TextOptions,
    pub method: MatcherMethod,
    pub freq_basis: FrequencyBasis,
    pub max_distance: u32,
    pub distance_basis: DistanceBasis,
    pub min_score: f64,
}

impl SearchParams {
    pub fn validate(&self) -> Result<(), crate::errors::SearchError> {
        use crate::errors::SearchError;
        if self.max_distance == 0 {
            return Err(SearchError::Validation("max_distance must be positive".into()));
        }
        if matches!(self.method, MatcherMethod::GreekToLatin { .. }) && self.freq_basis != FrequencyBasis::Texts {
            return Err(SearchError::Validation("greek_to_latin requires freq_basis = texts".into()));
        }
        Ok(())
    }
}
