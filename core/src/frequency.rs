//! Derives inverse-frequency weights used by the scorer, either from
//! the whole corpus or from a single text.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::feature::{FeatureIndex, FeatureKind, FeatureRegistry};
use crate::language::Language;
use crate::text::TextId;
use crate::unit::Unit;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum FrequencyBasis {
    Corpus,
    Texts,
}

/// Computes inverse-frequency weights per §4.3. Corpus-basis results
/// are cached per `(language, kind)` by the caller (the cache is
/// invalidated whenever a text of that language is ingested or
/// removed); texts-basis results are cheap enough to recompute per
/// search and are never cached across searches.
pub struct FrequencyService<'r> {
    registry: &'r FeatureRegistry,
}

impl<'r> FrequencyService<'r> {
    pub fn new(registry: &'r FeatureRegistry) -> Self {
        Self { registry }
    }

    /// Corpus-basis inverse frequency of `index`: the reciprocal of its
    /// relative frequency among all occurrences of `kind` in `language`.
    pub fn corpus_inverse_frequency(&self, language: &Language, kind: FeatureKind, index: FeatureIndex) -> Result<f64, CoreError> {
        let total = self.registry.total_occurrences(language, kind);
        let count = self.registry.count_total(language, kind, index);
        if total == 0 || count == 0 {
            return Err(CoreError::UndefinedFrequency(feature_index_raw(index)));
        }
        let relative = count as f64 / total as f64;
        Ok(1.0 / relative)
    }

    /// Texts-basis inverse frequency of `index`, restricted to a single
    /// text: `total word positions / occurrences of index in that text`.
    /// Undefined (and an error) when `index` never occurs in `text_id`.
    pub fn text_inverse_frequency(
        &self,
        language: &Language,
        kind: FeatureKind,
        index: FeatureIndex,
        text_id: TextId,
        total_word_positions: u64,
    ) -> Result<f64, CoreError> {
        let count = self.registry.count_in_text(language, kind, index, text_id);
        if count == 0 {
            return Err(CoreError::UndefinedFrequency(feature_index_raw(index)));
        }
        Ok(total_word_positions as f64 / count as f64)
    }

    /// Builds a dense lookup table of inverse frequencies for every
    /// feature index occurring in `unit`, skipping positions whose
    /// index has no defined frequency rather than failing the whole
    /// unit (§4.3: "such positions never enter scoring").
    pub fn table_for_unit(
        &self,
        language: &Language,
        kind: FeatureKind,
        basis: FrequencyBasis,
        text_id: TextId,
        unit: &Unit,
        total_word_positions: u64,
    ) -> HashMap<FeatureIndex, f64> {
        let mut table = HashMap::new();
        for index in unit.feature_set(kind) {
            let freq = match basis {
                FrequencyBasis::Corpus => self.corpus_inverse_frequency(language, kind, index),
                FrequencyBasis::Texts => {
                    self.text_inverse_frequency(language, kind, index, text_id, total_word_positions)
                }
            };
            if let Ok(freq) = freq {
                table.insert(index, freq);
            }
        }
        table
    }

    /// Corpus-basis inverse frequency of `index`, pooled with
    /// `extra_indices`: the reciprocal of the *combined* relative
    /// frequency of `index` and every index in `extra_indices`. Used by
    /// the Greek-to-Latin matcher (§4.3/§4.6) to fold the counts of
    /// every other Greek lemma translating to the same Latin targets
    /// into a single index's frequency.
    pub fn corpus_inverse_frequency_pooled(
        &self,
        language: &Language,
        kind: FeatureKind,
        index: FeatureIndex,
        extra_indices: &[FeatureIndex],
    ) -> Result<f64, CoreError> {
        let total = self.registry.total_occurrences(language, kind);
        let mut count = self.registry.count_total(language, kind, index);
        for &extra in extra_indices {
            count += self.registry.count_total(language, kind, extra);
        }
        if total == 0 || count == 0 {
            return Err(CoreError::UndefinedFrequency(feature_index_raw(index)));
        }
        let relative = count as f64 / total as f64;
        Ok(1.0 / relative)
    }

    /// Texts-basis counterpart of [`Self::corpus_inverse_frequency_pooled`].
    pub fn text_inverse_frequency_pooled(
        &self,
        language: &Language,
        kind: FeatureKind,
        index: FeatureIndex,
        text_id: TextId,
        total_word_positions: u64,
        extra_indices: &[FeatureIndex],
    ) -> Result<f64, CoreError> {
        let mut count = self.registry.count_in_text(language, kind, index, text_id);
        for &extra in extra_indices {
            count += self.registry.count_in_text(language, kind, extra, text_id);
        }
        if count == 0 {
            return Err(CoreError::UndefinedFrequency(feature_index_raw(index)));
        }
        Ok(total_word_positions as f64 / count as f64)
    }

    /// Pooled counterpart of [`Self::table_for_unit`]: `pooled_with`
    /// supplies the extra indices to fold into each position's index
    /// before computing its frequency.
    pub fn table_for_unit_pooled(
        &self,
        language: &Language,
        kind: FeatureKind,
        basis: FrequencyBasis,
        text_id: TextId,
        unit: &Unit,
        total_word_positions: u64,
        pooled_with: impl Fn(FeatureIndex) -> Vec<FeatureIndex>,
    ) -> HashMap<FeatureIndex, f64> {
        let mut table = HashMap::new();
        for index in unit.feature_set(kind) {
            let extra = pooled_with(index);
            let freq = match basis {
                FrequencyBasis::Corpus => self.corpus_inverse_frequency_pooled(language, kind, index, &extra),
                FrequencyBasis::Texts => {
                    self.text_inverse_frequency_pooled(language, kind, index, text_id, total_word_positions, &extra)
                }
            };
            if let Ok(freq) = freq {
                table.insert(index, freq);
            }
        }
        table
    }
}

fn feature_index_raw(index: FeatureIndex) -> u32 {
    use string_interner::Symbol;
    index.to_usize() as u32
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::feature::FeatureKind;

    #[test]
    fn corpus_basis_inverts_relative_frequency() {
        let registry = FeatureRegistry::new();
        let lang: Language = "latin".into();
        let arma = registry.intern(&lang, FeatureKind::Lemmata, "arma");
        let cano = registry.intern(&lang, FeatureKind::Lemmata, "cano");
        let t1 = TextId::new(1);
        registry.count_inc(&lang, FeatureKind::Lemmata, arma, t1, 1);
        registry.count_inc(&lang, FeatureKind::Lemmata, cano, t1, 9);

        let service = FrequencyService::new(&registry);
        let freq = service.corpus_inverse_frequency(&lang, FeatureKind::Lemmata, arma).unwrap();
        assert!((freq - 10.0).abs() < 1e-9);
    }

    #[test]
    fn texts_basis_is_undefined_for_absent_index() {
        let registry = FeatureRegistry::new();
        let lang: Language = "latin".into();
        let arma = registry.intern(&lang, FeatureKind::Lemmata, "arma");
        let service = FrequencyService::new(&registry);
        let result = service.text_inverse_frequency(&lang, FeatureKind::Lemmata, arma, TextId::new(1), 100);
        assert!(result.is_err());
    }

    #[test]
    fn pooled_corpus_frequency_combines_extra_counts() {
        let registry = FeatureRegistry::new();
        let lang: Language = "greek".into();
        let menis = registry.intern(&lang, FeatureKind::Lemmata, "menis");
        let orge = registry.intern(&lang, FeatureKind::Lemmata, "orge");
        let t1 = TextId::new(1);
        registry.count_inc(&lang, FeatureKind::Lemmata, menis, t1, 1);
        registry.count_inc(&lang, FeatureKind::Lemmata, orge, t1, 9);

        let service = FrequencyService::new(&registry);
        let alone = service.corpus_inverse_frequency(&lang, FeatureKind::Lemmata, menis).unwrap();
        let pooled = service.corpus_inverse_frequency_pooled(&lang, FeatureKind::Lemmata, menis, &[orge]).unwrap();
        assert!((alone - 10.0).abs() < 1e-9);
        assert!((pooled - 1.0).abs() < 1e-9, "pooled count covers all 10 occurrences, so relative frequency is 1.0");
    }
}
