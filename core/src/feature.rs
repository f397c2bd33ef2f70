//! Process-wide interning of `(language, feature-kind, token)` triples
//! into dense, monotonically assigned integer indices, plus per-text
//! occurrence counts used by the frequency service.

use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use serde::{Deserialize, Serialize};
use string_interner::DefaultSymbol;
use strum::{Display, EnumIter};
use tesserae_toolkit::create_interned_typesafe_symbol;

use crate::error::CoreError;
use crate::language::Language;
use crate::text::TextId;

create_interned_typesafe_symbol!(FeatureIdx);

/// The dense index of an interned feature, unique within its
/// `(language, kind)` namespace.
pub type FeatureIndex = FeatureIdxSymbol;

/// The kind of surface a feature is derived from. `SemanticLemmata` is
/// the lemma-backed synonym expansion; the matcher treats it as a
/// union over the lemma and semantic namespaces.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum FeatureKind {
    Form,
    Lemmata,
    Sound,
    Semantic,
    #[strum(serialize = "semantic+lemmata")]
    #[serde(rename = "semantic+lemmata")]
    SemanticLemmata,
}

#[derive(Default)]
struct Namespace {
    interner: FeatureIdxStringInterner,
    counts: HashMap<FeatureIndex, HashMap<TextId, u64>>,
}

#[derive(Eq, PartialEq, Hash, Clone)]
struct NamespaceKey(Language, FeatureKind);

/// Interns feature tokens per `(language, kind)` namespace and tracks
/// per-text occurrence counts for the frequency service.
///
/// Insert-or-lookup on a single namespace is serialized through that
/// namespace's own mutex; looking up or creating a namespace briefly
/// takes the registry-wide lock.
#[derive(Default)]
pub struct FeatureRegistry {
    namespaces: RwLock<HashMap<NamespaceKey, Mutex<Namespace>>>,
}

impl FeatureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_namespace<R>(&self, language: &Language, kind: FeatureKind, f: impl FnOnce(&mut Namespace) -> R) -> R {
        {
            let read = self.namespaces.read().unwrap();
            if let Some(ns) = read.get(&NamespaceKey(language.clone(), kind)) {
                return f(&mut ns.lock().unwrap());
            }
        }
        let mut write = self.namespaces.write().unwrap();
        let ns = write
            .entry(NamespaceKey(language.clone(), kind))
            .or_insert_with(|| Mutex::new(Namespace::default()));
        f(&mut ns.lock().unwrap())
    }

    /// Interns `token`, returning its existing index or allocating the
    /// next dense index in the `(language, kind)` namespace.
    pub fn intern(&self, language: &Language, kind: FeatureKind, token: &str) -> FeatureIndex {
        self.with_namespace(language, kind, |ns| ns.interner.get_or_intern(token))
    }

    pub fn lookup_index(&self, language: &Language, kind: FeatureKind, token: &str) -> Option<FeatureIndex> {
        self.with_namespace(language, kind, |ns| ns.interner.get(token))
    }

    pub fn lookup_token(&self, language: &Language, kind: FeatureKind, index: FeatureIndex) -> Option<String> {
        self.with_namespace(language, kind, |ns| ns.interner.resolve(index).map(str::to_string))
    }

    /// Every index interned so far in `(language, kind)`, in
    /// allocation order.
    pub fn iter_indices(&self, language: &Language, kind: FeatureKind) -> Vec<FeatureIndex> {
        self.with_namespace(language, kind, |ns| ns.interner.iter().map(|(sym, _)| sym).collect())
    }

    /// The `n` indices with the highest occurrence count in `(language,
    /// kind)`, restricted to `texts` when given or the whole corpus
    /// otherwise. Ties break on interning order. Used to auto-derive a
    /// stopword list from [`Stopwords::Count`](crate::frequency).
    pub fn top_n_by_count(
        &self,
        language: &Language,
        kind: FeatureKind,
        texts: Option<&[TextId]>,
        n: u32,
    ) -> Vec<FeatureIndex> {
        self.with_namespace(language, kind, |ns| {
            let mut counted: Vec<(FeatureIndex, u64)> = ns
                .interner
                .iter()
                .map(|(sym, _)| {
                    let total = match texts {
                        Some(texts) => texts
                            .iter()
                            .map(|t| ns.counts.get(&sym).and_then(|m| m.get(t)).copied().unwrap_or(0))
                            .sum(),
                        None => ns.counts.get(&sym).map(|m| m.values().sum()).unwrap_or(0),
                    };
                    (sym, total)
                })
                .collect();
            counted.sort_by(|a, b| b.1.cmp(&a.1));
            counted.into_iter().take(n as usize).map(|(sym, _)| sym).collect()
        })
    }

    /// Increments the occurrence count of `index` within `text_id`.
    pub fn count_inc(&self, language: &Language, kind: FeatureKind, index: FeatureIndex, text_id: TextId, n: u64) {
        self.with_namespace(language, kind, |ns| {
            *ns.counts.entry(index).or_default().entry(text_id).or_insert(0) += n;
        });
    }

    /// The occurrence count of `index` restricted to `text_id`, or 0.
    pub fn count_in_text(&self, language: &Language, kind: FeatureKind, index: FeatureIndex, text_id: TextId) -> u64 {
        self.with_namespace(language, kind, |ns| {
            ns.counts.get(&index).and_then(|m| m.get(&text_id)).copied().unwrap_or(0)
        })
    }

    /// The total occurrence count of `index` across every text seen so far.
    pub fn count_total(&self, language: &Language, kind: FeatureKind, index: FeatureIndex) -> u64 {
        self.with_namespace(language, kind, |ns| {
            ns.counts.get(&index).map(|m| m.values().sum()).unwrap_or(0)
        })
    }

    /// Sum of all occurrence counts attributed to `text_id` across
    /// every index in this namespace, the denominator of the
    /// texts-basis relative frequency.
    pub fn text_total_occurrences(&self, language: &Language, kind: FeatureKind, text_id: TextId) -> u64 {
        self.with_namespace(language, kind, |ns| {
            ns.counts.values().filter_map(|m| m.get(&text_id)).sum()
        })
    }

    /// Sum of all occurrence counts across every index and text in this
    /// namespace, the denominator of the corpus-basis relative frequency.
    pub fn total_occurrences(&self, language: &Language, kind: FeatureKind) -> u64 {
        self.with_namespace(language, kind, |ns| {
            ns.counts.values().map(|m| m.values().sum::<u64>()).sum()
        })
    }

    /// Drops every occurrence count attributed to `text_id`, used by the
    /// deletion cascade; leaves the interned indices themselves intact
    /// since other texts may still reference them.
    pub fn forget_text(&self, text_id: TextId) {
        let read = self.namespaces.read().unwrap();
        for ns in read.values() {
            let mut ns = ns.lock().unwrap();
            for counts in ns.counts.values_mut() {
                counts.remove(&text_id);
            }
        }
    }

    pub fn intern_checked(&self, language: &Language, kind: FeatureKind, token: &str) -> Result<FeatureIndex, CoreError> {
        Ok(self.intern(language, kind, token))
    }
}

#[allow(unused)]
type _SymbolBackendCheck = DefaultSymbol;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn intern_is_idempotent_and_dense() {
        let registry = FeatureRegistry::new();
        let lang: Language = "latin".into();
        let a = registry.intern(&lang, FeatureKind::Lemmata, "arma");
        let b = registry.intern(&lang, FeatureKind::Lemmata, "cano");
        let a2 = registry.intern(&lang, FeatureKind::Lemmata, "arma");
        assert_eq!(a, a2);
        assert_ne!(a, b);
    }

    #[test]
    fn namespaces_are_independent() {
        let registry = FeatureRegistry::new();
        let latin: Language = "latin".into();
        let greek: Language = "greek".into();
        let a = registry.intern(&latin, FeatureKind::Lemmata, "arma");
        let b = registry.intern(&greek, FeatureKind::Lemmata, "arma");
        // Same token, different namespace: both get index 0 independently.
        assert_eq!(a.to_usize(), 0);
        assert_eq!(b.to_usize(), 0);
        use string_interner::Symbol;
        let _ = a;
    }

    #[test]
    fn counts_accumulate_per_text() {
        let registry = FeatureRegistry::new();
        let lang: Language = "latin".into();
        let idx = registry.intern(&lang, FeatureKind::Form, "arma");
        let text = TextId::new(1);
        registry.count_inc(&lang, FeatureKind::Form, idx, text, 3);
        registry.count_inc(&lang, FeatureKind::Form, idx, text, 2);
        assert_eq!(registry.count_in_text(&lang, FeatureKind::Form, idx, text), 5);
    }

    #[test]
    fn top_n_by_count_orders_by_frequency() {
        let registry = FeatureRegistry::new();
        let lang: Language = "latin".into();
        let t1 = TextId::new(1);
        let arma = registry.intern(&lang, FeatureKind::Lemmata, "arma");
        let et = registry.intern(&lang, FeatureKind::Lemmata, "et");
        let cano = registry.intern(&lang, FeatureKind::Lemmata, "cano");
        registry.count_inc(&lang, FeatureKind::Lemmata, arma, t1, 2);
        registry.count_inc(&lang, FeatureKind::Lemmata, et, t1, 50);
        registry.count_inc(&lang, FeatureKind::Lemmata, cano, t1, 5);
        let top = registry.top_n_by_count(&lang, FeatureKind::Lemmata, None, 2);
        assert_eq!(top, vec![et, cano]);
    }

    #[test]
    fn forget_text_clears_only_that_text() {
        let registry = FeatureRegistry::new();
        let lang: Language = "latin".into();
        let idx = registry.intern(&lang, FeatureKind::Form, "arma");
        let t1 = TextId::new(1);
        let t2 = TextId::new(2);
        registry.count_inc(&lang, FeatureKind::Form, idx, t1, 3);
        registry.count_inc(&lang, FeatureKind::Form, idx, t2, 7);
        registry.forget_text(t1);
        assert_eq!(registry.count_in_text(&lang, FeatureKind::Form, idx, t1), 0);
        assert_eq!(registry.count_in_text(&lang, FeatureKind::Form, idx, t2), 7);
    }
}
