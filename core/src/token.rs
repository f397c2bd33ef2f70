//! Materialized per-position tokens, kept alongside a text's units so a
//! caller can walk exact positions without re-tokenizing. Built once at
//! ingest time and replaced wholesale if a text is re-ingested.

use std::collections::HashMap;
use std::sync::RwLock;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::feature::{FeatureIndex, FeatureKind};
use crate::text::TextId;

/// A materialized position in a text. Punctuation and whitespace tokens
/// keep their display string but carry an empty feature map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub text_id: TextId,
    pub position: u32,
    pub display: String,
    pub features: IndexMap<FeatureKind, Vec<FeatureIndex>>,
}

impl Token {
    pub fn new(text_id: TextId, position: u32, display: impl Into<String>) -> Self {
        Self {
            text_id,
            position,
            display: display.into(),
            features: IndexMap::new(),
        }
    }

    pub fn is_word(&self) -> bool {
        !self.features.is_empty()
    }

    pub fn features_of(&self, kind: FeatureKind) -> &[FeatureIndex] {
        self.features.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn add_feature(&mut self, kind: FeatureKind, index: FeatureIndex) {
        self.features.entry(kind).or_default().push(index);
    }
}

/// Persists the materialized tokens of each text, keyed by `text_id`,
/// in position order. Deleting a text's units deletes its tokens too.
#[derive(Default)]
pub struct TokenIndex {
    tokens: RwLock<HashMap<TextId, Vec<Token>>>,
}

impl TokenIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically replaces the tokens of `text_id`. Tokens must already
    /// be in position order.
    pub fn put_text_tokens(&self, text_id: TextId, tokens: Vec<Token>) {
        self.tokens.write().unwrap().insert(text_id, tokens);
    }

    pub fn tokens_of(&self, text_id: TextId) -> Vec<Token> {
        self.tokens.read().unwrap().get(&text_id).cloned().unwrap_or_default()
    }

    pub fn delete_text(&self, text_id: TextId) {
        self.tokens.write().unwrap().remove(&text_id);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::feature::FeatureKind;

    fn index(raw: usize) -> FeatureIndex {
        use string_interner::Symbol;
        FeatureIndex::try_from_usize(raw).unwrap()
    }

    #[test]
    fn add_feature_marks_a_token_as_a_word() {
        let mut token = Token::new(TextId::new(1), 0, "arma");
        assert!(!token.is_word());
        token.add_feature(FeatureKind::Lemmata, index(0));
        assert!(token.is_word());
        assert_eq!(token.features_of(FeatureKind::Lemmata), &[index(0)]);
    }

    #[test]
    fn store_replaces_a_texts_tokens_atomically() {
        let store = TokenIndex::new();
        let text_id = TextId::new(1);
        store.put_text_tokens(text_id, vec![Token::new(text_id, 0, "arma")]);
        assert_eq!(store.tokens_of(text_id).len(), 1);
        store.put_text_tokens(text_id, vec![Token::new(text_id, 0, "arma"), Token::new(text_id, 1, "virumque")]);
        assert_eq!(store.tokens_of(text_id).len(), 2);
        store.delete_text(text_id);
        assert!(store.tokens_of(text_id).is_empty());
    }
}
