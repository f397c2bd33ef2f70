//! Multitext bigram recall: for a match's shared features, every other
//! line across a corpus that carries the same bigram comes back with a
//! positive score, exactly once per line.

use indexmap::IndexMap;
use string_interner::Symbol;

use tesserae_core::bigram::BigramStore;
use tesserae_core::feature::{FeatureIndex, FeatureKind, FeatureRegistry};
use tesserae_core::language::Language;
use tesserae_core::matcher::Candidate;
use tesserae_core::multitext::run_multitext;
use tesserae_core::text::TextId;
use tesserae_core::unit::{Unit, UnitId, UnitType};

fn canonical(a: FeatureIndex, b: FeatureIndex) -> (FeatureIndex, FeatureIndex) {
    if a.to_usize() <= b.to_usize() {
        (a, b)
    } else {
        (b, a)
    }
}

fn line(text_id: TextId, ordinal: u32, features: Vec<FeatureIndex>) -> Unit {
    let features_by_position: Vec<IndexMap<FeatureKind, Vec<FeatureIndex>>> = features
        .iter()
        .map(|&f| {
            let mut row = IndexMap::new();
            row.insert(FeatureKind::Lemmata, vec![f]);
            row
        })
        .collect();
    Unit {
        id: UnitId::new(ordinal as u64),
        text_id,
        unit_type: UnitType::Line,
        ordinal,
        locus_tags: vec![format!("{ordinal}.1")],
        snippet: String::new(),
        token_positions: (0..features.len() as u32).collect(),
        features_by_position,
    }
}

#[test]
fn multitext_bigram_recall_across_a_three_text_corpus() {
    let dir = tempfile::tempdir().unwrap();
    let store = BigramStore::new(camino::Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap());
    let registry = FeatureRegistry::new();
    let lang: Language = "latin".into();

    let arma = registry.intern(&lang, FeatureKind::Lemmata, "arma");
    let cano = registry.intern(&lang, FeatureKind::Lemmata, "cano");
    let virum = registry.intern(&lang, FeatureKind::Lemmata, "virum");

    let text1 = TextId::new(1);
    let text2 = TextId::new(2);
    let text3 = TextId::new(3);

    // text1: carries all three features, so all three bigrams.
    let unit1 = line(text1, 0, vec![arma, cano, virum]);
    // text2: arma+cano only.
    let unit2 = line(text2, 0, vec![arma, cano]);
    // text3: cano+virum only.
    let unit3 = line(text3, 0, vec![cano, virum]);

    store.ingest(text1, UnitType::Line, FeatureKind::Lemmata, &[unit1.clone()]).unwrap();
    store.ingest(text2, UnitType::Line, FeatureKind::Lemmata, &[unit2]).unwrap();
    store.ingest(text3, UnitType::Line, FeatureKind::Lemmata, &[unit3]).unwrap();

    let candidate = Candidate {
        source_unit: UnitId::new(99),
        target_unit: UnitId::new(100),
        shared_features: vec![arma, cano, virum],
        shared_positions: Vec::new(),
    };

    let inv_freq: std::collections::HashMap<FeatureIndex, f64> = [(arma, 2.0), (cano, 3.0), (virum, 4.0)].into_iter().collect();
    let corpus = [text1, text2, text3];

    let per_match = run_multitext(&store, &[candidate], UnitType::Line, FeatureKind::Lemmata, &corpus, &inv_freq).unwrap();
    assert_eq!(per_match.len(), 1);
    let bigrams = &per_match[0];

    // Every hit below sits at adjacent positions (dist == 1), so the
    // `ln(dist)` term drops out and the score is just `ln(freq_a + freq_b)`
    // on the hand-supplied inverse frequencies above.
    let arma_cano = bigrams.get(&canonical(arma, cano)).expect("arma/cano bigram present");
    let arma_cano_units: Vec<UnitId> = arma_cano.iter().map(|(id, _)| *id).collect();
    assert!(arma_cano_units.contains(&unit1.id));
    assert_eq!(arma_cano.len(), 2, "arma/cano should recall from text1 and text2");
    let expected_arma_cano = (2.0_f64 + 3.0).ln();
    for (_, score) in arma_cano {
        assert!((score - expected_arma_cano).abs() < 1e-9, "got {score}, expected {expected_arma_cano}");
    }

    let cano_virum = bigrams.get(&canonical(cano, virum)).expect("cano/virum bigram present");
    assert_eq!(cano_virum.len(), 2, "cano/virum should recall from text1 and text3");
    let expected_cano_virum = (3.0_f64 + 4.0).ln();
    for (_, score) in cano_virum {
        assert!((score - expected_cano_virum).abs() < 1e-9, "got {score}, expected {expected_cano_virum}");
    }

    let arma_virum = bigrams.get(&canonical(arma, virum)).expect("arma/virum bigram present");
    assert_eq!(arma_virum.len(), 1, "arma/virum should recall from text1 only");
    // arma and virum sit two positions apart in unit1 (dist == 2).
    let expected_arma_virum = (2.0_f64 + 4.0).ln() - 2.0_f64.ln();
    assert!((arma_virum[0].1 - expected_arma_virum).abs() < 1e-9);
}
