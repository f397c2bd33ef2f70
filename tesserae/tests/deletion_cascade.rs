//! Ingest two texts, run a vanilla search and a multitext search keyed
//! to it, then delete one of the source texts and check every
//! dependent record is gone.

use std::path::PathBuf;

use tesserae::config::TesseraeConfig;
use tesserae::engine::Engine;
use tesserae::ingest::IdentityExtractor;

use tesserae_core::feature::FeatureKind;
use tesserae_core::frequency::FrequencyBasis;
use tesserae_core::unit::UnitType;
use tesserae_scoring::DistanceBasis;
use tesserae_search::lifecycle::SearchStatus;
use tesserae_search::params::{MatcherMethod, SearchParams, StopwordBasis, Stopwords, TextOptions};
use tesserae_search::lifecycle::SearchType;

fn engine() -> Engine {
    Engine::new(&TesseraeConfig {
        bigram_store_dir: std::env::temp_dir().join(format!("tesserae-cascade-test-{}", uuid::Uuid::new_v4())),
        ingest_workers: 1,
        search_workers: 1,
        gc_interval_secs: 3600,
    })
}

#[test]
fn deleting_a_text_cascades_through_vanilla_and_multitext_searches() {
    let engine = engine();

    let a = engine.register_text("latin".into(), "Text A", "Author A", PathBuf::from("a.txt"));
    let b = engine.register_text("latin".into(), "Text B", "Author B", PathBuf::from("b.txt"));

    let content_a = "<a. 1.1> arma virumque cano troiae qui primus ab oris.\n<a. 1.2> italiam fato profugus laviniaque venit.\n";
    let content_b = "<b. 1.1> arma virumque cano litora multum ille et terris.\n<b. 1.2> italiam fato profugus oris venit.\n";

    engine.ingest_text(a, content_a, &IdentityExtractor).unwrap();
    engine.ingest_text(b, content_b, &IdentityExtractor).unwrap();

    let vanilla_params = SearchParams {
        source: TextOptions { object_id: a, units: UnitType::Line },
        target: TextOptions { object_id: b, units: UnitType::Line },
        method: MatcherMethod::Vanilla {
            feature: FeatureKind::Lemmata,
            stopwords: Stopwords::default(),
            stopword_basis: StopwordBasis::Corpus,
        },
        freq_basis: FrequencyBasis::Texts,
        max_distance: 10,
        distance_basis: DistanceBasis::Span,
        min_score: -100.0,
    };

    let vanilla_id = engine.find_or_create_search(SearchType::Vanilla, vanilla_params.clone(), None).unwrap();
    engine.run_search(vanilla_id).unwrap();
    assert_eq!(engine.search(vanilla_id).unwrap().status, SearchStatus::Done);
    assert!(!engine.matches_page(vanilla_id, &tesserae_search::paging::Paging {
        sort_by: tesserae_search::paging::SortBy::Score,
        sort_order: tesserae_search::paging::SortOrder::Descending,
        per_page: 100,
        page_number: 0,
    }).matches.is_empty());

    let multitext_id = engine.find_or_create_search(SearchType::Multitext, vanilla_params, Some(vanilla_id)).unwrap();
    engine.run_multitext_search(multitext_id, &[a, b]).unwrap();
    assert_eq!(engine.search(multitext_id).unwrap().status, SearchStatus::Done);

    engine.delete_text(a).unwrap();

    assert!(engine.text(a).is_none());
    assert!(engine.search(vanilla_id).is_none());
    assert!(engine.search(multitext_id).is_none());
}
