//! Corpus import integration tests

mod helpers;

use helpers::{generate_test_wav, AudioConfig, CorpusFixture};
use sqlx::SqlitePool;
use zrviz_common::db::init_memory_database;
use zrviz_common::Error;
use zrviz_web::db::{corpora, documents, fragments, terms, topics};
use zrviz_web::import::{export_term_labels, import_term_info, CorpusImporter};

async fn count(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_import_creates_corpus() {
    let pool = init_memory_database().await.unwrap();
    let fixture = CorpusFixture::new();

    let summary = CorpusImporter::new(pool.clone())
        .import(&fixture.request("buckeye"))
        .await
        .unwrap();

    assert_eq!(summary.documents, 3);
    assert_eq!(summary.terms, 4);
    assert_eq!(summary.audio_fragments, 6);
    assert_eq!(summary.missing_audio, 0);

    let corpus = corpora::get_corpus(&pool, summary.corpus_id).await.unwrap();
    assert_eq!(corpus.name, "buckeye");
    assert_eq!(corpus.audio_rate, 16000);
    assert!(!corpus.protected_corpus);

    let docs = documents::list_documents(&pool, summary.corpus_id).await.unwrap();
    let identifiers: Vec<&str> = docs.iter().map(|d| d.audio_identifier.as_str()).collect();
    assert_eq!(identifiers, vec!["s01", "s02", "s03"]);
    assert_eq!(docs[0].document_index, 0);
    assert_eq!(docs[2].document_index, 2);
    // 2 s of 16 kHz mono audio
    assert!(docs.iter().all(|d| d.duration == 200));

    assert_eq!(count(&pool, "terms").await, 4);
    assert_eq!(count(&pool, "audio_fragments").await, 6);
}

#[tokio::test]
async fn test_fragment_rows_follow_clusters() {
    let pool = init_memory_database().await.unwrap();
    let fixture = CorpusFixture::new();
    let summary = CorpusImporter::new(pool.clone())
        .import(&fixture.request("buckeye"))
        .await
        .unwrap();

    let corpus_terms = terms::terms_for_corpus(&pool, summary.corpus_id).await.unwrap();
    let labels: Vec<&str> = corpus_terms.iter().map(|t| t.label.as_str()).collect();
    // pt3 has an empty cluster line and therefore no fragments in the corpus
    assert_eq!(labels, vec!["pt0", "pt1", "pt2"]);

    let expected = [3, 2, 1];
    for (term, expected) in corpus_terms.iter().zip(expected) {
        assert_eq!(fragments::count_for_term(&pool, term.id).await.unwrap(), expected);
    }

    let s02 = &documents::list_documents(&pool, summary.corpus_id).await.unwrap()[1];
    let s02_fragments = fragments::fragments_for_document(&pool, s02.id).await.unwrap();
    assert_eq!(s02_fragments.len(), 2);
    assert_eq!(s02_fragments[0].zr_fragment_index, 3);
    assert_eq!(s02_fragments[0].start_offset, 20);
    assert_eq!(s02_fragments[0].end_offset, 80);
    assert_eq!(s02_fragments[0].duration, 60);
    assert!((s02_fragments[0].score - 0.7).abs() < 1e-9);
    assert_eq!(s02_fragments[1].zr_fragment_index, 5);
}

#[tokio::test]
async fn test_cluster_values_match_one_based_lines() {
    let pool = init_memory_database().await.unwrap();
    // "0" matches no line; "1" matches the first fragment line only
    let fixture = CorpusFixture::build(helpers::FIXTURE_FRAGMENTS, "0 1\n", &[]);

    let summary = CorpusImporter::new(pool.clone())
        .import(&fixture.request("offsets"))
        .await
        .unwrap();

    assert_eq!(summary.terms, 1);
    assert_eq!(summary.audio_fragments, 1);

    let rows = fragments::fragments_for_document(&pool, 1).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].zr_fragment_index, 1);
    assert_eq!(rows[0].start_offset, 10);
}

#[tokio::test]
async fn test_reimport_creates_independent_corpus() {
    let pool = init_memory_database().await.unwrap();
    let fixture = CorpusFixture::new();
    let importer = CorpusImporter::new(pool.clone());

    let first = importer.import(&fixture.request("buckeye")).await.unwrap();
    let second = importer.import(&fixture.request("buckeye")).await.unwrap();

    assert_ne!(first.corpus_id, second.corpus_id);
    assert_eq!(count(&pool, "corpora").await, 2);
    assert_eq!(count(&pool, "documents").await, 6);
    assert_eq!(count(&pool, "terms").await, 8);
    assert_eq!(count(&pool, "audio_fragments").await, 12);

    // Terms of one corpus never leak into the other
    let first_terms = terms::terms_for_corpus(&pool, first.corpus_id).await.unwrap();
    let second_terms = terms::terms_for_corpus(&pool, second.corpus_id).await.unwrap();
    assert!(first_terms
        .iter()
        .all(|t| second_terms.iter().all(|s| s.id != t.id)));
}

#[tokio::test]
async fn test_missing_audio_records_zero_duration() {
    let pool = init_memory_database().await.unwrap();
    let fixture = CorpusFixture::with_missing_audio(&["s03"]);

    let summary = CorpusImporter::new(pool.clone())
        .import(&fixture.request("partial"))
        .await
        .unwrap();

    assert_eq!(summary.missing_audio, 1);
    assert_eq!(summary.audio_fragments, 6);

    let docs = documents::list_documents(&pool, summary.corpus_id).await.unwrap();
    assert_eq!(docs[0].duration, 200);
    assert_eq!(docs[2].duration, 0);
}

#[tokio::test]
async fn test_backfill_after_audio_appears() {
    let pool = init_memory_database().await.unwrap();
    let fixture = CorpusFixture::with_missing_audio(&["s03"]);
    let importer = CorpusImporter::new(pool.clone());
    let summary = importer.import(&fixture.request("partial")).await.unwrap();

    // Still missing: nothing to update
    assert_eq!(importer.backfill_durations(summary.corpus_id).await.unwrap(), 0);

    let config = AudioConfig {
        duration_seconds: 1.5,
        ..Default::default()
    };
    generate_test_wav(&fixture.audio_path("s03"), &config).unwrap();

    assert_eq!(importer.backfill_durations(summary.corpus_id).await.unwrap(), 1);
    let docs = documents::list_documents(&pool, summary.corpus_id).await.unwrap();
    assert_eq!(docs[2].duration, 150);
    assert!(documents::documents_without_duration(&pool, summary.corpus_id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_malformed_fragment_line_rolls_back() {
    let pool = init_memory_database().await.unwrap();
    let fragments = "s01 10 60 0.9 1.5 100\ns02 20 not-a-number 0.7 1.5 100\n";
    let fixture = CorpusFixture::build(fragments, "1 2\n", &[]);

    let err = CorpusImporter::new(pool.clone())
        .import(&fixture.request("broken"))
        .await
        .unwrap_err();

    match err {
        Error::Parse { line, .. } => assert_eq!(line, 2),
        other => panic!("expected parse error, got {:?}", other),
    }
    assert_eq!(count(&pool, "corpora").await, 0);
    assert_eq!(count(&pool, "documents").await, 0);
    assert_eq!(count(&pool, "terms").await, 0);
}

#[tokio::test]
async fn test_unreferenced_malformed_line_is_ignored() {
    let pool = init_memory_database().await.unwrap();
    let fragments = "s01 10 60 0.9 1.5 100\ngarbage\n";
    let fixture = CorpusFixture::build(fragments, "1\n", &[]);

    let summary = CorpusImporter::new(pool.clone())
        .import(&fixture.request("sparse"))
        .await
        .unwrap();
    assert_eq!(summary.audio_fragments, 1);
}

#[tokio::test]
async fn test_unknown_identifier_is_fatal() {
    let pool = init_memory_database().await.unwrap();
    let fixture = CorpusFixture::build("s99 10 60 0.9 1.5 100\n", "1\n", &[]);

    let result = CorpusImporter::new(pool.clone())
        .import(&fixture.request("unknown"))
        .await;
    assert!(matches!(result, Err(Error::Parse { line: 1, .. })));
    assert_eq!(count(&pool, "corpora").await, 0);
}

#[tokio::test]
async fn test_missing_input_file_is_io_error() {
    let pool = init_memory_database().await.unwrap();
    let fixture = CorpusFixture::new();
    let mut request = fixture.request("nofile");
    request.clusters_path = fixture.root().join("absent.dedups");

    let result = CorpusImporter::new(pool).import(&request).await;
    assert!(matches!(result, Err(Error::Io(_))));
}

#[tokio::test]
async fn test_term_info_import() {
    let pool = init_memory_database().await.unwrap();
    let fixture = CorpusFixture::new();
    let summary = CorpusImporter::new(pool.clone())
        .import(&fixture.request("buckeye"))
        .await
        .unwrap();
    let topic_id = topics::insert_topic(&pool, summary.corpus_id, "flood", "Flooding")
        .await
        .unwrap();

    let info_path = fixture.root().join("flood.tsv");
    std::fs::write(&info_path, "# index category score\n0 keyword 0.9\n\n2 location 0.25\n").unwrap();

    let rows = import_term_info(&pool, topic_id, &info_path).await.unwrap();
    assert_eq!(rows, 2);

    let stored = topics::term_info_for_topic(&pool, topic_id).await.unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(
        topics::term_info_categories(&pool, topic_id).await.unwrap(),
        vec!["keyword".to_string(), "location".to_string()]
    );
}

#[tokio::test]
async fn test_term_info_unknown_index_writes_nothing() {
    let pool = init_memory_database().await.unwrap();
    let fixture = CorpusFixture::new();
    let summary = CorpusImporter::new(pool.clone())
        .import(&fixture.request("buckeye"))
        .await
        .unwrap();
    let topic_id = topics::insert_topic(&pool, summary.corpus_id, "flood", "")
        .await
        .unwrap();

    let info_path = fixture.root().join("flood.tsv");
    std::fs::write(&info_path, "0 keyword 0.9\n42 keyword 0.1\n").unwrap();

    let result = import_term_info(&pool, topic_id, &info_path).await;
    assert!(matches!(result, Err(Error::InvalidInput(_))));
    assert!(topics::term_info_for_topic(&pool, topic_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_label_export_reflects_edits() {
    let pool = init_memory_database().await.unwrap();
    let fixture = CorpusFixture::new();
    let summary = CorpusImporter::new(pool.clone())
        .import(&fixture.request("buckeye"))
        .await
        .unwrap();

    let corpus_terms = terms::terms_for_corpus(&pool, summary.corpus_id).await.unwrap();
    terms::update_label(&pool, corpus_terms[1].id, "water").await.unwrap();

    let mut output = Vec::new();
    let written = export_term_labels(&pool, summary.corpus_id, &mut output)
        .await
        .unwrap();

    assert_eq!(written, 3);
    assert_eq!(String::from_utf8(output).unwrap(), "0\tpt0\n1\twater\n2\tpt2\n");
}
