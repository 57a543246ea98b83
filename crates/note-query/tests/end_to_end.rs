//! End-to-end search scenario: corpus on disk → build → query → snippets.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use note_analysis::JapaneseAnalyzer;
use note_lifecycle::{IndexLayout, LifecycleManager, RebuildContext, RebuildReason};
use note_query::{QueryError, QueryService};
use note_types::{shared_runtime, RuntimeConfig, RuntimeConfigPatch};

fn write_note(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
}

async fn service_over(corpus: &Path, index_root: &Path) -> (QueryService, LifecycleManager) {
    let analyzer = Arc::new(JapaneseAnalyzer::with_stopwords(HashSet::new()).unwrap());
    let ctx = RebuildContext {
        corpus_root: corpus.to_path_buf(),
        layout: IndexLayout::new(index_root.join("index")),
        analyzer: analyzer.clone(),
        runtime: shared_runtime(RuntimeConfig::default()),
    };
    let manager = LifecycleManager::new(ctx, CancellationToken::new());
    manager.open_or_bootstrap().await.unwrap();

    let service = QueryService::new(corpus, analyzer, manager.clone());
    (service, manager)
}

#[tokio::test(flavor = "multi_thread")]
async fn two_note_scenario() {
    let tmp = TempDir::new().unwrap();
    let corpus = tmp.path().join("vault");
    write_note(&corpus, "A.md", "Obsidian is great");
    write_note(&corpus, "B.md", "---\ntitle: Clipper\n---\nWeb clipper tool\n");

    let index_root = TempDir::new().unwrap();
    let (service, _manager) = service_over(&corpus, index_root.path()).await;

    let hits = service.search("obsidian").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "A");
    assert_eq!(hits[0].linkpath, "A.md");
    assert!(hits[0].snippet.contains("Obsidian"));

    let hits = service.search("clipper").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Clipper");
    assert_eq!(hits[0].linkpath, "B.md");
}

#[tokio::test(flavor = "multi_thread")]
async fn snippet_is_windowed_around_the_match() {
    let tmp = TempDir::new().unwrap();
    let corpus = tmp.path().join("vault");
    let body = format!("{} keyword {}", "filler ".repeat(40), "trailer ".repeat(40));
    write_note(&corpus, "long.md", &body);

    let index_root = TempDir::new().unwrap();
    let (service, manager) = service_over(&corpus, index_root.path()).await;

    // Narrow the window so both sides truncate.
    {
        let mut runtime = manager.runtime().write().unwrap();
        runtime
            .apply(&RuntimeConfigPatch {
                snippet_width: Some(12),
                ..Default::default()
            })
            .unwrap();
    }

    let hits = service.search("keyword").unwrap();
    assert_eq!(hits.len(), 1);

    let snippet = &hits[0].snippet;
    assert!(snippet.contains("keyword"));
    assert!(snippet.chars().count() <= 2 * 12 + "keyword".chars().count());
}

#[tokio::test(flavor = "multi_thread")]
async fn deleted_note_falls_back_to_indexed_body() {
    let tmp = TempDir::new().unwrap();
    let corpus = tmp.path().join("vault");
    write_note(&corpus, "A.md", "Obsidian is great");

    let index_root = TempDir::new().unwrap();
    let (service, _manager) = service_over(&corpus, index_root.path()).await;

    fs::remove_file(corpus.join("A.md")).unwrap();

    let hits = service.search("obsidian").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].snippet, "Obsidian is great");
}

#[tokio::test(flavor = "multi_thread")]
async fn frontmatter_values_are_searchable() {
    let tmp = TempDir::new().unwrap();
    let corpus = tmp.path().join("vault");
    write_note(
        &corpus,
        "tagged.md",
        "---\ntags:\n  - archery\n---\nBody without the tag term\n",
    );

    let index_root = TempDir::new().unwrap();
    let (service, _manager) = service_over(&corpus, index_root.path()).await;

    let hits = service.search("archery").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].linkpath, "tagged.md");
}

#[tokio::test(flavor = "multi_thread")]
async fn japanese_search_end_to_end() {
    let tmp = TempDir::new().unwrap();
    let corpus = tmp.path().join("vault");
    write_note(&corpus, "nikki.md", "# 日記\n\n今日は東京で散歩した。\n");

    let index_root = TempDir::new().unwrap();
    let (service, _manager) = service_over(&corpus, index_root.path()).await;

    let hits = service.search("東京").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "nikki");
    assert!(hits[0].snippet.contains("東京"));
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_query_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let corpus = tmp.path().join("vault");
    write_note(&corpus, "A.md", "content");

    let index_root = TempDir::new().unwrap();
    let (service, _manager) = service_over(&corpus, index_root.path()).await;

    assert!(matches!(service.search(""), Err(QueryError::EmptyQuery)));
    assert!(matches!(service.search("   "), Err(QueryError::EmptyQuery)));
}

#[tokio::test(flavor = "multi_thread")]
async fn no_hits_is_an_empty_result() {
    let tmp = TempDir::new().unwrap();
    let corpus = tmp.path().join("vault");
    write_note(&corpus, "A.md", "content here");

    let index_root = TempDir::new().unwrap();
    let (service, _manager) = service_over(&corpus, index_root.path()).await;

    let hits = service.search("nonexistentterm12345").unwrap();
    assert!(hits.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn results_survive_a_rebuild() {
    let tmp = TempDir::new().unwrap();
    let corpus = tmp.path().join("vault");
    write_note(&corpus, "A.md", "Obsidian is great");

    let index_root = TempDir::new().unwrap();
    let (service, manager) = service_over(&corpus, index_root.path()).await;

    write_note(&corpus, "C.md", "Obsidian plugins everywhere");
    manager.rebuild_now(RebuildReason::Manual).await.unwrap();

    let hits = service.search("obsidian").unwrap();
    assert_eq!(hits.len(), 2);
}
