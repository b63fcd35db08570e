//! Ingestion orchestrator tests against in-memory doubles.

mod common;

use common::{FakeBibliometrics, FakeCitations, FakeGateway, MemStore};
use neuronews_ingestion::{run_ingestion, IngestionJob};

fn entry(pmid: &str, journal: &str, issn: &str) -> String {
    format!(
        r#"<PubmedArticle><MedlineCitation><PMID>{pmid}</PMID><Article>
           <Journal><ISSN IssnType="Electronic">{issn}</ISSN><Title>{journal}</Title>
           <JournalIssue><PubDate><Year>2026</Year></PubDate></JournalIssue></Journal>
           <ArticleTitle>Article {pmid}</ArticleTitle>
           <Abstract><AbstractText>Findings for {pmid}.</AbstractText></Abstract>
           </Article></MedlineCitation></PubmedArticle>"#
    )
}

fn document(entries: &[String]) -> String {
    format!(
        "<?xml version=\"1.0\"?><PubmedArticleSet>{}</PubmedArticleSet>",
        entries.join("")
    )
}

fn job() -> IngestionJob {
    IngestionJob {
        query: "test".to_string(),
        lookback_days: 7,
        max_results: 200,
    }
}

#[tokio::test]
async fn full_run_ingests_counts_and_resolves() {
    let xml = document(&[
        entry("100", "Neurosurgery", "1524-4040"),
        entry("101", "Neurosurgery", "1524-4040"),
        entry("102", "World Neurosurgery", ""),
    ]);
    let gateway = FakeGateway::new(&["100", "101", "102"], &xml);
    let citations = FakeCitations::with(&[("100", 12), ("102", 3)]);
    let mut bibliometrics = FakeBibliometrics::default();
    bibliometrics.by_issn.insert(
        "1524-4040".to_string(),
        FakeBibliometrics::record("https://openalex.org/S1", 4.5678),
    );
    bibliometrics.by_name.insert(
        "World Neurosurgery".to_string(),
        FakeBibliometrics::record("https://openalex.org/S2", 1.9),
    );
    let store = MemStore::default();

    let outcome = run_ingestion(&job(), &gateway, &citations, &bibliometrics, &store).await;

    assert!(outcome.success, "log: {:?}", outcome.log);
    assert_eq!(outcome.articles_found, 3);
    assert_eq!(outcome.articles_inserted, 3);

    // citation counts landed on the rows
    let articles = store.articles.lock().unwrap();
    let by_pmid = |p: &str| articles.iter().find(|a| a.row.pmid == p).unwrap().clone();
    assert_eq!(by_pmid("100").row.citation_count, 12);
    assert_eq!(by_pmid("101").row.citation_count, 0);
    drop(articles);

    // journals were synced and resolved, IF rounded to 2 decimals
    let neurosurgery = store.journal("Neurosurgery").unwrap();
    assert_eq!(neurosurgery.impact_factor, Some(4.57));
    assert_eq!(neurosurgery.openalex_id, "https://openalex.org/S1");
    assert!(neurosurgery.resolved_at.is_some());

    // journal with no ISSN resolved through the name-search fallback
    let world = store.journal("World Neurosurgery").unwrap();
    assert_eq!(world.impact_factor, Some(1.9));

    // denormalized onto every article of the journal
    let articles = store.articles.lock().unwrap();
    assert!(articles.iter().all(|a| a.impact_factor.is_some()));
}

#[tokio::test]
async fn reingesting_the_same_identifiers_is_idempotent() {
    let xml = document(&[entry("100", "Neurosurgery", "1524-4040")]);
    let gateway = FakeGateway::new(&["100"], &xml);
    let citations = FakeCitations::default();
    let bibliometrics = FakeBibliometrics::default();
    let store = MemStore::default();

    let first = run_ingestion(&job(), &gateway, &citations, &bibliometrics, &store).await;
    let second = run_ingestion(&job(), &gateway, &citations, &bibliometrics, &store).await;

    assert_eq!(first.articles_inserted, 1);
    assert_eq!(second.articles_inserted, 0);
    assert!(second.success);

    let urls = store.article_urls();
    assert_eq!(urls.len(), 1);
    assert_eq!(urls[0], "https://pubmed.ncbi.nlm.nih.gov/100/");
}

#[tokio::test]
async fn search_failure_aborts_the_run() {
    let mut gateway = FakeGateway::new(&["100"], "");
    gateway.fail_search = true;
    let store = MemStore::default();

    let outcome = run_ingestion(
        &job(),
        &gateway,
        &FakeCitations::default(),
        &FakeBibliometrics::default(),
        &store,
    )
    .await;

    assert!(!outcome.success);
    assert!(outcome.error.as_deref().unwrap().contains("search failed"));
    assert!(store.articles.lock().unwrap().is_empty());
}

#[tokio::test]
async fn fetch_failure_aborts_the_run() {
    let mut gateway = FakeGateway::new(&["100"], "");
    gateway.fail_fetch = true;

    let outcome = run_ingestion(
        &job(),
        &gateway,
        &FakeCitations::default(),
        &FakeBibliometrics::default(),
        &MemStore::default(),
    )
    .await;

    assert!(!outcome.success);
    assert!(outcome.error.as_deref().unwrap().contains("fetch failed"));
}

#[tokio::test]
async fn upsert_failure_aborts_before_journal_stages() {
    let xml = document(&[entry("100", "Neurosurgery", "1524-4040")]);
    let gateway = FakeGateway::new(&["100"], &xml);
    let store = MemStore {
        fail_article_upsert: true,
        ..MemStore::default()
    };

    let outcome = run_ingestion(
        &job(),
        &gateway,
        &FakeCitations::default(),
        &FakeBibliometrics::default(),
        &store,
    )
    .await;

    assert!(!outcome.success);
    assert!(outcome.error.as_deref().unwrap().contains("upsert failed"));
    assert!(store.journals.lock().unwrap().is_empty());
}

#[tokio::test]
async fn empty_search_result_is_a_clean_success() {
    let gateway = FakeGateway::new(&[], "");

    let outcome = run_ingestion(
        &job(),
        &gateway,
        &FakeCitations::default(),
        &FakeBibliometrics::default(),
        &MemStore::default(),
    )
    .await;

    assert!(outcome.success);
    assert_eq!(outcome.articles_found, 0);
    assert_eq!(outcome.log, vec!["Found 0 articles on PubMed"]);
}

#[tokio::test]
async fn unresolved_journal_stays_eligible_for_the_next_run() {
    let xml = document(&[entry("100", "Obscure Journal", "")]);
    let gateway = FakeGateway::new(&["100"], &xml);
    // bibliometrics knows nothing about this journal
    let store = MemStore::default();

    let outcome = run_ingestion(
        &job(),
        &gateway,
        &FakeCitations::default(),
        &FakeBibliometrics::default(),
        &store,
    )
    .await;

    assert!(outcome.success);
    let journal = store.journal("Obscure Journal").unwrap();
    assert_eq!(journal.impact_factor, None);
    assert!(journal.resolved_at.is_none());
}

#[tokio::test]
async fn denormalization_never_overwrites_an_existing_value() {
    use neuronews_db::{ArticleRow, NewsStore};

    let store = MemStore::default();
    let id = store.seed_article(ArticleRow {
        pmid: "1".to_string(),
        journal: "Neurosurgery".to_string(),
        url: "https://pubmed.ncbi.nlm.nih.gov/1/".to_string(),
        ..ArticleRow::default()
    });
    // a previous run already denormalized 9.99 onto the article
    store
        .articles
        .lock()
        .unwrap()
        .iter_mut()
        .find(|a| a.id == id)
        .unwrap()
        .impact_factor = Some(9.99);

    store
        .upsert_journals(&[("Neurosurgery".to_string(), String::new())])
        .await
        .unwrap();
    let journal = store.journal("Neurosurgery").unwrap();
    store
        .record_journal_resolution(journal.id, Some(4.57), "S1")
        .await
        .unwrap();

    let updated = store.denormalize_impact_factors().await.unwrap();
    assert_eq!(updated, 0);
    let articles = store.articles.lock().unwrap();
    assert_eq!(articles[0].impact_factor, Some(9.99));
}

#[tokio::test]
async fn journal_sync_backfills_missing_issn_from_articles() {
    use neuronews_db::{ArticleRow, NewsStore};

    let store = MemStore::default();
    store.seed_article(ArticleRow {
        pmid: "1".to_string(),
        journal: "Neurosurgery".to_string(),
        issn: "1524-4040".to_string(),
        url: "https://pubmed.ncbi.nlm.nih.gov/1/".to_string(),
        ..ArticleRow::default()
    });
    // journal exists from an earlier run, before ISSNs were captured
    store
        .upsert_journals(&[("Neurosurgery".to_string(), String::new())])
        .await
        .unwrap();

    let updated = store.backfill_journal_issn().await.unwrap();
    assert_eq!(updated, 1);
    assert_eq!(store.journal("Neurosurgery").unwrap().issn, "1524-4040");
}
