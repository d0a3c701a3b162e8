//! Integration tests for Paper Shelf
//!
//! These exercise the flows the CLI drives: search results saved into a list,
//! list contents exported as citations, and a chat turn recorded in the store.

use paper_shelf::chat::{system_prompt, ChatClient};
use paper_shelf::models::{ChatMessage, PaperBuilder, PaperRecord};
#[cfg(feature = "source-semantic")]
use paper_shelf::models::SearchQuery;
#[cfg(feature = "source-semantic")]
use paper_shelf::sources::{PaperIndex, SemanticScholarIndex};
use paper_shelf::store::{JsonStore, MemoryStore, PaperStore};
use paper_shelf::utils::{
    highlight, spans_text, truncate, CitationExport, CitationFormat, DirectorySink, Highlighter,
    HighlightSpan, SearchTerms,
};
use std::time::Duration;
use tempfile::tempdir;

fn sample_papers() -> Vec<PaperRecord> {
    vec![
        PaperBuilder::new("Attention Is All You Need")
            .authors(["Ashish Vaswani", "Noam Shazeer"])
            .year(2017)
            .journal("NeurIPS")
            .build(),
        PaperBuilder::new("A Survey of Graph Neural Networks").build(),
    ]
}

#[test]
fn test_saved_list_exports_every_format() {
    let dir = tempdir().unwrap();
    let store = JsonStore::open(dir.path().join("lists.json")).unwrap();
    let list = store.create_list("Reading Group", None).unwrap();
    for paper in sample_papers() {
        store.add_paper(list.id, paper).unwrap();
    }

    let papers = store.paper_records(list.id).unwrap();
    let sink = DirectorySink::new(dir.path().join("exports"));

    let bib = CitationExport::build(&papers, CitationFormat::Bibtex, Some(&list.name)).unwrap();
    let path = bib.save(&sink).unwrap();
    assert!(path.ends_with("Reading Group-citations.bib"));
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "@article{paper1,\n  title = {Attention Is All You Need},\n  author = {Ashish Vaswani and Noam Shazeer},\n  year = {2017},\n  journal = {NeurIPS},\n}\n\n\
         @article{paper2,\n  title = {A Survey of Graph Neural Networks},\n  author = {Unknown},\n}\n"
    );

    let ris = CitationExport::build(&papers, CitationFormat::Ris, Some(&list.name)).unwrap();
    assert_eq!(ris.file_name, "Reading Group-citations.ris");
    assert_eq!(
        ris.contents,
        "TY  - JOUR\nTI  - Attention Is All You Need\nAU  - Ashish Vaswani\nAU  - Noam Shazeer\nJO  - NeurIPS\nPY  - 2017\nER  -\n\n\
         TY  - JOUR\nTI  - A Survey of Graph Neural Networks\nAU  - Unknown\nER  -"
    );

    let apa = CitationExport::build(&papers, CitationFormat::Apa, None).unwrap();
    assert_eq!(apa.file_name, "papers-citations.txt");
    assert_eq!(
        apa.contents,
        "Ashish Vaswani, Noam Shazeer (2017). Attention Is All You Need. NeurIPS\n\n\
         Unknown (n.d.). A Survey of Graph Neural Networks. "
    );
}

#[test]
fn test_empty_list_produces_no_export() {
    let store = MemoryStore::new();
    let list = store.create_list("Empty", None).unwrap();
    let papers = store.paper_records(list.id).unwrap();

    for format in CitationFormat::ALL {
        assert!(CitationExport::build(&papers, format, Some(&list.name)).is_none());
    }
}

#[test]
fn test_highlighting_search_results_is_lossless() {
    let highlighter = Highlighter::new(&SearchTerms::from_query("graph NEURAL (survey)"));

    for paper in sample_papers() {
        for max in [None, Some(0), Some(10), Some(1000)] {
            let spans = highlighter.highlight(&paper.title, max);
            assert_eq!(spans_text(&spans), truncate(&paper.title, max));
        }
    }

    let spans = highlighter.highlight("A Survey of Graph Neural Networks", None);
    let matched: Vec<&str> = spans.iter().filter(|s| s.is_match()).map(HighlightSpan::text).collect();
    assert_eq!(matched, vec!["Graph", "Neural"]);
}

#[test]
fn test_highlight_regex_special_query() {
    let spans = highlight("a.b*c", &["a.b*c"], None);
    assert_eq!(spans, vec![HighlightSpan::Match("a.b*c".to_string())]);
}

#[test]
fn test_highlighter_shared_across_threads() {
    let highlighter = std::sync::Arc::new(Highlighter::for_query("learning"));
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let highlighter = highlighter.clone();
            std::thread::spawn(move || {
                let text = format!("Learning {} times", i);
                spans_text(&highlighter.highlight(&text, None)) == text
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
}

#[cfg(feature = "source-semantic")]
#[tokio::test]
async fn test_search_then_save_to_list() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/paper/search")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(
            r#"{"total": 2, "offset": 0, "data": [
                {"paperId": "p1", "title": "Graph Attention Networks", "year": 2018, "venue": "ICLR",
                 "authors": [{"name": "Petar Velickovic"}]},
                {"paperId": "p2", "title": "Graph Attention Networks", "authors": []}
            ]}"#,
        )
        .create_async()
        .await;

    let index = SemanticScholarIndex::with_base_url(server.url(), None).unwrap();
    let response = index.search(&SearchQuery::new("graph attention")).await.unwrap();
    assert_eq!(response.papers.len(), 2);
    assert_eq!(response.next, None);

    let store = MemoryStore::new();
    let list = store.create_list("GNN", None).unwrap();
    let saved: Vec<_> = response
        .papers
        .into_iter()
        .filter_map(|p| store.add_paper(list.id, p).ok())
        .collect();

    // The second result duplicates the first title.
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].paper.journal.as_deref(), Some("ICLR"));
}

#[tokio::test]
async fn test_chat_turn_is_recorded() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat")
        .with_status(200)
        .with_body(r#"{"message": "Both papers study attention."}"#)
        .create_async()
        .await;

    let dir = tempdir().unwrap();
    let store = JsonStore::open(dir.path().join("lists.json")).unwrap();
    let list = store.create_list("Attention", None).unwrap();
    for paper in sample_papers() {
        store.add_paper(list.id, paper).unwrap();
    }
    let papers = store.paper_records(list.id).unwrap();
    let session = store.create_session(list.id, "What do these share").unwrap();

    let question = ChatMessage::user("What do these share?");
    let conversation = vec![system_prompt(&list.name, &papers), question.clone()];

    let client = ChatClient::new(format!("{}/chat", server.url()), None, Duration::from_secs(5)).unwrap();
    let reply = client.send(&conversation, &papers).await.unwrap();

    store.append_message(session.id, question).unwrap();
    store.append_message(session.id, ChatMessage::assistant(&reply)).unwrap();

    let reopened = JsonStore::open(store.path()).unwrap();
    let messages = reopened.messages(session.id).unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].message.content, "Both papers study attention.");
}
