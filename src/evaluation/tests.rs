use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use super::*;
use crate::corpus::{Corpus, Document};
use crate::embedding::EmbeddingProvider;
use crate::multivector::{MockTensorBackend, MultiVectorEncoder, TensorIndexer};
use crate::search::SearchService;
use crate::vectordb::{MockVectorBackend, VectorBackendClient};

const DIM: usize = 16;

fn corpus() -> Arc<Corpus> {
    Arc::new(
        [
            Document::new("A", "Quantum Computing Basics", "An introduction to qubits"),
            Document::new("B", "Cooking", "Recipes for pasta"),
            Document::new("C", "Nuclear Energy", "Fission reactors and physics"),
        ]
        .into_iter()
        .collect(),
    )
}

async fn indexed_service() -> SearchService<MockVectorBackend> {
    let provider = Arc::new(EmbeddingProvider::fallback(DIM, Duration::from_secs(5)));
    let vectors = VectorBackendClient::connect(MockVectorBackend::new(), "eval", DIM as u64).await;
    let service = SearchService::new(corpus(), provider, vectors);
    service.index_documents().await;
    service
}

async fn indexed_tensors(corpus: &Corpus) -> TensorIndexer<MockTensorBackend> {
    let indexer = TensorIndexer::new(
        MultiVectorEncoder::new(64, 16).unwrap(),
        MockTensorBackend::new(),
    );
    indexer.index_corpus(corpus).await;
    indexer
}

fn run(time_ms: f64, relevances: &[f64]) -> ApproachRun {
    let hits = relevances
        .iter()
        .enumerate()
        .map(|(i, &relevance)| EvaluatedHit {
            id: format!("d{i}"),
            title: format!("Doc {i}"),
            relevance,
        })
        .collect();
    ApproachRun::new(time_ms, hits)
}

fn query_eval(id: &str, runs: Vec<(&str, ApproachRun)>) -> QueryEvaluation {
    QueryEvaluation {
        query_id: id.to_string(),
        query_text: format!("query {id}"),
        approaches: runs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect::<BTreeMap<_, _>>(),
    }
}

#[tokio::test]
async fn test_evaluates_all_four_approaches() {
    let service = indexed_service().await;
    let tensors = indexed_tensors(service.corpus()).await;

    let evaluator = Evaluator::new(&service).with_tensors(&tensors).with_hits(2);
    let queries = vec![EvalQuery::new("q1", "quantum computing")];
    let report = evaluator.run(&queries, DEFAULT_MAX_QUERIES).await;

    assert_eq!(report.queries_evaluated, 1);
    let approaches = &report.results[0].approaches;
    let keys: Vec<&str> = approaches.keys().map(String::as_str).collect();
    assert_eq!(keys, vec![HYBRID, MULTI_VECTOR, SINGLE_VECTOR, TEXT_ONLY]);

    assert_eq!(approaches[MULTI_VECTOR].num_results, 2);
    assert_eq!(approaches[MULTI_VECTOR].results[0].id, "A");

    let text_only = &approaches[TEXT_ONLY];
    assert_eq!(text_only.num_results, 1);
    assert_eq!(text_only.results[0].id, "A");
    assert!((text_only.results[0].relevance - 1.0).abs() < 1e-9);

    assert_eq!(approaches[SINGLE_VECTOR].num_results, 2);
    assert_eq!(approaches[HYBRID].num_results, 2);
    assert!(approaches.values().all(|r| r.time_ms >= 0.0));

    assert!(report.vector_comparison().is_some());
}

#[tokio::test]
async fn test_without_tensors_skips_multi_vector() {
    let service = indexed_service().await;
    let evaluator = Evaluator::<_, MockTensorBackend>::new(&service);

    let report = evaluator.run(&default_queries(), 2).await;

    assert_eq!(report.queries_evaluated, 2);
    assert_eq!(report.results[0].query_id, "q1");
    assert!(!report.results[0].approaches.contains_key(MULTI_VECTOR));
    assert_eq!(report.results[0].approaches.len(), 3);
    assert!(report.vector_comparison().is_none());
}

#[tokio::test]
async fn test_failing_tensor_backend_records_empty_run() {
    let service = indexed_service().await;
    let tensors = indexed_tensors(service.corpus()).await;
    tensors.backend().set_failing(true);

    let report = Evaluator::new(&service)
        .with_tensors(&tensors)
        .run(&[EvalQuery::new("q1", "nuclear energy")], 1)
        .await;

    let multi = &report.results[0].approaches[MULTI_VECTOR];
    assert_eq!(multi.num_results, 0);
    assert!(multi.average_relevance().is_none());
    assert_eq!(report.results[0].approaches[TEXT_ONLY].results[0].id, "C");
}

#[test]
fn test_summaries_average_across_queries() {
    let report = EvaluationReport::new(vec![
        query_eval(
            "q1",
            vec![
                (SINGLE_VECTOR, run(10.0, &[0.8, 0.6])),
                (MULTI_VECTOR, run(4.0, &[0.9])),
            ],
        ),
        query_eval(
            "q2",
            vec![
                (SINGLE_VECTOR, run(20.0, &[0.5])),
                (MULTI_VECTOR, run(6.0, &[])),
            ],
        ),
    ]);

    let single = report.summary(SINGLE_VECTOR).unwrap();
    assert!((single.avg_time_ms - 15.0).abs() < 1e-9);
    assert!((single.avg_results - 1.5).abs() < 1e-9);
    assert!((single.avg_relevance - 0.6).abs() < 1e-9);

    // Queries with no hits do not pull the relevance average down.
    let multi = report.summary(MULTI_VECTOR).unwrap();
    assert!((multi.avg_relevance - 0.9).abs() < 1e-9);
    assert!((multi.avg_results - 0.5).abs() < 1e-9);

    assert_eq!(report.fastest().as_deref(), Some(MULTI_VECTOR));
    assert_eq!(report.most_relevant().as_deref(), Some(MULTI_VECTOR));

    let cmp = report.vector_comparison().unwrap();
    assert!(cmp.multi_vector_faster());
    assert!(cmp.multi_vector_more_relevant());
    assert!((cmp.time_delta_ms + 10.0).abs() < 1e-9);
    assert!((cmp.relevance_delta - 0.3).abs() < 1e-9);
}

#[test]
fn test_empty_report() {
    let report = EvaluationReport::new(Vec::new());
    assert_eq!(report.queries_evaluated, 0);
    assert!(report.summaries().is_empty());
    assert!(report.fastest().is_none());
    assert!(report.vector_comparison().is_none());
}

#[test]
fn test_load_queries_and_defaults() {
    let dir = TempDir::new().unwrap();
    assert_eq!(load_or_default_queries(dir.path()), default_queries());

    let processed = dir.path().join("processed");
    std::fs::create_dir_all(&processed).unwrap();
    std::fs::write(
        processed.join("queries.jsonl"),
        "{\"id\": \"x1\", \"text\": \"solar power\"}\n\n{\"id\": \"x2\", \"text\": \"qubits\"}\n",
    )
    .unwrap();

    let queries = load_or_default_queries(dir.path());
    assert_eq!(
        queries,
        vec![EvalQuery::new("x1", "solar power"), EvalQuery::new("x2", "qubits")]
    );
}

#[test]
fn test_load_queries_reports_bad_line() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("queries.jsonl");
    std::fs::write(&path, "{\"id\": \"x1\", \"text\": \"ok\"}\nnot json\n").unwrap();

    match load_queries(&path) {
        Err(EvaluationError::Parse { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn test_save_writes_report_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(EVALUATION_RESULTS_FILE);
    let report = EvaluationReport::new(vec![query_eval("q1", vec![(TEXT_ONLY, run(1.0, &[1.0]))])]);

    report.save(&path).unwrap();

    let saved: EvaluationReport =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(saved, report);
    assert_eq!(saved.results[0].approaches[TEXT_ONLY].num_results, 1);
}
