//! Offline comparison of the retrieval strategies.
//!
//! Each query runs through dense single-vector search, multi-vector (tensor) search when a
//! [`TensorIndexer`] is attached, keyword search and hybrid fusion. Timing, result counts
//! and relevances are collected into an [`EvaluationReport`], which summarizes per approach
//! and compares multi-vector against single-vector.

pub mod error;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::multivector::{TensorBackend, TensorHit, TensorIndexer};
use crate::search::SearchService;
use crate::vectordb::VectorBackend;

pub use error::EvaluationError;

/// Hits requested per approach.
pub const DEFAULT_EVALUATION_HITS: usize = 5;

/// Queries evaluated when no limit is given.
pub const DEFAULT_MAX_QUERIES: usize = 5;

/// Report file written by `--evaluate`.
pub const EVALUATION_RESULTS_FILE: &str = "evaluation_results.json";

pub const SINGLE_VECTOR: &str = "single_vector";
pub const MULTI_VECTOR: &str = "multi_vector";
pub const TEXT_ONLY: &str = "text_only";
pub const HYBRID: &str = "hybrid";

const DEFAULT_QUERIES: [(&str, &str); 5] = [
    ("q1", "manhattan project atomic bomb"),
    ("q2", "world war 2 events"),
    ("q3", "nuclear energy physics"),
    ("q4", "historical documents archives"),
    ("q5", "scientific research development"),
];

/// One evaluation query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalQuery {
    pub id: String,
    pub text: String,
}

impl EvalQuery {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

pub fn default_queries() -> Vec<EvalQuery> {
    DEFAULT_QUERIES
        .iter()
        .map(|(id, text)| EvalQuery::new(*id, *text))
        .collect()
}

/// Reads one `{id, text}` record per line. Blank lines are skipped.
pub fn load_queries(path: &Path) -> Result<Vec<EvalQuery>, EvaluationError> {
    let io_err = |source| EvaluationError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(io_err)?;
    let mut queries = Vec::new();

    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(io_err)?;
        if line.trim().is_empty() {
            continue;
        }
        let query = serde_json::from_str(&line).map_err(|source| EvaluationError::Parse {
            line: idx + 1,
            source,
        })?;
        queries.push(query);
    }

    Ok(queries)
}

/// Loads `processed/queries.jsonl` under `data_dir`, or the built-in queries.
pub fn load_or_default_queries(data_dir: &Path) -> Vec<EvalQuery> {
    let path = data_dir.join("processed").join("queries.jsonl");

    if !path.exists() {
        info!("No queries file found, using built-in evaluation queries");
        return default_queries();
    }

    match load_queries(&path) {
        Ok(queries) if !queries.is_empty() => queries,
        Ok(_) => {
            warn!(path = %path.display(), "Queries file is empty, using built-in evaluation queries");
            default_queries()
        }
        Err(e) => {
            warn!(error = %e, "Failed to load queries, using built-in evaluation queries");
            default_queries()
        }
    }
}

/// A ranked hit as recorded in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatedHit {
    pub id: String,
    pub title: String,
    pub relevance: f64,
}

impl From<TensorHit> for EvaluatedHit {
    fn from(hit: TensorHit) -> Self {
        Self {
            id: hit.doc_id,
            title: hit.title,
            relevance: f64::from(hit.relevance),
        }
    }
}

/// One approach's outcome for one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApproachRun {
    pub time_ms: f64,
    pub num_results: usize,
    pub results: Vec<EvaluatedHit>,
}

impl ApproachRun {
    pub fn new(time_ms: f64, results: Vec<EvaluatedHit>) -> Self {
        Self {
            time_ms,
            num_results: results.len(),
            results,
        }
    }

    /// `None` when the approach returned nothing.
    pub fn average_relevance(&self) -> Option<f64> {
        mean(self.results.iter().map(|hit| hit.relevance))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryEvaluation {
    pub query_id: String,
    pub query_text: String,
    pub approaches: BTreeMap<String, ApproachRun>,
}

/// Averages of one approach across all evaluated queries.
#[derive(Debug, Clone, PartialEq)]
pub struct ApproachSummary {
    pub approach: String,
    pub avg_time_ms: f64,
    pub avg_results: f64,
    /// Mean of per-query average relevance, over queries that returned hits.
    pub avg_relevance: f64,
}

/// Multi-vector minus single-vector averages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorComparison {
    pub time_delta_ms: f64,
    pub relevance_delta: f64,
}

impl VectorComparison {
    pub fn multi_vector_faster(&self) -> bool {
        self.time_delta_ms < 0.0
    }

    pub fn multi_vector_more_relevant(&self) -> bool {
        self.relevance_delta > 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub timestamp: i64,
    pub queries_evaluated: usize,
    pub results: Vec<QueryEvaluation>,
}

impl EvaluationReport {
    pub fn new(results: Vec<QueryEvaluation>) -> Self {
        Self {
            timestamp: chrono::Utc::now().timestamp(),
            queries_evaluated: results.len(),
            results,
        }
    }

    /// Per-approach averages, ordered by approach name.
    pub fn summaries(&self) -> Vec<ApproachSummary> {
        let mut runs: BTreeMap<&str, Vec<&ApproachRun>> = BTreeMap::new();
        for query in &self.results {
            for (approach, run) in &query.approaches {
                runs.entry(approach.as_str()).or_default().push(run);
            }
        }

        runs.into_iter()
            .map(|(approach, runs)| ApproachSummary {
                approach: approach.to_string(),
                avg_time_ms: mean(runs.iter().map(|r| r.time_ms)).unwrap_or(0.0),
                avg_results: mean(runs.iter().map(|r| r.num_results as f64)).unwrap_or(0.0),
                avg_relevance: mean(runs.iter().filter_map(|r| r.average_relevance()))
                    .unwrap_or(0.0),
            })
            .collect()
    }

    pub fn summary(&self, approach: &str) -> Option<ApproachSummary> {
        self.summaries().into_iter().find(|s| s.approach == approach)
    }

    pub fn fastest(&self) -> Option<String> {
        self.summaries()
            .into_iter()
            .min_by(|a, b| a.avg_time_ms.total_cmp(&b.avg_time_ms))
            .map(|s| s.approach)
    }

    pub fn most_relevant(&self) -> Option<String> {
        self.summaries()
            .into_iter()
            .max_by(|a, b| a.avg_relevance.total_cmp(&b.avg_relevance))
            .map(|s| s.approach)
    }

    /// `None` unless both vector approaches were evaluated.
    pub fn vector_comparison(&self) -> Option<VectorComparison> {
        let single = self.summary(SINGLE_VECTOR)?;
        let multi = self.summary(MULTI_VECTOR)?;
        Some(VectorComparison {
            time_delta_ms: multi.avg_time_ms - single.avg_time_ms,
            relevance_delta: multi.avg_relevance - single.avg_relevance,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), EvaluationError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| EvaluationError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Emits the per-approach table and the comparison as structured events.
    pub fn log_summary(&self) {
        for s in self.summaries() {
            info!(
                approach = %s.approach,
                avg_time_ms = s.avg_time_ms,
                avg_results = s.avg_results,
                avg_relevance = s.avg_relevance,
                "Approach summary"
            );
        }

        let fastest = self.fastest().unwrap_or_default();
        let most_relevant = self.most_relevant().unwrap_or_default();
        info!(
            queries = self.queries_evaluated,
            fastest = %fastest,
            most_relevant = %most_relevant,
            "Evaluation summary"
        );

        if let Some(cmp) = self.vector_comparison() {
            let faster = if cmp.multi_vector_faster() { MULTI_VECTOR } else { SINGLE_VECTOR };
            let more_relevant = if cmp.multi_vector_more_relevant() {
                MULTI_VECTOR
            } else {
                SINGLE_VECTOR
            };
            info!(
                faster,
                time_delta_ms = cmp.time_delta_ms.abs(),
                more_relevant,
                relevance_delta = cmp.relevance_delta.abs(),
                "Multi-vector vs single-vector"
            );
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Runs evaluation queries through every available approach, one at a time.
pub struct Evaluator<'a, B, T> {
    service: &'a SearchService<B>,
    tensors: Option<&'a TensorIndexer<T>>,
    hits: usize,
}

impl<'a, B: VectorBackend, T: TensorBackend> Evaluator<'a, B, T> {
    pub fn new(service: &'a SearchService<B>) -> Self {
        Self {
            service,
            tensors: None,
            hits: DEFAULT_EVALUATION_HITS,
        }
    }

    /// Adds the multi-vector approach.
    pub fn with_tensors(mut self, tensors: &'a TensorIndexer<T>) -> Self {
        self.tensors = Some(tensors);
        self
    }

    pub fn with_hits(mut self, hits: usize) -> Self {
        self.hits = hits;
        self
    }

    #[instrument(skip(self, queries), fields(query_count = queries.len().min(max_queries)))]
    pub async fn run(&self, queries: &[EvalQuery], max_queries: usize) -> EvaluationReport {
        let mut results = Vec::new();
        for query in queries.iter().take(max_queries) {
            results.push(self.evaluate_query(query).await);
        }
        EvaluationReport::new(results)
    }

    pub async fn evaluate_query(&self, query: &EvalQuery) -> QueryEvaluation {
        let mut approaches = BTreeMap::new();
        let text = query.text.as_str();

        let start = Instant::now();
        let single: Vec<EvaluatedHit> = match self.service.search_semantic(text, self.hits).await {
            Ok(hits) => hits
                .iter()
                .map(|h| scored(&h.document.id, &h.document.title, h.score))
                .collect(),
            Err(e) => {
                warn!(query_id = %query.id, error = %e, "Single-vector search failed");
                Vec::new()
            }
        };
        approaches.insert(SINGLE_VECTOR.to_string(), ApproachRun::new(elapsed_ms(start), single));

        if let Some(tensors) = self.tensors {
            let start = Instant::now();
            let multi: Vec<EvaluatedHit> = match tensors.search(text, self.hits).await {
                Ok(hits) => hits.into_iter().map(EvaluatedHit::from).collect(),
                Err(e) => {
                    warn!(query_id = %query.id, error = %e, "Multi-vector search failed");
                    Vec::new()
                }
            };
            approaches.insert(MULTI_VECTOR.to_string(), ApproachRun::new(elapsed_ms(start), multi));
        }

        let start = Instant::now();
        let text_only: Vec<EvaluatedHit> = self
            .service
            .search_keyword(text, self.hits)
            .iter()
            .map(|h| scored(&h.document.id, &h.document.title, h.score))
            .collect();
        approaches.insert(TEXT_ONLY.to_string(), ApproachRun::new(elapsed_ms(start), text_only));

        let start = Instant::now();
        let hybrid: Vec<EvaluatedHit> = self
            .service
            .search_hybrid(text, self.hits)
            .await
            .iter()
            .map(|h| scored(&h.document.id, &h.document.title, h.hybrid_score))
            .collect();
        approaches.insert(HYBRID.to_string(), ApproachRun::new(elapsed_ms(start), hybrid));

        for (approach, run) in &approaches {
            let top = run.results.first().map(|h| h.title.as_str()).unwrap_or("");
            info!(
                query_id = %query.id,
                approach = %approach,
                time_ms = run.time_ms,
                results = run.num_results,
                avg_relevance = run.average_relevance().unwrap_or(0.0),
                top,
                "Query evaluated"
            );
        }

        QueryEvaluation {
            query_id: query.id.clone(),
            query_text: query.text.clone(),
            approaches,
        }
    }
}

fn scored(id: &str, title: &str, score: f32) -> EvaluatedHit {
    EvaluatedHit {
        id: id.to_string(),
        title: title.to_string(),
        relevance: f64::from(score),
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
